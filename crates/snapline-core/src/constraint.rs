//! Drag-delta constraints applied after alignment snapping.
//!
//! A drag proposes a delta from the drag start; each constraint may rewrite it.
//! Constraints run in the order they were added, each one seeing the previous
//! one's output.

use kurbo::Vec2;
use std::fmt;

/// Grid size matching the host's default visual grid.
pub const GRID_SIZE: f64 = 20.0;

/// Something that can adjust a proposed drag delta.
pub trait DragConstraint {
    /// Return the delta to use instead of `delta`.
    fn adjust(&mut self, delta: Vec2) -> Vec2;
}

impl<F> DragConstraint for F
where
    F: FnMut(Vec2) -> Vec2,
{
    fn adjust(&mut self, delta: Vec2) -> Vec2 {
        self(delta)
    }
}

/// Ordered list of constraints composed left to right.
#[derive(Default)]
pub struct ConstraintChain {
    constraints: Vec<Box<dyn DragConstraint>>,
}

impl fmt::Debug for ConstraintChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConstraintChain")
            .field("len", &self.constraints.len())
            .finish()
    }
}

impl ConstraintChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a constraint, builder style.
    pub fn with(mut self, constraint: impl DragConstraint + 'static) -> Self {
        self.push(constraint);
        self
    }

    /// Append a constraint.
    pub fn push(&mut self, constraint: impl DragConstraint + 'static) {
        self.constraints.push(Box::new(constraint));
    }

    pub fn len(&self) -> usize {
        self.constraints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.constraints.is_empty()
    }

    /// Run every constraint in order.
    pub fn apply(&mut self, delta: Vec2) -> Vec2 {
        self.constraints
            .iter_mut()
            .fold(delta, |delta, constraint| constraint.adjust(delta))
    }
}

/// Snap a value to the nearest multiple of `grid_size`.
pub fn snap_to_grid(value: f64, grid_size: f64) -> f64 {
    (value / grid_size).round() * grid_size
}

/// Quantizes the delta so the shape moves in whole grid steps.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridConstraint {
    pub grid_size: f64,
}

impl Default for GridConstraint {
    fn default() -> Self {
        Self {
            grid_size: GRID_SIZE,
        }
    }
}

impl GridConstraint {
    pub fn new(grid_size: f64) -> Self {
        Self { grid_size }
    }
}

impl DragConstraint for GridConstraint {
    fn adjust(&mut self, delta: Vec2) -> Vec2 {
        if self.grid_size <= 0.0 {
            return delta;
        }
        Vec2::new(
            snap_to_grid(delta.x, self.grid_size),
            snap_to_grid(delta.y, self.grid_size),
        )
    }
}

/// Restricts a drag to one axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AxisLock {
    /// Only horizontal movement.
    Horizontal,
    /// Only vertical movement.
    Vertical,
}

impl DragConstraint for AxisLock {
    fn adjust(&mut self, delta: Vec2) -> Vec2 {
        match self {
            AxisLock::Horizontal => Vec2::new(delta.x, 0.0),
            AxisLock::Vertical => Vec2::new(0.0, delta.y),
        }
    }
}
