//! Per-shape tracked alignment state.

use super::Anchor;
use super::distribution::CandidateId;
use crate::constraint::ConstraintChain;
use crate::shapes::{Alignable, ShapeId};
use kurbo::{Point, Size, Vec2};
use std::collections::HashSet;

/// Size of a shape's bounding box and its offset from the shape position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Geometry {
    pub size: Size,
    pub offset: Vec2,
}

impl Geometry {
    /// Read the current geometry of a shape.
    pub fn of(shape: &dyn Alignable) -> Self {
        Self {
            size: shape.bounds().size(),
            offset: shape.box_offset(),
        }
    }
}

/// The six alignment coordinates of a bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Coordinates {
    pub left: f64,
    pub h_center: f64,
    pub right: f64,
    pub top: f64,
    pub v_center: f64,
    pub bottom: f64,
}

impl Coordinates {
    /// Coordinates of a box of `geometry` placed with its shape at `position`.
    pub fn project(position: Point, geometry: Geometry) -> Self {
        let mut coords = Self::default();
        coords.set_horizontal(position.x, geometry);
        coords.set_vertical(position.y, geometry);
        coords
    }

    pub fn get(&self, anchor: Anchor) -> f64 {
        match anchor {
            Anchor::Left => self.left,
            Anchor::HCenter => self.h_center,
            Anchor::Right => self.right,
            Anchor::Top => self.top,
            Anchor::VCenter => self.v_center,
            Anchor::Bottom => self.bottom,
        }
    }

    fn set_horizontal(&mut self, x: f64, geometry: Geometry) {
        let width = geometry.size.width;
        self.left = x + geometry.offset.x;
        self.h_center = self.left + width / 2.0;
        self.right = self.left + width;
    }

    fn set_vertical(&mut self, y: f64, geometry: Geometry) {
        let height = geometry.size.height;
        self.top = y + geometry.offset.y;
        self.v_center = self.top + height / 2.0;
        self.bottom = self.top + height;
    }
}

/// Drag lifecycle of a handle.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum DragState {
    #[default]
    Idle,
    /// Being dragged; the handle is out of every index.
    Dragging {
        /// Shape position when the drag started.
        start: Point,
    },
}

/// Tracked alignment state of one registered shape.
#[derive(Debug)]
pub struct AxisHandle {
    shape_id: ShapeId,
    coords: Coordinates,
    geometry: Geometry,
    /// Position the coordinates were last captured from.
    captured: Option<Point>,
    candidates: HashSet<CandidateId>,
    drag: DragState,
    draggable: bool,
    pub(crate) constraints: ConstraintChain,
}

impl AxisHandle {
    /// Create a handle with coordinates captured from the shape's current geometry.
    pub fn new(shape: &dyn Alignable) -> Self {
        let mut handle = Self {
            shape_id: shape.id(),
            coords: Coordinates::default(),
            geometry: Geometry::of(shape),
            captured: None,
            candidates: HashSet::new(),
            drag: DragState::Idle,
            draggable: shape.is_draggable(),
            constraints: ConstraintChain::new(),
        };
        handle.capture_positions(shape.position());
        handle
    }

    pub fn shape_id(&self) -> ShapeId {
        self.shape_id
    }

    pub fn coordinates(&self) -> &Coordinates {
        &self.coords
    }

    pub fn coordinate(&self, anchor: Anchor) -> f64 {
        self.coords.get(anchor)
    }

    pub fn geometry(&self) -> Geometry {
        self.geometry
    }

    pub fn drag_state(&self) -> DragState {
        self.drag
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.drag, DragState::Dragging { .. })
    }

    pub fn is_draggable(&self) -> bool {
        self.draggable
    }

    /// Ids of the distribution candidates this handle takes part in.
    pub fn candidates(&self) -> &HashSet<CandidateId> {
        &self.candidates
    }

    pub(crate) fn candidates_mut(&mut self) -> &mut HashSet<CandidateId> {
        &mut self.candidates
    }

    pub(crate) fn set_drag_state(&mut self, drag: DragState) {
        self.drag = drag;
    }

    pub(crate) fn set_draggable(&mut self, draggable: bool) {
        self.draggable = draggable;
    }

    pub(crate) fn set_geometry(&mut self, geometry: Geometry) {
        self.geometry = geometry;
    }

    /// Capture coordinates for the shape sitting at `position`.
    ///
    /// Only the axis whose position component actually moved is recomputed.
    pub fn capture_positions(&mut self, position: Point) {
        let previous = self.captured;
        if previous.is_none_or(|p| p.x != position.x) {
            self.coords.set_horizontal(position.x, self.geometry);
        }
        if previous.is_none_or(|p| p.y != position.y) {
            self.coords.set_vertical(position.y, self.geometry);
        }
        self.captured = Some(position);
    }

    /// Recompute the horizontal triple from `x` regardless of change detection.
    pub fn capture_horizontal(&mut self, x: f64) {
        self.coords.set_horizontal(x, self.geometry);
        let y = self.captured.map_or(0.0, |p| p.y);
        self.captured = Some(Point::new(x, y));
    }

    /// Recompute the vertical triple from `y` regardless of change detection.
    pub fn capture_vertical(&mut self, y: f64) {
        self.coords.set_vertical(y, self.geometry);
        let x = self.captured.map_or(0.0, |p| p.x);
        self.captured = Some(Point::new(x, y));
    }

    /// Recompute all six coordinates from `position`.
    pub fn recapture(&mut self, position: Point) {
        self.captured = None;
        self.capture_positions(position);
    }
}
