//! A layer of shapes with alignment snapping.
//!
//! The layer owns its shapes and keeps one [`AlignmentIndex`] in sync with
//! them: every mutation goes through the layer, which reports the dirty
//! anchors to the index.

use crate::config::SnapConfig;
use crate::drag::DragOutcome;
use crate::index::{AlignmentIndex, ChangedAnchors, IndexError};
use crate::shapes::{Alignable, Shape, ShapeId};
use kurbo::{Point, Vec2};
use std::collections::HashMap;
use thiserror::Error;

/// Errors from layer operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LayerError {
    #[error("Shape not found: {0}")]
    ShapeNotFound(ShapeId),
    #[error("No drag in progress")]
    NoActiveDrag,
    #[error("Shape {0} is already being dragged")]
    DragInProgress(ShapeId),
    #[error(transparent)]
    Index(#[from] IndexError),
}

/// Result type for layer operations.
pub type LayerResult<T> = Result<T, LayerError>;

/// Shapes of one layer plus their alignment index.
#[derive(Debug, Default)]
pub struct Layer {
    shapes: HashMap<ShapeId, Shape>,
    /// Z-order of shapes (back to front).
    z_order: Vec<ShapeId>,
    index: AlignmentIndex,
    /// Shape currently being dragged, if any. One drag at a time.
    active_drag: Option<ShapeId>,
}

impl Layer {
    pub fn new(config: SnapConfig) -> Self {
        Self {
            index: AlignmentIndex::new(config),
            ..Self::default()
        }
    }

    /// Add a shape and start tracking it.
    pub fn add_shape(&mut self, shape: impl Into<Shape>) -> LayerResult<ShapeId> {
        let shape = shape.into();
        let id = shape.id();
        self.index.register_shape(&shape)?;
        self.z_order.push(id);
        self.shapes.insert(id, shape);
        Ok(id)
    }

    /// Remove a shape, returning it.
    ///
    /// Removing the shape that is being dragged ends the drag without putting
    /// anything back in the index.
    pub fn remove_shape(&mut self, id: ShapeId) -> LayerResult<Shape> {
        if !self.shapes.contains_key(&id) {
            return Err(LayerError::ShapeNotFound(id));
        }
        self.index.unregister_shape(id)?;
        if self.active_drag == Some(id) {
            self.active_drag = None;
        }
        self.z_order.retain(|&shape_id| shape_id != id);
        self.shapes
            .remove(&id)
            .ok_or(LayerError::ShapeNotFound(id))
    }

    pub fn get_shape(&self, id: ShapeId) -> Option<&Shape> {
        self.shapes.get(&id)
    }

    /// Shapes in z-order (back to front).
    pub fn shapes(&self) -> impl Iterator<Item = &Shape> {
        self.z_order.iter().filter_map(|id| self.shapes.get(id))
    }

    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    pub fn index(&self) -> &AlignmentIndex {
        &self.index
    }

    /// Mutable access to the index, for installing renderers, constraints and config.
    pub fn index_mut(&mut self) -> &mut AlignmentIndex {
        &mut self.index
    }

    /// Shape currently being dragged.
    pub fn active_drag(&self) -> Option<ShapeId> {
        self.active_drag
    }

    /// Move a shape outside of a drag.
    pub fn move_shape_to(&mut self, id: ShapeId, position: Point) -> LayerResult<()> {
        self.update_shape(id, |shape| shape.set_position(position))
    }

    /// Resize a shape's bounding box.
    pub fn resize_shape(&mut self, id: ShapeId, width: f64, height: f64) -> LayerResult<()> {
        self.update_shape(id, |shape| shape.set_size(width, height))
    }

    pub fn set_draggable(&mut self, id: ShapeId, draggable: bool) -> LayerResult<()> {
        let shape = self
            .shapes
            .get_mut(&id)
            .ok_or(LayerError::ShapeNotFound(id))?;
        shape.set_draggable(draggable);
        self.index
            .on_attribute_changed(&*shape, ChangedAnchors::NONE)?;
        Ok(())
    }

    fn update_shape(&mut self, id: ShapeId, update: impl FnOnce(&mut Shape)) -> LayerResult<()> {
        let shape = self
            .shapes
            .get_mut(&id)
            .ok_or(LayerError::ShapeNotFound(id))?;
        let before = shape.bounds();
        update(shape);
        let changed = ChangedAnchors::between(before, shape.bounds());
        self.index.on_attribute_changed(&*shape, changed)?;
        Ok(())
    }

    /// Start dragging a shape.
    pub fn begin_drag(&mut self, id: ShapeId) -> LayerResult<()> {
        if let Some(active) = self.active_drag {
            return Err(LayerError::DragInProgress(active));
        }
        let shape = self.shapes.get(&id).ok_or(LayerError::ShapeNotFound(id))?;
        self.index.drag_start(shape)?;
        self.active_drag = Some(id);
        Ok(())
    }

    /// Drag the active shape by `delta` from where the drag started.
    ///
    /// The shape is moved to the snapped position.
    pub fn drag_by(&mut self, delta: Vec2) -> LayerResult<DragOutcome> {
        let id = self.active_drag.ok_or(LayerError::NoActiveDrag)?;
        let shape = self
            .shapes
            .get_mut(&id)
            .ok_or(LayerError::ShapeNotFound(id))?;
        let outcome = self.index.drag_move(&*shape, delta)?;
        shape.set_position(outcome.position);
        Ok(outcome)
    }

    /// Drop the active shape where it is.
    pub fn end_drag(&mut self) -> LayerResult<ShapeId> {
        let id = self.active_drag.ok_or(LayerError::NoActiveDrag)?;
        let shape = self.shapes.get(&id).ok_or(LayerError::ShapeNotFound(id))?;
        self.index.drag_end(shape)?;
        self.active_drag = None;
        Ok(id)
    }

    /// Abandon the active drag and move the shape back to its start.
    pub fn cancel_drag(&mut self) -> LayerResult<ShapeId> {
        let id = self.active_drag.ok_or(LayerError::NoActiveDrag)?;
        let shape = self
            .shapes
            .get_mut(&id)
            .ok_or(LayerError::ShapeNotFound(id))?;
        let start = self.index.drag_cancel(&*shape)?;
        shape.set_position(start);
        self.active_drag = None;
        Ok(id)
    }
}
