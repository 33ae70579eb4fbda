//! Drag handling: snapping a proposed drag delta to matches.
//!
//! A drag takes the shape out of every index so it cannot match itself. Each
//! move searches from the provisional coordinates, rewrites the delta so the
//! winning anchor lands exactly on its match, then runs the shape's
//! constraint chain. Ending or cancelling the drag puts the shape back.

use crate::index::{
    AlignmentIndex, Anchor, DragState, Geometry, IndexError, IndexResult, MatchResult,
};
use crate::shapes::{Alignable, ShapeId};
use kurbo::{Point, Vec2};

/// Result of one drag move.
#[derive(Debug, Clone, PartialEq)]
pub struct DragOutcome {
    /// Delta from the drag start to apply to the shape.
    pub delta: Vec2,
    /// Shape position for `delta`.
    pub position: Point,
    pub matches: MatchResult,
    /// Whether a horizontal match moved the shape.
    pub snapped_x: bool,
    /// Whether a vertical match moved the shape.
    pub snapped_y: bool,
}

/// New near-edge coordinate for an axis, or `None` if nothing on it matched.
///
/// Alignment wins over distribution; within each, near edge then center then
/// far edge.
fn snap_near_edge(matches: &MatchResult, anchors: [Anchor; 3], extent: f64) -> Option<f64> {
    let [near, center, far] = anchors;
    let to_near = |anchor: Anchor| {
        if anchor == near {
            0.0
        } else if anchor == center {
            extent / 2.0
        } else {
            debug_assert_eq!(anchor, far);
            extent
        }
    };

    for anchor in anchors {
        if !matches.aligned(anchor).is_empty() {
            return Some(matches.position(anchor) - to_near(anchor));
        }
    }
    for anchor in anchors {
        if let Some(candidate) = matches.distribution_for(anchor).first() {
            return Some(candidate.point - to_near(anchor));
        }
    }
    None
}

impl AlignmentIndex {
    /// Take a shape out of the index and start tracking a drag from its
    /// current position.
    pub fn drag_start(&mut self, shape: &dyn Alignable) -> IndexResult<()> {
        let id = shape.id();
        let handle = self.handle_ref(id)?;
        if handle.is_dragging() {
            log::error!("Drag started twice for shape {}", id);
            return Err(IndexError::AlreadyDragging(id));
        }
        if !handle.is_draggable() {
            log::error!("Drag refused for non-draggable shape {}", id);
            return Err(IndexError::NotDraggable(id));
        }

        self.tear_down_distribution_for(id)?;
        self.remove_edges(id)?;
        let start = shape.position();
        let handle = self.handle_mut(id)?;
        handle.recapture(start);
        handle.set_drag_state(DragState::Dragging { start });
        log::debug!("Drag started for shape {} at {:?}", id, start);
        Ok(())
    }

    /// Snap a proposed delta (relative to the drag start) for a dragged shape.
    ///
    /// Matches are always computed. They only change the delta when snapping
    /// is enabled; the constraint chain runs either way.
    pub fn drag_move(&mut self, shape: &dyn Alignable, delta: Vec2) -> IndexResult<DragOutcome> {
        let id = shape.id();
        let start = self.drag_start_of(id)?;
        let tolerance = self.config().tolerance();
        let snap_enabled = self.config().snap_enabled();

        let handle = self.handle_mut(id)?;
        let mut position = start + delta;
        handle.capture_positions(position);
        let coords = *handle.coordinates();
        let geometry = handle.geometry();

        let matches = self.find_matches(id, &coords, tolerance);

        let mut snapped_x = false;
        let mut snapped_y = false;
        if snap_enabled {
            if let Some(left) = snap_near_edge(&matches, Anchor::HORIZONTAL, geometry.size.width) {
                position.x = left - geometry.offset.x;
                snapped_x = true;
            }
            if let Some(top) = snap_near_edge(&matches, Anchor::VERTICAL, geometry.size.height) {
                position.y = top - geometry.offset.y;
                snapped_y = true;
            }
        }

        let handle = self.handle_mut(id)?;
        if snapped_x || snapped_y {
            handle.recapture(position);
        }
        let snapped = position - start;
        let adjusted = handle.constraints.apply(snapped);
        if adjusted != snapped {
            position = start + adjusted;
            handle.recapture(position);
        }

        if self.config().guide_lines_enabled() && self.renderer_mut().is_some() {
            let guides = self.guides_for(&matches);
            if let Some(renderer) = self.renderer_mut() {
                renderer.show(&matches, &guides);
            }
        }

        log::trace!("Drag move for shape {}: {:?} -> {:?}", id, delta, adjusted);
        Ok(DragOutcome {
            delta: adjusted,
            position,
            matches,
            snapped_x,
            snapped_y,
        })
    }

    /// Finish a drag at the shape's current position and put it back in the index.
    ///
    /// Geometry and the draggable flag are re-read from the shape, since
    /// notifications about them were ignored while the drag ran.
    pub fn drag_end(&mut self, shape: &dyn Alignable) -> IndexResult<()> {
        let id = shape.id();
        self.drag_start_of(id)?;
        self.finish_drag(shape, shape.position())?;
        log::debug!("Drag ended for shape {} at {:?}", id, shape.position());
        Ok(())
    }

    /// Abandon a drag, putting the shape back where the drag started.
    ///
    /// Returns the start position so the host can move the shape back.
    pub fn drag_cancel(&mut self, shape: &dyn Alignable) -> IndexResult<Point> {
        let id = shape.id();
        let start = self.drag_start_of(id)?;
        self.finish_drag(shape, start)?;
        log::debug!("Drag cancelled for shape {}", id);
        Ok(start)
    }

    fn drag_start_of(&self, id: ShapeId) -> IndexResult<Point> {
        match self.handle_ref(id)?.drag_state() {
            DragState::Dragging { start } => Ok(start),
            DragState::Idle => {
                log::error!("Shape {} is not being dragged", id);
                Err(IndexError::NotDragging(id))
            }
        }
    }

    fn finish_drag(&mut self, shape: &dyn Alignable, position: Point) -> IndexResult<()> {
        let id = shape.id();
        let handle = self.handle_mut(id)?;
        handle.set_geometry(Geometry::of(shape));
        handle.set_draggable(shape.is_draggable());
        handle.recapture(position);
        handle.set_drag_state(DragState::Idle);

        self.insert_edges(id)?;
        self.rebuild_distribution_for(id)?;
        if let Some(renderer) = self.renderer_mut() {
            renderer.clear();
        }
        Ok(())
    }
}
