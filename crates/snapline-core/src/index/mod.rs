//! Alignment index over the edges and centers of registered shapes.
//!
//! Every registered shape gets an [`AxisHandle`] holding its six alignment
//! coordinates. Each coordinate is bucketed by its rounded value in one of six
//! [`BucketIndex`]es, and pairs of non-overlapping shapes contribute
//! [`DistributionCandidate`]s: points where a third shape would sit at equal
//! spacing. While a shape is dragged it is pulled out of all twelve indexes and
//! [`AlignmentIndex::find_matches`] searches outward from its provisional
//! coordinates.

mod bucket;
mod distribution;
mod handle;
mod matcher;

pub use bucket::{BucketIndex, bucket_key};
pub use distribution::{CandidateId, DistributionCandidate, DistributionIndex};
pub use handle::{AxisHandle, Coordinates, DragState, Geometry};
pub use matcher::MatchResult;

use crate::config::SnapConfig;
use crate::constraint::ConstraintChain;
use crate::guides::GuideRenderer;
use crate::shapes::{Alignable, ShapeId};
use indexmap::IndexMap;
use kurbo::Rect;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Index maintenance errors.
///
/// These are invariant violations: the host and the index disagree about
/// where a shape is or what state it is in. The index never recovers from them
/// on its own.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IndexError {
    #[error("No bucket at key {key}")]
    MissingBucket { key: i64 },
    #[error("Entry not found in bucket at key {key}")]
    MissingEntry { key: i64 },
    #[error("Shape not registered: {0}")]
    UnknownShape(ShapeId),
    #[error("Shape already registered: {0}")]
    AlreadyRegistered(ShapeId),
    #[error("Shape is not being dragged: {0}")]
    NotDragging(ShapeId),
    #[error("Shape is already being dragged: {0}")]
    AlreadyDragging(ShapeId),
    #[error("Shape is not draggable: {0}")]
    NotDraggable(ShapeId),
    #[error("Distribution candidate not found: {0}")]
    MissingCandidate(CandidateId),
}

/// Result type for index operations.
pub type IndexResult<T> = Result<T, IndexError>;

/// One of the six alignment lines of a bounding box.
///
/// Also names the kind of a distribution candidate: a `Left` candidate sits
/// left of the pair it was derived from, a `HCenter` candidate between them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Anchor {
    Left,
    HCenter,
    Right,
    Top,
    VCenter,
    Bottom,
}

impl Anchor {
    pub const ALL: [Anchor; 6] = [
        Anchor::Left,
        Anchor::HCenter,
        Anchor::Right,
        Anchor::Top,
        Anchor::VCenter,
        Anchor::Bottom,
    ];

    pub const HORIZONTAL: [Anchor; 3] = [Anchor::Left, Anchor::HCenter, Anchor::Right];

    pub const VERTICAL: [Anchor; 3] = [Anchor::Top, Anchor::VCenter, Anchor::Bottom];

    /// Position in [`Anchor::ALL`].
    pub fn index(self) -> usize {
        self as usize
    }

    /// Whether this anchor is an x coordinate.
    pub fn is_horizontal(self) -> bool {
        matches!(self, Anchor::Left | Anchor::HCenter | Anchor::Right)
    }

    /// Distribution kind whose points this anchor's coordinate is matched against.
    ///
    /// A dragged left edge lands on the point of a `Right` candidate (the slot
    /// right of a pair), a dragged right edge on a `Left` candidate.
    pub fn distribution_partner(self) -> Anchor {
        match self {
            Anchor::Left => Anchor::Right,
            Anchor::HCenter => Anchor::HCenter,
            Anchor::Right => Anchor::Left,
            Anchor::Top => Anchor::Bottom,
            Anchor::VCenter => Anchor::VCenter,
            Anchor::Bottom => Anchor::Top,
        }
    }

    /// Value of this anchor on a rectangle.
    pub fn of_rect(self, rect: Rect) -> f64 {
        match self {
            Anchor::Left => rect.x0,
            Anchor::HCenter => (rect.x0 + rect.x1) / 2.0,
            Anchor::Right => rect.x1,
            Anchor::Top => rect.y0,
            Anchor::VCenter => (rect.y0 + rect.y1) / 2.0,
            Anchor::Bottom => rect.y1,
        }
    }
}

/// Shape attributes a host can report as changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Attribute {
    X,
    Y,
    Width,
    Height,
    Draggable,
}

/// Set of anchors whose coordinates are dirty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ChangedAnchors {
    flags: [bool; 6],
}

impl ChangedAnchors {
    pub const NONE: ChangedAnchors = ChangedAnchors { flags: [false; 6] };

    pub const ALL: ChangedAnchors = ChangedAnchors { flags: [true; 6] };

    /// Add `anchor` to the set.
    pub fn with(mut self, anchor: Anchor) -> Self {
        self.flags[anchor.index()] = true;
        self
    }

    pub fn contains(&self, anchor: Anchor) -> bool {
        self.flags[anchor.index()]
    }

    pub fn is_empty(&self) -> bool {
        !self.flags.iter().any(|f| *f)
    }

    pub fn any_horizontal(&self) -> bool {
        Anchor::HORIZONTAL.iter().any(|a| self.contains(*a))
    }

    pub fn any_vertical(&self) -> bool {
        Anchor::VERTICAL.iter().any(|a| self.contains(*a))
    }

    /// Dirty anchors for attribute changes on a shape positioned by its
    /// top-left corner (moving x shifts the whole triple, resizing leaves the
    /// near edge in place).
    pub fn from_attributes(attributes: &[Attribute]) -> Self {
        attributes
            .iter()
            .fold(Self::NONE, |set, attribute| match attribute {
                Attribute::X => set
                    .with(Anchor::Left)
                    .with(Anchor::HCenter)
                    .with(Anchor::Right),
                Attribute::Y => set
                    .with(Anchor::Top)
                    .with(Anchor::VCenter)
                    .with(Anchor::Bottom),
                Attribute::Width => set.with(Anchor::HCenter).with(Anchor::Right),
                Attribute::Height => set.with(Anchor::VCenter).with(Anchor::Bottom),
                Attribute::Draggable => set,
            })
    }

    /// Anchors whose value differs between two bounding boxes.
    pub fn between(old: Rect, new: Rect) -> Self {
        Anchor::ALL.iter().fold(Self::NONE, |set, anchor| {
            if anchor.of_rect(old) != anchor.of_rect(new) {
                set.with(*anchor)
            } else {
                set
            }
        })
    }
}

/// Alignment and distribution index for the shapes of one layer.
pub struct AlignmentIndex {
    /// Tracked handles in registration order.
    handles: IndexMap<ShapeId, AxisHandle>,
    /// One bucket index per anchor, in [`Anchor::ALL`] order.
    edges: [BucketIndex<ShapeId>; 6],
    distribution: DistributionIndex,
    config: SnapConfig,
    renderer: Option<Box<dyn GuideRenderer>>,
}

impl fmt::Debug for AlignmentIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AlignmentIndex")
            .field("handles", &self.handles.len())
            .field("candidates", &self.distribution.len())
            .field("config", &self.config)
            .field("renderer", &self.renderer.is_some())
            .finish()
    }
}

impl Default for AlignmentIndex {
    fn default() -> Self {
        Self::new(SnapConfig::default())
    }
}

impl AlignmentIndex {
    /// Create an empty index.
    pub fn new(config: SnapConfig) -> Self {
        Self {
            handles: IndexMap::new(),
            edges: Default::default(),
            distribution: DistributionIndex::new(),
            config,
            renderer: None,
        }
    }

    pub fn config(&self) -> &SnapConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut SnapConfig {
        &mut self.config
    }

    /// Install the sink that receives match results and guides during drags.
    pub fn set_renderer(&mut self, renderer: Box<dyn GuideRenderer>) {
        self.renderer = Some(renderer);
    }

    /// Remove the guide renderer, returning it.
    pub fn take_renderer(&mut self) -> Option<Box<dyn GuideRenderer>> {
        self.renderer.take()
    }

    /// Replace the drag constraints applied after snapping for a shape.
    pub fn set_constraints(&mut self, id: ShapeId, chain: ConstraintChain) -> IndexResult<()> {
        let handle = self.handle_mut(id)?;
        handle.constraints = chain;
        Ok(())
    }

    /// Number of registered shapes.
    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    pub fn handle(&self, id: ShapeId) -> Option<&AxisHandle> {
        self.handles.get(&id)
    }

    /// Registered handles in registration order.
    pub fn handles(&self) -> impl Iterator<Item = &AxisHandle> {
        self.handles.values()
    }

    pub fn contains(&self, id: ShapeId) -> bool {
        self.handles.contains_key(&id)
    }

    /// Whether the shape currently appears in any edge bucket.
    pub fn is_indexed(&self, id: ShapeId) -> bool {
        self.edges.iter().any(|index| index.contains_anywhere(id))
    }

    /// The bucket index for one anchor.
    pub fn edge_index(&self, anchor: Anchor) -> &BucketIndex<ShapeId> {
        &self.edges[anchor.index()]
    }

    /// Shapes whose `anchor` coordinate rounds to the same key as `coordinate`.
    pub fn aligned_at(&self, anchor: Anchor, coordinate: f64) -> &[ShapeId] {
        self.edges[anchor.index()]
            .lookup(coordinate)
            .unwrap_or_default()
    }

    pub fn distribution(&self) -> &DistributionIndex {
        &self.distribution
    }

    /// Start tracking a shape.
    pub fn register_shape(&mut self, shape: &dyn Alignable) -> IndexResult<()> {
        let id = shape.id();
        if self.handles.contains_key(&id) {
            log::error!("Shape {} registered twice", id);
            return Err(IndexError::AlreadyRegistered(id));
        }

        self.handles.insert(id, AxisHandle::new(shape));
        self.insert_edges(id)?;
        self.rebuild_distribution_for(id)?;
        log::debug!("Registered shape {} ({} tracked)", id, self.handles.len());
        Ok(())
    }

    /// Stop tracking a shape.
    ///
    /// Distribution candidates are torn down before the edge entries go. A
    /// shape that is mid-drag has no edge entries to remove.
    pub fn unregister_shape(&mut self, id: ShapeId) -> IndexResult<()> {
        let dragging = self.handle_ref(id)?.is_dragging();

        self.tear_down_distribution_for(id)?;
        if dragging {
            log::warn!("Unregistering shape {} while it is being dragged", id);
            if let Some(renderer) = self.renderer.as_mut() {
                renderer.clear();
            }
        } else {
            self.remove_edges(id)?;
        }
        self.handles.shift_remove(&id);
        log::debug!("Unregistered shape {} ({} tracked)", id, self.handles.len());
        Ok(())
    }

    /// Re-derive the dirty anchors of a shape after the host changed it.
    ///
    /// Notifications for a shape that is being dragged are ignored; the drag
    /// owns its coordinates until it ends. Anchors that were not flagged but
    /// whose bucket moved anyway are re-indexed too so the buckets stay
    /// consistent with the handle.
    pub fn on_attribute_changed(
        &mut self,
        shape: &dyn Alignable,
        changed: ChangedAnchors,
    ) -> IndexResult<()> {
        let id = shape.id();
        let handle = self.handle_mut(id)?;
        if handle.is_dragging() {
            log::trace!("Ignoring attribute change for dragged shape {}", id);
            return Ok(());
        }
        handle.set_draggable(shape.is_draggable());
        if changed.is_empty() {
            return Ok(());
        }

        let before = *handle.coordinates();
        let position = shape.position();
        handle.set_geometry(Geometry::of(shape));
        if changed.any_horizontal() {
            handle.capture_horizontal(position.x);
        }
        if changed.any_vertical() {
            handle.capture_vertical(position.y);
        }
        let after = *handle.coordinates();

        self.tear_down_distribution_for(id)?;
        for anchor in Anchor::ALL {
            let old = before.get(anchor);
            let new = after.get(anchor);
            let moved = bucket_key(old) != bucket_key(new);
            if moved && !changed.contains(anchor) {
                log::warn!("{:?} of shape {} moved without being flagged", anchor, id);
            }
            if moved || changed.contains(anchor) {
                let index = &mut self.edges[anchor.index()];
                index.remove(id, old).inspect_err(|e| {
                    log::error!("Failed to re-index {:?} of shape {}: {}", anchor, id, e)
                })?;
                index.insert(id, new);
            }
        }
        self.rebuild_distribution_for(id)
    }

    pub(crate) fn handle_ref(&self, id: ShapeId) -> IndexResult<&AxisHandle> {
        self.handles.get(&id).ok_or(IndexError::UnknownShape(id))
    }

    pub(crate) fn handle_mut(&mut self, id: ShapeId) -> IndexResult<&mut AxisHandle> {
        self.handles
            .get_mut(&id)
            .ok_or(IndexError::UnknownShape(id))
    }

    pub(crate) fn renderer_mut(&mut self) -> Option<&mut (dyn GuideRenderer + 'static)> {
        self.renderer.as_deref_mut()
    }

    /// Insert the handle at its current coordinates into all six edge indexes.
    pub(crate) fn insert_edges(&mut self, id: ShapeId) -> IndexResult<()> {
        let coords = *self.handle_ref(id)?.coordinates();
        for anchor in Anchor::ALL {
            self.edges[anchor.index()].insert(id, coords.get(anchor));
        }
        Ok(())
    }

    /// Remove the handle from all six edge indexes at its recorded coordinates.
    pub(crate) fn remove_edges(&mut self, id: ShapeId) -> IndexResult<()> {
        let coords = *self.handle_ref(id)?.coordinates();
        for anchor in Anchor::ALL {
            self.edges[anchor.index()]
                .remove(id, coords.get(anchor))
                .inspect_err(|e| {
                    log::error!("Failed to remove {:?} of shape {}: {}", anchor, id, e)
                })?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes::Rectangle;
    use kurbo::Point;

    fn rect(x: f64, y: f64, w: f64, h: f64) -> Rectangle {
        Rectangle::new(Point::new(x, y), w, h)
    }

    fn assert_buckets_non_empty(index: &AlignmentIndex) {
        for anchor in Anchor::ALL {
            for (_, bucket) in index.edge_index(anchor).iter() {
                assert!(!bucket.is_empty());
            }
        }
    }

    #[test]
    fn test_register_indexes_all_anchors() {
        let mut index = AlignmentIndex::default();
        let r = rect(10.0, 20.0, 30.0, 40.0);
        index.register_shape(&r).unwrap();

        assert_eq!(index.aligned_at(Anchor::Left, 10.0), &[r.id()]);
        assert_eq!(index.aligned_at(Anchor::HCenter, 25.0), &[r.id()]);
        assert_eq!(index.aligned_at(Anchor::Right, 40.0), &[r.id()]);
        assert_eq!(index.aligned_at(Anchor::Top, 20.0), &[r.id()]);
        assert_eq!(index.aligned_at(Anchor::VCenter, 40.0), &[r.id()]);
        assert_eq!(index.aligned_at(Anchor::Bottom, 60.0), &[r.id()]);
        assert!(index.is_indexed(r.id()));
    }

    #[test]
    fn test_register_twice_is_error() {
        let mut index = AlignmentIndex::default();
        let r = rect(0.0, 0.0, 10.0, 10.0);
        index.register_shape(&r).unwrap();
        assert_eq!(
            index.register_shape(&r),
            Err(IndexError::AlreadyRegistered(r.id()))
        );
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn test_unregister_removes_everything() {
        let mut index = AlignmentIndex::default();
        let a = rect(0.0, 0.0, 10.0, 10.0);
        let b = rect(50.0, 50.0, 10.0, 10.0);
        index.register_shape(&a).unwrap();
        index.register_shape(&b).unwrap();
        assert!(!index.distribution().is_empty());

        index.unregister_shape(b.id()).unwrap();
        assert!(!index.contains(b.id()));
        assert!(!index.is_indexed(b.id()));
        assert!(index.distribution().is_empty());
        assert!(index.handle(a.id()).unwrap().candidates().is_empty());
        assert_buckets_non_empty(&index);
    }

    #[test]
    fn test_unregister_unknown_is_error() {
        let mut index = AlignmentIndex::default();
        let r = rect(0.0, 0.0, 1.0, 1.0);
        assert_eq!(
            index.unregister_shape(r.id()),
            Err(IndexError::UnknownShape(r.id()))
        );
    }

    #[test]
    fn test_attribute_change_reindexes_moved_anchors() {
        let mut index = AlignmentIndex::default();
        let mut r = rect(0.0, 0.0, 10.0, 10.0);
        index.register_shape(&r).unwrap();

        r.position.x = 20.0;
        index
            .on_attribute_changed(&r, ChangedAnchors::from_attributes(&[Attribute::X]))
            .unwrap();

        assert!(index.aligned_at(Anchor::Left, 0.0).is_empty());
        assert_eq!(index.aligned_at(Anchor::Left, 20.0), &[r.id()]);
        assert_eq!(index.aligned_at(Anchor::Right, 30.0), &[r.id()]);
        // Vertical entries untouched.
        assert_eq!(index.aligned_at(Anchor::Top, 0.0), &[r.id()]);
        assert_buckets_non_empty(&index);
    }

    #[test]
    fn test_attribute_change_vertical_uses_vertical_capture() {
        let mut index = AlignmentIndex::default();
        let mut r = rect(0.0, 0.0, 10.0, 10.0);
        index.register_shape(&r).unwrap();

        r.height = 30.0;
        index
            .on_attribute_changed(&r, ChangedAnchors::from_attributes(&[Attribute::Height]))
            .unwrap();

        assert_eq!(index.aligned_at(Anchor::Bottom, 30.0), &[r.id()]);
        assert_eq!(index.aligned_at(Anchor::VCenter, 15.0), &[r.id()]);
        assert!(index.aligned_at(Anchor::Bottom, 10.0).is_empty());
        // Horizontal triple stays where it was.
        assert_eq!(index.aligned_at(Anchor::Right, 10.0), &[r.id()]);
    }

    #[test]
    fn test_attribute_change_rebuilds_distribution() {
        let mut index = AlignmentIndex::default();
        let a = rect(0.0, 0.0, 10.0, 10.0);
        let mut b = rect(50.0, 0.0, 10.0, 10.0);
        index.register_shape(&a).unwrap();
        index.register_shape(&b).unwrap();
        assert_eq!(index.distribution().points(Anchor::HCenter), vec![30]);

        b.position.x = 70.0;
        index
            .on_attribute_changed(&b, ChangedAnchors::from_attributes(&[Attribute::X]))
            .unwrap();
        assert_eq!(index.distribution().points(Anchor::HCenter), vec![40]);
    }

    #[test]
    fn test_unflagged_moved_anchor_is_reindexed() {
        let mut index = AlignmentIndex::default();
        let mut r = rect(0.0, 0.0, 10.0, 10.0);
        index.register_shape(&r).unwrap();

        // Host moved x and resized but only reported the resize.
        r.position.x = 5.0;
        r.width = 20.0;
        index
            .on_attribute_changed(&r, ChangedAnchors::from_attributes(&[Attribute::Width]))
            .unwrap();
        assert_eq!(index.aligned_at(Anchor::Left, 5.0), &[r.id()]);
        assert_eq!(index.aligned_at(Anchor::Right, 25.0), &[r.id()]);
        assert!(index.aligned_at(Anchor::Left, 0.0).is_empty());
    }

    #[test]
    fn test_changed_anchors_between() {
        let old = Rect::new(0.0, 0.0, 10.0, 10.0);
        let new = Rect::new(0.0, 0.0, 20.0, 10.0);
        let changed = ChangedAnchors::between(old, new);
        assert!(!changed.contains(Anchor::Left));
        assert!(changed.contains(Anchor::HCenter));
        assert!(changed.contains(Anchor::Right));
        assert!(!changed.any_vertical());
    }

    #[test]
    fn test_draggable_attribute_dirties_nothing() {
        assert!(ChangedAnchors::from_attributes(&[Attribute::Draggable]).is_empty());
        let all = ChangedAnchors::from_attributes(&[Attribute::X, Attribute::Y]);
        assert_eq!(all, ChangedAnchors::ALL);
    }

    #[test]
    fn test_distribution_partner_is_cross_wired() {
        assert_eq!(Anchor::Left.distribution_partner(), Anchor::Right);
        assert_eq!(Anchor::Right.distribution_partner(), Anchor::Left);
        assert_eq!(Anchor::HCenter.distribution_partner(), Anchor::HCenter);
        assert_eq!(Anchor::Top.distribution_partner(), Anchor::Bottom);
        assert_eq!(Anchor::Bottom.distribution_partner(), Anchor::Top);
    }
}
