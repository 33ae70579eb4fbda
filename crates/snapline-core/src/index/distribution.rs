//! Equal-spacing snap points derived from pairs of shapes.
//!
//! For two shapes A and B separated by a gap on one axis, a third shape keeps
//! the spacing even when it sits one gap before A, halfway between them, or
//! one gap after B. Those three points are stored as candidates, keyed by
//! their coordinate, and referenced from both participating handles.

use super::bucket::{BucketIndex, bucket_key};
use super::{AlignmentIndex, Anchor, IndexError, IndexResult};
use crate::shapes::ShapeId;
use std::collections::HashMap;
use std::fmt;

/// Stable identifier of a candidate in the [`DistributionIndex`] arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CandidateId(u64);

impl fmt::Display for CandidateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A point where a third shape would complete an evenly spaced run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DistributionCandidate {
    pub id: CandidateId,
    /// The participant that comes first along the axis.
    pub first: ShapeId,
    /// The participant that comes second along the axis.
    pub second: ShapeId,
    /// Coordinate the matching anchor of the third shape should land on.
    pub point: f64,
    pub kind: Anchor,
}

impl DistributionCandidate {
    /// Whether `id` is one of the two participants.
    pub fn involves(&self, id: ShapeId) -> bool {
        self.first == id || self.second == id
    }

    /// The participant that is not `id`.
    pub fn partner_of(&self, id: ShapeId) -> ShapeId {
        if self.first == id { self.second } else { self.first }
    }
}

/// Arena of candidates plus one bucket index per candidate kind.
#[derive(Debug, Default)]
pub struct DistributionIndex {
    candidates: HashMap<CandidateId, DistributionCandidate>,
    buckets: [BucketIndex<CandidateId>; 6],
    next_id: u64,
}

impl DistributionIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: CandidateId) -> Option<&DistributionCandidate> {
        self.candidates.get(&id)
    }

    /// Candidate ids of `kind` whose point rounds to the key of `coordinate`.
    pub fn lookup(&self, kind: Anchor, coordinate: f64) -> Option<&[CandidateId]> {
        self.buckets[kind.index()].lookup(coordinate)
    }

    /// Candidates of `kind` at `coordinate`, in insertion order.
    pub fn candidates_at(&self, kind: Anchor, coordinate: f64) -> Vec<&DistributionCandidate> {
        self.lookup(kind, coordinate)
            .unwrap_or_default()
            .iter()
            .filter_map(|id| self.candidates.get(id))
            .collect()
    }

    /// Sorted, de-duplicated keys of all `kind` candidates.
    pub fn points(&self, kind: Anchor) -> Vec<i64> {
        let mut keys: Vec<i64> = self.buckets[kind.index()].iter().map(|(k, _)| k).collect();
        keys.sort_unstable();
        keys
    }

    /// The bucket index holding candidates of `kind`.
    pub fn bucket_index(&self, kind: Anchor) -> &BucketIndex<CandidateId> {
        &self.buckets[kind.index()]
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    fn add(&mut self, first: ShapeId, second: ShapeId, point: f64, kind: Anchor) -> CandidateId {
        let id = CandidateId(self.next_id);
        self.next_id += 1;
        self.candidates.insert(
            id,
            DistributionCandidate {
                id,
                first,
                second,
                point,
                kind,
            },
        );
        self.buckets[kind.index()].insert(id, point);
        id
    }

    fn remove(&mut self, id: CandidateId) -> IndexResult<DistributionCandidate> {
        let candidate = self
            .candidates
            .remove(&id)
            .ok_or(IndexError::MissingCandidate(id))?;
        self.buckets[candidate.kind.index()].remove(id, candidate.point)?;
        Ok(candidate)
    }
}

/// Rounded extent of a handle on one axis.
#[derive(Debug, Clone, Copy)]
struct Span {
    near: f64,
    far: f64,
}

impl Span {
    fn new(near: f64, far: f64) -> Self {
        Self {
            near: bucket_key(near) as f64,
            far: bucket_key(far) as f64,
        }
    }
}

/// Spacing points for `subject` against `other`, or `None` if they overlap.
///
/// Returns whether `other` comes first, and the before/middle/after points.
fn spacing_points(subject: Span, other: Span) -> Option<(bool, [f64; 3])> {
    if other.far < subject.near {
        let gap = subject.near - other.far;
        Some((
            true,
            [
                other.near - gap,
                (other.far + gap / 2.0).round(),
                subject.far + gap,
            ],
        ))
    } else if other.near > subject.far {
        let gap = other.near - subject.far;
        Some((
            false,
            [
                subject.near - gap,
                (subject.far + gap / 2.0).round(),
                other.far + gap,
            ],
        ))
    } else {
        None
    }
}

impl AlignmentIndex {
    /// Create candidates between `id` and every other indexed shape.
    ///
    /// Shapes that are being dragged are out of the index and are skipped;
    /// they pick their candidates back up when the drag ends.
    pub(crate) fn rebuild_distribution_for(&mut self, id: ShapeId) -> IndexResult<()> {
        let subject = *self.handle_ref(id)?.coordinates();
        let subject_x = Span::new(subject.left, subject.right);
        let subject_y = Span::new(subject.top, subject.bottom);

        let mut pending: Vec<(ShapeId, ShapeId, f64, Anchor)> = Vec::new();
        for (other_id, other) in &self.handles {
            if *other_id == id || other.is_dragging() {
                continue;
            }
            let coords = other.coordinates();
            let axes = [
                (
                    subject_x,
                    Span::new(coords.left, coords.right),
                    Anchor::HORIZONTAL,
                ),
                (
                    subject_y,
                    Span::new(coords.top, coords.bottom),
                    Anchor::VERTICAL,
                ),
            ];
            for (subject_span, other_span, kinds) in axes {
                let Some((other_first, points)) = spacing_points(subject_span, other_span) else {
                    continue;
                };
                let (first, second) = if other_first {
                    (*other_id, id)
                } else {
                    (id, *other_id)
                };
                for (kind, point) in kinds.into_iter().zip(points) {
                    pending.push((first, second, point, kind));
                }
            }
        }

        for (first, second, point, kind) in pending {
            let candidate = self.distribution.add(first, second, point, kind);
            self.handle_mut(first)?.candidates_mut().insert(candidate);
            self.handle_mut(second)?.candidates_mut().insert(candidate);
        }
        log::trace!(
            "Rebuilt distribution for {} ({} candidates total)",
            id,
            self.distribution.len()
        );
        Ok(())
    }

    /// Remove every candidate `id` takes part in, from the arena, its bucket
    /// and the partner's candidate set.
    pub(crate) fn tear_down_distribution_for(&mut self, id: ShapeId) -> IndexResult<()> {
        let mut owned: Vec<CandidateId> = self.handle_mut(id)?.candidates_mut().drain().collect();
        owned.sort_unstable();

        for candidate_id in owned {
            let candidate = self.distribution.remove(candidate_id).inspect_err(|e| {
                log::error!("Failed to tear down candidate of shape {}: {}", id, e)
            })?;
            let partner = candidate.partner_of(id);
            self.handle_mut(partner)?
                .candidates_mut()
                .remove(&candidate_id);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes::{Alignable, Rectangle};
    use kurbo::Point;

    fn rect(x: f64, y: f64, w: f64, h: f64) -> Rectangle {
        Rectangle::new(Point::new(x, y), w, h)
    }

    #[test]
    fn test_spacing_points_before() {
        let subject = Span::new(50.0, 60.0);
        let other = Span::new(0.0, 10.0);
        let (other_first, points) = spacing_points(subject, other).unwrap();
        assert!(other_first);
        assert_eq!(points, [-40.0, 30.0, 100.0]);
    }

    #[test]
    fn test_spacing_points_after() {
        let subject = Span::new(0.0, 10.0);
        let other = Span::new(50.0, 60.0);
        let (other_first, points) = spacing_points(subject, other).unwrap();
        assert!(!other_first);
        assert_eq!(points, [-40.0, 30.0, 100.0]);
    }

    #[test]
    fn test_spacing_points_overlap_and_touching() {
        assert!(spacing_points(Span::new(0.0, 10.0), Span::new(5.0, 15.0)).is_none());
        // Touching edges leave no gap.
        assert!(spacing_points(Span::new(0.0, 10.0), Span::new(10.0, 20.0)).is_none());
    }

    #[test]
    fn test_center_point_rounds_half_away_from_zero() {
        // Gap of 45 from 10: midpoint 32.5 becomes 33.
        let (_, points) = spacing_points(Span::new(55.0, 60.0), Span::new(0.0, 10.0)).unwrap();
        assert_eq!(points[1], 33.0);
    }

    #[test]
    fn test_three_in_a_row_has_center_between_outer_pair() {
        let mut index = AlignmentIndex::default();
        let a = rect(0.0, 0.0, 10.0, 10.0);
        let b = rect(50.0, 0.0, 10.0, 10.0);
        let c = rect(100.0, 0.0, 10.0, 10.0);
        for r in [&a, &b, &c] {
            index.register_shape(r).unwrap();
        }

        let at_55 = index.distribution().candidates_at(Anchor::HCenter, 55.0);
        assert_eq!(at_55.len(), 1);
        assert_eq!((at_55[0].first, at_55[0].second), (a.id(), c.id()));
        assert_eq!(at_55[0].point, 55.0);

        // Right of the b-c pair, one gap past c.
        let at_150 = index.distribution().candidates_at(Anchor::Right, 150.0);
        assert_eq!(at_150.len(), 1);
        assert_eq!((at_150[0].first, at_150[0].second), (b.id(), c.id()));

        // Same y range: no vertical candidates at all.
        for kind in Anchor::VERTICAL {
            assert!(index.distribution().bucket_index(kind).is_empty());
        }
        // Three pairs, three horizontal candidates each.
        assert_eq!(index.distribution().len(), 9);
    }

    #[test]
    fn test_overlapping_on_x_only_produces_vertical() {
        let mut index = AlignmentIndex::default();
        let a = rect(0.0, 0.0, 20.0, 10.0);
        let b = rect(10.0, 40.0, 20.0, 10.0);
        index.register_shape(&a).unwrap();
        index.register_shape(&b).unwrap();

        for kind in Anchor::HORIZONTAL {
            assert!(index.distribution().bucket_index(kind).is_empty());
        }
        assert_eq!(index.distribution().points(Anchor::Top), vec![-30]);
        assert_eq!(index.distribution().points(Anchor::VCenter), vec![25]);
        assert_eq!(index.distribution().points(Anchor::Bottom), vec![80]);
    }

    #[test]
    fn test_candidates_registered_on_both_participants() {
        let mut index = AlignmentIndex::default();
        let a = rect(0.0, 0.0, 10.0, 10.0);
        let b = rect(30.0, 30.0, 10.0, 10.0);
        index.register_shape(&a).unwrap();
        index.register_shape(&b).unwrap();

        let on_a = index.handle(a.id()).unwrap().candidates().clone();
        let on_b = index.handle(b.id()).unwrap().candidates().clone();
        assert_eq!(on_a.len(), 6);
        assert_eq!(on_a, on_b);
        for id in &on_a {
            let candidate = index.distribution().get(*id).unwrap();
            assert!(candidate.involves(a.id()) && candidate.involves(b.id()));
            assert!(
                index
                    .distribution()
                    .lookup(candidate.kind, candidate.point)
                    .unwrap()
                    .contains(id)
            );
        }
    }

    #[test]
    fn test_teardown_is_symmetric() {
        let mut index = AlignmentIndex::default();
        let a = rect(0.0, 0.0, 10.0, 10.0);
        let b = rect(50.0, 0.0, 10.0, 10.0);
        let c = rect(100.0, 0.0, 10.0, 10.0);
        for r in [&a, &b, &c] {
            index.register_shape(r).unwrap();
        }

        index.tear_down_distribution_for(a.id()).unwrap();

        assert!(index.handle(a.id()).unwrap().candidates().is_empty());
        for other in [&b, &c] {
            for id in index.handle(other.id()).unwrap().candidates() {
                assert!(!index.distribution().get(*id).unwrap().involves(a.id()));
            }
        }
        // Only the b-c pair is left.
        assert_eq!(index.distribution().len(), 3);
        assert!(index.distribution().candidates_at(Anchor::HCenter, 55.0).is_empty());
        for kind in Anchor::ALL {
            for (_, bucket) in index.distribution().bucket_index(kind).iter() {
                assert!(!bucket.is_empty());
            }
        }
    }

    #[test]
    fn test_partner_of() {
        let a = rect(0.0, 0.0, 1.0, 1.0).id();
        let b = rect(0.0, 0.0, 1.0, 1.0).id();
        let candidate = DistributionCandidate {
            id: CandidateId(0),
            first: a,
            second: b,
            point: 0.0,
            kind: Anchor::Left,
        };
        assert_eq!(candidate.partner_of(a), b);
        assert_eq!(candidate.partner_of(b), a);
    }
}
