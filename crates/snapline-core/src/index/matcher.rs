//! Expanding-radius nearest match search.

use super::distribution::DistributionCandidate;
use super::handle::Coordinates;
use super::{AlignmentIndex, Anchor};
use crate::shapes::ShapeId;

/// What a search found for a dragged shape.
///
/// Horizontal and vertical anchors are resolved independently: all three
/// anchors of an axis share one offset, the smallest one at which anything
/// matched.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MatchResult {
    shape: Option<ShapeId>,
    positions: [f64; 6],
    aligned: [Vec<ShapeId>; 6],
    /// Indexed by candidate kind.
    distributed: [Vec<DistributionCandidate>; 6],
    horizontal_offset: i64,
    vertical_offset: i64,
}

impl MatchResult {
    /// The canonical empty result.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Whether anything matched on either axis.
    pub fn has_match(&self) -> bool {
        self.aligned.iter().any(|list| !list.is_empty())
            || self.distributed.iter().any(|list| !list.is_empty())
    }

    pub fn has_horizontal_match(&self) -> bool {
        Anchor::HORIZONTAL.iter().any(|a| {
            !self.aligned[a.index()].is_empty() || !self.distributed[a.index()].is_empty()
        })
    }

    pub fn has_vertical_match(&self) -> bool {
        Anchor::VERTICAL.iter().any(|a| {
            !self.aligned[a.index()].is_empty() || !self.distributed[a.index()].is_empty()
        })
    }

    /// The dragged shape this result was computed for.
    pub fn shape(&self) -> Option<ShapeId> {
        self.shape
    }

    /// Resolved coordinate of `anchor` (the searched coordinate plus the axis offset).
    pub fn position(&self, anchor: Anchor) -> f64 {
        self.positions[anchor.index()]
    }

    /// Shapes whose `anchor` lines up with the resolved position.
    pub fn aligned(&self, anchor: Anchor) -> &[ShapeId] {
        &self.aligned[anchor.index()]
    }

    /// Matched candidates of a given kind.
    pub fn distributed(&self, kind: Anchor) -> &[DistributionCandidate] {
        &self.distributed[kind.index()]
    }

    /// Candidates found through the coordinate of `anchor`.
    pub fn distribution_for(&self, anchor: Anchor) -> &[DistributionCandidate] {
        self.distributed(anchor.distribution_partner())
    }

    /// Offset applied to the horizontal coordinates; 0 when nothing matched.
    pub fn horizontal_offset(&self) -> i64 {
        self.horizontal_offset
    }

    /// Offset applied to the vertical coordinates; 0 when nothing matched.
    pub fn vertical_offset(&self) -> i64 {
        self.vertical_offset
    }
}

/// Lists found for one axis triple at one offset.
#[derive(Debug, Default)]
struct AxisHit {
    offset: i64,
    aligned: Vec<(Anchor, Vec<ShapeId>)>,
    distributed: Vec<(Anchor, Vec<DistributionCandidate>)>,
}

impl AlignmentIndex {
    /// Search outward from `coords` for alignment and distribution matches.
    ///
    /// For each axis the radius grows from 0 to `tolerance`. At each radius the
    /// positive offset is probed before the negative one; the first probe that
    /// finds anything resolves the whole axis. Entries belonging to `shape`
    /// itself are never reported.
    pub fn find_matches(
        &self,
        shape: ShapeId,
        coords: &Coordinates,
        tolerance: u32,
    ) -> MatchResult {
        let horizontal = self.search_axis(shape, Anchor::HORIZONTAL, coords, tolerance);
        let vertical = self.search_axis(shape, Anchor::VERTICAL, coords, tolerance);
        if horizontal.is_none() && vertical.is_none() {
            return MatchResult::empty();
        }

        let mut result = MatchResult {
            shape: Some(shape),
            ..MatchResult::default()
        };
        for (anchors, hit) in [(Anchor::HORIZONTAL, horizontal), (Anchor::VERTICAL, vertical)] {
            let offset = hit.as_ref().map_or(0, |h| h.offset);
            for anchor in anchors {
                result.positions[anchor.index()] = coords.get(anchor) + offset as f64;
            }
            if anchors[0].is_horizontal() {
                result.horizontal_offset = offset;
            } else {
                result.vertical_offset = offset;
            }
            if let Some(hit) = hit {
                for (anchor, ids) in hit.aligned {
                    result.aligned[anchor.index()] = ids;
                }
                for (kind, candidates) in hit.distributed {
                    result.distributed[kind.index()] = candidates;
                }
            }
        }
        log::trace!(
            "Matches for {}: h offset {}, v offset {}",
            shape,
            result.horizontal_offset,
            result.vertical_offset
        );
        result
    }

    fn search_axis(
        &self,
        shape: ShapeId,
        anchors: [Anchor; 3],
        coords: &Coordinates,
        tolerance: u32,
    ) -> Option<AxisHit> {
        for radius in 0..=i64::from(tolerance) {
            if let Some(hit) = self.probe(shape, anchors, coords, radius) {
                return Some(hit);
            }
            if radius > 0 {
                if let Some(hit) = self.probe(shape, anchors, coords, -radius) {
                    return Some(hit);
                }
            }
        }
        None
    }

    /// Look up all six indexes of an axis at `offset`.
    fn probe(
        &self,
        shape: ShapeId,
        anchors: [Anchor; 3],
        coords: &Coordinates,
        offset: i64,
    ) -> Option<AxisHit> {
        let mut hit = AxisHit {
            offset,
            ..AxisHit::default()
        };
        for anchor in anchors {
            let at = coords.get(anchor) + offset as f64;

            let ids: Vec<ShapeId> = self.edges[anchor.index()]
                .lookup(at)
                .unwrap_or_default()
                .iter()
                .copied()
                .filter(|id| *id != shape)
                .collect();
            if !ids.is_empty() {
                hit.aligned.push((anchor, ids));
            }

            let kind = anchor.distribution_partner();
            let candidates: Vec<DistributionCandidate> = self
                .distribution
                .candidates_at(kind, at)
                .into_iter()
                .filter(|c| !c.involves(shape))
                .copied()
                .collect();
            if !candidates.is_empty() {
                hit.distributed.push((kind, candidates));
            }
        }

        if hit.aligned.is_empty() && hit.distributed.is_empty() {
            None
        } else {
            Some(hit)
        }
    }
}
