//! Guide geometry for alignment and spacing matches.
//!
//! The index only computes where guides go. Drawing them is left to a
//! [`GuideRenderer`] installed by the host.

use crate::index::{AlignmentIndex, Anchor, Coordinates, DistributionCandidate, MatchResult};
use crate::shapes::ShapeId;
use kurbo::{BezPath, Line, Point, Rect};

/// Receives match results while a shape is dragged.
pub trait GuideRenderer {
    /// Show guides for the latest match. Called on every drag move, with an
    /// empty result and no guides when nothing matched.
    fn show(&mut self, matches: &MatchResult, guides: &[Guide]);

    /// Remove any guides currently shown.
    fn clear(&mut self);
}

/// A single guide to draw.
#[derive(Debug, Clone, PartialEq)]
pub enum Guide {
    /// A line through the aligned anchor of the dragged shape and its matches.
    Alignment { anchor: Anchor, line: Line },
    /// Two brackets marking the equal gaps of a distribution match.
    Spacing {
        kind: Anchor,
        brackets: [[Point; 4]; 2],
    },
}

impl Guide {
    /// Guide as a path in layer coordinates.
    pub fn to_path(&self) -> BezPath {
        let mut path = BezPath::new();
        match self {
            Guide::Alignment { line, .. } => {
                path.move_to(line.p0);
                path.line_to(line.p1);
            }
            Guide::Spacing { brackets, .. } => {
                for bracket in brackets {
                    path.move_to(bracket[0]);
                    for point in &bracket[1..] {
                        path.line_to(*point);
                    }
                }
            }
        }
        path
    }
}

fn rect_of(coords: &Coordinates) -> Rect {
    Rect::new(coords.left, coords.top, coords.right, coords.bottom)
}

impl AlignmentIndex {
    /// Guides for a match, using the current coordinates of every participant.
    ///
    /// Returns nothing for an empty match or when a participant is no longer
    /// registered.
    pub fn guides_for(&self, matches: &MatchResult) -> Vec<Guide> {
        let Some(shape) = matches.shape() else {
            return Vec::new();
        };
        let Some(dragged) = self.bounds_of(shape) else {
            return Vec::new();
        };

        let mut guides = Vec::new();
        for anchor in Anchor::ALL {
            if let Some(guide) = self.alignment_guide(matches, anchor, dragged) {
                guides.push(guide);
            }
        }
        for kind in Anchor::ALL {
            for candidate in matches.distributed(kind) {
                if let Some(guide) = self.spacing_guide(candidate, dragged) {
                    guides.push(guide);
                }
            }
        }
        guides
    }

    fn bounds_of(&self, id: ShapeId) -> Option<Rect> {
        self.handle(id).map(|h| rect_of(h.coordinates()))
    }

    fn alignment_guide(
        &self,
        matches: &MatchResult,
        anchor: Anchor,
        dragged: Rect,
    ) -> Option<Guide> {
        let aligned = matches.aligned(anchor);
        if aligned.is_empty() {
            return None;
        }
        let extent = aligned
            .iter()
            .filter_map(|id| self.bounds_of(*id))
            .fold(dragged, |acc, r| acc.union(r));
        let at = matches.position(anchor);
        let line = if anchor.is_horizontal() {
            Line::new((at, extent.y0), (at, extent.y1))
        } else {
            Line::new((extent.x0, at), (extent.x1, at))
        };
        Some(Guide::Alignment { anchor, line })
    }

    fn spacing_guide(&self, candidate: &DistributionCandidate, dragged: Rect) -> Option<Guide> {
        let first = self.bounds_of(candidate.first)?;
        let second = self.bounds_of(candidate.second)?;
        let style = self.config().guide_style();

        // Gaps run from the far edge of one box to the near edge of the next.
        let gaps = match candidate.kind {
            Anchor::Left | Anchor::Top => [(dragged, first), (first, second)],
            Anchor::HCenter | Anchor::VCenter => [(first, dragged), (dragged, second)],
            Anchor::Right | Anchor::Bottom => [(first, second), (second, dragged)],
        };

        let brackets = if candidate.kind.is_horizontal() {
            let base = dragged.y1.max(first.y1).max(second.y1) + style.margin;
            gaps.map(|(from, to)| {
                [
                    Point::new(from.x1, from.y1 + style.inset),
                    Point::new(from.x1, base),
                    Point::new(to.x0, base),
                    Point::new(to.x0, to.y1 + style.inset),
                ]
            })
        } else {
            let base = dragged.x1.max(first.x1).max(second.x1) + style.margin;
            gaps.map(|(from, to)| {
                [
                    Point::new(from.x1 + style.inset, from.y1),
                    Point::new(base, from.y1),
                    Point::new(base, to.y0),
                    Point::new(to.x1 + style.inset, to.y0),
                ]
            })
        };
        Some(Guide::Spacing {
            kind: candidate.kind,
            brackets,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes::{Alignable, Rectangle};

    fn rect(x: f64, y: f64, w: f64, h: f64) -> Rectangle {
        Rectangle::new(Point::new(x, y), w, h)
    }

    fn matches_for(index: &AlignmentIndex, shape: &Rectangle) -> MatchResult {
        let coords = *index.handle(shape.id()).unwrap().coordinates();
        index.find_matches(shape.id(), &coords, index.config().tolerance())
    }

    #[test]
    fn test_empty_match_has_no_guides() {
        let index = AlignmentIndex::default();
        assert!(index.guides_for(&MatchResult::empty()).is_empty());
    }

    #[test]
    fn test_alignment_guides_span_participants() {
        let mut index = AlignmentIndex::default();
        let a = rect(0.0, 0.0, 10.0, 10.0);
        let d = rect(2.0, 100.0, 10.0, 10.0);
        index.register_shape(&a).unwrap();
        index.register_shape(&d).unwrap();

        let matches = matches_for(&index, &d);
        assert_eq!(matches.horizontal_offset(), -2);
        let guides = index.guides_for(&matches);
        assert_eq!(guides.len(), 3);
        assert_eq!(
            guides[0],
            Guide::Alignment {
                anchor: Anchor::Left,
                line: Line::new((0.0, 0.0), (0.0, 110.0)),
            }
        );
        assert_eq!(
            guides[2],
            Guide::Alignment {
                anchor: Anchor::Right,
                line: Line::new((10.0, 0.0), (10.0, 110.0)),
            }
        );
    }

    #[test]
    fn test_spacing_brackets_after_pair() {
        let mut index = AlignmentIndex::default();
        let a = rect(0.0, 0.0, 10.0, 10.0);
        let b = rect(50.0, 0.0, 10.0, 10.0);
        let c = rect(99.0, 40.0, 10.0, 10.0);
        for r in [&a, &b, &c] {
            index.register_shape(r).unwrap();
        }

        let matches = matches_for(&index, &c);
        assert_eq!(matches.horizontal_offset(), 1);
        let guides = index.guides_for(&matches);
        assert_eq!(guides.len(), 1);
        assert_eq!(
            guides[0],
            Guide::Spacing {
                kind: Anchor::Right,
                brackets: [
                    [
                        Point::new(10.0, 15.0),
                        Point::new(10.0, 70.0),
                        Point::new(50.0, 70.0),
                        Point::new(50.0, 15.0),
                    ],
                    [
                        Point::new(60.0, 15.0),
                        Point::new(60.0, 70.0),
                        Point::new(99.0, 70.0),
                        Point::new(99.0, 55.0),
                    ],
                ],
            }
        );
    }

    #[test]
    fn test_vertical_spacing_brackets_sit_right_of_shapes() {
        let mut index = AlignmentIndex::default();
        let a = rect(0.0, 0.0, 10.0, 10.0);
        let b = rect(0.0, 30.0, 10.0, 10.0);
        let c = rect(300.0, 60.0, 10.0, 10.0);
        for r in [&a, &b, &c] {
            index.register_shape(r).unwrap();
        }

        let matches = matches_for(&index, &c);
        assert_eq!(matches.vertical_offset(), 0);
        let candidates = matches.distribution_for(Anchor::Top);
        assert_eq!(candidates.len(), 1);
        let guides = index.guides_for(&matches);
        let Guide::Spacing { kind, brackets } = &guides[0] else {
            panic!("expected a spacing guide, got {:?}", guides[0]);
        };
        assert_eq!(*kind, Anchor::Bottom);
        assert_eq!(brackets[0][0], Point::new(15.0, 10.0));
        assert_eq!(brackets[0][1], Point::new(330.0, 10.0));
        assert_eq!(brackets[1][3], Point::new(315.0, 60.0));
    }

    #[test]
    fn test_to_path() {
        let guide = Guide::Alignment {
            anchor: Anchor::Top,
            line: Line::new((0.0, 5.0), (20.0, 5.0)),
        };
        assert_eq!(guide.to_path().elements().len(), 2);

        let spacing = Guide::Spacing {
            kind: Anchor::HCenter,
            brackets: [[Point::ZERO; 4]; 2],
        };
        assert_eq!(spacing.to_path().elements().len(), 8);
    }
}
