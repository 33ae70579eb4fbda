//! Snapline Core Library
//!
//! Alignment and distribution snapping for shapes dragged on a 2D canvas.
//! Shapes register with an [`AlignmentIndex`]; while one is dragged, its
//! proposed moves are snapped to the edges and centers of the others and to
//! positions that space it evenly against pairs of them.

pub mod config;
pub mod constraint;
pub mod drag;
pub mod guides;
pub mod index;
pub mod layer;
pub mod shapes;

pub use config::{ConfigError, DEFAULT_TOLERANCE, GuideStyle, SerializableColor, SnapConfig};
pub use constraint::{
    AxisLock, ConstraintChain, DragConstraint, GRID_SIZE, GridConstraint, snap_to_grid,
};
pub use drag::DragOutcome;
pub use guides::{Guide, GuideRenderer};
pub use index::{
    AlignmentIndex, Anchor, Attribute, AxisHandle, ChangedAnchors, Coordinates,
    DistributionCandidate, DragState, IndexError, IndexResult, MatchResult,
};
pub use layer::{Layer, LayerError, LayerResult};
pub use shapes::{Alignable, Ellipse, Rectangle, Shape, ShapeId};
