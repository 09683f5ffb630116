//! # DataMap Core
//!
//! Point/edge/label data model, the per-point connection index, and the
//! multi-source selection store that merges lasso, search and programmatic
//! selections into a single highlight state.
//!
//! Nothing in this crate talks to a renderer; it produces plain arrays that
//! `datamap-render` turns into layer descriptors.

pub mod geometry;
pub mod data;
pub mod connection;
pub mod selection;
pub mod highlight;
pub mod layer;
pub mod spatial;

pub use connection::{Connection, ConnectionIndex};
pub use data::{Boundary, DataPoint, Edge, EdgeIndex, Label, MetaData, PointIndex};
pub use geometry::{BBox, Point, Rgba};
pub use highlight::{HighlightArrays, HighlightTier};
pub use layer::{LayerKind, LAYER_ORDER};
pub use selection::{IndexSet, MergeMode, MergedSelection, SelectionSource, SelectionStore};
pub use spatial::SpatialIndex;
