//! # DataMap
//!
//! Interactive map of points, edges, labels and cluster boundaries. Several
//! widgets (lasso, text search, histograms, other tools) each hold their own
//! selection; the map merges them and re-highlights every layer after each
//! change.
//!
//! [`DataMap`] is the single-threaded facade; [`SharedDataMap`] wraps it for
//! widgets that live on other threads.

pub mod error;
pub mod map;
pub mod options;
pub mod shared;

pub use error::DataMapError;
pub use map::DataMap;
pub use options::{
    BoundaryStyle, DataMapConfig, EdgeStyle, LabelStyle, MetaDataOptions, PointStyle,
};
pub use shared::SharedDataMap;

pub use datamap_core::{
    Boundary, DataPoint, Edge, HighlightTier, IndexSet, Label, MergedSelection, MetaData, Point,
    PointIndex, Rgba,
};
pub use datamap_render::{
    HistogramSink, LayerDescriptor, RenderFrame, Renderer, ViewState, Viewport,
};
