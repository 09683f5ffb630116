//! # DataMap Renderer
//!
//! Turns highlight state into layer descriptors for the GPU canvas.
//! Handles highlight projection, chevron placement, layer ordering and
//! versioning, the initial camera, and the collaborator traits for the
//! renderer and histogram widgets.
//!
//! Layer descriptors are plain serializable values; the frontend canvas
//! consumes them as JSON.

pub mod viewport;
pub mod render_data;
pub mod chevron;
pub mod projector;
pub mod sync;
pub mod renderer;

pub use projector::{HighlightProjector, Projection};
pub use render_data::{
    BoundaryStyle, EdgeStyle, LabelStyle, LayerDescriptor, LayerProps, PointStyle, RenderFrame,
};
pub use renderer::{wait_for_font, FontError, FontWait, HistogramSink, Renderer};
pub use sync::LayerStack;
pub use viewport::{DataBounds, ViewError, ViewState, Viewport};
