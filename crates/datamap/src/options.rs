use serde::{Deserialize, Serialize};

pub use datamap_render::{BoundaryStyle, EdgeStyle, LabelStyle, PointStyle};

/// Construction-time settings of a [`crate::DataMap`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataMapConfig {
    /// Data extent as `[min_x, max_x, min_y, max_y]`.
    pub bounds: [f64; 4],
    /// Source id under which text search results are stored.
    pub search_item_id: String,
    /// Source id that acts as the exclusive lasso selection.
    pub lasso_selection_item_id: String,
    /// Zoom steps subtracted from the fitted zoom level.
    pub zoom_padding: f64,
}

impl Default for DataMapConfig {
    fn default() -> Self {
        Self {
            bounds: [0.0, 1.0, 0.0, 1.0],
            search_item_id: "text-search".to_string(),
            lasso_selection_item_id: "lasso-selection".to_string(),
            zoom_padding: 0.5,
        }
    }
}

impl DataMapConfig {
    pub fn new(bounds: [f64; 4]) -> Self {
        Self {
            bounds,
            ..Default::default()
        }
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// Options for [`crate::DataMap::add_meta_data`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetaDataOptions {
    /// Metadata column matched by [`crate::DataMap::search`].
    pub search_field: Option<String>,
    /// Show `hover_text` as tooltips when that column exists.
    pub tooltips: bool,
}

impl Default for MetaDataOptions {
    fn default() -> Self {
        Self {
            search_field: None,
            tooltips: true,
        }
    }
}

impl MetaDataOptions {
    pub fn with_search_field(mut self, field: &str) -> Self {
        self.search_field = Some(field.to_string());
        self
    }
}
