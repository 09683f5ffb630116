use serde::{Deserialize, Serialize};
use thiserror::Error;

use datamap_core::geometry::Point;

/// Construction-time view errors. These are the only fail-fast errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ViewError {
    #[error("Viewport must have a positive size, got {width}x{height}")]
    InvalidViewport { width: f64, height: f64 },

    #[error("Invalid data bounds [{min_x}, {max_x}, {min_y}, {max_y}]")]
    InvalidBounds {
        min_x: f64,
        max_x: f64,
        min_y: f64,
        max_y: f64,
    },
}

/// Extent of the data in map coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DataBounds {
    pub min_x: f64,
    pub max_x: f64,
    pub min_y: f64,
    pub max_y: f64,
}

impl DataBounds {
    /// Bounds in `[min_x, max_x, min_y, max_y]` order.
    pub fn from_array(bounds: [f64; 4]) -> Result<Self, ViewError> {
        let [min_x, max_x, min_y, max_y] = bounds;
        let valid = bounds.iter().all(|v| v.is_finite()) && max_x > min_x && max_y > min_y;
        if !valid {
            return Err(ViewError::InvalidBounds {
                min_x,
                max_x,
                min_y,
                max_y,
            });
        }
        Ok(Self {
            min_x,
            max_x,
            min_y,
            max_y,
        })
    }

    pub fn center(&self) -> Point {
        Point::new(
            (self.min_x + self.max_x) / 2.0,
            (self.min_y + self.max_y) / 2.0,
        )
    }
}

/// Camera state handed to the renderer (web-mercator style).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewState {
    pub longitude: f64,
    pub latitude: f64,
    pub zoom: f64,
}

/// Size of the canvas the map is drawn into.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    /// Canvas width in pixels.
    pub canvas_width: f64,
    /// Canvas height in pixels.
    pub canvas_height: f64,
}

impl Viewport {
    pub fn new(canvas_width: f64, canvas_height: f64) -> Result<Self, ViewError> {
        let valid = canvas_width.is_finite()
            && canvas_height.is_finite()
            && canvas_width > 0.0
            && canvas_height > 0.0;
        if !valid {
            return Err(ViewError::InvalidViewport {
                width: canvas_width,
                height: canvas_height,
            });
        }
        Ok(Self {
            canvas_width,
            canvas_height,
        })
    }

    /// Zoom level that fits `bounds` into the canvas, less `padding` zoom steps.
    pub fn fit_zoom(&self, bounds: &DataBounds, padding: f64) -> f64 {
        let lng_range = bounds.max_x - bounds.min_x;
        let lat_range = bounds.max_y - bounds.min_y;

        let zoom_x = (360.0 / (lng_range / (self.canvas_width / 256.0))).log2();
        let zoom_y = (180.0 / (lat_range / (self.canvas_height / 256.0))).log2();

        zoom_x.min(zoom_y) - padding
    }

    /// Initial camera centered on `bounds`.
    pub fn initial_view_state(&self, bounds: &DataBounds, padding: f64) -> ViewState {
        let center = bounds.center();
        ViewState {
            longitude: center.x,
            latitude: center.y,
            zoom: self.fit_zoom(bounds, padding),
        }
    }
}
