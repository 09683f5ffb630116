use std::time::{Duration, Instant};

use thiserror::Error;

use datamap_core::IndexSet;

use crate::render_data::LayerDescriptor;
use crate::viewport::ViewState;

/// The GPU canvas that draws the layers. Layer compositing, picking and font
/// rasterization all live on the other side of this trait.
pub trait Renderer {
    /// Replace the drawn layers, back to front.
    fn update_layers(&mut self, layers: &[LayerDescriptor]);

    fn set_view_state(&mut self, view_state: &ViewState);

    /// Whether `font_family` can be used for text right now.
    fn is_font_available(&self, font_family: &str) -> bool;

    /// Enable or disable hover tooltips.
    fn set_tooltips_enabled(&mut self, _enabled: bool) {}
}

/// A histogram chart that mirrors the current selection.
pub trait HistogramSink: Send {
    /// Source id the histogram uses when it pushes its own selections.
    fn id(&self) -> &str;

    fn draw_with_selection(&mut self, selected: &IndexSet);

    fn clear_selection(&mut self, selected: &IndexSet);
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FontError {
    #[error("Font {family} did not load within {waited_ms}ms")]
    Timeout { family: String, waited_ms: u128 },
}

/// Polling budget for [`wait_for_font`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FontWait {
    pub max_wait: Duration,
    pub poll_interval: Duration,
}

impl Default for FontWait {
    fn default() -> Self {
        Self {
            max_wait: Duration::from_millis(500),
            poll_interval: Duration::from_millis(50),
        }
    }
}

/// Poll the renderer until `family` is available or the budget runs out.
pub fn wait_for_font<R: Renderer + ?Sized>(
    renderer: &R,
    family: &str,
    wait: FontWait,
) -> Result<(), FontError> {
    let start = Instant::now();
    loop {
        if renderer.is_font_available(family) {
            return Ok(());
        }
        let waited = start.elapsed();
        if waited >= wait.max_wait {
            return Err(FontError::Timeout {
                family: family.to_string(),
                waited_ms: waited.as_millis(),
            });
        }
        std::thread::sleep(wait.poll_interval.min(wait.max_wait - waited));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    struct FontAfter {
        remaining: Cell<u32>,
    }

    impl Renderer for FontAfter {
        fn update_layers(&mut self, _layers: &[LayerDescriptor]) {}
        fn set_view_state(&mut self, _view_state: &ViewState) {}
        fn is_font_available(&self, _font_family: &str) -> bool {
            let left = self.remaining.get();
            self.remaining.set(left.saturating_sub(1));
            left == 0
        }
    }

    fn quick() -> FontWait {
        FontWait {
            max_wait: Duration::from_millis(40),
            poll_interval: Duration::from_millis(5),
        }
    }

    #[test]
    fn test_font_available_after_polling() {
        let renderer = FontAfter {
            remaining: Cell::new(2),
        };
        assert!(wait_for_font(&renderer, "Roboto", quick()).is_ok());
    }

    #[test]
    fn test_font_timeout() {
        let renderer = FontAfter {
            remaining: Cell::new(u32::MAX),
        };
        let err = wait_for_font(&renderer, "Roboto", quick()).unwrap_err();
        assert!(matches!(err, FontError::Timeout { ref family, .. } if family == "Roboto"));
        assert!(err.to_string().contains("Roboto"));
    }
}
