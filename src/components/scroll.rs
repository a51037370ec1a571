//! Scroll-driven styling: navbar state and hero parallax
//!
//! One handler per concern. Both values are recomputed from the scroll
//! offset on every scroll event.

use crate::types::{Config, Viewport};

/// Whether the navbar carries its `scrolled` style at `offset_y`
pub fn navbar_scrolled(offset_y: f64, threshold: f64) -> bool {
    offset_y > threshold
}

/// Hero background offset, or `None` on viewports too narrow for parallax
pub fn parallax_offset(offset_y: f64, width_px: u32, rate: f64, min_width_px: u32) -> Option<f64> {
    (width_px > min_width_px).then(|| offset_y * rate)
}

#[derive(Debug, Clone, Default)]
pub struct ScrollEffects {
    navbar_scrolled: bool,
    hero_background_y: f64,
}

impl ScrollEffects {
    pub fn new() -> Self {
        Self::default()
    }

    /// React to a scroll (or a resize, which changes the parallax gate)
    pub fn update(&mut self, viewport: &Viewport, config: &Config) {
        let scrolled = navbar_scrolled(viewport.scroll_y, config.navbar_scroll_threshold_px);
        if scrolled != self.navbar_scrolled {
            tracing::debug!("Navbar scrolled: {}", scrolled);
        }
        self.navbar_scrolled = scrolled;

        // Narrow viewports keep whatever offset was last applied
        if let Some(offset) = parallax_offset(
            viewport.scroll_y,
            viewport.width_px,
            config.parallax_rate,
            config.parallax_min_width_px,
        ) {
            self.hero_background_y = offset;
        }
    }

    pub fn navbar_scrolled(&self) -> bool {
        self.navbar_scrolled
    }

    pub fn hero_background_y(&self) -> f64 {
        self.hero_background_y
    }
}
