//! Busy spinner for in-flight submissions

use std::time::Instant;

/// Spinner animation styles
#[derive(Debug, Clone, Copy)]
pub enum SpinnerStyle {
    /// Braille dots: ⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏
    Dots,
}

impl SpinnerStyle {
    fn frames(&self) -> &'static [&'static str] {
        match self {
            Self::Dots => &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"],
        }
    }

    /// Frame to show `elapsed_ms` into the animation
    pub fn frame_at(&self, elapsed_ms: u128) -> &'static str {
        let frames = self.frames();
        let idx = (elapsed_ms / 80) as usize % frames.len();
        frames[idx]
    }

    pub fn current_frame(&self, start_time: Instant) -> &'static str {
        self.frame_at(start_time.elapsed().as_millis())
    }
}
