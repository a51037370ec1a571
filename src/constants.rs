//! Page-wide constants
//!
//! These are the defaults baked into [`crate::types::Config`]; the running
//! controller always reads the values from its config.

/// Vertical scroll offset (px) past which the navbar is styled as scrolled
pub const NAVBAR_SCROLL_THRESHOLD_PX: f64 = 50.0;

/// Hero background moves at this fraction of the scroll offset
pub const PARALLAX_RATE: f64 = 0.5;

/// Parallax only applies on viewports wider than this (px)
pub const PARALLAX_MIN_VIEWPORT_WIDTH_PX: u32 = 768;

/// Visible fraction that triggers the entrance animation
pub const REVEAL_THRESHOLD: f64 = 0.1;

/// Visible fraction that starts a numeric counter
pub const COUNTER_THRESHOLD: f64 = 0.5;

/// Total counter animation time in milliseconds
pub const COUNTER_DURATION_MS: u64 = 2000;

/// Frame duration in milliseconds (targeting 60 FPS)
pub const FRAME_DURATION_MS: u64 = 16;

/// Text carousel autoplay period in milliseconds
pub const TEXT_AUTOPLAY_MS: u64 = 5000;

/// Hero slider autoplay period in milliseconds
pub const HERO_AUTOPLAY_MS: u64 = 1000;

/// Delay before a freshly shown hero slide fades in
pub const HERO_FADE_DELAY_MS: u64 = 50;

/// Simulated booking submission latency in milliseconds
pub const SUBMIT_LATENCY_MS: u64 = 1500;

/// How long the success/error button state stays up
pub const SUBMIT_FEEDBACK_MS: u64 = 2000;

/// Ripple element lifetime in milliseconds
pub const RIPPLE_LIFETIME_MS: u64 = 600;

/// Date picker display and parse format (`dd/mm/yy` in picker terms)
pub const DATE_FORMAT: &str = "%d/%m/%Y";

/// Latest selectable date, relative to today
pub const DATE_MAX_OFFSET: &str = "+6M";

/// Inputs narrower than this get the calendar shifted left
pub const DATE_POPUP_NARROW_INPUT_PX: u32 = 250;

/// Id of the booking section anchor used by bike cards
pub const BOOKING_ANCHOR: &str = "booking";

/// Default pixels per terminal cell, used by the preview host
pub const DEFAULT_PX_PER_CELL: u32 = 8;

/// Debounce timeout for terminal resize events in milliseconds
pub const RESIZE_DEBOUNCE_MS: u64 = 200;

/// Alert text shown when the drop date is not after the pickup date
pub const MSG_DROP_BEFORE_PICKUP: &str = "Drop date must be after pickup date";

/// Alert text shown when the renter is not old enough
pub const MSG_UNDERAGE: &str = "You must be 18 or older to rent a bike";

/// Alert text shown when the rental is shorter than one hour
pub const MSG_MIN_DURATION: &str = "Minimum rental duration is 1 hour";
