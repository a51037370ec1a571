use crate::constants::*;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// The two carousels on the page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CarouselKind {
    /// Testimonial text carousel
    Text,
    /// Hero image slider with indicators and fade-in
    Hero,
}

/// Named booking form fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Field {
    PickupDate,
    DropDate,
    PickupTime,
    DropTime,
    Age,
    BikeModel,
}

impl Field {
    pub const ALL: [Field; 6] = [
        Field::PickupDate,
        Field::DropDate,
        Field::PickupTime,
        Field::DropTime,
        Field::Age,
        Field::BikeModel,
    ];

    /// The `name` attribute of the form control
    pub fn name(&self) -> &'static str {
        match self {
            Field::PickupDate => "pickupDate",
            Field::DropDate => "dropDate",
            Field::PickupTime => "pickupTime",
            Field::DropTime => "dropTime",
            Field::Age => "age",
            Field::BikeModel => "bikeModel",
        }
    }

    pub fn from_name(name: &str) -> Option<Field> {
        Field::ALL.into_iter().find(|f| f.name() == name)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Field::PickupDate => "Pickup date",
            Field::DropDate => "Drop date",
            Field::PickupTime => "Pickup time",
            Field::DropTime => "Drop time",
            Field::Age => "18 or older",
            Field::BikeModel => "Bike",
        }
    }
}

/// The two date inputs driven by the date picker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DateField {
    Pickup,
    Drop,
}

impl DateField {
    pub fn field(&self) -> Field {
        match self {
            DateField::Pickup => Field::PickupDate,
            DateField::Drop => Field::DropDate,
        }
    }
}

/// The two time-of-day selectors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimeSelector {
    Pickup,
    Drop,
}

/// Keys the page reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavKey {
    ArrowLeft,
    ArrowRight,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Point { x, y }
    }
}

/// Where a click landed, as far as document-level handlers care
#[derive(Debug, Clone, PartialEq)]
pub enum ClickTarget {
    MenuToggle,
    /// Anywhere inside the popup menu panel
    MenuPanel,
    /// Link inside the popup menu panel; carries its `href`
    MenuLink(String),
    /// In-page link; carries the raw `href` (e.g. `#booking`)
    Anchor(String),
    BikeCard(usize),
    CarouselPrev(CarouselKind),
    CarouselNext(CarouselKind),
    HeroIndicator(usize),
    CalendarIcon(DateField),
    Elsewhere,
}

/// Elements watched for visibility
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Observed {
    Reveal(usize),
    Counter(usize),
}

/// Input to the page controller
#[derive(Debug, Clone, PartialEq)]
pub enum PageEvent {
    Scroll { offset_y: f64 },
    Resize { width_px: u32, height_px: u32 },
    Key(NavKey),
    Click(ClickTarget),
    /// A `.btn` was pressed; `origin` is the button's offset in the page
    ButtonPress { button: usize, pointer: Point, origin: Point },
    HoverEnter(CarouselKind),
    HoverLeave(CarouselKind),
    Visibility { target: Observed, ratio: f64 },
    FieldInput { field: Field, value: String },
    TimeSelected { selector: TimeSelector, index: usize },
    DateSelected { field: DateField, date: NaiveDate },
    Submit,
}

/// Output the host has to carry out
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Blocking alert dialog
    Alert(String),
    /// Smoothly scroll the element with this id to the top of the viewport
    ScrollIntoView { id: String },
    FocusField(Field),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width_px: u32,
    pub height_px: u32,
    pub scroll_y: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Viewport {
            width_px: 1024,
            height_px: 768,
            scroll_y: 0.0,
        }
    }
}

/// Which part of the preview receives arrow keys
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusTarget {
    Page,
    Hero,
    Text,
    Booking,
}

impl FocusTarget {
    pub fn next(self) -> Self {
        match self {
            FocusTarget::Page => FocusTarget::Hero,
            FocusTarget::Hero => FocusTarget::Text,
            FocusTarget::Text => FocusTarget::Booking,
            FocusTarget::Booking => FocusTarget::Page,
        }
    }

    /// The carousel a focus stands in for the pointer hovering
    pub fn carousel(self) -> Option<CarouselKind> {
        match self {
            FocusTarget::Hero => Some(CarouselKind::Hero),
            FocusTarget::Text => Some(CarouselKind::Text),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum UiMode {
    Normal,
    Alert(String),
    Help,
}

/// Tunable literals of the page behavior
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub navbar_scroll_threshold_px: f64,
    pub parallax_rate: f64,
    pub parallax_min_width_px: u32,
    pub reveal_threshold: f64,
    pub counter_threshold: f64,
    pub counter_duration_ms: u64,
    pub frame_ms: u64,
    pub text_autoplay_ms: u64,
    pub hero_autoplay_ms: u64,
    pub hero_fade_delay_ms: u64,
    pub submit_latency_ms: u64,
    pub submit_feedback_ms: u64,
    pub ripple_lifetime_ms: u64,
    pub date_format: String,
    pub date_max_offset: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            navbar_scroll_threshold_px: NAVBAR_SCROLL_THRESHOLD_PX,
            parallax_rate: PARALLAX_RATE,
            parallax_min_width_px: PARALLAX_MIN_VIEWPORT_WIDTH_PX,
            reveal_threshold: REVEAL_THRESHOLD,
            counter_threshold: COUNTER_THRESHOLD,
            counter_duration_ms: COUNTER_DURATION_MS,
            frame_ms: FRAME_DURATION_MS,
            text_autoplay_ms: TEXT_AUTOPLAY_MS,
            hero_autoplay_ms: HERO_AUTOPLAY_MS,
            hero_fade_delay_ms: HERO_FADE_DELAY_MS,
            submit_latency_ms: SUBMIT_LATENCY_MS,
            submit_feedback_ms: SUBMIT_FEEDBACK_MS,
            ripple_lifetime_ms: RIPPLE_LIFETIME_MS,
            date_format: DATE_FORMAT.to_string(),
            date_max_offset: DATE_MAX_OFFSET.to_string(),
        }
    }
}

impl Config {
    pub fn autoplay_period(&self, kind: CarouselKind) -> Duration {
        match kind {
            CarouselKind::Text => Duration::from_millis(self.text_autoplay_ms),
            CarouselKind::Hero => Duration::from_millis(self.hero_autoplay_ms),
        }
    }

    /// Clamp values that would stall or spin the timers
    pub fn sanitized(mut self) -> Self {
        self.frame_ms = self.frame_ms.max(1);
        self.text_autoplay_ms = self.text_autoplay_ms.max(self.frame_ms);
        self.hero_autoplay_ms = self.hero_autoplay_ms.max(self.frame_ms);
        self.reveal_threshold = self.reveal_threshold.clamp(0.0, 1.0);
        self.counter_threshold = self.counter_threshold.clamp(0.0, 1.0);
        if crate::components::date_picker::validate_format(&self.date_format).is_err() {
            tracing::warn!(
                "Unusable date format '{}', falling back to {}",
                self.date_format,
                DATE_FORMAT
            );
            self.date_format = DATE_FORMAT.to_string();
        }
        self
    }
}
