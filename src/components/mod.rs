//! Page components
//!
//! Each component is a plain state object. None of them touch timers or
//! each other; the controller in [`crate::app`] wires them to events.

pub mod booking;
pub mod carousel;
pub mod date_picker;
pub mod menu;
pub mod reveal;
pub mod ripple;
pub mod scroll;
pub mod time_range;

pub use booking::{BookingForm, SimulatedSubmitter, SubmitState, Submitter};
pub use carousel::{Carousel, SlideView};
pub use date_picker::DatePicker;
pub use menu::PopupMenu;
pub use reveal::{Counter, CounterAnimation, VisibilityObserver};
pub use ripple::Ripples;
pub use scroll::ScrollEffects;
pub use time_range::{DropOutcome, TimeOption, TimeRange};
