//! UI widget components
//!
//! Popups and the busy spinner shown on the submit button.

pub mod popups;
pub mod spinner;
