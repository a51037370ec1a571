use crate::constants::{MSG_DROP_BEFORE_PICKUP, MSG_MIN_DURATION, MSG_UNDERAGE};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PageError {
    #[error("Page file not found: {0}")]
    PageNotFound(String),

    #[error("Invalid page markup: {0}")]
    Markup(String),

    #[error("Invalid date '{value}' (expected format {format})")]
    InvalidDate { value: String, format: String },

    #[error("Date {0} is outside the selectable range")]
    DateOutOfRange(String),

    #[error("Invalid date format: {0}")]
    InvalidDateFormat(String),

    #[error("Invalid relative date offset: {0}")]
    InvalidOffset(String),

    #[error("Missing form field: {0}")]
    MissingField(String),

    #[error("Booking submission failed: {0}")]
    Submission(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, PageError>;

/// Input problems the visitor has to fix; shown as a blocking alert.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{}", MSG_DROP_BEFORE_PICKUP)]
    DropNotAfterPickup,

    #[error("{}", MSG_UNDERAGE)]
    Underage,

    #[error("{}", MSG_MIN_DURATION)]
    RentalTooShort,
}
