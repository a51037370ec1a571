//! Date picker configuration and the pickup/drop date constraint
//!
//! The calendar popup itself is the host's business. This module owns what
//! the page configures on it: the display format, the selectable range and
//! the rule that the drop date can never be picked before the pickup date.

use crate::constants::DATE_POPUP_NARROW_INPUT_PX;
use crate::error::{PageError, Result};
use crate::types::DateField;
use chrono::format::{Item, StrftimeItems};
use chrono::{Days, Months, NaiveDate};
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref OFFSET_TERM: Regex = Regex::new(r"([+-]?\d+)\s*([dDwWmMyY])").unwrap();
}

/// Resolve a relative date such as `+6M` or `-1w +3d` against `base`
///
/// Units are days, weeks, months and years (case-insensitive). Month and
/// year steps clamp to the last day of a shorter month.
pub fn resolve_offset(base: NaiveDate, offset: &str) -> Result<NaiveDate> {
    let invalid = || PageError::InvalidOffset(offset.to_string());

    if offset.trim().is_empty() {
        return Err(invalid());
    }

    let leftover = OFFSET_TERM.replace_all(offset, "");
    if !leftover.trim().is_empty() {
        return Err(invalid());
    }

    let mut date = base;
    for caps in OFFSET_TERM.captures_iter(offset) {
        let amount: i64 = caps[1].parse().map_err(|_| invalid())?;
        let magnitude = amount.unsigned_abs();
        let forward = amount >= 0;

        date = match caps[2].to_ascii_lowercase().as_str() {
            "d" => step_days(date, magnitude, forward),
            "w" => step_days(date, magnitude.saturating_mul(7), forward),
            "m" => step_months(date, magnitude, forward),
            _ => step_months(date, magnitude.saturating_mul(12), forward),
        }
        .ok_or_else(invalid)?;
    }

    Ok(date)
}

fn step_days(date: NaiveDate, days: u64, forward: bool) -> Option<NaiveDate> {
    if forward {
        date.checked_add_days(Days::new(days))
    } else {
        date.checked_sub_days(Days::new(days))
    }
}

fn step_months(date: NaiveDate, months: u64, forward: bool) -> Option<NaiveDate> {
    let months = Months::new(u32::try_from(months).ok()?);
    if forward {
        date.checked_add_months(months)
    } else {
        date.checked_sub_months(months)
    }
}

/// Reject empty formats and unknown specifiers, which chrono only reports
/// as an error while displaying
pub fn validate_format(format: &str) -> Result<()> {
    if format.trim().is_empty() || StrftimeItems::new(format).any(|item| matches!(item, Item::Error)) {
        return Err(PageError::InvalidDateFormat(format.to_string()));
    }
    Ok(())
}

/// Parse a date typed or picked in `format`
pub fn parse_date(value: &str, format: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), format).map_err(|_| PageError::InvalidDate {
        value: value.to_string(),
        format: format.to_string(),
    })
}

/// Calendar popup placement relative to its input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PopupOffset {
    pub margin_top_px: i32,
    pub margin_left_px: i32,
}

/// Where the popup goes for an input `input_width_px` wide
pub fn popup_offset(input_width_px: u32) -> PopupOffset {
    PopupOffset {
        margin_top_px: 10,
        margin_left_px: if input_width_px < DATE_POPUP_NARROW_INPUT_PX {
            -50
        } else {
            0
        },
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatePickerConfig {
    /// chrono format string used for display and parsing
    pub format: String,
    pub min_date: NaiveDate,
    pub max_date: NaiveDate,
}

/// Outcome of picking a date
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateSelection {
    /// Formatted value to write into the input
    pub value: String,
    /// The drop date fell before the new pickup date and must be emptied
    pub clear_drop: bool,
}

#[derive(Debug, Clone)]
pub struct DatePicker {
    config: DatePickerConfig,
    drop_min: NaiveDate,
}

impl DatePicker {
    /// Both inputs open on `today` and close `max_offset` later
    pub fn new(today: NaiveDate, format: &str, max_offset: &str) -> Result<Self> {
        validate_format(format)?;
        let max_date = resolve_offset(today, max_offset)?;
        let config = DatePickerConfig {
            format: format.to_string(),
            min_date: today,
            max_date,
        };

        tracing::debug!(
            "Date picker range {} .. {} ({})",
            config.min_date,
            config.max_date,
            format
        );

        Ok(DatePicker {
            drop_min: today,
            config,
        })
    }

    /// Selectable range (inclusive) for `field`
    pub fn bounds(&self, field: DateField) -> (NaiveDate, NaiveDate) {
        match field {
            DateField::Pickup => (self.config.min_date, self.config.max_date),
            DateField::Drop => (self.drop_min, self.config.max_date),
        }
    }

    pub fn format(&self, date: NaiveDate) -> String {
        date.format(&self.config.format).to_string()
    }

    pub fn parse(&self, value: &str) -> Result<NaiveDate> {
        parse_date(value, &self.config.format)
    }

    /// Pick `date` for `field`
    ///
    /// Picking a pickup date moves the drop field's minimum to it; a
    /// `current_drop` strictly before the new pickup date is flagged for
    /// clearing.
    pub fn select(
        &mut self,
        field: DateField,
        date: NaiveDate,
        current_drop: Option<NaiveDate>,
    ) -> Result<DateSelection> {
        let (min, max) = self.bounds(field);
        if date < min || date > max {
            tracing::warn!("{:?} date {} outside {} .. {}", field, date, min, max);
            return Err(PageError::DateOutOfRange(self.format(date)));
        }

        let mut clear_drop = false;
        if field == DateField::Pickup {
            self.drop_min = date;
            clear_drop = current_drop.is_some_and(|drop| drop < date);
            tracing::debug!("Drop minimum raised to {} (clear drop: {})", date, clear_drop);
        }

        Ok(DateSelection {
            value: self.format(date),
            clear_drop,
        })
    }

    /// Forget the pickup-derived drop minimum
    pub fn reset(&mut self) {
        self.drop_min = self.config.min_date;
    }
}
