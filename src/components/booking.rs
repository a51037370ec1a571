//! Booking form: validation and the simulated submission lifecycle
//!
//! The submit button walks `Idle -> Processing -> Success | Failed -> Idle`.
//! Nothing ever leaves the page; [`SimulatedSubmitter`] only waits.

use crate::error::{PageError, Result, ValidationError};
use crate::types::Field;
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

/// Flat name -> value view of every named form control
pub type FormData = BTreeMap<String, String>;

pub const PROCESSING_LABEL: &str = "Processing...";
pub const SUCCESS_LABEL: &str = "Success!";
pub const ERROR_LABEL: &str = "Error";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitState {
    Idle,
    Processing,
    Success,
    Failed,
}

/// Extra styling on the submit button
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonStyle {
    Plain,
    Pulse,
    Danger,
}

impl SubmitState {
    pub fn is_disabled(&self) -> bool {
        *self != SubmitState::Idle
    }

    pub fn style(&self) -> ButtonStyle {
        match self {
            SubmitState::Success => ButtonStyle::Pulse,
            SubmitState::Failed => ButtonStyle::Danger,
            _ => ButtonStyle::Plain,
        }
    }
}

/// A validated booking
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingRequest {
    pub pickup_date: NaiveDate,
    pub drop_date: NaiveDate,
    pub pickup_time: String,
    pub drop_time: String,
    pub bike_model: String,
    pub fields: FormData,
}

/// Outcome of checking the form before submission
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitCheck {
    Ready(BookingRequest),
    Rejected(ValidationError),
}

pub type SubmitFuture = Pin<Box<dyn Future<Output = Result<()>> + Send>>;

/// Where a validated booking goes
pub trait Submitter: Send + Sync {
    fn submit(&self, request: BookingRequest) -> SubmitFuture;
}

/// Stands in for a backend: waits, then reports success
pub struct SimulatedSubmitter {
    latency: Duration,
}

impl SimulatedSubmitter {
    pub fn new(latency: Duration) -> Self {
        Self { latency }
    }
}

impl Submitter for SimulatedSubmitter {
    fn submit(&self, request: BookingRequest) -> SubmitFuture {
        let latency = self.latency;
        Box::pin(async move {
            let payload = serde_json::to_string(&request)
                .map_err(|e| PageError::Submission(e.to_string()))?;
            tracing::info!("Simulating booking submission ({:?}): {}", latency, payload);
            tokio::time::sleep(latency).await;
            Ok(())
        })
    }
}

#[derive(Debug, Clone)]
pub struct BookingForm {
    fields: FormData,
    submit_label: String,
    state: SubmitState,
    bike_models: Vec<String>,
}

impl BookingForm {
    /// `fields` holds every named control with its initial value
    pub fn new(fields: FormData, submit_label: String, bike_models: Vec<String>) -> Self {
        BookingForm {
            fields,
            submit_label,
            state: SubmitState::Idle,
            bike_models,
        }
    }

    pub fn data(&self) -> &FormData {
        &self.fields
    }

    pub fn value(&self, field: Field) -> &str {
        self.fields.get(field.name()).map(String::as_str).unwrap_or("")
    }

    pub fn set(&mut self, field: Field, value: impl Into<String>) {
        self.fields.insert(field.name().to_string(), value.into());
    }

    pub fn bike_models(&self) -> &[String] {
        &self.bike_models
    }

    pub fn state(&self) -> SubmitState {
        self.state
    }

    /// Label currently on the submit button
    pub fn button_label(&self) -> &str {
        match self.state {
            SubmitState::Idle => &self.submit_label,
            SubmitState::Processing => PROCESSING_LABEL,
            SubmitState::Success => SUCCESS_LABEL,
            SubmitState::Failed => ERROR_LABEL,
        }
    }

    /// Validate the form in order: dates first, then age
    ///
    /// # Returns
    /// * `Ok(SubmitCheck::Ready)` - Valid booking
    /// * `Ok(SubmitCheck::Rejected)` - Visitor input to fix; nothing changes
    /// * `Err(PageError)` - A date field is missing or unreadable
    pub fn check<F>(&self, parse_date: F) -> Result<SubmitCheck>
    where
        F: Fn(&str) -> Result<NaiveDate>,
    {
        let pickup_date = parse_date(self.required(Field::PickupDate)?)?;
        let drop_date = parse_date(self.required(Field::DropDate)?)?;

        if pickup_date >= drop_date {
            tracing::debug!("Rejected booking: drop {} <= pickup {}", drop_date, pickup_date);
            return Ok(SubmitCheck::Rejected(ValidationError::DropNotAfterPickup));
        }

        if self.value(Field::Age) == "no" {
            tracing::debug!("Rejected booking: age not confirmed");
            return Ok(SubmitCheck::Rejected(ValidationError::Underage));
        }

        Ok(SubmitCheck::Ready(BookingRequest {
            pickup_date,
            drop_date,
            pickup_time: self.value(Field::PickupTime).to_string(),
            drop_time: self.value(Field::DropTime).to_string(),
            bike_model: self.value(Field::BikeModel).to_string(),
            fields: self.fields.clone(),
        }))
    }

    fn required(&self, field: Field) -> Result<&str> {
        match self.fields.get(field.name()) {
            Some(value) if !value.trim().is_empty() => Ok(value.as_str()),
            _ => Err(PageError::MissingField(field.name().to_string())),
        }
    }

    /// Lock the button for an attempt. Returns false if one is in flight.
    pub fn begin_submission(&mut self) -> bool {
        if self.state != SubmitState::Idle {
            return false;
        }
        self.state = SubmitState::Processing;
        true
    }

    /// Record how the attempt ended; success also empties the form
    pub fn finish_submission(&mut self, succeeded: bool) {
        if succeeded {
            self.state = SubmitState::Success;
            self.clear();
        } else {
            self.state = SubmitState::Failed;
        }
    }

    /// Put the button back to its original label and enable it
    pub fn restore(&mut self) {
        self.state = SubmitState::Idle;
    }

    /// Empty every field
    pub fn clear(&mut self) {
        self.fields.values_mut().for_each(String::clear);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(value: &str) -> Result<NaiveDate> {
        NaiveDate::parse_from_str(value, "%d/%m/%Y").map_err(|_| PageError::InvalidDate {
            value: value.to_string(),
            format: "%d/%m/%Y".to_string(),
        })
    }

    fn create_test_form(pickup: &str, drop: &str, age: &str) -> BookingForm {
        let mut fields = FormData::new();
        fields.insert("pickupDate".into(), pickup.into());
        fields.insert("dropDate".into(), drop.into());
        fields.insert("pickupTime".into(), "09:00".into());
        fields.insert("dropTime".into(), "11:00".into());
        fields.insert("age".into(), age.into());
        fields.insert("bikeModel".into(), "Royal Enfield Classic 350".into());
        BookingForm::new(fields, "Book Now".into(), vec![])
    }

    #[test]
    fn test_valid_booking() {
        let form = create_test_form("01/11/2026", "03/11/2026", "yes");
        match form.check(parse).unwrap() {
            SubmitCheck::Ready(request) => {
                assert_eq!(request.pickup_time, "09:00");
                assert_eq!(request.bike_model, "Royal Enfield Classic 350");
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_same_day_drop_rejected() {
        let form = create_test_form("01/11/2026", "01/11/2026", "yes");
        assert_eq!(
            form.check(parse).unwrap(),
            SubmitCheck::Rejected(ValidationError::DropNotAfterPickup)
        );
    }

    #[test]
    fn test_dates_checked_before_age() {
        let form = create_test_form("05/11/2026", "01/11/2026", "no");
        assert_eq!(
            form.check(parse).unwrap(),
            SubmitCheck::Rejected(ValidationError::DropNotAfterPickup)
        );
    }

    #[test]
    fn test_underage_rejected() {
        let form = create_test_form("01/11/2026", "03/11/2026", "no");
        assert_eq!(
            form.check(parse).unwrap(),
            SubmitCheck::Rejected(ValidationError::Underage)
        );
    }

    #[test]
    fn test_unreadable_date_is_an_error() {
        let form = create_test_form("next tuesday", "03/11/2026", "yes");
        assert!(matches!(form.check(parse), Err(PageError::InvalidDate { .. })));

        let form = create_test_form("", "03/11/2026", "yes");
        assert!(matches!(form.check(parse), Err(PageError::MissingField(_))));
    }

    #[test]
    fn test_submission_lifecycle() {
        let mut form = create_test_form("01/11/2026", "03/11/2026", "yes");
        assert_eq!(form.button_label(), "Book Now");

        assert!(form.begin_submission());
        assert!(!form.begin_submission());
        assert_eq!(form.button_label(), PROCESSING_LABEL);
        assert!(form.state().is_disabled());

        form.finish_submission(true);
        assert_eq!(form.button_label(), SUCCESS_LABEL);
        assert_eq!(form.state().style(), ButtonStyle::Pulse);
        assert!(form.data().values().all(String::is_empty));

        form.restore();
        assert_eq!(form.button_label(), "Book Now");
        assert!(!form.state().is_disabled());
    }

    #[test]
    fn test_failed_submission_keeps_fields() {
        let mut form = create_test_form("01/11/2026", "03/11/2026", "yes");
        form.begin_submission();
        form.finish_submission(false);
        assert_eq!(form.button_label(), ERROR_LABEL);
        assert_eq!(form.state().style(), ButtonStyle::Danger);
        assert_eq!(form.value(Field::PickupDate), "01/11/2026");
    }

    #[test]
    fn test_request_serializes_camel_case() {
        let form = create_test_form("01/11/2026", "03/11/2026", "yes");
        let SubmitCheck::Ready(request) = form.check(parse).unwrap() else {
            panic!("expected a valid booking");
        };
        let json = serde_json::to_string(&request).unwrap();
        assert!(json.contains("\"pickupDate\":\"2026-11-01\""));
        assert!(json.contains("\"bikeModel\""));
    }
}
