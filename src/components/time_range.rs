//! Pickup/drop time-of-day selectors
//!
//! Both selectors offer the same ordered slot list. Index 0 is always the
//! "no selection" placeholder; the remaining slots are 30 minutes apart, so
//! a one hour rental means the drop index sits at least two past pickup.

use crate::error::ValidationError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeOption {
    pub value: String,
    pub label: String,
}

impl TimeOption {
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        TimeOption {
            value: value.into(),
            label: label.into(),
        }
    }
}

/// Result of picking a drop time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropOutcome {
    Accepted(usize),
    /// The choice was too early and the drop index was moved to `index`
    Adjusted {
        index: usize,
        reason: ValidationError,
    },
}

#[derive(Debug, Clone)]
pub struct TimeRange {
    options: Vec<TimeOption>,
    drop_disabled: Vec<bool>,
    pickup: usize,
    drop: usize,
}

impl TimeRange {
    /// `options` must start with the placeholder entry
    pub fn new(options: Vec<TimeOption>) -> Self {
        let drop_disabled = vec![false; options.len()];
        TimeRange {
            options,
            drop_disabled,
            pickup: 0,
            drop: 0,
        }
    }

    /// Half-hour slots between `first` and `last` (inclusive), `HH:MM` 24h
    pub fn half_hourly(first_minute: u32, last_minute: u32) -> Self {
        let mut options = vec![TimeOption::new("", "Select time")];
        let mut minute = first_minute;
        while minute <= last_minute {
            let value = format!("{:02}:{:02}", minute / 60, minute % 60);
            options.push(TimeOption::new(value.clone(), value));
            minute += 30;
        }
        TimeRange::new(options)
    }

    pub fn options(&self) -> &[TimeOption] {
        &self.options
    }

    pub fn pickup_index(&self) -> usize {
        self.pickup
    }

    pub fn drop_index(&self) -> usize {
        self.drop
    }

    pub fn pickup_value(&self) -> &str {
        self.value_at(self.pickup)
    }

    pub fn drop_value(&self) -> &str {
        self.value_at(self.drop)
    }

    fn value_at(&self, index: usize) -> &str {
        self.options
            .get(index)
            .map(|o| o.value.as_str())
            .unwrap_or("")
    }

    pub fn is_drop_disabled(&self, index: usize) -> bool {
        self.drop_disabled.get(index).copied().unwrap_or(true)
    }

    /// Pick a pickup slot and re-derive the drop selector from it
    ///
    /// Clears the drop value, disables every drop slot up to and including
    /// the pickup slot (never the placeholder) and pre-selects the slot right
    /// after pickup when there is one.
    ///
    /// # Returns
    /// * `Some(index)` - The pre-selected drop index
    /// * `None` - No drop slot was pre-selected
    pub fn select_pickup(&mut self, index: usize) -> Option<usize> {
        if index >= self.options.len() {
            tracing::warn!("Pickup time index {} out of range", index);
            return None;
        }

        self.pickup = index;
        self.drop = 0;
        self.drop_disabled.iter_mut().for_each(|d| *d = false);

        if index == 0 {
            return None;
        }

        for disabled in self.drop_disabled.iter_mut().take(index + 1).skip(1) {
            *disabled = true;
        }

        if index + 1 < self.options.len() {
            self.drop = index + 1;
            tracing::debug!("Pickup slot {} selected, drop defaults to {}", index, self.drop);
            Some(self.drop)
        } else {
            tracing::debug!("Pickup slot {} is the last slot, no drop default", index);
            None
        }
    }

    /// Pick a drop slot, enforcing the one hour minimum
    ///
    /// A drop slot at or before `pickup + 1` is replaced by `pickup + 2`. When
    /// that slot does not exist the drop selection falls back to the
    /// placeholder.
    pub fn select_drop(&mut self, index: usize) -> DropOutcome {
        if index >= self.options.len() {
            tracing::warn!("Drop time index {} out of range", index);
            return DropOutcome::Accepted(self.drop);
        }

        if index > self.pickup + 1 {
            self.drop = index;
            return DropOutcome::Accepted(index);
        }

        let minimum = self.pickup + 2;
        self.drop = if minimum < self.options.len() {
            minimum
        } else {
            0
        };

        tracing::debug!(
            "Drop slot {} too close to pickup {}, moved to {}",
            index,
            self.pickup,
            self.drop
        );
        DropOutcome::Adjusted {
            index: self.drop,
            reason: ValidationError::RentalTooShort,
        }
    }

    /// Select by option value instead of index
    pub fn index_of(&self, value: &str) -> Option<usize> {
        self.options.iter().position(|o| o.value == value)
    }

    pub fn reset(&mut self) {
        self.pickup = 0;
        self.drop = 0;
        self.drop_disabled.iter_mut().for_each(|d| *d = false);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // placeholder, 08:30, 09:00, 09:30, 10:00, 10:30
    fn create_test_range() -> TimeRange {
        TimeRange::half_hourly(8 * 60 + 30, 10 * 60 + 30)
    }

    #[test]
    fn test_half_hourly_slots() {
        let range = create_test_range();
        assert_eq!(range.options().len(), 6);
        assert_eq!(range.options()[0].value, "");
        assert_eq!(range.options()[2].value, "09:00");
    }

    #[test]
    fn test_pickup_disables_earlier_drop_slots() {
        let mut range = create_test_range();
        range.select_pickup(3);

        assert!(!range.is_drop_disabled(0));
        for idx in 1..=3 {
            assert!(range.is_drop_disabled(idx), "slot {} should be disabled", idx);
        }
        assert!(!range.is_drop_disabled(4));
        assert!(!range.is_drop_disabled(5));
    }

    #[test]
    fn test_pickup_preselects_next_slot() {
        let mut range = create_test_range();
        assert_eq!(range.select_pickup(2), Some(3));
        assert_eq!(range.drop_value(), "09:30");
    }

    #[test]
    fn test_pickup_on_last_slot_leaves_drop_empty() {
        let mut range = create_test_range();
        assert_eq!(range.select_pickup(5), None);
        assert_eq!(range.drop_index(), 0);
        assert_eq!(range.drop_value(), "");
    }

    #[test]
    fn test_repicking_pickup_reenables_slots() {
        let mut range = create_test_range();
        range.select_pickup(4);
        range.select_pickup(1);
        assert!(range.is_drop_disabled(1));
        assert!(!range.is_drop_disabled(2));
        assert!(!range.is_drop_disabled(4));
    }

    #[test]
    fn test_placeholder_pickup_enables_everything() {
        let mut range = create_test_range();
        range.select_pickup(3);
        assert_eq!(range.select_pickup(0), None);
        assert!((0..6).all(|i| !range.is_drop_disabled(i)));
    }

    #[test]
    fn test_short_drop_is_forced_to_one_hour() {
        let mut range = create_test_range();
        range.select_pickup(2);
        let outcome = range.select_drop(3);
        assert_eq!(
            outcome,
            DropOutcome::Adjusted {
                index: 4,
                reason: ValidationError::RentalTooShort
            }
        );
        assert_eq!(range.drop_value(), "10:00");
    }

    #[test]
    fn test_long_enough_drop_is_accepted() {
        let mut range = create_test_range();
        range.select_pickup(2);
        assert_eq!(range.select_drop(4), DropOutcome::Accepted(4));
    }

    #[test]
    fn test_forced_drop_past_end_clears_selection() {
        let mut range = create_test_range();
        range.select_pickup(4);
        let outcome = range.select_drop(5);
        assert_eq!(
            outcome,
            DropOutcome::Adjusted {
                index: 0,
                reason: ValidationError::RentalTooShort
            }
        );
        assert_eq!(range.drop_value(), "");
    }

    #[test]
    fn test_reset() {
        let mut range = create_test_range();
        range.select_pickup(2);
        range.select_drop(5);
        range.reset();
        assert_eq!(range.pickup_index(), 0);
        assert_eq!(range.drop_index(), 0);
        assert!(!range.is_drop_disabled(1));
    }
}
