// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::error::DomainError;
use crate::types::{ActivityDraft, ActivityType, User};
use time::Date;
use time::macros::format_description;

/// Validates the editable fields of an activity.
///
/// This function checks field-level constraints only. It does NOT encode the
/// schedule or check slot contents (see `canonicalize_schedule`).
///
/// # Arguments
///
/// * `draft` - The activity fields to validate
///
/// # Returns
///
/// * `Ok(())` if the fields are valid
/// * `Err(DomainError)` if any field is invalid
///
/// # Errors
///
/// Returns an error if:
/// - The name is empty
/// - The end date precedes the start date
/// - The registration threshold is above 100
/// - A multi-day activity has no schedule days
/// - Schedule day indices are not 1, 2, 3, ... in order
/// - A schedule date falls outside the activity date range
pub fn validate_activity_fields(draft: &ActivityDraft) -> Result<(), DomainError> {
    // Rule: name must not be empty
    if draft.name.trim().is_empty() {
        return Err(DomainError::InvalidName(String::from(
            "Activity name cannot be empty",
        )));
    }

    // Rule: the date range must not be inverted
    if draft.end_date < draft.start_date {
        return Err(DomainError::InvalidDateRange {
            start_date: draft.start_date,
            end_date: draft.end_date,
        });
    }

    validate_threshold(i64::from(draft.registration_threshold))?;

    if draft.activity_type == ActivityType::MultipleDays && draft.schedule.is_empty() {
        return Err(DomainError::EmptySchedule);
    }

    for (expected, day) in (1u32..).zip(draft.schedule.iter()) {
        if day.day != expected {
            return Err(DomainError::InvalidDayIndex {
                expected,
                found: day.day,
            });
        }
        if day.date < draft.start_date || day.date > draft.end_date {
            return Err(DomainError::ScheduleDateOutOfRange {
                day: day.day,
                date: day.date,
            });
        }
    }

    Ok(())
}

/// Validates a registration threshold and narrows it to a percentage.
///
/// # Errors
///
/// Returns an error if the value is outside 0-100.
pub fn validate_threshold(value: i64) -> Result<u8, DomainError> {
    if !(0..=100).contains(&value) {
        return Err(DomainError::InvalidThreshold { value });
    }
    u8::try_from(value).map_err(|_| DomainError::InvalidThreshold { value })
}

/// Clamps raw threshold input to the 0-100 range as the user types.
///
/// Non-numeric input clears the field. Numeric input outside the range is
/// replaced by the nearest bound, so `"150"` becomes `"100"` and `"-5"`
/// becomes `"0"`.
#[must_use]
pub fn clamp_threshold_input(raw: &str) -> String {
    let trimmed: &str = raw.trim();
    if trimmed.is_empty() {
        return String::new();
    }
    let is_numeric: bool = trimmed
        .strip_prefix('-')
        .unwrap_or(trimmed)
        .chars()
        .all(|c| c.is_ascii_digit());
    if !is_numeric || trimmed == "-" {
        return String::new();
    }

    if trimmed.starts_with('-') {
        return String::from("0");
    }
    match trimmed.parse::<u64>() {
        Ok(value) => value.min(100).to_string(),
        Err(_) => String::from("100"),
    }
}

/// Parses an ISO `YYYY-MM-DD` date.
///
/// # Errors
///
/// Returns an error if the string is not a valid calendar date.
pub fn parse_date(value: &str) -> Result<Date, DomainError> {
    Date::parse(value, format_description!("[year]-[month]-[day]")).map_err(|e| {
        DomainError::DateParseError {
            date_string: value.to_string(),
            error: e.to_string(),
        }
    })
}

/// Validates that a user's required fields are present.
///
/// # Errors
///
/// Returns an error if the login name or display name is empty, or if the
/// login name contains whitespace.
pub fn validate_user_fields(user: &User) -> Result<(), DomainError> {
    // Rule: login name is a single non-empty token
    if user.login_name.is_empty() || user.login_name.chars().any(char::is_whitespace) {
        return Err(DomainError::InvalidName(String::from(
            "Login name must be non-empty and contain no whitespace",
        )));
    }

    // Rule: display name must not be empty
    if user.display_name.trim().is_empty() {
        return Err(DomainError::InvalidName(String::from(
            "Display name cannot be empty",
        )));
    }

    Ok(())
}
