// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::overlap::SlotConflict;
use crate::slot::{ClockTime, DaySlot, SlotKind};
use crate::types::{ActivityStatus, ApprovalStatus};

/// Errors that can occur during domain validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Activity name is empty or invalid.
    InvalidName(String),
    /// The end date precedes the start date.
    InvalidDateRange {
        /// The activity start date.
        start_date: time::Date,
        /// The activity end date.
        end_date: time::Date,
    },
    /// Failed to parse date from string.
    DateParseError {
        /// The invalid date string.
        date_string: String,
        /// The parsing error message.
        error: String,
    },
    /// Registration threshold outside 0-100.
    InvalidThreshold {
        /// The rejected value.
        value: i64,
    },
    /// A time value could not be parsed or is out of range.
    InvalidTime(String),
    /// A slot's end time is not after its start time.
    InvalidTimeRange {
        /// The schedule day.
        day: u32,
        /// The slot with the bad range.
        slot: SlotKind,
        /// Slot start.
        start: ClockTime,
        /// Slot end.
        end: ClockTime,
    },
    /// One or more encoded schedule days exceed the length cap.
    ScheduleTooLong {
        /// The offending day indices.
        days: Vec<u32>,
        /// The cap in characters.
        max: usize,
    },
    /// A schedule day has no active slot.
    NoActiveSlot {
        /// The schedule day.
        day: u32,
    },
    /// A multi-day activity has no schedule days.
    EmptySchedule,
    /// The schedule offers no slot to register for.
    NoSlotsAvailable,
    /// Schedule day indices must be 1-based and consecutive.
    InvalidDayIndex {
        /// The expected index.
        expected: u32,
        /// The index found.
        found: u32,
    },
    /// A schedule day's date lies outside the activity date range.
    ScheduleDateOutOfRange {
        /// The schedule day.
        day: u32,
        /// The out-of-range date.
        date: time::Date,
    },
    /// A referenced day does not exist in the schedule.
    DayNotInSchedule {
        /// The missing day.
        day: u32,
    },
    /// A referenced slot is not active on its day.
    SlotNotActive(DaySlot),
    /// The same slot was selected twice.
    DuplicateSlot(DaySlot),
    /// Registration rate for the slot (or the whole activity) reached the threshold.
    SlotFull {
        /// The slot, or `None` for activity-wide registration.
        day_slot: Option<DaySlot>,
        /// Current registration rate in percent.
        rate: u32,
        /// Configured threshold in percent.
        threshold: u8,
    },
    /// Too few slots selected relative to the threshold.
    ThresholdNotMet {
        /// Number of selected slots.
        selected: usize,
        /// Number of available slots.
        available: usize,
        /// Configured threshold in percent.
        threshold: u8,
    },
    /// The selection collides with the participant's other activities.
    SlotOverlap {
        /// The colliding registrations.
        conflicts: Vec<SlotConflict>,
    },
    /// Slot identifier is invalid.
    InvalidSlot(String),
    /// Activity status string is invalid.
    InvalidStatus(String),
    /// Activity type string is invalid.
    InvalidActivityType(String),
    /// Visibility string is invalid.
    InvalidVisibility(String),
    /// Location mode string is invalid.
    InvalidLocationMode(String),
    /// Participant role string is invalid.
    InvalidParticipantRole(String),
    /// Approval status string is invalid.
    InvalidApprovalStatus(String),
    /// Attendance status string is invalid.
    InvalidAttendanceStatus(String),
    /// User role string is invalid.
    InvalidUserRole(String),
    /// The requested lifecycle transition is not allowed.
    InvalidStatusTransition {
        /// Current status.
        from: ActivityStatus,
        /// Requested status.
        to: ActivityStatus,
    },
    /// The activity can no longer be edited.
    ActivityNotEditable {
        /// Current status.
        status: ActivityStatus,
    },
    /// The activity does not accept registrations in its current status.
    RegistrationClosed {
        /// Current status.
        status: ActivityStatus,
    },
    /// The user is not a participant of the activity.
    ParticipantNotFound {
        /// The user id.
        user_id: i64,
    },
    /// The user is already a participant of the activity.
    AlreadyRegistered {
        /// The user id.
        user_id: i64,
    },
    /// Attendance is recorded for a slot the participant did not register for.
    SlotNotRegistered {
        /// The user id.
        user_id: i64,
        /// The slot.
        day_slot: DaySlot,
    },
    /// Attendance cannot be recorded in the activity's current status.
    AttendanceClosed {
        /// Current status.
        status: ActivityStatus,
    },
    /// The participant's approval status does not allow the action.
    InvalidParticipantTransition {
        /// The user id.
        user_id: i64,
        /// The participant's current status.
        status: ApprovalStatus,
        /// The attempted action.
        action: &'static str,
    },
}

impl std::fmt::Display for DomainError {
    #[allow(clippy::too_many_lines)]
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidName(msg) => write!(f, "Invalid name: {msg}"),
            Self::InvalidDateRange {
                start_date,
                end_date,
            } => write!(
                f,
                "End date {end_date} must not be before start date {start_date}"
            ),
            Self::DateParseError { date_string, error } => {
                write!(f, "Failed to parse date '{date_string}': {error}")
            }
            Self::InvalidThreshold { value } => write!(
                f,
                "Invalid registration threshold: {value}. Must be between 0 and 100"
            ),
            Self::InvalidTime(value) => write!(f, "Invalid time: {value}"),
            Self::InvalidTimeRange {
                day,
                slot,
                start,
                end,
            } => write!(
                f,
                "Day {day} {}: end time {end} must be after start time {start}",
                slot.display_name()
            ),
            Self::ScheduleTooLong { days, max } => {
                let list: Vec<String> = days.iter().map(ToString::to_string).collect();
                write!(
                    f,
                    "Schedule text for day(s) {} exceeds {max} characters",
                    list.join(", ")
                )
            }
            Self::NoActiveSlot { day } => {
                write!(f, "Day {day} has no active slot selected")
            }
            Self::EmptySchedule => write!(f, "A multi-day activity needs at least one day"),
            Self::NoSlotsAvailable => write!(f, "The schedule has no slot open for registration"),
            Self::InvalidDayIndex { expected, found } => write!(
                f,
                "Schedule day index {found} is out of sequence, expected {expected}"
            ),
            Self::ScheduleDateOutOfRange { day, date } => write!(
                f,
                "Schedule day {day} date {date} is outside the activity date range"
            ),
            Self::DayNotInSchedule { day } => write!(f, "Day {day} is not in the schedule"),
            Self::SlotNotActive(day_slot) => {
                write!(f, "Slot {day_slot} is not active in the schedule")
            }
            Self::DuplicateSlot(day_slot) => write!(f, "Slot {day_slot} selected more than once"),
            Self::SlotFull {
                day_slot,
                rate,
                threshold,
            } => match day_slot {
                Some(day_slot) => write!(
                    f,
                    "Slot {day_slot} is full: registration rate {rate}% reached threshold {threshold}%"
                ),
                None => write!(
                    f,
                    "Activity is full: registration rate {rate}% reached threshold {threshold}%"
                ),
            },
            Self::ThresholdNotMet {
                selected,
                available,
                threshold,
            } => write!(
                f,
                "Selected {selected} of {available} slots; at least {threshold}% must be selected"
            ),
            Self::SlotOverlap { conflicts } => {
                let names: Vec<String> = conflicts
                    .iter()
                    .map(|c| format!("{} ({} {})", c.activity_name, c.date, c.slot))
                    .collect();
                write!(f, "Selection overlaps with: {}", names.join("; "))
            }
            Self::InvalidSlot(value) => write!(f, "Invalid slot: {value}"),
            Self::InvalidStatus(value) => write!(f, "Invalid activity status: {value}"),
            Self::InvalidActivityType(value) => write!(f, "Invalid activity type: {value}"),
            Self::InvalidVisibility(value) => write!(f, "Invalid visibility: {value}"),
            Self::InvalidLocationMode(value) => write!(f, "Invalid location mode: {value}"),
            Self::InvalidParticipantRole(value) => write!(f, "Invalid participant role: {value}"),
            Self::InvalidApprovalStatus(value) => write!(f, "Invalid approval status: {value}"),
            Self::InvalidAttendanceStatus(value) => {
                write!(f, "Invalid attendance status: {value}")
            }
            Self::InvalidUserRole(value) => write!(f, "Invalid user role: {value}"),
            Self::InvalidStatusTransition { from, to } => {
                write!(f, "Cannot move activity from '{from}' to '{to}'")
            }
            Self::ActivityNotEditable { status } => {
                write!(f, "Activity in status '{status}' can no longer be edited")
            }
            Self::RegistrationClosed { status } => {
                write!(f, "Activity in status '{status}' is not open for registration")
            }
            Self::ParticipantNotFound { user_id } => {
                write!(f, "User {user_id} is not a participant of this activity")
            }
            Self::AlreadyRegistered { user_id } => {
                write!(f, "User {user_id} is already registered for this activity")
            }
            Self::SlotNotRegistered { user_id, day_slot } => {
                write!(f, "User {user_id} is not registered for {day_slot}")
            }
            Self::AttendanceClosed { status } => write!(
                f,
                "Attendance cannot be recorded for an activity in status '{status}'"
            ),
            Self::InvalidParticipantTransition {
                user_id,
                status,
                action,
            } => write!(
                f,
                "Cannot {action} participant {user_id} with status '{status}'"
            ),
        }
    }
}

impl std::error::Error for DomainError {}
