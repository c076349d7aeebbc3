// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]

mod admission;
mod attendance;
mod error;
mod overlap;
mod schedule_codec;
mod schedule_form;
mod slot;
mod types;
mod validation;

#[cfg(test)]
mod tests;

// ISO `YYYY-MM-DD` serde format for `time::Date` fields.
time::serde::format_description!(iso_date, Date, "[year]-[month]-[day]");

pub use admission::{
    RegistrationStatus, can_register, check_activity_admission, count_registered,
    registration_rate, registration_status, selection_meets_threshold, validate_slot_selection,
};
pub use attendance::{AttendanceSummary, summarize_attendance};
pub use overlap::{
    ScheduledSlot, SlotConflict, find_selection_overlaps, find_slot_overlaps, held_slots,
    resolve_day_slot,
};
pub use schedule_codec::{
    MAX_DAY_TEXT_CHARS, canonicalize_schedule, decode_day, encode_day, encode_schedule,
    encode_slot_line, infer_location_mode,
};
pub use schedule_form::{ScheduleForm, ScheduleFormAction};

// Re-export public types
pub use error::DomainError;
pub use slot::{ClockTime, DaySlot, GeoPoint, Location, MapLocation, SlotKind, WeeklySlot};
pub use types::{
    Activity, ActivityDraft, ActivityStatus, ActivityType, ApprovalStatus, AttendanceRecord,
    AttendanceStatus, DEFAULT_REGISTRATION_THRESHOLD, DayPlan, LocationMode, Participant,
    ParticipantRole, PlannedDay, ScheduleDay, User, UserRole, Visibility,
};
pub use validation::{
    clamp_threshold_input, parse_date, validate_activity_fields, validate_threshold,
    validate_user_fields,
};
