// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use clubhub_domain::{ActivityDraft, ActivityStatus, AttendanceStatus, DaySlot, ParticipantRole};

/// A command represents user intent against one existing activity, as data only.
///
/// Activity creation is not a command; see [`crate::apply_create`].
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Replace the editable fields. The schedule is rebuilt wholesale.
    UpdateActivity {
        /// The new field values.
        draft: ActivityDraft,
    },
    /// Move the activity to another lifecycle status.
    TransitionStatus {
        /// The requested status.
        target: ActivityStatus,
    },
    /// Join the activity as a pending member.
    RegisterParticipant {
        /// The joining user.
        user_id: i64,
        /// Display name captured at registration.
        name: String,
        /// Email captured at registration.
        email: String,
        /// Requested slots; ignored for single-day activities.
        day_slots: Vec<DaySlot>,
        /// RFC 3339 registration time.
        joined_at: String,
    },
    /// Leave the activity. The participant entry is deleted.
    UnregisterParticipant {
        /// The leaving user.
        user_id: i64,
    },
    /// Replace a participant's registered slot set.
    UpdateRegisteredSlots {
        /// The participant.
        user_id: i64,
        /// The complete new slot set.
        day_slots: Vec<DaySlot>,
    },
    ApproveParticipant {
        user_id: i64,
    },
    RejectParticipant {
        user_id: i64,
        /// Shown to the participant.
        reason: Option<String>,
    },
    /// Mark a participant removed. The entry is kept for history.
    RemoveParticipant {
        user_id: i64,
    },
    /// Delete a participant entry outright.
    DeleteParticipant {
        user_id: i64,
    },
    SetParticipantRole {
        user_id: i64,
        role: ParticipantRole,
    },
    /// Record (or replace) attendance for one participant and slot.
    RecordAttendance {
        /// The participant.
        user_id: i64,
        /// The slot; required for multi-day activities.
        day_slot: Option<DaySlot>,
        /// The attendance status.
        status: AttendanceStatus,
        /// RFC 3339 recording time.
        recorded_at: String,
        /// The recording officer.
        recorded_by: i64,
    },
}

impl Command {
    /// Returns the action name recorded in audit events.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::UpdateActivity { .. } => "UpdateActivity",
            Self::TransitionStatus { .. } => "TransitionStatus",
            Self::RegisterParticipant { .. } => "RegisterParticipant",
            Self::UnregisterParticipant { .. } => "UnregisterParticipant",
            Self::UpdateRegisteredSlots { .. } => "UpdateRegisteredSlots",
            Self::ApproveParticipant { .. } => "ApproveParticipant",
            Self::RejectParticipant { .. } => "RejectParticipant",
            Self::RemoveParticipant { .. } => "RemoveParticipant",
            Self::DeleteParticipant { .. } => "DeleteParticipant",
            Self::SetParticipantRole { .. } => "SetParticipantRole",
            Self::RecordAttendance { .. } => "RecordAttendance",
        }
    }
}
