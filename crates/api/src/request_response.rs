// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! API request and response data transfer objects.

use clubhub_audit::AuditEvent;
use clubhub_domain::{
    Activity, ActivityType, AttendanceSummary, Location, LocationMode, RegistrationStatus,
    ScheduleDay, SlotConflict, User, Visibility,
};
use clubhub_persistence::NotificationData;
use serde::{Deserialize, Serialize};

/// API request to create or update an activity.
///
/// Dates are ISO `YYYY-MM-DD`. The threshold is validated to 0-100 and
/// defaults to 80. Schedule days may carry a structured `plan`; days that
/// only carry `activities` text are decoded and re-encoded. Without a
/// `location_mode` the mode is inferred from the schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveActivityRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub activity_type: ActivityType,
    pub start_date: String,
    pub end_date: String,
    #[serde(default)]
    pub location_mode: Option<LocationMode>,
    #[serde(default)]
    pub location: Option<Location>,
    #[serde(default)]
    pub max_participants: Option<u32>,
    #[serde(default)]
    pub registration_threshold: Option<i64>,
    #[serde(default)]
    pub visibility: Visibility,
    #[serde(default)]
    pub responsible_persons: Vec<i64>,
    #[serde(default)]
    pub schedule: Vec<ScheduleDay>,
}

/// An activity as returned by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityInfo {
    /// The canonical activity identifier.
    pub activity_id: i64,
    /// The activity aggregate.
    pub activity: Activity,
    /// Activity-wide registration figures.
    pub registration: RegistrationStatus,
    pub created_at: String,
    pub updated_at: String,
}

/// API response listing activities.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListActivitiesResponse {
    pub activities: Vec<ActivityInfo>,
}

/// API response for any write against an activity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityWriteResponse {
    /// The activity after the write.
    pub activity: ActivityInfo,
    /// The audit event recorded for the write.
    pub event_id: i64,
    /// The command that was applied, e.g. `RegisterParticipant`.
    pub action: String,
    /// A success message.
    pub message: String,
}

/// API request to move an activity to another lifecycle status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionStatusRequest {
    /// The target status, e.g. `published`.
    pub status: String,
}

/// A `{day, slot}` pair as sent by clients.
///
/// `slot` accepts `morning`/`afternoon`/`evening` or the ids `1`/`2`/`3`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DaySlotInput {
    pub day: u32,
    pub slot: String,
}

/// API request for a participant's own registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum RegistrationRequest {
    /// Join the activity with the given slot selection.
    Register {
        #[serde(default)]
        day_slots: Vec<DaySlotInput>,
    },
    /// Leave the activity.
    Unregister,
    /// Replace the registered slot set.
    UpdateSlots { day_slots: Vec<DaySlotInput> },
}

/// API request for officer actions on a participant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ParticipantRequest {
    Approve {
        user_id: i64,
    },
    Reject {
        user_id: i64,
        #[serde(default)]
        reason: Option<String>,
    },
    Remove {
        user_id: i64,
    },
    SetRole {
        user_id: i64,
        /// `leader`, `deputy` or `member`.
        role: String,
    },
}

/// API request to delete a participant entry outright.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteParticipantRequest {
    pub user_id: i64,
}

/// API request for the slot overlap check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckSlotOverlapRequest {
    pub activity_id: i64,
    pub day: u32,
    pub slot: String,
    /// Defaults to the caller.
    #[serde(default)]
    pub user_id: Option<i64>,
}

/// API response for the slot overlap check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckSlotOverlapResponse {
    pub has_overlap: bool,
    pub conflicts: Vec<SlotConflict>,
}

/// API request for the registration-rate pre-check.
///
/// With no slot the activity-wide rate is returned.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationRateRequest {
    #[serde(default)]
    pub day: Option<u32>,
    #[serde(default)]
    pub slot: Option<String>,
}

/// API response for the registration-rate pre-check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationRateResponse {
    pub activity_id: i64,
    pub status: RegistrationStatus,
}

/// API request to record attendance.
///
/// `day` and `slot` are required for multi-day activities and must be
/// omitted together otherwise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordAttendanceRequest {
    pub user_id: i64,
    #[serde(default)]
    pub day: Option<u32>,
    #[serde(default)]
    pub slot: Option<String>,
    /// `present`, `late`, `absent` or `excused`.
    pub status: String,
}

/// API response for the attendance summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceSummaryResponse {
    pub activity_id: i64,
    pub activity_name: String,
    pub participants: Vec<AttendanceSummary>,
}

/// API response for an activity's audit timeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityHistoryResponse {
    pub activity_id: i64,
    pub events: Vec<AuditEvent>,
}

/// API response listing the caller's notifications.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListNotificationsResponse {
    pub notifications: Vec<NotificationData>,
    pub unread_count: usize,
}

/// API response after marking a notification read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkNotificationReadResponse {
    pub notification_id: i64,
    pub message: String,
}

/// A member account as returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserInfo {
    pub user_id: i64,
    pub login_name: String,
    pub display_name: String,
    pub email: String,
    pub role: String,
    pub student_code: Option<String>,
    pub class_name: Option<String>,
}

impl UserInfo {
    /// Builds the API view of a stored user.
    #[must_use]
    pub fn from_user(user: &User) -> Self {
        Self {
            user_id: user.user_id.unwrap_or_default(),
            login_name: user.login_name.clone(),
            display_name: user.display_name.clone(),
            email: user.email.clone(),
            role: user.role.as_str().to_string(),
            student_code: user.student_code.clone(),
            class_name: user.class_name.clone(),
        }
    }
}

/// API response listing users.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListUsersResponse {
    pub users: Vec<UserInfo>,
}

/// API request for the member directory.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchMembersRequest {
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub limit: Option<u32>,
}

/// API request to create a member account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateUserRequest {
    pub login_name: String,
    pub display_name: String,
    pub email: String,
    /// `admin`, `officer` or `student`.
    pub role: String,
    #[serde(default)]
    pub student_code: Option<String>,
    #[serde(default)]
    pub class_name: Option<String>,
}

/// API response after creating a member account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateUserResponse {
    pub user: UserInfo,
    pub event_id: i64,
}

/// API request to issue a bearer session for a user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueSessionRequest {
    /// Session lifetime; the server default applies when absent.
    #[serde(default)]
    pub ttl_hours: Option<u32>,
}

/// API response carrying a new bearer session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueSessionResponse {
    pub user_id: i64,
    pub session_token: String,
    pub expires_at: String,
}
