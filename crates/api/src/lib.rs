// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! API boundary for ClubHub.
//!
//! Handlers here authenticate and authorize the caller, translate requests
//! into core commands, run the checks that need other activities, and
//! persist the result. Domain, core and persistence errors are translated
//! into [`ApiError`] explicitly so that none of them leak past this crate.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all
)]

mod auth;
mod error;
mod export;
mod handlers;
mod request_response;

#[cfg(test)]
mod tests;

pub use auth::{AuthenticatedActor, AuthenticationService, AuthorizationService, IssuedSession};
pub use error::{
    ApiError, AuthError, translate_core_error, translate_domain_error,
    translate_persistence_error,
};
pub use export::{ATTENDANCE_CSV_HEADERS, attendance_summary_csv};
pub use handlers::{
    DEFAULT_MEMBER_SEARCH_LIMIT, MAX_MEMBER_SEARCH_LIMIT, check_slot_overlap, create_activity,
    create_user, delete_participant, export_attendance_csv, get_activity, get_activity_history,
    get_attendance_summary, get_registration_rate, issue_session, list_activities,
    list_notifications, list_responsible_persons, logout, manage_participant,
    mark_notification_read, record_attendance, search_members, transition_status,
    update_activity, update_registration,
};
pub use request_response::{
    ActivityHistoryResponse, ActivityInfo, ActivityWriteResponse, AttendanceSummaryResponse,
    CheckSlotOverlapRequest, CheckSlotOverlapResponse, CreateUserRequest, CreateUserResponse,
    DaySlotInput, DeleteParticipantRequest, IssueSessionRequest, IssueSessionResponse,
    ListActivitiesResponse, ListNotificationsResponse, ListUsersResponse,
    MarkNotificationReadResponse, ParticipantRequest, RecordAttendanceRequest,
    RegistrationRateRequest, RegistrationRateResponse, RegistrationRequest, SaveActivityRequest,
    SearchMembersRequest, TransitionStatusRequest, UserInfo,
};
