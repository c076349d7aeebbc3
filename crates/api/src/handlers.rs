// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! API handler functions for state-changing and read-only operations.
//!
//! Every write follows the same path: load the activity, authorize the actor
//! against it, apply a core command, run the checks that need other
//! activities (slot overlap), then persist the transition together with its
//! audit event. Callers serialize access to the persistence layer, so the
//! sequence is never interleaved with another write.

use std::str::FromStr;

use clubhub::{Command, State, TransitionResult, apply, apply_create};
use clubhub_audit::{Action, AuditEvent, Cause, StateSnapshot};
use clubhub_domain::{
    Activity, ActivityDraft, ActivityStatus, AttendanceStatus, DEFAULT_REGISTRATION_THRESHOLD,
    DaySlot, DomainError, LocationMode, ParticipantRole, SlotConflict, SlotKind, User, UserRole,
    find_selection_overlaps, find_slot_overlaps, infer_location_mode, parse_date,
    registration_status,
    summarize_attendance, validate_threshold, validate_user_fields,
};
use clubhub_persistence::{
    ActivityRecord, NotificationData, PersistTransitionResult, Persistence, PersistenceError,
};
use time::format_description::well_known::Rfc3339;
use time::{Date, Duration, OffsetDateTime};
use tracing::{debug, info};

use crate::auth::{AuthenticatedActor, AuthenticationService, AuthorizationService, IssuedSession};
use crate::error::{
    ApiError, translate_core_error, translate_domain_error, translate_persistence_error,
};
use crate::export::attendance_summary_csv;
use crate::request_response::{
    ActivityHistoryResponse, ActivityInfo, ActivityWriteResponse, AttendanceSummaryResponse,
    CheckSlotOverlapRequest, CheckSlotOverlapResponse, CreateUserRequest, CreateUserResponse,
    DaySlotInput, DeleteParticipantRequest, IssueSessionRequest, IssueSessionResponse,
    ListActivitiesResponse, ListNotificationsResponse, ListUsersResponse,
    MarkNotificationReadResponse, ParticipantRequest, RecordAttendanceRequest,
    RegistrationRateRequest, RegistrationRateResponse, RegistrationRequest, SaveActivityRequest,
    SearchMembersRequest, TransitionStatusRequest, UserInfo,
};

/// Default page size of the member directory.
pub const DEFAULT_MEMBER_SEARCH_LIMIT: u32 = 50;

/// Largest page the member directory returns.
pub const MAX_MEMBER_SEARCH_LIMIT: u32 = 200;

// ============================================================================
// Helpers
// ============================================================================

fn now_rfc3339() -> Result<String, ApiError> {
    OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .map_err(|e| ApiError::Internal {
            message: format!("Failed to format timestamp: {e}"),
        })
}

fn parse_slot(raw: &str) -> Result<SlotKind, ApiError> {
    SlotKind::from_str(raw).map_err(translate_domain_error)
}

fn parse_day_slots(inputs: &[DaySlotInput]) -> Result<Vec<DaySlot>, ApiError> {
    inputs
        .iter()
        .map(|input| Ok(DaySlot::new(input.day, parse_slot(&input.slot)?)))
        .collect()
}

/// Combines an optional day and slot. Both or neither must be present.
fn parse_optional_day_slot(
    day: Option<u32>,
    slot: Option<&str>,
) -> Result<Option<DaySlot>, ApiError> {
    match (day, slot) {
        (Some(day), Some(slot)) => Ok(Some(DaySlot::new(day, parse_slot(slot)?))),
        (None, None) => Ok(None),
        _ => Err(ApiError::InvalidInput {
            field: String::from("slot"),
            message: String::from("day and slot must be given together"),
        }),
    }
}

fn load_activity(
    persistence: &mut Persistence,
    activity_id: i64,
) -> Result<ActivityRecord, ApiError> {
    persistence
        .get_activity(activity_id)
        .map_err(translate_persistence_error)
}

/// Loads an activity the actor is allowed to see.
///
/// Hidden activities are reported as missing.
fn load_visible_activity(
    persistence: &mut Persistence,
    activity_id: i64,
    actor: &AuthenticatedActor,
) -> Result<ActivityRecord, ApiError> {
    let record: ActivityRecord = load_activity(persistence, activity_id)?;
    if !AuthorizationService::can_view_activity(actor, &record.activity) {
        return Err(translate_persistence_error(
            PersistenceError::ActivityNotFound(activity_id),
        ));
    }
    Ok(record)
}

fn activity_info(record: &ActivityRecord) -> ActivityInfo {
    ActivityInfo {
        activity_id: record.activity.activity_id.unwrap_or_default(),
        activity: record.activity.clone(),
        registration: registration_status(&record.activity, None, None),
        created_at: record.created_at.clone(),
        updated_at: record.updated_at.clone(),
    }
}

fn write_response(
    persistence: &mut Persistence,
    ids: PersistTransitionResult,
    result: &TransitionResult,
) -> Result<ActivityWriteResponse, ApiError> {
    let record: ActivityRecord = load_activity(persistence, ids.activity_id)?;
    Ok(ActivityWriteResponse {
        activity: activity_info(&record),
        event_id: ids.event_id,
        action: result.audit_event.action.name.clone(),
        message: result.audit_event.action.details.clone().unwrap_or_default(),
    })
}

/// Applies a command to a stored activity and persists the transition.
fn apply_and_persist(
    persistence: &mut Persistence,
    activity: Activity,
    command: Command,
    actor: &AuthenticatedActor,
    cause: Cause,
) -> Result<ActivityWriteResponse, ApiError> {
    let state: State = State::new(activity);
    let result: TransitionResult =
        apply(&state, command, actor.to_audit_actor(), cause).map_err(translate_core_error)?;
    persist_result(persistence, &result)
}

fn persist_result(
    persistence: &mut Persistence,
    result: &TransitionResult,
) -> Result<ActivityWriteResponse, ApiError> {
    let ids: PersistTransitionResult = persistence
        .persist_transition(result)
        .map_err(translate_persistence_error)?;
    info!(
        activity_id = ids.activity_id,
        event_id = ids.event_id,
        action = %result.audit_event.action.name,
        "Persisted activity write"
    );
    write_response(persistence, ids, result)
}

/// Checks that every responsible person exists and may hold the role.
fn check_responsible_persons(
    persistence: &mut Persistence,
    user_ids: &[i64],
) -> Result<(), ApiError> {
    for user_id in user_ids {
        let user: User = persistence
            .get_user_by_id(*user_id)
            .map_err(translate_persistence_error)?
            .ok_or_else(|| ApiError::InvalidInput {
                field: String::from("responsible_persons"),
                message: format!("User {user_id} does not exist"),
            })?;
        if !user.role.can_be_responsible() {
            return Err(ApiError::InvalidInput {
                field: String::from("responsible_persons"),
                message: format!(
                    "User {user_id} has role '{}' and cannot be a responsible person",
                    user.role
                ),
            });
        }
    }
    Ok(())
}

/// Translates an activity request into a domain draft.
fn build_draft(
    persistence: &mut Persistence,
    request: SaveActivityRequest,
) -> Result<ActivityDraft, ApiError> {
    let start_date: Date = parse_date(&request.start_date).map_err(|e| match e {
        DomainError::DateParseError { .. } => ApiError::InvalidInput {
            field: String::from("start_date"),
            message: e.to_string(),
        },
        other => translate_domain_error(other),
    })?;
    let end_date: Date = parse_date(&request.end_date).map_err(|e| match e {
        DomainError::DateParseError { .. } => ApiError::InvalidInput {
            field: String::from("end_date"),
            message: e.to_string(),
        },
        other => translate_domain_error(other),
    })?;
    let registration_threshold: u8 = match request.registration_threshold {
        Some(value) => validate_threshold(value).map_err(translate_domain_error)?,
        None => DEFAULT_REGISTRATION_THRESHOLD,
    };

    check_responsible_persons(persistence, &request.responsible_persons)?;

    let location_mode: LocationMode = request
        .location_mode
        .unwrap_or_else(|| infer_location_mode(&request.schedule));

    Ok(ActivityDraft {
        name: request.name,
        description: request.description,
        activity_type: request.activity_type,
        start_date,
        end_date,
        location_mode,
        location: request.location,
        max_participants: request.max_participants,
        registration_threshold,
        visibility: request.visibility,
        responsible_persons: request.responsible_persons,
        schedule: request.schedule,
    })
}

/// Rejects a registration whose slots collide with the user's other activities.
fn check_registration_overlaps(
    persistence: &mut Persistence,
    activity: &Activity,
    user_id: i64,
) -> Result<(), ApiError> {
    if !activity.is_multi_day() {
        return Ok(());
    }
    let selection: Vec<DaySlot> = activity
        .participant(user_id)
        .map(|p| p.registered_day_slots.clone())
        .unwrap_or_default();
    if selection.is_empty() {
        return Ok(());
    }

    let others: Vec<Activity> = persistence
        .list_activities_for_participant(user_id)
        .map_err(translate_persistence_error)?;
    let conflicts: Vec<SlotConflict> =
        find_selection_overlaps(activity, &selection, user_id, &others)
            .map_err(translate_domain_error)?;

    if conflicts.is_empty() {
        return Ok(());
    }
    debug!(user_id, count = conflicts.len(), "Registration overlaps other activities");
    Err(translate_domain_error(DomainError::SlotOverlap { conflicts }))
}

// ============================================================================
// Activities
// ============================================================================

/// Lists the activities visible to the actor, newest start date first.
///
/// # Errors
///
/// Returns an error if the activities cannot be loaded.
pub fn list_activities(
    persistence: &mut Persistence,
    actor: &AuthenticatedActor,
) -> Result<ListActivitiesResponse, ApiError> {
    let records: Vec<ActivityRecord> = persistence
        .list_activities()
        .map_err(translate_persistence_error)?;

    let activities: Vec<ActivityInfo> = records
        .iter()
        .filter(|r| AuthorizationService::can_view_activity(actor, &r.activity))
        .map(activity_info)
        .collect();

    Ok(ListActivitiesResponse { activities })
}

/// Fetches one activity.
///
/// # Errors
///
/// Returns `ResourceNotFound` if the activity does not exist or is hidden
/// from the actor.
pub fn get_activity(
    persistence: &mut Persistence,
    activity_id: i64,
    actor: &AuthenticatedActor,
) -> Result<ActivityInfo, ApiError> {
    let record: ActivityRecord = load_visible_activity(persistence, activity_id, actor)?;
    Ok(activity_info(&record))
}

/// Creates an activity in `draft` status.
///
/// # Errors
///
/// Returns an error if:
/// - The actor is not an admin
/// - A field, date or the threshold is invalid
/// - A responsible person does not exist or is a student
/// - The schedule cannot be encoded
pub fn create_activity(
    persistence: &mut Persistence,
    request: SaveActivityRequest,
    actor: &AuthenticatedActor,
    cause: Cause,
) -> Result<ActivityWriteResponse, ApiError> {
    AuthorizationService::authorize_admin(actor, "create_activity")?;

    let draft: ActivityDraft = build_draft(persistence, request)?;
    let result: TransitionResult =
        apply_create(draft, Some(actor.user_id), actor.to_audit_actor(), cause)
            .map_err(translate_core_error)?;

    let ids: PersistTransitionResult = persistence
        .persist_new_activity(&result)
        .map_err(translate_persistence_error)?;
    info!(
        activity_id = ids.activity_id,
        event_id = ids.event_id,
        created_by = actor.user_id,
        "Created activity"
    );
    write_response(persistence, ids, &result)
}

/// Replaces an activity's editable fields. The schedule is rebuilt wholesale.
///
/// # Errors
///
/// Returns an error if the actor is not an admin, the activity does not
/// exist or is no longer editable, or the request is invalid.
pub fn update_activity(
    persistence: &mut Persistence,
    activity_id: i64,
    request: SaveActivityRequest,
    actor: &AuthenticatedActor,
    cause: Cause,
) -> Result<ActivityWriteResponse, ApiError> {
    AuthorizationService::authorize_admin(actor, "update_activity")?;

    let record: ActivityRecord = load_activity(persistence, activity_id)?;
    let draft: ActivityDraft = build_draft(persistence, request)?;
    apply_and_persist(
        persistence,
        record.activity,
        Command::UpdateActivity { draft },
        actor,
        cause,
    )
}

/// Moves an activity to another lifecycle status.
///
/// # Errors
///
/// Returns an error if the actor may not manage the activity, the status is
/// unknown, or the transition is not allowed.
pub fn transition_status(
    persistence: &mut Persistence,
    activity_id: i64,
    request: &TransitionStatusRequest,
    actor: &AuthenticatedActor,
    cause: Cause,
) -> Result<ActivityWriteResponse, ApiError> {
    let record: ActivityRecord = load_activity(persistence, activity_id)?;
    AuthorizationService::authorize_manage_activity(actor, &record.activity, "transition_status")?;

    let target: ActivityStatus =
        ActivityStatus::from_str(&request.status).map_err(translate_domain_error)?;
    apply_and_persist(
        persistence,
        record.activity,
        Command::TransitionStatus { target },
        actor,
        cause,
    )
}

// ============================================================================
// Registration
// ============================================================================

/// Registers, unregisters or updates the slots of the calling user.
///
/// Registration and slot updates on multi-day activities are checked
/// against the user's other registrations; a collision is a `Conflict`.
///
/// # Errors
///
/// Returns an error if:
/// - The activity does not exist or is hidden from the actor
/// - Registration is closed, or the participant rules reject the change
/// - The admission threshold or minimum slot selection is not met
/// - A selected slot overlaps another activity the user holds
pub fn update_registration(
    persistence: &mut Persistence,
    activity_id: i64,
    request: &RegistrationRequest,
    actor: &AuthenticatedActor,
    user: &User,
    cause: Cause,
) -> Result<ActivityWriteResponse, ApiError> {
    let record: ActivityRecord = load_visible_activity(persistence, activity_id, actor)?;

    let (command, check_overlaps): (Command, bool) = match request {
        RegistrationRequest::Register { day_slots } => (
            Command::RegisterParticipant {
                user_id: actor.user_id,
                name: user.display_name.clone(),
                email: user.email.clone(),
                day_slots: parse_day_slots(day_slots)?,
                joined_at: now_rfc3339()?,
            },
            true,
        ),
        RegistrationRequest::Unregister => (
            Command::UnregisterParticipant {
                user_id: actor.user_id,
            },
            false,
        ),
        RegistrationRequest::UpdateSlots { day_slots } => (
            Command::UpdateRegisteredSlots {
                user_id: actor.user_id,
                day_slots: parse_day_slots(day_slots)?,
            },
            true,
        ),
    };

    let state: State = State::new(record.activity);
    let result: TransitionResult =
        apply(&state, command, actor.to_audit_actor(), cause).map_err(translate_core_error)?;

    if check_overlaps {
        check_registration_overlaps(persistence, &result.new_state.activity, actor.user_id)?;
    }

    persist_result(persistence, &result)
}

/// Officer actions on a participant: approve, reject, remove or set role.
///
/// # Errors
///
/// Returns an error if the actor may not manage the activity, the
/// participant does not exist, or its approval status forbids the action.
pub fn manage_participant(
    persistence: &mut Persistence,
    activity_id: i64,
    request: ParticipantRequest,
    actor: &AuthenticatedActor,
    cause: Cause,
) -> Result<ActivityWriteResponse, ApiError> {
    let record: ActivityRecord = load_activity(persistence, activity_id)?;
    AuthorizationService::authorize_manage_activity(actor, &record.activity, "manage_participant")?;

    let command: Command = match request {
        ParticipantRequest::Approve { user_id } => Command::ApproveParticipant { user_id },
        ParticipantRequest::Reject { user_id, reason } => Command::RejectParticipant {
            user_id,
            reason: reason.filter(|r| !r.trim().is_empty()),
        },
        ParticipantRequest::Remove { user_id } => Command::RemoveParticipant { user_id },
        ParticipantRequest::SetRole { user_id, role } => Command::SetParticipantRole {
            user_id,
            role: ParticipantRole::from_str(&role).map_err(translate_domain_error)?,
        },
    };

    apply_and_persist(persistence, record.activity, command, actor, cause)
}

/// Deletes a participant entry outright.
///
/// # Errors
///
/// Returns an error if the actor may not manage the activity or the
/// participant does not exist.
pub fn delete_participant(
    persistence: &mut Persistence,
    activity_id: i64,
    request: &DeleteParticipantRequest,
    actor: &AuthenticatedActor,
    cause: Cause,
) -> Result<ActivityWriteResponse, ApiError> {
    let record: ActivityRecord = load_activity(persistence, activity_id)?;
    AuthorizationService::authorize_manage_activity(actor, &record.activity, "delete_participant")?;

    apply_and_persist(
        persistence,
        record.activity,
        Command::DeleteParticipant {
            user_id: request.user_id,
        },
        actor,
        cause,
    )
}

/// Reports the user's registrations elsewhere that collide with one slot.
///
/// # Errors
///
/// Returns an error if a student checks another user, the activity is not
/// visible, or the slot does not exist in its schedule.
pub fn check_slot_overlap(
    persistence: &mut Persistence,
    request: &CheckSlotOverlapRequest,
    actor: &AuthenticatedActor,
) -> Result<CheckSlotOverlapResponse, ApiError> {
    let user_id: i64 = request.user_id.unwrap_or(actor.user_id);
    AuthorizationService::authorize_self_or_staff(actor, user_id, "check_slot_overlap")?;

    let record: ActivityRecord = load_visible_activity(persistence, request.activity_id, actor)?;
    let day_slot: DaySlot = DaySlot::new(request.day, parse_slot(&request.slot)?);
    let others: Vec<Activity> = persistence
        .list_activities_for_participant(user_id)
        .map_err(translate_persistence_error)?;

    let conflicts: Vec<SlotConflict> =
        find_slot_overlaps(&record.activity, day_slot, user_id, &others)
            .map_err(translate_domain_error)?;

    Ok(CheckSlotOverlapResponse {
        has_overlap: !conflicts.is_empty(),
        conflicts,
    })
}

/// Returns the registration rate for the activity or one of its slots.
///
/// The caller's own registration is left out of the count.
///
/// # Errors
///
/// Returns an error if the activity is not visible or only one of day and
/// slot is given.
pub fn get_registration_rate(
    persistence: &mut Persistence,
    activity_id: i64,
    request: &RegistrationRateRequest,
    actor: &AuthenticatedActor,
) -> Result<RegistrationRateResponse, ApiError> {
    let record: ActivityRecord = load_visible_activity(persistence, activity_id, actor)?;
    let day_slot: Option<DaySlot> = parse_optional_day_slot(request.day, request.slot.as_deref())?;

    Ok(RegistrationRateResponse {
        activity_id,
        status: registration_status(&record.activity, day_slot, Some(actor.user_id)),
    })
}

// ============================================================================
// Attendance
// ============================================================================

/// Summarizes attendance of approved participants.
///
/// # Errors
///
/// Returns an error if the actor may not manage the activity.
pub fn get_attendance_summary(
    persistence: &mut Persistence,
    activity_id: i64,
    actor: &AuthenticatedActor,
) -> Result<AttendanceSummaryResponse, ApiError> {
    let record: ActivityRecord = load_activity(persistence, activity_id)?;
    AuthorizationService::authorize_manage_activity(actor, &record.activity, "view_attendance")?;

    Ok(AttendanceSummaryResponse {
        activity_id,
        activity_name: record.activity.name.clone(),
        participants: summarize_attendance(&record.activity),
    })
}

/// Renders the attendance summary as CSV.
///
/// # Errors
///
/// Returns an error if the actor may not manage the activity or the CSV
/// cannot be written.
pub fn export_attendance_csv(
    persistence: &mut Persistence,
    activity_id: i64,
    actor: &AuthenticatedActor,
) -> Result<String, ApiError> {
    let summary: AttendanceSummaryResponse = get_attendance_summary(persistence, activity_id, actor)?;
    attendance_summary_csv(&summary.participants)
}

/// Records attendance for one approved participant.
///
/// # Errors
///
/// Returns an error if the actor may not manage the activity, the status is
/// unknown, or the participant or slot does not allow the record.
pub fn record_attendance(
    persistence: &mut Persistence,
    activity_id: i64,
    request: &RecordAttendanceRequest,
    actor: &AuthenticatedActor,
    cause: Cause,
) -> Result<ActivityWriteResponse, ApiError> {
    let record: ActivityRecord = load_activity(persistence, activity_id)?;
    AuthorizationService::authorize_manage_activity(actor, &record.activity, "record_attendance")?;

    let status: AttendanceStatus =
        AttendanceStatus::from_str(&request.status).map_err(translate_domain_error)?;
    let day_slot: Option<DaySlot> = parse_optional_day_slot(request.day, request.slot.as_deref())?;

    apply_and_persist(
        persistence,
        record.activity,
        Command::RecordAttendance {
            user_id: request.user_id,
            day_slot,
            status,
            recorded_at: now_rfc3339()?,
            recorded_by: actor.user_id,
        },
        actor,
        cause,
    )
}

// ============================================================================
// Audit
// ============================================================================

/// Returns an activity's audit timeline, oldest first.
///
/// # Errors
///
/// Returns an error if the actor may not manage the activity.
pub fn get_activity_history(
    persistence: &mut Persistence,
    activity_id: i64,
    actor: &AuthenticatedActor,
) -> Result<ActivityHistoryResponse, ApiError> {
    let record: ActivityRecord = load_activity(persistence, activity_id)?;
    AuthorizationService::authorize_manage_activity(actor, &record.activity, "view_history")?;

    let events: Vec<AuditEvent> = persistence
        .get_activity_history(activity_id)
        .map_err(translate_persistence_error)?;
    Ok(ActivityHistoryResponse { activity_id, events })
}

// ============================================================================
// Notifications
// ============================================================================

/// Lists the caller's notifications, newest first.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn list_notifications(
    persistence: &mut Persistence,
    actor: &AuthenticatedActor,
    unread_only: bool,
) -> Result<ListNotificationsResponse, ApiError> {
    let notifications: Vec<NotificationData> = persistence
        .list_notifications(actor.user_id, unread_only)
        .map_err(translate_persistence_error)?;
    let unread_count: usize = notifications.iter().filter(|n| !n.is_read).count();

    Ok(ListNotificationsResponse {
        notifications,
        unread_count,
    })
}

/// Marks one of the caller's notifications read.
///
/// # Errors
///
/// Returns `ResourceNotFound` if the notification does not belong to the caller.
pub fn mark_notification_read(
    persistence: &mut Persistence,
    notification_id: i64,
    actor: &AuthenticatedActor,
) -> Result<MarkNotificationReadResponse, ApiError> {
    persistence
        .mark_notification_read(notification_id, actor.user_id)
        .map_err(translate_persistence_error)?;

    Ok(MarkNotificationReadResponse {
        notification_id,
        message: String::from("Notification marked as read"),
    })
}

// ============================================================================
// Users & Sessions
// ============================================================================

/// Lists the officers and admins that can be made responsible for an activity.
///
/// # Errors
///
/// Returns an error if the actor is a student or the query fails.
pub fn list_responsible_persons(
    persistence: &mut Persistence,
    actor: &AuthenticatedActor,
) -> Result<ListUsersResponse, ApiError> {
    AuthorizationService::authorize_staff(actor, "list_responsible_persons")?;

    let users: Vec<User> = persistence
        .list_users_with_roles(&[UserRole::Admin, UserRole::Officer])
        .map_err(translate_persistence_error)?;
    Ok(ListUsersResponse {
        users: users.iter().map(UserInfo::from_user).collect(),
    })
}

/// Searches the member directory.
///
/// The limit defaults to 50 and is capped at 200.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn search_members(
    persistence: &mut Persistence,
    request: &SearchMembersRequest,
    _actor: &AuthenticatedActor,
) -> Result<ListUsersResponse, ApiError> {
    let limit: u32 = request
        .limit
        .unwrap_or(DEFAULT_MEMBER_SEARCH_LIMIT)
        .clamp(1, MAX_MEMBER_SEARCH_LIMIT);

    let users: Vec<User> = persistence
        .search_members(request.search.as_deref(), i64::from(limit))
        .map_err(translate_persistence_error)?;
    Ok(ListUsersResponse {
        users: users.iter().map(UserInfo::from_user).collect(),
    })
}

/// Creates a member account and records an audit event for it.
///
/// # Errors
///
/// Returns an error if:
/// - The actor is not an admin
/// - The role is unknown or a field is invalid
/// - The login name is already taken
pub fn create_user(
    persistence: &mut Persistence,
    request: CreateUserRequest,
    actor: &AuthenticatedActor,
    cause: Cause,
) -> Result<CreateUserResponse, ApiError> {
    AuthorizationService::authorize_admin(actor, "create_user")?;

    let role: UserRole = UserRole::from_str(&request.role).map_err(translate_domain_error)?;
    let mut user: User = User {
        user_id: None,
        login_name: request.login_name.trim().to_string(),
        display_name: request.display_name.trim().to_string(),
        email: request.email.trim().to_string(),
        role,
        student_code: request.student_code.filter(|s| !s.trim().is_empty()),
        class_name: request.class_name.filter(|s| !s.trim().is_empty()),
    };
    validate_user_fields(&user).map_err(translate_domain_error)?;

    let (user_id, event_id): (i64, i64) = persistence
        .create_user_with_audit(&user, |user_id| {
            AuditEvent::new(
                actor.to_audit_actor(),
                cause,
                Action::new(
                    String::from("CreateUser"),
                    Some(format!(
                        "Created user {} ({}) with role {}",
                        user.login_name, user.display_name, user.role
                    )),
                ),
                StateSnapshot::new(String::from("user_does_not_exist")),
                StateSnapshot::new(format!(
                    "user_id={user_id},login_name={},role={}",
                    user.login_name, user.role
                )),
                None,
            )
        })
        .map_err(translate_persistence_error)?;
    user.user_id = Some(user_id);

    info!(user_id, event_id, login_name = %user.login_name, "Created user");
    Ok(CreateUserResponse {
        user: UserInfo::from_user(&user),
        event_id,
    })
}

/// Issues a bearer session for a user.
///
/// # Errors
///
/// Returns an error if the actor is not an admin, the user does not exist,
/// the lifetime is zero, or the session cannot be stored.
pub fn issue_session(
    persistence: &mut Persistence,
    user_id: i64,
    request: &IssueSessionRequest,
    default_ttl: Duration,
    actor: &AuthenticatedActor,
    cause: Cause,
) -> Result<IssueSessionResponse, ApiError> {
    AuthorizationService::authorize_admin(actor, "issue_session")?;

    persistence
        .get_user_by_id(user_id)
        .map_err(translate_persistence_error)?
        .ok_or_else(|| ApiError::ResourceNotFound {
            resource_type: String::from("User"),
            message: format!("User {user_id} does not exist"),
        })?;

    let ttl: Duration = match request.ttl_hours {
        Some(0) => {
            return Err(ApiError::InvalidInput {
                field: String::from("ttl_hours"),
                message: String::from("Session lifetime must be at least one hour"),
            });
        }
        Some(hours) => Duration::hours(i64::from(hours)),
        None => default_ttl,
    };

    AuthenticationService::prune_expired_sessions(persistence)?;
    let session: IssuedSession =
        AuthenticationService::prepare_session(AuthenticationService::generate_session_token(), ttl)?;

    let audit_event: AuditEvent = AuditEvent::new(
        actor.to_audit_actor(),
        cause,
        Action::new(
            String::from("IssueSession"),
            Some(format!(
                "Issued session for user {user_id} until {}",
                session.expires_at
            )),
        ),
        StateSnapshot::new(String::new()),
        StateSnapshot::new(format!("user_id={user_id},expires_at={}", session.expires_at)),
        None,
    );
    persistence
        .create_session_with_audit(
            &session.session_token,
            user_id,
            &session.expires_at,
            &audit_event,
        )
        .map_err(translate_persistence_error)?;

    info!(user_id, expires_at = %session.expires_at, "Issued session");
    Ok(IssueSessionResponse {
        user_id,
        session_token: session.session_token,
        expires_at: session.expires_at,
    })
}

/// Ends the caller's session.
///
/// # Errors
///
/// Returns an error if the session cannot be deleted.
pub fn logout(persistence: &mut Persistence, session_token: &str) -> Result<(), ApiError> {
    AuthenticationService::logout(persistence, session_token)?;
    Ok(())
}
