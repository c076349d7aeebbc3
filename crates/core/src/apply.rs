// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::command::Command;
use crate::error::CoreError;
use crate::state::{Notice, State, TransitionResult};
use clubhub_audit::{Action, Actor, AuditEvent, Cause, StateSnapshot};
use clubhub_domain::{
    Activity, ActivityDraft, ActivityStatus, ApprovalStatus, AttendanceRecord, DaySlot,
    DomainError, Participant, canonicalize_schedule, check_activity_admission,
    validate_activity_fields, validate_slot_selection,
};

/// Validates an activity draft and rebuilds its schedule text.
fn prepare_draft(mut draft: ActivityDraft) -> Result<ActivityDraft, DomainError> {
    validate_activity_fields(&draft)?;
    draft.schedule = canonicalize_schedule(&draft.schedule, draft.location_mode)?;
    Ok(draft)
}

/// Creates a new draft activity.
///
/// # Arguments
///
/// * `draft` - The activity fields
/// * `created_by` - The creating user
/// * `actor` - The actor performing this action
/// * `cause` - The cause or reason for this action
///
/// # Returns
///
/// * `Ok(TransitionResult)` with the new activity (no id yet) and an audit
///   event whose activity id is filled in on persistence
/// * `Err(CoreError)` if the fields or schedule are invalid
///
/// # Errors
///
/// Returns an error if field validation or schedule encoding fails.
pub fn apply_create(
    draft: ActivityDraft,
    created_by: Option<i64>,
    actor: Actor,
    cause: Cause,
) -> Result<TransitionResult, CoreError> {
    let draft: ActivityDraft = prepare_draft(draft)?;
    let new_state: State = State::new(Activity::from_draft(draft, created_by));

    let action: Action = Action::new(
        String::from("CreateActivity"),
        Some(format!("Created activity '{}'", new_state.activity.name)),
    );
    let audit_event: AuditEvent = AuditEvent::new(
        actor,
        cause,
        action,
        StateSnapshot::new(String::from("none")),
        new_state.to_snapshot(),
        None,
    );

    Ok(TransitionResult {
        new_state,
        audit_event,
        notices: Vec::new(),
    })
}

fn require_participant(activity: &Activity, user_id: i64) -> Result<&Participant, DomainError> {
    activity
        .participant(user_id)
        .ok_or(DomainError::ParticipantNotFound { user_id })
}

fn participant_mut(activity: &mut Activity, user_id: i64) -> Result<&mut Participant, DomainError> {
    activity
        .participant_mut(user_id)
        .ok_or(DomainError::ParticipantNotFound { user_id })
}

fn require_status(
    user_id: i64,
    status: ApprovalStatus,
    allowed: &[ApprovalStatus],
    action: &'static str,
) -> Result<(), DomainError> {
    if allowed.contains(&status) {
        return Ok(());
    }
    Err(DomainError::InvalidParticipantTransition {
        user_id,
        status,
        action,
    })
}

fn require_registration_open(activity: &Activity) -> Result<(), DomainError> {
    if !activity.status.accepts_registrations() {
        return Err(DomainError::RegistrationClosed {
            status: activity.status,
        });
    }
    Ok(())
}

fn notice(activity: &Activity, user_id: i64, title: &str, message: String) -> Notice {
    Notice {
        user_id,
        title: format!("{title}: {}", activity.name),
        message,
    }
}

/// Drops registered slots that no longer exist after a schedule change.
fn prune_registered_slots(activity: &mut Activity) {
    let available: Vec<DaySlot> = activity.available_day_slots();
    for participant in &mut activity.participants {
        participant
            .registered_day_slots
            .retain(|ds| available.contains(ds));
    }
}

/// Applies a command to an activity, producing a new state and an audit event.
///
/// This function is pure: the input state is never modified.
///
/// # Arguments
///
/// * `state` - The current activity state (immutable)
/// * `command` - The command to apply
/// * `actor` - The actor performing this action
/// * `cause` - The cause or reason for this action
///
/// # Returns
///
/// * `Ok(TransitionResult)` containing the new state, audit event and any
///   notifications to deliver
/// * `Err(CoreError)` if the command is invalid
///
/// # Errors
///
/// Returns an error if:
/// - The activity has no id yet
/// - The command violates a lifecycle, admission or participant rule
#[allow(clippy::too_many_lines)]
pub fn apply(
    state: &State,
    command: Command,
    actor: Actor,
    cause: Cause,
) -> Result<TransitionResult, CoreError> {
    let activity_id: i64 = state
        .activity
        .activity_id
        .ok_or(CoreError::ActivityNotPersisted)?;
    let name: &'static str = command.name();
    let mut activity: Activity = state.activity.clone();
    let mut notices: Vec<Notice> = Vec::new();

    let details: String = match command {
        Command::UpdateActivity { draft } => {
            if !activity.status.is_editable() {
                return Err(DomainError::ActivityNotEditable {
                    status: activity.status,
                }
                .into());
            }
            let draft: ActivityDraft = prepare_draft(draft)?;
            activity.apply_draft(draft);
            prune_registered_slots(&mut activity);
            format!("Updated activity '{}'", activity.name)
        }
        Command::TransitionStatus { target } => {
            let from: ActivityStatus = activity.status;
            if !from.can_transition_to(target) {
                return Err(DomainError::InvalidStatusTransition { from, to: target }.into());
            }
            activity.status = target;
            format!("Status changed from '{from}' to '{target}'")
        }
        Command::RegisterParticipant {
            user_id,
            name: participant_name,
            email,
            day_slots,
            joined_at,
        } => {
            require_registration_open(&activity)?;
            if let Some(existing) = activity.participant(user_id) {
                if existing.approval_status.counts_toward_capacity() {
                    return Err(DomainError::AlreadyRegistered { user_id }.into());
                }
                // Rule: rejected users may apply again; removed users may not
                require_status(
                    user_id,
                    existing.approval_status,
                    &[ApprovalStatus::Rejected],
                    "register",
                )?;
            }

            let slots: Vec<DaySlot> = if activity.is_multi_day() {
                validate_slot_selection(&activity, user_id, &day_slots)?
            } else {
                check_activity_admission(&activity, user_id)?;
                Vec::new()
            };

            activity.participants.retain(|p| p.user_id != user_id);
            activity.participants.push(Participant::pending(
                user_id,
                participant_name,
                email,
                slots.clone(),
                joined_at,
            ));
            format!("User {user_id} registered for {} slot(s)", slots.len())
        }
        Command::UnregisterParticipant { user_id } => {
            require_registration_open(&activity)?;
            require_participant(&activity, user_id)?;
            activity.participants.retain(|p| p.user_id != user_id);
            format!("User {user_id} unregistered")
        }
        Command::UpdateRegisteredSlots { user_id, day_slots } => {
            require_registration_open(&activity)?;
            let status: ApprovalStatus = require_participant(&activity, user_id)?.approval_status;
            require_status(
                user_id,
                status,
                &[ApprovalStatus::Pending, ApprovalStatus::Approved],
                "update slots for",
            )?;
            let slots: Vec<DaySlot> = validate_slot_selection(&activity, user_id, &day_slots)?;
            let count: usize = slots.len();
            participant_mut(&mut activity, user_id)?.registered_day_slots = slots;
            format!("User {user_id} now holds {count} slot(s)")
        }
        Command::ApproveParticipant { user_id } => {
            let participant: &mut Participant = participant_mut(&mut activity, user_id)?;
            require_status(
                user_id,
                participant.approval_status,
                &[ApprovalStatus::Pending, ApprovalStatus::Rejected],
                "approve",
            )?;
            participant.approval_status = ApprovalStatus::Approved;
            participant.rejection_reason = None;
            notices.push(notice(
                &activity,
                user_id,
                "Registration approved",
                String::from("Your registration has been approved."),
            ));
            format!("User {user_id} approved")
        }
        Command::RejectParticipant { user_id, reason } => {
            let participant: &mut Participant = participant_mut(&mut activity, user_id)?;
            require_status(
                user_id,
                participant.approval_status,
                &[ApprovalStatus::Pending, ApprovalStatus::Approved],
                "reject",
            )?;
            participant.approval_status = ApprovalStatus::Rejected;
            participant.rejection_reason.clone_from(&reason);
            let message: String = reason.as_ref().map_or_else(
                || String::from("Your registration has been rejected."),
                |r| format!("Your registration has been rejected: {r}"),
            );
            notices.push(notice(&activity, user_id, "Registration rejected", message));
            format!("User {user_id} rejected")
        }
        Command::RemoveParticipant { user_id } => {
            let participant: &mut Participant = participant_mut(&mut activity, user_id)?;
            require_status(
                user_id,
                participant.approval_status,
                &[ApprovalStatus::Pending, ApprovalStatus::Approved],
                "remove",
            )?;
            participant.approval_status = ApprovalStatus::Removed;
            notices.push(notice(
                &activity,
                user_id,
                "Removed from activity",
                String::from("You have been removed from this activity."),
            ));
            format!("User {user_id} removed")
        }
        Command::DeleteParticipant { user_id } => {
            require_participant(&activity, user_id)?;
            activity.participants.retain(|p| p.user_id != user_id);
            format!("User {user_id} deleted")
        }
        Command::SetParticipantRole { user_id, role } => {
            let participant: &mut Participant = participant_mut(&mut activity, user_id)?;
            require_status(
                user_id,
                participant.approval_status,
                &[ApprovalStatus::Approved],
                "set role for",
            )?;
            participant.role = role;
            format!("User {user_id} role set to '{role}'")
        }
        Command::RecordAttendance {
            user_id,
            day_slot,
            status,
            recorded_at,
            recorded_by,
        } => {
            if !activity.status.records_attendance() {
                return Err(DomainError::AttendanceClosed {
                    status: activity.status,
                }
                .into());
            }
            let multi_day: bool = activity.is_multi_day();
            let participant: &mut Participant = participant_mut(&mut activity, user_id)?;
            require_status(
                user_id,
                participant.approval_status,
                &[ApprovalStatus::Approved],
                "record attendance for",
            )?;

            let day_slot: Option<DaySlot> = if multi_day {
                let day_slot: DaySlot = day_slot
                    .ok_or_else(|| DomainError::InvalidSlot(String::from("missing day slot")))?;
                if !participant.holds(day_slot) {
                    return Err(DomainError::SlotNotRegistered { user_id, day_slot }.into());
                }
                Some(day_slot)
            } else {
                if let Some(day_slot) = day_slot {
                    return Err(DomainError::InvalidSlot(format!(
                        "single-day activities take no day slot, got {day_slot}"
                    ))
                    .into());
                }
                None
            };

            participant.attendance.retain(|r| r.day_slot != day_slot);
            participant.attendance.push(AttendanceRecord {
                day_slot,
                status,
                recorded_at,
                recorded_by,
            });
            day_slot.map_or_else(
                || format!("User {user_id} marked '{status}'"),
                |ds| format!("User {user_id} marked '{status}' for {ds}"),
            )
        }
    };

    let new_state: State = State::new(activity);
    let audit_event: AuditEvent = AuditEvent::new(
        actor,
        cause,
        Action::new(String::from(name), Some(details)),
        state.to_snapshot(),
        new_state.to_snapshot(),
        Some(activity_id),
    );

    Ok(TransitionResult {
        new_state,
        audit_event,
        notices,
    })
}
