// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Activity aggregate persistence.
//!
//! Every transition rewrites the whole aggregate: the activity row is updated
//! and its responsible persons, participants and attendance rows are replaced.
//! The audit event and any notices are written in the same transaction.

use clubhub::{Notice, TransitionResult};
use clubhub_audit::AuditEvent;
use clubhub_domain::{Activity, Participant};
use diesel::SqliteConnection;
use diesel::prelude::*;
use num_traits::ToPrimitive;
use tracing::{debug, info};

use crate::backend::sqlite::last_insert_rowid;
use crate::diesel_schema::{
    activities, activity_responsible_persons, attendance_records, audit_events, notifications,
    participants,
};
use crate::error::PersistenceError;

/// Identifiers assigned while persisting a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PersistTransitionResult {
    pub activity_id: i64,
    pub event_id: i64,
}

fn position(index: usize) -> Result<i32, PersistenceError> {
    index
        .to_i32()
        .ok_or_else(|| PersistenceError::QueryFailed(format!("position {index} out of range")))
}

fn encode_optional_location(activity: &Activity) -> Result<Option<String>, PersistenceError> {
    Ok(activity
        .location
        .as_ref()
        .map(serde_json::to_string)
        .transpose()?)
}

fn insert_activity_row(
    conn: &mut SqliteConnection,
    activity: &Activity,
) -> Result<i64, PersistenceError> {
    let location_json: Option<String> = encode_optional_location(activity)?;
    let schedule_json: String = serde_json::to_string(&activity.schedule)?;

    diesel::insert_into(activities::table)
        .values((
            activities::name.eq(&activity.name),
            activities::description.eq(&activity.description),
            activities::activity_type.eq(activity.activity_type.as_str()),
            activities::start_date.eq(activity.start_date.to_string()),
            activities::end_date.eq(activity.end_date.to_string()),
            activities::location_mode.eq(activity.location_mode.as_str()),
            activities::location_json.eq(location_json),
            activities::max_participants.eq(activity.max_participants.map(i64::from)),
            activities::registration_threshold.eq(i32::from(activity.registration_threshold)),
            activities::visibility.eq(activity.visibility.as_str()),
            activities::status.eq(activity.status.as_str()),
            activities::schedule_json.eq(schedule_json),
            activities::created_by.eq(activity.created_by),
        ))
        .execute(conn)?;

    last_insert_rowid(conn)
}

fn update_activity_row(
    conn: &mut SqliteConnection,
    activity_id: i64,
    activity: &Activity,
) -> Result<(), PersistenceError> {
    let location_json: Option<String> = encode_optional_location(activity)?;
    let schedule_json: String = serde_json::to_string(&activity.schedule)?;

    let rows_affected: usize = diesel::update(activities::table)
        .filter(activities::activity_id.eq(activity_id))
        .set((
            activities::name.eq(&activity.name),
            activities::description.eq(&activity.description),
            activities::activity_type.eq(activity.activity_type.as_str()),
            activities::start_date.eq(activity.start_date.to_string()),
            activities::end_date.eq(activity.end_date.to_string()),
            activities::location_mode.eq(activity.location_mode.as_str()),
            activities::location_json.eq(location_json),
            activities::max_participants.eq(activity.max_participants.map(i64::from)),
            activities::registration_threshold.eq(i32::from(activity.registration_threshold)),
            activities::visibility.eq(activity.visibility.as_str()),
            activities::status.eq(activity.status.as_str()),
            activities::schedule_json.eq(schedule_json),
            activities::updated_at.eq(diesel::dsl::sql::<diesel::sql_types::Text>(
                "CURRENT_TIMESTAMP",
            )),
        ))
        .execute(conn)?;

    if rows_affected == 0 {
        return Err(PersistenceError::ActivityNotFound(activity_id));
    }
    Ok(())
}

fn insert_participant(
    conn: &mut SqliteConnection,
    activity_id: i64,
    index: usize,
    participant: &Participant,
) -> Result<(), PersistenceError> {
    let slots_json: String = serde_json::to_string(&participant.registered_day_slots)?;

    diesel::insert_into(participants::table)
        .values((
            participants::activity_id.eq(activity_id),
            participants::user_id.eq(participant.user_id),
            participants::position.eq(position(index)?),
            participants::name.eq(&participant.name),
            participants::email.eq(&participant.email),
            participants::role.eq(participant.role.as_str()),
            participants::approval_status.eq(participant.approval_status.as_str()),
            participants::registered_day_slots_json.eq(slots_json),
            participants::rejection_reason.eq(participant.rejection_reason.as_deref()),
            participants::joined_at.eq(&participant.joined_at),
        ))
        .execute(conn)?;

    for record in &participant.attendance {
        let day: Option<i32> = record
            .day_slot
            .map(|ds| {
                ds.day.to_i32().ok_or_else(|| {
                    PersistenceError::QueryFailed(format!("day {} out of range", ds.day))
                })
            })
            .transpose()?;
        diesel::insert_into(attendance_records::table)
            .values((
                attendance_records::activity_id.eq(activity_id),
                attendance_records::user_id.eq(participant.user_id),
                attendance_records::day.eq(day),
                attendance_records::slot.eq(record.day_slot.map(|ds| ds.slot.as_str())),
                attendance_records::status.eq(record.status.as_str()),
                attendance_records::recorded_at.eq(&record.recorded_at),
                attendance_records::recorded_by.eq(record.recorded_by),
            ))
            .execute(conn)?;
    }

    Ok(())
}

/// Replaces the child rows of an activity with those of `activity`.
fn replace_children(
    conn: &mut SqliteConnection,
    activity_id: i64,
    activity: &Activity,
) -> Result<(), PersistenceError> {
    diesel::delete(
        activity_responsible_persons::table
            .filter(activity_responsible_persons::activity_id.eq(activity_id)),
    )
    .execute(conn)?;
    diesel::delete(
        attendance_records::table.filter(attendance_records::activity_id.eq(activity_id)),
    )
    .execute(conn)?;
    diesel::delete(participants::table.filter(participants::activity_id.eq(activity_id)))
        .execute(conn)?;

    for (index, user_id) in activity.responsible_persons.iter().enumerate() {
        diesel::insert_into(activity_responsible_persons::table)
            .values((
                activity_responsible_persons::activity_id.eq(activity_id),
                activity_responsible_persons::user_id.eq(user_id),
                activity_responsible_persons::position.eq(position(index)?),
            ))
            .execute(conn)?;
    }

    for (index, participant) in activity.participants.iter().enumerate() {
        insert_participant(conn, activity_id, index, participant)?;
    }

    Ok(())
}

fn insert_notices(
    conn: &mut SqliteConnection,
    activity_id: i64,
    notices: &[Notice],
) -> Result<(), PersistenceError> {
    for notice in notices {
        diesel::insert_into(notifications::table)
            .values((
                notifications::user_id.eq(notice.user_id),
                notifications::activity_id.eq(Some(activity_id)),
                notifications::title.eq(&notice.title),
                notifications::message.eq(&notice.message),
            ))
            .execute(conn)?;
    }
    Ok(())
}

/// Persists an audit event and returns its ID.
///
/// # Errors
///
/// Returns an error if serialization or the insert fails.
pub fn persist_audit_event(
    conn: &mut SqliteConnection,
    event: &AuditEvent,
) -> Result<i64, PersistenceError> {
    diesel::insert_into(audit_events::table)
        .values((
            audit_events::activity_id.eq(event.activity_id),
            audit_events::actor_json.eq(serde_json::to_string(&event.actor)?),
            audit_events::cause_json.eq(serde_json::to_string(&event.cause)?),
            audit_events::action_json.eq(serde_json::to_string(&event.action)?),
            audit_events::before_snapshot_json.eq(serde_json::to_string(&event.before)?),
            audit_events::after_snapshot_json.eq(serde_json::to_string(&event.after)?),
        ))
        .execute(conn)?;

    let event_id: i64 = last_insert_rowid(conn)?;
    debug!(event_id, action = %event.action.name, "Persisted audit event");
    Ok(event_id)
}

/// Persists a newly created activity.
///
/// The activity row, its children and the audit event are written in one
/// transaction. The audit event is linked to the new activity id.
///
/// # Arguments
///
/// * `conn` - The database connection
/// * `result` - The result of `apply_create`
///
/// # Errors
///
/// Returns an error if any insert fails; nothing is written in that case.
pub fn persist_new_activity(
    conn: &mut SqliteConnection,
    result: &TransitionResult,
) -> Result<PersistTransitionResult, PersistenceError> {
    conn.transaction::<_, PersistenceError, _>(|conn| {
        let activity: &Activity = &result.new_state.activity;
        let activity_id: i64 = insert_activity_row(conn, activity)?;
        replace_children(conn, activity_id, activity)?;
        insert_notices(conn, activity_id, &result.notices)?;

        let event: AuditEvent = result.audit_event.clone().with_activity_id(activity_id);
        let event_id: i64 = persist_audit_event(conn, &event)?;

        info!(activity_id, event_id, name = %activity.name, "Created activity");
        Ok(PersistTransitionResult {
            activity_id,
            event_id,
        })
    })
}

/// Persists a transition on an existing activity.
///
/// # Arguments
///
/// * `conn` - The database connection
/// * `result` - The result of `apply`
///
/// # Errors
///
/// Returns `MissingActivityId` if the new state has no id, `ActivityNotFound`
/// if the row is gone, or a database error. Nothing is written on failure.
pub fn persist_transition(
    conn: &mut SqliteConnection,
    result: &TransitionResult,
) -> Result<PersistTransitionResult, PersistenceError> {
    let activity: &Activity = &result.new_state.activity;
    let activity_id: i64 = activity
        .activity_id
        .ok_or(PersistenceError::MissingActivityId)?;

    conn.transaction::<_, PersistenceError, _>(|conn| {
        update_activity_row(conn, activity_id, activity)?;
        replace_children(conn, activity_id, activity)?;
        insert_notices(conn, activity_id, &result.notices)?;

        let event: AuditEvent = result.audit_event.clone().with_activity_id(activity_id);
        let event_id: i64 = persist_audit_event(conn, &event)?;

        info!(
            activity_id,
            event_id,
            action = %result.audit_event.action.name,
            notices = result.notices.len(),
            "Persisted transition"
        );
        Ok(PersistTransitionResult {
            activity_id,
            event_id,
        })
    })
}
