// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Audit timeline queries.

use clubhub_audit::{Action, Actor, AuditEvent, Cause, StateSnapshot};
use diesel::SqliteConnection;
use diesel::prelude::*;

use crate::data_models::AuditEventRow;
use crate::diesel_schema::audit_events;
use crate::error::PersistenceError;

fn event_from_row(row: AuditEventRow) -> Result<AuditEvent, PersistenceError> {
    let actor: Actor = serde_json::from_str(&row.actor_json)?;
    let cause: Cause = serde_json::from_str(&row.cause_json)?;
    let action: Action = serde_json::from_str(&row.action_json)?;
    let before: StateSnapshot = serde_json::from_str(&row.before_snapshot_json)?;
    let after: StateSnapshot = serde_json::from_str(&row.after_snapshot_json)?;

    let mut event: AuditEvent = AuditEvent::new(actor, cause, action, before, after, row.activity_id);
    event.event_id = Some(row.event_id);
    event.created_at = Some(row.created_at);
    Ok(event)
}

/// Retrieves the audit events of one activity in the order they were recorded.
///
/// # Errors
///
/// Returns an error if the query fails or an event cannot be deserialized.
pub fn get_activity_history(
    conn: &mut SqliteConnection,
    activity_id: i64,
) -> Result<Vec<AuditEvent>, PersistenceError> {
    let rows: Vec<AuditEventRow> = audit_events::table
        .filter(audit_events::activity_id.eq(activity_id))
        .order(audit_events::event_id.asc())
        .select(AuditEventRow::as_select())
        .load(conn)?;

    rows.into_iter().map(event_from_row).collect()
}

/// Retrieves a single audit event by ID.
///
/// # Errors
///
/// Returns `NotFound` if the event does not exist.
pub fn get_audit_event(
    conn: &mut SqliteConnection,
    event_id: i64,
) -> Result<AuditEvent, PersistenceError> {
    let row: AuditEventRow = audit_events::table
        .filter(audit_events::event_id.eq(event_id))
        .select(AuditEventRow::as_select())
        .first(conn)
        .optional()?
        .ok_or_else(|| PersistenceError::NotFound(format!("Audit event {event_id}")))?;

    event_from_row(row)
}
