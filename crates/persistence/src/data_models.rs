// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use clubhub_domain::Activity;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use crate::diesel_schema::{
    activities, attendance_records, audit_events, notifications, participants, sessions, users,
};

/// An activity together with its row timestamps.
#[derive(Debug, Clone, PartialEq)]
pub struct ActivityRecord {
    pub activity: Activity,
    pub created_at: String,
    pub updated_at: String,
}

/// A bearer session as stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionData {
    pub session_id: i64,
    pub session_token: String,
    pub user_id: i64,
    pub created_at: String,
    pub last_activity_at: String,
    /// RFC 3339 expiry timestamp.
    pub expires_at: String,
}

/// A notification addressed to one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationData {
    pub notification_id: i64,
    pub user_id: i64,
    pub activity_id: Option<i64>,
    pub title: String,
    pub message: String,
    pub is_read: bool,
    pub created_at: String,
}

#[derive(Queryable, Selectable)]
#[diesel(table_name = activities)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub(crate) struct ActivityRow {
    pub activity_id: i64,
    pub name: String,
    pub description: String,
    pub activity_type: String,
    pub start_date: String,
    pub end_date: String,
    pub location_mode: String,
    pub location_json: Option<String>,
    pub max_participants: Option<i64>,
    pub registration_threshold: i32,
    pub visibility: String,
    pub status: String,
    pub schedule_json: String,
    pub created_by: Option<i64>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Queryable, Selectable)]
#[diesel(table_name = participants)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub(crate) struct ParticipantRow {
    pub user_id: i64,
    pub name: String,
    pub email: String,
    pub role: String,
    pub approval_status: String,
    pub registered_day_slots_json: String,
    pub rejection_reason: Option<String>,
    pub joined_at: String,
}

#[derive(Queryable, Selectable)]
#[diesel(table_name = attendance_records)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub(crate) struct AttendanceRow {
    pub user_id: i64,
    pub day: Option<i32>,
    pub slot: Option<String>,
    pub status: String,
    pub recorded_at: String,
    pub recorded_by: i64,
}

#[derive(Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub(crate) struct UserRow {
    pub user_id: i64,
    pub login_name: String,
    pub display_name: String,
    pub email: String,
    pub role: String,
    pub student_code: Option<String>,
    pub class_name: Option<String>,
}

#[derive(Queryable, Selectable)]
#[diesel(table_name = sessions)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub(crate) struct SessionRow {
    pub session_id: i64,
    pub session_token: String,
    pub user_id: i64,
    pub created_at: String,
    pub last_activity_at: String,
    pub expires_at: String,
}

#[derive(Queryable, Selectable)]
#[diesel(table_name = notifications)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub(crate) struct NotificationRow {
    pub notification_id: i64,
    pub user_id: i64,
    pub activity_id: Option<i64>,
    pub title: String,
    pub message: String,
    pub is_read: i32,
    pub created_at: String,
}

#[derive(Queryable, Selectable)]
#[diesel(table_name = audit_events)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub(crate) struct AuditEventRow {
    pub event_id: i64,
    pub activity_id: Option<i64>,
    pub actor_json: String,
    pub cause_json: String,
    pub action_json: String,
    pub before_snapshot_json: String,
    pub after_snapshot_json: String,
    pub created_at: String,
}

impl From<SessionRow> for SessionData {
    fn from(row: SessionRow) -> Self {
        Self {
            session_id: row.session_id,
            session_token: row.session_token,
            user_id: row.user_id,
            created_at: row.created_at,
            last_activity_at: row.last_activity_at,
            expires_at: row.expires_at,
        }
    }
}

impl From<NotificationRow> for NotificationData {
    fn from(row: NotificationRow) -> Self {
        Self {
            notification_id: row.notification_id,
            user_id: row.user_id,
            activity_id: row.activity_id,
            title: row.title,
            message: row.message,
            is_read: row.is_read != 0,
            created_at: row.created_at,
        }
    }
}
