// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! User and session mutations.

use clubhub_audit::AuditEvent;
use clubhub_domain::User;
use diesel::SqliteConnection;
use diesel::prelude::*;
use tracing::{debug, info};

use crate::backend::sqlite::last_insert_rowid;
use crate::diesel_schema::{sessions, users};
use crate::error::PersistenceError;
use crate::mutations::activities::persist_audit_event;
use crate::queries::users::get_user_by_login;

/// Creates a user account.
///
/// # Arguments
///
/// * `conn` - The database connection
/// * `user` - The account to create; its `user_id` is ignored
///
/// # Errors
///
/// Returns `DuplicateLoginName` if the login name is taken, or a database error.
pub fn create_user(conn: &mut SqliteConnection, user: &User) -> Result<i64, PersistenceError> {
    if get_user_by_login(conn, &user.login_name)?.is_some() {
        return Err(PersistenceError::DuplicateLoginName(user.login_name.clone()));
    }

    diesel::insert_into(users::table)
        .values((
            users::login_name.eq(&user.login_name),
            users::display_name.eq(&user.display_name),
            users::email.eq(&user.email),
            users::role.eq(user.role.as_str()),
            users::student_code.eq(user.student_code.as_deref()),
            users::class_name.eq(user.class_name.as_deref()),
        ))
        .execute(conn)?;

    let user_id: i64 = last_insert_rowid(conn)?;
    info!(user_id, login_name = %user.login_name, role = %user.role, "Created user");
    Ok(user_id)
}

/// Creates a user account and its audit event in one transaction.
///
/// `build_event` receives the new user id so the event can describe it.
///
/// # Returns
///
/// A tuple of (`user_id`, `event_id`)
///
/// # Errors
///
/// Returns `DuplicateLoginName` or a database error; nothing is written on failure.
pub fn create_user_with_audit<F>(
    conn: &mut SqliteConnection,
    user: &User,
    build_event: F,
) -> Result<(i64, i64), PersistenceError>
where
    F: FnOnce(i64) -> AuditEvent,
{
    conn.transaction::<_, PersistenceError, _>(|conn| {
        let user_id: i64 = create_user(conn, user)?;
        let event: AuditEvent = build_event(user_id);
        let event_id: i64 = persist_audit_event(conn, &event)?;
        Ok((user_id, event_id))
    })
}

/// Creates a bearer session for a user.
///
/// # Arguments
///
/// * `conn` - The database connection
/// * `session_token` - The unique session token
/// * `user_id` - The session owner
/// * `expires_at` - RFC 3339 expiry timestamp
///
/// # Errors
///
/// Returns an error if the session cannot be created.
pub fn create_session(
    conn: &mut SqliteConnection,
    session_token: &str,
    user_id: i64,
    expires_at: &str,
) -> Result<i64, PersistenceError> {
    diesel::insert_into(sessions::table)
        .values((
            sessions::session_token.eq(session_token),
            sessions::user_id.eq(user_id),
            sessions::expires_at.eq(expires_at),
        ))
        .execute(conn)?;

    let session_id: i64 = last_insert_rowid(conn)?;
    debug!(session_id, user_id, expires_at, "Created session");
    Ok(session_id)
}

/// Creates a bearer session and its audit event in one transaction.
///
/// # Returns
///
/// A tuple of (`session_id`, `event_id`)
///
/// # Errors
///
/// Returns a database error; nothing is written on failure.
pub fn create_session_with_audit(
    conn: &mut SqliteConnection,
    session_token: &str,
    user_id: i64,
    expires_at: &str,
    event: &AuditEvent,
) -> Result<(i64, i64), PersistenceError> {
    conn.transaction::<_, PersistenceError, _>(|conn| {
        let session_id: i64 = create_session(conn, session_token, user_id, expires_at)?;
        let event_id: i64 = persist_audit_event(conn, event)?;
        Ok((session_id, event_id))
    })
}

/// Touches the last activity timestamp of a session.
///
/// # Errors
///
/// Returns an error if the database update fails.
pub fn update_session_activity(
    conn: &mut SqliteConnection,
    session_id: i64,
) -> Result<(), PersistenceError> {
    diesel::update(sessions::table)
        .filter(sessions::session_id.eq(session_id))
        .set(
            sessions::last_activity_at.eq(diesel::dsl::sql::<diesel::sql_types::Text>(
                "CURRENT_TIMESTAMP",
            )),
        )
        .execute(conn)?;
    Ok(())
}

/// Deletes a session by token.
///
/// # Errors
///
/// Returns an error if the database delete fails.
pub fn delete_session(conn: &mut SqliteConnection, session_token: &str) -> Result<(), PersistenceError> {
    diesel::delete(sessions::table)
        .filter(sessions::session_token.eq(session_token))
        .execute(conn)?;
    Ok(())
}

/// Deletes all expired sessions.
///
/// `expires_at` is RFC 3339 text, so the comparison goes through
/// `julianday` rather than string order.
///
/// # Errors
///
/// Returns an error if the database delete fails.
pub fn delete_expired_sessions(conn: &mut SqliteConnection) -> Result<usize, PersistenceError> {
    debug!("Deleting expired sessions");

    let rows_affected: usize = diesel::delete(sessions::table)
        .filter(diesel::dsl::sql::<diesel::sql_types::Bool>(
            "julianday(expires_at) < julianday('now')",
        ))
        .execute(conn)?;

    info!(rows_affected, "Deleted expired sessions");
    Ok(rows_affected)
}
