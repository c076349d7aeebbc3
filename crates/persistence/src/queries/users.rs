// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! User, member directory and session queries.

use std::str::FromStr;

use clubhub_domain::{User, UserRole};
use diesel::SqliteConnection;
use diesel::prelude::*;
use tracing::debug;

use crate::data_models::{SessionData, SessionRow, UserRow};
use crate::diesel_schema::{sessions, users};
use crate::error::PersistenceError;

fn user_from_row(row: UserRow) -> Result<User, PersistenceError> {
    Ok(User {
        user_id: Some(row.user_id),
        login_name: row.login_name,
        display_name: row.display_name,
        email: row.email,
        role: UserRole::from_str(&row.role).map_err(|e| PersistenceError::corrupt("users", e))?,
        student_code: row.student_code,
        class_name: row.class_name,
    })
}

/// Retrieves a user by ID.
///
/// # Errors
///
/// Returns an error if the database query fails.
/// Returns `Ok(None)` if the user is not found.
pub fn get_user_by_id(
    conn: &mut SqliteConnection,
    user_id: i64,
) -> Result<Option<User>, PersistenceError> {
    debug!(user_id, "Looking up user by id");

    users::table
        .filter(users::user_id.eq(user_id))
        .select(UserRow::as_select())
        .first(conn)
        .optional()?
        .map(user_from_row)
        .transpose()
}

/// Retrieves a user by login name. Login names are matched exactly.
///
/// # Errors
///
/// Returns an error if the database query fails.
/// Returns `Ok(None)` if the user is not found.
pub fn get_user_by_login(
    conn: &mut SqliteConnection,
    login_name: &str,
) -> Result<Option<User>, PersistenceError> {
    users::table
        .filter(users::login_name.eq(login_name))
        .select(UserRow::as_select())
        .first(conn)
        .optional()?
        .map(user_from_row)
        .transpose()
}

/// Lists users holding any of `roles`, ordered by display name.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn list_users_with_roles(
    conn: &mut SqliteConnection,
    roles: &[UserRole],
) -> Result<Vec<User>, PersistenceError> {
    let role_names: Vec<&'static str> = roles.iter().map(UserRole::as_str).collect();

    users::table
        .filter(users::role.eq_any(role_names))
        .order((users::display_name.asc(), users::user_id.asc()))
        .select(UserRow::as_select())
        .load(conn)?
        .into_iter()
        .map(user_from_row)
        .collect()
}

/// Searches the member directory.
///
/// A non-empty `search` matches display name, login name, email or student
/// code as a substring. Results are ordered by display name.
///
/// # Arguments
///
/// * `conn` - The database connection
/// * `search` - Optional search text
/// * `limit` - Maximum number of members returned
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn search_members(
    conn: &mut SqliteConnection,
    search: Option<&str>,
    limit: i64,
) -> Result<Vec<User>, PersistenceError> {
    let mut query = users::table
        .select(UserRow::as_select())
        .order((users::display_name.asc(), users::user_id.asc()))
        .limit(limit)
        .into_boxed();

    if let Some(text) = search.map(str::trim).filter(|t| !t.is_empty()) {
        let pattern: String = format!("%{text}%");
        query = query.filter(
            users::display_name
                .like(pattern.clone())
                .or(users::login_name.like(pattern.clone()))
                .or(users::email.like(pattern.clone()))
                .or(users::student_code.like(pattern)),
        );
    }

    query
        .load(conn)?
        .into_iter()
        .map(user_from_row)
        .collect()
}

/// Retrieves a session by its bearer token.
///
/// # Errors
///
/// Returns an error if the database query fails.
/// Returns `Ok(None)` if no session carries the token.
pub fn get_session_by_token(
    conn: &mut SqliteConnection,
    session_token: &str,
) -> Result<Option<SessionData>, PersistenceError> {
    let row: Option<SessionRow> = sessions::table
        .filter(sessions::session_token.eq(session_token))
        .select(SessionRow::as_select())
        .first(conn)
        .optional()?;

    Ok(row.map(SessionData::from))
}
