// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Persistence layer for ClubHub.
//!
//! This crate stores activities, their participants and attendance, user
//! accounts, bearer sessions, notifications and the audit trail. It is built
//! on Diesel with the `SQLite` backend.
//!
//! ## Storage Model
//!
//! An activity is an aggregate spread over `activities`,
//! `activity_responsible_persons`, `participants` and `attendance_records`.
//! The schedule (encoded day text plus structured plan) is a JSON column on
//! the activity row. Each transition produced by the core crate is written
//! wholesale in a single transaction together with its audit event and the
//! notifications it raised.
//!
//! ## Databases
//!
//! - File databases run in WAL mode.
//! - `new_in_memory()` hands out a uniquely named shared in-memory database
//!   per call, so tests never see each other's rows.
//! - Migrations in `migrations/` are embedded and applied on open.
//! - Foreign key enforcement is switched on and verified on open.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(clippy::multiple_crate_versions)]

use diesel::SqliteConnection;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};

use clubhub::TransitionResult;
use clubhub_audit::AuditEvent;
use clubhub_domain::{Activity, User, UserRole};

/// Atomic counter for generating unique in-memory database names.
static DB_COUNTER: AtomicU64 = AtomicU64::new(0);

mod backend;
mod data_models;
mod diesel_schema;
mod error;
mod mutations;
mod queries;

#[cfg(test)]
mod tests;

pub use data_models::{ActivityRecord, NotificationData, SessionData};
pub use error::PersistenceError;
pub use mutations::PersistTransitionResult;

/// Persistence adapter over a single `SQLite` connection.
pub struct Persistence {
    conn: SqliteConnection,
}

impl Persistence {
    /// Creates a new persistence adapter with an in-memory `SQLite` database.
    ///
    /// Each call receives its own shared-cache database, named by an atomic
    /// counter.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be initialized.
    pub fn new_in_memory() -> Result<Self, PersistenceError> {
        let db_id: u64 = DB_COUNTER.fetch_add(1, Ordering::SeqCst);
        let shared_memory_url: String = format!("file:clubhub_memdb_{db_id}?mode=memory&cache=shared");

        let mut conn: SqliteConnection = backend::sqlite::initialize_database(&shared_memory_url)?;
        backend::sqlite::verify_foreign_key_enforcement(&mut conn)?;

        Ok(Self { conn })
    }

    /// Creates a new persistence adapter with a file-based `SQLite` database.
    ///
    /// # Arguments
    ///
    /// * `path` - The path to the `SQLite` database file
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or initialized.
    pub fn new_with_file<P: AsRef<Path>>(path: P) -> Result<Self, PersistenceError> {
        let path_str: &str = path.as_ref().to_str().ok_or_else(|| {
            PersistenceError::InitializationError("Invalid database path".to_string())
        })?;

        let mut conn: SqliteConnection = backend::sqlite::initialize_database(path_str)?;
        backend::sqlite::enable_wal_mode(&mut conn)?;
        backend::sqlite::verify_foreign_key_enforcement(&mut conn)?;

        Ok(Self { conn })
    }

    /// Verifies that foreign key enforcement is enabled.
    ///
    /// # Errors
    ///
    /// Returns an error if foreign key enforcement is not enabled.
    pub fn verify_foreign_key_enforcement(&mut self) -> Result<(), PersistenceError> {
        backend::sqlite::verify_foreign_key_enforcement(&mut self.conn)
    }

    // ========================================================================
    // Activities
    // ========================================================================

    /// Persists the result of `apply_create`.
    ///
    /// # Errors
    ///
    /// Returns an error if persistence fails.
    pub fn persist_new_activity(
        &mut self,
        result: &TransitionResult,
    ) -> Result<PersistTransitionResult, PersistenceError> {
        mutations::activities::persist_new_activity(&mut self.conn, result)
    }

    /// Persists the result of `apply` on an existing activity.
    ///
    /// # Errors
    ///
    /// Returns an error if persistence fails.
    pub fn persist_transition(
        &mut self,
        result: &TransitionResult,
    ) -> Result<PersistTransitionResult, PersistenceError> {
        mutations::activities::persist_transition(&mut self.conn, result)
    }

    /// Loads an activity aggregate.
    ///
    /// # Errors
    ///
    /// Returns `ActivityNotFound` if the activity does not exist.
    pub fn get_activity(&mut self, activity_id: i64) -> Result<ActivityRecord, PersistenceError> {
        queries::activities::get_activity(&mut self.conn, activity_id)
    }

    /// Lists all activities.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_activities(&mut self) -> Result<Vec<ActivityRecord>, PersistenceError> {
        queries::activities::list_activities(&mut self.conn)
    }

    /// Lists the activities `user_id` has a participant entry in.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_activities_for_participant(
        &mut self,
        user_id: i64,
    ) -> Result<Vec<Activity>, PersistenceError> {
        queries::activities::list_activities_for_participant(&mut self.conn, user_id)
    }

    // ========================================================================
    // Audit
    // ========================================================================

    /// Persists a standalone audit event.
    ///
    /// # Errors
    ///
    /// Returns an error if persistence fails.
    pub fn persist_audit_event(&mut self, event: &AuditEvent) -> Result<i64, PersistenceError> {
        mutations::activities::persist_audit_event(&mut self.conn, event)
    }

    /// Retrieves an audit event by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the event is not found or cannot be deserialized.
    pub fn get_audit_event(&mut self, event_id: i64) -> Result<AuditEvent, PersistenceError> {
        queries::audit::get_audit_event(&mut self.conn, event_id)
    }

    /// Retrieves the audit timeline of an activity, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if events cannot be retrieved or deserialized.
    pub fn get_activity_history(
        &mut self,
        activity_id: i64,
    ) -> Result<Vec<AuditEvent>, PersistenceError> {
        queries::audit::get_activity_history(&mut self.conn, activity_id)
    }

    // ========================================================================
    // Users & Sessions
    // ========================================================================

    /// Creates a user account and returns its ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the login name is taken or the insert fails.
    pub fn create_user(&mut self, user: &User) -> Result<i64, PersistenceError> {
        mutations::users::create_user(&mut self.conn, user)
    }

    /// Creates a user account together with its audit event.
    ///
    /// `build_event` receives the new user id. Both rows are written in one
    /// transaction.
    ///
    /// # Returns
    ///
    /// A tuple of (`user_id`, `event_id`)
    ///
    /// # Errors
    ///
    /// Returns an error if the login name is taken or either insert fails.
    pub fn create_user_with_audit<F>(
        &mut self,
        user: &User,
        build_event: F,
    ) -> Result<(i64, i64), PersistenceError>
    where
        F: FnOnce(i64) -> AuditEvent,
    {
        mutations::users::create_user_with_audit(&mut self.conn, user, build_event)
    }

    /// Retrieves a user by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn get_user_by_id(&mut self, user_id: i64) -> Result<Option<User>, PersistenceError> {
        queries::users::get_user_by_id(&mut self.conn, user_id)
    }

    /// Retrieves a user by login name.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn get_user_by_login(&mut self, login_name: &str) -> Result<Option<User>, PersistenceError> {
        queries::users::get_user_by_login(&mut self.conn, login_name)
    }

    /// Lists users holding any of the given roles.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_users_with_roles(&mut self, roles: &[UserRole]) -> Result<Vec<User>, PersistenceError> {
        queries::users::list_users_with_roles(&mut self.conn, roles)
    }

    /// Searches the member directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn search_members(
        &mut self,
        search: Option<&str>,
        limit: i64,
    ) -> Result<Vec<User>, PersistenceError> {
        queries::users::search_members(&mut self.conn, search, limit)
    }

    /// Creates a bearer session.
    ///
    /// # Errors
    ///
    /// Returns an error if the session cannot be created.
    pub fn create_session(
        &mut self,
        session_token: &str,
        user_id: i64,
        expires_at: &str,
    ) -> Result<i64, PersistenceError> {
        mutations::users::create_session(&mut self.conn, session_token, user_id, expires_at)
    }

    /// Creates a bearer session together with its audit event, in one
    /// transaction.
    ///
    /// # Returns
    ///
    /// A tuple of (`session_id`, `event_id`)
    ///
    /// # Errors
    ///
    /// Returns an error if either insert fails.
    pub fn create_session_with_audit(
        &mut self,
        session_token: &str,
        user_id: i64,
        expires_at: &str,
        event: &AuditEvent,
    ) -> Result<(i64, i64), PersistenceError> {
        mutations::users::create_session_with_audit(
            &mut self.conn,
            session_token,
            user_id,
            expires_at,
            event,
        )
    }

    /// Retrieves a session by token.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn get_session_by_token(
        &mut self,
        session_token: &str,
    ) -> Result<Option<SessionData>, PersistenceError> {
        queries::users::get_session_by_token(&mut self.conn, session_token)
    }

    /// Records activity on a session.
    ///
    /// # Errors
    ///
    /// Returns an error if the update fails.
    pub fn update_session_activity(&mut self, session_id: i64) -> Result<(), PersistenceError> {
        mutations::users::update_session_activity(&mut self.conn, session_id)
    }

    /// Deletes a session by token.
    ///
    /// # Errors
    ///
    /// Returns an error if the delete fails.
    pub fn delete_session(&mut self, session_token: &str) -> Result<(), PersistenceError> {
        mutations::users::delete_session(&mut self.conn, session_token)
    }

    /// Deletes all expired sessions.
    ///
    /// # Errors
    ///
    /// Returns an error if the database delete fails.
    pub fn delete_expired_sessions(&mut self) -> Result<usize, PersistenceError> {
        mutations::users::delete_expired_sessions(&mut self.conn)
    }

    // ========================================================================
    // Notifications
    // ========================================================================

    /// Lists a user's notifications, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_notifications(
        &mut self,
        user_id: i64,
        unread_only: bool,
    ) -> Result<Vec<NotificationData>, PersistenceError> {
        queries::notifications::list_notifications(&mut self.conn, user_id, unread_only)
    }

    /// Marks a notification read on behalf of its recipient.
    ///
    /// # Errors
    ///
    /// Returns `NotificationNotFound` if it does not belong to the user.
    pub fn mark_notification_read(
        &mut self,
        notification_id: i64,
        user_id: i64,
    ) -> Result<(), PersistenceError> {
        mutations::notifications::mark_notification_read(&mut self.conn, notification_id, user_id)
    }
}
