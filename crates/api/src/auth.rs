// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Authentication and authorization types and services.

use clubhub_audit::Actor;
use clubhub_domain::{Activity, ActivityStatus, User, UserRole, Visibility};
use clubhub_persistence::{Persistence, SessionData};
use time::format_description::well_known::Rfc3339;
use time::{Duration, OffsetDateTime};
use tracing::debug;

use crate::error::AuthError;

/// An authenticated member account acting through the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthenticatedActor {
    /// The account id.
    pub user_id: i64,
    /// The account role.
    pub role: UserRole,
}

impl AuthenticatedActor {
    /// Creates a new authenticated actor.
    #[must_use]
    pub const fn new(user_id: i64, role: UserRole) -> Self {
        Self { user_id, role }
    }

    /// Converts this authenticated actor into an audit Actor.
    #[must_use]
    pub fn to_audit_actor(&self) -> Actor {
        Actor::user(self.user_id)
    }

    /// Returns whether the actor is an admin.
    #[must_use]
    pub const fn is_admin(&self) -> bool {
        matches!(self.role, UserRole::Admin)
    }

    /// Returns whether the actor is an admin or an officer.
    #[must_use]
    pub const fn is_staff(&self) -> bool {
        matches!(self.role, UserRole::Admin | UserRole::Officer)
    }
}

/// Authorization service for enforcing role-based access control.
///
/// Admins may do anything. Officers manage the activities that list them as
/// a responsible person. Students act only on their own registrations.
pub struct AuthorizationService;

impl AuthorizationService {
    /// Checks that the actor is an admin.
    ///
    /// # Errors
    ///
    /// Returns `Unauthorized` for officers and students.
    pub fn authorize_admin(actor: &AuthenticatedActor, action: &str) -> Result<(), AuthError> {
        if actor.is_admin() {
            return Ok(());
        }
        Err(AuthError::Unauthorized {
            action: action.to_string(),
            required_role: String::from("Admin"),
        })
    }

    /// Checks that the actor is an admin or an officer.
    ///
    /// # Errors
    ///
    /// Returns `Unauthorized` for students.
    pub fn authorize_staff(actor: &AuthenticatedActor, action: &str) -> Result<(), AuthError> {
        if actor.is_staff() {
            return Ok(());
        }
        Err(AuthError::Unauthorized {
            action: action.to_string(),
            required_role: String::from("Officer"),
        })
    }

    /// Checks that the actor may manage participants, attendance and the
    /// lifecycle of `activity`.
    ///
    /// # Errors
    ///
    /// Returns `Unauthorized` unless the actor is an admin or an officer
    /// listed as responsible for the activity.
    pub fn authorize_manage_activity(
        actor: &AuthenticatedActor,
        activity: &Activity,
        action: &str,
    ) -> Result<(), AuthError> {
        let allowed: bool = match actor.role {
            UserRole::Admin => true,
            UserRole::Officer => activity.is_responsible(actor.user_id),
            UserRole::Student => false,
        };
        if allowed {
            return Ok(());
        }
        Err(AuthError::Unauthorized {
            action: action.to_string(),
            required_role: String::from("Admin or responsible Officer"),
        })
    }

    /// Checks that the actor acts on their own account, or is staff.
    ///
    /// # Errors
    ///
    /// Returns `Unauthorized` when a student targets another user.
    pub fn authorize_self_or_staff(
        actor: &AuthenticatedActor,
        user_id: i64,
        action: &str,
    ) -> Result<(), AuthError> {
        if actor.user_id == user_id || actor.is_staff() {
            return Ok(());
        }
        Err(AuthError::Unauthorized {
            action: action.to_string(),
            required_role: String::from("Officer"),
        })
    }

    /// Returns whether the actor may see `activity`.
    ///
    /// Staff see everything. Students see published-or-later public
    /// activities and any activity they have a participant entry in.
    #[must_use]
    pub fn can_view_activity(actor: &AuthenticatedActor, activity: &Activity) -> bool {
        if actor.is_staff() || activity.participant(actor.user_id).is_some() {
            return true;
        }
        activity.status != ActivityStatus::Draft && activity.visibility == Visibility::Public
    }
}

/// A freshly issued bearer session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedSession {
    /// The bearer token.
    pub session_token: String,
    /// RFC 3339 expiry time.
    pub expires_at: String,
}

/// Authentication service for bearer sessions.
pub struct AuthenticationService;

impl AuthenticationService {
    /// Default session lifetime.
    pub const DEFAULT_SESSION_TTL: Duration = Duration::hours(24);

    /// Issues a session with a random token.
    ///
    /// # Errors
    ///
    /// Returns an error if the session cannot be stored.
    pub fn issue_session(
        persistence: &mut Persistence,
        user_id: i64,
        ttl: Duration,
    ) -> Result<IssuedSession, AuthError> {
        let token: String = Self::generate_session_token();
        Self::issue_session_with_token(persistence, user_id, &token, ttl)
    }

    /// Computes the expiry of a session that starts now, without storing it.
    ///
    /// # Errors
    ///
    /// Returns an error if the expiry cannot be formatted.
    pub fn prepare_session(
        session_token: String,
        ttl: Duration,
    ) -> Result<IssuedSession, AuthError> {
        let expires_at: String = (OffsetDateTime::now_utc() + ttl)
            .format(&Rfc3339)
            .map_err(|e| AuthError::AuthenticationFailed {
                reason: format!("Failed to format expiration time: {e}"),
            })?;
        Ok(IssuedSession {
            session_token,
            expires_at,
        })
    }

    /// Issues a session carrying a caller-chosen token.
    ///
    /// Expired sessions are pruned first.
    ///
    /// # Errors
    ///
    /// Returns an error if the expiry cannot be formatted or the session
    /// cannot be stored.
    pub fn issue_session_with_token(
        persistence: &mut Persistence,
        user_id: i64,
        session_token: &str,
        ttl: Duration,
    ) -> Result<IssuedSession, AuthError> {
        Self::prune_expired_sessions(persistence)?;
        let session: IssuedSession = Self::prepare_session(session_token.to_string(), ttl)?;

        persistence
            .create_session(&session.session_token, user_id, &session.expires_at)
            .map_err(|e| AuthError::AuthenticationFailed {
                reason: format!("Failed to create session: {e}"),
            })?;

        Ok(session)
    }

    /// Deletes every expired session.
    ///
    /// # Errors
    ///
    /// Returns an error if the delete fails.
    pub fn prune_expired_sessions(persistence: &mut Persistence) -> Result<usize, AuthError> {
        persistence
            .delete_expired_sessions()
            .map_err(|e| AuthError::AuthenticationFailed {
                reason: format!("Failed to prune sessions: {e}"),
            })
    }

    /// Validates a session token and returns the authenticated actor.
    ///
    /// # Returns
    ///
    /// A tuple of (`authenticated_actor`, `user`)
    ///
    /// # Errors
    ///
    /// Returns an error if the session is unknown, expired, or its user is gone.
    pub fn validate_session(
        persistence: &mut Persistence,
        session_token: &str,
    ) -> Result<(AuthenticatedActor, User), AuthError> {
        let session: SessionData = persistence
            .get_session_by_token(session_token)
            .map_err(|e| AuthError::AuthenticationFailed {
                reason: format!("Database error: {e}"),
            })?
            .ok_or_else(|| AuthError::AuthenticationFailed {
                reason: String::from("Invalid session token"),
            })?;

        let expires_at: OffsetDateTime = OffsetDateTime::parse(&session.expires_at, &Rfc3339)
            .map_err(|e| AuthError::AuthenticationFailed {
                reason: format!("Failed to parse session expiration: {e}"),
            })?;

        if OffsetDateTime::now_utc() > expires_at {
            return Err(AuthError::AuthenticationFailed {
                reason: String::from("Session expired"),
            });
        }

        let user: User = persistence
            .get_user_by_id(session.user_id)
            .map_err(|e| AuthError::AuthenticationFailed {
                reason: format!("Database error: {e}"),
            })?
            .ok_or_else(|| AuthError::AuthenticationFailed {
                reason: String::from("User not found"),
            })?;

        persistence
            .update_session_activity(session.session_id)
            .map_err(|e| AuthError::AuthenticationFailed {
                reason: format!("Failed to update session: {e}"),
            })?;

        debug!(user_id = session.user_id, role = %user.role, "Session validated");
        Ok((AuthenticatedActor::new(session.user_id, user.role), user))
    }

    /// Logs out by deleting the session.
    ///
    /// # Errors
    ///
    /// Returns an error if the session cannot be deleted.
    pub fn logout(persistence: &mut Persistence, session_token: &str) -> Result<(), AuthError> {
        persistence
            .delete_session(session_token)
            .map_err(|e| AuthError::AuthenticationFailed {
                reason: format!("Failed to delete session: {e}"),
            })
    }

    /// Generates a random 128-bit bearer token.
    #[must_use]
    pub fn generate_session_token() -> String {
        format!(
            "chs_{:016x}{:016x}",
            rand::random::<u64>(),
            rand::random::<u64>()
        )
    }
}
