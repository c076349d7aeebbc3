// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Error types for the API layer.

use clubhub::CoreError;
use clubhub_domain::{DomainError, SlotConflict};
use clubhub_persistence::PersistenceError;
use thiserror::Error;

/// Authentication and authorization errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// Authentication failed.
    #[error("Authentication failed: {reason}")]
    AuthenticationFailed {
        /// The reason authentication failed.
        reason: String,
    },
    /// Authorization failed.
    #[error("Unauthorized: '{action}' requires {required_role} role")]
    Unauthorized {
        /// The action that was attempted.
        action: String,
        /// The role required for this action.
        required_role: String,
    },
}

/// API-level errors.
///
/// These are distinct from domain/core errors and represent the API contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// Authentication failed.
    AuthenticationFailed {
        /// The reason authentication failed.
        reason: String,
    },
    /// Authorization failed - the actor does not have permission.
    Unauthorized {
        /// The action that was attempted.
        action: String,
        /// The role required for this action.
        required_role: String,
    },
    /// A domain rule was violated.
    DomainRuleViolation {
        /// The rule that was violated.
        rule: String,
        /// A human-readable description of the violation.
        message: String,
    },
    /// Invalid input was provided.
    InvalidInput {
        /// The field that was invalid.
        field: String,
        /// A human-readable description of the error.
        message: String,
    },
    /// A requested resource was not found.
    ResourceNotFound {
        /// The type of resource that was not found.
        resource_type: String,
        /// A human-readable description of what was not found.
        message: String,
    },
    /// The request collides with existing state.
    Conflict {
        /// A human-readable description of the conflict.
        message: String,
        /// Colliding slot registrations, when the conflict is a slot overlap.
        conflicts: Vec<SlotConflict>,
    },
    /// An internal error occurred.
    Internal {
        /// A description of the internal error.
        message: String,
    },
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AuthenticationFailed { reason } => {
                write!(f, "Authentication failed: {reason}")
            }
            Self::Unauthorized {
                action,
                required_role,
            } => {
                write!(f, "Unauthorized: '{action}' requires {required_role} role")
            }
            Self::DomainRuleViolation { rule, message } => {
                write!(f, "Domain rule violation ({rule}): {message}")
            }
            Self::InvalidInput { field, message } => {
                write!(f, "Invalid input for field '{field}': {message}")
            }
            Self::ResourceNotFound {
                resource_type,
                message,
            } => {
                write!(f, "{resource_type} not found: {message}")
            }
            Self::Conflict { message, .. } => write!(f, "Conflict: {message}"),
            Self::Internal { message } => {
                write!(f, "Internal error: {message}")
            }
        }
    }
}

impl std::error::Error for ApiError {}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::AuthenticationFailed { reason } => Self::AuthenticationFailed { reason },
            AuthError::Unauthorized {
                action,
                required_role,
            } => Self::Unauthorized {
                action,
                required_role,
            },
        }
    }
}

fn invalid(field: &str, message: String) -> ApiError {
    ApiError::InvalidInput {
        field: field.to_string(),
        message,
    }
}

fn violation(rule: &str, message: String) -> ApiError {
    ApiError::DomainRuleViolation {
        rule: rule.to_string(),
        message,
    }
}

/// Translates a domain error into an API error.
///
/// This translation is explicit and ensures domain errors are not leaked directly.
#[must_use]
pub fn translate_domain_error(err: DomainError) -> ApiError {
    let message: String = err.to_string();
    match err {
        DomainError::InvalidName(_) => invalid("name", message),
        DomainError::InvalidDateRange { .. } => invalid("end_date", message),
        DomainError::DateParseError { .. } => invalid("date", message),
        DomainError::InvalidThreshold { .. } => invalid("registration_threshold", message),
        DomainError::InvalidTime(_)
        | DomainError::InvalidTimeRange { .. }
        | DomainError::ScheduleTooLong { .. }
        | DomainError::NoActiveSlot { .. }
        | DomainError::EmptySchedule
        | DomainError::InvalidDayIndex { .. }
        | DomainError::ScheduleDateOutOfRange { .. } => invalid("schedule", message),
        DomainError::DayNotInSchedule { .. }
        | DomainError::SlotNotActive(_)
        | DomainError::DuplicateSlot(_) => invalid("day_slots", message),
        DomainError::InvalidSlot(_) => invalid("slot", message),
        DomainError::InvalidStatus(_) | DomainError::InvalidAttendanceStatus(_) => {
            invalid("status", message)
        }
        DomainError::InvalidActivityType(_) => invalid("activity_type", message),
        DomainError::InvalidVisibility(_) => invalid("visibility", message),
        DomainError::InvalidLocationMode(_) => invalid("location_mode", message),
        DomainError::InvalidParticipantRole(_) | DomainError::InvalidUserRole(_) => {
            invalid("role", message)
        }
        DomainError::InvalidApprovalStatus(_) => invalid("approval_status", message),
        DomainError::NoSlotsAvailable => violation("slots_available", message),
        DomainError::SlotFull { .. } => violation("registration_threshold", message),
        DomainError::ThresholdNotMet { .. } => violation("minimum_slot_selection", message),
        DomainError::InvalidStatusTransition { .. } => violation("status_transition", message),
        DomainError::ActivityNotEditable { .. } => violation("activity_editable", message),
        DomainError::RegistrationClosed { .. } => violation("registration_open", message),
        DomainError::SlotNotRegistered { .. } => violation("slot_registered", message),
        DomainError::AttendanceClosed { .. } => violation("attendance_open", message),
        DomainError::InvalidParticipantTransition { .. } => {
            violation("participant_status", message)
        }
        DomainError::ParticipantNotFound { .. } => ApiError::ResourceNotFound {
            resource_type: String::from("Participant"),
            message,
        },
        DomainError::AlreadyRegistered { .. } => ApiError::Conflict {
            message,
            conflicts: Vec::new(),
        },
        DomainError::SlotOverlap { conflicts } => ApiError::Conflict { message, conflicts },
    }
}

/// Translates a core error into an API error.
///
/// This translation is explicit and ensures core errors are not leaked directly.
#[must_use]
pub fn translate_core_error(err: CoreError) -> ApiError {
    match err {
        CoreError::DomainViolation(domain_err) => translate_domain_error(domain_err),
        CoreError::ActivityNotPersisted => ApiError::Internal {
            message: err.to_string(),
        },
    }
}

/// Translates a persistence error into an API error.
///
/// Lookups that miss become `ResourceNotFound`; storage failures stay internal.
#[must_use]
pub fn translate_persistence_error(err: PersistenceError) -> ApiError {
    match err {
        PersistenceError::ActivityNotFound(id) => ApiError::ResourceNotFound {
            resource_type: String::from("Activity"),
            message: format!("Activity {id} does not exist"),
        },
        PersistenceError::UserNotFound(msg) => ApiError::ResourceNotFound {
            resource_type: String::from("User"),
            message: msg,
        },
        PersistenceError::NotificationNotFound(id) => ApiError::ResourceNotFound {
            resource_type: String::from("Notification"),
            message: format!("Notification {id} does not exist"),
        },
        PersistenceError::NotFound(msg) => ApiError::ResourceNotFound {
            resource_type: String::from("Resource"),
            message: msg,
        },
        PersistenceError::DuplicateLoginName(_) => ApiError::Conflict {
            message: err.to_string(),
            conflicts: Vec::new(),
        },
        _ => ApiError::Internal {
            message: err.to_string(),
        },
    }
}
