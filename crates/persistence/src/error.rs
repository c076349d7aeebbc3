// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

/// Errors that can occur during persistence operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PersistenceError {
    /// A database error occurred.
    DatabaseError(String),
    /// Database connection failed.
    DatabaseConnectionFailed(String),
    /// Database migration failed.
    MigrationFailed(String),
    /// Query execution failed.
    QueryFailed(String),
    /// Serialization/deserialization error.
    SerializationError(String),
    /// Initialization error.
    InitializationError(String),
    /// Foreign key enforcement is not enabled.
    ForeignKeyEnforcementNotEnabled,
    /// A stored row holds a value the domain cannot represent.
    CorruptRow { table: &'static str, reason: String },
    /// The requested activity was not found.
    ActivityNotFound(i64),
    /// The requested user was not found.
    UserNotFound(String),
    /// The login name is already taken.
    DuplicateLoginName(String),
    /// The requested notification was not found for its owner.
    NotificationNotFound(i64),
    /// A transition was persisted for an activity that has no id.
    MissingActivityId,
    /// The requested resource was not found.
    NotFound(String),
}

impl std::fmt::Display for PersistenceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DatabaseError(msg) => write!(f, "Database error: {msg}"),
            Self::DatabaseConnectionFailed(msg) => {
                write!(f, "Database connection failed: {msg}")
            }
            Self::MigrationFailed(msg) => write!(f, "Migration failed: {msg}"),
            Self::QueryFailed(msg) => write!(f, "Query failed: {msg}"),
            Self::SerializationError(msg) => write!(f, "Serialization error: {msg}"),
            Self::InitializationError(msg) => write!(f, "Initialization error: {msg}"),
            Self::ForeignKeyEnforcementNotEnabled => {
                write!(f, "Foreign key enforcement is not enabled")
            }
            Self::CorruptRow { table, reason } => {
                write!(f, "Corrupt row in '{table}': {reason}")
            }
            Self::ActivityNotFound(id) => write!(f, "Activity not found: {id}"),
            Self::UserNotFound(msg) => write!(f, "User not found: {msg}"),
            Self::DuplicateLoginName(login) => {
                write!(f, "Login name '{login}' is already in use")
            }
            Self::NotificationNotFound(id) => write!(f, "Notification not found: {id}"),
            Self::MissingActivityId => {
                write!(f, "Cannot persist a transition for an unsaved activity")
            }
            Self::NotFound(msg) => write!(f, "Not found: {msg}"),
        }
    }
}

impl std::error::Error for PersistenceError {}

impl From<diesel::result::Error> for PersistenceError {
    fn from(err: diesel::result::Error) -> Self {
        match err {
            diesel::result::Error::NotFound => Self::NotFound("Record not found".to_string()),
            _ => Self::DatabaseError(err.to_string()),
        }
    }
}

impl From<diesel::ConnectionError> for PersistenceError {
    fn from(err: diesel::ConnectionError) -> Self {
        Self::DatabaseConnectionFailed(err.to_string())
    }
}

impl From<serde_json::Error> for PersistenceError {
    fn from(err: serde_json::Error) -> Self {
        Self::SerializationError(err.to_string())
    }
}

impl PersistenceError {
    /// Wraps a domain parse failure for a value read from `table`.
    pub(crate) fn corrupt(table: &'static str, err: impl std::fmt::Display) -> Self {
        Self::CorruptRow {
            table,
            reason: err.to_string(),
        }
    }
}
