// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use clubhub_audit::{AuditEvent, StateSnapshot};
use clubhub_domain::{Activity, ApprovalStatus};

/// The state a command operates on: one activity with its participants.
#[derive(Debug, Clone, PartialEq)]
pub struct State {
    pub activity: Activity,
}

impl State {
    #[must_use]
    pub const fn new(activity: Activity) -> Self {
        Self { activity }
    }

    /// Converts the state to a snapshot for audit purposes.
    #[must_use]
    pub fn to_snapshot(&self) -> StateSnapshot {
        let approved: usize = self
            .activity
            .participants
            .iter()
            .filter(|p| p.approval_status == ApprovalStatus::Approved)
            .count();
        StateSnapshot::new(format!(
            "status={},participants={},approved={},schedule_days={}",
            self.activity.status,
            self.activity.participants.len(),
            approved,
            self.activity.schedule.len()
        ))
    }
}

/// A message to deliver to one user as a consequence of a transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub user_id: i64,
    pub title: String,
    pub message: String,
}

/// The result of a successful state transition.
///
/// Transitions are atomic: they either succeed completely or fail without side effects.
#[derive(Debug, Clone, PartialEq)]
pub struct TransitionResult {
    /// The new state after the transition.
    pub new_state: State,
    /// The audit event recording this transition.
    pub audit_event: AuditEvent,
    /// Notifications to persist with the change.
    pub notices: Vec<Notice>,
}
