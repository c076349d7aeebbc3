// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::admission::registration_rate;
use crate::types::{Activity, ApprovalStatus, AttendanceStatus, Participant};
use serde::{Deserialize, Serialize};

/// Attendance totals for one approved participant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceSummary {
    pub user_id: i64,
    pub name: String,
    pub email: String,
    /// Registered slots for multi-day activities, otherwise one session.
    pub expected_sessions: usize,
    pub present: usize,
    pub late: usize,
    pub absent: usize,
    pub excused: usize,
    /// Share of expected sessions attended (present or late), in percent.
    pub attendance_rate: u32,
}

fn summarize_participant(activity: &Activity, participant: &Participant) -> AttendanceSummary {
    let expected_sessions: usize = if activity.is_multi_day() {
        participant.registered_day_slots.len()
    } else {
        1
    };

    let count = |status: AttendanceStatus| -> usize {
        participant
            .attendance
            .iter()
            .filter(|r| r.status == status)
            .count()
    };
    let present: usize = count(AttendanceStatus::Present);
    let late: usize = count(AttendanceStatus::Late);

    AttendanceSummary {
        user_id: participant.user_id,
        name: participant.name.clone(),
        email: participant.email.clone(),
        expected_sessions,
        present,
        late,
        absent: count(AttendanceStatus::Absent),
        excused: count(AttendanceStatus::Excused),
        attendance_rate: registration_rate(
            present + late,
            u32::try_from(expected_sessions).ok(),
        ),
    }
}

/// Summarizes attendance for every approved participant, in participant order.
#[must_use]
pub fn summarize_attendance(activity: &Activity) -> Vec<AttendanceSummary> {
    activity
        .participants
        .iter()
        .filter(|p| p.approval_status == ApprovalStatus::Approved)
        .map(|p| summarize_participant(activity, p))
        .collect()
}
