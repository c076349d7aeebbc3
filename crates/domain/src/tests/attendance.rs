// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use super::helpers::{create_test_activity, create_test_participant};
use crate::{
    Activity, ActivityType, ApprovalStatus, AttendanceRecord, AttendanceStatus,
    AttendanceSummary, DaySlot, SlotKind, summarize_attendance,
};

fn record(day_slot: Option<DaySlot>, status: AttendanceStatus) -> AttendanceRecord {
    AttendanceRecord {
        day_slot,
        status,
        recorded_at: String::from("2026-03-02T12:00:00Z"),
        recorded_by: 1,
    }
}

#[test]
fn test_summarize_attendance_counts_present_and_late_as_attended() {
    let slots: Vec<DaySlot> = vec![
        DaySlot::new(1, SlotKind::Morning),
        DaySlot::new(1, SlotKind::Afternoon),
        DaySlot::new(2, SlotKind::Morning),
        DaySlot::new(2, SlotKind::Afternoon),
    ];
    let mut activity: Activity = create_test_activity(1, 2, Some(10), 50);
    let mut participant = create_test_participant(10, ApprovalStatus::Approved, &slots);
    participant.attendance = vec![
        record(Some(slots[0]), AttendanceStatus::Present),
        record(Some(slots[1]), AttendanceStatus::Late),
        record(Some(slots[2]), AttendanceStatus::Present),
        record(Some(slots[3]), AttendanceStatus::Absent),
    ];
    activity.participants = vec![participant];

    let summaries: Vec<AttendanceSummary> = summarize_attendance(&activity);
    assert_eq!(summaries.len(), 1);
    assert_eq!(summaries[0].expected_sessions, 4);
    assert_eq!(summaries[0].present, 2);
    assert_eq!(summaries[0].late, 1);
    assert_eq!(summaries[0].absent, 1);
    assert_eq!(summaries[0].attendance_rate, 75);
}

#[test]
fn test_summarize_attendance_single_day_expects_one_session() {
    let mut activity: Activity = create_test_activity(1, 1, Some(10), 50);
    activity.activity_type = ActivityType::SingleDay;
    let mut participant = create_test_participant(10, ApprovalStatus::Approved, &[]);
    participant.attendance = vec![record(None, AttendanceStatus::Excused)];
    activity.participants = vec![participant];

    let summaries: Vec<AttendanceSummary> = summarize_attendance(&activity);
    assert_eq!(summaries[0].expected_sessions, 1);
    assert_eq!(summaries[0].excused, 1);
    assert_eq!(summaries[0].attendance_rate, 0);
}

#[test]
fn test_summarize_attendance_skips_unapproved_participants() {
    let mut activity: Activity = create_test_activity(1, 1, Some(10), 50);
    activity.participants = vec![
        create_test_participant(10, ApprovalStatus::Pending, &[]),
        create_test_participant(11, ApprovalStatus::Rejected, &[]),
        create_test_participant(12, ApprovalStatus::Approved, &[]),
    ];

    let summaries: Vec<AttendanceSummary> = summarize_attendance(&activity);
    let ids: Vec<i64> = summaries.iter().map(|s| s.user_id).collect();
    assert_eq!(ids, vec![12]);
}
