// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::{
    Activity, ActivityDraft, ActivityStatus, ActivityType, ApprovalStatus, ClockTime, DayPlan,
    DaySlot, LocationMode, Participant, PlannedDay, ScheduleDay, SlotKind, Visibility,
    encode_schedule,
};
use time::{Date, Duration, Month};

pub fn date(day: u8) -> Date {
    Date::from_calendar_date(2026, Month::March, day).unwrap()
}

pub fn time(value: &str) -> ClockTime {
    ClockTime::parse(value).unwrap()
}

/// A day plan with the given slots active at the given times.
pub fn plan_with(slots: &[(SlotKind, &str, &str)]) -> DayPlan {
    let mut plan: DayPlan = DayPlan::default();
    for (kind, start, end) in slots {
        let slot = plan.slot_mut(*kind).unwrap();
        slot.is_active = true;
        slot.start_time = time(start);
        slot.end_time = time(end);
    }
    plan
}

/// `days` consecutive days from 2026-03-02, each with morning and afternoon active.
pub fn create_test_schedule(days: u32) -> Vec<ScheduleDay> {
    let planned: Vec<PlannedDay> = (1..=days)
        .map(|day| PlannedDay {
            day,
            date: date(2) + Duration::days(i64::from(day - 1)),
            plan: plan_with(&[
                (SlotKind::Morning, "07:00", "11:30"),
                (SlotKind::Afternoon, "13:00", "17:00"),
            ]),
        })
        .collect();
    encode_schedule(&planned, LocationMode::Global).unwrap()
}

pub fn create_test_draft(days: u32) -> ActivityDraft {
    ActivityDraft {
        name: String::from("Mùa hè xanh"),
        description: String::from("Volunteer week"),
        activity_type: ActivityType::MultipleDays,
        start_date: date(2),
        end_date: date(10),
        location_mode: LocationMode::Global,
        location: None,
        max_participants: Some(10),
        registration_threshold: 80,
        visibility: Visibility::Public,
        responsible_persons: vec![1],
        schedule: create_test_schedule(days),
    }
}

/// A published multi-day activity with the given capacity and threshold.
pub fn create_test_activity(
    activity_id: i64,
    days: u32,
    capacity: Option<u32>,
    threshold: u8,
) -> Activity {
    let mut draft: ActivityDraft = create_test_draft(days);
    draft.max_participants = capacity;
    draft.registration_threshold = threshold;
    let mut activity: Activity = Activity::from_draft(draft, Some(1));
    activity.activity_id = Some(activity_id);
    activity.status = ActivityStatus::Published;
    activity
}

pub fn create_test_participant(
    user_id: i64,
    status: ApprovalStatus,
    slots: &[DaySlot],
) -> Participant {
    let mut participant: Participant = Participant::pending(
        user_id,
        format!("Student {user_id}"),
        format!("student{user_id}@example.edu"),
        slots.to_vec(),
        String::from("2026-02-20T08:00:00Z"),
    );
    participant.approval_status = status;
    participant
}
