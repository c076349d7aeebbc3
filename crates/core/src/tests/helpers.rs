// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::{Command, State, TransitionResult, apply};
use clubhub_audit::{Actor, Cause};
use clubhub_domain::{
    Activity, ActivityDraft, ActivityStatus, ActivityType, DayPlan, DaySlot, LocationMode,
    ScheduleDay, SlotKind, Visibility, WeeklySlot,
};
use time::{Date, Month};

pub fn create_test_actor() -> Actor {
    Actor::user(1)
}

pub fn create_test_cause() -> Cause {
    Cause::new(String::from("req-456"), String::from("API request"))
}

pub fn date(day: u8) -> Date {
    Date::from_calendar_date(2026, Month::March, day).unwrap()
}

fn day_plan() -> DayPlan {
    let mut plan: DayPlan = DayPlan::default();
    for kind in [SlotKind::Morning, SlotKind::Afternoon] {
        let slot: &mut WeeklySlot = plan.slot_mut(kind).unwrap();
        slot.is_active = true;
        slot.activities = String::from("Tình nguyện");
    }
    plan
}

/// Two days, morning and afternoon active, carried as plans without text.
pub fn create_test_draft() -> ActivityDraft {
    ActivityDraft {
        name: String::from("Mùa hè xanh"),
        description: String::new(),
        activity_type: ActivityType::MultipleDays,
        start_date: date(2),
        end_date: date(3),
        location_mode: LocationMode::Global,
        location: None,
        max_participants: Some(10),
        registration_threshold: 50,
        visibility: Visibility::Public,
        responsible_persons: vec![1],
        schedule: vec![
            ScheduleDay {
                day: 1,
                date: date(2),
                activities: String::new(),
                plan: Some(day_plan()),
            },
            ScheduleDay {
                day: 2,
                date: date(3),
                activities: String::new(),
                plan: Some(day_plan()),
            },
        ],
    }
}

/// A persisted activity (id 5) in the given status, schedule already encoded.
pub fn create_test_state(status: ActivityStatus) -> State {
    let result: TransitionResult =
        crate::apply_create(create_test_draft(), Some(1), create_test_actor(), create_test_cause())
            .unwrap();
    let mut activity: Activity = result.new_state.activity;
    activity.activity_id = Some(5);
    activity.status = status;
    State::new(activity)
}

pub fn run(state: &State, command: Command) -> TransitionResult {
    apply(state, command, create_test_actor(), create_test_cause()).unwrap()
}

pub fn register_command(user_id: i64, slots: &[DaySlot]) -> Command {
    Command::RegisterParticipant {
        user_id,
        name: format!("Student {user_id}"),
        email: format!("student{user_id}@example.edu"),
        day_slots: slots.to_vec(),
        joined_at: String::from("2026-02-20T08:00:00Z"),
    }
}

pub const M1: DaySlot = DaySlot::new(1, SlotKind::Morning);
pub const A1: DaySlot = DaySlot::new(1, SlotKind::Afternoon);
pub const M2: DaySlot = DaySlot::new(2, SlotKind::Morning);
pub const A2: DaySlot = DaySlot::new(2, SlotKind::Afternoon);
