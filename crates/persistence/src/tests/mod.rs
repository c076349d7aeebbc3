// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![allow(clippy::expect_used, clippy::unwrap_used)]

mod activity_tests;
mod user_tests;

use crate::{PersistTransitionResult, Persistence};
use clubhub::{Command, State, TransitionResult, apply, apply_create};
use clubhub_audit::{Actor, Cause};
use clubhub_domain::{
    ActivityDraft, ActivityType, DayPlan, DaySlot, LocationMode, ScheduleDay, SlotKind, User,
    UserRole, Visibility, WeeklySlot,
};
use time::{Date, Month};

pub const M1: DaySlot = DaySlot::new(1, SlotKind::Morning);
pub const A1: DaySlot = DaySlot::new(1, SlotKind::Afternoon);
pub const M2: DaySlot = DaySlot::new(2, SlotKind::Morning);

pub fn create_test_cause() -> Cause {
    Cause::new(String::from("test-cause"), String::from("Test operation"))
}

pub fn create_test_user_record(login_name: &str, role: UserRole) -> User {
    User {
        user_id: None,
        login_name: login_name.to_string(),
        display_name: format!("User {login_name}"),
        email: format!("{login_name}@example.edu"),
        role,
        student_code: None,
        class_name: None,
    }
}

/// Creates an account and returns its ID.
pub fn create_test_user(persistence: &mut Persistence, login_name: &str, role: UserRole) -> i64 {
    persistence
        .create_user(&create_test_user_record(login_name, role))
        .unwrap()
}

fn date(day: u8) -> Date {
    Date::from_calendar_date(2026, Month::March, day).unwrap()
}

fn day_plan() -> DayPlan {
    let mut plan: DayPlan = DayPlan::default();
    for kind in [SlotKind::Morning, SlotKind::Afternoon] {
        let slot: &mut WeeklySlot = plan.slot_mut(kind).unwrap();
        slot.is_active = true;
        slot.activities = String::from("Dọn dẹp sân");
    }
    plan
}

/// Two-day activity, morning and afternoon active on both days.
pub fn create_test_draft(responsible: i64) -> ActivityDraft {
    ActivityDraft {
        name: String::from("Mùa hè xanh"),
        description: String::from("Chiến dịch tình nguyện"),
        activity_type: ActivityType::MultipleDays,
        start_date: date(2),
        end_date: date(3),
        location_mode: LocationMode::Global,
        location: None,
        max_participants: Some(10),
        registration_threshold: 50,
        visibility: Visibility::Public,
        responsible_persons: vec![responsible],
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

/// Creates and persists a draft activity owned by `admin_id`.
pub fn create_persisted_activity(persistence: &mut Persistence, admin_id: i64) -> State {
    let result: TransitionResult = apply_create(
        create_test_draft(admin_id),
        Some(admin_id),
        Actor::user(admin_id),
        create_test_cause(),
    )
    .unwrap();
    let ids: PersistTransitionResult = persistence.persist_new_activity(&result).unwrap();
    State::new(persistence.get_activity(ids.activity_id).unwrap().activity)
}

/// Applies a command as `actor_id` and persists it, returning the new state.
pub fn apply_and_persist(
    persistence: &mut Persistence,
    state: &State,
    actor_id: i64,
    command: Command,
) -> State {
    let result: TransitionResult =
        apply(state, command, Actor::user(actor_id), create_test_cause()).unwrap();
    persistence.persist_transition(&result).unwrap();
    result.new_state
}

pub fn register_command(user_id: i64, slots: &[DaySlot]) -> Command {
    Command::RegisterParticipant {
        user_id,
        name: format!("User s{user_id}"),
        email: format!("s{user_id}@example.edu"),
        day_slots: slots.to_vec(),
        joined_at: String::from("2026-02-20T08:00:00Z"),
    }
}
