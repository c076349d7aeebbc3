// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Test helper functions and fixtures.

use clubhub_audit::Cause;
use clubhub_domain::{
    ActivityType, DayPlan, LocationMode, ScheduleDay, SlotKind, User, UserRole, Visibility,
    WeeklySlot, parse_date,
};
use clubhub_persistence::Persistence;

use crate::{
    ActivityWriteResponse, ApiError, AuthenticatedActor, DaySlotInput, RegistrationRequest,
    SaveActivityRequest, TransitionStatusRequest, create_activity, transition_status,
    update_registration,
};

/// An in-memory database with one account per role.
pub struct TestContext {
    pub persistence: Persistence,
    pub admin: AuthenticatedActor,
    pub officer: AuthenticatedActor,
    pub student: AuthenticatedActor,
    pub student_user: User,
}

pub fn create_test_cause() -> Cause {
    Cause::new(String::from("api-req-456"), String::from("API request"))
}

/// Creates an account and returns it with its id filled in.
pub fn create_test_user(persistence: &mut Persistence, login_name: &str, role: UserRole) -> User {
    let mut user: User = User {
        user_id: None,
        login_name: login_name.to_string(),
        display_name: format!("User {login_name}"),
        email: format!("{login_name}@example.edu"),
        role,
        student_code: None,
        class_name: None,
    };
    user.user_id = Some(persistence.create_user(&user).unwrap());
    user
}

pub fn actor_for(user: &User) -> AuthenticatedActor {
    AuthenticatedActor::new(user.user_id.unwrap(), user.role)
}

pub fn setup() -> TestContext {
    let mut persistence: Persistence = Persistence::new_in_memory().unwrap();
    let admin: User = create_test_user(&mut persistence, "admin", UserRole::Admin);
    let officer: User = create_test_user(&mut persistence, "officer", UserRole::Officer);
    let student: User = create_test_user(&mut persistence, "s1", UserRole::Student);
    TestContext {
        persistence,
        admin: actor_for(&admin),
        officer: actor_for(&officer),
        student: actor_for(&student),
        student_user: student,
    }
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

/// Two-day activity on 2026-03-02/03, morning and afternoon active on both
/// days, capacity 10, threshold 50.
pub fn create_activity_request(name: &str, responsible_persons: Vec<i64>) -> SaveActivityRequest {
    SaveActivityRequest {
        name: name.to_string(),
        description: String::from("Chiến dịch tình nguyện"),
        activity_type: ActivityType::MultipleDays,
        start_date: String::from("2026-03-02"),
        end_date: String::from("2026-03-03"),
        location_mode: Some(LocationMode::Global),
        location: None,
        max_participants: Some(10),
        registration_threshold: Some(50),
        visibility: Visibility::Public,
        responsible_persons,
        schedule: vec![
            ScheduleDay {
                day: 1,
                date: parse_date("2026-03-02").unwrap(),
                activities: String::new(),
                plan: Some(day_plan()),
            },
            ScheduleDay {
                day: 2,
                date: parse_date("2026-03-03").unwrap(),
                activities: String::new(),
                plan: Some(day_plan()),
            },
        ],
    }
}

/// Single-day activity with no schedule.
pub fn create_single_day_request(
    name: &str,
    capacity: u32,
    threshold: i64,
    responsible_persons: Vec<i64>,
) -> SaveActivityRequest {
    SaveActivityRequest {
        name: name.to_string(),
        description: String::new(),
        activity_type: ActivityType::SingleDay,
        start_date: String::from("2026-04-10"),
        end_date: String::from("2026-04-10"),
        location_mode: Some(LocationMode::Global),
        location: None,
        max_participants: Some(capacity),
        registration_threshold: Some(threshold),
        visibility: Visibility::Public,
        responsible_persons,
        schedule: Vec::new(),
    }
}

/// Creates an activity as the context admin and publishes it.
pub fn create_published(ctx: &mut TestContext, request: SaveActivityRequest) -> i64 {
    let created: ActivityWriteResponse =
        create_activity(&mut ctx.persistence, request, &ctx.admin, create_test_cause()).unwrap();
    transition_status(
        &mut ctx.persistence,
        created.activity.activity_id,
        &TransitionStatusRequest {
            status: String::from("published"),
        },
        &ctx.admin,
        create_test_cause(),
    )
    .unwrap();
    created.activity.activity_id
}

/// Creates and publishes the default two-day activity, with the context
/// officer as responsible person.
pub fn create_published_activity(ctx: &mut TestContext, name: &str) -> i64 {
    let officer_id: i64 = ctx.officer.user_id;
    create_published(ctx, create_activity_request(name, vec![officer_id]))
}

pub fn slots(pairs: &[(u32, &str)]) -> Vec<DaySlotInput> {
    pairs
        .iter()
        .map(|(day, slot)| DaySlotInput {
            day: *day,
            slot: (*slot).to_string(),
        })
        .collect()
}

/// Registers `user` for `pairs` and returns the response.
pub fn register(
    persistence: &mut Persistence,
    activity_id: i64,
    actor: &AuthenticatedActor,
    user: &User,
    pairs: &[(u32, &str)],
) -> Result<ActivityWriteResponse, ApiError> {
    update_registration(
        persistence,
        activity_id,
        &RegistrationRequest::Register {
            day_slots: slots(pairs),
        },
        actor,
        user,
        create_test_cause(),
    )
}
