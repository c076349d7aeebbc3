// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::{ActivityRecord, NotificationData, PersistTransitionResult, Persistence, PersistenceError};
use clubhub::{Command, State, TransitionResult, apply, apply_create};
use clubhub_audit::{Actor, AuditEvent};
use clubhub_domain::{
    Activity, ActivityStatus, ApprovalStatus, AttendanceStatus, DaySlot, UserRole,
};

use super::{
    A1, M1, M2, apply_and_persist, create_persisted_activity, create_test_cause, create_test_draft,
    create_test_user, register_command,
};

fn setup() -> (Persistence, i64, i64) {
    let mut persistence: Persistence = Persistence::new_in_memory().unwrap();
    let admin_id: i64 = create_test_user(&mut persistence, "admin", UserRole::Admin);
    let student_id: i64 = create_test_user(&mut persistence, "s1", UserRole::Student);
    (persistence, admin_id, student_id)
}

fn publish(persistence: &mut Persistence, state: &State, admin_id: i64) -> State {
    apply_and_persist(
        persistence,
        state,
        admin_id,
        Command::TransitionStatus {
            target: ActivityStatus::Published,
        },
    )
}

#[test]
fn test_new_activity_round_trips() {
    let (mut persistence, admin_id, _) = setup();
    let result: TransitionResult = apply_create(
        create_test_draft(admin_id),
        Some(admin_id),
        Actor::user(admin_id),
        create_test_cause(),
    )
    .unwrap();

    let ids: PersistTransitionResult = persistence.persist_new_activity(&result).unwrap();
    let loaded: ActivityRecord = persistence.get_activity(ids.activity_id).unwrap();

    let mut expected: Activity = result.new_state.activity;
    expected.activity_id = Some(ids.activity_id);
    assert_eq!(loaded.activity, expected);
    assert_eq!(loaded.activity.status, ActivityStatus::Draft);
    assert!(!loaded.created_at.is_empty());
}

#[test]
fn test_new_activity_keeps_encoded_schedule_text() {
    let (mut persistence, admin_id, _) = setup();
    let state: State = create_persisted_activity(&mut persistence, admin_id);

    let first_day: &str = &state.activity.schedule[0].activities;
    assert!(first_day.starts_with("Buổi Sáng (07:00-11:30) - Dọn dẹp sân"));
    assert!(state.activity.schedule[0].plan.is_some());
}

#[test]
fn test_create_records_audit_event_with_activity_id() {
    let (mut persistence, admin_id, _) = setup();
    let state: State = create_persisted_activity(&mut persistence, admin_id);
    let activity_id: i64 = state.activity.activity_id.unwrap();

    let history: Vec<AuditEvent> = persistence.get_activity_history(activity_id).unwrap();

    assert_eq!(history.len(), 1);
    assert_eq!(history[0].action.name, "CreateActivity");
    assert_eq!(history[0].activity_id, Some(activity_id));
    assert_eq!(history[0].actor, Actor::user(admin_id));
    assert!(history[0].event_id.is_some());
    assert!(history[0].created_at.is_some());
}

#[test]
fn test_get_activity_rejects_unknown_id() {
    let (mut persistence, _, _) = setup();

    let result: Result<ActivityRecord, PersistenceError> = persistence.get_activity(404);

    assert_eq!(result.unwrap_err(), PersistenceError::ActivityNotFound(404));
}

#[test]
fn test_participant_flow_persists_notices_and_history() {
    let (mut persistence, admin_id, student_id) = setup();
    let state: State = create_persisted_activity(&mut persistence, admin_id);
    let activity_id: i64 = state.activity.activity_id.unwrap();

    let state: State = publish(&mut persistence, &state, admin_id);
    let state: State = apply_and_persist(
        &mut persistence,
        &state,
        student_id,
        register_command(student_id, &[M1, A1]),
    );
    apply_and_persist(
        &mut persistence,
        &state,
        admin_id,
        Command::ApproveParticipant {
            user_id: student_id,
        },
    );

    let loaded: Activity = persistence.get_activity(activity_id).unwrap().activity;
    let participant = loaded.participant(student_id).unwrap();
    assert_eq!(participant.approval_status, ApprovalStatus::Approved);
    assert_eq!(participant.registered_day_slots, vec![M1, A1]);

    let notices: Vec<NotificationData> = persistence.list_notifications(student_id, true).unwrap();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].title, "Registration approved: Mùa hè xanh");
    assert_eq!(notices[0].activity_id, Some(activity_id));

    let names: Vec<String> = persistence
        .get_activity_history(activity_id)
        .unwrap()
        .into_iter()
        .map(|e| e.action.name)
        .collect();
    assert_eq!(
        names,
        vec![
            "CreateActivity",
            "TransitionStatus",
            "RegisterParticipant",
            "ApproveParticipant"
        ]
    );
}

#[test]
fn test_attendance_round_trips() {
    let (mut persistence, admin_id, student_id) = setup();
    let state: State = create_persisted_activity(&mut persistence, admin_id);
    let activity_id: i64 = state.activity.activity_id.unwrap();
    let state: State = publish(&mut persistence, &state, admin_id);
    let state: State = apply_and_persist(
        &mut persistence,
        &state,
        student_id,
        register_command(student_id, &[M1, M2]),
    );
    let state: State = apply_and_persist(
        &mut persistence,
        &state,
        admin_id,
        Command::ApproveParticipant {
            user_id: student_id,
        },
    );

    apply_and_persist(
        &mut persistence,
        &state,
        admin_id,
        Command::RecordAttendance {
            user_id: student_id,
            day_slot: Some(M2),
            status: AttendanceStatus::Late,
            recorded_at: String::from("2026-03-03T07:10:00Z"),
            recorded_by: admin_id,
        },
    );

    let loaded: Activity = persistence.get_activity(activity_id).unwrap().activity;
    let attendance = &loaded.participant(student_id).unwrap().attendance;
    assert_eq!(attendance.len(), 1);
    assert_eq!(attendance[0].day_slot, Some(M2));
    assert_eq!(attendance[0].status, AttendanceStatus::Late);
    assert_eq!(attendance[0].recorded_by, admin_id);
}

#[test]
fn test_delete_participant_removes_rows() {
    let (mut persistence, admin_id, student_id) = setup();
    let state: State = create_persisted_activity(&mut persistence, admin_id);
    let activity_id: i64 = state.activity.activity_id.unwrap();
    let state: State = publish(&mut persistence, &state, admin_id);
    let state: State = apply_and_persist(
        &mut persistence,
        &state,
        student_id,
        register_command(student_id, &[M1, A1]),
    );

    apply_and_persist(
        &mut persistence,
        &state,
        admin_id,
        Command::DeleteParticipant {
            user_id: student_id,
        },
    );

    let loaded: Activity = persistence.get_activity(activity_id).unwrap().activity;
    assert!(loaded.participants.is_empty());
    assert!(
        persistence
            .list_activities_for_participant(student_id)
            .unwrap()
            .is_empty()
    );
}

#[test]
fn test_failed_transition_rolls_back() {
    let (mut persistence, admin_id, _) = setup();
    let state: State = create_persisted_activity(&mut persistence, admin_id);
    let activity_id: i64 = state.activity.activity_id.unwrap();
    let state: State = publish(&mut persistence, &state, admin_id);

    // User 404 has no account, so the participant insert violates a foreign key.
    let result: TransitionResult = apply(
        &state,
        register_command(404, &[M1, A1]),
        Actor::user(404),
        create_test_cause(),
    )
    .unwrap();
    let persisted: Result<PersistTransitionResult, PersistenceError> =
        persistence.persist_transition(&result);

    assert!(persisted.is_err());
    let loaded: Activity = persistence.get_activity(activity_id).unwrap().activity;
    assert!(loaded.participants.is_empty());
    assert_eq!(persistence.get_activity_history(activity_id).unwrap().len(), 2);
}

#[test]
fn test_persist_transition_rejects_unsaved_activity() {
    let (mut persistence, admin_id, _) = setup();
    let result: TransitionResult = apply_create(
        create_test_draft(admin_id),
        Some(admin_id),
        Actor::user(admin_id),
        create_test_cause(),
    )
    .unwrap();

    let persisted: Result<PersistTransitionResult, PersistenceError> =
        persistence.persist_transition(&result);

    assert_eq!(persisted.unwrap_err(), PersistenceError::MissingActivityId);
}

#[test]
fn test_list_activities_for_participant_only_returns_joined_activities() {
    let (mut persistence, admin_id, student_id) = setup();
    let joined: State = create_persisted_activity(&mut persistence, admin_id);
    let _other: State = create_persisted_activity(&mut persistence, admin_id);
    let joined: State = publish(&mut persistence, &joined, admin_id);
    apply_and_persist(
        &mut persistence,
        &joined,
        student_id,
        register_command(student_id, &[M1, A1]),
    );

    let activities: Vec<Activity> = persistence
        .list_activities_for_participant(student_id)
        .unwrap();

    assert_eq!(persistence.list_activities().unwrap().len(), 2);
    assert_eq!(activities.len(), 1);
    assert_eq!(activities[0].activity_id, joined.activity.activity_id);
    let held: Vec<DaySlot> = activities[0]
        .participant(student_id)
        .unwrap()
        .registered_day_slots
        .clone();
    assert_eq!(held, vec![M1, A1]);
}
