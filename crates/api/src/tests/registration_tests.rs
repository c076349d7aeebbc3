// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use clubhub_domain::{ApprovalStatus, DaySlot, Participant, SlotKind, User, UserRole};

use super::helpers::{
    actor_for, create_activity_request, create_published, create_published_activity,
    create_single_day_request, create_test_cause, create_test_user, register, setup, slots,
};
use crate::{
    ActivityWriteResponse, ApiError, AuthenticatedActor, CheckSlotOverlapRequest,
    CheckSlotOverlapResponse, ParticipantRequest, RegistrationRateRequest,
    RegistrationRateResponse, RegistrationRequest, TransitionStatusRequest, check_slot_overlap,
    create_activity, get_registration_rate, manage_participant, transition_status,
    update_registration,
};

fn participant(response: &ActivityWriteResponse, user_id: i64) -> Participant {
    response
        .activity
        .activity
        .participant(user_id)
        .cloned()
        .unwrap()
}

#[test]
fn test_register_for_multi_day_activity_succeeds() {
    let mut ctx = setup();
    let activity_id: i64 = create_published_activity(&mut ctx, "Mùa hè xanh");

    let response: ActivityWriteResponse = register(
        &mut ctx.persistence,
        activity_id,
        &ctx.student,
        &ctx.student_user,
        &[(2, "morning"), (1, "afternoon")],
    )
    .unwrap();

    assert_eq!(response.action, "RegisterParticipant");
    let entry: Participant = participant(&response, ctx.student.user_id);
    assert_eq!(entry.approval_status, ApprovalStatus::Pending);
    assert_eq!(entry.name, ctx.student_user.display_name);
    assert_eq!(
        entry.registered_day_slots,
        vec![
            DaySlot::new(1, SlotKind::Afternoon),
            DaySlot::new(2, SlotKind::Morning)
        ]
    );
    assert_eq!(response.activity.registration.registered, 1);
}

#[test]
fn test_register_accepts_numeric_slot_ids() {
    let mut ctx = setup();
    let activity_id: i64 = create_published_activity(&mut ctx, "Mùa hè xanh");

    let response: ActivityWriteResponse = register(
        &mut ctx.persistence,
        activity_id,
        &ctx.student,
        &ctx.student_user,
        &[(1, "1"), (1, "2")],
    )
    .unwrap();

    let entry: Participant = participant(&response, ctx.student.user_id);
    assert_eq!(entry.registered_day_slots.len(), 2);
}

#[test]
fn test_register_below_minimum_selection_is_rejected() {
    let mut ctx = setup();
    let activity_id: i64 = create_published_activity(&mut ctx, "Mùa hè xanh");

    let err: ApiError = register(
        &mut ctx.persistence,
        activity_id,
        &ctx.student,
        &ctx.student_user,
        &[(1, "morning")],
    )
    .unwrap_err();

    assert!(matches!(err, ApiError::DomainRuleViolation { ref rule, .. } if rule == "minimum_slot_selection"));
}

#[test]
fn test_register_for_inactive_slot_is_rejected() {
    let mut ctx = setup();
    let activity_id: i64 = create_published_activity(&mut ctx, "Mùa hè xanh");

    let err: ApiError = register(
        &mut ctx.persistence,
        activity_id,
        &ctx.student,
        &ctx.student_user,
        &[(1, "morning"), (1, "evening")],
    )
    .unwrap_err();

    assert!(matches!(err, ApiError::InvalidInput { ref field, .. } if field == "day_slots"));
}

#[test]
fn test_register_with_unknown_slot_name_is_rejected() {
    let mut ctx = setup();
    let activity_id: i64 = create_published_activity(&mut ctx, "Mùa hè xanh");

    let err: ApiError = register(
        &mut ctx.persistence,
        activity_id,
        &ctx.student,
        &ctx.student_user,
        &[(1, "midnight")],
    )
    .unwrap_err();

    assert!(matches!(err, ApiError::InvalidInput { ref field, .. } if field == "slot"));
}

#[test]
fn test_register_for_postponed_activity_is_rejected() {
    let mut ctx = setup();
    let activity_id: i64 = create_published_activity(&mut ctx, "Mùa hè xanh");
    transition_status(
        &mut ctx.persistence,
        activity_id,
        &TransitionStatusRequest {
            status: String::from("postponed"),
        },
        &ctx.admin,
        create_test_cause(),
    )
    .unwrap();

    let err: ApiError = register(
        &mut ctx.persistence,
        activity_id,
        &ctx.student,
        &ctx.student_user,
        &[(1, "morning"), (1, "afternoon")],
    )
    .unwrap_err();

    assert!(matches!(err, ApiError::DomainRuleViolation { ref rule, .. } if rule == "registration_open"));
}

#[test]
fn test_register_twice_is_conflict() {
    let mut ctx = setup();
    let activity_id: i64 = create_published_activity(&mut ctx, "Mùa hè xanh");
    let pairs: [(u32, &str); 2] = [(1, "morning"), (1, "afternoon")];
    register(&mut ctx.persistence, activity_id, &ctx.student, &ctx.student_user, &pairs).unwrap();

    let err: ApiError =
        register(&mut ctx.persistence, activity_id, &ctx.student, &ctx.student_user, &pairs)
            .unwrap_err();

    assert!(matches!(err, ApiError::Conflict { ref conflicts, .. } if conflicts.is_empty()));
}

#[test]
fn test_register_overlapping_another_activity_is_conflict() {
    let mut ctx = setup();
    let first: i64 = create_published_activity(&mut ctx, "Mùa hè xanh");
    let second: i64 = create_published_activity(&mut ctx, "Tiếp sức mùa thi");
    register(
        &mut ctx.persistence,
        first,
        &ctx.student,
        &ctx.student_user,
        &[(1, "morning"), (1, "afternoon")],
    )
    .unwrap();

    let err: ApiError = register(
        &mut ctx.persistence,
        second,
        &ctx.student,
        &ctx.student_user,
        &[(1, "morning"), (2, "morning")],
    )
    .unwrap_err();

    match err {
        ApiError::Conflict { conflicts, .. } => {
            assert_eq!(conflicts.len(), 1);
            assert_eq!(conflicts[0].activity_id, first);
            assert_eq!(conflicts[0].activity_name, "Mùa hè xanh");
            assert_eq!(conflicts[0].day, 1);
            assert_eq!(conflicts[0].slot, SlotKind::Morning);
        }
        other => panic!("Expected Conflict, got {other:?}"),
    }

    // Nothing was persisted for the rejected registration
    let rate: RegistrationRateResponse = get_registration_rate(
        &mut ctx.persistence,
        second,
        &RegistrationRateRequest::default(),
        &ctx.admin,
    )
    .unwrap();
    assert_eq!(rate.status.registered, 0);
}

#[test]
fn test_rejected_registration_does_not_hold_slots() {
    let mut ctx = setup();
    let first: i64 = create_published_activity(&mut ctx, "Mùa hè xanh");
    let second: i64 = create_published_activity(&mut ctx, "Tiếp sức mùa thi");
    let pairs: [(u32, &str); 2] = [(1, "morning"), (1, "afternoon")];
    register(&mut ctx.persistence, first, &ctx.student, &ctx.student_user, &pairs).unwrap();
    manage_participant(
        &mut ctx.persistence,
        first,
        ParticipantRequest::Reject {
            user_id: ctx.student.user_id,
            reason: None,
        },
        &ctx.officer,
        create_test_cause(),
    )
    .unwrap();

    let response: ActivityWriteResponse =
        register(&mut ctx.persistence, second, &ctx.student, &ctx.student_user, &pairs).unwrap();

    assert_eq!(
        participant(&response, ctx.student.user_id).approval_status,
        ApprovalStatus::Pending
    );
}

#[test]
fn test_update_slots_replaces_selection() {
    let mut ctx = setup();
    let activity_id: i64 = create_published_activity(&mut ctx, "Mùa hè xanh");
    register(
        &mut ctx.persistence,
        activity_id,
        &ctx.student,
        &ctx.student_user,
        &[(1, "morning"), (1, "afternoon")],
    )
    .unwrap();

    let response: ActivityWriteResponse = update_registration(
        &mut ctx.persistence,
        activity_id,
        &RegistrationRequest::UpdateSlots {
            day_slots: slots(&[(2, "morning"), (2, "afternoon"), (1, "morning")]),
        },
        &ctx.student,
        &ctx.student_user,
        create_test_cause(),
    )
    .unwrap();

    assert_eq!(response.action, "UpdateRegisteredSlots");
    assert_eq!(response.message, format!("User {} now holds 3 slot(s)", ctx.student.user_id));
    assert_eq!(
        participant(&response, ctx.student.user_id).registered_day_slots,
        vec![
            DaySlot::new(1, SlotKind::Morning),
            DaySlot::new(2, SlotKind::Morning),
            DaySlot::new(2, SlotKind::Afternoon),
        ]
    );
}

#[test]
fn test_update_slots_with_duplicate_is_rejected() {
    let mut ctx = setup();
    let activity_id: i64 = create_published_activity(&mut ctx, "Mùa hè xanh");
    register(
        &mut ctx.persistence,
        activity_id,
        &ctx.student,
        &ctx.student_user,
        &[(1, "morning"), (1, "afternoon")],
    )
    .unwrap();

    let err: ApiError = update_registration(
        &mut ctx.persistence,
        activity_id,
        &RegistrationRequest::UpdateSlots {
            day_slots: slots(&[(1, "morning"), (1, "morning")]),
        },
        &ctx.student,
        &ctx.student_user,
        create_test_cause(),
    )
    .unwrap_err();

    assert!(matches!(err, ApiError::InvalidInput { ref field, .. } if field == "day_slots"));
}

#[test]
fn test_unregister_removes_participant() {
    let mut ctx = setup();
    let activity_id: i64 = create_published_activity(&mut ctx, "Mùa hè xanh");
    register(
        &mut ctx.persistence,
        activity_id,
        &ctx.student,
        &ctx.student_user,
        &[(1, "morning"), (1, "afternoon")],
    )
    .unwrap();

    let response: ActivityWriteResponse = update_registration(
        &mut ctx.persistence,
        activity_id,
        &RegistrationRequest::Unregister,
        &ctx.student,
        &ctx.student_user,
        create_test_cause(),
    )
    .unwrap();

    assert!(response.activity.activity.participant(ctx.student.user_id).is_none());
    assert_eq!(response.activity.registration.registered, 0);
}

#[test]
fn test_unregister_without_registration_is_not_found() {
    let mut ctx = setup();
    let activity_id: i64 = create_published_activity(&mut ctx, "Mùa hè xanh");

    let err: ApiError = update_registration(
        &mut ctx.persistence,
        activity_id,
        &RegistrationRequest::Unregister,
        &ctx.student,
        &ctx.student_user,
        create_test_cause(),
    )
    .unwrap_err();

    assert!(matches!(err, ApiError::ResourceNotFound { ref resource_type, .. } if resource_type == "Participant"));
}

#[test]
fn test_check_slot_overlap_reports_conflicts() {
    let mut ctx = setup();
    let first: i64 = create_published_activity(&mut ctx, "Mùa hè xanh");
    let second: i64 = create_published_activity(&mut ctx, "Tiếp sức mùa thi");
    register(
        &mut ctx.persistence,
        first,
        &ctx.student,
        &ctx.student_user,
        &[(1, "morning"), (2, "afternoon")],
    )
    .unwrap();

    let colliding: CheckSlotOverlapResponse = check_slot_overlap(
        &mut ctx.persistence,
        &CheckSlotOverlapRequest {
            activity_id: second,
            day: 2,
            slot: String::from("afternoon"),
            user_id: None,
        },
        &ctx.student,
    )
    .unwrap();
    assert!(colliding.has_overlap);
    assert_eq!(colliding.conflicts[0].activity_id, first);

    let free: CheckSlotOverlapResponse = check_slot_overlap(
        &mut ctx.persistence,
        &CheckSlotOverlapRequest {
            activity_id: second,
            day: 2,
            slot: String::from("morning"),
            user_id: None,
        },
        &ctx.student,
    )
    .unwrap();
    assert!(!free.has_overlap);
    assert!(free.conflicts.is_empty());
}

#[test]
fn test_staff_can_check_overlap_for_another_user() {
    let mut ctx = setup();
    let first: i64 = create_published_activity(&mut ctx, "Mùa hè xanh");
    let second: i64 = create_published_activity(&mut ctx, "Tiếp sức mùa thi");
    register(
        &mut ctx.persistence,
        first,
        &ctx.student,
        &ctx.student_user,
        &[(1, "morning"), (1, "afternoon")],
    )
    .unwrap();

    let response: CheckSlotOverlapResponse = check_slot_overlap(
        &mut ctx.persistence,
        &CheckSlotOverlapRequest {
            activity_id: second,
            day: 1,
            slot: String::from("morning"),
            user_id: Some(ctx.student.user_id),
        },
        &ctx.officer,
    )
    .unwrap();

    assert!(response.has_overlap);
}

#[test]
fn test_student_cannot_check_overlap_for_another_user() {
    let mut ctx = setup();
    let activity_id: i64 = create_published_activity(&mut ctx, "Mùa hè xanh");
    let other: User = create_test_user(&mut ctx.persistence, "s2", UserRole::Student);

    let result: Result<CheckSlotOverlapResponse, ApiError> = check_slot_overlap(
        &mut ctx.persistence,
        &CheckSlotOverlapRequest {
            activity_id,
            day: 1,
            slot: String::from("morning"),
            user_id: other.user_id,
        },
        &ctx.student,
    );

    assert!(matches!(result, Err(ApiError::Unauthorized { .. })));
}

#[test]
fn test_check_slot_overlap_for_unknown_day_is_invalid() {
    let mut ctx = setup();
    let activity_id: i64 = create_published_activity(&mut ctx, "Mùa hè xanh");

    let err: ApiError = check_slot_overlap(
        &mut ctx.persistence,
        &CheckSlotOverlapRequest {
            activity_id,
            day: 7,
            slot: String::from("morning"),
            user_id: None,
        },
        &ctx.student,
    )
    .unwrap_err();

    assert!(matches!(err, ApiError::InvalidInput { ref field, .. } if field == "day_slots"));
}

#[test]
fn test_registration_rate_excludes_caller() {
    let mut ctx = setup();
    let activity_id: i64 = create_published_activity(&mut ctx, "Mùa hè xanh");
    let other: User = create_test_user(&mut ctx.persistence, "s2", UserRole::Student);
    let other_actor: AuthenticatedActor = actor_for(&other);
    let pairs: [(u32, &str); 2] = [(1, "morning"), (1, "afternoon")];
    register(&mut ctx.persistence, activity_id, &ctx.student, &ctx.student_user, &pairs).unwrap();
    register(&mut ctx.persistence, activity_id, &other_actor, &other, &pairs).unwrap();

    let request: RegistrationRateRequest = RegistrationRateRequest {
        day: Some(1),
        slot: Some(String::from("morning")),
    };
    let own_view: RegistrationRateResponse =
        get_registration_rate(&mut ctx.persistence, activity_id, &request, &ctx.student).unwrap();
    let admin_view: RegistrationRateResponse =
        get_registration_rate(&mut ctx.persistence, activity_id, &request, &ctx.admin).unwrap();

    assert_eq!(own_view.status.registered, 1);
    assert_eq!(own_view.status.rate, 10);
    assert_eq!(admin_view.status.registered, 2);
    assert_eq!(admin_view.status.rate, 20);
    assert_eq!(admin_view.status.threshold, 50);
    assert!(admin_view.status.can_register);
    assert_eq!(
        admin_view.status.day_slot,
        Some(DaySlot::new(1, SlotKind::Morning))
    );
}

#[test]
fn test_registration_rate_requires_day_and_slot_together() {
    let mut ctx = setup();
    let activity_id: i64 = create_published_activity(&mut ctx, "Mùa hè xanh");

    let err: ApiError = get_registration_rate(
        &mut ctx.persistence,
        activity_id,
        &RegistrationRateRequest {
            day: Some(1),
            slot: None,
        },
        &ctx.student,
    )
    .unwrap_err();

    assert!(matches!(err, ApiError::InvalidInput { ref field, .. } if field == "slot"));
}

#[test]
fn test_single_day_registration_stops_at_threshold() {
    let mut ctx = setup();
    let officer_id: i64 = ctx.officer.user_id;
    let activity_id: i64 = create_published(
        &mut ctx,
        create_single_day_request("Hiến máu", 2, 50, vec![officer_id]),
    );
    let other: User = create_test_user(&mut ctx.persistence, "s2", UserRole::Student);
    let other_actor: AuthenticatedActor = actor_for(&other);

    let first: ActivityWriteResponse =
        register(&mut ctx.persistence, activity_id, &ctx.student, &ctx.student_user, &[]).unwrap();
    assert!(
        participant(&first, ctx.student.user_id)
            .registered_day_slots
            .is_empty()
    );
    assert_eq!(first.activity.registration.rate, 50);
    assert!(!first.activity.registration.can_register);

    let err: ApiError =
        register(&mut ctx.persistence, activity_id, &other_actor, &other, &[]).unwrap_err();

    assert!(matches!(err, ApiError::DomainRuleViolation { ref rule, .. } if rule == "registration_threshold"));
}

#[test]
fn test_student_cannot_register_for_hidden_activity() {
    let mut ctx = setup();
    let officer_id: i64 = ctx.officer.user_id;
    let activity_id: i64 = create_activity(
        &mut ctx.persistence,
        create_activity_request("Mùa hè xanh", vec![officer_id]),
        &ctx.admin,
        create_test_cause(),
    )
    .unwrap()
    .activity
    .activity_id;

    let err: ApiError = register(
        &mut ctx.persistence,
        activity_id,
        &ctx.student,
        &ctx.student_user,
        &[(1, "morning"), (1, "afternoon")],
    )
    .unwrap_err();

    assert!(matches!(err, ApiError::ResourceNotFound { .. }));
}
