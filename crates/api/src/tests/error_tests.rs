// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use clubhub::CoreError;
use clubhub_domain::{
    ActivityStatus, ApprovalStatus, AttendanceSummary, DaySlot, DomainError, SlotKind,
};
use clubhub_persistence::PersistenceError;

use crate::{
    ATTENDANCE_CSV_HEADERS, ApiError, AuthError, attendance_summary_csv, translate_core_error,
    translate_domain_error, translate_persistence_error,
};

#[test]
fn test_field_errors_become_invalid_input() {
    let cases: Vec<(DomainError, &str)> = vec![
        (DomainError::InvalidName(String::from("empty")), "name"),
        (DomainError::InvalidThreshold { value: 101 }, "registration_threshold"),
        (DomainError::NoActiveSlot { day: 2 }, "schedule"),
        (DomainError::EmptySchedule, "schedule"),
        (DomainError::DayNotInSchedule { day: 9 }, "day_slots"),
        (
            DomainError::SlotNotActive(DaySlot::new(1, SlotKind::Evening)),
            "day_slots",
        ),
        (DomainError::InvalidSlot(String::from("noon")), "slot"),
        (DomainError::InvalidStatus(String::from("archived")), "status"),
        (DomainError::InvalidUserRole(String::from("janitor")), "role"),
    ];

    for (err, expected_field) in cases {
        match translate_domain_error(err) {
            ApiError::InvalidInput { field, .. } => assert_eq!(field, expected_field),
            other => panic!("Expected InvalidInput for {expected_field}, got {other:?}"),
        }
    }
}

#[test]
fn test_rule_errors_become_domain_rule_violations() {
    let cases: Vec<(DomainError, &str)> = vec![
        (
            DomainError::SlotFull {
                day_slot: None,
                rate: 80,
                threshold: 80,
            },
            "registration_threshold",
        ),
        (
            DomainError::ThresholdNotMet {
                selected: 1,
                available: 4,
                threshold: 50,
            },
            "minimum_slot_selection",
        ),
        (
            DomainError::InvalidStatusTransition {
                from: ActivityStatus::Draft,
                to: ActivityStatus::Completed,
            },
            "status_transition",
        ),
        (
            DomainError::RegistrationClosed {
                status: ActivityStatus::Ongoing,
            },
            "registration_open",
        ),
        (
            DomainError::InvalidParticipantTransition {
                user_id: 3,
                status: ApprovalStatus::Removed,
                action: "register",
            },
            "participant_status",
        ),
    ];

    for (err, expected_rule) in cases {
        match translate_domain_error(err) {
            ApiError::DomainRuleViolation { rule, .. } => assert_eq!(rule, expected_rule),
            other => panic!("Expected DomainRuleViolation for {expected_rule}, got {other:?}"),
        }
    }
}

#[test]
fn test_participant_errors_map_to_not_found_and_conflict() {
    let missing: ApiError = translate_domain_error(DomainError::ParticipantNotFound { user_id: 5 });
    assert!(matches!(missing, ApiError::ResourceNotFound { ref resource_type, .. } if resource_type == "Participant"));

    let duplicate: ApiError = translate_domain_error(DomainError::AlreadyRegistered { user_id: 5 });
    assert!(matches!(duplicate, ApiError::Conflict { ref conflicts, .. } if conflicts.is_empty()));
}

#[test]
fn test_core_error_translation() {
    let domain: ApiError = translate_core_error(CoreError::DomainViolation(
        DomainError::EmptySchedule,
    ));
    assert!(matches!(domain, ApiError::InvalidInput { .. }));

    let internal: ApiError = translate_core_error(CoreError::ActivityNotPersisted);
    assert!(matches!(internal, ApiError::Internal { .. }));
}

#[test]
fn test_persistence_error_translation() {
    let activity: ApiError = translate_persistence_error(PersistenceError::ActivityNotFound(7));
    assert_eq!(
        activity,
        ApiError::ResourceNotFound {
            resource_type: String::from("Activity"),
            message: String::from("Activity 7 does not exist"),
        }
    );

    let notification: ApiError =
        translate_persistence_error(PersistenceError::NotificationNotFound(3));
    assert!(matches!(notification, ApiError::ResourceNotFound { ref resource_type, .. } if resource_type == "Notification"));

    let duplicate: ApiError =
        translate_persistence_error(PersistenceError::DuplicateLoginName(String::from("s1")));
    assert!(matches!(duplicate, ApiError::Conflict { .. }));

    let internal: ApiError = translate_persistence_error(PersistenceError::MissingActivityId);
    assert!(matches!(internal, ApiError::Internal { .. }));
}

#[test]
fn test_auth_error_conversion() {
    let err: ApiError = AuthError::Unauthorized {
        action: String::from("create_activity"),
        required_role: String::from("Admin"),
    }
    .into();

    assert_eq!(
        err.to_string(),
        "Unauthorized: 'create_activity' requires Admin role"
    );
}

#[test]
fn test_attendance_csv_with_no_rows_has_header_only() {
    let csv: String = attendance_summary_csv(&[]).unwrap();

    assert_eq!(csv, format!("{}\n", ATTENDANCE_CSV_HEADERS.join(",")));
}

#[test]
fn test_attendance_csv_quotes_fields_with_commas() {
    let rows: Vec<AttendanceSummary> = vec![AttendanceSummary {
        user_id: 9,
        name: String::from("Trần, Bình"),
        email: String::from("binh@example.edu"),
        expected_sessions: 1,
        present: 1,
        late: 0,
        absent: 0,
        excused: 0,
        attendance_rate: 100,
    }];

    let csv: String = attendance_summary_csv(&rows).unwrap();

    assert!(csv.contains("9,\"Trần, Bình\",binh@example.edu,1,1,0,0,0,100"));
}
