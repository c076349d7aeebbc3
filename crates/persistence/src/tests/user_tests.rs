// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::{Persistence, PersistenceError, SessionData};
use clubhub_audit::{Action, Actor, AuditEvent, StateSnapshot};
use clubhub_domain::{User, UserRole};

use super::{create_test_cause, create_test_user, create_test_user_record};

fn account_event(name: &str, after: String, activity_id: Option<i64>) -> AuditEvent {
    AuditEvent::new(
        Actor::user(1),
        create_test_cause(),
        Action::new(name.to_string(), None),
        StateSnapshot::new(String::new()),
        StateSnapshot::new(after),
        activity_id,
    )
}

#[test]
fn test_create_user_round_trips() {
    let mut persistence: Persistence = Persistence::new_in_memory().unwrap();
    let mut record: User = create_test_user_record("sv001", UserRole::Student);
    record.student_code = Some(String::from("SV001"));
    record.class_name = Some(String::from("K66-CNTT"));

    let user_id: i64 = persistence.create_user(&record).unwrap();
    let loaded: User = persistence.get_user_by_id(user_id).unwrap().unwrap();

    record.user_id = Some(user_id);
    assert_eq!(loaded, record);
}

#[test]
fn test_create_user_rejects_duplicate_login() {
    let mut persistence: Persistence = Persistence::new_in_memory().unwrap();
    create_test_user(&mut persistence, "dup", UserRole::Student);

    let result: Result<i64, PersistenceError> =
        persistence.create_user(&create_test_user_record("dup", UserRole::Officer));

    assert_eq!(
        result.unwrap_err(),
        PersistenceError::DuplicateLoginName(String::from("dup"))
    );
}

#[test]
fn test_get_user_by_id_returns_none_when_missing() {
    let mut persistence: Persistence = Persistence::new_in_memory().unwrap();
    assert!(persistence.get_user_by_id(42).unwrap().is_none());
}

#[test]
fn test_list_users_with_roles_filters_by_role() {
    let mut persistence: Persistence = Persistence::new_in_memory().unwrap();
    create_test_user(&mut persistence, "admin", UserRole::Admin);
    create_test_user(&mut persistence, "officer", UserRole::Officer);
    create_test_user(&mut persistence, "student", UserRole::Student);

    let responsible: Vec<User> = persistence
        .list_users_with_roles(&[UserRole::Admin, UserRole::Officer])
        .unwrap();

    let logins: Vec<&str> = responsible.iter().map(|u| u.login_name.as_str()).collect();
    assert_eq!(logins, vec!["admin", "officer"]);
}

#[test]
fn test_search_members_matches_substrings() {
    let mut persistence: Persistence = Persistence::new_in_memory().unwrap();
    let mut record: User = create_test_user_record("nguyenvana", UserRole::Student);
    record.display_name = String::from("Nguyễn Văn A");
    record.student_code = Some(String::from("SV2024001"));
    persistence.create_user(&record).unwrap();
    create_test_user(&mut persistence, "tranthib", UserRole::Student);

    let by_code: Vec<User> = persistence.search_members(Some("2024"), 50).unwrap();
    let by_login: Vec<User> = persistence.search_members(Some("tranthi"), 50).unwrap();
    let everyone: Vec<User> = persistence.search_members(Some("  "), 50).unwrap();
    let limited: Vec<User> = persistence.search_members(None, 1).unwrap();

    assert_eq!(by_code.len(), 1);
    assert_eq!(by_code[0].login_name, "nguyenvana");
    assert_eq!(by_login.len(), 1);
    assert_eq!(everyone.len(), 2);
    assert_eq!(limited.len(), 1);
}

#[test]
fn test_session_lifecycle() {
    let mut persistence: Persistence = Persistence::new_in_memory().unwrap();
    let user_id: i64 = create_test_user(&mut persistence, "officer", UserRole::Officer);

    let session_id: i64 = persistence
        .create_session("tok-123", user_id, "2030-01-01T00:00:00Z")
        .unwrap();
    persistence.update_session_activity(session_id).unwrap();

    let session: SessionData = persistence.get_session_by_token("tok-123").unwrap().unwrap();
    assert_eq!(session.session_id, session_id);
    assert_eq!(session.user_id, user_id);
    assert_eq!(session.expires_at, "2030-01-01T00:00:00Z");

    persistence.delete_session("tok-123").unwrap();
    assert!(persistence.get_session_by_token("tok-123").unwrap().is_none());
}

#[test]
fn test_delete_expired_sessions_keeps_live_sessions() {
    let mut persistence: Persistence = Persistence::new_in_memory().unwrap();
    let user_id: i64 = create_test_user(&mut persistence, "officer", UserRole::Officer);
    persistence
        .create_session("stale", user_id, "2020-01-01T00:00:00Z")
        .unwrap();
    persistence
        .create_session("stale-offset", user_id, "2020-06-30T23:59:59.123456789+07:00")
        .unwrap();
    persistence
        .create_session("live", user_id, "2999-01-01T00:00:00Z")
        .unwrap();

    let deleted: usize = persistence.delete_expired_sessions().unwrap();

    assert_eq!(deleted, 2);
    assert!(persistence.get_session_by_token("stale").unwrap().is_none());
    assert!(persistence.get_session_by_token("stale-offset").unwrap().is_none());
    assert!(persistence.get_session_by_token("live").unwrap().is_some());
    assert_eq!(persistence.delete_expired_sessions().unwrap(), 0);
}

#[test]
fn test_create_user_with_audit_writes_both_rows() {
    let mut persistence: Persistence = Persistence::new_in_memory().unwrap();
    let record: User = create_test_user_record("sv002", UserRole::Student);

    let (user_id, event_id): (i64, i64) = persistence
        .create_user_with_audit(&record, |id| {
            account_event("CreateUser", format!("user_id={id}"), None)
        })
        .unwrap();

    assert!(persistence.get_user_by_id(user_id).unwrap().is_some());
    let event: AuditEvent = persistence.get_audit_event(event_id).unwrap();
    assert_eq!(event.action.name, "CreateUser");
    assert_eq!(event.after.data, format!("user_id={user_id}"));
    assert_eq!(event.activity_id, None);
}

#[test]
fn test_create_user_with_audit_rolls_back_when_event_fails() {
    let mut persistence: Persistence = Persistence::new_in_memory().unwrap();
    let record: User = create_test_user_record("ghost", UserRole::Student);

    let result: Result<(i64, i64), PersistenceError> = persistence
        .create_user_with_audit(&record, |id| {
            account_event("CreateUser", format!("user_id={id}"), Some(9999))
        });

    assert!(result.is_err());
    assert!(persistence.get_user_by_login("ghost").unwrap().is_none());
}

#[test]
fn test_create_session_with_audit_rolls_back_when_event_fails() {
    let mut persistence: Persistence = Persistence::new_in_memory().unwrap();
    let user_id: i64 = create_test_user(&mut persistence, "officer", UserRole::Officer);

    let result: Result<(i64, i64), PersistenceError> = persistence.create_session_with_audit(
        "tok-orphan",
        user_id,
        "2999-01-01T00:00:00Z",
        &account_event("IssueSession", String::new(), Some(9999)),
    );

    assert!(result.is_err());
    assert!(persistence.get_session_by_token("tok-orphan").unwrap().is_none());

    let (session_id, event_id): (i64, i64) = persistence
        .create_session_with_audit(
            "tok-ok",
            user_id,
            "2999-01-01T00:00:00Z",
            &account_event("IssueSession", format!("user_id={user_id}"), None),
        )
        .unwrap();
    let session: SessionData = persistence.get_session_by_token("tok-ok").unwrap().unwrap();
    assert_eq!(session.session_id, session_id);
    assert_eq!(
        persistence.get_audit_event(event_id).unwrap().action.name,
        "IssueSession"
    );
}
