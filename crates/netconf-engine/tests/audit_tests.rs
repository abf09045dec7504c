#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use common::*;
use netconf_core::logging_facility::test_capture::{init_test_capture, CapturedEvent, TestCapture};
use netconf_core::types::schema::{AUDIT_TARGET, EVENT_AUDIT};
use netconf_engine::audit::AuditFlags;
use netconf_engine::ServerConfig;

/// Audit records from one remote endpoint
fn audit_events(capture: &TestCapture, remote: &str) -> Vec<CapturedEvent> {
    capture
        .events_on(AUDIT_TARGET)
        .into_iter()
        .filter(|e| e.field("remote") == Some(remote))
        .collect()
}

fn audited(line: &str) -> ServerConfig {
    ServerConfig {
        audit: Some(line.to_string()),
        ..ServerConfig::default()
    }
}

#[test]
fn test_audited_edit_is_recorded_with_redacted_user() {
    // GIVEN auditing of edit-config only
    let capture = init_test_capture();
    let server = server_with(audited("edit-config"));
    let s = session_from(&server, "192.0.2.10:40001");

    // WHEN an edit and a get are handled
    s.handle(&rpc("1", &edit(&settings("<priority>4</priority>"))));
    s.handle(&rpc("2", &get_xpath("/test/settings")));

    // THEN only the edit is audited, without the username
    let events = audit_events(&capture, "192.0.2.10:40001");
    assert_eq!(events.len(), 1, "{:?}", events);
    let event = &events[0];
    assert_eq!(event.event.as_deref(), Some(EVENT_AUDIT));
    assert_eq!(event.op.as_deref(), Some("edit-config"));
    assert_eq!(event.field("outcome"), Some("ok"));
    assert_eq!(event.field("session_id"), Some(s.id().to_string().as_str()));
    assert_ne!(event.field("username"), Some("admin"));
}

#[test]
fn test_failed_operation_is_audited_with_tag() {
    let capture = init_test_capture();
    let server = server_with(audited("lock unlock"));
    let s = session_from(&server, "192.0.2.11:40002");

    s.handle(&rpc("1", UNLOCK));

    let events = audit_events(&capture, "192.0.2.11:40002");
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].op.as_deref(), Some("unlock"));
    assert_eq!(events[0].field("outcome"), Some("operation-failed"));
}

#[test]
fn test_kill_session_audit_names_target() {
    let capture = init_test_capture();
    let server = server_with(audited("kill-session"));
    let a = session_from(&server, "192.0.2.12:40003");
    let b = session(&server);

    a.handle(&rpc(
        "1",
        &format!("<kill-session><session-id>{}</session-id></kill-session>", b.id()),
    ));

    let events = audit_events(&capture, "192.0.2.12:40003");
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].field("target_session"), Some(b.id().to_string().as_str()));
}

#[test]
fn test_audit_file_reload() {
    // GIVEN an audit options file auditing get
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("audit.conf");
    std::fs::write(&path, "get\n").unwrap();
    let server = server_with(ServerConfig {
        audit_file: Some(path.clone()),
        ..ServerConfig::default()
    });
    assert!(server.audit().flags().audits("get"));

    // WHEN the file changes and is reloaded
    std::fs::write(&path, "lock edit-config\n").unwrap();
    server.audit().reload().unwrap();

    // THEN the new set applies
    let flags = server.audit().flags();
    assert!(!flags.audits("get"));
    assert!(flags.audits("edit-config"));

    // AND a vanished file turns auditing off
    std::fs::remove_file(&path).unwrap();
    assert!(server.audit().reload().is_err());
    assert_eq!(server.audit().flags(), AuditFlags::default());
}

#[test]
fn test_unreadable_audit_file_leaves_auditing_off() {
    let dir = tempfile::tempdir().unwrap();
    let server = server_with(ServerConfig {
        audit_file: Some(dir.path().join("missing.conf")),
        audit: Some("get".to_string()),
        ..ServerConfig::default()
    });

    assert!(server.audit().flags().is_empty());
}
