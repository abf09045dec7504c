#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use common::{agent, config, open, xpath};
use netconf_core::logging_facility::test_capture::{init_test_capture, CapturedEvent, TestCapture};
use netconf_core::types::schema::{EVENT_END, EVENT_END_ERROR, EVENT_START};
use netconf_core::types::RequestContext;
use netconf_core::{log_op_end, log_op_error, log_op_start, ops, Datastore, EditOperation, NetconfError, WithDefaults};

/// Events of one request, in order
fn request_events(capture: &TestCapture, ctx: &RequestContext) -> Vec<CapturedEvent> {
    capture
        .events()
        .into_iter()
        .filter(|e| e.field("request_id") == Some(ctx.request_id.as_str()))
        .collect()
}

#[test]
fn test_log_op_macros_emit_canonical_events() {
    let capture = init_test_capture();
    let op = "logging_macro_check_1";

    log_op_start!(op);
    log_op_end!(op, duration_ms = 42u64);
    log_op_error!(op, &NetconfError::SelfKill, duration_ms = 7u64);

    let events = capture.events_for(op);
    assert_eq!(events.len(), 3);
    assert_eq!(events[0].event.as_deref(), Some(EVENT_START));
    assert_eq!(events[1].event.as_deref(), Some(EVENT_END));
    assert_eq!(events[1].field("duration_ms"), Some("42"));
    assert_eq!(events[2].event.as_deref(), Some(EVENT_END_ERROR));
    assert_eq!(events[2].field("err_tag"), Some("invalid-value"));
    assert_eq!(events[2].field("err_type"), Some("protocol"));
}

#[test]
fn test_successful_get_logs_start_and_end() {
    let capture = init_test_capture();
    let mut agent = agent();
    let ctx = open(&mut agent);

    ops::get(&agent, &ctx, &xpath("/test/settings"), WithDefaults::Explicit).unwrap();

    let events = request_events(&capture, &ctx);
    assert_eq!(events.len(), 2);
    assert_eq!(events[0].op.as_deref(), Some("get"));
    assert_eq!(events[0].event.as_deref(), Some(EVENT_START));
    assert_eq!(events[1].event.as_deref(), Some(EVENT_END));
    assert!(events[1].field("duration_ms").is_some());
}

#[test]
fn test_failed_edit_logs_error_tag() {
    let capture = init_test_capture();
    let mut agent = agent();
    let ctx = open(&mut agent);

    let result = ops::edit_config(
        &mut agent,
        &ctx,
        Datastore::Running,
        &config("<test><settings><priority>99</priority></settings></test>"),
        EditOperation::Merge,
    );
    assert!(result.is_err());

    let events = request_events(&capture, &ctx);
    let last = events.last().unwrap();
    assert_eq!(last.op.as_deref(), Some("edit_config"));
    assert_eq!(last.event.as_deref(), Some(EVENT_END_ERROR));
    assert_eq!(last.field("err_tag"), Some("invalid-value"));
    assert_eq!(
        capture.count_events(|e| {
            e.field("request_id") == Some(ctx.request_id.as_str()) && e.event.as_deref() == Some(EVENT_END)
        }),
        0
    );
}

#[test]
fn test_lock_contention_logs_lock_denied() {
    let capture = init_test_capture();
    let mut agent = agent();
    let first = open(&mut agent);
    let second = open(&mut agent);
    ops::lock(&mut agent, &first, Datastore::Running).unwrap();

    let _ = ops::lock(&mut agent, &second, Datastore::Running);

    let events = request_events(&capture, &second);
    assert_eq!(events.len(), 2);
    assert_eq!(events[1].field("err_tag"), Some("lock-denied"));
    assert_eq!(events[1].field("err_type"), Some("protocol"));
}
