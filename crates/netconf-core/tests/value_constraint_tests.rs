#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use common::{agent, config, open, stored};
use netconf_core::{ops, Datastore, EditOperation, ErrorTag, NetconfError};

/// Edit `leaf` under `container` with each value; `true` means it must be accepted
fn check_matrix(container: &str, leaf: &str, matrix: &[(&str, bool)]) {
    for (value, accepted) in matrix {
        let mut agent = agent();
        let ctx = open(&mut agent);
        let body = format!(
            "<test><{c}><{l}>{v}</{l}></{c}></test>",
            c = container,
            l = leaf,
            v = value
        );

        let result = ops::edit_config(
            &mut agent,
            &ctx,
            Datastore::Running,
            &config(&body),
            EditOperation::Merge,
        );

        match (result, accepted) {
            (Ok(_), true) => {}
            (Err(err), false) => {
                assert!(matches!(err, NetconfError::InvalidValue { .. }), "{}: {:?}", value, err);
                assert_eq!(err.tag(), ErrorTag::InvalidValue);
            }
            (other, _) => panic!("'{}' expected accepted={}, got {:?}", value, accepted, other),
        }
    }
}

#[test]
fn test_enumerated_leaf_accepts_names_and_stored_values() {
    check_matrix(
        "settings",
        "debug",
        &[
            ("1", true),
            ("0", true),
            ("2", false),
            ("enable", true),
            ("true", false),
            ("Enable", false),
        ],
    );
}

#[test]
fn test_enum_name_is_stored_as_value() {
    let mut agent = agent();
    let ctx = open(&mut agent);

    ops::edit_config(
        &mut agent,
        &ctx,
        Datastore::Running,
        &config("<test><settings><debug>disable</debug></settings></test>"),
        EditOperation::Merge,
    )
    .unwrap();

    assert_eq!(stored(&agent, "/test/settings/debug").as_deref(), Some("0"));
}

#[test]
fn test_range_restricted_leaf() {
    check_matrix(
        "settings",
        "priority",
        &[("1", true), ("10", true), ("0", false), ("11", false), ("^1$", false)],
    );
}

#[test]
fn test_pattern_restricted_leaf() {
    let long_ok = format!("card:{}.cfg", "asdfgjklp".repeat(30).chars().take(211).collect::<String>());
    let long_bad = format!("card:{}.cfg", "asdfgjklp".repeat(30).chars().take(261).collect::<String>());
    check_matrix(
        "patterns",
        "variable_1",
        &[
            ("flash:/default.cfg", true),
            ("usb:/a.cfg", true),
            ("sunny", false),
            ("flash:", false),
            ("flash:default", false),
            (long_bad.as_str(), false),
            (long_ok.as_str(), true),
            ("xyzflash:a.cfgabd", false),
        ],
    );
}

#[test]
fn test_empty_value_fails_pattern() {
    check_matrix("patterns", "variable_1", &[("", false)]);
}
