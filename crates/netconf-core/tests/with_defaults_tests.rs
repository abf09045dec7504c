#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use common::{agent, open, subtree, xpath, INTERFACES_NS};
use netconf_core::ops::{self, NetconfAgent};
use netconf_core::types::RequestContext;
use netconf_core::{Filter, ResultTree, WithDefaults};

fn read(agent: &NetconfAgent, ctx: &RequestContext, filter: &Filter, mode: &str) -> ResultTree {
    ops::get(agent, ctx, filter, mode.parse().unwrap()).unwrap()
}

/// `name=value` pairs of every interface, in document order
fn interfaces(tree: &ResultTree) -> Vec<Vec<String>> {
    tree.select("/interfaces/interface")
        .into_iter()
        .map(|entry| {
            entry
                .children
                .iter()
                .map(|c| format!("{}={}", c.name, c.value.as_deref().unwrap_or_default()))
                .collect()
        })
        .collect()
}

fn filters() -> Vec<Filter> {
    vec![
        xpath("/interfaces"),
        subtree("<interfaces></interfaces>"),
        subtree(&format!(r#"<interfaces xmlns="{}"/>"#, INTERFACES_NS)),
    ]
}

#[test]
fn test_explicit_reports_stored_values_only() {
    let mut agent = agent();
    let ctx = open(&mut agent);

    for filter in filters() {
        let tree = read(&agent, &ctx, &filter, "explicit");
        assert_eq!(
            interfaces(&tree),
            vec![
                vec!["name=eth0", "mtu=8192", "status=up"],
                vec!["name=eth1", "status=up"],
                vec!["name=eth2", "mtu=9000", "status=not feeling so good"],
                vec!["name=eth3", "mtu=1500", "status=waking up"],
            ],
            "{:?}",
            filter
        );
    }
}

#[test]
fn test_report_all_adds_missing_defaults() {
    let mut agent = agent();
    let ctx = open(&mut agent);

    for filter in filters() {
        let tree = read(&agent, &ctx, &filter, "report-all");
        assert_eq!(
            interfaces(&tree),
            vec![
                vec!["name=eth0", "mtu=8192", "status=up"],
                vec!["name=eth1", "mtu=1500", "status=up"],
                vec!["name=eth2", "mtu=9000", "status=not feeling so good"],
                vec!["name=eth3", "mtu=1500", "status=waking up"],
            ],
            "{:?}",
            filter
        );
    }
}

#[test]
fn test_trim_drops_values_equal_to_default() {
    let mut agent = agent();
    let ctx = open(&mut agent);

    for filter in filters() {
        let tree = read(&agent, &ctx, &filter, "trim");
        assert_eq!(
            interfaces(&tree),
            vec![
                vec!["name=eth0", "mtu=8192"],
                vec!["name=eth1"],
                vec!["name=eth2", "mtu=9000", "status=not feeling so good"],
                vec!["name=eth3", "status=waking up"],
            ],
            "{:?}",
            filter
        );
    }
}

#[test]
fn test_report_all_selection_of_unset_leaf() {
    let mut agent = agent();
    let ctx = open(&mut agent);
    let filter = subtree("<interfaces><interface><name>eth1</name><mtu/></interface></interfaces>");

    let explicit = read(&agent, &ctx, &filter, "explicit");
    let report_all = read(&agent, &ctx, &filter, "report-all");

    assert!(explicit.is_empty());
    assert_eq!(report_all.texts("/interfaces/interface/mtu"), vec!["1500"]);
    assert_eq!(report_all.texts("/interfaces/interface/name"), vec!["eth1"]);
}

#[test]
fn test_report_all_on_absent_entry_reports_default_skeleton() {
    let mut agent = agent();
    let ctx = open(&mut agent);
    let filter = subtree("<interfaces><interface><name>eth7</name><mtu/><status/></interface></interfaces>");

    let explicit = read(&agent, &ctx, &filter, "explicit");
    let report_all = read(&agent, &ctx, &filter, "report-all");

    assert!(explicit.is_empty());
    assert_eq!(report_all.texts("/interfaces/interface/mtu"), vec!["1500"]);
    assert_eq!(report_all.texts("/interfaces/interface/status"), vec!["up"]);
    assert!(report_all.texts("/interfaces/interface/name").is_empty());
}

#[test]
fn test_report_all_xpath_on_absent_entry_reports_default_skeleton() {
    // GIVEN no interface named eth9
    let mut agent = agent();
    let ctx = open(&mut agent);

    // WHEN an XPath filter names it by key
    let entry = xpath("/interfaces/interface[name='eth9']");
    let explicit = read(&agent, &ctx, &entry, "explicit");
    let report_all = read(&agent, &ctx, &entry, "report-all");
    let leaf = read(&agent, &ctx, &xpath("/interfaces/interface[name='eth9']/mtu"), "report-all");

    // THEN report-all yields the defaults the subtree form yields
    assert!(explicit.is_empty());
    assert_eq!(report_all.texts("/interfaces/interface/mtu"), vec!["1500"]);
    assert_eq!(report_all.texts("/interfaces/interface/status"), vec!["up"]);
    assert!(report_all.texts("/interfaces/interface/name").is_empty());
    assert_eq!(leaf.texts("/interfaces/interface/mtu"), vec!["1500"]);
    assert!(leaf.texts("/interfaces/interface/status").is_empty());
}

#[test]
fn test_report_all_xpath_on_existing_entry_adds_nothing_extra() {
    let mut agent = agent();
    let ctx = open(&mut agent);

    let tree = read(&agent, &ctx, &xpath("/interfaces/interface[name='eth1']"), "report-all");

    assert_eq!(interfaces(&tree), vec![vec!["name=eth1", "mtu=1500", "status=up"]]);
}

#[test]
fn test_unknown_mode_is_not_supported() {
    let err = "report-all-tagged".parse::<WithDefaults>().unwrap_err();
    assert_eq!(err.tag(), netconf_core::ErrorTag::OperationNotSupported);
}
