#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use common::{agent, get, open, subtree, INTERFACES_NS, TESTING_2_NS, TESTING_NS};
use netconf_core::subtree::parse_filter;
use netconf_core::xml::{parse_document, XmlWriter};
use netconf_core::{ops, Datastore, ErrorTag, Filter, NetconfError, WithDefaults};

fn child_names(tree: &netconf_core::ResultTree, at: &str) -> Vec<String> {
    tree.select(at)
        .into_iter()
        .flat_map(|n| n.children.iter().map(|c| c.name.clone()))
        .collect()
}

// ===== WHOLE TREE =====

#[test]
fn test_get_without_filter_returns_config_and_state() {
    // GIVEN the seeded agent
    let mut agent = agent();
    let ctx = open(&mut agent);

    // WHEN reading with no filter
    let tree = get(&agent, &ctx, &Filter::None);

    // THEN enum leaves are translated and state is included
    assert_eq!(tree.texts("/test/settings/debug"), vec!["enable"]);
    assert_eq!(tree.texts("/test/state/counter"), vec!["42"]);
    assert_eq!(tree.texts("/test/state/uptime/hours"), vec!["50"]);
    assert_eq!(tree.select("/interfaces/interface").len(), 4);
    // Hidden leaves are never reported
    assert!(tree.select("/test/settings/hidden").is_empty());
}

#[test]
fn test_get_config_without_filter_omits_state() {
    let mut agent = agent();
    let ctx = open(&mut agent);

    let tree = ops::get_config(
        &agent,
        &ctx,
        Datastore::Running,
        &Filter::None,
        WithDefaults::Explicit,
    )
    .unwrap();

    assert!(tree.select("/test/state").is_empty());
    assert_eq!(tree.texts("/test/settings/priority"), vec!["1", "2"]);
}

#[test]
fn test_empty_filter_selects_nothing() {
    let mut agent = agent();
    let ctx = open(&mut agent);

    let tree = get(&agent, &ctx, &Filter::Subtree(Vec::new()));

    assert!(tree.is_empty());
    assert_eq!(
        XmlWriter::compact().write(&tree.to_data_element()),
        r#"<data xmlns="urn:ietf:params:xml:ns:netconf:base:1.0"/>"#
    );
}

// ===== NAMESPACES =====

#[test]
fn test_single_node_in_explicit_namespace() {
    let mut agent = agent();
    let ctx = open(&mut agent);

    let filter = subtree(&format!(
        r#"<test xmlns="{}"><settings><debug/></settings></test>"#,
        TESTING_NS
    ));
    let tree = get(&agent, &ctx, &filter);

    assert_eq!(tree.leaves().len(), 1);
    assert_eq!(
        XmlWriter::compact().write(&tree.to_data_element()),
        format!(
            r#"<data xmlns="urn:ietf:params:xml:ns:netconf:base:1.0"><test xmlns="{}"><settings><debug>enable</debug></settings></test></data>"#,
            TESTING_NS
        )
    );
}

#[test]
fn test_unqualified_top_level_prefers_default_module() {
    let mut agent = agent();
    let ctx = open(&mut agent);

    let tree = get(&agent, &ctx, &subtree("<test><settings><priority/></settings></test>"));

    assert_eq!(tree.roots().len(), 1);
    assert_eq!(tree.roots()[0].namespace, TESTING_NS);
    assert_eq!(tree.texts("/test/settings/priority"), vec!["1"]);
}

#[test]
fn test_unqualified_augmented_leaf_matches_by_name() {
    let mut agent = agent();
    let ctx = open(&mut agent);

    let tree = get(&agent, &ctx, &subtree("<test><settings><volume/></settings></test>"));

    assert_eq!(tree.texts("/test/settings/volume"), vec!["1"]);
}

#[test]
fn test_default_namespace_alias_counts_as_unqualified() {
    let mut agent = agent();
    let ctx = open(&mut agent);

    let filter = subtree(
        r#"<test xmlns="https://github.com/alliedtelesis/apteryx"><settings><priority/><volume/></settings></test>"#,
    );
    let tree = get(&agent, &ctx, &filter);

    assert_eq!(tree.texts("/test/settings/priority"), vec!["1"]);
    assert_eq!(tree.texts("/test/settings/volume"), vec!["1"]);
}

#[test]
fn test_other_module_by_default_namespace() {
    let mut agent = agent();
    let ctx = open(&mut agent);

    let filter = subtree(&format!(
        r#"<test xmlns="{}"><settings><priority/></settings></test>"#,
        TESTING_2_NS
    ));
    let tree = get(&agent, &ctx, &filter);

    assert_eq!(tree.roots().len(), 1);
    assert_eq!(tree.roots()[0].namespace, TESTING_2_NS);
    assert_eq!(tree.texts("/test/settings/priority"), vec!["2"]);
}

#[test]
fn test_augmenting_module_inside_other_module() {
    let mut agent = agent();
    let ctx = open(&mut agent);

    let filter = subtree(&format!(
        r#"<test xmlns="{}"><settings><speed xmlns="http://test.com/ns/yang/testing2-augmented"/></settings></test>"#,
        TESTING_2_NS
    ));
    let tree = get(&agent, &ctx, &filter);

    assert_eq!(tree.texts("/test/settings/speed"), vec!["2"]);
}

#[test]
fn test_prefixed_elements() {
    let mut agent = agent();
    let ctx = open(&mut agent);

    let filter = subtree(
        r#"<t2:test xmlns:t2="http://test.com/ns/yang/testing-2" xmlns:aug2="http://test.com/ns/yang/testing2-augmented"><t2:settings><t2:priority/><aug2:speed/></t2:settings></t2:test>"#,
    );
    let tree = get(&agent, &ctx, &filter);

    assert_eq!(tree.texts("/test/settings/priority"), vec!["2"]);
    assert_eq!(tree.texts("/test/settings/speed"), vec!["2"]);
}

#[test]
fn test_wrong_child_namespace_matches_nothing() {
    let mut agent = agent();
    let ctx = open(&mut agent);

    let filter = subtree(&format!(
        r#"<test><settings><priority xmlns="{}"/></settings></test>"#,
        INTERFACES_NS
    ));
    let tree = get(&agent, &ctx, &filter);

    assert!(tree.is_empty());
}

// ===== CONTAINERS =====

#[test]
fn test_trunk_returns_whole_container() {
    let mut agent = agent();
    let ctx = open(&mut agent);

    let tree = get(&agent, &ctx, &subtree("<test><settings/></test>"));

    assert_eq!(
        child_names(&tree, "/test/settings"),
        vec!["debug", "enable", "priority", "volume"]
    );
}

#[test]
fn test_multiple_selection_nodes() {
    let mut agent = agent();
    let ctx = open(&mut agent);

    let tree = get(
        &agent,
        &ctx,
        &subtree("<test><settings><debug/><priority/></settings></test>"),
    );

    assert_eq!(child_names(&tree, "/test/settings"), vec!["debug", "priority"]);
}

#[test]
fn test_multiple_top_level_filters_coalesce_shared_ancestors() {
    // GIVEN two top-level filter elements naming the same container
    let mut agent = agent();
    let ctx = open(&mut agent);
    let filter = subtree(
        "<test><settings><debug/></settings></test><test><settings><enable/></settings></test>",
    );

    // WHEN the filter is applied
    let tree = get(&agent, &ctx, &filter);

    // THEN one test element holds both matches
    assert_eq!(tree.roots().len(), 1);
    assert_eq!(tree.select("/test/settings").len(), 1);
    assert_eq!(child_names(&tree, "/test/settings"), vec!["debug", "enable"]);
    assert_eq!(tree.texts("/test/settings/debug"), vec!["enable"]);
    assert_eq!(tree.texts("/test/settings/enable"), vec!["true"]);
}

#[test]
fn test_container_content_match_accepts_display_or_stored_value() {
    let mut agent = agent();
    let ctx = open(&mut agent);

    for value in ["enable", "1"] {
        let filter = subtree(&format!(
            "<test><settings><debug>{}</debug><priority/></settings></test>",
            value
        ));
        let tree = get(&agent, &ctx, &filter);
        assert_eq!(tree.texts("/test/settings/debug"), vec!["enable"], "{}", value);
        assert_eq!(tree.texts("/test/settings/priority"), vec!["1"], "{}", value);
    }

    let tree = get(
        &agent,
        &ctx,
        &subtree("<test><settings><debug>disable</debug><priority/></settings></test>"),
    );
    assert!(tree.is_empty());
}

#[test]
fn test_hidden_leaf_is_not_readable() {
    let mut agent = agent();
    let ctx = open(&mut agent);

    let result = ops::get(
        &agent,
        &ctx,
        &subtree("<test><settings><hidden/></settings></test>"),
        WithDefaults::Explicit,
    );

    let err = result.unwrap_err();
    assert!(matches!(err, NetconfError::NotReadable { .. }));
    assert_eq!(err.tag(), ErrorTag::OperationNotSupported);
}

#[test]
fn test_operation_attribute_in_filter_is_rejected() {
    let filter = parse_document(
        r#"<filter xmlns="urn:ietf:params:xml:ns:netconf:base:1.0" type="subtree"><test><settings operation="delete"/></test></filter>"#,
    )
    .unwrap();

    let result = parse_filter(&filter);

    assert!(matches!(result, Err(NetconfError::BadAttribute { .. })));
}

// ===== LISTS =====

#[test]
fn test_list_container_returns_every_entry() {
    let mut agent = agent();
    let ctx = open(&mut agent);

    let tree = get(&agent, &ctx, &subtree("<test><animals/></test>"));

    assert_eq!(
        tree.texts("/test/animals/animal/name"),
        vec!["cat", "dog", "hamster", "mouse", "parrot"]
    );
    assert_eq!(tree.texts("/test/animals/animal/type"), vec!["big", "little", "little", "big"]);
    assert_eq!(tree.texts("/test/animals/animal/food/type"), vec!["fruit", "kibble"]);
}

#[test]
fn test_list_element_selection_matches_container() {
    let mut agent = agent();
    let ctx = open(&mut agent);

    let whole = get(&agent, &ctx, &subtree("<test><animals/></test>"));
    let entries = get(&agent, &ctx, &subtree("<test><animals><animal/></animals></test>"));

    assert_eq!(whole, entries);
}

#[test]
fn test_list_parameter_selection() {
    let mut agent = agent();
    let ctx = open(&mut agent);

    let tree = get(
        &agent,
        &ctx,
        &subtree("<test><animals><animal><name/></animal></animals></test>"),
    );

    assert_eq!(tree.leaves().len(), 5);
    assert_eq!(child_names(&tree, "/test/animals/animal"), vec!["name"; 5]);
}

#[test]
fn test_key_match_alone_returns_whole_entry() {
    let mut agent = agent();
    let ctx = open(&mut agent);

    let tree = get(
        &agent,
        &ctx,
        &subtree("<test><animals><animal><name>cat</name></animal></animals></test>"),
    );

    assert_eq!(tree.select("/test/animals/animal").len(), 1);
    assert_eq!(tree.texts("/test/animals/animal/name"), vec!["cat"]);
    assert_eq!(tree.texts("/test/animals/animal/type"), vec!["big"]);
}

#[test]
fn test_key_match_with_selection() {
    let mut agent = agent();
    let ctx = open(&mut agent);

    let tree = get(
        &agent,
        &ctx,
        &subtree("<test><animals><animal><name>mouse</name><type/></animal></animals></test>"),
    );

    assert_eq!(child_names(&tree, "/test/animals/animal"), vec!["name", "type"]);
    assert_eq!(tree.texts("/test/animals/animal/type"), vec!["little"]);
}

#[test]
fn test_key_given_as_attribute() {
    let mut agent = agent();
    let ctx = open(&mut agent);

    let only = get(&agent, &ctx, &subtree(r#"<test><animals><animal name="cat"/></animals></test>"#));
    assert_eq!(only.texts("/test/animals/animal/name"), vec!["cat"]);
    assert_eq!(only.texts("/test/animals/animal/type"), vec!["big"]);

    let with_type = get(
        &agent,
        &ctx,
        &subtree(r#"<test><animals><animal name="mouse"><type/></animal></animals></test>"#),
    );
    assert_eq!(with_type.texts("/test/animals/animal/name"), vec!["mouse"]);
    assert_eq!(child_names(&with_type, "/test/animals/animal"), vec!["name", "type"]);
}

#[test]
fn test_several_entries_by_key() {
    let mut agent = agent();
    let ctx = open(&mut agent);

    let filter = subtree(
        "<test><animals>\
         <animal><name>cat</name></animal>\
         <animal><name>mouse</name></animal>\
         </animals></test>",
    );
    let tree = get(&agent, &ctx, &filter);

    assert_eq!(tree.texts("/test/animals/animal/name"), vec!["cat", "mouse"]);
    assert_eq!(tree.texts("/test/animals/animal/colour"), vec!["grey"]);
}

#[test]
fn test_non_key_selection_omits_keys_and_empty_entries() {
    let mut agent = agent();
    let ctx = open(&mut agent);

    let tree = get(
        &agent,
        &ctx,
        &subtree("<test><animals><animal><type/></animal></animals></test>"),
    );

    // dog has no type and produces nothing
    assert_eq!(tree.select("/test/animals/animal").len(), 4);
    assert!(tree.texts("/test/animals/animal/name").is_empty());
    assert_eq!(tree.texts("/test/animals/animal/type"), vec!["big", "little", "little", "big"]);
}

#[test]
fn test_non_key_value_does_not_filter_entries() {
    let mut agent = agent();
    let ctx = open(&mut agent);

    let plain = get(
        &agent,
        &ctx,
        &subtree("<test><animals><animal><type/></animal></animals></test>"),
    );
    let valued = get(
        &agent,
        &ctx,
        &subtree("<test><animals><animal><type>little</type></animal></animals></test>"),
    );

    assert_eq!(plain, valued);
}

#[test]
fn test_key_selection_with_non_key_value() {
    let mut agent = agent();
    let ctx = open(&mut agent);

    let tree = get(
        &agent,
        &ctx,
        &subtree("<test><animals><animal><name/><type>little</type></animal></animals></test>"),
    );

    assert_eq!(
        tree.texts("/test/animals/animal/name"),
        vec!["cat", "dog", "hamster", "mouse", "parrot"]
    );
    assert_eq!(tree.texts("/test/animals/animal/type"), vec!["big", "little", "little", "big"]);
}

#[test]
fn test_key_value_with_non_key_value() {
    let mut agent = agent();
    let ctx = open(&mut agent);

    let tree = get(
        &agent,
        &ctx,
        &subtree("<test><animals><animal><name>mouse</name><type>little</type></animal></animals></test>"),
    );

    assert_eq!(tree.texts("/test/animals/animal/name"), vec!["mouse"]);
    assert_eq!(child_names(&tree, "/test/animals/animal"), vec!["name", "type"]);
}

#[test]
fn test_missing_entry_yields_empty_data() {
    let mut agent = agent();
    let ctx = open(&mut agent);

    let tree = get(
        &agent,
        &ctx,
        &subtree("<test><animals><animal><name>elephant</name></animal></animals></test>"),
    );

    assert!(tree.is_empty());
}

#[test]
fn test_nested_list_and_leaf_list() {
    let mut agent = agent();
    let ctx = open(&mut agent);

    let tree = get(
        &agent,
        &ctx,
        &subtree("<test><animals><animal><name>parrot</name><toys/></animal></animals></test>"),
    );
    assert_eq!(tree.texts("/test/animals/animal/toys/toy"), vec!["puzzles", "rings"]);

    let tree = get(
        &agent,
        &ctx,
        &subtree(
            "<test><animals><animal><name>parrot</name><toys><toy>rings</toy></toys></animal></animals></test>",
        ),
    );
    assert_eq!(tree.texts("/test/animals/animal/toys/toy"), vec!["rings"]);

    let tree = get(
        &agent,
        &ctx,
        &subtree(
            "<test><animals><animal><name>hamster</name><food><name>nuts</name></food></animal></animals></test>",
        ),
    );
    assert_eq!(tree.texts("/test/animals/animal/food/type"), vec!["kibble"]);
}
