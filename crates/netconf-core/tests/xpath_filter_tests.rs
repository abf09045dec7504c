#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use common::{agent, get, open, schema, store, xpath, INTERFACES_NS, TESTING_2_NS, TESTING_NS};
use netconf_core::xpath::{self as nc_xpath, Value};
use netconf_core::{ops, DataPath, Datastore, ErrorTag, Filter, NetconfError, TreeView, ViewOptions, WithDefaults};

fn child_names(tree: &netconf_core::ResultTree, at: &str) -> Vec<String> {
    tree.select(at)
        .into_iter()
        .flat_map(|n| n.children.iter().map(|c| c.name.clone()))
        .collect()
}

// ===== SINGLE NODES AND NAMESPACES =====

#[test]
fn test_leaf_with_enum_translation() {
    let mut agent = agent();
    let ctx = open(&mut agent);

    let tree = get(&agent, &ctx, &xpath("/test/settings/debug"));

    assert_eq!(tree.texts("/test/settings/debug"), vec!["enable"]);
    assert_eq!(tree.leaves().len(), 1);
}

#[test]
fn test_unprefixed_top_level_selects_default_module() {
    let mut agent = agent();
    let ctx = open(&mut agent);

    let tree = get(&agent, &ctx, &xpath("/test/settings/priority"));

    assert_eq!(tree.roots().len(), 1);
    assert_eq!(tree.roots()[0].namespace, TESTING_NS);
    assert_eq!(tree.texts("/test/settings/priority"), vec!["1"]);
}

#[test]
fn test_unprefixed_steps_cross_into_augmenting_modules() {
    let mut agent = agent();
    let ctx = open(&mut agent);

    let tree = get(&agent, &ctx, &xpath("/test/settings/volume"));

    assert_eq!(tree.texts("/test/settings/volume"), vec!["1"]);
}

#[test]
fn test_default_module_prefix() {
    let mut agent = agent();
    let ctx = open(&mut agent);

    let tree = get(&agent, &ctx, &xpath("/test:test/settings/priority"));
    assert_eq!(tree.texts("/test/settings/priority"), vec!["1"]);

    let tree = get(&agent, &ctx, &xpath("/test:test/settings/volume"));
    assert_eq!(tree.texts("/test/settings/volume"), vec!["1"]);
}

#[test]
fn test_other_module_prefixes() {
    let mut agent = agent();
    let ctx = open(&mut agent);

    let tree = get(&agent, &ctx, &xpath("/t2:test/t2:settings/t2:priority"));
    assert_eq!(tree.roots()[0].namespace, TESTING_2_NS);
    assert_eq!(tree.texts("/test/settings/priority"), vec!["2"]);

    let tree = get(&agent, &ctx, &xpath("/t2:test/t2:settings/aug2:speed"));
    assert_eq!(tree.texts("/test/settings/speed"), vec!["2"]);
}

#[test]
fn test_request_namespace_declarations_bind_prefixes() {
    let mut agent = agent();
    let ctx = open(&mut agent);

    let filter = Filter::XPath {
        select: "/x:test/x:settings/x:debug".to_string(),
        namespaces: vec![("x".to_string(), TESTING_NS.to_string())],
    };
    let tree = get(&agent, &ctx, &filter);

    assert_eq!(tree.texts("/test/settings/debug"), vec!["enable"]);
}

#[test]
fn test_unbound_prefix_yields_empty_data() {
    let mut agent = agent();
    let ctx = open(&mut agent);

    let tree = get(&agent, &ctx, &xpath("/nope:test/settings"));

    assert!(tree.is_empty());
}

// ===== TRUNKS AND LISTS =====

#[test]
fn test_trunk() {
    let mut agent = agent();
    let ctx = open(&mut agent);

    let tree = get(&agent, &ctx, &xpath("/test/settings"));

    assert_eq!(
        child_names(&tree, "/test/settings"),
        vec!["debug", "enable", "priority", "volume"]
    );
}

#[test]
fn test_list_trunk() {
    let mut agent = agent();
    let ctx = open(&mut agent);

    let tree = get(&agent, &ctx, &xpath("/test/animals"));

    assert_eq!(
        tree.texts("/test/animals/animal/name"),
        vec!["cat", "dog", "hamster", "mouse", "parrot"]
    );
    assert_eq!(tree.texts("/test/animals/animal/toys/toy"), vec!["puzzles", "rings"]);
}

#[test]
fn test_entry_by_key_predicate() {
    let mut agent = agent();
    let ctx = open(&mut agent);

    let tree = get(&agent, &ctx, &xpath("/test/animals/animal[name='cat']"));

    assert_eq!(tree.select("/test/animals/animal").len(), 1);
    assert_eq!(child_names(&tree, "/test/animals/animal"), vec!["name", "type"]);
}

#[test]
fn test_leaf_under_entry_carries_its_key() {
    let mut agent = agent();
    let ctx = open(&mut agent);

    let tree = get(&agent, &ctx, &xpath("/test/animals/animal[name='cat']/type"));

    assert_eq!(tree.texts("/test/animals/animal/name"), vec!["cat"]);
    assert_eq!(tree.texts("/test/animals/animal/type"), vec!["big"]);
}

#[test]
fn test_predicate_compares_display_values() {
    let mut agent = agent();
    let ctx = open(&mut agent);

    let tree = get(&agent, &ctx, &xpath("/test/animals/animal[type='little']/name"));

    assert_eq!(tree.texts("/test/animals/animal/name"), vec!["hamster", "mouse"]);
}

// ===== UNIONS =====

#[test]
fn test_union_returns_one_fragment_per_branch() {
    let mut agent = agent();
    let ctx = open(&mut agent);

    let tree = get(
        &agent,
        &ctx,
        &xpath("/test/animals/animal[name='cat']/type | /test/animals/animal[name='dog']/colour"),
    );

    assert_eq!(tree.roots().len(), 2);
    assert_eq!(tree.texts("/test/animals/animal/type"), vec!["big"]);
    assert_eq!(tree.texts("/test/animals/animal/colour"), vec!["brown"]);
}

#[test]
fn test_union_across_modules() {
    let mut agent = agent();
    let ctx = open(&mut agent);

    let tree = get(
        &agent,
        &ctx,
        &xpath("/test/animals/animal[name='cat']/type | /interfaces/interface[name='eth2']/mtu"),
    );

    assert_eq!(tree.roots().len(), 2);
    assert_eq!(tree.roots()[1].namespace, INTERFACES_NS);
    assert_eq!(tree.texts("/interfaces/interface/name"), vec!["eth2"]);
    assert_eq!(tree.texts("/interfaces/interface/mtu"), vec!["9000"]);
}

// ===== WILDCARDS AND DESCENDANTS =====

#[test]
fn test_star_over_entries() {
    let mut agent = agent();
    let ctx = open(&mut agent);

    let tree = get(&agent, &ctx, &xpath("/test/animals/*/name"));

    assert_eq!(
        tree.texts("/test/animals/animal/name"),
        vec!["cat", "dog", "hamster", "mouse", "parrot"]
    );
    assert_eq!(tree.leaves().len(), 5);
}

#[test]
fn test_star_then_field_reports_keys() {
    let mut agent = agent();
    let ctx = open(&mut agent);

    let tree = get(&agent, &ctx, &xpath("/test/animals/*/colour"));

    assert_eq!(tree.texts("/test/animals/animal/name"), vec!["dog", "mouse", "parrot"]);
    assert_eq!(tree.texts("/test/animals/animal/colour"), vec!["brown", "grey", "blue"]);
}

#[test]
fn test_star_below_entry_is_not_a_list_step() {
    let mut agent = agent();
    let ctx = open(&mut agent);

    // Entries' children are leaves, containers and nested lists, none of
    // which has a `name` child except food entries
    let tree = get(&agent, &ctx, &xpath("/test/animals/animal/*/name"));

    assert_eq!(tree.texts("/test/animals/animal/food/name"), vec!["banana", "nuts"]);
    assert_eq!(tree.texts("/test/animals/animal/name"), vec!["hamster"]);
}

#[test]
fn test_descendant_field() {
    let mut agent = agent();
    let ctx = open(&mut agent);

    let star = get(&agent, &ctx, &xpath("/test/animals/*/colour"));
    let descendant = get(&agent, &ctx, &xpath("/test/animals//colour"));

    assert_eq!(star, descendant);
}

#[test]
fn test_repeated_descendant_steps() {
    let mut agent = agent();
    let ctx = open(&mut agent);

    let tree = get(&agent, &ctx, &xpath("/test/animals//food//type"));

    assert_eq!(tree.texts("/test/animals/animal/name"), vec!["hamster"]);
    assert_eq!(tree.texts("/test/animals/animal/food/name"), vec!["banana", "nuts"]);
    assert_eq!(tree.texts("/test/animals/animal/food/type"), vec!["fruit", "kibble"]);
    assert!(tree.texts("/test/animals/animal/type").is_empty());
}

#[test]
fn test_leaf_list_value_predicate() {
    let mut agent = agent();
    let ctx = open(&mut agent);

    let tree = get(&agent, &ctx, &xpath("//toy[.='rings']"));

    assert_eq!(tree.texts("/test/animals/animal/toys/toy"), vec!["rings"]);
    assert_eq!(tree.texts("/test/animals/animal/name"), vec!["parrot"]);
}

// ===== FUNCTIONS AND VALUES =====

#[test]
fn test_positional_and_string_functions() {
    let mut agent = agent();
    let ctx = open(&mut agent);

    let tree = get(&agent, &ctx, &xpath("/test/animals/animal[position()=2]/colour"));
    assert_eq!(tree.texts("/test/animals/animal/colour"), vec!["brown"]);

    let tree = get(
        &agent,
        &ctx,
        &xpath("/test/animals/animal[starts-with(name, 'h') or contains(name, 'rr')]/name"),
    );
    assert_eq!(tree.texts("/test/animals/animal/name"), vec!["hamster", "parrot"]);

    let tree = get(&agent, &ctx, &xpath("/test/animals/animal[not(type)]/colour"));
    assert_eq!(tree.texts("/test/animals/animal/colour"), vec!["brown"]);
}

#[test]
fn test_non_node_set_expression_yields_empty_data() {
    let mut agent = agent();
    let ctx = open(&mut agent);

    let tree = get(&agent, &ctx, &xpath("count(/test/animals/animal)"));

    assert!(tree.is_empty());
}

#[test]
fn test_evaluate_returns_scalar_values() {
    let (schema, store) = (schema(), store());
    let view = TreeView::new(&schema, &store, ViewOptions::default());
    let root = DataPath::root();

    let count = nc_xpath::evaluate(view, "count(/test/animals/animal)", &root).unwrap();
    assert_eq!(count, Value::Number(5.0));

    let sum = nc_xpath::evaluate(view, "sum(/test/state/uptime/*)", &root).unwrap();
    assert_eq!(sum, Value::Number(105.0));

    let holds = nc_xpath::condition(view, "/test/settings/priority < 5", &root).unwrap();
    assert!(holds);
}

// ===== VIEW RESTRICTIONS AND ERRORS =====

#[test]
fn test_get_config_excludes_state() {
    let mut agent = agent();
    let ctx = open(&mut agent);
    let filter = xpath("/test/state/counter");

    let with_state = get(&agent, &ctx, &filter);
    let config_only = ops::get_config(&agent, &ctx, Datastore::Running, &filter, WithDefaults::Explicit).unwrap();

    assert_eq!(with_state.texts("/test/state/counter"), vec!["42"]);
    assert!(config_only.is_empty());
}

#[test]
fn test_hidden_leaf_is_invisible() {
    let mut agent = agent();
    let ctx = open(&mut agent);

    let tree = get(&agent, &ctx, &xpath("/test/settings/hidden"));

    assert!(tree.is_empty());
}

#[test]
fn test_malformed_expression() {
    let mut agent = agent();
    let ctx = open(&mut agent);

    for bad in ["/test/animals/animal[", "/test/settings/", "//", "count(/test"] {
        let err = ops::get(&agent, &ctx, &xpath(bad), WithDefaults::Explicit).unwrap_err();
        assert!(matches!(err, NetconfError::XPathSyntax { .. }), "{}", bad);
        assert_eq!(err.tag(), ErrorTag::MalformedMessage);
    }
}
