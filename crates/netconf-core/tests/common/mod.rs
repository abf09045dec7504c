#![allow(dead_code)]

use netconf_core::model::Module;
use netconf_core::ops::{self, NetconfAgent};
use netconf_core::subtree::parse_filter;
use netconf_core::types::RequestContext;
use netconf_core::xml::{parse_document, XmlElement, NETCONF_BASE_NS};
use netconf_core::{
    DataPath, Filter, LocalStore, Peer, ResultTree, SchemaNode, SchemaRegistry, SessionManager,
    WithDefaults,
};

pub const TESTING_NS: &str = "http://test.com/ns/yang/testing";
pub const TESTING_2_NS: &str = "http://test.com/ns/yang/testing-2";
pub const AUGMENTED_2_NS: &str = "http://test.com/ns/yang/testing2-augmented";
pub const INTERFACES_NS: &str = "http://example.com/ns/interfaces";
pub const DEFAULT_ALIAS_NS: &str = "https://github.com/alliedtelesis/apteryx";

pub const FILE_PATTERN: &str = r"(flash|usb|card):/?[A-Za-z0-9_.\-]{1,255}\.cfg";

pub fn p(s: &str) -> DataPath {
    DataPath::parse(s).unwrap()
}

/// The animals/settings/interfaces model
pub fn schema() -> SchemaRegistry {
    SchemaRegistry::builder()
        .module(Module::new("testing", "test", TESTING_NS))
        .module(Module::new(
            "testing-augmented",
            "aug",
            "http://test.com/ns/yang/testing-augmented",
        ))
        .module(Module::new("testing-2", "t2", TESTING_2_NS))
        .module(Module::new("testing2-augmented", "aug2", AUGMENTED_2_NS))
        .module(Module::new("example-interfaces", "if", INTERFACES_NS))
        .default_module("testing")
        .namespace_alias(DEFAULT_ALIAS_NS)
        .root(
            SchemaNode::container("test")
                .child(
                    SchemaNode::container("settings")
                        .child(
                            SchemaNode::leaf("debug")
                                .with_value("enable", "1")
                                .with_value("disable", "0"),
                        )
                        .child(SchemaNode::leaf("enable"))
                        .child(SchemaNode::leaf("priority").with_range("1..10"))
                        .child(SchemaNode::leaf("hidden").hidden())
                        .child(SchemaNode::leaf("volume").in_module("testing-augmented"))
                        .child(SchemaNode::leaf("empty")),
                )
                .child(
                    SchemaNode::container("state")
                        .state()
                        .child(SchemaNode::leaf("counter"))
                        .child(
                            SchemaNode::container("uptime")
                                .child(SchemaNode::leaf("days"))
                                .child(SchemaNode::leaf("hours"))
                                .child(SchemaNode::leaf("minutes"))
                                .child(SchemaNode::leaf("seconds")),
                        ),
                )
                .child(
                    SchemaNode::container("animals").child(
                        SchemaNode::list("animal", ["name"])
                            .child(SchemaNode::leaf("name"))
                            .child(
                                SchemaNode::leaf("type")
                                    .with_value("big", "1")
                                    .with_value("little", "2"),
                            )
                            .child(SchemaNode::leaf("colour"))
                            .child(
                                SchemaNode::list("food", ["name"])
                                    .child(SchemaNode::leaf("name"))
                                    .child(SchemaNode::leaf("type")),
                            )
                            .child(SchemaNode::container("toys").child(SchemaNode::leaf_list("toy"))),
                    ),
                )
                .child(
                    SchemaNode::container("patterns")
                        .child(SchemaNode::leaf("variable_1").with_pattern(FILE_PATTERN)),
                ),
        )
        .root(
            SchemaNode::container("test").in_module("testing-2").child(
                SchemaNode::container("settings")
                    .child(SchemaNode::leaf("priority"))
                    .child(SchemaNode::leaf("speed").in_module("testing2-augmented")),
            ),
        )
        .root(
            SchemaNode::container("interfaces").in_module("example-interfaces").child(
                SchemaNode::list("interface", ["name"])
                    .child(SchemaNode::leaf("name"))
                    .child(SchemaNode::leaf("mtu").with_default("1500"))
                    .child(SchemaNode::leaf("status").with_default("up")),
            ),
        )
        .build()
        .unwrap()
}

pub const SEED: &[(&str, &str)] = &[
    ("/test/settings/debug", "1"),
    ("/test/settings/enable", "true"),
    ("/test/settings/priority", "1"),
    ("/test/settings/hidden", "friend"),
    ("/test/settings/volume", "1"),
    ("/test/state/counter", "42"),
    ("/test/state/uptime/days", "5"),
    ("/test/state/uptime/hours", "50"),
    ("/test/state/uptime/minutes", "30"),
    ("/test/state/uptime/seconds", "20"),
    ("/test/animals/animal/cat/name", "cat"),
    ("/test/animals/animal/cat/type", "1"),
    ("/test/animals/animal/dog/name", "dog"),
    ("/test/animals/animal/dog/colour", "brown"),
    ("/test/animals/animal/mouse/name", "mouse"),
    ("/test/animals/animal/mouse/type", "2"),
    ("/test/animals/animal/mouse/colour", "grey"),
    ("/test/animals/animal/hamster/name", "hamster"),
    ("/test/animals/animal/hamster/type", "2"),
    ("/test/animals/animal/hamster/food/banana/name", "banana"),
    ("/test/animals/animal/hamster/food/banana/type", "fruit"),
    ("/test/animals/animal/hamster/food/nuts/name", "nuts"),
    ("/test/animals/animal/hamster/food/nuts/type", "kibble"),
    ("/test/animals/animal/parrot/name", "parrot"),
    ("/test/animals/animal/parrot/type", "1"),
    ("/test/animals/animal/parrot/colour", "blue"),
    ("/test/animals/animal/parrot/toys/toy/rings", "rings"),
    ("/test/animals/animal/parrot/toys/toy/puzzles", "puzzles"),
    ("/t2:test/settings/priority", "2"),
    ("/t2:test/settings/speed", "2"),
    ("/interfaces/interface/eth0/name", "eth0"),
    ("/interfaces/interface/eth0/mtu", "8192"),
    ("/interfaces/interface/eth0/status", "up"),
    ("/interfaces/interface/eth1/name", "eth1"),
    ("/interfaces/interface/eth1/status", "up"),
    ("/interfaces/interface/eth2/name", "eth2"),
    ("/interfaces/interface/eth2/mtu", "9000"),
    ("/interfaces/interface/eth2/status", "not feeling so good"),
    ("/interfaces/interface/eth3/name", "eth3"),
    ("/interfaces/interface/eth3/mtu", "1500"),
    ("/interfaces/interface/eth3/status", "waking up"),
];

pub fn store() -> LocalStore {
    LocalStore::from_pairs(SEED.iter().map(|(path, value)| (p(path), *value)))
}

pub fn agent() -> NetconfAgent {
    NetconfAgent::new(schema(), store(), SessionManager::new(4))
}

/// Open a session as `manager` and return its request context
pub fn open(agent: &mut NetconfAgent) -> RequestContext {
    let id = agent
        .sessions_mut()
        .open(Peer::new("manager").with_remote("127.0.0.1", 830))
        .unwrap();
    RequestContext::new(id)
}

/// Wrap `body` in a `<config>` element with the base namespace as default
/// and `xc` bound to it
pub fn config(body: &str) -> XmlElement {
    parse_document(&format!(
        r#"<config xmlns:xc="{ns}" xmlns="{ns}">{body}</config>"#,
        ns = NETCONF_BASE_NS,
        body = body
    ))
    .unwrap()
}

pub fn subtree(select: &str) -> Filter {
    let filter = parse_document(&format!(
        r#"<filter xmlns="{}" type="subtree">{}</filter>"#,
        NETCONF_BASE_NS, select
    ))
    .unwrap();
    Filter::Subtree(parse_filter(&filter).unwrap())
}

pub fn xpath(select: &str) -> Filter {
    Filter::XPath {
        select: select.to_string(),
        namespaces: Vec::new(),
    }
}

/// `<get>` with explicit defaults
pub fn get(agent: &NetconfAgent, ctx: &RequestContext, filter: &Filter) -> ResultTree {
    ops::get(agent, ctx, filter, WithDefaults::Explicit).unwrap()
}

/// Stored value at `path`, bypassing the view
pub fn stored(agent: &NetconfAgent, path: &str) -> Option<String> {
    use netconf_core::PathAdapter;
    agent.store().get(&p(path)).unwrap()
}
