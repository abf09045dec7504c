//! Seed loader
//!
//! Turns a validated seed into the schema registry and the running store.
//! Data paths are checked against the built schema; mounts become remote
//! adapters over loopback endpoints.

use std::collections::BTreeMap;
use std::path::Path;

use netconf_core::adapter::LoopbackEndpoint;
use netconf_core::model::{Module, NodeKind};
use netconf_core::ops::NetconfAgent;
use netconf_core::{DataPath, LocalStore, RemoteAdapter, SchemaNode, SchemaRegistry, SessionManager};

use crate::errors::{seed_validation, Result};
use crate::seed::format_v0::{SeedNode, SeedNodeKind, SeedV0};
use crate::seed::parser::{parse_seed_file, parse_seed_str};

/// Everything a seed describes
#[derive(Debug)]
pub struct Seeded {
    pub schema: SchemaRegistry,
    pub store: LocalStore,
}

impl Seeded {
    /// An agent serving this seed with room for `max_sessions` sessions
    pub fn into_agent(self, max_sessions: usize) -> NetconfAgent {
        NetconfAgent::new(self.schema, self.store, SessionManager::new(max_sessions))
    }
}

/// Parse, validate and load a seed file
pub fn load_seed_file(path: &Path) -> Result<Seeded> {
    let seed = parse_seed_file(path)?;
    load_seed(&seed, &path.display().to_string())
}

pub fn load_seed_str(content: &str) -> Result<Seeded> {
    let seed = parse_seed_str(content)?;
    load_seed(&seed, "<seed>")
}

/// Build the schema and store of an already parsed seed
pub fn load_seed(seed: &SeedV0, origin: &str) -> Result<Seeded> {
    let schema = build_schema(seed)?;

    let mut store = LocalStore::from_pairs(checked_data(&schema, &DataPath::root(), &seed.data, origin)?);
    for mount in &seed.mounts {
        let at = DataPath::parse(&mount.path)?;
        if schema.resolve(&at).is_none() {
            return Err(seed_validation(
                origin,
                format!("mount '{}' does not resolve against the schema", mount.path),
            ));
        }
        let remote_store = LocalStore::from_pairs(checked_data(&schema, &at, &mount.data, origin)?);
        let mut remote = RemoteAdapter::new(Box::new(LoopbackEndpoint::new(remote_store)));
        if mount.read_only {
            remote = remote.read_only();
        }
        store.mount(at, Box::new(remote))?;
    }

    tracing::info!(
        component = "seed",
        origin,
        modules = seed.modules.len(),
        values = seed.data.len(),
        mounts = seed.mounts.len(),
        "seed loaded"
    );
    Ok(Seeded { schema, store })
}

/// Build the schema registry a seed declares
///
/// # Errors
/// * `SchemaDefinition` - unknown module references, lists without proper
///   keys, duplicate siblings, bad patterns or ranges
pub fn build_schema(seed: &SeedV0) -> Result<SchemaRegistry> {
    let mut builder = SchemaRegistry::builder();
    for m in &seed.modules {
        builder = builder.module(Module::new(&m.name, &m.prefix, &m.namespace));
    }
    if let Some(default) = &seed.default_module {
        builder = builder.default_module(default);
    }
    if let Some(ns) = &seed.default_namespace {
        builder = builder.namespace_alias(ns);
    }
    for f in &seed.features {
        builder = builder.feature(f);
    }
    for node in &seed.schema {
        builder = builder.root(schema_node(node));
    }
    builder.build()
}

fn schema_node(seed: &SeedNode) -> SchemaNode {
    let mut node = match seed.kind {
        SeedNodeKind::Container => SchemaNode::container(&seed.name),
        SeedNodeKind::List => SchemaNode::list(&seed.name, seed.keys.iter()),
        SeedNodeKind::Leaf => SchemaNode::leaf(&seed.name),
        SeedNodeKind::LeafList => SchemaNode::leaf_list(&seed.name),
    };
    if let Some(m) = &seed.module {
        node = node.in_module(m);
    }
    if let Some(d) = &seed.default {
        node = node.with_default(d);
    }
    if let Some(p) = &seed.pattern {
        node = node.with_pattern(p);
    }
    if let Some(r) = &seed.range {
        node = node.with_range(r);
    }
    for (name, value) in &seed.values {
        node = node.with_value(name, value);
    }
    if !seed.config {
        node = node.state();
    }
    if seed.read_only {
        node = node.read_only();
    }
    if seed.hidden {
        node = node.hidden();
    }
    for f in &seed.if_feature {
        node = node.with_if_feature(f);
    }
    if let Some(w) = &seed.when {
        node = node.with_when(w);
    }
    for m in &seed.must {
        node = node.with_must(m);
    }
    for c in &seed.children {
        node = node.child(schema_node(c));
    }
    node
}

/// Data pairs under `base`, each required to address a leaf or a leaf-list entry
fn checked_data(
    schema: &SchemaRegistry,
    base: &DataPath,
    data: &BTreeMap<String, String>,
    origin: &str,
) -> Result<Vec<(DataPath, String)>> {
    let mut out = Vec::with_capacity(data.len());
    for (text, value) in data {
        let path = DataPath::parse(text)?;
        let full = base.join(&path);
        let valid = schema.resolve(&full).is_some_and(|r| match r.node.kind() {
            NodeKind::Leaf => true,
            NodeKind::LeafList => r.entry,
            _ => false,
        });
        if !valid {
            return Err(seed_validation(
                origin,
                format!("data path '{}' does not address a leaf", full),
            ));
        }
        out.push((path, value.clone()));
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use netconf_core::{NetconfError, PathAdapter};

    const SEED: &str = r#"
schema_version: 0
modules:
  - name: testing
    prefix: test
    namespace: urn:test
schema:
  - name: test
    kind: container
    children:
      - name: animal
        kind: list
        keys: [name]
        children:
          - name: name
            kind: leaf
          - name: toy
            kind: leaf-list
data:
  /test/animal/cat/name: cat
  /test/animal/cat/toy/ball: ball
mounts:
  - path: /test/animal/dog
    read-only: true
    data:
      /name: dog
"#;

    #[test]
    fn test_load_builds_store_and_mounts() {
        let seeded = load_seed_str(SEED).unwrap();
        let store = &seeded.store;
        let p = |s: &str| DataPath::parse(s).unwrap();

        assert_eq!(store.get(&p("/test/animal/cat/name")).unwrap().as_deref(), Some("cat"));
        assert_eq!(store.get(&p("/test/animal/dog/name")).unwrap().as_deref(), Some("dog"));
        assert!(store.resolve_proxy(&p("/test/animal/dog/name")).is_some_and(|a| a.is_read_only()));
    }

    #[test]
    fn test_rejects_data_outside_schema() {
        for bad in ["/test/animal/cat/colour", "/test/animal/cat", "/test/animal/cat/toy"] {
            let yaml = SEED.replace("/test/animal/cat/name", bad);
            let err = load_seed_str(&yaml).unwrap_err();
            assert!(matches!(err, NetconfError::Config { .. }), "{}", bad);
        }
    }

    #[test]
    fn test_rejects_list_without_keys() {
        let yaml = SEED.replace("keys: [name]", "keys: []");
        let err = load_seed_str(&yaml).unwrap_err();
        assert!(matches!(err, NetconfError::SchemaDefinition { .. }));
    }
}
