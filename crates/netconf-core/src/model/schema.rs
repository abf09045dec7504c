//! Schema registry
//!
//! Read-only description of the data model: modules and namespaces, node
//! kinds, list keys, defaults, value constraints, feature gates and
//! when/must expressions. Every read and write consults it to map between
//! XML element names and store paths.
//!
//! Nodes are declared with a small builder and frozen by
//! `SchemaRegistryBuilder::build`, which resolves module namespaces,
//! propagates inherited flags (config, read-only, hidden, if-feature) and
//! compiles patterns and ranges.

use crate::errors::{NetconfError, Result};
use crate::model::path::DataPath;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};

/// YANG node kinds that appear in the store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NodeKind {
    Container,
    List,
    Leaf,
    LeafList,
}

impl NodeKind {
    /// Lists and leaf-lists hold instances addressed by an entry segment
    pub fn has_entries(self) -> bool {
        matches!(self, NodeKind::List | NodeKind::LeafList)
    }

    /// Leaves and leaf-lists carry values
    pub fn is_value(self) -> bool {
        matches!(self, NodeKind::Leaf | NodeKind::LeafList)
    }
}

/// A YANG module: name, XML prefix and namespace URI
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Module {
    pub name: String,
    pub prefix: String,
    pub namespace: String,
}

impl Module {
    pub fn new(
        name: impl Into<String>,
        prefix: impl Into<String>,
        namespace: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            prefix: prefix.into(),
            namespace: namespace.into(),
        }
    }
}

/// Inclusive integer interval from a YANG `range` statement
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Interval {
    pub min: i64,
    pub max: i64,
}

/// One schema node and its children
#[derive(Debug, Clone)]
pub struct SchemaNode {
    name: String,
    kind: NodeKind,
    declared_module: Option<String>,
    module: String,
    namespace: String,
    keys: Vec<String>,
    default: Option<String>,
    pattern_source: Option<String>,
    pattern: Option<Regex>,
    range_source: Option<String>,
    ranges: Vec<Interval>,
    values: Vec<(String, String)>,
    config: bool,
    read_only: bool,
    hidden: bool,
    if_features: Vec<String>,
    when: Option<String>,
    must: Vec<String>,
    children: Vec<SchemaNode>,
}

impl SchemaNode {
    fn new(name: impl Into<String>, kind: NodeKind) -> Self {
        Self {
            name: name.into(),
            kind,
            declared_module: None,
            module: String::new(),
            namespace: String::new(),
            keys: Vec::new(),
            default: None,
            pattern_source: None,
            pattern: None,
            range_source: None,
            ranges: Vec::new(),
            values: Vec::new(),
            config: true,
            read_only: false,
            hidden: false,
            if_features: Vec::new(),
            when: None,
            must: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn container(name: impl Into<String>) -> Self {
        Self::new(name, NodeKind::Container)
    }

    /// A list keyed by the named child leaves, in key order
    pub fn list<I, S>(name: impl Into<String>, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut node = Self::new(name, NodeKind::List);
        node.keys = keys.into_iter().map(Into::into).collect();
        node
    }

    pub fn leaf(name: impl Into<String>) -> Self {
        Self::new(name, NodeKind::Leaf)
    }

    pub fn leaf_list(name: impl Into<String>) -> Self {
        Self::new(name, NodeKind::LeafList)
    }

    // ----- declaration builder -----

    /// Place this node (and children that don't override it) in `module`
    pub fn in_module(mut self, module: impl Into<String>) -> Self {
        self.declared_module = Some(module.into());
        self
    }

    pub fn child(mut self, child: SchemaNode) -> Self {
        self.children.push(child);
        self
    }

    pub fn with_default(mut self, value: impl Into<String>) -> Self {
        self.default = Some(value.into());
        self
    }

    /// YANG `pattern` (implicitly anchored)
    pub fn with_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern_source = Some(pattern.into());
        self
    }

    /// YANG `range`, e.g. `"1..10 | 20..30"`
    pub fn with_range(mut self, range: impl Into<String>) -> Self {
        self.range_source = Some(range.into());
        self
    }

    /// Enumerated value translation: display `name` is stored as `value`
    pub fn with_value(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.push((name.into(), value.into()));
        self
    }

    /// `config false`: operational state, excluded from get-config and edits
    pub fn state(mut self) -> Self {
        self.config = false;
        self
    }

    /// Readable but never writable through edit-config
    pub fn read_only(mut self) -> Self {
        self.read_only = true;
        self
    }

    /// Never reported by reads
    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    pub fn with_if_feature(mut self, feature: impl Into<String>) -> Self {
        self.if_features.push(feature.into());
        self
    }

    pub fn with_when(mut self, expr: impl Into<String>) -> Self {
        self.when = Some(expr.into());
        self
    }

    pub fn with_must(mut self, expr: impl Into<String>) -> Self {
        self.must.push(expr.into());
        self
    }

    // ----- accessors -----

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    /// Name of the module this node belongs to
    pub fn module(&self) -> &str {
        &self.module
    }

    /// XML namespace of this node
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    pub fn is_key(&self, child: &str) -> bool {
        self.keys.iter().any(|k| k == child)
    }

    pub fn default_value(&self) -> Option<&str> {
        self.default.as_deref()
    }

    pub fn pattern(&self) -> Option<&str> {
        self.pattern_source.as_deref()
    }

    pub fn ranges(&self) -> &[Interval] {
        &self.ranges
    }

    pub fn is_config(&self) -> bool {
        self.config
    }

    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    pub fn is_hidden(&self) -> bool {
        self.hidden
    }

    /// Effective if-feature set (own and inherited)
    pub fn if_features(&self) -> &[String] {
        &self.if_features
    }

    pub fn when(&self) -> Option<&str> {
        self.when.as_deref()
    }

    pub fn must(&self) -> &[String] {
        &self.must
    }

    pub fn children(&self) -> &[SchemaNode] {
        &self.children
    }

    pub fn find_child(&self, name: &str) -> Option<&SchemaNode> {
        self.children.iter().find(|c| c.name == name)
    }

    /// Position of the named child in schema order
    pub fn child_index(&self, name: &str) -> Option<usize> {
        self.children.iter().position(|c| c.name == name)
    }

    /// Whether a read of this container could synthesize default leaves
    pub fn has_default_descendant(&self) -> bool {
        self.children.iter().any(|c| match c.kind {
            NodeKind::Leaf => c.default.is_some(),
            NodeKind::Container => c.has_default_descendant(),
            _ => false,
        })
    }

    /// Presentation form of a stored value (enum translation)
    pub fn display_value(&self, stored: &str) -> String {
        self.values
            .iter()
            .find(|(_, v)| v == stored)
            .map(|(name, _)| name.clone())
            .unwrap_or_else(|| stored.to_string())
    }

    /// Whether `text` denotes `stored`, in either form
    pub fn value_matches(&self, stored: &str, text: &str) -> bool {
        stored == text || self.display_value(stored) == text
    }

    /// Validate an incoming value and return its stored form
    ///
    /// Accepts either the display name or the stored value of an enumerated
    /// leaf, then applies pattern and range restrictions.
    ///
    /// # Errors
    /// Returns the violation as text; callers attach the path.
    pub fn constraint_check(&self, input: &str) -> std::result::Result<String, String> {
        let stored = if self.values.is_empty() {
            input.to_string()
        } else if let Some((_, v)) = self.values.iter().find(|(n, _)| n == input) {
            v.clone()
        } else if self.values.iter().any(|(_, v)| v == input) {
            input.to_string()
        } else {
            return Err(format!("'{}' is not a permitted value", input));
        };

        if let Some(re) = &self.pattern {
            if stored.is_empty() {
                return Err("empty value not permitted".to_string());
            }
            if !re.is_match(&stored) {
                return Err(format!(
                    "'{}' does not match pattern '{}'",
                    stored,
                    self.pattern_source.as_deref().unwrap_or_default()
                ));
            }
        }

        if !self.ranges.is_empty() {
            let n: i64 = stored
                .trim()
                .parse()
                .map_err(|_| format!("'{}' is not an integer", stored))?;
            if !self.ranges.iter().any(|r| n >= r.min && n <= r.max) {
                return Err(format!(
                    "{} is outside range '{}'",
                    n,
                    self.range_source.as_deref().unwrap_or_default()
                ));
            }
        }

        Ok(stored)
    }

    // ----- build-time resolution -----

    fn finalize(
        &mut self,
        parent: Option<&Inherited>,
        modules: &[Module],
        default_module: &str,
        location: &str,
    ) -> Result<()> {
        let here = format!("{}/{}", location, self.name);
        let module_name = match (&self.declared_module, parent) {
            (Some(m), _) => m.clone(),
            (None, Some(p)) => p.module.clone(),
            (None, None) => default_module.to_string(),
        };
        let module = modules
            .iter()
            .find(|m| m.name == module_name)
            .ok_or_else(|| schema_error(&here, format!("unknown module '{}'", module_name)))?;
        self.module = module.name.clone();
        self.namespace = module.namespace.clone();

        if let Some(p) = parent {
            self.config &= p.config;
            self.read_only |= p.read_only;
            self.hidden |= p.hidden;
            let mut features = p.if_features.clone();
            for f in self.if_features.drain(..) {
                if !features.contains(&f) {
                    features.push(f);
                }
            }
            self.if_features = features;
        }

        if let Some(src) = &self.pattern_source {
            let anchored = format!("^(?:{})$", src);
            self.pattern = Some(
                Regex::new(&anchored)
                    .map_err(|e| schema_error(&here, format!("bad pattern: {}", e)))?,
            );
        }
        if let Some(src) = &self.range_source {
            self.ranges = parse_range(src).map_err(|r| schema_error(&here, r))?;
        }

        if self.kind.is_value() && !self.children.is_empty() {
            return Err(schema_error(&here, "leaf nodes cannot have children"));
        }
        if self.kind == NodeKind::List {
            if self.keys.is_empty() {
                return Err(schema_error(&here, "list has no keys"));
            }
            for key in &self.keys {
                match self.find_child(key) {
                    Some(k) if k.kind == NodeKind::Leaf => {}
                    _ => {
                        return Err(schema_error(
                            &here,
                            format!("key '{}' is not a child leaf", key),
                        ))
                    }
                }
            }
        }

        let mut seen = HashSet::new();
        for c in &self.children {
            if !seen.insert(c.name.as_str()) {
                return Err(schema_error(&here, format!("duplicate child '{}'", c.name)));
            }
        }

        let ctx = Inherited {
            module: self.module.clone(),
            config: self.config,
            read_only: self.read_only,
            hidden: self.hidden,
            if_features: self.if_features.clone(),
        };
        for c in &mut self.children {
            c.finalize(Some(&ctx), modules, default_module, &here)?;
        }
        Ok(())
    }
}

/// Properties a child takes from its parent at build time
struct Inherited {
    module: String,
    config: bool,
    read_only: bool,
    hidden: bool,
    if_features: Vec<String>,
}

fn schema_error(node: &str, reason: impl Into<String>) -> NetconfError {
    NetconfError::SchemaDefinition {
        node: node.to_string(),
        reason: reason.into(),
    }
}

/// Parse `"1..10 | 20 | 30..max"` into intervals
fn parse_range(src: &str) -> std::result::Result<Vec<Interval>, String> {
    fn bound(s: &str, dflt: i64) -> std::result::Result<i64, String> {
        match s.trim() {
            "min" => Ok(i64::MIN),
            "max" => Ok(i64::MAX),
            "" => Ok(dflt),
            n => n
                .parse()
                .map_err(|_| format!("bad range bound '{}'", n)),
        }
    }

    let mut out = Vec::new();
    for part in src.split('|') {
        let part = part.trim();
        if part.is_empty() {
            return Err(format!("empty range part in '{}'", src));
        }
        let interval = match part.split_once("..") {
            Some((lo, hi)) => Interval {
                min: bound(lo, i64::MIN)?,
                max: bound(hi, i64::MAX)?,
            },
            None => {
                let v = bound(part, 0)?;
                Interval { min: v, max: v }
            }
        };
        if interval.min > interval.max {
            return Err(format!("inverted range '{}'", part));
        }
        out.push(interval);
    }
    Ok(out)
}

/// A schema node reached from a data path
#[derive(Debug, Clone, Copy)]
pub struct Resolved<'a> {
    pub node: &'a SchemaNode,
    /// The path names an instance (list entry or leaf-list entry) rather
    /// than the list node itself
    pub entry: bool,
}

impl Resolved<'_> {
    /// Whether the path denotes an element of the XML view
    ///
    /// List and leaf-list nodes themselves are not elements; their entries are.
    pub fn is_element(&self) -> bool {
        self.entry || !self.node.kind().has_entries()
    }
}

/// The frozen schema
#[derive(Debug, Clone)]
pub struct SchemaRegistry {
    modules: Vec<Module>,
    default_module: String,
    namespace_aliases: Vec<String>,
    features: BTreeSet<String>,
    roots: Vec<SchemaNode>,
}

impl SchemaRegistry {
    pub fn builder() -> SchemaRegistryBuilder {
        SchemaRegistryBuilder::default()
    }

    pub fn modules(&self) -> &[Module] {
        &self.modules
    }

    pub fn roots(&self) -> &[SchemaNode] {
        &self.roots
    }

    /// The module unqualified names resolve to
    pub fn default_module(&self) -> &Module {
        // build() guarantees the default module exists
        self.module(&self.default_module)
            .unwrap_or(&self.modules[0])
    }

    pub fn module(&self, name: &str) -> Option<&Module> {
        self.modules.iter().find(|m| m.name == name)
    }

    pub fn module_by_prefix(&self, prefix: &str) -> Option<&Module> {
        self.modules.iter().find(|m| m.prefix == prefix)
    }

    pub fn module_by_namespace(&self, namespace: &str) -> Option<&Module> {
        self.modules.iter().find(|m| m.namespace == namespace)
    }

    /// Namespaces treated as "no namespace": configured aliases of the default
    pub fn is_unqualified_namespace(&self, namespace: &str) -> bool {
        self.namespace_aliases.iter().any(|a| a == namespace)
    }

    pub fn feature_enabled(&self, feature: &str) -> bool {
        self.features.contains(feature)
    }

    /// All if-feature conditions of `node` hold
    pub fn node_enabled(&self, node: &SchemaNode) -> bool {
        node.if_features().iter().all(|f| self.feature_enabled(f))
    }

    /// Store segment for a top-level node
    ///
    /// Only a node shadowed by a default-module root of the same name needs
    /// its module prefix.
    pub fn root_segment(&self, node: &SchemaNode) -> String {
        let shadowed = node.module() != self.default_module
            && self
                .roots
                .iter()
                .any(|r| r.name() == node.name() && r.module() == self.default_module);
        if !shadowed {
            node.name().to_string()
        } else {
            match self.module(node.module()) {
                Some(m) => format!("{}:{}", m.prefix, node.name()),
                None => node.name().to_string(),
            }
        }
    }

    /// Store segment for `node` at `depth` (0 = top level)
    pub fn segment_for(&self, node: &SchemaNode, depth: usize) -> String {
        if depth == 0 {
            self.root_segment(node)
        } else {
            node.name().to_string()
        }
    }

    /// Top-level node addressed by a store segment
    pub fn resolve_root(&self, segment: &str) -> Option<&SchemaNode> {
        match segment.split_once(':') {
            Some((prefix, name)) => {
                let module = self.module_by_prefix(prefix)?;
                self.roots
                    .iter()
                    .find(|r| r.name() == name && r.module() == module.name)
            }
            None => self
                .roots
                .iter()
                .find(|r| r.name() == segment && r.module() == self.default_module)
                .or_else(|| self.roots.iter().find(|r| r.name() == segment)),
        }
    }

    /// Top-level node by name and namespace
    pub fn root_by_namespace(&self, name: &str, namespace: &str) -> Option<&SchemaNode> {
        self.roots
            .iter()
            .find(|r| r.name() == name && r.namespace() == namespace)
    }

    /// Map a store path to its schema node
    ///
    /// Returns `None` if any segment has no schema counterpart.
    pub fn resolve(&self, path: &DataPath) -> Option<Resolved<'_>> {
        let mut segs = path.segments().iter();
        let first = segs.next()?;
        let mut current = Resolved {
            node: self.resolve_root(first)?,
            entry: false,
        };
        for seg in segs {
            current = match current.node.kind() {
                NodeKind::List | NodeKind::LeafList if !current.entry => Resolved {
                    node: current.node,
                    entry: true,
                },
                NodeKind::LeafList | NodeKind::Leaf => return None,
                _ => Resolved {
                    node: current.node.find_child(seg)?,
                    entry: false,
                },
            };
        }
        Some(current)
    }

    /// Look up a node by schema path (`/test/animals/animal/name`, no entry segments)
    pub fn lookup(&self, schema_path: &str) -> Option<&SchemaNode> {
        let mut parts = schema_path.trim_start_matches('/').split('/');
        let mut node = self.resolve_root(parts.next()?)?;
        for part in parts {
            node = node.find_child(part)?;
        }
        Some(node)
    }

    /// Key leaf names of the list at `schema_path`
    pub fn key_leaves(&self, schema_path: &str) -> Option<&[String]> {
        self.lookup(schema_path).map(SchemaNode::keys)
    }

    /// Default of the leaf at `schema_path`
    pub fn default_value(&self, schema_path: &str) -> Option<&str> {
        self.lookup(schema_path).and_then(SchemaNode::default_value)
    }

    /// Schema path of a store path (entry segments removed)
    pub fn schema_path(&self, path: &DataPath) -> String {
        let mut out = String::new();
        let mut pending_entry = false;
        let mut current: Option<&SchemaNode> = None;
        for (i, seg) in path.segments().iter().enumerate() {
            if pending_entry {
                pending_entry = false;
                continue;
            }
            let node = if i == 0 {
                self.resolve_root(seg)
            } else {
                current.and_then(|c| c.find_child(seg))
            };
            out.push('/');
            out.push_str(seg);
            if let Some(n) = node {
                pending_entry = n.kind().has_entries();
            }
            current = node;
        }
        if out.is_empty() {
            out.push('/');
        }
        out
    }
}

/// Collects declarations for a `SchemaRegistry`
#[derive(Debug, Default)]
pub struct SchemaRegistryBuilder {
    modules: Vec<Module>,
    default_module: Option<String>,
    namespace_aliases: Vec<String>,
    features: BTreeSet<String>,
    roots: Vec<SchemaNode>,
}

impl SchemaRegistryBuilder {
    pub fn module(mut self, module: Module) -> Self {
        self.modules.push(module);
        self
    }

    /// Module for unqualified names (defaults to the first module)
    pub fn default_module(mut self, name: impl Into<String>) -> Self {
        self.default_module = Some(name.into());
        self
    }

    /// Extra namespace URI that behaves like "no namespace"
    pub fn namespace_alias(mut self, uri: impl Into<String>) -> Self {
        self.namespace_aliases.push(uri.into());
        self
    }

    pub fn feature(mut self, name: impl Into<String>) -> Self {
        self.features.insert(name.into());
        self
    }

    pub fn root(mut self, node: SchemaNode) -> Self {
        self.roots.push(node);
        self
    }

    /// Resolve and validate all declarations
    ///
    /// # Errors
    /// * `SchemaDefinition` - no modules, duplicate prefixes, unknown module
    ///   references, malformed lists, duplicate siblings, bad patterns or ranges
    pub fn build(self) -> Result<SchemaRegistry> {
        if self.modules.is_empty() {
            return Err(schema_error("/", "no modules declared"));
        }
        let mut prefixes = HashSet::new();
        for m in &self.modules {
            if !prefixes.insert(m.prefix.clone()) {
                return Err(schema_error(
                    "/",
                    format!("duplicate module prefix '{}'", m.prefix),
                ));
            }
        }
        let default_module = self
            .default_module
            .unwrap_or_else(|| self.modules[0].name.clone());
        if !self.modules.iter().any(|m| m.name == default_module) {
            return Err(schema_error(
                "/",
                format!("unknown default module '{}'", default_module),
            ));
        }

        let mut roots = self.roots;
        for r in &mut roots {
            r.finalize(None, &self.modules, &default_module, "")?;
        }
        let mut seen = HashSet::new();
        for r in &roots {
            if !seen.insert((r.namespace().to_string(), r.name().to_string())) {
                return Err(schema_error(
                    &format!("/{}", r.name()),
                    "duplicate top-level node",
                ));
            }
        }

        Ok(SchemaRegistry {
            modules: self.modules,
            default_module,
            namespace_aliases: self.namespace_aliases,
            features: self.features,
            roots,
        })
    }
}
