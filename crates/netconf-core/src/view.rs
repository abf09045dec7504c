//! The XML view of the store
//!
//! Readers see the store the way a NETCONF client sees the XML document:
//! elements in schema order, list entries as repeated elements, leaves
//! carrying display values. An element is identified by its `DataPath`;
//! the document root is the empty path. List and leaf-list nodes
//! themselves are not elements, only their entries are.

use crate::adapter::PathAdapter;
use crate::errors::Result;
use crate::model::{unescape_key, DataPath, NodeKind, Resolved, SchemaNode, SchemaRegistry};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ViewOptions {
    /// Exclude state (config false) nodes, as `get-config` does
    pub config_only: bool,
    /// Materialise schema defaults for absent leaves
    pub report_all: bool,
}

#[derive(Clone, Copy)]
pub struct TreeView<'a> {
    schema: &'a SchemaRegistry,
    store: &'a dyn PathAdapter,
    options: ViewOptions,
}

impl<'a> TreeView<'a> {
    pub fn new(schema: &'a SchemaRegistry, store: &'a dyn PathAdapter, options: ViewOptions) -> Self {
        Self {
            schema,
            store,
            options,
        }
    }

    pub fn schema(&self) -> &'a SchemaRegistry {
        self.schema
    }

    pub fn store(&self) -> &'a dyn PathAdapter {
        self.store
    }

    pub fn options(&self) -> ViewOptions {
        self.options
    }

    /// Whether readers may see instances of `node` at all
    pub fn visible(&self, node: &SchemaNode) -> bool {
        !node.is_hidden()
            && self.schema.node_enabled(node)
            && (!self.options.config_only || node.is_config())
    }

    pub fn resolve(&self, path: &DataPath) -> Option<Resolved<'a>> {
        self.schema.resolve(path)
    }

    /// Local name and namespace of an element
    pub fn name(&self, path: &DataPath) -> Option<(&'a str, &'a str)> {
        self.resolve(path).map(|r| (r.node.name(), r.node.namespace()))
    }

    /// Parent element; `None` for the root
    pub fn parent(&self, path: &DataPath) -> Option<DataPath> {
        let parent = path.parent()?;
        match self.resolve(&parent) {
            Some(r) if !r.is_element() => parent.parent(),
            _ => Some(parent),
        }
    }

    pub fn is_value_node(&self, path: &DataPath) -> bool {
        self.resolve(path)
            .is_some_and(|r| r.is_element() && r.node.kind().is_value())
    }

    /// Whether `path` is an element of this view
    ///
    /// # Errors
    /// Propagates store failures.
    pub fn exists(&self, path: &DataPath) -> Result<bool> {
        if path.is_root() {
            return Ok(true);
        }
        let Some(r) = self.resolve(path) else {
            return Ok(false);
        };
        if !r.is_element() || !self.visible(r.node) {
            return Ok(false);
        }
        match r.node.kind() {
            NodeKind::Leaf => Ok(self.stored_value(path)?.is_some()),
            NodeKind::Container => {
                if self.store.exists(path)? {
                    return Ok(true);
                }
                if !(self.options.report_all && r.node.has_default_descendant()) {
                    return Ok(false);
                }
                match self.parent(path) {
                    Some(parent) => self.exists(&parent),
                    None => Ok(false),
                }
            }
            NodeKind::List | NodeKind::LeafList => self.store.exists(path),
        }
    }

    /// Entry elements of the list or leaf-list node at `list_path`
    ///
    /// # Errors
    /// Propagates store failures.
    pub fn entries(&self, list_path: &DataPath) -> Result<Vec<DataPath>> {
        Ok(self
            .store
            .children(list_path)?
            .into_iter()
            .map(|seg| list_path.child(seg))
            .collect())
    }

    /// Child elements in document order
    ///
    /// # Errors
    /// Propagates store failures.
    pub fn children(&self, path: &DataPath) -> Result<Vec<DataPath>> {
        let schema_children: &[SchemaNode] = if path.is_root() {
            self.schema.roots()
        } else {
            match self.resolve(path) {
                Some(r) if r.is_element() && !r.node.kind().is_value() => r.node.children(),
                _ => return Ok(Vec::new()),
            }
        };

        let mut out = Vec::new();
        for node in schema_children {
            if !self.visible(node) {
                continue;
            }
            let child = path.child(self.schema.segment_for(node, path.len()));
            match node.kind() {
                NodeKind::Leaf => {
                    if self.store.get(&child)?.is_some()
                        || (self.options.report_all && node.default_value().is_some())
                    {
                        out.push(child);
                    }
                }
                NodeKind::Container => {
                    if self.store.exists(&child)?
                        || (self.options.report_all && node.has_default_descendant())
                    {
                        out.push(child);
                    }
                }
                NodeKind::List | NodeKind::LeafList => out.extend(self.entries(&child)?),
            }
        }
        Ok(out)
    }

    /// Stored form of a leaf or leaf-list entry, falling back to the
    /// default under report-all
    ///
    /// # Errors
    /// Propagates store failures.
    pub fn stored_value(&self, path: &DataPath) -> Result<Option<String>> {
        let Some(r) = self.resolve(path) else {
            return Ok(None);
        };
        match r.node.kind() {
            NodeKind::Leaf => match self.store.get(path)? {
                Some(v) => Ok(Some(v)),
                None if self.options.report_all => Ok(r.node.default_value().map(str::to_string)),
                None => Ok(None),
            },
            NodeKind::LeafList if r.entry => match self.store.get(path)? {
                Some(v) => Ok(Some(v)),
                None => Ok(path.last().map(unescape_key)),
            },
            _ => Ok(None),
        }
    }

    /// Display form of a leaf or leaf-list entry
    ///
    /// # Errors
    /// Propagates store failures.
    pub fn value(&self, path: &DataPath) -> Result<Option<String>> {
        let Some(r) = self.resolve(path) else {
            return Ok(None);
        };
        Ok(self.stored_value(path)?.map(|v| r.node.display_value(&v)))
    }

    /// XPath string-value: a leaf's value, or the concatenated values of
    /// all descendant leaves
    ///
    /// # Errors
    /// Propagates store failures.
    pub fn string_value(&self, path: &DataPath) -> Result<String> {
        if self.is_value_node(path) {
            return Ok(self.value(path)?.unwrap_or_default());
        }
        let mut out = String::new();
        for child in self.children(path)? {
            out.push_str(&self.string_value(&child)?);
        }
        Ok(out)
    }

    /// Position among siblings: schema index, then entry key
    pub fn sibling_key(&self, path: &DataPath) -> (usize, String) {
        let Some(r) = self.resolve(path) else {
            return (usize::MAX, String::new());
        };
        let siblings: &[SchemaNode] = match self.parent(path) {
            Some(parent) if !parent.is_root() => match self.resolve(&parent) {
                Some(pr) => pr.node.children(),
                None => &[],
            },
            _ => self.schema.roots(),
        };
        let index = siblings
            .iter()
            .position(|s| std::ptr::eq(s, r.node))
            .unwrap_or(usize::MAX);
        let entry = match (r.entry, path.last()) {
            (true, Some(seg)) => seg.to_string(),
            _ => String::new(),
        };
        (index, entry)
    }

    /// Sort key for document order; ancestors sort before descendants
    pub fn doc_key(&self, path: &DataPath) -> Vec<(usize, String)> {
        let mut out = Vec::new();
        let mut current = Some(path.clone());
        while let Some(p) = current {
            if p.is_root() {
                break;
            }
            out.push(self.sibling_key(&p));
            current = self.parent(&p);
        }
        out.reverse();
        out
    }

    /// Every element beneath `path` in document order, `path` excluded
    ///
    /// # Errors
    /// Propagates store failures.
    pub fn descendants(&self, path: &DataPath) -> Result<Vec<DataPath>> {
        let mut out = Vec::new();
        self.descendants_into(path, &mut out)?;
        Ok(out)
    }

    fn descendants_into(&self, path: &DataPath, out: &mut Vec<DataPath>) -> Result<()> {
        for child in self.children(path)? {
            out.push(child.clone());
            self.descendants_into(&child, out)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::LocalStore;
    use crate::model::Module;

    fn p(s: &str) -> DataPath {
        DataPath::parse(s).unwrap()
    }

    fn schema() -> SchemaRegistry {
        SchemaRegistry::builder()
            .module(Module::new("testing", "test", "urn:test"))
            .default_module("testing")
            .root(
                SchemaNode::container("test")
                    .child(
                        SchemaNode::container("settings")
                            .child(SchemaNode::leaf("debug").with_value("enable", "1"))
                            .child(SchemaNode::leaf("volume").with_default("5"))
                            .child(SchemaNode::leaf("secret").hidden()),
                    )
                    .child(SchemaNode::container("state").state().child(SchemaNode::leaf("counter")))
                    .child(
                        SchemaNode::list("animal", ["name"])
                            .child(SchemaNode::leaf("name"))
                            .child(SchemaNode::leaf("type")),
                    ),
            )
            .build()
            .unwrap()
    }

    fn store() -> LocalStore {
        LocalStore::from_pairs([
            (p("/test/settings/debug"), "1"),
            (p("/test/settings/secret"), "x"),
            (p("/test/state/counter"), "42"),
            (p("/test/animal/dog/name"), "dog"),
            (p("/test/animal/cat/name"), "cat"),
            (p("/test/animal/cat/type"), "big"),
        ])
    }

    #[test]
    fn test_children_in_schema_then_entry_order() {
        let schema = schema();
        let store = store();
        let view = TreeView::new(&schema, &store, ViewOptions::default());
        assert_eq!(
            view.children(&p("/test")).unwrap(),
            vec![
                p("/test/settings"),
                p("/test/state"),
                p("/test/animal/cat"),
                p("/test/animal/dog"),
            ]
        );
        // Hidden leaves never appear
        assert_eq!(view.children(&p("/test/settings")).unwrap(), vec![p("/test/settings/debug")]);
        assert_eq!(view.parent(&p("/test/animal/cat")), Some(p("/test")));
        assert_eq!(view.parent(&p("/test/animal/cat/name")), Some(p("/test/animal/cat")));
    }

    #[test]
    fn test_config_only_and_report_all() {
        let schema = schema();
        let store = store();
        let view = TreeView::new(
            &schema,
            &store,
            ViewOptions {
                config_only: true,
                report_all: true,
            },
        );
        assert!(!view.children(&p("/test")).unwrap().contains(&p("/test/state")));
        assert_eq!(view.value(&p("/test/settings/volume")).unwrap().as_deref(), Some("5"));
        assert_eq!(view.value(&p("/test/settings/debug")).unwrap().as_deref(), Some("enable"));
    }

    #[test]
    fn test_string_value_concatenates_leaves() {
        let schema = schema();
        let store = store();
        let view = TreeView::new(&schema, &store, ViewOptions::default());
        assert_eq!(view.string_value(&p("/test/animal/cat")).unwrap(), "catbig");
        assert!(view.exists(&p("/test/animal/dog")).unwrap());
        assert!(!view.exists(&p("/test/animal")).unwrap());
    }
}
