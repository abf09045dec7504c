//! Reply trees
//!
//! A `ResultTree` is what a read produces: an ordered forest of elements
//! carrying their store path, XML name and namespace, and a value for leaves.

use crate::model::path::DataPath;
use crate::xml::{XmlElement, NETCONF_BASE_NS};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResultNode {
    pub path: DataPath,
    pub name: String,
    pub namespace: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<ResultNode>,
}

impl ResultNode {
    pub fn new(
        path: DataPath,
        name: impl Into<String>,
        namespace: impl Into<String>,
        value: Option<String>,
    ) -> Self {
        Self {
            path,
            name: name.into(),
            namespace: namespace.into(),
            value,
            children: Vec::new(),
        }
    }

    /// First child with this element name
    pub fn child(&self, name: &str) -> Option<&ResultNode> {
        self.children.iter().find(|c| c.name == name)
    }

    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a ResultNode> {
        self.children.iter().filter(move |c| c.name == name)
    }

    pub fn is_leaf(&self) -> bool {
        self.value.is_some()
    }

    /// Number of elements in this subtree, self included
    pub fn count(&self) -> usize {
        1 + self.children.iter().map(ResultNode::count).sum::<usize>()
    }

    pub fn to_element(&self) -> XmlElement {
        let mut el = XmlElement::new(&self.name).with_namespace(&self.namespace);
        if let Some(v) = &self.value {
            el = el.with_text(v);
        }
        for c in &self.children {
            el.push_child(c.to_element());
        }
        el
    }

    fn collect_leaves<'a>(&'a self, out: &mut Vec<&'a ResultNode>) {
        if self.is_leaf() {
            out.push(self);
        }
        for c in &self.children {
            c.collect_leaves(out);
        }
    }

    fn retain_leaves<F>(&mut self, keep: &mut F)
    where
        F: FnMut(&ResultNode) -> bool,
    {
        self.children.retain(|c| !c.is_leaf() || keep(c));
        for c in &mut self.children {
            c.retain_leaves(keep);
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ResultTree {
    roots: Vec<ResultNode>,
}

impl ResultTree {
    pub fn new(roots: Vec<ResultNode>) -> Self {
        Self { roots }
    }

    pub fn roots(&self) -> &[ResultNode] {
        &self.roots
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// Append another tree's roots as separate fragments
    pub fn append(&mut self, other: ResultTree) {
        self.roots.extend(other.roots);
    }

    /// Every leaf in document order
    pub fn leaves(&self) -> Vec<&ResultNode> {
        let mut out = Vec::new();
        for r in &self.roots {
            r.collect_leaves(&mut out);
        }
        out
    }

    /// Drop leaves for which `keep` returns false; their parents stay
    pub fn retain_leaves<F>(&mut self, mut keep: F)
    where
        F: FnMut(&ResultNode) -> bool,
    {
        self.roots.retain(|r| !r.is_leaf() || keep(r));
        for r in &mut self.roots {
            r.retain_leaves(&mut keep);
        }
    }

    /// Nodes reached by following element names, e.g. `/test/animals/animal/name`
    ///
    /// Every same-named sibling is followed, so list entries fan out.
    pub fn select<'a>(&'a self, names: &'a str) -> Vec<&'a ResultNode> {
        let mut parts = names.trim_start_matches('/').split('/');
        let Some(first) = parts.next() else {
            return Vec::new();
        };
        let mut current: Vec<&ResultNode> = self.roots.iter().filter(|r| r.name == first).collect();
        for part in parts {
            current = current
                .into_iter()
                .flat_map(|n| n.children_named(part))
                .collect();
        }
        current
    }

    /// Values of the leaves `select` reaches
    pub fn texts(&self, names: &str) -> Vec<String> {
        self.select(names)
            .into_iter()
            .filter_map(|n| n.value.clone())
            .collect()
    }

    /// The `<data>` element of a reply
    pub fn to_data_element(&self) -> XmlElement {
        let mut data = XmlElement::new("data").with_namespace(NETCONF_BASE_NS);
        for r in &self.roots {
            data.push_child(r.to_element());
        }
        data
    }
}
