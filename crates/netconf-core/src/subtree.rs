//! Subtree filtering (RFC 6241 section 6)
//!
//! A filter is parsed into `FilterNode`s and matched against the tree view.
//! Matching collects picks (whole subtrees, single elements, synthesised
//! defaults) which the result builder turns into the reply, coalescing
//! shared ancestors.
//!
//! Sibling sets follow the RFC with the usual list caveat: only content
//! match nodes on list keys restrict which entries are returned. A content
//! match on any other leaf of a list entry behaves as a selection node.

use crate::errors::{NetconfError, Result};
use crate::model::{entry_segment, DataPath, NodeKind, ResultTree, SchemaNode};
use crate::result::ResultTreeBuilder;
use crate::view::TreeView;
use crate::xml::{XmlElement, NETCONF_BASE_NS};

/// One element of a subtree filter
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterNode {
    /// Empty element: the node and everything beneath it
    Selection {
        name: String,
        namespace: Option<String>,
    },
    /// Leaf element with text: an exact value test
    ContentMatch {
        name: String,
        namespace: Option<String>,
        value: String,
    },
    /// Element with children (attributes count as key content matches)
    Containment {
        name: String,
        namespace: Option<String>,
        children: Vec<FilterNode>,
    },
}

impl FilterNode {
    /// Convert one filter element
    ///
    /// # Errors
    /// * `BadAttribute` - an `operation` attribute appears in the filter
    pub fn from_xml(el: &XmlElement) -> Result<Self> {
        let namespace = el.namespace.clone().filter(|ns| ns != NETCONF_BASE_NS);
        let mut children = Vec::new();
        for attr in &el.attributes {
            if attr.name == "operation" {
                return Err(NetconfError::BadAttribute {
                    element: el.name.clone(),
                    attribute: attr.name.clone(),
                });
            }
            if attr.namespace.is_none() {
                children.push(FilterNode::ContentMatch {
                    name: attr.name.clone(),
                    namespace: namespace.clone(),
                    value: attr.value.clone(),
                });
            }
        }
        for child in el.elements() {
            children.push(Self::from_xml(child)?);
        }

        let name = el.name.clone();
        if !children.is_empty() {
            return Ok(FilterNode::Containment {
                name,
                namespace,
                children,
            });
        }
        Ok(match el.text_value() {
            Some(value) => FilterNode::ContentMatch {
                name,
                namespace,
                value,
            },
            None => FilterNode::Selection { name, namespace },
        })
    }

    pub fn name(&self) -> &str {
        match self {
            FilterNode::Selection { name, .. }
            | FilterNode::ContentMatch { name, .. }
            | FilterNode::Containment { name, .. } => name,
        }
    }

    pub fn namespace(&self) -> Option<&str> {
        match self {
            FilterNode::Selection { namespace, .. }
            | FilterNode::ContentMatch { namespace, .. }
            | FilterNode::Containment { namespace, .. } => namespace.as_deref(),
        }
    }
}

/// The children of a `<filter type="subtree">` element
///
/// # Errors
/// * `BadAttribute` - an `operation` attribute appears in the filter
pub fn parse_filter(filter: &XmlElement) -> Result<Vec<FilterNode>> {
    filter.elements().map(FilterNode::from_xml).collect()
}

/// Match a filter forest and build the reply tree
///
/// An empty forest matches nothing. No match anywhere is not an error.
///
/// # Errors
/// * `NotReadable` - the filter names a hidden node
/// * store failures
pub fn match_subtree(view: TreeView<'_>, filters: &[FilterNode]) -> Result<ResultTree> {
    let matcher = Matcher { view };
    let mut picks = Vec::new();
    for f in filters {
        matcher.top(f, &mut picks)?;
    }
    tracing::debug!(component = "subtree", picks = picks.len(), "subtree filter matched");

    let mut builder = ResultTreeBuilder::new(view);
    for pick in picks {
        match pick {
            Pick::Subtree(path) => builder.add_subtree(&path)?,
            Pick::Node(path) => builder.add_node(&path)?,
            Pick::Default(path, value) => builder.add_value(&path, value)?,
        }
    }
    Ok(builder.finish())
}

#[derive(Debug)]
enum Pick {
    Subtree(DataPath),
    Node(DataPath),
    Default(DataPath, String),
}

struct Matcher<'a> {
    view: TreeView<'a>,
}

impl Matcher<'_> {
    /// Namespace of a filter element, `None` when unqualified
    fn effective_ns<'f>(&self, ns: Option<&'f str>) -> Option<&'f str> {
        ns.filter(|n| *n != NETCONF_BASE_NS && !self.view.schema().is_unqualified_namespace(n))
    }

    fn top(&self, f: &FilterNode, out: &mut Vec<Pick>) -> Result<()> {
        let schema = self.view.schema();
        let named = || schema.roots().iter().filter(|r| r.name() == f.name());
        let candidates: Vec<&SchemaNode> = match self.effective_ns(f.namespace()) {
            Some(ns) => named().filter(|r| r.namespace() == ns).collect(),
            None => {
                let default = schema.default_module().name.as_str();
                let preferred: Vec<&SchemaNode> =
                    named().filter(|r| r.module() == default).collect();
                if preferred.is_empty() {
                    named().collect()
                } else {
                    preferred
                }
            }
        };
        let root = DataPath::root();
        for node in candidates {
            if !self.check_readable(&root, node)? {
                continue;
            }
            out.extend(self.child_picks(&root, node, f)?);
        }
        Ok(())
    }

    /// Schema child of `parent` a filter element refers to
    fn child_schema<'s>(
        &self,
        parent: &'s SchemaNode,
        f: &FilterNode,
        parent_ns: Option<&str>,
    ) -> Option<&'s SchemaNode> {
        let child = parent.find_child(f.name())?;
        match self.effective_ns(f.namespace()) {
            None => Some(child),
            Some(ns) if Some(ns) == parent_ns => Some(child),
            Some(ns) => (child.namespace() == ns).then_some(child),
        }
    }

    /// `Ok(false)` for nodes the view silently omits
    fn check_readable(&self, parent: &DataPath, node: &SchemaNode) -> Result<bool> {
        if node.is_hidden() {
            let path = parent.child(self.view.schema().segment_for(node, parent.len()));
            return Err(NetconfError::NotReadable {
                path: path.to_string(),
            });
        }
        Ok(self.view.visible(node))
    }

    /// Evaluate the sibling set `filters` inside the existing element `path`
    ///
    /// `None` means the element is not selected at all.
    fn element_set(
        &self,
        path: &DataPath,
        node: &SchemaNode,
        filter_ns: Option<&str>,
        filters: &[FilterNode],
    ) -> Result<Option<Vec<Pick>>> {
        let is_entry = node.kind() == NodeKind::List;
        let mut restricting: Vec<(&SchemaNode, &str)> = Vec::new();
        let mut others: Vec<(&SchemaNode, &FilterNode)> = Vec::new();

        for f in filters {
            let is_content = matches!(f, FilterNode::ContentMatch { .. });
            let Some(child) = self.child_schema(node, f, filter_ns) else {
                if is_content {
                    return Ok(None);
                }
                continue;
            };
            if !self.check_readable(path, child)? {
                if is_content {
                    return Ok(None);
                }
                continue;
            }
            match f {
                FilterNode::ContentMatch { value, .. }
                    if child.kind() == NodeKind::Leaf && (!is_entry || node.is_key(child.name())) =>
                {
                    restricting.push((child, value.as_str()));
                }
                _ => others.push((child, f)),
            }
        }

        // Every filter child named something absent from the view
        if restricting.is_empty() && others.is_empty() && !filters.is_empty() {
            return Ok(None);
        }

        for (child, value) in &restricting {
            match self.view.stored_value(&path.child(child.name()))? {
                Some(stored) if child.value_matches(&stored, value) => {}
                _ => return Ok(None),
            }
        }

        if others.is_empty() {
            return Ok(Some(vec![Pick::Subtree(path.clone())]));
        }

        let mut picks: Vec<Pick> = restricting
            .iter()
            .map(|(child, _)| Pick::Node(path.child(child.name())))
            .collect();
        let mut produced = false;
        for (child, f) in others {
            let sub = self.child_picks(path, child, f)?;
            if !sub.is_empty() {
                produced = true;
                picks.extend(sub);
            }
        }
        Ok(produced.then_some(picks))
    }

    /// Picks for one filter element applied to schema child `child` of `parent`
    fn child_picks(&self, parent: &DataPath, child: &SchemaNode, f: &FilterNode) -> Result<Vec<Pick>> {
        let view = &self.view;
        let path = parent.child(view.schema().segment_for(child, parent.len()));
        let child_ns = self.effective_ns(f.namespace());

        let picks = match child.kind() {
            NodeKind::Leaf => match f {
                FilterNode::Containment { .. } => Vec::new(),
                _ => {
                    if view.stored_value(&path)?.is_some() {
                        vec![Pick::Node(path)]
                    } else {
                        Vec::new()
                    }
                }
            },
            NodeKind::Container => match f {
                FilterNode::Selection { .. } if view.exists(&path)? => vec![Pick::Subtree(path)],
                FilterNode::Containment { children, .. } if view.exists(&path)? => self
                    .element_set(&path, child, child_ns, children)?
                    .unwrap_or_default(),
                _ => Vec::new(),
            },
            NodeKind::List => match f {
                FilterNode::Selection { .. } => view
                    .entries(&path)?
                    .into_iter()
                    .map(Pick::Subtree)
                    .collect(),
                FilterNode::Containment { children, .. } => {
                    let mut out = Vec::new();
                    for entry in view.entries(&path)? {
                        if let Some(p) = self.element_set(&entry, child, child_ns, children)? {
                            out.extend(p);
                        }
                    }
                    if out.is_empty() && view.options().report_all {
                        out = self.default_skeleton(&path, child, child_ns, children)?;
                    }
                    out
                }
                FilterNode::ContentMatch { .. } => Vec::new(),
            },
            NodeKind::LeafList => {
                let entries = view.entries(&path)?;
                match f {
                    FilterNode::Selection { .. } => entries.into_iter().map(Pick::Node).collect(),
                    FilterNode::ContentMatch { value, .. } => {
                        let mut out = Vec::new();
                        for e in entries {
                            if let Some(stored) = view.stored_value(&e)? {
                                if child.value_matches(&stored, value) {
                                    out.push(Pick::Node(e));
                                }
                            }
                        }
                        out
                    }
                    FilterNode::Containment { .. } => Vec::new(),
                }
            }
        };
        Ok(picks)
    }

    /// Defaults implied by a filter on a list entry that does not exist
    ///
    /// Needs every key as a content match; the keys themselves are not
    /// reported since no instance supplied them.
    fn default_skeleton(
        &self,
        list_path: &DataPath,
        list: &SchemaNode,
        filter_ns: Option<&str>,
        filters: &[FilterNode],
    ) -> Result<Vec<Pick>> {
        let mut key_values = Vec::new();
        for key in list.keys() {
            let value = filters.iter().find_map(|f| match f {
                FilterNode::ContentMatch { name, value, .. } if name == key => Some(value.clone()),
                _ => None,
            });
            match value {
                Some(v) => key_values.push(v),
                None => return Ok(Vec::new()),
            }
        }
        let entry = list_path.child(entry_segment(&key_values));

        let mut out = Vec::new();
        for f in filters {
            let FilterNode::Selection { .. } = f else {
                continue;
            };
            let Some(child) = self.child_schema(list, f, filter_ns) else {
                continue;
            };
            if !self.check_readable(&entry, child)? || list.is_key(child.name()) {
                continue;
            }
            if let Some(default) = child.default_value() {
                out.push(Pick::Default(
                    entry.child(child.name()),
                    child.display_value(default),
                ));
            }
        }
        Ok(out)
    }
}
