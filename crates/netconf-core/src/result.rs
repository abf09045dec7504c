//! Result tree builder
//!
//! Matched elements are inserted one at a time; each insertion creates the
//! missing part of its ancestor chain, so siblings sharing ancestors end up
//! under one element. `finish` restores document order: schema order among
//! different nodes, store order among entries of one list.

use std::cmp::Ordering;

use crate::errors::{NetconfError, Result};
use crate::model::{DataPath, NodeKind, ResultNode, ResultTree};
use crate::view::TreeView;

pub struct ResultTreeBuilder<'a> {
    view: TreeView<'a>,
    roots: Vec<ResultNode>,
}

impl<'a> ResultTreeBuilder<'a> {
    pub fn new(view: TreeView<'a>) -> Self {
        Self {
            view,
            roots: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// Add an element and its ancestors; leaves carry their display value
    ///
    /// # Errors
    /// * `InvalidPath` - the path has no schema counterpart
    pub fn add_node(&mut self, path: &DataPath) -> Result<()> {
        let value = if self.view.is_value_node(path) {
            self.view.value(path)?
        } else {
            None
        };
        self.insert(path, value)
    }

    /// Add a leaf with an explicit display value (synthesised defaults)
    ///
    /// # Errors
    /// * `InvalidPath` - the path has no schema counterpart
    pub fn add_value(&mut self, path: &DataPath, value: impl Into<String>) -> Result<()> {
        self.insert(path, Some(value.into()))
    }

    /// Add an element with everything beneath it
    ///
    /// # Errors
    /// Propagates store failures and unknown paths.
    pub fn add_subtree(&mut self, path: &DataPath) -> Result<()> {
        if !path.is_root() {
            self.add_node(path)?;
        }
        for d in self.view.descendants(path)? {
            self.add_node(&d)?;
        }
        Ok(())
    }

    /// Add the key leaves of every list entry on the way to `path`
    ///
    /// # Errors
    /// Propagates store failures and unknown paths.
    pub fn add_entry_keys(&mut self, path: &DataPath) -> Result<()> {
        for el in self.chain(path) {
            let Some(r) = self.view.resolve(&el) else {
                continue;
            };
            if !(r.entry && r.node.kind() == NodeKind::List) {
                continue;
            }
            for key in r.node.keys() {
                let key_path = el.child(key.as_str());
                if self.view.stored_value(&key_path)?.is_some() {
                    self.add_node(&key_path)?;
                }
            }
        }
        Ok(())
    }

    pub fn finish(self) -> ResultTree {
        let view = self.view;
        let mut roots = self.roots;
        sort_level(&view, &mut roots);
        ResultTree::new(roots)
    }

    /// Element paths from the top level down to `path`, inclusive
    fn chain(&self, path: &DataPath) -> Vec<DataPath> {
        let mut out = Vec::new();
        let mut current = Some(path.clone());
        while let Some(p) = current {
            if p.is_root() {
                break;
            }
            current = self.view.parent(&p);
            out.push(p);
        }
        out.reverse();
        out
    }

    fn insert(&mut self, path: &DataPath, value: Option<String>) -> Result<()> {
        let chain = self.chain(path);
        let view = self.view;
        let mut level = &mut self.roots;
        for (i, el) in chain.iter().enumerate() {
            let idx = match level.iter().position(|n| &n.path == el) {
                Some(idx) => idx,
                None => {
                    let (name, namespace) =
                        view.name(el).ok_or_else(|| NetconfError::InvalidPath {
                            path: el.to_string(),
                            reason: "no schema node for path".to_string(),
                        })?;
                    level.push(ResultNode::new(el.clone(), name, namespace, None));
                    level.len() - 1
                }
            };
            let node = &mut level[idx];
            if i + 1 == chain.len() && value.is_some() {
                node.value = value.clone();
            }
            level = &mut node.children;
        }
        Ok(())
    }
}

/// Everything the view shows, as an unfiltered read returns it
///
/// # Errors
/// Propagates store failures.
pub fn full_tree(view: TreeView<'_>) -> Result<ResultTree> {
    let mut builder = ResultTreeBuilder::new(view);
    builder.add_subtree(&DataPath::root())?;
    Ok(builder.finish())
}

fn sort_level(view: &TreeView<'_>, level: &mut [ResultNode]) {
    level.sort_by(|a, b| match view.sibling_key(&a.path).cmp(&view.sibling_key(&b.path)) {
        Ordering::Equal => a.path.cmp(&b.path),
        other => other,
    });
    for n in level.iter_mut() {
        sort_level(view, &mut n.children);
    }
}
