//! Validation of a staged edit

use crate::adapter::{PathAdapter, StagedStore};
use crate::edit::{EditNode, EditOperation};
use crate::errors::{NetconfError, Result};
use crate::model::{DataPath, SchemaRegistry};
use crate::view::{TreeView, ViewOptions};
use crate::xpath;

/// Check the edited nodes and the resulting tree
///
/// # Errors
/// * `InvalidValue` - disabled feature, non-config or read-only target,
///   or a false `when`/`must`
/// * `ProxyReadOnly` - a write under a read-only proxy mount
pub fn validate(schema: &SchemaRegistry, staged: &StagedStore<'_>, nodes: &[EditNode]) -> Result<()> {
    for n in nodes {
        check_access(schema, staged, n)?;
    }
    let view = TreeView::new(schema, staged, ViewOptions::default());
    for n in nodes {
        check_conditions(view, &n.path)?;
    }
    Ok(())
}

fn check_access(schema: &SchemaRegistry, staged: &StagedStore<'_>, n: &EditNode) -> Result<()> {
    if n.operation != EditOperation::None {
        let node = schema
            .resolve(&n.path)
            .map(|r| r.node)
            .ok_or_else(|| NetconfError::InvalidPath {
                path: n.path.to_string(),
                reason: "no schema node for path".to_string(),
            })?;
        let path = n.path.to_string();
        if let Some(feature) = node.if_features().iter().find(|f| !schema.feature_enabled(f)) {
            return Err(NetconfError::invalid_value(
                path,
                format!("feature '{}' is not enabled", feature),
            ));
        }
        if !node.is_config() {
            return Err(NetconfError::invalid_value(path, "not configuration data"));
        }
        if node.is_read_only() {
            return Err(NetconfError::invalid_value(path, "node is read-only"));
        }
        if staged.resolve_proxy(&n.path).is_some_and(|a| a.is_read_only()) {
            return Err(NetconfError::ProxyReadOnly { mount: path });
        }
    }
    if n.operation.removes() {
        return Ok(());
    }
    for c in &n.children {
        check_access(schema, staged, c)?;
    }
    Ok(())
}

/// Every `when` and `must` at or below `root` must hold on the staged tree
fn check_conditions(view: TreeView<'_>, root: &DataPath) -> Result<()> {
    if !view.exists(root)? {
        return Ok(());
    }
    let mut elements = vec![root.clone()];
    elements.extend(view.descendants(root)?);
    for el in elements {
        let Some(r) = view.resolve(&el) else {
            continue;
        };
        if let Some(when) = r.node.when() {
            if !xpath::condition(view, when, &el)? {
                return Err(NetconfError::invalid_value(
                    el.to_string(),
                    format!("when condition '{}' is not satisfied", when),
                ));
            }
        }
        for must in r.node.must() {
            if !xpath::condition(view, must, &el)? {
                return Err(NetconfError::invalid_value(
                    el.to_string(),
                    format!("must condition '{}' is not satisfied", must),
                ));
            }
        }
    }
    Ok(())
}
