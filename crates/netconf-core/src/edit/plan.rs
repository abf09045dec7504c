//! Staging an edit: preconditions, prunes, then sets

use crate::adapter::{PathAdapter, StagedStore};
use crate::edit::{EditNode, EditOperation};
use crate::errors::{NetconfError, Result};
use crate::model::{NodeKind, SchemaRegistry};

/// Check create/delete preconditions against the pre-edit tree
///
/// Nodes beneath a delete or remove are not examined.
///
/// # Errors
/// * `DataExists` - create of an existing node
/// * `DataMissing` - delete of an absent node
pub fn check_preconditions(base: &dyn PathAdapter, nodes: &[EditNode]) -> Result<()> {
    for n in nodes {
        match n.operation {
            EditOperation::Create if base.exists(&n.path)? => {
                return Err(NetconfError::DataExists {
                    path: n.path.to_string(),
                })
            }
            EditOperation::Delete if !base.exists(&n.path)? => {
                return Err(NetconfError::DataMissing {
                    path: n.path.to_string(),
                })
            }
            op if op.removes() => continue,
            _ => {}
        }
        check_preconditions(base, &n.children)?;
    }
    Ok(())
}

/// Stage every prune, then every set
///
/// # Errors
/// * `InvalidValue` - a written value fails its constraints
/// * `InvalidPath` - a path with no schema counterpart
pub fn stage(schema: &SchemaRegistry, staged: &mut StagedStore<'_>, nodes: &[EditNode]) -> Result<()> {
    for n in nodes {
        stage_prunes(staged, n)?;
    }
    for n in nodes {
        stage_sets(schema, staged, n)?;
    }
    Ok(())
}

fn stage_prunes(staged: &mut StagedStore<'_>, n: &EditNode) -> Result<()> {
    match n.operation {
        EditOperation::Delete | EditOperation::Remove => return staged.delete(&n.path),
        EditOperation::Replace => staged.delete(&n.path)?,
        _ => {}
    }
    for c in &n.children {
        stage_prunes(staged, c)?;
    }
    Ok(())
}

/// Returns whether anything was written at or below `n`
fn stage_sets(schema: &SchemaRegistry, staged: &mut StagedStore<'_>, n: &EditNode) -> Result<bool> {
    if n.operation.removes() {
        return Ok(false);
    }
    let resolved = schema.resolve(&n.path).ok_or_else(|| NetconfError::InvalidPath {
        path: n.path.to_string(),
        reason: "no schema node for path".to_string(),
    })?;
    let node = resolved.node;

    if node.kind().is_value() {
        if !n.operation.writes() {
            return Ok(false);
        }
        let stored = node
            .constraint_check(n.value.as_deref().unwrap_or_default())
            .map_err(|reason| NetconfError::invalid_value(n.path.to_string(), reason))?;
        staged.set(&n.path, &stored)?;
        return Ok(true);
    }

    let mut wrote = false;
    for c in &n.children {
        wrote |= stage_sets(schema, staged, c)?;
    }

    // A written entry always carries its keys
    if node.kind() == NodeKind::List && (wrote || n.operation.writes()) {
        for (name, text) in &n.keys {
            let key_path = n.path.child(name.as_str());
            let stored = match node.find_child(name) {
                Some(leaf) => leaf
                    .constraint_check(text)
                    .map_err(|reason| NetconfError::invalid_value(key_path.to_string(), reason))?,
                None => text.clone(),
            };
            staged.set(&key_path, &stored)?;
        }
        wrote = true;
    }
    Ok(wrote)
}
