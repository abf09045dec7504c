//! edit-config (RFC 6241 section 7.2)
//!
//! An edit runs in three phases over a `StagedStore`:
//! 1. `parse` turns the `<config>` tree into `EditNode`s, resolving every
//!    element against the schema and the effective operation of each node
//! 2. `plan` checks create/delete preconditions against the pre-edit tree,
//!    then stages prunes and sets
//! 3. `validate` checks the staged tree (constraints, access, features,
//!    when/must)
//!
//! Only a fully validated edit is committed, so a failure leaves the store
//! untouched.

pub mod parse;
pub mod plan;
pub mod validate;

pub use parse::parse_config;

use std::fmt;

use crate::adapter::{Changes, PathAdapter, StagedStore};
use crate::errors::{NetconfError, Result};
use crate::model::{DataPath, SchemaRegistry};
use crate::xml::XmlElement;

/// Operation of one edit node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EditOperation {
    #[default]
    Merge,
    Replace,
    Create,
    Delete,
    Remove,
    None,
}

impl EditOperation {
    pub fn as_str(&self) -> &'static str {
        match self {
            EditOperation::Merge => "merge",
            EditOperation::Replace => "replace",
            EditOperation::Create => "create",
            EditOperation::Delete => "delete",
            EditOperation::Remove => "remove",
            EditOperation::None => "none",
        }
    }

    /// Value of an `operation` attribute
    ///
    /// # Errors
    /// * `UnknownAttribute` - not one of the five operations
    pub fn from_attribute(value: &str) -> Result<Self> {
        match value {
            "merge" => Ok(EditOperation::Merge),
            "replace" => Ok(EditOperation::Replace),
            "create" => Ok(EditOperation::Create),
            "delete" => Ok(EditOperation::Delete),
            "remove" => Ok(EditOperation::Remove),
            other => Err(NetconfError::UnknownAttribute {
                attribute: "operation".to_string(),
                value: other.to_string(),
            }),
        }
    }

    /// Value of `<default-operation>`
    ///
    /// # Errors
    /// * `InvalidValue` - anything but merge, replace or none
    pub fn from_default(value: &str) -> Result<Self> {
        match value {
            "merge" => Ok(EditOperation::Merge),
            "replace" => Ok(EditOperation::Replace),
            "none" => Ok(EditOperation::None),
            other => Err(NetconfError::invalid_value(
                "default-operation",
                format!("'{}' is not a default operation", other),
            )),
        }
    }

    /// Whether a node may state `explicit` beneath an `self` context
    pub fn allows_override(&self, explicit: EditOperation) -> bool {
        matches!(self, EditOperation::Merge | EditOperation::None) || *self == explicit
    }

    /// Operations that write the node's content
    pub fn writes(&self) -> bool {
        matches!(
            self,
            EditOperation::Merge | EditOperation::Replace | EditOperation::Create
        )
    }

    /// Operations that take the node away
    pub fn removes(&self) -> bool {
        matches!(self, EditOperation::Delete | EditOperation::Remove)
    }
}

impl fmt::Display for EditOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One element of a parsed `<config>` tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditNode {
    /// Store path; list and leaf-list entries include their entry segment
    pub path: DataPath,
    pub operation: EditOperation,
    /// Text content of leaves and leaf-list entries, as sent
    pub value: Option<String>,
    /// Key leaves of a list entry: (leaf name, text as sent)
    pub keys: Vec<(String, String)>,
    pub children: Vec<EditNode>,
}

impl EditNode {
    /// This node and every descendant, depth first
    pub fn walk(&self) -> Vec<&EditNode> {
        let mut out = vec![self];
        for c in &self.children {
            out.extend(c.walk());
        }
        out
    }
}

/// Apply a `<config>` element to `store`
///
/// Returns the committed changes. On any error nothing has been written.
///
/// # Errors
/// * `UnknownNode` - an element has no schema counterpart
/// * `MissingAttribute` - a list entry lacks a key leaf
/// * `UnknownAttribute` - bad `operation` value
/// * `OperationTransition` - an operation not permitted in its context
/// * `DataExists` / `DataMissing` - create/delete preconditions
/// * `InvalidValue` / `ProxyReadOnly` - validation failures
pub fn edit_config(
    store: &mut dyn PathAdapter,
    schema: &SchemaRegistry,
    config: &XmlElement,
    default_operation: EditOperation,
) -> Result<Changes> {
    let nodes = parse_config(schema, config, default_operation)?;
    let changes = {
        let base: &dyn PathAdapter = &*store;
        plan::check_preconditions(base, &nodes)?;
        let mut staged = StagedStore::new(base);
        plan::stage(schema, &mut staged, &nodes)?;
        validate::validate(schema, &staged, &nodes)?;
        staged.into_changes()
    };
    tracing::debug!(
        component = "edit",
        prunes = changes.prunes.len(),
        sets = changes.sets.len(),
        "edit validated"
    );
    changes.check(&*store)?;
    changes.apply(store)?;
    Ok(changes)
}
