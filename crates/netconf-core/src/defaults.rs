//! with-defaults rendering (RFC 6243)
//!
//! `report-all` is a property of the view: absent leaves with a schema
//! default are materialised while the reply is matched. `trim` runs after
//! matching and drops leaves whose value equals their default.

use std::fmt;
use std::str::FromStr;

use crate::errors::{NetconfError, Result};
use crate::model::{NodeKind, ResultNode, ResultTree, SchemaRegistry};
use crate::view::ViewOptions;

/// Requested `<with-defaults>` mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WithDefaults {
    /// Only what is stored
    #[default]
    Explicit,
    /// Stored values that differ from their default
    Trim,
    /// Stored values plus every applicable default
    ReportAll,
}

impl WithDefaults {
    pub fn as_str(&self) -> &'static str {
        match self {
            WithDefaults::Explicit => "explicit",
            WithDefaults::Trim => "trim",
            WithDefaults::ReportAll => "report-all",
        }
    }

    /// View options for a read in this mode
    pub fn view_options(&self, config_only: bool) -> ViewOptions {
        ViewOptions {
            config_only,
            report_all: *self == WithDefaults::ReportAll,
        }
    }

    /// Post-process a matched reply
    pub fn render(&self, schema: &SchemaRegistry, mut tree: ResultTree) -> ResultTree {
        if *self == WithDefaults::Trim {
            trim(schema, &mut tree);
        }
        tree
    }
}

impl FromStr for WithDefaults {
    type Err = NetconfError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "explicit" => Ok(WithDefaults::Explicit),
            "trim" => Ok(WithDefaults::Trim),
            "report-all" => Ok(WithDefaults::ReportAll),
            other => Err(NetconfError::not_supported(format!(
                "with-defaults mode '{}'",
                other
            ))),
        }
    }
}

impl fmt::Display for WithDefaults {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Drop leaves carrying their schema default; containers and keys stay
pub fn trim(schema: &SchemaRegistry, tree: &mut ResultTree) {
    tree.retain_leaves(|leaf| !is_default(schema, leaf));
}

fn is_default(schema: &SchemaRegistry, leaf: &ResultNode) -> bool {
    let Some(r) = schema.resolve(&leaf.path) else {
        return false;
    };
    if r.node.kind() != NodeKind::Leaf {
        return false;
    }
    match (r.node.default_value(), leaf.value.as_deref()) {
        (Some(default), Some(value)) => r.node.value_matches(default, value),
        _ => false,
    }
}
