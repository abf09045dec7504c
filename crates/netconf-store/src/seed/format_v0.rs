//! Seed Format v0 schema
//!
//! Defines the YAML structure of a seed file

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Top-level seed file structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedV0 {
    /// Schema version (must be 0 for this format)
    pub schema_version: u32,

    /// Namespace URI treated like an unqualified filter namespace
    #[serde(default)]
    pub default_namespace: Option<String>,

    /// Module owning unqualified top-level names; the first module when absent
    #[serde(default)]
    pub default_module: Option<String>,

    pub modules: Vec<SeedModule>,

    /// Enabled if-feature names
    #[serde(default)]
    pub features: Vec<String>,

    /// Top-level schema nodes
    pub schema: Vec<SeedNode>,

    /// Initial running data, store path to stored value
    #[serde(default)]
    pub data: BTreeMap<String, String>,

    #[serde(default)]
    pub mounts: Vec<SeedMount>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedModule {
    pub name: String,
    pub prefix: String,
    pub namespace: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SeedNodeKind {
    Container,
    List,
    Leaf,
    LeafList,
}

/// Schema node definition in seed
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct SeedNode {
    pub name: String,
    pub kind: SeedNodeKind,

    /// Owning module when it differs from the parent's (augmentation)
    #[serde(default)]
    pub module: Option<String>,

    #[serde(default)]
    pub keys: Vec<String>,

    #[serde(default)]
    pub default: Option<String>,

    #[serde(default)]
    pub pattern: Option<String>,

    #[serde(default)]
    pub range: Option<String>,

    /// Enumeration, display name to stored value
    #[serde(default)]
    pub values: BTreeMap<String, String>,

    #[serde(default = "default_config")]
    pub config: bool,

    #[serde(default)]
    pub read_only: bool,

    #[serde(default)]
    pub hidden: bool,

    #[serde(default)]
    pub if_feature: Vec<String>,

    #[serde(default)]
    pub when: Option<String>,

    #[serde(default)]
    pub must: Vec<String>,

    #[serde(default)]
    pub children: Vec<SeedNode>,
}

fn default_config() -> bool {
    true
}

/// Proxied sub-store served through a remote adapter
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct SeedMount {
    /// Store path of the mount point
    pub path: String,

    #[serde(default)]
    pub read_only: bool,

    /// Remote data, relative to the mount point
    #[serde(default)]
    pub data: BTreeMap<String, String>,
}
