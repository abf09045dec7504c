//! Path store adapters
//!
//! The engine reads and writes the configuration store only through
//! `PathAdapter`. A `LocalStore` holds data in memory and forwards paths
//! under a proxy mount to another adapter; `RemoteAdapter` forwards over
//! an RPC seam; `StagedStore` overlays pending changes for validation.

pub mod local;
pub mod remote;
pub mod staged;

pub use local::LocalStore;
pub use remote::{LoopbackEndpoint, RemoteAdapter, RemoteEndpoint, RemoteRequest, RemoteResponse};
pub use staged::{Changes, StagedStore};

use crate::errors::Result;
use crate::model::DataPath;

/// Uniform access to a hierarchical path/value store
///
/// Paths are store paths (`DataPath`); only leaves and leaf-list entries
/// hold values. Interior nodes exist while they have descendants.
pub trait PathAdapter: Send + Sync {
    /// Value stored at `path`
    ///
    /// # Errors
    /// Transport failures of remote stores.
    fn get(&self, path: &DataPath) -> Result<Option<String>>;

    /// Immediate child segments of `path`, in store order
    ///
    /// # Errors
    /// Transport failures of remote stores.
    fn children(&self, path: &DataPath) -> Result<Vec<String>>;

    /// # Errors
    /// * `ProxyReadOnly` - `path` is under a read-only mount
    fn set(&mut self, path: &DataPath, value: &str) -> Result<()>;

    /// Remove `path` and everything beneath it
    ///
    /// # Errors
    /// * `ProxyReadOnly` - `path` is under a read-only mount
    fn delete(&mut self, path: &DataPath) -> Result<()>;

    /// Whether `path` holds a value or has descendants
    ///
    /// # Errors
    /// Transport failures of remote stores.
    fn exists(&self, path: &DataPath) -> Result<bool>;

    /// The delegated store `path` falls under, if any
    fn resolve_proxy(&self, _path: &DataPath) -> Option<&dyn PathAdapter> {
        None
    }

    fn is_read_only(&self) -> bool {
        false
    }

    /// Whether a write at `path` (a set, or a delete when `subtree`) would
    /// be accepted, checked without touching the store
    ///
    /// # Errors
    /// * `ProxyReadOnly` - a read-only mount would be written
    fn check_writable(&self, _path: &DataPath, _subtree: bool) -> Result<()> {
        Ok(())
    }
}

/// All path/value pairs at or beneath `path`, in store order
///
/// # Errors
/// Propagates adapter failures.
pub fn walk(adapter: &dyn PathAdapter, path: &DataPath) -> Result<Vec<(DataPath, String)>> {
    let mut out = Vec::new();
    walk_into(adapter, path, &mut out)?;
    Ok(out)
}

fn walk_into(
    adapter: &dyn PathAdapter,
    path: &DataPath,
    out: &mut Vec<(DataPath, String)>,
) -> Result<()> {
    if let Some(value) = adapter.get(path)? {
        out.push((path.clone(), value));
    }
    for seg in adapter.children(path)? {
        walk_into(adapter, &path.child(seg), out)?;
    }
    Ok(())
}
