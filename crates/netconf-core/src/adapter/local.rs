use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use crate::adapter::PathAdapter;
use crate::errors::{NetconfError, Result};
use crate::model::DataPath;

struct Mount {
    at: DataPath,
    adapter: Box<dyn PathAdapter>,
}

/// In-memory path/value store with proxy mounts
///
/// Values live in an ordered map, so children enumerate in lexical order.
/// Any call whose path lies at or below a mount point is forwarded to the
/// mounted adapter with the mount prefix stripped.
#[derive(Default)]
pub struct LocalStore {
    data: BTreeMap<DataPath, String>,
    mounts: Vec<Mount>,
}

impl fmt::Debug for LocalStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocalStore")
            .field("values", &self.data.len())
            .field(
                "mounts",
                &self.mounts.iter().map(|m| m.at.to_string()).collect::<Vec<_>>(),
            )
            .finish()
    }
}

impl LocalStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs<I, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (DataPath, V)>,
        V: Into<String>,
    {
        Self {
            data: pairs.into_iter().map(|(p, v)| (p, v.into())).collect(),
            mounts: Vec::new(),
        }
    }

    /// Number of locally held values (mounted stores not included)
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn mount_points(&self) -> impl Iterator<Item = &DataPath> {
        self.mounts.iter().map(|m| &m.at)
    }

    /// Delegate the subtree at `at` to `adapter`
    ///
    /// # Errors
    /// * `InvalidPath` - `at` is the root, overlaps another mount, or already
    ///   holds local data
    pub fn mount(&mut self, at: DataPath, adapter: Box<dyn PathAdapter>) -> Result<()> {
        let invalid = |reason: &str| NetconfError::InvalidPath {
            path: at.to_string(),
            reason: reason.to_string(),
        };
        if at.is_root() {
            return Err(invalid("cannot mount at the root"));
        }
        if self
            .mounts
            .iter()
            .any(|m| m.at.starts_with(&at) || at.starts_with(&m.at))
        {
            return Err(invalid("overlaps an existing mount"));
        }
        if self.local_exists(&at) {
            return Err(invalid("mount point already holds local data"));
        }
        tracing::debug!(component = "store", mount = %at, "proxy mounted");
        self.mounts.push(Mount { at, adapter });
        Ok(())
    }

    fn mount_for(&self, path: &DataPath) -> Option<(&Mount, DataPath)> {
        self.mounts
            .iter()
            .find_map(|m| path.strip_prefix(&m.at).map(|rel| (m, rel)))
    }

    fn mount_for_mut(&mut self, path: &DataPath) -> Option<(&mut Mount, DataPath)> {
        self.mounts
            .iter_mut()
            .find_map(|m| path.strip_prefix(&m.at).map(|rel| (m, rel)))
    }

    /// Mounts strictly beneath `path`
    fn mounts_below<'a>(&'a self, path: &'a DataPath) -> impl Iterator<Item = &'a Mount> {
        self.mounts
            .iter()
            .filter(move |m| m.at.len() > path.len() && m.at.starts_with(path))
    }

    fn local_exists(&self, path: &DataPath) -> bool {
        self.data
            .range(path.clone()..)
            .next()
            .is_some_and(|(k, _)| k.starts_with(path))
    }
}

impl PathAdapter for LocalStore {
    fn get(&self, path: &DataPath) -> Result<Option<String>> {
        if let Some((m, rel)) = self.mount_for(path) {
            return m.adapter.get(&rel);
        }
        Ok(self.data.get(path).cloned())
    }

    fn children(&self, path: &DataPath) -> Result<Vec<String>> {
        if let Some((m, rel)) = self.mount_for(path) {
            return m.adapter.children(&rel);
        }
        let depth = path.len();
        let mut out = BTreeSet::new();
        for (k, _) in self.data.range(path.clone()..) {
            if !k.starts_with(path) {
                break;
            }
            if let Some(seg) = k.segments().get(depth) {
                out.insert(seg.clone());
            }
        }
        for m in self.mounts_below(path) {
            if m.adapter.exists(&DataPath::root())? {
                out.insert(m.at.segments()[depth].clone());
            }
        }
        Ok(out.into_iter().collect())
    }

    fn set(&mut self, path: &DataPath, value: &str) -> Result<()> {
        if let Some((m, rel)) = self.mount_for_mut(path) {
            if m.adapter.is_read_only() {
                return Err(NetconfError::ProxyReadOnly {
                    mount: m.at.to_string(),
                });
            }
            return m.adapter.set(&rel, value);
        }
        if path.is_root() {
            return Err(NetconfError::InvalidPath {
                path: path.to_string(),
                reason: "the root holds no value".to_string(),
            });
        }
        self.data.insert(path.clone(), value.to_string());
        Ok(())
    }

    fn delete(&mut self, path: &DataPath) -> Result<()> {
        if let Some((m, rel)) = self.mount_for_mut(path) {
            if m.adapter.is_read_only() {
                return Err(NetconfError::ProxyReadOnly {
                    mount: m.at.to_string(),
                });
            }
            return m.adapter.delete(&rel);
        }
        if let Some(m) = self.mounts_below(path).find(|m| m.adapter.is_read_only()) {
            return Err(NetconfError::ProxyReadOnly {
                mount: m.at.to_string(),
            });
        }
        let doomed: Vec<DataPath> = self
            .data
            .range(path.clone()..)
            .take_while(|(k, _)| k.starts_with(path))
            .map(|(k, _)| k.clone())
            .collect();
        for k in doomed {
            self.data.remove(&k);
        }
        for m in self
            .mounts
            .iter_mut()
            .filter(|m| m.at.len() > path.len() && m.at.starts_with(path))
        {
            m.adapter.delete(&DataPath::root())?;
        }
        Ok(())
    }

    fn exists(&self, path: &DataPath) -> Result<bool> {
        if let Some((m, rel)) = self.mount_for(path) {
            return m.adapter.exists(&rel);
        }
        if self.local_exists(path) {
            return Ok(true);
        }
        for m in self.mounts_below(path) {
            if m.adapter.exists(&DataPath::root())? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    fn resolve_proxy(&self, path: &DataPath) -> Option<&dyn PathAdapter> {
        self.mount_for(path).map(|(m, _)| m.adapter.as_ref())
    }

    fn check_writable(&self, path: &DataPath, subtree: bool) -> Result<()> {
        let refused = |m: &Mount| NetconfError::ProxyReadOnly {
            mount: m.at.to_string(),
        };
        if let Some((m, rel)) = self.mount_for(path) {
            if m.adapter.is_read_only() {
                return Err(refused(m));
            }
            return m.adapter.check_writable(&rel, subtree);
        }
        if subtree {
            if let Some(m) = self.mounts_below(path).find(|m| m.adapter.is_read_only()) {
                return Err(refused(m));
            }
        }
        Ok(())
    }
}
