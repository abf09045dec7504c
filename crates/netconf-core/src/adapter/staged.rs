//! Copy-on-write overlay used to validate an edit before it lands
//!
//! The staged view is the base store minus pending prunes plus pending
//! sets. An edit applies every prune before any set, so a set always wins
//! over a prune covering it.

use std::collections::{BTreeMap, BTreeSet};

use crate::adapter::PathAdapter;
use crate::errors::Result;
use crate::model::DataPath;

pub struct StagedStore<'a> {
    base: &'a dyn PathAdapter,
    prunes: Vec<DataPath>,
    sets: BTreeMap<DataPath, String>,
}

/// The pending mutations of a `StagedStore`, detached from its base
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Changes {
    pub prunes: Vec<DataPath>,
    pub sets: Vec<(DataPath, String)>,
}

impl Changes {
    pub fn len(&self) -> usize {
        self.prunes.len() + self.sets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prunes.is_empty() && self.sets.is_empty()
    }

    /// Refuse the whole change set if any write would be refused
    ///
    /// # Errors
    /// * `ProxyReadOnly` - a prune or set reaches a read-only mount
    pub fn check(&self, target: &dyn PathAdapter) -> Result<()> {
        for path in &self.prunes {
            target.check_writable(path, true)?;
        }
        for (path, _) in &self.sets {
            target.check_writable(path, false)?;
        }
        Ok(())
    }

    /// Prunes first, then sets
    ///
    /// # Errors
    /// Propagates the target's failures.
    pub fn apply(&self, target: &mut dyn PathAdapter) -> Result<()> {
        for path in &self.prunes {
            target.delete(path)?;
        }
        for (path, value) in &self.sets {
            target.set(path, value)?;
        }
        Ok(())
    }
}

impl<'a> StagedStore<'a> {
    pub fn new(base: &'a dyn PathAdapter) -> Self {
        Self {
            base,
            prunes: Vec::new(),
            sets: BTreeMap::new(),
        }
    }

    pub fn into_changes(self) -> Changes {
        Changes {
            prunes: self.prunes,
            sets: self.sets.into_iter().collect(),
        }
    }

    fn pruned(&self, path: &DataPath) -> bool {
        self.prunes.iter().any(|p| path.starts_with(p))
    }

    fn prune_below(&self, path: &DataPath) -> bool {
        self.prunes.iter().any(|p| p.starts_with(path))
    }

    fn staged_below(&self, path: &DataPath) -> bool {
        self.sets
            .range(path.clone()..)
            .next()
            .is_some_and(|(k, _)| k.starts_with(path))
    }

    /// Whether anything of the base survives at or below `path`
    fn base_visible(&self, path: &DataPath) -> Result<bool> {
        if self.pruned(path) {
            return Ok(false);
        }
        if !self.prune_below(path) {
            return self.base.exists(path);
        }
        if self.base.get(path)?.is_some() {
            return Ok(true);
        }
        for seg in self.base.children(path)? {
            if self.base_visible(&path.child(seg))? {
                return Ok(true);
            }
        }
        Ok(false)
    }
}

impl PathAdapter for StagedStore<'_> {
    fn get(&self, path: &DataPath) -> Result<Option<String>> {
        if let Some(v) = self.sets.get(path) {
            return Ok(Some(v.clone()));
        }
        if self.pruned(path) {
            return Ok(None);
        }
        self.base.get(path)
    }

    fn children(&self, path: &DataPath) -> Result<Vec<String>> {
        let depth = path.len();
        let mut out = BTreeSet::new();
        if !self.pruned(path) {
            for seg in self.base.children(path)? {
                if self.base_visible(&path.child(seg.as_str()))? {
                    out.insert(seg);
                }
            }
        }
        for (k, _) in self.sets.range(path.clone()..) {
            if !k.starts_with(path) {
                break;
            }
            if let Some(seg) = k.segments().get(depth) {
                out.insert(seg.clone());
            }
        }
        Ok(out.into_iter().collect())
    }

    fn set(&mut self, path: &DataPath, value: &str) -> Result<()> {
        self.sets.insert(path.clone(), value.to_string());
        Ok(())
    }

    fn delete(&mut self, path: &DataPath) -> Result<()> {
        self.sets.retain(|k, _| !k.starts_with(path));
        if !self.pruned(path) {
            self.prunes.push(path.clone());
        }
        Ok(())
    }

    fn exists(&self, path: &DataPath) -> Result<bool> {
        if self.staged_below(path) {
            return Ok(true);
        }
        self.base_visible(path)
    }

    fn resolve_proxy(&self, path: &DataPath) -> Option<&dyn PathAdapter> {
        self.base.resolve_proxy(path)
    }

    fn check_writable(&self, path: &DataPath, subtree: bool) -> Result<()> {
        self.base.check_writable(path, subtree)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::LocalStore;

    fn p(s: &str) -> DataPath {
        DataPath::parse(s).unwrap()
    }

    fn base() -> LocalStore {
        LocalStore::from_pairs([
            (p("/t/a/x"), "1"),
            (p("/t/a/y"), "2"),
            (p("/t/b/z"), "3"),
        ])
    }

    #[test]
    fn test_overlay_hides_pruned_and_shows_sets() {
        let base = base();
        let mut staged = StagedStore::new(&base);
        staged.delete(&p("/t/a")).unwrap();
        staged.set(&p("/t/a/w"), "9").unwrap();

        assert_eq!(staged.get(&p("/t/a/x")).unwrap(), None);
        assert_eq!(staged.get(&p("/t/a/w")).unwrap().as_deref(), Some("9"));
        assert_eq!(staged.children(&p("/t/a")).unwrap(), vec!["w"]);
        assert_eq!(staged.children(&p("/t")).unwrap(), vec!["a", "b"]);
        // Base untouched until commit
        assert_eq!(base.get(&p("/t/a/x")).unwrap().as_deref(), Some("1"));
    }

    #[test]
    fn test_partially_pruned_parent_still_exists() {
        let base = base();
        let mut staged = StagedStore::new(&base);
        staged.delete(&p("/t/a/x")).unwrap();
        assert!(staged.exists(&p("/t/a")).unwrap());
        staged.delete(&p("/t/a/y")).unwrap();
        assert!(!staged.exists(&p("/t/a")).unwrap());
        assert_eq!(staged.children(&p("/t")).unwrap(), vec!["b"]);
    }

    #[test]
    fn test_commit_applies_changes() {
        let mut base = base();
        let changes = {
            let mut staged = StagedStore::new(&base);
            staged.delete(&p("/t/b")).unwrap();
            staged.set(&p("/t/c/v"), "4").unwrap();
            staged.into_changes()
        };
        assert_eq!(changes.len(), 2);
        changes.apply(&mut base).unwrap();
        assert!(!base.exists(&p("/t/b")).unwrap());
        assert_eq!(base.get(&p("/t/c/v")).unwrap().as_deref(), Some("4"));
    }
}
