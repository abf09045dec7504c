//! Store addressing
//!
//! A `DataPath` is the ordered list of segments the path store is keyed by:
//! `/test/animals/animal/cat/name`. List-entry and leaf-list-entry segments
//! hold the escaped instance key; top-level nodes of a non-default module
//! are written `prefix:name`.

use crate::errors::{NetconfError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Separator between the values of a multi-key list entry
pub const KEY_SEPARATOR: char = ',';

#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DataPath {
    segments: Vec<String>,
}

impl DataPath {
    /// The store root (no segments)
    pub fn root() -> Self {
        Self::default()
    }

    pub fn from_segments<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            segments: segments.into_iter().map(Into::into).collect(),
        }
    }

    /// Parse the `/a/b/c` text form
    ///
    /// Segments are taken verbatim: key segments must already be escaped.
    ///
    /// # Errors
    /// * `InvalidPath` - missing leading `/` or an empty segment
    pub fn parse(text: &str) -> Result<Self> {
        if text == "/" {
            return Ok(Self::root());
        }
        let rest = text.strip_prefix('/').ok_or_else(|| NetconfError::InvalidPath {
            path: text.to_string(),
            reason: "path must start with '/'".to_string(),
        })?;
        let mut segments = Vec::new();
        for seg in rest.split('/') {
            if seg.is_empty() {
                return Err(NetconfError::InvalidPath {
                    path: text.to_string(),
                    reason: "empty path segment".to_string(),
                });
            }
            segments.push(seg.to_string());
        }
        Ok(Self { segments })
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn last(&self) -> Option<&str> {
        self.segments.last().map(String::as_str)
    }

    /// New path with `segment` appended
    pub fn child(&self, segment: impl Into<String>) -> Self {
        let mut segments = self.segments.clone();
        segments.push(segment.into());
        Self { segments }
    }

    /// New path without the last segment (`None` at the root)
    pub fn parent(&self) -> Option<Self> {
        if self.segments.is_empty() {
            return None;
        }
        let mut segments = self.segments.clone();
        segments.pop();
        Some(Self { segments })
    }

    pub fn starts_with(&self, prefix: &DataPath) -> bool {
        self.segments.starts_with(&prefix.segments)
    }

    /// Remainder after `prefix`, if `self` lies under it
    pub fn strip_prefix(&self, prefix: &DataPath) -> Option<Self> {
        self.segments
            .strip_prefix(prefix.segments.as_slice())
            .map(|rest| Self {
                segments: rest.to_vec(),
            })
    }

    /// `self` followed by all segments of `suffix`
    pub fn join(&self, suffix: &DataPath) -> Self {
        let mut segments = self.segments.clone();
        segments.extend(suffix.segments.iter().cloned());
        Self { segments }
    }
}

impl fmt::Display for DataPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.segments.is_empty() {
            return f.write_str("/");
        }
        for seg in &self.segments {
            write!(f, "/{}", seg)?;
        }
        Ok(())
    }
}

/// Escape one key value so it can be used as a single path segment
///
/// `%`, `/`, `:` and `,` are percent-encoded.
pub fn escape_key(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '%' => out.push_str("%25"),
            '/' => out.push_str("%2F"),
            ':' => out.push_str("%3A"),
            ',' => out.push_str("%2C"),
            other => out.push(other),
        }
    }
    out
}

/// Inverse of `escape_key`
///
/// Unknown or truncated escapes are kept literally.
pub fn unescape_key(segment: &str) -> String {
    let mut out = String::with_capacity(segment.len());
    let mut rest = segment;
    while let Some(idx) = rest.find('%') {
        out.push_str(&rest[..idx]);
        let code = rest.get(idx + 1..idx + 3);
        let decoded = match code {
            Some("25") => Some('%'),
            Some("2F") | Some("2f") => Some('/'),
            Some("3A") | Some("3a") => Some(':'),
            Some("2C") | Some("2c") => Some(','),
            _ => None,
        };
        match decoded {
            Some(c) => {
                out.push(c);
                rest = &rest[idx + 3..];
            }
            None => {
                out.push('%');
                rest = &rest[idx + 1..];
            }
        }
    }
    out.push_str(rest);
    out
}

/// Entry segment for a list instance with the given key values (in key order)
pub fn entry_segment<S: AsRef<str>>(key_values: &[S]) -> String {
    key_values
        .iter()
        .map(|v| escape_key(v.as_ref()))
        .collect::<Vec<_>>()
        .join(&KEY_SEPARATOR.to_string())
}

/// Split an entry segment back into its unescaped key values
pub fn entry_keys(segment: &str) -> Vec<String> {
    segment.split(KEY_SEPARATOR).map(unescape_key).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_parse_and_display() {
        let p = DataPath::parse("/test/animals/animal/cat/name").unwrap();
        assert_eq!(p.len(), 5);
        assert_eq!(p.last(), Some("name"));
        assert_eq!(p.to_string(), "/test/animals/animal/cat/name");
        assert_eq!(DataPath::parse("/").unwrap(), DataPath::root());
    }

    #[test]
    fn test_parse_rejects_relative_and_empty_segments() {
        assert!(matches!(
            DataPath::parse("test/x"),
            Err(NetconfError::InvalidPath { .. })
        ));
        assert!(matches!(
            DataPath::parse("/test//x"),
            Err(NetconfError::InvalidPath { .. })
        ));
    }

    #[test]
    fn test_prefix_operations() {
        let base = DataPath::parse("/test/animals").unwrap();
        let full = DataPath::parse("/test/animals/animal/dog").unwrap();
        assert!(full.starts_with(&base));
        let rest = full.strip_prefix(&base).unwrap();
        assert_eq!(rest.to_string(), "/animal/dog");
        assert_eq!(base.join(&rest), full);
        assert_eq!(full.parent().unwrap().last(), Some("animal"));
        assert!(DataPath::root().parent().is_none());
    }

    #[test]
    fn test_escape_reserved_characters() {
        assert_eq!(escape_key("cat:ty"), "cat%3Aty");
        assert_eq!(escape_key("flash:/x.cfg"), "flash%3A%2Fx.cfg");
        assert_eq!(escape_key("50%"), "50%25");
        assert_eq!(unescape_key("cat%3Aty"), "cat:ty");
    }

    #[test]
    fn test_unescape_keeps_unknown_sequences() {
        assert_eq!(unescape_key("a%zzb"), "a%zzb");
        assert_eq!(unescape_key("tail%"), "tail%");
    }

    #[test]
    fn test_multi_key_segment() {
        let seg = entry_segment(&["eth0", "10,20"]);
        assert_eq!(seg, "eth0,10%2C20");
        assert_eq!(entry_keys(&seg), vec!["eth0".to_string(), "10,20".to_string()]);
    }

    proptest! {
        #[test]
        fn prop_escape_round_trips(value in ".*") {
            let escaped = escape_key(&value);
            prop_assert!(!escaped.contains('/'));
            prop_assert!(!escaped.contains(':'));
            prop_assert!(!escaped.contains(','));
            prop_assert_eq!(unescape_key(&escaped), value);
        }
    }
}
