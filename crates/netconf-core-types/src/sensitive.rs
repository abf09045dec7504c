//! Redacting wrapper for identity data
//!
//! Usernames and peer addresses appear in audit records and session
//! tables. Wrapping them in `Sensitive` keeps them out of `Debug`/`Display`
//! output unless the caller explicitly asks for the value.

use std::fmt;

const REDACTED: &str = "***REDACTED***";

/// Value that prints as `***REDACTED***`
///
/// ```
/// use netconf_core_types::Sensitive;
///
/// let user = Sensitive::new("admin".to_string());
/// assert_eq!(format!("{}", user), "***REDACTED***");
/// assert_eq!(user.expose(), "admin");
/// ```
#[derive(Clone, PartialEq, Eq, Default)]
pub struct Sensitive<T>(T);

impl<T> Sensitive<T> {
    pub fn new(value: T) -> Self {
        Self(value)
    }

    /// Borrow the real value
    pub fn expose(&self) -> &T {
        &self.0
    }

    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> From<T> for Sensitive<T> {
    fn from(value: T) -> Self {
        Self(value)
    }
}

impl<T> fmt::Debug for Sensitive<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(REDACTED)
    }
}

impl<T> fmt::Display for Sensitive<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(REDACTED)
    }
}
