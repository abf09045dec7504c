//! Correlation identifiers
//!
//! A `SessionId` names a NETCONF session for its whole lifetime; a `RequestId`
//! tags a single RPC so that its log lines can be grouped.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// NETCONF session identifier (RFC 6241 `session-id`, never zero)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SessionId(u32);

impl SessionId {
    /// Wrap a raw session number
    ///
    /// Returns `None` for zero, which RFC 6241 reserves.
    pub fn new(raw: u32) -> Option<Self> {
        if raw == 0 {
            None
        } else {
            Some(Self(raw))
        }
    }

    /// The raw session number
    pub fn get(self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for one RPC invocation
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RequestId(String);

impl RequestId {
    /// Generate a fresh time-ordered id (UUIDv7)
    pub fn new() -> Self {
        Self(Uuid::now_v7().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Rebuild from a stored string
    pub fn from_string(s: String) -> Self {
        Self(s)
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Context threaded through one RPC
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub request_id: RequestId,
    pub session_id: SessionId,
    /// `message-id` attribute of the incoming `<rpc>`, echoed in the reply
    pub message_id: Option<String>,
}

impl RequestContext {
    /// Start a context for an RPC arriving on `session_id`
    pub fn new(session_id: SessionId) -> Self {
        Self {
            request_id: RequestId::new(),
            session_id,
            message_id: None,
        }
    }

    pub fn with_message_id(mut self, message_id: impl Into<String>) -> Self {
        self.message_id = Some(message_id.into());
        self
    }
}
