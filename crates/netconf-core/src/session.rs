//! Sessions, the running-datastore lock and RFC 6022 statistics
//!
//! The manager is plain state: callers serialise access to it (the agent
//! sits behind one mutex). Contention is reported at once, never queued.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use netconf_core_types::{Sensitive, SessionId};
use serde::Serialize;

use crate::errors::{NetconfError, Result};

/// Upper bound accepted for `max_sessions`
pub const MAX_SESSIONS_LIMIT: usize = 10;

/// Datastores the agent exposes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Datastore {
    Running,
}

impl Datastore {
    pub fn as_str(&self) -> &'static str {
        match self {
            Datastore::Running => "running",
        }
    }

    /// Datastore named by a `<target>`/`<source>` child, if any
    ///
    /// # Errors
    /// * `NotSupported` - absent, or anything but `running`
    pub fn from_target(name: Option<&str>) -> Result<Self> {
        match name {
            Some(n) => n.parse(),
            None => Err(NetconfError::not_supported("no datastore given")),
        }
    }
}

impl FromStr for Datastore {
    type Err = NetconfError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "running" => Ok(Datastore::Running),
            other => Err(NetconfError::not_supported(format!(
                "datastore \"{}\" not supported",
                other
            ))),
        }
    }
}

impl fmt::Display for Datastore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Who is on the other end of a session
#[derive(Debug, Clone, Default)]
pub struct Peer {
    pub username: Sensitive<String>,
    pub transport: String,
    pub remote_addr: Option<String>,
    pub remote_port: Option<u16>,
}

impl Peer {
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: Sensitive::new(username.into()),
            transport: "netconf-ssh".to_string(),
            remote_addr: None,
            remote_port: None,
        }
    }

    pub fn with_remote(mut self, addr: impl Into<String>, port: u16) -> Self {
        self.remote_addr = Some(addr.into());
        self.remote_port = Some(port);
        self
    }

    pub fn with_transport(mut self, transport: impl Into<String>) -> Self {
        self.transport = transport.into();
        self
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Counters {
    pub in_rpcs: u64,
    pub in_bad_rpcs: u64,
    pub out_rpc_errors: u64,
    pub out_notifications: u64,
}

impl Counters {
    fn add(&mut self, other: &Counters) {
        self.in_rpcs += other.in_rpcs;
        self.in_bad_rpcs += other.in_bad_rpcs;
        self.out_rpc_errors += other.out_rpc_errors;
        self.out_notifications += other.out_notifications;
    }
}

/// How an RPC ended, for the counters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RpcOutcome {
    Ok,
    /// The request could not be parsed at all
    Bad,
    /// An rpc-error was sent
    Error,
}

#[derive(Debug, Clone)]
pub struct Session {
    pub id: SessionId,
    pub peer: Peer,
    pub login_time: DateTime<Utc>,
    pub counters: Counters,
}

/// Agent-wide statistics (`/netconf-state/statistics`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Statistics {
    pub netconf_start_time: DateTime<Utc>,
    pub in_bad_hellos: u64,
    pub in_sessions: u64,
    pub dropped_sessions: u64,
    /// Totals across every session, closed ones included
    pub session_totals: Counters,
}

#[derive(Debug)]
pub struct SessionManager {
    sessions: BTreeMap<SessionId, Session>,
    next_id: u32,
    max_sessions: usize,
    running_lock: Option<SessionId>,
    stats: Statistics,
}

impl SessionManager {
    pub fn new(max_sessions: usize) -> Self {
        Self {
            sessions: BTreeMap::new(),
            next_id: 1,
            max_sessions,
            running_lock: None,
            stats: Statistics {
                netconf_start_time: Utc::now(),
                in_bad_hellos: 0,
                in_sessions: 0,
                dropped_sessions: 0,
                session_totals: Counters::default(),
            },
        }
    }

    pub fn max_sessions(&self) -> usize {
        self.max_sessions
    }

    /// Change the limit; sessions already open are kept
    pub fn set_max_sessions(&mut self, max_sessions: usize) {
        self.max_sessions = max_sessions;
    }

    /// Register a new session
    ///
    /// # Errors
    /// * `SessionLimit` - `max_sessions` already open; counted as dropped
    pub fn open(&mut self, peer: Peer) -> Result<SessionId> {
        if self.sessions.len() >= self.max_sessions {
            self.stats.dropped_sessions += 1;
            return Err(NetconfError::SessionLimit {
                max: self.max_sessions,
            });
        }
        let id = self.allocate_id();
        self.sessions.insert(
            id,
            Session {
                id,
                peer,
                login_time: Utc::now(),
                counters: Counters::default(),
            },
        );
        self.stats.in_sessions += 1;
        tracing::debug!(component = "session", session_id = id.get(), "session opened");
        Ok(id)
    }

    fn allocate_id(&mut self) -> SessionId {
        loop {
            let raw = self.next_id;
            self.next_id = self.next_id.wrapping_add(1);
            if let Some(id) = SessionId::new(raw) {
                if !self.sessions.contains_key(&id) {
                    return id;
                }
            }
        }
    }

    /// Remove a session, releasing its locks
    ///
    /// # Errors
    /// * `InvalidSession` - no such session
    pub fn close(&mut self, id: SessionId) -> Result<Session> {
        let session = self
            .sessions
            .remove(&id)
            .ok_or(NetconfError::InvalidSession {
                session_id: id.get(),
            })?;
        if self.running_lock == Some(id) {
            self.running_lock = None;
            tracing::debug!(component = "session", session_id = id.get(), "lock released on close");
        }
        tracing::debug!(component = "session", session_id = id.get(), "session closed");
        Ok(session)
    }

    pub fn session(&self, id: SessionId) -> Option<&Session> {
        self.sessions.get(&id)
    }

    pub fn sessions(&self) -> impl Iterator<Item = &Session> {
        self.sessions.values()
    }

    pub fn is_open(&self, id: SessionId) -> bool {
        self.sessions.contains_key(&id)
    }

    /// Current holder of the lock on `datastore`
    pub fn lock_holder(&self, datastore: Datastore) -> Option<SessionId> {
        match datastore {
            Datastore::Running => self.running_lock,
        }
    }

    /// # Errors
    /// * `InvalidSession` - `id` is not open
    /// * `LockDenied` - already held, by anyone including `id`
    pub fn lock(&mut self, id: SessionId, datastore: Datastore) -> Result<()> {
        self.require_open(id)?;
        if let Some(holder) = self.lock_holder(datastore) {
            return Err(NetconfError::LockDenied { holder });
        }
        match datastore {
            Datastore::Running => self.running_lock = Some(id),
        }
        Ok(())
    }

    /// # Errors
    /// * `InvalidSession` - `id` is not open
    /// * `OperationFailed` - not locked, or locked by another session
    pub fn unlock(&mut self, id: SessionId, datastore: Datastore) -> Result<()> {
        self.require_open(id)?;
        match self.lock_holder(datastore) {
            None => Err(NetconfError::OperationFailed {
                reason: format!("no lock held on the \"{}\" datastore", datastore),
            }),
            Some(holder) if holder != id => Err(NetconfError::OperationFailed {
                reason: format!("session {} does not own the lock", id),
            }),
            Some(_) => {
                match datastore {
                    Datastore::Running => self.running_lock = None,
                }
                Ok(())
            }
        }
    }

    /// Whether `id` may read or write `datastore` now
    ///
    /// # Errors
    /// * `InUse` - another session holds the lock
    pub fn check_access(&self, id: SessionId, datastore: Datastore) -> Result<()> {
        match self.lock_holder(datastore) {
            Some(holder) if holder != id => Err(NetconfError::InUse { holder }),
            _ => Ok(()),
        }
    }

    /// Terminate session `target` on behalf of `by`
    ///
    /// # Errors
    /// * `InvalidSession` - `target` is zero or not open
    /// * `SelfKill` - `target` is `by`
    pub fn kill(&mut self, by: SessionId, target: u32) -> Result<Session> {
        let Some(target_id) = SessionId::new(target) else {
            return Err(NetconfError::InvalidSession { session_id: target });
        };
        if target_id == by {
            return Err(NetconfError::SelfKill);
        }
        self.close(target_id)
    }

    /// Count one RPC handled on `id`
    pub fn record(&mut self, id: SessionId, outcome: RpcOutcome) {
        let mut delta = Counters::default();
        match outcome {
            RpcOutcome::Ok => delta.in_rpcs = 1,
            RpcOutcome::Bad => delta.in_bad_rpcs = 1,
            RpcOutcome::Error => {
                delta.in_rpcs = 1;
                delta.out_rpc_errors = 1;
            }
        }
        if let Some(s) = self.sessions.get_mut(&id) {
            s.counters.add(&delta);
        }
        self.stats.session_totals.add(&delta);
    }

    pub fn record_bad_hello(&mut self) {
        self.stats.in_bad_hellos += 1;
    }

    pub fn statistics(&self) -> &Statistics {
        &self.stats
    }

    fn require_open(&self, id: SessionId) -> Result<()> {
        if self.is_open(id) {
            Ok(())
        } else {
            Err(NetconfError::InvalidSession {
                session_id: id.get(),
            })
        }
    }
}

impl Default for SessionManager {
    fn default() -> Self {
        Self::new(4)
    }
}
