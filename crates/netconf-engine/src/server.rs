//! Server and per-session handles
//!
//! The agent (schema, store, sessions) sits behind one mutex. Each RPC
//! holds it from dispatch to commit, so no reader ever sees an edit
//! half-applied.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard};

use netconf_core::errors::{NcError, NetconfError, Result};
use netconf_core::ops::NetconfAgent;
use netconf_core::session::{Peer, RpcOutcome, Statistics};
use netconf_core::types::{RequestContext, SessionId};

use crate::audit::{AuditLog, AuditRecord};
use crate::config::ServerConfig;
use crate::dispatch::dispatch;
use crate::reply::{render, Reply};
use crate::rpc::{parse_operation, parse_request, Request};

struct Shared {
    agent: Mutex<NetconfAgent>,
    audit: AuditLog,
    config: ServerConfig,
}

impl Shared {
    fn agent(&self) -> Result<MutexGuard<'_, NetconfAgent>> {
        self.agent.lock().map_err(|_| NetconfError::OperationFailed {
            reason: "agent state poisoned by an earlier panic".to_string(),
        })
    }
}

/// A NETCONF server over one agent
#[derive(Clone)]
pub struct Server {
    shared: Arc<Shared>,
}

impl std::fmt::Debug for Server {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Server")
            .field("config", &self.shared.config)
            .finish_non_exhaustive()
    }
}

impl Server {
    /// Serve `agent` with the limits and audit options of `config`
    ///
    /// An unreadable audit options file leaves auditing off.
    pub fn new(config: ServerConfig, mut agent: NetconfAgent) -> Self {
        agent.sessions_mut().set_max_sessions(config.max_sessions);
        let flags = config.audit_flags().unwrap_or_else(|e| {
            tracing::warn!(component = "server", error = %e, "audit options unavailable");
            Default::default()
        });
        let mut audit = AuditLog::new(flags);
        if let Some(path) = &config.audit_file {
            audit = audit.with_file(path);
        }
        tracing::info!(
            component = "server",
            max_sessions = config.max_sessions,
            "server ready"
        );
        Self {
            shared: Arc::new(Shared {
                agent: Mutex::new(agent),
                audit,
                config,
            }),
        }
    }

    /// Load the seed named by `config` and serve it
    ///
    /// # Errors
    /// * `Config` - no seed configured, or the seed is invalid
    pub fn from_config(config: ServerConfig) -> Result<Self> {
        let path = config.seed.clone().ok_or_else(|| NetconfError::Config {
            origin: "server".to_string(),
            reason: "no seed file configured".to_string(),
        })?;
        let seeded = netconf_store::load_seed_file(&path)?;
        let agent = seeded.into_agent(config.max_sessions);
        Ok(Self::new(config, agent))
    }

    pub fn config(&self) -> &ServerConfig {
        &self.shared.config
    }

    pub fn audit(&self) -> &AuditLog {
        &self.shared.audit
    }

    /// Start a session for `username`
    ///
    /// # Errors
    /// * `SessionLimit` - `max_sessions` already open
    pub fn open_session(&self, username: &str, remote: Option<SocketAddr>) -> Result<SessionHandle> {
        let mut peer = Peer::new(username);
        if let Some(addr) = remote {
            peer = peer.with_remote(addr.ip().to_string(), addr.port());
        }
        let id = self.shared.agent()?.sessions_mut().open(peer)?;
        tracing::info!(component = "server", session_id = id.get(), "session started");
        Ok(SessionHandle {
            id,
            shared: Arc::clone(&self.shared),
        })
    }

    /// Snapshot of the agent-wide statistics
    ///
    /// # Errors
    /// * `OperationFailed` - the agent state is poisoned
    pub fn statistics(&self) -> Result<Statistics> {
        Ok(self.shared.agent()?.sessions().statistics().clone())
    }

    /// Run `f` with the agent locked
    ///
    /// # Errors
    /// * `OperationFailed` - the agent state is poisoned
    pub fn with_agent<T>(&self, f: impl FnOnce(&mut NetconfAgent) -> T) -> Result<T> {
        let mut agent = self.shared.agent()?;
        Ok(f(&mut agent))
    }
}

/// One client session; dropping it ends the session
pub struct SessionHandle {
    id: SessionId,
    shared: Arc<Shared>,
}

impl std::fmt::Debug for SessionHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionHandle").field("id", &self.id).finish()
    }
}

impl SessionHandle {
    pub fn id(&self) -> SessionId {
        self.id
    }

    /// Whether the session is still open (not closed or killed)
    pub fn is_open(&self) -> bool {
        self.shared
            .agent()
            .map(|a| a.sessions().is_open(self.id))
            .unwrap_or(false)
    }

    /// Handle one `<rpc>` document and return the serialized `<rpc-reply>`
    pub fn handle(&self, rpc_xml: &str) -> String {
        let request = match parse_request(rpc_xml) {
            Ok(r) => r,
            Err(err) => return self.reject(err),
        };
        let ctx = RequestContext::new(self.id).with_message_id(request.message_id.as_str());
        let reply = match self.shared.agent() {
            Ok(mut agent) => self.run(&mut agent, &ctx, &request),
            Err(err) => Reply::Error(err.into()),
        };
        render(&request.attributes, &reply)
    }

    /// Reply to a document that is not a usable `<rpc>`
    fn reject(&self, err: NetconfError) -> String {
        tracing::debug!(component = "server", session_id = self.id.get(), error = %err, "bad rpc");
        if let Ok(mut agent) = self.shared.agent() {
            agent.sessions_mut().record(self.id, RpcOutcome::Bad);
        }
        render(&[], &Reply::Error(err.into()))
    }

    fn run(&self, agent: &mut NetconfAgent, ctx: &RequestContext, request: &Request) -> Reply {
        let peer = agent
            .sessions()
            .session(self.id)
            .map(|s| s.peer.clone())
            .unwrap_or_default();

        let result = parse_operation(&request.operation).and_then(|op| dispatch(agent, ctx, &op));
        let (reply, effects) = match result {
            Ok((reply, effects)) => {
                agent.sessions_mut().record(self.id, RpcOutcome::Ok);
                (reply, effects)
            }
            Err(err) => {
                agent.sessions_mut().record(self.id, RpcOutcome::Error);
                (Reply::Error(NcError::from(err)), Default::default())
            }
        };

        let outcome = match &reply {
            Reply::Error(e) => Err(e),
            _ => Ok(()),
        };
        self.shared.audit.record(&AuditRecord {
            op: request.operation.name.as_str(),
            session_id: self.id,
            peer: &peer,
            outcome,
            target_session: effects.killed,
        });
        if effects.closed {
            tracing::info!(component = "server", session_id = self.id.get(), "session closed by client");
        }
        reply
    }
}

impl Drop for SessionHandle {
    fn drop(&mut self) {
        let Ok(mut agent) = self.shared.agent() else {
            return;
        };
        if agent.sessions().is_open(self.id) && agent.sessions_mut().close(self.id).is_ok() {
            tracing::info!(component = "server", session_id = self.id.get(), "session torn down");
        }
    }
}
