//! Audit log
//!
//! Which RPCs are audited comes from an options line such as
//! `edit-config get lock`. Only the first line of an options file is read
//! and unknown words are ignored. Records go to the `netconf::audit`
//! tracing target.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use netconf_core::errors::{NcError, NetconfError, Result};
use netconf_core::session::Peer;
use netconf_core::types::schema::{AUDIT_TARGET, EVENT_AUDIT};
use netconf_core::types::SessionId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum AuditedOp {
    EditConfig,
    Get,
    GetConfig,
    KillSession,
    Lock,
    Unlock,
}

impl AuditedOp {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "edit-config" => Some(AuditedOp::EditConfig),
            "get" => Some(AuditedOp::Get),
            "get-config" => Some(AuditedOp::GetConfig),
            "kill-session" => Some(AuditedOp::KillSession),
            "lock" => Some(AuditedOp::Lock),
            "unlock" => Some(AuditedOp::Unlock),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AuditedOp::EditConfig => "edit-config",
            AuditedOp::Get => "get",
            AuditedOp::GetConfig => "get-config",
            AuditedOp::KillSession => "kill-session",
            AuditedOp::Lock => "lock",
            AuditedOp::Unlock => "unlock",
        }
    }
}

/// The set of audited operations
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuditFlags {
    ops: BTreeSet<AuditedOp>,
}

impl AuditFlags {
    /// Parse the first line of an options text
    pub fn parse(text: &str) -> Self {
        let line = text.lines().next().unwrap_or_default();
        let mut ops = BTreeSet::new();
        for word in line.split_whitespace() {
            match AuditedOp::from_name(word) {
                Some(op) => {
                    ops.insert(op);
                }
                None => tracing::debug!(component = "audit", word, "ignoring unknown audit option"),
            }
        }
        Self { ops }
    }

    /// # Errors
    /// * `Config` - the file cannot be read
    pub fn load_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|e| NetconfError::Config {
            origin: path.display().to_string(),
            reason: format!("failed to read audit options: {}", e),
        })?;
        Ok(Self::parse(&text))
    }

    pub fn with(mut self, op: AuditedOp) -> Self {
        self.ops.insert(op);
        self
    }

    /// Whether the RPC named `op` (`get-config`, `lock`, ...) is audited
    pub fn audits(&self, op: &str) -> bool {
        AuditedOp::from_name(op).is_some_and(|o| self.ops.contains(&o))
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = AuditedOp> + '_ {
        self.ops.iter().copied()
    }
}

/// One audited RPC
#[derive(Debug)]
pub struct AuditRecord<'a> {
    pub op: &'a str,
    pub session_id: SessionId,
    pub peer: &'a Peer,
    pub outcome: std::result::Result<(), &'a NcError>,
    /// Session named by `kill-session`
    pub target_session: Option<u32>,
}

/// Runtime-reloadable audit flags plus the record sink
#[derive(Debug, Default)]
pub struct AuditLog {
    flags: RwLock<AuditFlags>,
    file: Option<PathBuf>,
}

impl AuditLog {
    pub fn new(flags: AuditFlags) -> Self {
        Self {
            flags: RwLock::new(flags),
            file: None,
        }
    }

    /// Flags that `reload` re-reads from `path`
    pub fn with_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.file = Some(path.into());
        self
    }

    pub fn flags(&self) -> AuditFlags {
        self.flags.read().map(|f| f.clone()).unwrap_or_default()
    }

    pub fn set_flags(&self, flags: AuditFlags) {
        if let Ok(mut current) = self.flags.write() {
            *current = flags;
        }
    }

    /// Re-read the options file
    ///
    /// An unreadable file turns auditing off.
    ///
    /// # Errors
    /// * `Config` - no file configured, or the file cannot be read
    pub fn reload(&self) -> Result<()> {
        let Some(path) = &self.file else {
            return Err(NetconfError::Config {
                origin: "audit".to_string(),
                reason: "no audit options file configured".to_string(),
            });
        };
        match AuditFlags::load_file(path) {
            Ok(flags) => {
                tracing::info!(component = "audit", enabled = flags.ops.len(), "audit options reloaded");
                self.set_flags(flags);
                Ok(())
            }
            Err(e) => {
                self.set_flags(AuditFlags::default());
                Err(e)
            }
        }
    }

    /// Emit `record` if its operation is audited
    pub fn record(&self, record: &AuditRecord<'_>) {
        if !self.flags().audits(record.op) {
            return;
        }
        let remote = match (&record.peer.remote_addr, record.peer.remote_port) {
            (Some(addr), Some(port)) => format!("{}:{}", addr, port),
            (Some(addr), None) => addr.clone(),
            _ => "-".to_string(),
        };
        let outcome = match record.outcome {
            Ok(()) => "ok",
            Err(e) => e.tag().as_str(),
        };
        tracing::info!(
            target: AUDIT_TARGET,
            event = EVENT_AUDIT,
            op = record.op,
            session_id = record.session_id.get(),
            username = %record.peer.username,
            remote = remote.as_str(),
            outcome,
            target_session = record.target_session,
        );
    }
}
