//! Proxy adapter
//!
//! `RemoteAdapter` turns every store call into a `RemoteRequest` and hands
//! it to a `RemoteEndpoint`. Requests and responses are serde types so an
//! endpoint can put them on any wire; `LoopbackEndpoint` encodes them as
//! JSON and serves them from an in-process `LocalStore`.

use std::sync::Mutex;

use serde::{Deserialize, Serialize};

use crate::adapter::{LocalStore, PathAdapter};
use crate::errors::{NetconfError, Result};
use crate::model::DataPath;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "kebab-case")]
pub enum RemoteRequest {
    Get { path: DataPath },
    Children { path: DataPath },
    Set { path: DataPath, value: String },
    Delete { path: DataPath },
    Exists { path: DataPath },
}

impl RemoteRequest {
    pub fn op(&self) -> &'static str {
        match self {
            RemoteRequest::Get { .. } => "get",
            RemoteRequest::Children { .. } => "children",
            RemoteRequest::Set { .. } => "set",
            RemoteRequest::Delete { .. } => "delete",
            RemoteRequest::Exists { .. } => "exists",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "body", rename_all = "kebab-case")]
pub enum RemoteResponse {
    Value(Option<String>),
    Children(Vec<String>),
    Exists(bool),
    Done,
    Error(String),
}

/// The transport seam to a remote store
pub trait RemoteEndpoint: Send + Sync {
    /// # Errors
    /// * `Remote` - the request could not be delivered or answered
    fn call(&self, request: RemoteRequest) -> Result<RemoteResponse>;
}

pub struct RemoteAdapter {
    endpoint: Box<dyn RemoteEndpoint>,
    read_only: bool,
}

impl RemoteAdapter {
    pub fn new(endpoint: Box<dyn RemoteEndpoint>) -> Self {
        Self {
            endpoint,
            read_only: false,
        }
    }

    /// Reject every write through this adapter
    pub fn read_only(mut self) -> Self {
        self.read_only = true;
        self
    }

    fn call(&self, request: RemoteRequest) -> Result<RemoteResponse> {
        let op = request.op();
        tracing::trace!(component = "remote", op, "proxy call");
        match self.endpoint.call(request)? {
            RemoteResponse::Error(reason) => {
                tracing::debug!(component = "remote", op, %reason, "proxy call failed");
                Err(NetconfError::Remote { reason })
            }
            resp => Ok(resp),
        }
    }

    fn reject_write(&self, path: &DataPath) -> Result<()> {
        if self.read_only {
            return Err(NetconfError::ProxyReadOnly {
                mount: path.to_string(),
            });
        }
        Ok(())
    }
}

fn unexpected(resp: RemoteResponse) -> NetconfError {
    NetconfError::Remote {
        reason: format!("unexpected response {:?}", resp),
    }
}

impl PathAdapter for RemoteAdapter {
    fn get(&self, path: &DataPath) -> Result<Option<String>> {
        match self.call(RemoteRequest::Get { path: path.clone() })? {
            RemoteResponse::Value(v) => Ok(v),
            other => Err(unexpected(other)),
        }
    }

    fn children(&self, path: &DataPath) -> Result<Vec<String>> {
        match self.call(RemoteRequest::Children { path: path.clone() })? {
            RemoteResponse::Children(c) => Ok(c),
            other => Err(unexpected(other)),
        }
    }

    fn set(&mut self, path: &DataPath, value: &str) -> Result<()> {
        self.reject_write(path)?;
        match self.call(RemoteRequest::Set {
            path: path.clone(),
            value: value.to_string(),
        })? {
            RemoteResponse::Done => Ok(()),
            other => Err(unexpected(other)),
        }
    }

    fn delete(&mut self, path: &DataPath) -> Result<()> {
        self.reject_write(path)?;
        match self.call(RemoteRequest::Delete { path: path.clone() })? {
            RemoteResponse::Done => Ok(()),
            other => Err(unexpected(other)),
        }
    }

    fn exists(&self, path: &DataPath) -> Result<bool> {
        match self.call(RemoteRequest::Exists { path: path.clone() })? {
            RemoteResponse::Exists(e) => Ok(e),
            other => Err(unexpected(other)),
        }
    }

    fn is_read_only(&self) -> bool {
        self.read_only
    }
}

/// Serves requests from an in-process store, through a JSON round trip
#[derive(Debug, Default)]
pub struct LoopbackEndpoint {
    store: Mutex<LocalStore>,
}

impl LoopbackEndpoint {
    pub fn new(store: LocalStore) -> Self {
        Self {
            store: Mutex::new(store),
        }
    }

    fn serve(store: &mut LocalStore, request: RemoteRequest) -> RemoteResponse {
        let outcome = match request {
            RemoteRequest::Get { path } => store.get(&path).map(RemoteResponse::Value),
            RemoteRequest::Children { path } => store.children(&path).map(RemoteResponse::Children),
            RemoteRequest::Set { path, value } => {
                store.set(&path, &value).map(|_| RemoteResponse::Done)
            }
            RemoteRequest::Delete { path } => store.delete(&path).map(|_| RemoteResponse::Done),
            RemoteRequest::Exists { path } => store.exists(&path).map(RemoteResponse::Exists),
        };
        outcome.unwrap_or_else(|e| RemoteResponse::Error(e.to_string()))
    }
}

fn wire_error(e: serde_json::Error) -> NetconfError {
    NetconfError::Remote {
        reason: format!("wire encoding: {}", e),
    }
}

impl RemoteEndpoint for LoopbackEndpoint {
    fn call(&self, request: RemoteRequest) -> Result<RemoteResponse> {
        let wire = serde_json::to_string(&request).map_err(wire_error)?;
        let request: RemoteRequest = serde_json::from_str(&wire).map_err(wire_error)?;
        let response = {
            let mut store = self.store.lock().map_err(|_| NetconfError::Remote {
                reason: "remote store lock poisoned".to_string(),
            })?;
            Self::serve(&mut store, request)
        };
        let wire = serde_json::to_string(&response).map_err(wire_error)?;
        serde_json::from_str(&wire).map_err(wire_error)
    }
}
