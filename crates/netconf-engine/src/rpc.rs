//! `<rpc>` parsing
//!
//! The envelope is checked first: a document that is not an `<rpc>` with a
//! `message-id` is a bad RPC. The operation element is then turned into an
//! `RpcOperation`; parameter errors there are ordinary rpc-errors.

use netconf_core::edit::EditOperation;
use netconf_core::errors::{NetconfError, Result};
use netconf_core::ops::Filter;
use netconf_core::session::Datastore;
use netconf_core::subtree::parse_filter;
use netconf_core::xml::{parse_document, XmlElement, NETCONF_BASE_NS};
use netconf_core::WithDefaults;

/// A parsed `<rpc>` envelope
#[derive(Debug, Clone)]
pub struct Request {
    pub message_id: String,
    /// Unqualified `<rpc>` attributes, echoed on the reply
    pub attributes: Vec<(String, String)>,
    pub operation: XmlElement,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RpcOperation {
    Get {
        filter: Filter,
        with_defaults: WithDefaults,
    },
    GetConfig {
        source: Datastore,
        filter: Filter,
        with_defaults: WithDefaults,
    },
    EditConfig {
        target: Datastore,
        default_operation: EditOperation,
        config: XmlElement,
    },
    Lock {
        target: Datastore,
    },
    Unlock {
        target: Datastore,
    },
    KillSession {
        session_id: u32,
    },
    CloseSession,
}

impl RpcOperation {
    /// Element name of the operation
    pub fn name(&self) -> &'static str {
        match self {
            RpcOperation::Get { .. } => "get",
            RpcOperation::GetConfig { .. } => "get-config",
            RpcOperation::EditConfig { .. } => "edit-config",
            RpcOperation::Lock { .. } => "lock",
            RpcOperation::Unlock { .. } => "unlock",
            RpcOperation::KillSession { .. } => "kill-session",
            RpcOperation::CloseSession => "close-session",
        }
    }
}

fn malformed(reason: impl Into<String>) -> NetconfError {
    NetconfError::MalformedMessage {
        reason: reason.into(),
    }
}

fn is_base(el: &XmlElement) -> bool {
    matches!(el.namespace.as_deref(), None | Some(NETCONF_BASE_NS))
}

/// Parse and check the `<rpc>` envelope
///
/// # Errors
/// * `XmlSyntax` - not well-formed
/// * `MalformedMessage` - not an `<rpc>`, or not exactly one operation
/// * `MissingAttribute` - no `message-id`
pub fn parse_request(xml: &str) -> Result<Request> {
    let doc = parse_document(xml)?;
    if doc.name != "rpc" || !is_base(&doc) {
        return Err(malformed(format!("expected <rpc>, found <{}>", doc.name)));
    }
    let message_id = doc
        .attribute("message-id")
        .ok_or_else(|| NetconfError::MissingAttribute {
            element: "rpc".to_string(),
            attribute: "message-id".to_string(),
        })?
        .to_string();
    let attributes = doc
        .attributes
        .iter()
        .filter(|a| a.namespace.is_none())
        .map(|a| (a.name.clone(), a.value.clone()))
        .collect();

    let mut ops = doc.elements();
    let operation = ops
        .next()
        .ok_or_else(|| malformed("<rpc> carries no operation"))?
        .clone();
    if ops.next().is_some() {
        return Err(malformed("<rpc> carries more than one operation"));
    }
    Ok(Request {
        message_id,
        attributes,
        operation,
    })
}

/// Turn the operation element into an `RpcOperation`
///
/// # Errors
/// * `NotSupported` - unknown operation, datastore, filter type or
///   with-defaults mode
/// * `MissingElement` / `MissingAttribute` - required parameters absent
/// * `InvalidValue` - bad `default-operation` or `session-id`
pub fn parse_operation(op: &XmlElement) -> Result<RpcOperation> {
    if !is_base(op) {
        return Err(NetconfError::not_supported(format!(
            "operation <{}> in namespace {}",
            op.name,
            op.namespace.as_deref().unwrap_or_default()
        )));
    }
    match op.name.as_str() {
        "get" => Ok(RpcOperation::Get {
            filter: filter(op)?,
            with_defaults: with_defaults(op)?,
        }),
        "get-config" => Ok(RpcOperation::GetConfig {
            source: datastore(op, "source")?,
            filter: filter(op)?,
            with_defaults: with_defaults(op)?,
        }),
        "edit-config" => {
            let target = datastore(op, "target")?;
            let default_operation = match op.child("default-operation") {
                Some(el) => EditOperation::from_default(&el.text())?,
                None => EditOperation::Merge,
            };
            let config = op
                .child("config")
                .ok_or_else(|| missing_element("config"))?
                .clone();
            Ok(RpcOperation::EditConfig {
                target,
                default_operation,
                config,
            })
        }
        "lock" => Ok(RpcOperation::Lock {
            target: datastore(op, "target")?,
        }),
        "unlock" => Ok(RpcOperation::Unlock {
            target: datastore(op, "target")?,
        }),
        "kill-session" => {
            let el = op
                .child("session-id")
                .ok_or_else(|| missing_element("session-id"))?;
            let text = el.text();
            let session_id = text.parse::<u32>().map_err(|_| {
                NetconfError::invalid_value("session-id", format!("'{}' is not a session id", text))
            })?;
            Ok(RpcOperation::KillSession { session_id })
        }
        "close-session" => Ok(RpcOperation::CloseSession),
        other => Err(NetconfError::not_supported(format!("operation <{}>", other))),
    }
}

fn missing_element(name: &str) -> NetconfError {
    NetconfError::MissingElement {
        element: name.to_string(),
    }
}

/// `<target>`/`<source>` naming one datastore element
fn datastore(op: &XmlElement, wrapper: &str) -> Result<Datastore> {
    let name = op
        .child(wrapper)
        .and_then(|w| w.elements().next())
        .map(|d| d.name.as_str());
    Datastore::from_target(name)
}

fn with_defaults(op: &XmlElement) -> Result<WithDefaults> {
    match op.child("with-defaults") {
        Some(el) => el.text().parse(),
        None => Ok(WithDefaults::Explicit),
    }
}

fn filter(op: &XmlElement) -> Result<Filter> {
    let Some(el) = op.child("filter") else {
        return Ok(Filter::None);
    };
    match el.attribute("type").unwrap_or("subtree") {
        "subtree" => Ok(Filter::Subtree(parse_filter(el)?)),
        "xpath" => {
            let select = el
                .attribute("select")
                .ok_or_else(|| NetconfError::MissingAttribute {
                    element: "filter".to_string(),
                    attribute: "select".to_string(),
                })?;
            Ok(Filter::XPath {
                select: select.to_string(),
                namespaces: el.prefixes.clone(),
            })
        }
        other => Err(NetconfError::not_supported(format!("filter type '{}'", other))),
    }
}
