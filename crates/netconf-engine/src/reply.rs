//! `<rpc-reply>` rendering

use netconf_core::errors::NcError;
use netconf_core::xml::{XmlElement, XmlWriter, NETCONF_BASE_NS};
use netconf_core::ResultTree;

/// Body of a reply
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    Ok,
    Data(ResultTree),
    Error(NcError),
}

fn base(name: &str) -> XmlElement {
    XmlElement::new(name).with_namespace(NETCONF_BASE_NS)
}

fn text(name: &str, value: impl Into<String>) -> XmlElement {
    base(name).with_text(value)
}

/// The `<rpc-error>` element of `err`
pub fn rpc_error(err: &NcError) -> XmlElement {
    let mut el = base("rpc-error")
        .with_child(text("error-type", err.error_type().as_str()))
        .with_child(text("error-tag", err.tag().as_str()))
        .with_child(text("error-severity", err.severity()));
    if let Some(path) = err.path() {
        el.push_child(text("error-path", path));
    }
    if !err.message().is_empty() {
        el.push_child(text("error-message", err.message()));
    }
    if err.has_info() {
        let mut info = base("error-info");
        if let Some(attr) = err.bad_attribute() {
            info.push_child(text("bad-attribute", attr));
        }
        if let Some(elem) = err.bad_element() {
            info.push_child(text("bad-element", elem));
        }
        if let Some(sid) = err.session_id() {
            info.push_child(text("session-id", sid.to_string()));
        }
        el.push_child(info);
    }
    el
}

/// Serialize a reply, echoing the request's `<rpc>` attributes
pub fn render(attributes: &[(String, String)], reply: &Reply) -> String {
    let mut el = base("rpc-reply");
    for (name, value) in attributes {
        el = el.with_attribute(name, value);
    }
    match reply {
        Reply::Ok => el.push_child(base("ok")),
        Reply::Data(tree) => el.push_child(tree.to_data_element()),
        Reply::Error(err) => el.push_child(rpc_error(err)),
    }
    XmlWriter::compact().write(&el)
}
