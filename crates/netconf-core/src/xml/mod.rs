//! Minimal namespace-aware XML
//!
//! NETCONF messages only need elements, attributes, text and namespaces;
//! DTDs and entities beyond the predefined five are not supported.

pub mod parser;
pub mod writer;

pub use parser::{parse_document, parse_fragment};
pub use writer::{escape_attr, escape_text, XmlWriter};

/// The NETCONF base namespace
pub const NETCONF_BASE_NS: &str = "urn:ietf:params:xml:ns:netconf:base:1.0";

/// Namespace of the with-defaults parameter
pub const WITH_DEFAULTS_NS: &str = "urn:ietf:params:xml:ns:yang:ietf-netconf-with-defaults";

/// Element content
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum XmlNode {
    Element(XmlElement),
    Text(String),
}

/// Attribute with its resolved namespace
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlAttribute {
    pub prefix: Option<String>,
    pub name: String,
    /// Prefixed attributes only; unprefixed attributes have no namespace
    pub namespace: Option<String>,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct XmlElement {
    pub prefix: Option<String>,
    pub name: String,
    pub namespace: Option<String>,
    pub attributes: Vec<XmlAttribute>,
    pub children: Vec<XmlNode>,
    /// Prefixed namespace declarations in scope at this element
    pub prefixes: Vec<(String, String)>,
}

impl XmlElement {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push(XmlAttribute {
            prefix: None,
            name: name.into(),
            namespace: None,
            value: value.into(),
        });
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.children.push(XmlNode::Text(text.into()));
        self
    }

    pub fn with_child(mut self, child: XmlElement) -> Self {
        self.children.push(XmlNode::Element(child));
        self
    }

    pub fn push_child(&mut self, child: XmlElement) {
        self.children.push(XmlNode::Element(child));
    }

    pub fn elements(&self) -> impl Iterator<Item = &XmlElement> {
        self.children.iter().filter_map(|c| match c {
            XmlNode::Element(e) => Some(e),
            XmlNode::Text(_) => None,
        })
    }

    /// First child element with this local name
    pub fn child(&self, name: &str) -> Option<&XmlElement> {
        self.elements().find(|e| e.name == name)
    }

    pub fn has_elements(&self) -> bool {
        self.elements().next().is_some()
    }

    /// Concatenated direct text, whitespace-trimmed
    pub fn text(&self) -> String {
        let mut out = String::new();
        for c in &self.children {
            if let XmlNode::Text(t) = c {
                out.push_str(t);
            }
        }
        out.trim().to_string()
    }

    /// Text content, `None` when blank
    pub fn text_value(&self) -> Option<String> {
        let t = self.text();
        if t.is_empty() {
            None
        } else {
            Some(t)
        }
    }

    /// Unqualified attribute value
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.name == name && a.namespace.is_none())
            .map(|a| a.value.as_str())
    }

    /// Attribute in a given namespace
    pub fn attribute_ns(&self, namespace: &str, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.name == name && a.namespace.as_deref() == Some(namespace))
            .map(|a| a.value.as_str())
    }

    /// Namespace bound to `prefix` at this element
    pub fn lookup_prefix(&self, prefix: &str) -> Option<&str> {
        self.prefixes
            .iter()
            .rev()
            .find(|(p, _)| p == prefix)
            .map(|(_, ns)| ns.as_str())
    }
}
