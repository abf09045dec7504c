//! XML serialisation
//!
//! Namespaces are written as default-namespace declarations wherever an
//! element's namespace differs from its parent's. Namespaced attributes get
//! a prefix declaration on the element carrying them.

use super::{XmlElement, XmlNode};

/// Escape character data
pub fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '&' => out.push_str("&amp;"),
            _ => out.push(c),
        }
    }
    out
}

/// Escape an attribute value for double quotes
pub fn escape_attr(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '<' => out.push_str("&lt;"),
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '\n' => out.push_str("&#10;"),
            _ => out.push(c),
        }
    }
    out
}

#[derive(Debug, Clone, Copy, Default)]
pub struct XmlWriter {
    pretty: bool,
    declaration: bool,
}

impl XmlWriter {
    pub fn compact() -> Self {
        Self::default()
    }

    /// Two-space indentation, one element per line
    pub fn pretty() -> Self {
        Self {
            pretty: true,
            declaration: false,
        }
    }

    pub fn with_declaration(mut self) -> Self {
        self.declaration = true;
        self
    }

    pub fn write(&self, root: &XmlElement) -> String {
        let mut out = String::new();
        if self.declaration {
            out.push_str(r#"<?xml version="1.0" encoding="UTF-8"?>"#);
            if self.pretty {
                out.push('\n');
            }
        }
        self.element(&mut out, root, None, 0);
        if self.pretty {
            out.push('\n');
        }
        out
    }

    fn indent(&self, out: &mut String, depth: usize) {
        if self.pretty {
            out.push('\n');
            for _ in 0..depth {
                out.push_str("  ");
            }
        }
    }

    fn element(&self, out: &mut String, el: &XmlElement, parent_ns: Option<&str>, depth: usize) {
        out.push('<');
        out.push_str(&el.name);
        let ns = el.namespace.as_deref();
        if ns != parent_ns {
            out.push_str(" xmlns=\"");
            out.push_str(&escape_attr(ns.unwrap_or("")));
            out.push('"');
        }

        let mut declared: Vec<(&str, &str)> = Vec::new();
        for attr in &el.attributes {
            out.push(' ');
            if let Some(ans) = attr.namespace.as_deref() {
                let prefix = attr.prefix.as_deref().unwrap_or("a");
                if !declared.iter().any(|(p, _)| *p == prefix) {
                    out.push_str("xmlns:");
                    out.push_str(prefix);
                    out.push_str("=\"");
                    out.push_str(&escape_attr(ans));
                    out.push_str("\" ");
                    declared.push((prefix, ans));
                }
                out.push_str(prefix);
                out.push(':');
            }
            out.push_str(&attr.name);
            out.push_str("=\"");
            out.push_str(&escape_attr(&attr.value));
            out.push('"');
        }

        let has_elements = el.has_elements();
        let content: Vec<&XmlNode> = el
            .children
            .iter()
            .filter(|c| match c {
                XmlNode::Text(t) => !(has_elements && t.trim().is_empty()),
                XmlNode::Element(_) => true,
            })
            .collect();
        if content.is_empty() {
            out.push_str("/>");
            return;
        }
        out.push('>');
        for child in &content {
            match child {
                XmlNode::Text(t) => out.push_str(&escape_text(t)),
                XmlNode::Element(e) => {
                    self.indent(out, depth + 1);
                    self.element(out, e, ns, depth + 1);
                }
            }
        }
        if has_elements {
            self.indent(out, depth);
        }
        out.push_str("</");
        out.push_str(&el.name);
        out.push('>');
    }
}
