//! Byte-scanning XML parser
//!
//! Slices are only cut at ASCII delimiters, so every slice boundary is a
//! UTF-8 character boundary.

use super::{XmlAttribute, XmlElement, XmlNode};
use crate::errors::{NetconfError, Result};

const XML_NS: &str = "http://www.w3.org/XML/1998/namespace";

/// Parse a complete document with a single root element
///
/// The XML declaration, comments and processing instructions around the
/// root are skipped.
///
/// # Errors
/// * `XmlSyntax` - malformed markup, unbound prefixes, mismatched tags or
///   trailing content
pub fn parse_document(input: &str) -> Result<XmlElement> {
    let mut p = Parser::new(input);
    p.skip_misc()?;
    if p.eof() {
        return Err(p.error("document has no root element"));
    }
    let root = p.element(&Scope::default())?;
    p.skip_misc()?;
    if !p.eof() {
        return Err(p.error("content after the root element"));
    }
    Ok(root)
}

/// Parse a sequence of sibling elements (whitespace between them ignored)
///
/// # Errors
/// * `XmlSyntax` - malformed markup or non-whitespace text between elements
pub fn parse_fragment(input: &str) -> Result<Vec<XmlElement>> {
    let mut p = Parser::new(input);
    let scope = Scope::default();
    let mut out = Vec::new();
    loop {
        p.skip_misc()?;
        if p.eof() {
            break;
        }
        if p.peek() != Some(b'<') {
            return Err(p.error("text outside of an element"));
        }
        out.push(p.element(&scope)?);
    }
    Ok(out)
}

#[derive(Debug, Clone, Default)]
struct Scope {
    default_ns: Option<String>,
    prefixes: Vec<(String, String)>,
}

impl Scope {
    fn lookup(&self, prefix: &str) -> Option<&str> {
        if prefix == "xml" {
            return Some(XML_NS);
        }
        self.prefixes
            .iter()
            .rev()
            .find(|(p, _)| p == prefix)
            .map(|(_, ns)| ns.as_str())
    }
}

struct Parser<'a> {
    input: &'a str,
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            input,
            bytes: input.as_bytes(),
            pos: 0,
        }
    }

    fn eof(&self) -> bool {
        self.pos >= self.bytes.len()
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn starts_with(&self, s: &str) -> bool {
        self.input[self.pos..].starts_with(s)
    }

    fn error(&self, reason: impl Into<String>) -> NetconfError {
        NetconfError::XmlSyntax {
            position: self.pos,
            reason: reason.into(),
        }
    }

    fn skip_ws(&mut self) {
        while let Some(b) = self.peek() {
            if b.is_ascii_whitespace() {
                self.pos += 1;
            } else {
                break;
            }
        }
    }

    fn expect(&mut self, s: &str) -> Result<()> {
        if self.starts_with(s) {
            self.pos += s.len();
            Ok(())
        } else {
            Err(self.error(format!("expected '{}'", s)))
        }
    }

    /// Advance past the next occurrence of `end`, returning the skipped text
    fn take_until(&mut self, end: &str) -> Result<&'a str> {
        match self.input[self.pos..].find(end) {
            Some(idx) => {
                let text = &self.input[self.pos..self.pos + idx];
                self.pos += idx + end.len();
                Ok(text)
            }
            None => Err(self.error(format!("unterminated construct, expected '{}'", end))),
        }
    }

    /// Whitespace, comments, PIs and the XML declaration
    fn skip_misc(&mut self) -> Result<()> {
        loop {
            self.skip_ws();
            if self.starts_with("<?") {
                self.take_until("?>")?;
            } else if self.starts_with("<!--") {
                self.pos += 4;
                self.take_until("-->")?;
            } else if self.starts_with("<!DOCTYPE") {
                return Err(self.error("DTDs are not supported"));
            } else {
                return Ok(());
            }
        }
    }

    fn name(&mut self) -> Result<&'a str> {
        let start = self.pos;
        while let Some(b) = self.peek() {
            if b.is_ascii_whitespace() || matches!(b, b'/' | b'>' | b'=' | b'<') {
                break;
            }
            self.pos += 1;
        }
        if start == self.pos {
            return Err(self.error("expected a name"));
        }
        Ok(&self.input[start..self.pos])
    }

    fn quoted(&mut self) -> Result<String> {
        let quote = match self.peek() {
            Some(q @ (b'"' | b'\'')) => q,
            _ => return Err(self.error("expected a quoted attribute value")),
        };
        self.pos += 1;
        let start = self.pos;
        while let Some(b) = self.peek() {
            if b == quote {
                let raw = &self.input[start..self.pos];
                self.pos += 1;
                return decode_entities(raw).map_err(|r| self.error(r));
            }
            if b == b'<' {
                return Err(self.error("'<' in attribute value"));
            }
            self.pos += 1;
        }
        Err(self.error("unterminated attribute value"))
    }

    fn element(&mut self, parent: &Scope) -> Result<XmlElement> {
        self.expect("<")?;
        let qname = self.name()?;

        let mut raw_attrs: Vec<(&'a str, String)> = Vec::new();
        let self_closing = loop {
            self.skip_ws();
            if self.starts_with("/>") {
                self.pos += 2;
                break true;
            }
            if self.starts_with(">") {
                self.pos += 1;
                break false;
            }
            let attr = self.name()?;
            self.skip_ws();
            self.expect("=")?;
            self.skip_ws();
            let value = self.quoted()?;
            if raw_attrs.iter().any(|(n, _)| *n == attr) {
                return Err(self.error(format!("duplicate attribute '{}'", attr)));
            }
            raw_attrs.push((attr, value));
        };

        let mut scope = parent.clone();
        for (name, value) in &raw_attrs {
            if *name == "xmlns" {
                scope.default_ns = if value.is_empty() {
                    None
                } else {
                    Some(value.clone())
                };
            } else if let Some(p) = name.strip_prefix("xmlns:") {
                scope.prefixes.push((p.to_string(), value.clone()));
            }
        }

        let (prefix, local) = split_qname(qname);
        let namespace = match prefix {
            Some(p) => Some(
                scope
                    .lookup(p)
                    .ok_or_else(|| self.error(format!("unbound prefix '{}'", p)))?
                    .to_string(),
            ),
            None => scope.default_ns.clone(),
        };

        let mut attributes = Vec::new();
        for (name, value) in raw_attrs {
            if name == "xmlns" || name.starts_with("xmlns:") {
                continue;
            }
            let (aprefix, alocal) = split_qname(name);
            let anamespace = match aprefix {
                Some(p) => Some(
                    scope
                        .lookup(p)
                        .ok_or_else(|| self.error(format!("unbound prefix '{}'", p)))?
                        .to_string(),
                ),
                None => None,
            };
            attributes.push(XmlAttribute {
                prefix: aprefix.map(str::to_string),
                name: alocal.to_string(),
                namespace: anamespace,
                value,
            });
        }

        let mut element = XmlElement {
            prefix: prefix.map(str::to_string),
            name: local.to_string(),
            namespace,
            attributes,
            children: Vec::new(),
            prefixes: scope.prefixes.clone(),
        };
        if self_closing {
            return Ok(element);
        }

        loop {
            if self.eof() {
                return Err(self.error(format!("unclosed element '{}'", qname)));
            }
            if self.starts_with("</") {
                self.pos += 2;
                let close = self.name()?;
                if close != qname {
                    return Err(self.error(format!(
                        "mismatched closing tag '{}', expected '{}'",
                        close, qname
                    )));
                }
                self.skip_ws();
                self.expect(">")?;
                return Ok(element);
            } else if self.starts_with("<!--") {
                self.pos += 4;
                self.take_until("-->")?;
            } else if self.starts_with("<![CDATA[") {
                self.pos += 9;
                let text = self.take_until("]]>")?.to_string();
                push_text(&mut element, text);
            } else if self.starts_with("<?") {
                self.take_until("?>")?;
            } else if self.starts_with("<") {
                let child = self.element(&scope)?;
                element.children.push(XmlNode::Element(child));
            } else {
                let start = self.pos;
                while let Some(b) = self.peek() {
                    if b == b'<' {
                        break;
                    }
                    self.pos += 1;
                }
                let text = decode_entities(&self.input[start..self.pos])
                    .map_err(|r| self.error(r))?;
                push_text(&mut element, text);
            }
        }
    }
}

fn push_text(element: &mut XmlElement, text: String) {
    if let Some(XmlNode::Text(prev)) = element.children.last_mut() {
        prev.push_str(&text);
    } else {
        element.children.push(XmlNode::Text(text));
    }
}

fn split_qname(qname: &str) -> (Option<&str>, &str) {
    match qname.split_once(':') {
        Some((p, l)) => (Some(p), l),
        None => (None, qname),
    }
}

/// Replace predefined and numeric character references
fn decode_entities(raw: &str) -> std::result::Result<String, String> {
    if !raw.contains('&') {
        return Ok(raw.to_string());
    }
    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;
    while let Some(idx) = rest.find('&') {
        out.push_str(&rest[..idx]);
        let after = &rest[idx + 1..];
        let end = after
            .find(';')
            .ok_or_else(|| "unterminated character reference".to_string())?;
        let entity = &after[..end];
        let decoded = match entity {
            "lt" => '<',
            "gt" => '>',
            "amp" => '&',
            "quot" => '"',
            "apos" => '\'',
            _ => {
                let code = if let Some(hex) = entity
                    .strip_prefix("#x")
                    .or_else(|| entity.strip_prefix("#X"))
                {
                    u32::from_str_radix(hex, 16).ok()
                } else if let Some(dec) = entity.strip_prefix('#') {
                    dec.parse::<u32>().ok()
                } else {
                    None
                };
                code.and_then(char::from_u32)
                    .ok_or_else(|| format!("unknown entity '&{};'", entity))?
            }
        };
        out.push(decoded);
        rest = &after[end + 1..];
    }
    out.push_str(rest);
    Ok(out)
}
