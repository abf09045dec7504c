//! `<config>` tree to `EditNode`s

use crate::edit::{EditNode, EditOperation};
use crate::errors::{NetconfError, Result};
use crate::model::{entry_segment, escape_key, DataPath, NodeKind, SchemaNode, SchemaRegistry};
use crate::xml::{XmlElement, NETCONF_BASE_NS};

/// Resolve every element of `config` and its effective operation
///
/// # Errors
/// * `UnknownNode` - an element has no schema counterpart
/// * `MissingAttribute` - a list entry lacks one of its keys
/// * `UnknownAttribute` - bad `operation` value
/// * `OperationTransition` - an operation not permitted in its context
pub fn parse_config(
    schema: &SchemaRegistry,
    config: &XmlElement,
    default_operation: EditOperation,
) -> Result<Vec<EditNode>> {
    let parser = ConfigParser { schema };
    let root = DataPath::root();
    config
        .elements()
        .map(|el| {
            let node = parser.root_schema(el)?;
            parser.node(el, node, &root, default_operation)
        })
        .collect()
}

struct ConfigParser<'a> {
    schema: &'a SchemaRegistry,
}

impl<'a> ConfigParser<'a> {
    fn effective_ns<'e>(&self, el: &'e XmlElement) -> Option<&'e str> {
        el.namespace
            .as_deref()
            .filter(|n| *n != NETCONF_BASE_NS && !self.schema.is_unqualified_namespace(n))
    }

    fn root_schema(&self, el: &XmlElement) -> Result<&'a SchemaNode> {
        let found = match self.effective_ns(el) {
            Some(ns) => self.schema.root_by_namespace(&el.name, ns),
            None => self.schema.resolve_root(&el.name),
        };
        found.ok_or_else(|| NetconfError::UnknownNode {
            parent: "/".to_string(),
            name: el.name.clone(),
        })
    }

    /// Schema child of `parent` for element `el` inside `parent_el`
    fn child_schema(
        &self,
        parent: &'a SchemaNode,
        parent_el: &XmlElement,
        el: &XmlElement,
        at: &DataPath,
    ) -> Result<&'a SchemaNode> {
        let unknown = || NetconfError::UnknownNode {
            parent: at.to_string(),
            name: el.name.clone(),
        };
        let child = parent.find_child(&el.name).ok_or_else(unknown)?;
        match self.effective_ns(el) {
            None => Ok(child),
            Some(ns) if Some(ns) == self.effective_ns(parent_el) => Ok(child),
            Some(ns) if ns == child.namespace() => Ok(child),
            Some(_) => Err(unknown()),
        }
    }

    fn operation(&self, el: &XmlElement, inherited: EditOperation) -> Result<EditOperation> {
        let attr = el
            .attribute_ns(NETCONF_BASE_NS, "operation")
            .or_else(|| el.attribute("operation"));
        let Some(value) = attr else {
            return Ok(inherited);
        };
        let explicit = EditOperation::from_attribute(value)?;
        if !inherited.allows_override(explicit) {
            return Err(NetconfError::OperationTransition {
                operation: explicit.to_string(),
                inherited: inherited.to_string(),
            });
        }
        Ok(explicit)
    }

    fn node(
        &self,
        el: &XmlElement,
        schema_node: &'a SchemaNode,
        parent: &DataPath,
        inherited: EditOperation,
    ) -> Result<EditNode> {
        let operation = self.operation(el, inherited)?;
        let at = parent.child(self.schema.segment_for(schema_node, parent.len()));

        match schema_node.kind() {
            NodeKind::Leaf => {
                if let Some(child) = el.elements().next() {
                    return Err(NetconfError::UnknownNode {
                        parent: at.to_string(),
                        name: child.name.clone(),
                    });
                }
                Ok(EditNode {
                    path: at,
                    operation,
                    value: el.text_value(),
                    keys: Vec::new(),
                    children: Vec::new(),
                })
            }
            NodeKind::LeafList => {
                let text = el.text_value().ok_or_else(|| {
                    NetconfError::invalid_value(at.to_string(), "leaf-list entry without a value")
                })?;
                let stored = schema_node
                    .constraint_check(&text)
                    .unwrap_or_else(|_| text.clone());
                Ok(EditNode {
                    path: at.child(escape_key(&stored)),
                    operation,
                    value: Some(text),
                    keys: Vec::new(),
                    children: Vec::new(),
                })
            }
            NodeKind::Container => Ok(EditNode {
                children: self.children(el, schema_node, &at, operation, &[])?,
                path: at,
                operation,
                value: None,
                keys: Vec::new(),
            }),
            NodeKind::List => {
                // Names first: an unknown child outranks a missing key
                for child in el.elements() {
                    self.child_schema(schema_node, el, child, &at)?;
                }
                let keys = self.keys(el, schema_node)?;
                let stored: Vec<String> = keys
                    .iter()
                    .map(|(name, text)| {
                        schema_node
                            .find_child(name)
                            .and_then(|k| k.constraint_check(text).ok())
                            .unwrap_or_else(|| text.clone())
                    })
                    .collect();
                let entry = at.child(entry_segment(&stored));
                let key_names: Vec<&str> = keys.iter().map(|(k, _)| k.as_str()).collect();
                Ok(EditNode {
                    children: self.children(el, schema_node, &entry, operation, &key_names)?,
                    path: entry,
                    operation,
                    value: None,
                    keys,
                })
            }
        }
    }

    /// First occurrence of every key leaf; later ones are ignored
    fn keys(&self, el: &XmlElement, list: &SchemaNode) -> Result<Vec<(String, String)>> {
        list.keys()
            .iter()
            .map(|key| {
                el.elements()
                    .find(|c| &c.name == key)
                    .and_then(XmlElement::text_value)
                    .map(|text| (key.clone(), text))
                    .ok_or_else(|| NetconfError::MissingAttribute {
                        element: el.name.clone(),
                        attribute: key.clone(),
                    })
            })
            .collect()
    }

    fn children(
        &self,
        el: &XmlElement,
        schema_node: &'a SchemaNode,
        at: &DataPath,
        operation: EditOperation,
        keys: &[&str],
    ) -> Result<Vec<EditNode>> {
        let mut seen_keys: Vec<&str> = Vec::new();
        let mut out = Vec::new();
        for child in el.elements() {
            let child_schema = self.child_schema(schema_node, el, child, at)?;
            if keys.contains(&child.name.as_str()) {
                if seen_keys.contains(&child.name.as_str()) {
                    continue;
                }
                seen_keys.push(child.name.as_str());
            }
            out.push(self.node(child, child_schema, at, operation)?);
        }
        Ok(out)
    }
}
