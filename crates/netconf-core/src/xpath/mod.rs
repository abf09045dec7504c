//! XPath 1.0 filters and conditions
//!
//! `select` answers an XPath `<filter>`; `condition` evaluates YANG
//! `when`/`must` expressions against a (possibly staged) view.

pub mod eval;
mod functions;
pub mod lexer;
pub mod parser;

pub use eval::{Evaluator, Value};
pub use parser::{parse, Axis, BinaryOp, Expr, NodeTest, Step};

use tracing::debug;

use crate::errors::Result;
use crate::model::{entry_segment, DataPath, NodeKind, ResultTree, SchemaNode};
use crate::result::ResultTreeBuilder;
use crate::view::TreeView;

/// Evaluate an XPath filter and build its result
///
/// Every top-level `|` branch becomes its own fragment. A branch naming a
/// prefix bound nowhere yields nothing; so does a branch whose value is
/// not a node-set. Under report-all, a branch that finds nothing but
/// names a list entry by all its keys yields the entry's defaults.
///
/// # Errors
/// * `XPathSyntax` - malformed expression, or `..` above the root
pub fn select(view: TreeView<'_>, text: &str, namespaces: &[(String, String)]) -> Result<ResultTree> {
    let expr = parse(text)?;
    let ev = Evaluator::new(view, text, namespaces, DataPath::root());
    let mut out = ResultTree::default();
    for branch in expr.union_branches() {
        if let Some(prefix) = branch
            .prefixes()
            .into_iter()
            .find(|p| ev.resolve_prefix(p).is_none())
        {
            debug!(xpath = text, prefix, "unresolved prefix, branch skipped");
            continue;
        }
        let Value::Nodes(nodes) = ev.evaluate(branch, &DataPath::root())? else {
            continue;
        };
        let mut builder = ResultTreeBuilder::new(view);
        if nodes.is_empty() && view.options().report_all {
            for (path, value) in default_skeleton(view, &ev, branch)? {
                builder.add_value(&path, value)?;
            }
        }
        for node in &nodes {
            builder.add_subtree(node)?;
            builder.add_entry_keys(node)?;
        }
        out.append(builder.finish());
    }
    Ok(out)
}

/// Defaults implied by a location path into a list entry that does not exist
///
/// Only plain child steps are followed, and every list on the way needs all
/// its keys fixed by `key = 'literal'` predicates. The path may end on the
/// entry, on a container below it or on a leaf below it. Keys are not
/// reported since no instance supplied them.
fn default_skeleton(
    view: TreeView<'_>,
    ev: &Evaluator<'_>,
    branch: &Expr,
) -> Result<Vec<(DataPath, String)>> {
    let Expr::Path {
        absolute: true,
        steps,
    } = branch
    else {
        return Ok(Vec::new());
    };
    let schema = view.schema();
    let mut path = DataPath::root();
    let mut parent: Option<&SchemaNode> = None;
    let mut entry: Option<DataPath> = None;

    for (i, step) in steps.iter().enumerate() {
        let (Axis::Child, NodeTest::Name { prefix, local }) = (step.axis, &step.test) else {
            return Ok(Vec::new());
        };
        let ns = match prefix {
            Some(p) => match ev.resolve_prefix(p) {
                Some(ns) => Some(ns),
                None => return Ok(Vec::new()),
            },
            None => None,
        };
        let node = match (parent, ns) {
            (None, Some(ns)) => schema.root_by_namespace(local, ns),
            (None, None) => schema.resolve_root(local),
            (Some(p), ns) => p
                .find_child(local)
                .filter(|c| ns.map_or(true, |ns| c.namespace() == ns)),
        };
        let Some(node) = node else {
            return Ok(Vec::new());
        };
        if !view.visible(node) {
            return Ok(Vec::new());
        }
        path = path.child(schema.segment_for(node, path.len()));

        match node.kind() {
            NodeKind::Container if step.predicates.is_empty() => {}
            NodeKind::List => {
                let mut fixed = Vec::new();
                for pred in &step.predicates {
                    if !key_equalities(pred, &mut fixed) {
                        return Ok(Vec::new());
                    }
                }
                let mut values = Vec::new();
                for key in node.keys() {
                    match fixed.iter().find(|(k, _)| k == key) {
                        Some((_, v)) => values.push(v.clone()),
                        None => return Ok(Vec::new()),
                    }
                }
                path = path.child(entry_segment(&values));
                entry = Some(path.clone());
            }
            NodeKind::Leaf if step.predicates.is_empty() && i + 1 == steps.len() => {
                let Some(entry) = entry else {
                    return Ok(Vec::new());
                };
                let keyed = parent.is_some_and(|p| p.is_key(node.name()));
                if keyed || view.exists(&entry)? {
                    return Ok(Vec::new());
                }
                return Ok(node
                    .default_value()
                    .map(|d| (path, node.display_value(d)))
                    .into_iter()
                    .collect());
            }
            _ => return Ok(Vec::new()),
        }
        parent = Some(node);
    }

    let (Some(entry), Some(last)) = (entry, parent) else {
        return Ok(Vec::new());
    };
    if view.exists(&entry)? {
        return Ok(Vec::new());
    }
    Ok(last
        .children()
        .iter()
        .filter(|c| c.kind() == NodeKind::Leaf && !last.is_key(c.name()) && view.visible(c))
        .filter_map(|c| {
            c.default_value()
                .map(|d| (path.child(c.name()), c.display_value(d)))
        })
        .collect())
}

/// Collect `key = literal` comparisons joined by `and`
///
/// `false` when the predicate is anything else.
fn key_equalities(pred: &Expr, out: &mut Vec<(String, String)>) -> bool {
    match pred {
        Expr::Binary(BinaryOp::And, a, b) => key_equalities(a, out) && key_equalities(b, out),
        Expr::Binary(BinaryOp::Eq, a, b) => {
            let (name, value) = match (a.as_ref(), b.as_ref()) {
                (Expr::Path { .. }, v) => (a.as_ref(), v),
                (v, Expr::Path { .. }) => (b.as_ref(), v),
                _ => return false,
            };
            let Expr::Path {
                absolute: false,
                steps,
            } = name
            else {
                return false;
            };
            let [Step {
                axis: Axis::Child,
                test: NodeTest::Name { local, .. },
                predicates,
            }] = steps.as_slice()
            else {
                return false;
            };
            if !predicates.is_empty() {
                return false;
            }
            let value = match value {
                Expr::Literal(s) => s.clone(),
                Expr::Number(n) => n.to_string(),
                _ => return false,
            };
            out.push((local.clone(), value));
            true
        }
        _ => false,
    }
}

/// Evaluate a `when`/`must` expression with `context` as context node
/// and `current()`
///
/// # Errors
/// * `XPathSyntax` - malformed expression
pub fn condition(view: TreeView<'_>, text: &str, context: &DataPath) -> Result<bool> {
    let expr = parse(text)?;
    let ev = Evaluator::new(view, text, &[], context.clone());
    let v = ev.evaluate(&expr, context)?;
    Ok(ev.boolean(&v))
}

/// Evaluate an expression to a value
///
/// # Errors
/// * `XPathSyntax` - malformed expression or a type error
pub fn evaluate(view: TreeView<'_>, text: &str, context: &DataPath) -> Result<Value> {
    let expr = parse(text)?;
    Evaluator::new(view, text, &[], context.clone()).evaluate(&expr, context)
}
