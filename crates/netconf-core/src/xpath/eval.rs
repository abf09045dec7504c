//! XPath evaluation over the XML view
//!
//! Node-sets are vectors of element paths kept in document order without
//! duplicates. The document root is the empty path. Attribute and
//! namespace axes are always empty: the view has no attribute nodes.

use std::cmp::Ordering;

use crate::errors::{NetconfError, Result};
use crate::model::DataPath;
use crate::view::TreeView;
use crate::xpath::functions;
use crate::xpath::parser::{Axis, BinaryOp, Expr, NodeTest, Step};

/// Result of evaluating an expression
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Nodes(Vec<DataPath>),
    Bool(bool),
    Number(f64),
    Str(String),
}

/// Evaluation context of a single (sub)expression
#[derive(Debug, Clone)]
pub(crate) struct Context {
    pub node: DataPath,
    pub position: usize,
    pub size: usize,
}

impl Context {
    pub fn single(node: DataPath) -> Self {
        Self {
            node,
            position: 1,
            size: 1,
        }
    }
}

pub struct Evaluator<'a> {
    view: TreeView<'a>,
    text: &'a str,
    namespaces: &'a [(String, String)],
    current: DataPath,
}

impl<'a> Evaluator<'a> {
    /// `namespaces` binds prefixes beyond the schema's module prefixes;
    /// `current` is what `current()` returns
    pub fn new(
        view: TreeView<'a>,
        text: &'a str,
        namespaces: &'a [(String, String)],
        current: DataPath,
    ) -> Self {
        Self {
            view,
            text,
            namespaces,
            current,
        }
    }

    pub fn view(&self) -> TreeView<'a> {
        self.view
    }

    pub(crate) fn current(&self) -> &DataPath {
        &self.current
    }

    /// Evaluate `expr` with `context` as the context node
    ///
    /// # Errors
    /// * `XPathSyntax` - type errors and unknown functions
    pub fn evaluate(&self, expr: &Expr, context: &DataPath) -> Result<Value> {
        self.eval(expr, &Context::single(context.clone()))
    }

    pub(crate) fn error(&self, reason: impl Into<String>) -> NetconfError {
        NetconfError::XPathSyntax {
            expr: self.text.to_string(),
            reason: reason.into(),
        }
    }

    /// Namespace bound to `prefix`
    pub fn resolve_prefix(&self, prefix: &str) -> Option<&str> {
        if let Some(m) = self.view.schema().module_by_prefix(prefix) {
            return Some(m.namespace.as_str());
        }
        self.namespaces
            .iter()
            .find(|(p, _)| p == prefix)
            .map(|(_, ns)| ns.as_str())
    }

    pub(crate) fn eval(&self, expr: &Expr, ctx: &Context) -> Result<Value> {
        match expr {
            Expr::Literal(s) => Ok(Value::Str(s.clone())),
            Expr::Number(n) => Ok(Value::Number(*n)),
            Expr::Negate(inner) => {
                let v = self.eval(inner, ctx)?;
                Ok(Value::Number(-self.number(&v)?))
            }
            Expr::Binary(BinaryOp::Or, a, b) => {
                let l = self.eval(a, ctx)?;
                if self.boolean(&l) {
                    return Ok(Value::Bool(true));
                }
                let r = self.eval(b, ctx)?;
                Ok(Value::Bool(self.boolean(&r)))
            }
            Expr::Binary(BinaryOp::And, a, b) => {
                let l = self.eval(a, ctx)?;
                if !self.boolean(&l) {
                    return Ok(Value::Bool(false));
                }
                let r = self.eval(b, ctx)?;
                Ok(Value::Bool(self.boolean(&r)))
            }
            Expr::Binary(op, a, b) => {
                let l = self.eval(a, ctx)?;
                let r = self.eval(b, ctx)?;
                match op {
                    BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div | BinaryOp::Mod => {
                        let (x, y) = (self.number(&l)?, self.number(&r)?);
                        Ok(Value::Number(match op {
                            BinaryOp::Add => x + y,
                            BinaryOp::Sub => x - y,
                            BinaryOp::Mul => x * y,
                            BinaryOp::Div => x / y,
                            _ => x % y,
                        }))
                    }
                    _ => Ok(Value::Bool(self.compare(*op, &l, &r)?)),
                }
            }
            Expr::Union(a, b) => {
                let (l, r) = (self.eval(a, ctx)?, self.eval(b, ctx)?);
                match (l, r) {
                    (Value::Nodes(mut x), Value::Nodes(y)) => {
                        x.extend(y);
                        self.sort_document_order(&mut x);
                        Ok(Value::Nodes(x))
                    }
                    _ => Err(self.error("'|' needs node-set operands")),
                }
            }
            Expr::Function(name, args) => functions::call(self, name, args, ctx),
            Expr::Path { absolute, steps } => {
                let start = if *absolute {
                    DataPath::root()
                } else {
                    ctx.node.clone()
                };
                Ok(Value::Nodes(self.walk(vec![start], steps)?))
            }
            Expr::Filter {
                primary,
                predicates,
                steps,
            } => {
                let v = self.eval(primary, ctx)?;
                if predicates.is_empty() && steps.is_empty() {
                    return Ok(v);
                }
                let Value::Nodes(mut nodes) = v else {
                    return Err(self.error("predicate or path applied to a non-node-set"));
                };
                for pred in predicates {
                    nodes = self.filter(nodes, pred)?;
                }
                Ok(Value::Nodes(self.walk(nodes, steps)?))
            }
        }
    }

    fn walk(&self, start: Vec<DataPath>, steps: &[Step]) -> Result<Vec<DataPath>> {
        let mut current = start;
        for step in steps {
            let mut next = Vec::new();
            for node in &current {
                let mut candidates: Vec<DataPath> = self
                    .axis(step.axis, node)?
                    .into_iter()
                    .filter(|n| self.test(&step.test, n))
                    .collect();
                // Candidates are in axis order, so reverse-axis positions
                // count back from the context node
                for pred in &step.predicates {
                    candidates = self.filter(candidates, pred)?;
                }
                next.extend(candidates);
            }
            self.sort_document_order(&mut next);
            current = next;
        }
        Ok(current)
    }

    fn filter(&self, nodes: Vec<DataPath>, pred: &Expr) -> Result<Vec<DataPath>> {
        let size = nodes.len();
        let mut out = Vec::new();
        for (i, node) in nodes.into_iter().enumerate() {
            let ctx = Context {
                node,
                position: i + 1,
                size,
            };
            let keep = match self.eval(pred, &ctx)? {
                Value::Number(n) => n == (i + 1) as f64,
                other => self.boolean(&other),
            };
            if keep {
                out.push(ctx.node);
            }
        }
        Ok(out)
    }

    fn axis(&self, axis: Axis, node: &DataPath) -> Result<Vec<DataPath>> {
        let view = &self.view;
        Ok(match axis {
            Axis::Child => view.children(node)?,
            Axis::Descendant => view.descendants(node)?,
            Axis::DescendantOrSelf => {
                let mut out = vec![node.clone()];
                out.extend(view.descendants(node)?);
                out
            }
            Axis::Parent => match view.parent(node) {
                Some(p) => vec![p],
                None => return Err(self.error("'..' ascends above the root")),
            },
            Axis::Ancestor => self.ancestors(node),
            Axis::AncestorOrSelf => {
                let mut out = vec![node.clone()];
                out.extend(self.ancestors(node));
                out
            }
            Axis::FollowingSibling => {
                let (siblings, idx) = self.siblings(node)?;
                siblings.into_iter().skip(idx + 1).collect()
            }
            Axis::PrecedingSibling => {
                let (mut siblings, idx) = self.siblings(node)?;
                siblings.truncate(idx);
                siblings.reverse();
                siblings
            }
            Axis::Following => {
                let mut out = Vec::new();
                let mut at = Some(node.clone());
                while let Some(a) = at.filter(|a| !a.is_root()) {
                    let (siblings, idx) = self.siblings(&a)?;
                    for s in siblings.into_iter().skip(idx + 1) {
                        let below = view.descendants(&s)?;
                        out.push(s);
                        out.extend(below);
                    }
                    at = view.parent(&a);
                }
                out
            }
            Axis::Preceding => {
                let mut out = Vec::new();
                let mut at = Some(node.clone());
                while let Some(a) = at.filter(|a| !a.is_root()) {
                    let (mut siblings, idx) = self.siblings(&a)?;
                    siblings.truncate(idx);
                    for s in siblings.into_iter().rev() {
                        out.extend(view.descendants(&s)?.into_iter().rev());
                        out.push(s);
                    }
                    at = view.parent(&a);
                }
                out
            }
            Axis::SelfAxis => vec![node.clone()],
            Axis::Attribute | Axis::Namespace => Vec::new(),
        })
    }

    /// Nearest first, ending with the root
    fn ancestors(&self, node: &DataPath) -> Vec<DataPath> {
        let mut out = Vec::new();
        let mut at = self.view.parent(node);
        while let Some(p) = at {
            at = self.view.parent(&p);
            out.push(p);
        }
        out
    }

    /// All children of the parent, plus the index of `node` among them
    fn siblings(&self, node: &DataPath) -> Result<(Vec<DataPath>, usize)> {
        let Some(parent) = self.view.parent(node) else {
            return Ok((Vec::new(), 0));
        };
        let siblings = self.view.children(&parent)?;
        match siblings.iter().position(|s| s == node) {
            Some(idx) => Ok((siblings, idx)),
            None => Ok((Vec::new(), 0)),
        }
    }

    fn test(&self, test: &NodeTest, node: &DataPath) -> bool {
        match test {
            NodeTest::Node => true,
            NodeTest::Text | NodeTest::Comment | NodeTest::ProcessingInstruction => false,
            _ if node.is_root() => false,
            NodeTest::Wildcard { prefix: None } => true,
            NodeTest::Wildcard { prefix: Some(p) } => {
                match (self.resolve_prefix(p), self.view.name(node)) {
                    (Some(ns), Some((_, node_ns))) => ns == node_ns,
                    _ => false,
                }
            }
            NodeTest::Name { prefix, local } => {
                let Some(r) = self.view.resolve(node) else {
                    return false;
                };
                if r.node.name() != local {
                    return false;
                }
                match prefix {
                    Some(p) => self.resolve_prefix(p) == Some(r.node.namespace()),
                    None => self.unprefixed_matches(node, r.node.module(), local),
                }
            }
        }
    }

    /// Below the top level names are not namespace checked; at the top an
    /// unprefixed name means the default module's node when it has one
    fn unprefixed_matches(&self, node: &DataPath, module: &str, local: &str) -> bool {
        let top_level = self.view.parent(node).is_some_and(|p| p.is_root());
        if !top_level {
            return true;
        }
        let schema = self.view.schema();
        let default = schema.default_module().name.as_str();
        module == default
            || !schema
                .roots()
                .iter()
                .any(|r| r.name() == local && r.module() == default)
    }

    pub(crate) fn sort_document_order(&self, nodes: &mut Vec<DataPath>) {
        let mut keyed: Vec<_> = nodes
            .drain(..)
            .map(|n| (self.view.doc_key(&n), n))
            .collect();
        keyed.sort_by(|a, b| match a.0.cmp(&b.0) {
            Ordering::Equal => a.1.cmp(&b.1),
            other => other,
        });
        keyed.dedup_by(|a, b| a.1 == b.1);
        nodes.extend(keyed.into_iter().map(|(_, n)| n));
    }

    // ========== Conversions ==========

    pub(crate) fn string(&self, v: &Value) -> Result<String> {
        Ok(match v {
            Value::Nodes(nodes) => match nodes.first() {
                Some(n) => self.view.string_value(n)?,
                None => String::new(),
            },
            Value::Bool(b) => b.to_string(),
            Value::Number(n) => number_to_string(*n),
            Value::Str(s) => s.clone(),
        })
    }

    pub(crate) fn number(&self, v: &Value) -> Result<f64> {
        Ok(match v {
            Value::Number(n) => *n,
            Value::Bool(b) => {
                if *b {
                    1.0
                } else {
                    0.0
                }
            }
            other => string_to_number(&self.string(other)?),
        })
    }

    pub(crate) fn boolean(&self, v: &Value) -> bool {
        match v {
            Value::Nodes(nodes) => !nodes.is_empty(),
            Value::Bool(b) => *b,
            Value::Number(n) => *n != 0.0 && !n.is_nan(),
            Value::Str(s) => !s.is_empty(),
        }
    }

    fn compare(&self, op: BinaryOp, l: &Value, r: &Value) -> Result<bool> {
        match (l, r) {
            (Value::Nodes(a), Value::Nodes(b)) => {
                let rights = b
                    .iter()
                    .map(|n| self.view.string_value(n))
                    .collect::<Result<Vec<_>>>()?;
                for n in a {
                    let left = Value::Str(self.view.string_value(n)?);
                    if rights
                        .iter()
                        .any(|s| compare_atoms(op, &left, &Value::Str(s.clone())))
                    {
                        return Ok(true);
                    }
                }
                Ok(false)
            }
            (Value::Nodes(nodes), other) => self.compare_set(op, nodes, other, false),
            (other, Value::Nodes(nodes)) => self.compare_set(op, nodes, other, true),
            (a, b) => Ok(compare_atoms(op, a, b)),
        }
    }

    /// Node-set against a single value; `swapped` when the set is on the right
    fn compare_set(&self, op: BinaryOp, nodes: &[DataPath], other: &Value, swapped: bool) -> Result<bool> {
        let ordered = |a: &Value, b: &Value| {
            if swapped {
                compare_atoms(op, b, a)
            } else {
                compare_atoms(op, a, b)
            }
        };
        if let Value::Bool(_) = other {
            return Ok(ordered(&Value::Bool(!nodes.is_empty()), other));
        }
        for n in nodes {
            let s = self.view.string_value(n)?;
            let atom = match other {
                Value::Number(_) => Value::Number(string_to_number(&s)),
                _ => Value::Str(s),
            };
            if ordered(&atom, other) {
                return Ok(true);
            }
        }
        Ok(false)
    }
}

fn atom_number(v: &Value) -> f64 {
    match v {
        Value::Number(n) => *n,
        Value::Bool(true) => 1.0,
        Value::Bool(false) => 0.0,
        Value::Str(s) => string_to_number(s),
        Value::Nodes(_) => f64::NAN,
    }
}

fn atom_string(v: &Value) -> String {
    match v {
        Value::Number(n) => number_to_string(*n),
        Value::Bool(b) => b.to_string(),
        Value::Str(s) => s.clone(),
        Value::Nodes(_) => String::new(),
    }
}

fn atom_bool(v: &Value) -> bool {
    match v {
        Value::Number(n) => *n != 0.0 && !n.is_nan(),
        Value::Bool(b) => *b,
        Value::Str(s) => !s.is_empty(),
        Value::Nodes(n) => !n.is_empty(),
    }
}

fn compare_atoms(op: BinaryOp, a: &Value, b: &Value) -> bool {
    match op {
        BinaryOp::Eq | BinaryOp::Ne => {
            let equal = if matches!(a, Value::Bool(_)) || matches!(b, Value::Bool(_)) {
                atom_bool(a) == atom_bool(b)
            } else if matches!(a, Value::Number(_)) || matches!(b, Value::Number(_)) {
                atom_number(a) == atom_number(b)
            } else {
                atom_string(a) == atom_string(b)
            };
            (op == BinaryOp::Eq) == equal
        }
        _ => {
            let (x, y) = (atom_number(a), atom_number(b));
            match op {
                BinaryOp::Lt => x < y,
                BinaryOp::Le => x <= y,
                BinaryOp::Gt => x > y,
                _ => x >= y,
            }
        }
    }
}

/// XPath `number()` of a string: optional sign, digits, optional fraction
pub(crate) fn string_to_number(s: &str) -> f64 {
    let t = s.trim();
    let body = t.strip_prefix('-').unwrap_or(t);
    let digits = body.chars().filter(char::is_ascii_digit).count();
    let dots = body.chars().filter(|c| *c == '.').count();
    if digits == 0 || dots > 1 || digits + dots != body.chars().count() {
        return f64::NAN;
    }
    t.parse().unwrap_or(f64::NAN)
}

/// XPath `string()` of a number: integers without a fraction, no exponent
pub(crate) fn number_to_string(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        let s = if n > 0.0 { "Infinity" } else { "-Infinity" };
        s.to_string()
    } else if n == n.trunc() && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}
