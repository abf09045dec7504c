//! XPath 1.0 expression parser (recursive descent over the token stream)

use crate::errors::{NetconfError, Result};
use crate::xpath::lexer::{tokenize, Token};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Or,
    And,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    Add,
    Sub,
    Mul,
    Div,
    Mod,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Child,
    Descendant,
    DescendantOrSelf,
    Parent,
    Ancestor,
    AncestorOrSelf,
    FollowingSibling,
    PrecedingSibling,
    Following,
    Preceding,
    SelfAxis,
    Attribute,
    Namespace,
}

impl Axis {
    fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "child" => Axis::Child,
            "descendant" => Axis::Descendant,
            "descendant-or-self" => Axis::DescendantOrSelf,
            "parent" => Axis::Parent,
            "ancestor" => Axis::Ancestor,
            "ancestor-or-self" => Axis::AncestorOrSelf,
            "following-sibling" => Axis::FollowingSibling,
            "preceding-sibling" => Axis::PrecedingSibling,
            "following" => Axis::Following,
            "preceding" => Axis::Preceding,
            "self" => Axis::SelfAxis,
            "attribute" => Axis::Attribute,
            "namespace" => Axis::Namespace,
            _ => return None,
        })
    }

    /// Reverse axes number predicate positions nearest-first
    pub fn is_reverse(self) -> bool {
        matches!(
            self,
            Axis::Parent
                | Axis::Ancestor
                | Axis::AncestorOrSelf
                | Axis::PrecedingSibling
                | Axis::Preceding
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeTest {
    Name {
        prefix: Option<String>,
        local: String,
    },
    /// `*` or `prefix:*`
    Wildcard { prefix: Option<String> },
    Node,
    Text,
    Comment,
    ProcessingInstruction,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Step {
    pub axis: Axis,
    pub test: NodeTest,
    pub predicates: Vec<Expr>,
}

impl Step {
    fn abbreviated(axis: Axis) -> Self {
        Self {
            axis,
            test: NodeTest::Node,
            predicates: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Binary(BinaryOp, Box<Expr>, Box<Expr>),
    Negate(Box<Expr>),
    Union(Box<Expr>, Box<Expr>),
    Literal(String),
    Number(f64),
    Function(String, Vec<Expr>),
    /// A location path; `absolute` paths start at the document root
    Path { absolute: bool, steps: Vec<Step> },
    /// A primary expression with predicates and an optional trailing path
    Filter {
        primary: Box<Expr>,
        predicates: Vec<Expr>,
        steps: Vec<Step>,
    },
}

impl Expr {
    /// Top-level `|` operands, left to right
    pub fn union_branches(&self) -> Vec<&Expr> {
        match self {
            Expr::Union(a, b) => {
                let mut out = a.union_branches();
                out.extend(b.union_branches());
                out
            }
            other => vec![other],
        }
    }

    /// Every namespace prefix used in a name test
    pub fn prefixes(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_prefixes(&mut out);
        out
    }

    fn collect_prefixes<'a>(&'a self, out: &mut Vec<&'a str>) {
        let steps_prefixes = |steps: &'a [Step], out: &mut Vec<&'a str>| {
            for s in steps {
                match &s.test {
                    NodeTest::Name {
                        prefix: Some(p), ..
                    }
                    | NodeTest::Wildcard { prefix: Some(p) } => out.push(p),
                    _ => {}
                }
                for p in &s.predicates {
                    p.collect_prefixes(out);
                }
            }
        };
        match self {
            Expr::Binary(_, a, b) | Expr::Union(a, b) => {
                a.collect_prefixes(out);
                b.collect_prefixes(out);
            }
            Expr::Negate(a) => a.collect_prefixes(out),
            Expr::Function(_, args) => {
                for a in args {
                    a.collect_prefixes(out);
                }
            }
            Expr::Path { steps, .. } => steps_prefixes(steps, out),
            Expr::Filter {
                primary,
                predicates,
                steps,
            } => {
                primary.collect_prefixes(out);
                for p in predicates {
                    p.collect_prefixes(out);
                }
                steps_prefixes(steps, out);
            }
            Expr::Literal(_) | Expr::Number(_) => {}
        }
    }
}

/// Parse an XPath 1.0 expression
///
/// # Errors
/// * `XPathSyntax` - the expression is not well formed
pub fn parse(expr: &str) -> Result<Expr> {
    let tokens = tokenize(expr)?;
    let mut p = Parser {
        text: expr,
        tokens,
        pos: 0,
    };
    let e = p.or_expr()?;
    if let Some(t) = p.peek() {
        return Err(p.error(format!("unexpected token {:?}", t)));
    }
    Ok(e)
}

struct Parser<'a> {
    text: &'a str,
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser<'_> {
    fn error(&self, reason: impl Into<String>) -> NetconfError {
        NetconfError::XPathSyntax {
            expr: self.text.to_string(),
            reason: reason.into(),
        }
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn peek_at(&self, offset: usize) -> Option<&Token> {
        self.tokens.get(self.pos + offset)
    }

    fn advance(&mut self) -> Option<Token> {
        let t = self.tokens.get(self.pos).cloned();
        self.pos += 1;
        t
    }

    fn eat(&mut self, token: &Token) -> bool {
        if self.peek() == Some(token) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, token: &Token) -> Result<()> {
        if self.eat(token) {
            Ok(())
        } else {
            Err(self.error(format!("expected {:?}", token)))
        }
    }

    fn binary_level(
        &mut self,
        next: fn(&mut Self) -> Result<Expr>,
        ops: &[(Token, BinaryOp)],
    ) -> Result<Expr> {
        let mut left = next(self)?;
        'outer: loop {
            for (token, op) in ops {
                if self.eat(token) {
                    let right = next(self)?;
                    left = Expr::Binary(*op, Box::new(left), Box::new(right));
                    continue 'outer;
                }
            }
            return Ok(left);
        }
    }

    fn or_expr(&mut self) -> Result<Expr> {
        self.binary_level(Self::and_expr, &[(Token::Or, BinaryOp::Or)])
    }

    fn and_expr(&mut self) -> Result<Expr> {
        self.binary_level(Self::equality_expr, &[(Token::And, BinaryOp::And)])
    }

    fn equality_expr(&mut self) -> Result<Expr> {
        self.binary_level(
            Self::relational_expr,
            &[(Token::Eq, BinaryOp::Eq), (Token::Ne, BinaryOp::Ne)],
        )
    }

    fn relational_expr(&mut self) -> Result<Expr> {
        self.binary_level(
            Self::additive_expr,
            &[
                (Token::Le, BinaryOp::Le),
                (Token::Lt, BinaryOp::Lt),
                (Token::Ge, BinaryOp::Ge),
                (Token::Gt, BinaryOp::Gt),
            ],
        )
    }

    fn additive_expr(&mut self) -> Result<Expr> {
        self.binary_level(
            Self::multiplicative_expr,
            &[(Token::Plus, BinaryOp::Add), (Token::Minus, BinaryOp::Sub)],
        )
    }

    fn multiplicative_expr(&mut self) -> Result<Expr> {
        self.binary_level(
            Self::unary_expr,
            &[
                (Token::Multiply, BinaryOp::Mul),
                (Token::Div, BinaryOp::Div),
                (Token::Mod, BinaryOp::Mod),
            ],
        )
    }

    fn unary_expr(&mut self) -> Result<Expr> {
        if self.eat(&Token::Minus) {
            return Ok(Expr::Negate(Box::new(self.unary_expr()?)));
        }
        self.union_expr()
    }

    fn union_expr(&mut self) -> Result<Expr> {
        let mut left = self.path_expr()?;
        while self.eat(&Token::Pipe) {
            let right = self.path_expr()?;
            left = Expr::Union(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn starts_filter_expr(&self) -> bool {
        match self.peek() {
            Some(Token::Literal(_) | Token::Number(_) | Token::LParen | Token::Dollar) => true,
            Some(Token::Name(None, name)) => {
                self.peek_at(1) == Some(&Token::LParen) && !is_node_type(name)
            }
            Some(Token::Name(Some(_), _)) => self.peek_at(1) == Some(&Token::LParen),
            _ => false,
        }
    }

    fn path_expr(&mut self) -> Result<Expr> {
        if !self.starts_filter_expr() {
            return self.location_path();
        }
        let primary = self.primary_expr()?;
        let mut predicates = Vec::new();
        while self.peek() == Some(&Token::LBracket) {
            predicates.push(self.predicate()?);
        }
        let mut steps = Vec::new();
        loop {
            if self.eat(&Token::Slash) {
                steps.push(self.step()?);
            } else if self.eat(&Token::DoubleSlash) {
                steps.push(Step::abbreviated(Axis::DescendantOrSelf));
                steps.push(self.step()?);
            } else {
                break;
            }
        }
        if predicates.is_empty() && steps.is_empty() {
            return Ok(primary);
        }
        Ok(Expr::Filter {
            primary: Box::new(primary),
            predicates,
            steps,
        })
    }

    fn primary_expr(&mut self) -> Result<Expr> {
        match self.advance() {
            Some(Token::Literal(s)) => Ok(Expr::Literal(s)),
            Some(Token::Number(n)) => Ok(Expr::Number(n)),
            Some(Token::LParen) => {
                let e = self.or_expr()?;
                self.expect(&Token::RParen)?;
                Ok(e)
            }
            Some(Token::Dollar) => Err(self.error("variable references are not supported")),
            Some(Token::Name(prefix, name)) => {
                let name = match prefix {
                    Some(p) => format!("{}:{}", p, name),
                    None => name,
                };
                self.expect(&Token::LParen)?;
                let mut args = Vec::new();
                if !self.eat(&Token::RParen) {
                    loop {
                        args.push(self.or_expr()?);
                        if self.eat(&Token::RParen) {
                            break;
                        }
                        self.expect(&Token::Comma)?;
                    }
                }
                Ok(Expr::Function(name, args))
            }
            other => Err(self.error(format!("unexpected token {:?}", other))),
        }
    }

    fn predicate(&mut self) -> Result<Expr> {
        self.expect(&Token::LBracket)?;
        let e = self.or_expr()?;
        self.expect(&Token::RBracket)?;
        Ok(e)
    }

    fn starts_step(&self) -> bool {
        matches!(
            self.peek(),
            Some(
                Token::Name(..)
                    | Token::Wildcard(_)
                    | Token::At
                    | Token::Dot
                    | Token::DotDot
            )
        )
    }

    fn location_path(&mut self) -> Result<Expr> {
        let mut steps = Vec::new();
        let absolute = if self.eat(&Token::Slash) {
            if !self.starts_step() {
                return Ok(Expr::Path {
                    absolute: true,
                    steps,
                });
            }
            true
        } else if self.eat(&Token::DoubleSlash) {
            steps.push(Step::abbreviated(Axis::DescendantOrSelf));
            true
        } else {
            false
        };

        steps.push(self.step()?);
        loop {
            if self.eat(&Token::Slash) {
                steps.push(self.step()?);
            } else if self.eat(&Token::DoubleSlash) {
                steps.push(Step::abbreviated(Axis::DescendantOrSelf));
                steps.push(self.step()?);
            } else {
                break;
            }
        }
        Ok(Expr::Path { absolute, steps })
    }

    fn step(&mut self) -> Result<Step> {
        if self.eat(&Token::Dot) {
            return Ok(Step::abbreviated(Axis::SelfAxis));
        }
        if self.eat(&Token::DotDot) {
            return Ok(Step::abbreviated(Axis::Parent));
        }

        let axis = if self.eat(&Token::At) {
            Axis::Attribute
        } else if let (Some(Token::Name(None, name)), Some(Token::ColonColon)) =
            (self.peek(), self.peek_at(1))
        {
            let axis = Axis::from_name(name)
                .ok_or_else(|| self.error(format!("unknown axis '{}'", name)))?;
            self.pos += 2;
            axis
        } else {
            Axis::Child
        };

        let test = match self.advance() {
            Some(Token::Wildcard(prefix)) => NodeTest::Wildcard { prefix },
            Some(Token::Name(None, name))
                if is_node_type(&name) && self.peek() == Some(&Token::LParen) =>
            {
                self.pos += 1;
                if name == "processing-instruction" {
                    if let Some(Token::Literal(_)) = self.peek() {
                        self.pos += 1;
                    }
                }
                self.expect(&Token::RParen)?;
                match name.as_str() {
                    "node" => NodeTest::Node,
                    "text" => NodeTest::Text,
                    "comment" => NodeTest::Comment,
                    _ => NodeTest::ProcessingInstruction,
                }
            }
            Some(Token::Name(prefix, local)) => NodeTest::Name { prefix, local },
            other => return Err(self.error(format!("expected a node test, found {:?}", other))),
        };

        let mut predicates = Vec::new();
        while self.peek() == Some(&Token::LBracket) {
            predicates.push(self.predicate()?);
        }
        Ok(Step {
            axis,
            test,
            predicates,
        })
    }
}

fn is_node_type(name: &str) -> bool {
    matches!(name, "node" | "text" | "comment" | "processing-instruction")
}
