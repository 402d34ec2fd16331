use itertools::Itertools;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
}

impl BinaryOp {
    pub fn symbol(self) -> char {
        match self {
            BinaryOp::Add => '+',
            BinaryOp::Sub => '-',
            BinaryOp::Mul => '*',
            BinaryOp::Div => '/',
        }
    }
}

/// Parsed band-math expression. Identifiers are stored upper-cased and are
/// not yet resolved to bands.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Band(String),
    Number(f64),
    Negate(Box<Expr>),
    Binary { op: BinaryOp, lhs: Box<Expr>, rhs: Box<Expr> },
    /// Explicit parentheses from the source text.
    Group(Box<Expr>),
}

impl Expr {
    /// Distinct identifiers in order of first occurrence, left to right.
    pub fn identifiers(&self) -> Vec<&str> {
        let mut all = Vec::new();
        self.collect_identifiers(&mut all);
        all.into_iter().unique().collect()
    }

    fn collect_identifiers<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Expr::Band(name) => out.push(name),
            Expr::Number(_) => {}
            Expr::Negate(inner) | Expr::Group(inner) => inner.collect_identifiers(out),
            Expr::Binary { lhs, rhs, .. } => {
                lhs.collect_identifiers(out);
                rhs.collect_identifiers(out);
            }
        }
    }

    /// Renders the expression with every identifier replaced by `band(name)`.
    ///
    /// Parentheses are emitted only where the source had them; since the
    /// parser is left-associative with standard precedence, the rendered
    /// text evaluates with the same tree structure.
    pub fn render<F>(&self, band: &F) -> String
    where F: Fn(&str) -> String {
        match self {
            Expr::Band(name) => band(name),
            Expr::Number(value) => format_literal(*value),
            Expr::Negate(inner) => format!("-{}", inner.render(band)),
            Expr::Binary { op, lhs, rhs } => {
                format!("{}{}{}", lhs.render(band), op.symbol(), rhs.render(band))
            }
            Expr::Group(inner) => format!("({})", inner.render(band)),
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.render(&|name: &str| name.to_string()))
    }
}

/// Formats a numeric literal so it always reads as a float (`2` → `2.0`).
pub(crate) fn format_literal(value: f64) -> String { format!("{value:?}") }
