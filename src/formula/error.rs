use std::fmt;

/// Why a formula failed to parse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyntaxReason {
    EmptyInput,
    UnexpectedCharacter(char),
    MalformedNumber,
    /// An operator without a left or right operand, or `()`.
    MissingOperand,
    /// A `(` that is never closed.
    UnclosedParen,
    /// A `)` without a matching `(`.
    UnmatchedCloseParen,
    /// Tokens remaining after a complete expression.
    TrailingInput,
}

impl fmt::Display for SyntaxReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyntaxReason::EmptyInput => write!(f, "empty formula"),
            SyntaxReason::UnexpectedCharacter(c) => write!(f, "unexpected character '{c}'"),
            SyntaxReason::MalformedNumber => write!(f, "malformed number"),
            SyntaxReason::MissingOperand => write!(f, "missing operand"),
            SyntaxReason::UnclosedParen => write!(f, "unclosed parenthesis"),
            SyntaxReason::UnmatchedCloseParen => write!(f, "unmatched closing parenthesis"),
            SyntaxReason::TrailingInput => write!(f, "unexpected input after expression"),
        }
    }
}

/// Parse failure, tagged with the byte offset it was detected at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxError {
    pub position: usize,
    pub reason: SyntaxReason,
}

impl SyntaxError {
    pub fn new(position: usize, reason: SyntaxReason) -> Self { Self { position, reason } }
}

impl fmt::Display for SyntaxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "syntax error at {}: {}", self.position, self.reason)
    }
}

impl std::error::Error for SyntaxError {}

/// Errors raised while turning a formula into a calculator invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompileError {
    Syntax(SyntaxError),
    /// The identifier is not a band captured by the requested camera kind.
    UnknownSymbol(String),
    /// The index name contains characters outside `[a-z0-9_-]` or is empty.
    InvalidIndexName(String),
    /// The index name belongs to a product the system writes itself.
    ReservedIndexName(String),
}

impl fmt::Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompileError::Syntax(e) => write!(f, "{e}"),
            CompileError::UnknownSymbol(name) => write!(f, "unknown band symbol '{name}'"),
            CompileError::InvalidIndexName(name) => write!(f, "invalid index name '{name}'"),
            CompileError::ReservedIndexName(name) => write!(f, "index name '{name}' is reserved"),
        }
    }
}

impl std::error::Error for CompileError {}

impl From<SyntaxError> for CompileError {
    fn from(value: SyntaxError) -> Self { CompileError::Syntax(value) }
}
