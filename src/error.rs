use thiserror::Error;

use crate::frontend::{intern::Name, lexer::Span, syntax::SyntaxKind};

/// Broken contracts between pipeline stages. These are bugs (or a caller
/// skipping the diagnostics check), never problems in the user's source.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InternalError {
    #[error("unexpected syntax node {kind} at {span} while building {context}")]
    UnexpectedSyntax {
        kind: SyntaxKind,
        span: Span,
        context: &'static str,
    },

    #[error("reference to `{name}` at {span} reached MIR conversion unresolved")]
    UnresolvedReference { name: Name, span: Span },

    #[error("symbol not defined for declaration `{name}`")]
    SymbolNotDefined { name: Name },

    #[error("dereferenced unbound symbol {symbol}")]
    UnboundSymbol { symbol: String },

    #[error("symbol {symbol} is already bound")]
    SymbolAlreadyBound { symbol: String },

    #[error("expected {expected} node but found {found}")]
    UnexpectedNode {
        expected: &'static str,
        found: &'static str,
    },

    #[error("no enclosing class or file for function `{name}`")]
    MissingClassContainer { name: Name },
}
