//! A syntax shaped representation of one source file. Declarations carry a
//! [`HirId`] so later stages can refer to them, references carry the name they
//! were written with and, once the resolver ran, the declaration they bind to.

use super::ConstValue;
use crate::{
    frontend::{intern::Name, lexer::Span},
    index::newtype_index,
};

pub mod builder;
pub mod builtins;
pub mod dump;
pub mod visit;

pub use builtins::BuiltIn;

newtype_index! {
    /// Identity of a declaration (or container) within one HIR file
    pub struct HirId;
}

#[derive(Debug, Clone, PartialEq)]
pub struct File {
    pub id: HirId,
    pub name: String,
    pub span: Span,
    pub statements: Vec<Statement>,
}

impl File {
    /// Functions declared directly at the top level of the file
    pub fn functions(&self) -> impl Iterator<Item = &Function> {
        self.statements.iter().filter_map(|statement| match statement {
            Statement::Function(function) => Some(function),
            _ => None,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    Function(Function),
    Variable(Variable),
    Expression(Expression),
}

impl Statement {
    pub fn span(&self) -> Span {
        match self {
            Statement::Function(function) => function.span,
            Statement::Variable(variable) => variable.span,
            Statement::Expression(expression) => expression.span,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Function {
    pub id: HirId,
    pub name: Name,
    pub span: Span,
    pub parameters: Vec<Parameter>,
    pub body: Body,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    pub id: HirId,
    pub name: Name,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Body {
    pub id: HirId,
    pub span: Span,
    pub statements: Vec<Statement>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Variable {
    pub id: HirId,
    pub name: Name,
    pub span: Span,
    pub initializer: Option<Expression>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Expression {
    pub span: Span,
    pub kind: ExpressionKind,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExpressionKind {
    Const(ConstValue),
    GetValue(Reference),
    /// Argument slots are `None` where the argument was malformed, so the
    /// remaining arguments keep their position
    Call {
        receiver: Box<Expression>,
        arguments: Vec<Option<Expression>>,
    },
    Object(Vec<ObjectEntry>),
    SetValue {
        target: Reference,
        value: Box<Expression>,
    },
    GetProperty {
        receiver: Box<Expression>,
        property: Name,
    },
    SetProperty {
        receiver: Box<Expression>,
        property: Name,
        value: Box<Expression>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ObjectEntry {
    pub key: Name,
    pub value: Expression,
}

/// A use of a name. `candidate` is written once by the resolver and stays
/// `None` only when an error was reported for it.
#[derive(Debug, Clone, PartialEq)]
pub struct Reference {
    pub name: Name,
    pub span: Span,
    pub candidate: Option<Resolution>,
}

/// The declaration a [`Reference`] binds to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resolution {
    Function(HirId),
    Parameter(HirId),
    Variable(HirId),
    BuiltIn(BuiltIn),
}

impl Resolution {
    pub fn describe(&self) -> &'static str {
        match self {
            Resolution::Function(_) => "function",
            Resolution::Parameter(_) => "parameter",
            Resolution::Variable(_) => "variable",
            Resolution::BuiltIn(_) => "builtin",
        }
    }
}
