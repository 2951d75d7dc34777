//! The MIR keeps every node in one [`Arena`] and refers to nodes by
//! [`NodeId`]. Declarations are identified by a [`SymbolId`] instead of a name;
//! a symbol starts out unbound and is bound exactly once to the node declaring
//! it. Lowering passes rewrite the tree in place.

use hashbrown::HashMap;
use strum::{Display, IntoStaticStr};

use super::{ConstValue, hir::BuiltIn};
use crate::{
    error::InternalError,
    frontend::{intern::Name, lexer::Span},
    index::{IndexVec, newtype_index},
};

pub mod convert;
pub mod dump;
pub mod parents;
pub mod transform;
pub mod visit;

newtype_index! {
    pub struct NodeId;
}

newtype_index! {
    pub struct SymbolId;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[strum(serialize_all = "snake_case")]
pub enum SymbolKind {
    Function,
    Parameter,
    Variable,
    Class,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolState {
    Unbound,
    Bound(NodeId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Symbol {
    pub kind: SymbolKind,
    pub state: SymbolState,
}

/// Where a class or function came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum Origin {
    Source,
    BuiltIn,
    FunctionClass,
    Invoke,
    ClassInitializer,
    FileClass,
}

#[derive(Debug, Clone)]
pub struct Node {
    pub kind: NodeKind,
    pub span: Span,
    /// Closest enclosing node which itself tracks a parent. Only set on
    /// files, classes, functions, parameters and variables.
    pub parent: Option<NodeId>,
}

#[derive(Debug, Clone, IntoStaticStr)]
pub enum NodeKind {
    File(File),
    Class(Class),
    Function(Function),
    Parameter(Parameter),
    Body(Body),
    Variable(Variable),
    Expression(Expression),
}

impl NodeKind {
    pub fn name(&self) -> &'static str {
        self.into()
    }

    /// Nodes which get an upward link from [`parents::patch_parents`]
    pub fn has_parent(&self) -> bool {
        !matches!(self, NodeKind::Body(_) | NodeKind::Expression(_))
    }

    /// Nodes which can hold class declarations
    pub fn is_class_container(&self) -> bool {
        matches!(self, NodeKind::File(_) | NodeKind::Class(_))
    }

    pub fn is_declaration(&self) -> bool {
        matches!(self, NodeKind::Function(_) | NodeKind::Class(_))
    }
}

#[derive(Debug, Clone)]
pub struct File {
    pub name: String,
    pub statements: Vec<NodeId>,
}

#[derive(Debug, Clone)]
pub struct Class {
    pub symbol: SymbolId,
    pub name: Name,
    pub statements: Vec<NodeId>,
    pub origin: Origin,
}

#[derive(Debug, Clone)]
pub struct Function {
    pub symbol: SymbolId,
    pub name: Name,
    pub parameters: Vec<NodeId>,
    pub body: NodeId,
    pub is_native: bool,
    pub is_static: bool,
    pub origin: Origin,
}

#[derive(Debug, Clone)]
pub struct Parameter {
    pub symbol: SymbolId,
    pub name: Name,
}

#[derive(Debug, Clone)]
pub struct Body {
    pub statements: Vec<NodeId>,
}

#[derive(Debug, Clone)]
pub struct Variable {
    pub symbol: SymbolId,
    pub name: Name,
    pub value: Option<Expression>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Expression {
    pub span: Span,
    pub kind: ExpressionKind,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExpressionKind {
    Const(ConstValue),
    GetValue(SymbolId),
    SetValue {
        symbol: SymbolId,
        value: Box<Expression>,
    },
    GetProperty {
        receiver: Box<Expression>,
        name: Name,
    },
    SetProperty {
        receiver: Box<Expression>,
        name: Name,
        value: Box<Expression>,
    },
    Object(Vec<ObjectEntry>),
    Call {
        receiver: Box<Expression>,
        arguments: Vec<Option<Expression>>,
    },
    NewInstance {
        class: SymbolId,
        arguments: Vec<Option<Expression>>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ObjectEntry {
    pub key: Name,
    pub value: Expression,
}

/// Generates checked accessors for one node variant
macro_rules! node_accessors {
    ($($variant:ident($ty:ty) => $get:ident, $get_mut:ident;)*) => {
        $(
            pub fn $get(&self, id: NodeId) -> Result<&$ty, InternalError> {
                match &self.nodes[id].kind {
                    NodeKind::$variant(node) => Ok(node),
                    other => Err(InternalError::UnexpectedNode {
                        expected: stringify!($variant),
                        found: other.name(),
                    }),
                }
            }

            pub fn $get_mut(&mut self, id: NodeId) -> Result<&mut $ty, InternalError> {
                match &mut self.nodes[id].kind {
                    NodeKind::$variant(node) => Ok(node),
                    other => Err(InternalError::UnexpectedNode {
                        expected: stringify!($variant),
                        found: other.name(),
                    }),
                }
            }
        )*
    };
}

/// Storage for all MIR nodes and symbols. Nodes removed from the tree by a
/// lowering pass stay in the arena, unreachable from the file.
#[derive(Debug, Default, Clone)]
pub struct Arena {
    nodes: IndexVec<NodeId, Node>,
    symbols: IndexVec<SymbolId, Symbol>,
}

impl Arena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, kind: NodeKind, span: Span) -> NodeId {
        self.nodes.push(Node {
            kind,
            span,
            parent: None,
        })
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id]
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id]
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn symbol_count(&self) -> usize {
        self.symbols.len()
    }

    node_accessors! {
        File(File) => file, file_mut;
        Class(Class) => class, class_mut;
        Function(Function) => function, function_mut;
        Parameter(Parameter) => parameter, parameter_mut;
        Body(Body) => body, body_mut;
        Variable(Variable) => variable, variable_mut;
    }

    pub fn new_symbol(&mut self, kind: SymbolKind) -> SymbolId {
        self.symbols.push(Symbol {
            kind,
            state: SymbolState::Unbound,
        })
    }

    pub fn symbol(&self, symbol: SymbolId) -> &Symbol {
        &self.symbols[symbol]
    }

    pub fn bind(&mut self, symbol: SymbolId, owner: NodeId) -> Result<(), InternalError> {
        let entry = &mut self.symbols[symbol];

        if let SymbolState::Bound(_) = entry.state {
            return Err(InternalError::SymbolAlreadyBound {
                symbol: symbol.to_string(),
            });
        }

        entry.state = SymbolState::Bound(owner);
        Ok(())
    }

    /// The node a symbol was bound to
    pub fn owner(&self, symbol: SymbolId) -> Result<NodeId, InternalError> {
        match self.symbols[symbol].state {
            SymbolState::Bound(owner) => Ok(owner),
            SymbolState::Unbound => Err(InternalError::UnboundSymbol {
                symbol: symbol.to_string(),
            }),
        }
    }

    /// Name of the declaration a node introduces
    pub fn declared_name(&self, id: NodeId) -> Option<Name> {
        match &self.nodes[id].kind {
            NodeKind::Class(class) => Some(class.name),
            NodeKind::Function(function) => Some(function.name),
            NodeKind::Parameter(parameter) => Some(parameter.name),
            NodeKind::Variable(variable) => Some(variable.name),
            NodeKind::File(_) | NodeKind::Body(_) | NodeKind::Expression(_) => None,
        }
    }

    /// Child nodes in tree order. Expressions are owned by their node and are
    /// not part of the arena.
    pub fn children(&self, id: NodeId) -> Vec<NodeId> {
        match &self.nodes[id].kind {
            NodeKind::File(file) => file.statements.clone(),
            NodeKind::Class(class) => class.statements.clone(),
            NodeKind::Function(function) => {
                let mut children = function.parameters.clone();
                children.push(function.body);
                children
            }
            NodeKind::Body(body) => body.statements.clone(),
            NodeKind::Parameter(_) | NodeKind::Variable(_) | NodeKind::Expression(_) => {
                Vec::new()
            }
        }
    }

    /// Walks the parent links upwards from `id` until a file or class is found
    pub fn closest_class_container(&self, id: NodeId) -> Option<NodeId> {
        let mut current = self.nodes[id].parent;

        while let Some(node) = current {
            if self.nodes[node].kind.is_class_container() {
                return Some(node);
            }

            current = self.nodes[node].parent;
        }

        None
    }

    /// Direct statement list of a file, class or body
    pub fn statements_mut(&mut self, id: NodeId) -> Result<&mut Vec<NodeId>, InternalError> {
        match &mut self.nodes[id].kind {
            NodeKind::File(file) => Ok(&mut file.statements),
            NodeKind::Class(class) => Ok(&mut class.statements),
            NodeKind::Body(body) => Ok(&mut body.statements),
            other => Err(InternalError::UnexpectedNode {
                expected: "statement container",
                found: other.name(),
            }),
        }
    }
}

/// A converted file together with the arena holding it and the pre-built
/// built-in declarations
#[derive(Debug, Clone)]
pub struct Mir {
    pub arena: Arena,
    pub file: NodeId,
    pub builtins_file: NodeId,
    builtins: HashMap<SymbolId, BuiltIn>,
}

impl Mir {
    pub fn new(
        arena: Arena,
        file: NodeId,
        builtins_file: NodeId,
        builtins: HashMap<SymbolId, BuiltIn>,
    ) -> Self {
        Self {
            arena,
            file,
            builtins_file,
            builtins,
        }
    }

    /// The built-in a symbol refers to. Code generation emits calls through
    /// these symbols specially instead of calling a declared function.
    pub fn builtin_for(&self, symbol: SymbolId) -> Option<BuiltIn> {
        self.builtins.get(&symbol).copied()
    }

    pub fn builtin_symbol(&self, built_in: BuiltIn) -> Option<SymbolId> {
        self.builtins
            .iter()
            .find_map(|(symbol, candidate)| (*candidate == built_in).then_some(*symbol))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parameter(arena: &mut Arena, name: &str) -> (SymbolId, NodeId) {
        let symbol = arena.new_symbol(SymbolKind::Parameter);
        let node = arena.push(
            NodeKind::Parameter(Parameter {
                symbol,
                name: Name::new(name),
            }),
            Span::NONE,
        );

        (symbol, node)
    }

    #[test]
    fn symbols_bind_exactly_once() {
        let mut arena = Arena::new();
        let (symbol, node) = parameter(&mut arena, "a");

        assert!(matches!(
            arena.owner(symbol),
            Err(InternalError::UnboundSymbol { .. })
        ));

        arena.bind(symbol, node).unwrap();
        assert_eq!(arena.owner(symbol), Ok(node));

        assert!(matches!(
            arena.bind(symbol, node),
            Err(InternalError::SymbolAlreadyBound { .. })
        ));
    }

    #[test]
    fn typed_accessors_check_the_variant() {
        let mut arena = Arena::new();
        let (_, node) = parameter(&mut arena, "a");

        assert!(arena.parameter(node).is_ok());
        assert_eq!(
            arena.function(node).unwrap_err(),
            InternalError::UnexpectedNode {
                expected: "Function",
                found: "Parameter",
            }
        );
        assert_eq!(arena.declared_name(node), Some(Name::new("a")));
    }
}
