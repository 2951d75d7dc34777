//! The concrete syntax tree handed to the HIR builder.
//!
//! The builder only talks to the [`SyntaxTree`] trait, so any producer that can
//! answer "what kind is this node, where is it, what are its children" can feed
//! the pipeline. [`ParsedFile`] is the producer used by this crate.

use std::fmt::Write;

use strum::Display;

use crate::{
    frontend::{SourceFile, lexer::Span},
    index::{IndexVec, newtype_index},
};

newtype_index! {
    pub struct SyntaxNodeId;
}

/// Grammar tag of a syntax node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum SyntaxKind {
    File,
    Function,
    Variable,
    ParameterList,
    Parameter,
    Block,
    Argument,
    ArgumentList,
    Call,
    /// `lhs <operator> rhs` where the operator is `=` or `.`
    Binary,
    Operator,
    Reference,
    Object,
    ObjectClause,
    ObjectKey,
    ObjectValue,
    StringConstant,
    NumberConstant,
    BooleanConstant,
    Identifier,
    Semicolon,
    Comma,
    BadCharacter,
}

pub trait SyntaxTree {
    type Node: Copy + Eq + core::fmt::Debug;

    fn root(&self) -> Self::Node;

    fn kind(&self, node: Self::Node) -> SyntaxKind;

    fn span(&self, node: Self::Node) -> Span;

    /// Source text covered by the node
    fn text(&self, node: Self::Node) -> &str;

    fn children(&self, node: Self::Node) -> &[Self::Node];

    fn find_child(&self, node: Self::Node, kind: SyntaxKind) -> Option<Self::Node> {
        self.children(node)
            .iter()
            .copied()
            .find(|child| self.kind(*child) == kind)
    }

    fn first_child(&self, node: Self::Node) -> Option<Self::Node> {
        self.children(node).first().copied()
    }

    fn children_of_kind(
        &self,
        node: Self::Node,
        kind: SyntaxKind,
    ) -> impl Iterator<Item = Self::Node> {
        self.children(node)
            .iter()
            .copied()
            .filter(move |child| self.kind(*child) == kind)
    }
}

#[derive(Debug, Clone)]
pub struct SyntaxNode {
    pub kind: SyntaxKind,
    pub span: Span,
    pub children: Vec<SyntaxNodeId>,
}

/// Arena backed syntax tree of one source file
#[derive(Debug)]
pub struct ParsedFile<'source> {
    pub source: &'source SourceFile,
    pub nodes: IndexVec<SyntaxNodeId, SyntaxNode>,
    pub root: SyntaxNodeId,
}

impl<'source> SyntaxTree for ParsedFile<'source> {
    type Node = SyntaxNodeId;

    fn root(&self) -> SyntaxNodeId {
        self.root
    }

    fn kind(&self, node: SyntaxNodeId) -> SyntaxKind {
        self.nodes[node].kind
    }

    fn span(&self, node: SyntaxNodeId) -> Span {
        self.nodes[node].span
    }

    fn text(&self, node: SyntaxNodeId) -> &str {
        self.source.value_of_span(self.nodes[node].span)
    }

    fn children(&self, node: SyntaxNodeId) -> &[SyntaxNodeId] {
        &self.nodes[node].children
    }
}

impl ParsedFile<'_> {
    /// Indented rendering of the tree, leaves include their source text
    pub fn dump(&self) -> String {
        let mut output = String::new();
        self.dump_node(&mut output, self.root, 0);
        output
    }

    fn dump_node(&self, output: &mut String, node: SyntaxNodeId, depth: usize) {
        let syntax = &self.nodes[node];
        let indent = "  ".repeat(depth);

        if syntax.children.is_empty() {
            let _ = writeln!(
                output,
                "{indent}{} {} {:?}",
                syntax.kind,
                syntax.span,
                self.text(node)
            );
        } else {
            let _ = writeln!(output, "{indent}{} {}", syntax.kind, syntax.span);
        }

        for child in &syntax.children {
            self.dump_node(output, *child, depth + 1);
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{diagnostics::Diagnostics, frontend::parser::Parser};

    #[test]
    fn queries_children_by_kind() {
        let source = SourceFile::from_memory("test.js", "function f(a, b) {}");
        let mut diagnostics = Diagnostics::new();
        let tree = Parser::parse_file(&source, &mut diagnostics);

        let function = tree.first_child(tree.root()).unwrap();
        assert_eq!(tree.kind(function), SyntaxKind::Function);
        assert_eq!(tree.text(function), "function f(a, b) {}");

        let name = tree.find_child(function, SyntaxKind::Identifier).unwrap();
        assert_eq!(tree.text(name), "f");
        assert_eq!(tree.span(name), Span::new(9, 10));

        let list = tree.find_child(function, SyntaxKind::ParameterList).unwrap();
        let parameters = tree
            .children_of_kind(list, SyntaxKind::Parameter)
            .map(|parameter| tree.text(parameter))
            .collect::<Vec<_>>();

        assert_eq!(parameters, vec!["a", "b"]);
        assert_eq!(tree.children_of_kind(list, SyntaxKind::Comma).count(), 1);
        assert_eq!(tree.find_child(function, SyntaxKind::Variable), None);
    }

    #[test]
    fn kinds_display_like_the_dump() {
        assert_eq!(SyntaxKind::ParameterList.to_string(), "PARAMETER_LIST");
        assert_eq!(SyntaxKind::BadCharacter.to_string(), "BAD_CHARACTER");
    }
}
