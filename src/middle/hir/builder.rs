use super::{
    Body, Expression, ExpressionKind, File, Function, HirId, ObjectEntry, Parameter, Reference,
    Statement, Variable,
};
use crate::{
    diagnostics::{Diagnostics, report_error},
    error::InternalError,
    frontend::{
        intern::Name,
        lexer::Span,
        syntax::{SyntaxKind, SyntaxTree},
    },
    index::Idx,
    middle::ConstValue,
};

/// Name given to declarations whose name is missing from the source
const ANONYMOUS: &str = "<anonymous>";

/// Converts a [`SyntaxTree`] into HIR. Missing or malformed pieces of source
/// are reported and replaced with placeholders so the rest of the file is
/// still converted. A node shape the builder does not know about is an
/// [`InternalError`].
pub struct HirBuilder<'tree, 'diagnostics, T: SyntaxTree> {
    tree: &'tree T,
    diagnostics: &'diagnostics mut Diagnostics,
    next_id: usize,
}

type BuildResult<T> = Result<T, InternalError>;

impl<'tree, 'diagnostics, T: SyntaxTree> HirBuilder<'tree, 'diagnostics, T> {
    pub fn build_file(
        tree: &'tree T,
        file_name: impl Into<String>,
        diagnostics: &'diagnostics mut Diagnostics,
    ) -> BuildResult<File> {
        let mut builder = Self {
            tree,
            diagnostics,
            next_id: 0,
        };

        let root = tree.root();

        if tree.kind(root) != SyntaxKind::File {
            return Err(InternalError::UnexpectedSyntax {
                kind: tree.kind(root),
                span: tree.span(root),
                context: "file",
            });
        }

        let id = builder.create_id();
        let statements = builder.convert_statements(root)?;

        Ok(File {
            id,
            name: file_name.into(),
            span: tree.span(root),
            statements,
        })
    }

    fn create_id(&mut self) -> HirId {
        let id = HirId::new(self.next_id);
        self.next_id += 1;
        id
    }

    fn convert_statements(&mut self, node: T::Node) -> BuildResult<Vec<Statement>> {
        let tree = self.tree;
        let mut statements = Vec::new();

        for child in tree.children(node) {
            if let Some(statement) = self.convert(*child)? {
                statements.push(statement);
            }
        }

        Ok(statements)
    }

    /// Separators and nodes which already produced an error convert to `None`
    pub fn convert(&mut self, node: T::Node) -> BuildResult<Option<Statement>> {
        let statement = match self.tree.kind(node) {
            SyntaxKind::Function => Some(Statement::Function(self.convert_function(node)?)),
            SyntaxKind::Variable => Some(Statement::Variable(self.convert_variable(node)?)),
            SyntaxKind::Semicolon | SyntaxKind::Comma => None,
            _ => self.convert_expression(node)?.map(Statement::Expression),
        };

        Ok(statement)
    }

    fn identifier_name(&self, node: T::Node) -> Option<Name> {
        self.tree
            .find_child(node, SyntaxKind::Identifier)
            .map(|identifier| Name::new(self.tree.text(identifier)))
    }

    fn convert_function(&mut self, node: T::Node) -> BuildResult<Function> {
        let span = self.tree.span(node);
        let id = self.create_id();

        let name = self.identifier_name(node).unwrap_or_else(|| {
            report_error!(self.diagnostics, span, "Expected function name");
            Name::new(ANONYMOUS)
        });

        let parameters = match self.tree.find_child(node, SyntaxKind::ParameterList) {
            Some(list) => self.convert_parameter_list(list),
            None => {
                report_error!(self.diagnostics, span, "Expected parameter list");
                Vec::new()
            }
        };

        let body = match self.tree.find_child(node, SyntaxKind::Block) {
            Some(block) => self.convert_body(block)?,
            None => {
                report_error!(self.diagnostics, span, "Expected function body");

                Body {
                    id: self.create_id(),
                    span: Span::NONE,
                    statements: Vec::new(),
                }
            }
        };

        Ok(Function {
            id,
            name,
            span,
            parameters,
            body,
        })
    }

    fn convert_parameter_list(&mut self, node: T::Node) -> Vec<Parameter> {
        let tree = self.tree;

        tree.children_of_kind(node, SyntaxKind::Parameter)
            .filter_map(|parameter| {
                let name = self.identifier_name(parameter)?;

                Some(Parameter {
                    id: self.create_id(),
                    name,
                    span: tree.span(parameter),
                })
            })
            .collect()
    }

    fn convert_body(&mut self, node: T::Node) -> BuildResult<Body> {
        let id = self.create_id();

        Ok(Body {
            id,
            span: self.tree.span(node),
            statements: self.convert_statements(node)?,
        })
    }

    fn convert_variable(&mut self, node: T::Node) -> BuildResult<Variable> {
        let span = self.tree.span(node);
        let id = self.create_id();

        let name = self.identifier_name(node).unwrap_or_else(|| {
            report_error!(self.diagnostics, span, "Expected variable name");
            Name::new(ANONYMOUS)
        });

        let tree = self.tree;
        let initializer = tree
            .children(node)
            .iter()
            .copied()
            .find(|child| tree.kind(*child) != SyntaxKind::Identifier);

        let initializer = match initializer {
            Some(initializer) => self.convert_expression(initializer)?,
            None => None,
        };

        Ok(Variable {
            id,
            name,
            span,
            initializer,
        })
    }

    /// `None` means an error was reported for the expression
    fn convert_expression(&mut self, node: T::Node) -> BuildResult<Option<Expression>> {
        let span = self.tree.span(node);

        let kind = match self.tree.kind(node) {
            SyntaxKind::StringConstant => {
                Some(ExpressionKind::Const(ConstValue::Str(unquote(self.tree.text(node)))))
            }
            SyntaxKind::NumberConstant => match self.tree.text(node).parse::<f64>() {
                Ok(value) => Some(ExpressionKind::Const(ConstValue::Number(value))),
                Err(_) => {
                    report_error!(self.diagnostics, span, "Malformed number literal");
                    None
                }
            },
            SyntaxKind::BooleanConstant => match self.tree.text(node) {
                "true" => Some(ExpressionKind::Const(ConstValue::Bool(true))),
                "false" => Some(ExpressionKind::Const(ConstValue::Bool(false))),
                _ => {
                    report_error!(self.diagnostics, span, "Malformed boolean literal");
                    None
                }
            },
            SyntaxKind::Reference => Some(ExpressionKind::GetValue(self.convert_reference(node)?)),
            SyntaxKind::Call => self.convert_call(node)?,
            SyntaxKind::Object => Some(self.convert_object(node)?),
            SyntaxKind::Binary => self.convert_binary(node)?,
            SyntaxKind::BadCharacter => {
                report_error!(self.diagnostics, span, "Found bad character");
                None
            }
            kind => {
                return Err(InternalError::UnexpectedSyntax {
                    kind,
                    span,
                    context: "expression",
                });
            }
        };

        Ok(kind.map(|kind| Expression { span, kind }))
    }

    fn convert_reference(&mut self, node: T::Node) -> BuildResult<Reference> {
        let Some(name) = self.identifier_name(node) else {
            return Err(InternalError::UnexpectedSyntax {
                kind: self.tree.kind(node),
                span: self.tree.span(node),
                context: "reference",
            });
        };

        Ok(Reference {
            name,
            span: self.tree.span(node),
            candidate: None,
        })
    }

    fn convert_call(&mut self, node: T::Node) -> BuildResult<Option<ExpressionKind>> {
        let Some(receiver) = self.tree.first_child(node) else {
            return Err(InternalError::UnexpectedSyntax {
                kind: SyntaxKind::Call,
                span: self.tree.span(node),
                context: "call receiver",
            });
        };

        let receiver = self.convert_expression(receiver)?;

        let mut arguments = Vec::new();

        if let Some(list) = self.tree.find_child(node, SyntaxKind::ArgumentList) {
            let tree = self.tree;

            for argument in tree.children_of_kind(list, SyntaxKind::Argument) {
                let value = match tree.first_child(argument) {
                    Some(value) => self.convert_expression(value)?,
                    None => None,
                };

                arguments.push(value);
            }
        }

        Ok(receiver.map(|receiver| ExpressionKind::Call {
            receiver: Box::new(receiver),
            arguments,
        }))
    }

    fn convert_object(&mut self, node: T::Node) -> BuildResult<ExpressionKind> {
        let tree = self.tree;
        let mut entries: Vec<ObjectEntry> = Vec::new();

        for clause in tree.children_of_kind(node, SyntaxKind::ObjectClause) {
            let Some(key) = tree
                .find_child(clause, SyntaxKind::ObjectKey)
                .and_then(|key| self.identifier_name(key))
            else {
                report_error!(self.diagnostics, tree.span(clause), "Expected property name");
                continue;
            };

            // The parser already reported a missing value
            let Some(value) = tree
                .find_child(clause, SyntaxKind::ObjectValue)
                .and_then(|value| tree.first_child(value))
            else {
                continue;
            };

            let Some(value) = self.convert_expression(value)? else {
                continue;
            };

            // Later duplicates win but keep the position of the first one
            match entries.iter_mut().find(|entry| entry.key == key) {
                Some(entry) => entry.value = value,
                None => entries.push(ObjectEntry { key, value }),
            }
        }

        Ok(ExpressionKind::Object(entries))
    }

    fn convert_binary(&mut self, node: T::Node) -> BuildResult<Option<ExpressionKind>> {
        let span = self.tree.span(node);
        let children = self.tree.children(node);

        let (Some(lhs), Some(operator)) = (
            children.first().copied(),
            self.tree.find_child(node, SyntaxKind::Operator),
        ) else {
            return Err(InternalError::UnexpectedSyntax {
                kind: SyntaxKind::Binary,
                span,
                context: "binary expression",
            });
        };

        // Missing right hand sides were reported by the parser
        let Some(rhs) = children.get(2).copied() else {
            return Ok(None);
        };

        match self.tree.text(operator) {
            "=" => self.convert_assignment(lhs, rhs),
            "." => {
                let Some(property) = self.property_name(rhs) else {
                    return Ok(None);
                };

                let Some(receiver) = self.convert_expression(lhs)? else {
                    return Ok(None);
                };

                Ok(Some(ExpressionKind::GetProperty {
                    receiver: Box::new(receiver),
                    property,
                }))
            }
            _ => Err(InternalError::UnexpectedSyntax {
                kind: SyntaxKind::Operator,
                span: self.tree.span(operator),
                context: "binary operator",
            }),
        }
    }

    fn convert_assignment(
        &mut self,
        target: T::Node,
        value: T::Node,
    ) -> BuildResult<Option<ExpressionKind>> {
        match self.tree.kind(target) {
            SyntaxKind::Reference => {
                let target = self.convert_reference(target)?;
                let value = self.convert_expression(value)?;

                Ok(value.map(|value| ExpressionKind::SetValue {
                    target,
                    value: Box::new(value),
                }))
            }
            SyntaxKind::Binary if self.is_member_access(target) => {
                let children = self.tree.children(target);
                let (Some(receiver), Some(property)) =
                    (children.first().copied(), children.get(2).copied())
                else {
                    return Ok(None);
                };

                let Some(property) = self.property_name(property) else {
                    return Ok(None);
                };

                let receiver = self.convert_expression(receiver)?;
                let value = self.convert_expression(value)?;

                Ok(receiver
                    .zip(value)
                    .map(|(receiver, value)| ExpressionKind::SetProperty {
                        receiver: Box::new(receiver),
                        property,
                        value: Box::new(value),
                    }))
            }
            _ => {
                report_error!(
                    self.diagnostics,
                    self.tree.span(target),
                    "Invalid assignment target"
                );
                Ok(None)
            }
        }
    }

    fn is_member_access(&self, node: T::Node) -> bool {
        self.tree
            .find_child(node, SyntaxKind::Operator)
            .is_some_and(|operator| self.tree.text(operator) == ".")
    }

    fn property_name(&mut self, node: T::Node) -> Option<Name> {
        if self.tree.kind(node) == SyntaxKind::Reference {
            if let Some(name) = self.identifier_name(node) {
                return Some(name);
            }
        }

        report_error!(self.diagnostics, self.tree.span(node), "Expected property name");
        None
    }
}

/// Strips the surrounding quotes of a string literal and unescapes `\"`
fn unquote(text: &str) -> String {
    let text = text.strip_prefix('"').unwrap_or(text);
    let text = text.strip_suffix('"').unwrap_or(text);

    text.replace("\\\"", "\"")
}
