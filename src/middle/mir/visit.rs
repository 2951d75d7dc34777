//! Read only traversal over a MIR tree. `visit_*` methods default to the
//! matching `walk_*` function which visits the node's children in order.

use super::{
    Arena, Body, Class, Expression, ExpressionKind, File, Function, NodeId, NodeKind, Parameter,
    Variable,
};

pub trait Visitor: Sized {
    fn visit_node(&mut self, arena: &Arena, id: NodeId) {
        walk_node(self, arena, id)
    }

    fn visit_file(&mut self, arena: &Arena, _id: NodeId, file: &File) {
        walk_statements(self, arena, &file.statements)
    }

    fn visit_class(&mut self, arena: &Arena, _id: NodeId, class: &Class) {
        walk_statements(self, arena, &class.statements)
    }

    fn visit_function(&mut self, arena: &Arena, _id: NodeId, function: &Function) {
        walk_function(self, arena, function)
    }

    fn visit_parameter(&mut self, _arena: &Arena, _id: NodeId, _parameter: &Parameter) {}

    fn visit_body(&mut self, arena: &Arena, _id: NodeId, body: &Body) {
        walk_statements(self, arena, &body.statements)
    }

    fn visit_variable(&mut self, arena: &Arena, _id: NodeId, variable: &Variable) {
        walk_variable(self, arena, variable)
    }

    fn visit_expression(&mut self, arena: &Arena, expression: &Expression) {
        walk_expression(self, arena, expression)
    }
}

pub fn walk_node(visitor: &mut impl Visitor, arena: &Arena, id: NodeId) {
    match &arena.node(id).kind {
        NodeKind::File(file) => visitor.visit_file(arena, id, file),
        NodeKind::Class(class) => visitor.visit_class(arena, id, class),
        NodeKind::Function(function) => visitor.visit_function(arena, id, function),
        NodeKind::Parameter(parameter) => visitor.visit_parameter(arena, id, parameter),
        NodeKind::Body(body) => visitor.visit_body(arena, id, body),
        NodeKind::Variable(variable) => visitor.visit_variable(arena, id, variable),
        NodeKind::Expression(expression) => visitor.visit_expression(arena, expression),
    }
}

pub fn walk_statements(visitor: &mut impl Visitor, arena: &Arena, statements: &[NodeId]) {
    for statement in statements {
        visitor.visit_node(arena, *statement);
    }
}

pub fn walk_function(visitor: &mut impl Visitor, arena: &Arena, function: &Function) {
    for parameter in &function.parameters {
        visitor.visit_node(arena, *parameter);
    }

    visitor.visit_node(arena, function.body);
}

pub fn walk_variable(visitor: &mut impl Visitor, arena: &Arena, variable: &Variable) {
    if let Some(value) = &variable.value {
        visitor.visit_expression(arena, value);
    }
}

pub fn walk_expression(visitor: &mut impl Visitor, arena: &Arena, expression: &Expression) {
    match &expression.kind {
        ExpressionKind::Const(_) | ExpressionKind::GetValue(_) => {}
        ExpressionKind::SetValue { value, .. } => visitor.visit_expression(arena, value),
        ExpressionKind::GetProperty { receiver, .. } => visitor.visit_expression(arena, receiver),
        ExpressionKind::SetProperty {
            receiver, value, ..
        } => {
            visitor.visit_expression(arena, receiver);
            visitor.visit_expression(arena, value);
        }
        ExpressionKind::Object(entries) => {
            for entry in entries {
                visitor.visit_expression(arena, &entry.value);
            }
        }
        ExpressionKind::Call {
            receiver,
            arguments,
        } => {
            visitor.visit_expression(arena, receiver);

            for argument in arguments.iter().flatten() {
                visitor.visit_expression(arena, argument);
            }
        }
        ExpressionKind::NewInstance { arguments, .. } => {
            for argument in arguments.iter().flatten() {
                visitor.visit_expression(arena, argument);
            }
        }
    }
}
