//! Read only and mutating traversals over the HIR. Every `visit_*` method
//! defaults to the matching `walk_*` function which recurses into the node's
//! children, so implementors only override the nodes they care about.

use super::{
    Body, Expression, ExpressionKind, File, Function, Parameter, Reference, Statement, Variable,
};

pub trait Visitor: Sized {
    fn visit_file(&mut self, file: &File) {
        walk_file(self, file)
    }

    fn visit_statement(&mut self, statement: &Statement) {
        walk_statement(self, statement)
    }

    fn visit_function(&mut self, function: &Function) {
        walk_function(self, function)
    }

    fn visit_parameter(&mut self, _parameter: &Parameter) {}

    fn visit_body(&mut self, body: &Body) {
        walk_body(self, body)
    }

    fn visit_variable(&mut self, variable: &Variable) {
        walk_variable(self, variable)
    }

    fn visit_expression(&mut self, expression: &Expression) {
        walk_expression(self, expression)
    }

    fn visit_reference(&mut self, _reference: &Reference) {}
}

pub fn walk_file(visitor: &mut impl Visitor, file: &File) {
    for statement in &file.statements {
        visitor.visit_statement(statement);
    }
}

pub fn walk_statement(visitor: &mut impl Visitor, statement: &Statement) {
    match statement {
        Statement::Function(function) => visitor.visit_function(function),
        Statement::Variable(variable) => visitor.visit_variable(variable),
        Statement::Expression(expression) => visitor.visit_expression(expression),
    }
}

pub fn walk_function(visitor: &mut impl Visitor, function: &Function) {
    for parameter in &function.parameters {
        visitor.visit_parameter(parameter);
    }

    visitor.visit_body(&function.body);
}

pub fn walk_body(visitor: &mut impl Visitor, body: &Body) {
    for statement in &body.statements {
        visitor.visit_statement(statement);
    }
}

pub fn walk_variable(visitor: &mut impl Visitor, variable: &Variable) {
    if let Some(initializer) = &variable.initializer {
        visitor.visit_expression(initializer);
    }
}

pub fn walk_expression(visitor: &mut impl Visitor, expression: &Expression) {
    match &expression.kind {
        ExpressionKind::Const(_) => {}
        ExpressionKind::GetValue(reference) => visitor.visit_reference(reference),
        ExpressionKind::Call {
            receiver,
            arguments,
        } => {
            visitor.visit_expression(receiver);

            for argument in arguments.iter().flatten() {
                visitor.visit_expression(argument);
            }
        }
        ExpressionKind::Object(entries) => {
            for entry in entries {
                visitor.visit_expression(&entry.value);
            }
        }
        ExpressionKind::SetValue { target, value } => {
            visitor.visit_expression(value);
            visitor.visit_reference(target);
        }
        ExpressionKind::GetProperty { receiver, .. } => visitor.visit_expression(receiver),
        ExpressionKind::SetProperty {
            receiver, value, ..
        } => {
            visitor.visit_expression(receiver);
            visitor.visit_expression(value);
        }
    }
}

pub trait MutVisitor: Sized {
    fn visit_file(&mut self, file: &mut File) {
        walk_file_mut(self, file)
    }

    fn visit_statement(&mut self, statement: &mut Statement) {
        walk_statement_mut(self, statement)
    }

    fn visit_function(&mut self, function: &mut Function) {
        walk_function_mut(self, function)
    }

    fn visit_parameter(&mut self, _parameter: &mut Parameter) {}

    fn visit_body(&mut self, body: &mut Body) {
        walk_body_mut(self, body)
    }

    fn visit_variable(&mut self, variable: &mut Variable) {
        walk_variable_mut(self, variable)
    }

    fn visit_expression(&mut self, expression: &mut Expression) {
        walk_expression_mut(self, expression)
    }

    fn visit_reference(&mut self, _reference: &mut Reference) {}
}

pub fn walk_file_mut(visitor: &mut impl MutVisitor, file: &mut File) {
    for statement in &mut file.statements {
        visitor.visit_statement(statement);
    }
}

pub fn walk_statement_mut(visitor: &mut impl MutVisitor, statement: &mut Statement) {
    match statement {
        Statement::Function(function) => visitor.visit_function(function),
        Statement::Variable(variable) => visitor.visit_variable(variable),
        Statement::Expression(expression) => visitor.visit_expression(expression),
    }
}

pub fn walk_function_mut(visitor: &mut impl MutVisitor, function: &mut Function) {
    for parameter in &mut function.parameters {
        visitor.visit_parameter(parameter);
    }

    visitor.visit_body(&mut function.body);
}

pub fn walk_body_mut(visitor: &mut impl MutVisitor, body: &mut Body) {
    for statement in &mut body.statements {
        visitor.visit_statement(statement);
    }
}

pub fn walk_variable_mut(visitor: &mut impl MutVisitor, variable: &mut Variable) {
    if let Some(initializer) = &mut variable.initializer {
        visitor.visit_expression(initializer);
    }
}

pub fn walk_expression_mut(visitor: &mut impl MutVisitor, expression: &mut Expression) {
    match &mut expression.kind {
        ExpressionKind::Const(_) => {}
        ExpressionKind::GetValue(reference) => visitor.visit_reference(reference),
        ExpressionKind::Call {
            receiver,
            arguments,
        } => {
            visitor.visit_expression(receiver);

            for argument in arguments.iter_mut().flatten() {
                visitor.visit_expression(argument);
            }
        }
        ExpressionKind::Object(entries) => {
            for entry in entries {
                visitor.visit_expression(&mut entry.value);
            }
        }
        ExpressionKind::SetValue { target, value } => {
            visitor.visit_expression(value);
            visitor.visit_reference(target);
        }
        ExpressionKind::GetProperty { receiver, .. } => visitor.visit_expression(receiver),
        ExpressionKind::SetProperty {
            receiver, value, ..
        } => {
            visitor.visit_expression(receiver);
            visitor.visit_expression(value);
        }
    }
}
