//! Rewriting traversal over a MIR tree. A transformer receives each node and
//! returns the node that should take its place, which is the node itself
//! unless a pass overrides the method. The default `walk_*` functions pass
//! every child through the transformer and store the results back in place.

use super::{Arena, Expression, ExpressionKind, NodeId, NodeKind};
use crate::error::InternalError;

pub type TransformResult<T> = Result<T, InternalError>;

pub trait Transformer: Sized {
    fn transform_file(&mut self, arena: &mut Arena, id: NodeId) -> TransformResult<NodeId> {
        walk_container(self, arena, id)
    }

    fn transform_class(&mut self, arena: &mut Arena, id: NodeId) -> TransformResult<NodeId> {
        walk_container(self, arena, id)
    }

    fn transform_function(&mut self, arena: &mut Arena, id: NodeId) -> TransformResult<NodeId> {
        walk_function(self, arena, id)
    }

    fn transform_parameter(&mut self, _arena: &mut Arena, id: NodeId) -> TransformResult<NodeId> {
        Ok(id)
    }

    fn transform_body(&mut self, arena: &mut Arena, id: NodeId) -> TransformResult<NodeId> {
        walk_container(self, arena, id)
    }

    fn transform_variable(&mut self, arena: &mut Arena, id: NodeId) -> TransformResult<NodeId> {
        walk_variable(self, arena, id)
    }

    fn transform_expression(&mut self, expression: &mut Expression) -> TransformResult<()> {
        walk_expression(self, expression)
    }
}

/// Dispatches on the kind of node `id` points at
pub fn transform_node(
    transformer: &mut impl Transformer,
    arena: &mut Arena,
    id: NodeId,
) -> TransformResult<NodeId> {
    match &arena.node(id).kind {
        NodeKind::File(_) => transformer.transform_file(arena, id),
        NodeKind::Class(_) => transformer.transform_class(arena, id),
        NodeKind::Function(_) => transformer.transform_function(arena, id),
        NodeKind::Parameter(_) => transformer.transform_parameter(arena, id),
        NodeKind::Body(_) => transformer.transform_body(arena, id),
        NodeKind::Variable(_) => transformer.transform_variable(arena, id),
        NodeKind::Expression(_) => {
            if let NodeKind::Expression(expression) = &mut arena.node_mut(id).kind {
                transformer.transform_expression(expression)?;
            }

            Ok(id)
        }
    }
}

fn transform_all(
    transformer: &mut impl Transformer,
    arena: &mut Arena,
    nodes: Vec<NodeId>,
) -> TransformResult<Vec<NodeId>> {
    nodes
        .into_iter()
        .map(|node| transform_node(transformer, arena, node))
        .collect()
}

/// Transforms the statements of a file, class or body
pub fn walk_container(
    transformer: &mut impl Transformer,
    arena: &mut Arena,
    id: NodeId,
) -> TransformResult<NodeId> {
    let statements = std::mem::take(arena.statements_mut(id)?);
    let statements = transform_all(transformer, arena, statements)?;

    *arena.statements_mut(id)? = statements;
    Ok(id)
}

pub fn walk_function(
    transformer: &mut impl Transformer,
    arena: &mut Arena,
    id: NodeId,
) -> TransformResult<NodeId> {
    let function = arena.function(id)?;
    let (parameters, body) = (function.parameters.clone(), function.body);

    let parameters = transform_all(transformer, arena, parameters)?;
    let body = transform_node(transformer, arena, body)?;

    let function = arena.function_mut(id)?;
    function.parameters = parameters;
    function.body = body;

    Ok(id)
}

pub fn walk_variable(
    transformer: &mut impl Transformer,
    arena: &mut Arena,
    id: NodeId,
) -> TransformResult<NodeId> {
    if let Some(value) = &mut arena.variable_mut(id)?.value {
        transformer.transform_expression(value)?;
    }

    Ok(id)
}

pub fn walk_expression(
    transformer: &mut impl Transformer,
    expression: &mut Expression,
) -> TransformResult<()> {
    match &mut expression.kind {
        ExpressionKind::Const(_) | ExpressionKind::GetValue(_) => {}
        ExpressionKind::SetValue { value, .. } => transformer.transform_expression(value)?,
        ExpressionKind::GetProperty { receiver, .. } => transformer.transform_expression(receiver)?,
        ExpressionKind::SetProperty {
            receiver, value, ..
        } => {
            transformer.transform_expression(receiver)?;
            transformer.transform_expression(value)?;
        }
        ExpressionKind::Object(entries) => {
            for entry in entries {
                transformer.transform_expression(&mut entry.value)?;
            }
        }
        ExpressionKind::Call {
            receiver,
            arguments,
        } => {
            transformer.transform_expression(receiver)?;

            for argument in arguments.iter_mut().flatten() {
                transformer.transform_expression(argument)?;
            }
        }
        ExpressionKind::NewInstance { arguments, .. } => {
            for argument in arguments.iter_mut().flatten() {
                transformer.transform_expression(argument)?;
            }
        }
    }

    Ok(())
}
