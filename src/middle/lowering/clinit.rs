use crate::{
    error::InternalError,
    frontend::{intern::Name, lexer::Span},
    middle::mir::{
        Arena, Body, Function, Mir, NodeId, NodeKind, Origin, SymbolKind,
        parents::patch_parents,
        transform::{self, TransformResult, Transformer},
    },
};

/// Name of the synthetic function running a class's loose statements
pub const CLINIT: &str = "<clinit>";

/// Moves every statement of a file or class which isn't a declaration into a
/// static initializer function appended to the same container.
pub fn wrap_initializers(mir: &mut Mir) -> Result<(), InternalError> {
    transform::transform_node(&mut InitializerWrapper, &mut mir.arena, mir.file)?;
    Ok(())
}

struct InitializerWrapper;

impl InitializerWrapper {
    fn hoist(&mut self, arena: &mut Arena, container: NodeId) -> TransformResult<()> {
        let statements = std::mem::take(arena.statements_mut(container)?);
        let (mut declarations, loose): (Vec<_>, Vec<_>) = statements
            .into_iter()
            .partition(|statement| arena.node(*statement).kind.is_declaration());

        if !loose.is_empty() {
            tracing::trace!(
                %container,
                statements = loose.len(),
                "synthesized class initializer"
            );

            let body = arena.push(NodeKind::Body(Body { statements: loose }), Span::NONE);
            let symbol = arena.new_symbol(SymbolKind::Function);
            let clinit = arena.push(
                NodeKind::Function(Function {
                    symbol,
                    name: Name::new(CLINIT),
                    parameters: Vec::new(),
                    body,
                    is_native: true,
                    is_static: true,
                    origin: Origin::ClassInitializer,
                }),
                Span::NONE,
            );

            arena.bind(symbol, clinit)?;
            patch_parents(arena, clinit, Some(container));
            declarations.push(clinit);
        }

        *arena.statements_mut(container)? = declarations;
        Ok(())
    }
}

impl Transformer for InitializerWrapper {
    fn transform_file(&mut self, arena: &mut Arena, id: NodeId) -> TransformResult<NodeId> {
        self.hoist(arena, id)?;
        transform::walk_container(self, arena, id)
    }

    fn transform_class(&mut self, arena: &mut Arena, id: NodeId) -> TransformResult<NodeId> {
        self.hoist(arena, id)?;
        transform::walk_container(self, arena, id)
    }
}
