//! Turns every function into a class with a single `invoke` method so that
//! functions can be stored and passed around as ordinary values. The
//! declaration site becomes a variable holding a new instance of that class.

use hashbrown::HashMap;

use crate::{
    error::InternalError,
    frontend::{intern::Name, lexer::Span},
    middle::mir::{
        Arena, Class, Expression, ExpressionKind, Function, Mir, NodeId, NodeKind, Origin,
        SymbolId, SymbolKind, Variable,
        parents::patch_parents,
        transform::{self, TransformResult, Transformer},
    },
};

/// Name of the method holding a reified function's body
pub const INVOKE: &str = "invoke";

/// Replaces every source function with a variable holding an instance of a
/// new class, appended to the closest file or class.
///
/// Names are not deduplicated: two functions called `a` in one container
/// become two sibling classes called `a`, told apart only by their symbols.
/// Statements keep their order, so a call written before the function ends
/// up ahead of the variable it reads once the initializer pass collects them.
pub fn reify_functions(mir: &mut Mir) -> Result<(), InternalError> {
    let mut reifier = FunctionReifier::default();
    transform::transform_node(&mut reifier, &mut mir.arena, mir.file)?;

    // New classes are only added once the whole file has been walked, so
    // the walk never sees a half reified container
    for (container, class) in reifier.pending_classes {
        mir.arena.statements_mut(container)?.push(class);
        patch_parents(&mut mir.arena, class, Some(container));
    }

    if !reifier.remapped.is_empty() {
        let mut remapper = SymbolRemapper {
            remapped: &reifier.remapped,
        };
        transform::transform_node(&mut remapper, &mut mir.arena, mir.file)?;
    }

    Ok(())
}

#[derive(Debug, Default)]
struct FunctionReifier {
    /// Classes waiting to be appended to their container, in creation order
    pending_classes: Vec<(NodeId, NodeId)>,
    /// Function symbol to the symbol of the variable replacing it
    remapped: HashMap<SymbolId, SymbolId>,
}

impl FunctionReifier {
    fn reify(&mut self, arena: &mut Arena, id: NodeId) -> TransformResult<NodeId> {
        let function = arena.function(id)?.clone();
        let node = arena.node(id);
        let (span, parent) = (node.span, node.parent);

        let Some(container) = arena.closest_class_container(id) else {
            return Err(InternalError::MissingClassContainer {
                name: function.name,
            });
        };

        let invoke_symbol = arena.new_symbol(SymbolKind::Function);
        let invoke = arena.push(
            NodeKind::Function(Function {
                symbol: invoke_symbol,
                name: Name::new(INVOKE),
                parameters: function.parameters,
                body: function.body,
                is_native: true,
                is_static: false,
                origin: Origin::Invoke,
            }),
            span,
        );
        arena.bind(invoke_symbol, invoke)?;

        let class_symbol = arena.new_symbol(SymbolKind::Class);
        let class = arena.push(
            NodeKind::Class(Class {
                symbol: class_symbol,
                name: function.name,
                statements: vec![invoke],
                origin: Origin::FunctionClass,
            }),
            Span::NONE,
        );
        arena.bind(class_symbol, class)?;

        let variable_symbol = arena.new_symbol(SymbolKind::Variable);
        let variable = arena.push(
            NodeKind::Variable(Variable {
                symbol: variable_symbol,
                name: function.name,
                value: Some(Expression {
                    span: Span::NONE,
                    kind: ExpressionKind::NewInstance {
                        class: class_symbol,
                        arguments: Vec::new(),
                    },
                }),
            }),
            Span::NONE,
        );
        arena.bind(variable_symbol, variable)?;
        arena.node_mut(variable).parent = parent;

        tracing::trace!(
            function = %function.name,
            %container,
            "reified function into class"
        );

        self.pending_classes.push((container, class));
        self.remapped.insert(function.symbol, variable_symbol);

        Ok(variable)
    }
}

impl Transformer for FunctionReifier {
    fn transform_function(&mut self, arena: &mut Arena, id: NodeId) -> TransformResult<NodeId> {
        // Nested functions are reified first, while their parent links still
        // lead through the enclosing function
        transform::walk_function(self, arena, id)?;

        match arena.function(id)?.origin {
            Origin::Source | Origin::FunctionClass | Origin::FileClass => self.reify(arena, id),
            Origin::BuiltIn | Origin::Invoke | Origin::ClassInitializer => Ok(id),
        }
    }
}

/// Points every read and write of a reified function at its replacement
/// variable
struct SymbolRemapper<'remapped> {
    remapped: &'remapped HashMap<SymbolId, SymbolId>,
}

impl Transformer for SymbolRemapper<'_> {
    fn transform_expression(&mut self, expression: &mut Expression) -> TransformResult<()> {
        match &mut expression.kind {
            ExpressionKind::GetValue(symbol) | ExpressionKind::SetValue { symbol, .. } => {
                if let Some(remapped) = self.remapped.get(symbol) {
                    *symbol = *remapped;
                }
            }
            _ => {}
        }

        transform::walk_expression(self, expression)
    }
}

#[cfg(test)]
mod tests {
    use indoc::indoc;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::middle::{lowering::tests::mir, mir::dump::dump};

    #[test]
    fn functions_become_classes_and_variables() {
        let mut mir = mir(
            "test.js",
            indoc! {r#"
                function a() { b(); }
                function b(x) { x = a; }
            "#},
        );

        reify_functions(&mut mir).unwrap();

        assert_eq!(
            dump(&mir),
            indoc! {r#"
                FILE name: test.js
                  VAR name: a
                    NEW symbol: class a
                  VAR name: b
                    NEW symbol: class b
                  CLASS name: a origin: FunctionClass
                    FUNCTION name: invoke isNative: true isStatic: false origin: Invoke
                      BODY
                        CALL:
                          GET: variable b
                          ARGS:
                  CLASS name: b origin: FunctionClass
                    FUNCTION name: invoke isNative: true isStatic: false origin: Invoke
                      PARAMETER name: x
                      BODY
                        SET: parameter x
                          GET: variable a
            "#}
        );
    }

    #[test]
    fn nested_functions_land_in_the_closest_container() {
        let mut mir = mir("test.js", "function outer() { function inner() {} inner(); }");

        reify_functions(&mut mir).unwrap();

        let statements = mir.arena.file(mir.file).unwrap().statements.clone();
        let names = statements
            .iter()
            .map(|id| {
                let node = &mir.arena.node(*id);
                format!("{} {}", node.kind.name(), mir.arena.declared_name(*id).unwrap())
            })
            .collect::<Vec<_>>();

        assert_eq!(
            names,
            vec!["Variable outer", "Class inner", "Class outer"]
        );

        for id in statements {
            assert_eq!(mir.arena.node(id).parent, Some(mir.file));
        }
    }

    #[test]
    fn parents_follow_the_moved_nodes() {
        let mut mir = mir("test.js", "function f(a) { var b = a; }");

        reify_functions(&mut mir).unwrap();

        let statements = &mir.arena.file(mir.file).unwrap().statements;
        let class = statements[1];
        let invoke = mir.arena.class(class).unwrap().statements[0];
        let function = mir.arena.function(invoke).unwrap();
        let b = mir.arena.body(function.body).unwrap().statements[0];

        assert_eq!(mir.arena.node(statements[0]).parent, Some(mir.file));
        assert_eq!(mir.arena.node(class).parent, Some(mir.file));
        assert_eq!(mir.arena.node(invoke).parent, Some(class));
        assert_eq!(mir.arena.node(function.parameters[0]).parent, Some(invoke));
        assert_eq!(mir.arena.node(b).parent, Some(invoke));
        assert_eq!(mir.arena.closest_class_container(b), Some(class));
    }

    #[test]
    fn builtins_are_left_alone() {
        let mut mir = mir("test.js", "print(1);");
        let symbol = mir.builtin_symbol(crate::middle::hir::BuiltIn::Print).unwrap();

        reify_functions(&mut mir).unwrap();

        let owner = mir.arena.owner(symbol).unwrap();
        assert_eq!(mir.arena.function(owner).unwrap().origin, Origin::BuiltIn);
        assert!(dump(&mir).contains("GET: function print"));
    }

    #[test]
    fn functions_without_a_container_are_internal_errors() {
        use crate::middle::mir::{Body, File};

        let mut arena = Arena::new();
        let body = arena.push(
            NodeKind::Body(Body {
                statements: Vec::new(),
            }),
            Span::NONE,
        );
        let symbol = arena.new_symbol(SymbolKind::Function);
        let function = arena.push(
            NodeKind::Function(Function {
                symbol,
                name: Name::new("f"),
                parameters: Vec::new(),
                body,
                is_native: false,
                is_static: false,
                origin: Origin::Source,
            }),
            Span::NONE,
        );
        arena.bind(symbol, function).unwrap();

        // Parent links are never patched, so `f` has no way up to the file
        let file = arena.push(
            NodeKind::File(File {
                name: "test.js".to_owned(),
                statements: vec![function],
            }),
            Span::NONE,
        );
        let mut mir = Mir::new(arena, file, file, HashMap::new());

        assert_eq!(
            reify_functions(&mut mir).unwrap_err(),
            InternalError::MissingClassContainer {
                name: Name::new("f"),
            }
        );
    }
}
