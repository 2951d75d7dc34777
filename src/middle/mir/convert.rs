use hashbrown::HashMap;

use super::{
    Arena, Body, Expression, ExpressionKind, File, Function, Mir, NodeId, NodeKind, ObjectEntry,
    Origin, Parameter, SymbolId, SymbolKind, Variable, parents::patch_parents,
};
use crate::{
    error::InternalError,
    frontend::{intern::Name, lexer::Span},
    middle::hir::{self, BuiltIn, HirId, Reference, Resolution},
};

/// Name of the pseudo file holding the built-in declarations
pub const BUILTINS_FILE_NAME: &str = "<builtins>";

type ConvertResult<T> = Result<T, InternalError>;

/// Rebuilds a resolved HIR file as MIR.
///
/// The converter owns the symbol table for exactly one file: converting
/// consumes it, so declarations of unrelated files can never share symbols.
/// The HIR must be free of errors, an unresolved reference is an
/// [`InternalError`].
#[derive(Debug)]
pub struct HirToMir {
    arena: Arena,
    symbols: HashMap<HirId, SymbolId>,
    builtins: HashMap<BuiltIn, SymbolId>,
    builtins_file: NodeId,
}

impl HirToMir {
    pub fn new() -> ConvertResult<Self> {
        let mut arena = Arena::new();
        let mut builtins = HashMap::new();
        let mut statements = Vec::new();

        for built_in in BuiltIn::all() {
            let (symbol, function) = build_builtin(&mut arena, built_in)?;

            builtins.insert(built_in, symbol);
            statements.push(function);
        }

        let builtins_file = arena.push(
            NodeKind::File(File {
                name: BUILTINS_FILE_NAME.to_owned(),
                statements,
            }),
            Span::NONE,
        );

        patch_parents(&mut arena, builtins_file, None);

        Ok(Self {
            arena,
            symbols: HashMap::new(),
            builtins,
            builtins_file,
        })
    }

    pub fn convert_file(mut self, file: &hir::File) -> ConvertResult<Mir> {
        // Top level functions can be referenced before they are declared
        for function in file.functions() {
            self.declare_symbol(function.id, SymbolKind::Function);
        }

        let statements = self.convert_statements(&file.statements)?;

        let id = self.arena.push(
            NodeKind::File(File {
                name: file.name.clone(),
                statements,
            }),
            file.span,
        );

        patch_parents(&mut self.arena, id, None);

        tracing::debug!(
            file = %file.name,
            nodes = self.arena.node_count(),
            symbols = self.arena.symbol_count(),
            "converted HIR to MIR"
        );

        let builtins = self
            .builtins
            .into_iter()
            .map(|(built_in, symbol)| (symbol, built_in))
            .collect();

        Ok(Mir::new(self.arena, id, self.builtins_file, builtins))
    }

    /// Returns the symbol of a declaration, allocating it on first sight
    fn declare_symbol(&mut self, id: HirId, kind: SymbolKind) -> SymbolId {
        *self
            .symbols
            .entry(id)
            .or_insert_with(|| self.arena.new_symbol(kind))
    }

    fn reference_symbol(&self, reference: &Reference) -> ConvertResult<SymbolId> {
        let Some(resolution) = reference.candidate else {
            return Err(InternalError::UnresolvedReference {
                name: reference.name,
                span: reference.span,
            });
        };

        let symbol = match resolution {
            Resolution::BuiltIn(built_in) => self.builtins.get(&built_in),
            Resolution::Function(id) | Resolution::Parameter(id) | Resolution::Variable(id) => {
                self.symbols.get(&id)
            }
        };

        symbol.copied().ok_or(InternalError::SymbolNotDefined {
            name: reference.name,
        })
    }

    fn convert_statements(&mut self, statements: &[hir::Statement]) -> ConvertResult<Vec<NodeId>> {
        statements
            .iter()
            .map(|statement| self.convert_statement(statement))
            .collect()
    }

    fn convert_statement(&mut self, statement: &hir::Statement) -> ConvertResult<NodeId> {
        match statement {
            hir::Statement::Function(function) => self.convert_function(function),
            hir::Statement::Variable(variable) => self.convert_variable(variable),
            hir::Statement::Expression(expression) => {
                let expression = self.convert_expression(expression)?;
                let span = expression.span;

                Ok(self.arena.push(NodeKind::Expression(expression), span))
            }
        }
    }

    fn convert_function(&mut self, function: &hir::Function) -> ConvertResult<NodeId> {
        let symbol = self.declare_symbol(function.id, SymbolKind::Function);

        let parameters = function
            .parameters
            .iter()
            .map(|parameter| self.convert_parameter(parameter))
            .collect::<ConvertResult<Vec<_>>>()?;

        let statements = self.convert_statements(&function.body.statements)?;
        let body = self
            .arena
            .push(NodeKind::Body(Body { statements }), function.body.span);

        let id = self.arena.push(
            NodeKind::Function(Function {
                symbol,
                name: function.name,
                parameters,
                body,
                is_native: false,
                is_static: false,
                origin: Origin::Source,
            }),
            function.span,
        );

        self.arena.bind(symbol, id)?;
        Ok(id)
    }

    fn convert_parameter(&mut self, parameter: &hir::Parameter) -> ConvertResult<NodeId> {
        let symbol = self.declare_symbol(parameter.id, SymbolKind::Parameter);

        let id = self.arena.push(
            NodeKind::Parameter(Parameter {
                symbol,
                name: parameter.name,
            }),
            parameter.span,
        );

        self.arena.bind(symbol, id)?;
        Ok(id)
    }

    fn convert_variable(&mut self, variable: &hir::Variable) -> ConvertResult<NodeId> {
        let symbol = self.declare_symbol(variable.id, SymbolKind::Variable);

        let value = variable
            .initializer
            .as_ref()
            .map(|initializer| self.convert_expression(initializer))
            .transpose()?;

        let id = self.arena.push(
            NodeKind::Variable(Variable {
                symbol,
                name: variable.name,
                value,
            }),
            variable.span,
        );

        self.arena.bind(symbol, id)?;
        Ok(id)
    }

    fn convert_expression(&mut self, expression: &hir::Expression) -> ConvertResult<Expression> {
        let kind = match &expression.kind {
            hir::ExpressionKind::Const(value) => ExpressionKind::Const(value.clone()),
            hir::ExpressionKind::GetValue(reference) => {
                ExpressionKind::GetValue(self.reference_symbol(reference)?)
            }
            hir::ExpressionKind::Call {
                receiver,
                arguments,
            } => ExpressionKind::Call {
                receiver: Box::new(self.convert_expression(receiver)?),
                arguments: arguments
                    .iter()
                    .map(|argument| {
                        argument
                            .as_ref()
                            .map(|argument| self.convert_expression(argument))
                            .transpose()
                    })
                    .collect::<ConvertResult<_>>()?,
            },
            hir::ExpressionKind::Object(entries) => ExpressionKind::Object(
                entries
                    .iter()
                    .map(|entry| {
                        Ok(ObjectEntry {
                            key: entry.key,
                            value: self.convert_expression(&entry.value)?,
                        })
                    })
                    .collect::<ConvertResult<_>>()?,
            ),
            hir::ExpressionKind::SetValue { target, value } => ExpressionKind::SetValue {
                value: Box::new(self.convert_expression(value)?),
                symbol: self.reference_symbol(target)?,
            },
            hir::ExpressionKind::GetProperty { receiver, property } => {
                ExpressionKind::GetProperty {
                    receiver: Box::new(self.convert_expression(receiver)?),
                    name: *property,
                }
            }
            hir::ExpressionKind::SetProperty {
                receiver,
                property,
                value,
            } => ExpressionKind::SetProperty {
                receiver: Box::new(self.convert_expression(receiver)?),
                name: *property,
                value: Box::new(self.convert_expression(value)?),
            },
        };

        Ok(Expression {
            span: expression.span,
            kind,
        })
    }
}

fn build_builtin(arena: &mut Arena, built_in: BuiltIn) -> ConvertResult<(SymbolId, NodeId)> {
    let parameters = built_in
        .parameters()
        .iter()
        .map(|name| {
            let symbol = arena.new_symbol(SymbolKind::Parameter);
            let id = arena.push(
                NodeKind::Parameter(Parameter {
                    symbol,
                    name: Name::new(name),
                }),
                Span::NONE,
            );

            arena.bind(symbol, id)?;
            Ok(id)
        })
        .collect::<ConvertResult<Vec<_>>>()?;

    let body = arena.push(
        NodeKind::Body(Body {
            statements: Vec::new(),
        }),
        Span::NONE,
    );

    let symbol = arena.new_symbol(SymbolKind::Function);
    let id = arena.push(
        NodeKind::Function(Function {
            symbol,
            name: built_in.name(),
            parameters,
            body,
            is_native: true,
            is_static: true,
            origin: Origin::BuiltIn,
        }),
        Span::NONE,
    );

    arena.bind(symbol, id)?;
    Ok((symbol, id))
}

#[cfg(test)]
mod tests {
    use indoc::indoc;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{
        diagnostics::Diagnostics,
        index::Idx,
        frontend::{SourceFile, parser::Parser},
        middle::{
            hir::builder::HirBuilder,
            mir::{SymbolState, dump::dump},
            resolve::Resolver,
        },
    };

    fn hir(contents: &str) -> (hir::File, Diagnostics) {
        let source = SourceFile::from_memory("test.js", contents);
        let mut diagnostics = Diagnostics::new();
        let tree = Parser::parse_file(&source, &mut diagnostics);
        let mut file = HirBuilder::build_file(&tree, "test.js", &mut diagnostics).unwrap();
        Resolver::resolve_names(&mut file, &mut diagnostics);

        (file, diagnostics)
    }

    fn convert(contents: &str) -> Mir {
        let (file, diagnostics) = hir(contents);
        assert!(diagnostics.is_empty(), "{:?}", diagnostics.messages());

        HirToMir::new().unwrap().convert_file(&file).unwrap()
    }

    /// Symbols of every `GET` in the file, in tree order
    fn get_symbols(mir: &Mir) -> Vec<SymbolId> {
        struct Collector(Vec<SymbolId>);

        impl crate::middle::mir::visit::Visitor for Collector {
            fn visit_expression(&mut self, arena: &Arena, expression: &Expression) {
                if let ExpressionKind::GetValue(symbol) = expression.kind {
                    self.0.push(symbol);
                }

                crate::middle::mir::visit::walk_expression(self, arena, expression);
            }
        }

        let mut collector = Collector(Vec::new());
        crate::middle::mir::visit::Visitor::visit_node(&mut collector, &mir.arena, mir.file);
        collector.0
    }

    #[test]
    fn converts_the_property_program() {
        let mir = convert(indoc! {r#"
            function name(param1, param2) {
              var hello = "value";
              var test = { key: hello, secondKey: { nestedKey: "nestedValue" } };
              test.key2 = {};
              test.func();
              hello = test = "result";
              print(hello);
            }
            name(0.6, "", "", "");
        "#});

        assert_eq!(
            dump(&mir),
            indoc! {r#"
                FILE name: test.js
                  FUNCTION name: name isNative: false isStatic: false origin: Source
                    PARAMETER name: param1
                    PARAMETER name: param2
                    BODY
                      VAR name: hello
                        CONST: Str("value")
                      VAR name: test
                        OBJECT:
                          KEY: key
                          VALUE:
                            GET: variable hello
                          KEY: secondKey
                          VALUE:
                            OBJECT:
                              KEY: nestedKey
                              VALUE:
                                CONST: Str("nestedValue")
                      SET_PROP: key2
                        GET: variable test
                        OBJECT:
                      CALL:
                        GET_PROP: func
                          GET: variable test
                        ARGS:
                      SET: variable hello
                        SET: variable test
                          CONST: Str("result")
                      CALL:
                        GET: function print
                        ARGS:
                          GET: variable hello
                  CALL:
                    GET: function name
                    ARGS:
                      CONST: Number(0.6)
                      CONST: Str("")
                      CONST: Str("")
                      CONST: Str("")
            "#}
        );
    }

    #[test]
    fn references_to_one_declaration_share_a_symbol() {
        let mir = convert("function f() {} f(); f();");
        let symbols = get_symbols(&mir);

        assert_eq!(symbols.len(), 2);
        assert_eq!(symbols[0], symbols[1]);

        let owner = mir.arena.owner(symbols[0]).unwrap();
        assert_eq!(mir.arena.function(owner).unwrap().name.as_str(), "f");
    }

    #[test]
    fn forward_references_bind_to_the_later_declaration() {
        let mir = convert("function a(){ b(); } function b(){}");
        let symbols = get_symbols(&mir);

        let b = mir.arena.file(mir.file).unwrap().statements[1];
        assert_eq!(symbols, vec![mir.arena.function(b).unwrap().symbol]);
    }

    #[test]
    fn print_is_a_builtin_symbol() {
        let mir = convert("print(1);");
        let symbols = get_symbols(&mir);

        assert_eq!(mir.builtin_for(symbols[0]), Some(BuiltIn::Print));
        assert_eq!(mir.builtin_symbol(BuiltIn::Print), Some(symbols[0]));

        let owner = mir.arena.owner(symbols[0]).unwrap();
        assert_eq!(mir.arena.node(owner).parent, Some(mir.builtins_file));
        assert_eq!(
            mir.arena.file(mir.builtins_file).unwrap().name,
            BUILTINS_FILE_NAME
        );
    }

    #[test]
    fn every_symbol_is_bound_after_conversion() {
        let mir = convert("function f(a) { var b = a; function g() { b = f; } }");

        for symbol in get_symbols(&mir) {
            assert!(matches!(
                mir.arena.symbol(symbol).state,
                SymbolState::Bound(_)
            ));
        }
    }

    #[test]
    fn parents_point_at_the_closest_declaration() {
        let mir = convert("function f(a) { var b = a; }");
        let file = mir.file;

        let f = mir.arena.file(file).unwrap().statements[0];
        let function = mir.arena.function(f).unwrap();
        let b = mir.arena.body(function.body).unwrap().statements[0];

        assert_eq!(mir.arena.node(file).parent, None);
        assert_eq!(mir.arena.node(f).parent, Some(file));
        assert_eq!(mir.arena.node(function.parameters[0]).parent, Some(f));
        assert_eq!(mir.arena.node(b).parent, Some(f));
    }

    #[test]
    fn unresolved_references_are_internal_errors() {
        let (file, diagnostics) = hir("var x = x;");
        assert!(diagnostics.has_errors());

        assert_eq!(
            HirToMir::new().unwrap().convert_file(&file).unwrap_err(),
            InternalError::UnresolvedReference {
                name: Name::new("x"),
                span: Span::new(8, 9),
            }
        );
    }

    #[test]
    fn references_to_undeclared_ids_are_internal_errors() {
        let span = Span::new(0, 5);
        let file = hir::File {
            id: HirId::new(0),
            name: "test.js".to_owned(),
            span,
            statements: vec![hir::Statement::Expression(hir::Expression {
                span,
                kind: hir::ExpressionKind::GetValue(Reference {
                    name: Name::new("ghost"),
                    span,
                    candidate: Some(Resolution::Variable(HirId::new(7))),
                }),
            })],
        };

        assert_eq!(
            HirToMir::new().unwrap().convert_file(&file).unwrap_err(),
            InternalError::SymbolNotDefined {
                name: Name::new("ghost"),
            }
        );
    }
}
