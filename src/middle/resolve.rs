use std::collections::{BTreeMap, VecDeque};

use crate::{
    diagnostics::{Diagnostics, report_error},
    frontend::intern::Name,
    middle::hir::{
        BuiltIn, Expression, ExpressionKind, File, Function, Parameter, Reference, Resolution,
        Variable,
        visit::{self, MutVisitor},
    },
};

/// Binds every [`Reference`] in a HIR file to the declaration it names.
///
/// Top level functions are visible from anywhere in the file. Everything else
/// (parameters, variables, nested functions) only becomes visible once its
/// declaration has been visited, so a variable can't be used in its own
/// initializer. Unknown names are reported and their candidate left unset.
#[derive(Debug)]
pub struct Resolver<'diagnostics> {
    scopes: ScopeStack,
    diagnostics: &'diagnostics mut Diagnostics,
}

impl<'diagnostics> Resolver<'diagnostics> {
    pub fn resolve_names(file: &mut File, diagnostics: &'diagnostics mut Diagnostics) {
        let mut resolver = Self {
            scopes: ScopeStack::new(),
            diagnostics,
        };

        resolver.bind_built_ins();
        resolver.visit_file(file);

        tracing::debug!(
            file = %file.name,
            errors = resolver.diagnostics.len(),
            "resolved names"
        );
    }

    fn bind_built_ins(&mut self) {
        for built_in in BuiltIn::all() {
            self.scopes
                .add_global_binding(built_in.name(), Resolution::BuiltIn(built_in));
        }
    }

    /// Adds all the functions declared directly in the file to the file scope
    /// before any statement is visited
    fn bind_function_definitions(&mut self, file: &File) {
        for function in file.functions() {
            self.scopes
                .add_shallow_binding(function.name, Resolution::Function(function.id));
        }
    }

    fn resolve_reference(&mut self, reference: &mut Reference, what: &str) {
        if reference.candidate.is_some() {
            return;
        }

        match self.scopes.get_binding(reference.name) {
            Some(resolution) => reference.candidate = Some(resolution),
            None => report_error!(
                self.diagnostics,
                reference.span,
                format!("Unknown {what} to {}", reference.name)
            ),
        }
    }
}

impl MutVisitor for Resolver<'_> {
    fn visit_file(&mut self, file: &mut File) {
        self.scopes.push_shallow_scope();
        self.bind_function_definitions(file);

        visit::walk_file_mut(self, file);

        self.scopes.pop_shallow_scope();
    }

    fn visit_function(&mut self, function: &mut Function) {
        // Visible to itself and to the statements following it
        self.scopes
            .add_shallow_binding(function.name, Resolution::Function(function.id));

        self.scopes.push_shallow_scope();
        visit::walk_function_mut(self, function);
        self.scopes.pop_shallow_scope();
    }

    fn visit_parameter(&mut self, parameter: &mut Parameter) {
        self.scopes
            .add_shallow_binding(parameter.name, Resolution::Parameter(parameter.id));
    }

    fn visit_variable(&mut self, variable: &mut Variable) {
        // The initializer is resolved before the name is bound
        visit::walk_variable_mut(self, variable);

        self.scopes
            .add_shallow_binding(variable.name, Resolution::Variable(variable.id));
    }

    fn visit_expression(&mut self, expression: &mut Expression) {
        if let ExpressionKind::Call {
            receiver,
            arguments,
        } = &mut expression.kind
        {
            if let ExpressionKind::GetValue(reference) = &mut receiver.kind {
                self.resolve_reference(reference, "call");

                for argument in arguments.iter_mut().flatten() {
                    self.visit_expression(argument);
                }

                return;
            }
        }

        visit::walk_expression_mut(self, expression);
    }

    fn visit_reference(&mut self, reference: &mut Reference) {
        self.resolve_reference(reference, "reference");
    }
}

#[derive(Debug)]
struct ScopeStack {
    global_scope: BTreeMap<Name, Resolution>,
    stack: VecDeque<BTreeMap<Name, Resolution>>,
}

impl ScopeStack {
    fn new() -> Self {
        Self {
            global_scope: BTreeMap::new(),
            stack: VecDeque::new(),
        }
    }

    /// Creates a new file or function scope
    fn push_shallow_scope(&mut self) {
        self.stack.push_back(BTreeMap::new());
    }

    /// Destroys the current file or function scope
    fn pop_shallow_scope(&mut self) {
        assert!(
            !self.stack.is_empty(),
            "Attempted to pop a shallow scope from the global context"
        );

        self.stack.pop_back();
    }

    /// Adds a binding only within the current (most nested) scope
    fn add_shallow_binding(&mut self, name: Name, resolution: Resolution) {
        let Some(shallow_scope) = self.stack.back_mut() else {
            panic!("Tried to add a shallow binding in the global context");
        };

        shallow_scope.insert(name, resolution);
    }

    /// Adds a binding into the global scope which is accessible from all
    /// shallow scopes
    fn add_global_binding(&mut self, name: Name, resolution: Resolution) {
        self.global_scope.insert(name, resolution);
    }

    /// Looks for a binding from the innermost scope outwards
    fn get_binding(&self, name: Name) -> Option<Resolution> {
        self.stack
            .iter()
            .rev()
            .chain(std::iter::once(&self.global_scope))
            .find_map(|scope| scope.get(&name).copied())
    }
}

#[cfg(test)]
mod tests {
    use indoc::indoc;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{
        frontend::{SourceFile, parser::Parser},
        middle::hir::{Statement, builder::HirBuilder, dump::dump},
    };

    fn resolve(contents: &str) -> (File, Diagnostics) {
        let source = SourceFile::from_memory("test.js", contents);
        let mut diagnostics = Diagnostics::new();
        let tree = Parser::parse_file(&source, &mut diagnostics);
        let mut file = HirBuilder::build_file(&tree, "test.js", &mut diagnostics).unwrap();

        assert!(diagnostics.is_empty(), "{:?}", diagnostics.messages());

        Resolver::resolve_names(&mut file, &mut diagnostics);

        (file, diagnostics)
    }

    fn function<'a>(statements: &'a [Statement], name: &str) -> &'a Function {
        statements
            .iter()
            .find_map(|statement| match statement {
                Statement::Function(function) if function.name.as_str() == name => Some(function),
                _ => None,
            })
            .unwrap()
    }

    #[test]
    fn top_level_functions_are_visible_before_declaration() {
        let (file, diagnostics) = resolve("function a(){ b(); } function b(){}");

        assert!(diagnostics.is_empty());

        let a = function(&file.statements, "a");
        let b = function(&file.statements, "b");

        let Statement::Expression(Expression {
            kind: ExpressionKind::Call { receiver, .. },
            ..
        }) = &a.body.statements[0]
        else {
            panic!("expected a call");
        };

        let ExpressionKind::GetValue(reference) = &receiver.kind else {
            panic!("expected a reference receiver");
        };

        assert_eq!(reference.candidate, Some(Resolution::Function(b.id)));
    }

    #[test]
    fn variable_is_not_visible_in_its_own_initializer() {
        let (file, diagnostics) = resolve("var x = x;");

        assert_eq!(diagnostics.messages(), vec!["Unknown reference to x"]);
        assert_eq!(
            dump(&file),
            indoc! {"
                FILE name: test.js
                  VAR name: x
                    GET: <unresolved x>
            "}
        );
    }

    #[test]
    fn nested_functions_are_not_hoisted() {
        let (_, diagnostics) = resolve(indoc! {"
            function outer() {
              inner();
              function inner() {}
              inner();
            }
        "});

        assert_eq!(diagnostics.messages(), vec!["Unknown call to inner"]);
    }

    #[test]
    fn parameters_and_locals_stay_in_their_function() {
        let (_, diagnostics) = resolve(indoc! {"
            function f(a) { var b = a; }
            a;
            b = 1;
        "});

        assert_eq!(
            diagnostics.messages(),
            vec!["Unknown reference to a", "Unknown reference to b"]
        );
    }

    #[test]
    fn resolves_the_greeting_program() {
        let (file, diagnostics) = resolve(indoc! {r#"
            function greet(name) {
              var msg = "hi";
              print(msg);
            }
            greet("world");
        "#});

        assert!(diagnostics.is_empty());
        assert_eq!(
            dump(&file),
            indoc! {r#"
                FILE name: test.js
                  FUNCTION name: greet
                    PARAMETER name: name
                    BODY
                      VAR name: msg
                        CONST: Str("hi")
                      CALL:
                        RECEIVER:
                          GET: builtin print
                        ARGUMENTS:
                          GET: variable msg
                  CALL:
                    RECEIVER:
                      GET: function greet
                    ARGUMENTS:
                      CONST: Str("world")
            "#}
        );
    }

    #[test]
    fn file_declarations_shadow_built_ins() {
        let (file, diagnostics) = resolve("function print(v) {} print(1);");

        assert!(diagnostics.is_empty());
        assert!(dump(&file).contains("GET: function print"));
    }
}
