//! Passes normalizing a converted MIR file into the shape code generation
//! expects: every direct child of a class is a declaration and a file holds
//! a single root.

use super::mir::Mir;
use crate::error::InternalError;

pub mod clinit;
pub mod file_class;
pub mod function_class;

/// Runs every lowering pass over `mir.file`. The order matters: each pass
/// relies on the shape the previous one left behind.
pub fn lower(mir: &mut Mir) -> Result<(), InternalError> {
    let nodes = mir.arena.node_count();

    function_class::reify_functions(mir)?;
    clinit::wrap_initializers(mir)?;
    file_class::wrap_file(mir)?;

    tracing::debug!(
        created = mir.arena.node_count() - nodes,
        "lowered MIR"
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use indoc::indoc;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{
        diagnostics::Diagnostics,
        frontend::{SourceFile, parser::Parser},
        middle::{
            hir::builder::HirBuilder,
            mir::{NodeKind, convert::HirToMir, dump::dump},
            resolve::Resolver,
        },
    };

    pub(super) fn mir(file_name: &str, contents: &str) -> Mir {
        let source = SourceFile::from_memory(file_name, contents);
        let mut diagnostics = Diagnostics::new();
        let tree = Parser::parse_file(&source, &mut diagnostics);
        let mut file = HirBuilder::build_file(&tree, file_name, &mut diagnostics).unwrap();
        Resolver::resolve_names(&mut file, &mut diagnostics);
        assert!(diagnostics.is_empty(), "{:?}", diagnostics.messages());

        HirToMir::new().unwrap().convert_file(&file).unwrap()
    }

    #[test]
    fn lowers_the_greet_program() {
        let mut mir = mir(
            "greet.js",
            indoc! {r#"
                function greet(name) {
                  var msg = "hi";
                  print(msg);
                }
                greet("world");
            "#},
        );

        lower(&mut mir).unwrap();

        assert_eq!(
            dump(&mir),
            indoc! {r#"
                FILE name: greet.js
                  CLASS name: greet_js origin: FileClass
                    CLASS name: greet origin: FunctionClass
                      FUNCTION name: invoke isNative: true isStatic: false origin: Invoke
                        PARAMETER name: name
                        BODY
                          VAR name: msg
                            CONST: Str("hi")
                          CALL:
                            GET: function print
                            ARGS:
                              GET: variable msg
                    FUNCTION name: <clinit> isNative: true isStatic: true origin: ClassInitializer
                      BODY
                        VAR name: greet
                          NEW symbol: class greet
                        CALL:
                          GET: variable greet
                          ARGS:
                            CONST: Str("world")
            "#}
        );
    }

    #[test]
    fn classes_only_hold_declarations_after_lowering() {
        let mut mir = mir(
            "mixed.js",
            indoc! {r#"
                var a = 1;
                function f(x) {
                  function g() { f(a); }
                  g();
                }
                f(a);
                a = 2;
            "#},
        );

        lower(&mut mir).unwrap();

        let mut pending = mir.arena.file(mir.file).unwrap().statements.clone();
        assert_eq!(pending.len(), 1);

        while let Some(id) = pending.pop() {
            let class = mir.arena.class(id).unwrap();

            for statement in &class.statements {
                let kind = &mir.arena.node(*statement).kind;
                assert!(kind.is_declaration(), "{} inside a class", kind.name());

                if let NodeKind::Class(_) = kind {
                    pending.push(*statement);
                }
            }
        }
    }

    #[test]
    fn lowering_twice_changes_nothing() {
        let mut mir = mir("twice.js", "function f() { print(1); } f(); f();");

        lower(&mut mir).unwrap();
        let once = dump(&mir);

        lower(&mut mir).unwrap();
        assert_eq!(dump(&mir), once);
    }
}
