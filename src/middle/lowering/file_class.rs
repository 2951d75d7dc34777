use crate::{
    error::InternalError,
    frontend::intern::Name,
    middle::mir::{Class, Mir, NodeKind, Origin, SymbolKind, parents::patch_parents},
};

/// Wraps the top level statements of a file holding more than one of them
/// into a single class named after the file. Only looks at direct children.
pub fn wrap_file(mir: &mut Mir) -> Result<(), InternalError> {
    let arena = &mut mir.arena;
    let file = arena.file(mir.file)?;

    if file.statements.len() <= 1 {
        return Ok(());
    }

    let name = class_name(&file.name);
    let span = arena.node(mir.file).span;
    let statements = std::mem::take(&mut arena.file_mut(mir.file)?.statements);

    let symbol = arena.new_symbol(SymbolKind::Class);
    let class = arena.push(
        NodeKind::Class(Class {
            symbol,
            name: Name::new(&name),
            statements,
            origin: Origin::FileClass,
        }),
        span,
    );
    arena.bind(symbol, class)?;

    arena.file_mut(mir.file)?.statements = vec![class];
    patch_parents(arena, class, Some(mir.file));

    tracing::trace!(class = %name, "wrapped file into class");
    Ok(())
}

/// `dir/some-file.js` becomes `some_file_js`
fn class_name(file_name: &str) -> String {
    let file_name = file_name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(file_name);

    file_name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::middle::{
        lowering::{clinit::wrap_initializers, function_class::reify_functions, tests::mir},
        mir::dump::dump,
    };

    fn lower(file_name: &str, contents: &str) -> Mir {
        let mut mir = mir(file_name, contents);

        reify_functions(&mut mir).unwrap();
        wrap_initializers(&mut mir).unwrap();
        wrap_file(&mut mir).unwrap();
        mir
    }

    #[test]
    fn single_statement_files_stay_unwrapped() {
        let mir = lower("single.js", "print(1);");
        let statements = &mir.arena.file(mir.file).unwrap().statements;

        assert_eq!(statements.len(), 1);
        assert!(matches!(
            mir.arena.node(statements[0]).kind,
            NodeKind::Function(_)
        ));
    }

    #[test]
    fn empty_files_stay_unwrapped() {
        let mir = lower("empty.js", "");

        assert_eq!(dump(&mir), "FILE name: empty.js\n");
    }

    #[test]
    fn multiple_statements_are_wrapped_once() {
        let mut mir = lower("two-parts.js", "function f() {} f();");

        let statements = mir.arena.file(mir.file).unwrap().statements.clone();
        assert_eq!(statements.len(), 1);

        let class = mir.arena.class(statements[0]).unwrap();
        assert_eq!(class.name.as_str(), "two_parts_js");
        assert_eq!(class.origin, Origin::FileClass);
        assert_eq!(class.statements.len(), 2);

        for statement in class.statements.clone() {
            assert_eq!(mir.arena.node(statement).parent, Some(statements[0]));
        }
        assert_eq!(mir.arena.node(statements[0]).parent, Some(mir.file));

        wrap_file(&mut mir).unwrap();
        assert_eq!(mir.arena.file(mir.file).unwrap().statements, statements);
    }

    #[test]
    fn class_names_only_use_the_file_name() {
        assert_eq!(class_name("greet.js"), "greet_js");
        assert_eq!(class_name("src/some-file.js"), "some_file_js");
    }
}
