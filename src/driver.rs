use strum::{Display, EnumString};
use thiserror::Error;

use crate::{
    diagnostics::Diagnostics,
    error::InternalError,
    frontend::{SourceFile, parser::Parser},
    middle::{
        hir::{self, builder::HirBuilder},
        lowering,
        mir::{self, Mir, convert::HirToMir},
        resolve::Resolver,
    },
};

/// Which representation the CLI prints
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum Emit {
    Hir,
    Mir,
    #[default]
    Lowered,
}

#[derive(Debug, Error)]
pub enum CompileError {
    #[error("found {} error(s) in the source", .0.len())]
    Source(Diagnostics),

    #[error(transparent)]
    Internal(#[from] InternalError),
}

/// Every stage's output for one source file
#[derive(Debug)]
pub struct Compilation {
    pub hir: hir::File,
    pub mir: Mir,
    pub hir_dump: String,
    pub mir_dump: String,
    pub lowered_dump: String,
}

impl Compilation {
    pub fn dump(&self, emit: Emit) -> &str {
        match emit {
            Emit::Hir => &self.hir_dump,
            Emit::Mir => &self.mir_dump,
            Emit::Lowered => &self.lowered_dump,
        }
    }
}

pub fn compile_source(
    file_name: impl Into<String>,
    contents: impl Into<String>,
) -> Result<Compilation, CompileError> {
    compile(&SourceFile::from_memory(file_name, contents))
}

/// Runs the whole pipeline. Conversion to MIR only happens when parsing,
/// building and resolving reported no errors.
pub fn compile(source: &SourceFile) -> Result<Compilation, CompileError> {
    let file_name = source.file_name();
    let mut diagnostics = Diagnostics::new();

    let tree = Parser::parse_file(source, &mut diagnostics);
    let mut hir = HirBuilder::build_file(&tree, &file_name, &mut diagnostics)?;
    Resolver::resolve_names(&mut hir, &mut diagnostics);

    if diagnostics.has_errors() {
        tracing::debug!(file = %file_name, errors = diagnostics.len(), "aborting before MIR");
        return Err(CompileError::Source(diagnostics));
    }

    let hir_dump = hir::dump::dump(&hir);

    let mut mir = HirToMir::new()?.convert_file(&hir)?;
    let mir_dump = mir::dump::dump(&mir);

    lowering::lower(&mut mir)?;
    let lowered_dump = mir::dump::dump(&mir);

    Ok(Compilation {
        hir,
        mir,
        hir_dump,
        mir_dump,
        lowered_dump,
    })
}
