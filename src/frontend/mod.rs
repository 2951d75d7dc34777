//! Source text handling and the concrete syntax tree producer consumed by the
//! HIR builder.

use std::path::PathBuf;

use self::lexer::Span;

pub mod intern;
pub mod lexer;
pub mod parser;
pub mod syntax;

#[derive(Debug)]
pub struct SourceFile {
    pub contents: String,
    pub origin: SourceFileOrigin,
}

impl SourceFile {
    pub fn from_memory(name: impl Into<String>, contents: impl Into<String>) -> Self {
        Self {
            contents: contents.into(),
            origin: SourceFileOrigin::Memory { name: name.into() },
        }
    }

    pub fn value_of_span(&self, span: Span) -> &str {
        &self.contents[span.start..span.end]
    }

    /// The bare file name used to name the HIR/MIR file and its wrapper class
    pub fn file_name(&self) -> String {
        match &self.origin {
            SourceFileOrigin::Memory { name } => name.clone(),
            SourceFileOrigin::File(path) => path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string()),
        }
    }

    /// 1-based line number of a byte offset
    pub fn row_for_position(&self, position: usize) -> usize {
        let position = position.min(self.contents.len());

        self.contents[..position].matches('\n').count() + 1
    }

    /// 1-based column (in characters) of a byte offset
    pub fn column_for_position(&self, position: usize) -> usize {
        let position = position.min(self.contents.len());
        let line_start = self.contents[..position]
            .rfind('\n')
            .map(|newline| newline + 1)
            .unwrap_or(0);

        self.contents[line_start..position].chars().count() + 1
    }

    /// Text of a 1-based line without its terminator
    pub fn line(&self, row: usize) -> Option<&str> {
        self.contents.lines().nth(row.checked_sub(1)?)
    }
}

#[derive(Debug)]
pub enum SourceFileOrigin {
    Memory { name: String },
    File(PathBuf),
}

impl core::fmt::Display for SourceFileOrigin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceFileOrigin::Memory { name } => write!(f, "<memory:{name}>"),
            SourceFileOrigin::File(path) => f.write_fmt(format_args!("{}", path.display())),
        }
    }
}
