use colored::Colorize;

use crate::frontend::{SourceFile, lexer::Span};

/// Short name of the enclosing function, used to tag diagnostics with the
/// compiler location that produced them
macro_rules! function_name {
    () => {{
        fn f() {}
        fn type_name_of<T>(_: T) -> &'static str {
            std::any::type_name::<T>()
        }
        type_name_of(f)
            .rsplit("::")
            .find(|&part| part != "f" && part != "{{closure}}")
            .unwrap_or("<unknown>")
    }};
}

pub(crate) use function_name;

/// Records a user facing error in a [`Diagnostics`] collector. With the
/// `error-backtrace` feature enabled the diagnostic also remembers which
/// compiler function reported it.
macro_rules! report_error {
    ($diagnostics:expr, $span:expr, $message:expr $(,)?) => {{
        let diagnostic = $crate::diagnostics::Diagnostic::new($span, $message);

        #[cfg(feature = "error-backtrace")]
        let diagnostic = diagnostic.with_backtrace(format!(
            "{}::{} (at {}:{}:{})",
            module_path!(),
            $crate::diagnostics::function_name!(),
            file!(),
            line!(),
            column!()
        ));

        $diagnostics.push(diagnostic)
    }};
}

pub(crate) use report_error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub message: String,
    pub span: Span,
    pub backtrace: Option<String>,
}

impl Diagnostic {
    pub fn new(span: Span, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            span,
            backtrace: None,
        }
    }

    pub fn with_backtrace(mut self, backtrace: String) -> Self {
        self.backtrace = Some(backtrace);
        self
    }
}

/// Accumulates source errors for one file. Stages never stop on a user error,
/// they record it here and keep walking; the caller inspects the collector
/// between stages.
#[derive(Debug, Default, Clone)]
pub struct Diagnostics {
    diagnostics: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        tracing::debug!(span = %diagnostic.span, message = %diagnostic.message, "error reported");
        self.diagnostics.push(diagnostic);
    }

    pub fn report_error(&mut self, span: Span, message: impl Into<String>) {
        self.push(Diagnostic::new(span, message));
    }

    pub fn has_errors(&self) -> bool {
        !self.diagnostics.is_empty()
    }

    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Diagnostic> {
        self.diagnostics.iter()
    }

    pub fn messages(&self) -> Vec<&str> {
        self.diagnostics
            .iter()
            .map(|diagnostic| diagnostic.message.as_str())
            .collect()
    }

    /// Renders every diagnostic against its source, underlining the offending
    /// span
    pub fn render(&self, source: &SourceFile) -> String {
        let mut output = String::new();

        for diagnostic in &self.diagnostics {
            render_diagnostic(&mut output, diagnostic, source);
        }

        output
    }

    pub fn render_plain(&self, source: &SourceFile) -> String {
        strip_ansi_escapes::strip_str(self.render(source))
    }
}

impl<'a> IntoIterator for &'a Diagnostics {
    type Item = &'a Diagnostic;
    type IntoIter = std::slice::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

fn render_diagnostic(output: &mut String, diagnostic: &Diagnostic, source: &SourceFile) {
    if let Some(backtrace) = &diagnostic.backtrace {
        output.push_str(&format!("{}: {}\n", "backtrace".blue(), backtrace.white()));
    }

    if diagnostic.span.is_synthetic() {
        output.push_str(&format!(
            "{}: {} ({})\n",
            "error".red().bold(),
            diagnostic.message,
            source.origin
        ));
        return;
    }

    let row = source.row_for_position(diagnostic.span.start);
    let column = source.column_for_position(diagnostic.span.start);

    output.push_str(&format!(
        "{}: {} ({}:{}:{})\n",
        "error".red().bold(),
        diagnostic.message,
        source.origin,
        row,
        column
    ));

    let Some(line) = source.line(row) else {
        return;
    };

    // Spans covering several lines are only underlined up to the end of the
    // first one
    let line_end = source.contents[diagnostic.span.start.min(source.contents.len())..]
        .find('\n')
        .map(|offset| diagnostic.span.start + offset)
        .unwrap_or(source.contents.len());
    let underline_end = diagnostic.span.end.min(line_end).max(diagnostic.span.start);
    let width = source.contents[diagnostic.span.start.min(source.contents.len())
        ..underline_end.min(source.contents.len())]
        .chars()
        .count()
        .max(1);

    let gutter = row.to_string();
    let padding = " ".repeat(gutter.len());

    output.push_str(&format!("{} {} {}\n", gutter.blue(), "|".blue(), line));
    output.push_str(&format!(
        "{} {} {}{}\n",
        padding,
        "|".blue(),
        " ".repeat(column - 1),
        "^".repeat(width).red().bold()
    ));
}
