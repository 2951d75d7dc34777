use std::fmt::Write;

use super::{
    Body, Expression, ExpressionKind, File, Function, Parameter, Reference, Variable,
    visit::{self, Visitor},
};

/// Canonical indented rendering of a HIR file, two spaces per level
pub fn dump(file: &File) -> String {
    let mut printer = HirPrinter {
        output: String::new(),
        indentation: 0,
    };

    printer.visit_file(file);
    printer.output
}

struct HirPrinter {
    output: String,
    indentation: usize,
}

impl HirPrinter {
    fn line(&mut self, line: impl core::fmt::Display) {
        let _ = writeln!(self.output, "{:width$}{line}", "", width = self.indentation * 2);
    }

    fn indented(&mut self, f: impl FnOnce(&mut Self)) {
        self.indentation += 1;
        f(self);
        self.indentation -= 1;
    }
}

fn describe(reference: &Reference) -> String {
    match reference.candidate {
        Some(resolution) => format!("{} {}", resolution.describe(), reference.name),
        None => format!("<unresolved {}>", reference.name),
    }
}

impl Visitor for HirPrinter {
    fn visit_file(&mut self, file: &File) {
        self.line(format_args!("FILE name: {}", file.name));
        self.indented(|printer| visit::walk_file(printer, file));
    }

    fn visit_function(&mut self, function: &Function) {
        self.line(format_args!("FUNCTION name: {}", function.name));
        self.indented(|printer| visit::walk_function(printer, function));
    }

    fn visit_parameter(&mut self, parameter: &Parameter) {
        self.line(format_args!("PARAMETER name: {}", parameter.name));
    }

    fn visit_body(&mut self, body: &Body) {
        self.line("BODY");
        self.indented(|printer| visit::walk_body(printer, body));
    }

    fn visit_variable(&mut self, variable: &Variable) {
        self.line(format_args!("VAR name: {}", variable.name));
        self.indented(|printer| visit::walk_variable(printer, variable));
    }

    fn visit_expression(&mut self, expression: &Expression) {
        match &expression.kind {
            ExpressionKind::Const(value) => self.line(format_args!("CONST: {value}")),
            ExpressionKind::GetValue(reference) => self.visit_reference(reference),
            ExpressionKind::Call {
                receiver,
                arguments,
            } => {
                self.line("CALL:");
                self.indented(|printer| {
                    printer.line("RECEIVER:");
                    printer.indented(|printer| printer.visit_expression(receiver));
                    printer.line("ARGUMENTS:");
                    printer.indented(|printer| {
                        for argument in arguments {
                            match argument {
                                Some(argument) => printer.visit_expression(argument),
                                None => printer.line("<missing>"),
                            }
                        }
                    });
                });
            }
            ExpressionKind::Object(entries) => {
                self.line("OBJECT:");
                self.indented(|printer| {
                    for entry in entries {
                        printer.line(format_args!("KEY: {}", entry.key));
                        printer.line("VALUE:");
                        printer.indented(|printer| printer.visit_expression(&entry.value));
                    }
                });
            }
            ExpressionKind::SetValue { target, value } => {
                self.line(format_args!("SET: {}", describe(target)));
                self.indented(|printer| printer.visit_expression(value));
            }
            ExpressionKind::GetProperty { receiver, property } => {
                self.line(format_args!("GET_PROP: {property}"));
                self.indented(|printer| {
                    printer.line("RECEIVER:");
                    printer.indented(|printer| printer.visit_expression(receiver));
                });
            }
            ExpressionKind::SetProperty {
                receiver,
                property,
                value,
            } => {
                self.line(format_args!("SET_PROP: {property}"));
                self.indented(|printer| {
                    printer.line("RECEIVER:");
                    printer.indented(|printer| printer.visit_expression(receiver));
                    printer.line("VALUE:");
                    printer.indented(|printer| printer.visit_expression(value));
                });
            }
        }
    }

    fn visit_reference(&mut self, reference: &Reference) {
        self.line(format_args!("GET: {}", describe(reference)));
    }
}
