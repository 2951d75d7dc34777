use std::fmt::Write;

use super::{
    Arena, Body, Class, Expression, ExpressionKind, File, Function, Mir, NodeId, Parameter,
    SymbolId, SymbolState, Variable,
    visit::{self, Visitor},
};

/// Canonical indented rendering of the file held by `mir`
pub fn dump(mir: &Mir) -> String {
    dump_node(&mir.arena, mir.file)
}

pub fn dump_node(arena: &Arena, id: NodeId) -> String {
    let mut printer = MirPrinter {
        output: String::new(),
        indentation: 0,
    };

    printer.visit_node(arena, id);
    printer.output
}

struct MirPrinter {
    output: String,
    indentation: usize,
}

impl MirPrinter {
    fn line(&mut self, line: impl core::fmt::Display) {
        let _ = writeln!(self.output, "{:width$}{line}", "", width = self.indentation * 2);
    }

    fn indented(&mut self, f: impl FnOnce(&mut Self)) {
        self.indentation += 1;
        f(self);
        self.indentation -= 1;
    }

    fn arguments(&mut self, arena: &Arena, arguments: &[Option<Expression>]) {
        for argument in arguments {
            match argument {
                Some(argument) => self.visit_expression(arena, argument),
                None => self.line("<missing>"),
            }
        }
    }
}

fn describe(arena: &Arena, symbol: SymbolId) -> String {
    let entry = arena.symbol(symbol);

    match entry.state {
        SymbolState::Bound(owner) => match arena.declared_name(owner) {
            Some(name) => format!("{} {name}", entry.kind),
            None => format!("{} {symbol}", entry.kind),
        },
        SymbolState::Unbound => format!("unbound symbol {symbol}"),
    }
}

impl Visitor for MirPrinter {
    fn visit_file(&mut self, arena: &Arena, _id: NodeId, file: &File) {
        self.line(format_args!("FILE name: {}", file.name));
        self.indented(|printer| visit::walk_statements(printer, arena, &file.statements));
    }

    fn visit_class(&mut self, arena: &Arena, _id: NodeId, class: &Class) {
        self.line(format_args!(
            "CLASS name: {} origin: {}",
            class.name, class.origin
        ));
        self.indented(|printer| visit::walk_statements(printer, arena, &class.statements));
    }

    fn visit_function(&mut self, arena: &Arena, _id: NodeId, function: &Function) {
        self.line(format_args!(
            "FUNCTION name: {} isNative: {} isStatic: {} origin: {}",
            function.name, function.is_native, function.is_static, function.origin
        ));
        self.indented(|printer| visit::walk_function(printer, arena, function));
    }

    fn visit_parameter(&mut self, _arena: &Arena, _id: NodeId, parameter: &Parameter) {
        self.line(format_args!("PARAMETER name: {}", parameter.name));
    }

    fn visit_body(&mut self, arena: &Arena, _id: NodeId, body: &Body) {
        self.line("BODY");
        self.indented(|printer| visit::walk_statements(printer, arena, &body.statements));
    }

    fn visit_variable(&mut self, arena: &Arena, _id: NodeId, variable: &Variable) {
        self.line(format_args!("VAR name: {}", variable.name));
        self.indented(|printer| visit::walk_variable(printer, arena, variable));
    }

    fn visit_expression(&mut self, arena: &Arena, expression: &Expression) {
        match &expression.kind {
            ExpressionKind::Const(value) => self.line(format_args!("CONST: {value}")),
            ExpressionKind::GetValue(symbol) => {
                self.line(format_args!("GET: {}", describe(arena, *symbol)))
            }
            ExpressionKind::SetValue { symbol, value } => {
                self.line(format_args!("SET: {}", describe(arena, *symbol)));
                self.indented(|printer| printer.visit_expression(arena, value));
            }
            ExpressionKind::GetProperty { receiver, name } => {
                self.line(format_args!("GET_PROP: {name}"));
                self.indented(|printer| printer.visit_expression(arena, receiver));
            }
            ExpressionKind::SetProperty {
                receiver,
                name,
                value,
            } => {
                self.line(format_args!("SET_PROP: {name}"));
                self.indented(|printer| {
                    printer.visit_expression(arena, receiver);
                    printer.visit_expression(arena, value);
                });
            }
            ExpressionKind::Object(entries) => {
                self.line("OBJECT:");
                self.indented(|printer| {
                    for entry in entries {
                        printer.line(format_args!("KEY: {}", entry.key));
                        printer.line("VALUE:");
                        printer.indented(|printer| printer.visit_expression(arena, &entry.value));
                    }
                });
            }
            ExpressionKind::Call {
                receiver,
                arguments,
            } => {
                self.line("CALL:");
                self.indented(|printer| {
                    printer.visit_expression(arena, receiver);
                    printer.line("ARGS:");
                    printer.indented(|printer| printer.arguments(arena, arguments));
                });
            }
            ExpressionKind::NewInstance { class, arguments } => {
                self.line(format_args!("NEW symbol: {}", describe(arena, *class)));
                self.indented(|printer| printer.arguments(arena, arguments));
            }
        }
    }
}
