use crate::{
    diagnostics::{Diagnostics, report_error},
    frontend::{
        SourceFile,
        lexer::{Keyword, Lexer, Span, Token, TokenKind},
        syntax::{ParsedFile, SyntaxKind, SyntaxNode, SyntaxNodeId},
    },
    index::IndexVec,
};

/// Binding power of the postfix call operator
const CALL_BINDING_POWER: u8 = 3;

/// Recovering recursive descent parser with Pratt style expression parsing.
/// Every problem is reported into the diagnostics collector and the parser
/// keeps going, so the tree can miss children the grammar would require.
#[derive(Debug)]
pub struct Parser<'source, 'diagnostics> {
    lexer: Lexer<'source>,
    nodes: IndexVec<SyntaxNodeId, SyntaxNode>,
    diagnostics: &'diagnostics mut Diagnostics,
}

fn infix_binding_power(kind: TokenKind) -> Option<(u8, u8)> {
    match kind {
        TokenKind::Equals => Some((2, 1)),
        TokenKind::Dot => Some((5, 6)),
        _ => None,
    }
}

impl<'source, 'diagnostics> Parser<'source, 'diagnostics> {
    pub fn parse_file(
        source: &'source SourceFile,
        diagnostics: &'diagnostics mut Diagnostics,
    ) -> ParsedFile<'source> {
        let mut parser = Self {
            lexer: Lexer::new(source),
            nodes: IndexVec::new(),
            diagnostics,
        };

        let mut statements = Vec::new();

        while let Some(token) = parser.lexer.peek() {
            if token.kind == TokenKind::CloseBrace {
                parser.lexer.next();
                report_error!(parser.diagnostics, token.span, "Unexpected }");
                continue;
            }

            statements.push(parser.parse_statement());
        }

        let root = parser.push_node(
            SyntaxKind::File,
            Span::new(0, source.contents.len()),
            statements,
        );

        tracing::debug!(
            file = %source.origin,
            nodes = parser.nodes.len(),
            "parsed syntax tree"
        );

        ParsedFile {
            source,
            nodes: parser.nodes,
            root,
        }
    }

    fn push_node(
        &mut self,
        kind: SyntaxKind,
        span: Span,
        children: Vec<SyntaxNodeId>,
    ) -> SyntaxNodeId {
        self.nodes.push(SyntaxNode {
            kind,
            span,
            children,
        })
    }

    fn leaf(&mut self, kind: SyntaxKind, token: Token) -> SyntaxNodeId {
        self.push_node(kind, token.span, Vec::new())
    }

    fn span_of(&self, node: SyntaxNodeId) -> Span {
        self.nodes[node].span
    }

    fn end_of_file(&self) -> Span {
        let end = self.lexer.source().contents.len();
        Span::new(end, end)
    }

    fn describe(&self, token: Token) -> String {
        format!(
            "{:?} ({})",
            token.kind,
            self.lexer.source().value_of_span(token.span)
        )
    }

    /// Consumes the next token when it has the given kind
    fn eat(&mut self, kind: TokenKind) -> Option<Token> {
        if self.lexer.peek_kind() == Some(kind) {
            self.lexer.next()
        } else {
            None
        }
    }

    /// Always consumes at least one token
    fn parse_statement(&mut self) -> SyntaxNodeId {
        let Some(token) = self.lexer.peek() else {
            unreachable!("parse_statement called at end of file");
        };

        match token.kind {
            TokenKind::Keyword(Keyword::Function) => self.parse_function(),
            TokenKind::Keyword(Keyword::Var) => self.parse_variable(),
            TokenKind::Semicolon => {
                self.lexer.next();
                self.leaf(SyntaxKind::Semicolon, token)
            }
            _ => match self.parse_expression(0) {
                Some(expression) => expression,
                None => {
                    self.lexer.next();
                    report_error!(
                        self.diagnostics,
                        token.span,
                        format!("Expected statement but found {}", self.describe(token))
                    );
                    self.leaf(SyntaxKind::BadCharacter, token)
                }
            },
        }
    }

    fn parse_function(&mut self) -> SyntaxNodeId {
        let Some(keyword) = self.lexer.next() else {
            unreachable!("parse_function called at end of file");
        };

        let mut span = keyword.span;
        let mut children = Vec::new();

        // Missing parts are left out of the node, the HIR builder reports them
        if let Some(name) = self.eat(TokenKind::Identifier) {
            span = span.to(name.span);
            children.push(self.leaf(SyntaxKind::Identifier, name));
        }

        if self.lexer.peek_kind() == Some(TokenKind::OpenParen) {
            let parameters = self.parse_parameter_list();
            span = span.to(self.span_of(parameters));
            children.push(parameters);
        }

        if self.lexer.peek_kind() == Some(TokenKind::OpenBrace) {
            let body = self.parse_block();
            span = span.to(self.span_of(body));
            children.push(body);
        }

        self.push_node(SyntaxKind::Function, span, children)
    }

    fn parse_parameter_list(&mut self) -> SyntaxNodeId {
        let Some(open) = self.lexer.next() else {
            unreachable!("parse_parameter_list called at end of file");
        };

        let mut span = open.span;
        let mut children = Vec::new();
        let mut after_parameter = false;

        loop {
            let Some(token) = self.lexer.peek() else {
                report_error!(
                    self.diagnostics,
                    self.end_of_file(),
                    "Expected ) but reached end of file"
                );
                break;
            };

            match token.kind {
                TokenKind::CloseParen => {
                    self.lexer.next();
                    span = span.to(token.span);
                    break;
                }
                TokenKind::Identifier => {
                    self.lexer.next();

                    if after_parameter {
                        report_error!(
                            self.diagnostics,
                            token.span,
                            "Expected , between parameters"
                        );
                    }

                    after_parameter = true;
                    let name = self.leaf(SyntaxKind::Identifier, token);
                    children.push(self.push_node(SyntaxKind::Parameter, token.span, vec![name]));
                    span = span.to(token.span);
                }
                TokenKind::Comma => {
                    self.lexer.next();
                    children.push(self.leaf(SyntaxKind::Comma, token));
                    span = span.to(token.span);
                    after_parameter = false;
                }
                // Let the function body be parsed even when `)` is missing
                TokenKind::OpenBrace => {
                    report_error!(self.diagnostics, token.span, "Expected ) before {");
                    break;
                }
                _ => {
                    self.lexer.next();
                    report_error!(
                        self.diagnostics,
                        token.span,
                        format!("Expected parameter name but found {}", self.describe(token))
                    );
                    span = span.to(token.span);
                }
            }
        }

        self.push_node(SyntaxKind::ParameterList, span, children)
    }

    fn parse_block(&mut self) -> SyntaxNodeId {
        let Some(open) = self.lexer.next() else {
            unreachable!("parse_block called at end of file");
        };

        let mut span = open.span;
        let mut statements = Vec::new();

        loop {
            let Some(token) = self.lexer.peek() else {
                report_error!(
                    self.diagnostics,
                    self.end_of_file(),
                    "Expected } but reached end of file"
                );
                break;
            };

            if token.kind == TokenKind::CloseBrace {
                self.lexer.next();
                span = span.to(token.span);
                break;
            }

            let statement = self.parse_statement();
            span = span.to(self.span_of(statement));
            statements.push(statement);
        }

        self.push_node(SyntaxKind::Block, span, statements)
    }

    fn parse_variable(&mut self) -> SyntaxNodeId {
        let Some(keyword) = self.lexer.next() else {
            unreachable!("parse_variable called at end of file");
        };

        let mut span = keyword.span;
        let mut children = Vec::new();

        if let Some(name) = self.eat(TokenKind::Identifier) {
            span = span.to(name.span);
            children.push(self.leaf(SyntaxKind::Identifier, name));
        }

        if let Some(equals) = self.eat(TokenKind::Equals) {
            span = span.to(equals.span);

            match self.parse_expression(0) {
                Some(initializer) => {
                    span = span.to(self.span_of(initializer));
                    children.push(initializer);
                }
                None => {
                    report_error!(self.diagnostics, equals.span, "Expected expression after =")
                }
            }
        }

        self.push_node(SyntaxKind::Variable, span, children)
    }

    /// Returns `None` without consuming anything when the next token cannot
    /// start an expression
    fn parse_expression(&mut self, min_binding_power: u8) -> Option<SyntaxNodeId> {
        let mut lhs = self.parse_primary()?;

        while let Some(token) = self.lexer.peek() {
            if token.kind == TokenKind::OpenParen {
                if CALL_BINDING_POWER < min_binding_power {
                    break;
                }

                let arguments = self.parse_argument_list();
                let span = self.span_of(lhs).to(self.span_of(arguments));
                lhs = self.push_node(SyntaxKind::Call, span, vec![lhs, arguments]);
                continue;
            }

            let Some((left_binding_power, right_binding_power)) = infix_binding_power(token.kind)
            else {
                break;
            };

            if left_binding_power < min_binding_power {
                break;
            }

            self.lexer.next();
            let operator = self.leaf(SyntaxKind::Operator, token);
            let mut span = self.span_of(lhs).to(token.span);
            let mut children = vec![lhs, operator];

            match self.parse_expression(right_binding_power) {
                Some(rhs) => {
                    span = span.to(self.span_of(rhs));
                    children.push(rhs);
                }
                None => report_error!(
                    self.diagnostics,
                    token.span,
                    format!(
                        "Expected expression after {}",
                        self.lexer.source().value_of_span(token.span)
                    )
                ),
            }

            lhs = self.push_node(SyntaxKind::Binary, span, children);
        }

        Some(lhs)
    }

    fn parse_primary(&mut self) -> Option<SyntaxNodeId> {
        let token = self.lexer.peek()?;

        let node = match token.kind {
            TokenKind::Identifier => {
                self.lexer.next();
                let name = self.leaf(SyntaxKind::Identifier, token);
                self.push_node(SyntaxKind::Reference, token.span, vec![name])
            }
            TokenKind::StringLiteral => {
                self.lexer.next();
                self.leaf(SyntaxKind::StringConstant, token)
            }
            TokenKind::UnterminatedString => {
                self.lexer.next();
                report_error!(self.diagnostics, token.span, "Unterminated string literal");
                self.leaf(SyntaxKind::StringConstant, token)
            }
            TokenKind::NumberLiteral => {
                self.lexer.next();
                self.leaf(SyntaxKind::NumberConstant, token)
            }
            TokenKind::BooleanLiteral => {
                self.lexer.next();
                self.leaf(SyntaxKind::BooleanConstant, token)
            }
            TokenKind::BadCharacter => {
                self.lexer.next();
                self.leaf(SyntaxKind::BadCharacter, token)
            }
            TokenKind::OpenParen => {
                self.lexer.next();

                let Some(inner) = self.parse_expression(0) else {
                    report_error!(self.diagnostics, token.span, "Expected expression after (");
                    self.eat(TokenKind::CloseParen);
                    return None;
                };

                if self.eat(TokenKind::CloseParen).is_none() {
                    report_error!(
                        self.diagnostics,
                        self.span_of(inner),
                        "Expected ) after expression"
                    );
                }

                inner
            }
            TokenKind::OpenBrace => self.parse_object(),
            _ => return None,
        };

        Some(node)
    }

    fn parse_argument_list(&mut self) -> SyntaxNodeId {
        let Some(open) = self.lexer.next() else {
            unreachable!("parse_argument_list called at end of file");
        };

        let mut span = open.span;
        let mut children = Vec::new();
        let mut expecting_argument = true;
        let mut seen_comma = false;

        loop {
            let Some(token) = self.lexer.peek() else {
                report_error!(
                    self.diagnostics,
                    self.end_of_file(),
                    "Expected ) but reached end of file"
                );
                break;
            };

            match token.kind {
                TokenKind::CloseParen => {
                    self.lexer.next();
                    span = span.to(token.span);
                    break;
                }
                TokenKind::Comma => {
                    self.lexer.next();

                    // `f(a,,b)` keeps an empty slot so later arguments stay in place
                    if expecting_argument && (seen_comma || children.is_empty()) {
                        children.push(self.push_node(SyntaxKind::Argument, token.span, Vec::new()));
                    }

                    children.push(self.leaf(SyntaxKind::Comma, token));
                    span = span.to(token.span);
                    expecting_argument = true;
                    seen_comma = true;
                }
                TokenKind::Semicolon | TokenKind::CloseBrace => {
                    report_error!(
                        self.diagnostics,
                        token.span,
                        "Expected ) to close argument list"
                    );
                    break;
                }
                _ => match self.parse_expression(0) {
                    Some(expression) => {
                        let expression_span = self.span_of(expression);

                        if !expecting_argument {
                            report_error!(
                                self.diagnostics,
                                expression_span,
                                "Expected , between arguments"
                            );
                        }

                        children.push(self.push_node(
                            SyntaxKind::Argument,
                            expression_span,
                            vec![expression],
                        ));
                        span = span.to(expression_span);
                        expecting_argument = false;
                    }
                    None => {
                        self.lexer.next();
                        report_error!(
                            self.diagnostics,
                            token.span,
                            format!("Malformed argument {}", self.describe(token))
                        );

                        if expecting_argument {
                            children.push(self.push_node(
                                SyntaxKind::Argument,
                                token.span,
                                Vec::new(),
                            ));
                            expecting_argument = false;
                        }

                        span = span.to(token.span);
                    }
                },
            }
        }

        self.push_node(SyntaxKind::ArgumentList, span, children)
    }

    fn parse_object(&mut self) -> SyntaxNodeId {
        let Some(open) = self.lexer.next() else {
            unreachable!("parse_object called at end of file");
        };

        let mut span = open.span;
        let mut children = Vec::new();
        let mut after_clause = false;

        loop {
            let Some(token) = self.lexer.peek() else {
                report_error!(
                    self.diagnostics,
                    self.end_of_file(),
                    "Expected } but reached end of file"
                );
                break;
            };

            match token.kind {
                TokenKind::CloseBrace => {
                    self.lexer.next();
                    span = span.to(token.span);
                    break;
                }
                TokenKind::Comma => {
                    self.lexer.next();
                    children.push(self.leaf(SyntaxKind::Comma, token));
                    span = span.to(token.span);
                    after_clause = false;
                }
                TokenKind::Identifier => {
                    if after_clause {
                        report_error!(
                            self.diagnostics,
                            token.span,
                            "Expected , between properties"
                        );
                    }

                    after_clause = true;
                    let clause = self.parse_object_clause();
                    span = span.to(self.span_of(clause));
                    children.push(clause);
                }
                TokenKind::Semicolon => {
                    report_error!(self.diagnostics, token.span, "Expected } to close object");
                    break;
                }
                _ => {
                    self.lexer.next();
                    report_error!(
                        self.diagnostics,
                        token.span,
                        format!("Expected property name but found {}", self.describe(token))
                    );
                    span = span.to(token.span);
                }
            }
        }

        self.push_node(SyntaxKind::Object, span, children)
    }

    fn parse_object_clause(&mut self) -> SyntaxNodeId {
        let Some(name) = self.lexer.next() else {
            unreachable!("parse_object_clause called at end of file");
        };

        let identifier = self.leaf(SyntaxKind::Identifier, name);
        let key = self.push_node(SyntaxKind::ObjectKey, name.span, vec![identifier]);
        let mut span = name.span;
        let mut children = vec![key];

        let Some(colon) = self.eat(TokenKind::Colon) else {
            report_error!(self.diagnostics, name.span, "Expected : after property name");
            return self.push_node(SyntaxKind::ObjectClause, span, children);
        };

        span = span.to(colon.span);

        match self.parse_expression(0) {
            Some(expression) => {
                let expression_span = self.span_of(expression);
                children.push(self.push_node(
                    SyntaxKind::ObjectValue,
                    expression_span,
                    vec![expression],
                ));
                span = span.to(expression_span);
            }
            None => report_error!(self.diagnostics, colon.span, "Expected property value"),
        }

        self.push_node(SyntaxKind::ObjectClause, span, children)
    }
}

#[cfg(test)]
mod tests {
    use indoc::indoc;
    use pretty_assertions::assert_eq;

    use super::*;

    fn parse(contents: &str) -> (String, Diagnostics) {
        let source = SourceFile::from_memory("test.js", contents);
        let mut diagnostics = Diagnostics::new();
        let dump = Parser::parse_file(&source, &mut diagnostics).dump();

        (dump, diagnostics)
    }

    #[test]
    fn parses_function_declaration() {
        let (dump, diagnostics) = parse("function f(a, b) { a; }");

        assert!(diagnostics.is_empty());
        assert_eq!(
            dump,
            indoc! {r#"
                FILE 0..23
                  FUNCTION 0..23
                    IDENTIFIER 9..10 "f"
                    PARAMETER_LIST 10..16
                      PARAMETER 11..12
                        IDENTIFIER 11..12 "a"
                      COMMA 12..13 ","
                      PARAMETER 14..15
                        IDENTIFIER 14..15 "b"
                    BLOCK 17..23
                      REFERENCE 19..20
                        IDENTIFIER 19..20 "a"
                      SEMICOLON 20..21 ";"
            "#}
        );
    }

    #[test]
    fn member_access_binds_tighter_than_call_and_assignment() {
        let (dump, diagnostics) = parse("a.b = f(1).c");

        assert!(diagnostics.is_empty());
        assert_eq!(
            dump,
            indoc! {r#"
                FILE 0..12
                  BINARY 0..12
                    BINARY 0..3
                      REFERENCE 0..1
                        IDENTIFIER 0..1 "a"
                      OPERATOR 1..2 "."
                      REFERENCE 2..3
                        IDENTIFIER 2..3 "b"
                    OPERATOR 4..5 "="
                    BINARY 6..12
                      CALL 6..10
                        REFERENCE 6..7
                          IDENTIFIER 6..7 "f"
                        ARGUMENT_LIST 7..10
                          ARGUMENT 8..9
                            NUMBER_CONSTANT 8..9 "1"
                      OPERATOR 10..11 "."
                      REFERENCE 11..12
                        IDENTIFIER 11..12 "c"
            "#}
        );
    }

    #[test]
    fn assignment_is_right_associative() {
        let (dump, _) = parse("a = b = c");

        assert_eq!(
            dump,
            indoc! {r#"
                FILE 0..9
                  BINARY 0..9
                    REFERENCE 0..1
                      IDENTIFIER 0..1 "a"
                    OPERATOR 2..3 "="
                    BINARY 4..9
                      REFERENCE 4..5
                        IDENTIFIER 4..5 "b"
                      OPERATOR 6..7 "="
                      REFERENCE 8..9
                        IDENTIFIER 8..9 "c"
            "#}
        );
    }

    #[test]
    fn object_literal_and_sparse_arguments() {
        let (dump, diagnostics) = parse("f({ k: 1 },, x)");

        assert!(diagnostics.is_empty());
        assert_eq!(
            dump,
            indoc! {r#"
                FILE 0..15
                  CALL 0..15
                    REFERENCE 0..1
                      IDENTIFIER 0..1 "f"
                    ARGUMENT_LIST 1..15
                      ARGUMENT 2..10
                        OBJECT 2..10
                          OBJECT_CLAUSE 4..8
                            OBJECT_KEY 4..5
                              IDENTIFIER 4..5 "k"
                            OBJECT_VALUE 7..8
                              NUMBER_CONSTANT 7..8 "1"
                      COMMA 10..11 ","
                      ARGUMENT 11..12 ","
                      COMMA 11..12 ","
                      ARGUMENT 13..14
                        REFERENCE 13..14
                          IDENTIFIER 13..14 "x"
            "#}
        );
    }

    #[test]
    fn recovers_from_missing_pieces() {
        let (dump, diagnostics) = parse("function (a { print(a; } var = ;");

        assert_eq!(
            diagnostics.messages(),
            vec![
                "Expected ) before {",
                "Expected ) to close argument list",
                "Expected expression after =",
            ]
        );
        assert!(dump.contains("FUNCTION"));
        assert!(dump.contains("VARIABLE"));
    }

    #[test]
    fn missing_comma_between_properties() {
        let (dump, diagnostics) = parse("var o = { a: 1 b: 2 };");

        assert_eq!(diagnostics.messages(), vec!["Expected , between properties"]);
        assert_eq!(dump.matches("OBJECT_CLAUSE").count(), 2);
    }

    #[test]
    fn missing_comma_between_arguments() {
        let (dump, diagnostics) = parse("f(1 2);");

        assert_eq!(diagnostics.messages(), vec!["Expected , between arguments"]);
        assert_eq!(dump.matches("ARGUMENT ").count(), 2);
    }

    #[test]
    fn missing_comma_between_parameters() {
        let (dump, diagnostics) = parse("function f(a b) {}");

        assert_eq!(diagnostics.messages(), vec!["Expected , between parameters"]);
        assert_eq!(dump.matches("PARAMETER ").count(), 2);
    }

    #[test]
    fn separated_lists_are_accepted() {
        let (_, diagnostics) = parse("function f(a, b) { f({ a: 1, b: 2 }, 3); }");

        assert!(diagnostics.is_empty(), "{:?}", diagnostics.messages());
    }

    #[test]
    fn stray_tokens_are_reported_once() {
        let (_, diagnostics) = parse("} ) f();");

        assert_eq!(
            diagnostics.messages(),
            vec!["Unexpected }", "Expected statement but found CloseParen ())"]
        );
    }
}
