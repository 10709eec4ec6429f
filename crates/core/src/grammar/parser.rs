use super::{
    ast::{Node, ParseTree, Token},
    diag::{Diagnostic, Span, codes},
    lexer::{TokKind, tokenize},
};

/// A hard parse failure. No [`ParseTree`] is produced when parsing fails.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct ParseError {
    /// Diagnostic code (`SFZ0xxx`).
    pub code: &'static str,
    /// Human-readable description.
    pub message: String,
    /// Location of the offending text.
    pub span: Span,
    /// The offending text.
    pub token: String,
}

impl ParseError {
    fn new(code: &'static str, message: impl Into<String>, span: Span, token: &str) -> Self {
        Self {
            code,
            message: message.into(),
            span,
            token: token.to_string(),
        }
    }

    /// Convert into an error-level [`Diagnostic`] for reporting.
    pub fn to_diagnostic(&self) -> Diagnostic {
        Diagnostic::error(self.code, self.message.clone(), Some(self.span))
            .with_context(ctx!("token" => self.token.clone()))
    }
}

// ─── Public API ─────────────────────────────────────────────────────────────

/// Parse SFZ text into a flat node sequence.
///
/// Opcode values run to the end of the line, a comment, the next header, or
/// the next `name=` assignment, so unquoted values may contain spaces
/// (`sample=out of my head.wav`). Surrounding whitespace is not part of the
/// value.
pub fn parse_str(input: &str) -> Result<ParseTree, ParseError> {
    Parser::new(input).parse()
}

// ─── Parser Implementation ─────────────────────────────────────────────────

struct Parser<'a> {
    input: &'a str,
    toks: Vec<super::lexer::Token<'a>>,
    pos: usize,
    nodes: Vec<Node>,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            input,
            toks: tokenize(input),
            pos: 0,
            nodes: Vec::new(),
        }
    }

    // ── Token navigation ────────────────────────────────────────────────

    fn at_end(&self) -> bool {
        self.pos >= self.toks.len()
    }

    fn peek(&self) -> Option<super::lexer::Token<'a>> {
        self.toks.get(self.pos).copied()
    }

    fn peek_kind_at(&self, pos: usize) -> Option<TokKind> {
        self.toks.get(pos).map(|t| t.kind)
    }

    fn skip_whitespace(&mut self) {
        while self.peek_kind_at(self.pos) == Some(TokKind::Whitespace) {
            self.pos += 1;
        }
    }

    /// Span for "something was expected here": the current token, or the
    /// end of input.
    fn here(&self) -> Span {
        match self.peek() {
            Some(t) => Span::new(t.start, t.end),
            None => Span::empty(self.input.len()),
        }
    }

    /// A `Word` directly followed by `=` starts an assignment.
    fn starts_assignment(&self, pos: usize) -> bool {
        self.peek_kind_at(pos) == Some(TokKind::Word)
            && self.peek_kind_at(pos + 1) == Some(TokKind::Equals)
    }

    // ── Main parse loop ─────────────────────────────────────────────────

    fn parse(mut self) -> Result<ParseTree, ParseError> {
        while let Some(tok) = self.peek() {
            match tok.kind {
                TokKind::Whitespace | TokKind::Newline => self.pos += 1,
                TokKind::Comment => {
                    check_comment(tok)?;
                    self.pos += 1;
                }
                TokKind::HeaderOpen => self.parse_header()?,
                TokKind::Directive => self.parse_directive()?,
                TokKind::Word if self.starts_assignment(self.pos) => self.parse_opcode()?,
                TokKind::Quoted => {
                    check_quote(tok)?;
                    return Err(unexpected(tok));
                }
                _ => return Err(unexpected(tok)),
            }
        }
        Ok(ParseTree { nodes: self.nodes })
    }

    // ── Headers ─────────────────────────────────────────────────────────

    fn parse_header(&mut self) -> Result<(), ParseError> {
        let open = self.toks[self.pos];
        self.pos += 1;
        self.skip_whitespace();

        let name = match self.peek() {
            Some(t) if t.kind == TokKind::Word => {
                self.pos += 1;
                Some(t)
            }
            Some(t) if t.kind == TokKind::HeaderClose => {
                return Err(ParseError::new(
                    codes::PARSER_EMPTY_HEADER,
                    "empty header",
                    Span::new(open.start, t.end),
                    &self.input[open.start..t.end],
                ));
            }
            _ => None,
        };
        self.skip_whitespace();

        match (name, self.peek()) {
            (Some(name), Some(close)) if close.kind == TokKind::HeaderClose => {
                self.pos += 1;
                self.nodes.push(Node::Header {
                    name: Token::new(name.text, Span::new(name.start, name.end)),
                });
                Ok(())
            }
            _ => {
                let end = self.here().start.max(open.end);
                Err(ParseError::new(
                    codes::PARSER_UNTERMINATED_HEADER,
                    "header is missing its closing '>'",
                    Span::new(open.start, end),
                    &self.input[open.start..end],
                ))
            }
        }
    }

    // ── Opcode assignments ──────────────────────────────────────────────

    fn parse_opcode(&mut self) -> Result<(), ParseError> {
        let name = self.toks[self.pos];
        let equals = self.toks[self.pos + 1];
        self.pos += 2;
        let Some(value) = self.collect_value()? else {
            return Err(ParseError::new(
                codes::PARSER_MISSING_VALUE,
                format!("opcode '{}' has no value", name.text),
                Span::new(name.start, equals.end),
                name.text,
            ));
        };
        self.nodes.push(Node::Opcode {
            name: Token::new(name.text, Span::new(name.start, name.end)),
            value,
        });
        Ok(())
    }

    /// Collect a value that runs to the end of the line, a comment, a header,
    /// or the next assignment. Returns `None` if nothing but whitespace follows.
    fn collect_value(&mut self) -> Result<Option<Token>, ParseError> {
        self.skip_whitespace();
        let mut bounds: Option<(usize, usize)> = None;
        while let Some(tok) = self.peek() {
            match tok.kind {
                TokKind::Newline | TokKind::Comment | TokKind::HeaderOpen => break,
                TokKind::Word if self.starts_assignment(self.pos) => break,
                TokKind::Whitespace => {}
                TokKind::Quoted => {
                    check_quote(tok)?;
                    bounds = Some((bounds.map_or(tok.start, |b| b.0), tok.end));
                }
                _ => bounds = Some((bounds.map_or(tok.start, |b| b.0), tok.end)),
            }
            self.pos += 1;
        }
        // Trailing whitespace was consumed but is not part of the value.
        Ok(bounds.map(|(start, end)| Token::new(&self.input[start..end], Span::new(start, end))))
    }

    // ── Directives ──────────────────────────────────────────────────────

    fn parse_directive(&mut self) -> Result<(), ParseError> {
        let directive = self.toks[self.pos];
        self.pos += 1;
        match directive.text {
            "#define" => self.parse_define(directive),
            "#include" => self.parse_include(directive),
            other => Err(ParseError::new(
                codes::PARSER_UNKNOWN_DIRECTIVE,
                format!("unknown directive '{other}'"),
                Span::new(directive.start, directive.end),
                other,
            )),
        }
    }

    fn parse_define(&mut self, directive: super::lexer::Token<'a>) -> Result<(), ParseError> {
        self.skip_whitespace();
        let name = match self.peek() {
            Some(t) if t.kind == TokKind::Word && t.text.len() > 1 && t.text.starts_with('$') => t,
            _ => return Err(malformed(directive, "#define expects a $variable name")),
        };
        self.pos += 1;
        let Some(value) = self.collect_value()? else {
            return Err(malformed(directive, "#define expects a value"));
        };
        self.nodes.push(Node::Define {
            name: Token::new(name.text, Span::new(name.start, name.end)),
            value,
        });
        Ok(())
    }

    fn parse_include(&mut self, directive: super::lexer::Token<'a>) -> Result<(), ParseError> {
        self.skip_whitespace();
        let path = match self.peek() {
            Some(t) if t.kind == TokKind::Quoted => {
                check_quote(t)?;
                t
            }
            _ => return Err(malformed(directive, "#include expects a quoted path")),
        };
        self.pos += 1;
        self.nodes.push(Node::Include {
            path: Token::new(path.text, Span::new(path.start, path.end)),
        });
        Ok(())
    }
}

// ── Error helpers ───────────────────────────────────────────────────────

fn unexpected(tok: super::lexer::Token<'_>) -> ParseError {
    ParseError::new(
        codes::PARSER_UNEXPECTED_TEXT,
        format!("unexpected '{}'", tok.text),
        Span::new(tok.start, tok.end),
        tok.text,
    )
}

fn malformed(directive: super::lexer::Token<'_>, message: &str) -> ParseError {
    ParseError::new(
        codes::PARSER_MALFORMED_DIRECTIVE,
        message,
        Span::new(directive.start, directive.end),
        directive.text,
    )
}

fn check_quote(tok: super::lexer::Token<'_>) -> Result<(), ParseError> {
    if tok.text.len() >= 2 && tok.text.ends_with('"') {
        return Ok(());
    }
    Err(ParseError::new(
        codes::PARSER_UNTERMINATED_QUOTE,
        "unterminated quoted string",
        Span::new(tok.start, tok.end),
        tok.text,
    ))
}

fn check_comment(tok: super::lexer::Token<'_>) -> Result<(), ParseError> {
    if tok.text.starts_with("/*") && (tok.text.len() < 4 || !tok.text.ends_with("*/")) {
        return Err(ParseError::new(
            codes::PARSER_UNTERMINATED_COMMENT,
            "unterminated block comment",
            Span::new(tok.start, tok.end),
            "/*",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn opcode(node: &Node) -> (&str, &str) {
        match node {
            Node::Opcode { name, value } => (name.text.as_str(), value.text.as_str()),
            other => panic!("expected opcode, got {other:?}"),
        }
    }

    #[test]
    fn values_may_contain_spaces() {
        let tree = parse_str("<region>sample=out of my head.wav lokey=60\n").unwrap();
        assert_eq!(tree.nodes.len(), 3);
        assert_eq!(opcode(&tree.nodes[1]), ("sample", "out of my head.wav"));
        assert_eq!(opcode(&tree.nodes[2]), ("lokey", "60"));
    }

    #[test]
    fn value_span_excludes_trailing_whitespace() {
        let input = "pan=10   // right\n";
        let tree = parse_str(input).unwrap();
        let Node::Opcode { value, .. } = &tree.nodes[0] else {
            panic!("expected opcode");
        };
        assert_eq!(&input[value.span.start..value.span.end], "10");
    }

    #[test]
    fn unterminated_block_comment() {
        let err = parse_str("<region> /* never closed").unwrap_err();
        assert_eq!(err.code, codes::PARSER_UNTERMINATED_COMMENT);
        let err = parse_str("/*/").unwrap_err();
        assert_eq!(err.code, codes::PARSER_UNTERMINATED_COMMENT);
    }

    #[test]
    fn error_converts_to_diagnostic() {
        let err = parse_str("<region>\nvolume=\n").unwrap_err();
        let diag = err.to_diagnostic();
        assert_eq!(diag.id, codes::PARSER_MISSING_VALUE);
        assert!(diag.is_error());
        assert_eq!(diag.token(), Some("volume"));
        assert_eq!(diag.span, Some(Span::new(9, 16)));
    }
}
