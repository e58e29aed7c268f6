pub mod ast;
pub mod expr;
pub mod stmt;
pub mod types;

use crate::errors::{LexError, ParseError, ParseErrorKind};
use crate::lexer::token::{Keyword, LitKind, Token};
use crate::lexer::Lexer;
use crate::span::{LineIndex, Span, Spanned};
use ast::*;

/// Recursive descent parser for Go source files.
///
/// Comments are pulled out of the token stream up front. Doc comments and
/// trailing line comments are attached to the declarations, specs and fields
/// they belong to; the rest stay available through [`Parser::take_comments`]
/// so a printer can interleave them by position.
pub struct Parser {
    tokens: Vec<Spanned<Token>>,
    pos: usize,
    pub errors: Vec<ParseError>,
    pub lex_errors: Vec<LexError>,
    comments: Vec<Spanned<String>>,
    attached: Vec<bool>,
    lines: LineIndex,
    /// Set while parsing `if`/`for`/`switch` headers, where `T{` opens the
    /// body rather than a composite literal.
    no_composite: bool,
}

impl Parser {
    pub fn new(source: &str) -> Self {
        let mut lexer = Lexer::new(source);
        let mut tokens = Vec::new();
        let mut comments = Vec::new();
        for tok in lexer.by_ref() {
            match tok.node {
                Token::Comment(text) => comments.push(Spanned::new(text, tok.span)),
                node => tokens.push(Spanned::new(node, tok.span)),
            }
        }
        // Ensure we always have an EOF sentinel
        if !matches!(tokens.last(), Some(t) if t.node == Token::Eof) {
            let eof_pos = source.len();
            tokens.push(Spanned::new(Token::Eof, Span::new(eof_pos, eof_pos)));
        }
        let attached = vec![false; comments.len()];
        Self {
            tokens,
            pos: 0,
            errors: Vec::new(),
            lex_errors: lexer.errors,
            comments,
            attached,
            lines: LineIndex::new(source),
            no_composite: false,
        }
    }

    /// Whether lexing or parsing reported anything.
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty() || !self.lex_errors.is_empty()
    }

    /// Comments not attached to any node, in source order.
    pub fn take_comments(&mut self) -> Vec<Spanned<String>> {
        let comments = std::mem::take(&mut self.comments);
        let attached = std::mem::take(&mut self.attached);
        comments
            .into_iter()
            .zip(attached)
            .filter_map(|(c, used)| (!used).then_some(c))
            .collect()
    }

    // ── Token Management ──────────────────────────────────────

    pub fn peek(&self) -> &Token {
        self.tokens
            .get(self.pos)
            .map(|s| &s.node)
            .unwrap_or(&Token::Eof)
    }

    pub fn peek_span(&self) -> Span {
        self.tokens
            .get(self.pos)
            .map(|s| s.span)
            .unwrap_or(Span::dummy())
    }

    /// Look ahead n tokens (0 = current).
    pub fn peek_ahead(&self, n: usize) -> &Token {
        self.tokens
            .get(self.pos + n)
            .map(|s| &s.node)
            .unwrap_or(&Token::Eof)
    }

    pub fn advance(&mut self) -> Spanned<Token> {
        let tok = self
            .tokens
            .get(self.pos)
            .cloned()
            .unwrap_or(Spanned::new(Token::Eof, Span::dummy()));
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
        tok
    }

    pub fn check(&self, token: &Token) -> bool {
        self.peek() == token
    }

    pub fn check_keyword(&self, kw: Keyword) -> bool {
        matches!(self.peek(), Token::Keyword(k) if *k == kw)
    }

    pub fn match_token(&mut self, token: &Token) -> bool {
        if self.check(token) {
            self.advance();
            true
        } else {
            false
        }
    }

    pub fn match_keyword(&mut self, kw: Keyword) -> bool {
        if self.check_keyword(kw) {
            self.advance();
            true
        } else {
            false
        }
    }

    pub fn expect(&mut self, token: &Token) -> Result<Spanned<Token>, ParseError> {
        if self.check(token) {
            Ok(self.advance())
        } else {
            Err(self.error_unexpected(&format!("{token}")))
        }
    }

    pub fn expect_keyword(&mut self, kw: Keyword) -> Result<Spanned<Token>, ParseError> {
        if self.check_keyword(kw) {
            Ok(self.advance())
        } else {
            Err(self.error_unexpected(&format!("{kw}")))
        }
    }

    pub fn expect_identifier(&mut self) -> Result<Ident, ParseError> {
        match self.peek().clone() {
            Token::Identifier(name) => {
                let span = self.peek_span();
                self.advance();
                Ok(Ident::new(name, span))
            }
            _ => Err(self.error_unexpected("identifier")),
        }
    }

    /// A statement or declaration terminator. The semicolon may be omitted
    /// before a closing `)` or `}`.
    pub fn expect_semi(&mut self) -> Result<(), ParseError> {
        match self.peek() {
            Token::Semicolon => {
                self.advance();
                Ok(())
            }
            Token::RParen | Token::RBrace | Token::Eof => Ok(()),
            _ => Err(self.error_unexpected("';' or newline")),
        }
    }

    pub fn at_end(&self) -> bool {
        matches!(self.peek(), Token::Eof)
    }

    pub fn previous_span(&self) -> Span {
        if self.pos > 0 {
            self.tokens[self.pos - 1].span
        } else {
            Span::dummy()
        }
    }

    /// Run `f` with composite literals of bare type names enabled or not,
    /// restoring the previous setting afterwards.
    pub(crate) fn with_composites<T>(
        &mut self,
        allowed: bool,
        f: impl FnOnce(&mut Self) -> T,
    ) -> T {
        let saved = std::mem::replace(&mut self.no_composite, !allowed);
        let result = f(self);
        self.no_composite = saved;
        result
    }

    // ── Error Handling ────────────────────────────────────────

    pub fn error_unexpected(&self, expected: &str) -> ParseError {
        ParseError {
            kind: ParseErrorKind::UnexpectedToken {
                expected: expected.to_string(),
                got: format!("{}", self.peek()),
            },
            span: self.peek_span(),
        }
    }

    pub fn error(&self, kind: ParseErrorKind, span: Span) -> ParseError {
        ParseError { kind, span }
    }

    /// Skip to the next top-level declaration keyword.
    pub fn synchronize(&mut self) {
        loop {
            match self.peek() {
                Token::Eof
                | Token::Keyword(
                    Keyword::Func
                    | Keyword::Type
                    | Keyword::Var
                    | Keyword::Const
                    | Keyword::Import,
                ) => return,
                _ => {
                    self.advance();
                }
            }
        }
    }

    /// Skip the rest of a broken statement: up to and including the next
    /// semicolon at the current nesting depth, or up to the closing brace of
    /// the enclosing block.
    pub fn synchronize_stmt(&mut self) {
        let mut depth = 0usize;
        loop {
            match self.peek() {
                Token::Eof => return,
                Token::LBrace | Token::LParen | Token::LBracket => depth += 1,
                Token::RBrace if depth == 0 => return,
                Token::RBrace | Token::RParen | Token::RBracket => {
                    depth = depth.saturating_sub(1)
                }
                Token::Semicolon if depth == 0 => {
                    self.advance();
                    return;
                }
                _ => {}
            }
            self.advance();
        }
    }

    // ── Comment Attachment ────────────────────────────────────

    /// Last non-semicolon token ending at or before `pos`.
    fn token_before(&self, pos: usize) -> Option<Span> {
        let upto = self.tokens.partition_point(|t| t.span.start < pos);
        self.tokens[..upto]
            .iter()
            .rev()
            .find(|t| t.node != Token::Semicolon && t.span.end <= pos)
            .map(|t| t.span)
    }

    /// Start of the next token that is not a semicolon.
    fn next_significant_start(&self) -> usize {
        self.tokens[self.pos..]
            .iter()
            .find(|t| t.node != Token::Semicolon)
            .map_or(usize::MAX, |t| t.span.start)
    }

    /// The comment group directly above `start`: consecutive comments, each
    /// alone on its line, the last ending on the line before `start`.
    pub fn leading_comments(&mut self, start: usize) -> Vec<String> {
        let mut line = self.lines.line_of(start);
        let mut picked = Vec::new();
        for idx in (0..self.comments.len()).rev() {
            let span = self.comments[idx].span;
            if span.end > start {
                continue;
            }
            if self.attached[idx] || self.lines.line_of(span.end) + 1 != line {
                break;
            }
            if let Some(prev) = self.token_before(span.start) {
                if self.lines.same_line(prev.end, span.start) {
                    break;
                }
            }
            picked.push(idx);
            line = self.lines.line_of(span.start);
        }
        picked.reverse();
        picked
            .into_iter()
            .map(|idx| {
                self.attached[idx] = true;
                self.comments[idx].node.clone()
            })
            .collect()
    }

    /// A comment on the same line as `end` with no token in between.
    pub fn trailing_comment(&mut self, end: usize) -> Option<String> {
        let limit = self.next_significant_start();
        let idx = (0..self.comments.len()).find(|&idx| {
            let span = self.comments[idx].span;
            !self.attached[idx]
                && span.start >= end
                && span.start < limit
                && self.lines.same_line(end, span.start)
        })?;
        self.attached[idx] = true;
        Some(self.comments[idx].node.clone())
    }

    // ── Block Parsing ─────────────────────────────────────────

    /// Parse a block: LBRACE stmts RBRACE
    pub fn parse_block(&mut self) -> Result<Block, ParseError> {
        let start = self.peek_span();
        self.expect(&Token::LBrace)?;
        let stmts = self.with_composites(true, |p| p.parse_stmt_list());
        self.expect(&Token::RBrace)?;
        let end = self.previous_span();
        Ok(Block {
            stmts,
            span: start.merge(end),
        })
    }

    /// Statements up to a closing brace or the next case clause.
    pub fn parse_stmt_list(&mut self) -> Vec<Spanned<Stmt>> {
        let mut stmts = Vec::new();
        loop {
            match self.peek() {
                Token::RBrace
                | Token::Eof
                | Token::Keyword(Keyword::Case | Keyword::Default) => break,
                Token::Semicolon => {
                    self.advance();
                    continue;
                }
                _ => {}
            }
            let result = self
                .parse_stmt()
                .and_then(|stmt| self.expect_semi().map(|_| stmt));
            match result {
                Ok(stmt) => stmts.push(stmt),
                Err(e) => {
                    self.errors.push(e);
                    let pos_before = self.pos;
                    self.synchronize_stmt();
                    // Guarantee forward progress to prevent infinite loops
                    if self.pos == pos_before && !self.check(&Token::RBrace) {
                        self.advance();
                    }
                }
            }
        }
        stmts
    }

    // ── Top-Level Parsing ─────────────────────────────────────

    /// Parse a complete source file.
    pub fn parse_file(&mut self) -> File {
        let start = self.peek_span();
        let doc = self.leading_comments(start.start);
        let package = match self.parse_package_clause() {
            Ok(name) => name,
            Err(e) => {
                self.errors.push(e);
                Ident::new("", Span::dummy())
            }
        };

        let mut decls = Vec::new();
        while !self.at_end() {
            if self.match_token(&Token::Semicolon) {
                continue;
            }
            let result = self
                .parse_decl()
                .and_then(|decl| self.expect_semi().map(|_| decl));
            match result {
                Ok(decl) => decls.push(decl),
                Err(e) => {
                    self.errors.push(e);
                    let pos_before = self.pos;
                    self.synchronize();
                    if self.pos == pos_before {
                        self.advance();
                    }
                }
            }
        }
        let end = self.previous_span();
        File {
            doc,
            package,
            decls,
            span: start.merge(end),
        }
    }

    fn parse_package_clause(&mut self) -> Result<Ident, ParseError> {
        if !self.check_keyword(Keyword::Package) {
            return Err(self.error(ParseErrorKind::MissingPackageClause, self.peek_span()));
        }
        self.advance();
        let name = self.expect_identifier()?;
        self.expect_semi()?;
        Ok(name)
    }

    /// Parse a top-level declaration.
    pub fn parse_decl(&mut self) -> Result<Spanned<Decl>, ParseError> {
        let start = self.peek_span();
        let doc = self.leading_comments(start.start);
        let decl = match self.peek() {
            Token::Keyword(Keyword::Import) => Decl::Import(self.parse_import_decl(doc)?),
            Token::Keyword(Keyword::Type) => Decl::Type(self.parse_type_decl(doc)?),
            Token::Keyword(Keyword::Var) => Decl::Var(self.parse_value_decl(Keyword::Var, doc)?),
            Token::Keyword(Keyword::Const) => {
                Decl::Const(self.parse_value_decl(Keyword::Const, doc)?)
            }
            Token::Keyword(Keyword::Func) => Decl::Func(self.parse_func_decl(doc)?),
            _ => return Err(self.error_unexpected("declaration")),
        };
        Ok(Spanned::new(decl, start.merge(self.previous_span())))
    }

    /// Either one spec, or a parenthesized group of them.
    fn parse_group<T>(
        &mut self,
        mut parse_spec: impl FnMut(&mut Self) -> Result<T, ParseError>,
    ) -> Result<(Vec<T>, bool), ParseError> {
        if !self.match_token(&Token::LParen) {
            return Ok((vec![parse_spec(self)?], false));
        }
        let mut specs = Vec::new();
        while !self.check(&Token::RParen) && !self.at_end() {
            if self.match_token(&Token::Semicolon) {
                continue;
            }
            specs.push(parse_spec(self)?);
            self.expect_semi()?;
        }
        self.expect(&Token::RParen)?;
        Ok((specs, true))
    }

    // ── Imports ───────────────────────────────────────────────

    fn parse_import_decl(&mut self, doc: Vec<String>) -> Result<ImportDecl, ParseError> {
        self.expect_keyword(Keyword::Import)?;
        let (specs, grouped) = self.parse_group(Self::parse_import_spec)?;
        Ok(ImportDecl {
            doc,
            specs,
            grouped,
        })
    }

    fn parse_import_spec(&mut self) -> Result<ImportSpec, ParseError> {
        let name = match self.peek().clone() {
            Token::Identifier(name) => Some(Ident::new(name, self.advance().span)),
            Token::Dot => Some(Ident::new(".", self.advance().span)),
            _ => None,
        };
        let path = match self.peek().clone() {
            Token::Literal(LitKind::String, text) => Spanned::new(text, self.advance().span),
            _ => return Err(self.error_unexpected("import path")),
        };
        let comment = self.trailing_comment(path.span.end);
        Ok(ImportSpec {
            name,
            path,
            comment,
        })
    }

    // ── Type Declarations ─────────────────────────────────────

    fn parse_type_decl(&mut self, doc: Vec<String>) -> Result<TypeDecl, ParseError> {
        self.expect_keyword(Keyword::Type)?;
        let (specs, grouped) = self.parse_group(Self::parse_type_spec)?;
        Ok(TypeDecl {
            doc,
            specs,
            grouped,
        })
    }

    fn parse_type_spec(&mut self) -> Result<TypeSpec, ParseError> {
        let name = self.expect_identifier()?;
        let is_alias = self.match_token(&Token::Eq);
        let type_ = self.parse_type()?;
        let span = name.span.merge(type_.span);
        let comment = self.trailing_comment(span.end);
        Ok(TypeSpec {
            name,
            is_alias,
            type_,
            comment,
            span,
        })
    }

    // ── Const / Var ───────────────────────────────────────────

    fn parse_value_decl(&mut self, kw: Keyword, doc: Vec<String>) -> Result<ValueDecl, ParseError> {
        self.expect_keyword(kw)?;
        let (specs, grouped) = self.parse_group(Self::parse_value_spec)?;
        Ok(ValueDecl {
            doc,
            specs,
            grouped,
        })
    }

    pub(crate) fn parse_value_spec(&mut self) -> Result<ValueSpec, ParseError> {
        let mut names = vec![self.expect_identifier()?];
        while self.match_token(&Token::Comma) {
            names.push(self.expect_identifier()?);
        }
        let type_ = if matches!(
            self.peek(),
            Token::Eq | Token::Semicolon | Token::RParen | Token::RBrace | Token::Eof
        ) {
            None
        } else {
            Some(self.parse_type()?)
        };
        let values = if self.match_token(&Token::Eq) {
            self.parse_expr_list()?
        } else {
            Vec::new()
        };
        let comment = self.trailing_comment(self.previous_span().end);
        Ok(ValueSpec {
            names,
            type_,
            values,
            comment,
        })
    }

    // ── Functions ─────────────────────────────────────────────

    fn parse_func_decl(&mut self, doc: Vec<String>) -> Result<FuncDecl, ParseError> {
        let start = self.expect_keyword(Keyword::Func)?.span;

        let recv = if self.check(&Token::LParen) {
            let recv_start = self.peek_span();
            let mut params = self.parse_parameters()?;
            let span = recv_start.merge(self.previous_span());
            if params.len() != 1 || params[0].names.len() > 1 {
                return Err(self.error(ParseErrorKind::InvalidReceiver, span));
            }
            params.pop()
        } else {
            None
        };

        let name = self.expect_identifier()?;
        let signature = self.parse_signature()?;
        let body = if self.check(&Token::LBrace) {
            Some(self.parse_block()?)
        } else {
            None
        };

        Ok(FuncDecl {
            doc,
            recv,
            name,
            signature,
            body,
            span: start.merge(self.previous_span()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Helper: parse source, return the file. Panics if there are errors.
    fn parse(source: &str) -> File {
        let mut parser = Parser::new(source);
        let file = parser.parse_file();
        if parser.has_errors() {
            for e in &parser.lex_errors {
                eprintln!("Lex error: {:?}", e);
            }
            for e in &parser.errors {
                eprintln!("Parse error: {:?}", e);
            }
            panic!("Parser produced errors");
        }
        file
    }

    fn parse_with_errors(source: &str) -> (File, Vec<ParseError>) {
        let mut parser = Parser::new(source);
        let file = parser.parse_file();
        (file, parser.errors)
    }

    // ── Package / Imports ───────────────────────────────────────

    #[test]
    fn test_package_clause() {
        let file = parse("package main\n");
        assert_eq!(file.package.name, "main");
        assert!(file.decls.is_empty());
    }

    #[test]
    fn test_missing_package_clause() {
        let (_, errors) = parse_with_errors("func main() {}\n");
        assert!(matches!(errors[0].kind, ParseErrorKind::MissingPackageClause));
    }

    #[test]
    fn test_single_import() {
        let file = parse("package main\nimport \"fmt\"\n");
        match &file.decls[0].node {
            Decl::Import(imp) => {
                assert!(!imp.grouped);
                assert_eq!(imp.specs[0].path.node, "\"fmt\"");
            }
            other => panic!("expected import, got {other:?}"),
        }
    }

    #[test]
    fn test_grouped_import_with_trailing_comment() {
        let file = parse(
            "package main\n\nimport (\n\t\"fmt\"\n\tl \"log\" // logging\n)\n",
        );
        let Decl::Import(imp) = &file.decls[0].node else {
            panic!("expected import");
        };
        assert!(imp.grouped);
        assert_eq!(imp.specs.len(), 2);
        assert_eq!(imp.specs[1].name.as_ref().map(|n| n.name.as_str()), Some("l"));
        assert_eq!(imp.specs[1].comment.as_deref(), Some("// logging"));
        assert!(imp.specs[0].comment.is_none());
    }

    // ── Types ───────────────────────────────────────────────────

    #[test]
    fn test_template_struct() {
        let file = parse(
            "package main\n\ntype TPLᐸTᐳ struct {\n\tValue T \"tags are preserved\" // comments are not :(\n}\n",
        );
        let Decl::Type(decl) = &file.decls[0].node else {
            panic!("expected type decl");
        };
        let spec = &decl.specs[0];
        assert_eq!(spec.name.name, "TPLᐸTᐳ");
        let TypeExpr::Struct(st) = &spec.type_.node else {
            panic!("expected struct type");
        };
        let field = &st.fields[0];
        assert_eq!(field.names[0].name, "Value");
        assert!(matches!(&field.type_.node, TypeExpr::Name(id) if id.name == "T"));
        assert_eq!(field.tag.as_deref(), Some("\"tags are preserved\""));
        assert_eq!(field.comment.as_deref(), Some("// comments are not :("));
    }

    #[test]
    fn test_doc_comment_attaches_to_decl() {
        let file = parse("package main\n\n// Greeter says hi.\n// Twice.\ntype Greeter struct{}\n");
        let Decl::Type(decl) = &file.decls[0].node else {
            panic!("expected type decl");
        };
        assert_eq!(decl.doc, vec!["// Greeter says hi.", "// Twice."]);
    }

    #[test]
    fn test_detached_comment_is_free() {
        let mut parser = Parser::new("package main\n\n// floating\n\nvar x = 1\n");
        let file = parser.parse_file();
        let Decl::Var(decl) = &file.decls[0].node else {
            panic!("expected var decl");
        };
        assert!(decl.doc.is_empty());
        let free = parser.take_comments();
        assert_eq!(free.len(), 1);
        assert_eq!(free[0].node, "// floating");
    }

    #[test]
    fn test_grouped_type_decl() {
        let file = parse("package main\ntype (\n\tA int\n\tB = string\n)\n");
        let Decl::Type(decl) = &file.decls[0].node else {
            panic!("expected type decl");
        };
        assert!(decl.grouped);
        assert!(!decl.specs[0].is_alias);
        assert!(decl.specs[1].is_alias);
    }

    // ── Functions ───────────────────────────────────────────────

    #[test]
    fn test_method_with_pointer_receiver() {
        let file = parse("package main\nfunc (t *TPLᐸTᐳ) SayHello() {}\n");
        let Decl::Func(func) = &file.decls[0].node else {
            panic!("expected func decl");
        };
        assert_eq!(func.name.name, "SayHello");
        assert_eq!(func.receiver_type().map(|id| id.name.as_str()), Some("TPLᐸTᐳ"));
        assert_eq!(func.recv.as_ref().map(|r| r.names[0].name.as_str()), Some("t"));
    }

    #[test]
    fn test_func_signatures() {
        let file = parse(
            "package main\nfunc f(a, b int, c ...string) (n int, err error) { return }\nfunc g(int, string) bool\n",
        );
        let Decl::Func(f) = &file.decls[0].node else {
            panic!("expected func");
        };
        assert_eq!(f.signature.params.len(), 2);
        assert_eq!(f.signature.params[0].names.len(), 2);
        assert!(matches!(f.signature.params[1].type_.node, TypeExpr::Variadic(_)));
        assert_eq!(f.signature.results.len(), 2);
        let Decl::Func(g) = &file.decls[1].node else {
            panic!("expected func");
        };
        assert!(g.body.is_none());
        assert!(g.signature.params.iter().all(|p| p.names.is_empty()));
        assert_eq!(g.signature.results.len(), 1);
    }

    #[test]
    fn test_multiple_receivers_rejected() {
        let (_, errors) = parse_with_errors("package main\nfunc (a, b T) M() {}\n");
        assert!(matches!(errors[0].kind, ParseErrorKind::InvalidReceiver));
    }

    #[test]
    fn test_mixed_parameters_rejected() {
        let (_, errors) = parse_with_errors("package main\nfunc f(a int, string) {}\n");
        assert!(matches!(errors[0].kind, ParseErrorKind::MixedParameters));
    }

    // ── Const / Var ─────────────────────────────────────────────

    #[test]
    fn test_const_group_with_iota() {
        let file = parse("package main\nconst (\n\tA = iota\n\tB\n\tC\n)\n");
        let Decl::Const(decl) = &file.decls[0].node else {
            panic!("expected const decl");
        };
        assert_eq!(decl.specs.len(), 3);
        assert!(decl.specs[1].values.is_empty());
    }

    #[test]
    fn test_typed_var() {
        let file = parse("package main\nvar m map[string][]int\n");
        let Decl::Var(decl) = &file.decls[0].node else {
            panic!("expected var decl");
        };
        assert!(matches!(
            decl.specs[0].type_.as_ref().map(|t| &t.node),
            Some(TypeExpr::Map { .. })
        ));
    }

    // ── Recovery ────────────────────────────────────────────────

    #[test]
    fn test_recovers_at_next_declaration() {
        let (file, errors) = parse_with_errors("package main\nvar = 1\nfunc ok() {}\n");
        assert_eq!(errors.len(), 1);
        assert!(file
            .decls
            .iter()
            .any(|d| matches!(&d.node, Decl::Func(f) if f.name.name == "ok")));
    }

    #[test]
    fn test_recovers_inside_block() {
        let (file, errors) =
            parse_with_errors("package main\nfunc f() {\n\tx := )\n\ty := 2\n}\n");
        assert_eq!(errors.len(), 1);
        let Decl::Func(f) = &file.decls[0].node else {
            panic!("expected func");
        };
        assert_eq!(f.body.as_ref().map(|b| b.stmts.len()), Some(1));
    }
}
