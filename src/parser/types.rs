use crate::lexer::token::{Keyword, LitKind, Token};
use crate::span::Spanned;

use super::ast::*;
use super::Parser;
use crate::errors::{ParseError, ParseErrorKind};

/// A parameter or result without tag or comments.
fn param_field(names: Vec<Ident>, type_: Spanned<TypeExpr>) -> Field {
    let span = names
        .first()
        .map_or(type_.span, |first| first.span.merge(type_.span));
    Field {
        doc: Vec::new(),
        names,
        type_,
        tag: None,
        comment: None,
        span,
    }
}

impl Parser {
    /// Whether the current token can begin a type.
    pub fn starts_type(&self) -> bool {
        matches!(
            self.peek(),
            Token::Identifier(_)
                | Token::Star
                | Token::LBracket
                | Token::LParen
                | Token::Arrow
                | Token::Keyword(
                    Keyword::Map
                        | Keyword::Chan
                        | Keyword::Func
                        | Keyword::Struct
                        | Keyword::Interface
                )
        )
    }

    /// Parse a type expression.
    pub fn parse_type(&mut self) -> Result<Spanned<TypeExpr>, ParseError> {
        let start = self.peek_span();

        let ty = match self.peek() {
            Token::Identifier(_) => return self.parse_type_name(),
            Token::Star => {
                self.advance();
                TypeExpr::Pointer(Box::new(self.parse_type()?))
            }
            Token::LBracket => {
                self.advance();
                if self.match_token(&Token::RBracket) {
                    TypeExpr::Slice(Box::new(self.parse_type()?))
                } else {
                    let len = if self.match_token(&Token::Ellipsis) {
                        None
                    } else {
                        Some(Box::new(self.with_composites(true, |p| p.parse_expr())?))
                    };
                    self.expect(&Token::RBracket)?;
                    TypeExpr::Array {
                        len,
                        elem: Box::new(self.parse_type()?),
                    }
                }
            }
            Token::Keyword(Keyword::Map) => {
                self.advance();
                self.expect(&Token::LBracket)?;
                let key = self.parse_type()?;
                self.expect(&Token::RBracket)?;
                TypeExpr::Map {
                    key: Box::new(key),
                    value: Box::new(self.parse_type()?),
                }
            }
            Token::Keyword(Keyword::Chan) => {
                self.advance();
                let dir = if self.match_token(&Token::Arrow) {
                    ChanDir::Send
                } else {
                    ChanDir::Both
                };
                TypeExpr::Chan {
                    dir,
                    elem: Box::new(self.parse_type()?),
                }
            }
            Token::Arrow => {
                self.advance();
                self.expect_keyword(Keyword::Chan)?;
                TypeExpr::Chan {
                    dir: ChanDir::Recv,
                    elem: Box::new(self.parse_type()?),
                }
            }
            Token::Keyword(Keyword::Func) => {
                self.advance();
                TypeExpr::Func(self.parse_signature()?)
            }
            Token::Keyword(Keyword::Struct) => TypeExpr::Struct(self.parse_struct_type()?),
            Token::Keyword(Keyword::Interface) => {
                TypeExpr::Interface(self.parse_interface_type()?)
            }
            Token::LParen => {
                self.advance();
                let inner = self.parse_type()?;
                self.expect(&Token::RParen)?;
                return Ok(Spanned::new(inner.node, start.merge(self.previous_span())));
            }
            _ => return Err(self.error(ParseErrorKind::ExpectedType, start)),
        };

        Ok(Spanned::new(ty, start.merge(self.previous_span())))
    }

    /// `Name` or `pkg.Name`.
    pub fn parse_type_name(&mut self) -> Result<Spanned<TypeExpr>, ParseError> {
        let first = self.expect_identifier()?;
        if self.match_token(&Token::Dot) {
            let name = self.expect_identifier()?;
            let span = first.span.merge(name.span);
            return Ok(Spanned::new(
                TypeExpr::Qualified {
                    package: first,
                    name,
                },
                span,
            ));
        }
        let span = first.span;
        Ok(Spanned::new(TypeExpr::Name(first), span))
    }

    // ── Structs ───────────────────────────────────────────────

    pub fn parse_struct_type(&mut self) -> Result<StructType, ParseError> {
        self.expect_keyword(Keyword::Struct)?;
        self.expect(&Token::LBrace)?;
        let mut fields = Vec::new();
        while !self.check(&Token::RBrace) && !self.at_end() {
            if self.match_token(&Token::Semicolon) {
                continue;
            }
            fields.push(self.parse_field_decl()?);
            self.expect_semi()?;
        }
        self.expect(&Token::RBrace)?;
        Ok(StructType { fields })
    }

    fn parse_field_decl(&mut self) -> Result<Field, ParseError> {
        let start = self.peek_span();
        let doc = self.leading_comments(start.start);

        let (names, type_) = match self.peek() {
            // Embedded `T`, `pkg.T`
            Token::Identifier(_)
                if matches!(
                    self.peek_ahead(1),
                    Token::Dot
                        | Token::Semicolon
                        | Token::RBrace
                        | Token::Literal(LitKind::String, _)
                ) =>
            {
                (Vec::new(), self.parse_type_name()?)
            }
            Token::Identifier(_) => {
                let mut names = vec![self.expect_identifier()?];
                while self.match_token(&Token::Comma) {
                    names.push(self.expect_identifier()?);
                }
                (names, self.parse_type()?)
            }
            // Embedded `*T`
            Token::Star => {
                self.advance();
                let inner = self.parse_type_name()?;
                let span = start.merge(inner.span);
                (Vec::new(), Spanned::new(TypeExpr::Pointer(Box::new(inner)), span))
            }
            _ => return Err(self.error_unexpected("field name or embedded type")),
        };

        let tag = match self.peek().clone() {
            Token::Literal(LitKind::String, text) => {
                self.advance();
                Some(text)
            }
            _ => None,
        };

        let span = start.merge(self.previous_span());
        let comment = self.trailing_comment(span.end);
        Ok(Field {
            doc,
            names,
            type_,
            tag,
            comment,
            span,
        })
    }

    // ── Interfaces ────────────────────────────────────────────

    pub fn parse_interface_type(&mut self) -> Result<InterfaceType, ParseError> {
        self.expect_keyword(Keyword::Interface)?;
        self.expect(&Token::LBrace)?;
        let mut elems = Vec::new();
        while !self.check(&Token::RBrace) && !self.at_end() {
            if self.match_token(&Token::Semicolon) {
                continue;
            }
            let elem = if matches!(self.peek(), Token::Identifier(_))
                && self.peek_ahead(1) == &Token::LParen
            {
                let name = self.expect_identifier()?;
                let signature = self.parse_signature()?;
                let comment = self.trailing_comment(self.previous_span().end);
                InterfaceElem::Method {
                    name,
                    signature,
                    comment,
                }
            } else {
                let type_ = self.parse_type_name()?;
                let comment = self.trailing_comment(type_.span.end);
                InterfaceElem::Embedded { type_, comment }
            };
            elems.push(elem);
            self.expect_semi()?;
        }
        self.expect(&Token::RBrace)?;
        Ok(InterfaceType { elems })
    }

    // ── Signatures ────────────────────────────────────────────

    /// Parameters and results, after `func` and any name.
    pub fn parse_signature(&mut self) -> Result<FuncType, ParseError> {
        let params = self.parse_parameters()?;
        let results = if self.check(&Token::LParen) {
            self.parse_parameters()?
        } else if self.starts_type() {
            let ty = self.parse_type()?;
            vec![param_field(Vec::new(), ty)]
        } else {
            Vec::new()
        };
        Ok(FuncType { params, results })
    }

    fn parse_param_type(&mut self) -> Result<Spanned<TypeExpr>, ParseError> {
        let start = self.peek_span();
        if self.match_token(&Token::Ellipsis) {
            let elem = self.parse_type()?;
            let span = start.merge(elem.span);
            return Ok(Spanned::new(TypeExpr::Variadic(Box::new(elem)), span));
        }
        self.parse_type()
    }

    /// A parenthesized parameter list. Either every entry is a bare type or
    /// every entry is named; `a, b int` shares one type across names.
    pub fn parse_parameters(&mut self) -> Result<Vec<Field>, ParseError> {
        self.expect(&Token::LParen)?;
        let mut entries: Vec<(Option<Ident>, Spanned<TypeExpr>)> = Vec::new();
        while !self.check(&Token::RParen) && !self.at_end() {
            let first = self.parse_param_type()?;
            if matches!(self.peek(), Token::Comma | Token::RParen) {
                entries.push((None, first));
            } else {
                let TypeExpr::Name(name) = first.node else {
                    return Err(self.error_unexpected("',' or ')'"));
                };
                let ty = self.parse_param_type()?;
                entries.push((Some(name), ty));
            }
            if !self.match_token(&Token::Comma) {
                break;
            }
        }
        self.expect(&Token::RParen)?;

        if entries.iter().all(|(name, _)| name.is_none()) {
            return Ok(entries
                .into_iter()
                .map(|(_, ty)| param_field(Vec::new(), ty))
                .collect());
        }

        let mut fields = Vec::new();
        let mut pending: Vec<Ident> = Vec::new();
        for (name, ty) in entries {
            match (name, ty.node) {
                (Some(name), node) => {
                    pending.push(name);
                    fields.push(param_field(
                        std::mem::take(&mut pending),
                        Spanned::new(node, ty.span),
                    ));
                }
                (None, TypeExpr::Name(id)) => pending.push(id),
                (None, _) => {
                    return Err(self.error(ParseErrorKind::MixedParameters, ty.span));
                }
            }
        }
        if let Some(stray) = pending.first() {
            return Err(self.error(ParseErrorKind::MixedParameters, stray.span));
        }
        Ok(fields)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_type_src(src: &str) -> TypeExpr {
        let mut parser = Parser::new(src);
        let ty = parser.parse_type().expect("type should parse");
        assert!(parser.errors.is_empty());
        ty.node
    }

    #[test]
    fn test_qualified_type() {
        assert!(matches!(
            parse_type_src("io.Reader"),
            TypeExpr::Qualified { package, name } if package.name == "io" && name.name == "Reader"
        ));
    }

    #[test]
    fn test_array_and_slice() {
        assert!(matches!(parse_type_src("[]byte"), TypeExpr::Slice(_)));
        assert!(matches!(parse_type_src("[4]int"), TypeExpr::Array { len: Some(_), .. }));
        assert!(matches!(parse_type_src("[...]int"), TypeExpr::Array { len: None, .. }));
    }

    #[test]
    fn test_channel_directions() {
        assert!(matches!(parse_type_src("chan int"), TypeExpr::Chan { dir: ChanDir::Both, .. }));
        assert!(matches!(parse_type_src("chan<- int"), TypeExpr::Chan { dir: ChanDir::Send, .. }));
        assert!(matches!(parse_type_src("<-chan int"), TypeExpr::Chan { dir: ChanDir::Recv, .. }));
    }

    #[test]
    fn test_func_type_with_single_result() {
        let TypeExpr::Func(sig) = parse_type_src("func(int) error") else {
            panic!("expected func type");
        };
        assert_eq!(sig.params.len(), 1);
        assert_eq!(sig.results.len(), 1);
    }

    #[test]
    fn test_struct_with_embedded_fields() {
        let TypeExpr::Struct(st) = parse_type_src("struct {\n\tio.Reader\n\t*Base\n\tx, y int\n}") else {
            panic!("expected struct type");
        };
        assert_eq!(st.fields.len(), 3);
        assert!(st.fields[0].names.is_empty());
        assert!(matches!(st.fields[1].type_.node, TypeExpr::Pointer(_)));
        assert_eq!(st.fields[2].names.len(), 2);
    }

    #[test]
    fn test_interface_type() {
        let TypeExpr::Interface(iface) =
            parse_type_src("interface {\n\tfmt.Stringer\n\tClose() error // closes\n}")
        else {
            panic!("expected interface type");
        };
        assert_eq!(iface.elems.len(), 2);
        assert!(matches!(
            &iface.elems[1],
            InterfaceElem::Method { name, comment: Some(c), .. } if name.name == "Close" && c == "// closes"
        ));
    }
}
