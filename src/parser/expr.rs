use crate::lexer::token::{Keyword, Token};
use crate::span::{Span, Spanned};

use super::ast::*;
use super::Parser;
use crate::errors::{ParseError, ParseErrorKind};

fn boxed(expr: Spanned<Expr>) -> Box<Spanned<Expr>> {
    Box::new(expr)
}

impl Parser {
    /// Parse an expression.
    pub fn parse_expr(&mut self) -> Result<Spanned<Expr>, ParseError> {
        self.parse_binary_expr(1)
    }

    pub fn parse_expr_list(&mut self) -> Result<Vec<Spanned<Expr>>, ParseError> {
        let mut exprs = vec![self.parse_expr()?];
        while self.match_token(&Token::Comma) {
            exprs.push(self.parse_expr()?);
        }
        Ok(exprs)
    }

    fn binary_op(&self) -> Option<BinaryOp> {
        let op = match self.peek() {
            Token::OrOr => BinaryOp::LogOr,
            Token::AndAnd => BinaryOp::LogAnd,
            Token::EqEq => BinaryOp::Eq,
            Token::BangEq => BinaryOp::Ne,
            Token::Lt => BinaryOp::Lt,
            Token::LtEq => BinaryOp::Le,
            Token::Gt => BinaryOp::Gt,
            Token::GtEq => BinaryOp::Ge,
            Token::Plus => BinaryOp::Add,
            Token::Minus => BinaryOp::Sub,
            Token::Pipe => BinaryOp::Or,
            Token::Caret => BinaryOp::Xor,
            Token::Star => BinaryOp::Mul,
            Token::Slash => BinaryOp::Div,
            Token::Percent => BinaryOp::Rem,
            Token::Shl => BinaryOp::Shl,
            Token::Shr => BinaryOp::Shr,
            Token::Amp => BinaryOp::And,
            Token::AndNot => BinaryOp::AndNot,
            _ => return None,
        };
        Some(op)
    }

    /// Precedence climbing; operators of equal precedence associate left.
    fn parse_binary_expr(&mut self, min_prec: u8) -> Result<Spanned<Expr>, ParseError> {
        let mut lhs = self.parse_unary_expr()?;
        while let Some(op) = self.binary_op() {
            if op.precedence() < min_prec {
                break;
            }
            self.advance();
            let rhs = self.parse_binary_expr(op.precedence() + 1)?;
            let span = lhs.span.merge(rhs.span);
            lhs = Spanned::new(
                Expr::Binary {
                    op,
                    lhs: boxed(lhs),
                    rhs: boxed(rhs),
                },
                span,
            );
        }
        Ok(lhs)
    }

    pub fn parse_unary_expr(&mut self) -> Result<Spanned<Expr>, ParseError> {
        let start = self.peek_span();
        let op = match self.peek() {
            Token::Plus => UnaryOp::Plus,
            Token::Minus => UnaryOp::Neg,
            Token::Bang => UnaryOp::Not,
            Token::Caret => UnaryOp::BitNot,
            Token::Amp => UnaryOp::Addr,
            // `<-chan T` is a type, `<-ch` a receive
            Token::Arrow if self.peek_ahead(1) == &Token::Keyword(Keyword::Chan) => {
                let ty = self.parse_type()?;
                let span = ty.span;
                return self.parse_primary_suffixes(Spanned::new(Expr::Type(Box::new(ty)), span));
            }
            Token::Arrow => UnaryOp::Recv,
            Token::Star => {
                self.advance();
                let operand = self.parse_unary_expr()?;
                let span = start.merge(operand.span);
                return Ok(Spanned::new(Expr::Star(boxed(operand)), span));
            }
            _ => return self.parse_primary_expr(),
        };
        self.advance();
        let operand = self.parse_unary_expr()?;
        let span = start.merge(operand.span);
        Ok(Spanned::new(
            Expr::Unary {
                op,
                expr: boxed(operand),
            },
            span,
        ))
    }

    fn parse_primary_expr(&mut self) -> Result<Spanned<Expr>, ParseError> {
        let operand = self.parse_operand()?;
        self.parse_primary_suffixes(operand)
    }

    fn parse_operand(&mut self) -> Result<Spanned<Expr>, ParseError> {
        let start = self.peek_span();
        match self.peek().clone() {
            Token::Identifier(name) => {
                self.advance();
                Ok(Spanned::new(Expr::Ident(Ident::new(name, start)), start))
            }
            Token::Literal(kind, value) => {
                self.advance();
                Ok(Spanned::new(Expr::BasicLit { kind, value }, start))
            }
            Token::LParen => {
                self.advance();
                let inner = self.with_composites(true, |p| p.parse_expr())?;
                self.expect(&Token::RParen)?;
                let span = start.merge(self.previous_span());
                Ok(Spanned::new(Expr::Paren(boxed(inner)), span))
            }
            Token::Keyword(Keyword::Func) => {
                self.advance();
                let signature = self.parse_signature()?;
                if self.check(&Token::LBrace) {
                    let body = self.parse_block()?;
                    let span = start.merge(body.span);
                    return Ok(Spanned::new(Expr::FuncLit { signature, body }, span));
                }
                let span = start.merge(self.previous_span());
                let ty = Spanned::new(TypeExpr::Func(signature), span);
                Ok(Spanned::new(Expr::Type(Box::new(ty)), span))
            }
            Token::LBracket
            | Token::Keyword(
                Keyword::Map | Keyword::Chan | Keyword::Struct | Keyword::Interface,
            ) => {
                let ty = self.parse_type()?;
                let span = ty.span;
                Ok(Spanned::new(Expr::Type(Box::new(ty)), span))
            }
            _ => Err(self.error(ParseErrorKind::ExpectedExpression, start)),
        }
    }

    /// Whether `{` after this expression opens a composite literal.
    fn allows_composite(&self, expr: &Expr) -> bool {
        match expr {
            Expr::Type(ty) => matches!(
                ty.node,
                TypeExpr::Array { .. } | TypeExpr::Slice(_) | TypeExpr::Map { .. } | TypeExpr::Struct(_)
            ),
            Expr::Ident(_) | Expr::Index { .. } => !self.no_composite,
            Expr::Selector { expr, .. } => {
                matches!(expr.node, Expr::Ident(_)) && !self.no_composite
            }
            _ => false,
        }
    }

    fn parse_primary_suffixes(
        &mut self,
        mut expr: Spanned<Expr>,
    ) -> Result<Spanned<Expr>, ParseError> {
        loop {
            expr = match self.peek() {
                Token::Dot => {
                    self.advance();
                    match self.peek().clone() {
                        Token::Identifier(name) => {
                            let sel = Ident::new(name, self.advance().span);
                            let span = expr.span.merge(sel.span);
                            Spanned::new(
                                Expr::Selector {
                                    expr: boxed(expr),
                                    sel,
                                },
                                span,
                            )
                        }
                        Token::LParen => {
                            self.advance();
                            let type_ = if self.match_keyword(Keyword::Type) {
                                None
                            } else {
                                Some(Box::new(self.parse_type()?))
                            };
                            self.expect(&Token::RParen)?;
                            let span = expr.span.merge(self.previous_span());
                            Spanned::new(
                                Expr::TypeAssert {
                                    expr: boxed(expr),
                                    type_,
                                },
                                span,
                            )
                        }
                        _ => return Err(self.error_unexpected("selector or type assertion")),
                    }
                }
                Token::LBracket => self.parse_index_or_slice(expr)?,
                Token::LParen => self.parse_call(expr)?,
                Token::LBrace if self.allows_composite(&expr.node) => {
                    let start = expr.span;
                    let lit = self.parse_literal_value(Some(boxed(expr)))?;
                    Spanned::new(lit, start.merge(self.previous_span()))
                }
                _ => return Ok(expr),
            };
        }
    }

    fn parse_index_or_slice(&mut self, expr: Spanned<Expr>) -> Result<Spanned<Expr>, ParseError> {
        self.expect(&Token::LBracket)?;
        let node = self.with_composites(true, |p| -> Result<Expr, ParseError> {
            let mut parts: [Option<Spanned<Expr>>; 3] = [None, None, None];
            let mut colons = 0;
            if !p.check(&Token::Colon) {
                parts[0] = Some(p.parse_expr()?);
            }
            while colons < 2 && p.match_token(&Token::Colon) {
                colons += 1;
                if !p.check(&Token::Colon) && !p.check(&Token::RBracket) {
                    parts[colons] = Some(p.parse_expr()?);
                }
            }

            if colons > 0 {
                let [low, high, max] = parts;
                return Ok(Expr::Slice {
                    expr: boxed(expr),
                    low: low.map(boxed),
                    high: high.map(boxed),
                    max: max.map(boxed),
                });
            }

            let [first, ..] = parts;
            let mut indices: Vec<Spanned<Expr>> = first.into_iter().collect();
            while p.match_token(&Token::Comma) && !p.check(&Token::RBracket) {
                indices.push(p.parse_expr()?);
            }
            Ok(Expr::Index {
                expr: boxed(expr),
                indices,
            })
        });
        let node = node?;
        self.expect(&Token::RBracket)?;
        let span = match &node {
            Expr::Slice { expr, .. } | Expr::Index { expr, .. } => expr.span,
            _ => Span::dummy(),
        };
        Ok(Spanned::new(node, span.merge(self.previous_span())))
    }

    fn parse_call(&mut self, fun: Spanned<Expr>) -> Result<Spanned<Expr>, ParseError> {
        self.expect(&Token::LParen)?;
        let (args, ellipsis) = self.with_composites(true, |p| -> Result<_, ParseError> {
            let mut args = Vec::new();
            let mut ellipsis = false;
            while !p.check(&Token::RParen) && !p.at_end() {
                args.push(p.parse_expr()?);
                if p.match_token(&Token::Ellipsis) {
                    ellipsis = true;
                }
                if !p.match_token(&Token::Comma) {
                    break;
                }
            }
            Ok((args, ellipsis))
        })?;
        self.expect(&Token::RParen)?;
        let span = fun.span.merge(self.previous_span());
        Ok(Spanned::new(
            Expr::Call {
                fun: boxed(fun),
                args,
                ellipsis,
            },
            span,
        ))
    }

    /// `{ elements }`, after the literal's type (if any).
    fn parse_literal_value(
        &mut self,
        type_: Option<Box<Spanned<Expr>>>,
    ) -> Result<Expr, ParseError> {
        let open = self.expect(&Token::LBrace)?.span;
        let elts = self.with_composites(true, |p| -> Result<_, ParseError> {
            let mut elts = Vec::new();
            while !p.check(&Token::RBrace) && !p.at_end() {
                elts.push(p.parse_element()?);
                if !p.match_token(&Token::Comma) {
                    break;
                }
            }
            Ok(elts)
        })?;
        let close = self.expect(&Token::RBrace)?.span;
        Ok(Expr::Composite {
            type_,
            elts,
            multiline: !self.lines.same_line(open.start, close.start),
        })
    }

    fn parse_element(&mut self) -> Result<Spanned<Expr>, ParseError> {
        let key = self.parse_element_value()?;
        if !self.match_token(&Token::Colon) {
            return Ok(key);
        }
        let value = self.parse_element_value()?;
        let span = key.span.merge(value.span);
        Ok(Spanned::new(
            Expr::KeyValue {
                key: boxed(key),
                value: boxed(value),
            },
            span,
        ))
    }

    /// An expression, or a literal value with its type elided.
    fn parse_element_value(&mut self) -> Result<Spanned<Expr>, ParseError> {
        if self.check(&Token::LBrace) {
            let start = self.peek_span();
            let lit = self.parse_literal_value(None)?;
            return Ok(Spanned::new(lit, start.merge(self.previous_span())));
        }
        self.parse_expr()
    }
}
