use crate::lexer::token::{Keyword, Token};
use crate::span::Spanned;

use super::ast::*;
use super::Parser;
use crate::errors::{ParseError, ParseErrorKind};

/// A simple statement, or a range clause where one is allowed.
enum SimpleStmt {
    Stmt(Spanned<Stmt>),
    Range {
        key: Option<Spanned<Expr>>,
        value: Option<Spanned<Expr>>,
        define: bool,
        expr: Spanned<Expr>,
    },
}

/// What follows `switch` (after any init statement).
enum SwitchTag {
    None,
    Expr(Spanned<Expr>),
    Type {
        binding: Option<Ident>,
        expr: Spanned<Expr>,
    },
}

fn assign_op(token: &Token) -> Option<AssignOp> {
    let op = match token {
        Token::Eq => AssignOp::Assign,
        Token::Define => AssignOp::Define,
        Token::PlusEq => AssignOp::Add,
        Token::MinusEq => AssignOp::Sub,
        Token::StarEq => AssignOp::Mul,
        Token::SlashEq => AssignOp::Div,
        Token::PercentEq => AssignOp::Rem,
        Token::AmpEq => AssignOp::And,
        Token::PipeEq => AssignOp::Or,
        Token::CaretEq => AssignOp::Xor,
        Token::ShlEq => AssignOp::Shl,
        Token::ShrEq => AssignOp::Shr,
        Token::AndNotEq => AssignOp::AndNot,
        _ => return None,
    };
    Some(op)
}

impl Parser {
    /// Parse a single statement (without its terminating semicolon).
    pub fn parse_stmt(&mut self) -> Result<Spanned<Stmt>, ParseError> {
        let start = self.peek_span();
        let stmt = match self.peek() {
            Token::Keyword(Keyword::Var) => {
                Stmt::Decl(Decl::Var(self.parse_value_decl(Keyword::Var, Vec::new())?))
            }
            Token::Keyword(Keyword::Const) => {
                Stmt::Decl(Decl::Const(self.parse_value_decl(Keyword::Const, Vec::new())?))
            }
            Token::Keyword(Keyword::Type) => {
                Stmt::Decl(Decl::Type(self.parse_type_decl(Vec::new())?))
            }
            Token::Keyword(Keyword::Go) => {
                self.advance();
                Stmt::Go(self.parse_expr()?)
            }
            Token::Keyword(Keyword::Defer) => {
                self.advance();
                Stmt::Defer(self.parse_expr()?)
            }
            Token::Keyword(Keyword::Return) => {
                self.advance();
                if matches!(self.peek(), Token::Semicolon | Token::RBrace) {
                    Stmt::Return(Vec::new())
                } else {
                    Stmt::Return(self.parse_expr_list()?)
                }
            }
            Token::Keyword(kw @ (Keyword::Break | Keyword::Continue | Keyword::Goto)) => {
                let kind = match kw {
                    Keyword::Break => BranchKind::Break,
                    Keyword::Continue => BranchKind::Continue,
                    _ => BranchKind::Goto,
                };
                self.advance();
                let label = if matches!(self.peek(), Token::Identifier(_)) || kind == BranchKind::Goto
                {
                    Some(self.expect_identifier()?)
                } else {
                    None
                };
                Stmt::Branch { kind, label }
            }
            Token::Keyword(Keyword::Fallthrough) => {
                self.advance();
                Stmt::Branch {
                    kind: BranchKind::Fallthrough,
                    label: None,
                }
            }
            Token::LBrace => Stmt::Block(self.parse_block()?),
            Token::Keyword(Keyword::If) => Stmt::If(self.parse_if()?),
            Token::Keyword(Keyword::Switch) => self.parse_switch()?,
            Token::Keyword(Keyword::Select) => self.parse_select()?,
            Token::Keyword(Keyword::For) => self.parse_for()?,
            // Empty statement; the terminator belongs to the caller
            Token::Semicolon | Token::RBrace => return Ok(Spanned::new(Stmt::Empty, start)),
            Token::Keyword(
                Keyword::Case
                | Keyword::Default
                | Keyword::Else
                | Keyword::Import
                | Keyword::Package,
            ) => return Err(self.error(ParseErrorKind::ExpectedStatement, start)),
            _ => return self.parse_simple_stmt(true, false).and_then(|s| self.only_stmt(s)),
        };
        Ok(Spanned::new(stmt, start.merge(self.previous_span())))
    }

    fn only_stmt(&self, simple: SimpleStmt) -> Result<Spanned<Stmt>, ParseError> {
        match simple {
            SimpleStmt::Stmt(stmt) => Ok(stmt),
            SimpleStmt::Range { expr, .. } => {
                Err(self.error(ParseErrorKind::ExpectedStatement, expr.span))
            }
        }
    }

    /// A simple statement where no label or range clause may appear.
    fn simple_stmt(&mut self) -> Result<Spanned<Stmt>, ParseError> {
        let simple = self.parse_simple_stmt(false, false)?;
        self.only_stmt(simple)
    }

    fn stmt_into_expr(&self, stmt: Spanned<Stmt>) -> Result<Spanned<Expr>, ParseError> {
        match stmt.node {
            Stmt::Expr(expr) => Ok(expr),
            _ => Err(self.error(ParseErrorKind::ExpectedExpression, stmt.span)),
        }
    }

    fn parse_simple_stmt(
        &mut self,
        label_ok: bool,
        range_ok: bool,
    ) -> Result<SimpleStmt, ParseError> {
        let start = self.peek_span();

        // `for range ch`
        if range_ok && self.match_keyword(Keyword::Range) {
            let expr = self.parse_expr()?;
            return Ok(SimpleStmt::Range {
                key: None,
                value: None,
                define: false,
                expr,
            });
        }

        let mut lhs = self.parse_expr_list()?;
        let next = self.peek().clone();

        if let Some(op) = assign_op(&next) {
            self.advance();
            if range_ok
                && matches!(op, AssignOp::Assign | AssignOp::Define)
                && self.match_keyword(Keyword::Range)
            {
                let expr = self.parse_expr()?;
                let mut targets = lhs.into_iter();
                return Ok(SimpleStmt::Range {
                    key: targets.next(),
                    value: targets.next(),
                    define: op == AssignOp::Define,
                    expr,
                });
            }
            let rhs = self.parse_expr_list()?;
            return Ok(SimpleStmt::Stmt(Spanned::new(
                Stmt::Assign { lhs, op, rhs },
                start.merge(self.previous_span()),
            )));
        }

        let stmt = match next {
            Token::Colon
                if label_ok && lhs.len() == 1 && matches!(lhs[0].node, Expr::Ident(_)) =>
            {
                self.advance();
                let Some(Spanned {
                    node: Expr::Ident(label),
                    ..
                }) = lhs.pop()
                else {
                    return Err(self.error(ParseErrorKind::ExpectedIdentifier, start));
                };
                let inner = self.parse_stmt()?;
                Stmt::Labeled {
                    label,
                    stmt: Box::new(inner),
                }
            }
            Token::Arrow if lhs.len() == 1 => {
                self.advance();
                let value = self.parse_expr()?;
                let chan = lhs.remove(0);
                Stmt::Send { chan, value }
            }
            tok @ (Token::Inc | Token::Dec) if lhs.len() == 1 => {
                self.advance();
                Stmt::IncDec {
                    expr: lhs.remove(0),
                    inc: tok == Token::Inc,
                }
            }
            _ if lhs.len() == 1 => Stmt::Expr(lhs.remove(0)),
            _ => return Err(self.error_unexpected("':=', '=' or ','")),
        };

        Ok(SimpleStmt::Stmt(Spanned::new(
            stmt,
            start.merge(self.previous_span()),
        )))
    }

    // ── If ────────────────────────────────────────────────────

    fn parse_if(&mut self) -> Result<IfStmt, ParseError> {
        self.expect_keyword(Keyword::If)?;
        let (init, cond) = self.with_composites(false, |p| p.parse_if_header())?;
        let then = self.parse_block()?;

        let else_ = if self.match_keyword(Keyword::Else) {
            let start = self.peek_span();
            let stmt = match self.peek() {
                Token::Keyword(Keyword::If) => Stmt::If(self.parse_if()?),
                Token::LBrace => Stmt::Block(self.parse_block()?),
                _ => return Err(self.error_unexpected("'if' or block")),
            };
            Some(Box::new(Spanned::new(stmt, start.merge(self.previous_span()))))
        } else {
            None
        };

        Ok(IfStmt {
            init,
            cond,
            then,
            else_,
        })
    }

    fn parse_if_header(
        &mut self,
    ) -> Result<(Option<Box<Spanned<Stmt>>>, Spanned<Expr>), ParseError> {
        if self.check(&Token::LBrace) {
            return Err(self.error(ParseErrorKind::ExpectedExpression, self.peek_span()));
        }
        let mut init = None;
        if !self.check(&Token::Semicolon) {
            let stmt = self.simple_stmt()?;
            if !self.check(&Token::Semicolon) {
                return Ok((None, self.stmt_into_expr(stmt)?));
            }
            init = Some(Box::new(stmt));
        }
        self.expect(&Token::Semicolon)?;
        let cond = self.parse_expr()?;
        Ok((init, cond))
    }

    // ── Switch ────────────────────────────────────────────────

    fn parse_switch(&mut self) -> Result<Stmt, ParseError> {
        self.expect_keyword(Keyword::Switch)?;
        let (init, tag) = self.with_composites(false, |p| -> Result<_, ParseError> {
            let mut init = None;
            let mut tag = None;
            if !p.check(&Token::LBrace) {
                if !p.check(&Token::Semicolon) {
                    tag = Some(p.simple_stmt()?);
                }
                if p.match_token(&Token::Semicolon) {
                    init = tag.take().map(Box::new);
                    if !p.check(&Token::LBrace) {
                        tag = Some(p.simple_stmt()?);
                    }
                }
            }
            Ok((init, tag))
        })?;
        let tag = self.classify_switch_tag(tag)?;

        self.expect(&Token::LBrace)?;
        let stmt = match tag {
            SwitchTag::Type { binding, expr } => {
                let mut cases = Vec::new();
                while !self.check(&Token::RBrace) && !self.at_end() {
                    cases.push(self.parse_type_case_clause()?);
                }
                Stmt::TypeSwitch(TypeSwitchStmt {
                    init,
                    binding,
                    expr,
                    cases,
                })
            }
            tag => {
                let mut cases = Vec::new();
                while !self.check(&Token::RBrace) && !self.at_end() {
                    cases.push(self.parse_case_clause()?);
                }
                Stmt::Switch(SwitchStmt {
                    init,
                    tag: match tag {
                        SwitchTag::Expr(expr) => Some(expr),
                        _ => None,
                    },
                    cases,
                })
            }
        };
        self.expect(&Token::RBrace)?;
        Ok(stmt)
    }

    fn classify_switch_tag(&self, stmt: Option<Spanned<Stmt>>) -> Result<SwitchTag, ParseError> {
        let Some(stmt) = stmt else {
            return Ok(SwitchTag::None);
        };
        let span = stmt.span;
        match stmt.node {
            Stmt::Expr(expr) => Ok(match expr.node {
                Expr::TypeAssert { expr, type_: None } => SwitchTag::Type {
                    binding: None,
                    expr: *expr,
                },
                node => SwitchTag::Expr(Spanned::new(node, expr.span)),
            }),
            Stmt::Assign {
                mut lhs,
                op: AssignOp::Define,
                mut rhs,
            } if lhs.len() == 1 && rhs.len() == 1 => {
                match (lhs.pop().map(|l| l.node), rhs.pop().map(|r| r.node)) {
                    (Some(Expr::Ident(binding)), Some(Expr::TypeAssert { expr, type_: None })) => {
                        Ok(SwitchTag::Type {
                            binding: Some(binding),
                            expr: *expr,
                        })
                    }
                    _ => Err(self.error(ParseErrorKind::ExpectedExpression, span)),
                }
            }
            _ => Err(self.error(ParseErrorKind::ExpectedExpression, span)),
        }
    }

    fn parse_case_clause(&mut self) -> Result<CaseClause, ParseError> {
        let start = self.peek_span();
        let exprs = if self.match_keyword(Keyword::Case) {
            self.parse_expr_list()?
        } else if self.match_keyword(Keyword::Default) {
            Vec::new()
        } else {
            return Err(self.error_unexpected("'case' or 'default'"));
        };
        self.expect(&Token::Colon)?;
        let body = self.parse_stmt_list();
        Ok(CaseClause {
            exprs,
            body,
            span: start.merge(self.previous_span()),
        })
    }

    fn parse_type_case_clause(&mut self) -> Result<TypeCaseClause, ParseError> {
        let start = self.peek_span();
        let types = if self.match_keyword(Keyword::Case) {
            let mut types = vec![self.parse_type()?];
            while self.match_token(&Token::Comma) {
                types.push(self.parse_type()?);
            }
            types
        } else if self.match_keyword(Keyword::Default) {
            Vec::new()
        } else {
            return Err(self.error_unexpected("'case' or 'default'"));
        };
        self.expect(&Token::Colon)?;
        let body = self.parse_stmt_list();
        Ok(TypeCaseClause {
            types,
            body,
            span: start.merge(self.previous_span()),
        })
    }

    // ── Select ────────────────────────────────────────────────

    fn parse_select(&mut self) -> Result<Stmt, ParseError> {
        self.expect_keyword(Keyword::Select)?;
        self.expect(&Token::LBrace)?;
        let mut clauses = Vec::new();
        while !self.check(&Token::RBrace) && !self.at_end() {
            let start = self.peek_span();
            let comm = if self.match_keyword(Keyword::Case) {
                Some(Box::new(self.simple_stmt()?))
            } else if self.match_keyword(Keyword::Default) {
                None
            } else {
                return Err(self.error_unexpected("'case' or 'default'"));
            };
            self.expect(&Token::Colon)?;
            let body = self.parse_stmt_list();
            clauses.push(CommClause {
                comm,
                body,
                span: start.merge(self.previous_span()),
            });
        }
        self.expect(&Token::RBrace)?;
        Ok(Stmt::Select(clauses))
    }

    // ── For ───────────────────────────────────────────────────

    fn parse_for(&mut self) -> Result<Stmt, ParseError> {
        self.expect_keyword(Keyword::For)?;
        let header = self.with_composites(false, |p| p.parse_for_header())?;
        let body = self.parse_block()?;
        Ok(match header {
            SimpleStmt::Range {
                key,
                value,
                define,
                expr,
            } => Stmt::Range(RangeStmt {
                key,
                value,
                define,
                expr,
                body,
            }),
            SimpleStmt::Stmt(Spanned {
                node: Stmt::For(ForStmt {
                    init, cond, post, ..
                }),
                ..
            }) => Stmt::For(ForStmt {
                init,
                cond,
                post,
                body,
            }),
            SimpleStmt::Stmt(_) => Stmt::For(ForStmt {
                init: None,
                cond: None,
                post: None,
                body,
            }),
        })
    }

    /// The clauses of a `for` header, returned as a range clause or as a
    /// `Stmt::For` with an empty body.
    fn parse_for_header(&mut self) -> Result<SimpleStmt, ParseError> {
        let start = self.peek_span();
        let empty_body = Block {
            stmts: Vec::new(),
            span: start,
        };
        let header = |init, cond, post, body| {
            SimpleStmt::Stmt(Spanned::new(
                Stmt::For(ForStmt {
                    init,
                    cond,
                    post,
                    body,
                }),
                start,
            ))
        };

        if self.check(&Token::LBrace) {
            return Ok(header(None, None, None, empty_body));
        }

        let mut init = None;
        if !self.check(&Token::Semicolon) {
            match self.parse_simple_stmt(false, true)? {
                range @ SimpleStmt::Range { .. } => return Ok(range),
                SimpleStmt::Stmt(stmt) => {
                    if !self.check(&Token::Semicolon) {
                        let cond = self.stmt_into_expr(stmt)?;
                        return Ok(header(None, Some(cond), None, empty_body));
                    }
                    init = Some(Box::new(stmt));
                }
            }
        }

        self.expect(&Token::Semicolon)?;
        let cond = if self.check(&Token::Semicolon) {
            None
        } else {
            Some(self.parse_expr()?)
        };
        self.expect(&Token::Semicolon)?;
        let post = if self.check(&Token::LBrace) {
            None
        } else {
            Some(Box::new(self.simple_stmt()?))
        };
        Ok(header(init, cond, post, empty_body))
    }
}
