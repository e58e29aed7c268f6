use super::expr::strip_parens;
use super::{close_pos, Printer};
use crate::parser::ast::*;
use crate::span::{Span, Spanned};

/// Widest function, header included, that keeps a one-line body.
const MAX_ONE_LINE: usize = 100;
const MAX_ONE_LINE_STMTS: usize = 5;

/// A case of a `switch`, type switch or `select`.
enum Clause<'a> {
    Case(&'a CaseClause),
    Type(&'a TypeCaseClause),
    Comm(&'a CommClause),
}

impl Clause<'_> {
    fn span(&self) -> Span {
        match self {
            Clause::Case(c) => c.span,
            Clause::Type(c) => c.span,
            Clause::Comm(c) => c.span,
        }
    }

    fn body(&self) -> &[Spanned<Stmt>] {
        match self {
            Clause::Case(c) => &c.body,
            Clause::Type(c) => &c.body,
            Clause::Comm(c) => &c.body,
        }
    }

    /// End of the `case ...` part, before the colon; the clause start for
    /// `default`.
    fn header_end(&self) -> usize {
        let last = match self {
            Clause::Case(c) => c.exprs.last().map(|e| e.span),
            Clause::Type(c) => c.types.last().map(|t| t.span),
            Clause::Comm(c) => c.comm.as_ref().map(|s| s.span),
        };
        last.map_or(self.span().start, |span| span.end)
    }
}

impl Printer {
    pub(super) fn print_block(&mut self, block: &Block) {
        let close = close_pos(block.span);
        self.out.write("{");
        if !block.span.is_dummy() {
            let first = first_stmt(&block.stmts).map_or(close, |s| s.span.start);
            self.emit_trailing(block.span.start + 1, first);
        }
        self.open_body();
        self.print_stmt_list(&block.stmts, close);
        self.close_body(close);
        self.out.write("}");
        self.track(block.span);
    }

    /// Function body after its header, collapsed onto the header line when
    /// the source had it on one line and it still fits.
    pub(super) fn print_func_body(&mut self, header: Option<usize>, body: &Block) {
        let fits = header
            .zip(self.one_line_size(body))
            .is_some_and(|(head, rest)| head + rest <= MAX_ONE_LINE);
        if !fits {
            self.out.write(" ");
            self.print_block(body);
            return;
        }

        self.out.write(" {");
        let stmts: Vec<_> = significant(&body.stmts).collect();
        if !stmts.is_empty() {
            self.out.write(" ");
            for (i, stmt) in stmts.iter().enumerate() {
                if i > 0 {
                    self.out.write("; ");
                }
                self.print_stmt(stmt);
            }
            self.out.write(" ");
        }
        self.out.write("}");
        self.track(body.span);
    }

    fn one_line_size(&mut self, body: &Block) -> Option<usize> {
        if body.span.is_dummy() {
            return None;
        }
        let same_line = self
            .lines
            .as_ref()?
            .same_line(body.span.start, close_pos(body.span));
        let stmts: Vec<_> = significant(&body.stmts).collect();
        if !same_line || stmts.len() > MAX_ONE_LINE_STMTS || self.has_comments_within(body.span) {
            return None;
        }
        let mut size = 0;
        for (i, stmt) in stmts.iter().enumerate() {
            if i > 0 {
                size += 2;
            }
            let text = self.capture(|p| p.print_stmt(stmt));
            size += super::text_width(&text)?;
            if size > MAX_ONE_LINE {
                return None;
            }
        }
        Some(size)
    }

    /// Statements one per line, with their free comments. `close` bounds the
    /// trailing comment of the last one.
    pub(super) fn print_stmt_list(&mut self, stmts: &[Spanned<Stmt>], close: usize) {
        let stmts: Vec<_> = significant(stmts).collect();
        for (i, stmt) in stmts.iter().enumerate() {
            let limit = stmts.get(i + 1).map_or(close, |next| next.span.start);
            self.emit_comments_before(stmt.span.start);
            self.separate(stmt.span.start, 0);
            let before = self.out.line_count();
            self.print_stmt(stmt);
            self.track(stmt.span);
            self.emit_trailing(stmt.span.end, limit);
            self.end_item(before);
        }
    }

    pub(super) fn print_stmt(&mut self, stmt: &Spanned<Stmt>) {
        match &stmt.node {
            Stmt::Decl(decl) => self.print_decl(decl, stmt.span),
            Stmt::Expr(expr) => self.print_expr(expr),
            Stmt::Send { chan, value } => {
                self.print_expr(chan);
                self.out.write(" <- ");
                self.print_expr(value);
            }
            Stmt::IncDec { expr, inc } => {
                self.expr_at(expr, 2);
                self.out.write(if *inc { "++" } else { "--" });
            }
            Stmt::Assign { lhs, op, rhs } => {
                let depth = if lhs.len() > 1 && rhs.len() > 1 { 2 } else { 1 };
                self.print_expr_list(lhs, depth);
                self.out.write(" ");
                self.out.write(op.as_str());
                self.out.write(" ");
                self.print_expr_list(rhs, depth);
            }
            Stmt::Go(call) => {
                self.out.write("go ");
                self.print_expr(call);
            }
            Stmt::Defer(call) => {
                self.out.write("defer ");
                self.print_expr(call);
            }
            Stmt::Return(results) => {
                self.out.write("return");
                if !results.is_empty() {
                    self.out.write(" ");
                    self.print_expr_list(results, 1);
                }
            }
            Stmt::Branch { kind, label } => {
                self.out.write(kind.as_str());
                if let Some(label) = label {
                    self.out.write(" ");
                    self.out.write(&label.name);
                }
            }
            Stmt::Block(block) => self.print_block(block),
            Stmt::If(s) => self.print_if(s),
            Stmt::Switch(s) => {
                self.out.write("switch");
                self.print_control_clause(s.init.as_deref(), s.tag.as_ref(), None, false);
                let clauses: Vec<_> = s.cases.iter().map(Clause::Case).collect();
                self.print_clauses(&clauses, close_pos(stmt.span));
            }
            Stmt::TypeSwitch(s) => {
                self.out.write("switch ");
                if let Some(init) = &s.init {
                    self.print_stmt(init);
                    self.out.write("; ");
                }
                if let Some(binding) = &s.binding {
                    self.out.write(&binding.name);
                    self.out.write(" := ");
                }
                self.expr_at(&s.expr, 1);
                self.out.write(".(type) ");
                let clauses: Vec<_> = s.cases.iter().map(Clause::Type).collect();
                self.print_clauses(&clauses, close_pos(stmt.span));
            }
            Stmt::Select(cases) => {
                self.out.write("select ");
                let clauses: Vec<_> = cases.iter().map(Clause::Comm).collect();
                self.print_clauses(&clauses, close_pos(stmt.span));
            }
            Stmt::For(s) => {
                self.out.write("for");
                self.print_control_clause(
                    s.init.as_deref(),
                    s.cond.as_ref(),
                    s.post.as_deref(),
                    true,
                );
                self.print_block(&s.body);
            }
            Stmt::Range(s) => {
                self.out.write("for ");
                if let Some(key) = &s.key {
                    self.print_expr(key);
                    if let Some(value) = &s.value {
                        self.out.write(", ");
                        self.print_expr(value);
                    }
                    self.out.write(if s.define { " := " } else { " = " });
                }
                self.out.write("range ");
                self.print_expr(strip_parens(&s.expr));
                self.out.write(" ");
                self.print_block(&s.body);
            }
            Stmt::Labeled { label, stmt: inner } => {
                self.out.dedent();
                self.out.write(&label.name);
                self.out.write(":");
                self.out.indent();
                if !matches!(inner.node, Stmt::Empty) {
                    self.out.formfeed();
                    self.print_stmt(inner);
                }
            }
            Stmt::Empty => {}
        }
    }

    fn print_if(&mut self, s: &IfStmt) {
        self.out.write("if");
        self.print_control_clause(s.init.as_deref(), Some(&s.cond), None, false);
        self.print_block(&s.then);
        if let Some(else_) = &s.else_ {
            self.out.write(" else ");
            match &else_.node {
                Stmt::If(inner) => self.print_if(inner),
                Stmt::Block(block) => self.print_block(block),
                _ => self.print_stmt(else_),
            }
        }
    }

    /// The header between a keyword and its `{`, from the leading blank to
    /// the trailing one.
    fn print_control_clause(
        &mut self,
        init: Option<&Spanned<Stmt>>,
        cond: Option<&Spanned<Expr>>,
        post: Option<&Spanned<Stmt>>,
        is_for: bool,
    ) {
        self.out.write(" ");
        let mut needs_blank = false;
        if init.is_none() && post.is_none() {
            if let Some(cond) = cond {
                self.print_expr(strip_parens(cond));
                needs_blank = true;
            }
        } else {
            if let Some(init) = init {
                self.print_stmt(init);
            }
            self.out.write("; ");
            if let Some(cond) = cond {
                self.print_expr(strip_parens(cond));
                needs_blank = true;
            }
            if is_for {
                self.out.write("; ");
                needs_blank = false;
                if let Some(post) = post {
                    self.print_stmt(post);
                    needs_blank = true;
                }
            }
        }
        if needs_blank {
            self.out.write(" ");
        }
    }

    // ── Clauses ───────────────────────────────────────────────

    fn print_clauses(&mut self, clauses: &[Clause<'_>], close: usize) {
        self.out.write("{");
        self.out.formfeed();
        self.fresh = true;
        for (i, clause) in clauses.iter().enumerate() {
            let span = clause.span();
            let next = clauses.get(i + 1).map_or(close, |c| c.span().start);
            self.emit_comments_before(span.start);
            self.separate(span.start, 0);
            self.print_clause_header(clause);
            self.track(Span::new(span.start, clause.header_end()));
            let first = first_stmt(clause.body()).map_or(next, |s| s.span.start);
            self.emit_trailing(clause.header_end(), first);

            self.open_body();
            self.print_stmt_list(clause.body(), next);
            if i + 1 < clauses.len() {
                self.emit_body_comments(next);
            } else {
                self.emit_comments_before(close);
            }
            self.out.dedent();
            self.fresh = false;
        }
        self.emit_comments_before(close);
        self.out.write("}");
    }

    fn print_clause_header(&mut self, clause: &Clause<'_>) {
        match clause {
            Clause::Case(c) if !c.exprs.is_empty() => {
                self.out.write("case ");
                self.print_expr_list(&c.exprs, 1);
            }
            Clause::Type(c) if !c.types.is_empty() => {
                self.out.write("case ");
                for (i, ty) in c.types.iter().enumerate() {
                    if i > 0 {
                        self.out.write(", ");
                    }
                    self.print_type(ty);
                }
            }
            Clause::Comm(CommClause { comm: Some(comm), .. }) => {
                self.out.write("case ");
                self.print_stmt(comm);
            }
            _ => self.out.write("default"),
        }
        self.out.write(":");
    }
}

fn significant(stmts: &[Spanned<Stmt>]) -> impl Iterator<Item = &Spanned<Stmt>> {
    stmts.iter().filter(|s| !matches!(s.node, Stmt::Empty))
}

fn first_stmt(stmts: &[Spanned<Stmt>]) -> Option<&Spanned<Stmt>> {
    significant(stmts).next()
}

#[cfg(test)]
mod tests {
    use crate::formatter::format_source;

    fn body(stmts: &str) -> String {
        let src = format!("package p\n\nfunc f() {{\n{stmts}\n}}\n");
        let out = format_source(&src).unwrap();
        out.strip_prefix("package p\n\nfunc f() {\n")
            .and_then(|rest| rest.strip_suffix("}\n"))
            .unwrap()
            .to_string()
    }

    #[test]
    fn simple_statements() {
        assert_eq!(
            body("x++\ny--\nch <- v\na, b = b, a\ngo g()\ndefer h(1, 2)\nreturn"),
            "\tx++\n\ty--\n\tch <- v\n\ta, b = b, a\n\tgo g()\n\tdefer h(1, 2)\n\treturn\n"
        );
    }

    #[test]
    fn for_headers() {
        assert_eq!(body("for {\n}"), "\tfor {\n\t}\n");
        assert_eq!(body("for x < 3 {\n}"), "\tfor x < 3 {\n\t}\n");
        assert_eq!(body("for i := 0; ; i++ {\n}"), "\tfor i := 0; ; i++ {\n\t}\n");
        assert_eq!(body("for range ch {\n}"), "\tfor range ch {\n\t}\n");
    }

    #[test]
    fn trailing_comments_in_a_block_align() {
        assert_eq!(
            body("a := 1 // one\nbbb := 22 // two"),
            "\ta := 1    // one\n\tbbb := 22 // two\n"
        );
    }

    #[test]
    fn local_declarations() {
        assert_eq!(
            body("var x int\nconst (\nA = 1\nB = 2\n)"),
            "\tvar x int\n\tconst (\n\t\tA = 1\n\t\tB = 2\n\t)\n"
        );
    }

    #[test]
    fn comment_after_last_case_stays_in_body() {
        let src = "package p

func f(x int) {
	switch x {
	case 1:
		g()
		// still case 1
	}
}
";
        assert_eq!(format_source(src).unwrap(), src);
    }
}
