//! Expression layout. Spacing around binary operators follows operator
//! precedence and nesting depth, so `a + b*c` but `f(a+b, c)`.

use super::{text_width, Printer};
use crate::parser::ast::*;
use crate::span::Spanned;

/// Element lists switch alignment sections when the key size changes by more
/// than this ratio between neighbours.
const SIZE_RATIO: f64 = 2.5;
/// Keys up to this size always align with each other.
const SMALL_SIZE: usize = 40;

impl Printer {
    pub(super) fn print_expr(&mut self, expr: &Spanned<Expr>) {
        self.expr_at(expr, 1);
    }

    pub(super) fn print_expr_list(&mut self, exprs: &[Spanned<Expr>], depth: usize) {
        for (i, expr) in exprs.iter().enumerate() {
            if i > 0 {
                self.out.write(", ");
            }
            self.expr_at(expr, depth);
        }
    }

    pub(super) fn expr_at(&mut self, expr: &Spanned<Expr>, depth: usize) {
        match &expr.node {
            Expr::Ident(ident) => self.out.write(&ident.name),
            Expr::BasicLit { value, .. } => self.out.write(value),
            Expr::Composite { type_, elts, multiline } => {
                self.print_composite(expr, type_.as_deref(), elts, *multiline, depth)
            }
            Expr::KeyValue { key, value } => {
                self.expr_at(key, depth);
                self.out.write(": ");
                self.expr_at(value, depth);
            }
            Expr::FuncLit { signature, body } => {
                let header = self.capture(|p| {
                    p.out.write("func");
                    p.print_signature(signature);
                });
                self.out.write("func");
                self.print_signature(signature);
                self.print_func_body(text_width(&header), body);
            }
            Expr::Paren(inner) => {
                if let Expr::Paren(_) = inner.node {
                    // (( x )) => ( x )
                    self.expr_at(inner, depth);
                } else {
                    self.out.write("(");
                    self.expr_at(inner, reduce_depth(depth));
                    self.out.write(")");
                }
            }
            Expr::Selector { expr: base, sel } => {
                self.expr_at(base, depth);
                self.out.write(".");
                self.out.write(&sel.name);
            }
            Expr::Index { expr: base, indices } => {
                self.expr_at(base, 1);
                self.out.write("[");
                self.print_expr_list(indices, depth + 1);
                self.out.write("]");
            }
            Expr::Slice {
                expr: base,
                low,
                high,
                max,
            } => {
                self.expr_at(base, 1);
                let mut indices = vec![low.as_deref(), high.as_deref()];
                if max.is_some() {
                    indices.push(max.as_deref());
                }
                self.print_slice_indices(&indices, depth);
            }
            Expr::TypeAssert { expr: base, type_ } => {
                self.expr_at(base, 1);
                self.out.write(".(");
                match type_ {
                    Some(ty) => self.print_type(ty),
                    None => self.out.write("type"),
                }
                self.out.write(")");
            }
            Expr::Call {
                fun,
                args,
                ellipsis,
            } => {
                let depth = if args.len() > 1 { depth + 1 } else { depth };
                let wrap = is_func_type(&fun.node);
                if wrap {
                    self.out.write("(");
                }
                self.expr_at(fun, depth);
                if wrap {
                    self.out.write(")");
                }
                self.out.write("(");
                self.print_expr_list(args, depth);
                if *ellipsis {
                    self.out.write("...");
                }
                self.out.write(")");
            }
            Expr::Star(inner) => {
                self.out.write("*");
                self.expr_at(inner, 1);
            }
            Expr::Unary { op, expr: inner } => {
                self.out.write(op.as_str());
                if combines(op.as_str(), first_char(&inner.node)) {
                    self.out.write(" ");
                }
                self.expr_at(inner, depth);
            }
            Expr::Binary { op, lhs, rhs } => self.print_binary(*op, lhs, rhs, depth),
            Expr::Type(ty) => self.print_type(ty),
        }
    }

    fn print_binary(&mut self, op: BinaryOp, lhs: &Spanned<Expr>, rhs: &Spanned<Expr>, depth: usize) {
        let prec = op.precedence();
        let blank = prec < cutoff(op, &lhs.node, &rhs.node, depth);
        self.expr_at(lhs, depth + diff_prec(&lhs.node, prec));
        if blank {
            self.out.write(" ");
        }
        self.out.write(op.as_str());
        if blank || combines(op.as_str(), first_char(&rhs.node)) {
            self.out.write(" ");
        }
        self.expr_at(rhs, depth + 1);
    }

    /// `[lo:hi]` or `[lo:hi:max]`, with blanks around the colons when an
    /// index is itself a binary expression.
    fn print_slice_indices(&mut self, indices: &[Option<&Spanned<Expr>>], depth: usize) {
        let present = indices.iter().flatten().count();
        let blanks = depth <= 1
            && present > 1
            && indices
                .iter()
                .flatten()
                .any(|index| matches!(index.node, Expr::Binary { .. }));
        self.out.write("[");
        for (i, index) in indices.iter().enumerate() {
            if i > 0 {
                if blanks && indices[i - 1].is_some() {
                    self.out.write(" ");
                }
                self.out.write(":");
                if blanks && index.is_some() {
                    self.out.write(" ");
                }
            }
            if let Some(index) = index {
                self.expr_at(index, depth + 1);
            }
        }
        self.out.write("]");
    }

    // ── Composite literals ────────────────────────────────────

    fn print_composite(
        &mut self,
        lit: &Spanned<Expr>,
        type_: Option<&Spanned<Expr>>,
        elts: &[Spanned<Expr>],
        multiline: bool,
        depth: usize,
    ) {
        if let Some(ty) = type_ {
            self.expr_at(ty, depth);
        }
        if !multiline || (elts.is_empty() && !self.has_comments_within(lit.span)) {
            self.out.write("{");
            self.print_expr_list(elts, 1);
            self.out.write("}");
            return;
        }

        self.out.write("{");
        self.open_body();
        self.print_elements(elts, super::close_pos(lit.span));
        if !elts.is_empty() {
            self.out.newline();
        }
        self.close_body(super::close_pos(lit.span));
        self.out.write("}");
    }

    /// One element per source line, with `key: value` pairs aligned on their
    /// values. A run of keys breaks into a new alignment section where the
    /// key size jumps.
    fn print_elements(&mut self, elts: &[Spanned<Expr>], close: usize) {
        let mut prev_line: Option<usize> = None;
        let mut prev_break = 0;
        let mut size = 0;
        let mut ln_sum = 0.0;
        let mut count = 0usize;

        for (i, elt) in elts.iter().enumerate() {
            let line = self.line_of(elt.span.start);
            let breaks = i > 0 && (line.is_none() || line != prev_line);

            let prev_size = size;
            size = self.element_size(elt);
            let mut use_ff = true;
            if prev_size > 0 && size > 0 {
                use_ff = if count == 0 || (prev_size <= SMALL_SIZE && size <= SMALL_SIZE) {
                    false
                } else {
                    let geomean = (ln_sum / count as f64).exp();
                    let ratio = size as f64 / geomean;
                    SIZE_RATIO * ratio <= 1.0 || SIZE_RATIO <= ratio
                };
            }

            if breaks {
                if use_ff || prev_break + 1 < i {
                    self.out.formfeed();
                } else {
                    self.out.newline();
                }
                prev_break = i;
            } else if i > 0 {
                self.out.write(" ");
            }
            let starts_line = i == 0 || breaks;
            if starts_line {
                self.emit_comments_before(elt.span.start);
                if self.separate(elt.span.start, 0) {
                    ln_sum = 0.0;
                    count = 0;
                }
            }
            if size > 0 {
                ln_sum += (size as f64).ln();
                count += 1;
            }

            match &elt.node {
                Expr::KeyValue { key, value } if elts.len() > 1 && size > 0 && starts_line => {
                    self.print_expr(key);
                    self.out.write(":");
                    self.out.sep();
                    self.print_expr(value);
                }
                _ => self.print_expr(elt),
            }
            self.out.write(",");
            self.track(elt.span);

            prev_line = self.line_of(elt.span.end);
            let next = elts.get(i + 1);
            let next_on_line =
                next.is_some_and(|e| prev_line.is_some() && self.line_of(e.span.start) == prev_line);
            if !next_on_line {
                self.emit_trailing(elt.span.end, next.map_or(close, |e| e.span.start));
            }
        }
    }

    /// Width of the part of `elt` that aligns: the key of a pair, otherwise
    /// the whole element. Zero when it spans lines or has no source.
    fn element_size(&mut self, elt: &Spanned<Expr>) -> usize {
        if self.lines.is_none() || elt.span.is_dummy() {
            return 0;
        }
        let part = match &elt.node {
            Expr::KeyValue { key, .. } => key.as_ref(),
            _ => elt,
        };
        let text = self.capture(|p| p.print_expr(part));
        text_width(&text).unwrap_or(0)
    }

    fn line_of(&self, pos: usize) -> Option<usize> {
        if pos == 0 {
            return None;
        }
        self.lines.as_ref().map(|lines| lines.line_of(pos))
    }
}

// ══════════════════════════════════════════════════════════════
// Operator spacing
// ══════════════════════════════════════════════════════════════

fn reduce_depth(depth: usize) -> usize {
    depth.saturating_sub(1).max(1)
}

/// 0 when `expr` is a binary expression of precedence `prec`, else 1.
fn diff_prec(expr: &Expr, prec: u8) -> usize {
    match expr {
        Expr::Binary { op, .. } if op.precedence() == prec => 0,
        _ => 1,
    }
}

#[derive(Default)]
struct Precedences {
    has4: bool,
    has5: bool,
    max_problem: u8,
}

/// Survey the operators of a binary expression tree that print at one level.
fn walk_binary(op: BinaryOp, lhs: &Expr, rhs: &Expr, acc: &mut Precedences) {
    let prec = op.precedence();
    match prec {
        4 => acc.has4 = true,
        5 => acc.has5 = true,
        _ => {}
    }

    if let Expr::Binary { op: l_op, lhs: ll, rhs: lr } = lhs {
        if l_op.precedence() >= prec {
            walk_binary(*l_op, &ll.node, &lr.node, acc);
        }
    }

    match rhs {
        Expr::Binary { op: r_op, lhs: rl, rhs: rr } => {
            if r_op.precedence() > prec {
                walk_binary(*r_op, &rl.node, &rr.node, acc);
            }
        }
        // `a / *b` would start a comment without the blank.
        Expr::Star(_) if op == BinaryOp::Div => acc.max_problem = 5,
        Expr::Unary { op: u_op, .. } => {
            let problem = match (op, u_op) {
                (BinaryOp::And, UnaryOp::Addr | UnaryOp::BitNot) => 5,
                (BinaryOp::Add, UnaryOp::Plus) | (BinaryOp::Sub, UnaryOp::Neg) => 4,
                _ => 0,
            };
            acc.max_problem = acc.max_problem.max(problem);
        }
        _ => {}
    }
}

/// Binary operators of lower precedence than the cutoff get blanks around
/// them.
fn cutoff(op: BinaryOp, lhs: &Expr, rhs: &Expr, depth: usize) -> u8 {
    let mut acc = Precedences::default();
    walk_binary(op, lhs, rhs, &mut acc);
    if acc.max_problem > 0 {
        return acc.max_problem + 1;
    }
    match (acc.has4 && acc.has5, depth) {
        (true, 1) => 5,
        (true, _) => 4,
        (false, 1) => 6,
        (false, _) => 4,
    }
}

fn is_func_type(expr: &Expr) -> bool {
    matches!(expr, Expr::Type(ty) if matches!(ty.node, TypeExpr::Func(_)))
}

/// Whether `token` followed directly by `next` would lex differently.
fn combines(token: &str, next: Option<char>) -> bool {
    matches!(
        (token, next),
        ("+", Some('+'))
            | ("-", Some('-'))
            | ("/", Some('*'))
            | ("<", Some('-' | '<'))
            | ("&", Some('&' | '^'))
    )
}

/// First character `expr` prints as.
fn first_char(expr: &Expr) -> Option<char> {
    match expr {
        Expr::Ident(ident) => ident.name.chars().next(),
        Expr::BasicLit { value, .. } => value.chars().next(),
        Expr::Composite { type_: Some(ty), .. } => first_char(&ty.node),
        Expr::Composite { type_: None, .. } => Some('{'),
        Expr::KeyValue { key, .. } => first_char(&key.node),
        Expr::FuncLit { .. } => Some('f'),
        Expr::Paren(_) => Some('('),
        Expr::Selector { expr, .. }
        | Expr::Index { expr, .. }
        | Expr::Slice { expr, .. }
        | Expr::TypeAssert { expr, .. } => first_char(&expr.node),
        Expr::Call { fun, .. } if is_func_type(&fun.node) => Some('('),
        Expr::Call { fun, .. } => first_char(&fun.node),
        Expr::Star(_) => Some('*'),
        Expr::Unary { op, .. } => op.as_str().chars().next(),
        Expr::Binary { lhs, .. } => first_char(&lhs.node),
        Expr::Type(ty) => match &ty.node {
            TypeExpr::Name(ident) => ident.name.chars().next(),
            TypeExpr::Qualified { package, .. } => package.name.chars().next(),
            TypeExpr::Pointer(_) => Some('*'),
            TypeExpr::Slice(_) | TypeExpr::Array { .. } => Some('['),
            TypeExpr::Map { .. } => Some('m'),
            TypeExpr::Chan {
                dir: ChanDir::Recv, ..
            } => Some('<'),
            TypeExpr::Chan { .. } => Some('c'),
            TypeExpr::Func(_) => Some('f'),
            TypeExpr::Struct(_) => Some('s'),
            TypeExpr::Interface(_) => Some('i'),
            TypeExpr::Variadic(_) => Some('.'),
        },
    }
}

// ══════════════════════════════════════════════════════════════
// Parentheses
// ══════════════════════════════════════════════════════════════

/// `expr` without redundant outer parentheses. Parentheses stay when they
/// keep a composite literal from being read as a block.
pub(super) fn strip_parens(expr: &Spanned<Expr>) -> &Spanned<Expr> {
    match &expr.node {
        Expr::Paren(inner) if !has_bare_composite(&inner.node) => strip_parens(inner),
        _ => expr,
    }
}

fn has_bare_composite(expr: &Expr) -> bool {
    match expr {
        Expr::Composite { type_, .. } => type_.as_ref().is_some_and(|ty| is_type_name(&ty.node)),
        Expr::Ident(_)
        | Expr::BasicLit { .. }
        | Expr::Paren(_)
        | Expr::FuncLit { .. }
        | Expr::Type(_) => false,
        Expr::KeyValue { key, value } => {
            has_bare_composite(&key.node) || has_bare_composite(&value.node)
        }
        Expr::Selector { expr, .. }
        | Expr::TypeAssert { expr, .. }
        | Expr::Star(expr)
        | Expr::Unary { expr, .. } => has_bare_composite(&expr.node),
        Expr::Index { expr, indices } => {
            has_bare_composite(&expr.node) || indices.iter().any(|i| has_bare_composite(&i.node))
        }
        Expr::Slice {
            expr,
            low,
            high,
            max,
        } => {
            has_bare_composite(&expr.node)
                || [low, high, max]
                    .into_iter()
                    .flatten()
                    .any(|i| has_bare_composite(&i.node))
        }
        Expr::Call { fun, args, .. } => {
            has_bare_composite(&fun.node) || args.iter().any(|a| has_bare_composite(&a.node))
        }
        Expr::Binary { lhs, rhs, .. } => {
            has_bare_composite(&lhs.node) || has_bare_composite(&rhs.node)
        }
    }
}

/// `T` or `pkg.T`
fn is_type_name(expr: &Expr) -> bool {
    match expr {
        Expr::Ident(_) => true,
        Expr::Selector { expr, .. } => is_type_name(&expr.node),
        Expr::Type(ty) => matches!(ty.node, TypeExpr::Name(_) | TypeExpr::Qualified { .. }),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use crate::formatter::format_source;

    /// Format `expr` as the right-hand side of an assignment.
    fn expr(src: &str) -> String {
        let out = format_source(&format!("package p\n\nfunc f() {{\n\tx = {src}\n}}\n")).unwrap();
        let line = out.lines().nth(3).unwrap();
        line.trim_start_matches("\tx = ").to_string()
    }

    #[test]
    fn binary_spacing_follows_precedence() {
        assert_eq!(expr("a + b * c"), "a + b*c");
        assert_eq!(expr("a*b + c*d"), "a*b + c*d");
        assert_eq!(expr("a || b && c"), "a || b && c");
        assert_eq!(expr("x == y+1"), "x == y+1");
        assert_eq!(expr("f(a + b, c)"), "f(a+b, c)");
        assert_eq!(expr("(a + b) * c"), "(a + b) * c");
    }

    #[test]
    fn unary_operators_do_not_merge() {
        assert_eq!(expr("a - -b"), "a - -b");
        assert_eq!(expr("-x"), "-x");
        assert_eq!(expr("&T{}"), "&T{}");
        assert_eq!(expr("<-ch"), "<-ch");
    }

    #[test]
    fn slices_and_calls() {
        assert_eq!(expr("s[1:len(s) - 1]"), "s[1 : len(s)-1]");
        assert_eq!(expr("s[:n]"), "s[:n]");
        assert_eq!(expr("append(a, b...)"), "append(a, b...)");
        assert_eq!(expr("v.(fmt.Stringer)"), "v.(fmt.Stringer)");
        assert_eq!(expr("((y))"), "(y)");
    }

    #[test]
    fn composite_literals() {
        assert_eq!(expr("[]int{1,2,3}"), "[]int{1, 2, 3}");
        assert_eq!(expr("map[string]int{\"a\": 1}"), "map[string]int{\"a\": 1}");
        assert_eq!(expr("Pointᐸintᐳ{X: 1}"), "Pointᐸintᐳ{X: 1}");
    }

    #[test]
    fn multi_line_composite_alignment_splits_at_blank_lines() {
        let src = "package p

var v = T{
	A: 1,
	Bb: 2,

	Ccc: 3,
}
";
        assert_eq!(
            format_source(src).unwrap(),
            "package p

var v = T{
	A:  1,
	Bb: 2,

	Ccc: 3,
}
"
        );
    }

    #[test]
    fn keeps_parens_around_composites_in_conditions() {
        let src = "package p\n\nfunc f() {\n\tif (T{} == x) {\n\t}\n}\n";
        let out = format_source(src).unwrap();
        assert!(out.contains("\tif (T{} == x) {\n"), "{out}");
    }
}
