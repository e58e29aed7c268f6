//! Printer for the syntax tree, producing `gofmt`-style layout.
//!
//! The printer walks the tree and writes into an [`Emitter`], which handles
//! indentation and column alignment. When the tree came from source, the
//! printer also gets the free comments and a [`LineIndex`] so it can keep
//! comments and blank lines where they were. Without line information every
//! node is laid out from scratch.

mod emitter;
mod expr;
mod stmt;
mod types;

use crate::errors::Error;
use crate::parser::ast::*;
use crate::span::{LineIndex, Span, Spanned};
use emitter::Emitter;
use std::io;
use tracing::debug;

pub struct Printer {
    out: Emitter,
    /// Free comments in source order; `cursor` is the next one to print.
    comments: Vec<Spanned<String>>,
    cursor: usize,
    lines: Option<LineIndex>,
    /// End of the last node or comment printed from source.
    last_end: Option<usize>,
    /// The next item opens a body and never gets a blank line above it.
    fresh: bool,
}

impl Printer {
    pub fn new(comments: Vec<Spanned<String>>) -> Self {
        Self {
            out: Emitter::new(),
            comments,
            cursor: 0,
            lines: None,
            last_end: None,
            fresh: false,
        }
    }

    pub fn with_lines(mut self, lines: LineIndex) -> Self {
        self.lines = Some(lines);
        self
    }

    pub fn print(mut self, file: &File) -> String {
        let start = file.span.start;
        self.emit_comments_before(start);
        self.separate(start, doc_height(&file.doc));
        self.print_doc(&file.doc);
        self.out.write("package ");
        self.out.write(&file.package.name);
        self.track(file.package.span);
        let first = file.decls.first().map_or(usize::MAX, |d| d.span.start);
        self.emit_trailing(file.package.span.end, first);
        self.out.newline();

        for (i, decl) in file.decls.iter().enumerate() {
            let limit = file.decls.get(i + 1).map_or(usize::MAX, |d| d.span.start);
            self.out.blank_line();
            self.emit_comments_before(decl.span.start);
            self.separate(decl.span.start, doc_height(decl.node.doc()));
            self.print_decl(&decl.node, decl.span);
            self.track(decl.span);
            self.emit_trailing(decl.span.end, limit);
            self.out.newline();
        }
        self.emit_comments_before(usize::MAX);

        debug!(
            decls = file.decls.len(),
            lines = self.out.line_count(),
            "printed file"
        );
        self.out.finish()
    }

    // ══════════════════════════════════════════════════════════════
    // Comments and blank lines
    // ══════════════════════════════════════════════════════════════

    /// Print, each on its own line, every pending comment that starts before
    /// `pos`. Only called at the start of a line.
    fn emit_comments_before(&mut self, pos: usize) {
        while let Some(comment) = self.comments.get(self.cursor) {
            if comment.span.start >= pos {
                break;
            }
            let comment = comment.clone();
            self.cursor += 1;
            self.emit_comment(&comment);
        }
    }

    /// Like [`Self::emit_comments_before`] for the tail of a case body: stops
    /// at the first comment written in the same column as `next`, which
    /// belongs above the next clause instead.
    fn emit_body_comments(&mut self, next: usize) {
        let column = self.lines.as_ref().map(|lines| lines.column_of(next));
        while let Some(comment) = self.comments.get(self.cursor) {
            if comment.span.start >= next {
                break;
            }
            let start = comment.span.start;
            if self.lines.as_ref().map(|lines| lines.column_of(start)) == column {
                break;
            }
            let comment = comment.clone();
            self.cursor += 1;
            self.emit_comment(&comment);
        }
    }

    fn emit_comment(&mut self, comment: &Spanned<String>) {
        self.separate(comment.span.start, 0);
        self.out.write(&comment.node);
        self.out.newline();
        self.track(comment.span);
    }

    /// Append the pending comment as a trailing comment if it sits on the
    /// same line as `anchor` and before `limit`.
    fn emit_trailing(&mut self, anchor: usize, limit: usize) {
        let Some(lines) = &self.lines else { return };
        if anchor == 0 {
            return;
        }
        let Some(comment) = self.comments.get(self.cursor) else {
            return;
        };
        let start = comment.span.start;
        if start < anchor || start >= limit || !lines.same_line(anchor, start) {
            return;
        }
        let comment = comment.clone();
        self.cursor += 1;
        self.out.tab();
        self.out.write(&comment.node);
        self.track(comment.span);
    }

    /// Whether a pending comment starts before `pos`.
    fn comment_before(&self, pos: usize) -> bool {
        pos > 0
            && self
                .comments
                .get(self.cursor)
                .is_some_and(|c| c.span.start < pos)
    }

    fn has_comments_within(&self, span: Span) -> bool {
        !span.is_dummy()
            && self.comments[self.cursor..]
                .iter()
                .take_while(|c| c.span.start < span.end)
                .any(|c| c.span.start > span.start)
    }

    /// Keep one blank line above an item that had at least one in the source.
    /// `doc_lines` is the height of the doc comment printed above the item.
    fn separate(&mut self, start: usize, doc_lines: usize) -> bool {
        if std::mem::take(&mut self.fresh) {
            return false;
        }
        let (Some(lines), Some(last)) = (&self.lines, self.last_end) else {
            return false;
        };
        if start == 0 {
            return false;
        }
        let gap = lines.line_of(start).saturating_sub(doc_lines) > lines.line_of(last) + 1;
        if gap {
            self.out.blank_line();
        }
        gap
    }

    fn track(&mut self, span: Span) {
        if !span.is_dummy() {
            self.last_end = Some(span.end);
        }
    }

    // ══════════════════════════════════════════════════════════════
    // Layout helpers
    // ══════════════════════════════════════════════════════════════

    fn print_doc(&mut self, doc: &[String]) {
        for line in doc {
            self.out.write(line);
            self.out.newline();
        }
    }

    /// End a list item. An item that spans several lines breaks alignment
    /// with its neighbours.
    fn end_item(&mut self, before: usize) {
        if self.out.line_count() > before {
            self.out.formfeed();
        } else {
            self.out.newline();
        }
    }

    fn open_body(&mut self) {
        self.out.formfeed();
        self.out.indent();
        self.fresh = true;
    }

    fn close_body(&mut self, close: usize) {
        self.emit_comments_before(close);
        self.out.dedent();
        self.fresh = false;
    }

    /// Print into a scratch buffer and return the text. Comment and
    /// blank-line state is left untouched.
    fn capture(&mut self, f: impl FnOnce(&mut Self)) -> String {
        let scratch = Emitter::nested(self.out.level());
        let out = std::mem::replace(&mut self.out, scratch);
        let saved = (self.cursor, self.last_end, self.fresh);
        f(self);
        let scratch = std::mem::replace(&mut self.out, out);
        (self.cursor, self.last_end, self.fresh) = saved;
        scratch.finish()
    }

    // ══════════════════════════════════════════════════════════════
    // Declarations
    // ══════════════════════════════════════════════════════════════

    pub(crate) fn print_decl(&mut self, decl: &Decl, span: Span) {
        let close = close_pos(span);
        match decl {
            Decl::Import(d) => {
                self.print_doc(&d.doc);
                self.print_group(
                    "import",
                    d.grouped,
                    close,
                    &d.specs,
                    import_spec_span,
                    |p, spec, _| p.print_import_spec(spec),
                );
            }
            Decl::Type(d) => {
                self.print_doc(&d.doc);
                let aligned = d.specs.len() > 1;
                self.print_group(
                    "type",
                    d.grouped,
                    close,
                    &d.specs,
                    |spec| spec.span,
                    |p, spec, _| p.print_type_spec(spec, aligned),
                );
            }
            Decl::Var(d) => self.print_value_decl("var", d, close),
            Decl::Const(d) => self.print_value_decl("const", d, close),
            Decl::Func(f) => self.print_func_decl(f),
        }
    }

    /// `keyword spec` or `keyword ( specs )`.
    fn print_group<T>(
        &mut self,
        keyword: &str,
        grouped: bool,
        close: usize,
        specs: &[T],
        span_of: impl Fn(&T) -> Span,
        mut print_spec: impl FnMut(&mut Self, &T, usize),
    ) {
        self.out.write(keyword);
        if let (false, [spec]) = (grouped, specs) {
            self.out.write(" ");
            print_spec(self, spec, 0);
            return;
        }
        self.out.write(" (");
        if specs.is_empty() && !self.comment_before(close) {
            self.out.write(")");
            return;
        }
        self.open_body();
        for (i, spec) in specs.iter().enumerate() {
            let span = span_of(spec);
            self.emit_comments_before(span.start);
            self.separate(span.start, 0);
            let before = self.out.line_count();
            print_spec(self, spec, i);
            self.track(span);
            self.end_item(before);
        }
        self.close_body(close);
        self.out.write(")");
    }

    fn print_import_spec(&mut self, spec: &ImportSpec) {
        if let Some(name) = &spec.name {
            self.out.write(&name.name);
            self.out.write(" ");
        }
        self.out.write(&spec.path.node);
        self.print_spec_comment(spec.comment.as_deref());
    }

    fn print_type_spec(&mut self, spec: &TypeSpec, aligned: bool) {
        self.out.write(&spec.name.name);
        if aligned {
            self.out.sep();
        } else {
            self.out.write(" ");
        }
        if spec.is_alias {
            self.out.write("= ");
        }
        self.print_type(&spec.type_);
        self.print_spec_comment(spec.comment.as_deref());
    }

    fn print_spec_comment(&mut self, comment: Option<&str>) {
        if let Some(comment) = comment {
            self.out.tab();
            self.out.write(comment);
        }
    }

    fn print_value_decl(&mut self, keyword: &str, decl: &ValueDecl, close: usize) {
        self.print_doc(&decl.doc);
        if decl.specs.len() > 1 {
            let keep = keep_type_column(&decl.specs);
            self.print_group(
                keyword,
                decl.grouped,
                close,
                &decl.specs,
                value_spec_span,
                |p, spec, i| p.print_value_spec_aligned(spec, keep[i]),
            );
        } else {
            self.print_group(
                keyword,
                decl.grouped,
                close,
                &decl.specs,
                value_spec_span,
                |p, spec, _| p.print_value_spec(spec),
            );
        }
    }

    /// `names[ type][ = values]`
    fn print_value_spec(&mut self, spec: &ValueSpec) {
        self.print_names(&spec.names);
        if let Some(ty) = &spec.type_ {
            self.out.write(" ");
            self.print_type(ty);
        }
        if !spec.values.is_empty() {
            self.out.write(" = ");
            self.print_expr_list(&spec.values, 1);
        }
        self.print_spec_comment(spec.comment.as_deref());
    }

    /// One row of a value group: names, type, values and comment each get
    /// their own column.
    fn print_value_spec_aligned(&mut self, spec: &ValueSpec, keep_type: bool) {
        let mut extra = 3;
        self.print_names(&spec.names);
        if spec.type_.is_some() || keep_type {
            self.out.sep();
            extra -= 1;
        }
        if let Some(ty) = &spec.type_ {
            self.print_type(ty);
        }
        if !spec.values.is_empty() {
            self.out.sep();
            extra -= 1;
            self.out.write("= ");
            self.print_expr_list(&spec.values, 1);
        }
        if let Some(comment) = &spec.comment {
            for _ in 0..extra {
                self.out.sep();
            }
            self.out.write(comment);
        }
    }

    fn print_func_decl(&mut self, func: &FuncDecl) {
        self.print_doc(&func.doc);
        let header = self.capture(|p| p.print_func_header(func));
        self.print_func_header(func);
        if let Some(body) = &func.body {
            self.print_func_body(text_width(&header), body);
        }
    }

    /// `func [(recv) ]Name(params) results`
    fn print_func_header(&mut self, func: &FuncDecl) {
        self.out.write("func ");
        if let Some(recv) = &func.recv {
            self.print_params(std::slice::from_ref(recv));
            self.out.write(" ");
        }
        self.out.write(&func.name.name);
        self.print_signature(&func.signature);
    }
}

/// Position of the closing token of a node, or 0 when it has no source.
fn close_pos(span: Span) -> usize {
    if span.is_dummy() { 0 } else { span.end - 1 }
}

fn doc_height(doc: &[String]) -> usize {
    doc.iter().map(|c| 1 + c.matches('\n').count()).sum()
}

/// Printed width of `text`, or `None` if it spans several lines.
fn text_width(text: &str) -> Option<usize> {
    (!text.contains('\n')).then(|| text.chars().count())
}

fn import_spec_span(spec: &ImportSpec) -> Span {
    let start = spec.name.as_ref().map_or(spec.path.span, |name| name.span);
    start.merge(spec.path.span)
}

fn value_spec_span(spec: &ValueSpec) -> Span {
    let Some(first) = spec.names.first() else {
        return Span::dummy();
    };
    let end = spec
        .values
        .last()
        .map(|v| v.span)
        .or_else(|| spec.type_.as_ref().map(|t| t.span))
        .unwrap_or_else(|| spec.names[spec.names.len() - 1].span);
    if first.span.is_dummy() || end.is_dummy() {
        return Span::dummy();
    }
    first.span.merge(end)
}

/// For each spec of a value group, whether it keeps an empty type column.
/// Runs of specs with values keep the column if any spec in the run has a
/// type, so the `=` signs stay aligned.
fn keep_type_column(specs: &[ValueSpec]) -> Vec<bool> {
    let mut keep = vec![false; specs.len()];
    let mut run: Option<usize> = None;
    let mut has_type = false;
    for (i, spec) in specs.iter().enumerate() {
        if spec.values.is_empty() {
            if let Some(start) = run.take() {
                if has_type {
                    keep[start..i].fill(true);
                }
            }
        } else if run.is_none() {
            run = Some(i);
            has_type = false;
        }
        if run.is_some() && spec.type_.is_some() {
            has_type = true;
        }
    }
    if let (Some(start), true) = (run, has_type) {
        keep[start..].fill(true);
    }
    keep
}

// ══════════════════════════════════════════════════════════════
// Entry points
// ══════════════════════════════════════════════════════════════

/// Write `file` with default layout. Nothing from the source is consulted.
pub fn print_file(file: &File, out: &mut impl io::Write) -> io::Result<()> {
    let text = Printer::new(Vec::new()).print(file);
    out.write_all(text.as_bytes())
}

/// Parse Go source and print it back in canonical layout, keeping comments.
pub fn format_source(source: &str) -> Result<String, Error> {
    let (file, comments) = crate::parse_with_comments(source)?;
    Ok(Printer::new(comments)
        .with_lines(LineIndex::new(source))
        .print(&file))
}
