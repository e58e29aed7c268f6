use super::{close_pos, doc_height, text_width, Printer};
use crate::parser::ast::*;
use crate::span::{Span, Spanned};

/// Widest field that still lets a struct print as `struct{ f T }`.
const MAX_INLINE_FIELD: usize = 30;

impl Printer {
    pub(super) fn print_type(&mut self, ty: &Spanned<TypeExpr>) {
        match &ty.node {
            TypeExpr::Name(ident) => self.out.write(&ident.name),
            TypeExpr::Qualified { package, name } => {
                self.out.write(&package.name);
                self.out.write(".");
                self.out.write(&name.name);
            }
            TypeExpr::Pointer(inner) => {
                self.out.write("*");
                self.print_type(inner);
            }
            TypeExpr::Slice(elem) => {
                self.out.write("[]");
                self.print_type(elem);
            }
            TypeExpr::Array { len, elem } => {
                self.out.write("[");
                match len {
                    Some(len) => self.print_expr(len),
                    None => self.out.write("..."),
                }
                self.out.write("]");
                self.print_type(elem);
            }
            TypeExpr::Map { key, value } => {
                self.out.write("map[");
                self.print_type(key);
                self.out.write("]");
                self.print_type(value);
            }
            TypeExpr::Chan { dir, elem } => {
                self.out.write(match dir {
                    ChanDir::Both => "chan ",
                    ChanDir::Send => "chan<- ",
                    ChanDir::Recv => "<-chan ",
                });
                // `chan (<-chan T)` would otherwise read as `chan<- chan T`.
                let wrap = *dir == ChanDir::Both
                    && matches!(elem.node, TypeExpr::Chan { dir: ChanDir::Recv, .. });
                if wrap {
                    self.out.write("(");
                }
                self.print_type(elem);
                if wrap {
                    self.out.write(")");
                }
            }
            TypeExpr::Func(sig) => {
                self.out.write("func");
                self.print_signature(sig);
            }
            TypeExpr::Struct(st) => self.print_struct(st, ty.span),
            TypeExpr::Interface(iface) => self.print_interface(iface, ty.span),
            TypeExpr::Variadic(elem) => {
                self.out.write("...");
                self.print_type(elem);
            }
        }
    }

    pub(super) fn print_names(&mut self, names: &[Ident]) {
        for (i, name) in names.iter().enumerate() {
            if i > 0 {
                self.out.write(", ");
            }
            self.out.write(&name.name);
        }
    }

    /// `(a, b T, c U)`
    pub(super) fn print_params(&mut self, params: &[Field]) {
        self.out.write("(");
        for (i, param) in params.iter().enumerate() {
            if i > 0 {
                self.out.write(", ");
            }
            if !param.names.is_empty() {
                self.print_names(&param.names);
                self.out.write(" ");
            }
            self.print_type(&param.type_);
        }
        self.out.write(")");
    }

    /// Parameters and results; a single unnamed result goes without parens.
    pub(super) fn print_signature(&mut self, sig: &FuncType) {
        self.print_params(&sig.params);
        match sig.results.as_slice() {
            [] => {}
            [result] if result.names.is_empty() => {
                self.out.write(" ");
                self.print_type(&result.type_);
            }
            results => {
                self.out.write(" ");
                self.print_params(results);
            }
        }
    }

    // ── Struct ────────────────────────────────────────────────

    fn print_struct(&mut self, st: &StructType, span: Span) {
        let has_comments = self.has_comments_within(span)
            || st
                .fields
                .iter()
                .any(|f| !f.doc.is_empty() || f.comment.is_some());
        if !has_comments {
            if st.fields.is_empty() {
                self.out.write("struct{}");
                return;
            }
            if self.on_one_line(span) && self.fits_inline(&st.fields) {
                self.out.write("struct{ ");
                let field = &st.fields[0];
                if !field.names.is_empty() {
                    self.print_names(&field.names);
                    self.out.write(" ");
                }
                self.print_type(&field.type_);
                self.out.write(" }");
                return;
            }
        }

        self.out.write("struct {");
        self.open_body();
        let aligned = st.fields.len() > 1;
        for field in &st.fields {
            self.emit_comments_before(field.span.start);
            self.separate(field.span.start, doc_height(&field.doc));
            self.print_doc(&field.doc);
            let before = self.out.line_count();
            self.print_field(field, aligned);
            self.track(field.span);
            self.end_item(before);
        }
        self.close_body(close_pos(span));
        self.out.write("}");
    }

    fn fits_inline(&mut self, fields: &[Field]) -> bool {
        let [field] = fields else { return false };
        if field.tag.is_some() || field.comment.is_some() {
            return false;
        }
        let names = usize::from(!field.names.is_empty());
        let ty = self.capture(|p| p.print_type(&field.type_));
        text_width(&ty).is_some_and(|width| names + width <= MAX_INLINE_FIELD)
    }

    /// Names, type, tag and comment, each in its own column when `aligned`.
    fn print_field(&mut self, field: &Field, aligned: bool) {
        let mut extra = if field.names.is_empty() {
            self.print_type(&field.type_);
            2
        } else {
            self.print_names(&field.names);
            self.separator(aligned);
            self.print_type(&field.type_);
            1
        };
        if let Some(tag) = &field.tag {
            if field.names.is_empty() && aligned {
                self.out.sep();
            }
            self.separator(aligned);
            self.out.write(tag);
            extra = 0;
        }
        if let Some(comment) = &field.comment {
            if aligned {
                for _ in 0..extra {
                    self.out.sep();
                }
            }
            if !aligned || extra == 0 {
                self.out.tab();
            }
            self.out.write(comment);
        }
    }

    fn separator(&mut self, aligned: bool) {
        if aligned {
            self.out.sep();
        } else {
            self.out.write(" ");
        }
    }

    fn on_one_line(&self, span: Span) -> bool {
        !span.is_dummy()
            && self
                .lines
                .as_ref()
                .is_some_and(|lines| lines.same_line(span.start, close_pos(span)))
    }

    // ── Interface ─────────────────────────────────────────────

    fn print_interface(&mut self, iface: &InterfaceType, span: Span) {
        if iface.elems.is_empty() && !self.has_comments_within(span) {
            self.out.write("interface{}");
            return;
        }
        self.out.write("interface {");
        self.open_body();
        for elem in &iface.elems {
            let start = elem_span(elem);
            self.emit_comments_before(start.start);
            self.separate(start.start, 0);
            let before = self.out.line_count();
            let comment = match elem {
                InterfaceElem::Method {
                    name,
                    signature,
                    comment,
                } => {
                    self.out.write(&name.name);
                    self.print_signature(signature);
                    comment
                }
                InterfaceElem::Embedded { type_, comment } => {
                    self.print_type(type_);
                    comment
                }
            };
            if let Some(comment) = comment {
                self.out.tab();
                self.out.write(comment);
            }
            self.track(start);
            self.end_item(before);
        }
        self.close_body(close_pos(span));
        self.out.write("}");
    }
}

fn elem_span(elem: &InterfaceElem) -> Span {
    match elem {
        InterfaceElem::Method { name, .. } => name.span,
        InterfaceElem::Embedded { type_, .. } => type_.span,
    }
}

#[cfg(test)]
mod tests {
    use crate::formatter::format_source;

    fn fmt(src: &str) -> String {
        format_source(src).unwrap()
    }

    #[test]
    fn small_structs_stay_inline() {
        let out = fmt("package p\n\nvar v struct{ x int }\n\ntype E struct {\n}\n");
        assert_eq!(out, "package p\n\nvar v struct{ x int }\n\ntype E struct{}\n");
    }

    #[test]
    fn channel_directions() {
        let src = "package p\n\nvar (\n\ta chan int\n\tb <-chan int\n\tc chan<- int\n\td chan (<-chan int)\n)\n";
        assert_eq!(
            fmt(src),
            "package p\n\nvar (\n\ta chan int\n\tb <-chan int\n\tc chan<- int\n\td chan (<-chan int)\n)\n"
        );
    }

    #[test]
    fn signatures() {
        let src = "package p\n\nvar f func(a, b int, s ...string) (n int, err error)\n\nvar g func() error\n";
        assert_eq!(fmt(src), src);
    }

    #[test]
    fn embedded_field_with_tag_and_comment() {
        let src = "package p

type S struct {
	Base `json:\"base\"`
	Name string // who
}
";
        assert_eq!(
            fmt(src),
            "package p

type S struct {
	Base        `json:\"base\"`
	Name string // who
}
"
        );
    }

    #[test]
    fn field_docs_and_blank_lines_split_alignment() {
        let src = "package p

type S struct {
	A int
	// B is documented.
	Longer string

	C   bool
	Dee bool
}
";
        assert_eq!(fmt(src), src);
    }
}
