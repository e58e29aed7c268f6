use crate::parser::ast::*;

/// A borrowed view of any tree node the generator can visit.
#[derive(Debug, Clone, Copy)]
pub enum Node<'a> {
    File(&'a File),
    Decl(&'a Decl),
    TypeSpec(&'a TypeSpec),
    ValueSpec(&'a ValueSpec),
    Func(&'a FuncDecl),
    Field(&'a Field),
    Type(&'a TypeExpr),
    Block(&'a Block),
    Stmt(&'a Stmt),
    Expr(&'a Expr),
    Ident(&'a Ident),
}

impl<'a> Node<'a> {
    pub fn kind(&self) -> &'static str {
        match self {
            Node::File(_) => "file",
            Node::Decl(_) => "decl",
            Node::TypeSpec(_) => "type spec",
            Node::ValueSpec(_) => "value spec",
            Node::Func(_) => "func",
            Node::Field(_) => "field",
            Node::Type(_) => "type",
            Node::Block(_) => "block",
            Node::Stmt(_) => "stmt",
            Node::Expr(_) => "expr",
            Node::Ident(_) => "ident",
        }
    }

    /// Direct children, in source order.
    pub fn children(self) -> Vec<Node<'a>> {
        let mut out = Vec::new();
        match self {
            Node::File(file) => {
                out.push(Node::Ident(&file.package));
                out.extend(file.decls.iter().map(|d| Node::Decl(&d.node)));
            }
            Node::Decl(decl) => match decl {
                Decl::Import(imp) => {
                    out.extend(imp.specs.iter().filter_map(|s| s.name.as_ref()).map(Node::Ident));
                }
                Decl::Type(decl) => out.extend(decl.specs.iter().map(Node::TypeSpec)),
                Decl::Func(func) => out.push(Node::Func(func)),
                Decl::Var(decl) | Decl::Const(decl) => {
                    out.extend(decl.specs.iter().map(Node::ValueSpec))
                }
            },
            Node::TypeSpec(spec) => {
                out.push(Node::Ident(&spec.name));
                out.push(Node::Type(&spec.type_.node));
            }
            Node::ValueSpec(spec) => {
                out.extend(spec.names.iter().map(Node::Ident));
                out.extend(spec.type_.iter().map(|t| Node::Type(&t.node)));
                out.extend(spec.values.iter().map(|v| Node::Expr(&v.node)));
            }
            Node::Func(func) => {
                out.extend(func.recv.iter().map(Node::Field));
                out.push(Node::Ident(&func.name));
                push_signature(&mut out, &func.signature);
                out.extend(func.body.iter().map(Node::Block));
            }
            Node::Field(field) => {
                out.extend(field.names.iter().map(Node::Ident));
                out.push(Node::Type(&field.type_.node));
            }
            Node::Type(ty) => push_type(&mut out, ty),
            Node::Block(block) => out.extend(block.stmts.iter().map(|s| Node::Stmt(&s.node))),
            Node::Stmt(stmt) => push_stmt(&mut out, stmt),
            Node::Expr(expr) => push_expr(&mut out, expr),
            Node::Ident(_) => {}
        }
        out
    }
}

fn push_signature<'a>(out: &mut Vec<Node<'a>>, sig: &'a FuncType) {
    out.extend(sig.params.iter().map(Node::Field));
    out.extend(sig.results.iter().map(Node::Field));
}

fn push_type<'a>(out: &mut Vec<Node<'a>>, ty: &'a TypeExpr) {
    match ty {
        TypeExpr::Name(ident) => out.push(Node::Ident(ident)),
        TypeExpr::Qualified { package, name } => {
            out.push(Node::Ident(package));
            out.push(Node::Ident(name));
        }
        TypeExpr::Pointer(inner) | TypeExpr::Slice(inner) | TypeExpr::Variadic(inner) => {
            out.push(Node::Type(&inner.node))
        }
        TypeExpr::Array { len, elem } => {
            out.extend(len.iter().map(|l| Node::Expr(&l.node)));
            out.push(Node::Type(&elem.node));
        }
        TypeExpr::Map { key, value } => {
            out.push(Node::Type(&key.node));
            out.push(Node::Type(&value.node));
        }
        TypeExpr::Chan { elem, .. } => out.push(Node::Type(&elem.node)),
        TypeExpr::Func(sig) => push_signature(out, sig),
        TypeExpr::Struct(st) => out.extend(st.fields.iter().map(Node::Field)),
        TypeExpr::Interface(iface) => {
            for elem in &iface.elems {
                match elem {
                    InterfaceElem::Method {
                        name, signature, ..
                    } => {
                        out.push(Node::Ident(name));
                        push_signature(out, signature);
                    }
                    InterfaceElem::Embedded { type_, .. } => out.push(Node::Type(&type_.node)),
                }
            }
        }
    }
}

fn push_stmts<'a>(out: &mut Vec<Node<'a>>, stmts: &'a [crate::span::Spanned<Stmt>]) {
    out.extend(stmts.iter().map(|s| Node::Stmt(&s.node)));
}

fn push_stmt<'a>(out: &mut Vec<Node<'a>>, stmt: &'a Stmt) {
    match stmt {
        Stmt::Decl(decl) => out.push(Node::Decl(decl)),
        Stmt::Expr(expr) | Stmt::Go(expr) | Stmt::Defer(expr) => out.push(Node::Expr(&expr.node)),
        Stmt::Send { chan, value } => {
            out.push(Node::Expr(&chan.node));
            out.push(Node::Expr(&value.node));
        }
        Stmt::IncDec { expr, .. } => out.push(Node::Expr(&expr.node)),
        Stmt::Assign { lhs, rhs, .. } => {
            out.extend(lhs.iter().chain(rhs).map(|e| Node::Expr(&e.node)));
        }
        Stmt::Return(results) => out.extend(results.iter().map(|e| Node::Expr(&e.node))),
        Stmt::Branch { label, .. } => out.extend(label.iter().map(Node::Ident)),
        Stmt::Block(block) => out.push(Node::Block(block)),
        Stmt::If(stmt) => {
            out.extend(stmt.init.iter().map(|s| Node::Stmt(&s.node)));
            out.push(Node::Expr(&stmt.cond.node));
            out.push(Node::Block(&stmt.then));
            out.extend(stmt.else_.iter().map(|s| Node::Stmt(&s.node)));
        }
        Stmt::Switch(stmt) => {
            out.extend(stmt.init.iter().map(|s| Node::Stmt(&s.node)));
            out.extend(stmt.tag.iter().map(|e| Node::Expr(&e.node)));
            for clause in &stmt.cases {
                out.extend(clause.exprs.iter().map(|e| Node::Expr(&e.node)));
                push_stmts(out, &clause.body);
            }
        }
        Stmt::TypeSwitch(stmt) => {
            out.extend(stmt.init.iter().map(|s| Node::Stmt(&s.node)));
            out.extend(stmt.binding.iter().map(Node::Ident));
            out.push(Node::Expr(&stmt.expr.node));
            for clause in &stmt.cases {
                out.extend(clause.types.iter().map(|t| Node::Type(&t.node)));
                push_stmts(out, &clause.body);
            }
        }
        Stmt::Select(clauses) => {
            for clause in clauses {
                out.extend(clause.comm.iter().map(|s| Node::Stmt(&s.node)));
                push_stmts(out, &clause.body);
            }
        }
        Stmt::For(stmt) => {
            out.extend(stmt.init.iter().map(|s| Node::Stmt(&s.node)));
            out.extend(stmt.cond.iter().map(|e| Node::Expr(&e.node)));
            out.extend(stmt.post.iter().map(|s| Node::Stmt(&s.node)));
            out.push(Node::Block(&stmt.body));
        }
        Stmt::Range(stmt) => {
            out.extend(stmt.key.iter().chain(&stmt.value).map(|e| Node::Expr(&e.node)));
            out.push(Node::Expr(&stmt.expr.node));
            out.push(Node::Block(&stmt.body));
        }
        Stmt::Labeled { label, stmt } => {
            out.push(Node::Ident(label));
            out.push(Node::Stmt(&stmt.node));
        }
        Stmt::Empty => {}
    }
}

fn push_expr<'a>(out: &mut Vec<Node<'a>>, expr: &'a Expr) {
    match expr {
        Expr::Ident(ident) => out.push(Node::Ident(ident)),
        Expr::BasicLit { .. } => {}
        Expr::Composite { type_, elts, .. } => {
            out.extend(type_.iter().map(|t| Node::Expr(&t.node)));
            out.extend(elts.iter().map(|e| Node::Expr(&e.node)));
        }
        Expr::KeyValue { key, value } => {
            out.push(Node::Expr(&key.node));
            out.push(Node::Expr(&value.node));
        }
        Expr::FuncLit { signature, body } => {
            push_signature(out, signature);
            out.push(Node::Block(body));
        }
        Expr::Paren(inner) | Expr::Star(inner) | Expr::Unary { expr: inner, .. } => {
            out.push(Node::Expr(&inner.node))
        }
        Expr::Selector { expr, sel } => {
            out.push(Node::Expr(&expr.node));
            out.push(Node::Ident(sel));
        }
        Expr::Index { expr, indices } => {
            out.push(Node::Expr(&expr.node));
            out.extend(indices.iter().map(|e| Node::Expr(&e.node)));
        }
        Expr::Slice {
            expr,
            low,
            high,
            max,
        } => {
            out.push(Node::Expr(&expr.node));
            for part in [low, high, max].into_iter().flatten() {
                out.push(Node::Expr(&part.node));
            }
        }
        Expr::TypeAssert { expr, type_ } => {
            out.push(Node::Expr(&expr.node));
            out.extend(type_.iter().map(|t| Node::Type(&t.node)));
        }
        Expr::Call { fun, args, .. } => {
            out.push(Node::Expr(&fun.node));
            out.extend(args.iter().map(|e| Node::Expr(&e.node)));
        }
        Expr::Binary { lhs, rhs, .. } => {
            out.push(Node::Expr(&lhs.node));
            out.push(Node::Expr(&rhs.node));
        }
        Expr::Type(ty) => out.push(Node::Type(&ty.node)),
    }
}

/// One step of a walk: the node being visited and the chain of nodes above
/// it. Each scope lives on the stack frame that visits its node, so the
/// chain is never longer than the current recursion.
#[derive(Debug, Clone, Copy)]
pub struct Scope<'a> {
    pub parent: Option<&'a Scope<'a>>,
    pub node: Node<'a>,
}

impl<'a> Scope<'a> {
    pub fn root(node: Node<'a>) -> Self {
        Self { parent: None, node }
    }

    /// A child scope for `node`, with `self` as its parent.
    pub fn fork(&'a self, node: Node<'a>) -> Scope<'a> {
        Scope {
            parent: Some(self),
            node,
        }
    }

    pub fn depth(&self) -> usize {
        let mut depth = 0;
        let mut cur = self.parent;
        while let Some(scope) = cur {
            depth += 1;
            cur = scope.parent;
        }
        depth
    }

    /// The innermost function declaration containing this node.
    pub fn enclosing_func(&self) -> Option<&'a FuncDecl> {
        let mut cur = Some(self);
        while let Some(scope) = cur {
            if let Node::Func(func) = scope.node {
                return Some(func);
            }
            cur = scope.parent;
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::Parser;

    fn parse(src: &str) -> File {
        let mut parser = Parser::new(src);
        let file = parser.parse_file();
        assert!(!parser.has_errors());
        file
    }

    fn idents<'a>(node: Node<'a>, out: &mut Vec<&'a str>) {
        if let Node::Ident(ident) = node {
            out.push(&ident.name);
        }
        for child in node.children() {
            idents(child, out);
        }
    }

    #[test]
    fn walk_reaches_every_identifier_in_order() {
        let file = parse(
            "package main\n\nfunc main() {\n\tv := TPLᐸintᐳ{}\n\tfmt.Println(v.Value)\n}\n",
        );
        let mut names = Vec::new();
        idents(Node::File(&file), &mut names);
        assert_eq!(names, ["main", "main", "v", "TPLᐸintᐳ", "fmt", "Println", "v", "Value"]);
    }

    #[test]
    fn walk_enters_types_and_nested_statements() {
        let file = parse(
            "package main\n\nvar m map[string]*Boxᐸintᐳ\n\nfunc f() {\n\tfor _, x := range []Boxᐸuintᐳ{} {\n\t\tif ok {\n\t\t\t_ = func() Boxᐸbyteᐳ { return nil }\n\t\t}\n\t}\n}\n",
        );
        let mut names = Vec::new();
        idents(Node::File(&file), &mut names);
        for usage in ["Boxᐸintᐳ", "Boxᐸuintᐳ", "Boxᐸbyteᐳ"] {
            assert!(names.contains(&usage), "missing {usage} in {names:?}");
        }
    }

    #[test]
    fn scope_chain_finds_enclosing_func() {
        let file = parse("package main\n\nfunc run() {\n\tx := 1\n}\n");
        let root = Scope::root(Node::File(&file));
        let decl = root.node.children()[1];
        let decl_scope = root.fork(decl);
        let func_scope = decl_scope.fork(decl_scope.node.children()[0]);
        let Node::Func(func) = func_scope.node else {
            panic!("expected func node");
        };
        let body = func_scope.fork(Node::Block(func.body.as_ref().unwrap()));
        let stmt = body.fork(body.node.children()[0]);

        assert_eq!(stmt.depth(), 4);
        assert_eq!(stmt.enclosing_func().map(|f| f.name.name.as_str()), Some("run"));
        assert!(decl_scope.enclosing_func().is_none());
    }
}
