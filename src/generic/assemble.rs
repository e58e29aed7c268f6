use crate::generic::Generated;
use crate::parser::ast::File;
use crate::span::{Span, Spanned};

/// Build the output file: the input's package clause and doc, its leading
/// run of import declarations, then every generated declaration.
pub fn assemble(input: &File, generated: &Generated) -> File {
    let imports = input
        .decls
        .iter()
        .take_while(|decl| decl.node.is_import())
        .cloned();
    let decls = generated
        .decls
        .values()
        .map(|decl| Spanned::new(decl.clone(), Span::dummy()));

    File {
        doc: input.doc.clone(),
        package: input.package.clone(),
        decls: imports.chain(decls).collect(),
        span: Span::dummy(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generic::{generate, Options};
    use crate::parser::ast::Decl;
    use crate::parser::Parser;

    fn parse(src: &str) -> File {
        let mut parser = Parser::new(src);
        let file = parser.parse_file();
        assert!(!parser.has_errors(), "{:?}", parser.errors);
        file
    }

    fn kinds(file: &File) -> Vec<&'static str> {
        file.decls
            .iter()
            .map(|d| match &d.node {
                Decl::Import(_) => "import",
                Decl::Type(_) => "type",
                Decl::Func(_) => "func",
                Decl::Var(_) => "var",
                Decl::Const(_) => "const",
            })
            .collect()
    }

    fn import_paths(file: &File) -> Vec<&str> {
        file.decls
            .iter()
            .filter_map(|d| match &d.node {
                Decl::Import(decl) => Some(decl),
                _ => None,
            })
            .flat_map(|decl| decl.specs.iter().map(|spec| spec.path.node.as_str()))
            .collect()
    }

    #[test]
    fn keeps_leading_imports_only() {
        let file = parse(
            "// Package demo.\npackage demo\n\nimport \"fmt\"\nimport (\n\t\"os\"\n)\n\nvar x = 1\n\nimport \"strings\"\n",
        );
        let out = assemble(&file, &Generated::default());
        assert_eq!(out.package.name, "demo");
        assert_eq!(out.doc, ["// Package demo."]);
        assert_eq!(kinds(&out), ["import", "import"]);
        assert_eq!(import_paths(&out), ["\"fmt\"", "\"os\""]);

        let file = parse("package demo\n\nimport (\n\t\"os\"\n\t\"fmt\"\n)\n");
        let out = assemble(&file, &Generated::default());
        assert_eq!(import_paths(&out), ["\"os\"", "\"fmt\""]);
    }

    #[test]
    fn appends_generated_after_imports() {
        let file = parse(
            "package main\n\nimport \"fmt\"\n\ntype BoxᐸTᐳ struct {\n\tV T\n}\n\nfunc (b BoxᐸTᐳ) Show() { fmt.Println(b.V) }\n\nfunc main() { Boxᐸintᐳ{}.Show() }\n",
        );
        let generated = generate(&file, &Options::default());
        let out = assemble(&file, &generated);
        assert_eq!(kinds(&out), ["import", "type", "func"]);
        let Decl::Type(decl) = &out.decls[1].node else {
            panic!("expected type decl");
        };
        assert_eq!(decl.specs[0].name.name, "Boxᐸintᐳ");
    }

    #[test]
    fn no_imports_no_generated() {
        let file = parse("package empty\n\nfunc main() {}\n");
        let out = assemble(&file, &Generated::default());
        assert!(out.decls.is_empty());
    }
}
