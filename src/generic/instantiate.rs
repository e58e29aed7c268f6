use crate::generic::naming::{self, concrete_name};
use crate::generic::registry::GenericTemplate;
use crate::parser::ast::*;
use crate::span::{Span, Spanned};
use indexmap::IndexMap;
use tracing::{debug, trace};

/// Copy `fields`, replacing every declared type that is exactly the type
/// parameter with `arg`. Names, tags and comments are kept as they are.
pub fn substitute_fields(fields: &[Field], type_param: &str, arg: &str) -> Vec<Field> {
    fields
        .iter()
        .map(|field| {
            let mut field = field.clone();
            if let TypeExpr::Name(ident) = &mut field.type_.node {
                if ident.name == type_param {
                    trace!(from = type_param, to = arg, "substituting field type");
                    ident.name = arg.to_string();
                }
            }
            field
        })
        .collect()
}

/// Copy `method` with its receiver retargeted to the type named `name`. A
/// pointer receiver stays a pointer receiver; the body is untouched.
pub fn rename_receiver(method: &FuncDecl, name: &str) -> FuncDecl {
    let mut method = method.clone();
    if let Some(recv) = &mut method.recv {
        let target = match &mut recv.type_.node {
            TypeExpr::Pointer(inner) => &mut inner.node,
            other => other,
        };
        *target = TypeExpr::Name(Ident::synthetic(name));
    }
    method
}

/// `type <name> struct { <fields> }`
fn struct_decl(name: &str, fields: Vec<Field>) -> Decl {
    Decl::Type(TypeDecl {
        doc: Vec::new(),
        specs: vec![TypeSpec {
            name: Ident::synthetic(name),
            is_alias: false,
            type_: Spanned::new(TypeExpr::Struct(StructType { fields }), Span::dummy()),
            comment: None,
            span: Span::dummy(),
        }],
        grouped: false,
    })
}

/// The generated declarations of one run, keyed by concrete type name for
/// types and `Type.Method` for methods, in discovery order.
#[derive(Debug, Default)]
pub struct Instantiator {
    decls: IndexMap<String, Decl>,
}

impl Instantiator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.decls.contains_key(key)
    }

    /// Concrete types already generated from `template`.
    pub fn instances_of<'a>(&'a self, template: &'a str) -> impl Iterator<Item = &'a str> {
        self.decls
            .keys()
            .map(String::as_str)
            .filter(move |key| naming::parse(key).is_some_and(|r| r.template == template))
    }

    pub fn len(&self) -> usize {
        self.decls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.decls.is_empty()
    }

    /// Generate the concrete struct and its methods for `template` applied to
    /// `arg`. Returns `false` when that instantiation already exists.
    pub fn instantiate(&mut self, template: &GenericTemplate, arg: &str) -> bool {
        let key = concrete_name(&template.name, arg);
        if self.contains(&key) {
            trace!(key = %key, "type is already generated, skipping");
            return false;
        }

        debug!(template = %template.name, arg, "instantiating");
        let fields = substitute_fields(&template.fields, &template.type_param, arg);
        self.decls.insert(key.clone(), struct_decl(&key, fields));

        for (name, method) in &template.methods {
            self.decls.insert(
                format!("{key}.{name}"),
                Decl::Func(rename_receiver(method, &key)),
            );
        }
        true
    }

    pub fn into_decls(self) -> IndexMap<String, Decl> {
        self.decls
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::Parser;

    /// Parse a template struct and its methods into a registry entry.
    fn template(src: &str) -> GenericTemplate {
        let mut parser = Parser::new(src);
        let file = parser.parse_file();
        assert!(!parser.has_errors(), "{:?}", parser.errors);
        let mut fields = Vec::new();
        let mut methods = IndexMap::new();
        for decl in file.decls {
            match decl.node {
                Decl::Type(mut decl) => {
                    let TypeExpr::Struct(st) = decl.specs.remove(0).type_.node else {
                        panic!("expected struct");
                    };
                    fields = st.fields;
                }
                Decl::Func(func) => {
                    methods.insert(func.name.name.clone(), func);
                }
                _ => {}
            }
        }
        GenericTemplate {
            name: "Box".into(),
            type_param: "T".into(),
            fields,
            methods,
            span: Span::dummy(),
        }
    }

    fn type_name(ty: &TypeExpr) -> String {
        match ty {
            TypeExpr::Name(id) => id.name.clone(),
            TypeExpr::Pointer(inner) => format!("*{}", type_name(&inner.node)),
            TypeExpr::Slice(inner) => format!("[]{}", type_name(&inner.node)),
            other => format!("{other:?}"),
        }
    }

    #[test]
    fn substitutes_only_exact_parameter_fields() {
        let tpl = template(
            "package p\ntype BoxᐸTᐳ struct {\n\tValue T `json:\"v\"` // the value\n\tPtr *T\n\tAll []T\n\tCount int\n}\n",
        );
        let fields = substitute_fields(&tpl.fields, "T", "float32");
        let types: Vec<_> = fields.iter().map(|f| type_name(&f.type_.node)).collect();
        assert_eq!(types, ["float32", "*T", "[]T", "int"]);
        assert_eq!(fields[0].names[0].name, "Value");
        assert_eq!(fields[0].tag.as_deref(), Some("`json:\"v\"`"));
        assert_eq!(fields[0].comment.as_deref(), Some("// the value"));
    }

    #[test]
    fn receiver_rename_keeps_pointer_and_body() {
        let tpl = template(
            "package p\ntype BoxᐸTᐳ struct{}\nfunc (b *BoxᐸTᐳ) Get() int { return 1 }\nfunc (b BoxᐸTᐳ) Put() {}\n",
        );
        let get = rename_receiver(&tpl.methods["Get"], "Boxᐸintᐳ");
        let recv = get.recv.as_ref().unwrap();
        assert_eq!(type_name(&recv.type_.node), "*Boxᐸintᐳ");
        assert_eq!(recv.names[0].name, "b");
        assert_eq!(get.body.as_ref().map(|b| b.stmts.len()), Some(1));

        let put = rename_receiver(&tpl.methods["Put"], "Boxᐸintᐳ");
        assert_eq!(type_name(&put.recv.unwrap().type_.node), "Boxᐸintᐳ");
    }

    #[test]
    fn instantiation_is_memoized() {
        let tpl = template(
            "package p\ntype BoxᐸTᐳ struct {\n\tValue T\n}\nfunc (b *BoxᐸTᐳ) SayHello() {}\n",
        );
        let mut generated = Instantiator::new();
        assert!(generated.instantiate(&tpl, "int"));
        assert!(!generated.instantiate(&tpl, "int"));
        assert!(generated.instantiate(&tpl, "float32"));
        assert!(generated.contains("Boxᐸintᐳ.SayHello"));
        assert_eq!(
            generated.instances_of("Box").collect::<Vec<_>>(),
            ["Boxᐸintᐳ", "Boxᐸfloat32ᐳ"]
        );
        assert_eq!(generated.instances_of("Bo").count(), 0);

        let decls = generated.into_decls();
        let keys: Vec<_> = decls.keys().map(String::as_str).collect();
        assert_eq!(
            keys,
            [
                "Boxᐸintᐳ",
                "Boxᐸintᐳ.SayHello",
                "Boxᐸfloat32ᐳ",
                "Boxᐸfloat32ᐳ.SayHello"
            ]
        );
        let Decl::Type(decl) = &decls["Boxᐸfloat32ᐳ"] else {
            panic!("expected type decl");
        };
        let TypeExpr::Struct(st) = &decl.specs[0].type_.node else {
            panic!("expected struct");
        };
        assert_eq!(type_name(&st.fields[0].type_.node), "float32");
    }
}
