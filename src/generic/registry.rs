use crate::parser::ast::{Field, FuncDecl};
use crate::span::Span;
use indexmap::IndexMap;
use rustc_hash::FxHashMap;
use tracing::debug;

/// A generic struct definition and the methods declared on it.
#[derive(Debug, Clone)]
pub struct GenericTemplate {
    /// `List` for `type ListᐸTᐳ struct { ... }`.
    pub name: String,
    /// `T` for `type ListᐸTᐳ struct { ... }`.
    pub type_param: String,
    pub fields: Vec<Field>,
    /// Method name → declaration, in attachment order.
    pub methods: IndexMap<String, FuncDecl>,
    /// Span of the defining type name.
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RegistryError {
    #[error("template `{name}` is already defined")]
    DuplicateDefinition { name: String, original: Span },

    #[error("template `{name}` is not defined")]
    TemplateNotFound { name: String },
}

/// Every template known to one run, plus methods still waiting for theirs.
#[derive(Debug, Default)]
pub struct TemplateRegistry {
    templates: FxHashMap<String, GenericTemplate>,
    deferred: FxHashMap<String, Vec<FuncDecl>>,
}

impl TemplateRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    /// Register a template. The first definition of a name wins.
    pub fn register_type(
        &mut self,
        name: &str,
        type_param: &str,
        fields: Vec<Field>,
        span: Span,
    ) -> Result<(), RegistryError> {
        if let Some(existing) = self.templates.get(name) {
            return Err(RegistryError::DuplicateDefinition {
                name: name.to_string(),
                original: existing.span,
            });
        }
        debug!(template = name, type_param, fields = fields.len(), "created generic type");
        self.templates.insert(
            name.to_string(),
            GenericTemplate {
                name: name.to_string(),
                type_param: type_param.to_string(),
                fields,
                methods: IndexMap::new(),
                span,
            },
        );
        Ok(())
    }

    /// Attach a method to a registered template, replacing any earlier
    /// method of the same name.
    pub fn attach_method(&mut self, template: &str, method: FuncDecl) -> Result<(), RegistryError> {
        let Some(entry) = self.templates.get_mut(template) else {
            return Err(RegistryError::TemplateNotFound {
                name: template.to_string(),
            });
        };
        let name = method.name.name.clone();
        if entry.methods.insert(name.clone(), method).is_some() {
            debug!(template, method = %name, "replaced generic method");
        } else {
            debug!(template, method = %name, "attached generic method");
        }
        Ok(())
    }

    pub fn lookup(&self, name: &str) -> Option<&GenericTemplate> {
        self.templates.get(name)
    }

    /// Hold a method whose template has not been seen yet.
    pub fn defer_method(&mut self, template: &str, method: FuncDecl) {
        debug!(template, method = %method.name.name, "deferred generic method");
        self.deferred
            .entry(template.to_string())
            .or_default()
            .push(method);
    }

    /// Methods deferred for `template`, in the order they were deferred.
    pub fn take_deferred(&mut self, template: &str) -> Vec<FuncDecl> {
        self.deferred.remove(template).unwrap_or_default()
    }

    /// Methods whose template never registered, in source order.
    pub fn drain_orphans(&mut self) -> Vec<(String, FuncDecl)> {
        let mut orphans: Vec<(String, FuncDecl)> = self
            .deferred
            .drain()
            .flat_map(|(template, methods)| {
                methods.into_iter().map(move |m| (template.clone(), m))
            })
            .collect();
        orphans.sort_by_key(|(_, method)| method.span.start);
        orphans
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::ast::{FuncType, Ident};

    fn method(name: &str, at: usize) -> FuncDecl {
        FuncDecl {
            doc: Vec::new(),
            recv: None,
            name: Ident::synthetic(name),
            signature: FuncType {
                params: Vec::new(),
                results: Vec::new(),
            },
            body: None,
            span: Span::new(at, at + 1),
        }
    }

    #[test]
    fn register_and_lookup() {
        let mut registry = TemplateRegistry::new();
        registry
            .register_type("TPL", "T", Vec::new(), Span::new(5, 13))
            .unwrap();
        let template = registry.lookup("TPL").unwrap();
        assert_eq!(template.type_param, "T");
        assert!(template.methods.is_empty());
        assert!(registry.lookup("Other").is_none());
    }

    #[test]
    fn duplicate_keeps_first_definition() {
        let mut registry = TemplateRegistry::new();
        registry
            .register_type("TPL", "T", Vec::new(), Span::new(5, 13))
            .unwrap();
        let err = registry
            .register_type("TPL", "U", Vec::new(), Span::new(40, 48))
            .unwrap_err();
        assert_eq!(
            err,
            RegistryError::DuplicateDefinition {
                name: "TPL".into(),
                original: Span::new(5, 13),
            }
        );
        assert_eq!(registry.lookup("TPL").unwrap().type_param, "T");
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn attach_requires_template() {
        let mut registry = TemplateRegistry::new();
        let err = registry.attach_method("TPL", method("M", 0)).unwrap_err();
        assert!(matches!(err, RegistryError::TemplateNotFound { name } if name == "TPL"));
    }

    #[test]
    fn attach_replaces_same_name_and_keeps_order() {
        let mut registry = TemplateRegistry::new();
        registry
            .register_type("TPL", "T", Vec::new(), Span::dummy())
            .unwrap();
        registry.attach_method("TPL", method("B", 1)).unwrap();
        registry.attach_method("TPL", method("A", 2)).unwrap();
        registry.attach_method("TPL", method("B", 3)).unwrap();
        let methods = &registry.lookup("TPL").unwrap().methods;
        assert_eq!(methods.keys().collect::<Vec<_>>(), ["B", "A"]);
        assert_eq!(methods["B"].span, Span::new(3, 4));
    }

    #[test]
    fn deferred_methods_are_claimed_or_orphaned() {
        let mut registry = TemplateRegistry::new();
        registry.defer_method("Late", method("Get", 30));
        registry.defer_method("Never", method("Put", 20));
        registry.defer_method("Never", method("Len", 10));

        let claimed = registry.take_deferred("Late");
        assert_eq!(claimed.len(), 1);
        assert!(registry.take_deferred("Late").is_empty());

        let orphans = registry.drain_orphans();
        let names: Vec<_> = orphans
            .iter()
            .map(|(t, m)| (t.as_str(), m.name.name.as_str()))
            .collect();
        assert_eq!(names, [("Never", "Len"), ("Never", "Put")]);
        assert!(registry.drain_orphans().is_empty());
    }
}
