use crate::generic::naming::concrete_name;
use crate::span::Span;

/// A non-fatal finding of a generation run. The run carries on after any of
/// these; the affected declaration is simply not generated.
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DiagnosticKind {
    /// A usage names a template that is not (or not yet) defined.
    UnresolvedTemplate {
        template: String,
        arg: String,
        /// Function containing the usage, if any.
        enclosing: Option<String>,
    },
    /// A second definition of an already registered template.
    DuplicateDefinition { template: String, original: Span },
    /// A method whose receiver names a template that is never defined.
    OrphanMethod { template: String, method: String },
    /// A template-named type that is not a struct.
    UnsupportedTemplate { name: String },
    /// A method visited after its template was already instantiated; the
    /// listed concrete types are generated without it.
    LateMethod {
        template: String,
        method: String,
        instances: Vec<String>,
    },
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.kind {
            DiagnosticKind::UnresolvedTemplate { template, arg, .. } => write!(
                f,
                "`{}` refers to undefined template `{template}`",
                concrete_name(template, arg)
            ),
            DiagnosticKind::DuplicateDefinition { template, .. } => {
                write!(f, "template `{template}` is defined more than once")
            }
            DiagnosticKind::OrphanMethod { template, method } => {
                write!(f, "method `{method}` belongs to undefined template `{template}`")
            }
            DiagnosticKind::UnsupportedTemplate { name } => {
                write!(f, "template `{name}` is not a struct type")
            }
            DiagnosticKind::LateMethod {
                template,
                method,
                instances,
            } => write!(
                f,
                "method `{method}` of template `{template}` is missing from `{}`",
                instances.join("`, `")
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unresolved_message_names_usage() {
        let diag = Diagnostic {
            kind: DiagnosticKind::UnresolvedTemplate {
                template: "Box".into(),
                arg: "int".into(),
                enclosing: Some("main".into()),
            },
            span: Span::new(0, 1),
        };
        assert_eq!(
            diag.to_string(),
            "`Boxᐸintᐳ` refers to undefined template `Box`"
        );
    }

    #[test]
    fn orphan_message() {
        let diag = Diagnostic {
            kind: DiagnosticKind::OrphanMethod {
                template: "List".into(),
                method: "Len".into(),
            },
            span: Span::dummy(),
        };
        assert_eq!(
            diag.to_string(),
            "method `Len` belongs to undefined template `List`"
        );
    }

    #[test]
    fn late_method_message_lists_instances() {
        let diag = Diagnostic {
            kind: DiagnosticKind::LateMethod {
                template: "Box".into(),
                method: "Get".into(),
                instances: vec!["Boxᐸintᐳ".into(), "Boxᐸboolᐳ".into()],
            },
            span: Span::dummy(),
        };
        assert_eq!(
            diag.to_string(),
            "method `Get` of template `Box` is missing from `Boxᐸintᐳ`, `Boxᐸboolᐳ`"
        );
    }
}
