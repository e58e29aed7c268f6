use crate::generic::diagnostics::{Diagnostic, DiagnosticKind};
use crate::generic::instantiate::Instantiator;
use crate::generic::naming::{self, TemplateRef};
use crate::generic::registry::{RegistryError, TemplateRegistry};
use crate::generic::walk::{Node, Scope};
use crate::generic::Resolution;
use crate::parser::ast::{File, FuncDecl, Ident, TypeExpr, TypeSpec};
use tracing::{debug, trace, warn};

/// Which dispatch rules a walk applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Register templates and methods only.
    Collect,
    /// Resolve usages only; template definitions are still skipped.
    Instantiate,
    /// Both at once, in traversal order.
    Single,
}

impl Stage {
    fn collects(self) -> bool {
        matches!(self, Stage::Collect | Stage::Single)
    }

    fn instantiates(self) -> bool {
        matches!(self, Stage::Instantiate | Stage::Single)
    }
}

/// Whether the walk continues below the current node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Walk {
    Descend,
    Skip,
}

/// Mutable state of one generation run. The walk owns it exclusively; scopes
/// only ever hold shared borrows of the tree.
#[derive(Debug, Default)]
pub struct Engine {
    pub registry: TemplateRegistry,
    pub generated: Instantiator,
    pub diagnostics: Vec<Diagnostic>,
}

impl Engine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run every stage `resolution` calls for over `file`.
    pub fn run(&mut self, file: &File, resolution: Resolution) {
        let root = Scope::root(Node::File(file));
        match resolution {
            Resolution::Staged => {
                self.visit(&root, Stage::Collect);
                self.report_orphans();
                self.visit(&root, Stage::Instantiate);
            }
            Resolution::SinglePass => {
                self.visit(&root, Stage::Single);
                self.report_orphans();
            }
        }
    }

    pub fn visit(&mut self, scope: &Scope<'_>, stage: Stage) {
        trace!(depth = scope.depth(), node = scope.node.kind(), "visit");
        if self.dispatch(scope, stage) == Walk::Skip {
            return;
        }
        for child in scope.node.children() {
            let child_scope = scope.fork(child);
            self.visit(&child_scope, stage);
        }
    }

    fn dispatch(&mut self, scope: &Scope<'_>, stage: Stage) -> Walk {
        match scope.node {
            Node::Func(func) => {
                let Some(usage) = func.receiver_type().and_then(|id| naming::parse(&id.name)) else {
                    return Walk::Descend;
                };
                if stage.collects() {
                    self.collect_method(usage, func);
                }
                Walk::Skip
            }
            Node::TypeSpec(spec) => {
                let Some(usage) = naming::parse(&spec.name.name) else {
                    return Walk::Descend;
                };
                if stage.collects() {
                    self.collect_template(usage, spec);
                }
                Walk::Skip
            }
            Node::Ident(ident) if stage.instantiates() => {
                if let Some(usage) = naming::parse(&ident.name) {
                    self.resolve_usage(usage, ident, scope);
                }
                Walk::Descend
            }
            _ => Walk::Descend,
        }
    }

    fn collect_template(&mut self, usage: TemplateRef<'_>, spec: &TypeSpec) {
        let TypeExpr::Struct(st) = &spec.type_.node else {
            warn!(name = %spec.name.name, "template is not a struct type, skipping");
            self.diagnostics.push(Diagnostic {
                kind: DiagnosticKind::UnsupportedTemplate {
                    name: spec.name.name.clone(),
                },
                span: spec.name.span,
            });
            return;
        };

        let registered = self.registry.register_type(
            usage.template,
            usage.arg,
            st.fields.clone(),
            spec.name.span,
        );
        match registered {
            Ok(()) => {
                for method in self.registry.take_deferred(usage.template) {
                    self.attach(usage.template, method);
                }
            }
            Err(RegistryError::DuplicateDefinition { name, original }) => {
                warn!(template = %name, "duplicate template definition ignored");
                self.diagnostics.push(Diagnostic {
                    kind: DiagnosticKind::DuplicateDefinition {
                        template: name,
                        original,
                    },
                    span: spec.name.span,
                });
            }
            Err(err) => warn!(%err, "cannot register template"),
        }
    }

    fn collect_method(&mut self, usage: TemplateRef<'_>, func: &FuncDecl) {
        if self.registry.lookup(usage.template).is_none() {
            self.registry.defer_method(usage.template, func.clone());
            return;
        }
        self.attach(usage.template, func.clone());

        let instances: Vec<String> = self
            .generated
            .instances_of(usage.template)
            .map(str::to_string)
            .collect();
        if !instances.is_empty() {
            warn!(
                template = usage.template,
                method = %func.name.name,
                "method declared after instantiation"
            );
            self.diagnostics.push(Diagnostic {
                kind: DiagnosticKind::LateMethod {
                    template: usage.template.to_string(),
                    method: func.name.name.clone(),
                    instances,
                },
                span: func.name.span,
            });
        }
    }

    fn attach(&mut self, template: &str, method: FuncDecl) {
        if let Err(err) = self.registry.attach_method(template, method) {
            warn!(%err, "cannot attach method");
        }
    }

    fn resolve_usage(&mut self, usage: TemplateRef<'_>, ident: &Ident, scope: &Scope<'_>) {
        let Some(template) = self.registry.lookup(usage.template) else {
            let enclosing = scope.enclosing_func().map(|f| f.name.name.clone());
            debug!(
                template = usage.template,
                usage = %ident.name,
                "not a generic type, skipping usage"
            );
            self.diagnostics.push(Diagnostic {
                kind: DiagnosticKind::UnresolvedTemplate {
                    template: usage.template.to_string(),
                    arg: usage.arg.to_string(),
                    enclosing,
                },
                span: ident.span,
            });
            return;
        };
        debug!(template = usage.template, arg = usage.arg, "accessed generic type");
        self.generated.instantiate(template, usage.arg);
    }

    fn report_orphans(&mut self) {
        for (template, method) in self.registry.drain_orphans() {
            warn!(template = %template, method = %method.name.name, "method has no template");
            let span = method
                .receiver_type()
                .map_or(method.name.span, |recv| recv.span);
            self.diagnostics.push(Diagnostic {
                kind: DiagnosticKind::OrphanMethod {
                    template,
                    method: method.name.name.clone(),
                },
                span,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::Parser;
    use crate::span::Span;

    fn run(src: &str, resolution: Resolution) -> Engine {
        let mut parser = Parser::new(src);
        let file = parser.parse_file();
        assert!(!parser.has_errors(), "{:?}", parser.errors);
        let mut engine = Engine::new();
        engine.run(&file, resolution);
        engine
    }

    fn keys(engine: Engine) -> Vec<String> {
        engine.generated.into_decls().into_keys().collect()
    }

    const FORWARD: &str = "package main

func main() {
	v := TPLᐸintᐳ{}
	v.SayHello()
}

type TPLᐸTᐳ struct {
	Value T
}

func (t *TPLᐸTᐳ) SayHello() {}
";

    #[test]
    fn staged_resolves_forward_references() {
        let engine = run(FORWARD, Resolution::Staged);
        assert!(engine.diagnostics.is_empty(), "{:?}", engine.diagnostics);
        assert_eq!(keys(engine), ["TPLᐸintᐳ", "TPLᐸintᐳ.SayHello"]);
    }

    #[test]
    fn single_pass_drops_forward_references() {
        let engine = run(FORWARD, Resolution::SinglePass);
        assert_eq!(engine.diagnostics.len(), 1);
        assert!(matches!(
            &engine.diagnostics[0].kind,
            DiagnosticKind::UnresolvedTemplate { template, enclosing: Some(func), .. }
                if template == "TPL" && func == "main"
        ));
        assert!(keys(engine).is_empty());
    }

    #[test]
    fn single_pass_resolves_backward_references() {
        let src = "package main

type TPLᐸTᐳ struct {
	Value T
}

func (t TPLᐸTᐳ) Get() T { return t.Value }

var x = TPLᐸstringᐳ{}
";
        let engine = run(src, Resolution::SinglePass);
        assert!(engine.diagnostics.is_empty());
        assert_eq!(keys(engine), ["TPLᐸstringᐳ", "TPLᐸstringᐳ.Get"]);
    }

    #[test]
    fn method_before_template_is_deferred() {
        let src = "package main

func (t *TPLᐸTᐳ) First() {}

type TPLᐸTᐳ struct{}

func (t *TPLᐸTᐳ) Second() {}

var x TPLᐸboolᐳ
";
        for resolution in [Resolution::Staged, Resolution::SinglePass] {
            let engine = run(src, resolution);
            assert!(engine.diagnostics.is_empty());
            assert_eq!(
                keys(engine),
                ["TPLᐸboolᐳ", "TPLᐸboolᐳ.First", "TPLᐸboolᐳ.Second"]
            );
        }
    }

    #[test]
    fn single_pass_warns_on_method_after_usage() {
        let src = "package main

type BoxᐸTᐳ struct {
	V T
}

var b = Boxᐸintᐳ{}

func (x *BoxᐸTᐳ) Get() T { return x.V }
";
        let engine = run(src, Resolution::SinglePass);
        assert_eq!(engine.diagnostics.len(), 1);
        assert!(matches!(
            &engine.diagnostics[0].kind,
            DiagnosticKind::LateMethod { template, method, instances }
                if template == "Box" && method == "Get" && instances == &["Boxᐸintᐳ"]
        ));
        let at = src.find("Get").unwrap();
        assert_eq!(engine.diagnostics[0].span, Span::new(at, at + 3));
        assert_eq!(keys(engine), ["Boxᐸintᐳ"]);

        let staged = run(src, Resolution::Staged);
        assert!(staged.diagnostics.is_empty(), "{:?}", staged.diagnostics);
        assert_eq!(keys(staged), ["Boxᐸintᐳ", "Boxᐸintᐳ.Get"]);
    }

    #[test]
    fn template_bodies_are_not_usages() {
        let src = "package main

type ListᐸTᐳ struct {
	Next *ListᐸTᐳ
	Item T
}

func (l *ListᐸTᐳ) Push(v T) *ListᐸTᐳ { return &ListᐸTᐳ{Next: l, Item: v} }
";
        let engine = run(src, Resolution::Staged);
        assert!(engine.diagnostics.is_empty());
        assert!(keys(engine).is_empty());
    }

    #[test]
    fn duplicate_definition_warns_and_keeps_first() {
        let src = "package main

type BoxᐸTᐳ struct {
	A T
}

type BoxᐸUᐳ struct {
	B U
}

var b Boxᐸintᐳ
";
        let engine = run(src, Resolution::Staged);
        assert_eq!(engine.diagnostics.len(), 1);
        assert!(matches!(
            &engine.diagnostics[0].kind,
            DiagnosticKind::DuplicateDefinition { template, .. } if template == "Box"
        ));
        let template = engine.registry.lookup("Box").unwrap();
        assert_eq!(template.type_param, "T");
        assert_eq!(template.fields[0].names[0].name, "A");
    }

    #[test]
    fn orphan_method_warns() {
        let src = "package main

func (g GhostᐸTᐳ) Boo() {}
";
        let engine = run(src, Resolution::Staged);
        assert_eq!(engine.diagnostics.len(), 1);
        assert!(matches!(
            &engine.diagnostics[0].kind,
            DiagnosticKind::OrphanMethod { template, method } if template == "Ghost" && method == "Boo"
        ));
    }

    #[test]
    fn non_struct_template_is_unsupported() {
        let src = "package main

type IDᐸTᐳ []T

var x IDᐸintᐳ
";
        let engine = run(src, Resolution::Staged);
        let kinds: Vec<_> = engine.diagnostics.iter().map(|d| &d.kind).collect();
        assert!(matches!(
            kinds[0],
            DiagnosticKind::UnsupportedTemplate { name } if name == "IDᐸTᐳ"
        ));
        assert!(matches!(kinds[1], DiagnosticKind::UnresolvedTemplate { .. }));
    }

    #[test]
    fn unresolved_usage_does_not_stop_generation() {
        let src = "package main

type BoxᐸTᐳ struct {
	V T
}

var a = Missingᐸintᐳ{}
var b = Boxᐸintᐳ{}
";
        let engine = run(src, Resolution::Staged);
        assert_eq!(engine.diagnostics.len(), 1);
        assert!(matches!(
            &engine.diagnostics[0].kind,
            DiagnosticKind::UnresolvedTemplate { enclosing: None, .. }
        ));
        assert_eq!(keys(engine), ["Boxᐸintᐳ"]);
    }
}
