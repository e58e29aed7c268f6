//! Template instantiation.
//!
//! A struct declared as `NameᐸPᐳ` is a template with type parameter `P`, and
//! every identifier `NameᐸArgᐳ` elsewhere in the file is a usage of it. For
//! each distinct usage the engine emits a concrete struct named `NameᐸArgᐳ`
//! with `P` substituted in its fields, plus a copy of every method declared on
//! the template with the receiver retargeted.

pub mod assemble;
pub mod diagnostics;
pub mod instantiate;
pub mod naming;
pub mod registry;
pub mod visitor;
pub mod walk;

pub use assemble::assemble;
pub use diagnostics::{Diagnostic, DiagnosticKind};
pub use registry::{GenericTemplate, RegistryError, TemplateRegistry};

use crate::parser::ast::{Decl, File};
use indexmap::IndexMap;
use tracing::info;
use visitor::Engine;

/// When usages are resolved relative to template definitions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Resolution {
    /// Collect every template first, then resolve usages. Forward references
    /// work.
    #[default]
    Staged,
    /// One walk in source order. A usage resolves only against templates
    /// defined above it.
    SinglePass,
}

#[derive(Debug, Clone, Default)]
pub struct Options {
    pub resolution: Resolution,
}

/// Result of one generation run.
#[derive(Debug, Default)]
pub struct Generated {
    /// `NameᐸArgᐳ` and `NameᐸArgᐳ.Method`, in discovery order.
    pub decls: IndexMap<String, Decl>,
    pub diagnostics: Vec<Diagnostic>,
}

impl Generated {
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.decls.keys().map(String::as_str)
    }
}

pub fn generate(file: &File, options: &Options) -> Generated {
    let mut engine = Engine::new();
    engine.run(file, options.resolution);
    info!(
        templates = engine.registry.len(),
        generated = engine.generated.len(),
        diagnostics = engine.diagnostics.len(),
        "generation finished"
    );
    Generated {
        decls: engine.generated.into_decls(),
        diagnostics: engine.diagnostics,
    }
}
