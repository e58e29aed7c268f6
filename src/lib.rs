//! Monomorphization of name-encoded Go templates.
//!
//! A Go struct named `BoxᐸTᐳ` is a template, and `Boxᐸintᐳ` anywhere in the
//! same file is a usage of it. [`process`] reads one file and writes a new one
//! holding the package clause, the leading imports and one concrete
//! declaration per usage.

pub mod errors;
pub mod formatter;
pub mod generic;
pub mod lexer;
pub mod parser;
pub mod span;

use crate::errors::Error;
use crate::formatter::Printer;
use crate::generic::{Diagnostic, Options};
use crate::parser::ast::File;
use crate::parser::Parser;
use crate::span::{LineIndex, Spanned};
use std::io::Write;
use tracing::info;

/// Outcome of a successful [`process`] run.
#[derive(Debug)]
pub struct Report {
    pub filename: String,
    /// Keys of the generated declarations, in output order.
    pub generated: Vec<String>,
    pub diagnostics: Vec<Diagnostic>,
}

impl Report {
    pub fn has_warnings(&self) -> bool {
        !self.diagnostics.is_empty()
    }
}

/// Parse `source` into a tree, failing on any lex or parse error.
pub fn parse(source: &str) -> Result<File, Error> {
    parse_with_comments(source).map(|(file, _)| file)
}

/// Like [`parse`], also returning the comments not attached to any node.
pub fn parse_with_comments(source: &str) -> Result<(File, Vec<Spanned<String>>), Error> {
    let mut parser = Parser::new(source);
    let file = parser.parse_file();
    if parser.has_errors() {
        return Err(Error::Parse {
            lex: parser.lex_errors,
            parse: parser.errors,
        });
    }
    let comments = parser.take_comments();
    Ok((file, comments))
}

/// Generate the concrete declarations for `source` and write the resulting
/// Go file to `out`.
pub fn process(
    source: &str,
    out: &mut impl Write,
    filename: &str,
    options: &Options,
) -> Result<Report, Error> {
    let file = parse(source)?;
    let generated = generic::generate(&file, options);
    let output = generic::assemble(&file, &generated);

    let text = Printer::new(Vec::new())
        .with_lines(LineIndex::new(source))
        .print(&output);
    out.write_all(text.as_bytes()).map_err(Error::Format)?;

    info!(
        file = filename,
        generated = generated.decls.len(),
        warnings = generated.diagnostics.len(),
        "processed"
    );
    Ok(Report {
        filename: filename.to_string(),
        generated: generated.keys().map(str::to_string).collect(),
        diagnostics: generated.diagnostics,
    })
}
