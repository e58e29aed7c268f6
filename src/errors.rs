use crate::generic::diagnostics::{Diagnostic, DiagnosticKind};
use crate::span::Span;
use codespan_reporting::diagnostic::{self, Label};
use codespan_reporting::files::SimpleFiles;
use codespan_reporting::term;
use codespan_reporting::term::termcolor::{ColorChoice, NoColor, StandardStream};

/// Lex-time error.
#[derive(Debug, Clone)]
pub struct LexError {
    pub kind: LexErrorKind,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub enum LexErrorKind {
    UnterminatedString,
    UnterminatedRawString,
    UnterminatedCharLiteral,
    UnterminatedComment,
    EmptyCharLiteral,
    InvalidEscapeSequence(String),
    InvalidCharacter(char),
}

impl std::fmt::Display for LexError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.kind {
            LexErrorKind::UnterminatedString => write!(f, "string literal not terminated"),
            LexErrorKind::UnterminatedRawString => write!(f, "raw string literal not terminated"),
            LexErrorKind::UnterminatedCharLiteral => write!(f, "rune literal not terminated"),
            LexErrorKind::UnterminatedComment => write!(f, "comment not terminated"),
            LexErrorKind::EmptyCharLiteral => write!(f, "empty rune literal"),
            LexErrorKind::InvalidEscapeSequence(s) => write!(f, "invalid escape sequence: {s}"),
            LexErrorKind::InvalidCharacter(c) => write!(f, "invalid character: '{c}'"),
        }
    }
}

/// Parse-time error.
#[derive(Debug, Clone)]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub enum ParseErrorKind {
    UnexpectedToken { expected: String, got: String },
    ExpectedExpression,
    ExpectedType,
    ExpectedStatement,
    ExpectedIdentifier,
    MissingPackageClause,
    /// Receiver lists must declare exactly one receiver.
    InvalidReceiver,
    /// A parameter list that mixes named and anonymous parameters.
    MixedParameters,
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.kind {
            ParseErrorKind::UnexpectedToken { expected, got } => {
                write!(f, "expected {expected}, found {got}")
            }
            ParseErrorKind::ExpectedExpression => write!(f, "expected expression"),
            ParseErrorKind::ExpectedType => write!(f, "expected type"),
            ParseErrorKind::ExpectedStatement => write!(f, "expected statement"),
            ParseErrorKind::ExpectedIdentifier => write!(f, "expected identifier"),
            ParseErrorKind::MissingPackageClause => {
                write!(f, "expected 'package' clause at start of file")
            }
            ParseErrorKind::InvalidReceiver => write!(f, "method has multiple receivers"),
            ParseErrorKind::MixedParameters => {
                write!(f, "mixed named and unnamed parameters")
            }
        }
    }
}

/// Failure of a whole run.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("cannot parse source: {}", describe_parse_failure(.lex, .parse))]
    Parse {
        lex: Vec<LexError>,
        parse: Vec<ParseError>,
    },

    #[error("cannot format source")]
    Format(#[source] std::io::Error),
}

fn describe_parse_failure(lex: &[LexError], parse: &[ParseError]) -> String {
    let first = lex
        .first()
        .map(ToString::to_string)
        .or_else(|| parse.first().map(ToString::to_string))
        .unwrap_or_else(|| "unknown error".to_string());
    match lex.len() + parse.len() {
        1 => first,
        n => format!("{first} (and {} more)", n - 1),
    }
}

/// Renders front-end errors and generation diagnostics with source snippets.
pub struct ErrorReporter {
    files: SimpleFiles<String, String>,
    file_id: usize,
}

impl ErrorReporter {
    pub fn new(filename: String, source: String) -> Self {
        let mut files = SimpleFiles::new();
        let file_id = files.add(filename, source);
        Self { files, file_id }
    }

    pub fn lex_diagnostic(&self, err: &LexError) -> diagnostic::Diagnostic<usize> {
        diagnostic::Diagnostic::error()
            .with_message(err.to_string())
            .with_labels(vec![Label::primary(
                self.file_id,
                err.span.start..err.span.end,
            )])
    }

    pub fn parse_diagnostic(&self, err: &ParseError) -> diagnostic::Diagnostic<usize> {
        diagnostic::Diagnostic::error()
            .with_message(err.to_string())
            .with_labels(vec![Label::primary(
                self.file_id,
                err.span.start..err.span.end,
            )])
    }

    pub fn generation_diagnostic(&self, diag: &Diagnostic) -> diagnostic::Diagnostic<usize> {
        let mut labels = vec![Label::primary(
            self.file_id,
            diag.span.start..diag.span.end,
        )];

        match &diag.kind {
            DiagnosticKind::DuplicateDefinition { original, .. } => {
                labels.push(
                    Label::secondary(self.file_id, original.start..original.end)
                        .with_message("first defined here"),
                );
            }
            DiagnosticKind::UnresolvedTemplate {
                enclosing: Some(func),
                ..
            } => {
                labels[0] = labels[0].clone().with_message(format!("used in `{func}`"));
            }
            _ => {}
        }

        let mut out = diagnostic::Diagnostic::warning()
            .with_message(diag.to_string())
            .with_labels(labels);
        match diag.kind {
            DiagnosticKind::UnresolvedTemplate { .. } => {
                out = out.with_notes(vec![
                    "no declaration is generated for this usage".to_string(),
                ]);
            }
            DiagnosticKind::LateMethod { .. } => {
                out = out.with_notes(vec![
                    "single-pass resolution only copies methods declared before the first usage"
                        .to_string(),
                ]);
            }
            _ => {}
        }
        out
    }

    pub fn report_lex_error(&self, err: &LexError) {
        self.emit(&self.lex_diagnostic(err));
    }

    pub fn report_parse_error(&self, err: &ParseError) {
        self.emit(&self.parse_diagnostic(err));
    }

    pub fn report_diagnostic(&self, diag: &Diagnostic) {
        self.emit(&self.generation_diagnostic(diag));
    }

    /// Report every error carried by a parse failure.
    pub fn report_error(&self, err: &Error) {
        match err {
            Error::Parse { lex, parse } => {
                for e in lex {
                    self.report_lex_error(e);
                }
                for e in parse {
                    self.report_parse_error(e);
                }
            }
            Error::Format(_) => {
                let diag = diagnostic::Diagnostic::error().with_message(err.to_string());
                self.emit(&diag);
            }
        }
    }

    /// Render a diagnostic as plain text.
    pub fn render(&self, diag: &diagnostic::Diagnostic<usize>) -> String {
        let mut writer = NoColor::new(Vec::new());
        let config = term::Config::default();
        let _ = term::emit(&mut writer, &config, &self.files, diag);
        String::from_utf8_lossy(&writer.into_inner()).into_owned()
    }

    fn emit(&self, diag: &diagnostic::Diagnostic<usize>) {
        let writer = StandardStream::stderr(ColorChoice::Auto);
        let config = term::Config::default();
        let _ = term::emit(&mut writer.lock(), &config, &self.files, diag);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_failure_message_counts_extra_errors() {
        let err = Error::Parse {
            lex: vec![LexError {
                kind: LexErrorKind::InvalidCharacter('$'),
                span: Span::new(0, 1),
            }],
            parse: vec![ParseError {
                kind: ParseErrorKind::ExpectedExpression,
                span: Span::new(2, 3),
            }],
        };
        assert_eq!(
            err.to_string(),
            "cannot parse source: invalid character: '$' (and 1 more)"
        );
    }

    #[test]
    fn render_points_at_source() {
        let reporter = ErrorReporter::new("main.go".into(), "package main\nvar x = $\n".into());
        let err = LexError {
            kind: LexErrorKind::InvalidCharacter('$'),
            span: Span::new(21, 22),
        };
        let text = reporter.render(&reporter.lex_diagnostic(&err));
        assert!(text.contains("invalid character: '$'"));
        assert!(text.contains("main.go:2:9"));
    }

    #[test]
    fn duplicate_definition_has_secondary_label() {
        let reporter = ErrorReporter::new(
            "dup.go".into(),
            "type AᐸTᐳ struct{}\ntype AᐸUᐳ struct{}\n".into(),
        );
        let diag = Diagnostic {
            kind: DiagnosticKind::DuplicateDefinition {
                template: "A".into(),
                original: Span::new(5, 13),
            },
            span: Span::new(28, 36),
        };
        let rendered = reporter.generation_diagnostic(&diag);
        assert_eq!(rendered.labels.len(), 2);
        assert!(reporter.render(&rendered).contains("first defined here"));
    }

    #[test]
    fn late_method_carries_note() {
        let source = "var b = Boxᐸintᐳ{}\nfunc (x *BoxᐸTᐳ) Get() {}\n";
        let reporter = ErrorReporter::new("late.go".into(), source.into());
        let at = source.find("Get").unwrap();
        let diag = Diagnostic {
            kind: DiagnosticKind::LateMethod {
                template: "Box".into(),
                method: "Get".into(),
                instances: vec!["Boxᐸintᐳ".into()],
            },
            span: Span::new(at, at + 3),
        };
        let rendered = reporter.generation_diagnostic(&diag);
        assert_eq!(rendered.notes.len(), 1);
        let text = reporter.render(&rendered);
        assert!(text.contains("method `Get` of template `Box` is missing from `Boxᐸintᐳ`"));
        assert!(text.contains("late.go:2:"));
    }
}
