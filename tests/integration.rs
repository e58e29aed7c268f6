use std::fs;
use std::path::PathBuf;
use std::process::{Command, Output};

use stencil::errors::Error;
use stencil::formatter::format_source;
use stencil::generic::{DiagnosticKind, Options, Resolution};

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
}

fn read_fixture(name: &str) -> String {
    let path = fixture(name);
    fs::read_to_string(&path).unwrap_or_else(|e| panic!("{}: {e}", path.display()))
}

/// Run the library on a fixture, returning the rendered output and report.
fn generate(name: &str, resolution: Resolution) -> (String, stencil::Report) {
    let source = read_fixture(name);
    let mut out = Vec::new();
    let report = stencil::process(&source, &mut out, name, &Options { resolution })
        .unwrap_or_else(|e| panic!("{name}: {e}"));
    (String::from_utf8(out).unwrap(), report)
}

fn stencil(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_stencil"))
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("failed to run stencil")
}

// ══════════════════════════════════════════════════════════════
// Library
// ══════════════════════════════════════════════════════════════

#[test]
fn template_usages_generate_each_type_once() {
    let (out, report) = generate("tpl.go", Resolution::Staged);
    assert!(report.diagnostics.is_empty(), "{:?}", report.diagnostics);
    assert_eq!(
        report.generated,
        [
            "TPLᐸintᐳ",
            "TPLᐸintᐳ.SayHello",
            "TPLᐸfloat32ᐳ",
            "TPLᐸfloat32ᐳ.SayHello"
        ]
    );
    assert_eq!(out, read_fixture("tpl.gen.go"));
}

#[test]
fn input_declarations_are_not_copied() {
    let (out, _) = generate("tpl.go", Resolution::Staged);
    assert!(!out.contains("func main"));
    assert!(!out.contains("type T struct"));
    assert!(!out.contains("TPLᐸTᐳ"));
    assert_eq!(out.matches("SayHello()").count(), 2);
}

#[test]
fn staged_resolution_handles_forward_references() {
    let (out, report) = generate("forward.go", Resolution::Staged);
    assert!(report.diagnostics.is_empty(), "{:?}", report.diagnostics);
    assert_eq!(out, read_fixture("forward.gen.go"));
}

#[test]
fn single_pass_reports_forward_references() {
    let (out, report) = generate("forward.go", Resolution::SinglePass);
    assert!(report.generated.is_empty());
    assert_eq!(report.diagnostics.len(), 2);
    assert!(report.diagnostics.iter().all(|d| matches!(
        &d.kind,
        DiagnosticKind::UnresolvedTemplate { template, enclosing: Some(func), .. }
            if template == "Pair" && func == "main"
    )));
    assert_eq!(out, "package main\n\nimport \"fmt\"\n");
}

#[test]
fn generated_output_is_already_formatted() {
    for name in ["tpl.go", "forward.go"] {
        let (out, _) = generate(name, Resolution::Staged);
        assert_eq!(format_source(&out).unwrap(), out, "{name}");
    }
}

#[test]
fn fixtures_are_formatted() {
    for name in ["tpl.go", "forward.go"] {
        let source = read_fixture(name);
        assert_eq!(format_source(&source).unwrap(), source, "{name}");
    }
}

#[test]
fn parse_errors_abort_generation() {
    let source = read_fixture("broken.go");
    let mut out = Vec::new();
    let err = stencil::process(&source, &mut out, "broken.go", &Options::default()).unwrap_err();
    assert!(matches!(err, Error::Parse { ref parse, .. } if !parse.is_empty()));
    assert!(out.is_empty());
}

// ══════════════════════════════════════════════════════════════
// Binary
// ══════════════════════════════════════════════════════════════

#[test]
fn gen_to_stdout() {
    let path = fixture("tpl.go");
    let output = stencil(&["gen", path.to_str().unwrap(), "--stdout"]);
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    assert_eq!(
        String::from_utf8_lossy(&output.stdout),
        read_fixture("tpl.gen.go")
    );
}

#[test]
fn gen_to_output_file() {
    let path = fixture("forward.go");
    let out_path = std::env::temp_dir().join(format!("stencil-{}.gen.go", std::process::id()));
    let output = stencil(&["gen", path.to_str().unwrap(), "-o", out_path.to_str().unwrap()]);
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let written = fs::read_to_string(&out_path).unwrap();
    let _ = fs::remove_file(&out_path);
    assert_eq!(written, read_fixture("forward.gen.go"));
    assert!(String::from_utf8_lossy(&output.stdout).contains("4 declaration(s)"));
}

#[test]
fn deny_warnings_fails_on_unresolved_usage() {
    let path = fixture("forward.go");
    let path = path.to_str().unwrap();

    let lenient = stencil(&["gen", path, "--single-pass", "--stdout"]);
    assert!(lenient.status.success());
    assert!(String::from_utf8_lossy(&lenient.stderr).contains("undefined template `Pair`"));

    let strict = stencil(&["gen", path, "--single-pass", "--stdout", "--deny-warnings"]);
    assert!(!strict.status.success());
    assert!(String::from_utf8_lossy(&strict.stderr).contains("warning(s) denied"));
}

#[test]
fn fmt_prints_canonical_source() {
    let path = fixture("tpl.go");
    let output = stencil(&["fmt", path.to_str().unwrap()]);
    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout), read_fixture("tpl.go"));
}

#[test]
fn parse_errors_exit_non_zero() {
    let path = fixture("broken.go");
    let output = stencil(&["gen", path.to_str().unwrap(), "--stdout"]);
    assert!(!output.status.success());
    assert!(output.stdout.is_empty());
    assert!(String::from_utf8_lossy(&output.stderr).contains("error(s) found"));
}

#[test]
fn missing_arguments_print_usage() {
    let output = stencil(&["gen"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Usage: stencil"));
}
