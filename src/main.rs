use std::env;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process;

use stencil::errors::{Error, ErrorReporter};
use stencil::generic::{Options, Resolution};
use stencil::lexer::Lexer;
use tracing_subscriber::EnvFilter;

const USAGE: &str = "Usage: stencil <command> <file> [flags]";
const COMMANDS: &str = "Commands: lex, parse, fmt, gen";

/// Install the log subscriber. `RUST_LOG` wins over `-v` flags.
fn init_logging(verbosity: usize) {
    let level = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

/// Count of `v`s in `-v`, `-vv`, `-vvv` flags.
fn verbosity(args: &[String]) -> usize {
    args.iter()
        .filter(|a| a.len() > 1 && a.starts_with('-') && a[1..].chars().all(|c| c == 'v'))
        .map(|a| a.len() - 1)
        .sum()
}

/// Value following `flag`, if present.
fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.iter()
        .position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .map(String::as_str)
}

/// First argument after the command that is neither a flag nor a flag value.
fn input_file(args: &[String]) -> Option<&String> {
    let mut rest = args.iter().skip(2);
    while let Some(arg) = rest.next() {
        if arg == "-o" {
            rest.next();
        } else if !arg.starts_with('-') {
            return Some(arg);
        }
    }
    None
}

/// `dir/name.go` -> `dir/name.gen.go`
fn default_output(input: &Path) -> PathBuf {
    let dir = input.parent().unwrap_or(Path::new("."));
    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("output");
    dir.join(format!("{stem}.gen.go"))
}

fn fail(reporter: &ErrorReporter, err: &Error) -> ! {
    reporter.report_error(err);
    match err {
        Error::Parse { lex, parse } => {
            eprintln!("\n{} error(s) found", lex.len() + parse.len());
        }
        Error::Format(e) => eprintln!("Error: {e}"),
    }
    process::exit(1);
}

fn generate(filename: &str, source: &str, args: &[String]) {
    let options = Options {
        resolution: if args.iter().any(|a| a == "--single-pass") {
            Resolution::SinglePass
        } else {
            Resolution::Staged
        },
    };
    let reporter = ErrorReporter::new(filename.to_string(), source.to_string());

    let mut rendered = Vec::new();
    let report = stencil::process(source, &mut rendered, filename, &options)
        .unwrap_or_else(|e| fail(&reporter, &e));

    for diag in &report.diagnostics {
        reporter.report_diagnostic(diag);
    }
    if report.has_warnings() && args.iter().any(|a| a == "--deny-warnings") {
        eprintln!("\n{} warning(s) denied", report.diagnostics.len());
        process::exit(1);
    }

    if args.iter().any(|a| a == "--stdout") {
        if let Err(e) = io::stdout().write_all(&rendered) {
            eprintln!("Error writing output: {e}");
            process::exit(1);
        }
        return;
    }

    let out_path = flag_value(args, "-o")
        .map(PathBuf::from)
        .unwrap_or_else(|| default_output(Path::new(filename)));
    if let Err(e) = fs::write(&out_path, &rendered) {
        eprintln!("Error writing {}: {e}", out_path.display());
        process::exit(1);
    }
    println!(
        "Generated {} declaration(s): {}",
        report.generated.len(),
        out_path.display()
    );
}

fn main() {
    let args: Vec<String> = env::args().collect();

    if args.len() < 3 {
        eprintln!("{USAGE}");
        eprintln!("{COMMANDS}");
        process::exit(1);
    }

    init_logging(verbosity(&args));

    let command = &args[1];
    let filename = input_file(&args).unwrap_or_else(|| {
        eprintln!("{USAGE}");
        process::exit(1);
    });

    let source = match fs::read_to_string(filename) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error reading {filename}: {e}");
            process::exit(1);
        }
    };

    match command.as_str() {
        "lex" => {
            let mut lexer = Lexer::new(&source);
            for spanned_token in lexer.by_ref() {
                println!(
                    "  [{:>4}..{:<4}] {:?}",
                    spanned_token.span.start, spanned_token.span.end, spanned_token.node
                );
            }
            if !lexer.errors.is_empty() {
                let reporter = ErrorReporter::new(filename.clone(), source.clone());
                for err in &lexer.errors {
                    reporter.report_lex_error(err);
                }
                eprintln!("\n{} error(s) found", lexer.errors.len());
                process::exit(1);
            }
        }
        "parse" => match stencil::parse(&source) {
            Ok(file) => println!("{file:#?}"),
            Err(e) => {
                let reporter = ErrorReporter::new(filename.clone(), source.clone());
                fail(&reporter, &e);
            }
        },
        "fmt" => {
            let formatted = stencil::formatter::format_source(&source).unwrap_or_else(|e| {
                let reporter = ErrorReporter::new(filename.clone(), source.clone());
                fail(&reporter, &e)
            });
            if args.iter().any(|a| a == "--in-place" || a == "-i") {
                if let Err(e) = fs::write(filename, &formatted) {
                    eprintln!("Error writing {filename}: {e}");
                    process::exit(1);
                }
            } else {
                print!("{formatted}");
            }
        }
        "gen" => generate(filename, &source, &args),
        _ => {
            eprintln!("Unknown command: {command}");
            eprintln!("{COMMANDS}");
            process::exit(1);
        }
    }
}
