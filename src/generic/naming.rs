//! The `NameᐸArgᐳ` naming convention.
//!
//! A template is declared as a struct named `NameᐸPᐳ`, where `P` is its type
//! parameter, and referenced as `NameᐸArgᐳ`. The markers are the Canadian
//! syllabics `ᐸ` (U+1438) and `ᐳ` (U+1433), which Go accepts as identifier
//! letters, so the source stays valid Go.

use regex::Regex;
use std::sync::OnceLock;

pub const TEMPLATE_OPEN: char = '\u{1438}';
pub const TEMPLATE_CLOSE: char = '\u{1433}';

/// A template name decomposed into its parts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TemplateRef<'a> {
    pub template: &'a str,
    pub arg: &'a str,
}

fn template_regex() -> &'static Regex {
    static TEMPLATE_NAME: OnceLock<Regex> = OnceLock::new();
    TEMPLATE_NAME.get_or_init(|| {
        // The markers are letters themselves, so they are excluded from the parts
        Regex::new(
            r"^([[\p{L}\p{Nd}]--[\x{1438}\x{1433}]]+)\x{1438}([[\p{L}\p{Nd}]--[\x{1438}\x{1433}]]+)\x{1433}$",
        )
        .expect("template name regex")
    })
}

/// Decompose `NameᐸArgᐳ`. Both parts must be non-empty runs of letters and
/// decimal digits; anything else is an ordinary identifier.
pub fn parse(ident: &str) -> Option<TemplateRef<'_>> {
    let caps = template_regex().captures(ident)?;
    Some(TemplateRef {
        template: caps.get(1)?.as_str(),
        arg: caps.get(2)?.as_str(),
    })
}

/// Name of the concrete type generated for `template` applied to `arg`.
pub fn concrete_name(template: &str, arg: &str) -> String {
    format!("{template}{TEMPLATE_OPEN}{arg}{TEMPLATE_CLOSE}")
}

impl TemplateRef<'_> {
    pub fn concrete_name(&self) -> String {
        concrete_name(self.template, self.arg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decomposes_template_usage() {
        assert_eq!(
            parse("TPLᐸintᐳ"),
            Some(TemplateRef {
                template: "TPL",
                arg: "int"
            })
        );
        assert_eq!(parse("Pairᐸfloat32ᐳ").map(|r| r.arg), Some("float32"));
    }

    #[test]
    fn accepts_unicode_letters_and_digits() {
        assert_eq!(
            parse("Kö2ᐸ日本ᐳ"),
            Some(TemplateRef {
                template: "Kö2",
                arg: "日本"
            })
        );
    }

    #[test]
    fn rejects_ordinary_and_malformed_names() {
        for name in [
            "main",
            "TPL",
            "ᐸintᐳ",
            "TPLᐸᐳ",
            "TPLᐸint",
            "TPLintᐳ",
            "TPLᐸintᐳx",
            "xTPLᐸintᐳᐳ",
            "my_tplᐸintᐳ",
            "TPLᐸaᐳᐸbᐳ",
        ] {
            assert_eq!(parse(name), None, "{name} should not match");
        }
    }

    #[test]
    fn concrete_name_round_trips() {
        let name = concrete_name("TPL", "int");
        assert_eq!(name, "TPLᐸintᐳ");
        assert_eq!(parse(&name).map(|r| r.concrete_name()), Some(name.clone()));
    }
}
