use logos::Logos;
use std::fmt;

/// Raw tokens produced by the logos lexer.
/// Strings, runes, comments and newlines never reach logos; the outer lexer
/// scans those by hand so it can track line ends for semicolon insertion.
#[derive(Logos, Debug, Clone, Copy, PartialEq)]
#[logos(skip r"[ \t\r\f]+")]
pub enum RawToken {
    // ── Numeric Literals ─────────────────────────────────────
    #[regex(r"([0-9][0-9_]*(\.[0-9_]*)?([eE][+-]?[0-9_]+)?|\.[0-9][0-9_]*([eE][+-]?[0-9_]+)?)i")]
    #[regex(r"0[xX][0-9a-fA-F_]*(\.[0-9a-fA-F_]*)?[pP][+-]?[0-9_]+i")]
    ImagLiteral,

    #[regex(r"[0-9][0-9_]*\.[0-9_]*([eE][+-]?[0-9_]+)?")]
    #[regex(r"\.[0-9][0-9_]*([eE][+-]?[0-9_]+)?")]
    #[regex(r"[0-9][0-9_]*[eE][+-]?[0-9_]+")]
    #[regex(r"0[xX][0-9a-fA-F_]*(\.[0-9a-fA-F_]*)?[pP][+-]?[0-9_]+")]
    FloatLiteral,

    #[regex(r"0[xX][0-9a-fA-F_]+")]
    #[regex(r"0[oO][0-7_]+")]
    #[regex(r"0[bB][01_]+")]
    #[regex(r"[0-9][0-9_]*")]
    IntLiteral,

    // ── Multi-char operators (longest match first) ───────────
    #[token("...")]
    Ellipsis,
    #[token("&^=")]
    AndNotEq,
    #[token("<<=")]
    ShlEq,
    #[token(">>=")]
    ShrEq,
    #[token("&^")]
    AndNot,
    #[token("<<")]
    Shl,
    #[token(">>")]
    Shr,
    #[token("+=")]
    PlusEq,
    #[token("-=")]
    MinusEq,
    #[token("*=")]
    StarEq,
    #[token("/=")]
    SlashEq,
    #[token("%=")]
    PercentEq,
    #[token("&=")]
    AmpEq,
    #[token("|=")]
    PipeEq,
    #[token("^=")]
    CaretEq,
    #[token("&&")]
    AndAnd,
    #[token("||")]
    OrOr,
    #[token("<-")]
    Arrow,
    #[token("++")]
    Inc,
    #[token("--")]
    Dec,
    #[token("==")]
    EqEq,
    #[token("!=")]
    BangEq,
    #[token("<=")]
    LtEq,
    #[token(">=")]
    GtEq,
    #[token(":=")]
    Define,

    // ── Single-char operators & delimiters ────────────────────
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("%")]
    Percent,
    #[token("&")]
    Amp,
    #[token("|")]
    Pipe,
    #[token("^")]
    Caret,
    #[token("<")]
    Lt,
    #[token(">")]
    Gt,
    #[token("=")]
    Eq,
    #[token("!")]
    Bang,
    #[token("~")]
    Tilde,
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token(",")]
    Comma,
    #[token(";")]
    Semicolon,
    #[token(".")]
    Dot,
    #[token(":")]
    Colon,

    // ── Identifier (keywords are split out afterwards) ───────
    #[regex(r"[\p{L}_][\p{L}\p{Nd}_]*", priority = 1)]
    Identifier,
}

/// Go keywords, recognized from identifiers after lexing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Keyword {
    Break,
    Case,
    Chan,
    Const,
    Continue,
    Default,
    Defer,
    Else,
    Fallthrough,
    For,
    Func,
    Go,
    Goto,
    If,
    Import,
    Interface,
    Map,
    Package,
    Range,
    Return,
    Select,
    Struct,
    Switch,
    Type,
    Var,
}

impl Keyword {
    /// Try to match a string to a keyword. Returns None for regular identifiers.
    pub fn from_str(s: &str) -> Option<Keyword> {
        match s {
            "break" => Some(Keyword::Break),
            "case" => Some(Keyword::Case),
            "chan" => Some(Keyword::Chan),
            "const" => Some(Keyword::Const),
            "continue" => Some(Keyword::Continue),
            "default" => Some(Keyword::Default),
            "defer" => Some(Keyword::Defer),
            "else" => Some(Keyword::Else),
            "fallthrough" => Some(Keyword::Fallthrough),
            "for" => Some(Keyword::For),
            "func" => Some(Keyword::Func),
            "go" => Some(Keyword::Go),
            "goto" => Some(Keyword::Goto),
            "if" => Some(Keyword::If),
            "import" => Some(Keyword::Import),
            "interface" => Some(Keyword::Interface),
            "map" => Some(Keyword::Map),
            "package" => Some(Keyword::Package),
            "range" => Some(Keyword::Range),
            "return" => Some(Keyword::Return),
            "select" => Some(Keyword::Select),
            "struct" => Some(Keyword::Struct),
            "switch" => Some(Keyword::Switch),
            "type" => Some(Keyword::Type),
            "var" => Some(Keyword::Var),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Keyword::Break => "break",
            Keyword::Case => "case",
            Keyword::Chan => "chan",
            Keyword::Const => "const",
            Keyword::Continue => "continue",
            Keyword::Default => "default",
            Keyword::Defer => "defer",
            Keyword::Else => "else",
            Keyword::Fallthrough => "fallthrough",
            Keyword::For => "for",
            Keyword::Func => "func",
            Keyword::Go => "go",
            Keyword::Goto => "goto",
            Keyword::If => "if",
            Keyword::Import => "import",
            Keyword::Interface => "interface",
            Keyword::Map => "map",
            Keyword::Package => "package",
            Keyword::Range => "range",
            Keyword::Return => "return",
            Keyword::Select => "select",
            Keyword::Struct => "struct",
            Keyword::Switch => "switch",
            Keyword::Type => "type",
            Keyword::Var => "var",
        }
    }
}

impl fmt::Display for Keyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "'{}'", self.as_str())
    }
}

/// Kind of a basic literal. The literal's source text is kept verbatim.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LitKind {
    Int,
    Float,
    Imag,
    Char,
    String,
}

/// The final token type emitted by the lexer.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    // Keywords and identifiers
    Keyword(Keyword),
    Identifier(String),

    // Literals, as written in the source
    Literal(LitKind, String),

    // Operators
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Amp,
    Pipe,
    Caret,
    Shl,
    Shr,
    AndNot,
    PlusEq,
    MinusEq,
    StarEq,
    SlashEq,
    PercentEq,
    AmpEq,
    PipeEq,
    CaretEq,
    ShlEq,
    ShrEq,
    AndNotEq,
    AndAnd,
    OrOr,
    Arrow,
    Inc,
    Dec,
    EqEq,
    BangEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    Eq,
    Define,
    Bang,
    Tilde,
    Ellipsis,

    // Delimiters
    LParen,
    RParen,
    LBracket,
    RBracket,
    LBrace,
    RBrace,
    Comma,
    Dot,
    Colon,
    /// Explicit `;` or one inserted at a line end.
    Semicolon,

    // Comments, including the `//` or `/* */` markers
    Comment(String),

    // End of file
    Eof,

    // Error recovery
    Error(String),
}

impl Token {
    /// Whether a line break directly after this token ends the statement.
    pub fn ends_statement(&self) -> bool {
        matches!(
            self,
            Token::Identifier(_)
                | Token::Literal(..)
                | Token::Keyword(
                    Keyword::Break | Keyword::Continue | Keyword::Fallthrough | Keyword::Return
                )
                | Token::Inc
                | Token::Dec
                | Token::RParen
                | Token::RBracket
                | Token::RBrace
        )
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Keyword(kw) => write!(f, "{kw}"),
            Token::Identifier(name) => write!(f, "identifier '{name}'"),
            Token::Literal(LitKind::Int, s) => write!(f, "integer {s}"),
            Token::Literal(LitKind::Float, s) => write!(f, "float {s}"),
            Token::Literal(LitKind::Imag, s) => write!(f, "imaginary {s}"),
            Token::Literal(LitKind::Char, s) => write!(f, "rune {s}"),
            Token::Literal(LitKind::String, _) => write!(f, "string"),
            Token::Plus => write!(f, "'+'"),
            Token::Minus => write!(f, "'-'"),
            Token::Star => write!(f, "'*'"),
            Token::Slash => write!(f, "'/'"),
            Token::Percent => write!(f, "'%'"),
            Token::Amp => write!(f, "'&'"),
            Token::Pipe => write!(f, "'|'"),
            Token::Caret => write!(f, "'^'"),
            Token::Shl => write!(f, "'<<'"),
            Token::Shr => write!(f, "'>>'"),
            Token::AndNot => write!(f, "'&^'"),
            Token::PlusEq => write!(f, "'+='"),
            Token::MinusEq => write!(f, "'-='"),
            Token::StarEq => write!(f, "'*='"),
            Token::SlashEq => write!(f, "'/='"),
            Token::PercentEq => write!(f, "'%='"),
            Token::AmpEq => write!(f, "'&='"),
            Token::PipeEq => write!(f, "'|='"),
            Token::CaretEq => write!(f, "'^='"),
            Token::ShlEq => write!(f, "'<<='"),
            Token::ShrEq => write!(f, "'>>='"),
            Token::AndNotEq => write!(f, "'&^='"),
            Token::AndAnd => write!(f, "'&&'"),
            Token::OrOr => write!(f, "'||'"),
            Token::Arrow => write!(f, "'<-'"),
            Token::Inc => write!(f, "'++'"),
            Token::Dec => write!(f, "'--'"),
            Token::EqEq => write!(f, "'=='"),
            Token::BangEq => write!(f, "'!='"),
            Token::Lt => write!(f, "'<'"),
            Token::LtEq => write!(f, "'<='"),
            Token::Gt => write!(f, "'>'"),
            Token::GtEq => write!(f, "'>='"),
            Token::Eq => write!(f, "'='"),
            Token::Define => write!(f, "':='"),
            Token::Bang => write!(f, "'!'"),
            Token::Tilde => write!(f, "'~'"),
            Token::Ellipsis => write!(f, "'...'"),
            Token::LParen => write!(f, "'('"),
            Token::RParen => write!(f, "')'"),
            Token::LBracket => write!(f, "'['"),
            Token::RBracket => write!(f, "']'"),
            Token::LBrace => write!(f, "'{{'"),
            Token::RBrace => write!(f, "'}}'"),
            Token::Comma => write!(f, "','"),
            Token::Dot => write!(f, "'.'"),
            Token::Colon => write!(f, "':'"),
            Token::Semicolon => write!(f, "';'"),
            Token::Comment(_) => write!(f, "comment"),
            Token::Eof => write!(f, "end of file"),
            Token::Error(msg) => write!(f, "error: {msg}"),
        }
    }
}
