pub mod token;

use crate::errors::{LexError, LexErrorKind};
use crate::span::{Span, Spanned};
use logos::Logos;
use std::collections::VecDeque;
use token::{Keyword, LitKind, RawToken, Token};

/// Lexer for Go source code.
///
/// Wraps the logos-based raw tokenizer and performs Go's automatic semicolon
/// insertion: a line break after an identifier, a literal, one of the keywords
/// `break continue fallthrough return`, `++`, `--`, or a closing bracket ends
/// the statement. Strings, runes and comments are scanned by hand.
pub struct Lexer<'src> {
    source: &'src str,
    /// Current byte offset in source.
    pos: usize,
    /// Buffered tokens to emit before scanning further.
    pending: VecDeque<Spanned<Token>>,
    /// Whether a line break at this point inserts a semicolon.
    insert_semi: bool,
    /// Whether we've finished scanning all input.
    finished: bool,
    /// Collected errors.
    pub errors: Vec<LexError>,
}

impl<'src> Lexer<'src> {
    pub fn new(source: &'src str) -> Self {
        Self {
            source,
            // A leading byte order mark is not part of the token stream.
            pos: if source.starts_with('\u{feff}') { '\u{feff}'.len_utf8() } else { 0 },
            pending: VecDeque::new(),
            insert_semi: false,
            finished: false,
            errors: Vec::new(),
        }
    }

    fn push(&mut self, tok: Token, span: Span) {
        match &tok {
            Token::Comment(_) => {}
            other => self.insert_semi = other.ends_statement(),
        }
        self.pending.push_back(Spanned::new(tok, span));
    }

    /// Emit an automatic semicolon if the previous token asks for one.
    fn line_break(&mut self, at: usize) {
        if self.insert_semi {
            self.insert_semi = false;
            self.pending
                .push_back(Spanned::new(Token::Semicolon, Span::new(at, at + 1)));
        }
    }

    /// Emit EOF: a final automatic semicolon if needed, then the EOF token.
    fn emit_eof(&mut self) {
        if self.finished {
            return;
        }
        self.finished = true;
        let eof_pos = self.source.len();
        if self.insert_semi {
            self.insert_semi = false;
            self.pending
                .push_back(Spanned::new(Token::Semicolon, Span::new(eof_pos, eof_pos)));
        }
        self.pending
            .push_back(Spanned::new(Token::Eof, Span::new(eof_pos, eof_pos)));
    }

    /// Scan up to and including the next line break (or a multi-line
    /// construct such as a raw string), emitting tokens into `self.pending`.
    fn scan_line(&mut self) {
        let bytes = self.source.as_bytes();
        let mut i = self.pos;

        while i < bytes.len() {
            match bytes[i] {
                b'\n' => {
                    self.line_break(i);
                    self.pos = i + 1;
                    return;
                }
                b' ' | b'\t' | b'\r' => i += 1,

                // Line comment: the line break it hides still ends the statement
                b'/' if bytes.get(i + 1) == Some(&b'/') => {
                    let start = i;
                    while i < bytes.len() && bytes[i] != b'\n' {
                        i += 1;
                    }
                    self.line_break(start);
                    let text = self.source[start..i].trim_end().to_string();
                    self.push(Token::Comment(text), Span::new(start, i));
                }

                b'/' if bytes.get(i + 1) == Some(&b'*') => {
                    let start = i;
                    match self.source[i + 2..].find("*/") {
                        Some(off) => {
                            i = i + 2 + off + 2;
                            let text = &self.source[start..i];
                            if text.contains('\n') {
                                self.line_break(start);
                            }
                            self.push(Token::Comment(text.to_string()), Span::new(start, i));
                        }
                        None => {
                            self.errors.push(LexError {
                                kind: LexErrorKind::UnterminatedComment,
                                span: Span::new(start, bytes.len()),
                            });
                            i = bytes.len();
                        }
                    }
                }

                b'"' => {
                    let end = self.scan_quoted(i, b'"');
                    let span = Span::new(i, end);
                    let text = self.source[i..end].to_string();
                    self.push(Token::Literal(LitKind::String, text), span);
                    i = end;
                }

                b'\'' => {
                    let end = self.scan_quoted(i, b'\'');
                    let span = Span::new(i, end);
                    let text = self.source[i..end].to_string();
                    self.push(Token::Literal(LitKind::Char, text), span);
                    i = end;
                }

                // Raw strings may span lines
                b'`' => {
                    let start = i;
                    match self.source[i + 1..].find('`') {
                        Some(off) => {
                            i = i + 1 + off + 1;
                            let text = self.source[start..i].to_string();
                            self.push(Token::Literal(LitKind::String, text), Span::new(start, i));
                        }
                        None => {
                            self.errors.push(LexError {
                                kind: LexErrorKind::UnterminatedRawString,
                                span: Span::new(start, bytes.len()),
                            });
                            i = bytes.len();
                        }
                    }
                }

                // Everything else: feed the run up to the next hand-scanned
                // construct to logos
                _ => {
                    let seg_start = i;
                    while i < bytes.len()
                        && !matches!(bytes[i], b'\n' | b'"' | b'\'' | b'`')
                        && !(bytes[i] == b'/' && matches!(bytes.get(i + 1), Some(b'/' | b'*')))
                    {
                        i += 1;
                    }
                    self.tokenize_segment(seg_start, i);
                }
            }
        }

        self.pos = i;
        self.emit_eof();
    }

    fn tokenize_segment(&mut self, seg_start: usize, seg_end: usize) {
        let segment = &self.source[seg_start..seg_end];
        let mut lex = RawToken::lexer(segment);
        while let Some(raw_result) = lex.next() {
            let slice = lex.slice();
            let span = Span::new(seg_start + lex.span().start, seg_start + lex.span().end);
            match raw_result {
                Ok(raw) => {
                    let tok = convert_raw_token(raw, slice);
                    self.push(tok, span);
                }
                Err(()) => {
                    if let Some(c) = slice.chars().next() {
                        self.errors.push(LexError {
                            kind: LexErrorKind::InvalidCharacter(c),
                            span,
                        });
                    }
                }
            }
        }
    }

    /// Scan an interpreted string or rune literal starting at `start`.
    /// Returns the end offset (past the closing quote, or at the line end if
    /// unterminated).
    fn scan_quoted(&mut self, start: usize, quote: u8) -> usize {
        let bytes = self.source.as_bytes();
        let mut i = start + 1;
        while i < bytes.len() {
            match bytes[i] {
                b'\n' => break,
                b'\\' => {
                    i = self.scan_escape(i, quote);
                }
                b if b == quote => {
                    if quote == b'\'' && i == start + 1 {
                        self.errors.push(LexError {
                            kind: LexErrorKind::EmptyCharLiteral,
                            span: Span::new(start, i + 1),
                        });
                    }
                    return i + 1;
                }
                _ => i += 1,
            }
        }
        let kind = if quote == b'"' {
            LexErrorKind::UnterminatedString
        } else {
            LexErrorKind::UnterminatedCharLiteral
        };
        self.errors.push(LexError {
            kind,
            span: Span::new(start, i),
        });
        i
    }

    /// Validate one escape sequence at `i` (pointing at the backslash).
    /// Returns the offset just past it.
    fn scan_escape(&mut self, i: usize, quote: u8) -> usize {
        let bytes = self.source.as_bytes();
        let Some(&c) = bytes.get(i + 1) else {
            return i + 1;
        };
        let (digits, radix) = match c {
            b'a' | b'b' | b'f' | b'n' | b'r' | b't' | b'v' | b'\\' => return i + 2,
            c if c == quote => return i + 2,
            b'x' => (2, 16),
            b'u' => (4, 16),
            b'U' => (8, 16),
            b'0'..=b'7' => (3, 8),
            b'\n' => return i + 1,
            _ => {
                let end = i + 1 + self.source[i + 1..].chars().next().map_or(1, char::len_utf8);
                self.errors.push(LexError {
                    kind: LexErrorKind::InvalidEscapeSequence(self.source[i..end].to_string()),
                    span: Span::new(i, end),
                });
                return end;
            }
        };
        let body_start = if radix == 8 { i + 1 } else { i + 2 };
        let mut j = body_start;
        while j < body_start + digits
            && j < bytes.len()
            && (bytes[j] as char).is_digit(radix)
        {
            j += 1;
        }
        if j - body_start != digits {
            self.errors.push(LexError {
                kind: LexErrorKind::InvalidEscapeSequence(self.source[i..j].to_string()),
                span: Span::new(i, j),
            });
        }
        j
    }
}

/// Convert a raw token + its slice into a final Token.
fn convert_raw_token(raw: RawToken, slice: &str) -> Token {
    match raw {
        RawToken::IntLiteral => Token::Literal(LitKind::Int, slice.to_string()),
        RawToken::FloatLiteral => Token::Literal(LitKind::Float, slice.to_string()),
        RawToken::ImagLiteral => Token::Literal(LitKind::Imag, slice.to_string()),
        RawToken::Identifier => match Keyword::from_str(slice) {
            Some(kw) => Token::Keyword(kw),
            None => Token::Identifier(slice.to_string()),
        },
        RawToken::Ellipsis => Token::Ellipsis,
        RawToken::AndNotEq => Token::AndNotEq,
        RawToken::ShlEq => Token::ShlEq,
        RawToken::ShrEq => Token::ShrEq,
        RawToken::AndNot => Token::AndNot,
        RawToken::Shl => Token::Shl,
        RawToken::Shr => Token::Shr,
        RawToken::PlusEq => Token::PlusEq,
        RawToken::MinusEq => Token::MinusEq,
        RawToken::StarEq => Token::StarEq,
        RawToken::SlashEq => Token::SlashEq,
        RawToken::PercentEq => Token::PercentEq,
        RawToken::AmpEq => Token::AmpEq,
        RawToken::PipeEq => Token::PipeEq,
        RawToken::CaretEq => Token::CaretEq,
        RawToken::AndAnd => Token::AndAnd,
        RawToken::OrOr => Token::OrOr,
        RawToken::Arrow => Token::Arrow,
        RawToken::Inc => Token::Inc,
        RawToken::Dec => Token::Dec,
        RawToken::EqEq => Token::EqEq,
        RawToken::BangEq => Token::BangEq,
        RawToken::LtEq => Token::LtEq,
        RawToken::GtEq => Token::GtEq,
        RawToken::Define => Token::Define,
        RawToken::Plus => Token::Plus,
        RawToken::Minus => Token::Minus,
        RawToken::Star => Token::Star,
        RawToken::Slash => Token::Slash,
        RawToken::Percent => Token::Percent,
        RawToken::Amp => Token::Amp,
        RawToken::Pipe => Token::Pipe,
        RawToken::Caret => Token::Caret,
        RawToken::Lt => Token::Lt,
        RawToken::Gt => Token::Gt,
        RawToken::Eq => Token::Eq,
        RawToken::Bang => Token::Bang,
        RawToken::Tilde => Token::Tilde,
        RawToken::LParen => Token::LParen,
        RawToken::RParen => Token::RParen,
        RawToken::LBracket => Token::LBracket,
        RawToken::RBracket => Token::RBracket,
        RawToken::LBrace => Token::LBrace,
        RawToken::RBrace => Token::RBrace,
        RawToken::Comma => Token::Comma,
        RawToken::Semicolon => Token::Semicolon,
        RawToken::Dot => Token::Dot,
        RawToken::Colon => Token::Colon,
    }
}

impl<'src> Iterator for Lexer<'src> {
    type Item = Spanned<Token>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(tok) = self.pending.pop_front() {
                return Some(tok);
            }
            if self.finished {
                return None;
            }
            if self.pos >= self.source.len() {
                self.emit_eof();
            } else {
                self.scan_line();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lex(source: &str) -> Vec<Token> {
        Lexer::new(source)
            .map(|s| s.node)
            .filter(|t| *t != Token::Eof)
            .collect()
    }

    fn ident(name: &str) -> Token {
        Token::Identifier(name.to_string())
    }

    #[test]
    fn test_package_clause() {
        let tokens = lex("package main\n");
        assert_eq!(
            tokens,
            vec![Token::Keyword(Keyword::Package), ident("main"), Token::Semicolon]
        );
    }

    #[test]
    fn test_semicolon_insertion() {
        let tokens = lex("x := f(1)\nreturn\n}\n");
        assert_eq!(
            tokens,
            vec![
                ident("x"),
                Token::Define,
                ident("f"),
                Token::LParen,
                Token::Literal(LitKind::Int, "1".to_string()),
                Token::RParen,
                Token::Semicolon,
                Token::Keyword(Keyword::Return),
                Token::Semicolon,
                Token::RBrace,
                Token::Semicolon,
            ]
        );
    }

    #[test]
    fn test_no_semicolon_after_operator() {
        let tokens = lex("a +\nb\n");
        assert_eq!(
            tokens,
            vec![ident("a"), Token::Plus, ident("b"), Token::Semicolon]
        );
    }

    #[test]
    fn test_no_semicolon_after_open_brace() {
        let tokens = lex("func main() {\n}\n");
        assert_eq!(
            tokens,
            vec![
                Token::Keyword(Keyword::Func),
                ident("main"),
                Token::LParen,
                Token::RParen,
                Token::LBrace,
                Token::RBrace,
                Token::Semicolon,
            ]
        );
    }

    #[test]
    fn test_semicolon_at_eof() {
        let tokens = lex("x++");
        assert_eq!(tokens, vec![ident("x"), Token::Inc, Token::Semicolon]);
    }

    #[test]
    fn test_template_identifier() {
        let tokens = lex("v := TPLᐸintᐳ{}\n");
        assert_eq!(
            tokens,
            vec![
                ident("v"),
                Token::Define,
                ident("TPLᐸintᐳ"),
                Token::LBrace,
                Token::RBrace,
                Token::Semicolon,
            ]
        );
    }

    #[test]
    fn test_unicode_identifier() {
        let tokens = lex("größe := 1\n");
        assert_eq!(tokens[0], ident("größe"));
    }

    #[test]
    fn test_line_comment_ends_statement() {
        let tokens = lex("x = 1 // one\ny = 2\n");
        assert_eq!(
            tokens,
            vec![
                ident("x"),
                Token::Eq,
                Token::Literal(LitKind::Int, "1".to_string()),
                Token::Semicolon,
                Token::Comment("// one".to_string()),
                ident("y"),
                Token::Eq,
                Token::Literal(LitKind::Int, "2".to_string()),
                Token::Semicolon,
            ]
        );
    }

    #[test]
    fn test_block_comment_inline() {
        let tokens = lex("a /* b */ + c\n");
        assert_eq!(
            tokens,
            vec![
                ident("a"),
                Token::Comment("/* b */".to_string()),
                Token::Plus,
                ident("c"),
                Token::Semicolon,
            ]
        );
    }

    #[test]
    fn test_multiline_block_comment_ends_statement() {
        let tokens = lex("a /* b\n */ c\n");
        assert_eq!(tokens[1], Token::Semicolon);
        assert_eq!(tokens[3], ident("c"));
    }

    #[test]
    fn test_string_literals() {
        let tokens = lex("\"a\\n\\\"b\" `raw\nline` 'x' '\\n'\n");
        assert_eq!(
            tokens,
            vec![
                Token::Literal(LitKind::String, "\"a\\n\\\"b\"".to_string()),
                Token::Literal(LitKind::String, "`raw\nline`".to_string()),
                Token::Literal(LitKind::Char, "'x'".to_string()),
                Token::Literal(LitKind::Char, "'\\n'".to_string()),
                Token::Semicolon,
            ]
        );
    }

    #[test]
    fn test_numeric_literals() {
        let tokens = lex("42 0x1F 0o17 0b101 3.14 .5 1e9 2i 1_000\n");
        assert_eq!(
            tokens,
            vec![
                Token::Literal(LitKind::Int, "42".to_string()),
                Token::Literal(LitKind::Int, "0x1F".to_string()),
                Token::Literal(LitKind::Int, "0o17".to_string()),
                Token::Literal(LitKind::Int, "0b101".to_string()),
                Token::Literal(LitKind::Float, "3.14".to_string()),
                Token::Literal(LitKind::Float, ".5".to_string()),
                Token::Literal(LitKind::Float, "1e9".to_string()),
                Token::Literal(LitKind::Imag, "2i".to_string()),
                Token::Literal(LitKind::Int, "1_000".to_string()),
                Token::Semicolon,
            ]
        );
    }

    #[test]
    fn test_hex_float_literals() {
        let tokens = lex("0x1p-2 0x1.8p3 0X.8P+1 0x1p4i\n");
        assert_eq!(
            tokens,
            vec![
                Token::Literal(LitKind::Float, "0x1p-2".to_string()),
                Token::Literal(LitKind::Float, "0x1.8p3".to_string()),
                Token::Literal(LitKind::Float, "0X.8P+1".to_string()),
                Token::Literal(LitKind::Imag, "0x1p4i".to_string()),
                Token::Semicolon,
            ]
        );
    }

    #[test]
    fn test_leading_byte_order_mark() {
        let mut lexer = Lexer::new("\u{feff}package main\n");
        let tokens: Vec<_> = lexer.by_ref().collect();
        assert!(lexer.errors.is_empty(), "{:?}", lexer.errors);
        assert_eq!(tokens[0].node, Token::Keyword(Keyword::Package));
        assert_eq!(tokens[0].span, Span::new(3, 10));
        assert_eq!(tokens[1].node, ident("main"));
    }

    #[test]
    fn test_operators() {
        let tokens = lex("a &^= b <- c ... d &^ e := f\n");
        assert_eq!(
            tokens,
            vec![
                ident("a"),
                Token::AndNotEq,
                ident("b"),
                Token::Arrow,
                ident("c"),
                Token::Ellipsis,
                ident("d"),
                Token::AndNot,
                ident("e"),
                Token::Define,
                ident("f"),
                Token::Semicolon,
            ]
        );
    }

    #[test]
    fn test_unterminated_string_error() {
        let mut lexer = Lexer::new("x := \"abc\n");
        let _: Vec<_> = lexer.by_ref().collect();
        assert_eq!(lexer.errors.len(), 1);
        assert!(matches!(lexer.errors[0].kind, LexErrorKind::UnterminatedString));
    }

    #[test]
    fn test_invalid_escape_error() {
        let mut lexer = Lexer::new("\"\\q\"\n");
        let _: Vec<_> = lexer.by_ref().collect();
        assert!(matches!(
            lexer.errors[0].kind,
            LexErrorKind::InvalidEscapeSequence(ref s) if s == "\\q"
        ));
    }

    #[test]
    fn test_invalid_character_error() {
        let mut lexer = Lexer::new("a $ b\n");
        let tokens: Vec<_> = lexer.by_ref().map(|t| t.node).collect();
        assert!(matches!(lexer.errors[0].kind, LexErrorKind::InvalidCharacter('$')));
        assert_eq!(tokens[0], ident("a"));
        assert_eq!(tokens[1], ident("b"));
    }

    #[test]
    fn test_spans() {
        let spans: Vec<Span> = Lexer::new("ab + c").map(|t| t.span).collect();
        assert_eq!(spans[0], Span::new(0, 2));
        assert_eq!(spans[1], Span::new(3, 4));
        assert_eq!(spans[2], Span::new(5, 6));
    }
}
