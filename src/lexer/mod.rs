mod error;
mod token;

pub use error::{LexicalError, LexicalErrorKind};
use std::{iter::Peekable, ops::Range, rc::Rc, str::CharIndices};
pub use token::{Span, Token, TokenKind, KEYWORD_HASHMAP};

/// Maps byte offsets onto 1-based line numbers.
#[derive(Debug, Clone)]
pub struct LineBreaks {
    line_breaks: Rc<[Range<u32>]>,
}

impl LineBreaks {
    pub fn new(text: &str) -> Self {
        let mut line_breaks = Vec::new();
        let mut cursor = 0u32;
        for (offset, byte) in text.bytes().enumerate() {
            if byte == b'\n' {
                let next = (offset + 1) as u32;
                line_breaks.push(cursor..next);
                cursor = next;
            }
        }
        if !text.ends_with('\n') {
            line_breaks.push(cursor..(text.len() + 1) as u32);
        }
        Self {
            line_breaks: line_breaks.into(),
        }
    }

    /// The line just past the final newline.
    pub fn get_max_line(&self) -> u32 {
        (self.line_breaks.len() + 1) as u32
    }

    pub fn get_line(&self, offset: u32) -> u32 {
        self.line_breaks
            .binary_search_by(|r| {
                if offset < r.start {
                    std::cmp::Ordering::Greater
                } else if offset >= r.end {
                    std::cmp::Ordering::Less
                } else {
                    std::cmp::Ordering::Equal
                }
            })
            .map(|v| (v + 1) as u32)
            .unwrap_or(self.get_max_line())
    }

    pub fn get_line_from_span(&self, span: Span) -> u32 {
        self.get_line(span.start)
    }
}

/// Streaming scanner. Spans are absolute offsets into `source`, even when
/// scanning starts part way through it.
#[derive(Debug)]
pub struct Lexer<'src> {
    source: &'src str,
    start: usize,
    chars: Peekable<CharIndices<'src>>,
}

impl<'src> Lexer<'src> {
    pub fn new(source: &'src str) -> Self {
        Self::starting_at(source, 0)
    }

    /// Scans `source[start..]`. Used by the REPL, where every line is appended
    /// to one growing buffer.
    pub fn starting_at(source: &'src str, start: usize) -> Self {
        let start = start.min(source.len());
        Self {
            source,
            start,
            chars: source[start..].char_indices().peekable(),
        }
    }

    pub fn get_source(&self) -> &'src str {
        self.source
    }

    pub fn get_lexeme(&self, span: &Span) -> Option<&'src str> {
        self.source.get(span.range())
    }

    fn offset(&mut self) -> usize {
        match self.chars.peek() {
            Some((offset, _)) => self.start + offset,
            None => self.source.len(),
        }
    }

    fn bump(&mut self) -> Option<(usize, char)> {
        self.chars
            .next()
            .map(|(offset, c)| (self.start + offset, c))
    }

    fn bump_if(&mut self, expected: char) -> bool {
        match self.chars.peek() {
            Some((_, c)) if *c == expected => {
                self.chars.next();
                true
            }
            _ => false,
        }
    }

    fn bump_while(&mut self, predicate: impl Fn(char) -> bool) {
        while let Some((_, c)) = self.chars.peek() {
            if !predicate(*c) {
                break;
            }
            self.chars.next();
        }
    }

    pub fn next_token(&mut self) -> Result<Token, LexicalError> {
        loop {
            let Some((start, c)) = self.bump() else {
                return Ok(Token {
                    kind: TokenKind::Eof,
                    span: Span::new(self.source.len(), 0),
                });
            };

            let kind = match c {
                '(' => TokenKind::LeftParenthesis,
                ')' => TokenKind::RightParenthesis,
                '{' => TokenKind::LeftBrace,
                '}' => TokenKind::RightBrace,
                ',' => TokenKind::Comma,
                '.' => TokenKind::Dot,
                '-' => TokenKind::Minus,
                '+' => TokenKind::Plus,
                ';' => TokenKind::Semicolon,
                '*' => TokenKind::Star,
                '!' if self.bump_if('=') => TokenKind::BangEqual,
                '!' => TokenKind::Bang,
                '=' if self.bump_if('=') => TokenKind::EqualEqual,
                '=' => TokenKind::Equal,
                '<' if self.bump_if('=') => TokenKind::LessThanEqual,
                '<' => TokenKind::LessThan,
                '>' if self.bump_if('=') => TokenKind::GreaterThanEqual,
                '>' => TokenKind::GreaterThan,
                '/' if self.bump_if('/') => {
                    self.bump_while(|c| c != '\n');
                    continue;
                }
                '/' => TokenKind::Slash,
                '"' => return self.lex_string(start),
                '0'..='9' => self.lex_number(),
                'a'..='z' | 'A'..='Z' | '_' => self.lex_ident(start),
                c if c.is_whitespace() => continue,
                c => {
                    return Err(LexicalError {
                        kind: LexicalErrorKind::Unrecognized(c),
                        span: Span::new(start, c.len_utf8()),
                    })
                }
            };

            let end = self.offset();
            return Ok(Token {
                kind,
                span: Span::new(start, end - start),
            });
        }
    }

    fn lex_string(&mut self, start: usize) -> Result<Token, LexicalError> {
        self.bump_while(|c| c != '"');
        let closed = self.bump_if('"');
        let end = self.offset();
        let span = Span::new(start, end - start);
        if closed {
            Ok(Token {
                kind: TokenKind::StringLiteral,
                span,
            })
        } else {
            Err(LexicalError {
                kind: LexicalErrorKind::UnclosedString,
                span,
            })
        }
    }

    fn lex_number(&mut self) -> TokenKind {
        self.bump_while(|c| c.is_ascii_digit());
        // A trailing dot belongs to the next token unless a digit follows it.
        let mut lookahead = self.chars.clone();
        if let (Some((_, '.')), Some((_, c))) = (lookahead.next(), lookahead.next()) {
            if c.is_ascii_digit() {
                self.chars.next();
                self.bump_while(|c| c.is_ascii_digit());
            }
        }
        TokenKind::NumericLiteral
    }

    fn lex_ident(&mut self, start: usize) -> TokenKind {
        self.bump_while(|c| c.is_ascii_alphanumeric() || c == '_');
        let end = self.offset();
        KEYWORD_HASHMAP
            .get(&self.source[start..end])
            .copied()
            .unwrap_or(TokenKind::Ident)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        let mut lexer = Lexer::new(source);
        let mut kinds = Vec::new();
        loop {
            let token = lexer.next_token().expect("valid input");
            kinds.push(token.kind);
            if token.kind == TokenKind::Eof {
                return kinds;
            }
        }
    }

    #[test]
    fn two_character_operators() {
        assert_eq!(
            kinds("!= == <= >= ! = < >"),
            vec![
                TokenKind::BangEqual,
                TokenKind::EqualEqual,
                TokenKind::LessThanEqual,
                TokenKind::GreaterThanEqual,
                TokenKind::Bang,
                TokenKind::Equal,
                TokenKind::LessThan,
                TokenKind::GreaterThan,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn trailing_dot_is_not_part_of_number() {
        assert_eq!(
            kinds("123."),
            vec![TokenKind::NumericLiteral, TokenKind::Dot, TokenKind::Eof]
        );
    }

    #[test]
    fn comments_are_skipped() {
        assert_eq!(
            kinds("var // a comment\nx"),
            vec![TokenKind::KeywordVar, TokenKind::Ident, TokenKind::Eof]
        );
    }

    #[test]
    fn spans_are_absolute_when_starting_late() {
        let source = "print 1;\nprint 2;";
        let mut lexer = Lexer::starting_at(source, 9);
        let token = lexer.next_token().expect("valid input");
        assert_eq!(token.kind, TokenKind::KeywordPrint);
        assert_eq!(lexer.get_lexeme(&token.span), Some("print"));
        assert_eq!(token.span.start, 9);
    }

    #[test]
    fn line_breaks_map_offsets() {
        let breaks = LineBreaks::new("a\nbc\n");
        assert_eq!(breaks.get_line(0), 1);
        assert_eq!(breaks.get_line(2), 2);
        assert_eq!(breaks.get_line(5), 3);
    }

    #[test]
    fn unterminated_string_is_reported() {
        let mut lexer = Lexer::new("\"abc");
        let error = lexer.next_token().expect_err("string is never closed");
        assert_eq!(error.kind, LexicalErrorKind::UnclosedString);
        assert_eq!(error.report_offset(), 4);
    }
}
