//! Character-level tokenizer.
//!
//! Every character is classified and consecutive characters of the same
//! class are merged into one token. Delimiters never merge. Whitespace that
//! does not continue a text run only separates tokens and is dropped.

use std::fmt;

/// Characters that always form a token of their own.
pub const DELIMITERS: [char; 5] = ['!', '[', ']', '(', ')'];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// Empty marker opening every stream.
    Begin,
    Delimiter,
    LineBreak,
    CodeQuote,
    Text,
    /// Empty marker closing every stream.
    End,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
        }
    }

    /// Number of characters captured by the token.
    pub fn char_count(&self) -> usize {
        self.text.chars().count()
    }

    /// Whether this is the delimiter token for `ch`.
    pub fn is_delimiter(&self, ch: char) -> bool {
        self.kind == TokenKind::Delimiter && self.text.starts_with(ch)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} {:?}", self.kind, self.text)
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum CharClass {
    /// Whitespace outside a text run.
    Separator,
    Token(TokenKind),
}

impl CharClass {
    fn of(ch: char, current: Option<TokenKind>) -> Self {
        if DELIMITERS.contains(&ch) {
            CharClass::Token(TokenKind::Delimiter)
        } else if ch == '\n' {
            CharClass::Token(TokenKind::LineBreak)
        } else if ch == '`' {
            CharClass::Token(TokenKind::CodeQuote)
        } else if ch.is_whitespace() && current != Some(TokenKind::Text) {
            CharClass::Separator
        } else {
            CharClass::Token(TokenKind::Text)
        }
    }
}

#[derive(Default)]
struct Lexer {
    current: Option<TokenKind>,
    buffer: String,
    tokens: Vec<Token>,
}

impl Lexer {
    fn push(&mut self, ch: char) {
        let kind = match CharClass::of(ch, self.current) {
            CharClass::Separator => return,
            CharClass::Token(kind) => kind,
        };

        if Some(kind) == self.current && kind != TokenKind::Delimiter {
            self.buffer.push(ch);
            return;
        }

        self.flush();
        self.current = Some(kind);
        self.buffer.push(ch);
    }

    fn flush(&mut self) {
        if let Some(kind) = self.current.take() {
            let text = std::mem::take(&mut self.buffer);
            self.tokens.push(Token::new(kind, text));
        }
    }

    fn finish(mut self) -> Vec<Token> {
        self.flush();
        self.tokens.push(Token::new(TokenKind::End, ""));
        self.tokens
    }
}

/// Split `input` into tokens, bracketed by `Begin` and `End`.
pub fn tokenize(input: &str) -> Vec<Token> {
    let mut lexer = Lexer {
        tokens: vec![Token::new(TokenKind::Begin, "")],
        ..Lexer::default()
    };
    for ch in input.chars() {
        lexer.push(ch);
    }
    lexer.finish()
}
