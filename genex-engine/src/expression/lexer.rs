// Expression Engine Lexer
// Tokenizes generator expression markers: $<, >, :, , and literal text

use std::fmt;

/// Token types for generator expressions
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    BeginMarker, // $<
    EndMarker,   // >
    Colon,       // :
    Comma,       // ,
    Text(String),
}

impl Token {
    /// Source text the token was read from
    pub fn as_text(&self) -> &str {
        match self {
            Token::BeginMarker => "$<",
            Token::EndMarker => ">",
            Token::Colon => ":",
            Token::Comma => ",",
            Token::Text(s) => s,
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Text(s) => write!(f, "'{}'", s),
            other => write!(f, "{}", other.as_text()),
        }
    }
}

/// Lexer for generator expressions
///
/// Every input tokenizes. Separators are emitted wherever they appear and the
/// parser decides whether they are significant at the current nesting level.
pub struct Lexer<'a> {
    chars: std::iter::Peekable<std::str::CharIndices<'a>>,
    saw_marker: bool,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            chars: input.char_indices().peekable(),
            saw_marker: false,
        }
    }

    /// Tokenize the entire input
    pub fn tokenize(&mut self) -> Vec<Token> {
        let mut tokens = Vec::new();
        while let Some(token) = self.next_token() {
            tokens.push(token);
        }
        tokens
    }

    /// Whether a `$<` was produced so far
    pub fn saw_marker(&self) -> bool {
        self.saw_marker
    }

    fn next_token(&mut self) -> Option<Token> {
        let (_, ch) = *self.chars.peek()?;

        match ch {
            '>' => {
                self.chars.next();
                Some(Token::EndMarker)
            }
            ':' => {
                self.chars.next();
                Some(Token::Colon)
            }
            ',' => {
                self.chars.next();
                Some(Token::Comma)
            }
            '$' if self.begins_marker() => {
                self.chars.next();
                self.chars.next();
                self.saw_marker = true;
                Some(Token::BeginMarker)
            }
            _ => Some(self.read_text()),
        }
    }

    fn begins_marker(&self) -> bool {
        let mut lookahead = self.chars.clone();
        matches!(lookahead.next(), Some((_, '$'))) && matches!(lookahead.next(), Some((_, '<')))
    }

    fn read_text(&mut self) -> Token {
        let mut text = String::new();

        while let Some(&(_, ch)) = self.chars.peek() {
            match ch {
                '>' | ':' | ',' => break,
                '$' if !text.is_empty() && self.begins_marker() => break,
                _ => {
                    text.push(ch);
                    self.chars.next();
                }
            }
        }

        Token::Text(text)
    }
}

/// Tokenize a string in one call
pub fn tokenize(input: &str) -> Vec<Token> {
    Lexer::new(input).tokenize()
}
