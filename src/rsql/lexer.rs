//! RSQL tokenizer
//!
//! Splits filter text into structural tokens, operator tokens and values.
//! Operator tokens are not resolved here; the parser looks them up in the
//! `OperatorTable` it was given.

use super::ast::is_reserved;
use super::errors::{CompileError, CompileResult};

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum TokenKind {
    LParen,
    RParen,
    /// `;`
    And,
    /// `,`
    Or,
    /// Raw operator token such as `==`, `=gt=` or `<=`
    Operator(String),
    /// Unquoted run of unreserved characters
    Word(String),
    /// Quoted string with escapes resolved
    Quoted(String),
    Eof,
}

#[derive(Debug, Clone)]
pub(crate) struct Token {
    pub kind: TokenKind,
    /// Byte offset of the first character
    pub offset: usize,
    /// Byte offset one past the last character
    pub end: usize,
}

struct Lexer<'a> {
    input: &'a str,
    chars: std::iter::Peekable<std::str::CharIndices<'a>>,
}

impl<'a> Lexer<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            input,
            chars: input.char_indices().peekable(),
        }
    }

    fn position(&mut self) -> usize {
        self.chars
            .peek()
            .map(|(pos, _)| *pos)
            .unwrap_or(self.input.len())
    }

    fn peek(&mut self) -> Option<char> {
        self.chars.peek().map(|(_, ch)| *ch)
    }

    fn advance(&mut self) -> Option<char> {
        self.chars.next().map(|(_, ch)| ch)
    }

    fn skip_whitespace(&mut self) {
        while let Some(ch) = self.peek() {
            if ch.is_whitespace() {
                self.advance();
            } else {
                break;
            }
        }
    }

    fn next_token(&mut self) -> CompileResult<Token> {
        self.skip_whitespace();
        let start = self.position();

        let kind = match self.peek() {
            None => TokenKind::Eof,
            Some('(') => {
                self.advance();
                TokenKind::LParen
            }
            Some(')') => {
                self.advance();
                TokenKind::RParen
            }
            Some(';') => {
                self.advance();
                TokenKind::And
            }
            Some(',') => {
                self.advance();
                TokenKind::Or
            }
            Some('=') => self.read_fiql_operator(start)?,
            Some('!') => {
                self.advance();
                if self.peek() != Some('=') {
                    return Err(self.malformed_operator(start));
                }
                self.advance();
                TokenKind::Operator("!=".into())
            }
            Some(ch @ ('<' | '>')) => {
                self.advance();
                let mut op = ch.to_string();
                if self.peek() == Some('=') {
                    self.advance();
                    op.push('=');
                }
                TokenKind::Operator(op)
            }
            Some(quote @ ('"' | '\'')) => self.read_quoted(quote, start)?,
            Some(ch) if is_reserved(ch) => {
                return Err(CompileError::syntax(
                    format!("Unexpected character '{}'", ch),
                    ch.to_string(),
                    Some(start),
                ));
            }
            Some(_) => self.read_word(),
        };

        Ok(Token {
            kind,
            offset: start,
            end: self.position(),
        })
    }

    /// `==` or `=<alpha>*=`
    fn read_fiql_operator(&mut self, start: usize) -> CompileResult<TokenKind> {
        self.advance();
        while let Some(ch) = self.peek() {
            if ch.is_ascii_alphabetic() {
                self.advance();
            } else {
                break;
            }
        }
        if self.peek() != Some('=') {
            return Err(self.malformed_operator(start));
        }
        self.advance();
        let end = self.position();
        Ok(TokenKind::Operator(self.input[start..end].to_string()))
    }

    fn malformed_operator(&mut self, start: usize) -> CompileError {
        // Report up to the next reserved boundary so the caller sees the token
        while let Some(ch) = self.peek() {
            if ch.is_whitespace() || matches!(ch, '(' | ')' | ';' | ',' | '"' | '\'') {
                break;
            }
            self.advance();
        }
        let fragment = &self.input[start..self.position()];
        CompileError::syntax(
            format!("Malformed operator '{}'", fragment),
            fragment,
            Some(start),
        )
    }

    fn read_word(&mut self) -> TokenKind {
        let mut value = String::new();
        while let Some(ch) = self.peek() {
            if is_reserved(ch) {
                break;
            }
            value.push(ch);
            self.advance();
        }
        TokenKind::Word(value)
    }

    fn read_quoted(&mut self, quote: char, start: usize) -> CompileResult<TokenKind> {
        self.advance(); // opening quote
        let mut value = String::new();

        loop {
            match self.advance() {
                None => {
                    return Err(CompileError::syntax(
                        "Unterminated string",
                        &self.input[start..],
                        Some(start),
                    ));
                }
                Some(ch) if ch == quote => break,
                Some('\\') => match self.advance() {
                    Some(escaped) => value.push(escaped),
                    None => {
                        return Err(CompileError::syntax(
                            "Unterminated escape sequence",
                            &self.input[start..],
                            Some(start),
                        ));
                    }
                },
                Some(ch) => value.push(ch),
            }
        }

        Ok(TokenKind::Quoted(value))
    }
}

/// Tokenizes the whole input, ending with a single `Eof` token
pub(crate) fn tokenize(input: &str) -> CompileResult<Vec<Token>> {
    let mut lexer = Lexer::new(input);
    let mut tokens = Vec::new();
    loop {
        let token = lexer.next_token()?;
        let done = token.kind == TokenKind::Eof;
        tokens.push(token);
        if done {
            return Ok(tokens);
        }
    }
}
