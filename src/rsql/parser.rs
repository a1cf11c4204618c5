//! RSQL Parser - Recursive descent parser for filter expressions.
//!
//! Grammar:
//!   input      = or EOF ;
//!   or         = and { "," and } ;
//!   and        = constraint { ";" constraint } ;
//!   constraint = "(" or ")" | comparison ;
//!   comparison = selector operator arguments ;
//!   arguments  = "(" value { "," value } ")" | value ;
//!
//! `;` (AND) binds tighter than `,` (OR). Recursion is bounded by the
//! parser's `max_depth`, counted in nested parenthesized groups.

use super::ast::{Node, MAX_NESTING_DEPTH};
use super::errors::{CompileError, CompileResult};
use super::lexer::{tokenize, Token, TokenKind};
use super::operators::OperatorTable;

/// Default limit on nested parenthesized groups
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Parses filter text into an AST.
///
/// Returns `Ok(None)` for empty or all-whitespace input, which callers
/// treat as "match everything".
pub fn parse(input: &str, operators: &OperatorTable) -> CompileResult<Option<Node>> {
    Parser::new(input, operators).parse()
}

/// RSQL parser over a borrowed operator table
pub struct Parser<'a> {
    input: &'a str,
    operators: &'a OperatorTable,
    max_depth: usize,
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
}

impl<'a> Parser<'a> {
    pub fn new(input: &'a str, operators: &'a OperatorTable) -> Self {
        Self {
            input,
            operators,
            max_depth: DEFAULT_MAX_DEPTH,
            tokens: Vec::new(),
            pos: 0,
            depth: 0,
        }
    }

    /// Sets the group nesting limit. Clamped below the AST ceiling.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth.clamp(1, MAX_NESTING_DEPTH - 1);
        self
    }

    pub fn parse(mut self) -> CompileResult<Option<Node>> {
        if self.input.trim().is_empty() {
            return Ok(None);
        }

        self.tokens = tokenize(self.input)?;
        let node = self.parse_or()?;

        let token = self.peek().clone();
        match token.kind {
            TokenKind::Eof => Ok(Some(node)),
            TokenKind::RParen => Err(CompileError::syntax(
                "Unbalanced parenthesis: unexpected ')'",
                ")",
                Some(token.offset),
            )),
            _ => Err(CompileError::syntax(
                format!("Unexpected trailing input '{}'", self.text(&token)),
                self.text(&token),
                Some(token.offset),
            )),
        }
    }

    fn peek(&self) -> &Token {
        // tokenize always ends with Eof and the parser never advances past it
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if token.kind != TokenKind::Eof {
            self.pos += 1;
        }
        token
    }

    fn text(&self, token: &Token) -> &'a str {
        if token.kind == TokenKind::Eof {
            return "end of input";
        }
        let input = self.input;
        &input[token.offset..token.end]
    }

    fn parse_or(&mut self) -> CompileResult<Node> {
        let mut children = vec![self.parse_and()?];
        while self.peek().kind == TokenKind::Or {
            self.advance();
            children.push(self.parse_and()?);
        }
        if children.len() == 1 {
            return Ok(children.remove(0));
        }
        Node::or(children)
    }

    fn parse_and(&mut self) -> CompileResult<Node> {
        let mut children = vec![self.parse_constraint()?];
        while self.peek().kind == TokenKind::And {
            self.advance();
            children.push(self.parse_constraint()?);
        }
        if children.len() == 1 {
            return Ok(children.remove(0));
        }
        Node::and(children)
    }

    fn parse_constraint(&mut self) -> CompileResult<Node> {
        let token = self.peek().clone();
        match &token.kind {
            TokenKind::LParen => self.parse_group(),
            TokenKind::Word(selector) => {
                self.advance();
                self.parse_comparison(selector.clone(), &token)
            }
            TokenKind::Quoted(_) => Err(CompileError::syntax(
                "Selector must not be quoted",
                self.text(&token),
                Some(token.offset),
            )),
            _ => Err(CompileError::syntax(
                format!("Expected selector or '(' but found '{}'", self.text(&token)),
                self.text(&token),
                Some(token.offset),
            )),
        }
    }

    fn parse_group(&mut self) -> CompileResult<Node> {
        let open = self.advance();
        self.depth += 1;
        if self.depth > self.max_depth {
            return Err(CompileError::nesting_too_deep(
                self.max_depth,
                Some(open.offset),
            ));
        }

        let node = self.parse_or()?;

        if self.peek().kind != TokenKind::RParen {
            return Err(CompileError::syntax(
                format!(
                    "Unbalanced parenthesis: '(' at offset {} is never closed",
                    open.offset
                ),
                &self.input[open.offset..],
                Some(open.offset),
            ));
        }
        self.advance();
        self.depth -= 1;
        Ok(node)
    }

    fn parse_comparison(&mut self, selector: String, selector_token: &Token) -> CompileResult<Node> {
        let token = self.advance();
        let symbol = match &token.kind {
            TokenKind::Operator(symbol) => symbol.clone(),
            _ => {
                return Err(CompileError::syntax(
                    format!("Expected operator after selector '{}'", selector),
                    self.text(selector_token),
                    Some(selector_token.offset),
                ));
            }
        };

        let operator = self.operators.lookup(&symbol).ok_or_else(|| {
            CompileError::syntax(
                format!("Unknown operator '{}'", symbol),
                symbol.as_str(),
                Some(token.offset),
            )
        })?;

        let arguments = self.parse_arguments(&symbol, &token)?;
        Node::comparison(selector, operator, arguments)
    }

    fn parse_arguments(&mut self, symbol: &str, operator_token: &Token) -> CompileResult<Vec<String>> {
        let token = self.advance();
        match &token.kind {
            TokenKind::Word(value) | TokenKind::Quoted(value) => Ok(vec![value.clone()]),
            TokenKind::LParen => self.parse_argument_list(&token),
            _ => Err(CompileError::syntax(
                format!("Missing argument for operator '{}'", symbol),
                self.text(operator_token),
                Some(operator_token.offset),
            )),
        }
    }

    fn parse_argument_list(&mut self, open: &Token) -> CompileResult<Vec<String>> {
        if self.peek().kind == TokenKind::RParen {
            let close = self.advance();
            return Err(CompileError::syntax(
                "Empty argument list",
                &self.input[open.offset..close.end],
                Some(open.offset),
            ));
        }

        let mut values = Vec::new();
        loop {
            let token = self.advance();
            match &token.kind {
                TokenKind::Word(value) | TokenKind::Quoted(value) => values.push(value.clone()),
                _ => {
                    return Err(CompileError::syntax(
                        format!("Expected argument value but found '{}'", self.text(&token)),
                        self.text(&token),
                        Some(token.offset),
                    ));
                }
            }

            let token = self.advance();
            match token.kind {
                TokenKind::Or => continue,
                TokenKind::RParen => return Ok(values),
                TokenKind::Eof => {
                    return Err(CompileError::syntax(
                        format!(
                            "Unbalanced parenthesis: argument list at offset {} is never closed",
                            open.offset
                        ),
                        &self.input[open.offset..],
                        Some(open.offset),
                    ));
                }
                _ => {
                    return Err(CompileError::syntax(
                        format!("Expected ',' or ')' but found '{}'", self.text(&token)),
                        self.text(&token),
                        Some(token.offset),
                    ));
                }
            }
        }
    }
}
