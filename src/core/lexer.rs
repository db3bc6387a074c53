//! Splits scene sources into a flat stream of tokens. Every token
//! remembers where it came from so later errors can point at the
//! offending line and column.

// others
use pest::Parser;
use pest_derive::Parser;
// rs_ray
use crate::core::error::{Location, Result, SceneError};

#[derive(Parser)]
#[grammar = "core/scene.pest"]
struct SceneTokenizer;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum TokenKind {
    Word,
    Quoted,
    OpenBracket,
    CloseBracket,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    /// quotes removed for `TokenKind::Quoted`
    pub text: String,
    pub line: usize,
    pub col: usize,
}

/// Forward-only sequence of tokens. Consumed tokens are never
/// revisited.
#[derive(Debug, Clone)]
pub struct TokenStream {
    source: String,
    tokens: Vec<Token>,
    pos: usize,
    end: (usize, usize),
}

/// Tokenize `input`; `source` names it in error locations.
pub fn tokenize(source: &str, input: &str) -> Result<TokenStream> {
    let mut pairs = SceneTokenizer::parse(Rule::scene, input).map_err(|e| {
        let (line, col) = match e.line_col {
            pest::error::LineColLocation::Pos(pos) => pos,
            pest::error::LineColLocation::Span(start, _) => start,
        };
        SceneError::malformed(
            "",
            Location::new(source, line, col),
            e.variant.message().to_string(),
        )
    })?;
    let mut tokens: Vec<Token> = Vec::new();
    let mut end: (usize, usize) = (1, 1);
    if let Some(scene) = pairs.next() {
        for pair in scene.into_inner() {
            let (line, col) = pair.as_span().start_pos().line_col();
            let (kind, text) = match pair.as_rule() {
                Rule::word => (TokenKind::Word, pair.as_str().to_string()),
                Rule::quoted_string => {
                    let content: String = pair
                        .into_inner()
                        .next()
                        .map(|inner| inner.as_str().to_string())
                        .unwrap_or_default();
                    (TokenKind::Quoted, content)
                }
                Rule::open_bracket => (TokenKind::OpenBracket, String::from("[")),
                Rule::close_bracket => (TokenKind::CloseBracket, String::from("]")),
                Rule::EOI => {
                    end = (line, col);
                    continue;
                }
                _ => continue,
            };
            tokens.push(Token {
                kind,
                text,
                line,
                col,
            });
        }
    }
    Ok(TokenStream {
        source: source.to_string(),
        tokens,
        pos: 0,
        end,
    })
}

impl TokenStream {
    pub fn source(&self) -> &str {
        &self.source
    }
    pub fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }
    pub fn next_token(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }
    pub fn is_exhausted(&self) -> bool {
        self.pos >= self.tokens.len()
    }
    /// Number of tokens consumed so far.
    pub fn position(&self) -> usize {
        self.pos
    }
    pub fn len(&self) -> usize {
        self.tokens.len()
    }
    /// Number of tokens not consumed yet.
    pub fn remaining(&self) -> usize {
        self.tokens.len().saturating_sub(self.pos)
    }
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
    /// Location of the next token, or of the end of input.
    pub fn location(&self) -> Location {
        match self.peek() {
            Some(token) => self.location_of(token),
            None => Location::new(self.source.clone(), self.end.0, self.end.1),
        }
    }
    pub fn location_of(&self, token: &Token) -> Location {
        Location::new(self.source.clone(), token.line, token.col)
    }
}
