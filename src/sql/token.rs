//! Output tokens for the query builder.
//!
//! Expressions and queries lower to a flat [`TokenStream`]. Nothing in the
//! stream is dialect-specific until [`TokenStream::serialize`] runs, which is
//! where identifiers get quoted and placeholders get numbered.

use super::dialect::{Dialect, SqlDialect};

/// One unit of SQL output.
///
/// No raw-SQL variant: every value that is not a keyword, identifier or
/// trusted literal has to travel as a [`Token::Param`].
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Select,
    Distinct,
    From,
    Where,
    Inner,
    Left,
    Join,
    On,
    As,
    GroupBy,
    Having,
    OrderBy,
    Asc,
    Desc,
    Limit,
    Case,
    When,
    Then,
    Else,
    End,
    And,
    Or,
    Not,
    In,
    IsNull,
    IsNotNull,

    Eq,
    Gt,
    Comma,
    Dot,
    Star,
    LParen,
    RParen,

    Space,
    Newline,
    Indent(usize),

    /// Table, column or alias name.
    Ident(String),
    /// Function name, rendered upper-case.
    FunctionName(String),
    LitInt(i64),
    LitString(String),
    /// Only emitted for constant-folded predicates.
    LitBool(bool),
    /// Positional bind parameter, 1-based.
    Param(usize),
}

impl Token {
    /// Fixed spelling of keywords, operators and layout tokens.
    fn fixed(&self) -> Option<&'static str> {
        let text = match self {
            Token::Select => "SELECT",
            Token::Distinct => "DISTINCT",
            Token::From => "FROM",
            Token::Where => "WHERE",
            Token::Inner => "INNER",
            Token::Left => "LEFT",
            Token::Join => "JOIN",
            Token::On => "ON",
            Token::As => "AS",
            Token::GroupBy => "GROUP BY",
            Token::Having => "HAVING",
            Token::OrderBy => "ORDER BY",
            Token::Asc => "ASC",
            Token::Desc => "DESC",
            Token::Limit => "LIMIT",
            Token::Case => "CASE",
            Token::When => "WHEN",
            Token::Then => "THEN",
            Token::Else => "ELSE",
            Token::End => "END",
            Token::And => "AND",
            Token::Or => "OR",
            Token::Not => "NOT",
            Token::In => "IN",
            Token::IsNull => "IS NULL",
            Token::IsNotNull => "IS NOT NULL",
            Token::Eq => "=",
            Token::Gt => ">",
            Token::Comma => ",",
            Token::Dot => ".",
            Token::Star => "*",
            Token::LParen => "(",
            Token::RParen => ")",
            Token::Space => " ",
            Token::Newline => "\n",
            _ => return None,
        };
        Some(text)
    }

    /// Append this token's text for `dialect` to `out`.
    pub fn write(&self, dialect: Dialect, out: &mut String) {
        if let Some(text) = self.fixed() {
            out.push_str(text);
            return;
        }
        match self {
            Token::Indent(depth) => {
                for _ in 0..*depth {
                    out.push_str("  ");
                }
            }
            Token::Ident(name) => out.push_str(&dialect.quote_identifier(name)),
            Token::FunctionName(name) => out.push_str(&name.to_uppercase()),
            Token::LitInt(n) => out.push_str(&n.to_string()),
            Token::LitString(s) => out.push_str(&dialect.quote_string(s)),
            Token::LitBool(b) => out.push_str(dialect.format_bool(*b)),
            Token::Param(index) => out.push_str(&dialect.placeholder(*index)),
            _ => {}
        }
    }

    /// This token's text for `dialect`.
    pub fn serialize(&self, dialect: Dialect) -> String {
        let mut out = String::new();
        self.write(dialect, &mut out);
        out
    }
}

/// An ordered run of tokens.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TokenStream {
    tokens: Vec<Token>,
}

impl TokenStream {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, token: Token) -> &mut Self {
        self.tokens.push(token);
        self
    }

    pub fn append(&mut self, other: TokenStream) -> &mut Self {
        self.tokens.extend(other.tokens);
        self
    }

    pub fn space(&mut self) -> &mut Self {
        self.push(Token::Space)
    }

    /// Line break followed by `depth` levels of indentation.
    pub fn line(&mut self, depth: usize) -> &mut Self {
        self.push(Token::Newline);
        if depth > 0 {
            self.push(Token::Indent(depth));
        }
        self
    }

    /// Keyword surrounded by single spaces.
    pub fn keyword(&mut self, token: Token) -> &mut Self {
        self.space().push(token).space()
    }

    /// Emit `items` separated by `, `.
    pub fn comma_separated<T>(
        &mut self,
        items: &[T],
        mut each: impl FnMut(&T, &mut TokenStream),
    ) -> &mut Self {
        for (i, item) in items.iter().enumerate() {
            if i > 0 {
                self.push(Token::Comma).space();
            }
            each(item, self);
        }
        self
    }

    /// Placeholders in the stream; each one expects a bound value.
    pub fn param_count(&self) -> usize {
        self.tokens
            .iter()
            .filter(|t| matches!(t, Token::Param(_)))
            .count()
    }

    pub fn serialize(&self, dialect: Dialect) -> String {
        let mut out = String::new();
        for token in &self.tokens {
            token.write(dialect, &mut out);
        }
        out
    }
}
