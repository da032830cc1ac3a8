//! SQL Tokens - the atomic units of SQL output.
//!
//! A [`TokenStream`] is the append-only text sink every generated statement
//! is written into. There is deliberately no token that carries a literal
//! string or date: values reach the statement only as [`Token::Param`]
//! placeholders handed out by [`ParameterSet`](super::params::ParameterSet).

use super::tsql;

/// SQL Token - every element a generated statement can contain.
///
/// Adding a new variant here will cause compile errors everywhere
/// it needs to be handled (exhaustive matching).
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    // === Keywords ===
    Select,
    From,
    Where,
    And,
    As,
    On,
    Inner,
    Join,
    Cross,
    Apply,
    Top,
    OrderBy,
    Desc,
    Offset,
    Fetch,
    Next,
    Rows,
    Only,
    Between,

    // === Punctuation ===
    Comma,
    Dot,
    Star,
    LParen,
    RParen,

    // === Operators ===
    Eq,

    // === Whitespace / Formatting ===
    Space,
    Newline,
    Indent(usize),

    // === Dynamic Content ===
    /// Column or table name, bracket quoted.
    Ident(String),
    /// Qualified identifier: schema.table or just table
    QualifiedIdent {
        schema: Option<String>,
        name: String,
    },
    /// Table alias. Aliases are fixed by the generator and emitted bare.
    Alias(&'static str),
    /// Integer literal (pagination only)
    LitInt(i64),
    /// Bound parameter placeholder, e.g. `@p0`
    Param(String),
}

impl Token {
    /// Serialize this token to T-SQL text.
    pub fn serialize(&self) -> String {
        match self {
            // Keywords
            Token::Select => "SELECT".into(),
            Token::From => "FROM".into(),
            Token::Where => "WHERE".into(),
            Token::And => "AND".into(),
            Token::As => "AS".into(),
            Token::On => "ON".into(),
            Token::Inner => "INNER".into(),
            Token::Join => "JOIN".into(),
            Token::Cross => "CROSS".into(),
            Token::Apply => "APPLY".into(),
            Token::Top => "TOP".into(),
            Token::OrderBy => "ORDER BY".into(),
            Token::Desc => "DESC".into(),
            Token::Offset => "OFFSET".into(),
            Token::Fetch => "FETCH".into(),
            Token::Next => "NEXT".into(),
            Token::Rows => "ROWS".into(),
            Token::Only => "ONLY".into(),
            Token::Between => "BETWEEN".into(),

            // Punctuation
            Token::Comma => ",".into(),
            Token::Dot => ".".into(),
            Token::Star => "*".into(),
            Token::LParen => "(".into(),
            Token::RParen => ")".into(),

            // Operators
            Token::Eq => "=".into(),

            // Whitespace
            Token::Space => " ".into(),
            Token::Newline => "\n".into(),
            Token::Indent(n) => "  ".repeat(*n),

            // Dynamic
            Token::Ident(name) => tsql::quote_bracket(name),
            Token::QualifiedIdent { schema, name } => match schema {
                Some(s) => format!("{}.{}", tsql::quote_bracket(s), tsql::quote_bracket(name)),
                None => tsql::quote_bracket(name),
            },
            Token::Alias(alias) => (*alias).into(),
            Token::LitInt(n) => n.to_string(),
            Token::Param(name) => name.clone(),
        }
    }
}

/// A stream of tokens that can be serialized to SQL.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TokenStream {
    tokens: Vec<Token>,
}

impl TokenStream {
    /// Create an empty token stream.
    pub fn new() -> Self {
        Self { tokens: vec![] }
    }

    /// Push a single token.
    pub fn push(&mut self, token: Token) -> &mut Self {
        self.tokens.push(token);
        self
    }

    /// Append another token stream.
    pub fn append(&mut self, other: &TokenStream) -> &mut Self {
        self.tokens.extend(other.tokens.iter().cloned());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Serialize all tokens to a SQL string.
    pub fn serialize(&self) -> String {
        self.tokens.iter().map(Token::serialize).collect()
    }

    /// Push `alias.[column]`, or just `[column]` when unqualified.
    pub fn column(&mut self, alias: Option<&'static str>, name: &str) -> &mut Self {
        if let Some(alias) = alias {
            self.push(Token::Alias(alias)).push(Token::Dot);
        }
        self.push(Token::Ident(name.into()))
    }

    /// Start a WHERE clause whose predicates are joined with AND.
    ///
    /// `indent` is the nesting depth of the enclosing SELECT; continuation
    /// lines are indented one level deeper.
    pub fn begin_delimited_where(&mut self, indent: usize) -> DelimitedWhere<'_> {
        DelimitedWhere {
            ts: self,
            indent,
            predicates: 0,
        }
    }

    // Convenience methods for common tokens
    pub fn space(&mut self) -> &mut Self {
        self.push(Token::Space)
    }
    pub fn newline(&mut self) -> &mut Self {
        self.push(Token::Newline)
    }
    pub fn indent(&mut self, n: usize) -> &mut Self {
        if n > 0 {
            self.push(Token::Indent(n));
        }
        self
    }
    pub fn comma(&mut self) -> &mut Self {
        self.push(Token::Comma)
    }
    pub fn lparen(&mut self) -> &mut Self {
        self.push(Token::LParen)
    }
    pub fn rparen(&mut self) -> &mut Self {
        self.push(Token::RParen)
    }
}

/// An open WHERE clause.
///
/// Nothing is written until the first [`predicate`](Self::predicate) call,
/// which emits `WHERE`; every later call emits `AND` on a new line. A clause
/// that never receives a predicate leaves the stream untouched.
#[derive(Debug)]
pub struct DelimitedWhere<'a> {
    ts: &'a mut TokenStream,
    indent: usize,
    predicates: usize,
}

impl DelimitedWhere<'_> {
    /// Open the next predicate slot and return the stream to write it into.
    pub fn predicate(&mut self) -> &mut TokenStream {
        self.ts.newline();
        if self.predicates == 0 {
            self.ts.indent(self.indent).push(Token::Where);
        } else {
            self.ts.indent(self.indent + 1).push(Token::And);
        }
        self.ts.space();
        self.predicates += 1;
        &mut *self.ts
    }

    /// Number of predicates written so far.
    pub fn len(&self) -> usize {
        self.predicates
    }

    pub fn is_empty(&self) -> bool {
        self.predicates == 0
    }
}
