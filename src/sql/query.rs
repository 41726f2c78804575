//! SELECT builder.
//!
//! Clauses render one per line in SQL order. Only `LIMIT` consults the
//! dialect while building tokens; everything else is deferred to
//! serialization.

use super::dialect::{Dialect, SqlDialect};
use super::expr::{Expr, ExprExt};
use super::token::{Token, TokenStream};

/// A SELECT list item.
#[derive(Debug, Clone, PartialEq)]
#[must_use = "builders have no effect until used"]
pub struct SelectExpr {
    pub expr: Expr,
    pub alias: Option<String>,
}

impl SelectExpr {
    pub fn new(expr: Expr) -> Self {
        Self { expr, alias: None }
    }

    pub fn named(mut self, alias: &str) -> Self {
        self.alias = Some(alias.into());
        self
    }

    fn emit(&self, ts: &mut TokenStream) {
        self.expr.emit(ts);
        if let Some(alias) = &self.alias {
            ts.keyword(Token::As).push(Token::Ident(alias.clone()));
        }
    }
}

impl From<Expr> for SelectExpr {
    fn from(expr: Expr) -> Self {
        SelectExpr::new(expr)
    }
}

/// A table with an optional alias.
#[derive(Debug, Clone, PartialEq)]
#[must_use = "builders have no effect until used"]
pub struct TableRef {
    pub table: String,
    pub alias: Option<String>,
}

impl TableRef {
    pub fn new(table: &str) -> Self {
        Self {
            table: table.into(),
            alias: None,
        }
    }

    pub fn with_alias(mut self, alias: &str) -> Self {
        self.alias = Some(alias.into());
        self
    }

    fn emit(&self, ts: &mut TokenStream) {
        ts.push(Token::Ident(self.table.clone()));
        if let Some(alias) = &self.alias {
            ts.keyword(Token::As).push(Token::Ident(alias.clone()));
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum JoinKind {
    Inner,
    Left,
}

#[derive(Debug, Clone, PartialEq)]
struct Join {
    kind: JoinKind,
    table: TableRef,
    on: Expr,
}

impl Join {
    fn emit(&self, ts: &mut TokenStream) {
        ts.push(match self.kind {
            JoinKind::Inner => Token::Inner,
            JoinKind::Left => Token::Left,
        })
        .keyword(Token::Join);
        self.table.emit(ts);
        ts.keyword(Token::On);
        self.on.emit(ts);
    }
}

/// One ORDER BY key. The direction is always spelled out.
#[derive(Debug, Clone, PartialEq)]
#[must_use = "builders have no effect until used"]
pub struct OrderByExpr {
    pub expr: Expr,
    pub descending: bool,
}

impl OrderByExpr {
    pub fn asc(expr: Expr) -> Self {
        Self {
            expr,
            descending: false,
        }
    }

    pub fn desc(expr: Expr) -> Self {
        Self {
            expr,
            descending: true,
        }
    }

    fn emit(&self, ts: &mut TokenStream) {
        self.expr.emit(ts);
        ts.space()
            .push(if self.descending { Token::Desc } else { Token::Asc });
    }
}

/// A SELECT statement.
#[derive(Debug, Clone, Default, PartialEq)]
#[must_use = "Query has no effect until rendered with to_sql()"]
pub struct Query {
    select: Vec<SelectExpr>,
    distinct: bool,
    from: Option<TableRef>,
    joins: Vec<Join>,
    where_clause: Option<Expr>,
    group_by: Vec<Expr>,
    having: Option<Expr>,
    order_by: Vec<OrderByExpr>,
    pub limit: Option<u64>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn select(mut self, items: Vec<impl Into<SelectExpr>>) -> Self {
        self.select = items.into_iter().map(Into::into).collect();
        self
    }

    pub fn distinct(mut self) -> Self {
        self.distinct = true;
        self
    }

    pub fn from(mut self, table: TableRef) -> Self {
        self.from = Some(table);
        self
    }

    pub fn inner_join(self, table: TableRef, on: Expr) -> Self {
        self.join(JoinKind::Inner, table, on)
    }

    pub fn left_join(self, table: TableRef, on: Expr) -> Self {
        self.join(JoinKind::Left, table, on)
    }

    fn join(mut self, kind: JoinKind, table: TableRef, on: Expr) -> Self {
        self.joins.push(Join { kind, table, on });
        self
    }

    /// Add a WHERE condition, ANDed onto any existing one.
    pub fn filter(mut self, condition: Expr) -> Self {
        self.where_clause = Some(match self.where_clause.take() {
            Some(existing) => existing.and(condition),
            None => condition,
        });
        self
    }

    pub fn group_by(mut self, exprs: Vec<Expr>) -> Self {
        self.group_by = exprs;
        self
    }

    pub fn having(mut self, condition: Expr) -> Self {
        self.having = Some(condition);
        self
    }

    pub fn order_by(mut self, keys: Vec<OrderByExpr>) -> Self {
        self.order_by = keys;
        self
    }

    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Number of bind parameters the rendered query expects.
    pub fn param_count(&self) -> usize {
        self.to_tokens(Dialect::default()).param_count()
    }

    pub fn to_tokens(&self, dialect: Dialect) -> TokenStream {
        let mut ts = TokenStream::new();

        ts.push(Token::Select);
        if self.distinct {
            ts.space().push(Token::Distinct);
        }
        for (i, item) in self.select.iter().enumerate() {
            if i > 0 {
                ts.push(Token::Comma);
            }
            ts.line(1);
            item.emit(&mut ts);
        }

        if let Some(from) = &self.from {
            ts.line(0).push(Token::From).space();
            from.emit(&mut ts);
        }
        for join in &self.joins {
            ts.line(0);
            join.emit(&mut ts);
        }
        if let Some(condition) = &self.where_clause {
            ts.line(0).push(Token::Where).space();
            condition.emit(&mut ts);
        }
        if !self.group_by.is_empty() {
            ts.line(0)
                .push(Token::GroupBy)
                .space()
                .comma_separated(&self.group_by, Expr::emit);
        }
        if let Some(condition) = &self.having {
            ts.line(0).push(Token::Having).space();
            condition.emit(&mut ts);
        }
        if !self.order_by.is_empty() {
            ts.line(0)
                .push(Token::OrderBy)
                .space()
                .comma_separated(&self.order_by, OrderByExpr::emit);
        }
        if let Some(limit) = self.limit {
            ts.line(0).append(dialect.emit_limit(limit));
        }

        ts
    }

    pub fn to_sql(&self, dialect: Dialect) -> String {
        self.to_tokens(dialect).serialize(dialect)
    }
}

impl std::fmt::Display for Query {
    /// Renders for SQLite; see [`Query::to_sql`] for other dialects.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_sql(Dialect::default()))
    }
}
