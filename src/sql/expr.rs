//! Expression tree for report queries.
//!
//! Only the shapes the reports actually use are representable: column
//! references, integer and string constants, bind parameters, comparisons,
//! boolean connectives, aggregates, searched CASE, `NOT IN` and NULL tests.

use super::query::SelectExpr;
use super::token::{Token, TokenStream};

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// `column` or `table.column`.
    Column {
        table: Option<String>,
        column: String,
    },
    /// Trusted integer constant.
    Int(i64),
    /// Trusted string constant. User input goes through [`Expr::Param`].
    Str(String),
    /// Positional bind parameter (1-based). The value travels separately.
    Param(usize),
    /// Bare `*`, only meaningful as a COUNT argument.
    Star,
    Binary {
        left: Box<Expr>,
        op: BinaryOperator,
        right: Box<Expr>,
    },
    /// Aggregate or scalar function call.
    Call {
        name: &'static str,
        args: Vec<Expr>,
        distinct: bool,
    },
    /// `CASE WHEN .. THEN .. [ELSE ..] END`
    Case {
        branches: Vec<(Expr, Expr)>,
        otherwise: Option<Box<Expr>>,
    },
    /// `expr NOT IN (values..)`
    NotIn { expr: Box<Expr>, values: Vec<Expr> },
    /// `expr IS [NOT] NULL`
    IsNull { expr: Box<Expr>, negated: bool },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOperator {
    Eq,
    Gt,
    And,
    Or,
}

impl BinaryOperator {
    fn token(self) -> Token {
        match self {
            BinaryOperator::Eq => Token::Eq,
            BinaryOperator::Gt => Token::Gt,
            BinaryOperator::And => Token::And,
            BinaryOperator::Or => Token::Or,
        }
    }
}

impl Expr {
    pub fn to_tokens(&self) -> TokenStream {
        let mut ts = TokenStream::new();
        self.emit(&mut ts);
        ts
    }

    /// Append this expression's tokens to `ts`.
    pub fn emit(&self, ts: &mut TokenStream) {
        match self {
            Expr::Column { table, column } => {
                if let Some(table) = table {
                    ts.push(Token::Ident(table.clone())).push(Token::Dot);
                }
                ts.push(Token::Ident(column.clone()));
            }
            Expr::Int(n) => {
                ts.push(Token::LitInt(*n));
            }
            Expr::Str(s) => {
                ts.push(Token::LitString(s.clone()));
            }
            Expr::Param(index) => {
                ts.push(Token::Param(*index));
            }
            Expr::Star => {
                ts.push(Token::Star);
            }
            Expr::Binary { left, op, right } => {
                left.emit_operand(*op, ts);
                ts.keyword(op.token());
                right.emit_operand(*op, ts);
            }
            Expr::Call {
                name,
                args,
                distinct,
            } => {
                ts.push(Token::FunctionName((*name).to_string()))
                    .push(Token::LParen);
                if *distinct {
                    ts.push(Token::Distinct).space();
                }
                ts.comma_separated(args, Expr::emit).push(Token::RParen);
            }
            Expr::Case {
                branches,
                otherwise,
            } => {
                ts.push(Token::Case);
                for (condition, result) in branches {
                    ts.keyword(Token::When);
                    condition.emit(ts);
                    ts.keyword(Token::Then);
                    result.emit(ts);
                }
                if let Some(otherwise) = otherwise {
                    ts.keyword(Token::Else);
                    otherwise.emit(ts);
                }
                ts.space().push(Token::End);
            }
            Expr::NotIn { expr, values } => {
                // `x NOT IN ()` is not valid SQL; with nothing to exclude it holds.
                if values.is_empty() {
                    ts.push(Token::LitBool(true));
                    return;
                }
                expr.emit(ts);
                ts.keyword(Token::Not)
                    .push(Token::In)
                    .space()
                    .push(Token::LParen)
                    .comma_separated(values, Expr::emit)
                    .push(Token::RParen);
            }
            Expr::IsNull { expr, negated } => {
                expr.emit(ts);
                ts.space()
                    .push(if *negated { Token::IsNotNull } else { Token::IsNull });
            }
        }
    }

    /// An OR directly under an AND keeps its own grouping.
    fn emit_operand(&self, parent: BinaryOperator, ts: &mut TokenStream) {
        let grouped = parent == BinaryOperator::And
            && matches!(
                self,
                Expr::Binary {
                    op: BinaryOperator::Or,
                    ..
                }
            );
        if grouped {
            ts.push(Token::LParen);
            self.emit(ts);
            ts.push(Token::RParen);
        } else {
            self.emit(ts);
        }
    }
}

pub fn col(name: &str) -> Expr {
    Expr::Column {
        table: None,
        column: name.into(),
    }
}

pub fn table_col(table: &str, column: &str) -> Expr {
    Expr::Column {
        table: Some(table.into()),
        column: column.into(),
    }
}

pub fn lit_int(n: i64) -> Expr {
    Expr::Int(n)
}

pub fn lit_str(s: &str) -> Expr {
    Expr::Str(s.into())
}

/// The `index`-th (1-based) positional parameter.
pub fn param(index: usize) -> Expr {
    Expr::Param(index)
}

/// Searched CASE over `(condition, result)` branches.
pub fn case_when(branches: Vec<(Expr, Expr)>, otherwise: Option<Expr>) -> Expr {
    Expr::Case {
        branches,
        otherwise: otherwise.map(Box::new),
    }
}

fn call(name: &'static str, args: Vec<Expr>, distinct: bool) -> Expr {
    Expr::Call {
        name,
        args,
        distinct,
    }
}

pub fn count(expr: Expr) -> Expr {
    call("COUNT", vec![expr], false)
}

pub fn count_star() -> Expr {
    call("COUNT", vec![Expr::Star], false)
}

pub fn count_distinct(expr: Expr) -> Expr {
    call("COUNT", vec![expr], true)
}

pub fn sum(expr: Expr) -> Expr {
    call("SUM", vec![expr], false)
}

pub fn coalesce(args: Vec<Expr>) -> Expr {
    call("COALESCE", args, false)
}

/// Fluent combinators on [`Expr`].
pub trait ExprExt {
    fn eq(self, other: Expr) -> Expr;
    fn gt(self, other: Expr) -> Expr;
    fn and(self, other: Expr) -> Expr;
    fn or(self, other: Expr) -> Expr;
    #[allow(clippy::wrong_self_convention)]
    fn is_null(self) -> Expr;
    #[allow(clippy::wrong_self_convention)]
    fn is_not_null(self) -> Expr;
    fn not_in_list(self, values: Vec<Expr>) -> Expr;
    /// SELECT list item named `name`.
    fn alias(self, name: &str) -> SelectExpr;
}

impl ExprExt for Expr {
    fn eq(self, other: Expr) -> Expr {
        binary(self, BinaryOperator::Eq, other)
    }

    fn gt(self, other: Expr) -> Expr {
        binary(self, BinaryOperator::Gt, other)
    }

    fn and(self, other: Expr) -> Expr {
        binary(self, BinaryOperator::And, other)
    }

    fn or(self, other: Expr) -> Expr {
        binary(self, BinaryOperator::Or, other)
    }

    fn is_null(self) -> Expr {
        Expr::IsNull {
            expr: Box::new(self),
            negated: false,
        }
    }

    fn is_not_null(self) -> Expr {
        Expr::IsNull {
            expr: Box::new(self),
            negated: true,
        }
    }

    fn not_in_list(self, values: Vec<Expr>) -> Expr {
        Expr::NotIn {
            expr: Box::new(self),
            values,
        }
    }

    fn alias(self, name: &str) -> SelectExpr {
        SelectExpr::new(self).named(name)
    }
}

fn binary(left: Expr, op: BinaryOperator, right: Expr) -> Expr {
    Expr::Binary {
        left: Box::new(left),
        op,
        right: Box::new(right),
    }
}
