//! Filter predicates over event property values.
//!
//! Window queries accept an optional predicate restricting the returned
//! events. Predicates compare a scalar property against a numeric literal
//! and combine with `and`/`or`/`not`. The textual form matches the query
//! strings the original service accepts:
//!
//! ```
//! use strata_store::FilterExpr;
//!
//! let filter = FilterExpr::parse("Radians lt 3").unwrap();
//! assert_eq!(filter.to_string(), "Radians lt 3");
//!
//! let combined = FilterExpr::parse("Radians lt 3 and not (Sin eq 0)").unwrap();
//! assert!(combined.to_string().contains("and"));
//! ```

use std::cmp::Ordering;
use std::fmt;

use strata_core::{CoreError, Event, Value};

/// A comparison operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    /// Less than.
    Lt,
    /// Less than or equal.
    Le,
    /// Greater than.
    Gt,
    /// Greater than or equal.
    Ge,
    /// Equal.
    Eq,
    /// Not equal.
    Ne,
}

impl CompareOp {
    /// The operator's textual form.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Lt => "lt",
            Self::Le => "le",
            Self::Gt => "gt",
            Self::Ge => "ge",
            Self::Eq => "eq",
            Self::Ne => "ne",
        }
    }

    fn from_token(token: &str) -> Option<Self> {
        match token {
            "lt" => Some(Self::Lt),
            "le" => Some(Self::Le),
            "gt" => Some(Self::Gt),
            "ge" => Some(Self::Ge),
            "eq" => Some(Self::Eq),
            "ne" => Some(Self::Ne),
            _ => None,
        }
    }
}

/// A predicate over an event's property values.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterExpr {
    /// Compare a property against a literal.
    Compare {
        /// The property name.
        property: String,
        /// The comparison operator.
        op: CompareOp,
        /// The literal to compare against.
        value: Value,
    },
    /// Both operands must match.
    And(Box<FilterExpr>, Box<FilterExpr>),
    /// Either operand must match.
    Or(Box<FilterExpr>, Box<FilterExpr>),
    /// The operand must not match.
    Not(Box<FilterExpr>),
}

impl FilterExpr {
    /// Build a comparison predicate.
    #[must_use]
    pub fn compare(property: impl Into<String>, op: CompareOp, value: impl Into<Value>) -> Self {
        Self::Compare { property: property.into(), op, value: value.into() }
    }

    /// Parse a predicate from its textual form, e.g. `"Radians lt 3"`.
    ///
    /// Grammar (keywords are case-insensitive, precedence `not` over `and`
    /// over `or`):
    ///
    /// ```text
    /// expr       := and_expr ('or' and_expr)*
    /// and_expr   := not_expr ('and' not_expr)*
    /// not_expr   := 'not' not_expr | '(' expr ')' | comparison
    /// comparison := property ('lt'|'le'|'gt'|'ge'|'eq'|'ne') number
    /// ```
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Validation`] on malformed input.
    pub fn parse(input: &str) -> Result<Self, CoreError> {
        let tokens = tokenize(input)?;
        let mut parser = Parser { tokens, position: 0 };
        let expr = parser.or_expr()?;
        if parser.position != parser.tokens.len() {
            return Err(CoreError::validation(format!(
                "unexpected trailing input in filter '{input}'"
            )));
        }
        Ok(expr)
    }

    /// Evaluate the predicate against an event.
    ///
    /// Comparisons involving NaN are false, matching IEEE-754 semantics.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Validation`] if the predicate names a property
    /// the event's type does not declare, or compares a non-scalar
    /// property.
    pub fn matches(&self, event: &Event) -> Result<bool, CoreError> {
        match self {
            Self::Compare { property, op, value } => {
                let stored = event.get(property).ok_or_else(|| {
                    CoreError::validation(format!(
                        "filter references unknown property '{property}'"
                    ))
                })?;
                if stored.as_numeric().is_none() {
                    return Err(CoreError::validation(format!(
                        "filter cannot compare {} property '{property}'",
                        stored.kind_name()
                    )));
                }
                Ok(compare_values(stored, value)
                    .is_some_and(|ordering| op_matches(*op, ordering)))
            }
            Self::And(left, right) => Ok(left.matches(event)? && right.matches(event)?),
            Self::Or(left, right) => Ok(left.matches(event)? || right.matches(event)?),
            Self::Not(inner) => Ok(!inner.matches(event)?),
        }
    }
}

const fn op_matches(op: CompareOp, ordering: Ordering) -> bool {
    match op {
        CompareOp::Lt => matches!(ordering, Ordering::Less),
        CompareOp::Le => matches!(ordering, Ordering::Less | Ordering::Equal),
        CompareOp::Gt => matches!(ordering, Ordering::Greater),
        CompareOp::Ge => matches!(ordering, Ordering::Greater | Ordering::Equal),
        CompareOp::Eq => matches!(ordering, Ordering::Equal),
        CompareOp::Ne => !matches!(ordering, Ordering::Equal),
    }
}

fn compare_values(lhs: &Value, rhs: &Value) -> Option<Ordering> {
    match (lhs, rhs) {
        (Value::Int(a), Value::Int(b)) => Some(a.cmp(b)),
        _ => lhs.as_numeric()?.partial_cmp(&rhs.as_numeric()?),
    }
}

impl fmt::Display for FilterExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Compare { property, op, value } => {
                write!(f, "{property} {} {value}", op.as_str())
            }
            Self::And(left, right) => write!(f, "({left} and {right})"),
            Self::Or(left, right) => write!(f, "({left} or {right})"),
            Self::Not(inner) => write!(f, "not {inner}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Word(String),
    Number(Value),
    LParen,
    RParen,
}

fn tokenize(input: &str) -> Result<Vec<Token>, CoreError> {
    let mut tokens = Vec::new();
    let mut chars = input.char_indices().peekable();
    while let Some(&(start, c)) = chars.peek() {
        match c {
            c if c.is_whitespace() => {
                chars.next();
            }
            '(' => {
                chars.next();
                tokens.push(Token::LParen);
            }
            ')' => {
                chars.next();
                tokens.push(Token::RParen);
            }
            _ => {
                let mut end = start;
                while let Some(&(i, c)) = chars.peek() {
                    if c.is_whitespace() || c == '(' || c == ')' {
                        break;
                    }
                    end = i + c.len_utf8();
                    chars.next();
                }
                let word = &input[start..end];
                if word.starts_with(|c: char| c.is_ascii_digit() || c == '-' || c == '.') {
                    tokens.push(Token::Number(parse_number(word)?));
                } else {
                    tokens.push(Token::Word(word.to_owned()));
                }
            }
        }
    }
    Ok(tokens)
}

fn parse_number(word: &str) -> Result<Value, CoreError> {
    if let Ok(i) = word.parse::<i64>() {
        return Ok(Value::Int(i));
    }
    word.parse::<f64>()
        .map(Value::Float)
        .map_err(|_| CoreError::validation(format!("invalid numeric literal '{word}'")))
}

struct Parser {
    tokens: Vec<Token>,
    position: usize,
}

impl Parser {
    fn peek_keyword(&self) -> Option<String> {
        match self.tokens.get(self.position) {
            Some(Token::Word(word)) => Some(word.to_lowercase()),
            _ => None,
        }
    }

    fn or_expr(&mut self) -> Result<FilterExpr, CoreError> {
        let mut expr = self.and_expr()?;
        while self.peek_keyword().as_deref() == Some("or") {
            self.position += 1;
            let right = self.and_expr()?;
            expr = FilterExpr::Or(Box::new(expr), Box::new(right));
        }
        Ok(expr)
    }

    fn and_expr(&mut self) -> Result<FilterExpr, CoreError> {
        let mut expr = self.not_expr()?;
        while self.peek_keyword().as_deref() == Some("and") {
            self.position += 1;
            let right = self.not_expr()?;
            expr = FilterExpr::And(Box::new(expr), Box::new(right));
        }
        Ok(expr)
    }

    fn not_expr(&mut self) -> Result<FilterExpr, CoreError> {
        if self.peek_keyword().as_deref() == Some("not") {
            self.position += 1;
            let inner = self.not_expr()?;
            return Ok(FilterExpr::Not(Box::new(inner)));
        }
        self.primary()
    }

    fn primary(&mut self) -> Result<FilterExpr, CoreError> {
        match self.tokens.get(self.position) {
            Some(Token::LParen) => {
                self.position += 1;
                let expr = self.or_expr()?;
                match self.tokens.get(self.position) {
                    Some(Token::RParen) => {
                        self.position += 1;
                        Ok(expr)
                    }
                    _ => Err(CoreError::validation("expected ')' in filter")),
                }
            }
            Some(Token::Word(property)) => {
                let property = property.clone();
                self.position += 1;
                let op = match self.tokens.get(self.position) {
                    Some(Token::Word(word)) => {
                        CompareOp::from_token(&word.to_lowercase()).ok_or_else(|| {
                            CoreError::validation(format!(
                                "expected comparison operator after '{property}', got '{word}'"
                            ))
                        })?
                    }
                    _ => {
                        return Err(CoreError::validation(format!(
                            "expected comparison operator after '{property}'"
                        )))
                    }
                };
                self.position += 1;
                let value = match self.tokens.get(self.position) {
                    Some(Token::Number(value)) => value.clone(),
                    _ => {
                        return Err(CoreError::validation(format!(
                            "expected numeric literal after '{property} {}'",
                            op.as_str()
                        )))
                    }
                };
                self.position += 1;
                Ok(FilterExpr::Compare { property, op, value })
            }
            _ => Err(CoreError::validation("expected a comparison or '(' in filter")),
        }
    }
}
