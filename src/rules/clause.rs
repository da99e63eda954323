//! Rule clauses: the persisted `{search_key, operator, value}` form and the
//! typed predicates it compiles to

use bigdecimal::BigDecimal;
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::types::BankTransaction;

/// Literal a clause compares against, as authored
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ClauseValue {
    Text(String),
    Number(BigDecimal),
}

impl<'de> Deserialize<'de> for ClauseValue {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(ClauseValueVisitor)
    }
}

struct ClauseValueVisitor;

impl<'de> Visitor<'de> for ClauseValueVisitor {
    type Value = ClauseValue;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a string or a number")
    }

    fn visit_str<E: de::Error>(self, value: &str) -> Result<Self::Value, E> {
        Ok(ClauseValue::Text(value.to_string()))
    }

    fn visit_string<E: de::Error>(self, value: String) -> Result<Self::Value, E> {
        Ok(ClauseValue::Text(value))
    }

    fn visit_i64<E: de::Error>(self, value: i64) -> Result<Self::Value, E> {
        Ok(ClauseValue::Number(BigDecimal::from(value)))
    }

    fn visit_u64<E: de::Error>(self, value: u64) -> Result<Self::Value, E> {
        Ok(ClauseValue::Number(BigDecimal::from(value)))
    }

    // Floats go through their shortest round-trip text so 19.99 stays 19.99
    fn visit_f64<E: de::Error>(self, value: f64) -> Result<Self::Value, E> {
        if !value.is_finite() {
            return Err(E::custom(format!("clause value {value} is not a finite number")));
        }
        BigDecimal::from_str(&value.to_string())
            .map(ClauseValue::Number)
            .map_err(E::custom)
    }
}

impl ClauseValue {
    /// The value as text, numbers rendered in their decimal form
    pub fn as_text(&self) -> String {
        match self {
            ClauseValue::Text(text) => text.clone(),
            ClauseValue::Number(number) => number.to_string(),
        }
    }

    /// The value coerced to a decimal, if it is one
    pub fn as_decimal(&self) -> Option<BigDecimal> {
        match self {
            ClauseValue::Number(number) => Some(number.clone()),
            ClauseValue::Text(text) => BigDecimal::from_str(text.trim()).ok(),
        }
    }
}

impl From<&str> for ClauseValue {
    fn from(value: &str) -> Self {
        ClauseValue::Text(value.to_string())
    }
}

impl From<i32> for ClauseValue {
    fn from(value: i32) -> Self {
        ClauseValue::Number(BigDecimal::from(value))
    }
}

impl From<i64> for ClauseValue {
    fn from(value: i64) -> Self {
        ClauseValue::Number(BigDecimal::from(value))
    }
}

impl From<BigDecimal> for ClauseValue {
    fn from(value: BigDecimal) -> Self {
        ClauseValue::Number(value)
    }
}

/// A single field/operator/value predicate as stored with its rule
///
/// Operators are kept as their exact symbols; they are matched by symbol,
/// never parsed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleClause {
    pub search_key: String,
    pub operator: String,
    pub value: ClauseValue,
}

impl RuleClause {
    pub fn new(
        search_key: impl Into<String>,
        operator: impl Into<String>,
        value: impl Into<ClauseValue>,
    ) -> Self {
        Self {
            search_key: search_key.into(),
            operator: operator.into(),
            value: value.into(),
        }
    }

    /// Compile into a typed predicate
    ///
    /// Unknown search keys, operators that do not belong to the field's type
    /// and values that cannot be coerced all yield an error; callers
    /// evaluating rules treat that as "never matches".
    pub fn compile(&self) -> Result<Predicate, ClauseError> {
        let key = SearchKey::from_str(&self.search_key)?;
        match key {
            SearchKey::Text(field) => {
                let op = TextOperator::from_str(&self.operator).map_err(|_| {
                    ClauseError::OperatorMismatch {
                        search_key: self.search_key.clone(),
                        operator: self.operator.clone(),
                    }
                })?;
                Ok(Predicate::Text {
                    field,
                    op,
                    value: self.value.as_text(),
                })
            }
            SearchKey::Numeric(field) => {
                let op = NumericOperator::from_str(&self.operator).map_err(|_| {
                    ClauseError::OperatorMismatch {
                        search_key: self.search_key.clone(),
                        operator: self.operator.clone(),
                    }
                })?;
                let value = self
                    .value
                    .as_decimal()
                    .ok_or_else(|| ClauseError::InvalidValue(self.value.as_text()))?;
                Ok(Predicate::Numeric { field, op, value })
            }
        }
    }
}

/// Why a persisted clause could not be compiled
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ClauseError {
    #[error("unknown search key \"{0}\"")]
    UnknownSearchKey(String),
    #[error("operator \"{operator}\" is not valid for search key \"{search_key}\"")]
    OperatorMismatch { search_key: String, operator: String },
    #[error("value \"{0}\" is not a number")]
    InvalidValue(String),
}

/// String-typed transaction fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextField {
    Description,
}

impl TextField {
    pub fn read<'a>(&self, transaction: &'a BankTransaction) -> &'a str {
        match self {
            TextField::Description => transaction.description_or_empty(),
        }
    }
}

/// Numeric transaction fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NumericField {
    Amount,
}

impl NumericField {
    pub fn read(&self, transaction: &BankTransaction) -> BigDecimal {
        match self {
            NumericField::Amount => transaction.amount_or_zero(),
        }
    }
}

/// Transaction field selected by a clause's `search_key`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SearchKey {
    Text(TextField),
    Numeric(NumericField),
}

impl SearchKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchKey::Text(TextField::Description) => "description",
            SearchKey::Numeric(NumericField::Amount) => "amount",
        }
    }
}

impl FromStr for SearchKey {
    type Err = ClauseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "description" => Ok(SearchKey::Text(TextField::Description)),
            "amount" => Ok(SearchKey::Numeric(NumericField::Amount)),
            other => Err(ClauseError::UnknownSearchKey(other.to_string())),
        }
    }
}

/// Operators for string fields, all case-insensitive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextOperator {
    Is,
    Contains,
    StartsWith,
    /// Ignores the clause value
    IsEmpty,
}

impl TextOperator {
    pub fn as_str(&self) -> &'static str {
        match self {
            TextOperator::Is => "is",
            TextOperator::Contains => "contains",
            TextOperator::StartsWith => "starts_with",
            TextOperator::IsEmpty => "is_empty",
        }
    }

    pub fn apply(&self, field: &str, value: &str) -> bool {
        match self {
            TextOperator::IsEmpty => field.is_empty(),
            TextOperator::Is => field.to_lowercase() == value.to_lowercase(),
            TextOperator::Contains => field.to_lowercase().contains(&value.to_lowercase()),
            TextOperator::StartsWith => field.to_lowercase().starts_with(&value.to_lowercase()),
        }
    }
}

impl FromStr for TextOperator {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "is" => Ok(TextOperator::Is),
            "contains" => Ok(TextOperator::Contains),
            "starts_with" => Ok(TextOperator::StartsWith),
            "is_empty" => Ok(TextOperator::IsEmpty),
            _ => Err(()),
        }
    }
}

/// Operators for numeric fields, compared exactly
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NumericOperator {
    Eq,
    Lt,
    Le,
    Gt,
    Ge,
}

impl NumericOperator {
    pub fn as_str(&self) -> &'static str {
        match self {
            NumericOperator::Eq => "=",
            NumericOperator::Lt => "<",
            NumericOperator::Le => "<=",
            NumericOperator::Gt => ">",
            NumericOperator::Ge => ">=",
        }
    }

    pub fn apply(&self, field: &BigDecimal, value: &BigDecimal) -> bool {
        match self {
            NumericOperator::Eq => field == value,
            NumericOperator::Lt => field < value,
            NumericOperator::Le => field <= value,
            NumericOperator::Gt => field > value,
            NumericOperator::Ge => field >= value,
        }
    }
}

impl FromStr for NumericOperator {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "=" => Ok(NumericOperator::Eq),
            "<" => Ok(NumericOperator::Lt),
            "<=" => Ok(NumericOperator::Le),
            ">" => Ok(NumericOperator::Gt),
            ">=" => Ok(NumericOperator::Ge),
            _ => Err(()),
        }
    }
}

/// A compiled clause; field and operator types always agree
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    Text {
        field: TextField,
        op: TextOperator,
        value: String,
    },
    Numeric {
        field: NumericField,
        op: NumericOperator,
        value: BigDecimal,
    },
}

impl Predicate {
    pub fn test(&self, transaction: &BankTransaction) -> bool {
        match self {
            Predicate::Text { field, op, value } => op.apply(field.read(transaction), value),
            Predicate::Numeric { field, op, value } => op.apply(&field.read(transaction), value),
        }
    }
}
