//! # Bank Rules Core
//!
//! Rule-driven reconciliation of imported bank transactions.
//!
//! ## Features
//!
//! - **Rule clauses**: case-insensitive text operators and exact decimal
//!   comparisons, combined with AND or OR
//! - **Conversion**: matching transactions become expense records, taking vendor,
//!   client and category defaults from the rule
//! - **Invoice matching**: credit transactions are linked to the invoice whose
//!   number equals their description
//! - **Storage abstraction**: the engine only talks to async collaborator
//!   traits, with an in-memory implementation for tests
//!
//! ## Quick Start
//!
//! ```rust
//! use bank_rules_core::{evaluate, BankTransaction, BankTransactionRule, Direction, RuleClause};
//! use bigdecimal::BigDecimal;
//! use chrono::NaiveDate;
//!
//! let mut rule = BankTransactionRule::new(
//!     "r1".to_string(),
//!     "acme".to_string(),
//!     "Coffee".to_string(),
//!     Direction::Debit,
//! )
//! .with_clause(RuleClause::new("description", "contains", "coffee"));
//! rule.auto_convert = true;
//!
//! let transaction = BankTransaction::new(
//!     "bt1".to_string(),
//!     "acme".to_string(),
//!     Direction::Debit,
//!     BigDecimal::from(4),
//!     "Corner COFFEE shop".to_string(),
//!     NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
//! );
//!
//! assert!(evaluate(&rule, &transaction));
//! ```

pub mod config;
pub mod reconciliation;
pub mod rules;
pub mod traits;
pub mod types;
pub mod utils;

// Re-export commonly used types
pub use config::*;
pub use reconciliation::*;
pub use rules::*;
pub use traits::*;
pub use types::*;
