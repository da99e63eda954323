//! Reconciliation of bank transactions against user-defined rules
//!
//! A matching rule either converts the transaction into an expense or, for
//! credit transactions, links it to an invoice whose number equals the
//! transaction description.

pub mod engine;
pub mod expense;

pub use engine::*;
pub use expense::*;
