//! Rule clauses and the predicate evaluator

pub mod clause;
pub mod evaluator;

pub use clause::*;
pub use evaluator::*;
