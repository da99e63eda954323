//! Predicate evaluation of a rule's clauses against one transaction

use tracing::debug;

use crate::rules::RuleClause;
use crate::types::*;

/// Evaluates rules against transactions
///
/// Evaluation is pure. A clause that does not compile evaluates to `false`
/// and never affects its sibling clauses.
#[derive(Debug, Clone, Copy, Default)]
pub struct PredicateEvaluator;

impl PredicateEvaluator {
    pub fn new() -> Self {
        Self
    }

    /// Whether `rule` matches `transaction` under its AND/OR policy
    ///
    /// A rule without clauses never matches, whichever policy it uses.
    pub fn matches(&self, rule: &BankTransactionRule, transaction: &BankTransaction) -> bool {
        if rule.clauses.is_empty() {
            return false;
        }

        let mut results = rule
            .clauses
            .iter()
            .map(|clause| self.clause_matches(clause, transaction));

        if rule.matches_on_all {
            results.all(|hit| hit)
        } else {
            results.any(|hit| hit)
        }
    }

    /// Evaluate a single clause
    pub fn clause_matches(&self, clause: &RuleClause, transaction: &BankTransaction) -> bool {
        match clause.compile() {
            Ok(predicate) => predicate.test(transaction),
            Err(err) => {
                debug!(
                    search_key = %clause.search_key,
                    operator = %clause.operator,
                    "skipping malformed clause: {err}"
                );
                false
            }
        }
    }
}

/// Evaluate `rule` against `transaction`
pub fn evaluate(rule: &BankTransactionRule, transaction: &BankTransaction) -> bool {
    PredicateEvaluator.matches(rule, transaction)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::ClauseValue;
    use bigdecimal::BigDecimal;
    use chrono::NaiveDate;
    use std::str::FromStr;

    fn transaction(description: &str, amount: i64) -> BankTransaction {
        BankTransaction::new(
            "bt1".to_string(),
            "acme".to_string(),
            Direction::Debit,
            BigDecimal::from(amount),
            description.to_string(),
            NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
        )
    }

    fn rule(matches_on_all: bool, clauses: Vec<RuleClause>) -> BankTransactionRule {
        let mut rule = BankTransactionRule::new(
            "r1".to_string(),
            "acme".to_string(),
            "test rule".to_string(),
            Direction::Debit,
        );
        rule.matches_on_all = matches_on_all;
        rule.clauses = clauses;
        rule
    }

    fn single(
        search_key: &str,
        operator: &str,
        value: impl Into<ClauseValue>,
    ) -> BankTransactionRule {
        rule(false, vec![RuleClause::new(search_key, operator, value)])
    }

    #[test]
    fn test_string_operators_ignore_case() {
        let txn = transaction("HellO ThErE CowBoY", 100);

        assert!(evaluate(&single("description", "contains", "hello"), &txn));
        assert!(evaluate(&single("description", "is", "hello there cowboy"), &txn));
        assert!(evaluate(&single("description", "starts_with", "HELLO"), &txn));
        assert!(!evaluate(&single("description", "is", "hello"), &txn));
    }

    #[test]
    fn test_starts_with_and_contains_misses() {
        let txn = transaction("ChESSSty coughs are terrible", 100);
        assert!(evaluate(&single("description", "starts_with", "chess"), &txn));
        assert!(!evaluate(&single("description", "starts_with", "chesst"), &txn));

        let txn = transaction("Something asd bizarre", 100);
        assert!(evaluate(&single("description", "contains", "asd"), &txn));
        assert!(!evaluate(&single("description", "contains", "asdddfd"), &txn));

        let txn = transaction("Wall", 100);
        assert!(!evaluate(&single("description", "is", "wallaby"), &txn));
    }

    #[test]
    fn test_is_empty_ignores_value() {
        let empty = transaction("", 100);
        let filled = transaction("asdadsa", 100);

        assert!(evaluate(&single("description", "is_empty", ""), &empty));
        assert!(evaluate(&single("description", "is_empty", "asdadsa"), &empty));
        assert!(!evaluate(&single("description", "is_empty", ""), &filled));
        assert!(!evaluate(&single("description", "is_empty", "asdadsa"), &filled));

        let mut absent = transaction("", 100);
        absent.description = None;
        assert!(evaluate(&single("description", "is_empty", ""), &absent));
    }

    #[test]
    fn test_numeric_boundaries() {
        let hundred = transaction("", 100);
        let ninety_nine = transaction("", 99);
        let hundred_one = transaction("", 101);

        assert!(evaluate(&single("amount", "=", 100), &hundred));
        assert!(evaluate(&single("amount", "<=", 100), &hundred));
        assert!(evaluate(&single("amount", ">=", 100), &hundred));
        assert!(!evaluate(&single("amount", "<", 100), &hundred));
        assert!(!evaluate(&single("amount", ">", 100), &hundred));

        assert!(evaluate(&single("amount", "<", 100), &ninety_nine));
        assert!(evaluate(&single("amount", "<=", 100), &ninety_nine));
        assert!(!evaluate(&single("amount", ">", 100), &ninety_nine));
        assert!(!evaluate(&single("amount", "<", 99), &ninety_nine));

        assert!(evaluate(&single("amount", ">", 100), &hundred_one));
        assert!(!evaluate(&single("amount", "=", 100), &hundred_one));
    }

    #[test]
    fn test_numeric_comparison_is_exact_decimal() {
        let mut txn = transaction("", 0);
        txn.amount = Some(BigDecimal::from_str("100.00").unwrap());
        assert!(evaluate(&single("amount", "=", "100"), &txn));

        txn.amount = Some(BigDecimal::from_str("100.01").unwrap());
        assert!(!evaluate(&single("amount", "<=", 100), &txn));
        assert!(evaluate(&single("amount", ">", "100.001"), &txn));
    }

    #[test]
    fn test_missing_amount_compares_as_zero() {
        let mut txn = transaction("", 0);
        txn.amount = None;
        assert!(evaluate(&single("amount", "=", 0), &txn));
        assert!(evaluate(&single("amount", "<", 1), &txn));
    }

    #[test]
    fn test_and_requires_every_clause() {
        let txn = transaction("Office supplies", 40);
        let clauses = vec![
            RuleClause::new("description", "contains", "office"),
            RuleClause::new("amount", "<", 50),
        ];
        assert!(evaluate(&rule(true, clauses.clone()), &txn));

        let mut failing = clauses;
        failing.push(RuleClause::new("amount", ">", 45));
        assert!(!evaluate(&rule(true, failing), &txn));
    }

    #[test]
    fn test_or_requires_any_clause() {
        let txn = transaction("Office supplies", 40);
        let clauses = vec![
            RuleClause::new("description", "is", "rent"),
            RuleClause::new("amount", "=", 40),
        ];
        assert!(evaluate(&rule(false, clauses), &txn));

        let misses = vec![
            RuleClause::new("description", "is", "rent"),
            RuleClause::new("amount", "=", 41),
        ];
        assert!(!evaluate(&rule(false, misses), &txn));
    }

    #[test]
    fn test_empty_rule_never_matches() {
        let txn = transaction("anything", 1);
        assert!(!evaluate(&rule(true, Vec::new()), &txn));
        assert!(!evaluate(&rule(false, Vec::new()), &txn));
    }

    #[test]
    fn test_malformed_clause_fails_closed() {
        let txn = transaction("hello", 10);

        assert!(!evaluate(&single("payee", "is", "hello"), &txn));
        assert!(!evaluate(&single("amount", "contains", "1"), &txn));
        assert!(!evaluate(&single("amount", "=", "ten"), &txn));

        // A bad sibling does not stop an OR rule from matching
        let clauses = vec![
            RuleClause::new("payee", "is", "hello"),
            RuleClause::new("description", "is", "hello"),
        ];
        assert!(evaluate(&rule(false, clauses.clone()), &txn));
        assert!(!evaluate(&rule(true, clauses), &txn));
    }
}
