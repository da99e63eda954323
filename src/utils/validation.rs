//! Validation utilities for authored rules
//!
//! Evaluation never rejects a rule: malformed clauses simply fail to match.
//! These checks are for hosts that want to refuse such rules when they are
//! saved.

use crate::types::*;

/// Validate that a rule name is valid
pub fn validate_rule_name(name: &str) -> ReconcileResult<()> {
    if name.trim().is_empty() {
        return Err(ReconcileError::Validation(
            "Rule name cannot be empty".to_string(),
        ));
    }

    if name.len() > 100 {
        return Err(ReconcileError::Validation(
            "Rule name cannot exceed 100 characters".to_string(),
        ));
    }

    Ok(())
}

/// Validate a rule before it is stored
pub fn validate_rule(rule: &BankTransactionRule) -> ReconcileResult<()> {
    validate_rule_name(&rule.name)?;

    if rule.clauses.is_empty() {
        return Err(ReconcileError::Validation(format!(
            "Rule '{}' must have at least one clause",
            rule.name
        )));
    }

    for (index, clause) in rule.clauses.iter().enumerate() {
        clause.compile().map_err(|err| {
            ReconcileError::Validation(format!(
                "Rule '{}' clause {}: {}",
                rule.name,
                index + 1,
                err
            ))
        })?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::RuleClause;

    fn rule(name: &str) -> BankTransactionRule {
        BankTransactionRule::new(
            "r1".to_string(),
            "acme".to_string(),
            name.to_string(),
            Direction::Debit,
        )
    }

    #[test]
    fn test_valid_rule() {
        let rule = rule("Coffee")
            .with_clause(RuleClause::new("description", "contains", "coffee"))
            .with_clause(RuleClause::new("amount", "<", 20));
        assert!(validate_rule(&rule).is_ok());
    }

    #[test]
    fn test_rule_without_clauses_is_rejected() {
        assert!(matches!(
            validate_rule(&rule("Empty")),
            Err(ReconcileError::Validation(_))
        ));
    }

    #[test]
    fn test_rule_name_must_not_be_blank() {
        let rule = rule("  ").with_clause(RuleClause::new("amount", "=", 1));
        assert!(validate_rule(&rule).is_err());
    }

    #[test]
    fn test_malformed_clause_is_reported_with_position() {
        let rule = rule("Bad")
            .with_clause(RuleClause::new("description", "is", "x"))
            .with_clause(RuleClause::new("amount", "starts_with", "1"));

        match validate_rule(&rule) {
            Err(ReconcileError::Validation(message)) => {
                assert!(message.contains("clause 2"), "{message}");
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }
}
