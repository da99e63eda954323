//! Building expense records from converted transactions

use crate::types::*;

/// Expense fields for `transaction` converted by `rule`
///
/// Amount, date, description and currency come from the transaction. The
/// category falls back to the rule's default only when the transaction has
/// none; vendor and client are always the rule's defaults.
pub fn build_expense(transaction: &BankTransaction, rule: &BankTransactionRule) -> NewExpense {
    NewExpense {
        tenant_id: transaction.tenant_id.clone(),
        transaction_id: transaction.id.clone(),
        amount: transaction.amount_or_zero(),
        date: transaction.date,
        public_notes: transaction.description_or_empty().to_string(),
        currency_id: transaction.currency_id.clone(),
        category_id: transaction
            .category_id
            .clone()
            .or_else(|| rule.category_id.clone()),
        vendor_id: rule.vendor_id.clone(),
        client_id: rule.client_id.clone(),
    }
}
