//! Reconcile a handful of imported bank transactions against tenant rules

use bank_rules_core::utils::{validate_rule, MemoryStore};
use bank_rules_core::{
    BankTransaction, BankTransactionRule, Direction, EngineConfig, Invoice, ReconciliationEngine,
    RuleClause,
};
use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")),
        )
        .with_target(true)
        .with_level(true)
        .init();

    let store = MemoryStore::new();
    let date = NaiveDate::from_ymd_opt(2024, 7, 1).ok_or("invalid date")?;

    // Small card payments to the coffee shop become expenses
    let mut coffee = BankTransactionRule::new(
        "rule-coffee".to_string(),
        "acme".to_string(),
        "Coffee".to_string(),
        Direction::Debit,
    )
    .with_clause(RuleClause::new("description", "contains", "coffee"))
    .with_clause(RuleClause::new("amount", "<", 20));
    coffee.matches_on_all = true;
    coffee.auto_convert = true;
    coffee.vendor_id = Some("vendor-bean-co".to_string());
    coffee.category_id = Some("category-meals".to_string());

    // Incoming payments referencing an invoice number are matched
    let mut payments = BankTransactionRule::new(
        "rule-payments".to_string(),
        "acme".to_string(),
        "Invoice payments".to_string(),
        Direction::Credit,
    )
    .with_clause(RuleClause::new("description", "starts_with", "inv-"));
    payments.priority = 1;

    for rule in [coffee, payments] {
        validate_rule(&rule)?;
        store.insert_rule(rule)?;
    }

    store.insert_invoice(Invoice::new(
        "invoice-17".to_string(),
        "acme".to_string(),
        "INV-0017".to_string(),
    ))?;

    let transactions = vec![
        BankTransaction::new(
            "bt-1".to_string(),
            "acme".to_string(),
            Direction::Debit,
            BigDecimal::from(4),
            "Corner Coffee Shop".to_string(),
            date,
        ),
        BankTransaction::new(
            "bt-2".to_string(),
            "acme".to_string(),
            Direction::Credit,
            BigDecimal::from(1200),
            "INV-0017".to_string(),
            date,
        ),
        BankTransaction::new(
            "bt-3".to_string(),
            "acme".to_string(),
            Direction::Debit,
            BigDecimal::from(80),
            "Hardware store".to_string(),
            date,
        ),
    ];

    let mut ids = Vec::new();
    for transaction in transactions {
        ids.push(transaction.id.clone());
        store.insert_transaction(transaction)?;
    }

    let engine = ReconciliationEngine::with_config(store, EngineConfig::from_env());
    for (id, result) in engine.process_batch(&ids).await {
        match result {
            Ok(result) => println!(
                "{id}: {:?} expense={:?} invoice={:?}",
                result.status, result.expense_id, result.invoice_id
            ),
            Err(err) => println!("{id}: failed: {err}"),
        }
    }

    Ok(())
}
