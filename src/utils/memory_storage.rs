//! In-memory record store for testing

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use crate::traits::*;
use crate::types::*;

fn lock_poisoned<T>(_: PoisonError<T>) -> ReconcileError {
    ReconcileError::Storage("memory store lock poisoned".to_string())
}

/// In-memory implementation of every collaborator the engine needs
///
/// Clones share the same underlying data.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    transactions: Arc<RwLock<HashMap<String, BankTransaction>>>,
    rules: Arc<RwLock<Vec<BankTransactionRule>>>,
    invoices: Arc<RwLock<Vec<Invoice>>>,
    expenses: Arc<RwLock<HashMap<String, Expense>>>,
}

impl MemoryStore {
    /// Create a new, empty store
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_transaction(&self, transaction: BankTransaction) -> ReconcileResult<()> {
        self.transactions
            .write()
            .map_err(lock_poisoned)?
            .insert(transaction.id.clone(), transaction);
        Ok(())
    }

    pub fn insert_rule(&self, rule: BankTransactionRule) -> ReconcileResult<()> {
        self.rules.write().map_err(lock_poisoned)?.push(rule);
        Ok(())
    }

    pub fn insert_invoice(&self, invoice: Invoice) -> ReconcileResult<()> {
        self.invoices.write().map_err(lock_poisoned)?.push(invoice);
        Ok(())
    }

    pub fn expense(&self, expense_id: &str) -> ReconcileResult<Option<Expense>> {
        Ok(self
            .expenses
            .read()
            .map_err(lock_poisoned)?
            .get(expense_id)
            .cloned())
    }

    /// All expenses created for `transaction_id`
    pub fn expenses_for(&self, transaction_id: &str) -> ReconcileResult<Vec<Expense>> {
        Ok(self
            .expenses
            .read()
            .map_err(lock_poisoned)?
            .values()
            .filter(|expense| expense.fields.transaction_id == transaction_id)
            .cloned()
            .collect())
    }

    pub fn expense_count(&self) -> ReconcileResult<usize> {
        Ok(self.expenses.read().map_err(lock_poisoned)?.len())
    }
}

#[async_trait]
impl RuleRepository for MemoryStore {
    async fn find_applicable(
        &self,
        tenant_id: &str,
        direction: Direction,
    ) -> ReconcileResult<Vec<BankTransactionRule>> {
        let mut rules: Vec<BankTransactionRule> = self
            .rules
            .read()
            .map_err(lock_poisoned)?
            .iter()
            .filter(|rule| rule.tenant_id == tenant_id && rule.applies_to == direction)
            .cloned()
            .collect();
        rules.sort_by(|a, b| {
            a.priority
                .cmp(&b.priority)
                .then_with(|| a.created_at.cmp(&b.created_at))
        });
        Ok(rules)
    }
}

#[async_trait]
impl ExpenseWriter for MemoryStore {
    async fn create(&self, expense: NewExpense) -> ReconcileResult<String> {
        let id = uuid::Uuid::new_v4().to_string();
        let record = Expense {
            id: id.clone(),
            fields: expense,
            created_at: chrono::Utc::now().naive_utc(),
        };
        self.expenses
            .write()
            .map_err(lock_poisoned)?
            .insert(id.clone(), record);
        Ok(id)
    }

    async fn discard(&self, expense_id: &str) -> ReconcileResult<()> {
        self.expenses
            .write()
            .map_err(lock_poisoned)?
            .remove(expense_id);
        Ok(())
    }
}

#[async_trait]
impl InvoiceLookup for MemoryStore {
    async fn find_by_number(
        &self,
        tenant_id: &str,
        number: &str,
    ) -> ReconcileResult<Option<String>> {
        let number = number.to_lowercase();
        Ok(self
            .invoices
            .read()
            .map_err(lock_poisoned)?
            .iter()
            .find(|invoice| {
                invoice.tenant_id == tenant_id && invoice.number.to_lowercase() == number
            })
            .map(|invoice| invoice.id.clone()))
    }
}

#[async_trait]
impl TransactionStore for MemoryStore {
    async fn get_transaction(
        &self,
        transaction_id: &str,
    ) -> ReconcileResult<Option<BankTransaction>> {
        Ok(self
            .transactions
            .read()
            .map_err(lock_poisoned)?
            .get(transaction_id)
            .cloned())
    }

    async fn compare_and_set_status(
        &self,
        transaction_id: &str,
        expected: TransactionStatus,
        new_status: TransactionStatus,
        update: &StatusUpdate,
    ) -> ReconcileResult<bool> {
        // Check and write under one write lock so the update is atomic
        let mut transactions = self.transactions.write().map_err(lock_poisoned)?;
        let transaction = transactions
            .get_mut(transaction_id)
            .ok_or_else(|| ReconcileError::TransactionNotFound(transaction_id.to_string()))?;

        if transaction.status != expected {
            return Ok(false);
        }

        transaction.apply_update(new_status, update);
        Ok(true)
    }
}
