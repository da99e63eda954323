//! Traits for the record store collaborators the engine depends on

use async_trait::async_trait;

use crate::types::*;

/// Source of candidate rules for a tenant
#[async_trait]
pub trait RuleRepository: Send + Sync {
    /// Rules owned by `tenant_id` that apply to `direction`
    ///
    /// Implementations should return rules in evaluation order (priority,
    /// then creation time); the engine re-sorts defensively.
    async fn find_applicable(
        &self,
        tenant_id: &str,
        direction: Direction,
    ) -> ReconcileResult<Vec<BankTransactionRule>>;
}

/// Creates expense records from converted transactions
#[async_trait]
pub trait ExpenseWriter: Send + Sync {
    /// Persist a new expense and return its id
    async fn create(&self, expense: NewExpense) -> ReconcileResult<String>;

    /// Remove an expense that was created for a write-back that lost a race
    async fn discard(&self, expense_id: &str) -> ReconcileResult<()>;
}

/// Invoice lookup used to match credit transactions
#[async_trait]
pub trait InvoiceLookup: Send + Sync {
    /// Find an invoice of `tenant_id` whose number equals `number`,
    /// compared case-insensitively
    async fn find_by_number(&self, tenant_id: &str, number: &str)
        -> ReconcileResult<Option<String>>;
}

/// Storage for bank transactions under reconciliation
#[async_trait]
pub trait TransactionStore: Send + Sync {
    /// Get a transaction by ID
    async fn get_transaction(&self, transaction_id: &str)
        -> ReconcileResult<Option<BankTransaction>>;

    /// Atomically move a transaction from `expected` to `new_status`,
    /// writing `update` in the same step
    ///
    /// Returns `false` without writing anything when the stored status is
    /// not `expected`.
    async fn compare_and_set_status(
        &self,
        transaction_id: &str,
        expected: TransactionStatus,
        new_status: TransactionStatus,
        update: &StatusUpdate,
    ) -> ReconcileResult<bool>;
}

/// Everything the reconciliation engine needs from its host
pub trait ReconciliationStore:
    RuleRepository + ExpenseWriter + InvoiceLookup + TransactionStore
{
}

impl<T> ReconciliationStore for T where
    T: RuleRepository + ExpenseWriter + InvoiceLookup + TransactionStore
{
}
