//! Core types and data structures for bank transaction reconciliation

use bigdecimal::BigDecimal;
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::rules::RuleClause;

/// Cash-flow direction of a bank transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Direction {
    /// Money leaving the account
    Debit,
    /// Money entering the account
    Credit,
}

/// Reconciliation state of a bank transaction
///
/// `Matched` and `Converted` are terminal: once reached, reconciliation
/// never touches the transaction again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TransactionStatus {
    Unmatched,
    /// Linked to exactly one invoice
    Matched,
    /// Turned into an expense record
    Converted,
}

impl TransactionStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, TransactionStatus::Unmatched)
    }
}

/// A transaction imported from a bank feed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BankTransaction {
    /// Unique identifier for the transaction
    pub id: String,
    /// Owning tenant (company) scope
    pub tenant_id: String,
    /// Bank integration the transaction was imported through
    pub integration_id: Option<String>,
    /// Signed amount; absent amounts compare as zero
    pub amount: Option<BigDecimal>,
    pub currency_id: Option<String>,
    /// Free-text description from the feed; absent descriptions compare as empty
    pub description: Option<String>,
    pub date: NaiveDate,
    pub direction: Direction,
    pub category_id: Option<String>,
    /// Feed-supplied classification; reconciliation never rewrites it
    pub category_type: Option<String>,
    pub status: TransactionStatus,
    /// Set only when `status` is `Converted`
    pub expense_id: Option<String>,
    /// Set only when `status` is `Matched`
    pub invoice_id: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl BankTransaction {
    /// Create a new unmatched transaction
    pub fn new(
        id: String,
        tenant_id: String,
        direction: Direction,
        amount: BigDecimal,
        description: String,
        date: NaiveDate,
    ) -> Self {
        let now = chrono::Utc::now().naive_utc();
        Self {
            id,
            tenant_id,
            integration_id: None,
            amount: Some(amount),
            currency_id: None,
            description: Some(description),
            date,
            direction,
            category_id: None,
            category_type: None,
            status: TransactionStatus::Unmatched,
            expense_id: None,
            invoice_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// The amount, or zero when the feed supplied none
    pub fn amount_or_zero(&self) -> BigDecimal {
        self.amount.clone().unwrap_or_else(|| BigDecimal::from(0))
    }

    /// The description, or the empty string when the feed supplied none
    pub fn description_or_empty(&self) -> &str {
        self.description.as_deref().unwrap_or("")
    }

    /// Apply a successful write-back to the in-memory copy
    pub fn apply_update(&mut self, status: TransactionStatus, update: &StatusUpdate) {
        self.status = status;
        if update.expense_id.is_some() {
            self.expense_id = update.expense_id.clone();
        }
        if update.invoice_id.is_some() {
            self.invoice_id = update.invoice_id.clone();
        }
        if update.category_id.is_some() {
            self.category_id = update.category_id.clone();
        }
        self.updated_at = chrono::Utc::now().naive_utc();
    }
}

/// User-authored rule matched against bank transactions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BankTransactionRule {
    pub id: String,
    pub tenant_id: String,
    pub name: String,
    /// Only transactions of this direction are evaluated against the rule
    pub applies_to: Direction,
    /// `true` combines clauses with AND, `false` with OR
    pub matches_on_all: bool,
    /// `true` creates an expense on match, `false` attempts invoice matching
    pub auto_convert: bool,
    pub client_id: Option<String>,
    pub vendor_id: Option<String>,
    pub category_id: Option<String>,
    /// Evaluation priority, lower values are evaluated first
    #[serde(default)]
    pub priority: u32,
    /// Ordered clause list; an empty list never matches
    #[serde(rename = "rules", default)]
    pub clauses: Vec<RuleClause>,
    /// Tie-breaker for equal priorities, oldest first
    pub created_at: NaiveDateTime,
}

impl BankTransactionRule {
    /// Create a new rule with no clauses and no defaults
    pub fn new(id: String, tenant_id: String, name: String, applies_to: Direction) -> Self {
        Self {
            id,
            tenant_id,
            name,
            applies_to,
            matches_on_all: false,
            auto_convert: false,
            client_id: None,
            vendor_id: None,
            category_id: None,
            priority: 0,
            clauses: Vec::new(),
            created_at: chrono::Utc::now().naive_utc(),
        }
    }

    pub fn with_clause(mut self, clause: RuleClause) -> Self {
        self.clauses.push(clause);
        self
    }
}

/// Fields written back to a transaction together with its new status
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatusUpdate {
    pub expense_id: Option<String>,
    pub invoice_id: Option<String>,
    pub category_id: Option<String>,
}

/// Field values for an expense created from a converted transaction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewExpense {
    pub tenant_id: String,
    /// Originating bank transaction
    pub transaction_id: String,
    pub amount: BigDecimal,
    pub date: NaiveDate,
    pub public_notes: String,
    pub currency_id: Option<String>,
    pub category_id: Option<String>,
    pub vendor_id: Option<String>,
    pub client_id: Option<String>,
}

/// A persisted expense record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expense {
    pub id: String,
    pub fields: NewExpense,
    pub created_at: NaiveDateTime,
}

/// An invoice that credit transactions can be matched against
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Invoice {
    pub id: String,
    pub tenant_id: String,
    pub number: String,
}

impl Invoice {
    pub fn new(id: String, tenant_id: String, number: String) -> Self {
        Self {
            id,
            tenant_id,
            number,
        }
    }
}

/// Outcome of a reconciliation run for one transaction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionResult {
    pub transaction_id: String,
    pub status: TransactionStatus,
    pub expense_id: Option<String>,
    pub invoice_id: Option<String>,
}

impl From<&BankTransaction> for TransactionResult {
    fn from(transaction: &BankTransaction) -> Self {
        Self {
            transaction_id: transaction.id.clone(),
            status: transaction.status,
            expense_id: transaction.expense_id.clone(),
            invoice_id: transaction.invoice_id.clone(),
        }
    }
}

/// Errors that can occur while reconciling transactions
#[derive(Debug, thiserror::Error)]
pub enum ReconcileError {
    /// Record store unavailable or failing; transient, never retried here
    #[error("Storage error: {0}")]
    Storage(String),
    #[error("Transaction not found: {0}")]
    TransactionNotFound(String),
    #[error("Conversion failed: {0}")]
    ConversionFailed(String),
    /// The conditional write-back found the transaction no longer unmatched
    #[error("Transaction already reconciled: {0}")]
    AlreadyReconciled(String),
    #[error("Validation error: {0}")]
    Validation(String),
}

/// Result type for reconciliation operations
pub type ReconcileResult<T> = Result<T, ReconcileError>;
