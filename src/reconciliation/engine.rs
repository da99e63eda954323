//! Rule-driven reconciliation of bank transactions

use tracing::{debug, error, info, instrument, warn};

use crate::config::EngineConfig;
use crate::reconciliation::build_expense;
use crate::rules::PredicateEvaluator;
use crate::traits::*;
use crate::types::*;

/// Applies a tenant's rules to bank transactions
///
/// Rules are evaluated in priority order, oldest first among equal
/// priorities. The first converting rule that matches ends the search; a
/// non-converting rule only ends it when an invoice is found.
pub struct ReconciliationEngine<S: ReconciliationStore> {
    storage: S,
    evaluator: PredicateEvaluator,
    config: EngineConfig,
}

impl<S: ReconciliationStore> ReconciliationEngine<S> {
    /// Create a new engine with the default configuration
    pub fn new(storage: S) -> Self {
        Self::with_config(storage, EngineConfig::default())
    }

    pub fn with_config(storage: S, config: EngineConfig) -> Self {
        Self {
            storage,
            evaluator: PredicateEvaluator::new(),
            config,
        }
    }

    /// Reconcile the stored transaction `transaction_id`
    #[instrument(skip(self))]
    pub async fn process_rules(&self, transaction_id: &str) -> ReconcileResult<TransactionResult> {
        let transaction = self
            .storage
            .get_transaction(transaction_id)
            .await?
            .ok_or_else(|| ReconcileError::TransactionNotFound(transaction_id.to_string()))?;

        let transaction = self.reconcile(transaction).await?;
        Ok(TransactionResult::from(&transaction))
    }

    /// Reconcile several transactions independently
    ///
    /// A failure for one id is reported in its slot and does not stop the
    /// others.
    pub async fn process_batch(
        &self,
        transaction_ids: &[String],
    ) -> Vec<(String, ReconcileResult<TransactionResult>)> {
        let mut results = Vec::with_capacity(transaction_ids.len());
        for transaction_id in transaction_ids {
            let result = self.process_rules(transaction_id).await;
            if let Err(err) = &result {
                warn!(%transaction_id, "reconciliation failed: {err}");
            }
            results.push((transaction_id.clone(), result));
        }
        results
    }

    /// Run the rules against `transaction` and return its new state
    ///
    /// Terminal transactions are returned untouched.
    pub async fn reconcile(
        &self,
        transaction: BankTransaction,
    ) -> ReconcileResult<BankTransaction> {
        if transaction.status.is_terminal() {
            debug!(
                transaction_id = %transaction.id,
                status = ?transaction.status,
                "transaction already reconciled, skipping"
            );
            return Ok(transaction);
        }

        let rules = self.candidate_rules(&transaction).await?;
        debug!(
            transaction_id = %transaction.id,
            candidates = rules.len(),
            "evaluating rules"
        );

        for rule in &rules {
            if !self.evaluator.matches(rule, &transaction) {
                continue;
            }

            debug!(transaction_id = %transaction.id, rule_id = %rule.id, "rule matched");

            if rule.auto_convert {
                return self.convert(transaction, rule).await;
            }

            if transaction.direction == Direction::Credit {
                if let Some(invoice_id) = self.find_invoice(&transaction).await? {
                    return self.match_invoice(transaction, invoice_id).await;
                }
            }

            debug!(
                transaction_id = %transaction.id,
                rule_id = %rule.id,
                "no invoice found for matching rule, continuing"
            );
        }

        if transaction.direction == Direction::Credit && self.config.credit_invoice_fallback {
            if let Some(invoice_id) = self.find_invoice(&transaction).await? {
                return self.match_invoice(transaction, invoice_id).await;
            }
        }

        debug!(transaction_id = %transaction.id, "transaction left unmatched");
        Ok(transaction)
    }

    /// Rules of the transaction's tenant and direction, in evaluation order
    async fn candidate_rules(
        &self,
        transaction: &BankTransaction,
    ) -> ReconcileResult<Vec<BankTransactionRule>> {
        let mut rules: Vec<BankTransactionRule> = self
            .storage
            .find_applicable(&transaction.tenant_id, transaction.direction)
            .await?
            .into_iter()
            .filter(|rule| {
                rule.tenant_id == transaction.tenant_id && rule.applies_to == transaction.direction
            })
            .collect();

        rules.sort_by(|a, b| {
            a.priority
                .cmp(&b.priority)
                .then_with(|| a.created_at.cmp(&b.created_at))
        });

        Ok(rules)
    }

    async fn find_invoice(&self, transaction: &BankTransaction) -> ReconcileResult<Option<String>> {
        let number = transaction.description_or_empty();
        if number.is_empty() {
            return Ok(None);
        }
        self.storage
            .find_by_number(&transaction.tenant_id, number)
            .await
    }

    async fn convert(
        &self,
        mut transaction: BankTransaction,
        rule: &BankTransactionRule,
    ) -> ReconcileResult<BankTransaction> {
        let fields = build_expense(&transaction, rule);
        let category_id = fields.category_id.clone();

        let expense_id = self
            .storage
            .create(fields)
            .await
            .map_err(|err| ReconcileError::ConversionFailed(err.to_string()))?;

        let update = StatusUpdate {
            expense_id: Some(expense_id.clone()),
            invoice_id: None,
            category_id,
        };

        let written = match self
            .storage
            .compare_and_set_status(
                &transaction.id,
                TransactionStatus::Unmatched,
                TransactionStatus::Converted,
                &update,
            )
            .await
        {
            Ok(written) => written,
            Err(err) => {
                self.discard_expense(&expense_id).await;
                return Err(err);
            }
        };

        if !written {
            warn!(
                transaction_id = %transaction.id,
                %expense_id,
                "transaction reconciled concurrently, discarding expense"
            );
            self.discard_expense(&expense_id).await;
            return Err(ReconcileError::AlreadyReconciled(transaction.id));
        }

        transaction.apply_update(TransactionStatus::Converted, &update);
        info!(
            transaction_id = %transaction.id,
            rule_id = %rule.id,
            %expense_id,
            "transaction converted to expense"
        );
        Ok(transaction)
    }

    async fn match_invoice(
        &self,
        mut transaction: BankTransaction,
        invoice_id: String,
    ) -> ReconcileResult<BankTransaction> {
        let update = StatusUpdate {
            expense_id: None,
            invoice_id: Some(invoice_id),
            category_id: None,
        };

        let written = self
            .storage
            .compare_and_set_status(
                &transaction.id,
                TransactionStatus::Unmatched,
                TransactionStatus::Matched,
                &update,
            )
            .await?;

        if !written {
            warn!(transaction_id = %transaction.id, "transaction reconciled concurrently");
            return Err(ReconcileError::AlreadyReconciled(transaction.id));
        }

        transaction.apply_update(TransactionStatus::Matched, &update);
        info!(
            transaction_id = %transaction.id,
            invoice_id = ?transaction.invoice_id,
            "transaction matched to invoice"
        );
        Ok(transaction)
    }

    async fn discard_expense(&self, expense_id: &str) {
        if let Err(err) = self.storage.discard(expense_id).await {
            error!(%expense_id, "failed to discard orphaned expense: {err}");
        }
    }
}
