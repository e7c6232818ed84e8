//! Transaction service
//!
//! Business operations over transactions: creation with a default milestone
//! plan, filtered summaries, milestone completion and status changes. Every
//! mutation is a compare-and-swap on the record's version and is reported to
//! the change notifier once committed.

use chrono::{Local, NaiveDate};
use serde::Serialize;
use tracing::{debug, info};

use crate::audit::{ChangeEvent, ChangeKind, ChangeNotifier};
use crate::config::settings::Settings;
use crate::error::{DealError, DealResult};
use crate::lifecycle;
use crate::models::{
    MilestoneKind, Money, Property, Transaction, TransactionId, TransactionStatus,
    TransactionType,
};
use crate::reports::{
    aggregate, compute_risk_with, overdue_milestones, OverdueMilestone, PortfolioMetrics,
    RiskAssessment, RiskLevel,
};
use crate::storage::Storage;

use super::document::DocumentService;

/// Service for transaction management
pub struct TransactionService<'a> {
    storage: &'a Storage,
    settings: &'a Settings,
    notifier: &'a dyn ChangeNotifier,
    today: NaiveDate,
}

/// Options for filtering transaction lists
#[derive(Debug, Clone, Default)]
pub struct TransactionFilter {
    pub status: Option<TransactionStatus>,
    pub risk_level: Option<RiskLevel>,
    /// Active transactions closing within this many days (inclusive)
    pub closing_within_days: Option<i64>,
    /// Listing or buyer agent
    pub agent_ref: Option<String>,
    /// Include closed and cancelled transactions
    pub include_archived: bool,
    pub limit: Option<usize>,
}

impl TransactionFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(mut self, status: TransactionStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn risk_level(mut self, level: RiskLevel) -> Self {
        self.risk_level = Some(level);
        self
    }

    pub fn closing_within(mut self, days: i64) -> Self {
        self.closing_within_days = Some(days);
        self
    }

    pub fn agent(mut self, agent_ref: impl Into<String>) -> Self {
        self.agent_ref = Some(agent_ref.into());
        self
    }

    pub fn include_archived(mut self) -> Self {
        self.include_archived = true;
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    fn accepts(&self, txn: &Transaction, risk: &RiskAssessment, today: NaiveDate) -> bool {
        if !self.include_archived && txn.archived_at.is_some() && self.status.is_none() {
            return false;
        }
        if let Some(status) = self.status {
            if txn.status != status {
                return false;
            }
        }
        if let Some(level) = self.risk_level {
            if risk.level != level {
                return false;
            }
        }
        if let Some(days) = self.closing_within_days {
            let until = txn.days_until_closing(today);
            if !txn.is_active() || until < 0 || until > days {
                return false;
            }
        }
        if let Some(agent) = &self.agent_ref {
            if !txn.involves_agent(agent) {
                return false;
            }
        }
        true
    }
}

/// One row of the transaction list, with derived fields filled in
#[derive(Debug, Clone, Serialize)]
pub struct TransactionSummary {
    pub id: TransactionId,
    pub version: u64,
    pub address: String,
    pub client_ref: String,
    pub status: TransactionStatus,
    pub price: Money,
    pub closing_date: NaiveDate,
    pub days_until_closing: i64,
    pub progress: u8,
    pub current_milestone: Option<MilestoneKind>,
    pub risk: RiskAssessment,
    pub outstanding_documents: usize,
}

/// Input for creating a new transaction
#[derive(Debug, Clone)]
pub struct CreateTransactionInput {
    pub property: Property,
    pub client_ref: String,
    pub contract_date: NaiveDate,
    pub closing_date: NaiveDate,
    pub transaction_type: TransactionType,
    /// Explicit commission; derived from the rate when absent
    pub commission: Option<Money>,
    /// Rate override; the configured default applies when absent
    pub commission_rate: Option<f64>,
    pub listing_agent_ref: Option<String>,
    pub buyer_agent_ref: Option<String>,
    pub notes: Option<String>,
}

impl<'a> TransactionService<'a> {
    /// Create a new transaction service dated today
    pub fn new(storage: &'a Storage, settings: &'a Settings, notifier: &'a dyn ChangeNotifier) -> Self {
        Self {
            storage,
            settings,
            notifier,
            today: Local::now().date_naive(),
        }
    }

    /// Evaluate dates relative to `today` instead of the wall clock
    pub fn as_of(mut self, today: NaiveDate) -> Self {
        self.today = today;
        self
    }

    /// Create a transaction with the default milestone plan
    pub fn create(&self, input: CreateTransactionInput) -> DealResult<Transaction> {
        let client_ref = input.client_ref.trim().to_string();
        if client_ref.is_empty() {
            return Err(DealError::Validation("Client reference is required".into()));
        }

        let (commission, rate) = match input.commission {
            Some(commission) => {
                if commission.is_negative() {
                    return Err(DealError::Validation(format!(
                        "Commission cannot be negative: {}",
                        commission
                    )));
                }
                (commission, None)
            }
            None => {
                let rate = input
                    .commission_rate
                    .unwrap_or(self.settings.default_commission_rate);
                if !(0.0..=1.0).contains(&rate) {
                    return Err(DealError::Validation(format!(
                        "Commission rate must be between 0 and 1, got {}",
                        rate
                    )));
                }
                (input.property.price.apply_rate(rate), Some(rate))
            }
        };

        let mut txn = Transaction::new(
            input.property,
            client_ref,
            input.contract_date,
            input.closing_date,
            commission,
        );
        txn.transaction_type = input.transaction_type;
        txn.commission_rate = rate;
        txn.listing_agent_ref = non_empty(input.listing_agent_ref);
        txn.buyer_agent_ref = non_empty(input.buyer_agent_ref);
        if let Some(notes) = input.notes {
            txn.notes = notes;
        }

        txn.validate()
            .map_err(|e| DealError::Validation(e.to_string()))?;
        lifecycle::apply_default_plan(&mut txn, self.today);

        let txn = self.storage.transactions.insert(txn)?;
        self.notifier.notify(&ChangeEvent::transaction_created(&txn));

        info!(transaction = %txn.id, address = %txn.property.address, "transaction created");
        Ok(txn)
    }

    /// Get a transaction by full UUID or short id
    pub fn get_transaction(&self, identifier: &str) -> DealResult<Transaction> {
        self.find(identifier)?
            .ok_or_else(|| DealError::transaction_not_found(identifier))
    }

    pub fn find(&self, identifier: &str) -> DealResult<Option<Transaction>> {
        self.storage.transactions.find(identifier.trim())
    }

    /// List transactions matching `filter`, earliest closing first
    pub fn list_transactions(&self, filter: &TransactionFilter) -> DealResult<Vec<TransactionSummary>> {
        let documents = DocumentService::new(self.storage, self.notifier);
        let mut summaries = Vec::new();

        for txn in self.storage.transactions.get_all()? {
            let risk = compute_risk_with(&txn, self.today, &self.settings.risk_policy);
            if !filter.accepts(&txn, &risk, self.today) {
                continue;
            }

            let outstanding_documents = documents.outstanding_count(txn.id)?;

            summaries.push(TransactionSummary {
                id: txn.id,
                version: txn.version,
                address: txn.property.address.clone(),
                client_ref: txn.client_ref.clone(),
                status: txn.status,
                price: txn.property.price,
                closing_date: txn.closing_date,
                days_until_closing: txn.days_until_closing(self.today),
                progress: txn.progress,
                current_milestone: txn.current_milestone().map(|m| m.name),
                risk,
                outstanding_documents,
            });

            if filter.limit.is_some_and(|limit| summaries.len() >= limit) {
                break;
            }
        }

        Ok(summaries)
    }

    /// Complete a milestone, in canonical order only
    ///
    /// `completion_date` defaults to today. With `expected_version` set, the
    /// call fails with `Conflict` unless the stored record still carries it.
    pub fn complete_milestone(
        &self,
        identifier: &str,
        expected_version: Option<u64>,
        milestone: &str,
        completion_date: Option<NaiveDate>,
    ) -> DealResult<Transaction> {
        let today = self.today;
        let completed_on = completion_date.unwrap_or(today);

        self.mutate(identifier, expected_version, ChangeKind::MilestoneCompleted, |txn| {
            if completed_on < txn.contract_date {
                return Err(DealError::Validation(format!(
                    "Completion date {} is before the contract date {}",
                    completed_on, txn.contract_date
                )));
            }
            let kind = lifecycle::resolve_milestone(txn, milestone)?;
            lifecycle::complete_milestone(txn, kind, completed_on, today)?;
            Ok(())
        })
    }

    /// Move the transaction to `new_status`
    pub fn advance_status(
        &self,
        identifier: &str,
        expected_version: Option<u64>,
        new_status: TransactionStatus,
    ) -> DealResult<Transaction> {
        let today = self.today;
        self.mutate(identifier, expected_version, ChangeKind::StatusAdvanced, |txn| {
            lifecycle::advance_status(txn, new_status, today)
        })
    }

    /// Load, mutate a copy, commit against the loaded version, then notify
    fn mutate<F>(
        &self,
        identifier: &str,
        expected_version: Option<u64>,
        kind: ChangeKind,
        apply: F,
    ) -> DealResult<Transaction>
    where
        F: FnOnce(&mut Transaction) -> DealResult<()>,
    {
        let current = self.get_transaction(identifier)?;
        let expected = expected_version.unwrap_or(current.version);
        if current.version != expected {
            return Err(DealError::Conflict {
                id: current.id.to_string(),
                expected,
                actual: current.version,
            });
        }

        let mut next = current.clone();
        apply(&mut next)?;

        let committed = self.storage.transactions.commit(next, expected)?;
        self.notifier
            .notify(&ChangeEvent::transaction_updated(kind, &current, &committed));

        debug!(transaction = %committed.id, version = committed.version, %kind, "change committed");
        Ok(committed)
    }

    /// Risk assessment for one transaction
    pub fn assess_risk(&self, identifier: &str) -> DealResult<(Transaction, RiskAssessment)> {
        let txn = self.get_transaction(identifier)?;
        let risk = compute_risk_with(&txn, self.today, &self.settings.risk_policy);
        Ok((txn, risk))
    }

    /// Portfolio metrics with the given trailing window
    pub fn get_metrics(&self, window_days: u32) -> DealResult<PortfolioMetrics> {
        let transactions = self.storage.transactions.get_all()?;
        Ok(aggregate(
            &transactions,
            self.today,
            window_days,
            &self.settings.risk_policy,
        ))
    }

    /// Incomplete milestones past their planned date, worst first
    pub fn overdue(&self) -> DealResult<Vec<OverdueMilestone>> {
        let transactions = self.storage.transactions.get_all()?;
        Ok(overdue_milestones(&transactions, self.today))
    }

    pub fn count(&self) -> DealResult<usize> {
        self.storage.transactions.count()
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
