//! Income/expense use-case service.
//!
//! # Responsibility
//! - Provide add/edit/delete/list APIs for transactions.
//! - Aggregate totals and hand reports to a [`ReportExporter`].

use crate::clock::SharedClock;
use crate::export::{
    category_totals, CategoryTotal, ExpenseSummary, ReportExporter, TransactionReport,
};
use crate::model::transaction::{Transaction, TransactionKind};
use crate::model::{RecordId, TimeRange};
use crate::repo::record_repo::{RecordQuery, Repository};
use crate::service::{load_into, settle, ServiceError, ServiceResult};
use crate::state::StateHolder;
use log::info;
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::sync::Arc;

/// Transaction list filter; `None` fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpenseFilter {
    pub range: Option<TimeRange>,
    pub kind: Option<TransactionKind>,
    pub category: Option<String>,
}

impl ExpenseFilter {
    pub fn within(range: TimeRange) -> Self {
        Self {
            range: Some(range),
            ..Self::default()
        }
    }

    fn query(&self) -> RecordQuery {
        let mut query = RecordQuery::all();
        if let Some(range) = self.range {
            query = query.within(range);
        }
        if let Some(kind) = self.kind {
            query = query.eq("kind", kind.as_str().to_string());
        }
        if let Some(category) = self
            .category
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
        {
            query = query.eq("category", category.to_string());
        }
        query
    }
}

/// An exported report payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedReport {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

pub struct ExpenseService<R: Repository<Transaction>> {
    repo: R,
    clock: SharedClock,
    filter: RefCell<ExpenseFilter>,
    state: Arc<StateHolder<Transaction>>,
}

impl<R: Repository<Transaction>> ExpenseService<R> {
    pub fn new(repo: R, clock: SharedClock) -> Self {
        Self {
            repo,
            clock,
            filter: RefCell::new(ExpenseFilter::default()),
            state: Arc::new(StateHolder::new()),
        }
    }

    pub fn state(&self) -> Arc<StateHolder<Transaction>> {
        Arc::clone(&self.state)
    }

    pub fn add(&self, mut transaction: Transaction) -> ServiceResult<Transaction> {
        transaction.category = transaction.category.trim().to_string();
        let result = self
            .repo
            .insert(&mut transaction)
            .map(|id| {
                info!(
                    "event=transaction_add module=service status=ok transaction_id={id} kind={}",
                    transaction.kind.as_str()
                );
                transaction
            })
            .map_err(ServiceError::from);
        self.settle(result)
    }

    pub fn edit(&self, mut transaction: Transaction) -> ServiceResult<Transaction> {
        transaction.category = transaction.category.trim().to_string();
        let result = self
            .repo
            .update(&mut transaction)
            .map(|()| transaction)
            .map_err(ServiceError::from);
        self.settle(result)
    }

    pub fn delete(&self, id: RecordId) -> ServiceResult<()> {
        let result = self.repo.delete(id).map_err(ServiceError::from);
        self.settle(result)
    }

    pub fn get(&self, id: RecordId) -> ServiceResult<Option<Transaction>> {
        Ok(self.repo.get(id)?)
    }

    /// Lists matching transactions, newest first, and keeps the filter for
    /// later refreshes.
    pub fn list(&self, filter: ExpenseFilter) -> ServiceResult<Vec<Transaction>> {
        *self.filter.borrow_mut() = filter;
        load_into(&self.state, || self.list_current())
    }

    pub fn summary(&self, range: Option<TimeRange>) -> ServiceResult<ExpenseSummary> {
        let rows = self.rows_in(range)?;
        Ok(ExpenseSummary::from_transactions(&rows))
    }

    pub fn category_totals(&self, range: Option<TimeRange>) -> ServiceResult<Vec<CategoryTotal>> {
        let rows = self.rows_in(range)?;
        Ok(category_totals(&rows))
    }

    /// Builds a report over `range` and renders it with `exporter`.
    pub fn export(
        &self,
        range: Option<TimeRange>,
        exporter: &dyn ReportExporter,
    ) -> ServiceResult<ExportedReport> {
        let generated_at = self.clock.now_ms();
        let report = TransactionReport::build(generated_at, range, self.rows_in(range)?);
        let bytes = exporter.export(&report)?;
        let file_name = format!(
            "hearth-report-{generated_at}.{}",
            exporter.file_extension()
        );
        info!(
            "event=report_export module=service status=ok rows={} bytes={} file={}",
            report.rows.len(),
            bytes.len(),
            file_name
        );
        Ok(ExportedReport { file_name, bytes })
    }

    fn rows_in(&self, range: Option<TimeRange>) -> ServiceResult<Vec<Transaction>> {
        let filter = ExpenseFilter {
            range,
            ..ExpenseFilter::default()
        };
        Ok(self.repo.list(&filter.query())?)
    }

    fn list_current(&self) -> ServiceResult<Vec<Transaction>> {
        let query = self.filter.borrow().query();
        Ok(self.repo.list(&query)?)
    }

    fn settle<V>(&self, result: ServiceResult<V>) -> ServiceResult<V> {
        settle(&self.state, "expense_service", result, || {
            self.list_current()
        })
    }
}
