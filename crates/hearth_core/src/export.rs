//! Transaction report building and export.
//!
//! # Responsibility
//! - Aggregate transactions into totals and per-category expense sums.
//! - Define the [`ReportExporter`] seam used by the expense feature.
//!
//! # Invariants
//! - `balance == total_income - total_expense`.
//! - Category totals only count expenses and are sorted by total, largest
//!   first, ties by category name.

use crate::model::transaction::{Transaction, TransactionKind};
use crate::model::TimeRange;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type ExportResult<T> = Result<T, ExportError>;

#[derive(Debug)]
pub enum ExportError {
    Serialize(serde_json::Error),
    /// Failure reported by a host-provided exporter (e.g. PDF rendering).
    Backend(String),
}

impl Display for ExportError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Serialize(err) => write!(f, "failed to serialize report: {err}"),
            Self::Backend(message) => write!(f, "report export failed: {message}"),
        }
    }
}

impl Error for ExportError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Serialize(err) => Some(err),
            Self::Backend(_) => None,
        }
    }
}

impl From<serde_json::Error> for ExportError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serialize(value)
    }
}

/// Income/expense totals over a set of transactions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ExpenseSummary {
    pub total_income: f64,
    pub total_expense: f64,
    pub balance: f64,
}

impl ExpenseSummary {
    pub fn from_transactions(rows: &[Transaction]) -> Self {
        let mut summary = Self::default();
        for row in rows {
            match row.kind {
                TransactionKind::Income => summary.total_income += row.amount,
                TransactionKind::Expense => summary.total_expense += row.amount,
            }
        }
        summary.balance = summary.total_income - summary.total_expense;
        summary
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryTotal {
    pub category: String,
    pub total: f64,
    pub count: u32,
}

/// Expense totals grouped by category.
pub fn category_totals(rows: &[Transaction]) -> Vec<CategoryTotal> {
    let mut grouped: BTreeMap<&str, (f64, u32)> = BTreeMap::new();
    for row in rows
        .iter()
        .filter(|row| row.kind == TransactionKind::Expense)
    {
        let entry = grouped.entry(row.category.trim()).or_insert((0.0, 0));
        entry.0 += row.amount;
        entry.1 += 1;
    }

    let mut totals = grouped
        .into_iter()
        .map(|(category, (total, count))| CategoryTotal {
            category: category.to_string(),
            total,
            count,
        })
        .collect::<Vec<_>>();
    totals.sort_by(|left, right| {
        right
            .total
            .total_cmp(&left.total)
            .then_with(|| left.category.cmp(&right.category))
    });
    totals
}

/// Snapshot handed to a [`ReportExporter`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionReport {
    pub generated_at: i64,
    pub range: Option<TimeRange>,
    pub summary: ExpenseSummary,
    pub categories: Vec<CategoryTotal>,
    pub rows: Vec<Transaction>,
}

impl TransactionReport {
    pub fn build(generated_at: i64, range: Option<TimeRange>, rows: Vec<Transaction>) -> Self {
        Self {
            generated_at,
            range,
            summary: ExpenseSummary::from_transactions(&rows),
            categories: category_totals(&rows),
            rows,
        }
    }
}

/// Renders a report into a file payload.
pub trait ReportExporter {
    /// File extension without the dot, e.g. `json` or `pdf`.
    fn file_extension(&self) -> &'static str;
    fn export(&self, report: &TransactionReport) -> ExportResult<Vec<u8>>;
}

/// JSON exporter bundled with the core.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonReportExporter {
    pub pretty: bool,
}

impl ReportExporter for JsonReportExporter {
    fn file_extension(&self) -> &'static str {
        "json"
    }

    fn export(&self, report: &TransactionReport) -> ExportResult<Vec<u8>> {
        let bytes = if self.pretty {
            serde_json::to_vec_pretty(report)?
        } else {
            serde_json::to_vec(report)?
        };
        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::{category_totals, JsonReportExporter, ReportExporter, TransactionReport};
    use crate::model::transaction::{Transaction, TransactionKind};

    fn sample() -> Vec<Transaction> {
        vec![
            Transaction::new(TransactionKind::Income, "salary", 1000.0, 1),
            Transaction::new(TransactionKind::Expense, "food", 40.0, 2),
            Transaction::new(TransactionKind::Expense, "rent", 500.0, 3),
            Transaction::new(TransactionKind::Expense, "food ", 10.0, 4),
        ]
    }

    #[test]
    fn report_totals_and_balance() {
        let report = TransactionReport::build(10, None, sample());
        assert_eq!(report.summary.total_income, 1000.0);
        assert_eq!(report.summary.total_expense, 550.0);
        assert_eq!(report.summary.balance, 450.0);
    }

    #[test]
    fn categories_group_expenses_only_largest_first() {
        let totals = category_totals(&sample());
        let names = totals
            .iter()
            .map(|total| total.category.as_str())
            .collect::<Vec<_>>();
        assert_eq!(names, vec!["rent", "food"]);
        assert_eq!(totals[1].total, 50.0);
        assert_eq!(totals[1].count, 2);
    }

    #[test]
    fn json_export_contains_summary() {
        let report = TransactionReport::build(10, None, sample());
        let bytes = JsonReportExporter::default()
            .export(&report)
            .expect("json export should succeed");
        let value: serde_json::Value =
            serde_json::from_slice(&bytes).expect("export should be valid json");
        assert_eq!(value["summary"]["balance"], 450.0);
        assert_eq!(value["rows"].as_array().map(Vec::len), Some(4));
    }
}
