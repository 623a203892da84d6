//! Income/expense transaction model.

use super::{require_positive, require_text, RecordMeta, ValidationError};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    Income,
    Expense,
}

impl TransactionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "income" => Some(Self::Income),
            "expense" => Some(Self::Expense),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    #[serde(flatten)]
    pub meta: RecordMeta,
    pub kind: TransactionKind,
    pub category: String,
    /// Always positive; direction comes from `kind`.
    pub amount: f64,
    pub memo: String,
    /// When the money moved, epoch milliseconds.
    pub occurred_at: i64,
}

impl Transaction {
    pub fn new(
        kind: TransactionKind,
        category: impl Into<String>,
        amount: f64,
        occurred_at: i64,
    ) -> Self {
        Self {
            meta: RecordMeta::new(),
            kind,
            category: category.into(),
            amount,
            memo: String::new(),
            occurred_at,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text("category", &self.category)?;
        require_positive("amount", self.amount)?;
        Ok(())
    }

    /// Signed contribution to a balance.
    pub fn signed_amount(&self) -> f64 {
        match self.kind {
            TransactionKind::Income => self.amount,
            TransactionKind::Expense => -self.amount,
        }
    }
}
