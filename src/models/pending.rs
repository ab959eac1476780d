use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use crate::error::Result;
use crate::models::records::{ensure_label, ensure_positive_amount};

/// An expected payment that has not reached the income ledger yet.
///
/// `source` and `notes` may be missing on rows written by older versions of the
/// schema; the reconciler substitutes defaults for them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PendingIncomeRecord {
    pub id: Uuid,
    pub expected_on: NaiveDate,
    pub amount: Decimal,
    pub source: Option<String>,
    pub notes: Option<String>,
    pub cleared: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewPendingIncome {
    pub expected_on: NaiveDate,
    pub amount: Decimal,
    pub source: String,
    pub notes: Option<String>,
}

impl NewPendingIncome {
    pub fn new(
        expected_on: NaiveDate,
        amount: Decimal,
        source: impl Into<String>,
        notes: Option<String>,
    ) -> Self {
        Self {
            expected_on,
            amount,
            source: source.into(),
            notes,
        }
    }

    pub fn validate(&self) -> Result<()> {
        ensure_positive_amount(self.amount)?;
        ensure_label("Source", &self.source)
    }
}
