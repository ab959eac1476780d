use chrono::{DateTime, FixedOffset};
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use crate::error::{Result, TrackerError};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IncomeRecord {
    pub id: Uuid,
    pub timestamp: DateTime<FixedOffset>,
    pub amount: Decimal,
    pub source: String,
    pub notes: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExpenseRecord {
    pub id: Uuid,
    pub timestamp: DateTime<FixedOffset>,
    pub amount: Decimal,
    pub category: String,
    pub notes: String,
}

/// Income fields as submitted, before the store assigns an id.
#[derive(Debug, Clone, PartialEq)]
pub struct NewIncome {
    pub timestamp: DateTime<FixedOffset>,
    pub amount: Decimal,
    pub source: String,
    pub notes: String,
}

impl NewIncome {
    pub fn new(
        timestamp: DateTime<FixedOffset>,
        amount: Decimal,
        source: impl Into<String>,
        notes: impl Into<String>,
    ) -> Self {
        Self {
            timestamp,
            amount,
            source: source.into(),
            notes: notes.into(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        ensure_positive_amount(self.amount)?;
        ensure_label("Source", &self.source)
    }
}

/// Expense fields as submitted, before the store assigns an id.
#[derive(Debug, Clone, PartialEq)]
pub struct NewExpense {
    pub timestamp: DateTime<FixedOffset>,
    pub amount: Decimal,
    pub category: String,
    pub notes: String,
}

impl NewExpense {
    pub fn new(
        timestamp: DateTime<FixedOffset>,
        amount: Decimal,
        category: impl Into<String>,
        notes: impl Into<String>,
    ) -> Self {
        Self {
            timestamp,
            amount,
            category: category.into(),
            notes: notes.into(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        ensure_positive_amount(self.amount)?;
        ensure_label("Category", &self.category)
    }
}

/// The only fields that may change after a record is created.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordUpdate {
    pub amount: Option<Decimal>,
    pub notes: Option<String>,
}

impl RecordUpdate {
    pub fn is_empty(&self) -> bool {
        self.amount.is_none() && self.notes.is_none()
    }

    pub fn validate(&self) -> Result<()> {
        if self.is_empty() {
            return Err(TrackerError::validation("Nothing to update"));
        }
        if let Some(amount) = self.amount {
            ensure_positive_amount(amount)?;
        }
        Ok(())
    }
}

/// Longest accepted source or category, in characters.
pub const MAX_LABEL_CHARS: usize = 50;

pub fn ensure_positive_amount(amount: Decimal) -> Result<()> {
    if amount <= Decimal::ZERO {
        return Err(TrackerError::validation(format!(
            "Amount must be greater than zero, got {}",
            amount
        )));
    }
    Ok(())
}

pub fn ensure_label(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(TrackerError::validation(format!("{} cannot be empty", field)));
    }
    if value.chars().count() > MAX_LABEL_CHARS {
        return Err(TrackerError::validation(format!("{} too long", field)));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn noon() -> DateTime<FixedOffset> {
        FixedOffset::east_opt(5 * 3600 + 1800)
            .unwrap()
            .with_ymd_and_hms(2025, 6, 1, 12, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_new_expense_zero_amount_rejected() {
        let expense = NewExpense::new(noon(), Decimal::ZERO, "Venue", "");
        let result = expense.validate();
        assert!(matches!(result, Err(TrackerError::Validation(_))));
    }

    #[test]
    fn test_new_expense_blank_category_rejected() {
        let expense = NewExpense::new(noon(), Decimal::new(100, 0), "   ", "");
        let err = expense.validate().unwrap_err();
        assert_eq!(err.to_string(), "Category cannot be empty");
    }

    #[test]
    fn test_new_income_valid() {
        let income = NewIncome::new(noon(), Decimal::new(5000, 0), "Gift", "");
        assert!(income.validate().is_ok());
    }

    #[test]
    fn test_record_update_requires_a_field() {
        let update = RecordUpdate::default();
        assert_eq!(update.validate().unwrap_err().to_string(), "Nothing to update");
    }

    #[test]
    fn test_record_update_negative_amount_rejected() {
        let update = RecordUpdate {
            amount: Some(Decimal::new(-1, 0)),
            notes: None,
        };
        assert!(update.validate().is_err());
    }
}
