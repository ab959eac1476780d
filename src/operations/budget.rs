use crate::db::store::RecordStore;
use crate::error::{Result, TrackerError};
use crate::models::budget::BudgetEntry;
use crate::models::profile::Profile;
use rust_decimal::Decimal;
use std::str::FromStr;

fn parse_limit(amount_str: &str) -> Result<Decimal> {
    Decimal::from_str(amount_str.trim()).map_err(|_| {
        TrackerError::validation(format!(
            "Invalid budget amount '{}'. Must be a valid number",
            amount_str
        ))
    })
}

pub fn set_budget_db(store: &mut RecordStore, profile: Profile, category: &str, amount_str: &str) -> Result<()> {
    let limit = parse_limit(amount_str)?;
    store.upsert_budget(profile, category, limit)
}

/// Changes the limit of an existing budget; unknown categories are an error.
pub fn update_budget_db(store: &mut RecordStore, profile: Profile, category: &str, amount_str: &str) -> Result<()> {
    let limit = parse_limit(amount_str)?;
    if category.trim().is_empty() {
        return Err(TrackerError::validation("Category cannot be empty"));
    }
    store.update_budget_limit(profile, category, limit)
}

pub fn list_budgets_db(store: &mut RecordStore, profile: Profile) -> Result<Vec<BudgetEntry>> {
    store.load_budgets(profile)
}

pub fn delete_budget_db(store: &mut RecordStore, profile: Profile, categories: &[String]) -> Result<usize> {
    let categories: Vec<String> = categories
        .iter()
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty())
        .collect();
    if categories.is_empty() {
        return Err(TrackerError::validation("Category cannot be empty"));
    }
    store.delete_budgets(profile, &categories)
}
