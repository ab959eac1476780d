use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use crate::models::budget::BudgetEntry;
use crate::models::pending::PendingIncomeRecord;
use crate::models::records::{ExpenseRecord, IncomeRecord};

pub const OTHER_LABEL: &str = "Other";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryMetrics {
    pub total_income: Decimal,
    pub total_expense: Decimal,
    pub balance: Decimal,
    /// Uncleared pending income only.
    pub pending_total: Decimal,
    /// Balance once every uncleared pending payment arrives.
    pub projected_balance: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryBudgetLine {
    pub category: String,
    pub spent: Decimal,
    pub limit: Decimal,
    pub has_budget: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum ComplianceBucket {
    Under80,
    Within80To100,
    Over,
}

impl ComplianceBucket {
    pub fn label(self) -> &'static str {
        match self {
            ComplianceBucket::Under80 => "Under 80%",
            ComplianceBucket::Within80To100 => "80–100%",
            ComplianceBucket::Over => "Over",
        }
    }

    pub const ALL: [ComplianceBucket; 3] = [
        ComplianceBucket::Under80,
        ComplianceBucket::Within80To100,
        ComplianceBucket::Over,
    ];
}

impl fmt::Display for ComplianceBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryCompliance {
    pub category: String,
    pub spent: Decimal,
    pub limit: Decimal,
    pub percent: Decimal,
    pub bucket: ComplianceBucket,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BucketCount {
    pub bucket: ComplianceBucket,
    pub count: usize,
}

pub fn summarize(
    incomes: &[IncomeRecord],
    expenses: &[ExpenseRecord],
    pending: &[PendingIncomeRecord],
) -> SummaryMetrics {
    let total_income: Decimal = incomes.iter().map(|i| i.amount).sum();
    let total_expense: Decimal = expenses.iter().map(|e| e.amount).sum();
    let pending_total: Decimal = pending
        .iter()
        .filter(|p| !p.cleared)
        .map(|p| p.amount)
        .sum();
    let balance = total_income - total_expense;

    SummaryMetrics {
        total_income,
        total_expense,
        balance,
        pending_total,
        projected_balance: balance + pending_total,
    }
}

pub fn spend_by_category(expenses: &[ExpenseRecord]) -> BTreeMap<String, Decimal> {
    let mut totals: BTreeMap<String, Decimal> = BTreeMap::new();
    for expense in expenses {
        *totals.entry(expense.category.clone()).or_insert(Decimal::ZERO) += expense.amount;
    }
    totals
}

fn limits_by_category(budgets: &[BudgetEntry]) -> BTreeMap<&str, Decimal> {
    budgets
        .iter()
        .map(|b| (b.category.as_str(), b.limit))
        .collect()
}

/// One row per category that has spend, a budget, or both.
pub fn spend_vs_budget(expenses: &[ExpenseRecord], budgets: &[BudgetEntry]) -> Vec<CategoryBudgetLine> {
    let spent = spend_by_category(expenses);
    let limits = limits_by_category(budgets);

    let categories: BTreeSet<&str> = spent
        .keys()
        .map(String::as_str)
        .chain(limits.keys().copied())
        .collect();

    categories
        .into_iter()
        .map(|category| CategoryBudgetLine {
            category: category.to_string(),
            spent: spent.get(category).copied().unwrap_or(Decimal::ZERO),
            limit: limits.get(category).copied().unwrap_or(Decimal::ZERO),
            has_budget: limits.contains_key(category),
        })
        .collect()
}

/// Spend as a percentage of the limit; a zero limit counts as 0%.
/// Results too large for a `Decimal` saturate at `Decimal::MAX`.
pub fn percent_of_limit(spent: Decimal, limit: Decimal) -> Decimal {
    if limit.is_zero() {
        return Decimal::ZERO;
    }
    spent
        .checked_div(limit)
        .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
        .unwrap_or(Decimal::MAX)
}

pub fn classify(percent: Decimal) -> ComplianceBucket {
    if percent < Decimal::new(80, 0) {
        ComplianceBucket::Under80
    } else if percent <= Decimal::ONE_HUNDRED {
        ComplianceBucket::Within80To100
    } else {
        ComplianceBucket::Over
    }
}

/// Compliance for every category that has both spend and a budget entry.
pub fn compliance(expenses: &[ExpenseRecord], budgets: &[BudgetEntry]) -> Vec<CategoryCompliance> {
    let spent = spend_by_category(expenses);
    let limits = limits_by_category(budgets);

    spent
        .into_iter()
        .filter_map(|(category, spent)| {
            let limit = *limits.get(category.as_str())?;
            let percent = percent_of_limit(spent, limit);
            Some(CategoryCompliance {
                category,
                spent,
                limit,
                percent,
                bucket: classify(percent),
            })
        })
        .collect()
}

pub fn bucket_counts(rows: &[CategoryCompliance]) -> Vec<BucketCount> {
    ComplianceBucket::ALL
        .iter()
        .map(|bucket| BucketCount {
            bucket: *bucket,
            count: rows.iter().filter(|r| r.bucket == *bucket).count(),
        })
        .collect()
}

/// Folds categories below `threshold_percent` of total spend into one
/// "Other" slice. Larger slices come first, largest to smallest; "Other" is last.
pub fn merge_small_slices(
    spend: &BTreeMap<String, Decimal>,
    threshold_percent: Decimal,
) -> Vec<(String, Decimal)> {
    let total: Decimal = spend.values().copied().sum();
    if total.is_zero() {
        return spend.iter().map(|(k, v)| (k.clone(), *v)).collect();
    }

    let mut slices: Vec<(String, Decimal)> = Vec::new();
    let mut other = Decimal::ZERO;
    let mut merged_any = false;
    for (category, amount) in spend {
        let share = *amount / total * Decimal::ONE_HUNDRED;
        if share < threshold_percent || category == OTHER_LABEL {
            other += *amount;
            merged_any = true;
        } else {
            slices.push((category.clone(), *amount));
        }
    }

    slices.sort_by(|a, b| b.1.cmp(&a.1));
    if merged_any {
        slices.push((OTHER_LABEL.to_string(), other));
    }
    slices
}
