use chrono::NaiveDate;
use serde::Serialize;
use tracing::debug;

use crate::config::TrackerConfig;
use crate::db::store::RecordStore;
use crate::error::Result;
use crate::models::pending::PendingIncomeRecord;
use crate::models::profile::Profile;
use crate::operations::aggregate::{
    BucketCount, CategoryBudgetLine, CategoryCompliance, SummaryMetrics, bucket_counts, compliance,
    merge_small_slices, spend_by_category, spend_vs_budget, summarize,
};
use crate::operations::ledger::{DailyTotals, LedgerEntry, build_ledger, daily_totals};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpendSlice {
    pub category: String,
    pub amount: rust_decimal::Decimal,
}

/// Everything the overview screen shows for one profile.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dashboard {
    pub profile: Profile,
    pub metrics: SummaryMetrics,
    pub budget_lines: Vec<CategoryBudgetLine>,
    pub compliance: Vec<CategoryCompliance>,
    pub bucket_counts: Vec<BucketCount>,
    pub slices: Vec<SpendSlice>,
    pub ledger: Vec<LedgerEntry>,
    pub daily: Vec<DailyTotals>,
    pub upcoming_pending: Vec<PendingIncomeRecord>,
    pub days_until_wedding: Option<i64>,
}

/// Full days left before the wedding, not counting today or the day itself.
/// Never negative.
pub fn days_until_wedding(wedding: NaiveDate, today: NaiveDate) -> i64 {
    ((wedding - today).num_days() - 1).max(0)
}

pub fn build_dashboard(
    store: &mut RecordStore,
    profile: Profile,
    config: &TrackerConfig,
    today: NaiveDate,
) -> Result<Dashboard> {
    let incomes = store.load_incomes(profile)?;
    let expenses = store.load_expenses(profile)?;
    let pending = store.load_pending(profile)?;
    let budgets = store.load_budgets(profile)?;
    debug!(
        %profile,
        incomes = incomes.len(),
        expenses = expenses.len(),
        pending = pending.len(),
        budgets = budgets.len(),
        "building dashboard"
    );

    let compliance_rows = compliance(&expenses, &budgets);
    let ledger = build_ledger(&incomes, &expenses);
    let slices = merge_small_slices(&spend_by_category(&expenses), config.small_slice_percent)
        .into_iter()
        .map(|(category, amount)| SpendSlice { category, amount })
        .collect();

    Ok(Dashboard {
        profile,
        metrics: summarize(&incomes, &expenses, &pending),
        budget_lines: spend_vs_budget(&expenses, &budgets),
        bucket_counts: bucket_counts(&compliance_rows),
        compliance: compliance_rows,
        slices,
        daily: daily_totals(&ledger, &config.utc_offset),
        ledger,
        upcoming_pending: pending.into_iter().filter(|p| !p.cleared).collect(),
        days_until_wedding: config.wedding_date.map(|wedding| days_until_wedding(wedding, today)),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::pending::NewPendingIncome;
    use crate::models::records::{NewExpense, NewIncome};
    use chrono::{FixedOffset, TimeZone};
    use rust_decimal::Decimal;
    use std::time::Duration;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_days_until_wedding() {
        assert_eq!(days_until_wedding(date(2025, 12, 20), date(2025, 12, 10)), 9);
        assert_eq!(days_until_wedding(date(2025, 12, 11), date(2025, 12, 10)), 0);
        assert_eq!(days_until_wedding(date(2025, 12, 10), date(2025, 12, 10)), 0);
        assert_eq!(days_until_wedding(date(2025, 12, 1), date(2025, 12, 10)), 0);
    }

    #[test]
    fn test_build_dashboard() {
        let mut store = RecordStore::open_in_memory(Duration::from_secs(30)).unwrap();
        let offset = FixedOffset::east_opt(19800).unwrap();
        let day = offset.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap();

        store
            .insert_income(Profile::Bride, &NewIncome::new(day, Decimal::new(500000, 0), "Salary", ""))
            .unwrap();
        store
            .insert_expense(Profile::Bride, &NewExpense::new(day, Decimal::new(180000, 0), "Venue", ""))
            .unwrap();
        store
            .insert_expense(Profile::Bride, &NewExpense::new(day, Decimal::new(5000, 0), "Favours", ""))
            .unwrap();
        store
            .insert_pending(
                Profile::Bride,
                &NewPendingIncome::new(date(2025, 6, 8), Decimal::new(20000, 0), "Gift", None),
            )
            .unwrap();
        store.upsert_budget(Profile::Bride, "Venue", Decimal::new(200000, 0)).unwrap();
        // Groom data must not leak into the bride's view.
        store
            .insert_expense(Profile::Groom, &NewExpense::new(day, Decimal::new(999, 0), "Suit", ""))
            .unwrap();

        let config = TrackerConfig {
            wedding_date: Some(date(2025, 6, 30)),
            ..TrackerConfig::default()
        };
        let dashboard = build_dashboard(&mut store, Profile::Bride, &config, date(2025, 6, 10)).unwrap();

        assert_eq!(dashboard.metrics.balance, Decimal::new(315000, 0));
        assert_eq!(dashboard.metrics.projected_balance, Decimal::new(335000, 0));
        assert_eq!(dashboard.budget_lines.len(), 2);
        assert_eq!(dashboard.compliance.len(), 1);
        assert_eq!(dashboard.compliance[0].percent, Decimal::new(90, 0));
        assert_eq!(dashboard.bucket_counts[1].count, 1);
        assert_eq!(dashboard.slices.len(), 2);
        assert_eq!(dashboard.slices[1].category, "Other");
        assert_eq!(dashboard.ledger.len(), 3);
        assert_eq!(dashboard.daily.len(), 1);
        assert_eq!(dashboard.daily[0].closing_balance, Decimal::new(315000, 0));
        assert_eq!(dashboard.upcoming_pending.len(), 1);
        assert_eq!(dashboard.days_until_wedding, Some(19));
    }

    #[test]
    fn test_build_dashboard_empty_profile() {
        let mut store = RecordStore::open_in_memory(Duration::from_secs(0)).unwrap();
        let dashboard =
            build_dashboard(&mut store, Profile::Groom, &TrackerConfig::default(), date(2025, 1, 1)).unwrap();
        assert_eq!(dashboard.metrics.balance, Decimal::ZERO);
        assert!(dashboard.ledger.is_empty());
        assert!(dashboard.slices.is_empty());
        assert_eq!(dashboard.days_until_wedding, None);

        let json = serde_json::to_value(&dashboard).unwrap();
        assert_eq!(json["profile"], "groom");
    }
}
