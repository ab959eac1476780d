use chrono::{DateTime, FixedOffset, NaiveDate};
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use crate::models::records::{ExpenseRecord, IncomeRecord};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LedgerSide {
    Income,
    Expense,
}

/// One signed movement in the merged ledger, with the balance after it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LedgerEntry {
    pub record_id: Uuid,
    pub timestamp: DateTime<FixedOffset>,
    pub side: LedgerSide,
    /// Income source or expense category.
    pub label: String,
    pub delta: Decimal,
    pub balance: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyTotals {
    pub date: NaiveDate,
    pub income: Decimal,
    pub expense: Decimal,
    pub closing_balance: Decimal,
}

/// Merges incomes and expenses into one chronological sequence with a running
/// balance.
///
/// The sort is stable: entries sharing a timestamp keep their input order,
/// incomes (in the order given) ahead of expenses (in the order given).
pub fn build_ledger(incomes: &[IncomeRecord], expenses: &[ExpenseRecord]) -> Vec<LedgerEntry> {
    let mut entries: Vec<LedgerEntry> = Vec::with_capacity(incomes.len() + expenses.len());

    for income in incomes {
        entries.push(LedgerEntry {
            record_id: income.id,
            timestamp: income.timestamp,
            side: LedgerSide::Income,
            label: income.source.clone(),
            delta: income.amount,
            balance: Decimal::ZERO,
        });
    }
    for expense in expenses {
        entries.push(LedgerEntry {
            record_id: expense.id,
            timestamp: expense.timestamp,
            side: LedgerSide::Expense,
            label: expense.category.clone(),
            delta: -expense.amount,
            balance: Decimal::ZERO,
        });
    }

    // sort_by_key is stable
    entries.sort_by_key(|entry| entry.timestamp);

    let mut running = Decimal::ZERO;
    for entry in &mut entries {
        running += entry.delta;
        entry.balance = running;
    }
    entries
}

pub fn final_balance(entries: &[LedgerEntry]) -> Decimal {
    entries.last().map(|e| e.balance).unwrap_or(Decimal::ZERO)
}

/// Rolls the ledger up per calendar day as seen in `offset`, so entries
/// saved under different offsets still land on one ascending run of dates.
pub fn daily_totals(entries: &[LedgerEntry], offset: &FixedOffset) -> Vec<DailyTotals> {
    let mut days: Vec<DailyTotals> = Vec::new();
    for entry in entries {
        let date = entry.timestamp.with_timezone(offset).date_naive();
        let needs_new_day = days.last().is_none_or(|day| day.date != date);
        if needs_new_day {
            days.push(DailyTotals {
                date,
                income: Decimal::ZERO,
                expense: Decimal::ZERO,
                closing_balance: Decimal::ZERO,
            });
        }
        if let Some(day) = days.last_mut() {
            match entry.side {
                LedgerSide::Income => day.income += entry.delta,
                LedgerSide::Expense => day.expense -= entry.delta,
            }
            day.closing_balance = entry.balance;
        }
    }
    days
}
