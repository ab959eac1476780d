use rusqlite::Connection;
use rust_decimal::Decimal;
use std::time::Duration;
use tracing::{debug, info};
use uuid::Uuid;

use crate::config::TrackerConfig;
use crate::db::budget_repository;
use crate::db::cache::SnapshotCache;
use crate::db::connection::{establish_connection, establish_in_memory_connection};
use crate::db::pending_repository;
use crate::db::repository;
use crate::error::{Result, TrackerError};
use crate::models::budget::BudgetEntry;
use crate::models::pending::{NewPendingIncome, PendingIncomeRecord};
use crate::models::profile::{Profile, RecordKind};
use crate::models::records::{
    ExpenseRecord, IncomeRecord, NewExpense, NewIncome, RecordUpdate, ensure_label,
};

/// Owns the database connection and the per-table read snapshots.
///
/// Every write runs in its own transaction and invalidates the snapshot of the
/// table it touched, so a load after a write always sees the write.
pub struct RecordStore {
    conn: Connection,
    incomes: SnapshotCache<IncomeRecord>,
    expenses: SnapshotCache<ExpenseRecord>,
    pending: SnapshotCache<PendingIncomeRecord>,
    budgets: SnapshotCache<BudgetEntry>,
}

impl RecordStore {
    pub fn open(config: &TrackerConfig) -> Result<Self> {
        let conn = establish_connection(&config.database_path)?;
        info!(path = %config.database_path.display(), "opened record store");
        Ok(Self::with_connection(conn, config.cache_ttl))
    }

    pub fn open_in_memory(cache_ttl: Duration) -> Result<Self> {
        let conn = establish_in_memory_connection()?;
        Ok(Self::with_connection(conn, cache_ttl))
    }

    fn with_connection(conn: Connection, cache_ttl: Duration) -> Self {
        Self {
            conn,
            incomes: SnapshotCache::new(cache_ttl),
            expenses: SnapshotCache::new(cache_ttl),
            pending: SnapshotCache::new(cache_ttl),
            budgets: SnapshotCache::new(cache_ttl),
        }
    }

    pub(crate) fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Runs `work` inside a transaction: commit on `Ok`, rollback on `Err`.
    pub(crate) fn transaction<T>(&mut self, work: impl FnOnce(&Connection) -> Result<T>) -> Result<T> {
        let tx = self.conn.transaction()?;
        let value = work(&tx)?;
        tx.commit()?;
        Ok(value)
    }

    pub fn invalidate(&mut self, profile: Profile, kind: RecordKind) {
        debug!(%profile, table = kind.table(), "invalidating snapshot");
        match kind {
            RecordKind::Income => self.incomes.invalidate(profile),
            RecordKind::Expense => self.expenses.invalidate(profile),
            RecordKind::PendingIncome => self.pending.invalidate(profile),
            RecordKind::Budget => self.budgets.invalidate(profile),
        }
    }

    pub fn insert_income(&mut self, profile: Profile, income: &NewIncome) -> Result<Uuid> {
        Ok(self.insert_incomes(profile, std::slice::from_ref(income))?[0])
    }

    /// Inserts all incomes or none of them.
    pub fn insert_incomes(&mut self, profile: Profile, incomes: &[NewIncome]) -> Result<Vec<Uuid>> {
        for income in incomes {
            income.validate()?;
        }
        let ids = self.transaction(|conn| {
            let mut ids = Vec::with_capacity(incomes.len());
            for income in incomes {
                let id = Uuid::new_v4();
                repository::add_income(conn, profile, id, income)?;
                ids.push(id);
            }
            Ok(ids)
        })?;
        self.invalidate(profile, RecordKind::Income);
        info!(%profile, count = ids.len(), "recorded income");
        Ok(ids)
    }

    pub fn insert_expense(&mut self, profile: Profile, expense: &NewExpense) -> Result<Uuid> {
        Ok(self.insert_expenses(profile, std::slice::from_ref(expense))?[0])
    }

    /// Inserts all expenses or none of them.
    pub fn insert_expenses(&mut self, profile: Profile, expenses: &[NewExpense]) -> Result<Vec<Uuid>> {
        for expense in expenses {
            expense.validate()?;
        }
        let ids = self.transaction(|conn| {
            let mut ids = Vec::with_capacity(expenses.len());
            for expense in expenses {
                let id = Uuid::new_v4();
                repository::add_expense(conn, profile, id, expense)?;
                ids.push(id);
            }
            Ok(ids)
        })?;
        self.invalidate(profile, RecordKind::Expense);
        info!(%profile, count = ids.len(), "recorded expense");
        Ok(ids)
    }

    pub fn insert_pending(&mut self, profile: Profile, pending: &NewPendingIncome) -> Result<Uuid> {
        pending.validate()?;
        let id = Uuid::new_v4();
        self.transaction(|conn| pending_repository::add_pending(conn, profile, id, pending))?;
        self.invalidate(profile, RecordKind::PendingIncome);
        info!(%profile, %id, amount = %pending.amount, "recorded pending income");
        Ok(id)
    }

    /// Inserts the category or, if it already exists for this profile,
    /// replaces its limit.
    pub fn upsert_budget(&mut self, profile: Profile, category: &str, limit: Decimal) -> Result<()> {
        let category = category.trim();
        ensure_label("Category", category)?;
        ensure_budget_limit(limit)?;
        self.transaction(|conn| budget_repository::set_budget(conn, profile, category, &limit))?;
        self.invalidate(profile, RecordKind::Budget);
        info!(%profile, category, %limit, "saved budget");
        Ok(())
    }

    pub fn update(&mut self, profile: Profile, kind: RecordKind, id: Uuid, changes: &RecordUpdate) -> Result<()> {
        changes.validate()?;
        let rows = self.transaction(|conn| repository::update_record(conn, profile, kind, id, changes))?;
        if rows == 0 {
            return Err(TrackerError::not_found(kind, id));
        }
        self.invalidate(profile, kind);
        info!(%profile, table = kind.table(), %id, "updated record");
        Ok(())
    }

    pub fn update_budget_limit(&mut self, profile: Profile, category: &str, limit: Decimal) -> Result<()> {
        ensure_budget_limit(limit)?;
        let category = category.trim();
        let rows = self.transaction(|conn| {
            budget_repository::update_budget_limit(conn, profile, category, &limit)
        })?;
        if rows == 0 {
            return Err(TrackerError::not_found(RecordKind::Budget, category));
        }
        self.invalidate(profile, RecordKind::Budget);
        info!(%profile, category, %limit, "updated budget limit");
        Ok(())
    }

    /// Deletes the given ids; ids that do not exist are skipped.
    pub fn delete(&mut self, profile: Profile, kind: RecordKind, ids: &[Uuid]) -> Result<usize> {
        let removed = self.transaction(|conn| repository::remove_records(conn, profile, kind, ids))?;
        self.invalidate(profile, kind);
        info!(%profile, table = kind.table(), removed, "deleted records");
        Ok(removed)
    }

    pub fn delete_budgets(&mut self, profile: Profile, categories: &[String]) -> Result<usize> {
        let removed = self.transaction(|conn| budget_repository::delete_budgets(conn, profile, categories))?;
        self.invalidate(profile, RecordKind::Budget);
        info!(%profile, removed, "deleted budgets");
        Ok(removed)
    }

    pub fn load_incomes(&mut self, profile: Profile) -> Result<Vec<IncomeRecord>> {
        if let Some(cached) = self.incomes.get(profile) {
            debug!(%profile, "income snapshot hit");
            return Ok(cached);
        }
        let records = repository::get_all_incomes(&self.conn, profile)?;
        self.incomes.put(profile, records.clone());
        Ok(records)
    }

    pub fn load_expenses(&mut self, profile: Profile) -> Result<Vec<ExpenseRecord>> {
        if let Some(cached) = self.expenses.get(profile) {
            debug!(%profile, "expense snapshot hit");
            return Ok(cached);
        }
        let records = repository::get_all_expenses(&self.conn, profile)?;
        self.expenses.put(profile, records.clone());
        Ok(records)
    }

    pub fn load_pending(&mut self, profile: Profile) -> Result<Vec<PendingIncomeRecord>> {
        if let Some(cached) = self.pending.get(profile) {
            debug!(%profile, "pending snapshot hit");
            return Ok(cached);
        }
        let records = pending_repository::get_all_pending(&self.conn, profile)?;
        self.pending.put(profile, records.clone());
        Ok(records)
    }

    pub fn load_budgets(&mut self, profile: Profile) -> Result<Vec<BudgetEntry>> {
        if let Some(cached) = self.budgets.get(profile) {
            debug!(%profile, "budget snapshot hit");
            return Ok(cached);
        }
        let records = budget_repository::get_all_budgets(&self.conn, profile)?;
        self.budgets.put(profile, records.clone());
        Ok(records)
    }
}

fn ensure_budget_limit(limit: Decimal) -> Result<()> {
    if limit < Decimal::ZERO {
        return Err(TrackerError::validation("Budget cannot be negative"));
    }
    Ok(())
}
