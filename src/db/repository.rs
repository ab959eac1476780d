use crate::db::{decimal_column, timestamp_column, uuid_column};
use crate::error::{Result, TrackerError};
use crate::models::profile::{Profile, RecordKind};
use crate::models::records::{ExpenseRecord, IncomeRecord, NewExpense, NewIncome, RecordUpdate};
use rusqlite::{Connection, params};
use uuid::Uuid;

pub fn add_income(conn: &Connection, profile: Profile, id: Uuid, income: &NewIncome) -> Result<()> {
    conn.execute(
        "INSERT INTO income (id, profile, occurred_at, amount, source, notes) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            id.to_string(),
            profile.as_str(),
            income.timestamp.to_rfc3339(),
            income.amount.to_string(),
            &income.source,
            &income.notes,
        ],
    )?;
    Ok(())
}

pub fn add_expense(conn: &Connection, profile: Profile, id: Uuid, expense: &NewExpense) -> Result<()> {
    conn.execute(
        "INSERT INTO expense (id, profile, occurred_at, amount, category, notes) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            id.to_string(),
            profile.as_str(),
            expense.timestamp.to_rfc3339(),
            expense.amount.to_string(),
            &expense.category,
            &expense.notes,
        ],
    )?;
    Ok(())
}

fn income_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<IncomeRecord> {
    Ok(IncomeRecord {
        id: uuid_column(row, 0)?,
        timestamp: timestamp_column(row, 1)?,
        amount: decimal_column(row, 2)?,
        source: row.get(3)?,
        notes: row.get(4)?,
    })
}

fn expense_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<ExpenseRecord> {
    Ok(ExpenseRecord {
        id: uuid_column(row, 0)?,
        timestamp: timestamp_column(row, 1)?,
        amount: decimal_column(row, 2)?,
        category: row.get(3)?,
        notes: row.get(4)?,
    })
}

/// Incomes in insertion order.
pub fn get_all_incomes(conn: &Connection, profile: Profile) -> Result<Vec<IncomeRecord>> {
    let mut stmt = conn.prepare(
        "SELECT id, occurred_at, amount, source, notes FROM income WHERE profile = ?1 ORDER BY rowid ASC",
    )?;
    let incomes = stmt
        .query_map([profile.as_str()], income_from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(incomes)
}

/// Expenses in insertion order.
pub fn get_all_expenses(conn: &Connection, profile: Profile) -> Result<Vec<ExpenseRecord>> {
    let mut stmt = conn.prepare(
        "SELECT id, occurred_at, amount, category, notes FROM expense WHERE profile = ?1 ORDER BY rowid ASC",
    )?;
    let expenses = stmt
        .query_map([profile.as_str()], expense_from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(expenses)
}

/// Applies an amount/notes change to one income, expense or pending row.
/// Returns the number of rows touched.
pub fn update_record(
    conn: &Connection,
    profile: Profile,
    kind: RecordKind,
    id: Uuid,
    changes: &RecordUpdate,
) -> Result<usize> {
    if kind == RecordKind::Budget {
        return Err(TrackerError::validation(
            "Budgets are keyed by category; update the limit instead",
        ));
    }
    let sql = format!(
        "UPDATE {} SET amount = COALESCE(?1, amount), notes = COALESCE(?2, notes) \
         WHERE profile = ?3 AND id = ?4",
        kind.table()
    );
    let rows = conn.execute(
        &sql,
        params![
            changes.amount.map(|a| a.to_string()),
            changes.notes.as_deref(),
            profile.as_str(),
            id.to_string(),
        ],
    )?;
    Ok(rows)
}

pub fn remove_records(conn: &Connection, profile: Profile, kind: RecordKind, ids: &[Uuid]) -> Result<usize> {
    if kind == RecordKind::Budget {
        return Err(TrackerError::validation(
            "Budgets are keyed by category; delete them by category",
        ));
    }
    let sql = format!("DELETE FROM {} WHERE profile = ?1 AND id = ?2", kind.table());
    let mut stmt = conn.prepare(&sql)?;
    let mut removed = 0;
    for id in ids {
        removed += stmt.execute(params![profile.as_str(), id.to_string()])?;
    }
    Ok(removed)
}
