use crate::db::{DATE_FORMAT, date_column, decimal_column, uuid_column};
use crate::error::Result;
use crate::models::pending::{NewPendingIncome, PendingIncomeRecord};
use crate::models::profile::Profile;
use rusqlite::{Connection, OptionalExtension, params};
use uuid::Uuid;

pub fn add_pending(conn: &Connection, profile: Profile, id: Uuid, pending: &NewPendingIncome) -> Result<()> {
    conn.execute(
        "INSERT INTO pending_income (id, profile, expected_on, amount, source, notes, cleared) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, 0)",
        params![
            id.to_string(),
            profile.as_str(),
            pending.expected_on.format(DATE_FORMAT).to_string(),
            pending.amount.to_string(),
            &pending.source,
            pending.notes.as_deref(),
        ],
    )?;
    Ok(())
}

fn pending_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<PendingIncomeRecord> {
    Ok(PendingIncomeRecord {
        id: uuid_column(row, 0)?,
        expected_on: date_column(row, 1)?,
        amount: decimal_column(row, 2)?,
        source: row.get(3)?,
        notes: row.get(4)?,
        cleared: row.get(5)?,
    })
}

/// Uncleared rows first, each group by expected date.
pub fn get_all_pending(conn: &Connection, profile: Profile) -> Result<Vec<PendingIncomeRecord>> {
    let mut stmt = conn.prepare(
        "SELECT id, expected_on, amount, source, notes, cleared FROM pending_income \
         WHERE profile = ?1 ORDER BY cleared ASC, expected_on ASC, rowid ASC",
    )?;
    let pending = stmt
        .query_map([profile.as_str()], pending_from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(pending)
}

pub fn get_pending(conn: &Connection, profile: Profile, id: Uuid) -> Result<Option<PendingIncomeRecord>> {
    let pending = conn
        .query_row(
            "SELECT id, expected_on, amount, source, notes, cleared FROM pending_income \
             WHERE profile = ?1 AND id = ?2",
            params![profile.as_str(), id.to_string()],
            pending_from_row,
        )
        .optional()?;
    Ok(pending)
}

/// Flips `cleared` only if it is still false; returns whether a row changed.
pub fn mark_cleared(conn: &Connection, profile: Profile, id: Uuid) -> Result<bool> {
    let rows = conn.execute(
        "UPDATE pending_income SET cleared = 1 WHERE profile = ?1 AND id = ?2 AND cleared = 0",
        params![profile.as_str(), id.to_string()],
    )?;
    Ok(rows == 1)
}
