use uuid::Uuid;

use crate::db::store::RecordStore;
use crate::error::{Result, TrackerError};
use crate::models::profile::{Profile, RecordKind};
use crate::models::records::RecordUpdate;
use crate::operations::add::parse_amount;

pub fn parse_record_id(id_input: &str) -> Result<Uuid> {
    let id_input = id_input.trim();
    if id_input.is_empty() {
        return Err(TrackerError::validation("Record ID cannot be empty."));
    }
    match Uuid::parse_str(id_input) {
        Ok(parsed_id) => Ok(parsed_id),
        Err(_) => Err(TrackerError::validation(format!(
            "Invalid record ID format '{}'. Please provide a valid UUID.",
            id_input
        ))),
    }
}

pub fn parse_record_ids(inputs: &[String]) -> Result<Vec<Uuid>> {
    inputs.iter().map(|raw| parse_record_id(raw)).collect()
}

/// Edits the amount and/or notes of an income, expense or pending record.
pub fn update_record_db(
    store: &mut RecordStore,
    profile: Profile,
    kind: RecordKind,
    id_input: &str,
    amount: Option<&str>,
    notes: Option<&str>,
) -> Result<()> {
    let id = parse_record_id(id_input)?;
    let changes = RecordUpdate {
        amount: amount.map(parse_amount).transpose()?,
        notes: notes.map(|n| n.trim().to_string()),
    };
    store.update(profile, kind, id, &changes)
}

/// Deletes every listed record at once; unknown ids are skipped.
pub fn delete_records_db(store: &mut RecordStore, profile: Profile, kind: RecordKind, id_inputs: &[String]) -> Result<usize> {
    if id_inputs.is_empty() {
        return Err(TrackerError::validation("Select at least one record to delete."));
    }
    let ids = parse_record_ids(id_inputs)?;
    store.delete(profile, kind, &ids)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::records::NewExpense;
    use chrono::{FixedOffset, TimeZone};
    use rust_decimal::Decimal;
    use std::time::Duration;

    fn store_with_expense() -> (RecordStore, Uuid) {
        let mut store = RecordStore::open_in_memory(Duration::from_secs(30)).unwrap();
        let timestamp = FixedOffset::east_opt(19800)
            .unwrap()
            .with_ymd_and_hms(2025, 5, 5, 12, 0, 0)
            .unwrap();
        let id = store
            .insert_expense(Profile::Groom, &NewExpense::new(timestamp, Decimal::new(4000, 0), "Suit", "fitting"))
            .unwrap();
        (store, id)
    }

    #[test]
    fn test_parse_record_id_invalid() {
        let err = parse_record_id("12").unwrap_err();
        assert!(err.to_string().contains("Invalid record ID format"));
        assert!(parse_record_id("  ").is_err());
    }

    #[test]
    fn test_update_amount_and_notes() {
        let (mut store, id) = store_with_expense();
        update_record_db(&mut store, Profile::Groom, RecordKind::Expense, &id.to_string(), Some("4500"), Some("final fitting")).unwrap();

        let expense = &store.load_expenses(Profile::Groom).unwrap()[0];
        assert_eq!(expense.amount, Decimal::new(4500, 0));
        assert_eq!(expense.notes, "final fitting");
    }

    #[test]
    fn test_update_with_zero_amount_rejected() {
        let (mut store, id) = store_with_expense();
        let result = update_record_db(&mut store, Profile::Groom, RecordKind::Expense, &id.to_string(), Some("0"), None);
        assert!(matches!(result, Err(TrackerError::Validation(_))));
        assert_eq!(store.load_expenses(Profile::Groom).unwrap()[0].amount, Decimal::new(4000, 0));
    }

    #[test]
    fn test_update_nothing_rejected() {
        let (mut store, id) = store_with_expense();
        let result = update_record_db(&mut store, Profile::Groom, RecordKind::Expense, &id.to_string(), None, None);
        assert_eq!(result.unwrap_err().to_string(), "Nothing to update");
    }

    #[test]
    fn test_update_other_profile_not_found() {
        let (mut store, id) = store_with_expense();
        let result = update_record_db(&mut store, Profile::Bride, RecordKind::Expense, &id.to_string(), None, Some("x"));
        assert!(matches!(result, Err(TrackerError::NotFound { .. })));
    }

    #[test]
    fn test_delete_records() {
        let (mut store, id) = store_with_expense();
        let removed = delete_records_db(&mut store, Profile::Groom, RecordKind::Expense, &[id.to_string()]).unwrap();
        assert_eq!(removed, 1);
        assert!(store.load_expenses(Profile::Groom).unwrap().is_empty());
    }

    #[test]
    fn test_delete_records_bad_id_deletes_nothing() {
        let (mut store, id) = store_with_expense();
        let result = delete_records_db(&mut store, Profile::Groom, RecordKind::Expense, &[id.to_string(), "nope".to_string()]);
        assert!(result.is_err());
        assert_eq!(store.load_expenses(Profile::Groom).unwrap().len(), 1);
    }
}
