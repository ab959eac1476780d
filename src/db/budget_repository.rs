use crate::db::decimal_column;
use crate::error::Result;
use crate::models::budget::BudgetEntry;
use crate::models::profile::Profile;
use rusqlite::{Connection, params};
use rust_decimal::Decimal;

pub fn set_budget(conn: &Connection, profile: Profile, category: &str, limit: &Decimal) -> Result<()> {
    conn.execute(
        "INSERT INTO budget (profile, category, limit_amount) VALUES (?1, ?2, ?3) \
         ON CONFLICT(profile, category) DO UPDATE SET limit_amount = excluded.limit_amount",
        params![profile.as_str(), category, limit.to_string()],
    )?;
    Ok(())
}

fn budget_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<BudgetEntry> {
    Ok(BudgetEntry {
        id: row.get(0)?,
        category: row.get(1)?,
        limit: decimal_column(row, 2)?,
    })
}

pub fn get_all_budgets(conn: &Connection, profile: Profile) -> Result<Vec<BudgetEntry>> {
    let mut stmt = conn.prepare(
        "SELECT id, category, limit_amount FROM budget WHERE profile = ?1 ORDER BY category ASC",
    )?;
    let budgets = stmt
        .query_map([profile.as_str()], budget_from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(budgets)
}

/// Changes the limit of an existing entry; returns the number of rows touched.
pub fn update_budget_limit(conn: &Connection, profile: Profile, category: &str, limit: &Decimal) -> Result<usize> {
    let rows = conn.execute(
        "UPDATE budget SET limit_amount = ?1 WHERE profile = ?2 AND category = ?3",
        params![limit.to_string(), profile.as_str(), category],
    )?;
    Ok(rows)
}

pub fn delete_budgets(conn: &Connection, profile: Profile, categories: &[String]) -> Result<usize> {
    let mut stmt = conn.prepare("DELETE FROM budget WHERE profile = ?1 AND category = ?2")?;
    let mut removed = 0;
    for category in categories {
        removed += stmt.execute(params![profile.as_str(), category])?;
    }
    Ok(removed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::connection::establish_in_memory_connection;
    use std::str::FromStr;

    #[test]
    fn test_set_budget_upserts_by_category() {
        let conn = establish_in_memory_connection().unwrap();
        set_budget(&conn, Profile::Groom, "Venue", &Decimal::new(500000, 0)).unwrap();
        set_budget(&conn, Profile::Groom, "Venue", &Decimal::new(600000, 0)).unwrap();

        let budgets = get_all_budgets(&conn, Profile::Groom).unwrap();
        assert_eq!(budgets.len(), 1);
        assert_eq!(budgets[0].category, "Venue");
        assert_eq!(budgets[0].limit, Decimal::new(600000, 0));
    }

    #[test]
    fn test_same_category_in_both_profiles() {
        let conn = establish_in_memory_connection().unwrap();
        set_budget(&conn, Profile::Groom, "Venue", &Decimal::new(100, 0)).unwrap();
        set_budget(&conn, Profile::Bride, "Venue", &Decimal::new(200, 0)).unwrap();

        let groom = get_all_budgets(&conn, Profile::Groom).unwrap();
        let bride = get_all_budgets(&conn, Profile::Bride).unwrap();
        assert_eq!(groom.len(), 1);
        assert_eq!(groom[0].limit, Decimal::new(100, 0));
        assert_eq!(bride[0].limit, Decimal::new(200, 0));
    }

    #[test]
    fn test_get_all_budgets_sorted_by_category() {
        let conn = establish_in_memory_connection().unwrap();
        set_budget(&conn, Profile::Bride, "Venue", &Decimal::new(1, 0)).unwrap();
        set_budget(&conn, Profile::Bride, "Cake", &Decimal::new(1, 0)).unwrap();

        let categories: Vec<String> = get_all_budgets(&conn, Profile::Bride)
            .unwrap()
            .into_iter()
            .map(|b| b.category)
            .collect();
        assert_eq!(categories, vec!["Cake".to_string(), "Venue".to_string()]);
    }

    #[test]
    fn test_update_budget_limit_missing_category() {
        let conn = establish_in_memory_connection().unwrap();
        let rows = update_budget_limit(&conn, Profile::Bride, "Missing", &Decimal::ONE).unwrap();
        assert_eq!(rows, 0);
    }

    #[test]
    fn test_update_budget_limit_existing() {
        let conn = establish_in_memory_connection().unwrap();
        set_budget(&conn, Profile::Bride, "Decor", &Decimal::new(10, 0)).unwrap();
        let rows = update_budget_limit(&conn, Profile::Bride, "Decor", &Decimal::from_str("12.50").unwrap()).unwrap();
        assert_eq!(rows, 1);

        let budget = &get_all_budgets(&conn, Profile::Bride).unwrap()[0];
        assert_eq!(budget.limit, Decimal::from_str("12.50").unwrap());
    }

    #[test]
    fn test_delete_budgets() {
        let conn = establish_in_memory_connection().unwrap();
        set_budget(&conn, Profile::Bride, "Decor", &Decimal::new(10, 0)).unwrap();
        set_budget(&conn, Profile::Bride, "Cake", &Decimal::new(10, 0)).unwrap();

        let removed = delete_budgets(&conn, Profile::Bride, &["Decor".to_string(), "Missing".to_string()]).unwrap();
        assert_eq!(removed, 1);
        assert_eq!(get_all_budgets(&conn, Profile::Bride).unwrap().len(), 1);
    }
}
