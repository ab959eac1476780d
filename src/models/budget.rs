use rust_decimal::Decimal;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BudgetEntry {
    pub id: i64,
    pub category: String,
    pub limit: Decimal,
}
