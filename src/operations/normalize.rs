use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, TimeZone};
use rust_decimal::Decimal;
use serde_json::Value;
use std::str::FromStr;

use crate::models::records::{MAX_LABEL_CHARS, NewExpense, NewIncome};
use crate::operations::aggregate::OTHER_LABEL;

const DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%Y/%m/%d"];
const TIME_FORMATS: [&str; 3] = ["%H:%M", "%H:%M:%S", "%I:%M %p"];

/// Structured fields pulled out of free text. Any of them may be missing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtractionResult {
    pub date: Option<String>,
    pub time: Option<String>,
    pub amount: Option<Decimal>,
    pub category: Option<String>,
    pub source: Option<String>,
    pub notes: Option<String>,
}

impl ExtractionResult {
    /// Reads an extraction service reply. Malformed JSON or fields of the
    /// wrong type come back as missing fields.
    pub fn from_json(reply: &str) -> Self {
        let value: Value = match serde_json::from_str(reply) {
            Ok(value) => value,
            Err(_) => return Self::default(),
        };
        let Some(object) = value.as_object() else {
            return Self::default();
        };
        let text = |key: &str| object.get(key).and_then(Value::as_str).and_then(non_blank);

        Self {
            date: text("date"),
            time: text("time"),
            amount: object
                .get("amount_lkr")
                .or_else(|| object.get("amount"))
                .and_then(amount_from_value),
            category: text("category"),
            source: text("source"),
            notes: text("notes"),
        }
    }
}

fn non_blank(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn amount_from_value(value: &Value) -> Option<Decimal> {
    match value {
        Value::Number(number) => Decimal::from_str(&number.to_string())
            .ok()
            .or_else(|| number.as_f64().and_then(|f| Decimal::try_from(f).ok())),
        Value::String(raw) => parse_amount_text(raw),
        _ => None,
    }
}

/// Accepts "75,000", "LKR 75000.50" and similar.
pub fn parse_amount_text(raw: &str) -> Option<Decimal> {
    let cleaned: String = raw
        .trim()
        .trim_start_matches("LKR")
        .trim_start_matches("lkr")
        .chars()
        .filter(|c| !c.is_whitespace() && *c != ',')
        .collect();
    Decimal::from_str(&cleaned).ok()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetKind {
    Expense,
    Income,
}

#[derive(Debug, Clone, PartialEq)]
pub enum NormalizedRecord {
    Expense(NewExpense),
    Income(NewIncome),
}

impl NormalizedRecord {
    pub fn timestamp(&self) -> DateTime<FixedOffset> {
        match self {
            NormalizedRecord::Expense(expense) => expense.timestamp,
            NormalizedRecord::Income(income) => income.timestamp,
        }
    }

    pub fn amount(&self) -> Decimal {
        match self {
            NormalizedRecord::Expense(expense) => expense.amount,
            NormalizedRecord::Income(income) => income.amount,
        }
    }
}

/// Turns an extraction into a ledger record, filling every gap:
///
/// * date missing, unparseable, or before the current year: today
/// * time missing or unparseable: `default_time`
/// * amount missing: 0 (a negative amount is taken as its magnitude)
/// * category/source missing: "Other"; present values are title-cased and
///   cut to the longest label the store accepts
/// * notes missing: the raw text
///
/// `now` supplies "today" and the offset of the resulting timestamp.
pub fn normalize(
    extraction: &ExtractionResult,
    raw_text: &str,
    target: TargetKind,
    now: DateTime<FixedOffset>,
    default_time: NaiveTime,
) -> NormalizedRecord {
    let date = resolve_date(extraction.date.as_deref(), now.date_naive());
    let time = resolve_time(extraction.time.as_deref(), default_time);
    let timestamp = localize(date.and_time(time), now.offset());
    let amount = extraction.amount.map(|a| a.abs()).unwrap_or(Decimal::ZERO);
    let notes = extraction
        .notes
        .as_deref()
        .and_then(non_blank)
        .unwrap_or_else(|| raw_text.to_string());

    match target {
        TargetKind::Expense => NormalizedRecord::Expense(NewExpense::new(
            timestamp,
            amount,
            label_or_other(extraction.category.as_deref()),
            notes,
        )),
        TargetKind::Income => NormalizedRecord::Income(NewIncome::new(
            timestamp,
            amount,
            label_or_other(extraction.source.as_deref()),
            notes,
        )),
    }
}

fn resolve_date(raw: Option<&str>, today: NaiveDate) -> NaiveDate {
    raw.and_then(|value| {
        DATE_FORMATS
            .iter()
            .find_map(|format| NaiveDate::parse_from_str(value.trim(), format).ok())
    })
    // an earlier year means the extractor guessed the year wrong
    .filter(|date| date.year() >= today.year())
    .unwrap_or(today)
}

fn resolve_time(raw: Option<&str>, default_time: NaiveTime) -> NaiveTime {
    raw.and_then(|value| {
        TIME_FORMATS
            .iter()
            .find_map(|format| NaiveTime::parse_from_str(value.trim(), format).ok())
    })
    .unwrap_or(default_time)
}

pub(crate) fn localize(naive: NaiveDateTime, offset: &FixedOffset) -> DateTime<FixedOffset> {
    offset
        .from_local_datetime(&naive)
        .single()
        .unwrap_or_else(|| offset.from_utc_datetime(&naive))
}

fn label_or_other(raw: Option<&str>) -> String {
    raw.and_then(non_blank)
        .map(|label| clamp_label(&title_case(&label)))
        .unwrap_or_else(|| OTHER_LABEL.to_string())
}

fn clamp_label(label: &str) -> String {
    if label.chars().count() <= MAX_LABEL_CHARS {
        return label.to_string();
    }
    let clamped: String = label.chars().take(MAX_LABEL_CHARS).collect();
    clamped.trim_end().to_string()
}

/// Upper-cases the first letter of every alphabetic run and lower-cases the
/// rest, so "PHOTO booth" becomes "Photo Booth".
pub fn title_case(input: &str) -> String {
    let mut result = String::with_capacity(input.len());
    let mut previous_is_letter = false;
    for ch in input.chars() {
        if ch.is_alphabetic() {
            if previous_is_letter {
                result.extend(ch.to_lowercase());
            } else {
                result.extend(ch.to_uppercase());
            }
            previous_is_letter = true;
        } else {
            result.push(ch);
            previous_is_letter = false;
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn now() -> DateTime<FixedOffset> {
        FixedOffset::east_opt(19800)
            .unwrap()
            .with_ymd_and_hms(2025, 6, 14, 9, 41, 27)
            .unwrap()
    }

    fn noon() -> NaiveTime {
        NaiveTime::from_hms_opt(12, 0, 0).unwrap()
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 14).unwrap()
    }

    fn expect_expense(record: NormalizedRecord) -> NewExpense {
        match record {
            NormalizedRecord::Expense(expense) => expense,
            other => panic!("expected an expense, got {:?}", other),
        }
    }

    fn expect_income(record: NormalizedRecord) -> NewIncome {
        match record {
            NormalizedRecord::Income(income) => income,
            other => panic!("expected an income, got {:?}", other),
        }
    }

    #[test]
    fn test_all_blank_fields_fall_back() {
        let extraction = ExtractionResult::from_json(
            r#"{"date":"","time":"","amount_lkr":75000,"category":"","source":"","notes":""}"#,
        );
        let raw = "Paid photographer 75000";

        let expense = expect_expense(normalize(&extraction, raw, TargetKind::Expense, now(), noon()));
        assert_eq!(expense.timestamp.date_naive(), today());
        assert_eq!(expense.timestamp.time(), NaiveTime::from_hms_opt(12, 0, 0).unwrap());
        assert_eq!(expense.amount, Decimal::new(75000, 0));
        assert_eq!(expense.category, "Other");
        assert_eq!(expense.notes, raw);
    }

    #[test]
    fn test_past_year_falls_back_to_today() {
        let extraction = ExtractionResult {
            date: Some("2021-01-01".to_string()),
            time: Some("18:30".to_string()),
            amount: Some(Decimal::new(1200, 0)),
            ..Default::default()
        };
        let expense = expect_expense(normalize(&extraction, "cake", TargetKind::Expense, now(), noon()));
        assert_eq!(expense.timestamp.date_naive(), today());
        assert_eq!(expense.timestamp.time(), NaiveTime::from_hms_opt(18, 30, 0).unwrap());
    }

    #[test]
    fn test_valid_fields_are_used() {
        let extraction = ExtractionResult {
            date: Some("2025-07-02".to_string()),
            time: Some("07:15".to_string()),
            amount: Some(Decimal::new(4500050, 2)),
            category: Some("photo BOOTH".to_string()),
            source: None,
            notes: Some("deposit".to_string()),
        };
        let expense = expect_expense(normalize(&extraction, "raw", TargetKind::Expense, now(), noon()));
        assert_eq!(expense.timestamp.date_naive(), NaiveDate::from_ymd_opt(2025, 7, 2).unwrap());
        assert_eq!(expense.timestamp.time(), NaiveTime::from_hms_opt(7, 15, 0).unwrap());
        assert_eq!(expense.timestamp.offset().local_minus_utc(), 19800);
        assert_eq!(expense.amount, Decimal::new(4500050, 2));
        assert_eq!(expense.category, "Photo Booth");
        assert_eq!(expense.notes, "deposit");
    }

    #[test]
    fn test_income_uses_source_not_category() {
        let extraction = ExtractionResult {
            category: Some("venue".to_string()),
            source: Some("wedding gift".to_string()),
            amount: Some(Decimal::new(20000, 0)),
            ..Default::default()
        };
        let income = expect_income(normalize(&extraction, "gift from aunt", TargetKind::Income, now(), noon()));
        assert_eq!(income.source, "Wedding Gift");
        assert_eq!(income.notes, "gift from aunt");
    }

    #[test]
    fn test_missing_amount_is_zero_and_negative_is_magnitude() {
        let missing = ExtractionResult::default();
        let record = normalize(&missing, "something", TargetKind::Expense, now(), noon());
        assert_eq!(record.amount(), Decimal::ZERO);

        let negative = ExtractionResult {
            amount: Some(Decimal::new(-300, 0)),
            ..Default::default()
        };
        let record = normalize(&negative, "refund?", TargetKind::Expense, now(), noon());
        assert_eq!(record.amount(), Decimal::new(300, 0));
    }

    #[test]
    fn test_garbled_date_and_time_fall_back() {
        let extraction = ExtractionResult {
            date: Some("next friday".to_string()),
            time: Some("evening".to_string()),
            ..Default::default()
        };
        let record = normalize(&extraction, "x", TargetKind::Income, now(), noon());
        assert_eq!(record.timestamp().date_naive(), today());
        assert_eq!(record.timestamp().time(), NaiveTime::from_hms_opt(12, 0, 0).unwrap());
    }

    #[test]
    fn test_missing_time_uses_given_default() {
        let evening = NaiveTime::from_hms_opt(18, 0, 0).unwrap();
        let record = normalize(&ExtractionResult::default(), "x", TargetKind::Expense, now(), evening);
        assert_eq!(record.timestamp().time(), evening);
    }

    #[test]
    fn test_long_label_is_cut_to_store_limit() {
        let extraction = ExtractionResult::from_json(
            r#"{"amount_lkr":75000,"category":"Photography and videography package for the homecoming"}"#,
        );
        let expense = expect_expense(normalize(&extraction, "raw", TargetKind::Expense, now(), noon()));
        assert_eq!(expense.category, "Photography And Videography Package For The Homec");
        assert_eq!(expense.category.chars().count(), MAX_LABEL_CHARS);
        assert!(expense.validate().is_ok());

        let accented = ExtractionResult {
            source: Some("é".repeat(80)),
            amount: Some(Decimal::ONE),
            ..Default::default()
        };
        let income = expect_income(normalize(&accented, "raw", TargetKind::Income, now(), noon()));
        assert_eq!(income.source.chars().count(), MAX_LABEL_CHARS);
    }

    #[test]
    fn test_same_input_same_output() {
        let extraction = ExtractionResult {
            date: Some("2025-09-01".to_string()),
            amount: Some(Decimal::new(10, 0)),
            category: Some("cake".to_string()),
            ..Default::default()
        };
        let first = normalize(&extraction, "cake", TargetKind::Expense, now(), noon());
        let second = normalize(&extraction, "cake", TargetKind::Expense, now(), noon());
        assert_eq!(first, second);
    }

    #[test]
    fn test_from_json_tolerates_garbage() {
        assert_eq!(ExtractionResult::from_json("not json"), ExtractionResult::default());
        assert_eq!(ExtractionResult::from_json("[1, 2]"), ExtractionResult::default());

        let mixed = ExtractionResult::from_json(r#"{"date": 20250101, "amount": "LKR 12,500", "category": null}"#);
        assert_eq!(mixed.date, None);
        assert_eq!(mixed.amount, Some(Decimal::new(12500, 0)));
        assert_eq!(mixed.category, None);
    }

    #[test]
    fn test_from_json_decimal_amount() {
        let extraction = ExtractionResult::from_json(r#"{"amount_lkr": 1999.5}"#);
        assert_eq!(extraction.amount, Some(Decimal::new(19995, 1)));
    }

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("venue"), "Venue");
        assert_eq!(title_case("BRIDAL dress"), "Bridal Dress");
        assert_eq!(title_case("dj/music"), "Dj/Music");
        assert_eq!(title_case(""), "");
    }

    #[test]
    fn test_parse_amount_text() {
        assert_eq!(parse_amount_text("75,000"), Some(Decimal::new(75000, 0)));
        assert_eq!(parse_amount_text("LKR 1,250.75"), Some(Decimal::new(125075, 2)));
        assert_eq!(parse_amount_text("lots"), None);
    }
}
