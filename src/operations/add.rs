use chrono::{DateTime, Duration, FixedOffset, NaiveDate, NaiveTime};
use rust_decimal::Decimal;
use std::str::FromStr;
use uuid::Uuid;

use crate::config::TrackerConfig;
use crate::db::store::RecordStore;
use crate::error::{Result, TrackerError};
use crate::models::pending::NewPendingIncome;
use crate::models::profile::Profile;
use crate::models::records::{NewExpense, NewIncome, ensure_label, ensure_positive_amount};
use crate::operations::extract::Extractor;
use crate::operations::normalize::{NormalizedRecord, TargetKind, localize, normalize};

/// Raw values of an income or expense form. `label` is the income source or
/// the expense category.
#[derive(Debug, Clone, Default)]
pub struct EntryForm {
    pub date: Option<String>,
    pub time: Option<String>,
    pub amount: String,
    pub label: String,
    pub notes: Option<String>,
}

pub fn parse_amount(raw: &str) -> Result<Decimal> {
    let amount = match Decimal::from_str(raw.trim()) {
        Ok(parsed_amount) => parsed_amount,
        Err(_) => {
            return Err(TrackerError::validation(format!(
                "Invalid amount format {}. Please provide a valid decimal number.",
                raw
            )));
        }
    };
    ensure_positive_amount(amount)?;
    Ok(amount)
}

pub fn parse_date(raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|_| TrackerError::validation("Invalid date format. Please use YYYY-MM-DD."))
}

fn parse_time(raw: &str) -> Result<NaiveTime> {
    NaiveTime::parse_from_str(raw.trim(), "%H:%M")
        .map_err(|_| TrackerError::validation("Invalid time format. Please use HH:MM."))
}

/// Date defaults to the day of `now`, time to the configured default.
pub fn resolve_timestamp(
    date: Option<&str>,
    time: Option<&str>,
    config: &TrackerConfig,
    now: DateTime<FixedOffset>,
) -> Result<DateTime<FixedOffset>> {
    let date = match date.filter(|d| !d.trim().is_empty()) {
        Some(raw) => parse_date(raw)?,
        None => now.date_naive(),
    };
    let time = match time.filter(|t| !t.trim().is_empty()) {
        Some(raw) => parse_time(raw)?,
        None => config.default_time,
    };
    Ok(localize(date.and_time(time), &config.utc_offset))
}

fn clean_notes(notes: Option<&str>) -> String {
    notes.map(|n| n.trim().to_string()).unwrap_or_default()
}

pub fn create_income(form: &EntryForm, config: &TrackerConfig, now: DateTime<FixedOffset>) -> Result<NewIncome> {
    let timestamp = resolve_timestamp(form.date.as_deref(), form.time.as_deref(), config, now)?;
    let amount = parse_amount(&form.amount)?;
    let source = form.label.trim();
    ensure_label("Source", source)?;
    Ok(NewIncome::new(timestamp, amount, source, clean_notes(form.notes.as_deref())))
}

pub fn create_expense(form: &EntryForm, config: &TrackerConfig, now: DateTime<FixedOffset>) -> Result<NewExpense> {
    let timestamp = resolve_timestamp(form.date.as_deref(), form.time.as_deref(), config, now)?;
    let amount = parse_amount(&form.amount)?;
    let category = form.label.trim();
    ensure_label("Category", category)?;
    Ok(NewExpense::new(timestamp, amount, category, clean_notes(form.notes.as_deref())))
}

/// Expected date defaults to `pending_horizon_days` after `today`.
pub fn create_pending(
    expected_on: Option<&str>,
    amount: &str,
    source: &str,
    notes: Option<&str>,
    config: &TrackerConfig,
    today: NaiveDate,
) -> Result<NewPendingIncome> {
    let expected_on = match expected_on.filter(|d| !d.trim().is_empty()) {
        Some(raw) => parse_date(raw)?,
        None => today + Duration::days(config.pending_horizon_days),
    };
    let amount = parse_amount(amount)?;
    let source = source.trim();
    ensure_label("Source", source)?;
    let notes = notes.map(str::trim).filter(|n| !n.is_empty()).map(str::to_string);
    Ok(NewPendingIncome::new(expected_on, amount, source, notes))
}

pub fn add_income_to_db(store: &mut RecordStore, profile: Profile, form: &EntryForm, config: &TrackerConfig) -> Result<Uuid> {
    let income = create_income(form, config, config.now())?;
    store.insert_income(profile, &income)
}

pub fn add_expense_to_db(store: &mut RecordStore, profile: Profile, form: &EntryForm, config: &TrackerConfig) -> Result<Uuid> {
    let expense = create_expense(form, config, config.now())?;
    store.insert_expense(profile, &expense)
}

pub fn add_pending_to_db(
    store: &mut RecordStore,
    profile: Profile,
    expected_on: Option<&str>,
    amount: &str,
    source: &str,
    notes: Option<&str>,
    config: &TrackerConfig,
) -> Result<Uuid> {
    let pending = create_pending(expected_on, amount, source, notes, config, config.today())?;
    store.insert_pending(profile, &pending)
}

/// Extracts, normalizes and saves free text as one record.
///
/// Extraction gaps never fail; only the store's own checks (such as a zero
/// amount) can reject the result.
pub fn quick_add_to_db(
    store: &mut RecordStore,
    profile: Profile,
    extractor: &dyn Extractor,
    raw_text: &str,
    target: TargetKind,
    config: &TrackerConfig,
    now: DateTime<FixedOffset>,
) -> Result<(Uuid, NormalizedRecord)> {
    let extraction = extractor.extract(raw_text);
    let record = normalize(&extraction, raw_text, target, now, config.default_time);
    let id = match &record {
        NormalizedRecord::Expense(expense) => store.insert_expense(profile, expense)?,
        NormalizedRecord::Income(income) => store.insert_income(profile, income)?,
    };
    Ok((id, record))
}
