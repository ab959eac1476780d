use super::add::{EntryForm, create_expense, create_income};
use crate::config::TrackerConfig;
use crate::db::store::RecordStore;
use crate::error::{Result, TrackerError};
use crate::models::profile::Profile;
use crate::operations::normalize::TargetKind;
use std::fs::File;
use std::path::Path;
use tracing::info;

const COLUMNS: usize = 5;

/// Imports a headerless `date,time,amount,label,notes` CSV as incomes or
/// expenses. Every line is validated before anything is written, and the
/// whole file is stored in one transaction.
pub fn import_records_to_db(
    store: &mut RecordStore,
    profile: Profile,
    target: TargetKind,
    path: &Path,
    config: &TrackerConfig,
) -> Result<usize> {
    let forms = read_csv(path)?;
    let now = config.now();
    let count = match target {
        TargetKind::Income => {
            let incomes = build_all(&forms, |form| create_income(form, config, now))?;
            store.insert_incomes(profile, &incomes)?.len()
        }
        TargetKind::Expense => {
            let expenses = build_all(&forms, |form| create_expense(form, config, now))?;
            store.insert_expenses(profile, &expenses)?.len()
        }
    };
    info!(%profile, path = %path.display(), count, "imported records");
    Ok(count)
}

fn build_all<T>(forms: &[(usize, EntryForm)], create: impl Fn(&EntryForm) -> Result<T>) -> Result<Vec<T>> {
    forms
        .iter()
        .map(|(line, form)| {
            create(form).map_err(|e| TrackerError::Import {
                line: *line,
                source: Box::new(e),
            })
        })
        .collect()
}

fn read_csv(path: &Path) -> Result<Vec<(usize, EntryForm)>> {
    let file = File::open(path)?;

    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .has_headers(false)
        .flexible(true)
        .from_reader(file);

    let mut forms = Vec::new();

    for (line_index, result) in reader.records().enumerate() {
        let line = line_index + 1;
        let record = result.map_err(|e| TrackerError::Import {
            line,
            source: Box::new(e.into()),
        })?;

        if record.len() != COLUMNS {
            return Err(TrackerError::Import {
                line,
                source: Box::new(TrackerError::validation(format!(
                    "Invalid number of columns: expected {}, got {}",
                    COLUMNS,
                    record.len()
                ))),
            });
        }

        let optional = |idx: usize| {
            record
                .get(idx)
                .filter(|value| !value.is_empty())
                .map(str::to_string)
        };
        forms.push((
            line,
            EntryForm {
                date: optional(0),
                time: optional(1),
                amount: record.get(2).unwrap_or("").to_string(),
                label: record.get(3).unwrap_or("").to_string(),
                notes: optional(4),
            },
        ));
    }

    Ok(forms)
}
