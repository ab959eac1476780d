use chrono::{DateTime, FixedOffset};
use tracing::{info, warn};
use uuid::Uuid;

use crate::db::pending_repository;
use crate::db::repository;
use crate::db::store::RecordStore;
use crate::error::{Result, TrackerError};
use crate::models::pending::PendingIncomeRecord;
use crate::models::profile::{Profile, RecordKind};
use crate::models::records::NewIncome;
use crate::operations::aggregate::OTHER_LABEL;

#[derive(Debug, Clone, PartialEq)]
pub struct ClearedPending {
    pub pending_id: Uuid,
    pub income_id: Uuid,
}

#[derive(Debug)]
pub struct ReconcileFailure {
    pub pending_id: Uuid,
    pub error: TrackerError,
}

/// Outcome of a batch: each selected id lands in exactly one of the lists.
#[derive(Debug, Default)]
pub struct ReconcileReport {
    pub cleared: Vec<ClearedPending>,
    pub failures: Vec<ReconcileFailure>,
}

impl ReconcileReport {
    pub fn success_count(&self) -> usize {
        self.cleared.len()
    }

    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// The income a pending record turns into when it is received at `at`.
pub fn income_from_pending(pending: &PendingIncomeRecord, at: DateTime<FixedOffset>) -> NewIncome {
    let source = pending
        .source
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(OTHER_LABEL);
    NewIncome::new(at, pending.amount, source, pending.notes.clone().unwrap_or_default())
}

/// Moves each selected pending record into the income ledger.
///
/// Every id is handled in its own transaction (insert the income, then flip
/// `cleared`), so a failed insert leaves the pending record uncleared and a
/// failure on one id does not stop the others.
pub fn reconcile_pending(
    store: &mut RecordStore,
    profile: Profile,
    ids: &[Uuid],
    at: DateTime<FixedOffset>,
) -> ReconcileReport {
    let mut report = ReconcileReport::default();

    for &pending_id in ids {
        match reconcile_one(store, profile, pending_id, at) {
            Ok(income_id) => {
                info!(%profile, %pending_id, %income_id, "cleared pending income");
                report.cleared.push(ClearedPending { pending_id, income_id });
            }
            Err(error) => {
                warn!(%profile, %pending_id, %error, "could not clear pending income");
                report.failures.push(ReconcileFailure { pending_id, error });
            }
        }
    }

    store.invalidate(profile, RecordKind::Income);
    store.invalidate(profile, RecordKind::PendingIncome);
    report
}

fn reconcile_one(
    store: &mut RecordStore,
    profile: Profile,
    pending_id: Uuid,
    at: DateTime<FixedOffset>,
) -> Result<Uuid> {
    store.transaction(|conn| {
        let pending = pending_repository::get_pending(conn, profile, pending_id)?
            .ok_or_else(|| TrackerError::not_found(RecordKind::PendingIncome, pending_id))?;
        if pending.cleared {
            return Err(TrackerError::AlreadyCleared(pending_id));
        }

        let income = income_from_pending(&pending, at);
        income.validate()?;
        let income_id = Uuid::new_v4();
        repository::add_income(conn, profile, income_id, &income)?;

        if !pending_repository::mark_cleared(conn, profile, pending_id)? {
            return Err(TrackerError::AlreadyCleared(pending_id));
        }
        Ok(income_id)
    })
}
