//! Wedding budget ledger: income, expense and pending-income records kept per
//! profile, with budgets, a running-balance ledger and free-text entry.

pub mod config;
pub mod db;
pub mod error;
pub mod format;
pub mod models;
pub mod operations;

use std::sync::Once;

static TRACING_INIT: Once = Once::new();

/// Installs the global subscriber once. `RUST_LOG` extends the default
/// `wedding_ledger=info` filter; output goes to stderr so command output stays
/// clean.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{EnvFilter, fmt};

        let mut filter = EnvFilter::from_default_env();
        if let Ok(directive) = "wedding_ledger=info".parse() {
            filter = filter.add_directive(directive);
        }

        fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    });
}
