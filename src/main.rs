use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::process::ExitCode;
use std::str::FromStr;
use std::time::Duration;

use wedding_ledger::config::{DEFAULT_DATABASE_PATH, TrackerConfig, parse_utc_offset};
use wedding_ledger::db::store::RecordStore;
use wedding_ledger::error::{Result, TrackerError};
use wedding_ledger::format::{fmt_lkr, fmt_lkr_exact};
use wedding_ledger::models::profile::{Profile, RecordKind};
use wedding_ledger::operations::add::{
    EntryForm, add_expense_to_db, add_income_to_db, add_pending_to_db, parse_date, quick_add_to_db,
};
use wedding_ledger::operations::budget::{delete_budget_db, list_budgets_db, set_budget_db, update_budget_db};
use wedding_ledger::operations::dashboard::build_dashboard;
use wedding_ledger::operations::extract::{Extractor, JsonReplyExtractor, RuleBasedExtractor};
use wedding_ledger::operations::import::import_records_to_db;
use wedding_ledger::operations::ledger::{build_ledger, final_balance};
use wedding_ledger::operations::manage::{delete_records_db, parse_record_ids, update_record_db};
use wedding_ledger::operations::normalize::{NormalizedRecord, TargetKind};
use wedding_ledger::operations::reconcile::reconcile_pending;

#[derive(Parser)]
#[command(name = "wedledger", version, about = "Wedding budget ledger")]
struct Cli {
    /// SQLite database file.
    #[arg(long, env = "WEDDING_LEDGER_DB", default_value = DEFAULT_DATABASE_PATH, global = true)]
    db: PathBuf,

    /// bride or groom.
    #[arg(long, default_value = "bride", value_parser = Profile::from_str, global = true)]
    profile: Profile,

    /// Offset used for "today" and for new timestamps, e.g. +05:30.
    #[arg(long, env = "WEDDING_LEDGER_UTC_OFFSET", global = true)]
    utc_offset: Option<String>,

    /// YYYY-MM-DD; enables the countdown on the dashboard.
    #[arg(long, env = "WEDDING_LEDGER_WEDDING_DATE", global = true)]
    wedding_date: Option<String>,

    /// Seconds a loaded table stays cached.
    #[arg(long, env = "WEDDING_LEDGER_CACHE_TTL", global = true)]
    cache_ttl: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, Copy, ValueEnum)]
enum EntryKindArg {
    Income,
    Expense,
}

impl From<EntryKindArg> for TargetKind {
    fn from(arg: EntryKindArg) -> Self {
        match arg {
            EntryKindArg::Income => TargetKind::Income,
            EntryKindArg::Expense => TargetKind::Expense,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum RecordKindArg {
    Income,
    Expense,
    Pending,
}

impl From<RecordKindArg> for RecordKind {
    fn from(arg: RecordKindArg) -> Self {
        match arg {
            RecordKindArg::Income => RecordKind::Income,
            RecordKindArg::Expense => RecordKind::Expense,
            RecordKindArg::Pending => RecordKind::PendingIncome,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum ListKindArg {
    Income,
    Expense,
    Pending,
    Budget,
}

#[derive(clap::Args)]
struct EntryArgs {
    amount: String,
    /// Income source or expense category.
    label: String,
    #[arg(long)]
    date: Option<String>,
    #[arg(long)]
    time: Option<String>,
    #[arg(long)]
    notes: Option<String>,
}

impl From<EntryArgs> for EntryForm {
    fn from(args: EntryArgs) -> Self {
        EntryForm {
            date: args.date,
            time: args.time,
            amount: args.amount,
            label: args.label,
            notes: args.notes,
        }
    }
}

#[derive(Subcommand)]
enum Command {
    AddIncome(EntryArgs),
    AddExpense(EntryArgs),
    AddPending {
        amount: String,
        source: String,
        /// Defaults to one week from today.
        #[arg(long)]
        expected: Option<String>,
        #[arg(long)]
        notes: Option<String>,
    },
    /// Record free text such as "paid photographer 75k".
    QuickAdd {
        text: String,
        #[arg(long = "as", value_enum, default_value = "expense")]
        target: EntryKindArg,
        /// JSON reply from an external extractor, used instead of the built-in rules.
        #[arg(long)]
        extraction: Option<String>,
    },
    #[command(subcommand)]
    Budget(BudgetCommand),
    #[command(subcommand)]
    Pending(PendingCommand),
    List {
        #[arg(value_enum)]
        kind: ListKindArg,
    },
    Update {
        #[arg(value_enum)]
        kind: RecordKindArg,
        id: String,
        #[arg(long)]
        amount: Option<String>,
        #[arg(long)]
        notes: Option<String>,
    },
    Delete {
        #[arg(value_enum)]
        kind: RecordKindArg,
        #[arg(required = true)]
        ids: Vec<String>,
    },
    /// Import a headerless date,time,amount,label,notes CSV.
    Import {
        #[arg(value_enum)]
        kind: EntryKindArg,
        path: PathBuf,
    },
    Dashboard {
        #[arg(long)]
        json: bool,
    },
    Ledger,
}

#[derive(Subcommand)]
enum BudgetCommand {
    Set { category: String, limit: String },
    /// Change the limit of an existing category.
    Update { category: String, limit: String },
    List,
    Delete {
        #[arg(required = true)]
        categories: Vec<String>,
    },
}

#[derive(Subcommand)]
enum PendingCommand {
    List,
    /// Mark pending payments as received and move them into income.
    Clear {
        #[arg(required = true)]
        ids: Vec<String>,
    },
}

fn main() -> ExitCode {
    wedding_ledger::init_tracing();
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn build_config(cli: &Cli) -> Result<TrackerConfig> {
    let mut config = TrackerConfig {
        database_path: cli.db.clone(),
        ..TrackerConfig::default()
    };
    if let Some(offset) = &cli.utc_offset {
        config.utc_offset = parse_utc_offset(offset)?;
    }
    if let Some(date) = &cli.wedding_date {
        config.wedding_date = Some(parse_date(date)?);
    }
    if let Some(secs) = cli.cache_ttl {
        config.cache_ttl = Duration::from_secs(secs);
    }
    Ok(config)
}

fn run(cli: Cli) -> Result<()> {
    let config = build_config(&cli)?;
    let profile = cli.profile;
    let mut store = RecordStore::open(&config)?;

    match cli.command {
        Command::AddIncome(args) => {
            let id = add_income_to_db(&mut store, profile, &args.into(), &config)?;
            println!("Income added successfully ({}).", id);
        }
        Command::AddExpense(args) => {
            let id = add_expense_to_db(&mut store, profile, &args.into(), &config)?;
            println!("Expense added successfully ({}).", id);
        }
        Command::AddPending { amount, source, expected, notes } => {
            let id = add_pending_to_db(
                &mut store,
                profile,
                expected.as_deref(),
                &amount,
                &source,
                notes.as_deref(),
                &config,
            )?;
            println!("Pending income added successfully ({}).", id);
        }
        Command::QuickAdd { text, target, extraction } => {
            let extractor: Box<dyn Extractor> = match extraction {
                Some(reply) => Box::new(JsonReplyExtractor::new(move |_text: &str| Some(reply.clone()))),
                None => Box::new(RuleBasedExtractor),
            };
            let (id, record) = quick_add_to_db(
                &mut store,
                profile,
                extractor.as_ref(),
                &text,
                target.into(),
                &config,
                config.now(),
            )?;
            let (kind, label) = match &record {
                NormalizedRecord::Expense(expense) => ("expense", expense.category.as_str()),
                NormalizedRecord::Income(income) => ("income", income.source.as_str()),
            };
            println!(
                "Saved {} {}: {} on {} ({}).",
                kind,
                label,
                fmt_lkr_exact(record.amount()),
                record.timestamp().format("%Y-%m-%d %H:%M"),
                id
            );
        }
        Command::Budget(command) => run_budget(&mut store, profile, command)?,
        Command::Pending(PendingCommand::List) => print_list(&mut store, profile, ListKindArg::Pending)?,
        Command::Pending(PendingCommand::Clear { ids }) => {
            let ids = parse_record_ids(&ids)?;
            let report = reconcile_pending(&mut store, profile, &ids, config.now());
            for cleared in &report.cleared {
                println!("Cleared {} -> income {}", cleared.pending_id, cleared.income_id);
            }
            for failure in &report.failures {
                println!("Could not clear {}: {}", failure.pending_id, failure.error);
            }
            println!("{} of {} pending payments cleared.", report.success_count(), ids.len());
            if !report.is_complete() {
                return Err(TrackerError::validation(format!(
                    "{} pending payment(s) could not be cleared",
                    report.failures.len()
                )));
            }
        }
        Command::List { kind } => print_list(&mut store, profile, kind)?,
        Command::Update { kind, id, amount, notes } => {
            update_record_db(&mut store, profile, kind.into(), &id, amount.as_deref(), notes.as_deref())?;
            println!("Record updated successfully.");
        }
        Command::Delete { kind, ids } => {
            let removed = delete_records_db(&mut store, profile, kind.into(), &ids)?;
            println!("Removed {} record(s).", removed);
        }
        Command::Import { kind, path } => {
            let imported = import_records_to_db(&mut store, profile, kind.into(), &path, &config)?;
            println!("Successfully imported {} records.", imported);
        }
        Command::Dashboard { json } => {
            let dashboard = build_dashboard(&mut store, profile, &config, config.today())?;
            if json {
                match serde_json::to_string_pretty(&dashboard) {
                    Ok(text) => println!("{}", text),
                    Err(e) => return Err(std::io::Error::other(e).into()),
                }
            } else {
                print_dashboard(&dashboard);
            }
        }
        Command::Ledger => {
            let incomes = store.load_incomes(profile)?;
            let expenses = store.load_expenses(profile)?;
            let ledger = build_ledger(&incomes, &expenses);
            for entry in &ledger {
                println!(
                    "{}  {:<20} {:>20} {:>20}",
                    entry.timestamp.format("%Y-%m-%d %H:%M"),
                    entry.label,
                    fmt_lkr_exact(entry.delta),
                    fmt_lkr_exact(entry.balance)
                );
            }
            println!("Balance: {}", fmt_lkr_exact(final_balance(&ledger)));
        }
    }
    Ok(())
}

fn run_budget(store: &mut RecordStore, profile: Profile, command: BudgetCommand) -> Result<()> {
    match command {
        BudgetCommand::Set { category, limit } => {
            set_budget_db(store, profile, &category, &limit)?;
            println!("Budget for '{}' saved.", category.trim());
        }
        BudgetCommand::Update { category, limit } => {
            update_budget_db(store, profile, &category, &limit)?;
            println!("Budget for '{}' updated.", category.trim());
        }
        BudgetCommand::List => print_list(store, profile, ListKindArg::Budget)?,
        BudgetCommand::Delete { categories } => {
            let removed = delete_budget_db(store, profile, &categories)?;
            println!("Removed {} budget(s).", removed);
        }
    }
    Ok(())
}

fn print_list(store: &mut RecordStore, profile: Profile, kind: ListKindArg) -> Result<()> {
    match kind {
        ListKindArg::Income => {
            let incomes = store.load_incomes(profile)?;
            if incomes.is_empty() {
                println!("No income recorded.");
            }
            for income in incomes {
                println!(
                    "{}  {}  {:<20} {:>20}  {}",
                    income.id,
                    income.timestamp.format("%Y-%m-%d %H:%M"),
                    income.source,
                    fmt_lkr_exact(income.amount),
                    income.notes
                );
            }
        }
        ListKindArg::Expense => {
            let expenses = store.load_expenses(profile)?;
            if expenses.is_empty() {
                println!("No expenses recorded.");
            }
            for expense in expenses {
                println!(
                    "{}  {}  {:<20} {:>20}  {}",
                    expense.id,
                    expense.timestamp.format("%Y-%m-%d %H:%M"),
                    expense.category,
                    fmt_lkr_exact(expense.amount),
                    expense.notes
                );
            }
        }
        ListKindArg::Pending => {
            let pending = store.load_pending(profile)?;
            if pending.is_empty() {
                println!("No pending income.");
            }
            for record in pending {
                println!(
                    "{}  {}  {:<20} {:>20}  {}{}",
                    record.id,
                    record.expected_on,
                    record.source.as_deref().unwrap_or("-"),
                    fmt_lkr_exact(record.amount),
                    if record.cleared { "[cleared] " } else { "" },
                    record.notes.as_deref().unwrap_or("")
                );
            }
        }
        ListKindArg::Budget => {
            let budgets = list_budgets_db(store, profile)?;
            if budgets.is_empty() {
                println!("No budgets set.");
            }
            for budget in budgets {
                println!("{:<20} {:>20}", budget.category, fmt_lkr_exact(budget.limit));
            }
        }
    }
    Ok(())
}

fn print_dashboard(dashboard: &wedding_ledger::operations::dashboard::Dashboard) {
    let metrics = &dashboard.metrics;
    println!("Profile: {}", dashboard.profile);
    println!("Total income:      {}", fmt_lkr(metrics.total_income));
    println!("Total expense:     {}", fmt_lkr(metrics.total_expense));
    println!("Balance:           {}", fmt_lkr(metrics.balance));
    println!("Pending income:    {}", fmt_lkr(metrics.pending_total));
    println!("Projected balance: {}", fmt_lkr(metrics.projected_balance));
    if let Some(days) = dashboard.days_until_wedding {
        println!("Days until the wedding: {}", days);
    }

    if !dashboard.budget_lines.is_empty() {
        println!();
        println!("{:<20} {:>12} {:>12}", "Category", "Spent", "Budget");
        for line in &dashboard.budget_lines {
            let limit = if line.has_budget { fmt_lkr(line.limit) } else { "-".to_string() };
            println!("{:<20} {:>12} {:>12}", line.category, fmt_lkr(line.spent), limit);
        }
    }

    if !dashboard.compliance.is_empty() {
        println!();
        for row in &dashboard.compliance {
            println!("{:<20} {:>7}%  {}", row.category, row.percent.round_dp(1), row.bucket);
        }
        let counts: Vec<String> = dashboard
            .bucket_counts
            .iter()
            .map(|c| format!("{}: {}", c.bucket, c.count))
            .collect();
        println!("{}", counts.join(", "));
    }

    if !dashboard.slices.is_empty() {
        println!();
        println!("Spend by category:");
        for slice in &dashboard.slices {
            println!("  {:<20} {}", slice.category, fmt_lkr(slice.amount));
        }
    }

    if !dashboard.upcoming_pending.is_empty() {
        println!();
        println!("Upcoming payments:");
        for pending in &dashboard.upcoming_pending {
            println!(
                "  {}  {:<20} {}",
                pending.expected_on,
                pending.source.as_deref().unwrap_or("-"),
                fmt_lkr(pending.amount)
            );
        }
    }
}
