//! `pnl` — convert bank statements to a canonical ledger, report monthly
//! P&L, and project retirement savings.
//!
//! This binary plays the collaborator roles around the core: it enforces
//! the upload limits before any bytes reach the ingestion layer, and it is
//! the presentation boundary where monetary figures get rounded.

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use pnl_core::{
    DEFAULT_RETIREMENT_AGE, DateFilter, MandatoryRate, RetirementParameters, YearMonth, aggregate,
    project, round_currency,
};
use pnl_ingest::{ClassifierConfig, InputFile, ingest_batch, to_standard_csv};
use std::fs;
use std::path::{Path, PathBuf};

const MAX_FILE_SIZE: u64 = 16 * 1024 * 1024;
const ALLOWED_EXTENSIONS: [&str; 3] = ["pdf", "xls", "csv"];

#[derive(Parser, Debug)]
#[command(name = "pnl", version, about = "Bank statement P&L toolkit")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Print dropped rows and unparsed statement lines
    #[arg(long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Normalize statements into the canonical 5-column CSV
    Convert {
        /// Statement files (PDF, XLS, or CSV)
        files: Vec<PathBuf>,

        /// Output path (default: stdout)
        #[arg(long, short)]
        output: Option<PathBuf>,
    },

    /// Monthly P&L report across one or more statements
    Report {
        /// Statement files (PDF, XLS, or CSV)
        files: Vec<PathBuf>,

        /// First month to include (YYYY-MM)
        #[arg(long)]
        from: Option<YearMonth>,

        /// Last month to include (YYYY-MM)
        #[arg(long)]
        to: Option<YearMonth>,
    },

    /// Project retirement savings with the closed-form annuity model
    Retire {
        #[arg(long)]
        age: u32,

        #[arg(long, default_value_t = DEFAULT_RETIREMENT_AGE)]
        retirement_age: u32,

        /// Current savings balance
        #[arg(long, default_value_t = 0.0)]
        savings: f64,

        /// Gross monthly income (base for the mandatory-savings stream)
        #[arg(long, default_value_t = 0.0)]
        income: f64,

        /// Voluntary monthly contribution
        #[arg(long, default_value_t = 0.0)]
        contribution: f64,

        /// Target monthly spending after retirement
        #[arg(long)]
        expense: f64,

        /// Mandatory savings tier: employee, employee-employer, or full
        #[arg(long)]
        mandatory: Option<MandatoryRate>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Convert { files, output } => convert(&files, output.as_deref(), cli.verbose),
        Command::Report { files, from, to } => report(&files, from, to, cli.verbose),
        Command::Retire {
            age,
            retirement_age,
            savings,
            income,
            contribution,
            expense,
            mandatory,
        } => {
            retire(RetirementParameters {
                current_age: age,
                retirement_age,
                current_savings: savings,
                monthly_income: income,
                monthly_contribution: contribution,
                target_monthly_expense: expense,
                mandatory_savings: mandatory,
            });
            Ok(())
        }
    }
}

/// Read statement files fully into buffers, enforcing the upload contract
/// (extension allow-list, size ceiling) before the core sees any bytes.
fn load_files(paths: &[PathBuf]) -> Result<Vec<InputFile>> {
    if paths.is_empty() {
        bail!("no input files given");
    }
    let mut files = Vec::with_capacity(paths.len());
    for path in paths {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        if !ALLOWED_EXTENSIONS.contains(&ext.as_str()) {
            bail!(
                "{}: file type not supported (expected one of: {})",
                path.display(),
                ALLOWED_EXTENSIONS.join(", ")
            );
        }

        let meta = fs::metadata(path)
            .with_context(|| format!("reading {}", path.display()))?;
        if meta.len() > MAX_FILE_SIZE {
            bail!(
                "{}: file too large (max {}MB)",
                path.display(),
                MAX_FILE_SIZE / (1024 * 1024)
            );
        }

        let bytes = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("statement")
            .to_string();
        files.push(InputFile::new(name, bytes));
    }
    Ok(files)
}

fn ingest(paths: &[PathBuf], verbose: bool) -> Result<pnl_ingest::BatchResult> {
    let files = load_files(paths)?;
    let batch = ingest_batch(&files, &ClassifierConfig::default());

    for statement in &batch.statements {
        println!(
            "{}: {} transactions ({} rows dropped)",
            statement.account,
            statement.transactions.len(),
            statement.dropped_rows.len()
        );
        if verbose {
            for row in &statement.dropped_rows {
                eprintln!("  line {}: {}", row.source_line, row.reason);
            }
        }
    }
    for failure in &batch.failures {
        eprintln!("{}: FAILED: {}", failure.file, failure.error);
    }

    if batch.statements.is_empty() {
        bail!("no file could be processed");
    }
    Ok(batch)
}

fn convert(paths: &[PathBuf], output: Option<&Path>, verbose: bool) -> Result<()> {
    let batch = ingest(paths, verbose)?;
    let mut merged = batch.merged_transactions();
    merged.sort_by_key(|t| t.date);

    let csv = to_standard_csv(&merged).context("serializing canonical CSV")?;
    match output {
        Some(path) => {
            fs::write(path, &csv).with_context(|| format!("writing {}", path.display()))?;
            println!("Wrote {} transactions to {}", merged.len(), path.display());
        }
        None => print!("{csv}"),
    }
    Ok(())
}

fn report(
    paths: &[PathBuf],
    from: Option<YearMonth>,
    to: Option<YearMonth>,
    verbose: bool,
) -> Result<()> {
    let batch = ingest(paths, verbose)?;
    let merged = batch.merged_transactions();

    let filter = match (from, to) {
        (None, None) => None,
        (from, to) => {
            let months: Vec<YearMonth> = merged
                .iter()
                .map(|t| YearMonth::from_date(t.date))
                .collect();
            let Some(first) = months.iter().min().copied() else {
                bail!("no transactions to report on");
            };
            let Some(last) = months.iter().max().copied() else {
                bail!("no transactions to report on");
            };
            Some(DateFilter::new(from.unwrap_or(first), to.unwrap_or(last)))
        }
    };

    let summary = aggregate(&merged, filter);
    if summary.buckets.is_empty() {
        println!("No transactions in the selected range.");
        return Ok(());
    }

    println!();
    println!("{:<9} {:>12} {:>12} {:>12} {:>14}", "Month", "Income", "Expense", "Net", "Balance");
    for bucket in &summary.buckets {
        let balance = bucket
            .ending_balance
            .map(|b| format!("{:>14}", round_currency(b)))
            .unwrap_or_else(|| format!("{:>14}", "-"));
        println!(
            "{:<9} {:>12} {:>12} {:>12} {balance}",
            bucket.month.to_string(),
            round_currency(bucket.total_income),
            round_currency(bucket.total_expense),
            round_currency(bucket.net_flow),
        );
    }

    if !summary.expense_by_category.is_empty() {
        println!();
        println!("Expenses by category:");
        for (category, total) in &summary.expense_by_category {
            println!("  {:<15} {:>12}", category.to_string(), round_currency(*total));
        }
    }
    Ok(())
}

fn retire(params: RetirementParameters) {
    let projection = project(&params);

    println!(
        "Projected savings at age {}: {}",
        params.retirement_age,
        round_currency(projection.projected_at_retirement)
    );
    println!(
        "Capital needed for {}/month: {}",
        round_currency(params.target_monthly_expense),
        round_currency(projection.required_capital)
    );
    println!("Monthly saving stream: {}", round_currency(projection.monthly_saving));
    println!("Monthly target to close the gap: {}", round_currency(projection.monthly_target));
    if projection.surplus >= 0.0 {
        println!("Surplus: {}", round_currency(projection.surplus));
    } else {
        println!("Shortfall: {}", round_currency(-projection.surplus));
    }

    println!();
    println!("{:<6} {:>14}", "Year", "Balance");
    for point in &projection.series {
        println!("{:<6} {:>14}", format!("+{}", point.year_offset), round_currency(point.balance));
    }
}
