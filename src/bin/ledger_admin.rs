//! Ledger Admin CLI
//!
//! Operator tool for the kickabout ledger database.
//!
//! Usage:
//!   cargo run --bin ledger_admin -- --db-path ./kickabout.db verify
//!   cargo run --bin ledger_admin -- --db-path ./kickabout.db repair
//!   cargo run --bin ledger_admin -- --db-path ./kickabout.db summary
//!   cargo run --bin ledger_admin -- --db-path ./kickabout.db seed
//!   cargo run --bin ledger_admin -- --db-path ./kickabout.db record --email jan@test.pl --amount 50.25 --kind deposit

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use kickabout_backend::{
    ledger::{NewPayment, PaymentKind},
    seed::seed_demo_data,
    LedgerStore, Money,
};
use tracing_subscriber::EnvFilter;

/// Ledger maintenance for the kickabout backend
#[derive(Parser, Debug)]
#[command(name = "ledger_admin")]
#[command(about = "Verify, repair and inspect the player account ledger")]
struct Cli {
    /// Path to the SQLite database
    #[arg(short, long, env = "DATABASE_PATH", default_value = "./kickabout.db")]
    db_path: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Compare every cached balance with its payment history
    Verify,

    /// Rewrite drifted balances from the payment history
    Repair,

    /// Print the finance summary
    Summary,

    /// Insert demo admin, players and schedule
    Seed,

    /// Record a manual deposit, refund or adjustment
    Record {
        /// Player email
        #[arg(long)]
        email: String,

        /// Amount in major units, e.g. 50.25 or -12,50
        #[arg(long, allow_hyphen_values = true)]
        amount: String,

        /// deposit | refund | adjustment
        #[arg(long, default_value = "deposit")]
        kind: String,

        #[arg(long)]
        description: Option<String>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| "kickabout_backend=info".into()),
        )
        .init();

    let cli = Cli::parse();
    let store = LedgerStore::new(&cli.db_path)
        .with_context(|| format!("Failed to open database: {}", cli.db_path))?;

    match cli.command {
        Commands::Verify => verify(&store)?,
        Commands::Repair => repair(&store)?,
        Commands::Summary => summary(&store)?,
        Commands::Seed => {
            let seeded = seed_demo_data(&store)?;
            println!(
                "Seeded {} players, schedule created: {}",
                seeded.players_created, seeded.schedule_created
            );
        }
        Commands::Record {
            email,
            amount,
            kind,
            description,
        } => record(&store, &email, &amount, &kind, description)?,
    }

    Ok(())
}

fn verify(store: &LedgerStore) -> Result<()> {
    let drifts = store.verify_balances()?;
    if drifts.is_empty() {
        println!("All balances match the ledger.");
        return Ok(());
    }

    println!("{:<38} {:<24} {:>12} {:>12}", "player", "name", "cached", "ledger");
    for d in &drifts {
        println!(
            "{:<38} {:<24} {:>12} {:>12}",
            d.user_id, d.name, d.cached, d.ledger
        );
    }
    bail!("{} balances drifted", drifts.len())
}

fn repair(store: &LedgerStore) -> Result<()> {
    let repaired = store.repair_balances()?;
    println!("Repaired {} balances.", repaired);
    Ok(())
}

fn summary(store: &LedgerStore) -> Result<()> {
    let report = store.financial_summary()?;
    let s = &report.summary;

    println!("=== Finance Summary ===");
    println!("Deposits:            {:>12}", s.total_deposits);
    println!("Refunds:             {:>12}", s.total_refunds);
    println!("Adjustments:         {:>12}", s.total_adjustments);
    println!("Cash collected:      {:>12}", s.cash_collected);
    println!("Spent on games:      {:>12}", s.cash_spent_on_games);
    println!("Cash balance:        {:>12}", s.cash_balance);
    println!("Player balances:     {:>12}", s.total_balance);
    println!("Venue paid:          {:>12}", s.venue_paid_total);
    println!("Venue unpaid:        {:>12}", s.venue_unpaid_total);
    println!();

    println!("=== Completed Games ===");
    for g in &report.games {
        println!(
            "{} {:<24} {:>10} charged ({} players){}",
            g.date,
            g.schedule_name,
            g.total_charged,
            g.players_charged,
            if g.venue_paid { "" } else { "  [venue unpaid]" }
        );
    }
    Ok(())
}

fn record(
    store: &LedgerStore,
    email: &str,
    amount: &str,
    kind: &str,
    description: Option<String>,
) -> Result<()> {
    let kind: PaymentKind = kind.parse().map_err(anyhow::Error::msg)?;
    let amount = Money::parse_major(amount)?;
    let player = store
        .get_player_by_email(email)?
        .with_context(|| format!("No player with email {}", email))?;

    let payment = store.record_payment_by(
        None,
        NewPayment {
            user_id: player.id,
            amount,
            kind,
            description,
        },
    )?;

    let balance = store.get_player(player.id)?.balance;
    println!(
        "Recorded {} {} for {} (balance now {})",
        payment.kind.as_str(),
        payment.amount,
        player.name,
        balance
    );
    Ok(())
}
