use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use crate::application::{ErrorKind, Ledger, LedgerError};
use crate::config::{DEFAULT_CREDENTIAL_SALT, DEFAULT_DATABASE, LedgerConfig};
use crate::domain::{AccountId, parse_coins};

/// Coinshop - virtual coin ledger
#[derive(Parser)]
#[command(name = "coinshop")]
#[command(about = "Hold coins, send them to other users and spend them on merch")]
#[command(version)]
pub struct Cli {
    /// Database file path
    #[arg(short, long, env = "COINSHOP_DATABASE", default_value = DEFAULT_DATABASE)]
    pub database: String,

    /// Username to act as (registered on first use)
    #[arg(short, long, global = true, env = "COINSHOP_USER")]
    pub user: Option<String>,

    /// Password for --user
    #[arg(short, long, global = true, env = "COINSHOP_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Salt mixed into credential hashes
    #[arg(long, env = "COINSHOP_SALT", default_value = DEFAULT_CREDENTIAL_SALT, hide_env_values = true)]
    pub salt: String,

    /// Maximum pooled store connections
    #[arg(long, env = "COINSHOP_MAX_CONNECTIONS", default_value_t = 8)]
    pub max_connections: u32,

    /// Bound on one atomic scope, in milliseconds
    #[arg(long, env = "COINSHOP_SCOPE_TIMEOUT_MS", default_value_t = 10_000)]
    pub scope_timeout_ms: u64,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new database and seed the catalog
    Init,

    /// Log in as --user, registering the account if it does not exist
    Auth,

    /// Buy one unit of a catalog item
    Buy {
        /// Item name (e.g., "t-shirt")
        item: String,
    },

    /// Send coins to another user
    Send {
        /// Recipient username
        to: String,

        /// Whole number of coins
        amount: String,
    },

    /// Show balance, inventory and coin history as JSON
    Info,

    /// List catalog items and prices
    Items,

    /// Show every transfer involving --user, oldest first
    History,
}

impl Cli {
    pub fn config(&self) -> LedgerConfig {
        LedgerConfig::new(&self.database)
            .with_max_connections(self.max_connections)
            .with_scope_timeout(Duration::from_millis(self.scope_timeout_ms))
            .with_credential_salt(&self.salt)
    }

    pub async fn run(self) -> Result<()> {
        let config = self.config();
        let ledger = match self.command {
            Commands::Init => Ledger::init(&config).await?,
            _ => Ledger::connect(&config).await?,
        };

        let result = self.dispatch(&ledger).await;
        ledger.close().await;
        result
    }

    async fn dispatch(&self, ledger: &Ledger) -> Result<()> {
        match &self.command {
            Commands::Init => println!("Database initialized: {}", self.database),

            Commands::Auth => {
                let (username, password) = self.credentials()?;
                let session = ledger.accounts().authenticate(username, password).await?;
                if session.created {
                    println!("Registered {} (account {})", session.username, session.account_id);
                } else {
                    println!("Logged in as {} (account {})", session.username, session.account_id);
                }
            }

            Commands::Buy { item } => {
                let account_id = self.login(ledger).await?;
                let receipt = ledger.purchases().buy_item(account_id, item).await?;
                println!(
                    "Bought {} for {} coins (now holding {}). Balance: {}",
                    receipt.item, receipt.price, receipt.quantity, receipt.balance
                );
            }

            Commands::Send { to, amount } => {
                let amount = parse_coins(amount).context("Invalid amount")?;
                let account_id = self.login(ledger).await?;
                let receipt = ledger.transfers().send_coin(account_id, to, amount).await?;
                println!(
                    "Sent {} coins to {} (transfer {}). Balance: {}",
                    receipt.transfer.amount, receipt.recipient, receipt.transfer.id, receipt.balance
                );
            }

            Commands::Info => {
                let account_id = self.login(ledger).await?;
                let info = ledger.queries().get_account_info(account_id).await?;
                println!("{}", serde_json::to_string_pretty(&info)?);
            }

            Commands::Items => {
                let items = ledger.queries().catalog().await?;
                println!("{:<16} {:>8}", "ITEM", "PRICE");
                println!("{}", "-".repeat(25));
                for item in items {
                    println!("{:<16} {:>8}", item.name, item.price);
                }
            }

            Commands::History => {
                let account_id = self.login(ledger).await?;
                let transfers = ledger.queries().transfers(account_id).await?;
                if transfers.is_empty() {
                    println!("No transfers found.");
                }
                for entry in transfers {
                    let direction = if entry.is_sent_by(account_id) { "sent" } else { "received" };
                    println!(
                        "#{:<6} {} {:<8} {:>6} {}",
                        entry.transfer.id,
                        entry.transfer.recorded_at.format("%Y-%m-%d %H:%M:%S"),
                        direction,
                        entry.transfer.amount,
                        entry.counterpart(account_id)
                    );
                }
            }
        }

        Ok(())
    }

    fn credentials(&self) -> Result<(&str, &str)> {
        let username = self
            .user
            .as_deref()
            .context("--user (or COINSHOP_USER) is required for this command")?;
        let password = self
            .password
            .as_deref()
            .context("--password (or COINSHOP_PASSWORD) is required for this command")?;
        Ok((username, password))
    }

    async fn login(&self, ledger: &Ledger) -> Result<AccountId> {
        let (username, password) = self.credentials()?;
        let session = ledger.accounts().authenticate(username, password).await?;
        Ok(session.account_id)
    }
}

/// HTTP-style status for a failure, the way a transport layer would map it.
pub fn status_code(err: &anyhow::Error) -> u16 {
    match err.downcast_ref::<LedgerError>() {
        Some(LedgerError::IncorrectPassword(_)) => 401,
        Some(ledger_err) => match ledger_err.kind() {
            ErrorKind::BusinessRule => 400,
            ErrorKind::Transient => 503,
            ErrorKind::Internal => 500,
        },
        // Argument parsing problems surface as plain anyhow errors
        None => 400,
    }
}

/// Process exit code for a failure.
pub fn exit_code(err: &anyhow::Error) -> u8 {
    match status_code(err) {
        400 => 2,
        401 => 3,
        503 => 4,
        _ => 1,
    }
}

/// Message safe to show the caller. Internal failures stay opaque.
pub fn public_message(err: &anyhow::Error) -> String {
    match err.downcast_ref::<LedgerError>() {
        Some(ledger_err) if ledger_err.kind() == ErrorKind::Internal => "internal error".to_string(),
        Some(ledger_err) => ledger_err.to_string(),
        None => format!("{:#}", err),
    }
}
