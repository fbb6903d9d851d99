//! Atommarts Admin - the marketplace admin dashboard in a terminal.
//!
//! Every command restores the saved session first (refreshing it if the
//! access token has lapsed), then checks the command's route guard before
//! talking to the API.

mod app;
mod render;

use std::io;
use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use atommarts_core::models::PayoutAction;
use atommarts_core::Config;

use app::App;

/// Log file name prefix inside `--log-dir`
const LOG_FILE_PREFIX: &str = "atommarts.log";

#[derive(Parser)]
#[command(name = "atommarts", version, about = "Marketplace admin dashboard")]
struct Cli {
    /// Also write logs to a daily-rolling file in this directory
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Sign in with email and password
    Signin {
        #[arg(long)]
        email: Option<String>,
    },
    /// Sign out and clear the saved session
    Signout,
    /// Show who is signed in and when the access token expires
    Status,
    /// Monthly sales, customer growth and recent orders
    Dashboard {
        /// Year for the monthly series (defaults to the current year)
        #[arg(long)]
        year: Option<i32>,
    },
    /// List vendor payout requests
    Payouts {
        #[arg(long, default_value = "pending")]
        status: String,
        #[arg(long)]
        vendor: Option<String>,
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long, default_value_t = 10)]
        limit: u32,
    },
    /// Approve or reject a pending payout request
    ProcessPayout {
        request_id: i64,
        #[arg(value_enum)]
        action: ActionArg,
        #[arg(long, default_value = "")]
        notes: String,
        /// Transaction reference, recorded on approval
        #[arg(long)]
        reference: Option<String>,
    },
    /// List the product moderation queue
    Products {
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long)]
        search: Option<String>,
    },
    /// Set a product's moderation status (pending, approved, rejected)
    Moderate {
        product_id: i64,
        status: String,
        #[arg(long, default_value = "")]
        notes: String,
    },
    /// List categories
    Categories {
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long)]
        search: Option<String>,
    },
    /// Create a category
    AddCategory {
        name: String,
        #[arg(long, default_value = "")]
        description: String,
        /// Create the category hidden from the storefront
        #[arg(long)]
        inactive: bool,
        #[arg(long)]
        parent: Option<i64>,
        #[arg(long)]
        image: Option<PathBuf>,
    },
    /// Delete a category
    DeleteCategory { category_id: i64 },
    /// Show the most recent orders
    Orders,
    /// Change the signed-in user's password
    ChangePassword,
}

#[derive(Clone, Copy, ValueEnum)]
enum ActionArg {
    Approve,
    Reject,
}

impl From<ActionArg> for PayoutAction {
    fn from(action: ActionArg) -> Self {
        match action {
            ActionArg::Approve => PayoutAction::Approve,
            ActionArg::Reject => PayoutAction::Reject,
        }
    }
}

/// Initialize the tracing subscriber for logging.
/// The returned guard flushes the file writer when dropped.
fn init_tracing(log_dir: Option<&PathBuf>) -> Option<WorkerGuard> {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let (file_layer, guard) = match log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (
                Some(fmt::layer().with_ansi(false).with_writer(writer)),
                Some(guard),
            )
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(file_layer)
        .with(filter)
        .init();

    guard
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    let _log_guard = init_tracing(cli.log_dir.as_ref());

    let config = Config::load()?;
    info!(api = config.base_url(), store = ?config.store, "Atommarts admin starting");

    let mut app = App::new(config)?;
    app.start().await;

    match cli.command {
        Command::Signin { email } => app.sign_in(email).await,
        Command::Signout => {
            app.sign_out();
            Ok(())
        }
        Command::Status => {
            app.status();
            Ok(())
        }
        Command::Dashboard { year } => app.dashboard(year).await,
        Command::Payouts {
            status,
            vendor,
            page,
            limit,
        } => app.payouts(status, vendor, page, limit).await,
        Command::ProcessPayout {
            request_id,
            action,
            notes,
            reference,
        } => app.process_payout(request_id, action.into(), notes, reference).await,
        Command::Products { page, search } => app.products(page, search).await,
        Command::Moderate {
            product_id,
            status,
            notes,
        } => app.moderate(product_id, &status, notes).await,
        Command::Categories { page, search } => app.categories(page, search).await,
        Command::AddCategory {
            name,
            description,
            inactive,
            parent,
            image,
        } => app.add_category(name, description, !inactive, parent, image).await,
        Command::DeleteCategory { category_id } => app.delete_category(category_id).await,
        Command::Orders => app.orders().await,
        Command::ChangePassword => app.change_password().await,
    }
}
