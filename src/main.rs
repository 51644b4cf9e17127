//! Command-line front end.
//!
//! A thin collaborator of the session core: each run attaches to the current
//! session, performs at most one intent (plus whatever it cascades into), and
//! prints the resulting state.
//!
//! # Sessions
//!
//! State lives in `session-<id>.json` under the data directory. The id comes
//! from `--session`, the config file, `SHOPPING_SESSION`, or the parent
//! process id, in that order, so consecutive commands from one shell share a
//! login.
//!
//! # Examples
//!
//! ```text
//! shopping-session register alice --password s3cret
//! shopping-session login alice --password s3cret
//! shopping-session add --type milk --count 2 --price 1.25
//! shopping-session edit 64f1c2 --type milk --count 3 --price 1.25
//! shopping-session remove 64f1c2
//! shopping-session logout
//! ```

#![allow(clippy::multiple_crate_versions)]

use clap::{Parser, Subcommand};
use shopping_session::observability::init_tracing;
use shopping_session::{initialize, AppState, Config, Credentials, Outcome, ShoppingItem};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(
    name = "shopping-session",
    version,
    about = "Shopping list client with a persistent session"
)]
struct Cli {
    /// TOML configuration file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Root URL of the shopping API (overrides the config file).
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Session id (overrides the config file and SHOPPING_SESSION).
    #[arg(long, global = true)]
    session: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Create an account.
    Register {
        username: String,
        #[arg(long, env = "SHOPPING_PASSWORD")]
        password: String,
    },
    /// Log in and fetch the list.
    Login {
        username: String,
        #[arg(long, env = "SHOPPING_PASSWORD")]
        password: String,
    },
    /// Log out and clear the session.
    Logout,
    /// Fetch the list from the server.
    List,
    /// Add an item.
    Add {
        #[arg(long = "type")]
        item_type: String,
        #[arg(long, default_value_t = 1.0)]
        count: f64,
        #[arg(long, default_value_t = 0.0)]
        price: f64,
    },
    /// Replace the item with the given id.
    Edit {
        id: String,
        #[arg(long = "type")]
        item_type: String,
        #[arg(long, default_value_t = 1.0)]
        count: f64,
        #[arg(long, default_value_t = 0.0)]
        price: f64,
    },
    /// Remove the item with the given id.
    Remove { id: String },
    /// Print the stored state without contacting the server.
    Show,
}

impl Command {
    const fn name(&self) -> &'static str {
        match self {
            Self::Register { .. } => "register",
            Self::Login { .. } => "login",
            Self::Logout => "logout",
            Self::List => "list",
            Self::Add { .. } => "add",
            Self::Edit { .. } => "edit",
            Self::Remove { .. } => "remove",
            Self::Show => "show",
        }
    }
}

fn load_config(cli: &Cli) -> shopping_session::Result<Config> {
    let mut config = match &cli.config {
        Some(path) => Config::from_toml_file(path)?,
        None => Config::default(),
    };
    if let Some(base_url) = &cli.base_url {
        config.base_url.clone_from(base_url);
    }
    if let Some(session) = &cli.session {
        config.session_id = Some(session.clone());
    }
    Ok(config)
}

async fn run(cli: Cli) -> shopping_session::Result<AppState> {
    let config = load_config(&cli)?;
    init_tracing(&config);

    let session = initialize(&config)?;
    tracing::info!(command = cli.command.name(), "running command");

    match cli.command {
        Command::Register { username, password } => {
            session.register(&Credentials::new(username, password)).await?;
        }
        Command::Login { username, password } => {
            session.login(&Credentials::new(username, password)).await?;
        }
        Command::Logout => session.logout().await?,
        Command::List => session.refresh().await?,
        Command::Add { item_type, count, price } => {
            session.add(&ShoppingItem::new(item_type, count, price)).await?;
        }
        Command::Edit {
            id,
            item_type,
            count,
            price,
        } => {
            let item = ShoppingItem::new(item_type, count, price).with_id(id);
            session.edit(&item).await?;
        }
        Command::Remove { id } => session.remove(&id).await?,
        Command::Show => {}
    }

    session.state()
}

fn print_state(state: &AppState) {
    if state.is_logged {
        println!("Logged in as {}", state.user);
    } else {
        println!("Not logged in");
    }

    match &state.outcome {
        Outcome::Idle => {}
        Outcome::Succeeded(message) => println!("{message}"),
        Outcome::Failed(reason) => println!("Error: {reason}"),
    }

    if !state.is_logged {
        return;
    }

    if state.list.is_empty() {
        println!("The shopping list is empty.");
        return;
    }

    println!("{:<26} {:<24} {:>6} {:>10} {:>10}", "ID", "TYPE", "COUNT", "PRICE", "TOTAL");
    for item in &state.list {
        println!(
            "{:<26} {:<24} {:>6} {:>10.2} {:>10.2}",
            item.id,
            item.item_type,
            item.count,
            item.price,
            item.total()
        );
    }
    println!("{:>80.2}", state.total());
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("failed to start runtime: {e}");
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(run(cli)) {
        Ok(state) => {
            print_state(&state);
            if state.error().is_some() {
                ExitCode::from(2)
            } else {
                ExitCode::SUCCESS
            }
        }
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
