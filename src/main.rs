use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use dialoguer::console::Term;
use dialoguer::theme::ColorfulTheme;
use dialoguer::{Input, Password};
use psqlcm::app::{self, CreateOptions};
use psqlcm::clock::{Clock, SystemClock};
use psqlcm::config::default_config_path;
use psqlcm::models::{ConnectionProfile, ProfileName, SslMode};
use psqlcm::StoreConfig;
use secrecy::SecretString;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const DEFAULT_HOST: &str = "localhost";
const DEFAULT_PORT: u16 = 5432;
const DEFAULT_DATABASE: &str = "postgres";
const DEFAULT_USER: &str = "postgres";

#[derive(Parser)]
#[command(name = "psqlcm")]
#[command(about = "psql connection manager")]
struct Cli {
    /// Path to settings file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log store operations to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args)]
struct StoreArgs {
    /// Location to store connections
    #[arg(long)]
    cache_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Command {
    /// New connection
    #[command(alias = "login")]
    New {
        #[command(flatten)]
        store: StoreArgs,

        /// Do not set this new connection as current
        #[arg(long)]
        not_current: bool,

        /// Connection name (prompted for when omitted)
        #[arg(long)]
        name: Option<String>,
    },

    /// List all available connections
    #[command(alias = "ls")]
    List {
        #[command(flatten)]
        store: StoreArgs,

        /// Print entries as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show a connection string
    Show {
        #[command(flatten)]
        store: StoreArgs,

        /// Connection to show (defaults to the current one)
        name: Option<String>,
    },

    /// Remove a cached connection
    #[command(aliases = ["del", "remove"])]
    Delete {
        #[command(flatten)]
        store: StoreArgs,

        /// Connection to delete
        name: String,
    },

    /// Set a connection as current
    SetCurrent {
        #[command(flatten)]
        store: StoreArgs,

        /// Connection to make current
        name: String,
    },
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(err) = run(cli) {
        println!("{err:#}");
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)))
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .init();
}

fn run(cli: Cli) -> Result<()> {
    let config_path = cli.config.unwrap_or_else(default_config_path);
    let load = |store: StoreArgs| StoreConfig::resolve(&config_path, store.cache_dir);

    match cli.command {
        Command::New {
            store,
            not_current,
            name,
        } => {
            let config = load(store)?;
            // Fail on a missing key before asking for anything.
            config.cipher()?;

            let (profile, name) = prompt_profile(name, &SystemClock)?;
            let options = CreateOptions {
                name: Some(name),
                set_current: !not_current,
            };
            app::create_profile(&config, &profile, options)?;
            println!("Connection saved!");
        }
        Command::List { store, json } => {
            let config = load(store)?;
            let entries = app::list_profiles(&config)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&entries)?);
            } else {
                for entry in entries {
                    println!("{entry}");
                }
            }
        }
        Command::Show { store, name } => {
            let config = load(store)?;
            let profile = app::read_profile(&config, name.as_deref())?;
            println!("{}", profile.connection_string());
        }
        Command::Delete { store, name } => {
            let config = load(store)?;
            app::delete_profile(&config, &name)?;
            println!("Connection {name:?} deleted");
        }
        Command::SetCurrent { store, name } => {
            let config = load(store)?;
            app::set_current(&config, &name)?;
        }
    }

    Ok(())
}

/// Ask for connection parameters on stderr.
fn prompt_profile(
    name: Option<String>,
    clock: &dyn Clock,
) -> Result<(ConnectionProfile, String)> {
    let theme = ColorfulTheme::default();
    let term = Term::stderr();

    let host: String = Input::with_theme(&theme)
        .with_prompt("Hostname")
        .default(DEFAULT_HOST.to_string())
        .interact_text_on(&term)
        .context("Failed to read hostname")?;

    let port: u16 = Input::with_theme(&theme)
        .with_prompt("Port")
        .default(DEFAULT_PORT)
        .validate_with(|port: &u16| {
            if *port == 0 {
                Err("port must be between 1 and 65535")
            } else {
                Ok(())
            }
        })
        .interact_text_on(&term)
        .context("Failed to read port")?;

    let database: String = Input::with_theme(&theme)
        .with_prompt("Database")
        .default(DEFAULT_DATABASE.to_string())
        .interact_text_on(&term)
        .context("Failed to read database")?;

    let user: String = Input::with_theme(&theme)
        .with_prompt("User")
        .default(DEFAULT_USER.to_string())
        .interact_text_on(&term)
        .context("Failed to read user")?;

    let password = Password::with_theme(&theme)
        .with_prompt("Password")
        .interact_on(&term)
        .context("Failed to read password")?;

    let ssl_mode: String = Input::with_theme(&theme)
        .with_prompt("SSL mode")
        .default(SslMode::default().to_string())
        .validate_with(|mode: &String| mode.parse::<SslMode>().map(|_| ()))
        .interact_text_on(&term)
        .context("Failed to read SSL mode")?;
    let ssl_mode = ssl_mode
        .parse::<SslMode>()
        .map_err(anyhow::Error::msg)?;

    let name = match name {
        Some(name) => name,
        None => Input::with_theme(&theme)
            .with_prompt("Connection name")
            .default(ProfileName::generate(clock).to_string())
            .validate_with(|name: &String| {
                ProfileName::new(name.as_str())
                    .map(|_| ())
                    .map_err(|e| e.to_string())
            })
            .interact_text_on(&term)
            .context("Failed to read connection name")?,
    };

    let profile = ConnectionProfile {
        host,
        port,
        database,
        user,
        password: SecretString::from(password),
        ssl_mode,
    };
    Ok((profile, name))
}
