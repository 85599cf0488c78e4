//! Gala CLI
//!
//! Operator command-line interface for the Gala registration API.
//!
//! # Usage
//!
//! ```bash
//! gala registrations list --search acme
//! gala registrations edit 3f2a... --set company="Acme Corp" --set activities=golf,spa
//! gala registrations export -o registrations.csv
//! gala email send --all --subject "Your agenda" --body-file agenda.html --cc assistant
//! gala sent list --format json
//! ```

use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;
mod config;
mod output;

const DEFAULT_API_URL: &str = "http://localhost:8080";

#[derive(Parser)]
#[command(name = "gala")]
#[command(version)]
#[command(about = "Gala registration operator CLI", long_about = None)]
struct Cli {
    /// API base URL
    #[arg(long, env = "GALA_API_URL")]
    api_url: Option<String>,

    /// Bearer token sent with every request
    #[arg(long, env = "GALA_ADMIN_TOKEN")]
    admin_token: Option<String>,

    /// Output format
    #[arg(long, short)]
    format: Option<output::OutputFormat>,

    /// Profile name from config file
    #[arg(long, short)]
    profile: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Inspect the registration form
    Form {
        #[command(subcommand)]
        action: FormCommands,
    },
    /// Manage registrations
    Registrations {
        #[command(subcommand)]
        action: RegistrationCommands,
    },
    /// Compose and send registrant email
    Email {
        #[command(subcommand)]
        action: EmailCommands,
    },
    /// Browse the sent-mail log
    Sent {
        #[command(subcommand)]
        action: SentCommands,
    },
    /// Configure CLI
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },
}

#[derive(Subcommand)]
enum FormCommands {
    /// Show every field of the resolved form
    Show,
}

#[derive(Subcommand)]
enum RegistrationCommands {
    /// List registrations
    List {
        /// Case-insensitive name, email or company filter
        #[arg(long)]
        search: Option<String>,
    },
    /// Show every field of one registration
    Show { id: String },
    /// Download all registrations as CSV
    Export {
        /// Destination file; defaults to the server's suggested name
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Change fields of one registration
    Edit {
        id: String,
        /// `field=value`; field in camelCase or snake_case, lists comma-separated
        #[arg(long = "set", required = true)]
        assignments: Vec<String>,
        /// Edit as admin (allows admin-only fields such as adminNotes)
        #[arg(long)]
        admin: bool,
    },
}

#[derive(clap::Args)]
struct ComposeArgs {
    #[arg(long)]
    subject: String,
    /// HTML body
    #[arg(long, conflicts_with = "body_file", required_unless_present = "body_file")]
    body: Option<String>,
    /// Read the HTML body from a file
    #[arg(long)]
    body_file: Option<PathBuf>,
    #[arg(long)]
    heading: Option<String>,
    #[arg(long)]
    header_image: Option<String>,
    /// Recipients: registrant, assistant, guest or addresses; comma-separated
    #[arg(long, default_value = "registrant")]
    to: Vec<String>,
    #[arg(long)]
    cc: Vec<String>,
    #[arg(long)]
    bcc: Vec<String>,
}

#[derive(Subcommand)]
enum EmailCommands {
    /// Render the email one registration would receive
    Preview {
        registration_id: String,
        #[command(flatten)]
        compose: ComposeArgs,
        /// Print the HTML instead of the plain-text part
        #[arg(long)]
        html: bool,
    },
    /// Send one email per selected registration
    Send {
        /// Registration IDs, comma-separated
        #[arg(long, value_delimiter = ',', required_unless_present = "all")]
        ids: Vec<String>,
        /// Every registration (optionally narrowed by --search)
        #[arg(long, conflicts_with = "ids")]
        all: bool,
        #[arg(long, requires = "all")]
        search: Option<String>,
        #[command(flatten)]
        compose: ComposeArgs,
    },
}

#[derive(Subcommand)]
enum SentCommands {
    /// List sent emails, newest first
    List,
    /// Show one sent email
    Show {
        id: String,
        /// Print the HTML instead of the plain-text part
        #[arg(long)]
        html: bool,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Set configuration value
    Set { key: String, value: String },
    /// Get configuration value
    Get { key: String },
    /// List all configuration
    List,
    /// Initialize configuration
    Init,
}

#[tokio::main]
async fn main() {
    if let Err(e) = run(Cli::parse()).await {
        eprintln!("{} {:#}", colored::Colorize::red("Error:"), e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let profile = cli.profile.as_deref();
    let config = config::Config::load(profile)?;
    let api_url = cli.api_url.or(config.api_url).unwrap_or_else(|| DEFAULT_API_URL.into());
    let admin_token = cli.admin_token.or(config.admin_token);
    let format = cli.format.or(config.default_format).unwrap_or(output::OutputFormat::Table);

    let client = commands::ApiClient::new(&api_url, admin_token.as_deref());

    match cli.command {
        Commands::Form { action } => commands::form::handle(action, &client, format).await,
        Commands::Registrations { action } => commands::registrations::handle(action, &client, format).await,
        Commands::Email { action } => commands::email::handle(action, &client, format).await,
        Commands::Sent { action } => commands::sent::handle(action, &client, format).await,
        Commands::Config { action } => commands::config::handle(action, profile).await,
    }
}
