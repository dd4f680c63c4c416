pub mod client;
pub mod commands;
pub mod utils;

use clap::{Parser, Subcommand};

use client::ApiClient;

#[derive(Parser)]
#[command(name = "deskctl")]
#[command(about = "Command-line client for the Support Desk API")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, env = "DESK_API_URL", default_value = "http://localhost:3000", help = "API base URL")]
    pub url: String,

    #[arg(long, global = true, env = "DESK_TOKEN", hide_env_values = true, help = "Bearer token")]
    pub token: Option<String>,

    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Account registration, login and tokens")]
    Auth {
        #[command(subcommand)]
        cmd: commands::auth::AuthCommands,
    },

    #[command(about = "Manage your support tickets")]
    Tickets {
        #[command(subcommand)]
        cmd: commands::tickets::TicketCommands,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);
    let client = ApiClient::new(&cli.url, cli.token);

    match cli.command {
        Commands::Auth { cmd } => commands::auth::handle(cmd, &client, output_format).await,
        Commands::Tickets { cmd } => commands::tickets::handle(cmd, &client, output_format).await,
    }
}
