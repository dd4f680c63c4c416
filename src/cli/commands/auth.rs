use clap::Subcommand;
use serde_json::json;
use uuid::Uuid;

use crate::auth;
use crate::cli::client::ApiClient;
use crate::cli::utils::output_success;
use crate::cli::OutputFormat;

#[derive(Subcommand)]
pub enum AuthCommands {
    #[command(about = "Register a new account and print its token")]
    Register {
        #[arg(long, help = "Display name")]
        name: String,
        #[arg(long, help = "Email address")]
        email: String,
        #[arg(long, help = "Password")]
        password: String,
    },

    #[command(about = "Log in and print a token")]
    Login {
        #[arg(long, help = "Email address")]
        email: String,
        #[arg(long, help = "Password")]
        password: String,
    },

    #[command(about = "Show the account behind the current token")]
    Whoami,

    #[command(about = "Mint a token locally for an account id (uses JWT_SECRET)")]
    Token {
        #[arg(long, help = "Account id")]
        user: Uuid,
    },
}

pub async fn handle(cmd: AuthCommands, client: &ApiClient, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        AuthCommands::Register { name, email, password } => {
            let body = json!({ "name": name, "email": email, "password": password });
            let session = client.post("/api/users", body).await?;
            print_session(output_format, "Registered", session)
        }
        AuthCommands::Login { email, password } => {
            let body = json!({ "email": email, "password": password });
            let session = client.post("/api/users/login", body).await?;
            print_session(output_format, "Logged in", session)
        }
        AuthCommands::Whoami => {
            let account = client.get("/api/users/me").await?;
            match output_format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&account)?),
                OutputFormat::Text => println!(
                    "{} <{}> ({})",
                    account["name"].as_str().unwrap_or("-"),
                    account["email"].as_str().unwrap_or("-"),
                    account["id"].as_str().unwrap_or("-")
                ),
            }
            Ok(())
        }
        AuthCommands::Token { user } => {
            let token = auth::token_for(user)?;
            match output_format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&json!({ "token": token }))?),
                OutputFormat::Text => println!("{}", token),
            }
            Ok(())
        }
    }
}

fn print_session(output_format: OutputFormat, verb: &str, session: serde_json::Value) -> anyhow::Result<()> {
    let email = session["email"].as_str().unwrap_or("-").to_string();
    match output_format {
        OutputFormat::Json => output_success(output_format, &format!("{} as {}", verb, email), Some(session)),
        OutputFormat::Text => {
            output_success(output_format, &format!("{} as {}", verb, email), None)?;
            println!("export DESK_TOKEN={}", session["token"].as_str().unwrap_or_default());
            Ok(())
        }
    }
}
