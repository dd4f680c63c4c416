use clap::Subcommand;
use serde_json::{json, Map, Value};

use crate::cli::client::ApiClient;
use crate::cli::utils::{output_success, output_ticket, output_tickets};
use crate::cli::OutputFormat;
use crate::database::models::TicketStatus;

#[derive(Subcommand)]
pub enum TicketCommands {
    #[command(about = "List your tickets")]
    List,

    #[command(about = "Show one ticket")]
    Show {
        #[arg(help = "Ticket ID")]
        id: String,
    },

    #[command(about = "Open a new ticket")]
    Create {
        #[arg(long, help = "Product the request is about")]
        product: String,
        #[arg(long, help = "What is wrong")]
        description: String,
    },

    #[command(about = "Change product, description or status")]
    Update {
        #[arg(help = "Ticket ID")]
        id: String,
        #[arg(long)]
        product: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long, value_parser = parse_status, help = "new, open or closed")]
        status: Option<TicketStatus>,
    },

    #[command(about = "Delete a ticket permanently")]
    Delete {
        #[arg(help = "Ticket ID")]
        id: String,
    },
}

fn parse_status(s: &str) -> Result<TicketStatus, String> {
    s.parse()
}

/// Build an update body holding only the fields that were given
fn patch_body(product: Option<String>, description: Option<String>, status: Option<TicketStatus>) -> Value {
    let mut body = Map::new();
    if let Some(product) = product {
        body.insert("product".into(), json!(product));
    }
    if let Some(description) = description {
        body.insert("description".into(), json!(description));
    }
    if let Some(status) = status {
        body.insert("status".into(), json!(status));
    }
    Value::Object(body)
}

pub async fn handle(cmd: TicketCommands, client: &ApiClient, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        TicketCommands::List => {
            let tickets = client.get("/api/tickets").await?;
            output_tickets(output_format, &tickets)
        }
        TicketCommands::Show { id } => {
            let ticket = client.get(&format!("/api/tickets/{}", id)).await?;
            output_ticket(output_format, &ticket)
        }
        TicketCommands::Create { product, description } => {
            let body = json!({ "product": product, "description": description });
            let ticket = client.post("/api/tickets", body).await?;
            output_ticket(output_format, &ticket)
        }
        TicketCommands::Update { id, product, description, status } => {
            let body = patch_body(product, description, status);
            if body.as_object().map_or(true, Map::is_empty) {
                anyhow::bail!("nothing to update: pass --product, --description or --status");
            }
            let ticket = client.put(&format!("/api/tickets/{}", id), body).await?;
            output_ticket(output_format, &ticket)
        }
        TicketCommands::Delete { id } => {
            client.delete(&format!("/api/tickets/{}", id)).await?;
            output_success(output_format, &format!("Ticket {} deleted", id), Some(json!({ "id": id })))
        }
    }
}
