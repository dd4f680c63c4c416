use serde_json::{json, Value};

use crate::cli::OutputFormat;

/// Output a success message in the appropriate format
pub fn output_success(output_format: OutputFormat, message: &str, data: Option<Value>) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            let mut response = json!({
                "success": true,
                "message": message
            });

            if let Some(Value::Object(fields)) = data {
                if let Some(object) = response.as_object_mut() {
                    object.extend(fields);
                }
            }

            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        OutputFormat::Text => {
            println!("✓ {}", message);
        }
    }
    Ok(())
}

/// Output a single ticket
pub fn output_ticket(output_format: OutputFormat, ticket: &Value) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(ticket)?),
        OutputFormat::Text => {
            println!("ID:          {}", field(ticket, "id"));
            println!("Product:     {}", field(ticket, "product"));
            println!("Status:      {}", field(ticket, "status"));
            println!("Created:     {}", field(ticket, "created_at"));
            println!("Updated:     {}", field(ticket, "updated_at"));
            println!("Description: {}", field(ticket, "description"));
        }
    }
    Ok(())
}

/// Output a ticket listing, one line per ticket in text mode
pub fn output_tickets(output_format: OutputFormat, tickets: &Value) -> anyhow::Result<()> {
    let rows = tickets.as_array().map(Vec::as_slice).unwrap_or_default();

    match output_format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(tickets)?),
        OutputFormat::Text if rows.is_empty() => println!("No tickets"),
        OutputFormat::Text => {
            println!("{:<36}  {:<6}  {}", "ID", "STATUS", "PRODUCT");
            for ticket in rows {
                println!(
                    "{:<36}  {:<6}  {}",
                    field(ticket, "id"),
                    field(ticket, "status"),
                    field(ticket, "product")
                );
            }
        }
    }
    Ok(())
}

fn field<'a>(value: &'a Value, key: &str) -> &'a str {
    value.get(key).and_then(Value::as_str).unwrap_or("-")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_render_as_dash() {
        let ticket = json!({ "id": "abc", "status": "open" });
        assert_eq!(field(&ticket, "id"), "abc");
        assert_eq!(field(&ticket, "product"), "-");
    }
}
