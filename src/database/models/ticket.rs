use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Ticket lifecycle status. Any value may be set to any other; there is no transition graph.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TicketStatus {
    #[default]
    New,
    Open,
    Closed,
}

impl TicketStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TicketStatus::New => "new",
            TicketStatus::Open => "open",
            TicketStatus::Closed => "closed",
        }
    }
}

impl fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TicketStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "new" => Ok(TicketStatus::New),
            "open" => Ok(TicketStatus::Open),
            "closed" => Ok(TicketStatus::Closed),
            other => Err(format!("unknown ticket status '{}'", other)),
        }
    }
}

/// A support request owned by exactly one account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ticket {
    pub id: Uuid,
    /// Owning account. Set from the caller at creation and never reassigned.
    pub user: Uuid,
    pub product: String,
    pub description: String,
    pub status: TicketStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Ticket {
    pub fn is_owned_by(&self, account_id: Uuid) -> bool {
        self.user == account_id
    }
}

/// Row shape of the `tickets` table; status is stored as text.
#[derive(Debug, Clone, FromRow)]
pub struct TicketRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub product: String,
    pub description: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<TicketRow> for Ticket {
    type Error = String;

    fn try_from(row: TicketRow) -> Result<Self, Self::Error> {
        Ok(Ticket {
            id: row.id,
            user: row.user_id,
            product: row.product,
            description: row.description,
            status: row.status.parse()?,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Validated input for a new ticket. Status is always `new`.
#[derive(Debug, Clone)]
pub struct NewTicket {
    pub user: Uuid,
    pub product: String,
    pub description: String,
}

/// Field-by-field overwrite applied by an update.
///
/// Only `product`, `description` and `status` are patchable. Anything else in
/// the request body (`id`, `user`, timestamps) is dropped during deserialization,
/// so ownership can never be reassigned through an update.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct TicketPatch {
    pub product: Option<String>,
    pub description: Option<String>,
    pub status: Option<TicketStatus>,
}

impl TicketPatch {
    pub fn is_empty(&self) -> bool {
        self.product.is_none() && self.description.is_none() && self.status.is_none()
    }

    pub fn apply_to(self, ticket: &mut Ticket) {
        if let Some(product) = self.product {
            ticket.product = product;
        }
        if let Some(description) = self.description {
            ticket.description = description;
        }
        if let Some(status) = self.status {
            ticket.status = status;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Ticket {
        let now = Utc::now();
        Ticket {
            id: Uuid::new_v4(),
            user: Uuid::new_v4(),
            product: "laptop".to_string(),
            description: "won't boot".to_string(),
            status: TicketStatus::New,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn status_serializes_lowercase() {
        assert_eq!(json!(TicketStatus::Closed), json!("closed"));
        assert_eq!("open".parse::<TicketStatus>(), Ok(TicketStatus::Open));
        assert!("resolved".parse::<TicketStatus>().is_err());
    }

    #[test]
    fn patch_ignores_owner_and_id() {
        let patch: TicketPatch = serde_json::from_value(json!({
            "user": Uuid::new_v4(),
            "id": Uuid::new_v4(),
            "status": "open"
        }))
        .unwrap();

        let mut ticket = sample();
        let (id, owner) = (ticket.id, ticket.user);
        patch.apply_to(&mut ticket);

        assert_eq!(ticket.id, id);
        assert_eq!(ticket.user, owner);
        assert_eq!(ticket.status, TicketStatus::Open);
        assert_eq!(ticket.product, "laptop");
    }

    #[test]
    fn patch_rejects_unknown_status() {
        let result = serde_json::from_value::<TicketPatch>(json!({ "status": "pending" }));
        assert!(result.is_err());
    }

    #[test]
    fn ticket_serializes_owner_as_user() {
        let ticket = sample();
        let value = json!(ticket);
        assert_eq!(value["user"], json!(ticket.user));
        assert_eq!(value["status"], "new");
    }
}
