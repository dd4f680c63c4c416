use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::database::models::{NewTicket, Ticket, TicketPatch};
use crate::database::store::DocumentStore;
use crate::middleware::AuthUser;

#[derive(Debug, Error)]
pub enum TicketError {
    #[error("Please add a product and description")]
    Validation { missing: Vec<&'static str> },

    #[error("User not found")]
    Unauthenticated,

    #[error("Not Authorised")]
    Forbidden,

    #[error("Ticket not found")]
    NotFound,

    #[error("{0}")]
    InvalidPatch(String),

    #[error(transparent)]
    Database(#[from] DatabaseError),
}

/// Body of a create request. Any `status` or `user` sent by the client is ignored.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CreateTicketRequest {
    pub product: Option<String>,
    pub description: Option<String>,
}

impl CreateTicketRequest {
    fn validate(self) -> Result<(String, String), TicketError> {
        let product = non_empty(self.product);
        let description = non_empty(self.description);

        match (product, description) {
            (Some(product), Some(description)) => Ok((product, description)),
            (product, description) => {
                let mut missing = Vec::new();
                if product.is_none() {
                    missing.push("product");
                }
                if description.is_none() {
                    missing.push("description");
                }
                Err(TicketError::Validation { missing })
            }
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

fn parse_patch(body: Value) -> Result<TicketPatch, TicketError> {
    if !body.is_object() {
        return Err(TicketError::InvalidPatch("Request body must be a JSON object".to_string()));
    }
    serde_json::from_value(body).map_err(|e| TicketError::InvalidPatch(format!("Invalid request body: {}", e)))
}

/// Ticket operations scoped to the calling account.
///
/// Fetch, update and delete check their preconditions in a fixed order and
/// report the first one that fails:
/// 1. the caller's account still exists (`Unauthenticated`)
/// 2. the ticket exists (`NotFound`)
/// 3. the caller owns it (`Forbidden`)
#[derive(Clone)]
pub struct TicketService {
    store: Arc<dyn DocumentStore>,
}

impl TicketService {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    pub async fn list(&self, caller: &AuthUser) -> Result<Vec<Ticket>, TicketError> {
        self.require_account(caller).await?;

        let tickets = self.store.find_tickets_by_owner(caller.user_id).await?;
        debug!("Listed {} tickets for {}", tickets.len(), caller.user_id);
        Ok(tickets)
    }

    pub async fn create(&self, caller: &AuthUser, request: CreateTicketRequest) -> Result<Ticket, TicketError> {
        let (product, description) = request.validate()?;
        self.require_account(caller).await?;

        let ticket = self
            .store
            .create_ticket(NewTicket {
                user: caller.user_id,
                product,
                description,
            })
            .await?;

        debug!("Created ticket {} for {}", ticket.id, caller.user_id);
        Ok(ticket)
    }

    pub async fn fetch(&self, caller: &AuthUser, ticket_id: &str) -> Result<Ticket, TicketError> {
        self.owned_ticket(caller, ticket_id).await
    }

    /// The body is only interpreted once the caller has been shown to own the ticket.
    pub async fn update(&self, caller: &AuthUser, ticket_id: &str, body: Value) -> Result<Ticket, TicketError> {
        let ticket = self.owned_ticket(caller, ticket_id).await?;
        let patch = parse_patch(body)?;

        // The ticket may have been deleted between the lookup and the write.
        let updated = self
            .store
            .update_ticket(ticket.id, patch)
            .await?
            .ok_or(TicketError::NotFound)?;

        debug!("Updated ticket {} (status {})", updated.id, updated.status);
        Ok(updated)
    }

    pub async fn delete(&self, caller: &AuthUser, ticket_id: &str) -> Result<(), TicketError> {
        let ticket = self.owned_ticket(caller, ticket_id).await?;

        if !self.store.delete_ticket(ticket.id).await? {
            debug!("Ticket {} already removed", ticket.id);
        }
        debug!("Deleted ticket {} for {}", ticket.id, caller.user_id);
        Ok(())
    }

    async fn require_account(&self, caller: &AuthUser) -> Result<(), TicketError> {
        match self.store.find_account(caller.user_id).await? {
            Some(_) => Ok(()),
            None => {
                warn!("Token for unknown account {}", caller.user_id);
                Err(TicketError::Unauthenticated)
            }
        }
    }

    async fn owned_ticket(&self, caller: &AuthUser, ticket_id: &str) -> Result<Ticket, TicketError> {
        self.require_account(caller).await?;

        // A malformed id cannot name a stored ticket.
        let id = Uuid::parse_str(ticket_id).map_err(|_| TicketError::NotFound)?;
        let ticket = self.store.find_ticket(id).await?.ok_or(TicketError::NotFound)?;

        if !ticket.is_owned_by(caller.user_id) {
            warn!("Account {} denied access to ticket {}", caller.user_id, ticket.id);
            return Err(TicketError::Forbidden);
        }

        Ok(ticket)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::TicketStatus;
    use crate::testing::TestContext;
    use serde_json::json;

    fn laptop() -> CreateTicketRequest {
        CreateTicketRequest {
            product: Some("laptop".into()),
            description: Some("won't boot".into()),
        }
    }

    #[tokio::test]
    async fn create_assigns_owner_and_new_status() {
        let ctx = TestContext::new();
        let owner = ctx.register("owner").await;

        let ticket = ctx.tickets.create(&owner, laptop()).await.unwrap();

        assert_eq!(ticket.user, owner.user_id);
        assert_eq!(ticket.status, TicketStatus::New);
        assert_eq!(ticket.product, "laptop");
    }

    #[tokio::test]
    async fn create_requires_product_and_description() {
        let ctx = TestContext::new();
        let owner = ctx.register("owner").await;

        let cases = [
            CreateTicketRequest { product: None, description: Some("x".into()) },
            CreateTicketRequest { product: Some("x".into()), description: Some(String::new()) },
            CreateTicketRequest::default(),
        ];
        for request in cases {
            let err = ctx.tickets.create(&owner, request).await.unwrap_err();
            assert!(matches!(err, TicketError::Validation { .. }));
        }

        assert_eq!(ctx.store.ticket_count().await, 0);
    }

    #[tokio::test]
    async fn create_keeps_text_as_sent() {
        let ctx = TestContext::new();
        let owner = ctx.register("owner").await;

        let request = CreateTicketRequest {
            product: Some("  laptop  ".into()),
            description: Some("   ".into()),
        };
        let ticket = ctx.tickets.create(&owner, request).await.unwrap();

        assert_eq!(ticket.product, "  laptop  ");
        assert_eq!(ticket.description, "   ");
    }

    #[tokio::test]
    async fn update_checks_access_before_body() {
        let ctx = TestContext::new();
        let alice = ctx.register("alice").await;
        let bob = ctx.register("bob").await;
        let id = ctx.tickets.create(&alice, laptop()).await.unwrap().id.to_string();
        let bogus = json!({ "status": "bogus" });

        let err = ctx.tickets.update(&bob, &id, bogus.clone()).await.unwrap_err();
        assert!(matches!(err, TicketError::Forbidden));

        let missing = Uuid::new_v4().to_string();
        let err = ctx.tickets.update(&alice, &missing, bogus.clone()).await.unwrap_err();
        assert!(matches!(err, TicketError::NotFound));

        let ghost = AuthUser { user_id: Uuid::new_v4() };
        let err = ctx.tickets.update(&ghost, &id, bogus.clone()).await.unwrap_err();
        assert!(matches!(err, TicketError::Unauthenticated));

        let err = ctx.tickets.update(&alice, &id, bogus).await.unwrap_err();
        assert!(matches!(err, TicketError::InvalidPatch(_)));
        let err = ctx.tickets.update(&alice, &id, json!(["status"])).await.unwrap_err();
        assert!(matches!(err, TicketError::InvalidPatch(_)));
    }

    #[tokio::test]
    async fn validation_runs_before_account_check() {
        let ctx = TestContext::new();
        let ghost = AuthUser { user_id: Uuid::new_v4() };

        let err = ctx.tickets.create(&ghost, CreateTicketRequest::default()).await.unwrap_err();
        assert!(matches!(err, TicketError::Validation { .. }));

        let err = ctx.tickets.create(&ghost, laptop()).await.unwrap_err();
        assert!(matches!(err, TicketError::Unauthenticated));
    }

    #[tokio::test]
    async fn list_only_returns_own_tickets() {
        let ctx = TestContext::new();
        let alice = ctx.register("alice").await;
        let bob = ctx.register("bob").await;

        let created = ctx.tickets.create(&alice, laptop()).await.unwrap();

        let mine = ctx.tickets.list(&alice).await.unwrap();
        assert_eq!(mine, vec![created]);
        assert!(ctx.tickets.list(&bob).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn non_owner_is_forbidden() {
        let ctx = TestContext::new();
        let alice = ctx.register("alice").await;
        let bob = ctx.register("bob").await;
        let ticket = ctx.tickets.create(&alice, laptop()).await.unwrap();
        let id = ticket.id.to_string();

        assert!(matches!(ctx.tickets.fetch(&bob, &id).await, Err(TicketError::Forbidden)));
        assert!(matches!(
            ctx.tickets.update(&bob, &id, json!({})).await,
            Err(TicketError::Forbidden)
        ));
        assert!(matches!(ctx.tickets.delete(&bob, &id).await, Err(TicketError::Forbidden)));

        // Still intact for the owner
        assert_eq!(ctx.tickets.fetch(&alice, &id).await.unwrap(), ticket);
    }

    #[tokio::test]
    async fn missing_ticket_is_not_found() {
        let ctx = TestContext::new();
        let alice = ctx.register("alice").await;
        let missing = Uuid::new_v4().to_string();

        assert!(matches!(ctx.tickets.fetch(&alice, &missing).await, Err(TicketError::NotFound)));
        assert!(matches!(ctx.tickets.fetch(&alice, "not-a-uuid").await, Err(TicketError::NotFound)));
        assert!(matches!(
            ctx.tickets.update(&alice, &missing, json!({})).await,
            Err(TicketError::NotFound)
        ));
        assert!(matches!(ctx.tickets.delete(&alice, &missing).await, Err(TicketError::NotFound)));
    }

    #[tokio::test]
    async fn unknown_account_checked_first() {
        let ctx = TestContext::new();
        let alice = ctx.register("alice").await;
        let ticket = ctx.tickets.create(&alice, laptop()).await.unwrap();

        // Token outlives its account: reported as unauthenticated even though
        // the ticket exists and belongs to someone else.
        let ghost = AuthUser { user_id: Uuid::new_v4() };
        let err = ctx.tickets.fetch(&ghost, &ticket.id.to_string()).await.unwrap_err();
        assert!(matches!(err, TicketError::Unauthenticated));

        assert!(ctx.store.remove_account(alice.user_id).await);
        let err = ctx.tickets.list(&alice).await.unwrap_err();
        assert!(matches!(err, TicketError::Unauthenticated));
    }

    #[tokio::test]
    async fn update_overwrites_patched_fields_only() {
        let ctx = TestContext::new();
        let alice = ctx.register("alice").await;
        let ticket = ctx.tickets.create(&alice, laptop()).await.unwrap();

        let updated = ctx
            .tickets
            .update(&alice, &ticket.id.to_string(), json!({ "status": "closed" }))
            .await
            .unwrap();

        assert_eq!(updated.status, TicketStatus::Closed);
        assert_eq!(updated.product, ticket.product);
        assert_eq!(updated.user, alice.user_id);

        // Any status can move to any other
        let reopened = ctx
            .tickets
            .update(&alice, &ticket.id.to_string(), json!({ "status": "new" }))
            .await
            .unwrap();
        assert_eq!(reopened.status, TicketStatus::New);
    }

    #[tokio::test]
    async fn second_delete_is_not_found() {
        let ctx = TestContext::new();
        let alice = ctx.register("alice").await;
        let id = ctx.tickets.create(&alice, laptop()).await.unwrap().id.to_string();

        ctx.tickets.delete(&alice, &id).await.unwrap();
        assert!(matches!(ctx.tickets.delete(&alice, &id).await, Err(TicketError::NotFound)));
    }
}
