use async_trait::async_trait;
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::database::models::{Account, NewAccount, NewTicket, Ticket, TicketPatch};

/// Persistence collaborator for accounts and tickets.
///
/// Every method is a single round-trip. Implementations do no locking across
/// calls: concurrent updates to one ticket are last-write-wins, and deleting a
/// missing ticket is a no-op that reports `false`.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn find_account(&self, id: Uuid) -> Result<Option<Account>, DatabaseError>;

    async fn find_account_by_email(&self, email: &str) -> Result<Option<Account>, DatabaseError>;

    /// Fails with `DatabaseError::Conflict` when the email is already registered.
    async fn create_account(&self, account: NewAccount) -> Result<Account, DatabaseError>;

    async fn find_tickets_by_owner(&self, owner: Uuid) -> Result<Vec<Ticket>, DatabaseError>;

    async fn find_ticket(&self, id: Uuid) -> Result<Option<Ticket>, DatabaseError>;

    async fn create_ticket(&self, ticket: NewTicket) -> Result<Ticket, DatabaseError>;

    /// Returns the post-update ticket, or `None` if it no longer exists.
    async fn update_ticket(&self, id: Uuid, patch: TicketPatch) -> Result<Option<Ticket>, DatabaseError>;

    /// Returns whether a ticket was removed.
    async fn delete_ticket(&self, id: Uuid) -> Result<bool, DatabaseError>;

    async fn ping(&self) -> Result<(), DatabaseError>;
}
