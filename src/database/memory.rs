use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::database::models::{Account, NewAccount, NewTicket, Ticket, TicketPatch, TicketStatus};
use crate::database::store::DocumentStore;

/// In-process store used when no database is configured, and by tests.
#[derive(Default)]
pub struct MemoryStore {
    accounts: RwLock<HashMap<Uuid, Account>>,
    tickets: RwLock<HashMap<Uuid, Ticket>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop an account without touching its tickets. Lets tests exercise tokens
    /// that outlive the account they were issued for.
    pub async fn remove_account(&self, id: Uuid) -> bool {
        self.accounts.write().await.remove(&id).is_some()
    }

    pub async fn ticket_count(&self) -> usize {
        self.tickets.read().await.len()
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn find_account(&self, id: Uuid) -> Result<Option<Account>, DatabaseError> {
        Ok(self.accounts.read().await.get(&id).cloned())
    }

    async fn find_account_by_email(&self, email: &str) -> Result<Option<Account>, DatabaseError> {
        let accounts = self.accounts.read().await;
        Ok(accounts.values().find(|a| a.email == email).cloned())
    }

    async fn create_account(&self, account: NewAccount) -> Result<Account, DatabaseError> {
        let mut accounts = self.accounts.write().await;
        if accounts.values().any(|a| a.email == account.email) {
            return Err(DatabaseError::Conflict(format!("email '{}' already registered", account.email)));
        }

        let now = Utc::now();
        let account = Account {
            id: Uuid::new_v4(),
            name: account.name,
            email: account.email,
            password_hash: account.password_hash,
            created_at: now,
            updated_at: now,
        };
        accounts.insert(account.id, account.clone());
        Ok(account)
    }

    async fn find_tickets_by_owner(&self, owner: Uuid) -> Result<Vec<Ticket>, DatabaseError> {
        let tickets = self.tickets.read().await;
        let mut owned: Vec<Ticket> = tickets.values().filter(|t| t.user == owner).cloned().collect();
        owned.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(owned)
    }

    async fn find_ticket(&self, id: Uuid) -> Result<Option<Ticket>, DatabaseError> {
        Ok(self.tickets.read().await.get(&id).cloned())
    }

    async fn create_ticket(&self, ticket: NewTicket) -> Result<Ticket, DatabaseError> {
        let now = Utc::now();
        let ticket = Ticket {
            id: Uuid::new_v4(),
            user: ticket.user,
            product: ticket.product,
            description: ticket.description,
            status: TicketStatus::New,
            created_at: now,
            updated_at: now,
        };
        self.tickets.write().await.insert(ticket.id, ticket.clone());
        Ok(ticket)
    }

    async fn update_ticket(&self, id: Uuid, patch: TicketPatch) -> Result<Option<Ticket>, DatabaseError> {
        let mut tickets = self.tickets.write().await;
        Ok(tickets.get_mut(&id).map(|ticket| {
            patch.apply_to(ticket);
            ticket.updated_at = Utc::now();
            ticket.clone()
        }))
    }

    async fn delete_ticket(&self, id: Uuid) -> Result<bool, DatabaseError> {
        Ok(self.tickets.write().await.remove(&id).is_some())
    }

    async fn ping(&self) -> Result<(), DatabaseError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_account(email: &str) -> NewAccount {
        NewAccount {
            name: "Test".to_string(),
            email: email.to_string(),
            password_hash: "hash".to_string(),
        }
    }

    #[tokio::test]
    async fn duplicate_email_conflicts() {
        let store = MemoryStore::new();
        store.create_account(new_account("a@example.com")).await.unwrap();
        let err = store.create_account(new_account("a@example.com")).await.unwrap_err();
        assert!(matches!(err, DatabaseError::Conflict(_)));
    }

    #[tokio::test]
    async fn tickets_filtered_by_owner() {
        let store = MemoryStore::new();
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        for owner in [a, a, b] {
            store
                .create_ticket(NewTicket {
                    user: owner,
                    product: "printer".into(),
                    description: "jammed".into(),
                })
                .await
                .unwrap();
        }

        assert_eq!(store.find_tickets_by_owner(a).await.unwrap().len(), 2);
        assert_eq!(store.find_tickets_by_owner(b).await.unwrap().len(), 1);
        assert!(store.find_tickets_by_owner(Uuid::new_v4()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn delete_missing_is_noop() {
        let store = MemoryStore::new();
        let ticket = store
            .create_ticket(NewTicket {
                user: Uuid::new_v4(),
                product: "phone".into(),
                description: "cracked".into(),
            })
            .await
            .unwrap();

        assert!(store.delete_ticket(ticket.id).await.unwrap());
        assert!(!store.delete_ticket(ticket.id).await.unwrap());
        assert!(store.update_ticket(ticket.id, TicketPatch::default()).await.unwrap().is_none());
    }
}
