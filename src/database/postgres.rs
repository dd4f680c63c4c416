use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::database::models::{Account, NewAccount, NewTicket, Ticket, TicketPatch, TicketRow, TicketStatus};
use crate::database::store::DocumentStore;

const TICKET_COLUMNS: &str = "id, user_id, product, description, status, created_at, updated_at";
const ACCOUNT_COLUMNS: &str = "id, name, email, password_hash, created_at, updated_at";

/// Postgres-backed document store
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

fn into_ticket(row: TicketRow) -> Result<Ticket, DatabaseError> {
    Ticket::try_from(row).map_err(DatabaseError::QueryError)
}

#[async_trait]
impl DocumentStore for PgStore {
    async fn find_account(&self, id: Uuid) -> Result<Option<Account>, DatabaseError> {
        let sql = format!("SELECT {} FROM accounts WHERE id = $1", ACCOUNT_COLUMNS);
        let account = sqlx::query_as::<_, Account>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(account)
    }

    async fn find_account_by_email(&self, email: &str) -> Result<Option<Account>, DatabaseError> {
        let sql = format!("SELECT {} FROM accounts WHERE email = $1", ACCOUNT_COLUMNS);
        let account = sqlx::query_as::<_, Account>(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(account)
    }

    async fn create_account(&self, account: NewAccount) -> Result<Account, DatabaseError> {
        let sql = format!(
            "INSERT INTO accounts (id, name, email, password_hash) VALUES ($1, $2, $3, $4) RETURNING {}",
            ACCOUNT_COLUMNS
        );
        sqlx::query_as::<_, Account>(&sql)
            .bind(Uuid::new_v4())
            .bind(&account.name)
            .bind(&account.email)
            .bind(&account.password_hash)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| match e {
                sqlx::Error::Database(db) if db.is_unique_violation() => {
                    DatabaseError::Conflict(format!("email '{}' already registered", account.email))
                }
                other => DatabaseError::Sqlx(other),
            })
    }

    async fn find_tickets_by_owner(&self, owner: Uuid) -> Result<Vec<Ticket>, DatabaseError> {
        let sql = format!(
            "SELECT {} FROM tickets WHERE user_id = $1 ORDER BY created_at, id",
            TICKET_COLUMNS
        );
        let rows = sqlx::query_as::<_, TicketRow>(&sql)
            .bind(owner)
            .fetch_all(&self.pool)
            .await?;
        rows.into_iter().map(into_ticket).collect()
    }

    async fn find_ticket(&self, id: Uuid) -> Result<Option<Ticket>, DatabaseError> {
        let sql = format!("SELECT {} FROM tickets WHERE id = $1", TICKET_COLUMNS);
        let row = sqlx::query_as::<_, TicketRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(into_ticket).transpose()
    }

    async fn create_ticket(&self, ticket: NewTicket) -> Result<Ticket, DatabaseError> {
        let sql = format!(
            "INSERT INTO tickets (id, user_id, product, description, status) VALUES ($1, $2, $3, $4, $5) RETURNING {}",
            TICKET_COLUMNS
        );
        let row = sqlx::query_as::<_, TicketRow>(&sql)
            .bind(Uuid::new_v4())
            .bind(ticket.user)
            .bind(&ticket.product)
            .bind(&ticket.description)
            .bind(TicketStatus::New.as_str())
            .fetch_one(&self.pool)
            .await?;
        into_ticket(row)
    }

    async fn update_ticket(&self, id: Uuid, patch: TicketPatch) -> Result<Option<Ticket>, DatabaseError> {
        let sql = format!(
            "UPDATE tickets SET \
                product = COALESCE($2, product), \
                description = COALESCE($3, description), \
                status = COALESCE($4, status), \
                updated_at = now() \
             WHERE id = $1 RETURNING {}",
            TICKET_COLUMNS
        );
        let row = sqlx::query_as::<_, TicketRow>(&sql)
            .bind(id)
            .bind(patch.product)
            .bind(patch.description)
            .bind(patch.status.map(|s| s.as_str()))
            .fetch_optional(&self.pool)
            .await?;
        row.map(into_ticket).transpose()
    }

    async fn delete_ticket(&self, id: Uuid) -> Result<bool, DatabaseError> {
        let result = sqlx::query("DELETE FROM tickets WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn ping(&self) -> Result<(), DatabaseError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
