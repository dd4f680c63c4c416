use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

use crate::auth::{self, password};
use crate::database::manager::DatabaseError;
use crate::database::models::{Account, NewAccount};
use crate::database::store::DocumentStore;

#[derive(Debug, Error)]
pub enum AccountError {
    #[error("Please include all fields")]
    MissingFields,

    #[error("User already exists")]
    AlreadyExists,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("User not found")]
    NotFound,

    #[error("{0}")]
    Credentials(String),

    #[error(transparent)]
    Database(DatabaseError),
}

impl From<DatabaseError> for AccountError {
    fn from(err: DatabaseError) -> Self {
        match err {
            DatabaseError::Conflict(_) => AccountError::AlreadyExists,
            other => AccountError::Database(other),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RegisterRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Account identity plus a freshly issued bearer token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthPayload {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub token: String,
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[derive(Clone)]
pub struct AccountService {
    store: Arc<dyn DocumentStore>,
}

impl AccountService {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    pub async fn register(&self, request: RegisterRequest) -> Result<AuthPayload, AccountError> {
        let (Some(name), Some(email), Some(password)) = (
            present(request.name),
            present(request.email),
            present(request.password),
        ) else {
            return Err(AccountError::MissingFields);
        };

        let email = normalize_email(&email);
        if self.store.find_account_by_email(&email).await?.is_some() {
            return Err(AccountError::AlreadyExists);
        }

        let password_hash = password::hash_password(&password).map_err(AccountError::Credentials)?;
        let account = self
            .store
            .create_account(NewAccount {
                name: name.trim().to_string(),
                email,
                password_hash,
            })
            .await?;

        info!("Registered account {}", account.id);
        Self::payload(account)
    }

    pub async fn login(&self, request: LoginRequest) -> Result<AuthPayload, AccountError> {
        let (Some(email), Some(password)) = (present(request.email), present(request.password)) else {
            return Err(AccountError::MissingFields);
        };

        let account = self
            .store
            .find_account_by_email(&normalize_email(&email))
            .await?
            .ok_or(AccountError::InvalidCredentials)?;

        if !password::verify_password(&password, &account.password_hash).map_err(AccountError::Credentials)? {
            warn!("Failed login for account {}", account.id);
            return Err(AccountError::InvalidCredentials);
        }

        Self::payload(account)
    }

    pub async fn me(&self, account_id: Uuid) -> Result<Account, AccountError> {
        self.store
            .find_account(account_id)
            .await?
            .ok_or(AccountError::NotFound)
    }

    fn payload(account: Account) -> Result<AuthPayload, AccountError> {
        let token = auth::token_for(account.id).map_err(|e| AccountError::Credentials(e.to_string()))?;
        Ok(AuthPayload {
            id: account.id,
            name: account.name,
            email: account.email,
            token,
        })
    }
}
