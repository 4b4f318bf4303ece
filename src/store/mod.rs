/// Persistence ports
///
/// Routes talk to storage only through these traits. `PgStore` backs the
/// running service; `MemoryStore` backs tests and local experiments.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::auth::{IdentityClaims, ADMIN_ROLE, REGULAR_ROLE};
use crate::error::AppError;

mod memory;
mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Role {
    Regular,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Regular => REGULAR_ROLE,
            Role::Admin => ADMIN_ROLE,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            REGULAR_ROLE => Ok(Role::Regular),
            ADMIN_ROLE => Ok(Role::Admin),
            other => Err(AppError::Internal(format!("unknown role {:?}", other))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    /// The single live refresh token, if the user is logged in
    pub refresh_token: Option<String>,
}

impl User {
    pub fn identity(&self) -> IdentityClaims {
        IdentityClaims::new(
            self.username.clone(),
            self.email.clone(),
            self.role.as_str(),
            self.id.to_string(),
        )
    }
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
}

#[derive(Debug, Clone, Serialize)]
pub struct Group {
    pub name: String,
    pub member_emails: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Transaction {
    pub id: Uuid,
    pub username: String,
    pub amount: f64,
    pub category: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewTransaction {
    pub username: String,
    pub amount: f64,
    pub category: String,
}

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Fails with a unique-constraint error if the username or email is taken
    async fn insert_user(&self, user: NewUser) -> Result<User, AppError>;

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AppError>;

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, AppError>;

    async fn find_user_by_refresh_token(&self, token: &str) -> Result<Option<User>, AppError>;

    async fn list_users(&self) -> Result<Vec<User>, AppError>;

    /// Overwrite the user's live refresh token; `None` logs the user out
    async fn set_refresh_token(&self, user_id: Uuid, token: Option<&str>) -> Result<(), AppError>;
}

#[async_trait]
pub trait GroupStore: Send + Sync {
    /// Fails with a unique-constraint error if the name is taken
    async fn insert_group(&self, group: Group) -> Result<Group, AppError>;

    async fn find_group(&self, name: &str) -> Result<Option<Group>, AppError>;
}

#[async_trait]
pub trait TransactionStore: Send + Sync {
    async fn insert_transaction(&self, transaction: NewTransaction)
        -> Result<Transaction, AppError>;

    async fn transactions_for_user(&self, username: &str) -> Result<Vec<Transaction>, AppError>;

    /// Transactions of every user whose email is in `emails`
    async fn transactions_for_emails(&self, emails: &[String])
        -> Result<Vec<Transaction>, AppError>;

    async fn all_transactions(&self) -> Result<Vec<Transaction>, AppError>;
}

/// Everything the HTTP layer needs from persistence
pub trait Store: UserStore + GroupStore + TransactionStore {}

impl<T: UserStore + GroupStore + TransactionStore> Store for T {}
