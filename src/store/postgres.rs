use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use super::{
    Group, GroupStore, NewTransaction, NewUser, Transaction, TransactionStore, User, UserStore,
};
use crate::error::AppError;

type UserRow = (Uuid, String, String, String, String, Option<String>);
type TransactionRow = (Uuid, String, f64, String, DateTime<Utc>);

const USER_COLUMNS: &str = "id, username, email, password_hash, role, refresh_token";

/// PostgreSQL-backed store; schema lives in `migrations/`
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn fetch_user(&self, filter: &str, value: &str) -> Result<Option<User>, AppError> {
        let query = format!("SELECT {} FROM users WHERE {} = $1", USER_COLUMNS, filter);
        sqlx::query_as::<_, UserRow>(&query)
            .bind(value)
            .fetch_optional(&self.pool)
            .await?
            .map(user_from_row)
            .transpose()
    }
}

fn user_from_row(row: UserRow) -> Result<User, AppError> {
    let (id, username, email, password_hash, role, refresh_token) = row;
    Ok(User {
        id,
        username,
        email,
        password_hash,
        role: role.parse()?,
        refresh_token,
    })
}

fn transaction_from_row(row: TransactionRow) -> Transaction {
    let (id, username, amount, category, created_at) = row;
    Transaction {
        id,
        username,
        amount,
        category,
        created_at,
    }
}

#[async_trait]
impl UserStore for PgStore {
    async fn insert_user(&self, user: NewUser) -> Result<User, AppError> {
        let id = Uuid::new_v4();
        sqlx::query(
            r#"
            INSERT INTO users (id, username, email, password_hash, role, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(id)
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.role.as_str())
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(User {
            id,
            username: user.username,
            email: user.email,
            password_hash: user.password_hash,
            role: user.role,
            refresh_token: None,
        })
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        self.fetch_user("email", email).await
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        self.fetch_user("username", username).await
    }

    async fn find_user_by_refresh_token(&self, token: &str) -> Result<Option<User>, AppError> {
        self.fetch_user("refresh_token", token).await
    }

    async fn list_users(&self) -> Result<Vec<User>, AppError> {
        let query = format!("SELECT {} FROM users ORDER BY username", USER_COLUMNS);
        sqlx::query_as::<_, UserRow>(&query)
            .fetch_all(&self.pool)
            .await?
            .into_iter()
            .map(user_from_row)
            .collect()
    }

    async fn set_refresh_token(&self, user_id: Uuid, token: Option<&str>) -> Result<(), AppError> {
        sqlx::query("UPDATE users SET refresh_token = $1 WHERE id = $2")
            .bind(token)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

#[async_trait]
impl GroupStore for PgStore {
    async fn insert_group(&self, group: Group) -> Result<Group, AppError> {
        sqlx::query("INSERT INTO groups (name, member_emails, created_at) VALUES ($1, $2, $3)")
            .bind(&group.name)
            .bind(&group.member_emails)
            .bind(Utc::now())
            .execute(&self.pool)
            .await?;
        Ok(group)
    }

    async fn find_group(&self, name: &str) -> Result<Option<Group>, AppError> {
        let row = sqlx::query_as::<_, (String, Vec<String>)>(
            "SELECT name, member_emails FROM groups WHERE name = $1",
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|(name, member_emails)| Group {
            name,
            member_emails,
        }))
    }
}

#[async_trait]
impl TransactionStore for PgStore {
    async fn insert_transaction(
        &self,
        transaction: NewTransaction,
    ) -> Result<Transaction, AppError> {
        let row = sqlx::query_as::<_, TransactionRow>(
            r#"
            INSERT INTO transactions (id, username, amount, category, created_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, username, amount, category, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&transaction.username)
        .bind(transaction.amount)
        .bind(&transaction.category)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(transaction_from_row(row))
    }

    async fn transactions_for_user(&self, username: &str) -> Result<Vec<Transaction>, AppError> {
        let rows = sqlx::query_as::<_, TransactionRow>(
            r#"
            SELECT id, username, amount, category, created_at
            FROM transactions
            WHERE username = $1
            ORDER BY created_at
            "#,
        )
        .bind(username)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(transaction_from_row).collect())
    }

    async fn transactions_for_emails(
        &self,
        emails: &[String],
    ) -> Result<Vec<Transaction>, AppError> {
        let rows = sqlx::query_as::<_, TransactionRow>(
            r#"
            SELECT t.id, t.username, t.amount, t.category, t.created_at
            FROM transactions t
            JOIN users u ON u.username = t.username
            WHERE u.email = ANY($1)
            ORDER BY t.created_at
            "#,
        )
        .bind(emails.to_vec())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(transaction_from_row).collect())
    }

    async fn all_transactions(&self) -> Result<Vec<Transaction>, AppError> {
        let rows = sqlx::query_as::<_, TransactionRow>(
            "SELECT id, username, amount, category, created_at FROM transactions ORDER BY created_at",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(transaction_from_row).collect())
    }
}
