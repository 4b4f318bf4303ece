use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{
    Group, GroupStore, NewTransaction, NewUser, Transaction, TransactionStore, User, UserStore,
};
use crate::error::{AppError, DatabaseError};

#[derive(Default)]
struct Tables {
    users: HashMap<Uuid, User>,
    groups: HashMap<String, Group>,
    transactions: Vec<Transaction>,
}

/// In-process store; every operation takes one lock on the whole dataset
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn duplicate(what: &str) -> AppError {
    AppError::Database(DatabaseError::UniqueConstraintViolation(format!(
        "{} already registered",
        what
    )))
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn insert_user(&self, user: NewUser) -> Result<User, AppError> {
        let mut tables = self.tables.write().await;
        if tables.users.values().any(|u| u.username == user.username) {
            return Err(duplicate("username"));
        }
        if tables.users.values().any(|u| u.email == user.email) {
            return Err(duplicate("email"));
        }

        let user = User {
            id: Uuid::new_v4(),
            username: user.username,
            email: user.email,
            password_hash: user.password_hash,
            role: user.role,
            refresh_token: None,
        };
        tables.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables.users.values().find(|u| u.email == email).cloned())
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables.users.values().find(|u| u.username == username).cloned())
    }

    async fn find_user_by_refresh_token(&self, token: &str) -> Result<Option<User>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .values()
            .find(|u| u.refresh_token.as_deref() == Some(token))
            .cloned())
    }

    async fn list_users(&self) -> Result<Vec<User>, AppError> {
        let tables = self.tables.read().await;
        let mut users: Vec<User> = tables.users.values().cloned().collect();
        users.sort_by(|a, b| a.username.cmp(&b.username));
        Ok(users)
    }

    async fn set_refresh_token(&self, user_id: Uuid, token: Option<&str>) -> Result<(), AppError> {
        let mut tables = self.tables.write().await;
        let user = tables.users.get_mut(&user_id).ok_or_else(|| {
            AppError::Database(DatabaseError::NotFound(format!("user {}", user_id)))
        })?;
        user.refresh_token = token.map(str::to_string);
        Ok(())
    }
}

#[async_trait]
impl GroupStore for MemoryStore {
    async fn insert_group(&self, group: Group) -> Result<Group, AppError> {
        let mut tables = self.tables.write().await;
        if tables.groups.contains_key(&group.name) {
            return Err(duplicate("group name"));
        }
        tables.groups.insert(group.name.clone(), group.clone());
        Ok(group)
    }

    async fn find_group(&self, name: &str) -> Result<Option<Group>, AppError> {
        Ok(self.tables.read().await.groups.get(name).cloned())
    }
}

#[async_trait]
impl TransactionStore for MemoryStore {
    async fn insert_transaction(
        &self,
        transaction: NewTransaction,
    ) -> Result<Transaction, AppError> {
        let transaction = Transaction {
            id: Uuid::new_v4(),
            username: transaction.username,
            amount: transaction.amount,
            category: transaction.category,
            created_at: Utc::now(),
        };
        self.tables
            .write()
            .await
            .transactions
            .push(transaction.clone());
        Ok(transaction)
    }

    async fn transactions_for_user(&self, username: &str) -> Result<Vec<Transaction>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables
            .transactions
            .iter()
            .filter(|t| t.username == username)
            .cloned()
            .collect())
    }

    async fn transactions_for_emails(
        &self,
        emails: &[String],
    ) -> Result<Vec<Transaction>, AppError> {
        let tables = self.tables.read().await;
        let usernames: Vec<&str> = tables
            .users
            .values()
            .filter(|u| emails.contains(&u.email))
            .map(|u| u.username.as_str())
            .collect();
        Ok(tables
            .transactions
            .iter()
            .filter(|t| usernames.contains(&t.username.as_str()))
            .cloned()
            .collect())
    }

    async fn all_transactions(&self) -> Result<Vec<Transaction>, AppError> {
        Ok(self.tables.read().await.transactions.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Role;

    fn new_user(username: &str, email: &str) -> NewUser {
        NewUser {
            username: username.to_string(),
            email: email.to_string(),
            password_hash: "hash".to_string(),
            role: Role::Regular,
        }
    }

    #[tokio::test]
    async fn test_duplicate_username_rejected() {
        let store = MemoryStore::new();
        store.insert_user(new_user("mario", "m@example.com")).await.unwrap();

        let result = store.insert_user(new_user("mario", "other@example.com")).await;
        assert!(matches!(
            result,
            Err(AppError::Database(DatabaseError::UniqueConstraintViolation(_)))
        ));
    }

    #[tokio::test]
    async fn test_refresh_token_single_live_value() {
        let store = MemoryStore::new();
        let user = store.insert_user(new_user("mario", "m@example.com")).await.unwrap();

        store.set_refresh_token(user.id, Some("first")).await.unwrap();
        store.set_refresh_token(user.id, Some("second")).await.unwrap();

        assert!(store.find_user_by_refresh_token("first").await.unwrap().is_none());
        let found = store.find_user_by_refresh_token("second").await.unwrap();
        assert_eq!(found.map(|u| u.id), Some(user.id));

        store.set_refresh_token(user.id, None).await.unwrap();
        assert!(store.find_user_by_refresh_token("second").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_transactions_for_emails() {
        let store = MemoryStore::new();
        store.insert_user(new_user("mario", "m@example.com")).await.unwrap();
        store.insert_user(new_user("luigi", "l@example.com")).await.unwrap();

        for (username, amount) in [("mario", 10.0), ("luigi", 20.0), ("mario", 5.5)] {
            store
                .insert_transaction(NewTransaction {
                    username: username.to_string(),
                    amount,
                    category: "food".to_string(),
                })
                .await
                .unwrap();
        }

        let mario_only = store
            .transactions_for_emails(&["m@example.com".to_string()])
            .await
            .unwrap();
        assert_eq!(mario_only.len(), 2);
        assert!(mario_only.iter().all(|t| t.username == "mario"));

        assert_eq!(store.all_transactions().await.unwrap().len(), 3);
    }
}
