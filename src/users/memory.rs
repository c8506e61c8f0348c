use std::collections::HashMap;

use async_trait::async_trait;
use time::OffsetDateTime;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{model::User, repo::UserStore, validation::ValidationErrors};
use crate::error::{Result, UserError};

/// In-process `UserStore`, keyed by id.
#[derive(Default)]
pub struct MemoryUserStore {
    users: RwLock<HashMap<Uuid, User>>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.users.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.users.read().await.is_empty()
    }
}

fn email_taken(users: &HashMap<Uuid, User>, email: &str, except: Uuid) -> bool {
    users.values().any(|u| u.id != except && u.email == email)
}

fn without_password(user: &User) -> User {
    let mut user = user.clone();
    user.password = None;
    user
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn insert(&self, user: &User) -> Result<()> {
        let mut users = self.users.write().await;
        if users.contains_key(&user.id) || email_taken(&users, &user.email, user.id) {
            return Err(UserError::Validation(ValidationErrors::duplicate_email()));
        }
        let mut stored = user.clone();
        stored.mark_persisted();
        users.insert(user.id, stored);
        Ok(())
    }

    async fn update(&self, user: &User) -> Result<()> {
        let mut users = self.users.write().await;
        if email_taken(&users, &user.email, user.id) {
            return Err(UserError::Validation(ValidationErrors::duplicate_email()));
        }
        let stored = users.get_mut(&user.id).ok_or(UserError::NotFound)?;
        let password = user.password.clone().or_else(|| stored.password.take());
        *stored = user.clone();
        stored.password = password;
        stored.mark_persisted();
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>> {
        Ok(self.users.read().await.get(&id).map(without_password))
    }

    async fn find_by_email_with_password(&self, email: &str) -> Result<Option<User>> {
        Ok(self
            .users
            .read()
            .await
            .values()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn find_by_reset_token(
        &self,
        token_hash: &str,
        now: OffsetDateTime,
    ) -> Result<Option<User>> {
        Ok(self
            .users
            .read()
            .await
            .values()
            .find(|u| {
                u.reset_password_token.as_deref() == Some(token_hash)
                    && u.reset_password_expire.is_some_and(|exp| exp > now)
            })
            .map(without_password))
    }
}
