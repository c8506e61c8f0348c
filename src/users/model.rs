use std::time::Duration;

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::{Duration as TimeDuration, OffsetDateTime};
use tracing::{debug, warn};
use uuid::Uuid;

use super::{
    dto::NewUser,
    jwt::SessionKeys,
    password::verify_password,
    reset::{digest_matches, generate_reset_token, hash_reset_token},
    validation::normalize_email,
};
use crate::error::{Result, UserError};

pub const DEFAULT_ROLE: &str = "user";

/// `now + ttl`, or `ExpiryOutOfRange` when that instant is not representable.
pub(crate) fn expiry_after(now: OffsetDateTime, ttl: Duration) -> Result<OffsetDateTime> {
    TimeDuration::try_from(ttl)
        .ok()
        .and_then(|ttl| now.checked_add(ttl))
        .ok_or(UserError::ExpiryOutOfRange)
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Avatar {
    #[sqlx(rename = "avatar_public_id")]
    pub public_id: String,
    #[sqlx(rename = "avatar_url")]
    pub url: String,
}

/// User record.
///
/// `password` is `None` when the record was read without its secret column,
/// holds plaintext while `password_modified` is set, and a hash otherwise.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    #[sqlx(default)]
    pub password: Option<String>,
    #[sqlx(flatten)]
    pub avatar: Avatar,
    pub role: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(skip_serializing)]
    pub reset_password_token: Option<String>,
    #[serde(skip_serializing)]
    pub reset_password_expire: Option<OffsetDateTime>,

    #[serde(skip)]
    #[sqlx(skip)]
    is_new: bool,
    #[serde(skip)]
    #[sqlx(skip)]
    password_modified: bool,
}

impl User {
    /// Builds an unsaved record. The password stays plaintext until saved.
    pub fn new(input: NewUser) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: input.name.trim().to_string(),
            email: normalize_email(&input.email),
            password: Some(input.password),
            avatar: input.avatar,
            role: DEFAULT_ROLE.to_string(),
            created_at: OffsetDateTime::now_utc(),
            reset_password_token: None,
            reset_password_expire: None,
            is_new: true,
            password_modified: true,
        }
    }

    pub fn is_new(&self) -> bool {
        self.is_new
    }

    pub fn is_password_modified(&self) -> bool {
        self.password_modified
    }

    /// Replaces the password with plaintext; it is hashed on the next save.
    pub fn set_password(&mut self, plain: impl Into<String>) {
        self.password = Some(plain.into());
        self.password_modified = true;
    }

    pub(crate) fn apply_password_hash(&mut self, hash: String) {
        self.password = Some(hash);
        self.password_modified = false;
    }

    pub(crate) fn mark_persisted(&mut self) {
        self.is_new = false;
    }

    /// Verifies `candidate` against the stored hash.
    ///
    /// Fails with `MissingPasswordHash` when the record was read without its
    /// password or still holds an unsaved plaintext one.
    pub fn compare_password(&self, candidate: &str) -> Result<bool> {
        let hash = match (&self.password, self.password_modified) {
            (Some(hash), false) => hash,
            _ => {
                warn!(user_id = %self.id, "compare_password without stored hash");
                return Err(UserError::MissingPasswordHash);
            }
        };
        verify_password(candidate, hash)
    }

    pub fn issue_session_token(&self, keys: &SessionKeys) -> Result<String> {
        keys.sign(self.id)
    }

    /// Stores the hash of a fresh reset token and returns the raw token.
    pub fn issue_reset_token(&mut self, ttl: Duration) -> Result<String> {
        self.issue_reset_token_at(ttl, OffsetDateTime::now_utc())
    }

    /// Leaves the record untouched when `now + ttl` is out of range.
    pub fn issue_reset_token_at(&mut self, ttl: Duration, now: OffsetDateTime) -> Result<String> {
        let expire = expiry_after(now, ttl)?;
        let raw = generate_reset_token();
        self.reset_password_token = Some(hash_reset_token(&raw));
        self.reset_password_expire = Some(expire);
        debug!(user_id = %self.id, "reset token issued");
        Ok(raw)
    }

    pub fn clear_reset_token(&mut self) {
        self.reset_password_token = None;
        self.reset_password_expire = None;
    }

    /// Consumes a reset token: sets `new_password` and clears the token.
    pub fn reset_password(
        &mut self,
        raw_token: &str,
        new_password: impl Into<String>,
        now: OffsetDateTime,
    ) -> Result<()> {
        let matches = self
            .reset_password_token
            .as_deref()
            .is_some_and(|stored| digest_matches(stored, raw_token));
        let live = self.reset_password_expire.is_some_and(|exp| now < exp);
        if !(matches && live) {
            warn!(user_id = %self.id, matches, live, "reset token rejected");
            return Err(UserError::InvalidResetToken);
        }
        self.set_password(new_password);
        self.clear_reset_token();
        Ok(())
    }
}
