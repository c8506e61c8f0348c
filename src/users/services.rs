use std::time::Duration;

use time::OffsetDateTime;
use tracing::{info, instrument, warn};

use super::{
    dto::{NewUser, Session},
    jwt::SessionKeys,
    model::User,
    password::hash_password,
    repo::UserStore,
    reset::hash_reset_token,
    validation::{normalize_email, validate_user},
};
use crate::error::{Result, UserError};

/// Validates, hashes a changed password, then writes the record.
///
/// The email is normalised first. A password that was not modified since load
/// is left untouched.
#[instrument(skip(store, user), fields(user_id = %user.id))]
pub async fn save_user(store: &dyn UserStore, user: &mut User) -> Result<()> {
    user.email = normalize_email(&user.email);
    if let Err(errors) = validate_user(user) {
        warn!(%errors, "user rejected by validation");
        return Err(errors.into());
    }

    if user.is_password_modified() {
        let plain = user.password.as_deref().unwrap_or_default();
        let hash = hash_password(plain)?;
        user.apply_password_hash(hash);
    }

    if user.is_new() {
        store.insert(user).await?;
        user.mark_persisted();
        info!(email = %user.email, "user created");
    } else {
        store.update(user).await?;
        info!("user updated");
    }
    Ok(())
}

pub async fn register(store: &dyn UserStore, input: NewUser) -> Result<User> {
    let mut user = User::new(input);
    save_user(store, &mut user).await?;
    Ok(user)
}

#[instrument(skip(store, keys, password))]
pub async fn login(
    store: &dyn UserStore,
    keys: &SessionKeys,
    email: &str,
    password: &str,
) -> Result<Session> {
    let email = normalize_email(email);
    let Some(user) = store.find_by_email_with_password(&email).await? else {
        warn!("login unknown email");
        return Err(UserError::InvalidCredentials);
    };

    if !user.compare_password(password)? {
        warn!(user_id = %user.id, "login invalid password");
        return Err(UserError::InvalidCredentials);
    }

    let token = user.issue_session_token(keys)?;
    info!(user_id = %user.id, "user logged in");
    Ok(Session { token, user })
}

/// Issues and persists a reset token, returning the raw value for delivery.
#[instrument(skip(store))]
pub async fn forgot_password(
    store: &dyn UserStore,
    email: &str,
    ttl: Duration,
) -> Result<(User, String)> {
    let email = normalize_email(email);
    let mut user = match store.find_by_email_with_password(&email).await? {
        Some(user) => user,
        None => {
            warn!("reset requested for unknown email");
            return Err(UserError::NotFound);
        }
    };

    let raw = user.issue_reset_token(ttl)?;
    save_user(store, &mut user).await?;
    info!(user_id = %user.id, "password reset token issued");
    Ok((user, raw))
}

#[instrument(skip_all)]
pub async fn reset_password(
    store: &dyn UserStore,
    raw_token: &str,
    new_password: &str,
) -> Result<User> {
    let now = OffsetDateTime::now_utc();
    let digest = hash_reset_token(raw_token);
    let Some(mut user) = store.find_by_reset_token(&digest, now).await? else {
        warn!("reset token not found or expired");
        return Err(UserError::InvalidResetToken);
    };

    user.reset_password(raw_token, new_password, now)?;
    save_user(store, &mut user).await?;
    info!(user_id = %user.id, "password reset");
    Ok(user)
}
