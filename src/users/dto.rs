use serde::{Deserialize, Serialize};

use super::model::{Avatar, User};

/// Registration input. The password is plaintext until the record is saved.
#[derive(Debug, Clone, Deserialize)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password: String,
    pub avatar: Avatar,
}

/// Returned after a successful login.
#[derive(Debug, Serialize)]
pub struct Session {
    pub token: String,
    pub user: User,
}
