//! User account model: validation, password hashing, session tokens and
//! password-reset tokens, persisted through a [`users::UserStore`].

pub mod config;
pub mod error;
pub mod telemetry;
pub mod users;

pub use config::{AccountConfig, JwtConfig};
pub use error::UserError;
