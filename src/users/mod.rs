pub mod dto;
pub mod jwt;
pub mod memory;
pub mod model;
pub mod password;
pub mod repo;
pub mod reset;
pub mod services;
pub mod validation;

pub use dto::{NewUser, Session};
pub use jwt::{Claims, SessionKeys};
pub use memory::MemoryUserStore;
pub use model::{Avatar, User};
pub use repo::{PgUserStore, UserStore};
pub use validation::{validate_user, FieldViolation, ValidationErrors};
