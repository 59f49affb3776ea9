//! Authentication: local accounts, password hashing and session state.

mod accounts;
mod password;
pub mod session;

pub use accounts::{login, normalize_username, register};
pub use password::{hash_password, verify_password};
pub use session::{SESSION_FLASH_KEY, SESSION_USER_KEY};
