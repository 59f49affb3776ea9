//! # User model
//!
//! Two representations of a registered student:
//!
//! ## [`User`]
//!
//! The complete row from the `users` table, loadable with [`sqlx::FromRow`]:
//!
//! - `id`: primary key (`UUID v4`).
//! - `username`: unique, stored normalised (trimmed, lowercase).
//! - `password_hash`: Argon2id PHC string.
//! - `created_at`: registration time.
//!
//! A user row is written once at registration and never mutated afterwards.
//!
//! ## [`UserInfo`]
//!
//! The authenticated identity. It omits the password hash, is what gets stored in
//! the session, and is passed explicitly to every note and file operation, whose
//! access checks compare `UserInfo::id` against the record's owner.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Full user record from the database.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Project to the identity carried by the session.
    pub fn to_info(&self) -> UserInfo {
        UserInfo {
            id: self.id,
            username: self.username.clone(),
        }
    }
}

/// Authenticated user identity.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserInfo {
    pub id: Uuid,
    pub username: String,
}

/// A user row about to be inserted.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub password_hash: String,
}
