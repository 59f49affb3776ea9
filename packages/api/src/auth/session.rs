//! Session data: the authenticated [`UserInfo`] and a one-shot flash message.

use tower_sessions::Session;

use crate::error::{AppError, Result};
use crate::models::UserInfo;

/// Key for storing the authenticated user in the session.
pub const SESSION_USER_KEY: &str = "user";

/// Key for the message shown on the next rendered page.
pub const SESSION_FLASH_KEY: &str = "flash";

fn session_error(error: tower_sessions::session::Error) -> AppError {
    AppError::Internal(format!("session store: {error}"))
}

/// Bind the session to `user`, rotating the session id first.
pub async fn establish(session: &Session, user: &UserInfo) -> Result<()> {
    session.cycle_id().await.map_err(session_error)?;
    session
        .insert(SESSION_USER_KEY, user)
        .await
        .map_err(session_error)?;
    Ok(())
}

/// The user bound to this session, if any.
pub async fn current_user(session: &Session) -> Result<Option<UserInfo>> {
    session.get(SESSION_USER_KEY).await.map_err(session_error)
}

/// Drop the session from the store and expire the cookie.
pub async fn end(session: &Session) -> Result<()> {
    session.flush().await.map_err(session_error)
}

pub async fn set_flash(session: &Session, message: impl Into<String>) -> Result<()> {
    session
        .insert(SESSION_FLASH_KEY, message.into())
        .await
        .map_err(session_error)
}

/// Remove and return the pending flash message.
pub async fn take_flash(session: &Session) -> Result<Option<String>> {
    session.remove(SESSION_FLASH_KEY).await.map_err(session_error)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use tower_sessions::MemoryStore;
    use uuid::Uuid;

    use super::*;

    fn session() -> Session {
        Session::new(None, Arc::new(MemoryStore::default()), None)
    }

    fn alice() -> UserInfo {
        UserInfo {
            id: Uuid::new_v4(),
            username: "alice".to_string(),
        }
    }

    #[tokio::test]
    async fn test_establish_and_end() {
        let session = session();
        assert_eq!(current_user(&session).await.unwrap(), None);

        let user = alice();
        establish(&session, &user).await.unwrap();
        assert_eq!(current_user(&session).await.unwrap(), Some(user));

        end(&session).await.unwrap();
        assert_eq!(current_user(&session).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_flash_is_one_shot() {
        let session = session();
        set_flash(&session, "Note saved").await.unwrap();

        assert_eq!(
            take_flash(&session).await.unwrap().as_deref(),
            Some("Note saved")
        );
        assert_eq!(take_flash(&session).await.unwrap(), None);
    }
}
