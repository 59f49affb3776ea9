//! Local username + password accounts.

use crate::auth::password;
use crate::error::{AppError, Result};
use crate::models::{NewUser, UserInfo};
use crate::AppContext;

pub const USERNAME_MIN_LEN: usize = 3;
pub const USERNAME_MAX_LEN: usize = 32;
pub const PASSWORD_MIN_LEN: usize = 8;
pub const PASSWORD_MAX_LEN: usize = 128;

/// Usernames are matched case-insensitively and stored trimmed and lowercased.
pub fn normalize_username(username: &str) -> String {
    username.trim().to_lowercase()
}

fn validate_username(username: &str) -> Result<()> {
    let len = username.chars().count();
    if !(USERNAME_MIN_LEN..=USERNAME_MAX_LEN).contains(&len) {
        return Err(AppError::validation(format!(
            "Username must be {USERNAME_MIN_LEN} to {USERNAME_MAX_LEN} characters"
        )));
    }
    if !username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
    {
        return Err(AppError::validation(
            "Username may only contain letters, digits, '.', '_' and '-'",
        ));
    }
    Ok(())
}

fn validate_password(password: &str) -> Result<()> {
    let len = password.chars().count();
    if len < PASSWORD_MIN_LEN {
        return Err(AppError::validation(format!(
            "Password must be at least {PASSWORD_MIN_LEN} characters"
        )));
    }
    if len > PASSWORD_MAX_LEN {
        return Err(AppError::validation(format!(
            "Password must be at most {PASSWORD_MAX_LEN} characters"
        )));
    }
    Ok(())
}

/// Create an account. The caller establishes the session.
pub async fn register(ctx: &AppContext, username: &str, password: &str) -> Result<UserInfo> {
    let username = normalize_username(username);
    validate_username(&username)?;
    validate_password(password)?;

    if ctx.repo.find_user_by_username(&username).await?.is_some() {
        return Err(AppError::DuplicateUser);
    }

    let password_hash = password::hash_password_blocking(password.to_string()).await?;
    let user = ctx
        .repo
        .insert_user(NewUser {
            username,
            password_hash,
        })
        .await?;

    tracing::info!(user_id = %user.id, username = %user.username, "user registered");
    Ok(user.to_info())
}

/// Check credentials. Unknown users and wrong passwords are indistinguishable.
pub async fn login(ctx: &AppContext, username: &str, password: &str) -> Result<UserInfo> {
    let username = normalize_username(username);

    let Some(user) = ctx.repo.find_user_by_username(&username).await? else {
        tracing::info!(username = %username, "login failed: unknown user");
        return Err(AppError::InvalidCredentials);
    };

    let valid =
        password::verify_password_blocking(password.to_string(), user.password_hash.clone())
            .await?;
    if !valid {
        tracing::info!(user_id = %user.id, "login failed: wrong password");
        return Err(AppError::InvalidCredentials);
    }

    tracing::info!(user_id = %user.id, "user logged in");
    Ok(user.to_info())
}
