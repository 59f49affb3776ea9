//! The landing page of a logged-in user: their notes and their files.

use crate::error::Result;
use crate::models::{FileRef, Note, UserInfo};
use crate::{files, notes, AppContext};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dashboard {
    /// Most recently updated first.
    pub notes: Vec<Note>,
    /// Most recently uploaded first.
    pub files: Vec<FileRef>,
}

pub async fn load(ctx: &AppContext, user: &UserInfo) -> Result<Dashboard> {
    let (notes, files) = tokio::try_join!(notes::list(ctx, user), files::list(ctx, user))?;
    Ok(Dashboard { notes, files })
}
