//! Data models for the application.

mod file;
mod note;
mod user;

pub use file::{FileRef, NewFileRef, UploadConfirmation, UploadRequest, UploadTicket};
pub use note::{Note, NoteInput};
pub use user::{NewUser, User, UserInfo};
