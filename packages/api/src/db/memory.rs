use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;
use uuid::Uuid;

use super::{FileRepository, NoteRepository, Repository, UserRepository};
use crate::error::{AppError, Result};
use crate::models::{FileRef, NewFileRef, NewUser, Note, NoteInput, User};

#[derive(Debug, Default)]
struct Tables {
    users: HashMap<Uuid, User>,
    /// Notes with the write sequence number, which breaks `updated_at` ties.
    notes: HashMap<Uuid, (u64, Note)>,
    files: HashMap<Uuid, (u64, FileRef)>,
    seq: u64,
}

impl Tables {
    fn next_seq(&mut self) -> u64 {
        self.seq += 1;
        self.seq
    }
}

/// In-memory repository for tests and local runs without PostgreSQL.
#[derive(Clone, Debug, Default)]
pub struct MemoryRepository {
    tables: Arc<Mutex<Tables>>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for MemoryRepository {
    async fn insert_user(&self, user: NewUser) -> Result<User> {
        let mut tables = self.tables.lock().await;
        if tables.users.values().any(|u| u.username == user.username) {
            return Err(AppError::DuplicateUser);
        }
        let user = User {
            id: Uuid::new_v4(),
            username: user.username,
            password_hash: user.password_hash,
            created_at: Utc::now(),
        };
        tables.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>> {
        let tables = self.tables.lock().await;
        Ok(tables
            .users
            .values()
            .find(|u| u.username == username)
            .cloned())
    }
}

#[async_trait]
impl NoteRepository for MemoryRepository {
    async fn insert_note(&self, user_id: Uuid, input: &NoteInput) -> Result<Note> {
        let mut tables = self.tables.lock().await;
        let note = Note {
            id: Uuid::new_v4(),
            user_id,
            title: input.title.clone(),
            body: input.body.clone(),
            updated_at: Utc::now(),
        };
        let seq = tables.next_seq();
        tables.notes.insert(note.id, (seq, note.clone()));
        Ok(note)
    }

    async fn find_note(&self, id: Uuid) -> Result<Option<Note>> {
        let tables = self.tables.lock().await;
        Ok(tables.notes.get(&id).map(|(_, note)| note.clone()))
    }

    async fn update_note(
        &self,
        id: Uuid,
        user_id: Uuid,
        input: &NoteInput,
    ) -> Result<Option<Note>> {
        let mut tables = self.tables.lock().await;
        let seq = tables.next_seq();
        let Some(entry) = tables
            .notes
            .get_mut(&id)
            .filter(|(_, note)| note.user_id == user_id)
        else {
            return Ok(None);
        };
        entry.0 = seq;
        entry.1.title = input.title.clone();
        entry.1.body = input.body.clone();
        entry.1.updated_at = Utc::now();
        Ok(Some(entry.1.clone()))
    }

    async fn delete_note(&self, id: Uuid, user_id: Uuid) -> Result<bool> {
        let mut tables = self.tables.lock().await;
        let owned = matches!(tables.notes.get(&id), Some((_, note)) if note.user_id == user_id);
        if owned {
            tables.notes.remove(&id);
        }
        Ok(owned)
    }

    async fn list_notes(&self, user_id: Uuid) -> Result<Vec<Note>> {
        let tables = self.tables.lock().await;
        let mut notes: Vec<_> = tables
            .notes
            .values()
            .filter(|(_, note)| note.user_id == user_id)
            .collect();
        notes.sort_by(|(a_seq, a), (b_seq, b)| {
            b.updated_at.cmp(&a.updated_at).then(b_seq.cmp(a_seq))
        });
        Ok(notes.into_iter().map(|(_, note)| note.clone()).collect())
    }
}

#[async_trait]
impl FileRepository for MemoryRepository {
    async fn insert_file(&self, file: NewFileRef) -> Result<FileRef> {
        let mut tables = self.tables.lock().await;
        if tables
            .files
            .values()
            .any(|(_, f)| f.storage_key == file.storage_key)
        {
            return Err(AppError::validation("this upload has already been recorded"));
        }
        let file = FileRef {
            id: Uuid::new_v4(),
            user_id: file.user_id,
            storage_key: file.storage_key,
            filename: file.filename,
            size_bytes: file.size_bytes,
            uploaded_at: Utc::now(),
        };
        let seq = tables.next_seq();
        tables.files.insert(file.id, (seq, file.clone()));
        Ok(file)
    }

    async fn find_file(&self, id: Uuid) -> Result<Option<FileRef>> {
        let tables = self.tables.lock().await;
        Ok(tables.files.get(&id).map(|(_, file)| file.clone()))
    }

    async fn find_file_by_key(&self, storage_key: &str) -> Result<Option<FileRef>> {
        let tables = self.tables.lock().await;
        Ok(tables
            .files
            .values()
            .find(|(_, f)| f.storage_key == storage_key)
            .map(|(_, file)| file.clone()))
    }

    async fn delete_file(&self, id: Uuid, user_id: Uuid) -> Result<bool> {
        let mut tables = self.tables.lock().await;
        let owned = matches!(tables.files.get(&id), Some((_, file)) if file.user_id == user_id);
        if owned {
            tables.files.remove(&id);
        }
        Ok(owned)
    }

    async fn list_files(&self, user_id: Uuid) -> Result<Vec<FileRef>> {
        let tables = self.tables.lock().await;
        let mut files: Vec<_> = tables
            .files
            .values()
            .filter(|(_, file)| file.user_id == user_id)
            .collect();
        files.sort_by(|(a_seq, a), (b_seq, b)| {
            b.uploaded_at.cmp(&a.uploaded_at).then(b_seq.cmp(a_seq))
        });
        Ok(files.into_iter().map(|(_, file)| file.clone()).collect())
    }
}

#[async_trait]
impl Repository for MemoryRepository {
    async fn ping(&self) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_user(name: &str) -> NewUser {
        NewUser {
            username: name.to_string(),
            password_hash: "hash".to_string(),
        }
    }

    fn input(title: &str) -> NoteInput {
        NoteInput {
            title: title.to_string(),
            body: String::new(),
        }
    }

    #[tokio::test]
    async fn test_duplicate_username() {
        let repo = MemoryRepository::new();
        repo.insert_user(new_user("alice")).await.unwrap();

        let err = repo.insert_user(new_user("alice")).await.unwrap_err();
        assert!(matches!(err, AppError::DuplicateUser));
    }

    #[tokio::test]
    async fn test_notes_listed_most_recent_first() {
        let repo = MemoryRepository::new();
        let user = repo.insert_user(new_user("alice")).await.unwrap();

        let first = repo.insert_note(user.id, &input("first")).await.unwrap();
        repo.insert_note(user.id, &input("second")).await.unwrap();
        repo.update_note(first.id, user.id, &input("first, edited"))
            .await
            .unwrap()
            .unwrap();

        let titles: Vec<_> = repo
            .list_notes(user.id)
            .await
            .unwrap()
            .into_iter()
            .map(|n| n.title)
            .collect();
        assert_eq!(titles, vec!["first, edited", "second"]);
    }

    #[tokio::test]
    async fn test_writes_scoped_to_owner() {
        let repo = MemoryRepository::new();
        let alice = repo.insert_user(new_user("alice")).await.unwrap();
        let bob = repo.insert_user(new_user("bob")).await.unwrap();
        let note = repo.insert_note(alice.id, &input("mine")).await.unwrap();

        assert!(repo
            .update_note(note.id, bob.id, &input("stolen"))
            .await
            .unwrap()
            .is_none());
        assert!(!repo.delete_note(note.id, bob.id).await.unwrap());
        assert!(repo.list_notes(bob.id).await.unwrap().is_empty());
        assert_eq!(repo.find_note(note.id).await.unwrap().unwrap().title, "mine");
    }

    #[tokio::test]
    async fn test_file_keys_unique() {
        let repo = MemoryRepository::new();
        let alice = repo.insert_user(new_user("alice")).await.unwrap();
        let file = NewFileRef {
            user_id: alice.id,
            storage_key: format!("{}/u1/a.txt", alice.id),
            filename: "a.txt".to_string(),
            size_bytes: 3,
        };

        repo.insert_file(file.clone()).await.unwrap();
        assert!(repo.insert_file(file).await.is_err());
    }
}
