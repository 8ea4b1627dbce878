//! In-process book store
//!
//! Conditional writes are compare-and-swap operations performed under a
//! single write guard, so they are as atomic as the SQL statements of
//! [`BooksRepository`](super::BooksRepository).

use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use chrono::Utc;
use indexmap::IndexMap;
use uuid::Uuid;

use super::{not_found, BookStore, NOT_AVAILABLE, NOT_TAKEN};
use crate::{
    error::{AppError, AppResult},
    models::book::{Book, BookDraft, BookFilter, BookStatus},
};

/// Insertion-ordered map of books behind a lock
#[derive(Default)]
pub struct MemoryBookStore {
    books: RwLock<IndexMap<Uuid, Book>>,
}

impl MemoryBookStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> AppResult<RwLockReadGuard<'_, IndexMap<Uuid, Book>>> {
        self.books
            .read()
            .map_err(|_| AppError::Internal("book store lock poisoned".to_string()))
    }

    fn write(&self) -> AppResult<RwLockWriteGuard<'_, IndexMap<Uuid, Book>>> {
        self.books
            .write()
            .map_err(|_| AppError::Internal("book store lock poisoned".to_string()))
    }

    /// Apply `mutate` to the book only if it currently has `expected` status
    fn transition(
        &self,
        id: Uuid,
        expected: BookStatus,
        conflict: &str,
        mutate: impl FnOnce(&mut Book),
    ) -> AppResult<Book> {
        let mut books = self.write()?;
        match books.get_mut(&id) {
            Some(book) if book.status == expected => {
                mutate(book);
                book.updated_at = Utc::now();
                Ok(book.clone())
            }
            _ => Err(AppError::Conflict(conflict.to_string())),
        }
    }
}

fn matches_filter(book: &Book, filter: &BookFilter) -> bool {
    if let Some(status) = filter.status {
        if book.status != status {
            return false;
        }
    }
    if let Some(needle) = filter.author_needle() {
        if !book.author.to_lowercase().contains(&needle.to_lowercase()) {
            return false;
        }
    }
    true
}

#[async_trait]
impl BookStore for MemoryBookStore {
    async fn create(&self, draft: &BookDraft) -> AppResult<Book> {
        let now = Utc::now();
        let book = Book {
            id: Uuid::new_v4(),
            title: draft.title.clone(),
            author: draft.author.clone(),
            published: draft.published,
            pages: draft.pages,
            status: BookStatus::Available,
            taken_by: None,
            created_at: now,
            updated_at: now,
        };
        self.write()?.insert(book.id, book.clone());
        Ok(book)
    }

    async fn get_by_id(&self, id: Uuid) -> AppResult<Book> {
        self.read()?.get(&id).cloned().ok_or_else(|| not_found(id))
    }

    async fn list(&self, filter: &BookFilter) -> AppResult<Vec<Book>> {
        Ok(self
            .read()?
            .values()
            .filter(|book| matches_filter(book, filter))
            .cloned()
            .collect())
    }

    async fn update(&self, id: Uuid, draft: &BookDraft) -> AppResult<Book> {
        let mut books = self.write()?;
        let book = books.get_mut(&id).ok_or_else(|| not_found(id))?;
        book.title = draft.title.clone();
        book.author = draft.author.clone();
        book.published = draft.published;
        book.pages = draft.pages;
        book.updated_at = Utc::now();
        Ok(book.clone())
    }

    async fn delete(&self, id: Uuid) -> AppResult<()> {
        let mut books = self.write()?;
        let available =
            matches!(books.get(&id), Some(book) if book.status == BookStatus::Available);
        if !available {
            return Err(AppError::Conflict(NOT_AVAILABLE.to_string()));
        }
        // shift_remove keeps the remaining books in creation order
        books.shift_remove(&id);
        Ok(())
    }

    async fn take_book(&self, id: Uuid, email: &str) -> AppResult<Book> {
        self.transition(id, BookStatus::Available, NOT_AVAILABLE, |book| {
            book.status = BookStatus::Taken;
            book.taken_by = Some(email.to_string());
        })
    }

    async fn return_book(&self, id: Uuid) -> AppResult<Book> {
        self.transition(id, BookStatus::Taken, NOT_TAKEN, |book| {
            book.status = BookStatus::Available;
            book.taken_by = None;
        })
    }

    async fn ping(&self) -> AppResult<()> {
        self.read().map(|_| ())
    }
}
