//! Book lending service
//!
//! Validates caller input and lifecycle legality, then hands off to the
//! configured [`BookStore`]. Storage `NotFound`/`Conflict` errors are passed
//! through unchanged.

use std::sync::Arc;

use chrono::{Datelike, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::book::{Book, BookDraft, BookFilter, UpdateBook},
    repository::BookStore,
};

static EMAIL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").expect("valid email regex")
});

/// Check an email against the accepted `local@domain.tld` syntax
pub fn is_valid_email(email: &str) -> bool {
    EMAIL_REGEX.is_match(email)
}

/// Validate descriptive fields, reporting the first violated rule.
///
/// Whitespace-only title or author counts as missing; values are stored as given.
pub fn validate_draft(draft: &BookDraft, current_year: i32) -> AppResult<()> {
    if draft.title.trim().is_empty() {
        return Err(AppError::Validation("title required".to_string()));
    }
    if draft.author.trim().is_empty() {
        return Err(AppError::Validation("author required".to_string()));
    }
    if draft.published <= 0 {
        return Err(AppError::Validation("published year must be positive".to_string()));
    }
    if draft.published > current_year {
        return Err(AppError::Validation(
            "published year cannot be in the future".to_string(),
        ));
    }
    if draft.pages <= 0 {
        return Err(AppError::Validation("pages must be positive".to_string()));
    }
    Ok(())
}

#[derive(Clone)]
pub struct BooksService {
    store: Arc<dyn BookStore>,
}

impl BooksService {
    pub fn new(store: Arc<dyn BookStore>) -> Self {
        Self { store }
    }

    /// Create a new available book
    pub async fn create(&self, draft: BookDraft) -> AppResult<Book> {
        validate_draft(&draft, Utc::now().year())?;
        let book = self.store.create(&draft).await?;
        tracing::info!(book_id = %book.id, title = %book.title, "Book created");
        Ok(book)
    }

    /// Get book by ID
    pub async fn get_by_id(&self, id: Uuid) -> AppResult<Book> {
        self.store.get_by_id(id).await
    }

    /// List books matching the filter
    pub async fn list(&self, filter: &BookFilter) -> AppResult<Vec<Book>> {
        let books = self.store.list(filter).await?;
        tracing::debug!(count = books.len(), ?filter, "Listed books");
        Ok(books)
    }

    /// Update descriptive fields; the merged record is re-validated
    pub async fn update(&self, id: Uuid, patch: UpdateBook) -> AppResult<Book> {
        let current = self.store.get_by_id(id).await?;
        let draft = patch.merge_into(current.draft());
        validate_draft(&draft, Utc::now().year())?;
        let book = self.store.update(id, &draft).await?;
        tracing::info!(book_id = %id, "Book updated");
        Ok(book)
    }

    /// Delete a book; only available books can be deleted
    pub async fn delete(&self, id: Uuid) -> AppResult<()> {
        self.store.delete(id).await.map_err(|e| {
            if let AppError::Conflict(_) = e {
                tracing::warn!(book_id = %id, "Delete rejected");
            }
            e
        })?;
        tracing::info!(book_id = %id, "Book deleted");
        Ok(())
    }

    /// Lend an available book to the reader identified by `email`
    pub async fn take_book(&self, id: Uuid, email: &str) -> AppResult<Book> {
        if !is_valid_email(email) {
            return Err(AppError::Validation("invalid email format".to_string()));
        }
        let book = self.store.take_book(id, email).await.map_err(|e| {
            if let AppError::Conflict(_) = e {
                tracing::warn!(book_id = %id, "Take rejected");
            }
            e
        })?;
        tracing::info!(book_id = %id, "Book taken");
        Ok(book)
    }

    /// Return a taken book
    pub async fn return_book(&self, id: Uuid) -> AppResult<Book> {
        let book = self.store.return_book(id).await.map_err(|e| {
            if let AppError::Conflict(_) = e {
                tracing::warn!(book_id = %id, "Return rejected");
            }
            e
        })?;
        tracing::info!(book_id = %id, "Book returned");
        Ok(book)
    }

    /// Check storage connectivity
    pub async fn ping(&self) -> AppResult<()> {
        self.store.ping().await
    }
}
