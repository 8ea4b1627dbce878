//! Repository layer for book persistence
//!
//! Every [`BookStore`] must implement `delete`, `take_book` and `return_book`
//! as a single atomic conditional write: the record is mutated only if it
//! still has the expected status, and the call fails with
//! [`AppError::Conflict`](crate::error::AppError::Conflict) otherwise.
//! No read-then-write sequences are allowed for these three operations.

pub mod books;
pub mod memory;

use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::book::{Book, BookDraft, BookFilter},
};

pub use books::BooksRepository;
pub use memory::MemoryBookStore;

pub(crate) const NOT_AVAILABLE: &str = "book not found or not available";
pub(crate) const NOT_TAKEN: &str = "book not found or not taken";

/// Persistence gateway for book records
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BookStore: Send + Sync {
    /// Insert a new available book; assigns id and timestamps
    async fn create(&self, draft: &BookDraft) -> AppResult<Book>;

    /// Fetch a book by id
    async fn get_by_id(&self, id: Uuid) -> AppResult<Book>;

    /// List books matching every present filter key, in creation order
    async fn list(&self, filter: &BookFilter) -> AppResult<Vec<Book>>;

    /// Overwrite descriptive fields; status and taken_by are untouched
    async fn update(&self, id: Uuid, draft: &BookDraft) -> AppResult<Book>;

    /// Delete a book only if it is available
    async fn delete(&self, id: Uuid) -> AppResult<()>;

    /// Mark an available book as taken by `email`
    async fn take_book(&self, id: Uuid, email: &str) -> AppResult<Book>;

    /// Mark a taken book as available again
    async fn return_book(&self, id: Uuid) -> AppResult<Book>;

    /// Check that the backing store is reachable
    async fn ping(&self) -> AppResult<()>;
}

pub(crate) fn not_found(id: Uuid) -> crate::error::AppError {
    crate::error::AppError::NotFound(format!("Book {} not found", id))
}
