//! PostgreSQL book repository

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Pool, Postgres, QueryBuilder};
use uuid::Uuid;

use super::{not_found, BookStore, NOT_AVAILABLE, NOT_TAKEN};
use crate::{
    error::{AppError, AppResult},
    models::book::{Book, BookDraft, BookFilter, BookRow},
};

const BOOK_COLUMNS: &str =
    "id, title, author, published, pages, status, taken_by, created_at, updated_at";

#[derive(Clone)]
pub struct BooksRepository {
    pool: Pool<Postgres>,
}

impl BooksRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

/// Escape LIKE metacharacters so the needle matches literally
fn escape_like(needle: &str) -> String {
    let mut escaped = String::with_capacity(needle.len());
    for c in needle.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Build the list query; placeholders are numbered by the builder as binds are pushed
fn list_query(filter: &BookFilter) -> QueryBuilder<'static, Postgres> {
    let mut builder = QueryBuilder::new(format!("SELECT {} FROM books WHERE 1=1", BOOK_COLUMNS));

    if let Some(status) = filter.status {
        builder.push(" AND status = ").push_bind(status.as_str());
    }

    if let Some(author) = filter.author_needle() {
        builder
            .push(" AND author ILIKE ")
            .push_bind(format!("%{}%", escape_like(author)));
    }

    builder.push(" ORDER BY created_at, id");
    builder
}

#[async_trait]
impl BookStore for BooksRepository {
    async fn create(&self, draft: &BookDraft) -> AppResult<Book> {
        let now = Utc::now();
        let row = sqlx::query_as::<_, BookRow>(&format!(
            r#"
            INSERT INTO books (id, title, author, published, pages, status, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, 'available', $6, $6)
            RETURNING {}
            "#,
            BOOK_COLUMNS
        ))
        .bind(Uuid::new_v4())
        .bind(&draft.title)
        .bind(&draft.author)
        .bind(draft.published)
        .bind(draft.pages)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        row.try_into()
    }

    async fn get_by_id(&self, id: Uuid) -> AppResult<Book> {
        sqlx::query_as::<_, BookRow>(&format!("SELECT {} FROM books WHERE id = $1", BOOK_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| not_found(id))?
            .try_into()
    }

    async fn list(&self, filter: &BookFilter) -> AppResult<Vec<Book>> {
        let rows = list_query(filter)
            .build_query_as::<BookRow>()
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(Book::try_from).collect()
    }

    async fn update(&self, id: Uuid, draft: &BookDraft) -> AppResult<Book> {
        sqlx::query_as::<_, BookRow>(&format!(
            r#"
            UPDATE books
            SET title = $1, author = $2, published = $3, pages = $4, updated_at = $5
            WHERE id = $6
            RETURNING {}
            "#,
            BOOK_COLUMNS
        ))
        .bind(&draft.title)
        .bind(&draft.author)
        .bind(draft.published)
        .bind(draft.pages)
        .bind(Utc::now())
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| not_found(id))?
        .try_into()
    }

    async fn delete(&self, id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM books WHERE id = $1 AND status = 'available'")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() != 1 {
            return Err(AppError::Conflict(NOT_AVAILABLE.to_string()));
        }
        Ok(())
    }

    async fn take_book(&self, id: Uuid, email: &str) -> AppResult<Book> {
        sqlx::query_as::<_, BookRow>(&format!(
            r#"
            UPDATE books
            SET status = 'taken', taken_by = $1, updated_at = $2
            WHERE id = $3 AND status = 'available'
            RETURNING {}
            "#,
            BOOK_COLUMNS
        ))
        .bind(email)
        .bind(Utc::now())
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::Conflict(NOT_AVAILABLE.to_string()))?
        .try_into()
    }

    async fn return_book(&self, id: Uuid) -> AppResult<Book> {
        sqlx::query_as::<_, BookRow>(&format!(
            r#"
            UPDATE books
            SET status = 'available', taken_by = NULL, updated_at = $1
            WHERE id = $2 AND status = 'taken'
            RETURNING {}
            "#,
            BOOK_COLUMNS
        ))
        .bind(Utc::now())
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::Conflict(NOT_TAKEN.to_string()))?
        .try_into()
    }

    async fn ping(&self) -> AppResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
