//! Book catalog and lending endpoints

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::book::{Book, BookDraft, BookFilter, TakeBookRequest, UpdateBook},
};

use super::AdminAccess;

/// List books, optionally filtered by status and author
#[utoipa::path(
    get,
    path = "/books",
    tag = "books",
    params(BookFilter),
    responses(
        (status = 200, description = "Matching books", body = Vec<Book>),
        (status = 400, description = "Invalid filter", body = crate::error::ErrorResponse)
    )
)]
pub async fn list_books(
    State(state): State<crate::AppState>,
    query: Result<Query<BookFilter>, QueryRejection>,
) -> AppResult<Json<Vec<Book>>> {
    let Query(filter) = query?;
    let books = state.services.books.list(&filter).await?;
    Ok(Json(books))
}

/// Get book by ID
#[utoipa::path(
    get,
    path = "/books/{id}",
    tag = "books",
    params(("id" = Uuid, Path, description = "Book ID")),
    responses(
        (status = 200, description = "Book details", body = Book),
        (status = 404, description = "Book not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_book(
    State(state): State<crate::AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Book>> {
    let book = state.services.books.get_by_id(id).await?;
    Ok(Json(book))
}

/// Create a book
#[utoipa::path(
    post,
    path = "/books",
    tag = "books",
    security(("admin_secret" = [])),
    request_body = BookDraft,
    responses(
        (status = 201, description = "Book created", body = Book),
        (status = 400, description = "Invalid book data", body = crate::error::ErrorResponse),
        (status = 401, description = "Missing or wrong admin secret", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_book(
    State(state): State<crate::AppState>,
    _admin: AdminAccess,
    body: Result<Json<BookDraft>, JsonRejection>,
) -> AppResult<(StatusCode, Json<Book>)> {
    let Json(draft) = body?;
    let book = state.services.books.create(draft).await?;
    Ok((StatusCode::CREATED, Json(book)))
}

/// Update a book's descriptive fields
#[utoipa::path(
    put,
    path = "/books/{id}",
    tag = "books",
    security(("admin_secret" = [])),
    params(("id" = Uuid, Path, description = "Book ID")),
    request_body = UpdateBook,
    responses(
        (status = 200, description = "Book updated", body = Book),
        (status = 400, description = "Invalid book data", body = crate::error::ErrorResponse),
        (status = 401, description = "Missing or wrong admin secret", body = crate::error::ErrorResponse),
        (status = 404, description = "Book not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn update_book(
    State(state): State<crate::AppState>,
    _admin: AdminAccess,
    Path(id): Path<Uuid>,
    body: Result<Json<UpdateBook>, JsonRejection>,
) -> AppResult<Json<Book>> {
    let Json(patch) = body?;
    let book = state.services.books.update(id, patch).await?;
    Ok(Json(book))
}

/// Delete an available book
#[utoipa::path(
    delete,
    path = "/books/{id}",
    tag = "books",
    security(("admin_secret" = [])),
    params(("id" = Uuid, Path, description = "Book ID")),
    responses(
        (status = 204, description = "Book deleted"),
        (status = 401, description = "Missing or wrong admin secret", body = crate::error::ErrorResponse),
        (status = 409, description = "Book not found or not available", body = crate::error::ErrorResponse)
    )
)]
pub async fn delete_book(
    State(state): State<crate::AppState>,
    _admin: AdminAccess,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    state.services.books.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Take an available book
#[utoipa::path(
    post,
    path = "/books/{id}/take",
    tag = "lending",
    params(("id" = Uuid, Path, description = "Book ID")),
    request_body = TakeBookRequest,
    responses(
        (status = 200, description = "Book taken", body = Book),
        (status = 400, description = "Invalid email format", body = crate::error::ErrorResponse),
        (status = 409, description = "Book not found or not available", body = crate::error::ErrorResponse)
    )
)]
pub async fn take_book(
    State(state): State<crate::AppState>,
    Path(id): Path<Uuid>,
    body: Result<Json<TakeBookRequest>, JsonRejection>,
) -> AppResult<Json<Book>> {
    let Json(request) = body?;
    let book = state.services.books.take_book(id, &request.email).await?;
    Ok(Json(book))
}

/// Return a taken book
#[utoipa::path(
    post,
    path = "/books/{id}/return",
    tag = "lending",
    params(("id" = Uuid, Path, description = "Book ID")),
    responses(
        (status = 200, description = "Book returned", body = Book),
        (status = 409, description = "Book not found or not taken", body = crate::error::ErrorResponse)
    )
)]
pub async fn return_book(
    State(state): State<crate::AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Book>> {
    let book = state.services.books.return_book(id).await?;
    Ok(Json(book))
}
