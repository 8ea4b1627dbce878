//! Book model and related types

use chrono::{DateTime, Utc};
use serde::{de, Deserialize, Deserializer, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::error::AppError;

/// Lending status of a book
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum BookStatus {
    Available,
    Taken,
}

impl BookStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookStatus::Available => "available",
            BookStatus::Taken => "taken",
        }
    }
}

impl std::fmt::Display for BookStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for BookStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "available" => Ok(BookStatus::Available),
            "taken" => Ok(BookStatus::Taken),
            other => Err(AppError::Internal(format!("Unknown book status '{}'", other))),
        }
    }
}

/// Book record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Book {
    pub id: Uuid,
    pub title: String,
    pub author: String,
    /// Year of publication
    pub published: i32,
    pub pages: i32,
    pub status: BookStatus,
    /// Email of the reader holding the book; set only while taken
    pub taken_by: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Book {
    /// Descriptive fields of this book
    pub fn draft(&self) -> BookDraft {
        BookDraft {
            title: self.title.clone(),
            author: self.author.clone(),
            published: self.published,
            pages: self.pages,
        }
    }
}

/// Row shape of the `books` table
#[derive(Debug, FromRow)]
pub(crate) struct BookRow {
    pub id: Uuid,
    pub title: String,
    pub author: String,
    pub published: i32,
    pub pages: i32,
    pub status: String,
    pub taken_by: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<BookRow> for Book {
    type Error = AppError;

    fn try_from(row: BookRow) -> Result<Self, Self::Error> {
        Ok(Book {
            id: row.id,
            title: row.title,
            author: row.author,
            published: row.published,
            pages: row.pages,
            status: row.status.parse()?,
            taken_by: row.taken_by,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Descriptive fields of a book, as supplied on creation
///
/// Missing fields fall back to empty or zero so validation reports them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct BookDraft {
    pub title: String,
    pub author: String,
    pub published: i32,
    pub pages: i32,
}

/// Update book request; absent fields keep their current value
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct UpdateBook {
    pub title: Option<String>,
    pub author: Option<String>,
    pub published: Option<i32>,
    pub pages: Option<i32>,
}

impl UpdateBook {
    /// Apply this patch on top of an existing draft
    pub fn merge_into(self, mut draft: BookDraft) -> BookDraft {
        if let Some(title) = self.title {
            draft.title = title;
        }
        if let Some(author) = self.author {
            draft.author = author;
        }
        if let Some(published) = self.published {
            draft.published = published;
        }
        if let Some(pages) = self.pages {
            draft.pages = pages;
        }
        draft
    }
}

/// Book list filters
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct BookFilter {
    /// Exact status match
    #[serde(default, deserialize_with = "empty_as_none")]
    pub status: Option<BookStatus>,
    /// Case-insensitive substring of the author name
    pub author: Option<String>,
}

impl BookFilter {
    /// Author needle, if it constrains anything
    pub fn author_needle(&self) -> Option<&str> {
        self.author.as_deref().filter(|a| !a.is_empty())
    }
}

/// `?status=` with no value imposes no constraint
fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<BookStatus>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    match raw.as_deref() {
        None | Some("") => Ok(None),
        Some(value) => value
            .parse::<BookStatus>()
            .map(Some)
            .map_err(|_| de::Error::custom(format!("unknown status `{}`", value))),
    }
}

/// Take book request
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(default)]
pub struct TakeBookRequest {
    /// Email of the reader taking the book
    pub email: String,
}
