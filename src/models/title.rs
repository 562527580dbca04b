//! Title (book) model and related types

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use super::author::Author;

/// Default subject assigned when none is provided at creation
pub const DEFAULT_SUBJECT: &str = "uncategorized";

/// Title row from database (authors joined separately)
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Title {
    pub id: i32,
    pub isbn: String,
    pub title: String,
    pub year_published: i16,
    pub publisher_id: i32,
    pub description: String,
    pub notes: Option<String>,
    pub subject: String,
    pub comments: Option<String>,
    /// Path to the stored cover image, relative to the media directory
    pub cover_image: Option<String>,
}

/// Title with its authors resolved through the many-to-many relation
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TitleDetails {
    #[serde(flatten)]
    pub title: Title,
    pub authors: Vec<Author>,
}

/// Create title request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateTitle {
    #[validate(length(min = 1, max = 20, message = "ISBN must be 1-20 characters"))]
    pub isbn: String,
    #[validate(length(min = 1, max = 255, message = "Title must be 1-255 characters"))]
    pub title: String,
    pub year_published: i16,
    pub publisher_id: i32,
    #[serde(default)]
    pub description: String,
    pub notes: Option<String>,
    pub subject: Option<String>,
    pub comments: Option<String>,
    /// Author ids to attach
    #[serde(default)]
    pub author_ids: Vec<i32>,
}

/// Update title request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateTitle {
    #[validate(length(min = 1, max = 20, message = "ISBN must be 1-20 characters"))]
    pub isbn: Option<String>,
    #[validate(length(min = 1, max = 255, message = "Title must be 1-255 characters"))]
    pub title: Option<String>,
    pub year_published: Option<i16>,
    pub publisher_id: Option<i32>,
    pub description: Option<String>,
    pub notes: Option<String>,
    pub subject: Option<String>,
    pub comments: Option<String>,
    /// Replaces the attached author set when present
    pub author_ids: Option<Vec<i32>>,
}
