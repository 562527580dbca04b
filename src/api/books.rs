//! Book (title) endpoints: public catalogue reads, staff writes, reservation

use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::{
        reservation::ReservationDetails,
        title::{CreateTitle, TitleDetails, UpdateTitle},
    },
};

use super::{AuthenticatedUser, MaybeUser};

/// Book listing with the caller's actively reserved subset
#[derive(Serialize, ToSchema)]
pub struct BooksResponse {
    pub books: Vec<TitleDetails>,
    pub reserved_books_by_user: Vec<TitleDetails>,
}

#[derive(Serialize, ToSchema)]
pub struct CoverResponse {
    /// Stored cover path, relative to the media directory
    pub cover_image: String,
}

/// List all titles plus the caller's active reservations
#[utoipa::path(
    get,
    path = "/books",
    tag = "books",
    responses(
        (status = 200, description = "All titles and the caller's reserved subset", body = BooksResponse)
    )
)]
pub async fn list_books(
    State(state): State<crate::AppState>,
    MaybeUser(claims): MaybeUser,
) -> AppResult<Json<BooksResponse>> {
    let viewer = claims.map(|c| c.user_id);
    let (books, reserved_books_by_user) = state.services.catalog.list_books_for(viewer).await?;

    Ok(Json(BooksResponse {
        books,
        reserved_books_by_user,
    }))
}

/// Title detail with authors
#[utoipa::path(
    get,
    path = "/books/{id}",
    tag = "books",
    params(("id" = i32, Path, description = "Title ID")),
    responses(
        (status = 200, description = "Title detail", body = TitleDetails),
        (status = 404, description = "Title not found")
    )
)]
pub async fn get_book(
    State(state): State<crate::AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<TitleDetails>> {
    let book = state.services.catalog.get_title(id).await?;
    Ok(Json(book))
}

/// Create a title (staff only)
#[utoipa::path(
    post,
    path = "/books",
    tag = "books",
    security(("bearer_auth" = [])),
    request_body = CreateTitle,
    responses(
        (status = 201, description = "Title created", body = TitleDetails),
        (status = 400, description = "Invalid input or duplicate ISBN"),
        (status = 403, description = "Staff privileges required")
    )
)]
pub async fn create_book(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(title): Json<CreateTitle>,
) -> AppResult<(StatusCode, Json<TitleDetails>)> {
    claims.require_staff()?;
    title
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let created = state.services.catalog.create_title(title).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Update a title (staff only)
#[utoipa::path(
    put,
    path = "/books/{id}",
    tag = "books",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Title ID")),
    request_body = UpdateTitle,
    responses(
        (status = 200, description = "Title updated", body = TitleDetails),
        (status = 403, description = "Staff privileges required"),
        (status = 404, description = "Title not found")
    )
)]
pub async fn update_book(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
    Json(title): Json<UpdateTitle>,
) -> AppResult<Json<TitleDetails>> {
    claims.require_staff()?;
    title
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let updated = state.services.catalog.update_title(id, title).await?;
    Ok(Json(updated))
}

/// Delete a title (staff only)
#[utoipa::path(
    delete,
    path = "/books/{id}",
    tag = "books",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Title ID")),
    responses(
        (status = 204, description = "Title deleted"),
        (status = 403, description = "Staff privileges required"),
        (status = 404, description = "Title not found")
    )
)]
pub async fn delete_book(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    claims.require_staff()?;

    state.services.catalog.delete_title(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Reserve a title for the caller
#[utoipa::path(
    post,
    path = "/books/{id}/reserver",
    tag = "books",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Title ID")),
    responses(
        (status = 201, description = "Reservation created", body = ReservationDetails),
        (status = 400, description = "Title already reserved or quota reached"),
        (status = 401, description = "Not authenticated"),
        (status = 404, description = "Title not found")
    )
)]
pub async fn reserve_book(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<(StatusCode, Json<ReservationDetails>)> {
    let reservation = state
        .services
        .reservations
        .reserve(claims.user_id, id)
        .await?;
    Ok((StatusCode::CREATED, Json(reservation)))
}

/// Upload a cover image for a title (staff only)
#[utoipa::path(
    post,
    path = "/books/{id}/cover",
    tag = "books",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Title ID")),
    responses(
        (status = 200, description = "Cover stored", body = CoverResponse),
        (status = 400, description = "Missing or empty cover field"),
        (status = 403, description = "Staff privileges required"),
        (status = 404, description = "Title not found")
    )
)]
pub async fn upload_cover(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
    mut multipart: Multipart,
) -> AppResult<Json<CoverResponse>> {
    claims.require_staff()?;
    state.services.catalog.get_title(id).await?;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Invalid multipart payload: {}", e)))?
    {
        if field.name() != Some("cover") {
            continue;
        }

        let filename = field
            .file_name()
            .map(sanitize_filename)
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| "cover.jpg".to_string());
        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(format!("Failed to read upload: {}", e)))?;

        if data.is_empty() {
            return Err(AppError::Validation("Cover file is empty".to_string()));
        }

        let stored = format!("{}_{}", id, filename);
        let dir = &state.config.media.cover_dir;
        tokio::fs::create_dir_all(dir)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to create media dir: {}", e)))?;
        tokio::fs::write(format!("{}/{}", dir, stored), &data)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to store cover: {}", e)))?;

        state.services.catalog.set_cover(id, &stored).await?;

        return Ok(Json(CoverResponse { cover_image: stored }));
    }

    Err(AppError::Validation(
        "Multipart field 'cover' is required".to_string(),
    ))
}

fn sanitize_filename(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_'))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filenames_are_sanitized() {
        assert_eq!(sanitize_filename("../etc/passwd"), "..etcpasswd");
        assert_eq!(sanitize_filename("cover image.png"), "coverimage.png");
        assert_eq!(sanitize_filename("ok-1_2.jpg"), "ok-1_2.jpg");
    }
}
