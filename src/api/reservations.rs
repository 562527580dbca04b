//! Reservation endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    error::AppResult,
    models::reservation::{CreateReservation, ReservationDetails},
};

use super::AuthenticatedUser;

#[derive(Serialize, ToSchema)]
pub struct ReservationsResponse {
    pub reservations: Vec<ReservationDetails>,
}

#[derive(Serialize, ToSchema)]
pub struct CancelResponse {
    pub message: String,
}

/// The caller's reservations (read-through cached)
#[utoipa::path(
    get,
    path = "/my-reservations",
    tag = "reservations",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Caller's reservations", body = ReservationsResponse),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn my_reservations(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<ReservationsResponse>> {
    let reservations = state
        .services
        .reservations
        .list_for_user(claims.user_id)
        .await?;
    Ok(Json(ReservationsResponse { reservations }))
}

/// All reservations (staff only)
#[utoipa::path(
    get,
    path = "/reservations",
    tag = "reservations",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "All reservations", body = ReservationsResponse),
        (status = 403, description = "Staff privileges required")
    )
)]
pub async fn list_reservations(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<ReservationsResponse>> {
    claims.require_staff()?;

    let reservations = state.services.reservations.list_all().await?;
    Ok(Json(ReservationsResponse { reservations }))
}

/// Reservation detail (owner or staff)
#[utoipa::path(
    get,
    path = "/reservations/{id}",
    tag = "reservations",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Reservation ID")),
    responses(
        (status = 200, description = "Reservation detail", body = ReservationDetails),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Reservation not found")
    )
)]
pub async fn get_reservation(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<ReservationDetails>> {
    let reservation = state.services.reservations.get(id, &claims).await?;
    Ok(Json(reservation))
}

/// Reserve a title by id (same rules as the books reserve action)
#[utoipa::path(
    post,
    path = "/reservations",
    tag = "reservations",
    security(("bearer_auth" = [])),
    request_body = CreateReservation,
    responses(
        (status = 201, description = "Reservation created", body = ReservationDetails),
        (status = 400, description = "Title already reserved or quota reached"),
        (status = 401, description = "Not authenticated"),
        (status = 404, description = "Title not found")
    )
)]
pub async fn create_reservation(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(request): Json<CreateReservation>,
) -> AppResult<(StatusCode, Json<ReservationDetails>)> {
    let reservation = state
        .services
        .reservations
        .reserve(claims.user_id, request.title_id)
        .await?;
    Ok((StatusCode::CREATED, Json(reservation)))
}

/// Mark a reservation returned (owner or superuser)
#[utoipa::path(
    post,
    path = "/reservations/{id}/return",
    tag = "reservations",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Reservation ID")),
    responses(
        (status = 200, description = "Book returned", body = ReservationDetails),
        (status = 400, description = "Already returned"),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Reservation not found")
    )
)]
pub async fn return_reservation(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<ReservationDetails>> {
    let reservation = state.services.reservations.return_book(id, &claims).await?;
    Ok(Json(reservation))
}

/// Cancel a reservation (owner or superuser)
#[utoipa::path(
    delete,
    path = "/reservations/{id}",
    tag = "reservations",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Reservation ID")),
    responses(
        (status = 200, description = "Reservation cancelled", body = CancelResponse),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Reservation not found")
    )
)]
pub async fn cancel_reservation(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<CancelResponse>> {
    state.services.reservations.cancel(id, &claims).await?;
    Ok(Json(CancelResponse {
        message: "Reservation successfully canceled.".to_string(),
    }))
}
