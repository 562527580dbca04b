//! Reservation model and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

/// Maximum number of simultaneously active reservations per user
pub const MAX_ACTIVE_RESERVATIONS: i64 = 3;

/// Reservation row from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Reservation {
    pub id: i32,
    pub user_id: i32,
    pub title_id: i32,
    pub reserved_at: DateTime<Utc>,
    /// Unset while the reservation is active
    pub returned_at: Option<DateTime<Utc>>,
}

impl Reservation {
    pub fn is_active(&self) -> bool {
        self.returned_at.is_none()
    }
}

/// Reservation with the reserved title resolved for display
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct ReservationDetails {
    pub id: i32,
    pub user_id: i32,
    pub title_id: i32,
    pub isbn: String,
    pub title: String,
    pub reserved_at: DateTime<Utc>,
    pub returned_at: Option<DateTime<Utc>>,
}

/// Create reservation request (title to reserve; the user is the caller)
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateReservation {
    pub title_id: i32,
}
