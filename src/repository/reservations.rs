//! Reservations repository for database operations
//!
//! The reserve path must be atomic: the quota count, the availability check
//! and the insert run inside one transaction holding a per-user advisory
//! lock, and a partial unique index on (title_id) WHERE returned_at IS NULL
//! rejects a second active reservation for the same title at the store.

use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::reservation::{Reservation, ReservationDetails, MAX_ACTIVE_RESERVATIONS},
};

use super::titles::is_unique_violation;

#[derive(Clone)]
pub struct ReservationsRepository {
    pool: Pool<Postgres>,
}

impl ReservationsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get reservation by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<Reservation> {
        sqlx::query_as::<_, Reservation>("SELECT * FROM reservations WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Reservation with id {} not found", id)))
    }

    /// Get reservation with its title resolved
    pub async fn get_details(&self, id: i32) -> AppResult<ReservationDetails> {
        sqlx::query_as::<_, ReservationDetails>(
            r#"
            SELECT r.id, r.user_id, r.title_id, t.isbn, t.title,
                   r.reserved_at, r.returned_at
            FROM reservations r
            JOIN titles t ON t.id = r.title_id
            WHERE r.id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Reservation with id {} not found", id)))
    }

    /// List all reservations of a user, newest first
    pub async fn list_for_user(&self, user_id: i32) -> AppResult<Vec<ReservationDetails>> {
        let reservations = sqlx::query_as::<_, ReservationDetails>(
            r#"
            SELECT r.id, r.user_id, r.title_id, t.isbn, t.title,
                   r.reserved_at, r.returned_at
            FROM reservations r
            JOIN titles t ON t.id = r.title_id
            WHERE r.user_id = $1
            ORDER BY r.reserved_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(reservations)
    }

    /// List all reservations
    pub async fn list_all(&self) -> AppResult<Vec<ReservationDetails>> {
        let reservations = sqlx::query_as::<_, ReservationDetails>(
            r#"
            SELECT r.id, r.user_id, r.title_id, t.isbn, t.title,
                   r.reserved_at, r.returned_at
            FROM reservations r
            JOIN titles t ON t.id = r.title_id
            ORDER BY r.reserved_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(reservations)
    }

    /// Count a user's active reservations
    pub async fn count_active_for_user(&self, user_id: i32) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM reservations WHERE user_id = $1 AND returned_at IS NULL",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    /// Atomically reserve a title for a user.
    ///
    /// Fails with `Conflict` if the title already has an active reservation,
    /// with `QuotaExceeded` if the user holds the maximum number of active
    /// reservations.
    pub async fn reserve(&self, user_id: i32, title_id: i32) -> AppResult<Reservation> {
        let mut tx = self.pool.begin().await?;

        // Serialize concurrent reserves by the same user so the quota count
        // and the insert act as one unit. Released at commit/rollback.
        sqlx::query("SELECT pg_advisory_xact_lock($1)")
            .bind(i64::from(user_id))
            .execute(&mut *tx)
            .await?;

        let title_taken: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM reservations WHERE title_id = $1 AND returned_at IS NULL)",
        )
        .bind(title_id)
        .fetch_one(&mut *tx)
        .await?;

        if title_taken {
            return Err(AppError::Conflict(
                "This title already has an active reservation".to_string(),
            ));
        }

        let active_count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM reservations WHERE user_id = $1 AND returned_at IS NULL",
        )
        .bind(user_id)
        .fetch_one(&mut *tx)
        .await?;

        if active_count >= MAX_ACTIVE_RESERVATIONS {
            return Err(AppError::QuotaExceeded(format!(
                "You already have {} active reservations. Return a book first.",
                MAX_ACTIVE_RESERVATIONS
            )));
        }

        // The partial unique index catches a concurrent reserve by another
        // user that committed between the check above and this insert.
        let reservation = sqlx::query_as::<_, Reservation>(
            r#"
            INSERT INTO reservations (user_id, title_id, reserved_at)
            VALUES ($1, $2, NOW())
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(title_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AppError::Conflict("This title already has an active reservation".to_string())
            } else {
                AppError::from(e)
            }
        })?;

        tx.commit().await?;

        Ok(reservation)
    }

    /// Mark a reservation returned. Returning twice is an error.
    pub async fn return_book(&self, id: i32) -> AppResult<Reservation> {
        let returned = sqlx::query_as::<_, Reservation>(
            r#"
            UPDATE reservations
            SET returned_at = NOW()
            WHERE id = $1 AND returned_at IS NULL
            RETURNING *
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        match returned {
            Some(reservation) => Ok(reservation),
            // Distinguish "unknown id" from "already returned"
            None => {
                let existing = self.get_by_id(id).await?;
                debug_assert!(existing.returned_at.is_some());
                Err(AppError::Conflict(
                    "Reservation has already been returned".to_string(),
                ))
            }
        }
    }

    /// Delete a reservation (cancellation)
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM reservations WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "Reservation with id {} not found",
                id
            )));
        }
        Ok(())
    }
}
