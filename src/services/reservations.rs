//! Reservation lifecycle service
//!
//! Enforces the business rules: one active reservation per title, at most
//! three active reservations per user, and owner-or-superuser mutation.
//! Every state change drops the affected user's cached reservation list.

use crate::{
    error::{AppError, AppResult},
    models::{
        reservation::{Reservation, ReservationDetails},
        user::UserClaims,
    },
    repository::Repository,
    services::cache::{CacheKey, CacheService},
};

#[derive(Clone)]
pub struct ReservationsService {
    repository: Repository,
    cache: CacheService,
}

impl ReservationsService {
    pub fn new(repository: Repository, cache: CacheService) -> Self {
        Self { repository, cache }
    }

    /// Reserve a title for a user
    pub async fn reserve(&self, user_id: i32, title_id: i32) -> AppResult<ReservationDetails> {
        // 404 for an unknown title before any business-rule check
        self.repository.titles.get_by_id(title_id).await?;

        let reservation = self.repository.reservations.reserve(user_id, title_id).await?;
        self.cache
            .invalidate(&CacheKey::UserReservations(user_id))
            .await;

        tracing::info!(user_id, title_id, reservation_id = reservation.id, "title reserved");

        self.repository.reservations.get_details(reservation.id).await
    }

    /// Mark a reservation returned; owner or superuser only
    pub async fn return_book(
        &self,
        reservation_id: i32,
        actor: &UserClaims,
    ) -> AppResult<ReservationDetails> {
        let reservation = self.owned_or_privileged(reservation_id, actor).await?;

        self.repository.reservations.return_book(reservation.id).await?;
        self.cache
            .invalidate(&CacheKey::UserReservations(reservation.user_id))
            .await;

        tracing::info!(
            reservation_id,
            user_id = reservation.user_id,
            "reservation returned"
        );

        self.repository.reservations.get_details(reservation_id).await
    }

    /// Cancel (delete) a reservation; owner or superuser only
    pub async fn cancel(&self, reservation_id: i32, actor: &UserClaims) -> AppResult<()> {
        let reservation = self.owned_or_privileged(reservation_id, actor).await?;

        self.repository.reservations.delete(reservation.id).await?;
        self.cache
            .invalidate(&CacheKey::UserReservations(reservation.user_id))
            .await;

        tracing::info!(
            reservation_id,
            user_id = reservation.user_id,
            "reservation cancelled"
        );

        Ok(())
    }

    /// A user's reservations, read-through cached
    pub async fn list_for_user(&self, user_id: i32) -> AppResult<Vec<ReservationDetails>> {
        let key = CacheKey::UserReservations(user_id);
        if let Some(cached) = self.cache.get_json(&key).await {
            return Ok(cached);
        }

        let reservations = self.repository.reservations.list_for_user(user_id).await?;
        self.cache.put_json(&key, &reservations).await;
        Ok(reservations)
    }

    /// All reservations (administration)
    pub async fn list_all(&self) -> AppResult<Vec<ReservationDetails>> {
        self.repository.reservations.list_all().await
    }

    /// Reservation detail, visible to its owner and to staff
    pub async fn get(&self, reservation_id: i32, actor: &UserClaims) -> AppResult<ReservationDetails> {
        let details = self.repository.reservations.get_details(reservation_id).await?;
        if details.user_id != actor.user_id && !actor.is_staff && !actor.is_superuser {
            return Err(AppError::Permission(
                "You cannot view this reservation".to_string(),
            ));
        }
        Ok(details)
    }

    /// Load the reservation and enforce the owner-or-superuser rule
    async fn owned_or_privileged(
        &self,
        reservation_id: i32,
        actor: &UserClaims,
    ) -> AppResult<Reservation> {
        let reservation = self.repository.reservations.get_by_id(reservation_id).await?;
        if !actor.can_manage_reservation(reservation.user_id) {
            return Err(AppError::Permission(
                "This reservation does not belong to you".to_string(),
            ));
        }
        Ok(reservation)
    }
}
