//! Port for booking persistence.
//!
//! A booking's item type always comes from its linked entry. At most one
//! booking may link to a given entry; the check is a read before the write,
//! so two racing writers can both pass it.

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::domain::{
    Booking, BookingDraft, BookingId, BookingUpdate, DomainError, Principal, TripId,
};

/// Booking operations, scoped to a trip the principal can see.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BookingRepository: Send + Sync {
    /// Bookings of a visible trip, unmasked.
    async fn list_bookings(
        &self,
        principal: &Principal,
        trip_id: &TripId,
        cancel: &CancellationToken,
    ) -> Result<Vec<Booking>, DomainError>;

    /// One booking of a visible trip.
    async fn get_booking(
        &self,
        principal: &Principal,
        trip_id: &TripId,
        booking_id: &BookingId,
        cancel: &CancellationToken,
    ) -> Result<Option<Booking>, DomainError>;

    /// Create a booking.
    ///
    /// Fails with an invariant violation when the linked entry no longer
    /// exists or another booking already links to it.
    async fn create_booking(
        &self,
        principal: &Principal,
        trip_id: &TripId,
        draft: BookingDraft,
        cancel: &CancellationToken,
    ) -> Result<Booking, DomainError>;

    /// Update a booking; relinking to the entry it already holds is allowed.
    async fn update_booking(
        &self,
        principal: &Principal,
        update: BookingUpdate,
        cancel: &CancellationToken,
    ) -> Result<Booking, DomainError>;

    /// Delete a booking. Returns `false` when it does not exist.
    async fn delete_booking(
        &self,
        principal: &Principal,
        trip_id: &TripId,
        booking_id: &BookingId,
        cancel: &CancellationToken,
    ) -> Result<bool, DomainError>;
}
