//! Port for trip persistence and visibility.
//!
//! Read paths never distinguish a missing trip from one the caller may not
//! see: both resolve to `None`. Mutations that fail the same check raise
//! [`DomainError::trip_unavailable`](crate::domain::DomainError::trip_unavailable).

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::domain::{
    AccessibleTrip, DomainError, Principal, ShareCode, Trip, TripDetails, TripDraft, TripId,
    TripUpdate, UserId,
};

/// Trip aggregate operations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TripRepository: Send + Sync {
    /// Trips owned by `user_id`, in no particular order.
    async fn list_trips(
        &self,
        user_id: &UserId,
        cancel: &CancellationToken,
    ) -> Result<Vec<Trip>, DomainError>;

    /// Owned trips plus trips shared with the principal through access
    /// grants, each tagged with the caller's level.
    async fn list_accessible_trips(
        &self,
        principal: &Principal,
        cancel: &CancellationToken,
    ) -> Result<Vec<AccessibleTrip>, DomainError>;

    /// A trip the principal owns or holds a grant for.
    async fn get_trip(
        &self,
        principal: &Principal,
        trip_id: &TripId,
        cancel: &CancellationToken,
    ) -> Result<Option<AccessibleTrip>, DomainError>;

    /// Same as [`TripRepository::get_trip`], addressed by slug.
    ///
    /// Owned trips are searched first, then granted ones.
    async fn get_trip_by_slug(
        &self,
        principal: &Principal,
        slug: &str,
        cancel: &CancellationToken,
    ) -> Result<Option<AccessibleTrip>, DomainError>;

    /// The trip with its entries and bookings, unmasked.
    async fn get_trip_details(
        &self,
        principal: &Principal,
        trip_id: &TripId,
        cancel: &CancellationToken,
    ) -> Result<Option<TripDetails>, DomainError>;

    /// Anonymous view through a share code, masked by the link's flags.
    ///
    /// Unknown and expired codes both resolve to `None`. A link whose owner
    /// reference is missing raises a data-integrity error.
    async fn get_trip_by_share_code(
        &self,
        code: &ShareCode,
        cancel: &CancellationToken,
    ) -> Result<Option<TripDetails>, DomainError>;

    /// Create a trip owned by the principal.
    async fn create_trip(
        &self,
        principal: &Principal,
        draft: TripDraft,
        cancel: &CancellationToken,
    ) -> Result<Trip, DomainError>;

    /// Update a trip, rejecting stale versions with a conflict.
    async fn update_trip(
        &self,
        principal: &Principal,
        update: TripUpdate,
        cancel: &CancellationToken,
    ) -> Result<Trip, DomainError>;

    /// Delete the trip row. Dependent rows are left in place.
    ///
    /// Returns `false` when the trip does not exist.
    async fn delete_trip(
        &self,
        principal: &Principal,
        trip_id: &TripId,
        cancel: &CancellationToken,
    ) -> Result<bool, DomainError>;
}
