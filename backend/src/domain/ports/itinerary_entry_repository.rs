//! Port for itinerary entry persistence.

use async_trait::async_trait;
use chrono::NaiveDate;
use tokio_util::sync::CancellationToken;

use crate::domain::{
    DomainError, EntryDraft, EntryId, EntryUpdate, ItineraryEntry, Principal, TripId,
};

/// Entry operations, scoped to a trip the principal can see.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ItineraryEntryRepository: Send + Sync {
    /// Entries of a visible trip; empty when the trip is not visible.
    async fn list_entries(
        &self,
        principal: &Principal,
        trip_id: &TripId,
        cancel: &CancellationToken,
    ) -> Result<Vec<ItineraryEntry>, DomainError>;

    /// One entry of a visible trip.
    async fn get_entry(
        &self,
        principal: &Principal,
        trip_id: &TripId,
        entry_id: &EntryId,
        cancel: &CancellationToken,
    ) -> Result<Option<ItineraryEntry>, DomainError>;

    /// Create an entry; requires edit rights on the trip.
    async fn create_entry(
        &self,
        principal: &Principal,
        trip_id: &TripId,
        draft: EntryDraft,
        cancel: &CancellationToken,
    ) -> Result<ItineraryEntry, DomainError>;

    /// Update an entry, rejecting stale versions with a conflict.
    async fn update_entry(
        &self,
        principal: &Principal,
        update: EntryUpdate,
        cancel: &CancellationToken,
    ) -> Result<ItineraryEntry, DomainError>;

    /// Delete an entry. Returns `false` when it does not exist.
    async fn delete_entry(
        &self,
        principal: &Principal,
        trip_id: &TripId,
        entry_id: &EntryId,
        cancel: &CancellationToken,
    ) -> Result<bool, DomainError>;

    /// Give the entries on `date` a dense 1-based order following
    /// `ordered_ids`.
    ///
    /// Entries on the date that are missing from the list keep their stored
    /// order. Unknown ids, ids on other dates and repeats are ignored. Returns
    /// the entries whose order changed.
    async fn reorder_entries(
        &self,
        principal: &Principal,
        trip_id: &TripId,
        date: NaiveDate,
        ordered_ids: Vec<EntryId>,
        cancel: &CancellationToken,
    ) -> Result<Vec<ItineraryEntry>, DomainError>;
}
