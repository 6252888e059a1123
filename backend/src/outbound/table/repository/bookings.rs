//! Booking operations and the one-booking-per-entry rule.

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use tracing::instrument;

use crate::domain::ports::BookingRepository;
use crate::domain::{
    Booking, BookingDraft, BookingId, BookingUpdate, Capability, DomainError, EntryId, ItemType,
    Principal, TripId,
};
use crate::outbound::table::codec::{ENTRY_ID, decode_booking, decode_entry, encode_booking};
use crate::outbound::table::store::{TableQuery, TableStore};

use super::TableItineraryRepository;

impl<S> TableItineraryRepository<S>
where
    S: TableStore,
{
    /// Check the entry link and return the item type the booking inherits.
    ///
    /// `updating` is the booking being edited, which may keep its own link.
    async fn linked_item_type(
        &self,
        trip_id: &TripId,
        entry_id: Option<&EntryId>,
        updating: Option<&BookingId>,
        cancel: &CancellationToken,
    ) -> Result<ItemType, DomainError> {
        let Some(entry_id) = entry_id else {
            return Ok(ItemType::Other);
        };
        let entry = self
            .get_row(
                &self.tables.entries,
                trip_id.as_str(),
                entry_id.as_str(),
                cancel,
            )
            .await?
            .ok_or_else(|| DomainError::invariant("the linked itinerary entry no longer exists"))?;
        let entry = decode_entry(&entry)?;

        let linked = TableQuery::partition(trip_id.as_str()).where_eq(ENTRY_ID, entry_id.as_str());
        let rows = self
            .query_rows(&self.tables.bookings, &linked, cancel)
            .await?;
        for row in &rows {
            let other = decode_booking(row)?;
            if Some(&other.id) != updating {
                return Err(DomainError::invariant(
                    "the itinerary entry already has a booking",
                ));
            }
        }
        Ok(entry.item_type)
    }
}

#[async_trait]
impl<S> BookingRepository for TableItineraryRepository<S>
where
    S: TableStore,
{
    #[instrument(skip_all, fields(user_id = %principal.user_id(), trip_id = %trip_id))]
    async fn list_bookings(
        &self,
        principal: &Principal,
        trip_id: &TripId,
        cancel: &CancellationToken,
    ) -> Result<Vec<Booking>, DomainError> {
        if self.resolve_trip(principal, trip_id, cancel).await?.is_none() {
            return Ok(Vec::new());
        }
        self.query_rows(
            &self.tables.bookings,
            &TableQuery::partition(trip_id.as_str()),
            cancel,
        )
        .await?
        .iter()
        .map(decode_booking)
        .collect()
    }

    #[instrument(skip_all, fields(user_id = %principal.user_id(), trip_id = %trip_id))]
    async fn get_booking(
        &self,
        principal: &Principal,
        trip_id: &TripId,
        booking_id: &BookingId,
        cancel: &CancellationToken,
    ) -> Result<Option<Booking>, DomainError> {
        if self.resolve_trip(principal, trip_id, cancel).await?.is_none() {
            return Ok(None);
        }
        self.get_row(
            &self.tables.bookings,
            trip_id.as_str(),
            booking_id.as_str(),
            cancel,
        )
        .await?
        .as_ref()
        .map(decode_booking)
        .transpose()
    }

    #[instrument(skip_all, fields(user_id = %principal.user_id(), trip_id = %trip_id))]
    async fn create_booking(
        &self,
        principal: &Principal,
        trip_id: &TripId,
        draft: BookingDraft,
        cancel: &CancellationToken,
    ) -> Result<Booking, DomainError> {
        self.require(principal, trip_id, Capability::Edit, cancel)
            .await?;
        let item_type = self
            .linked_item_type(trip_id, draft.entry_id.as_ref(), None, cancel)
            .await?;
        let booking = draft.into_booking(trip_id.clone(), BookingId::generate(), item_type)?;
        let row = self
            .insert_row(&self.tables.bookings, encode_booking(&booking), cancel)
            .await?;
        Ok(Booking {
            version: row.etag,
            ..booking
        })
    }

    #[instrument(skip_all, fields(user_id = %principal.user_id(), trip_id = %update.trip_id))]
    async fn update_booking(
        &self,
        principal: &Principal,
        update: BookingUpdate,
        cancel: &CancellationToken,
    ) -> Result<Booking, DomainError> {
        self.require(principal, &update.trip_id, Capability::Edit, cancel)
            .await?;
        let stored = self
            .get_row(
                &self.tables.bookings,
                update.trip_id.as_str(),
                update.booking_id.as_str(),
                cancel,
            )
            .await?
            .ok_or_else(|| DomainError::not_found("booking not found"))?;
        decode_booking(&stored)?;

        let item_type = self
            .linked_item_type(
                &update.trip_id,
                update.draft.entry_id.as_ref(),
                Some(&update.booking_id),
                cancel,
            )
            .await?;
        let mut booking = update
            .draft
            .into_booking(update.trip_id, update.booking_id, item_type)?;
        booking.version = Some(update.version);
        let row = self
            .replace_row(&self.tables.bookings, encode_booking(&booking), cancel)
            .await?;
        Ok(Booking {
            version: row.etag,
            ..booking
        })
    }

    #[instrument(skip_all, fields(user_id = %principal.user_id(), trip_id = %trip_id))]
    async fn delete_booking(
        &self,
        principal: &Principal,
        trip_id: &TripId,
        booking_id: &BookingId,
        cancel: &CancellationToken,
    ) -> Result<bool, DomainError> {
        self.require(principal, trip_id, Capability::Edit, cancel)
            .await?;
        self.delete_row(
            &self.tables.bookings,
            trip_id.as_str(),
            booking_id.as_str(),
            cancel,
        )
        .await
    }
}
