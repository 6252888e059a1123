//! Itinerary entry operations.

use std::collections::HashSet;

use async_trait::async_trait;
use chrono::NaiveDate;
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument};

use crate::domain::ports::ItineraryEntryRepository;
use crate::domain::{
    Capability, DomainError, EntryDraft, EntryId, EntryUpdate, ItineraryEntry, Principal, TripId,
};
use crate::outbound::table::codec::{decode_entry, encode_entry};
use crate::outbound::table::store::{TableQuery, TableStore};

use super::TableItineraryRepository;

#[async_trait]
impl<S> ItineraryEntryRepository for TableItineraryRepository<S>
where
    S: TableStore,
{
    #[instrument(skip_all, fields(user_id = %principal.user_id(), trip_id = %trip_id))]
    async fn list_entries(
        &self,
        principal: &Principal,
        trip_id: &TripId,
        cancel: &CancellationToken,
    ) -> Result<Vec<ItineraryEntry>, DomainError> {
        if self.resolve_trip(principal, trip_id, cancel).await?.is_none() {
            return Ok(Vec::new());
        }
        self.query_rows(
            &self.tables.entries,
            &TableQuery::partition(trip_id.as_str()),
            cancel,
        )
        .await?
        .iter()
        .map(decode_entry)
        .collect()
    }

    #[instrument(skip_all, fields(user_id = %principal.user_id(), trip_id = %trip_id))]
    async fn get_entry(
        &self,
        principal: &Principal,
        trip_id: &TripId,
        entry_id: &EntryId,
        cancel: &CancellationToken,
    ) -> Result<Option<ItineraryEntry>, DomainError> {
        if self.resolve_trip(principal, trip_id, cancel).await?.is_none() {
            return Ok(None);
        }
        self.get_row(
            &self.tables.entries,
            trip_id.as_str(),
            entry_id.as_str(),
            cancel,
        )
        .await?
        .as_ref()
        .map(decode_entry)
        .transpose()
    }

    #[instrument(skip_all, fields(user_id = %principal.user_id(), trip_id = %trip_id))]
    async fn create_entry(
        &self,
        principal: &Principal,
        trip_id: &TripId,
        draft: EntryDraft,
        cancel: &CancellationToken,
    ) -> Result<ItineraryEntry, DomainError> {
        self.require(principal, trip_id, Capability::Edit, cancel)
            .await?;
        let entry = draft.into_entry(trip_id.clone(), EntryId::generate(), None)?;
        let row = self
            .insert_row(&self.tables.entries, encode_entry(&entry), cancel)
            .await?;
        Ok(ItineraryEntry {
            version: row.etag,
            ..entry
        })
    }

    #[instrument(skip_all, fields(user_id = %principal.user_id(), trip_id = %update.trip_id))]
    async fn update_entry(
        &self,
        principal: &Principal,
        update: EntryUpdate,
        cancel: &CancellationToken,
    ) -> Result<ItineraryEntry, DomainError> {
        self.require(principal, &update.trip_id, Capability::Edit, cancel)
            .await?;
        let existing = self
            .get_row(
                &self.tables.entries,
                update.trip_id.as_str(),
                update.entry_id.as_str(),
                cancel,
            )
            .await?
            .ok_or_else(|| DomainError::not_found("itinerary entry not found"))?;
        let existing = decode_entry(&existing)?;

        let mut entry =
            update
                .draft
                .into_entry(update.trip_id, update.entry_id, existing.sort_order)?;
        entry.version = Some(update.version);
        let row = self
            .replace_row(&self.tables.entries, encode_entry(&entry), cancel)
            .await?;
        Ok(ItineraryEntry {
            version: row.etag,
            ..entry
        })
    }

    #[instrument(skip_all, fields(user_id = %principal.user_id(), trip_id = %trip_id))]
    async fn delete_entry(
        &self,
        principal: &Principal,
        trip_id: &TripId,
        entry_id: &EntryId,
        cancel: &CancellationToken,
    ) -> Result<bool, DomainError> {
        self.require(principal, trip_id, Capability::Edit, cancel)
            .await?;
        // Bookings linked to this entry keep their dangling reference.
        self.delete_row(
            &self.tables.entries,
            trip_id.as_str(),
            entry_id.as_str(),
            cancel,
        )
        .await
    }

    #[instrument(skip_all, fields(user_id = %principal.user_id(), trip_id = %trip_id, %date))]
    async fn reorder_entries(
        &self,
        principal: &Principal,
        trip_id: &TripId,
        date: NaiveDate,
        ordered_ids: Vec<EntryId>,
        cancel: &CancellationToken,
    ) -> Result<Vec<ItineraryEntry>, DomainError> {
        self.require(principal, trip_id, Capability::Edit, cancel)
            .await?;
        let on_date: Vec<ItineraryEntry> = self
            .query_rows(
                &self.tables.entries,
                &TableQuery::partition(trip_id.as_str()),
                cancel,
            )
            .await?
            .iter()
            .map(decode_entry)
            .collect::<Result<Vec<_>, _>>()?
            .into_iter()
            .filter(|entry| entry.date == Some(date))
            .collect();

        let mut seen = HashSet::new();
        let mut position = 0;
        let mut changed = Vec::new();
        for id in &ordered_ids {
            if !seen.insert(id) {
                continue;
            }
            let Some(entry) = on_date.iter().find(|entry| &entry.id == id) else {
                continue;
            };
            position += 1;
            if entry.sort_order == Some(position) {
                continue;
            }
            let mut moved = entry.clone();
            moved.sort_order = Some(position);
            let row = self
                .replace_row(&self.tables.entries, encode_entry(&moved), cancel)
                .await?;
            moved.version = row.etag;
            changed.push(moved);
        }
        debug!(changed = changed.len(), "reordered entries");
        Ok(changed)
    }
}
