//! Table-backed implementation of the itinerary repository ports.
//!
//! Every store call is raced against the caller's cancellation token and its
//! failure translated into a domain [`DomainError`]. Authorisation is resolved per
//! call from the trip row (ownership) or a `TripAccess` grant.

mod access;
mod bookings;
mod entries;
mod share_links;
mod trips;

#[cfg(test)]
mod tests;

use std::future::Future;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use mockable::Clock;
use serde_json::json;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::config::{ItinerarySettings, TableNames};
use crate::domain::{AccessLevel, Capability, DomainError, Principal, Trip, TripAccess, TripId};

use super::codec::{decode_access, decode_trip, encode_access};
use super::store::{TableEntity, TableQuery, TableStore, TableStoreError};

/// Itinerary repository over any [`TableStore`].
///
/// # Examples
/// ```
/// use std::sync::Arc;
///
/// use itinerary::config::ItinerarySettings;
/// use itinerary::outbound::table::{MemoryTableStore, TableItineraryRepository};
///
/// let settings = ItinerarySettings {
///     table_prefix: None,
///     share_code_length: None,
/// };
/// let _repo = TableItineraryRepository::new(
///     Arc::new(MemoryTableStore::new()),
///     &settings,
///     Arc::new(mockable::DefaultClock),
/// );
/// ```
pub struct TableItineraryRepository<S> {
    store: Arc<S>,
    tables: TableNames,
    clock: Arc<dyn Clock>,
    share_code_length: usize,
}

impl<S> TableItineraryRepository<S>
where
    S: TableStore,
{
    /// Build a repository using the table names and share code length from
    /// `settings`.
    pub fn new(store: Arc<S>, settings: &ItinerarySettings, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            tables: TableNames::from_settings(settings),
            clock,
            share_code_length: settings.share_code_length(),
        }
    }

    /// Physical table names in use.
    pub fn tables(&self) -> &TableNames {
        &self.tables
    }

    fn now(&self) -> DateTime<Utc> {
        self.clock.utc()
    }

    async fn get_row(
        &self,
        table: &str,
        partition_key: &str,
        row_key: &str,
        cancel: &CancellationToken,
    ) -> Result<Option<TableEntity>, DomainError> {
        guarded(cancel, self.store.get(table, partition_key, row_key)).await
    }

    async fn query_rows(
        &self,
        table: &str,
        query: &TableQuery,
        cancel: &CancellationToken,
    ) -> Result<Vec<TableEntity>, DomainError> {
        guarded(cancel, self.store.query(table, query)).await
    }

    async fn insert_row(
        &self,
        table: &str,
        entity: TableEntity,
        cancel: &CancellationToken,
    ) -> Result<TableEntity, DomainError> {
        guarded(cancel, self.store.insert(table, entity)).await
    }

    async fn replace_row(
        &self,
        table: &str,
        entity: TableEntity,
        cancel: &CancellationToken,
    ) -> Result<TableEntity, DomainError> {
        guarded(cancel, self.store.replace(table, entity)).await
    }

    async fn delete_row(
        &self,
        table: &str,
        partition_key: &str,
        row_key: &str,
        cancel: &CancellationToken,
    ) -> Result<bool, DomainError> {
        guarded(cancel, self.store.delete(table, partition_key, row_key)).await
    }

    /// Load a trip by id without knowing its owner.
    async fn find_trip(
        &self,
        trip_id: &TripId,
        cancel: &CancellationToken,
    ) -> Result<Option<Trip>, DomainError> {
        let rows = self
            .query_rows(&self.tables.trips, &TableQuery::row_key(trip_id.as_str()), cancel)
            .await?;
        rows.first().map(decode_trip).transpose()
    }

    /// Resolve the principal's view of a trip: owned, granted, or invisible.
    async fn resolve_trip(
        &self,
        principal: &Principal,
        trip_id: &TripId,
        cancel: &CancellationToken,
    ) -> Result<Option<(Trip, AccessLevel)>, DomainError> {
        let owned = self
            .get_row(
                &self.tables.trips,
                principal.user_id().as_str(),
                trip_id.as_str(),
                cancel,
            )
            .await?;
        if let Some(row) = owned {
            return Ok(Some((decode_trip(&row)?, AccessLevel::Owner)));
        }

        let Some(grant) = self.matching_grant(principal, trip_id, cancel).await? else {
            return Ok(None);
        };
        let level = grant.level;
        let Some(trip) = self.find_trip(trip_id, cancel).await? else {
            debug!(trip_id = %trip_id, "grant refers to a missing trip");
            return Ok(None);
        };
        Ok(Some((trip, level)))
    }

    /// Resolve the trip and demand `capability`, hiding the trip otherwise.
    async fn require(
        &self,
        principal: &Principal,
        trip_id: &TripId,
        capability: Capability,
        cancel: &CancellationToken,
    ) -> Result<(Trip, AccessLevel), DomainError> {
        match self.resolve_trip(principal, trip_id, cancel).await? {
            Some((trip, level)) if level.allows(capability) => Ok((trip, level)),
            _ => Err(DomainError::trip_unavailable()),
        }
    }

    async fn matching_grant(
        &self,
        principal: &Principal,
        trip_id: &TripId,
        cancel: &CancellationToken,
    ) -> Result<Option<TripAccess>, DomainError> {
        let rows = self
            .query_rows(
                &self.tables.trip_access,
                &TableQuery::partition(trip_id.as_str()),
                cancel,
            )
            .await?;
        for row in &rows {
            let grant = decode_access(row)?;
            if grant.matches(principal.user_id(), principal.email()) {
                return Ok(Some(self.claim(grant, principal, cancel).await));
            }
        }
        Ok(None)
    }

    /// Bind an email-only grant to the principal's user id.
    ///
    /// A failed claim leaves the grant usable by email and is only logged.
    async fn claim(
        &self,
        grant: TripAccess,
        principal: &Principal,
        cancel: &CancellationToken,
    ) -> TripAccess {
        if !grant.needs_claim() {
            return grant;
        }
        let mut claimed = grant.clone();
        claimed.user_id = Some(principal.user_id().clone());
        match self
            .replace_row(&self.tables.trip_access, encode_access(&claimed), cancel)
            .await
        {
            Ok(row) => {
                claimed.version = row.etag;
                debug!(trip_id = %claimed.trip_id, access_id = %claimed.id, "claimed access grant");
                claimed
            }
            Err(error) => {
                warn!(
                    %error,
                    trip_id = %grant.trip_id,
                    access_id = %grant.id,
                    "failed to claim access grant"
                );
                grant
            }
        }
    }
}

/// Race a store call against cancellation and translate its failure.
async fn guarded<T, F>(cancel: &CancellationToken, call: F) -> Result<T, DomainError>
where
    F: Future<Output = Result<T, TableStoreError>>,
{
    tokio::select! {
        biased;
        () = cancel.cancelled() => Err(DomainError::cancelled()),
        result = call => result.map_err(map_store_error),
    }
}

/// Translate a store failure into the domain error taxonomy.
fn map_store_error(error: TableStoreError) -> DomainError {
    debug!(%error, "table store call failed");
    match error {
        TableStoreError::Connection { .. } | TableStoreError::Query { .. } => {
            DomainError::service_unavailable(format!("itinerary storage unavailable: {error}"))
        }
        TableStoreError::Conflict { .. } => DomainError::conflict(
            "the record was changed by someone else; reload and try again",
        )
        .with_details(json!({ "code": "version_mismatch" })),
        TableStoreError::AlreadyExists { .. } => DomainError::conflict(error.to_string()),
        TableStoreError::NotFound { .. } => DomainError::not_found(error.to_string()),
    }
}
