//! Trip aggregate operations.

use std::collections::HashSet;

use async_trait::async_trait;
use futures_util::future::try_join_all;
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument};

use crate::domain::ports::TripRepository;
use crate::domain::{
    AccessLevel, AccessibleTrip, Booking, Capability, DomainError, ItineraryEntry, Principal,
    ShareCode, Trip, TripAccess, TripDetails, TripDraft, TripId, TripUpdate, UserId, slugify,
    unique_slug,
};
use crate::outbound::table::codec::{
    SLUG_PROPERTY, USER_ID, decode_access, decode_booking, decode_entry, decode_share_link,
    decode_trip, encode_trip,
};
use crate::outbound::table::store::{TableQuery, TableStore};

use super::TableItineraryRepository;

impl<S> TableItineraryRepository<S>
where
    S: TableStore,
{
    async fn owned_trips(
        &self,
        user_id: &UserId,
        cancel: &CancellationToken,
    ) -> Result<Vec<Trip>, DomainError> {
        self.query_rows(&self.tables.trips, &TableQuery::partition(user_id.as_str()), cancel)
            .await?
            .iter()
            .map(decode_trip)
            .collect()
    }

    /// Every grant addressed to the principal, by user id or by email.
    ///
    /// Stored emails may predate normalisation, so with an email in hand the
    /// grants are compared after decoding rather than filtered by the store.
    async fn grants_for(
        &self,
        principal: &Principal,
        cancel: &CancellationToken,
    ) -> Result<Vec<TripAccess>, DomainError> {
        let query = match principal.email() {
            Some(_) => TableQuery::all(),
            None => TableQuery::all().where_eq(USER_ID, principal.user_id().as_str()),
        };
        let rows = self
            .query_rows(&self.tables.trip_access, &query, cancel)
            .await?;

        let mut grants = Vec::new();
        for row in &rows {
            let grant = decode_access(row)?;
            if grant.matches(principal.user_id(), principal.email()) {
                grants.push(self.claim(grant, principal, cancel).await);
            }
        }
        Ok(grants)
    }

    /// Entries and bookings of a trip, fetched concurrently.
    async fn load_children(
        &self,
        trip_id: &TripId,
        cancel: &CancellationToken,
    ) -> Result<(Vec<ItineraryEntry>, Vec<Booking>), DomainError> {
        let query = TableQuery::partition(trip_id.as_str());
        let (entry_rows, booking_rows) = tokio::try_join!(
            self.query_rows(&self.tables.entries, &query, cancel),
            self.query_rows(&self.tables.bookings, &query, cancel),
        )?;
        let entries = entry_rows
            .iter()
            .map(decode_entry)
            .collect::<Result<Vec<_>, _>>()?;
        let bookings = booking_rows
            .iter()
            .map(decode_booking)
            .collect::<Result<Vec<_>, _>>()?;
        Ok((entries, bookings))
    }

    /// Pick a slug unique among the owner's trips, ignoring `except`.
    async fn allocate_slug(
        &self,
        owner_id: &UserId,
        requested: &str,
        except: Option<&TripId>,
        cancel: &CancellationToken,
    ) -> Result<String, DomainError> {
        let taken: HashSet<String> = self
            .owned_trips(owner_id, cancel)
            .await?
            .into_iter()
            .filter(|trip| Some(&trip.id) != except)
            .map(|trip| trip.slug)
            .collect();
        let base = slugify(requested);
        Ok(unique_slug(&base, |candidate| taken.contains(candidate)))
    }
}

fn requested_slug(draft: &TripDraft) -> Option<&str> {
    draft
        .slug
        .as_deref()
        .map(str::trim)
        .filter(|slug| !slug.is_empty())
}

fn trimmed(value: Option<String>) -> Option<String> {
    value
        .map(|raw| raw.trim().to_owned())
        .filter(|raw| !raw.is_empty())
}

#[async_trait]
impl<S> TripRepository for TableItineraryRepository<S>
where
    S: TableStore,
{
    #[instrument(skip_all, fields(user_id = %user_id))]
    async fn list_trips(
        &self,
        user_id: &UserId,
        cancel: &CancellationToken,
    ) -> Result<Vec<Trip>, DomainError> {
        self.owned_trips(user_id, cancel).await
    }

    #[instrument(skip_all, fields(user_id = %principal.user_id()))]
    async fn list_accessible_trips(
        &self,
        principal: &Principal,
        cancel: &CancellationToken,
    ) -> Result<Vec<AccessibleTrip>, DomainError> {
        let mut trips: Vec<AccessibleTrip> = self
            .owned_trips(principal.user_id(), cancel)
            .await?
            .into_iter()
            .map(|trip| AccessibleTrip {
                trip,
                access: AccessLevel::Owner,
            })
            .collect();

        let mut pending: Vec<TripAccess> = Vec::new();
        for grant in self.grants_for(principal, cancel).await? {
            let known = trips.iter().any(|known| known.trip.id == grant.trip_id)
                || pending.iter().any(|queued| queued.trip_id == grant.trip_id);
            if !known {
                pending.push(grant);
            }
        }

        let loaded = try_join_all(
            pending
                .iter()
                .map(|grant| self.find_trip(&grant.trip_id, cancel)),
        )
        .await?;
        for (grant, trip) in pending.into_iter().zip(loaded) {
            match trip {
                Some(trip) => trips.push(AccessibleTrip {
                    trip,
                    access: grant.level,
                }),
                None => debug!(trip_id = %grant.trip_id, "grant refers to a missing trip"),
            }
        }
        Ok(trips)
    }

    #[instrument(skip_all, fields(user_id = %principal.user_id(), trip_id = %trip_id))]
    async fn get_trip(
        &self,
        principal: &Principal,
        trip_id: &TripId,
        cancel: &CancellationToken,
    ) -> Result<Option<AccessibleTrip>, DomainError> {
        Ok(self
            .resolve_trip(principal, trip_id, cancel)
            .await?
            .map(|(trip, access)| AccessibleTrip { trip, access }))
    }

    #[instrument(skip_all, fields(user_id = %principal.user_id(), slug = %slug))]
    async fn get_trip_by_slug(
        &self,
        principal: &Principal,
        slug: &str,
        cancel: &CancellationToken,
    ) -> Result<Option<AccessibleTrip>, DomainError> {
        let slug = slug.trim();
        let owned =
            TableQuery::partition(principal.user_id().as_str()).where_eq(SLUG_PROPERTY, slug);
        let rows = self.query_rows(&self.tables.trips, &owned, cancel).await?;
        if let Some(row) = rows.first() {
            return Ok(Some(AccessibleTrip {
                trip: decode_trip(row)?,
                access: AccessLevel::Owner,
            }));
        }

        Ok(self
            .list_accessible_trips(principal, cancel)
            .await?
            .into_iter()
            .find(|candidate| candidate.access != AccessLevel::Owner && candidate.trip.slug == slug))
    }

    #[instrument(skip_all, fields(user_id = %principal.user_id(), trip_id = %trip_id))]
    async fn get_trip_details(
        &self,
        principal: &Principal,
        trip_id: &TripId,
        cancel: &CancellationToken,
    ) -> Result<Option<TripDetails>, DomainError> {
        let Some((trip, access)) = self.resolve_trip(principal, trip_id, cancel).await? else {
            return Ok(None);
        };
        let (entries, bookings) = self.load_children(trip_id, cancel).await?;
        Ok(Some(TripDetails::for_principal(
            trip, entries, bookings, access,
        )))
    }

    #[instrument(skip_all)]
    async fn get_trip_by_share_code(
        &self,
        code: &ShareCode,
        cancel: &CancellationToken,
    ) -> Result<Option<TripDetails>, DomainError> {
        let rows = self
            .query_rows(
                &self.tables.share_links,
                &TableQuery::row_key(code.as_str()),
                cancel,
            )
            .await?;
        let Some(row) = rows.first() else {
            return Ok(None);
        };
        let link = decode_share_link(row)?;
        if link.is_expired(self.now()) {
            debug!(trip_id = %link.trip_id, "share link has expired");
            return Ok(None);
        }

        let trip_row = self
            .get_row(
                &self.tables.trips,
                link.owner_id.as_str(),
                link.trip_id.as_str(),
                cancel,
            )
            .await?;
        let Some(trip_row) = trip_row else {
            debug!(trip_id = %link.trip_id, "share link points at a missing trip");
            return Ok(None);
        };
        let trip = decode_trip(&trip_row)?;
        let (entries, bookings) = self.load_children(&trip.id, cancel).await?;
        Ok(Some(TripDetails::shared(trip, entries, bookings, link)))
    }

    #[instrument(skip_all, fields(user_id = %principal.user_id()))]
    async fn create_trip(
        &self,
        principal: &Principal,
        draft: TripDraft,
        cancel: &CancellationToken,
    ) -> Result<Trip, DomainError> {
        let name = draft.validated_name()?;
        let default_currency = draft.validated_currency()?;
        let requested = requested_slug(&draft).unwrap_or(name.as_str()).to_owned();
        let slug = self
            .allocate_slug(principal.user_id(), &requested, None, cancel)
            .await?;

        let trip = Trip {
            owner_id: principal.user_id().clone(),
            id: TripId::generate(),
            name,
            slug,
            start_date: draft.start_date,
            end_date: draft.end_date,
            home_time_zone: trimmed(draft.home_time_zone),
            default_currency,
            version: None,
        };
        let row = self
            .insert_row(&self.tables.trips, encode_trip(&trip), cancel)
            .await?;
        debug!(trip_id = %trip.id, slug = %trip.slug, "created trip");
        Ok(Trip {
            version: row.etag,
            ..trip
        })
    }

    #[instrument(skip_all, fields(user_id = %principal.user_id(), trip_id = %update.trip_id))]
    async fn update_trip(
        &self,
        principal: &Principal,
        update: TripUpdate,
        cancel: &CancellationToken,
    ) -> Result<Trip, DomainError> {
        let (current, _) = self
            .require(principal, &update.trip_id, Capability::Edit, cancel)
            .await?;
        let name = update.draft.validated_name()?;
        let default_currency = update.draft.validated_currency()?;
        let slug = match requested_slug(&update.draft) {
            Some(requested) if slugify(requested) != current.slug => {
                self.allocate_slug(&current.owner_id, requested, Some(&current.id), cancel)
                    .await?
            }
            _ => current.slug.clone(),
        };

        let trip = Trip {
            owner_id: current.owner_id,
            id: current.id,
            name,
            slug,
            start_date: update.draft.start_date,
            end_date: update.draft.end_date,
            home_time_zone: trimmed(update.draft.home_time_zone),
            default_currency,
            version: Some(update.version),
        };
        let row = self
            .replace_row(&self.tables.trips, encode_trip(&trip), cancel)
            .await?;
        Ok(Trip {
            version: row.etag,
            ..trip
        })
    }

    #[instrument(skip_all, fields(user_id = %principal.user_id(), trip_id = %trip_id))]
    async fn delete_trip(
        &self,
        principal: &Principal,
        trip_id: &TripId,
        cancel: &CancellationToken,
    ) -> Result<bool, DomainError> {
        let Some((trip, access)) = self.resolve_trip(principal, trip_id, cancel).await? else {
            return Ok(false);
        };
        if !access.allows(Capability::DeleteTrip) {
            return Err(DomainError::trip_unavailable());
        }
        // Child rows are left in place; they become unreachable with the trip.
        self.delete_row(
            &self.tables.trips,
            trip.owner_id.as_str(),
            trip.id.as_str(),
            cancel,
        )
        .await
    }
}
