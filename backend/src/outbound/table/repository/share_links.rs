//! Share links and saved bookmarks.

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument};

use crate::domain::ports::{SavedShareLinkRepository, ShareLinkRepository};
use crate::domain::{
    Capability, DomainError, ErrorCode, Principal, SavedLinkId, SavedShareLink, ShareCode,
    ShareLink, ShareLinkDraft, TripId, UserId,
};
use crate::outbound::table::codec::{
    SHARE_CODE, decode_saved_link, decode_share_link, encode_saved_link, encode_share_link,
};
use crate::outbound::table::store::{TableQuery, TableStore};

use super::TableItineraryRepository;

const MAX_CODE_ATTEMPTS: u32 = 3;

impl<S> TableItineraryRepository<S>
where
    S: TableStore,
{
    async fn code_in_use(
        &self,
        code: &ShareCode,
        cancel: &CancellationToken,
    ) -> Result<bool, DomainError> {
        let rows = self
            .query_rows(
                &self.tables.share_links,
                &TableQuery::row_key(code.as_str()),
                cancel,
            )
            .await?;
        Ok(!rows.is_empty())
    }
}

#[async_trait]
impl<S> ShareLinkRepository for TableItineraryRepository<S>
where
    S: TableStore,
{
    #[instrument(skip_all, fields(user_id = %principal.user_id(), trip_id = %trip_id))]
    async fn list_share_links(
        &self,
        principal: &Principal,
        trip_id: &TripId,
        cancel: &CancellationToken,
    ) -> Result<Vec<ShareLink>, DomainError> {
        match self.resolve_trip(principal, trip_id, cancel).await? {
            Some((_, level)) if level.allows(Capability::Edit) => {}
            _ => return Ok(Vec::new()),
        }
        self.query_rows(
            &self.tables.share_links,
            &TableQuery::partition(trip_id.as_str()),
            cancel,
        )
        .await?
        .iter()
        .map(decode_share_link)
        .collect()
    }

    #[instrument(skip_all, fields(user_id = %principal.user_id(), trip_id = %trip_id))]
    async fn create_share_link(
        &self,
        principal: &Principal,
        trip_id: &TripId,
        draft: ShareLinkDraft,
        cancel: &CancellationToken,
    ) -> Result<ShareLink, DomainError> {
        let (trip, _) = self
            .require(principal, trip_id, Capability::Edit, cancel)
            .await?;

        for attempt in 1..=MAX_CODE_ATTEMPTS {
            let code = ShareCode::generate(self.share_code_length);
            if self.code_in_use(&code, cancel).await? {
                debug!(attempt, "share code collision");
                continue;
            }
            let link = ShareLink {
                trip_id: trip.id.clone(),
                code,
                owner_id: trip.owner_id.clone(),
                created_on: Some(self.now()),
                created_by: Some(principal.user_id().clone()),
                expires_on: draft.expires_on,
                mask_bookings: draft.mask_bookings,
                include_cost: draft.include_cost,
                show_booking_confirmations: draft.show_booking_confirmations,
                show_booking_metadata: draft.show_booking_metadata,
                notes: draft.notes.clone(),
                version: None,
            };
            match self
                .insert_row(&self.tables.share_links, encode_share_link(&link), cancel)
                .await
            {
                Ok(row) => {
                    return Ok(ShareLink {
                        version: row.etag,
                        ..link
                    });
                }
                Err(error) if error.code() == ErrorCode::Conflict => {
                    debug!(attempt, "share code taken on insert");
                }
                Err(error) => return Err(error),
            }
        }
        Err(DomainError::conflict(
            "could not allocate a unique share code; try again",
        ))
    }

    #[instrument(skip_all, fields(user_id = %principal.user_id(), trip_id = %trip_id))]
    async fn delete_share_link(
        &self,
        principal: &Principal,
        trip_id: &TripId,
        code: &ShareCode,
        cancel: &CancellationToken,
    ) -> Result<bool, DomainError> {
        self.require(principal, trip_id, Capability::Edit, cancel)
            .await?;
        self.delete_row(
            &self.tables.share_links,
            trip_id.as_str(),
            code.as_str(),
            cancel,
        )
        .await
    }
}

#[async_trait]
impl<S> SavedShareLinkRepository for TableItineraryRepository<S>
where
    S: TableStore,
{
    #[instrument(skip_all, fields(user_id = %user_id))]
    async fn list_saved_share_links(
        &self,
        user_id: &UserId,
        cancel: &CancellationToken,
    ) -> Result<Vec<SavedShareLink>, DomainError> {
        let mut saved = self
            .query_rows(
                &self.tables.saved_share_links,
                &TableQuery::partition(user_id.as_str()),
                cancel,
            )
            .await?
            .iter()
            .map(decode_saved_link)
            .collect::<Result<Vec<_>, _>>()?;
        // Newest first; undated bookmarks sink to the end.
        saved.sort_by(|a, b| b.saved_on.cmp(&a.saved_on));
        Ok(saved)
    }

    #[instrument(skip_all, fields(user_id = %user_id))]
    async fn save_share_link(
        &self,
        user_id: &UserId,
        code: &ShareCode,
        trip_name: Option<String>,
        cancel: &CancellationToken,
    ) -> Result<SavedShareLink, DomainError> {
        let trip_name = trip_name
            .map(|name| name.trim().to_owned())
            .filter(|name| !name.is_empty());
        let existing =
            TableQuery::partition(user_id.as_str()).where_eq(SHARE_CODE, code.as_str());
        let rows = self
            .query_rows(&self.tables.saved_share_links, &existing, cancel)
            .await?;

        if let Some(row) = rows.first() {
            let mut saved = decode_saved_link(row)?;
            saved.trip_name = trip_name.or(saved.trip_name);
            saved.saved_on = Some(self.now());
            self.replace_row(
                &self.tables.saved_share_links,
                encode_saved_link(&saved),
                cancel,
            )
            .await?;
            return Ok(saved);
        }

        let saved = SavedShareLink {
            user_id: user_id.clone(),
            id: SavedLinkId::generate(),
            code: code.clone(),
            trip_name,
            saved_on: Some(self.now()),
        };
        self.insert_row(
            &self.tables.saved_share_links,
            encode_saved_link(&saved),
            cancel,
        )
        .await?;
        Ok(saved)
    }

    #[instrument(skip_all, fields(user_id = %user_id))]
    async fn delete_saved_share_link(
        &self,
        user_id: &UserId,
        saved_id: &SavedLinkId,
        cancel: &CancellationToken,
    ) -> Result<bool, DomainError> {
        self.delete_row(
            &self.tables.saved_share_links,
            user_id.as_str(),
            saved_id.as_str(),
            cancel,
        )
        .await
    }
}
