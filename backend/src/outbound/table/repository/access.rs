//! Access grant management.

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument};

use crate::domain::ports::TripAccessRepository;
use crate::domain::{
    AccessId, AccessLevel, Capability, DomainError, EmailAddress, Principal, TripAccess, TripId,
};
use crate::outbound::table::codec::{decode_access, encode_access};
use crate::outbound::table::store::{TableQuery, TableStore};

use super::TableItineraryRepository;

#[async_trait]
impl<S> TripAccessRepository for TableItineraryRepository<S>
where
    S: TableStore,
{
    #[instrument(skip_all, fields(user_id = %principal.user_id(), trip_id = %trip_id))]
    async fn list_access(
        &self,
        principal: &Principal,
        trip_id: &TripId,
        cancel: &CancellationToken,
    ) -> Result<Vec<TripAccess>, DomainError> {
        match self.resolve_trip(principal, trip_id, cancel).await? {
            Some((_, level)) if level.allows(Capability::ManageAccess) => {}
            _ => return Ok(Vec::new()),
        }
        self.query_rows(
            &self.tables.trip_access,
            &TableQuery::partition(trip_id.as_str()),
            cancel,
        )
        .await?
        .iter()
        .map(decode_access)
        .collect()
    }

    #[instrument(skip_all, fields(user_id = %principal.user_id(), trip_id = %trip_id, ?level))]
    async fn grant_access(
        &self,
        principal: &Principal,
        trip_id: &TripId,
        email: EmailAddress,
        level: AccessLevel,
        cancel: &CancellationToken,
    ) -> Result<TripAccess, DomainError> {
        if level == AccessLevel::Owner {
            return Err(DomainError::invalid_request(
                "ownership cannot be granted; choose full control or read only",
            ));
        }
        self.require(principal, trip_id, Capability::ManageAccess, cancel)
            .await?;

        let rows = self
            .query_rows(
                &self.tables.trip_access,
                &TableQuery::partition(trip_id.as_str()),
                cancel,
            )
            .await?;
        let mut existing = None;
        for row in &rows {
            let grant = decode_access(row)?;
            if grant.email == email {
                existing = Some(grant);
                break;
            }
        }
        if let Some(mut grant) = existing {
            grant.level = level;
            let row = self
                .replace_row(&self.tables.trip_access, encode_access(&grant), cancel)
                .await?;
            debug!(access_id = %grant.id, "updated access grant");
            return Ok(TripAccess {
                version: row.etag,
                ..grant
            });
        }

        let grant = TripAccess {
            trip_id: trip_id.clone(),
            id: AccessId::generate(),
            email,
            user_id: None,
            level,
            created_on: Some(self.now()),
            created_by: Some(principal.user_id().clone()),
            version: None,
        };
        let row = self
            .insert_row(&self.tables.trip_access, encode_access(&grant), cancel)
            .await?;
        debug!(access_id = %grant.id, "granted trip access");
        Ok(TripAccess {
            version: row.etag,
            ..grant
        })
    }

    #[instrument(skip_all, fields(user_id = %principal.user_id(), trip_id = %trip_id))]
    async fn revoke_access(
        &self,
        principal: &Principal,
        trip_id: &TripId,
        access_id: &AccessId,
        cancel: &CancellationToken,
    ) -> Result<bool, DomainError> {
        self.require(principal, trip_id, Capability::ManageAccess, cancel)
            .await?;
        self.delete_row(
            &self.tables.trip_access,
            trip_id.as_str(),
            access_id.as_str(),
            cancel,
        )
        .await
    }
}
