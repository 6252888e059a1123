//! Port for collaborator access grants.

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::domain::{
    AccessId, AccessLevel, DomainError, EmailAddress, Principal, TripAccess, TripId,
};

/// Access-list management; owner only.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TripAccessRepository: Send + Sync {
    /// Grants on a trip. Callers other than the owner see an empty list.
    async fn list_access(
        &self,
        principal: &Principal,
        trip_id: &TripId,
        cancel: &CancellationToken,
    ) -> Result<Vec<TripAccess>, DomainError>;

    /// Grant `level` to `email`, replacing any existing grant for that email.
    ///
    /// `AccessLevel::Owner` cannot be granted.
    async fn grant_access(
        &self,
        principal: &Principal,
        trip_id: &TripId,
        email: EmailAddress,
        level: AccessLevel,
        cancel: &CancellationToken,
    ) -> Result<TripAccess, DomainError>;

    /// Remove a grant. Returns `false` when it does not exist.
    async fn revoke_access(
        &self,
        principal: &Principal,
        trip_id: &TripId,
        access_id: &AccessId,
        cancel: &CancellationToken,
    ) -> Result<bool, DomainError>;
}
