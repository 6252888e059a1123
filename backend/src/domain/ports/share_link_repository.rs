//! Ports for share links and per-user saved bookmarks.

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::domain::{
    DomainError, Principal, SavedLinkId, SavedShareLink, ShareCode, ShareLink, ShareLinkDraft,
    TripId, UserId,
};

/// Share link management; requires edit rights on the trip.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ShareLinkRepository: Send + Sync {
    /// Links issued for a trip; empty when the caller cannot edit it.
    async fn list_share_links(
        &self,
        principal: &Principal,
        trip_id: &TripId,
        cancel: &CancellationToken,
    ) -> Result<Vec<ShareLink>, DomainError>;

    /// Issue a link with a freshly generated, globally unique code.
    async fn create_share_link(
        &self,
        principal: &Principal,
        trip_id: &TripId,
        draft: ShareLinkDraft,
        cancel: &CancellationToken,
    ) -> Result<ShareLink, DomainError>;

    /// Remove a link. Returns `false` when it does not exist.
    async fn delete_share_link(
        &self,
        principal: &Principal,
        trip_id: &TripId,
        code: &ShareCode,
        cancel: &CancellationToken,
    ) -> Result<bool, DomainError>;
}

/// Bookmarks of share codes, keyed by the bookmarking user.
///
/// Saving a code grants no access to the underlying trip.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SavedShareLinkRepository: Send + Sync {
    /// The user's bookmarks, newest first.
    async fn list_saved_share_links(
        &self,
        user_id: &UserId,
        cancel: &CancellationToken,
    ) -> Result<Vec<SavedShareLink>, DomainError>;

    /// Save `code`, refreshing the cached trip name when already saved.
    async fn save_share_link(
        &self,
        user_id: &UserId,
        code: &ShareCode,
        trip_name: Option<String>,
        cancel: &CancellationToken,
    ) -> Result<SavedShareLink, DomainError>;

    /// Remove a bookmark. Returns `false` when it does not exist.
    async fn delete_saved_share_link(
        &self,
        user_id: &UserId,
        saved_id: &SavedLinkId,
        cancel: &CancellationToken,
    ) -> Result<bool, DomainError>;
}
