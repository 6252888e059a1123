//! Share links and per-user saved bookmarks.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Booking, SavedLinkId, ShareCode, TripId, UserId, VersionTag};

/// Anonymous, time-limited, masked read access to a trip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShareLink {
    /// Shared trip; the partition key.
    pub trip_id: TripId,
    /// Globally unique code; the row key.
    pub code: ShareCode,
    /// Owner of the shared trip, used to load it on the anonymous path.
    pub owner_id: UserId,
    /// When the link was created.
    pub created_on: Option<DateTime<Utc>>,
    /// Who created the link.
    pub created_by: Option<UserId>,
    /// Instant after which the link stops resolving.
    pub expires_on: Option<DateTime<Utc>>,
    /// Hide every booking.
    pub mask_bookings: bool,
    /// Reveal costs, currencies, paid flags and confirmation links.
    pub include_cost: bool,
    /// Reveal confirmation text and links.
    pub show_booking_confirmations: bool,
    /// Reveal stay details on bookings.
    pub show_booking_metadata: bool,
    /// Free-form note from the sharer.
    pub notes: Option<String>,
    /// Store-issued entity tag.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<VersionTag>,
}

impl ShareLink {
    /// Whether the link has lapsed at `now`.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_on.is_some_and(|expiry| expiry < now)
    }

    /// Redact `bookings` according to the link's flags.
    ///
    /// Cost stripping runs first, then confirmation and metadata redaction,
    /// and finally full suppression when `mask_bookings` is set.
    pub fn apply_masking(&self, bookings: &mut Vec<Booking>) {
        for booking in bookings.iter_mut() {
            if !self.include_cost {
                booking.strip_cost();
            }
            if !self.show_booking_confirmations {
                booking.strip_confirmation();
            }
            if !self.show_booking_metadata {
                booking.stay_metadata = None;
            }
        }
        if self.mask_bookings {
            bookings.clear();
        }
    }
}

/// Options for a new share link. Every flag defaults to `false`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShareLinkDraft {
    /// Expiry instant.
    pub expires_on: Option<DateTime<Utc>>,
    /// Hide every booking.
    pub mask_bookings: bool,
    /// Reveal costs.
    pub include_cost: bool,
    /// Reveal confirmations.
    pub show_booking_confirmations: bool,
    /// Reveal booking stay details.
    pub show_booking_metadata: bool,
    /// Note for viewers.
    pub notes: Option<String>,
}

/// A user's bookmark of somebody else's share code.
///
/// Saving a link grants nothing; the code still goes through the anonymous
/// share path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedShareLink {
    /// Bookmarking user; the partition key.
    pub user_id: UserId,
    /// Bookmark identifier; the row key.
    pub id: SavedLinkId,
    /// Saved code.
    pub code: ShareCode,
    /// Trip name cached at save time.
    pub trip_name: Option<String>,
    /// When the bookmark was last saved.
    pub saved_on: Option<DateTime<Utc>>,
}
