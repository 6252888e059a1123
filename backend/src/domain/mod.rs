//! Itinerary domain: identifiers, aggregates and pure projections.
//!
//! Purpose: Define strongly typed entities and the read-side view models the
//! page layer renders. Storage concerns live behind [`ports`]; nothing in this
//! module performs I/O.
//!
//! Public surface:
//! - DomainError / ErrorCode: transport-agnostic failure payload.
//! - Identifiers and [`Principal`], the acting identity.
//! - Trip, ItineraryEntry, Booking, ShareLink, TripAccess, SavedShareLink and
//!   their mutation payloads.
//! - [`TripDetails`], the masked read composite.
//! - [`timeline`] and [`route_map`] projectors, combined by
//!   [`ItineraryViewService`].

pub mod access;
pub mod booking;
pub mod details;
pub mod entry;
pub mod error;
pub mod ids;
pub mod item_type;
pub mod itinerary_view;
pub mod ports;
pub mod route_map;
pub mod sharing;
pub mod slug;
pub mod timeline;
pub mod trip;
pub mod version;

pub use self::access::{AccessLevel, Capability, TripAccess};
pub use self::booking::{Booking, BookingDraft, BookingStayMetadata, BookingUpdate};
pub use self::details::TripDetails;
pub use self::entry::{
    EntryDraft, EntryLocation, EntryMetadata, EntryUpdate, FlightMetadata, ItineraryEntry,
    PlaceRef, StayMetadata, normalise_tags,
};
pub use self::error::{DomainError, DomainErrorValidationError, ErrorCode};
pub use self::ids::{
    AccessId, BookingId, EmailAddress, EntryId, IdValidationError, Principal, SavedLinkId,
    ShareCode, TripId, UserId,
};
pub use self::item_type::{ItemFamily, ItemType};
pub use self::itinerary_view::{ItineraryView, ItineraryViewService};
pub use self::route_map::{RouteStop, StopKind, marker_color, project_route};
pub use self::sharing::{SavedShareLink, ShareLink, ShareLinkDraft};
pub use self::slug::{is_valid_slug, slugify, unique_slug};
pub use self::timeline::{SpanBlock, Timeline, TimelineDay};
pub use self::trip::{AccessibleTrip, Trip, TripDraft, TripUpdate, normalise_currency};
pub use self::version::VersionTag;

/// Result alias used across the repository contract.
///
/// # Examples
/// ```
/// use itinerary::domain::{DomainResult, DomainError};
///
/// fn refuse() -> DomainResult<()> {
///     Err(DomainError::trip_unavailable())
/// }
/// assert!(refuse().is_err());
/// ```
pub type DomainResult<T> = Result<T, DomainError>;
