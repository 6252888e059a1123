//! Repository ports for the itinerary aggregate.
//!
//! Every operation takes the caller's cancellation token; a cancelled token
//! aborts the in-flight store call with
//! [`ErrorCode::Cancelled`](crate::domain::ErrorCode::Cancelled).

mod macros;
pub(crate) use macros::define_port_error;

mod booking_repository;
mod itinerary_entry_repository;
mod share_link_repository;
mod trip_access_repository;
mod trip_repository;

pub use booking_repository::BookingRepository;
pub use itinerary_entry_repository::ItineraryEntryRepository;
pub use share_link_repository::{SavedShareLinkRepository, ShareLinkRepository};
pub use trip_access_repository::TripAccessRepository;
pub use trip_repository::TripRepository;

#[cfg(test)]
pub use booking_repository::MockBookingRepository;
#[cfg(test)]
pub use itinerary_entry_repository::MockItineraryEntryRepository;
#[cfg(test)]
pub use share_link_repository::{MockSavedShareLinkRepository, MockShareLinkRepository};
#[cfg(test)]
pub use trip_access_repository::MockTripAccessRepository;
#[cfg(test)]
pub use trip_repository::MockTripRepository;

/// The full itinerary contract consumed by page handlers.
pub trait ItineraryRepository:
    TripRepository
    + ItineraryEntryRepository
    + BookingRepository
    + TripAccessRepository
    + ShareLinkRepository
    + SavedShareLinkRepository
{
}

impl<T> ItineraryRepository for T where
    T: TripRepository
        + ItineraryEntryRepository
        + BookingRepository
        + TripAccessRepository
        + ShareLinkRepository
        + SavedShareLinkRepository
{
}
