//! Read-only trip composite handed to renderers and projectors.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::Serialize;
use tracing::debug;

use super::{AccessLevel, Booking, EntryId, ItineraryEntry, ShareLink, Trip};

/// A trip with its entries and bookings, masked when built from a share link.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TripDetails {
    /// The trip.
    pub trip: Trip,
    /// Entries in storage order.
    pub entries: Vec<ItineraryEntry>,
    /// Bookings after masking.
    pub bookings: Vec<Booking>,
    /// Share link the view was resolved through.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub share_link: Option<ShareLink>,
    /// Caller's access level; `None` for anonymous share views.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access: Option<AccessLevel>,
}

impl TripDetails {
    /// Details for an authenticated caller.
    pub fn for_principal(
        trip: Trip,
        entries: Vec<ItineraryEntry>,
        bookings: Vec<Booking>,
        access: AccessLevel,
    ) -> Self {
        Self {
            trip,
            entries,
            bookings,
            share_link: None,
            access: Some(access),
        }
    }

    /// Details for an anonymous viewer, masked by `link`.
    pub fn shared(
        trip: Trip,
        entries: Vec<ItineraryEntry>,
        mut bookings: Vec<Booking>,
        link: ShareLink,
    ) -> Self {
        link.apply_masking(&mut bookings);
        Self {
            trip,
            entries,
            bookings,
            share_link: Some(link),
            access: None,
        }
    }

    /// Sum of booking costs per currency.
    ///
    /// Bookings without a currency count against the trip's default currency;
    /// those with neither are skipped along with costless bookings. A total
    /// that would overflow saturates at the decimal range limit.
    pub fn cost_totals(&self) -> BTreeMap<String, Decimal> {
        let mut totals = BTreeMap::new();
        for booking in &self.bookings {
            let Some(cost) = booking.cost else { continue };
            let Some(currency) = booking
                .currency
                .as_ref()
                .or(self.trip.default_currency.as_ref())
            else {
                continue;
            };
            let total = totals.entry(currency.clone()).or_insert(Decimal::ZERO);
            *total = match total.checked_add(cost) {
                Some(sum) => sum,
                None => {
                    debug!(currency = %currency, "booking cost total overflowed; saturating");
                    total.saturating_add(cost)
                }
            };
        }
        totals
    }

    /// The booking linked to `entry_id`, if any.
    pub fn booking_for_entry(&self, entry_id: &EntryId) -> Option<&Booking> {
        self.bookings
            .iter()
            .find(|booking| booking.entry_id.as_ref() == Some(entry_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{BookingDraft, BookingId, ItemType, TripId, UserId};
    use rstest::rstest;

    fn trip(currency: Option<&str>) -> Trip {
        Trip {
            owner_id: UserId::new("owner").expect("owner"),
            id: TripId::generate(),
            name: "Porto".to_owned(),
            slug: "porto".to_owned(),
            start_date: None,
            end_date: None,
            home_time_zone: None,
            default_currency: currency.map(str::to_owned),
            version: None,
        }
    }

    fn booking(cost: Option<i64>, currency: Option<&str>, entry: Option<EntryId>) -> Booking {
        BookingDraft {
            entry_id: entry,
            cost: cost.map(|value| Decimal::new(value, 0)),
            currency: currency.map(str::to_owned),
            ..BookingDraft::default()
        }
        .into_booking(TripId::generate(), BookingId::generate(), ItemType::Other)
        .expect("booking")
    }

    #[rstest]
    fn totals_group_by_currency_and_fall_back_to_trip_default() {
        let details = TripDetails::for_principal(
            trip(Some("GBP")),
            Vec::new(),
            vec![
                booking(Some(100), Some("EUR"), None),
                booking(Some(50), Some("eur"), None),
                booking(Some(20), None, None),
                booking(None, Some("USD"), None),
            ],
            AccessLevel::Owner,
        );
        let totals = details.cost_totals();
        assert_eq!(totals.get("EUR"), Some(&Decimal::new(150, 0)));
        assert_eq!(totals.get("GBP"), Some(&Decimal::new(20, 0)));
        assert!(!totals.contains_key("USD"));
    }

    #[rstest]
    fn costs_without_any_currency_are_skipped() {
        let details = TripDetails::for_principal(
            trip(None),
            Vec::new(),
            vec![booking(Some(20), None, None)],
            AccessLevel::Owner,
        );
        assert!(details.cost_totals().is_empty());
    }

    #[rstest]
    fn overflowing_totals_saturate() {
        let huge = || {
            BookingDraft {
                cost: Some(Decimal::MAX),
                currency: Some("EUR".to_owned()),
                ..BookingDraft::default()
            }
            .into_booking(TripId::generate(), BookingId::generate(), ItemType::Hotel)
            .expect("booking")
        };
        let details = TripDetails::for_principal(
            trip(None),
            Vec::new(),
            vec![huge(), huge()],
            AccessLevel::Owner,
        );
        assert_eq!(details.cost_totals().get("EUR"), Some(&Decimal::MAX));
    }

    #[rstest]
    fn finds_booking_by_linked_entry() {
        let entry_id = EntryId::generate();
        let details = TripDetails::for_principal(
            trip(None),
            Vec::new(),
            vec![booking(None, None, None), booking(None, None, Some(entry_id.clone()))],
            AccessLevel::ReadOnly,
        );
        let found = details.booking_for_entry(&entry_id).expect("linked booking");
        assert_eq!(found.entry_id.as_ref(), Some(&entry_id));
        assert!(details.booking_for_entry(&EntryId::generate()).is_none());
    }
}
