//! Bookings: payment and confirmation records attached to a trip.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{BookingId, DomainError, EntryId, ItemType, TripId, VersionTag};
use super::trip::normalise_currency;

/// Accommodation-specific booking details.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingStayMetadata {
    /// Room or unit description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub room_type: Option<String>,
    /// Number of guests on the reservation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub guests: Option<u32>,
    /// Whether breakfast is included.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub breakfast_included: Option<bool>,
    /// Key collection or arrival instructions.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub check_in_instructions: Option<String>,
}

impl BookingStayMetadata {
    /// True when no field carries a value.
    pub fn is_empty(&self) -> bool {
        self.room_type.is_none()
            && self.guests.is_none()
            && self.breakfast_included.is_none()
            && self.check_in_instructions.is_none()
    }
}

/// A booking, optionally linked to one itinerary entry.
///
/// The item type mirrors the linked entry and is never set directly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    /// Owning trip; the partition key.
    pub trip_id: TripId,
    /// Booking identifier; the row key.
    pub id: BookingId,
    /// Linked entry; at most one booking per entry.
    pub entry_id: Option<EntryId>,
    /// Category resolved from the linked entry.
    pub item_type: ItemType,
    /// Supplier.
    pub vendor: Option<String>,
    /// Supplier reference.
    pub reference: Option<String>,
    /// Total cost.
    pub cost: Option<Decimal>,
    /// Currency of `cost`.
    pub currency: Option<String>,
    /// Whether the booking can be refunded.
    pub is_refundable: bool,
    /// Whether the booking has been paid.
    pub is_paid: Option<bool>,
    /// Cancellation terms.
    pub cancellation_policy: Option<String>,
    /// Last day a free cancellation is possible.
    pub cancel_by: Option<NaiveDate>,
    /// Confirmation text.
    pub confirmation_details: Option<String>,
    /// Link to the confirmation.
    pub confirmation_url: Option<String>,
    /// Stay details.
    pub stay_metadata: Option<BookingStayMetadata>,
    /// Store-issued entity tag.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<VersionTag>,
}

impl Booking {
    /// True when a cost is recorded.
    pub fn has_cost(&self) -> bool {
        self.cost.is_some()
    }

    /// Whether the booking can still be cancelled on `date`.
    ///
    /// Non-refundable bookings never can; refundable ones without a deadline
    /// always can.
    pub fn is_cancellable_on(&self, date: NaiveDate) -> bool {
        self.is_refundable && self.cancel_by.is_none_or(|deadline| date <= deadline)
    }

    /// Remove cost-related fields.
    pub fn strip_cost(&mut self) {
        self.cost = None;
        self.currency = None;
        self.is_paid = None;
        self.confirmation_url = None;
    }

    /// Remove confirmation text and link.
    pub fn strip_confirmation(&mut self) {
        self.confirmation_details = None;
        self.confirmation_url = None;
    }
}

/// Editable booking fields shared by create and update.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BookingDraft {
    /// Entry to link, if any.
    pub entry_id: Option<EntryId>,
    /// Supplier.
    pub vendor: Option<String>,
    /// Supplier reference.
    pub reference: Option<String>,
    /// Total cost.
    pub cost: Option<Decimal>,
    /// Currency of `cost`.
    pub currency: Option<String>,
    /// Refundable flag.
    pub is_refundable: bool,
    /// Paid flag.
    pub is_paid: Option<bool>,
    /// Cancellation terms.
    pub cancellation_policy: Option<String>,
    /// Free cancellation deadline.
    pub cancel_by: Option<NaiveDate>,
    /// Confirmation text.
    pub confirmation_details: Option<String>,
    /// Confirmation link.
    pub confirmation_url: Option<String>,
    /// Stay details.
    pub stay_metadata: Option<BookingStayMetadata>,
}

impl BookingDraft {
    /// Validate the draft and build the booking it describes.
    ///
    /// `item_type` comes from the linked entry resolved by the repository.
    pub fn into_booking(
        self,
        trip_id: TripId,
        id: BookingId,
        item_type: ItemType,
    ) -> Result<Booking, DomainError> {
        if self.cost.is_some_and(|cost| cost.is_sign_negative()) {
            return Err(DomainError::invalid_request("booking cost must not be negative"));
        }
        Ok(Booking {
            trip_id,
            id,
            entry_id: self.entry_id,
            item_type,
            vendor: self.vendor,
            reference: self.reference,
            cost: self.cost,
            currency: normalise_currency(self.currency.as_deref())?,
            is_refundable: self.is_refundable,
            is_paid: self.is_paid,
            cancellation_policy: self.cancellation_policy,
            cancel_by: self.cancel_by,
            confirmation_details: self.confirmation_details,
            confirmation_url: self.confirmation_url,
            stay_metadata: self.stay_metadata.filter(|metadata| !metadata.is_empty()),
            version: None,
        })
    }
}

/// Update payload for a booking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingUpdate {
    /// Owning trip.
    pub trip_id: TripId,
    /// Booking to update.
    pub booking_id: BookingId,
    /// Entity tag captured at read time; the write fails if it is stale.
    pub version: VersionTag,
    /// New field values.
    pub draft: BookingDraft,
}
