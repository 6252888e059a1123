//! `Bookings` rows: partition = trip id, row = booking id.

use crate::domain::{
    Booking, BookingId, BookingStayMetadata, DomainError, EntryId, ItemType, TripId,
};
use crate::outbound::table::store::TableEntity;

use super::decode::{read_bool, read_date, read_decimal, read_json, read_string};
use super::encode::{write_bool, write_date, write_decimal, write_json, write_string};
use super::parse_key;

/// Property holding the linked entry id, used for the uniqueness pre-check.
pub(crate) const ENTRY_ID: &str = "EntryId";
const ITEM_TYPE: &str = "ItemType";
const VENDOR: &str = "Vendor";
const REFERENCE: &str = "Reference";
const COST: &str = "Cost";
const CURRENCY: &str = "Currency";
const IS_REFUNDABLE: &str = "IsRefundable";
const IS_PAID: &str = "IsPaid";
const CANCELLATION_POLICY: &str = "CancellationPolicy";
const CANCEL_BY: &str = "CancelBy";
const CONFIRMATION_DETAILS: &str = "ConfirmationDetails";
const CONFIRMATION_URL: &str = "ConfirmationUrl";
const BOOKING_METADATA_JSON: &str = "BookingMetadataJson";

/// Encode a booking row.
pub fn encode_booking(booking: &Booking) -> TableEntity {
    let mut entity = TableEntity::new(booking.trip_id.as_str(), booking.id.as_str())
        .with_etag(booking.version.clone());
    write_string(&mut entity, ENTRY_ID, booking.entry_id.as_ref().map(EntryId::as_str));
    write_string(&mut entity, ITEM_TYPE, Some(booking.item_type.storage_name()));
    write_string(&mut entity, VENDOR, booking.vendor.as_deref());
    write_string(&mut entity, REFERENCE, booking.reference.as_deref());
    write_decimal(&mut entity, COST, booking.cost);
    write_string(&mut entity, CURRENCY, booking.currency.as_deref());
    write_bool(&mut entity, IS_REFUNDABLE, Some(booking.is_refundable));
    write_bool(&mut entity, IS_PAID, booking.is_paid);
    write_string(
        &mut entity,
        CANCELLATION_POLICY,
        booking.cancellation_policy.as_deref(),
    );
    write_date(&mut entity, CANCEL_BY, booking.cancel_by);
    write_string(
        &mut entity,
        CONFIRMATION_DETAILS,
        booking.confirmation_details.as_deref(),
    );
    write_string(&mut entity, CONFIRMATION_URL, booking.confirmation_url.as_deref());
    write_json(
        &mut entity,
        BOOKING_METADATA_JSON,
        booking.stay_metadata.as_ref(),
    );
    entity
}

/// Decode a booking row.
pub fn decode_booking(entity: &TableEntity) -> Result<Booking, DomainError> {
    let trip_id = parse_key(entity, &entity.partition_key, |raw| TripId::new(raw))?;
    let id = parse_key(entity, &entity.row_key, |raw| BookingId::new(raw))?;
    Ok(Booking {
        trip_id,
        id,
        entry_id: read_string(entity, ENTRY_ID).and_then(|raw| EntryId::new(raw).ok()),
        item_type: read_string(entity, ITEM_TYPE)
            .map_or(ItemType::Other, |raw| ItemType::from_stored(&raw)),
        vendor: read_string(entity, VENDOR),
        reference: read_string(entity, REFERENCE),
        cost: read_decimal(entity, COST),
        currency: read_string(entity, CURRENCY).map(|code| code.to_ascii_uppercase()),
        is_refundable: read_bool(entity, IS_REFUNDABLE).unwrap_or(false),
        is_paid: read_bool(entity, IS_PAID),
        cancellation_policy: read_string(entity, CANCELLATION_POLICY),
        cancel_by: read_date(entity, CANCEL_BY),
        confirmation_details: read_string(entity, CONFIRMATION_DETAILS),
        confirmation_url: read_string(entity, CONFIRMATION_URL),
        stay_metadata: read_json::<BookingStayMetadata>(entity, BOOKING_METADATA_JSON)
            .filter(|metadata| !metadata.is_empty()),
        version: entity.etag.clone(),
    })
}
