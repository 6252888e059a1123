//! `ShareLinks` rows (partition = trip id, row = share code) and
//! `SavedShareLinks` rows (partition = user id, row = saved link id).

use crate::domain::{DomainError, SavedLinkId, SavedShareLink, ShareCode, ShareLink, TripId, UserId};
use crate::outbound::table::store::TableEntity;

use super::decode::{read_bool, read_datetime, read_string};
use super::encode::{write_bool, write_datetime, write_string};
use super::parse_key;

const OWNER_USER_ID: &str = "OwnerUserId";
const CREATED_ON: &str = "CreatedOn";
const CREATED_BY: &str = "CreatedBy";
const EXPIRES_ON: &str = "ExpiresOn";
const MASK_BOOKINGS: &str = "MaskBookings";
const INCLUDE_COST: &str = "IncludeCost";
const SHOW_BOOKING_CONFIRMATIONS: &str = "ShowBookingConfirmations";
const SHOW_BOOKING_METADATA: &str = "ShowBookingMetadata";
const NOTES: &str = "Notes";

/// Saved code property, used to find an existing bookmark.
pub(crate) const SHARE_CODE: &str = "ShareCode";
const TRIP_NAME: &str = "TripName";
const SAVED_ON: &str = "SavedOn";

/// Encode a share link row.
pub fn encode_share_link(link: &ShareLink) -> TableEntity {
    let mut entity = TableEntity::new(link.trip_id.as_str(), link.code.as_str())
        .with_etag(link.version.clone());
    write_string(&mut entity, OWNER_USER_ID, Some(link.owner_id.as_str()));
    write_datetime(&mut entity, CREATED_ON, link.created_on);
    write_string(
        &mut entity,
        CREATED_BY,
        link.created_by.as_ref().map(UserId::as_str),
    );
    write_datetime(&mut entity, EXPIRES_ON, link.expires_on);
    write_bool(&mut entity, MASK_BOOKINGS, Some(link.mask_bookings));
    write_bool(&mut entity, INCLUDE_COST, Some(link.include_cost));
    write_bool(
        &mut entity,
        SHOW_BOOKING_CONFIRMATIONS,
        Some(link.show_booking_confirmations),
    );
    write_bool(
        &mut entity,
        SHOW_BOOKING_METADATA,
        Some(link.show_booking_metadata),
    );
    write_string(&mut entity, NOTES, link.notes.as_deref());
    entity
}

/// Decode a share link row.
///
/// A link without an owner reference cannot be resolved to its trip; that is
/// reported as a data-integrity fault rather than a miss. Missing flags take
/// the restrictive default.
pub fn decode_share_link(entity: &TableEntity) -> Result<ShareLink, DomainError> {
    let trip_id = parse_key(entity, &entity.partition_key, |raw| TripId::new(raw))?;
    let code = parse_key(entity, &entity.row_key, |raw| ShareCode::new(raw))?;
    let owner_id = read_string(entity, OWNER_USER_ID)
        .and_then(|raw| UserId::new(raw).ok())
        .ok_or_else(|| {
            DomainError::data_integrity(format!(
                "share link {} is missing its owner reference",
                entity.key()
            ))
        })?;
    Ok(ShareLink {
        trip_id,
        code,
        owner_id,
        created_on: read_datetime(entity, CREATED_ON),
        created_by: read_string(entity, CREATED_BY).and_then(|raw| UserId::new(raw).ok()),
        expires_on: read_datetime(entity, EXPIRES_ON),
        mask_bookings: read_bool(entity, MASK_BOOKINGS).unwrap_or(false),
        include_cost: read_bool(entity, INCLUDE_COST).unwrap_or(false),
        show_booking_confirmations: read_bool(entity, SHOW_BOOKING_CONFIRMATIONS)
            .unwrap_or(false),
        show_booking_metadata: read_bool(entity, SHOW_BOOKING_METADATA).unwrap_or(false),
        notes: read_string(entity, NOTES),
        version: entity.etag.clone(),
    })
}

/// Encode a saved share link row.
pub fn encode_saved_link(saved: &SavedShareLink) -> TableEntity {
    let mut entity = TableEntity::new(saved.user_id.as_str(), saved.id.as_str());
    write_string(&mut entity, SHARE_CODE, Some(saved.code.as_str()));
    write_string(&mut entity, TRIP_NAME, saved.trip_name.as_deref());
    write_datetime(&mut entity, SAVED_ON, saved.saved_on);
    entity
}

/// Decode a saved share link row.
pub fn decode_saved_link(entity: &TableEntity) -> Result<SavedShareLink, DomainError> {
    let user_id = parse_key(entity, &entity.partition_key, |raw| UserId::new(raw))?;
    let id = parse_key(entity, &entity.row_key, |raw| SavedLinkId::new(raw))?;
    let code = read_string(entity, SHARE_CODE)
        .and_then(|raw| ShareCode::new(raw).ok())
        .ok_or_else(|| {
            DomainError::data_integrity(format!("saved link {} has no share code", entity.key()))
        })?;
    Ok(SavedShareLink {
        user_id,
        id,
        code,
        trip_name: read_string(entity, TRIP_NAME),
        saved_on: read_datetime(entity, SAVED_ON),
    })
}
