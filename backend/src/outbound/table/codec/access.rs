//! `TripAccess` rows: partition = trip id, row = access id.

use crate::domain::{AccessId, AccessLevel, DomainError, EmailAddress, TripAccess, TripId, UserId};
use crate::outbound::table::store::TableEntity;

use super::decode::{read_datetime, read_string};
use super::encode::{write_datetime, write_string};
use super::parse_key;

/// Grantee email property.
pub(crate) const EMAIL: &str = "Email";
/// Resolved grantee user id property.
pub(crate) const USER_ID: &str = "UserId";
const PERMISSION: &str = "Permission";
const CREATED_ON: &str = "CreatedOn";
const CREATED_BY: &str = "CreatedBy";

/// Encode an access grant row.
pub fn encode_access(access: &TripAccess) -> TableEntity {
    let mut entity = TableEntity::new(access.trip_id.as_str(), access.id.as_str())
        .with_etag(access.version.clone());
    write_string(&mut entity, EMAIL, Some(access.email.as_str()));
    write_string(&mut entity, USER_ID, access.user_id.as_ref().map(UserId::as_str));
    write_string(&mut entity, PERMISSION, Some(access.level.storage_name()));
    write_datetime(&mut entity, CREATED_ON, access.created_on);
    write_string(
        &mut entity,
        CREATED_BY,
        access.created_by.as_ref().map(UserId::as_str),
    );
    entity
}

/// Decode an access grant row.
///
/// The grantee email is the grant's identity; a row without a valid one is an
/// integrity fault.
pub fn decode_access(entity: &TableEntity) -> Result<TripAccess, DomainError> {
    let trip_id = parse_key(entity, &entity.partition_key, |raw| TripId::new(raw))?;
    let id = parse_key(entity, &entity.row_key, |raw| AccessId::new(raw))?;
    let email = read_string(entity, EMAIL)
        .and_then(|raw| EmailAddress::new(raw).ok())
        .ok_or_else(|| {
            DomainError::data_integrity(format!("access row {} has no valid email", entity.key()))
        })?;
    Ok(TripAccess {
        trip_id,
        id,
        email,
        user_id: read_string(entity, USER_ID).and_then(|raw| UserId::new(raw).ok()),
        level: read_string(entity, PERMISSION)
            .map_or(AccessLevel::ReadOnly, |raw| AccessLevel::from_stored(&raw)),
        created_on: read_datetime(entity, CREATED_ON),
        created_by: read_string(entity, CREATED_BY).and_then(|raw| UserId::new(raw).ok()),
        version: entity.etag.clone(),
    })
}
