//! `Trips` rows: partition = owner user id, row = trip id.

use crate::domain::{DomainError, Trip, TripId, UserId, slugify};
use crate::outbound::table::store::TableEntity;

use super::decode::{read_date, read_string};
use super::encode::{write_date, write_string};
use super::parse_key;

const NAME: &str = "Name";
const SLUG: &str = "Slug";
const START_DATE: &str = "StartDate";
const END_DATE: &str = "EndDate";
const HOME_TIME_ZONE: &str = "HomeTimeZone";
const DEFAULT_CURRENCY: &str = "DefaultCurrency";

/// Property name holding the slug, used for per-owner slug lookups.
pub(crate) const SLUG_PROPERTY: &str = SLUG;

/// Encode a trip row.
pub fn encode_trip(trip: &Trip) -> TableEntity {
    let mut entity = TableEntity::new(trip.owner_id.as_str(), trip.id.as_str())
        .with_etag(trip.version.clone());
    write_string(&mut entity, NAME, Some(&trip.name));
    write_string(&mut entity, SLUG, Some(&trip.slug));
    write_date(&mut entity, START_DATE, trip.start_date);
    write_date(&mut entity, END_DATE, trip.end_date);
    write_string(&mut entity, HOME_TIME_ZONE, trip.home_time_zone.as_deref());
    write_string(&mut entity, DEFAULT_CURRENCY, trip.default_currency.as_deref());
    entity
}

/// Decode a trip row. A missing slug is derived from the name.
pub fn decode_trip(entity: &TableEntity) -> Result<Trip, DomainError> {
    let owner_id = parse_key(entity, &entity.partition_key, |raw| UserId::new(raw))?;
    let id = parse_key(entity, &entity.row_key, |raw| TripId::new(raw))?;
    let name = read_string(entity, NAME).unwrap_or_default();
    let slug = read_string(entity, SLUG).unwrap_or_else(|| slugify(&name));
    Ok(Trip {
        owner_id,
        id,
        name,
        slug,
        start_date: read_date(entity, START_DATE),
        end_date: read_date(entity, END_DATE),
        home_time_zone: read_string(entity, HOME_TIME_ZONE),
        default_currency: read_string(entity, DEFAULT_CURRENCY)
            .map(|code| code.to_ascii_uppercase()),
        version: entity.etag.clone(),
    })
}
