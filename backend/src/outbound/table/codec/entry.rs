//! `ItineraryEntries` rows: partition = trip id, row = entry id.

use crate::domain::{
    DomainError, EntryId, EntryLocation, EntryMetadata, ItemType, ItineraryEntry, TripId,
    normalise_tags,
};
use crate::outbound::table::store::TableEntity;

use super::decode::{read_bool, read_date, read_f64, read_i32, read_json, read_string};
use super::encode::{write_bool, write_date, write_f64, write_i32, write_json, write_string};
use super::parse_key;

const TITLE: &str = "Title";
const DATE: &str = "Date";
const END_DATE: &str = "EndDate";
const IS_MULTI_DAY: &str = "IsMultiDay";
const ITEM_TYPE: &str = "ItemType";
const DETAILS: &str = "Details";
const TAGS: &str = "Tags";
const METADATA_JSON: &str = "MetadataJson";
const SORT_ORDER: &str = "SortOrder";
const LOCATION_NAME: &str = "LocationName";
const LOCATION_URL: &str = "LocationUrl";
const LOCATION_NOTES: &str = "LocationNotes";
const LATITUDE: &str = "Latitude";
const LONGITUDE: &str = "Longitude";

/// Encode an entry row.
pub fn encode_entry(entry: &ItineraryEntry) -> TableEntity {
    let mut entity = TableEntity::new(entry.trip_id.as_str(), entry.id.as_str())
        .with_etag(entry.version.clone());
    write_string(&mut entity, TITLE, Some(&entry.title));
    write_date(&mut entity, DATE, entry.date);
    write_date(&mut entity, END_DATE, entry.end_date);
    write_bool(&mut entity, IS_MULTI_DAY, Some(entry.is_multi_day));
    write_string(&mut entity, ITEM_TYPE, Some(entry.item_type.storage_name()));
    write_string(&mut entity, DETAILS, entry.details.as_deref());
    let tags = normalise_tags(&entry.tags).join(",");
    write_string(&mut entity, TAGS, Some(&tags));
    write_json(&mut entity, METADATA_JSON, entry.metadata.as_ref());
    write_i32(&mut entity, SORT_ORDER, entry.sort_order);

    let location = entry.location.clone().unwrap_or_default();
    write_string(&mut entity, LOCATION_NAME, location.name.as_deref());
    write_string(&mut entity, LOCATION_URL, location.url.as_deref());
    write_string(&mut entity, LOCATION_NOTES, location.notes.as_deref());
    write_f64(&mut entity, LATITUDE, location.latitude);
    write_f64(&mut entity, LONGITUDE, location.longitude);
    entity
}

/// Decode an entry row.
pub fn decode_entry(entity: &TableEntity) -> Result<ItineraryEntry, DomainError> {
    let trip_id = parse_key(entity, &entity.partition_key, |raw| TripId::new(raw))?;
    let id = parse_key(entity, &entity.row_key, |raw| EntryId::new(raw))?;
    let location = EntryLocation {
        name: read_string(entity, LOCATION_NAME),
        url: read_string(entity, LOCATION_URL),
        latitude: read_f64(entity, LATITUDE),
        longitude: read_f64(entity, LONGITUDE),
        notes: read_string(entity, LOCATION_NOTES),
    };
    let tags = read_string(entity, TAGS)
        .map(|raw| normalise_tags(raw.split(',')))
        .unwrap_or_default();
    Ok(ItineraryEntry {
        trip_id,
        id,
        date: read_date(entity, DATE),
        end_date: read_date(entity, END_DATE),
        is_multi_day: read_bool(entity, IS_MULTI_DAY).unwrap_or(false),
        item_type: read_string(entity, ITEM_TYPE)
            .map_or(ItemType::Other, |raw| ItemType::from_stored(&raw)),
        title: read_string(entity, TITLE).unwrap_or_default(),
        details: read_string(entity, DETAILS),
        location: (!location.is_empty()).then_some(location),
        tags,
        metadata: read_json::<EntryMetadata>(entity, METADATA_JSON)
            .filter(|metadata| !metadata.is_empty()),
        sort_order: read_i32(entity, SORT_ORDER),
        version: entity.etag.clone(),
    })
}
