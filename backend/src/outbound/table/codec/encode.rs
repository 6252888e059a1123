//! Set-or-clear property writers.
//!
//! A present value is written; an absent or blank one removes the property
//! so rows never carry empty strings or nulls.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::debug;

use super::DATE_FORMAT;
use crate::outbound::table::store::{PropertyValue, TableEntity};

/// Trimmed text, cleared when blank.
pub fn write_string(entity: &mut TableEntity, name: &str, value: Option<&str>) {
    match value.map(str::trim).filter(|text| !text.is_empty()) {
        Some(text) => entity.set(name, PropertyValue::String(text.to_owned())),
        None => entity.remove(name),
    }
}

/// Boolean, cleared when absent.
pub fn write_bool(entity: &mut TableEntity, name: &str, value: Option<bool>) {
    match value {
        Some(flag) => entity.set(name, PropertyValue::Bool(flag)),
        None => entity.remove(name),
    }
}

/// 32-bit integer, cleared when absent.
pub fn write_i32(entity: &mut TableEntity, name: &str, value: Option<i32>) {
    match value {
        Some(number) => entity.set(name, PropertyValue::Int32(number)),
        None => entity.remove(name),
    }
}

/// Finite double, cleared otherwise.
pub fn write_f64(entity: &mut TableEntity, name: &str, value: Option<f64>) {
    match value.filter(|number| number.is_finite()) {
        Some(number) => entity.set(name, PropertyValue::Double(number)),
        None => entity.remove(name),
    }
}

/// Decimal written as its exact text form.
pub fn write_decimal(entity: &mut TableEntity, name: &str, value: Option<Decimal>) {
    match value {
        Some(amount) => entity.set(name, PropertyValue::String(amount.normalize().to_string())),
        None => entity.remove(name),
    }
}

/// Calendar date as `yyyy-MM-dd`.
pub fn write_date(entity: &mut TableEntity, name: &str, value: Option<NaiveDate>) {
    match value {
        Some(date) => entity.set(
            name,
            PropertyValue::String(date.format(DATE_FORMAT).to_string()),
        ),
        None => entity.remove(name),
    }
}

/// Native timestamp.
pub fn write_datetime(entity: &mut TableEntity, name: &str, value: Option<DateTime<Utc>>) {
    match value {
        Some(instant) => entity.set(name, PropertyValue::DateTime(instant)),
        None => entity.remove(name),
    }
}

/// Compact JSON blob; cleared when absent, empty, or unserialisable.
pub fn write_json<T: Serialize>(entity: &mut TableEntity, name: &str, value: Option<&T>) {
    let encoded = value.and_then(|value| match serde_json::to_value(value) {
        Ok(json) => Some(json),
        Err(error) => {
            debug!(property = name, %error, "metadata not serialisable; clearing");
            None
        }
    });
    let blob = encoded
        .filter(|json| !(json.is_null() || json.as_object().is_some_and(|map| map.is_empty())))
        .map(|json| json.to_string());
    write_string(entity, name, blob.as_deref());
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    fn entity_with_title() -> TableEntity {
        let mut entity = TableEntity::new("p", "r");
        entity.set("Title", "old".into());
        entity
    }

    #[rstest]
    #[case(Some("  Louvre  "), Some("Louvre"))]
    #[case(Some("   "), None)]
    #[case(None, None)]
    fn strings_are_trimmed_or_cleared(#[case] input: Option<&str>, #[case] stored: Option<&str>) {
        let mut entity = entity_with_title();
        write_string(&mut entity, "Title", input);
        assert_eq!(entity.get("Title").and_then(PropertyValue::as_str), stored);
    }

    #[rstest]
    fn decimals_keep_exact_text() {
        let mut entity = TableEntity::new("p", "r");
        write_decimal(&mut entity, "Cost", Some(Decimal::new(12_050, 2)));
        assert_eq!(entity.get("Cost").and_then(PropertyValue::as_str), Some("120.5"));
    }

    #[rstest]
    fn dates_use_iso_format() {
        let mut entity = TableEntity::new("p", "r");
        write_date(&mut entity, "Date", NaiveDate::from_ymd_opt(2024, 1, 9));
        assert_eq!(entity.get("Date").and_then(PropertyValue::as_str), Some("2024-01-09"));
    }

    #[rstest]
    #[case(json!({}), None)]
    #[case(json!(null), None)]
    #[case(json!({ "seat": "12A" }), Some(r#"{"seat":"12A"}"#))]
    fn json_blobs_skip_empty_objects(
        #[case] value: serde_json::Value,
        #[case] stored: Option<&str>,
    ) {
        let mut entity = TableEntity::new("p", "r");
        write_json(&mut entity, "MetadataJson", Some(&value));
        assert_eq!(
            entity.get("MetadataJson").and_then(PropertyValue::as_str),
            stored
        );
    }
}
