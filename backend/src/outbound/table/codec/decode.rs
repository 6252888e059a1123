//! Tolerant property readers.
//!
//! Each reader tries the representations older rows may hold, in order, and
//! resolves to `None` when none applies. Readers never fail.

use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::outbound::table::store::{PropertyValue, TableEntity};
use super::DATE_FORMAT;

/// Trimmed, non-blank text.
pub fn read_string(entity: &TableEntity, name: &str) -> Option<String> {
    let text = match entity.get(name)? {
        PropertyValue::String(value) => value.trim().to_owned(),
        PropertyValue::Int32(value) => value.to_string(),
        PropertyValue::Int64(value) => value.to_string(),
        PropertyValue::Decimal(value) => value.to_string(),
        _ => return None,
    };
    (!text.is_empty()).then_some(text)
}

/// Native boolean, `"true"`/`"false"` style text, or a 0/1 integer.
pub fn read_bool(entity: &TableEntity, name: &str) -> Option<bool> {
    match entity.get(name)? {
        PropertyValue::Bool(value) => Some(*value),
        PropertyValue::String(value) => parse_bool_text(value),
        PropertyValue::Int32(value) => int_to_bool(i64::from(*value)),
        PropertyValue::Int64(value) => int_to_bool(*value),
        _ => None,
    }
}

fn parse_bool_text(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "1" => Some(true),
        "false" | "no" | "0" => Some(false),
        _ => None,
    }
}

fn int_to_bool(value: i64) -> Option<bool> {
    match value {
        0 => Some(false),
        1 => Some(true),
        _ => None,
    }
}

/// 32-bit integer from any numeric representation that fits exactly.
pub fn read_i32(entity: &TableEntity, name: &str) -> Option<i32> {
    match entity.get(name)? {
        PropertyValue::Int32(value) => Some(*value),
        PropertyValue::Int64(value) => i32::try_from(*value).ok(),
        PropertyValue::Double(value) if value.fract() == 0.0 => {
            Decimal::try_from(*value).ok().and_then(|d| d.to_i32())
        }
        PropertyValue::Decimal(value) if value.fract().is_zero() => value.to_i32(),
        PropertyValue::String(value) => value.trim().parse().ok(),
        _ => None,
    }
}

/// Double from any numeric representation.
pub fn read_f64(entity: &TableEntity, name: &str) -> Option<f64> {
    let value = match entity.get(name)? {
        PropertyValue::Double(value) => *value,
        PropertyValue::Int32(value) => f64::from(*value),
        PropertyValue::Int64(value) => value.to_f64()?,
        PropertyValue::Decimal(value) => value.to_f64()?,
        PropertyValue::String(value) => value.trim().parse().ok()?,
        _ => return None,
    };
    value.is_finite().then_some(value)
}

/// Exact decimal from a native decimal, a double, an integer or text.
pub fn read_decimal(entity: &TableEntity, name: &str) -> Option<Decimal> {
    match entity.get(name)? {
        PropertyValue::Decimal(value) => Some(*value),
        PropertyValue::Double(value) => Decimal::try_from(*value).ok(),
        PropertyValue::Int32(value) => Some(Decimal::from(*value)),
        PropertyValue::Int64(value) => Some(Decimal::from(*value)),
        PropertyValue::String(value) => {
            let trimmed = value.trim();
            Decimal::from_str(trimmed)
                .or_else(|_| Decimal::from_scientific(trimmed))
                .ok()
        }
        _ => None,
    }
}

/// Calendar date from a timestamp, a `yyyy-MM-dd` string or an RFC 3339
/// string.
pub fn read_date(entity: &TableEntity, name: &str) -> Option<NaiveDate> {
    match entity.get(name)? {
        PropertyValue::DateTime(value) => Some(value.date_naive()),
        PropertyValue::String(value) => parse_date_text(value.trim()),
        _ => None,
    }
}

fn parse_date_text(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw, DATE_FORMAT)
        .ok()
        .or_else(|| {
            DateTime::parse_from_rfc3339(raw)
                .ok()
                .map(|value| value.date_naive())
        })
}

/// Timestamp from a native value, RFC 3339 text, or a bare date taken as
/// midnight UTC.
pub fn read_datetime(entity: &TableEntity, name: &str) -> Option<DateTime<Utc>> {
    match entity.get(name)? {
        PropertyValue::DateTime(value) => Some(*value),
        PropertyValue::String(value) => {
            let raw = value.trim();
            DateTime::parse_from_rfc3339(raw)
                .map(|value| value.with_timezone(&Utc))
                .ok()
                .or_else(|| {
                    NaiveDate::parse_from_str(raw, DATE_FORMAT)
                        .ok()
                        .map(|date| date.and_time(NaiveTime::MIN).and_utc())
                })
        }
        _ => None,
    }
}

/// JSON blob stored as text. Malformed blobs resolve to `None`.
pub fn read_json<T: DeserializeOwned>(entity: &TableEntity, name: &str) -> Option<T> {
    let raw = read_string(entity, name)?;
    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(error) => {
            debug!(property = name, key = %entity.key(), %error, "dropping malformed metadata");
            None
        }
    }
}
