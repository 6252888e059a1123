//! Trips: the aggregate root of the itinerary.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{DomainError, TripId, UserId, VersionTag};

/// A trip owned by a user.
///
/// Entries, bookings, access grants and share links live in their own rows
/// keyed by the trip id; deleting the trip row does not remove them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trip {
    /// Owning user; the partition key of the trip row.
    pub owner_id: UserId,
    /// Trip identifier; the row key.
    pub id: TripId,
    /// Display name.
    pub name: String,
    /// URL-safe slug, unique per owner by convention.
    pub slug: String,
    /// First day of the trip.
    pub start_date: Option<NaiveDate>,
    /// Last day of the trip.
    pub end_date: Option<NaiveDate>,
    /// IANA time zone the traveller calls home.
    pub home_time_zone: Option<String>,
    /// Three-letter default currency code.
    pub default_currency: Option<String>,
    /// Store-issued entity tag.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<VersionTag>,
}

impl Trip {
    /// Inclusive start and end dates, swapped when stored inverted.
    pub fn date_range(&self) -> Option<(NaiveDate, NaiveDate)> {
        match (self.start_date, self.end_date) {
            (Some(start), Some(end)) if end < start => Some((end, start)),
            (Some(start), Some(end)) => Some((start, end)),
            _ => None,
        }
    }

    /// Number of calendar days covered, counting both ends.
    ///
    /// # Examples
    /// ```
    /// # use chrono::NaiveDate;
    /// # use itinerary::domain::{Trip, TripId, UserId};
    /// let trip = Trip {
    ///     owner_id: UserId::new("owner").expect("user id"),
    ///     id: TripId::generate(),
    ///     name: "Kyoto".to_owned(),
    ///     slug: "kyoto".to_owned(),
    ///     start_date: NaiveDate::from_ymd_opt(2024, 5, 1),
    ///     end_date: NaiveDate::from_ymd_opt(2024, 5, 4),
    ///     home_time_zone: None,
    ///     default_currency: None,
    ///     version: None,
    /// };
    /// assert_eq!(trip.duration_days(), Some(4));
    /// ```
    pub fn duration_days(&self) -> Option<i64> {
        self.date_range()
            .map(|(start, end)| (end - start).num_days() + 1)
    }
}

/// Editable trip fields shared by create and update.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TripDraft {
    /// Display name; required.
    pub name: String,
    /// Requested slug; derived from the name when blank.
    pub slug: Option<String>,
    /// First day.
    pub start_date: Option<NaiveDate>,
    /// Last day.
    pub end_date: Option<NaiveDate>,
    /// Home time zone.
    pub home_time_zone: Option<String>,
    /// Default currency code.
    pub default_currency: Option<String>,
}

impl TripDraft {
    /// Draft with only a name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Trimmed name, rejecting blanks.
    pub fn validated_name(&self) -> Result<String, DomainError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(DomainError::invalid_request("trip name must not be blank"));
        }
        Ok(name.to_owned())
    }

    /// Upper-cased currency code, rejecting anything but three letters.
    pub fn validated_currency(&self) -> Result<Option<String>, DomainError> {
        normalise_currency(self.default_currency.as_deref())
    }
}

/// Normalise an optional currency code to three upper-case ASCII letters.
///
/// Blank input is treated as absent.
pub fn normalise_currency(raw: Option<&str>) -> Result<Option<String>, DomainError> {
    let Some(code) = raw.map(str::trim).filter(|code| !code.is_empty()) else {
        return Ok(None);
    };
    if code.len() != 3 || !code.chars().all(|ch| ch.is_ascii_alphabetic()) {
        return Err(DomainError::invalid_request(format!(
            "currency must be a three-letter code, got {code:?}"
        )));
    }
    Ok(Some(code.to_ascii_uppercase()))
}

/// Update payload: the draft plus the version read by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TripUpdate {
    /// Trip to update.
    pub trip_id: TripId,
    /// Entity tag captured at read time; the write fails if it is stale.
    pub version: VersionTag,
    /// New field values.
    pub draft: TripDraft,
}

/// A trip together with the caller's access level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessibleTrip {
    /// The trip.
    pub trip: Trip,
    /// How the caller may act on it.
    pub access: super::AccessLevel,
}
