//! Itinerary entries and their structured metadata.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{DomainError, EntryId, ItemType, TripId, VersionTag};

/// A named geographic point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceRef {
    /// Label shown on the map.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Latitude in decimal degrees.
    pub latitude: f64,
    /// Longitude in decimal degrees.
    pub longitude: f64,
}

impl PlaceRef {
    /// Whether two references point at the same labelled coordinate.
    pub fn same_place(&self, other: &Self) -> bool {
        self.name == other.name
            && (self.latitude - other.latitude).abs() < f64::EPSILON
            && (self.longitude - other.longitude).abs() < f64::EPSILON
    }
}

/// Where an entry takes place.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryLocation {
    /// Display label.
    pub name: Option<String>,
    /// Link to a map or venue page.
    pub url: Option<String>,
    /// Latitude in decimal degrees.
    pub latitude: Option<f64>,
    /// Longitude in decimal degrees.
    pub longitude: Option<f64>,
    /// Free-text directions.
    pub notes: Option<String>,
}

impl EntryLocation {
    /// True when no field carries a value.
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.url.is_none()
            && self.latitude.is_none()
            && self.longitude.is_none()
            && self.notes.is_none()
    }

    /// The mappable point, when both coordinates are known.
    pub fn place(&self) -> Option<PlaceRef> {
        Some(PlaceRef {
            name: self.name.clone(),
            latitude: self.latitude?,
            longitude: self.longitude?,
        })
    }
}

/// Travel-segment details for flights and other transport.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlightMetadata {
    /// Operating carrier.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub airline: Option<String>,
    /// Flight or service number.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flight_number: Option<String>,
    /// Departure airport or station code.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub departure_airport: Option<String>,
    /// Departure terminal.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub departure_terminal: Option<String>,
    /// Local departure time as entered.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub departure_time: Option<String>,
    /// Arrival airport or station code.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub arrival_airport: Option<String>,
    /// Arrival terminal.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub arrival_terminal: Option<String>,
    /// Local arrival time as entered.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub arrival_time: Option<String>,
    /// Seat assignment.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seat: Option<String>,
    /// Departure point for the map.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub departure_place: Option<PlaceRef>,
    /// Arrival point for the map.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub arrival_place: Option<PlaceRef>,
}

/// Accommodation details.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StayMetadata {
    /// Earliest check-in time.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub check_in_time: Option<String>,
    /// Latest check-out time.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub check_out_time: Option<String>,
    /// Street address.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    /// Contact phone number.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    /// Host or property manager.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host_name: Option<String>,
}

/// Structured metadata stored as one JSON blob.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryMetadata {
    /// Travel segment.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flight: Option<FlightMetadata>,
    /// Accommodation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stay: Option<StayMetadata>,
}

impl EntryMetadata {
    /// True when neither sub-record is present.
    pub fn is_empty(&self) -> bool {
        self.flight.is_none() && self.stay.is_none()
    }
}

/// A dated item within a trip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItineraryEntry {
    /// Owning trip; the partition key.
    pub trip_id: TripId,
    /// Entry identifier; the row key.
    pub id: EntryId,
    /// Day the entry happens (or starts). Legacy rows may lack it.
    pub date: Option<NaiveDate>,
    /// Last day for multi-day entries.
    pub end_date: Option<NaiveDate>,
    /// Whether the entry spans several days.
    pub is_multi_day: bool,
    /// Category.
    pub item_type: ItemType,
    /// Short title.
    pub title: String,
    /// Free-text details.
    pub details: Option<String>,
    /// Location, when known.
    pub location: Option<EntryLocation>,
    /// Tags, deduplicated.
    pub tags: Vec<String>,
    /// Structured metadata.
    pub metadata: Option<EntryMetadata>,
    /// Explicit position within the day.
    pub sort_order: Option<i32>,
    /// Store-issued entity tag.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<VersionTag>,
}

impl ItineraryEntry {
    /// True when the entry should render as a block across several days.
    ///
    /// Multi-day entries without an end date, or ending on their start date,
    /// render as single-day entries.
    pub fn spans_multiple_days(&self) -> bool {
        match (self.is_multi_day, self.date, self.end_date) {
            (true, Some(start), Some(end)) => start != end,
            _ => false,
        }
    }

    /// End date when the entry spans days, otherwise its date.
    pub fn effective_end_date(&self) -> Option<NaiveDate> {
        if self.spans_multiple_days() {
            self.end_date
        } else {
            self.date
        }
    }
}

/// Editable entry fields shared by create and update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryDraft {
    /// Day of the entry.
    pub date: NaiveDate,
    /// Last day when multi-day.
    pub end_date: Option<NaiveDate>,
    /// Multi-day flag.
    #[serde(default)]
    pub is_multi_day: bool,
    /// Category.
    pub item_type: ItemType,
    /// Title; required.
    pub title: String,
    /// Details.
    pub details: Option<String>,
    /// Location.
    pub location: Option<EntryLocation>,
    /// Tags.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Metadata.
    pub metadata: Option<EntryMetadata>,
    /// Explicit order within the day.
    pub sort_order: Option<i32>,
}

impl EntryDraft {
    /// Minimal single-day draft.
    pub fn new(date: NaiveDate, item_type: ItemType, title: impl Into<String>) -> Self {
        Self {
            date,
            end_date: None,
            is_multi_day: false,
            item_type,
            title: title.into(),
            details: None,
            location: None,
            tags: Vec::new(),
            metadata: None,
            sort_order: None,
        }
    }

    /// Mark the draft as spanning through `end_date`.
    pub fn through(mut self, end_date: NaiveDate) -> Self {
        self.end_date = Some(end_date);
        self.is_multi_day = true;
        self
    }

    /// Validate the draft and build the entry it describes.
    pub fn into_entry(
        self,
        trip_id: TripId,
        id: EntryId,
        sort_order: Option<i32>,
    ) -> Result<ItineraryEntry, DomainError> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(DomainError::invalid_request("entry title must not be blank"));
        }
        Ok(ItineraryEntry {
            trip_id,
            id,
            date: Some(self.date),
            end_date: self.end_date,
            is_multi_day: self.is_multi_day,
            item_type: self.item_type,
            title: title.to_owned(),
            details: self.details,
            location: self.location.filter(|location| !location.is_empty()),
            tags: normalise_tags(self.tags),
            metadata: self.metadata.filter(|metadata| !metadata.is_empty()),
            sort_order: self.sort_order.or(sort_order),
            version: None,
        })
    }
}

/// Update payload for an entry.
#[derive(Debug, Clone, PartialEq)]
pub struct EntryUpdate {
    /// Owning trip.
    pub trip_id: TripId,
    /// Entry to update.
    pub entry_id: EntryId,
    /// Entity tag captured at read time; the write fails if it is stale.
    pub version: VersionTag,
    /// New field values.
    pub draft: EntryDraft,
}

/// Trim tags, drop blanks and case-insensitive duplicates, keep first-seen
/// order.
pub fn normalise_tags<I, S>(tags: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen: Vec<String> = Vec::new();
    let mut result = Vec::new();
    for tag in tags {
        let trimmed = tag.as_ref().trim();
        if trimmed.is_empty() {
            continue;
        }
        let folded = trimmed.to_lowercase();
        if seen.contains(&folded) {
            continue;
        }
        seen.push(folded);
        result.push(trimmed.to_owned());
    }
    result
}
