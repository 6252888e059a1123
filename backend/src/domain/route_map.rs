//! Ordered map stops derived from a trip's entries.

use std::cmp::Ordering;

use chrono::NaiveDate;
use serde::Serialize;

use super::{EntryId, ItemFamily, ItemType, ItineraryEntry, PlaceRef};

/// Longest detail snippet shown on a marker, in characters.
pub const SNIPPET_LIMIT: usize = 320;

const ELLIPSIS: char = '…';

/// Role a stop plays for its entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum StopKind {
    /// Start of a travel segment.
    Departure,
    /// End of a travel segment.
    Arrival,
    /// The entry's single place.
    Location,
}

impl StopKind {
    fn as_str(self) -> &'static str {
        match self {
            Self::Departure => "departure",
            Self::Arrival => "arrival",
            Self::Location => "location",
        }
    }
}

/// One marker on the route map.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteStop {
    /// `{entryId}-{kind}-{sequence}`.
    pub id: String,
    /// Running 1-based position across the whole trip.
    pub sequence: usize,
    /// Source entry.
    pub entry_id: EntryId,
    /// Stop role.
    pub kind: StopKind,
    /// Entry title.
    pub title: String,
    /// Place label.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub place_name: Option<String>,
    /// Latitude in decimal degrees.
    pub latitude: f64,
    /// Longitude in decimal degrees.
    pub longitude: f64,
    /// Entry category.
    pub item_type: ItemType,
    /// Display date for the stop.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_label: Option<String>,
    /// Details text, truncated.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snippet: Option<String>,
    /// Marker colour.
    pub color: &'static str,
}

/// Marker colour for an item type, shared by its family.
pub fn marker_color(item_type: ItemType) -> &'static str {
    match item_type.family() {
        ItemFamily::Transport => "#2563eb",
        ItemFamily::Lodging => "#7c3aed",
        ItemFamily::Activity => "#16a34a",
        ItemFamily::Note => "#f59e0b",
        ItemFamily::Other => "#6b7280",
    }
}

/// Build the ordered stop list for `entries`.
///
/// Entries are ordered by date (undated last), explicit order (unordered
/// last), title and id. Travel segments with two distinct places yield a
/// departure and an arrival; otherwise an entry's single place yields one
/// location stop.
pub fn project_route(entries: &[ItineraryEntry]) -> Vec<RouteStop> {
    let mut ordered: Vec<&ItineraryEntry> = entries.iter().collect();
    ordered.sort_by(|left, right| route_order(left, right));

    let mut stops = Vec::new();
    for entry in ordered {
        for (kind, place, date) in entry_places(entry) {
            let sequence = stops.len() + 1;
            stops.push(RouteStop {
                id: format!("{}-{}-{sequence}", entry.id, kind.as_str()),
                sequence,
                entry_id: entry.id.clone(),
                kind,
                title: entry.title.clone(),
                place_name: place.name,
                latitude: place.latitude,
                longitude: place.longitude,
                item_type: entry.item_type,
                date_label: date.map(format_date),
                snippet: entry.details.as_deref().and_then(snippet),
                color: marker_color(entry.item_type),
            });
        }
    }
    stops
}

fn entry_places(entry: &ItineraryEntry) -> Vec<(StopKind, PlaceRef, Option<NaiveDate>)> {
    let flight = entry
        .metadata
        .as_ref()
        .and_then(|metadata| metadata.flight.as_ref());
    let departure = flight.and_then(|flight| flight.departure_place.clone());
    let arrival = flight.and_then(|flight| flight.arrival_place.clone());

    match (departure, arrival) {
        (Some(from), Some(to)) if !from.same_place(&to) => vec![
            (StopKind::Departure, from, entry.date),
            (StopKind::Arrival, to, entry.effective_end_date()),
        ],
        (from, to) => entry
            .location
            .as_ref()
            .and_then(|location| location.place())
            .or(from)
            .or(to)
            .map(|place| vec![(StopKind::Location, place, entry.date)])
            .unwrap_or_default(),
    }
}

fn route_order(left: &ItineraryEntry, right: &ItineraryEntry) -> Ordering {
    compare_last_if_none(left.date, right.date)
        .then_with(|| compare_last_if_none(left.sort_order, right.sort_order))
        .then_with(|| left.title.cmp(&right.title))
        .then_with(|| left.id.as_str().cmp(right.id.as_str()))
}

fn compare_last_if_none<T: Ord>(left: Option<T>, right: Option<T>) -> Ordering {
    match (left, right) {
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

fn format_date(date: NaiveDate) -> String {
    date.format("%a %-d %b %Y").to_string()
}

fn snippet(details: &str) -> Option<String> {
    let trimmed = details.trim();
    if trimmed.is_empty() {
        return None;
    }
    if trimmed.chars().count() <= SNIPPET_LIMIT {
        return Some(trimmed.to_owned());
    }
    let mut cut: String = trimmed.chars().take(SNIPPET_LIMIT).collect();
    cut.push(ELLIPSIS);
    Some(cut)
}
