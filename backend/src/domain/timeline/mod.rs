//! Calendar-grid projection of a trip's entries.
//!
//! The projection is pure: it reads a trip and its entries and returns the
//! rows, span blocks and lane layout a renderer needs.

mod lanes;

pub use lanes::{LanePlacement, RowInterval, assign_lanes};

use std::cmp::Ordering;
use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;

use super::{ItineraryEntry, Trip, TripDetails};

/// Sort key used for entries without an explicit order.
const UNORDERED: i32 = i32::MAX;

/// One calendar row.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineDay {
    /// 1-based row position.
    pub position: usize,
    /// Calendar date.
    pub date: NaiveDate,
    /// Single-day entries on this date, in display order.
    pub entries: Vec<ItineraryEntry>,
}

/// A multi-day entry placed on the grid.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpanBlock {
    /// The spanning entry.
    pub entry: ItineraryEntry,
    /// First day after clamping.
    pub start: NaiveDate,
    /// Last day after clamping.
    pub end: NaiveDate,
    /// Row of `start`, 1-based.
    pub row_start: usize,
    /// Row after `end`.
    pub row_end: usize,
    /// Zero-based column.
    pub lane: usize,
    /// Columns used by the overlapping cluster.
    pub lane_count: usize,
}

/// Renderable timeline for one trip.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Timeline {
    /// Every day of the covered range, in order.
    pub days: Vec<TimelineDay>,
    /// Span blocks ordered by start row then lane.
    pub spans: Vec<SpanBlock>,
    /// Widest lane count across all spans, at least 1.
    pub lane_count: usize,
    /// Entries without a date, which cannot be placed.
    pub undated: Vec<ItineraryEntry>,
}

impl Timeline {
    /// Project a trip's details.
    pub fn from_details(details: &TripDetails, today: NaiveDate) -> Self {
        project(&details.trip, &details.entries, today)
    }

    /// Number of day rows.
    pub fn day_count(&self) -> usize {
        self.days.len()
    }
}

/// Build the timeline for `trip` and `entries`.
///
/// The covered range runs from the earliest to the latest of the trip bounds
/// and every entry date; with no dates at all it is the single day `today`.
pub fn project(trip: &Trip, entries: &[ItineraryEntry], today: NaiveDate) -> Timeline {
    let (first, last) = date_range(trip, entries).unwrap_or((today, today));
    let mut buckets: BTreeMap<NaiveDate, Vec<ItineraryEntry>> = BTreeMap::new();
    let mut pending_spans = Vec::new();
    let mut undated = Vec::new();

    for entry in entries {
        match (entry.spans_multiple_days(), entry.date, entry.end_date) {
            (true, Some(start), Some(end)) => {
                let (start, end) = clamp_span(start, end, first, last);
                pending_spans.push((entry.clone(), start, end));
            }
            (_, Some(date), _) => buckets.entry(date).or_default().push(entry.clone()),
            (_, None, _) => undated.push(entry.clone()),
        }
    }

    let days = day_sequence(first, last)
        .enumerate()
        .map(|(index, date)| {
            let mut day_entries = buckets.remove(&date).unwrap_or_default();
            day_entries.sort_by(compare_within_day);
            TimelineDay {
                position: index + 1,
                date,
                entries: day_entries,
            }
        })
        .collect();

    let spans = place_spans(pending_spans, first);
    let lane_count = spans
        .iter()
        .map(|span| span.lane_count)
        .max()
        .unwrap_or(1)
        .max(1);

    Timeline {
        days,
        spans,
        lane_count,
        undated,
    }
}

fn date_range(trip: &Trip, entries: &[ItineraryEntry]) -> Option<(NaiveDate, NaiveDate)> {
    let candidates = [trip.start_date, trip.end_date]
        .into_iter()
        .chain(entries.iter().flat_map(|entry| [entry.date, entry.end_date]))
        .flatten();
    candidates.fold(None, |range, date| match range {
        None => Some((date, date)),
        Some((first, last)) => Some((first.min(date), last.max(date))),
    })
}

fn day_sequence(first: NaiveDate, last: NaiveDate) -> impl Iterator<Item = NaiveDate> {
    first.iter_days().take_while(move |date| *date <= last)
}

fn clamp_span(
    start: NaiveDate,
    end: NaiveDate,
    first: NaiveDate,
    last: NaiveDate,
) -> (NaiveDate, NaiveDate) {
    let start = start.clamp(first, last);
    let end = end.clamp(first, last);
    if end < start { (end, start) } else { (start, end) }
}

fn row_of(date: NaiveDate, first: NaiveDate) -> usize {
    let offset = (date - first).num_days();
    usize::try_from(offset).unwrap_or_default() + 1
}

fn place_spans(
    pending: Vec<(ItineraryEntry, NaiveDate, NaiveDate)>,
    first: NaiveDate,
) -> Vec<SpanBlock> {
    let intervals: Vec<RowInterval> = pending
        .iter()
        .map(|(_, start, end)| RowInterval {
            row_start: row_of(*start, first),
            row_end: row_of(*end, first) + 1,
        })
        .collect();
    let placements = assign_lanes(&intervals);

    let mut spans: Vec<SpanBlock> = pending
        .into_iter()
        .zip(intervals)
        .zip(placements)
        .map(|(((entry, start, end), interval), placement)| SpanBlock {
            entry,
            start,
            end,
            row_start: interval.row_start,
            row_end: interval.row_end,
            lane: placement.lane,
            lane_count: placement.lane_count,
        })
        .collect();
    spans.sort_by_key(|span| (span.row_start, span.lane));
    spans
}

fn compare_within_day(left: &ItineraryEntry, right: &ItineraryEntry) -> Ordering {
    left.sort_order
        .unwrap_or(UNORDERED)
        .cmp(&right.sort_order.unwrap_or(UNORDERED))
        .then_with(|| left.item_type.cmp(&right.item_type))
        .then_with(|| left.title.to_lowercase().cmp(&right.title.to_lowercase()))
}
