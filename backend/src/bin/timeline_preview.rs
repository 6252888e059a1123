//! Render the timeline and route projections for a trip fixture as JSON.
#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), deny(clippy::expect_used))]

use std::ffi::OsString;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use cap_std::{ambient_authority, fs::Dir};
use chrono::NaiveDate;
use clap::Parser;
use itinerary::config::ItinerarySettings;
use itinerary::domain::ports::{BookingRepository, ItineraryEntryRepository, TripRepository};
use itinerary::domain::{
    BookingDraft, EntryDraft, ItineraryViewService, Principal, TripDraft, UserId,
};
use itinerary::observability::init_tracing;
use itinerary::outbound::table::{MemoryTableStore, TableItineraryRepository};
use mockable::{Clock, DefaultClock};
use ortho_config::OrthoConfig;
use serde::Deserialize;
use serde_json::json;
use tokio::runtime::Builder;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// `timeline-preview` command arguments.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "timeline-preview",
    about = "Project a trip fixture onto the day grid and route map",
    version
)]
struct CliArgs {
    /// JSON fixture with `trip`, `entries` and `bookings`.
    #[arg(long = "fixture", value_name = "path")]
    fixture: PathBuf,
    /// Date used to anchor trips without dates; defaults to today.
    #[arg(long = "today", value_name = "yyyy-mm-dd")]
    today: Option<NaiveDate>,
}

/// Fixture file layout.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Fixture {
    trip: TripDraft,
    #[serde(default)]
    entries: Vec<EntryDraft>,
    #[serde(default)]
    bookings: Vec<FixtureBooking>,
}

/// A booking linked to an entry by its position in `entries`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FixtureBooking {
    entry: Option<usize>,
    #[serde(flatten)]
    draft: BookingDraft,
}

fn main() -> io::Result<()> {
    init_tracing();
    let runtime = Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|error| io::Error::other(format!("create Tokio runtime: {error}")))?;
    runtime.block_on(async_main())
}

async fn async_main() -> io::Result<()> {
    let args = CliArgs::try_parse().map_err(io::Error::other)?;
    let settings = ItinerarySettings::load_from_iter([OsString::from("timeline-preview")])
        .map_err(|error| io::Error::other(format!("load settings: {error}")))?;
    let fixture: Fixture = serde_json::from_str(&read_fixture(&args.fixture)?)
        .map_err(|error| io::Error::other(format!("parse fixture: {error}")))?;

    let clock = Arc::new(DefaultClock);
    let today = args.today.unwrap_or_else(|| clock.utc().date_naive());
    let repository = Arc::new(TableItineraryRepository::new(
        Arc::new(MemoryTableStore::new()),
        &settings,
        clock,
    ));
    let principal = Principal::new(
        UserId::new("preview").map_err(io::Error::other)?,
        None,
    );
    let cancel = CancellationToken::new();

    let trip = repository
        .create_trip(&principal, fixture.trip, &cancel)
        .await
        .map_err(|error| io::Error::other(format!("seed trip: {error}")))?;
    let mut entry_ids = Vec::with_capacity(fixture.entries.len());
    for draft in fixture.entries {
        let entry = repository
            .create_entry(&principal, &trip.id, draft, &cancel)
            .await
            .map_err(|error| io::Error::other(format!("seed entry: {error}")))?;
        entry_ids.push(entry.id);
    }
    for booking in fixture.bookings {
        let mut draft = booking.draft;
        if let Some(index) = booking.entry {
            let entry_id = entry_ids.get(index).cloned().ok_or_else(|| {
                io::Error::other(format!("booking refers to missing entry #{index}"))
            })?;
            draft.entry_id = Some(entry_id);
        }
        repository
            .create_booking(&principal, &trip.id, draft, &cancel)
            .await
            .map_err(|error| io::Error::other(format!("seed booking: {error}")))?;
    }
    debug!(trip_id = %trip.id, entries = entry_ids.len(), "seeded preview trip");

    let view = ItineraryViewService::new(repository)
        .trip_view(&principal, &trip.id, today, &cancel)
        .await
        .map_err(|error| io::Error::other(format!("project trip: {error}")))?
        .ok_or_else(|| io::Error::other("seeded trip is not visible"))?;

    let output = json!({ "timeline": view.timeline, "route": view.route });
    let rendered = serde_json::to_string_pretty(&output)
        .map_err(|error| io::Error::other(format!("render output: {error}")))?;
    println!("{rendered}");
    Ok(())
}

fn read_fixture(path: &Path) -> io::Result<String> {
    let parent = path.parent().unwrap_or_else(|| Path::new("."));
    let parent = if parent.as_os_str().is_empty() {
        Path::new(".")
    } else {
        parent
    };
    let file_name = path
        .file_name()
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "fixture path must be a file"))?;
    let directory = Dir::open_ambient_dir(parent, ambient_authority()).map_err(|error| {
        io::Error::other(format!(
            "open fixture directory '{}': {error}",
            parent.display()
        ))
    })?;
    let mut file = directory.open(Path::new(file_name)).map_err(|error| {
        io::Error::other(format!("open fixture '{}': {error}", path.display()))
    })?;
    let mut contents = String::new();
    file.read_to_string(&mut contents).map_err(|error| {
        io::Error::other(format!("read fixture '{}': {error}", path.display()))
    })?;
    Ok(contents)
}
