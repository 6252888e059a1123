//! Shared fixtures for unit and integration tests.

use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Local, NaiveDate, TimeDelta, TimeZone, Utc};
use mockable::Clock;

use crate::config::ItinerarySettings;
use crate::domain::{EmailAddress, Principal, UserId};
use crate::outbound::table::{MemoryTableStore, TableItineraryRepository};

/// Instant every fixture clock starts at.
pub fn fixture_now() -> DateTime<Utc> {
    match Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).single() {
        Some(now) => now,
        None => panic!("valid fixture timestamp"),
    }
}

/// Calendar date helper for fixtures.
pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    match NaiveDate::from_ymd_opt(year, month, day) {
        Some(date) => date,
        None => panic!("invalid fixture date {year}-{month}-{day}"),
    }
}

/// A clock tests can move forward.
pub struct MutableClock(Mutex<DateTime<Utc>>);

impl MutableClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self(Mutex::new(now))
    }

    pub fn advance_days(&self, days: i64) {
        *self.lock_clock() += TimeDelta::days(days);
    }

    fn lock_clock(&self) -> MutexGuard<'_, DateTime<Utc>> {
        match self.0.lock() {
            Ok(guard) => guard,
            Err(_) => panic!("clock mutex"),
        }
    }
}

impl Clock for MutableClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        *self.lock_clock()
    }
}

/// Principal with a user id and optional email.
pub fn principal(user_id: &str, email: Option<&str>) -> Principal {
    let user_id = match UserId::new(user_id) {
        Ok(user_id) => user_id,
        Err(error) => panic!("fixture user id: {error}"),
    };
    let email = email.map(|raw| match EmailAddress::new(raw) {
        Ok(email) => email,
        Err(error) => panic!("fixture email: {error}"),
    });
    Principal::new(user_id, email)
}

/// A repository over a fresh in-memory store, with handles to both the
/// store and the clock.
pub struct MemoryHarness {
    pub store: Arc<MemoryTableStore>,
    pub clock: Arc<MutableClock>,
    pub repository: TableItineraryRepository<MemoryTableStore>,
}

impl MemoryHarness {
    pub fn new() -> Self {
        let store = Arc::new(MemoryTableStore::new());
        let clock = Arc::new(MutableClock::new(fixture_now()));
        let settings = ItinerarySettings {
            table_prefix: None,
            share_code_length: None,
        };
        let repository = TableItineraryRepository::new(store.clone(), &settings, clock.clone());
        Self {
            store,
            clock,
            repository,
        }
    }
}

impl Default for MemoryHarness {
    fn default() -> Self {
        Self::new()
    }
}
