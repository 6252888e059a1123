//! Itinerary store configuration loaded via OrthoConfig.

use ortho_config::OrthoConfig;
use serde::Deserialize;

const DEFAULT_SHARE_CODE_LENGTH: usize = 10;
const MIN_SHARE_CODE_LENGTH: usize = 6;
const MAX_SHARE_CODE_LENGTH: usize = 32;

/// Settings for the table-backed itinerary repository.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "ITINERARY")]
pub struct ItinerarySettings {
    /// Prefix prepended to every physical table name.
    pub table_prefix: Option<String>,
    /// Length of generated share codes.
    pub share_code_length: Option<usize>,
}

impl ItinerarySettings {
    /// Configured table prefix, empty by default.
    pub fn table_prefix(&self) -> &str {
        self.table_prefix.as_deref().map_or("", str::trim)
    }

    /// Share code length, clamped to a usable range.
    pub fn share_code_length(&self) -> usize {
        self.share_code_length
            .unwrap_or(DEFAULT_SHARE_CODE_LENGTH)
            .clamp(MIN_SHARE_CODE_LENGTH, MAX_SHARE_CODE_LENGTH)
    }
}

/// Physical table names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableNames {
    /// Trip rows.
    pub trips: String,
    /// Itinerary entry rows.
    pub entries: String,
    /// Booking rows.
    pub bookings: String,
    /// Share link rows.
    pub share_links: String,
    /// Access grant rows.
    pub trip_access: String,
    /// Saved share link rows.
    pub saved_share_links: String,
}

impl TableNames {
    /// Names derived from the settings' prefix.
    ///
    /// # Examples
    /// ```
    /// use itinerary::config::{ItinerarySettings, TableNames};
    ///
    /// let settings = ItinerarySettings {
    ///     table_prefix: Some("staging".to_owned()),
    ///     share_code_length: None,
    /// };
    /// assert_eq!(TableNames::from_settings(&settings).trips, "stagingTrips");
    /// ```
    pub fn from_settings(settings: &ItinerarySettings) -> Self {
        Self::with_prefix(settings.table_prefix())
    }

    fn with_prefix(prefix: &str) -> Self {
        let name = |table: &str| format!("{prefix}{table}");
        Self {
            trips: name("Trips"),
            entries: name("ItineraryEntries"),
            bookings: name("Bookings"),
            share_links: name("ShareLinks"),
            trip_access: name("TripAccess"),
            saved_share_links: name("SavedShareLinks"),
        }
    }
}

impl Default for TableNames {
    fn default() -> Self {
        Self::with_prefix("")
    }
}
