//! Itinerary item categories.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Category of an itinerary entry or booking.
///
/// Variant order is significant: the timeline orders same-day entries by it.
/// Stored rows carry the lower-cased canonical name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ItemType {
    /// Scheduled flight.
    Flight,
    /// Rail journey.
    Train,
    /// Long-distance bus.
    Coach,
    /// Ferry crossing.
    Ferry,
    /// Taxi or ride-hail.
    Taxi,
    /// Private driver or transfer.
    PrivateCar,
    /// Self-drive hire car.
    RentalCar,
    /// Parking reservation.
    Parking,
    /// Hotel stay.
    Hotel,
    /// Apartment rental.
    Flat,
    /// Whole-house rental.
    House,
    /// Guided tour.
    Tour,
    /// Museum or gallery visit.
    Museum,
    /// Park or outdoor attraction.
    Park,
    /// Restaurant or food experience.
    Dining,
    /// Free-form note.
    Note,
    /// Anything else.
    Other,
}

/// Visual family shared by related item types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ItemFamily {
    /// Flights, rail, road and water transport.
    Transport,
    /// Hotels and rentals.
    Lodging,
    /// Sights, tours and dining.
    Activity,
    /// Notes.
    Note,
    /// Catch-all.
    Other,
}

const LEGACY_ALIASES: &[(&str, ItemType)] = &[
    ("travel", ItemType::Flight),
    ("plane", ItemType::Flight),
    ("lodging", ItemType::Hotel),
    ("accommodation", ItemType::Hotel),
    ("activity", ItemType::Tour),
    ("sightseeing", ItemType::Tour),
    ("dining", ItemType::Dining),
    ("food", ItemType::Dining),
    ("restaurant", ItemType::Dining),
    ("transportation", ItemType::Taxi),
    ("transport", ItemType::Taxi),
];

impl ItemType {
    /// Every variant in declaration order.
    pub const ALL: [Self; 17] = [
        Self::Flight,
        Self::Train,
        Self::Coach,
        Self::Ferry,
        Self::Taxi,
        Self::PrivateCar,
        Self::RentalCar,
        Self::Parking,
        Self::Hotel,
        Self::Flat,
        Self::House,
        Self::Tour,
        Self::Museum,
        Self::Park,
        Self::Dining,
        Self::Note,
        Self::Other,
    ];

    /// Lower-cased canonical name written to storage.
    pub fn storage_name(self) -> &'static str {
        match self {
            Self::Flight => "flight",
            Self::Train => "train",
            Self::Coach => "coach",
            Self::Ferry => "ferry",
            Self::Taxi => "taxi",
            Self::PrivateCar => "privatecar",
            Self::RentalCar => "rentalcar",
            Self::Parking => "parking",
            Self::Hotel => "hotel",
            Self::Flat => "flat",
            Self::House => "house",
            Self::Tour => "tour",
            Self::Museum => "museum",
            Self::Park => "park",
            Self::Dining => "dining",
            Self::Note => "note",
            Self::Other => "other",
        }
    }

    /// Human-readable label.
    pub fn label(self) -> &'static str {
        match self {
            Self::Flight => "Flight",
            Self::Train => "Train",
            Self::Coach => "Coach",
            Self::Ferry => "Ferry",
            Self::Taxi => "Taxi",
            Self::PrivateCar => "Private car",
            Self::RentalCar => "Rental car",
            Self::Parking => "Parking",
            Self::Hotel => "Hotel",
            Self::Flat => "Flat",
            Self::House => "House",
            Self::Tour => "Tour",
            Self::Museum => "Museum",
            Self::Park => "Park",
            Self::Dining => "Dining",
            Self::Note => "Note",
            Self::Other => "Other",
        }
    }

    /// Family used for colour coding.
    pub fn family(self) -> ItemFamily {
        match self {
            Self::Flight
            | Self::Train
            | Self::Coach
            | Self::Ferry
            | Self::Taxi
            | Self::PrivateCar
            | Self::RentalCar
            | Self::Parking => ItemFamily::Transport,
            Self::Hotel | Self::Flat | Self::House => ItemFamily::Lodging,
            Self::Tour | Self::Museum | Self::Park | Self::Dining => ItemFamily::Activity,
            Self::Note => ItemFamily::Note,
            Self::Other => ItemFamily::Other,
        }
    }

    /// Strict parse of a canonical name, ignoring case and `-`/`_`/space
    /// separators.
    pub fn parse_canonical(raw: &str) -> Option<Self> {
        let folded = fold(raw);
        Self::ALL
            .into_iter()
            .find(|item| item.storage_name() == folded)
    }

    /// Tolerant parse of a stored value.
    ///
    /// Tries the canonical names, then the legacy category aliases; anything
    /// else, including blank input, decodes to [`ItemType::Other`].
    ///
    /// # Examples
    /// ```
    /// use itinerary::domain::ItemType;
    ///
    /// assert_eq!(ItemType::from_stored("Private_Car"), ItemType::PrivateCar);
    /// assert_eq!(ItemType::from_stored("lodging"), ItemType::Hotel);
    /// assert_eq!(ItemType::from_stored("spaceship"), ItemType::Other);
    /// ```
    pub fn from_stored(raw: &str) -> Self {
        Self::parse_canonical(raw)
            .or_else(|| legacy_alias(raw))
            .unwrap_or(Self::Other)
    }
}

fn fold(raw: &str) -> String {
    raw.trim()
        .chars()
        .filter(|ch| !matches!(ch, '-' | '_' | ' '))
        .flat_map(char::to_lowercase)
        .collect()
}

fn legacy_alias(raw: &str) -> Option<ItemType> {
    let folded = fold(raw);
    LEGACY_ALIASES
        .iter()
        .find(|(alias, _)| *alias == folded)
        .map(|(_, item)| *item)
}

impl fmt::Display for ItemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
