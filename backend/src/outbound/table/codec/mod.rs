//! Mapping between table rows and domain entities.
//!
//! Property names are the wire contract with existing tables and must not
//! change. Field readers are tolerant (see [`decode`]); writers follow the
//! set-or-clear rule (see [`encode`]). Row keys, unlike fields, must be valid
//! identifiers: a malformed key is a data-integrity fault.

pub mod decode;
pub mod encode;

mod access;
mod booking;
mod entry;
mod sharing;
mod trip;

pub use access::{decode_access, encode_access};
pub use booking::{decode_booking, encode_booking};
pub use entry::{decode_entry, encode_entry};
pub use sharing::{decode_saved_link, decode_share_link, encode_saved_link, encode_share_link};
pub use trip::{decode_trip, encode_trip};

pub(crate) use access::USER_ID;
pub(crate) use booking::ENTRY_ID;
pub(crate) use sharing::SHARE_CODE;
pub(crate) use trip::SLUG_PROPERTY;

use crate::domain::{DomainError, IdValidationError};

use super::store::TableEntity;

/// Textual date format used for every date-only property.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parse a key component, reporting malformed keys as integrity faults.
fn parse_key<T>(
    entity: &TableEntity,
    raw: &str,
    parse: impl FnOnce(&str) -> Result<T, IdValidationError>,
) -> Result<T, DomainError> {
    parse(raw).map_err(|err| {
        DomainError::data_integrity(format!("malformed key on row {}: {err}", entity.key()))
    })
}
