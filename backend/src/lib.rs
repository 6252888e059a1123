//! Multi-tenant trip itinerary data layer.
//!
//! - `domain`: entities, access rules, timeline and route projections, and
//!   the repository ports.
//! - `outbound::table`: the ports implemented over a key/value table store.
//! - `config`: table naming and share code settings.

pub mod config;
pub mod domain;
pub mod observability;
pub mod outbound;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
