//! Repository behaviour over the memory store and a mocked store.

use std::sync::Arc;

use rstest::rstest;
use rust_decimal::Decimal;
use serde_json::json;
use tokio_util::sync::CancellationToken;

use super::*;
use crate::domain::ports::{
    BookingRepository, ItineraryEntryRepository, SavedShareLinkRepository, ShareLinkRepository,
    TripAccessRepository, TripRepository,
};
use crate::domain::{
    AccessId, BookingDraft, BookingId, BookingUpdate, EmailAddress, EntryDraft, EntryId,
    EntryUpdate, ErrorCode, ItemType, ShareCode, ShareLinkDraft, TripDraft, TripUpdate, UserId,
};
use crate::outbound::table::store::MockTableStore;
use crate::test_support::{MemoryHarness, date, fixture_now, principal};

fn owner() -> Principal {
    principal("owner-1", Some("owner@example.com"))
}

fn friend() -> Principal {
    principal("friend-1", Some("friend@example.com"))
}

fn email(raw: &str) -> EmailAddress {
    EmailAddress::new(raw).expect("email")
}

async fn seeded_trip(harness: &MemoryHarness) -> Trip {
    let draft = TripDraft {
        start_date: Some(date(2024, 5, 1)),
        end_date: Some(date(2024, 5, 4)),
        ..TripDraft::named("Lisbon")
    };
    harness
        .repository
        .create_trip(&owner(), draft, &CancellationToken::new())
        .await
        .expect("trip created")
}

#[rstest]
#[case(TableStoreError::connection("down"), ErrorCode::ServiceUnavailable)]
#[case(TableStoreError::query("bad filter"), ErrorCode::ServiceUnavailable)]
#[case(TableStoreError::conflict("Trips", "a/b"), ErrorCode::Conflict)]
#[case(TableStoreError::already_exists("Trips", "a/b"), ErrorCode::Conflict)]
#[case(TableStoreError::not_found("Trips", "a/b"), ErrorCode::NotFound)]
fn store_errors_map_to_domain_codes(#[case] error: TableStoreError, #[case] expected: ErrorCode) {
    assert_eq!(map_store_error(error).code(), expected);
}

#[rstest]
fn tag_mismatch_carries_version_mismatch_details() {
    let error = map_store_error(TableStoreError::conflict("Trips", "a/b"));
    assert_eq!(error.details(), Some(&json!({ "code": "version_mismatch" })));
}

#[tokio::test]
async fn unreachable_store_surfaces_as_service_unavailable() {
    let mut store = MockTableStore::new();
    store
        .expect_get()
        .times(1)
        .return_once(|_, _, _| Err(TableStoreError::connection("socket closed")));
    let settings = ItinerarySettings {
        table_prefix: None,
        share_code_length: None,
    };
    let repository = TableItineraryRepository::new(
        Arc::new(store),
        &settings,
        Arc::new(crate::test_support::MutableClock::new(fixture_now())),
    );

    let err = repository
        .get_trip(&owner(), &TripId::generate(), &CancellationToken::new())
        .await
        .expect_err("store is down");
    assert_eq!(err.code(), ErrorCode::ServiceUnavailable);
}

#[tokio::test]
async fn cancelled_tokens_abort_before_touching_rows() {
    let harness = MemoryHarness::new();
    let cancel = CancellationToken::new();
    cancel.cancel();

    let err = harness
        .repository
        .create_trip(&owner(), TripDraft::named("Porto"), &cancel)
        .await
        .expect_err("cancelled");
    assert_eq!(err.code(), ErrorCode::Cancelled);
    assert_eq!(harness.store.row_count("Trips").await, 0);
}

#[tokio::test]
async fn slugs_are_unique_per_owner() {
    let harness = MemoryHarness::new();
    let cancel = CancellationToken::new();
    let first = seeded_trip(&harness).await;
    let second = seeded_trip(&harness).await;
    let other_owner = harness
        .repository
        .create_trip(
            &principal("owner-2", None),
            TripDraft::named("Lisbon"),
            &cancel,
        )
        .await
        .expect("trip created");

    assert_eq!(first.slug, "lisbon");
    assert_eq!(second.slug, "lisbon-2");
    assert_eq!(other_owner.slug, "lisbon");

    let by_slug = harness
        .repository
        .get_trip_by_slug(&owner(), "lisbon-2", &cancel)
        .await
        .expect("lookup")
        .expect("found");
    assert_eq!(by_slug.trip.id, second.id);
}

#[tokio::test]
async fn strangers_cannot_see_or_touch_trips() {
    let harness = MemoryHarness::new();
    let cancel = CancellationToken::new();
    let trip = seeded_trip(&harness).await;
    let stranger = principal("stranger", Some("stranger@example.com"));

    let seen = harness
        .repository
        .get_trip(&stranger, &trip.id, &cancel)
        .await
        .expect("lookup");
    assert!(seen.is_none());

    let err = harness
        .repository
        .create_entry(
            &stranger,
            &trip.id,
            EntryDraft::new(date(2024, 5, 1), ItemType::Tour, "Tram 28"),
            &cancel,
        )
        .await
        .expect_err("not visible");
    assert_eq!(err.code(), ErrorCode::Forbidden);
    assert_eq!(err.message(), DomainError::trip_unavailable().message());
}

#[tokio::test]
async fn stale_versions_conflict() {
    let harness = MemoryHarness::new();
    let cancel = CancellationToken::new();
    let trip = seeded_trip(&harness).await;
    let update = |name: &str| TripUpdate {
        trip_id: trip.id.clone(),
        version: trip.version.clone().expect("stored trips are tagged"),
        draft: TripDraft::named(name),
    };

    let renamed = harness
        .repository
        .update_trip(&owner(), update("Lisbon and Sintra"), &cancel)
        .await
        .expect("first update wins");
    assert_eq!(renamed.slug, trip.slug);
    assert_ne!(renamed.version, trip.version);

    let err = harness
        .repository
        .update_trip(&owner(), update("Lisbon again"), &cancel)
        .await
        .expect_err("stale tag");
    assert_eq!(err.code(), ErrorCode::Conflict);
    assert_eq!(err.details(), Some(&json!({ "code": "version_mismatch" })));
}

#[tokio::test]
async fn entry_updates_carry_their_version_tag() {
    let harness = MemoryHarness::new();
    let cancel = CancellationToken::new();
    let trip = seeded_trip(&harness).await;
    let entry = harness
        .repository
        .create_entry(
            &owner(),
            &trip.id,
            EntryDraft::new(date(2024, 5, 2), ItemType::Museum, "Gulbenkian"),
            &cancel,
        )
        .await
        .expect("entry created");
    let update = |title: &str| EntryUpdate {
        trip_id: trip.id.clone(),
        entry_id: entry.id.clone(),
        version: entry.version.clone().expect("stored entries are tagged"),
        draft: EntryDraft::new(date(2024, 5, 2), ItemType::Museum, title),
    };

    harness
        .repository
        .update_entry(&owner(), update("Gulbenkian Museum"), &cancel)
        .await
        .expect("fresh tag");
    let err = harness
        .repository
        .update_entry(&owner(), update("Gulbenkian Garden"), &cancel)
        .await
        .expect_err("stale tag");
    assert_eq!(err.code(), ErrorCode::Conflict);
}

#[tokio::test]
async fn email_grants_are_claimed_on_first_use() {
    let harness = MemoryHarness::new();
    let cancel = CancellationToken::new();
    let trip = seeded_trip(&harness).await;
    harness
        .repository
        .grant_access(
            &owner(),
            &trip.id,
            email("Friend@Example.com"),
            AccessLevel::FullControl,
            &cancel,
        )
        .await
        .expect("granted");

    let seen = harness
        .repository
        .get_trip(&friend(), &trip.id, &cancel)
        .await
        .expect("lookup")
        .expect("visible through grant");
    assert_eq!(seen.access, AccessLevel::FullControl);

    let grants = harness
        .repository
        .list_access(&owner(), &trip.id, &cancel)
        .await
        .expect("listed");
    assert_eq!(grants.len(), 1);
    assert_eq!(
        grants[0].user_id,
        Some(UserId::new("friend-1").expect("user id"))
    );

    // Once claimed, the grant follows the user id even without an email.
    let without_email = principal("friend-1", None);
    let listed = harness
        .repository
        .list_accessible_trips(&without_email, &cancel)
        .await
        .expect("listed");
    assert_eq!(listed.len(), 1);
}

#[tokio::test]
async fn failed_claims_still_grant_access() {
    let harness = MemoryHarness::new();
    let cancel = CancellationToken::new();
    let trip = seeded_trip(&harness).await;
    harness
        .repository
        .grant_access(
            &owner(),
            &trip.id,
            email("friend@example.com"),
            AccessLevel::ReadOnly,
            &cancel,
        )
        .await
        .expect("granted");
    harness
        .store
        .fail_writes("TripAccess", TableStoreError::connection("flaky"))
        .await;

    let seen = harness
        .repository
        .get_trip(&friend(), &trip.id, &cancel)
        .await
        .expect("lookup")
        .expect("visible by email");
    assert_eq!(seen.access, AccessLevel::ReadOnly);
}

/// Seed a grant row written before emails were normalised.
async fn seed_legacy_grant(harness: &MemoryHarness, trip: &Trip, raw_email: &str) {
    let mut row = TableEntity::new(trip.id.as_str(), AccessId::generate().as_str());
    row.set("Email", raw_email.into());
    row.set("Permission", AccessLevel::ReadOnly.storage_name().into());
    harness
        .store
        .insert(&harness.repository.tables().trip_access, row)
        .await
        .expect("legacy grant seeded");
}

#[tokio::test]
async fn mixed_case_legacy_grants_resolve_on_every_path() {
    let harness = MemoryHarness::new();
    let cancel = CancellationToken::new();
    let lisbon = seeded_trip(&harness).await;
    let porto = harness
        .repository
        .create_trip(&owner(), TripDraft::named("Porto"), &cancel)
        .await
        .expect("trip created");
    seed_legacy_grant(&harness, &lisbon, "Friend@Example.com").await;
    seed_legacy_grant(&harness, &porto, "FRIEND@example.COM").await;

    let by_slug = harness
        .repository
        .get_trip_by_slug(&friend(), "porto", &cancel)
        .await
        .expect("lookup")
        .expect("visible through legacy grant");
    assert_eq!(by_slug.access, AccessLevel::ReadOnly);

    let listed = harness
        .repository
        .list_accessible_trips(&friend(), &cancel)
        .await
        .expect("listed");
    assert_eq!(listed.len(), 2);
}

#[tokio::test]
async fn granting_upserts_over_a_mixed_case_legacy_row() {
    let harness = MemoryHarness::new();
    let cancel = CancellationToken::new();
    let trip = seeded_trip(&harness).await;
    seed_legacy_grant(&harness, &trip, "Colleague@Example.com").await;

    let granted = harness
        .repository
        .grant_access(
            &owner(),
            &trip.id,
            email("colleague@example.com"),
            AccessLevel::FullControl,
            &cancel,
        )
        .await
        .expect("granted");
    assert_eq!(granted.email.as_str(), "colleague@example.com");

    let grants = harness
        .repository
        .list_access(&owner(), &trip.id, &cancel)
        .await
        .expect("listed");
    assert_eq!(grants.len(), 1);
    assert_eq!(grants[0].level, AccessLevel::FullControl);
}

#[tokio::test]
async fn read_only_and_full_control_limits() {
    let harness = MemoryHarness::new();
    let cancel = CancellationToken::new();
    let trip = seeded_trip(&harness).await;
    harness
        .repository
        .grant_access(
            &owner(),
            &trip.id,
            email("friend@example.com"),
            AccessLevel::ReadOnly,
            &cancel,
        )
        .await
        .expect("granted");

    let err = harness
        .repository
        .create_entry(
            &friend(),
            &trip.id,
            EntryDraft::new(date(2024, 5, 2), ItemType::Note, "Pack"),
            &cancel,
        )
        .await
        .expect_err("read only");
    assert_eq!(err.code(), ErrorCode::Forbidden);

    // Re-granting upgrades the same row.
    let upgraded = harness
        .repository
        .grant_access(
            &owner(),
            &trip.id,
            email("friend@example.com"),
            AccessLevel::FullControl,
            &cancel,
        )
        .await
        .expect("upgraded");
    assert_eq!(harness.store.row_count("TripAccess").await, 1);
    assert_eq!(upgraded.level, AccessLevel::FullControl);

    harness
        .repository
        .create_entry(
            &friend(),
            &trip.id,
            EntryDraft::new(date(2024, 5, 2), ItemType::Note, "Pack"),
            &cancel,
        )
        .await
        .expect("full control edits");

    let err = harness
        .repository
        .delete_trip(&friend(), &trip.id, &cancel)
        .await
        .expect_err("only owners delete");
    assert_eq!(err.code(), ErrorCode::Forbidden);
    assert!(
        harness
            .repository
            .list_access(&friend(), &trip.id, &cancel)
            .await
            .expect("listed")
            .is_empty()
    );
}

#[tokio::test]
async fn owner_level_cannot_be_granted() {
    let harness = MemoryHarness::new();
    let trip = seeded_trip(&harness).await;
    let err = harness
        .repository
        .grant_access(
            &owner(),
            &trip.id,
            email("friend@example.com"),
            AccessLevel::Owner,
            &CancellationToken::new(),
        )
        .await
        .expect_err("owner level");
    assert_eq!(err.code(), ErrorCode::InvalidRequest);
}

#[tokio::test]
async fn deleting_missing_trips_reports_false() {
    let harness = MemoryHarness::new();
    let deleted = harness
        .repository
        .delete_trip(&owner(), &TripId::generate(), &CancellationToken::new())
        .await
        .expect("no error");
    assert!(!deleted);
}

#[tokio::test]
async fn deletes_are_idempotent_and_trip_delete_leaves_children() {
    let harness = MemoryHarness::new();
    let cancel = CancellationToken::new();
    let trip = seeded_trip(&harness).await;
    harness
        .repository
        .create_entry(
            &owner(),
            &trip.id,
            EntryDraft::new(date(2024, 5, 2), ItemType::Tour, "Tram 28"),
            &cancel,
        )
        .await
        .expect("entry created");

    assert!(
        !harness
            .repository
            .delete_entry(&owner(), &trip.id, &EntryId::generate(), &cancel)
            .await
            .expect("missing entry")
    );
    assert!(
        !harness
            .repository
            .revoke_access(&owner(), &trip.id, &AccessId::generate(), &cancel)
            .await
            .expect("missing grant")
    );
    for _ in 0..2 {
        assert!(
            !harness
                .repository
                .delete_booking(&owner(), &trip.id, &BookingId::generate(), &cancel)
                .await
                .expect("missing booking")
        );
    }
    assert_eq!(harness.store.row_count("Bookings").await, 0);
    let unknown = ShareCode::new("unknown000").expect("code");
    assert!(
        !harness
            .repository
            .delete_share_link(&owner(), &trip.id, &unknown, &cancel)
            .await
            .expect("missing link")
    );

    assert!(
        harness
            .repository
            .delete_trip(&owner(), &trip.id, &cancel)
            .await
            .expect("trip deleted")
    );
    let tables = harness.repository.tables().clone();
    assert_eq!(harness.store.row_count(&tables.trips).await, 0);
    assert_eq!(harness.store.row_count(&tables.entries).await, 1);
}

#[tokio::test]
async fn reorder_assigns_dense_positions() {
    let harness = MemoryHarness::new();
    let cancel = CancellationToken::new();
    let trip = seeded_trip(&harness).await;
    let mut ids = Vec::new();
    for title in ["Breakfast", "Museum", "Dinner"] {
        let entry = harness
            .repository
            .create_entry(
                &owner(),
                &trip.id,
                EntryDraft::new(date(2024, 5, 2), ItemType::Dining, title),
                &cancel,
            )
            .await
            .expect("entry created");
        ids.push(entry.id);
    }

    let order = vec![
        ids[2].clone(),
        EntryId::generate(),
        ids[0].clone(),
        ids[2].clone(),
        ids[1].clone(),
    ];
    let changed = harness
        .repository
        .reorder_entries(&owner(), &trip.id, date(2024, 5, 2), order, &cancel)
        .await
        .expect("reordered");
    assert_eq!(changed.len(), 3);

    let again = harness
        .repository
        .reorder_entries(
            &owner(),
            &trip.id,
            date(2024, 5, 2),
            vec![ids[2].clone(), ids[0].clone(), ids[1].clone()],
            &cancel,
        )
        .await
        .expect("reordered");
    assert!(again.is_empty());

    let dinner = harness
        .repository
        .get_entry(&owner(), &trip.id, &ids[2], &cancel)
        .await
        .expect("lookup")
        .expect("exists");
    assert_eq!(dinner.sort_order, Some(1));
}

#[tokio::test]
async fn bookings_link_to_one_live_entry() {
    let harness = MemoryHarness::new();
    let cancel = CancellationToken::new();
    let trip = seeded_trip(&harness).await;
    let entry = harness
        .repository
        .create_entry(
            &owner(),
            &trip.id,
            EntryDraft::new(date(2024, 5, 1), ItemType::Hotel, "Hotel Sol"),
            &cancel,
        )
        .await
        .expect("entry created");
    let draft = BookingDraft {
        entry_id: Some(entry.id.clone()),
        cost: Some(Decimal::new(12_000, 2)),
        currency: Some("eur".to_owned()),
        ..BookingDraft::default()
    };

    let booking = harness
        .repository
        .create_booking(&owner(), &trip.id, draft.clone(), &cancel)
        .await
        .expect("booked");
    assert_eq!(booking.item_type, ItemType::Hotel);
    assert_eq!(booking.currency.as_deref(), Some("EUR"));

    let err = harness
        .repository
        .create_booking(&owner(), &trip.id, draft.clone(), &cancel)
        .await
        .expect_err("entry already booked");
    assert_eq!(err.code(), ErrorCode::InvariantViolation);

    // The booking may keep its own link on update.
    harness
        .repository
        .update_booking(
            &owner(),
            BookingUpdate {
                trip_id: trip.id.clone(),
                booking_id: booking.id.clone(),
                version: booking.version.clone().expect("stored bookings are tagged"),
                draft: BookingDraft {
                    vendor: Some("Hotel Sol".to_owned()),
                    ..draft.clone()
                },
            },
            &cancel,
        )
        .await
        .expect("relink to same entry");

    let unlinked = harness
        .repository
        .create_booking(&owner(), &trip.id, BookingDraft::default(), &cancel)
        .await
        .expect("unlinked booking");
    assert_eq!(unlinked.item_type, ItemType::Other);

    // Another booking may not take over the entry's link.
    let err = harness
        .repository
        .update_booking(
            &owner(),
            BookingUpdate {
                trip_id: trip.id.clone(),
                booking_id: unlinked.id.clone(),
                version: unlinked.version.clone().expect("stored bookings are tagged"),
                draft: BookingDraft {
                    entry_id: Some(entry.id.clone()),
                    ..BookingDraft::default()
                },
            },
            &cancel,
        )
        .await
        .expect_err("entry linked by a different booking");
    assert_eq!(err.code(), ErrorCode::InvariantViolation);
    let still_unlinked = harness
        .repository
        .get_booking(&owner(), &trip.id, &unlinked.id, &cancel)
        .await
        .expect("lookup")
        .expect("exists");
    assert_eq!(still_unlinked.entry_id, None);

    harness
        .repository
        .delete_entry(&owner(), &trip.id, &entry.id, &cancel)
        .await
        .expect("entry deleted");
    let err = harness
        .repository
        .create_booking(
            &owner(),
            &trip.id,
            BookingDraft {
                entry_id: Some(entry.id.clone()),
                ..BookingDraft::default()
            },
            &cancel,
        )
        .await
        .expect_err("entry gone");
    assert_eq!(err.code(), ErrorCode::InvariantViolation);
    assert_eq!(harness.store.row_count("Bookings").await, 2);
}

#[tokio::test]
async fn share_links_mask_and_expire() {
    let harness = MemoryHarness::new();
    let cancel = CancellationToken::new();
    let trip = seeded_trip(&harness).await;
    harness
        .repository
        .create_booking(
            &owner(),
            &trip.id,
            BookingDraft {
                cost: Some(Decimal::new(5_000, 2)),
                currency: Some("EUR".to_owned()),
                confirmation_details: Some("ABC123".to_owned()),
                ..BookingDraft::default()
            },
            &cancel,
        )
        .await
        .expect("booked");
    let link = harness
        .repository
        .create_share_link(
            &owner(),
            &trip.id,
            ShareLinkDraft {
                expires_on: Some(fixture_now() + chrono::TimeDelta::days(2)),
                ..ShareLinkDraft::default()
            },
            &cancel,
        )
        .await
        .expect("link created");
    assert_eq!(link.code.as_str().len(), 10);
    assert_eq!(link.owner_id, trip.owner_id);

    let shared = harness
        .repository
        .get_trip_by_share_code(&link.code, &cancel)
        .await
        .expect("lookup")
        .expect("live link");
    assert_eq!(shared.access, None);
    let booking = &shared.bookings[0];
    assert_eq!(booking.cost, None);
    assert_eq!(booking.confirmation_details, None);

    harness.clock.advance_days(3);
    let expired = harness
        .repository
        .get_trip_by_share_code(&link.code, &cancel)
        .await
        .expect("lookup");
    assert!(expired.is_none());
}

#[tokio::test]
async fn share_links_are_hidden_from_readers() {
    let harness = MemoryHarness::new();
    let cancel = CancellationToken::new();
    let trip = seeded_trip(&harness).await;
    harness
        .repository
        .create_share_link(&owner(), &trip.id, ShareLinkDraft::default(), &cancel)
        .await
        .expect("link created");
    harness
        .repository
        .grant_access(
            &owner(),
            &trip.id,
            email("friend@example.com"),
            AccessLevel::ReadOnly,
            &cancel,
        )
        .await
        .expect("granted");

    let for_reader = harness
        .repository
        .list_share_links(&friend(), &trip.id, &cancel)
        .await
        .expect("listed");
    assert!(for_reader.is_empty());
    let for_owner = harness
        .repository
        .list_share_links(&owner(), &trip.id, &cancel)
        .await
        .expect("listed");
    assert_eq!(for_owner.len(), 1);
}

#[tokio::test]
async fn saved_links_upsert_and_list_newest_first() {
    let harness = MemoryHarness::new();
    let cancel = CancellationToken::new();
    let viewer = UserId::new("viewer").expect("user id");
    let first = ShareCode::new("AAAAAA1111").expect("code");
    let second = ShareCode::new("BBBBBB2222").expect("code");

    harness
        .repository
        .save_share_link(&viewer, &first, Some("Lisbon".to_owned()), &cancel)
        .await
        .expect("saved");
    harness.clock.advance_days(1);
    harness
        .repository
        .save_share_link(&viewer, &second, None, &cancel)
        .await
        .expect("saved");
    harness.clock.advance_days(1);
    let refreshed = harness
        .repository
        .save_share_link(&viewer, &first, None, &cancel)
        .await
        .expect("re-saved");
    assert_eq!(refreshed.trip_name.as_deref(), Some("Lisbon"));

    let listed = harness
        .repository
        .list_saved_share_links(&viewer, &cancel)
        .await
        .expect("listed");
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0].code, first);

    assert!(
        harness
            .repository
            .delete_saved_share_link(&viewer, &refreshed.id, &cancel)
            .await
            .expect("deleted")
    );
    assert!(
        !harness
            .repository
            .delete_saved_share_link(&viewer, &refreshed.id, &cancel)
            .await
            .expect("idempotent")
    );
}
