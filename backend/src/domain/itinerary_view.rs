//! Read-side service combining trip details with the timeline and route
//! projections.

use std::sync::Arc;

use chrono::NaiveDate;
use serde::Serialize;
use tokio_util::sync::CancellationToken;

use crate::domain::ports::TripRepository;
use crate::domain::{
    DomainError, Principal, RouteStop, ShareCode, Timeline, TripDetails, TripId, project_route,
};

/// Everything a trip page renders.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItineraryView {
    /// Trip with entries and (possibly masked) bookings.
    pub details: TripDetails,
    /// Calendar grid.
    pub timeline: Timeline,
    /// Map stops.
    pub route: Vec<RouteStop>,
}

impl ItineraryView {
    /// Project `details` as seen on `today`.
    pub fn project(details: TripDetails, today: NaiveDate) -> Self {
        let timeline = Timeline::from_details(&details, today);
        let route = project_route(&details.entries);
        Self {
            details,
            timeline,
            route,
        }
    }
}

/// Loads trip details through [`TripRepository`] and projects them.
#[derive(Clone)]
pub struct ItineraryViewService<R> {
    trips: Arc<R>,
}

impl<R> ItineraryViewService<R> {
    /// Create a service over the trip repository.
    pub fn new(trips: Arc<R>) -> Self {
        Self { trips }
    }
}

impl<R> ItineraryViewService<R>
where
    R: TripRepository,
{
    /// View of a trip the principal can see.
    pub async fn trip_view(
        &self,
        principal: &Principal,
        trip_id: &TripId,
        today: NaiveDate,
        cancel: &CancellationToken,
    ) -> Result<Option<ItineraryView>, DomainError> {
        let details = self
            .trips
            .get_trip_details(principal, trip_id, cancel)
            .await?;
        Ok(details.map(|details| ItineraryView::project(details, today)))
    }

    /// Anonymous view through a share code.
    pub async fn shared_view(
        &self,
        code: &ShareCode,
        today: NaiveDate,
        cancel: &CancellationToken,
    ) -> Result<Option<ItineraryView>, DomainError> {
        let details = self.trips.get_trip_by_share_code(code, cancel).await?;
        Ok(details.map(|details| ItineraryView::project(details, today)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::MockTripRepository;
    use crate::domain::{
        AccessLevel, EntryDraft, EntryId, EntryLocation, ErrorCode, ItemType, Trip, UserId,
    };

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 9, d).expect("valid date")
    }

    fn details() -> TripDetails {
        let trip = Trip {
            owner_id: UserId::new("owner").expect("owner"),
            id: TripId::generate(),
            name: "Rome".to_owned(),
            slug: "rome".to_owned(),
            start_date: Some(day(1)),
            end_date: Some(day(3)),
            home_time_zone: None,
            default_currency: Some("EUR".to_owned()),
            version: None,
        };
        let entry = EntryDraft {
            location: Some(EntryLocation {
                name: Some("Colosseum".to_owned()),
                latitude: Some(41.89),
                longitude: Some(12.49),
                ..EntryLocation::default()
            }),
            ..EntryDraft::new(day(2), ItemType::Tour, "Colosseum")
        }
        .into_entry(trip.id.clone(), EntryId::generate(), None)
        .expect("entry");
        TripDetails::for_principal(trip, vec![entry], Vec::new(), AccessLevel::Owner)
    }

    #[tokio::test]
    async fn trip_view_projects_timeline_and_route() {
        let principal = Principal::new(UserId::new("owner").expect("owner"), None);
        let expected = details();
        let trip_id = expected.trip.id.clone();
        let mut repo = MockTripRepository::new();
        repo.expect_get_trip_details()
            .times(1)
            .return_once(move |_, _, _| Ok(Some(expected)));

        let service = ItineraryViewService::new(Arc::new(repo));
        let view = service
            .trip_view(&principal, &trip_id, day(1), &CancellationToken::new())
            .await
            .expect("view loads")
            .expect("trip visible");

        assert_eq!(view.timeline.day_count(), 3);
        assert_eq!(view.timeline.days[1].entries.len(), 1);
        assert_eq!(view.route.len(), 1);
    }

    #[tokio::test]
    async fn missing_share_yields_no_view() {
        let mut repo = MockTripRepository::new();
        repo.expect_get_trip_by_share_code()
            .times(1)
            .return_once(|_, _| Ok(None));

        let service = ItineraryViewService::new(Arc::new(repo));
        let code = ShareCode::new("gone000000").expect("code");
        let view = service
            .shared_view(&code, day(1), &CancellationToken::new())
            .await
            .expect("lookup succeeds");

        assert!(view.is_none());
    }

    #[tokio::test]
    async fn repository_errors_propagate() {
        let mut repo = MockTripRepository::new();
        repo.expect_get_trip_by_share_code()
            .times(1)
            .return_once(|_, _| Err(DomainError::data_integrity("share link has no owner")));

        let service = ItineraryViewService::new(Arc::new(repo));
        let code = ShareCode::new("broken0000").expect("code");
        let error = service
            .shared_view(&code, day(1), &CancellationToken::new())
            .await
            .expect_err("integrity fault surfaces");

        assert_eq!(error.code(), ErrorCode::DataIntegrity);
    }
}
