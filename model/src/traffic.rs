use std::collections::BTreeMap;

use abstutil::{prettyprint_usize, Counter};
use serde::Serialize;

use bikeshare::{StationID, Trip};

use crate::TimeWindow;

/// Arrivals and departures at one station, for some set of trips. Always recalculated from
/// scratch, never patched.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct StationTraffic {
    arrivals: usize,
    departures: usize,
    total: usize,
}

impl StationTraffic {
    pub fn new(arrivals: usize, departures: usize) -> Self {
        Self {
            arrivals,
            departures,
            total: arrivals + departures,
        }
    }

    pub fn arrivals(&self) -> usize {
        self.arrivals
    }

    pub fn departures(&self) -> usize {
        self.departures
    }

    pub fn total(&self) -> usize {
        self.total
    }
}

/// A trip is kept if either its start or end falls in the window. Trips with a malformed
/// timestamp are never kept, not even for an unbounded window.
pub fn trip_in_window(trip: &Trip, window: &TimeWindow) -> bool {
    match trip.times() {
        Some((start, end)) => window.matches(&start) || window.matches(&end),
        None => false,
    }
}

pub fn filter_trips<'a, I: IntoIterator<Item = &'a Trip>>(
    trips: I,
    window: TimeWindow,
) -> impl Iterator<Item = &'a Trip> {
    trips
        .into_iter()
        .filter(move |trip| trip_in_window(trip, &window))
}

/// Counts departures and arrivals per station for all trips in the window. Every station in
/// `station_ids` appears in the result, even with no traffic. Trip endpoints at any other station
/// are silently dropped.
pub fn aggregate<'a, T, S>(
    trips: T,
    window: &TimeWindow,
    station_ids: S,
) -> BTreeMap<StationID, StationTraffic>
where
    T: IntoIterator<Item = &'a Trip>,
    S: IntoIterator<Item = &'a StationID>,
{
    let mut departures: Counter<&StationID> = Counter::new();
    let mut arrivals: Counter<&StationID> = Counter::new();
    let mut kept = 0;
    for trip in filter_trips(trips, *window) {
        departures.inc(&trip.start_station);
        arrivals.inc(&trip.end_station);
        kept += 1;
    }

    let mut result = BTreeMap::new();
    for id in station_ids {
        result.insert(
            id.clone(),
            StationTraffic::new(arrivals.get(id), departures.get(id)),
        );
    }

    let counted: usize = result.values().map(|traffic| traffic.total()).sum();
    debug!(
        "{} trips match {}. {} trip endpoints are at unknown stations",
        prettyprint_usize(kept),
        window.describe(),
        prettyprint_usize((2 * kept).saturating_sub(counted))
    );

    result
}
