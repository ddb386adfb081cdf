use abstutil::prettyprint_usize;
use anyhow::Result;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::StationID;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Trip {
    pub start_station: StationID,
    pub end_station: StationID,
    /// None when the raw timestamp couldn't be parsed. Such trips never match any time window.
    pub started_at: Option<NaiveDateTime>,
    pub ended_at: Option<NaiveDateTime>,
}

impl Trip {
    /// Both timestamps, if both were parsed
    pub fn times(&self) -> Option<(NaiveDateTime, NaiveDateTime)> {
        Some((self.started_at?, self.ended_at?))
    }
}

/// Every trip, parsed once and never modified afterwards.
#[derive(Clone, Debug, Default)]
pub struct TripStore {
    trips: Vec<Trip>,
}

impl TripStore {
    pub fn new(trips: Vec<Trip>) -> Self {
        Self { trips }
    }

    pub fn iter(&self) -> std::slice::Iter<Trip> {
        self.trips.iter()
    }

    pub fn len(&self) -> usize {
        self.trips.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trips.is_empty()
    }

    pub fn num_malformed(&self) -> usize {
        self.trips.iter().filter(|t| t.times().is_none()).count()
    }
}

impl<'a> IntoIterator for &'a TripStore {
    type Item = &'a Trip;
    type IntoIter = std::slice::Iter<'a, Trip>;

    fn into_iter(self) -> Self::IntoIter {
        self.trips.iter()
    }
}

pub fn load<R: std::io::Read>(reader: R) -> Result<TripStore> {
    let mut trips = Vec::new();
    for rec in csv::Reader::from_reader(reader).deserialize() {
        let rec: Record = rec?;
        trips.push(Trip {
            start_station: rec.start_station_id,
            end_station: rec.end_station_id,
            started_at: parse_timestamp(&rec.started_at),
            ended_at: parse_timestamp(&rec.ended_at),
        });
    }
    let trips = TripStore::new(trips);

    let malformed = trips.num_malformed();
    if malformed > 0 {
        warn!(
            "{} of {} trips have a malformed timestamp and will be excluded from every time window",
            prettyprint_usize(malformed),
            prettyprint_usize(trips.len())
        );
    }
    Ok(trips)
}

const TIMESTAMP_FORMATS: [&str; 5] = [
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%m/%d/%Y %H:%M",
];

/// Parses a local wall-clock timestamp. The date is kept, but only the time of day matters for
/// filtering.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    TIMESTAMP_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
}

#[derive(Deserialize)]
struct Record {
    start_station_id: StationID,
    end_station_id: StationID,
    started_at: String,
    ended_at: String,
}
