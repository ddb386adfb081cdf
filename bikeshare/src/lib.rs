//! Loads a bike-share station registry and trip log into typed, immutable records. Join keys and
//! timestamps are normalized here, once, so nothing downstream has to guess at raw field names.

#[macro_use]
extern crate anyhow;
#[macro_use]
extern crate log;

mod stations;
mod trips;

use std::collections::BTreeMap;

use abstutil::{prettyprint_usize, Timer};
use anyhow::{Context, Result};
use zip::ZipArchive;

pub use stations::{Station, StationID};
pub use trips::{parse_timestamp, Trip, TripStore};

pub const STATIONS_FILE: &str = "stations.json";
pub const TRIPS_FILE: &str = "trips.csv";

pub struct Dataset {
    pub stations: BTreeMap<StationID, Station>,
    pub trips: TripStore,
}

impl Dataset {
    /// Expects `stations.json` and `trips.csv` in the directory.
    pub fn load_from_dir(dir: &str, timer: &mut Timer) -> Result<Self> {
        timer.start("load stations");
        let stations = stations::load(fs_err::File::open(format!("{dir}/{STATIONS_FILE}"))?)
            .with_context(|| format!("{dir}/{STATIONS_FILE}"))?;
        timer.stop("load stations");

        timer.start("load trips");
        let trips = trips::load(fs_err::File::open(format!("{dir}/{TRIPS_FILE}"))?)
            .with_context(|| format!("{dir}/{TRIPS_FILE}"))?;
        timer.stop("load trips");

        Ok(Self::new(stations, trips))
    }

    pub fn import_zip_bytes(bytes: Vec<u8>, timer: &mut Timer) -> Result<Self> {
        let mut archive = ZipArchive::new(std::io::Cursor::new(bytes))?;

        timer.start("load stations");
        let stations = stations::load(get_zip_file(&mut archive, STATIONS_FILE)?)
            .context(STATIONS_FILE)?;
        timer.stop("load stations");

        timer.start("load trips");
        let trips = trips::load(get_zip_file(&mut archive, TRIPS_FILE)?).context(TRIPS_FILE)?;
        timer.stop("load trips");

        Ok(Self::new(stations, trips))
    }

    pub fn new(stations: BTreeMap<StationID, Station>, trips: TripStore) -> Self {
        let dataset = Self { stations, trips };
        dataset.check();
        dump_bounding_box(&dataset.stations);
        dataset
    }

    /// Trips referencing stations missing from the registry aren't an error, but they're worth
    /// knowing about. Returns the number of such trips.
    pub fn check(&self) -> usize {
        let orphans = self
            .trips
            .iter()
            .filter(|trip| {
                !self.stations.contains_key(&trip.start_station)
                    || !self.stations.contains_key(&trip.end_station)
            })
            .count();
        info!(
            "{} stations, {} trips",
            prettyprint_usize(self.stations.len()),
            prettyprint_usize(self.trips.len())
        );
        if orphans > 0 {
            warn!(
                "{} trips reference a station not in the registry",
                prettyprint_usize(orphans)
            );
        }
        orphans
    }
}

fn dump_bounding_box(stations: &BTreeMap<StationID, Station>) {
    use geojson::{Feature, FeatureCollection, GeoJson, Geometry, Value};

    if stations.is_empty() {
        return;
    }
    let mut min_lon = f64::MAX;
    let mut min_lat = f64::MAX;
    let mut max_lon = f64::MIN;
    let mut max_lat = f64::MIN;
    for station in stations.values() {
        min_lon = min_lon.min(station.lon);
        min_lat = min_lat.min(station.lat);
        max_lon = max_lon.max(station.lon);
        max_lat = max_lat.max(station.lat);
    }

    let ring = vec![
        vec![min_lon, min_lat],
        vec![max_lon, min_lat],
        vec![max_lon, max_lat],
        vec![min_lon, max_lat],
        vec![min_lon, min_lat],
    ];
    let feature = Feature {
        bbox: None,
        geometry: Some(Geometry::new(Value::Polygon(vec![ring]))),
        id: None,
        properties: None,
        foreign_members: None,
    };
    let gj = GeoJson::FeatureCollection(FeatureCollection {
        features: vec![feature],
        bbox: None,
        foreign_members: None,
    });
    debug!("GeoJSON covering the bounding box of all stations: {gj}");
}

// Adds the path in the error message
pub fn get_zip_file<'a, R: std::io::Read + std::io::Seek>(
    archive: &'a mut ZipArchive<R>,
    path: &str,
) -> Result<zip::read::ZipFile<'a>> {
    archive
        .by_name(path)
        .map_err(|err| anyhow!("{path}: {err}"))
}
