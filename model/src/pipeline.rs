use std::collections::BTreeMap;

use anyhow::Result;
use serde::Serialize;

use bikeshare::{Dataset, Station, StationID, Trip, TripStore};

use crate::{
    aggregate, derive_radius_scale, flow_ratio, FlowBalance, RadiusScale, Settings,
    StationTraffic, TimeWindow,
};

/// Holds the loaded stations and trips and nothing else. Every call to `run` recalculates
/// everything from scratch, so results never depend on earlier calls.
pub struct QueryPipeline {
    stations: BTreeMap<StationID, Station>,
    trips: TripStore,
    settings: Settings,
}

/// Everything a renderer needs for one time window.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ViewModel {
    pub window: TimeWindow,
    pub scale: RadiusScale,
    /// Exactly one per station, ordered by station ID
    pub stations: Vec<StationView>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct StationView {
    pub station_id: StationID,
    pub traffic: StationTraffic,
    pub radius: f64,
    /// None when the station has no traffic in this window
    pub flow_ratio: Option<f64>,
}

impl StationView {
    pub fn flow_balance(&self) -> Option<FlowBalance> {
        self.flow_ratio.map(FlowBalance::from_ratio)
    }

    /// Tooltip text
    pub fn describe(&self) -> String {
        format!(
            "{} trips ({} departures, {} arrivals)",
            self.traffic.total(),
            self.traffic.departures(),
            self.traffic.arrivals()
        )
    }
}

impl ViewModel {
    pub fn station(&self, id: &StationID) -> Option<&StationView> {
        self.stations
            .binary_search_by(|view| view.station_id.cmp(id))
            .ok()
            .map(|idx| &self.stations[idx])
    }
}

/// Uses the default settings. Fails if two stations share an ID.
pub fn build_pipeline(stations: Vec<Station>, trips: Vec<Trip>) -> Result<QueryPipeline> {
    let mut registry = BTreeMap::new();
    for station in stations {
        if registry.contains_key(&station.id) {
            bail!("Duplicate {:?}", station.id);
        }
        registry.insert(station.id.clone(), station);
    }
    QueryPipeline::new(
        Dataset::new(registry, TripStore::new(trips)),
        Settings::default(),
    )
}

impl QueryPipeline {
    pub fn new(dataset: Dataset, settings: Settings) -> Result<Self> {
        settings.validate()?;
        Ok(Self {
            stations: dataset.stations,
            trips: dataset.trips,
            settings,
        })
    }

    pub fn stations(&self) -> &BTreeMap<StationID, Station> {
        &self.stations
    }

    pub fn trips(&self) -> &TripStore {
        &self.trips
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Interprets a raw time slider value, using the configured window radius.
    pub fn window_from_slider(&self, value: i32) -> Result<TimeWindow> {
        TimeWindow::from_slider(value, self.settings.window_radius_minutes)
    }

    pub fn run_slider(&self, value: i32) -> Result<ViewModel> {
        Ok(self.run(&self.window_from_slider(value)?))
    }

    pub fn run(&self, window: &TimeWindow) -> ViewModel {
        let aggregates = aggregate(&self.trips, window, self.stations.keys());
        let scale = derive_radius_scale(aggregates.values(), window.is_windowed(), &self.settings);
        let stations = aggregates
            .into_iter()
            .map(|(station_id, traffic)| StationView {
                station_id,
                radius: scale.radius(traffic.total()),
                flow_ratio: flow_ratio(&traffic),
                traffic,
            })
            .collect();
        ViewModel {
            window: *window,
            scale,
            stations,
        }
    }
}
