//! The time-windowed traffic engine: filter trips by time of day, count arrivals and departures
//! per station, and derive marker sizes and colors from the counts.

#[macro_use]
extern crate anyhow;
#[macro_use]
extern crate log;

pub mod export;
mod pipeline;
mod scale;
mod settings;
mod traffic;
mod window;

pub use self::pipeline::{build_pipeline, QueryPipeline, StationView, ViewModel};
pub use self::scale::{derive_radius_scale, flow_ratio, FlowBalance, RadiusScale};
pub use self::settings::Settings;
pub use self::traffic::{aggregate, filter_trips, trip_in_window, StationTraffic};
pub use self::window::{
    circular_distance, format_minutes, minutes_since_midnight, CenteredWindow, TimeWindow,
    ANY_TIME, DEFAULT_RADIUS_MINUTES, MINUTES_PER_DAY,
};

#[cfg(test)]
mod test_util {
    use bikeshare::{parse_timestamp, Station, StationID, Trip};

    pub fn station(id: &str) -> Station {
        Station {
            id: StationID::new(id),
            name: format!("Station {id}"),
            lat: 42.36,
            lon: -71.09,
        }
    }

    pub fn ids(list: &[&str]) -> Vec<StationID> {
        list.iter().map(|id| StationID::new(*id)).collect()
    }

    /// Times are HH:MM on an arbitrary day
    pub fn trip(start: &str, end: &str, started_at: &str, ended_at: &str) -> Trip {
        Trip {
            start_station: StationID::new(start),
            end_station: StationID::new(end),
            started_at: parse_timestamp(&format!("2024-03-01 {started_at}:00")),
            ended_at: parse_timestamp(&format!("2024-03-01 {ended_at}:00")),
        }
    }
}
