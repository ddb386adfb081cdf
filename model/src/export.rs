//! Writes a `ViewModel` out for renderers that live outside this crate.

use std::collections::BTreeMap;

use anyhow::Result;
use geojson::{Feature, FeatureCollection, GeoJson, Geometry, JsonObject, Value};
use serde::Serialize;

use bikeshare::{Station, StationID};

use crate::{FlowBalance, ViewModel};

/// Stations without any traffic aren't arrivals or departures, so they get a neutral color.
pub const NO_DATA_COLOR: &str = "#bdbdbd";

/// Low flow ratios (mostly arrivals) are red, high ones (mostly departures) are blue.
pub fn flow_color(balance: Option<FlowBalance>) -> String {
    match balance {
        Some(balance) => {
            let color = colorous::RED_BLUE.eval_continuous(balance.color_stop());
            format!("#{:02x}{:02x}{:02x}", color.r, color.g, color.b)
        }
        None => NO_DATA_COLOR.to_string(),
    }
}

pub fn to_csv(view: &ViewModel, stations: &BTreeMap<StationID, Station>) -> Result<String> {
    let mut out = Vec::new();
    {
        let mut writer = csv::Writer::from_writer(&mut out);
        for entry in &view.stations {
            let station = lookup(stations, &entry.station_id)?;
            writer.serialize(ExportRow {
                station_id: &entry.station_id,
                name: &station.name,
                lat: station.lat,
                lon: station.lon,
                arrivals: entry.traffic.arrivals(),
                departures: entry.traffic.departures(),
                total: entry.traffic.total(),
                radius: entry.radius,
                flow_ratio: entry.flow_ratio,
            })?;
        }
        writer.flush()?;
    }
    let out = String::from_utf8(out)?;
    Ok(out)
}

/// One point per station, with everything needed to style a marker in the properties.
pub fn to_geojson(view: &ViewModel, stations: &BTreeMap<StationID, Station>) -> Result<GeoJson> {
    let mut features = Vec::new();
    for entry in &view.stations {
        let station = lookup(stations, &entry.station_id)?;

        let mut properties = JsonObject::new();
        properties.insert("id".to_string(), entry.station_id.as_str().into());
        properties.insert("name".to_string(), station.name.clone().into());
        properties.insert("arrivals".to_string(), entry.traffic.arrivals().into());
        properties.insert("departures".to_string(), entry.traffic.departures().into());
        properties.insert("total".to_string(), entry.traffic.total().into());
        properties.insert("radius".to_string(), entry.radius.into());
        properties.insert(
            "flow_ratio".to_string(),
            entry
                .flow_ratio
                .map(serde_json::Value::from)
                .unwrap_or(serde_json::Value::Null),
        );
        properties.insert(
            "fill".to_string(),
            flow_color(entry.flow_balance()).into(),
        );
        properties.insert("description".to_string(), entry.describe().into());

        features.push(Feature {
            bbox: None,
            geometry: Some(Geometry::new(Value::Point(vec![station.lon, station.lat]))),
            id: None,
            properties: Some(properties),
            foreign_members: None,
        });
    }

    let mut foreign_members = JsonObject::new();
    foreign_members.insert("time_window".to_string(), view.window.describe().into());
    foreign_members.insert(
        "radius_domain".to_string(),
        vec![view.scale.domain().0, view.scale.domain().1].into(),
    );
    foreign_members.insert(
        "radius_range".to_string(),
        vec![view.scale.range().0, view.scale.range().1].into(),
    );

    Ok(GeoJson::FeatureCollection(FeatureCollection {
        features,
        bbox: None,
        foreign_members: Some(foreign_members),
    }))
}

fn lookup<'a>(stations: &'a BTreeMap<StationID, Station>, id: &StationID) -> Result<&'a Station> {
    stations
        .get(id)
        .ok_or_else(|| anyhow!("{:?} isn't in the station registry", id))
}

#[derive(Serialize)]
struct ExportRow<'a> {
    station_id: &'a StationID,
    name: &'a str,
    lat: f64,
    lon: f64,
    arrivals: usize,
    departures: usize,
    total: usize,
    radius: f64,
    flow_ratio: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::{station, trip};
    use crate::{build_pipeline, TimeWindow};

    #[test]
    fn csv_rows() {
        let pipeline = build_pipeline(
            vec![station("S1"), station("S2"), station("S3")],
            vec![trip("S1", "S2", "08:00", "08:20")],
        )
        .unwrap();
        let view = pipeline.run(&TimeWindow::Unbounded);
        let out = to_csv(&view, pipeline.stations()).unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(
            lines,
            vec![
                "station_id,name,lat,lon,arrivals,departures,total,radius,flow_ratio",
                "S1,Station S1,42.36,-71.09,0,1,1,25.0,1.0",
                "S2,Station S2,42.36,-71.09,1,0,1,25.0,0.0",
                "S3,Station S3,42.36,-71.09,0,0,0,0.0,",
            ]
        );
    }

    #[test]
    fn geojson_features() {
        let pipeline = build_pipeline(
            vec![station("S1"), station("S2")],
            vec![trip("S1", "S2", "08:00", "08:20")],
        )
        .unwrap();
        let view = pipeline.run(&TimeWindow::centered(600, 60).unwrap());
        let gj = to_geojson(&view, pipeline.stations()).unwrap();

        let collection = match gj {
            GeoJson::FeatureCollection(collection) => collection,
            _ => panic!("expected a FeatureCollection"),
        };
        assert_eq!(collection.features.len(), 2);
        for feature in &collection.features {
            let properties = feature.properties.as_ref().unwrap();
            assert_eq!(properties["flow_ratio"], serde_json::Value::Null);
            assert_eq!(properties["fill"], NO_DATA_COLOR);
            assert_eq!(properties["radius"], 3.0);
        }
        assert_eq!(
            collection.foreign_members.unwrap()["radius_domain"],
            serde_json::json!([0.0, 1.0])
        );
    }

    #[test]
    fn colors() {
        assert_eq!(flow_color(None), NO_DATA_COLOR);
        let arrivals = flow_color(Some(FlowBalance::MostlyArrivals));
        let departures = flow_color(Some(FlowBalance::MostlyDepartures));
        assert_ne!(arrivals, departures);
        assert_eq!(arrivals.len(), 7);
        assert!(departures.starts_with('#'));
    }

    #[test]
    fn unknown_station() {
        let pipeline = build_pipeline(vec![station("S1")], Vec::new()).unwrap();
        let view = pipeline.run(&TimeWindow::Unbounded);
        assert!(to_csv(&view, &BTreeMap::new()).is_err());
    }
}
