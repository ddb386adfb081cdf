use std::collections::BTreeMap;

use anyhow::Result;
use serde::{Deserialize, Deserializer, Serialize};

/// The canonical join key between stations and trips.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct StationID(String);

impl StationID {
    pub fn new<I: Into<String>>(id: I) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for StationID {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Station {
    pub id: StationID,
    pub name: String,
    pub lat: f64,
    pub lon: f64,
}

/// Accepts the registry either wrapped like `{"data": {"stations": [...]}}` or as a bare list.
pub fn load<R: std::io::Read>(reader: R) -> Result<BTreeMap<StationID, Station>> {
    let value: serde_json::Value = serde_json::from_reader(reader)?;
    let list = match value.pointer("/data/stations") {
        Some(list) => list.clone(),
        None => value,
    };
    let records: Vec<Record> = serde_json::from_value(list)?;

    let mut stations = BTreeMap::new();
    for rec in records {
        let id = rec.station_id()?;
        if stations.contains_key(&id) {
            bail!("Duplicate {:?}", id);
        }
        stations.insert(
            id.clone(),
            Station {
                id,
                name: rec.name,
                lat: rec.lat,
                lon: rec.lon,
            },
        );
    }
    Ok(stations)
}

// Different exports of the registry disagree about field names. Trips always refer to stations by
// the value stored in short_name or Number.
#[derive(Deserialize)]
struct Record {
    short_name: Option<String>,
    #[serde(rename = "Number")]
    number: Option<String>,
    #[serde(alias = "NAME")]
    name: String,
    #[serde(alias = "Lat", deserialize_with = "parse_coordinate")]
    lat: f64,
    #[serde(alias = "Long", deserialize_with = "parse_coordinate")]
    lon: f64,
}

impl Record {
    fn station_id(&self) -> Result<StationID> {
        match (&self.short_name, &self.number) {
            (Some(x), Some(y)) if x != y => bail!(
                "Station {} has short_name {x} and Number {y}; not sure which one trips use",
                self.name
            ),
            (Some(x), _) | (None, Some(x)) => Ok(StationID(x.clone())),
            (None, None) => bail!("Station {} has neither short_name nor Number", self.name),
        }
    }
}

// Some exports quote coordinates
fn parse_coordinate<'de, D: Deserializer<'de>>(d: D) -> Result<f64, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(f64),
        Text(String),
    }

    let x = match Raw::deserialize(d)? {
        Raw::Number(x) => x,
        Raw::Text(x) => x
            .trim()
            .parse::<f64>()
            .map_err(|_| serde::de::Error::custom(format!("Unknown coordinate {x}")))?,
    };
    if !x.is_finite() {
        return Err(serde::de::Error::custom(format!("Unknown coordinate {x}")));
    }
    Ok(x)
}
