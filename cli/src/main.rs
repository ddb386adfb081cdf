#[macro_use]
extern crate anyhow;
#[macro_use]
extern crate log;

use std::collections::BTreeMap;
use std::path::Path;

use abstutil::{prettyprint_usize, Timer};
use anyhow::Result;
use structopt::StructOpt;

use bikeshare::{Dataset, Station, StationID};
use model::{export, QueryPipeline, Settings, ViewModel};

/// Summarizes bike-share station traffic around some time of day
#[derive(StructOpt)]
struct Args {
    /// A directory with stations.json and trips.csv
    #[structopt(long)]
    dir: Option<String>,
    /// A .zip file with stations.json and trips.csv
    #[structopt(long)]
    import_zip: Option<String>,
    /// Minutes since midnight to center the time window on, or -1 for any time
    #[structopt(long, default_value = "-1", allow_hyphen_values = true)]
    time: i32,
    /// A JSON file overriding some settings
    #[structopt(long)]
    config: Option<String>,
    /// Write results to this file instead of printing a summary. The extension picks the format:
    /// .csv, .geojson, or .json for the raw view model
    #[structopt(long)]
    output: Option<String>,
    /// How many of the busiest stations to print in the summary
    #[structopt(long, default_value = "10")]
    top: usize,
}

impl Args {
    fn load(&self, timer: &mut Timer) -> Result<Dataset> {
        match (&self.dir, &self.import_zip) {
            (Some(_), Some(_)) => bail!("You can't specify both --dir and --import-zip"),
            (Some(dir), None) => Dataset::load_from_dir(dir, timer),
            (None, Some(path)) => Dataset::import_zip_bytes(fs_err::read(path)?, timer),
            (None, None) => bail!("No input specified; pass --dir or --import-zip"),
        }
    }

    fn settings(&self) -> Result<Settings> {
        match self.config {
            Some(ref path) => Settings::from_json(&fs_err::read(path)?),
            None => Ok(Settings::default()),
        }
    }
}

fn main() -> Result<()> {
    abstutil::logger::setup();

    let args = Args::from_iter(abstutil::cli_args());
    let settings = args.settings()?;
    let dataset = {
        let mut timer = Timer::new("load bike-share data");
        args.load(&mut timer)?
    };
    let pipeline = QueryPipeline::new(dataset, settings)?;

    let window = pipeline.window_from_slider(args.time)?;
    let view = pipeline.run(&window);
    info!(
        "Traffic for {} across {} stations",
        window.describe(),
        prettyprint_usize(view.stations.len())
    );

    match args.output {
        Some(ref path) => write_output(path, &view, pipeline.stations()),
        None => {
            print_summary(&view, pipeline.stations(), args.top);
            Ok(())
        }
    }
}

fn write_output(
    path: &str,
    view: &ViewModel,
    stations: &BTreeMap<StationID, Station>,
) -> Result<()> {
    let contents = match Path::new(path).extension().and_then(|x| x.to_str()) {
        Some("csv") => export::to_csv(view, stations)?,
        Some("geojson") => serde_json::to_string_pretty(&export::to_geojson(view, stations)?)?,
        Some("json") => serde_json::to_string_pretty(view)?,
        _ => bail!("Don't know what format to write {path} in; use .csv, .geojson, or .json"),
    };
    fs_err::write(path, contents)?;
    info!("Wrote {path}");
    Ok(())
}

fn print_summary(view: &ViewModel, stations: &BTreeMap<StationID, Station>, top: usize) {
    let mut busiest: Vec<_> = view.stations.iter().collect();
    busiest.sort_by(|a, b| {
        b.traffic
            .total()
            .cmp(&a.traffic.total())
            .then_with(|| a.station_id.cmp(&b.station_id))
    });

    println!("Busiest stations, {}", view.window.describe());
    for entry in busiest.into_iter().take(top) {
        let name = stations
            .get(&entry.station_id)
            .map(|s| s.name.as_str())
            .unwrap_or("");
        let balance = entry
            .flow_balance()
            .map(|b| b.describe())
            .unwrap_or("no data");
        println!(
            "  {} {}: {}, {}",
            entry.station_id,
            name,
            entry.describe(),
            balance
        );
    }

    let silent = view
        .stations
        .iter()
        .filter(|s| s.flow_ratio.is_none())
        .count();
    println!(
        "{} stations had no traffic",
        prettyprint_usize(silent)
    );
}
