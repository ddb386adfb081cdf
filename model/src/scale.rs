use serde::Serialize;

use crate::{Settings, StationTraffic};

/// Maps a station's total traffic to a marker radius. Uses a square root, so the marker's area,
/// not its radius, grows linearly with traffic.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct RadiusScale {
    domain: (f64, f64),
    range: (f64, f64),
}

impl RadiusScale {
    /// If every station has zero traffic, the domain becomes [0, 1].
    pub fn new(max_total: usize, range: (f64, f64)) -> Self {
        let max = if max_total == 0 {
            1.0
        } else {
            max_total as f64
        };
        Self {
            domain: (0.0, max),
            range,
        }
    }

    pub fn domain(&self) -> (f64, f64) {
        self.domain
    }

    pub fn range(&self) -> (f64, f64) {
        self.range
    }

    pub fn radius(&self, total: usize) -> f64 {
        let (min, max) = self.range;
        min + (max - min) * (total as f64 / self.domain.1).sqrt()
    }
}

pub fn derive_radius_scale<'a, I: IntoIterator<Item = &'a StationTraffic>>(
    aggregates: I,
    windowed: bool,
    settings: &Settings,
) -> RadiusScale {
    let max_total = aggregates
        .into_iter()
        .map(|traffic| traffic.total())
        .max()
        .unwrap_or(0);
    RadiusScale::new(max_total, settings.radius_range(windowed))
}

/// The fraction of a station's traffic that departs, or None if there's no traffic at all. No
/// data is not the same as balanced traffic.
pub fn flow_ratio(traffic: &StationTraffic) -> Option<f64> {
    if traffic.total() == 0 {
        return None;
    }
    Some(traffic.departures() as f64 / traffic.total() as f64)
}

/// Flow ratio quantized into three evenly sized buckets, for picking a color.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum FlowBalance {
    MostlyArrivals,
    Balanced,
    MostlyDepartures,
}

impl FlowBalance {
    pub fn from_ratio(ratio: f64) -> Self {
        if ratio < 1.0 / 3.0 {
            Self::MostlyArrivals
        } else if ratio < 2.0 / 3.0 {
            Self::Balanced
        } else {
            Self::MostlyDepartures
        }
    }

    /// Where this bucket sits on a [0, 1] color axis
    pub fn color_stop(self) -> f64 {
        match self {
            Self::MostlyArrivals => 0.0,
            Self::Balanced => 0.5,
            Self::MostlyDepartures => 1.0,
        }
    }

    pub fn describe(self) -> &'static str {
        match self {
            Self::MostlyArrivals => "mostly arrivals",
            Self::Balanced => "balanced",
            Self::MostlyDepartures => "mostly departures",
        }
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn all_zero_traffic() {
        let aggregates = vec![StationTraffic::default(); 3];
        for windowed in [false, true] {
            let settings = Settings::default();
            let scale = derive_radius_scale(&aggregates, windowed, &settings);
            assert_eq!(scale.domain(), (0.0, 1.0));
            assert_eq!(scale.radius(0), settings.radius_range(windowed).0);
            assert!(scale.radius(0).is_finite());
        }

        let empty: Vec<StationTraffic> = Vec::new();
        let scale = derive_radius_scale(&empty, false, &Settings::default());
        assert_eq!(scale.domain(), (0.0, 1.0));
    }

    #[test]
    fn range_depends_on_window() {
        let aggregates = vec![StationTraffic::new(30, 70), StationTraffic::new(1, 0)];
        let settings = Settings::default();

        let unbounded = derive_radius_scale(&aggregates, false, &settings);
        assert_eq!(unbounded.domain(), (0.0, 100.0));
        assert_eq!(unbounded.range(), (0.0, 25.0));
        assert_relative_eq!(unbounded.radius(100), 25.0);

        let windowed = derive_radius_scale(&aggregates, true, &settings);
        assert_eq!(windowed.range(), (3.0, 50.0));
        assert_relative_eq!(windowed.radius(0), 3.0);
        assert_relative_eq!(windowed.radius(100), 50.0);
        // Same count, bigger marker when windowed
        assert!(windowed.radius(25) > unbounded.radius(25));
    }

    #[test]
    fn area_grows_linearly() {
        let scale = RadiusScale::new(400, (0.0, 25.0));
        assert_relative_eq!(scale.radius(100), 12.5);
        for (t1, t2) in [(1, 4), (25, 100), (37, 400), (3, 5)] {
            let (r1, r2) = (scale.radius(t1), scale.radius(t2));
            assert!(r1 <= r2);
            assert_relative_eq!(
                r1.powi(2) / r2.powi(2),
                t1 as f64 / t2 as f64,
                max_relative = 1e-12
            );
        }
    }

    #[test]
    fn monotonic_with_offset_range() {
        let scale = RadiusScale::new(1000, (3.0, 50.0));
        let mut prev = scale.radius(0);
        for total in 1..=1000 {
            let next = scale.radius(total);
            assert!(prev <= next);
            prev = next;
        }
    }

    #[test]
    fn flow_ratios() {
        assert_eq!(flow_ratio(&StationTraffic::new(0, 0)), None);
        assert_eq!(flow_ratio(&StationTraffic::new(1, 0)), Some(0.0));
        assert_eq!(flow_ratio(&StationTraffic::new(0, 4)), Some(1.0));
        assert_eq!(flow_ratio(&StationTraffic::new(3, 1)), Some(0.25));
    }

    #[test]
    fn balance_buckets() {
        assert_eq!(FlowBalance::from_ratio(0.0), FlowBalance::MostlyArrivals);
        assert_eq!(FlowBalance::from_ratio(0.3), FlowBalance::MostlyArrivals);
        assert_eq!(FlowBalance::from_ratio(0.5), FlowBalance::Balanced);
        assert_eq!(FlowBalance::from_ratio(0.66), FlowBalance::Balanced);
        assert_eq!(FlowBalance::from_ratio(0.7), FlowBalance::MostlyDepartures);
        assert_eq!(FlowBalance::from_ratio(1.0), FlowBalance::MostlyDepartures);
        assert_eq!(FlowBalance::Balanced.color_stop(), 0.5);
    }
}
