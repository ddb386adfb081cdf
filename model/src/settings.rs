use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::DEFAULT_RADIUS_MINUTES;

/// Tunable parts of the visual encoding. Any field missing from a config file gets the default.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// How far a centered time window reaches on each side
    pub window_radius_minutes: u16,
    /// Marker radius range when every trip is shown
    pub unbounded_range: (f64, f64),
    /// Marker radius range for a time window. Fewer trips match a narrow window, so markers are
    /// drawn larger than for the whole day.
    pub windowed_range: (f64, f64),
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            window_radius_minutes: DEFAULT_RADIUS_MINUTES,
            unbounded_range: (0.0, 25.0),
            windowed_range: (3.0, 50.0),
        }
    }
}

impl Settings {
    pub fn from_json(bytes: &[u8]) -> Result<Self> {
        let settings: Self = serde_json::from_slice(bytes)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<()> {
        if self.window_radius_minutes == 0 {
            bail!("window_radius_minutes must be positive");
        }
        for (name, (min, max)) in [
            ("unbounded_range", self.unbounded_range),
            ("windowed_range", self.windowed_range),
        ] {
            if !min.is_finite() || !max.is_finite() || min < 0.0 || min > max {
                bail!("{name} ({min}, {max}) must be finite, non-negative, and increasing");
            }
        }
        Ok(())
    }

    /// The radius range to use, depending on whether a time window is active
    pub fn radius_range(&self, windowed: bool) -> (f64, f64) {
        if windowed {
            self.windowed_range
        } else {
            self.unbounded_range
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let settings = Settings::default();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.window_radius_minutes, 60);
        assert_eq!(settings.radius_range(false), (0.0, 25.0));
        assert_eq!(settings.radius_range(true), (3.0, 50.0));
    }

    #[test]
    fn partial_config() {
        let settings = Settings::from_json(br#"{"window_radius_minutes": 30}"#).unwrap();
        assert_eq!(settings.window_radius_minutes, 30);
        assert_eq!(settings.windowed_range, (3.0, 50.0));

        let settings = Settings::from_json(br#"{"windowed_range": [5, 40]}"#).unwrap();
        assert_eq!(settings.windowed_range, (5.0, 40.0));
    }

    #[test]
    fn invalid_config() {
        assert!(Settings::from_json(br#"{"window_radius_minutes": 0}"#).is_err());
        assert!(Settings::from_json(br#"{"unbounded_range": [25, 0]}"#).is_err());
        assert!(Settings::from_json(br#"{"windowed_range": [-3, 50]}"#).is_err());
        assert!(Settings::from_json(br#"{"window_radius_minutes": "sixty"}"#).is_err());
    }
}
