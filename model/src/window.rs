use anyhow::Result;
use chrono::{NaiveTime, Timelike};
use serde::Serialize;

pub const MINUTES_PER_DAY: u16 = 24 * 60;
pub const DEFAULT_RADIUS_MINUTES: u16 = 60;
/// The slider value meaning "any time"
pub const ANY_TIME: i32 = -1;

/// Which trips to keep, based only on the time of day.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum TimeWindow {
    /// Everything matches
    Unbounded,
    Centered(CenteredWindow),
}

/// Only built through `TimeWindow::centered`, so the center is always a valid minute of the day.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct CenteredWindow {
    center: u16,
    radius: u16,
}

impl CenteredWindow {
    /// Minutes since midnight
    pub fn center(&self) -> u16 {
        self.center
    }

    /// In minutes, inclusive, in both directions
    pub fn radius(&self) -> u16 {
        self.radius
    }
}

impl TimeWindow {
    pub fn centered(center: u16, radius: u16) -> Result<Self> {
        if center >= MINUTES_PER_DAY {
            bail!("Time window center {center} isn't in [0, {}]", MINUTES_PER_DAY - 1);
        }
        Ok(Self::Centered(CenteredWindow { center, radius }))
    }

    /// Interprets the raw value of the time slider: -1 is any time, otherwise it's minutes since
    /// midnight. Anything else is rejected, not clamped.
    pub fn from_slider(value: i32, radius: u16) -> Result<Self> {
        if value == ANY_TIME {
            return Ok(Self::Unbounded);
        }
        match u16::try_from(value) {
            Ok(center) if center < MINUTES_PER_DAY => Self::centered(center, radius),
            _ => bail!(
                "Time slider value {value} must be {ANY_TIME} or in [0, {}]",
                MINUTES_PER_DAY - 1
            ),
        }
    }

    pub fn is_windowed(&self) -> bool {
        matches!(self, Self::Centered(_))
    }

    /// Only the hour and minute of the time are used. A window near midnight wraps around to the
    /// other side of the day.
    pub fn matches<T: Timelike>(&self, time: &T) -> bool {
        match self {
            Self::Unbounded => true,
            Self::Centered(window) => {
                circular_distance(minutes_since_midnight(time), window.center) <= window.radius
            }
        }
    }

    /// A label for the time slider
    pub fn describe(&self) -> String {
        match self {
            Self::Unbounded => "any time".to_string(),
            Self::Centered(window) => format!(
                "{} (±{} minutes)",
                format_minutes(window.center),
                window.radius
            ),
        }
    }
}

pub fn minutes_since_midnight<T: Timelike>(time: &T) -> u16 {
    (time.hour() * 60 + time.minute()) as u16
}

/// The distance between two minutes of the day, going whichever way around midnight is shorter.
pub fn circular_distance(a: u16, b: u16) -> u16 {
    let d = a.abs_diff(b) % MINUTES_PER_DAY;
    d.min(MINUTES_PER_DAY - d)
}

/// Formats minutes since midnight like "08:05 PM"
pub fn format_minutes(minutes: u16) -> String {
    let minutes = u32::from(minutes % MINUTES_PER_DAY);
    NaiveTime::from_hms_opt(minutes / 60, minutes % 60, 0)
        .map(|time| time.format("%I:%M %p").to_string())
        .unwrap_or_default()
}
