use anyhow::Result;
use serde::Deserialize;

use crate::gps_processor::{LocationFilter, DEFAULT_MIN_DISTANCE_M};

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// Minimum distance in meters between two consecutive route points.
    pub min_distance_m: f64,
    /// Whether `start` also turns on follow mode (and `stop` turns it off).
    pub follow_on_start: bool,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        TrackerConfig {
            min_distance_m: DEFAULT_MIN_DISTANCE_M,
            follow_on_start: true,
        }
    }
}

impl TrackerConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        let config: TrackerConfig = serde_json::from_str(json)?;
        if !config.min_distance_m.is_finite() || config.min_distance_m < 0.0 {
            bail!(
                "invalid `min_distance_m`: {}, expecting a non-negative number",
                config.min_distance_m
            );
        }
        Ok(config)
    }

    pub fn location_filter(&self) -> LocationFilter {
        LocationFilter::new(self.min_distance_m)
    }
}
