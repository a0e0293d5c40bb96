use serde::{Deserialize, Serialize};

// mean earth radius, unit: meter
const EARTH_RADIUS: f64 = 6371000.0;

/// Readings closer than this to the last accepted point are dropped.
pub const DEFAULT_MIN_DISTANCE_M: f64 = 1.0;

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        GeoPoint {
            latitude,
            longitude,
        }
    }

    /// Great-circle distance in meters.
    pub fn haversine_distance(&self, other: &GeoPoint) -> f64 {
        let lat1 = self.latitude.to_radians();
        let lat2 = other.latitude.to_radians();
        let d_lat = (other.latitude - self.latitude).to_radians();
        let d_lng = (other.longitude - self.longitude).to_radians();
        let a = (d_lat / 2.0).sin().powi(2)
            + lat1.cos() * lat2.cos() * (d_lng / 2.0).sin().powi(2);
        2.0 * EARTH_RADIUS * a.sqrt().asin()
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[repr(i8)]
pub enum ProcessResult {
    Append = 0,
    // the first reading of a session, only remembered for comparison
    Baseline = 1,
    Ignore = -1,
}

impl ProcessResult {
    pub fn to_int(&self) -> i8 {
        *self as i8
    }
}


/// Decides whether a reading is far enough from the previous point to become
/// a new route point.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct LocationFilter {
    min_distance_m: f64,
}

impl Default for LocationFilter {
    fn default() -> Self {
        LocationFilter::new(DEFAULT_MIN_DISTANCE_M)
    }
}

impl LocationFilter {
    pub fn new(min_distance_m: f64) -> Self {
        LocationFilter { min_distance_m }
    }

    pub fn min_distance_m(&self) -> f64 {
        self.min_distance_m
    }

    pub fn accept(&self, previous: Option<&GeoPoint>, candidate: &GeoPoint) -> bool {
        match previous {
            // the caller keeps the very first reading as a baseline
            None => false,
            Some(previous) => previous.haversine_distance(candidate) >= self.min_distance_m,
        }
    }
}

pub struct GpsProcessor {
    filter: LocationFilter,
    last_point: Option<GeoPoint>,
}

impl GpsProcessor {
    pub fn new() -> Self {
        Self::with_filter(LocationFilter::default())
    }

    pub fn with_filter(filter: LocationFilter) -> Self {
        GpsProcessor {
            filter,
            last_point: None,
        }
    }

    pub fn last_point(&self) -> Option<&GeoPoint> {
        self.last_point.as_ref()
    }

    pub fn reset(&mut self) {
        self.last_point = None;
    }

    /// Continues from a point accepted earlier (e.g. the tail of a restored
    /// route), so the next reading is compared against it.
    pub fn resume_from(&mut self, last_point: GeoPoint) {
        self.last_point = Some(last_point);
    }

    pub fn preprocess(&mut self, curr_point: &GeoPoint) -> ProcessResult {
        let result = match &self.last_point {
            None => ProcessResult::Baseline,
            Some(last_point) => {
                if self.filter.accept(Some(last_point), curr_point) {
                    ProcessResult::Append
                } else {
                    ProcessResult::Ignore
                }
            }
        };
        if result != ProcessResult::Ignore {
            self.last_point = Some(*curr_point);
        }
        result
    }
}
