use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use route_tracker_core::gps_processor::GeoPoint;
use route_tracker_core::route::Route;
use route_tracker_core::tracking_session::LocationProvider;
use std::sync::{Arc, Mutex};

pub const SHANGHAI: GeoPoint = GeoPoint {
    latitude: 31.2304,
    longitude: 121.4737,
};

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[derive(Default, Debug)]
pub struct ProviderCalls {
    pub start: usize,
    pub stop: usize,
}

/// Counts start/stop requests so tests can check what the session asked for.
pub struct FakeProvider {
    pub calls: Arc<Mutex<ProviderCalls>>,
    pub last_known: Option<GeoPoint>,
}

impl FakeProvider {
    pub fn new() -> (Self, Arc<Mutex<ProviderCalls>>) {
        let calls = Arc::new(Mutex::new(ProviderCalls::default()));
        (
            FakeProvider {
                calls: calls.clone(),
                last_known: None,
            },
            calls,
        )
    }
}

impl LocationProvider for FakeProvider {
    fn request_start(&mut self) {
        self.calls.lock().unwrap().start += 1;
    }

    fn request_stop(&mut self) {
        self.calls.lock().unwrap().stop += 1;
    }

    fn last_known_location(&self) -> Option<GeoPoint> {
        self.last_known
    }
}

pub type RouteLog = Arc<Mutex<Vec<Route>>>;
pub type RecenterLog = Arc<Mutex<Vec<GeoPoint>>>;

pub fn route_log() -> (RouteLog, impl FnMut(&Route) + Send + 'static) {
    let log: RouteLog = Arc::new(Mutex::new(Vec::new()));
    let log_for_callback = log.clone();
    (log, move |route: &Route| {
        log_for_callback.lock().unwrap().push(route.clone())
    })
}

pub fn recenter_log() -> (RecenterLog, impl FnMut(GeoPoint) + Send + 'static) {
    let log: RecenterLog = Arc::new(Mutex::new(Vec::new()));
    let log_for_callback = log.clone();
    (log, move |center: GeoPoint| {
        log_for_callback.lock().unwrap().push(center)
    })
}

/// A jittery walk: mostly sub-meter noise with the occasional real step, so
/// both the accept and reject paths are hit a lot.
pub fn random_walk(seed: u64, len: usize) -> Vec<GeoPoint> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut current = SHANGHAI;
    let mut readings = Vec::with_capacity(len);
    for _ in 0..len {
        // 1e-5 degree is roughly 1.1m
        let step = if rng.random_bool(0.3) { 5e-5 } else { 8e-6 };
        current = GeoPoint::new(
            current.latitude + rng.random_range(-step..step),
            current.longitude + rng.random_range(-step..step),
        );
        readings.push(current);
    }
    readings
}

pub fn assert_min_spacing(route: &Route, min_distance_m: f64) {
    for pair in route.points().windows(2) {
        let distance = pair[0].haversine_distance(&pair[1]);
        assert!(
            distance >= min_distance_m,
            "consecutive points {:?} and {:?} are only {}m apart",
            pair[0],
            pair[1],
            distance
        );
    }
}
