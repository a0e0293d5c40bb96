use crate::config::TrackerConfig;
use crate::gps_processor::{GeoPoint, GpsProcessor, ProcessResult};
use crate::route::Route;
use crate::route_store::RouteStore;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum TrackingState {
    #[default]
    Stopped,
    Tracking,
}

/// The platform side that produces readings. Readings themselves are pushed
/// into `TrackingSession::on_reading`; permission handling is up to the
/// implementor.
pub trait LocationProvider {
    fn request_start(&mut self);

    fn request_stop(&mut self);

    fn last_known_location(&self) -> Option<GeoPoint> {
        None
    }
}

impl<T: LocationProvider + ?Sized> LocationProvider for Box<T> {
    fn request_start(&mut self) {
        (**self).request_start()
    }

    fn request_stop(&mut self) {
        (**self).request_stop()
    }

    fn last_known_location(&self) -> Option<GeoPoint> {
        (**self).last_known_location()
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type RouteChangedCallback = Box<dyn FnMut(&Route) + Send>;
type RecenterCallback = Box<dyn FnMut(GeoPoint) + Send>;

pub struct TrackingSession<S, P> {
    store: S,
    provider: P,
    config: TrackerConfig,
    gps_processor: GpsProcessor,
    route: Route,
    state: TrackingState,
    following: bool,
    next_subscription_id: u64,
    route_changed_subscribers: Vec<(SubscriptionId, RouteChangedCallback)>,
    recenter_subscribers: Vec<(SubscriptionId, RecenterCallback)>,
}

impl<S: RouteStore, P: LocationProvider> TrackingSession<S, P> {
    /// Loads the persisted route. Nothing is notified until `restore`, so
    /// subscribers can be attached first.
    pub fn new(mut store: S, provider: P, config: TrackerConfig) -> Self {
        let route = store.load();
        info!(
            "[tracking_session] loaded route with {} points, min_distance_m={}",
            route.len(),
            config.min_distance_m
        );
        let mut gps_processor = GpsProcessor::with_filter(config.location_filter());
        // the last accepted point is always the tail of the route
        if let Some(last) = route.last() {
            gps_processor.resume_from(*last);
        }
        TrackingSession {
            store,
            provider,
            config,
            gps_processor,
            route,
            state: TrackingState::Stopped,
            following: false,
            next_subscription_id: 0,
            route_changed_subscribers: Vec::new(),
            recenter_subscribers: Vec::new(),
        }
    }

    pub fn state(&self) -> TrackingState {
        self.state
    }

    pub fn is_following(&self) -> bool {
        self.following
    }

    pub fn route(&self) -> &Route {
        &self.route
    }

    pub fn last_accepted_point(&self) -> Option<&GeoPoint> {
        self.gps_processor.last_point()
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn subscribe_route_changed<F>(&mut self, f: F) -> SubscriptionId
    where
        F: FnMut(&Route) + Send + 'static,
    {
        let id = self.next_id();
        self.route_changed_subscribers.push((id, Box::new(f)));
        id
    }

    pub fn subscribe_recenter<F>(&mut self, f: F) -> SubscriptionId
    where
        F: FnMut(GeoPoint) + Send + 'static,
    {
        let id = self.next_id();
        self.recenter_subscribers.push((id, Box::new(f)));
        id
    }

    /// Returns false if the id was not (or no longer) subscribed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.route_changed_subscribers.len() + self.recenter_subscribers.len();
        self.route_changed_subscribers.retain(|(x, _)| *x != id);
        self.recenter_subscribers.retain(|(x, _)| *x != id);
        before != self.route_changed_subscribers.len() + self.recenter_subscribers.len()
    }

    /// Tells subscribers about the route loaded at construction, then
    /// recenters once on the provider's last known location, if it has one.
    pub fn restore(&mut self) {
        self.notify_route_changed();
        if let Some(center) = self.provider.last_known_location() {
            self.notify_recenter(center);
        }
    }

    pub fn start(&mut self) {
        if self.state == TrackingState::Tracking {
            debug!("[tracking_session] already tracking");
            return;
        }
        info!("[tracking_session] start tracking");
        self.provider.request_start();
        self.state = TrackingState::Tracking;
        if self.config.follow_on_start {
            self.following = true;
        }
    }

    pub fn stop(&mut self) {
        if self.state == TrackingState::Stopped {
            debug!("[tracking_session] already stopped");
            return;
        }
        info!("[tracking_session] stop tracking");
        self.provider.request_stop();
        self.state = TrackingState::Stopped;
        if self.config.follow_on_start {
            self.following = false;
        }
    }

    /// Clears the route (in memory and in storage). Tracking state and
    /// follow mode are left alone.
    pub fn reset(&mut self) {
        info!(
            "[tracking_session] reset, dropping {} points",
            self.route.len()
        );
        self.route.clear();
        self.gps_processor.reset();
        self.persist();
        self.notify_route_changed();
    }

    // NOTE: readings are handled whatever the tracking state is. `stop` only
    // asks the provider to stop, anything still delivered is processed.
    pub fn on_reading(&mut self, raw: GeoPoint) -> ProcessResult {
        let process_result = self.gps_processor.preprocess(&raw);
        debug!(
            "[tracking_session] reading lat={}, lng={}, process_result={}",
            raw.latitude,
            raw.longitude,
            process_result.to_int()
        );
        if process_result == ProcessResult::Append {
            self.route.push(raw);
            self.persist();
            self.notify_route_changed();
        }

        if self.following {
            if let Some(center) = self.gps_processor.last_point().copied() {
                self.notify_recenter(center);
            }
        }
        process_result
    }

    /// Every reading of a batch goes through `on_reading`, in order. A
    /// deferred batch can hold real movement, so none of it is dropped.
    pub fn on_readings<I>(&mut self, readings: I)
    where
        I: IntoIterator<Item = GeoPoint>,
    {
        for raw in readings {
            self.on_reading(raw);
        }
    }

    /// Flips follow mode and returns the new value.
    pub fn toggle_follow(&mut self) -> bool {
        self.following = !self.following;
        debug!("[tracking_session] following={}", self.following);
        if self.following {
            let last_known = self
                .gps_processor
                .last_point()
                .copied()
                .or_else(|| self.provider.last_known_location());
            if let Some(center) = last_known {
                self.notify_recenter(center);
            }
        }
        self.following
    }

    fn next_id(&mut self) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription_id);
        self.next_subscription_id += 1;
        id
    }

    fn persist(&mut self) {
        if let Err(error) = self.store.save(&self.route) {
            warn!(
                "[tracking_session] failed to save route with {} points, error:{}",
                self.route.len(),
                error
            );
        }
    }

    fn notify_route_changed(&mut self) {
        for (_, f) in self.route_changed_subscribers.iter_mut() {
            f(&self.route);
        }
    }

    fn notify_recenter(&mut self, center: GeoPoint) {
        for (_, f) in self.recenter_subscribers.iter_mut() {
            f(center);
        }
    }
}
