use std::sync::{Mutex, MutexGuard, OnceLock};

use crate::config::TrackerConfig;
use crate::gps_processor::GeoPoint;
use crate::logs;
use crate::main_db::MainDb;
use crate::route::Route;
use crate::route_store::{MemoryRouteStore, RouteStore};
use crate::tracking_session::{LocationProvider, SubscriptionId, TrackingSession, TrackingState};
use anyhow::Result;

type Session = TrackingSession<Box<dyn RouteStore + Send>, Box<dyn LocationProvider + Send>>;

// NOTE: subscriber callbacks run while the session lock is held, so they must
// not call back into this module. A panicking callback poisons the lock;
// `session()` recovers it rather than failing every later call.
struct MainState {
    session: Mutex<Session>,
}

static MAIN_STATE: OnceLock<MainState> = OnceLock::new();

pub fn init(
    support_dir: String,
    cache_dir: String,
    provider: Box<dyn LocationProvider + Send>,
    config: TrackerConfig,
) {
    let mut already_initialized = true;
    MAIN_STATE.get_or_init(|| {
        already_initialized = false;

        if let Err(error) = logs::init(&cache_dir) {
            warn!("failed to initialize logging: {}", error);
        }

        let store: Box<dyn RouteStore + Send> = match MainDb::open(&support_dir) {
            Ok(main_db) => Box::new(main_db),
            Err(error) => {
                error!(
                    "failed to open main db, route will not survive a restart: {}",
                    error
                );
                Box::new(MemoryRouteStore::new())
            }
        };
        let session = TrackingSession::new(store, provider, config);
        info!("initialized");

        MainState {
            session: Mutex::new(session),
        }
    });
    if already_initialized {
        warn!("`init` is called multiple times");
    }
}

fn session() -> Result<MutexGuard<'static, Session>> {
    let state = MAIN_STATE
        .get()
        .ok_or_else(|| anyhow!("main state is not initialized"))?;
    Ok(state.session.lock().unwrap_or_else(|poisoned| {
        warn!("tracking session lock was poisoned by a panic, recovering");
        state.session.clear_poison();
        poisoned.into_inner()
    }))
}

pub fn set_log_sink<F>(sink: F)
where
    F: Fn(&str) + Send + 'static,
{
    logs::set_sink(sink)
}

pub fn subscribe_route_changed<F>(f: F) -> Result<SubscriptionId>
where
    F: FnMut(&Route) + Send + 'static,
{
    Ok(session()?.subscribe_route_changed(f))
}

pub fn subscribe_recenter<F>(f: F) -> Result<SubscriptionId>
where
    F: FnMut(GeoPoint) + Send + 'static,
{
    Ok(session()?.subscribe_recenter(f))
}

pub fn unsubscribe(id: SubscriptionId) -> Result<bool> {
    Ok(session()?.unsubscribe(id))
}

/// Sends the persisted route to the route subscribers, call it once the
/// renderer has subscribed.
pub fn restore_route() -> Result<()> {
    session()?.restore();
    Ok(())
}

pub fn start_tracking() -> Result<()> {
    session()?.start();
    Ok(())
}

pub fn stop_tracking() -> Result<()> {
    session()?.stop();
    Ok(())
}

pub fn reset_route() -> Result<()> {
    session()?.reset();
    Ok(())
}

pub fn toggle_follow() -> Result<bool> {
    Ok(session()?.toggle_follow())
}

pub fn on_location_update(readings: Vec<GeoPoint>) -> Result<()> {
    // a batch is handled while holding the lock the whole time
    session()?.on_readings(readings);
    Ok(())
}

pub fn get_route() -> Result<Route> {
    Ok(session()?.route().clone())
}

pub fn tracking_state() -> Result<TrackingState> {
    Ok(session()?.state())
}

pub fn is_following() -> Result<bool> {
    Ok(session()?.is_following())
}
