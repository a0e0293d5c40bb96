use anyhow::Result;

use crate::route::Route;

/// The single key the route is kept under.
pub const ROUTE_STORAGE_KEY: &str = "UserLocations";

/* A backend only has to read and write one opaque record; encoding lives in
   the provided methods so every backend has the same fail-open behavior.

   An empty route is stored as `[]`, so "saved but empty" and "never saved"
   stay distinguishable through `contains_record`.
*/
pub trait RouteStore {
    fn read_record(&mut self) -> Result<Option<String>>;

    fn write_record(&mut self, value: &str) -> Result<()>;

    fn save(&mut self, route: &Route) -> Result<()> {
        let value = route.to_json()?;
        self.write_record(&value)
    }

    fn try_load(&mut self) -> Result<Option<Route>> {
        match self.read_record()? {
            None => Ok(None),
            Some(value) => Ok(Some(Route::from_json(&value)?)),
        }
    }

    fn load(&mut self) -> Route {
        match self.try_load() {
            Ok(route) => route.unwrap_or_default(),
            Err(error) => {
                warn!("[route_store.load] falling back to empty route, error:{}", error);
                Route::new()
            }
        }
    }

    fn contains_record(&mut self) -> bool {
        matches!(self.read_record(), Ok(Some(_)))
    }
}

impl<T: RouteStore + ?Sized> RouteStore for Box<T> {
    fn read_record(&mut self) -> Result<Option<String>> {
        (**self).read_record()
    }

    fn write_record(&mut self, value: &str) -> Result<()> {
        (**self).write_record(value)
    }
}

/// Keeps the record in memory only.
#[derive(Debug, Default)]
pub struct MemoryRouteStore {
    record: Option<String>,
}

impl MemoryRouteStore {
    pub fn new() -> Self {
        MemoryRouteStore { record: None }
    }

    pub fn with_record(record: String) -> Self {
        MemoryRouteStore {
            record: Some(record),
        }
    }

    pub fn record(&self) -> Option<&str> {
        self.record.as_deref()
    }
}

impl RouteStore for MemoryRouteStore {
    fn read_record(&mut self) -> Result<Option<String>> {
        Ok(self.record.clone())
    }

    fn write_record(&mut self, value: &str) -> Result<()> {
        self.record = Some(value.to_owned());
        Ok(())
    }
}
