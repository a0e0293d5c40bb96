use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::gps_processor::GeoPoint;

/// Accepted points in recording order.
///
/// Serialized as a plain JSON array of `{"latitude": .., "longitude": ..}`
/// objects, which is also the persisted layout.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Route {
    points: Vec<GeoPoint>,
}

impl Route {
    pub fn new() -> Self {
        Route { points: Vec::new() }
    }

    pub fn from_points(points: Vec<GeoPoint>) -> Self {
        Route { points }
    }

    pub fn points(&self) -> &[GeoPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn last(&self) -> Option<&GeoPoint> {
        self.points.last()
    }

    pub(crate) fn push(&mut self, point: GeoPoint) {
        self.points.push(point);
    }

    pub(crate) fn clear(&mut self) {
        self.points.clear();
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Route> {
        Ok(serde_json::from_str(json)?)
    }
}

impl FromIterator<GeoPoint> for Route {
    fn from_iter<I: IntoIterator<Item = GeoPoint>>(iter: I) -> Self {
        Route::from_points(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::Route;
    use crate::gps_processor::GeoPoint;

    #[test]
    fn json_layout() {
        let route = Route::from_points(vec![GeoPoint::new(1.5, -2.25)]);
        assert_eq!(
            route.to_json().unwrap(),
            r#"[{"latitude":1.5,"longitude":-2.25}]"#
        );
        assert_eq!(Route::new().to_json().unwrap(), "[]");
    }

    #[test]
    fn malformed_json() {
        assert!(Route::from_json("").is_err());
        assert!(Route::from_json("{}").is_err());
        assert!(Route::from_json(r#"[{"latitude":1.0}]"#).is_err());
        assert!(Route::from_json(r#"[{"latitude":"1","longitude":2}]"#).is_err());
        assert!(Route::from_json("[[1.0, 2.0]]").is_err());
    }

    #[test]
    fn unknown_fields_are_ignored() {
        let route = Route::from_json(r#"[{"latitude":1.0,"longitude":2.0,"altitude":3.0}]"#)
            .unwrap();
        assert_eq!(route.points(), &[GeoPoint::new(1.0, 2.0)]);
    }
}
