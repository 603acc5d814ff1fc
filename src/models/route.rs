//! Generated route types

use serde::{Deserialize, Serialize};

/// A WGS84 position in decimal degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinates {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

/// One stop along a generated route
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoutePoint {
    pub name: String,
    pub description: String,
    pub coordinates: Coordinates,
}

/// A validated route returned to callers
///
/// Only produced by the schema validator, which guarantees a non-empty title
/// and summary and at least one point. Point order is the riding order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteGenerationResult {
    title: String,
    summary: String,
    route_points: Vec<RoutePoint>,
}

impl RouteGenerationResult {
    pub(crate) fn new(title: String, summary: String, route_points: Vec<RoutePoint>) -> Self {
        Self {
            title,
            summary,
            route_points,
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn summary(&self) -> &str {
        &self.summary
    }

    pub fn route_points(&self) -> &[RoutePoint] {
        &self.route_points
    }

    pub fn into_route_points(self) -> Vec<RoutePoint> {
        self.route_points
    }
}
