//! Structural validation of parsed model output
//!
//! Works on a `serde_json::Value` rather than deriving `Deserialize` so that the
//! first violation can be reported with its exact path, e.g.
//! `routePoints[2].coordinates.lat must be a number`. Values are never coerced:
//! `"52.1"` is a string, not a latitude. Unknown fields are ignored.

use crate::error::{AppError, AppResult};
use crate::models::{Coordinates, RouteGenerationResult, RoutePoint};
use serde_json::{Map, Value};

/// Validate `value` and convert it into a [`RouteGenerationResult`]
///
/// `min_points`/`max_points` is the range requested in the prompt. Routes
/// outside it are logged and still accepted.
///
/// # Errors
///
/// Returns `AppError::RouteFormat` describing the first violation found.
pub fn validate_route(
    value: &Value,
    min_points: usize,
    max_points: usize,
) -> AppResult<RouteGenerationResult> {
    let root = value
        .as_object()
        .ok_or_else(|| violation("route", "must be an object"))?;

    let title = non_empty_string(root, "title", "title")?;
    let summary = non_empty_string(root, "summary", "summary")?;

    let points = root
        .get("routePoints")
        .and_then(Value::as_array)
        .ok_or_else(|| violation("routePoints", "must be an array"))?;
    if points.is_empty() {
        return Err(violation("routePoints", "must contain at least one point"));
    }

    let route_points = points
        .iter()
        .enumerate()
        .map(|(index, point)| route_point(index, point))
        .collect::<AppResult<Vec<_>>>()?;

    if !(min_points..=max_points).contains(&route_points.len()) {
        tracing::warn!(
            point_count = route_points.len(),
            min_points = min_points,
            max_points = max_points,
            "Generated route has an unexpected number of points"
        );
    }

    Ok(RouteGenerationResult::new(title, summary, route_points))
}

fn route_point(index: usize, value: &Value) -> AppResult<RoutePoint> {
    let path = format!("routePoints[{}]", index);
    let point = value
        .as_object()
        .ok_or_else(|| violation(&path, "must be an object"))?;

    let name = string(point, "name", &path)?;
    let description = string(point, "description", &path)?;

    let coordinates_path = format!("{}.coordinates", path);
    let coordinates = point
        .get("coordinates")
        .and_then(Value::as_object)
        .ok_or_else(|| violation(&coordinates_path, "must be an object"))?;

    Ok(RoutePoint {
        name,
        description,
        coordinates: Coordinates::new(
            number(coordinates, "lat", &coordinates_path)?,
            number(coordinates, "lng", &coordinates_path)?,
        ),
    })
}

fn non_empty_string(object: &Map<String, Value>, key: &str, path: &str) -> AppResult<String> {
    match object.get(key).and_then(Value::as_str) {
        Some(s) if !s.trim().is_empty() => Ok(s.to_string()),
        _ => Err(violation(path, "must be a non-empty string")),
    }
}

fn string(object: &Map<String, Value>, key: &str, parent: &str) -> AppResult<String> {
    object
        .get(key)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| violation(&format!("{}.{}", parent, key), "must be a string"))
}

fn number(object: &Map<String, Value>, key: &str, parent: &str) -> AppResult<f64> {
    object
        .get(key)
        .and_then(Value::as_f64)
        .ok_or_else(|| violation(&format!("{}.{}", parent, key), "must be a number"))
}

fn violation(path: &str, reason: &str) -> AppError {
    AppError::RouteFormat(format!("{} {}", path, reason))
}
