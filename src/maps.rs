//! Map-link helpers for generated routes

use crate::models::RoutePoint;
use std::fmt::Write;

const GOOGLE_MAPS_DIRECTIONS: &str = "https://www.google.com/maps/dir/?api=1";

/// Google Maps directions link visiting every point in order
///
/// The first point is the origin, the last the destination, and anything in
/// between becomes a `|`-separated waypoint. Returns `None` for fewer than two
/// points.
pub fn google_maps_url(points: &[RoutePoint]) -> Option<String> {
    let [first, middle @ .., last] = points else {
        return None;
    };

    let mut url = String::from(GOOGLE_MAPS_DIRECTIONS);
    let _ = write!(url, "&origin={}", lat_lng(first));
    let _ = write!(url, "&destination={}", lat_lng(last));
    if !middle.is_empty() {
        let waypoints: Vec<String> = middle.iter().map(lat_lng).collect();
        let _ = write!(url, "&waypoints={}", waypoints.join("|"));
    }
    url.push_str("&travelmode=driving");

    Some(url)
}

/// One-line summary, e.g. "Route from Warsaw to Lublin with 3 waypoints (approximately 200 km)"
///
/// Returns `None` for fewer than two points.
pub fn route_description(points: &[RoutePoint], distance_km: Option<f64>) -> Option<String> {
    let [first, middle @ .., last] = points else {
        return None;
    };

    let mut description = format!(
        "Route from {} to {} with {} waypoints",
        first.name,
        last.name,
        middle.len()
    );
    if let Some(km) = distance_km.filter(|km| *km > 0.0) {
        let _ = write!(description, " (approximately {} km)", km);
    }

    Some(description)
}

fn lat_lng(point: &RoutePoint) -> String {
    format!("{},{}", point.coordinates.lat, point.coordinates.lng)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Coordinates;

    fn point(name: &str, lat: f64, lng: f64) -> RoutePoint {
        RoutePoint {
            name: name.to_string(),
            description: String::new(),
            coordinates: Coordinates::new(lat, lng),
        }
    }

    fn warsaw_to_lublin() -> Vec<RoutePoint> {
        vec![
            point("Warsaw", 52.2321, 21.0063),
            point("Garwolin", 51.9628, 21.2158),
            point("Dęblin", 51.5849, 21.5451),
            point("Kurów", 51.3248, 21.9499),
            point("Lublin", 51.2867, 22.2178),
        ]
    }

    #[test]
    fn test_url_with_waypoints() {
        let url = google_maps_url(&warsaw_to_lublin()).unwrap();
        assert_eq!(
            url,
            "https://www.google.com/maps/dir/?api=1\
             &origin=52.2321,21.0063\
             &destination=51.2867,22.2178\
             &waypoints=51.9628,21.2158|51.5849,21.5451|51.3248,21.9499\
             &travelmode=driving"
        );
    }

    #[test]
    fn test_url_without_waypoints() {
        let points = [point("A", 52.0, 21.0), point("B", 51.5, 22.5)];
        let url = google_maps_url(&points).unwrap();
        assert!(!url.contains("waypoints"));
        assert!(url.ends_with("&origin=52,21&destination=51.5,22.5&travelmode=driving"));
    }

    #[test]
    fn test_too_few_points() {
        assert_eq!(google_maps_url(&[]), None);
        assert_eq!(google_maps_url(&[point("A", 52.0, 21.0)]), None);
        assert_eq!(route_description(&[point("A", 52.0, 21.0)], Some(10.0)), None);
    }

    #[test]
    fn test_description() {
        assert_eq!(
            route_description(&warsaw_to_lublin(), Some(200.0)).unwrap(),
            "Route from Warsaw to Lublin with 3 waypoints (approximately 200 km)"
        );
        assert_eq!(
            route_description(&warsaw_to_lublin(), None).unwrap(),
            "Route from Warsaw to Lublin with 3 waypoints"
        );
    }
}
