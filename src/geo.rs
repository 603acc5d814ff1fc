//! Geographic plausibility checks for generated routes
//!
//! Models occasionally invent coordinates on the wrong continent. Every point
//! must fall inside the configured [`BoundingBox`]; the first point that does
//! not rejects the whole route.

use crate::error::{AppError, AppResult};
use crate::models::{Coordinates, RouteGenerationResult};
use serde::{Deserialize, Serialize};

/// Inclusive latitude/longitude rectangle a route must stay within
///
/// Fields are private and only set through [`BoundingBox::new`], which is also
/// used during deserialization, so a malformed box cannot exist.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawBoundingBox")]
pub struct BoundingBox {
    region: String,
    min_lat: f64,
    max_lat: f64,
    min_lng: f64,
    max_lng: f64,
}

#[derive(Deserialize)]
struct RawBoundingBox {
    #[serde(default = "default_region")]
    region: String,
    #[serde(default = "default_min_lat")]
    min_lat: f64,
    #[serde(default = "default_max_lat")]
    max_lat: f64,
    #[serde(default = "default_min_lng")]
    min_lng: f64,
    #[serde(default = "default_max_lng")]
    max_lng: f64,
}

fn default_region() -> String {
    "Poland".to_string()
}

fn default_min_lat() -> f64 {
    49.0
}

fn default_max_lat() -> f64 {
    55.0
}

fn default_min_lng() -> f64 {
    14.0
}

fn default_max_lng() -> f64 {
    24.0
}

impl TryFrom<RawBoundingBox> for BoundingBox {
    type Error = AppError;

    fn try_from(raw: RawBoundingBox) -> Result<Self, Self::Error> {
        BoundingBox::new(raw.region, raw.min_lat, raw.max_lat, raw.min_lng, raw.max_lng)
    }
}

impl Default for BoundingBox {
    /// Poland, approximately 49°N to 55°N and 14°E to 24°E
    fn default() -> Self {
        Self {
            region: default_region(),
            min_lat: default_min_lat(),
            max_lat: default_max_lat(),
            min_lng: default_min_lng(),
            max_lng: default_max_lng(),
        }
    }
}

impl BoundingBox {
    /// Create a validated bounding box
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if the region is blank, any bound is not
    /// finite or outside the valid WGS84 range, or a minimum is not strictly
    /// below its maximum.
    pub fn new(
        region: impl Into<String>,
        min_lat: f64,
        max_lat: f64,
        min_lng: f64,
        max_lng: f64,
    ) -> AppResult<Self> {
        let region = region.into().trim().to_string();
        if region.is_empty() {
            return Err(AppError::Config("bounds.region cannot be empty".to_string()));
        }

        for (field, value, limit) in [
            ("min_lat", min_lat, 90.0),
            ("max_lat", max_lat, 90.0),
            ("min_lng", min_lng, 180.0),
            ("max_lng", max_lng, 180.0),
        ] {
            if !value.is_finite() || !(-limit..=limit).contains(&value) {
                return Err(AppError::Config(format!(
                    "bounds.{} must be a finite number between -{} and {}, got {}",
                    field, limit, limit, value
                )));
            }
        }

        if min_lat >= max_lat {
            return Err(AppError::Config(format!(
                "bounds.min_lat ({}) must be less than bounds.max_lat ({})",
                min_lat, max_lat
            )));
        }
        if min_lng >= max_lng {
            return Err(AppError::Config(format!(
                "bounds.min_lng ({}) must be less than bounds.max_lng ({})",
                min_lng, max_lng
            )));
        }

        Ok(Self {
            region,
            min_lat,
            max_lat,
            min_lng,
            max_lng,
        })
    }

    /// Human-readable region name used in prompts and errors
    pub fn region(&self) -> &str {
        &self.region
    }

    pub fn min_lat(&self) -> f64 {
        self.min_lat
    }

    pub fn max_lat(&self) -> f64 {
        self.max_lat
    }

    pub fn min_lng(&self) -> f64 {
        self.min_lng
    }

    pub fn max_lng(&self) -> f64 {
        self.max_lng
    }

    /// Whether the position lies inside the box (edges included)
    pub fn contains(&self, coordinates: &Coordinates) -> bool {
        (self.min_lat..=self.max_lat).contains(&coordinates.lat)
            && (self.min_lng..=self.max_lng).contains(&coordinates.lng)
    }
}

/// Check every route point against the bounding box, in route order
///
/// # Errors
///
/// Returns `AppError::OutOfBounds` for the first point outside the box.
pub fn validate_bounds(result: &RouteGenerationResult, bounds: &BoundingBox) -> AppResult<()> {
    for (index, point) in result.route_points().iter().enumerate() {
        if !bounds.contains(&point.coordinates) {
            tracing::warn!(
                index = index,
                point_name = %point.name,
                lat = point.coordinates.lat,
                lng = point.coordinates.lng,
                region = %bounds.region(),
                "Generated point is outside the configured bounding box"
            );
            return Err(AppError::OutOfBounds {
                index,
                name: point.name.clone(),
                lat: point.coordinates.lat,
                lng: point.coordinates.lng,
                region: bounds.region().to_string(),
            });
        }
    }
    Ok(())
}
