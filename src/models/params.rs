//! Route generation request parameters

use crate::error::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Motorcycle type value that means "no particular bike"
pub const GENERIC_MOTORCYCLE_TYPE: &str = "other";

/// Riding style the generated route should favour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RoutePriority {
    Scenic,
    Twisty,
    AvoidHighways,
}

impl RoutePriority {
    pub const ALL: [RoutePriority; 3] = [Self::Scenic, Self::Twisty, Self::AvoidHighways];

    /// Wire representation (`scenic`, `twisty`, `avoid_highways`)
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Scenic => "scenic",
            Self::Twisty => "twisty",
            Self::AvoidHighways => "avoid_highways",
        }
    }
}

impl std::fmt::Display for RoutePriority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RoutePriority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "scenic" => Ok(Self::Scenic),
            "twisty" => Ok(Self::Twisty),
            "avoid_highways" => Ok(Self::AvoidHighways),
            other => Err(format!(
                "invalid route priority '{}': expected one of scenic, twisty, avoid_highways",
                other
            )),
        }
    }
}

/// Length constraint of a route: either a distance or a riding duration
///
/// Exactly one is allowed per request. Requests naming both (or neither) are
/// rejected instead of silently picking one.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RouteLength {
    /// Approximate distance in kilometers
    Distance(f64),
    /// Approximate riding time in hours
    Duration(f64),
}

/// Input to a single route generation call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "RawGenerateRouteParams")]
pub struct GenerateRouteParams {
    start_point: String,
    route_priority: RoutePriority,
    #[serde(skip_serializing_if = "Option::is_none")]
    motorcycle_type: Option<String>,
    #[serde(flatten)]
    length: RouteLength,
}

/// Unvalidated wire shape, converted through [`GenerateRouteParams::from_parts`]
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawGenerateRouteParams {
    start_point: String,
    route_priority: RoutePriority,
    #[serde(default)]
    motorcycle_type: Option<String>,
    #[serde(default)]
    distance: Option<f64>,
    #[serde(default)]
    duration: Option<f64>,
}

impl TryFrom<RawGenerateRouteParams> for GenerateRouteParams {
    type Error = AppError;

    fn try_from(raw: RawGenerateRouteParams) -> Result<Self, Self::Error> {
        Self::from_parts(
            raw.start_point,
            raw.route_priority,
            raw.motorcycle_type,
            raw.distance,
            raw.duration,
        )
    }
}

impl GenerateRouteParams {
    /// Create validated parameters
    ///
    /// # Errors
    ///
    /// Returns `AppError::InvalidParams` if the start point is blank or the
    /// length value is not a positive finite number.
    pub fn new(
        start_point: impl Into<String>,
        route_priority: RoutePriority,
        length: RouteLength,
    ) -> AppResult<Self> {
        let start_point = start_point.into().trim().to_string();
        if start_point.is_empty() {
            return Err(AppError::InvalidParams(
                "startPoint must be a non-empty string".to_string(),
            ));
        }

        let (field, value) = match length {
            RouteLength::Distance(km) => ("distance", km),
            RouteLength::Duration(hours) => ("duration", hours),
        };
        if !value.is_finite() || value <= 0.0 {
            return Err(AppError::InvalidParams(format!(
                "{} must be a positive number, got {}",
                field, value
            )));
        }

        Ok(Self {
            start_point,
            route_priority,
            motorcycle_type: None,
            length,
        })
    }

    /// Build parameters from optional distance/duration fields
    ///
    /// Exactly one of `distance` and `duration` must be present.
    pub fn from_parts(
        start_point: impl Into<String>,
        route_priority: RoutePriority,
        motorcycle_type: Option<String>,
        distance: Option<f64>,
        duration: Option<f64>,
    ) -> AppResult<Self> {
        let length = match (distance, duration) {
            (Some(km), None) => RouteLength::Distance(km),
            (None, Some(hours)) => RouteLength::Duration(hours),
            (Some(_), Some(_)) => {
                return Err(AppError::InvalidParams(
                    "provide either distance or duration, not both".to_string(),
                ));
            }
            (None, None) => {
                return Err(AppError::InvalidParams(
                    "either distance or duration must be provided".to_string(),
                ));
            }
        };

        let params = Self::new(start_point, route_priority, length)?;
        Ok(match motorcycle_type {
            Some(kind) => params.with_motorcycle_type(kind),
            None => params,
        })
    }

    /// Attach the rider's motorcycle type
    ///
    /// Blank values are dropped.
    pub fn with_motorcycle_type(mut self, motorcycle_type: impl Into<String>) -> Self {
        let motorcycle_type = motorcycle_type.into().trim().to_string();
        self.motorcycle_type = (!motorcycle_type.is_empty()).then_some(motorcycle_type);
        self
    }

    pub fn start_point(&self) -> &str {
        &self.start_point
    }

    pub fn route_priority(&self) -> RoutePriority {
        self.route_priority
    }

    pub fn motorcycle_type(&self) -> Option<&str> {
        self.motorcycle_type.as_deref()
    }

    pub fn length(&self) -> RouteLength {
        self.length
    }

    /// Requested distance in kilometers, if the route is distance-bound
    pub fn distance(&self) -> Option<f64> {
        match self.length {
            RouteLength::Distance(km) => Some(km),
            RouteLength::Duration(_) => None,
        }
    }

    /// Requested riding time in hours, if the route is duration-bound
    pub fn duration(&self) -> Option<f64> {
        match self.length {
            RouteLength::Duration(hours) => Some(hours),
            RouteLength::Distance(_) => None,
        }
    }

    /// Motorcycle type worth mentioning in a prompt
    ///
    /// `None` when absent or when it is the generic `other` value.
    pub fn specific_motorcycle_type(&self) -> Option<&str> {
        self.motorcycle_type()
            .filter(|kind| !kind.eq_ignore_ascii_case(GENERIC_MOTORCYCLE_TYPE))
    }
}
