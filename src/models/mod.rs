//! Domain types for route generation
//!
//! Request parameters are validated on construction and during
//! deserialization, so an invalid `GenerateRouteParams` cannot exist.

pub mod params;
pub mod route;

pub use params::{GenerateRouteParams, RouteLength, RoutePriority};
pub use route::{Coordinates, RouteGenerationResult, RoutePoint};
