//! Prompt construction for route generation
//!
//! Builds the user prompt from [`GenerateRouteParams`] and owns the system
//! message sent with every request. Prompt building is pure: the same
//! parameters and builder settings always produce the same text.

use crate::config::ServiceConfig;
use crate::geo::BoundingBox;
use crate::models::{GenerateRouteParams, RouteLength, RoutePriority};
use std::fmt::Write;

/// Builds route prompts for one region and point-count range
#[derive(Debug, Clone)]
pub struct PromptBuilder {
    bounds: BoundingBox,
    min_points: usize,
    max_points: usize,
}

impl PromptBuilder {
    pub fn new(bounds: BoundingBox, min_points: usize, max_points: usize) -> Self {
        Self {
            bounds,
            min_points,
            max_points,
        }
    }

    pub fn from_config(config: &ServiceConfig) -> Self {
        Self::new(
            config.bounds().clone(),
            config.min_points(),
            config.max_points(),
        )
    }

    /// Fixed riding-style sentence for a priority
    pub fn priority_clause(priority: RoutePriority) -> &'static str {
        match priority {
            RoutePriority::Scenic => {
                "Prioritize scenic routes with beautiful landscapes and views. "
            }
            RoutePriority::Twisty => "Prioritize twisty, curvy roads that are fun to ride. ",
            RoutePriority::AvoidHighways => {
                "Avoid highways and main roads, focus on smaller, less traveled roads. "
            }
        }
    }

    /// System message establishing the assistant's expertise
    pub fn system_message(&self) -> String {
        let region = self.bounds.region();
        format!(
            "You are a motorcycle route planning expert specializing in creating interesting \
             and safe routes in {region}. You have extensive knowledge of the roads, landscapes, \
             and points of interest in {region}."
        )
    }

    /// Build the user prompt for one generation request
    pub fn build(&self, params: &GenerateRouteParams) -> String {
        let region = self.bounds.region();
        let mut prompt = String::with_capacity(1536);

        // Writing into a String cannot fail
        let _ = write!(
            prompt,
            "Generate an interesting motorcycle route in {}. The starting point is {}. ",
            region,
            params.start_point()
        );
        prompt.push_str(Self::priority_clause(params.route_priority()));

        match params.length() {
            RouteLength::Distance(km) => {
                let _ = write!(
                    prompt,
                    "The route should be approximately {} kilometers. ",
                    km
                );
            }
            RouteLength::Duration(hours) => {
                let _ = write!(
                    prompt,
                    "The route should take approximately {} hours to complete at a leisurely pace. ",
                    hours
                );
            }
        }

        if let Some(kind) = params.specific_motorcycle_type() {
            let _ = write!(
                prompt,
                "Consider that I'll be riding a {} motorcycle. ",
                kind
            );
        }

        self.push_format_instructions(&mut prompt);
        prompt
    }

    fn push_format_instructions(&self, prompt: &mut String) {
        let b = &self.bounds;
        let _ = write!(
            prompt,
            r#"
Please provide the output in the following JSON format:
{{
  "title": "A catchy title for the route",
  "summary": "A short summary describing the route, highlights, and key features",
  "routePoints": [
    {{
      "name": "Starting point name",
      "description": "Brief description of this location",
      "coordinates": {{"lat": 0.0, "lng": 0.0}}
    }},
    {{
      "name": "Waypoint 1 name",
      "description": "Description of this waypoint and the road leading to it",
      "coordinates": {{"lat": 0.0, "lng": 0.0}}
    }}
  ]
}}

Include {min}-{max} waypoints with accurate coordinates in {region}. Make the route logical and interesting.
Ensure all coordinates are within {region} (latitude {min_lat} to {max_lat}, longitude {min_lng} to {max_lng}).
The route should be realistic and follow actual roads.

Return only the JSON object, without any additional descriptions or hints.
"#,
            min = self.min_points,
            max = self.max_points,
            region = b.region(),
            min_lat = b.min_lat(),
            max_lat = b.max_lat(),
            min_lng = b.min_lng(),
            max_lng = b.max_lng(),
        );
    }
}
