//! OSRM HTTP adapter for driving routes.

use serde::Deserialize;
use tracing::debug;

use crate::error::{Error, Result};
use crate::model::LatLng;
use crate::traits::{RouteLeg, RouteProvider};

#[derive(Debug, Clone)]
pub struct OsrmConfig {
    pub base_url: String,
    pub profile: String,
    pub timeout_secs: u64,
}

impl Default for OsrmConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000".to_string(),
            profile: "car".to_string(),
            timeout_secs: 10,
        }
    }
}

impl OsrmConfig {
    /// Defaults overridden by `OSRM_BASE_URL`, `OSRM_PROFILE` and
    /// `OSRM_TIMEOUT_SECS` when set.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            base_url: std::env::var("OSRM_BASE_URL").unwrap_or(defaults.base_url),
            profile: std::env::var("OSRM_PROFILE").unwrap_or(defaults.profile),
            timeout_secs: std::env::var("OSRM_TIMEOUT_SECS")
                .ok()
                .and_then(|raw| raw.parse().ok())
                .unwrap_or(defaults.timeout_secs),
        }
    }
}

#[derive(Debug, Clone)]
pub struct OsrmClient {
    config: OsrmConfig,
    client: reqwest::blocking::Client,
}

impl OsrmClient {
    pub fn new(config: OsrmConfig) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { config, client })
    }

    fn route_url(&self, waypoints: &[LatLng]) -> String {
        let coords = waypoints
            .iter()
            .map(|point| format!("{:.6},{:.6}", point.lng, point.lat))
            .collect::<Vec<_>>()
            .join(";");

        format!(
            "{}/route/v1/{}/{}?overview=false&steps=false",
            self.config.base_url, self.config.profile, coords
        )
    }
}

impl RouteProvider for OsrmClient {
    fn route(&self, waypoints: &[LatLng]) -> Result<Vec<RouteLeg>> {
        if waypoints.len() < 2 {
            return Ok(Vec::new());
        }

        let url = self.route_url(waypoints);
        debug!(%url, "requesting OSRM route");
        let body: OsrmRouteResponse = self.client.get(url).send()?.error_for_status()?.json()?;
        legs_from_response(body, waypoints.len() - 1)
    }

    fn name(&self) -> &str {
        "osrm"
    }
}

fn legs_from_response(body: OsrmRouteResponse, expected: usize) -> Result<Vec<RouteLeg>> {
    if body.code != "Ok" {
        return Err(Error::Routing(body.message.unwrap_or(body.code)));
    }
    let route = body
        .routes
        .into_iter()
        .next()
        .ok_or_else(|| Error::Routing("NoRoute".to_string()))?;
    if route.legs.len() != expected {
        return Err(Error::LegCountMismatch {
            expected,
            actual: route.legs.len(),
        });
    }

    Ok(route
        .legs
        .into_iter()
        .map(|leg| RouteLeg {
            duration_sec: leg.duration,
            distance_meters: leg.distance,
            start_address: None,
            end_address: leg.summary.filter(|summary| !summary.is_empty()),
        })
        .collect())
}

#[derive(Debug, Deserialize)]
struct OsrmRouteResponse {
    code: String,
    message: Option<String>,
    #[serde(default)]
    routes: Vec<OsrmRoute>,
}

#[derive(Debug, Deserialize)]
struct OsrmRoute {
    #[serde(default)]
    legs: Vec<OsrmLeg>,
}

#[derive(Debug, Deserialize)]
struct OsrmLeg {
    duration: Option<f64>,
    distance: Option<f64>,
    summary: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> OsrmRouteResponse {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_route_url_uses_lng_lat_order() {
        let client = OsrmClient::new(OsrmConfig::default()).unwrap();
        let url = client.route_url(&[LatLng::new(29.7604, -95.3698), LatLng::new(38.9784, -76.4922)]);
        assert_eq!(
            url,
            "http://localhost:5000/route/v1/car/-95.369800,29.760400;-76.492200,38.978400?overview=false&steps=false"
        );
    }

    #[test]
    fn test_legs_from_ok_response() {
        let body = parse(
            r#"{"code":"Ok","routes":[{"legs":[
                {"duration":100800.5,"distance":2300000.0,"summary":"I 40"},
                {"duration":3600.0,"distance":90000.0,"summary":""}
            ]}]}"#,
        );
        let legs = legs_from_response(body, 2).unwrap();
        assert_eq!(legs.len(), 2);
        assert_eq!(legs[0].duration_sec, Some(100800.5));
        assert_eq!(legs[0].end_address.as_deref(), Some("I 40"));
        assert_eq!(legs[1].end_address, None);
    }

    #[test]
    fn test_error_code_is_reported() {
        let body = parse(r#"{"code":"NoRoute","message":"Impossible route between points"}"#);
        let err = legs_from_response(body, 1).unwrap_err();
        assert!(matches!(err, Error::Routing(ref msg) if msg == "Impossible route between points"));
    }

    #[test]
    fn test_leg_count_mismatch() {
        let body = parse(r#"{"code":"Ok","routes":[{"legs":[{"duration":1.0,"distance":1.0}]}]}"#);
        let err = legs_from_response(body, 2).unwrap_err();
        assert!(matches!(err, Error::LegCountMismatch { expected: 2, actual: 1 }));
    }
}
