//! A [`RoutingClient`] backed by a live OSRM server, behind the `osrm`
//! feature (mirroring the teacher's own `osrm` feature and
//! `routing/osrm_spawn/client.rs`'s blocking-`reqwest` shape). Uses OSRM's
//! `/route/v1` and `/nearest/v1` HTTP endpoints directly rather than the
//! teacher's match-based snapping, since this crate snaps single points
//! rather than GPS traces.

use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::Url;
use serde::Deserialize;

use crate::error::{SimError, SimResult};
use crate::geo::Point;

use super::RoutingClient;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(3);

/// Thin blocking HTTP client for an OSRM server's `/route` and `/nearest`
/// endpoints.
#[derive(Debug, Clone)]
pub struct OsrmRoutingClient {
    client: Client,
    endpoint: String,
}

impl OsrmRoutingClient {
    /// `endpoint` is the OSRM server base URL, e.g. `http://localhost:5000`.
    pub fn new(endpoint: &str) -> Self {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("failed to build OSRM HTTP client");
        Self {
            client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
        }
    }

    fn coord(p: Point) -> String {
        format!("{},{}", p.x, p.y)
    }
}

#[derive(Deserialize)]
struct RouteResponse {
    code: String,
    routes: Option<Vec<Route>>,
}

#[derive(Deserialize)]
struct Route {
    geometry: Geometry,
}

#[derive(Deserialize)]
struct Geometry {
    coordinates: Vec<[f64; 2]>,
}

#[derive(Deserialize)]
struct NearestResponse {
    code: String,
    waypoints: Vec<Waypoint>,
}

#[derive(Deserialize)]
struct Waypoint {
    location: [f64; 2],
}

impl RoutingClient for OsrmRoutingClient {
    fn snap_to_road(&self, p: Point) -> Point {
        let url = match Url::parse(&format!(
            "{}/nearest/v1/driving/{}",
            self.endpoint,
            Self::coord(p)
        )) {
            Ok(url) => url,
            Err(_) => return p,
        };
        let Ok(response) = self.client.get(url).send() else {
            return p;
        };
        let Ok(parsed) = response.json::<NearestResponse>() else {
            return p;
        };
        if parsed.code != "Ok" {
            return p;
        }
        match parsed.waypoints.first() {
            Some(w) => Point::new(w.location[0], w.location[1]),
            None => p,
        }
    }

    fn road_path(&self, a: Point, b: Point) -> SimResult<Vec<Point>> {
        let base = format!(
            "{}/route/v1/driving/{};{}",
            self.endpoint,
            Self::coord(a),
            Self::coord(b)
        );
        let mut url = Url::parse(&base).map_err(|_| SimError::NoRoute)?;
        url.query_pairs_mut()
            .append_pair("geometries", "geojson")
            .append_pair("overview", "full");

        let response = self.client.get(url).send().map_err(|_| SimError::NoRoute)?;
        let parsed: RouteResponse = response.json().map_err(|_| SimError::NoRoute)?;
        if parsed.code != "Ok" {
            return Err(SimError::NoRoute);
        }
        let route = parsed
            .routes
            .and_then(|mut r| if r.is_empty() { None } else { Some(r.remove(0)) })
            .ok_or(SimError::NoRoute)?;

        let points = route
            .geometry
            .coordinates
            .into_iter()
            .map(|[x, y]| Point::new(x, y))
            .collect();
        Ok(points)
    }
}
