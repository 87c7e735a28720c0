//! Pluggable routing backend: trait abstraction plus a memoizing cache in front of it.
//!
//! Mirrors the shape of the teacher's `routing.rs` (`RouteProvider` trait,
//! boxed and stored as a resource), but the routing service itself is an
//! out-of-scope external collaborator (spec.md §1) — implementors plug in
//! nearest-on-road snapping and road-path resolution; this crate only
//! specifies the contract and the cache that sits in front of it.
//!
//! An optional `osrm` feature (mirroring the teacher's own `osrm` feature
//! over `routing/osrm_spawn/`) provides one concrete [`RoutingClient`] that
//! talks to a live OSRM server; see [`osrm::OsrmRoutingClient`].

#[cfg(feature = "osrm")]
pub mod osrm;

use std::collections::HashMap;

use crate::error::{SimError, SimResult};
use crate::geo::{Point, PointKey};

/// External routing service contract (spec.md §6). Implementations are
/// expected to be synchronous and may fail transiently; retrying is the
/// adapter's responsibility, not the engine's (spec.md §5).
pub trait RoutingClient: Send + Sync {
    /// Nearest drivable point to `p`.
    fn snap_to_road(&self, p: Point) -> Point;

    /// Road path between `a` and `b`, as an ordered sequence of points
    /// including both endpoints. `Err(SimError::NoRoute)` when the router
    /// reports the endpoints are mutually unreachable.
    fn road_path(&self, a: Point, b: Point) -> SimResult<Vec<Point>>;
}

/// One cached routing result: either a resolved path or a negative sentinel
/// meaning "no route exists between these points".
#[derive(Debug, Clone, PartialEq)]
enum CacheEntry {
    Path(Vec<Point>),
    NoRoute,
}

/// Memoizing wrapper around a [`RoutingClient`], keyed by the unordered pair
/// of endpoints (§4.1: "both forward and reverse keys hit the same entry").
///
/// Per Design Notes §9, this is an explicit context object owned by the
/// [`crate::simulator::Simulator`] rather than teacher-style module-level
/// global state (teacher's `spatial.rs` uses a `OnceLock<Mutex<LruCache>>>`);
/// it also never evicts, since spec.md requires it be "monotonically
/// growing" and repeated infeasible queries stay O(1) forever within a run.
pub struct RouteCache<R: RoutingClient> {
    client: R,
    entries: HashMap<(PointKey, PointKey), CacheEntry>,
}

impl<R: RoutingClient> RouteCache<R> {
    pub fn new(client: R) -> Self {
        Self {
            client,
            entries: HashMap::new(),
        }
    }

    pub fn snap_to_road(&self, p: Point) -> Point {
        self.client.snap_to_road(p)
    }

    /// Road path between `a` and `b`, served from cache when available.
    pub fn road_path(&mut self, a: Point, b: Point) -> SimResult<Vec<Point>> {
        let key = Point::unordered_key(a, b);
        if let Some(entry) = self.entries.get(&key) {
            return match entry {
                CacheEntry::Path(p) => Ok(p.clone()),
                CacheEntry::NoRoute => Err(SimError::NoRoute),
            };
        }

        match self.client.road_path(a, b) {
            Ok(path) => {
                self.entries.insert(key, CacheEntry::Path(path.clone()));
                Ok(path)
            }
            Err(SimError::NoRoute) => {
                self.entries.insert(key, CacheEntry::NoRoute);
                Err(SimError::NoRoute)
            }
            Err(other) => Err(other),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
