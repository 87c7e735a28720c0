//! On-board drop-off scheduler (spec.md §4.6).
//!
//! Mirrors the teacher's `matching/` directory shape: a trait
//! ([`matching::MatchingAlgorithm`] there, [`Scheduler`] here) plus one
//! implementation per file (`simple.rs` → [`fifo::Fifo`], `cost_based.rs` →
//! [`brute::BruteForce`]).

pub mod brute;
pub mod fifo;

use bevy_ecs::prelude::Entity;

use crate::geo::Point;
use crate::routing::{RouteCache, RoutingClient};

/// Chooses which onboard passenger to drop off next (spec.md §4.6).
///
/// `dests` is the ordered list of (passenger id, destination) pairs currently
/// onboard, in pickup order. `route_cache` is threaded through so a
/// distance-optimizing scheduler (see [`brute::BruteForce`]) can reuse it
/// rather than opening its own routing calls (spec.md §4.6: "must reuse the
/// route cache from §4.1"). Returns the chosen `(index, destination)` pair,
/// or `None` if `dests` is empty.
pub trait Scheduler: Send + Sync {
    fn choose<R: RoutingClient>(
        &self,
        src: Point,
        dests: &[(Entity, Point)],
        route_cache: &mut RouteCache<R>,
    ) -> Option<(usize, Point)>;
}

/// Runtime choice between the two [`Scheduler`] implementations
/// (spec.md §4.7's `vehicle_config.scheduler` key). `choose`'s generic `R`
/// parameter makes [`Scheduler`] non-object-safe, so [`crate::simulator::Simulator`]
/// (itself generic over one `R`) selects between implementations with this
/// enum rather than a `Box<dyn Scheduler>`.
#[derive(Debug, Clone, Copy)]
pub enum AnyScheduler {
    Fifo(fifo::Fifo),
    Smart(brute::BruteForce),
}

impl AnyScheduler {
    pub fn fifo() -> Self {
        AnyScheduler::Fifo(fifo::Fifo)
    }

    pub fn smart() -> Self {
        AnyScheduler::Smart(brute::BruteForce)
    }
}

impl Scheduler for AnyScheduler {
    fn choose<R: RoutingClient>(
        &self,
        src: Point,
        dests: &[(Entity, Point)],
        route_cache: &mut RouteCache<R>,
    ) -> Option<(usize, Point)> {
        match self {
            AnyScheduler::Fifo(s) => s.choose(src, dests, route_cache),
            AnyScheduler::Smart(s) => s.choose(src, dests, route_cache),
        }
    }
}
