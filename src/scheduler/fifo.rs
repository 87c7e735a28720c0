//! FIFO scheduler: always drop off whoever was picked up first.
//!
//! Grounded in the teacher's `matching/simple.rs` (`SimpleMatching`): a
//! zero-state, first-candidate-wins policy.

use bevy_ecs::prelude::Entity;

use super::Scheduler;
use crate::geo::Point;
use crate::routing::{RouteCache, RoutingClient};

#[derive(Debug, Default, Clone, Copy)]
pub struct Fifo;

impl Scheduler for Fifo {
    fn choose<R: RoutingClient>(
        &self,
        _src: Point,
        dests: &[(Entity, Point)],
        _route_cache: &mut RouteCache<R>,
    ) -> Option<(usize, Point)> {
        dests.first().map(|&(_, dest)| (0, dest))
    }
}
