//! Phase 2: advance every active vehicle along its path queue (spec.md §4.7
//! step 2). Returns the ids that made zero progress this tick, for
//! [`super::fallback`] to handle.

use std::panic::{catch_unwind, AssertUnwindSafe};

use bevy_ecs::prelude::Entity;

use crate::routing::RoutingClient;
use crate::simulator::Simulator;
use crate::vehicle::Vehicle;

pub fn run<R: RoutingClient>(sim: &mut Simulator<R>) -> Vec<Entity> {
    let now = sim.clock.now();
    let mut stuck = Vec::new();
    for id in sim.active_vehicle_ids() {
        let result = catch_unwind(AssertUnwindSafe(|| Vehicle::move_vehicle(&mut sim.world, id, now)));
        match result {
            Ok(progress) if progress <= 0.0 => stuck.push(id),
            Ok(_) => {}
            Err(_) => Vehicle::finish_trip(&mut sim.world, id, now),
        }
    }
    stuck
}
