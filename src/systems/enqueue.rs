//! Phase 1b: each active vehicle claims nearby waiting passengers up to its
//! remaining room (spec.md §4.7 step 1, §4.4 `enqueue_nearby`).
//!
//! Runs as a full pass over every vehicle (registry order), after the
//! offload pass and before the load pass, so capacity freed this tick is
//! visible before it is claimed and before it is boarded.

use std::panic::{catch_unwind, AssertUnwindSafe};

use crate::routing::RoutingClient;
use crate::simulator::Simulator;
use crate::vehicle::Vehicle;

pub fn run<R: RoutingClient>(sim: &mut Simulator<R>) {
    let now = sim.clock.now();
    let radius = sim.config.detection_radius_m;
    for id in sim.active_vehicle_ids() {
        let result = catch_unwind(AssertUnwindSafe(|| {
            Vehicle::enqueue_nearby(&mut sim.world, id, &mut sim.route_cache, radius, now);
        }));
        if result.is_err() {
            Vehicle::finish_trip(&mut sim.world, id, now);
        }
    }
}
