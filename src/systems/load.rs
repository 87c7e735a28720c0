//! Phase 1c: board every nearby claimed passenger, refusing (and resetting)
//! claims that no longer fit (spec.md §4.7 step 1, §4.4 `try_load`).

use std::panic::{catch_unwind, AssertUnwindSafe};

use crate::routing::RoutingClient;
use crate::simulator::Simulator;
use crate::vehicle::Vehicle;

pub fn run<R: RoutingClient>(sim: &mut Simulator<R>) {
    let now = sim.clock.now();
    let radius = sim.config.pickup_radius_m;
    for id in sim.active_vehicle_ids() {
        let result = catch_unwind(AssertUnwindSafe(|| {
            Vehicle::try_load(
                &mut sim.world,
                id,
                &mut sim.route_cache,
                radius,
                now,
                &sim.scheduler,
            );
        }));
        if result.is_err() {
            Vehicle::finish_trip(&mut sim.world, id, now);
        }
    }
}
