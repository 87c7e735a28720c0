//! Phase 1a: drop off every active vehicle's onboard passengers who are
//! within `dropoff_radius_m` of their destination (spec.md §4.7 step 1).

use std::panic::{catch_unwind, AssertUnwindSafe};

use crate::routing::RoutingClient;
use crate::simulator::Simulator;
use crate::vehicle::Vehicle;

pub fn run<R: RoutingClient>(sim: &mut Simulator<R>) {
    let now = sim.clock.now();
    let radius = sim.config.dropoff_radius_m;
    for id in sim.active_vehicle_ids() {
        let result = catch_unwind(AssertUnwindSafe(|| {
            Vehicle::try_offload(&mut sim.world, id, radius, now);
        }));
        if result.is_err() {
            Vehicle::finish_trip(&mut sim.world, id, now);
        }
    }
}
