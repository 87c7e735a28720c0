//! Phase 4 (optional): reclaim enqueued passengers whose claim outlived the
//! timeout (spec.md §4.7 step 4, §4.2 `check_enqueue_timeouts`).

use crate::routing::RoutingClient;
use crate::simulator::Simulator;

pub fn run<R: RoutingClient>(sim: &mut Simulator<R>) {
    let now = sim.clock.now();
    sim.world
        .check_enqueue_timeouts(now, sim.config.detection_radius_m);
}
