//! Phase 3: pair each terminal's head vehicle with its head passengers
//! (spec.md §4.7 step 3, §4.5).

use crate::routing::RoutingClient;
use crate::simulator::Simulator;

pub fn run<R: RoutingClient>(sim: &mut Simulator<R>) {
    let now = sim.clock.now();
    for terminal in sim.terminals.iter_mut() {
        while terminal.load_head(&mut sim.world, now).is_some() {
            terminal.pop_vehicle(&mut sim.world);
        }
    }
}
