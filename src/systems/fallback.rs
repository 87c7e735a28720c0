//! Phase 2's fallback handling for vehicles that made zero movement progress
//! this tick (spec.md §4.7 step 2a-2c).

use std::panic::{catch_unwind, AssertUnwindSafe};

use bevy_ecs::prelude::Entity;

use crate::geo::euclidean;
use crate::routing::RoutingClient;
use crate::simulator::Simulator;
use crate::vehicle::{PathPriority, Vehicle, VehicleStatus};

/// Index and location of the terminal geographically nearest to `from`, by
/// Euclidean distance (spec.md §4.7 step 2b says Euclidean explicitly, even
/// in meters mode).
fn nearest_terminal<R: RoutingClient>(
    sim: &Simulator<R>,
    from: crate::geo::Point,
) -> Option<(usize, crate::geo::Point)> {
    sim.terminals
        .iter()
        .map(|t| t.location)
        .enumerate()
        .min_by(|(_, a), (_, b)| {
            euclidean(from, *a)
                .partial_cmp(&euclidean(from, *b))
                .unwrap_or(std::cmp::Ordering::Equal)
        })
}

pub fn run<R: RoutingClient>(sim: &mut Simulator<R>, stuck: &[Entity]) {
    let now = sim.clock.now();
    for &id in stuck {
        // A TERMINAL vehicle is parked and inactive; skip it (it would
        // otherwise always read as "zero progress").
        if sim.world.vehicle(id).map(|v| v.status) == Some(VehicleStatus::Terminal) {
            continue;
        }
        if !sim.world.vehicle(id).is_some_and(|v| v.active) {
            continue;
        }

        let result = catch_unwind(AssertUnwindSafe(|| handle_one(&mut *sim, id, now)));
        if result.is_err() {
            Vehicle::finish_trip(&mut sim.world, id, now);
        }
    }
}

fn handle_one<R: RoutingClient>(sim: &mut Simulator<R>, id: Entity, now: u64) {
    let dropoff_radius = sim.config.dropoff_radius_m;
    Vehicle::try_offload(&mut sim.world, id, dropoff_radius, now);

    let has_passenger = sim.world.vehicle(id).is_some_and(|v| v.has_passenger());
    if has_passenger {
        Vehicle::schedule_next_passenger(&mut sim.world, id, &mut sim.route_cache, &sim.scheduler);
        return;
    }

    let is_roaming = sim.world.vehicle(id).is_some_and(|v| v.is_roaming);
    if is_roaming {
        Vehicle::load_next_cycle_point(&mut sim.world, id, &mut sim.route_cache);
        return;
    }

    let cur = match sim.world.vehicle(id) {
        Some(v) => v.current_point(),
        None => return,
    };
    match nearest_terminal(sim, cur) {
        Some((idx, loc)) if sim.world.bounds.same_cell(cur, loc) => {
            sim.terminals[idx].add_vehicle(&mut sim.world, id);
        }
        Some((_, loc)) => {
            let routed =
                Vehicle::update_path(&mut sim.world, id, &mut sim.route_cache, loc, PathPriority::Append);
            if !routed {
                Vehicle::finish_trip(&mut sim.world, id, now);
            }
        }
        None => Vehicle::finish_trip(&mut sim.world, id, now),
    }
}
