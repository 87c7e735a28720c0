//! Scenario construction: wiring externally-supplied placements into the
//! engine's `World` (SPEC_FULL.md AMBIENT-2).
//!
//! The random scenario generator itself is out of scope (spec.md §1); this
//! module is the glue between its output (fixed terminal/hotspot points) and
//! the tick engine. Grounded in the teacher's `spawner.rs` (entities spawned
//! into the ECS world from config) and `distributions.rs` (seeded draws),
//! generalized from inter-arrival sampling to the one-shot road/terminal and
//! roaming/non-roaming placement draws spec.md §4.7 calls for.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::SimulatorConfig;
use crate::geo::{Cycle, Point};
use crate::passenger::Passenger;
use crate::terminal::Terminal;
use crate::vehicle::Vehicle;
use crate::world::World;

/// Externally-supplied placement data (spec.md §4.7's `use_fixed_terminals`
/// / `use_fixed_hotspots`): this crate does not itself generate random
/// coordinates — that is the out-of-scope generator's job — it only decides,
/// from the single seeded RNG stream, how the supplied points get assigned to
/// passengers and vehicles.
#[derive(Debug, Clone)]
pub struct PlacementInputs {
    pub terminals: Vec<Point>,
    /// On-road points usable as a passenger source/destination or a vehicle
    /// roam-cycle waypoint.
    pub hotspots: Vec<Point>,
}

/// A passenger or vehicle placement resolved from [`PlacementInputs`],
/// ready to be inserted into the [`World`].
pub struct BuiltScenario {
    pub passengers: Vec<Passenger>,
    /// Index (into the terminals actually built for this run, i.e.
    /// `config.total_terminals` of them) each passenger should be queued at,
    /// when its source was drawn at a terminal rather than a road hotspot
    /// (spec.md §4.7's `road_passenger_chance`: "fraction of passengers
    /// spawned along roads rather than at terminals"). `None` for
    /// road-spawned passengers.
    pub passenger_home_terminal: Vec<Option<usize>>,
    pub vehicles: Vec<Vehicle>,
}

/// Builds passenger and vehicle placements from `inputs` and `config`, using
/// a single seeded RNG stream in a documented order (spec.md §5): terminal
/// distribution draws are consumed by the caller when assigning terminal
/// indices; here, per-passenger road/terminal draws happen in passenger-index
/// order, then per-vehicle roaming draws happen in vehicle-index order.
///
/// Terminal indices are drawn only from the prefix of `inputs.terminals`
/// that `config.total_terminals` actually instantiates into a `Terminal`
/// (`Simulator::new` takes `inputs.terminals.iter().take(total_terminals)`),
/// so every index handed back here resolves to a real terminal.
pub fn build_scenario(config: &SimulatorConfig, inputs: &PlacementInputs) -> BuiltScenario {
    let mut rng = StdRng::seed_from_u64(config.seed);
    let terminal_cap = inputs.terminals.len().min(config.total_terminals);
    let terminals_in_use = &inputs.terminals[..terminal_cap];

    let mut passengers = Vec::with_capacity(config.total_passengers);
    let mut passenger_home_terminal = Vec::with_capacity(config.total_passengers);
    for _ in 0..config.total_passengers {
        let on_road = !inputs.hotspots.is_empty()
            && (terminals_in_use.is_empty() || rng.gen_bool(config.road_passenger_chance));
        let (src, src_terminal) = pick_point(
            &mut rng,
            terminals_in_use,
            &inputs.hotspots,
            on_road,
            config.terminal_passenger_distrib.as_deref(),
        );
        let dst_on_road = !inputs.hotspots.is_empty()
            && (terminals_in_use.is_empty() || rng.gen_bool(config.road_passenger_chance));
        let (dst, _) = pick_point(
            &mut rng,
            terminals_in_use,
            &inputs.hotspots,
            dst_on_road,
            config.terminal_passenger_distrib.as_deref(),
        );
        passengers.push(Passenger::appear(src, dst, 0));
        passenger_home_terminal.push(src_terminal);
    }

    let vehicles = (0..config.total_vehicles)
        .map(|_| {
            let is_roaming = rng.gen_bool(config.roaming_vehicle_chance);
            let start = if is_roaming && !inputs.hotspots.is_empty() {
                inputs.hotspots[rng.gen_range(0..inputs.hotspots.len())]
            } else if !terminals_in_use.is_empty() {
                let idx = weighted_index(
                    &mut rng,
                    config.terminal_vehicle_distrib.as_deref(),
                    terminals_in_use.len(),
                );
                terminals_in_use[idx]
            } else if !inputs.hotspots.is_empty() {
                inputs.hotspots[rng.gen_range(0..inputs.hotspots.len())]
            } else {
                Point::new(0.0, 0.0)
            };
            let roam_cycle = if is_roaming && inputs.hotspots.len() >= 2 {
                Some(build_roam_cycle(&mut rng, &inputs.hotspots))
            } else {
                None
            };
            Vehicle::new(
                config.vehicle_config.capacity,
                config.vehicle_config.speed,
                roam_cycle,
                is_roaming,
                config.vehicle_config.use_meters,
                start,
                0,
            )
        })
        .collect();

    BuiltScenario {
        passengers,
        passenger_home_terminal,
        vehicles,
    }
}

/// Picks a source/destination point: on-road draws from `hotspots`, terminal
/// draws from `terminals` (honoring `terminal_distrib` when given). Returns
/// the chosen point plus, when it came from a terminal, that terminal's
/// index so the caller can queue the passenger there.
fn pick_point(
    rng: &mut StdRng,
    terminals: &[Point],
    hotspots: &[Point],
    on_road: bool,
    terminal_distrib: Option<&[f64]>,
) -> (Point, Option<usize>) {
    if on_road && !hotspots.is_empty() {
        (hotspots[rng.gen_range(0..hotspots.len())], None)
    } else if !terminals.is_empty() {
        let idx = weighted_index(rng, terminal_distrib, terminals.len());
        (terminals[idx], Some(idx))
    } else if !hotspots.is_empty() {
        (hotspots[rng.gen_range(0..hotspots.len())], None)
    } else {
        (Point::new(0.0, 0.0), None)
    }
}

/// Draws a terminal index, honoring `weights` when given (spec.md §4.7's
/// `terminal_passenger_distrib`/`terminal_vehicle_distrib`), falling back to
/// uniform otherwise.
fn weighted_index(rng: &mut StdRng, weights: Option<&[f64]>, len: usize) -> usize {
    let Some(weights) = weights else {
        return rng.gen_range(0..len);
    };
    let total: f64 = weights.iter().sum();
    if total <= 0.0 {
        return rng.gen_range(0..len);
    }
    let draw = rng.gen_range(0.0..total);
    let mut cumulative = 0.0;
    for (i, w) in weights.iter().enumerate() {
        cumulative += w;
        if draw < cumulative {
            return i;
        }
    }
    len - 1
}

/// Builds a roam [`Cycle`] out of a random subset (2..=4 points) of the
/// supplied hotspots, in draw order.
fn build_roam_cycle(rng: &mut StdRng, hotspots: &[Point]) -> Cycle {
    let n = hotspots.len().min(4).max(2);
    let count = rng.gen_range(2..=n);
    let mut points = Vec::with_capacity(count);
    for _ in 0..count {
        points.push(hotspots[rng.gen_range(0..hotspots.len())]);
    }
    Cycle::new(points)
}

/// Inserts a [`BuiltScenario`] into `world`, in passenger-then-vehicle,
/// index order (registry order is part of the determinism contract,
/// spec.md §5). Passengers whose source was drawn at a terminal are also
/// queued into that `Terminal`'s FIFO via `Terminal::add_passenger`, so
/// `terminal_service` has passengers to dispatch (spec.md §4.5); road-spawned
/// passengers are left for proximity-based `enqueue_nearby` instead.
pub fn populate_world(world: &mut World, terminals: &mut [Terminal], scenario: BuiltScenario) {
    for (p, home) in scenario.passengers.into_iter().zip(scenario.passenger_home_terminal) {
        let id = world.add_passenger(p);
        if let Some(idx) = home {
            if let Some(terminal) = terminals.get_mut(idx) {
                terminal.add_passenger(id);
            }
        }
    }
    for v in scenario.vehicles {
        world.add_vehicle(v);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::Bounds;

    fn config() -> SimulatorConfig {
        SimulatorConfig {
            total_vehicles: 4,
            total_terminals: 2,
            total_passengers: 10,
            road_passenger_chance: 0.5,
            roaming_vehicle_chance: 0.5,
            seed: 42,
            ..SimulatorConfig::default()
        }
    }

    fn inputs() -> PlacementInputs {
        PlacementInputs {
            terminals: vec![Point::new(0.0, 0.0), Point::new(1.0, 1.0)],
            hotspots: vec![
                Point::new(0.1, 0.1),
                Point::new(0.2, 0.2),
                Point::new(0.3, 0.3),
            ],
        }
    }

    #[test]
    fn same_seed_yields_identical_scenario() {
        let c = config();
        let i = inputs();
        let a = build_scenario(&c, &i);
        let b = build_scenario(&c, &i);
        assert_eq!(a.passengers.len(), b.passengers.len());
        for (pa, pb) in a.passengers.iter().zip(b.passengers.iter()) {
            assert_eq!(pa.src, pb.src);
            assert_eq!(pa.dest, pb.dest);
        }
        for (va, vb) in a.vehicles.iter().zip(b.vehicles.iter()) {
            assert_eq!(va.is_roaming, vb.is_roaming);
            assert_eq!(va.current_point(), vb.current_point());
        }
    }

    #[test]
    fn populate_world_preserves_index_order() {
        let c = config();
        let i = inputs();
        let scenario = build_scenario(&c, &i);
        let expected_passengers = scenario.passengers.len();
        let expected_vehicles = scenario.vehicles.len();
        let mut world = World::new(Bounds::new(-1.0, -1.0, 2.0, 2.0, 4, 4));
        let mut terminals: Vec<Terminal> = i
            .terminals
            .iter()
            .take(c.total_terminals)
            .map(|&loc| Terminal::new(loc, 10))
            .collect();
        populate_world(&mut world, &mut terminals, scenario);
        assert_eq!(world.all_passenger_ids().len(), expected_passengers);
        assert_eq!(world.vehicle_ids().len(), expected_vehicles);
    }

    #[test]
    fn terminal_sourced_passengers_are_queued_at_their_terminal() {
        let c = SimulatorConfig {
            total_vehicles: 2,
            total_terminals: 2,
            total_passengers: 20,
            road_passenger_chance: 0.0,
            roaming_vehicle_chance: 0.0,
            seed: 7,
            ..SimulatorConfig::default()
        };
        let i = inputs();
        let scenario = build_scenario(&c, &i);
        let queued_total: usize = scenario
            .passenger_home_terminal
            .iter()
            .filter(|home| home.is_some())
            .count();
        assert_eq!(queued_total, scenario.passengers.len());

        let mut world = World::new(Bounds::new(-1.0, -1.0, 2.0, 2.0, 4, 4));
        let mut terminals: Vec<Terminal> = i
            .terminals
            .iter()
            .take(c.total_terminals)
            .map(|&loc| Terminal::new(loc, 10))
            .collect();
        populate_world(&mut world, &mut terminals, scenario);
        let total_queued: usize = terminals.iter().map(|t| t.passenger_queue_len()).sum();
        assert_eq!(total_queued, queued_total);
    }

    #[test]
    fn terminal_vehicle_distrib_biases_start_terminal() {
        let mut c = config();
        c.total_vehicles = 20;
        c.roaming_vehicle_chance = 0.0;
        c.terminal_vehicle_distrib = Some(vec![1.0, 0.0]);
        let i = inputs();
        let scenario = build_scenario(&c, &i);
        assert!(scenario
            .vehicles
            .iter()
            .all(|v| v.current_point() == i.terminals[0]));
    }
}
