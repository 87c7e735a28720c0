//! The tick engine (spec.md §4.7).
//!
//! Grounded in the teacher's `runner.rs` (`run_next_event`/`run_until_*`
//! drive the clock and a `Schedule`) and `scenario.rs` (config as a resource
//! bundle), but control flow itself changes: the teacher is a discrete-event
//! simulator dispatching on `CurrentEvent.kind`; this is a discrete-*time*
//! simulator, so every phase in `systems/` runs unconditionally, once per
//! tick, in the fixed order spec.md §4.7 specifies. See SPEC_FULL.md §2 for
//! why this is the one place the transform changes control flow rather than
//! just relabeling it.

use bevy_ecs::prelude::Entity;

use crate::clock::Clock;
use crate::config::{SchedulerKind, SimulatorConfig};
use crate::error::SimResult;
use crate::routing::{RouteCache, RoutingClient};
use crate::scenario::{build_scenario, populate_world, PlacementInputs};
use crate::scheduler::AnyScheduler;
use crate::systems;
use crate::terminal::Terminal;
use crate::world::{Bounds, World};

/// Owns every piece of mutable engine state for one run: the entity
/// registries (`World`), the simulation clock, the routing cache, and the
/// terminal queues. Per Design Notes §9 ("re-architect as explicit context
/// objects... pass [the clock] as an argument"), none of this is module-level
/// global state — a caller can run several `Simulator`s side by side with
/// independent route caches and get reproducible results from each.
pub struct Simulator<R: RoutingClient> {
    pub world: World,
    pub clock: Clock,
    pub route_cache: RouteCache<R>,
    pub terminals: Vec<Terminal>,
    pub config: SimulatorConfig,
    /// `pub(crate)` (rather than accessed through a method) so `systems/*`
    /// phase functions can borrow this field disjointly from `world` and
    /// `route_cache` inside an `AssertUnwindSafe` closure — a method call
    /// would need to borrow all of `self` and defeat that disjoint capture.
    pub(crate) scheduler: AnyScheduler,
}

impl<R: RoutingClient> Simulator<R> {
    /// Validates `config` eagerly (spec.md §7: `ImproperConfig` never
    /// surfaces at tick time), builds the `World` from `inputs` via
    /// [`crate::scenario::build_scenario`], and places `terminal_locations`
    /// (one per `config.total_terminals`, spec.md §4.7's
    /// `use_fixed_terminals`) as empty [`Terminal`]s.
    pub fn new(
        config: SimulatorConfig,
        inputs: PlacementInputs,
        terminal_capacity: usize,
        bounds: Bounds,
        router: R,
    ) -> SimResult<Self> {
        config.validate()?;

        let scheduler = match config.vehicle_config.scheduler {
            SchedulerKind::Fifo => AnyScheduler::fifo(),
            SchedulerKind::Smart => AnyScheduler::smart(),
        };

        let mut world = World::new(bounds);
        let scenario = build_scenario(&config, &inputs);

        let mut terminals: Vec<Terminal> = inputs
            .terminals
            .iter()
            .take(config.total_terminals)
            .map(|&loc| Terminal::new(loc, terminal_capacity))
            .collect();
        populate_world(&mut world, &mut terminals, scenario);

        let clock = Clock::new(config.is_realistic);
        let route_cache = RouteCache::new(router);

        Ok(Self {
            world,
            clock,
            route_cache,
            terminals,
            config,
            scheduler,
        })
    }

    /// Vehicle ids currently `active`, snapshotted so later mutation of the
    /// registry during this tick does not affect iteration (Design Notes §9,
    /// "open-iteration mutation").
    pub(crate) fn active_vehicle_ids(&self) -> Vec<Entity> {
        self.world
            .vehicle_ids()
            .iter()
            .copied()
            .filter(|&id| self.world.vehicle(id).is_some_and(|v| v.active))
            .collect()
    }

    /// Runs exactly one tick: offload/enqueue/load passes, move (with
    /// per-vehicle fallback for zero-progress vehicles), terminal service,
    /// optional timeout sweep, then clock advance (spec.md §4.7).
    pub fn tick(&mut self) {
        systems::offload::run(self);
        systems::enqueue::run(self);
        systems::load::run(self);

        let stuck = systems::movement::run(self);
        systems::fallback::run(self, &stuck);

        systems::terminal_service::run(self);
        systems::timeout::run(self);

        self.clock.advance();
    }

    /// Runs ticks until `self.clock.now() >= max_time` (spec.md §4.7).
    pub fn run_until(&mut self, max_time: u64) {
        while self.clock.now() < max_time {
            self.tick();
        }
        self.finalize();
    }

    /// Stamps death time (already set via `finish_trip`/terminal parking)
    /// and waiting-time for every vehicle still active at the end of a run
    /// (spec.md §4.7): `waiting_time = max(0, last_active - total_distance /
    /// speed)`.
    fn finalize(&mut self) {
        let now = self.clock.now();
        let ids: Vec<Entity> = self.world.vehicle_ids().to_vec();
        for id in ids {
            let Some(mut v) = self.world.vehicle_mut(id) else {
                continue;
            };
            if v.speed > 0.0 {
                let busy_time = v.total_distance / v.speed;
                v.waiting_time = (now as f64 - busy_time).max(0.0);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::VehicleConfig;
    use crate::error::{SimError, SimResult as RoutingResult};
    use crate::geo::{interpolate, Point};
    use crate::passenger::PassengerStatus;

    struct StraightLineRouter;
    impl RoutingClient for StraightLineRouter {
        fn snap_to_road(&self, p: Point) -> Point {
            p
        }
        fn road_path(&self, a: Point, b: Point) -> RoutingResult<Vec<Point>> {
            if a == b {
                return Err(SimError::NoRoute);
            }
            Ok(vec![a, interpolate(a, b, 0.5), b])
        }
    }

    fn bounds() -> Bounds {
        Bounds::new(-1.0, -1.0, 1.0, 1.0, 10, 10)
    }

    /// E1 — Minimal pickup (spec.md §8).
    #[test]
    fn e1_minimal_pickup_reaches_dropoff() {
        let origin = Point::new(0.0, 0.0);
        // ~20m east of the origin at this latitude.
        let dest = Point::new(0.00018, 0.0);

        let config = SimulatorConfig {
            total_vehicles: 1,
            total_terminals: 0,
            total_passengers: 1,
            roaming_vehicle_chance: 1.0,
            vehicle_config: VehicleConfig {
                capacity: 3,
                speed: 5.556,
                scheduler: SchedulerKind::Fifo,
                use_meters: true,
            },
            detection_radius_m: 100.0,
            pickup_radius_m: 2.0,
            dropoff_radius_m: 2.0,
            max_time: 100,
            seed: 1,
            ..SimulatorConfig::default()
        };
        let inputs = PlacementInputs {
            terminals: vec![],
            hotspots: vec![origin, dest],
        };
        let mut sim = Simulator::new(config, inputs, 1, bounds(), StraightLineRouter).unwrap();

        // Force exact placement regardless of scenario RNG: one vehicle at
        // origin, one passenger at origin with `dest` 20m away.
        let vehicle_id = sim.world.vehicle_ids()[0];
        if let Some(mut v) = sim.world.vehicle_mut(vehicle_id) {
            v.traversed_path = vec![origin];
            v.is_roaming = false;
        }
        let passenger_id = sim.world.all_passenger_ids()[0];
        if let Some(mut p) = sim.world.passenger_mut(passenger_id) {
            p.src = origin;
            p.dest = dest;
        }

        sim.run_until(100);

        let p = sim.world.passenger(passenger_id).unwrap();
        assert_eq!(p.status, PassengerStatus::Completed);
        assert!(p.pickup_tick <= 1);
        assert!(p.completion_tick >= p.pickup_tick);

        let kinds: Vec<_> = p.events.iter().map(|e| e.kind).collect();
        use crate::events::EventKind::*;
        assert_eq!(kinds.first(), Some(&Appear));
        assert!(kinds.contains(&Enqueue));
        assert!(kinds.contains(&Load));
        assert!(kinds.contains(&DropOff));
        let load_idx = kinds.iter().position(|k| *k == Load).unwrap();
        let drop_idx = kinds.iter().position(|k| *k == DropOff).unwrap();
        assert!(load_idx < drop_idx);
    }

    /// E2 — Claim contention (spec.md §8).
    #[test]
    fn e2_exactly_one_vehicle_claims_the_passenger() {
        let origin = Point::new(0.0, 0.0);
        let config = SimulatorConfig {
            total_vehicles: 2,
            total_terminals: 0,
            total_passengers: 1,
            roaming_vehicle_chance: 1.0,
            detection_radius_m: 100.0,
            max_time: 1,
            seed: 7,
            ..SimulatorConfig::default()
        };
        let inputs = PlacementInputs {
            terminals: vec![],
            hotspots: vec![origin],
        };
        let mut sim = Simulator::new(config, inputs, 1, bounds(), StraightLineRouter).unwrap();

        for &id in sim.world.vehicle_ids() {
            if let Some(mut v) = sim.world.vehicle_mut(id) {
                v.traversed_path = vec![origin];
            }
        }
        let passenger_id = sim.world.all_passenger_ids()[0];
        if let Some(mut p) = sim.world.passenger_mut(passenger_id) {
            p.src = origin;
        }

        sim.tick();

        let p = sim.world.passenger(passenger_id).unwrap();
        assert!(p.claimed_by.is_some());
        let claimer = p.claimed_by.unwrap();
        let vehicle_ids = sim.world.vehicle_ids().to_vec();
        let claim_count = vehicle_ids
            .iter()
            .filter(|&&id| sim.world.vehicle(id).is_some_and(|v| v.enqueued.contains(&passenger_id)))
            .count();
        assert_eq!(claim_count, 1);
        assert!(vehicle_ids.contains(&claimer));
    }
}
