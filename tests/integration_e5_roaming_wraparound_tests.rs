//! E5 — roaming wraparound (spec.md §8): a roaming vehicle with no passengers
//! cycles between its roam points indefinitely, wrapping back to the first
//! point after the last.

use trike_fleet_sim::config::{SchedulerKind, SimulatorConfig, VehicleConfig};
use trike_fleet_sim::error::{SimError, SimResult};
use trike_fleet_sim::geo::{haversine, Cycle, Point};
use trike_fleet_sim::scenario::PlacementInputs;
use trike_fleet_sim::simulator::Simulator;
use trike_fleet_sim::world::Bounds;

struct StraightLineRouter;
impl trike_fleet_sim::routing::RoutingClient for StraightLineRouter {
    fn snap_to_road(&self, p: Point) -> Point {
        p
    }
    fn road_path(&self, a: Point, b: Point) -> SimResult<Vec<Point>> {
        if a == b {
            return Err(SimError::NoRoute);
        }
        Ok(vec![a, trike_fleet_sim::geo::interpolate(a, b, 0.5), b])
    }
}

fn bounds() -> Bounds {
    Bounds::new(-1.0, -1.0, 1.0, 1.0, 10, 10)
}

#[test]
fn roaming_vehicle_visits_waypoints_in_cycle_order() {
    let p1 = Point::new(0.0, 0.0);
    let p2 = Point::new(0.0, 0.01);

    let config = SimulatorConfig {
        total_vehicles: 1,
        total_terminals: 0,
        total_passengers: 0,
        roaming_vehicle_chance: 1.0,
        vehicle_config: VehicleConfig {
            capacity: 3,
            speed: 100_000.0, // cross a leg in a single tick
            scheduler: SchedulerKind::Fifo,
            use_meters: true,
        },
        max_time: 12,
        seed: 9,
        ..SimulatorConfig::default()
    };
    let inputs = PlacementInputs {
        terminals: vec![],
        hotspots: vec![p1, p2],
    };
    let mut sim = Simulator::new(config, inputs, 1, bounds(), StraightLineRouter).unwrap();

    let vehicle_id = sim.world.vehicle_ids()[0];
    if let Some(mut v) = sim.world.vehicle_mut(vehicle_id) {
        v.traversed_path = vec![p1];
        v.is_roaming = true;
        v.roam_cycle = Some(Cycle::new(vec![p1, p2]));
    }

    sim.run_until(12);

    let v = sim.world.vehicle(vehicle_id).unwrap();
    let waypoint_label = |p: Point| -> Option<&'static str> {
        if haversine(p, p1) < 1e-6 {
            Some("P1")
        } else if haversine(p, p2) < 1e-6 {
            Some("P2")
        } else {
            None
        }
    };

    let mut visited: Vec<&'static str> = Vec::new();
    for &p in &v.traversed_path {
        if let Some(label) = waypoint_label(p) {
            if visited.last() != Some(&label) {
                visited.push(label);
            }
        }
    }

    assert!(
        visited.len() >= 4,
        "expected at least 4 distinct waypoint visits, got {visited:?}"
    );
    assert_eq!(&visited[0..4], &["P1", "P2", "P1", "P2"]);
}
