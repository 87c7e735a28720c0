//! Run output schema (spec.md §6, SPEC_FULL.md AMBIENT-3).
//!
//! Persistence, HTTP serving, and plotting are out of scope (spec.md §1);
//! this module only assembles the serde-serializable records a downstream
//! consumer would persist. Grounded in the *shape* of the teacher's
//! `telemetry_export/trips.rs` (one record per entity, assembled from live
//! engine state) with the Arrow/Parquet writer dropped — see DESIGN.md for
//! the dependency-drop note.

use bevy_ecs::prelude::Entity;
use serde::{Deserialize, Serialize};

use crate::config::{SchedulerKind, SimulatorConfig};
use crate::events::EventLog;
use crate::geo::Point;
use crate::passenger::PassengerStatus;
use crate::world::World;

/// Run-level metadata (spec.md §6).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunMetadata {
    pub id: String,
    pub seed: u64,
    pub max_time: u64,
    pub total_vehicles: usize,
    pub total_terminals: usize,
    pub total_passengers: usize,
    pub road_passenger_chance: f64,
    pub roaming_vehicle_chance: f64,
    pub hotspots_count: usize,
    pub scheduler: SchedulerKindLabel,
    pub is_realistic: bool,
    pub vehicle_capacity: usize,
    pub vehicle_speed: f64,
    pub detection_radius_m: f64,
    pub pickup_radius_m: f64,
    pub dropoff_radius_m: f64,
    pub end_time: u64,
    pub elapsed_ticks: u64,
    pub last_activity_time: u64,
}

/// `scheduler|fifo` string label (spec.md §6: "scheduler kind (smart|fifo)").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SchedulerKindLabel {
    Smart,
    Fifo,
}

impl From<SchedulerKind> for SchedulerKindLabel {
    fn from(kind: SchedulerKind) -> Self {
        match kind {
            SchedulerKind::Smart => SchedulerKindLabel::Smart,
            SchedulerKind::Fifo => SchedulerKindLabel::Fifo,
        }
    }
}

/// Per-vehicle output record (spec.md §6).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VehicleRecord {
    #[serde(skip)]
    pub id: Option<Entity>,
    pub speed: f64,
    pub is_roaming: bool,
    pub start: Point,
    pub create_tick: u64,
    pub death_tick: i64,
    pub total_distance: f64,
    pub productive_distance: f64,
    pub total_distance_m: f64,
    pub total_productive_distance_m: f64,
    pub waiting_time: f64,
    pub traversed_path: Vec<Point>,
    pub events: EventLog,
}

/// Per-passenger output record (spec.md §6).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PassengerRecord {
    #[serde(skip)]
    pub id: Option<Entity>,
    pub src: Point,
    pub dest: Point,
    pub create_tick: u64,
    pub death_tick: i64,
    pub pickup_tick: i64,
    pub events: EventLog,
    #[serde(skip)]
    pub claimed_by: Option<Entity>,
}

/// The full output of one run: metadata plus every vehicle/passenger record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunOutput {
    pub metadata: RunMetadata,
    pub vehicles: Vec<VehicleRecord>,
    pub passengers: Vec<PassengerRecord>,
}

/// Assembles a [`RunOutput`] from live engine state at any point (typically
/// called after `Simulator::run_until` terminates, but valid mid-run too).
pub fn snapshot(
    world: &World,
    config: &SimulatorConfig,
    run_id: &str,
    hotspots_count: usize,
    now: u64,
    last_activity_time: u64,
) -> RunOutput {
    let metadata = RunMetadata {
        id: run_id.to_string(),
        seed: config.seed,
        max_time: config.max_time,
        total_vehicles: config.total_vehicles,
        total_terminals: config.total_terminals,
        total_passengers: config.total_passengers,
        road_passenger_chance: config.road_passenger_chance,
        roaming_vehicle_chance: config.roaming_vehicle_chance,
        hotspots_count,
        scheduler: config.vehicle_config.scheduler.into(),
        is_realistic: config.is_realistic,
        vehicle_capacity: config.vehicle_config.capacity,
        vehicle_speed: config.vehicle_config.speed,
        detection_radius_m: config.detection_radius_m,
        pickup_radius_m: config.pickup_radius_m,
        dropoff_radius_m: config.dropoff_radius_m,
        end_time: now,
        elapsed_ticks: now,
        last_activity_time,
    };

    let vehicles = world
        .vehicle_ids()
        .iter()
        .filter_map(|&id| world.vehicle(id).map(|v| VehicleRecord {
            id: Some(id),
            speed: v.speed,
            is_roaming: v.is_roaming,
            start: v.traversed_path.first().copied().unwrap_or(v.current_point()),
            create_tick: v.create_tick,
            death_tick: v.death_tick,
            total_distance: v.total_distance,
            productive_distance: v.total_productive_distance,
            total_distance_m: v.total_distance_m,
            total_productive_distance_m: v.total_productive_distance_m,
            waiting_time: v.waiting_time,
            traversed_path: v.traversed_path.clone(),
            events: v.events.clone(),
        }))
        .collect();

    let passengers = world
        .all_passenger_ids()
        .iter()
        .filter_map(|&id| world.passenger(id).map(|p| PassengerRecord {
            id: Some(id),
            src: p.src,
            dest: p.dest,
            create_tick: p.create_tick,
            death_tick: if p.status == PassengerStatus::Completed {
                p.completion_tick
            } else {
                -1
            },
            pickup_tick: p.pickup_tick,
            events: p.events.clone(),
            claimed_by: p.claimed_by,
        }))
        .collect();

    RunOutput {
        metadata,
        vehicles,
        passengers,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::passenger::Passenger;
    use crate::vehicle::Vehicle;
    use crate::world::Bounds;

    #[test]
    fn unserved_passenger_has_death_tick_unset() {
        let mut world = World::new(Bounds::new(0.0, 0.0, 1.0, 1.0, 2, 2));
        world.add_passenger(Passenger::appear(Point::new(0.0, 0.0), Point::new(1.0, 1.0), 0));
        world.add_vehicle(Vehicle::new(2, 5.0, None, false, true, Point::new(0.0, 0.0), 0));
        let config = SimulatorConfig {
            total_passengers: 1,
            total_vehicles: 1,
            ..SimulatorConfig::default()
        };
        let out = snapshot(&world, &config, "run-1", 0, 100, 100);
        assert_eq!(out.passengers.len(), 1);
        assert_eq!(out.passengers[0].death_tick, -1);
    }
}
