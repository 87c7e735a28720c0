//! The bounded region and entity registries (spec.md §4.2).
//!
//! Grounded in the teacher's `ecs.rs` (entity registries backed by a
//! `bevy_ecs::World`) generalized from rider/driver/trip components to
//! passenger/vehicle registries, plus original_source's `entities.py::Map`
//! for the grid "same location" predicate used by the terminal-return
//! fallback (spec.md §4.7 step 2b).

use bevy_ecs::prelude::Entity;
use bevy_ecs::world::World as EcsWorld;

use crate::clock::MS_PER_FRAME;
use crate::geo::{haversine, Point};
use crate::passenger::Passenger;
use crate::vehicle::Vehicle;

/// Rectangular bounds, subdivided into a `num_row` x `num_col` grid for the
/// "same location" predicate (original_source's `Map.get_loc`/`same_loc`).
#[derive(Debug, Clone, Copy)]
pub struct Bounds {
    pub x_min: f64,
    pub y_min: f64,
    pub x_max: f64,
    pub y_max: f64,
    pub num_row: u32,
    pub num_col: u32,
}

impl Bounds {
    pub fn new(x_min: f64, y_min: f64, x_max: f64, y_max: f64, num_row: u32, num_col: u32) -> Self {
        Self {
            x_min,
            y_min,
            x_max,
            y_max,
            num_row,
            num_col,
        }
    }

    fn cell(&self, p: Point) -> (i64, i64) {
        let grid_w = (self.x_max - self.x_min) / self.num_col as f64;
        let grid_h = (self.y_max - self.y_min) / self.num_row as f64;
        let cx = if grid_w > 0.0 {
            ((p.x - self.x_min) / grid_w).floor() as i64
        } else {
            0
        };
        let cy = if grid_h > 0.0 {
            ((p.y - self.y_min) / grid_h).floor() as i64
        } else {
            0
        };
        (cx, cy)
    }

    /// Whether `a` and `b` fall in the same grid cell.
    pub fn same_cell(&self, a: Point, b: Point) -> bool {
        self.cell(a) == self.cell(b)
    }
}

/// The simulated world: bounds plus passenger/vehicle registries
/// (spec.md §3). Owns the `bevy_ecs` component storage that backs every
/// [`Passenger`] and [`Vehicle`].
pub struct World {
    ecs: EcsWorld,
    pub bounds: Bounds,
    /// Passengers currently present on the map (still waiting or enqueued,
    /// not yet boarded). Insertion order; part of the determinism contract
    /// (spec.md §5).
    present_passengers: Vec<Entity>,
    /// All vehicles, in creation order. Vehicles are never removed.
    vehicles: Vec<Entity>,
    /// All passengers ever created, in creation order — kept for final
    /// reporting even after a passenger leaves `present_passengers`.
    all_passengers: Vec<Entity>,
}

impl World {
    pub fn new(bounds: Bounds) -> Self {
        Self {
            ecs: EcsWorld::new(),
            bounds,
            present_passengers: Vec::new(),
            vehicles: Vec::new(),
            all_passengers: Vec::new(),
        }
    }

    pub fn add_passenger(&mut self, p: Passenger) -> Entity {
        let id = self.ecs.spawn(p).id();
        self.present_passengers.push(id);
        self.all_passengers.push(id);
        id
    }

    /// Removes `id` from the map registry (it keeps existing as an entity
    /// with its final `Passenger` component, for reporting).
    pub fn remove_passenger(&mut self, id: Entity) {
        self.present_passengers.retain(|&e| e != id);
    }

    pub fn add_vehicle(&mut self, v: Vehicle) -> Entity {
        let id = self.ecs.spawn(v).id();
        self.vehicles.push(id);
        id
    }

    pub fn passenger(&self, id: Entity) -> Option<&Passenger> {
        self.ecs.get::<Passenger>(id)
    }

    pub fn passenger_mut(&mut self, id: Entity) -> Option<bevy_ecs::world::Mut<'_, Passenger>> {
        self.ecs.get_mut::<Passenger>(id)
    }

    pub fn vehicle(&self, id: Entity) -> Option<&Vehicle> {
        self.ecs.get::<Vehicle>(id)
    }

    pub fn vehicle_mut(&mut self, id: Entity) -> Option<bevy_ecs::world::Mut<'_, Vehicle>> {
        self.ecs.get_mut::<Vehicle>(id)
    }

    /// Vehicle registry, in creation (and iteration) order — part of the
    /// determinism contract (spec.md §5).
    pub fn vehicle_ids(&self) -> &[Entity] {
        &self.vehicles
    }

    /// Passengers present on the map, in registry order.
    pub fn present_passenger_ids(&self) -> &[Entity] {
        &self.present_passengers
    }

    /// All passengers ever created, in creation order.
    pub fn all_passenger_ids(&self) -> &[Entity] {
        &self.all_passengers
    }

    /// Linear scan over the passenger registry, filtering by Haversine
    /// distance. Return order is registry (insertion) order (spec.md §4.2).
    pub fn nearby_passengers(&self, center: Point, radius_m: f64) -> Vec<Entity> {
        self.present_passengers
            .iter()
            .copied()
            .filter(|&id| {
                self.passenger(id)
                    .is_some_and(|p| haversine(center, p.src) <= radius_m)
            })
            .collect()
    }

    /// Haversine proximity check.
    pub fn at_location(&self, a: Point, b: Point, threshold_m: f64) -> bool {
        haversine(a, b) <= threshold_m
    }

    /// For every `ENQUEUED` passenger, reset to `WAITING` if the claim has
    /// outlived `max(60, (2 * detection_radius_m) / effective_speed_per_tick)`
    /// ticks (spec.md §4.2). Each vehicle's own `use_meters` flag (not a
    /// global mode) decides its effective per-tick speed, since
    /// `vehicle_config.use_meters` is carried per vehicle (spec.md §4.7).
    pub fn check_enqueue_timeouts(&mut self, now: u64, detection_radius_m: f64) {
        use crate::passenger::PassengerStatus;

        let stale: Vec<(Entity, Entity)> = self
            .present_passengers
            .iter()
            .copied()
            .filter_map(|id| {
                let p = self.passenger(id)?;
                if p.status != PassengerStatus::Enqueued {
                    return None;
                }
                let vehicle_id = p.claimed_by?;
                let vehicle = self.vehicle(vehicle_id)?;
                let effective_speed = if vehicle.use_meters {
                    vehicle.speed
                } else {
                    vehicle.speed * MS_PER_FRAME as f64
                };
                let threshold = (60.0_f64).max(
                    if effective_speed > 0.0 {
                        (2.0 * detection_radius_m) / effective_speed
                    } else {
                        f64::INFINITY
                    },
                );
                let elapsed = now as i64 - p.enqueue_tick;
                (elapsed as f64 > threshold).then_some((id, vehicle_id))
            })
            .collect();

        for (id, vehicle_id) in stale {
            if let Some(mut p) = self.passenger_mut(id) {
                let loc = p.src;
                p.reset(now, loc);
            }
            if let Some(mut v) = self.vehicle_mut(vehicle_id) {
                v.enqueued.remove(&id);
            }
        }
    }
}
