//! Terminal: FIFO queues of parked vehicles and waiting passengers, with
//! head-of-line loading (spec.md §4.5).
//!
//! Grounded in original_source's `entities.py::Terminal`
//! (`addTricycle`/`addPassenger`/`loadTricycle`/`popTricycle`) — the teacher
//! workspace has no terminal/depot analog, ride-hailing drivers have no
//! queueing discipline, so this module's algorithm comes straight from the
//! Python original while its component/derive shape follows the rest of this
//! crate's `bevy_ecs::Component` style.

use std::collections::VecDeque;

use bevy_ecs::prelude::Entity;

use crate::geo::Point;
use crate::passenger::PassengerStatus;
use crate::vehicle::{Vehicle, VehicleStatus};
use crate::world::World;

/// Result of one [`Terminal::load_head`] call: the vehicle passengers were
/// loaded into, the passengers loaded, and the (currently always-zero) wait
/// time accrued by the load (spec.md §4.5).
pub struct LoadResult {
    pub vehicle: Entity,
    pub passengers: Vec<Entity>,
    pub wait: f64,
}

/// Fixed-location parking/boarding point (spec.md §3, §4.5). Owned directly
/// by [`crate::simulator::Simulator`] in a `Vec`, not stored in the `World`'s
/// `bevy_ecs` registry — nothing else references a terminal by `Entity`
/// identity, so the extra indirection would buy nothing.
#[derive(Debug, Clone)]
pub struct Terminal {
    pub location: Point,
    pub capacity: usize,
    vehicle_queue: VecDeque<Entity>,
    passenger_queue: VecDeque<Entity>,
}

impl Terminal {
    pub fn new(location: Point, capacity: usize) -> Self {
        Self {
            location,
            capacity,
            vehicle_queue: VecDeque::new(),
            passenger_queue: VecDeque::new(),
        }
    }

    pub fn is_empty_of_passengers(&self) -> bool {
        self.passenger_queue.is_empty()
    }

    pub fn is_empty_of_vehicles(&self) -> bool {
        self.vehicle_queue.is_empty()
    }

    pub fn vehicle_queue_len(&self) -> usize {
        self.vehicle_queue.len()
    }

    pub fn passenger_queue_len(&self) -> usize {
        self.passenger_queue.len()
    }

    /// Accepts `vehicle_id` only from `IDLE` or `RETURNING_TO_TERMINAL`
    /// (spec.md §4.5); parks it, marks it inactive, transitions it to
    /// `TERMINAL`.
    pub fn add_vehicle(&mut self, world: &mut World, vehicle_id: Entity) -> bool {
        let status = world.vehicle(vehicle_id).map(|v| v.status);
        let accepted = matches!(
            status,
            Some(VehicleStatus::Idle) | Some(VehicleStatus::ReturningToTerminal)
        );
        if !accepted {
            return false;
        }
        self.vehicle_queue.push_back(vehicle_id);
        if let Some(mut v) = world.vehicle_mut(vehicle_id) {
            v.active = false;
        }
        Vehicle::set_status(world, vehicle_id, VehicleStatus::Terminal);
        true
    }

    pub fn add_passenger(&mut self, passenger_id: Entity) {
        self.passenger_queue.push_back(passenger_id);
    }

    /// While both queues are nonempty, attempts to load the head passenger
    /// into the head vehicle; stops at the first capacity refusal, leaving
    /// that passenger at the head of the queue (spec.md §4.5).
    ///
    /// A passenger queued here has never been through `Passenger::enqueue`
    /// (nothing claims a passenger just for sitting in a terminal's FIFO), so
    /// it is still `WAITING` when its turn comes up: claim it for
    /// `vehicle_id` immediately before loading it, the same `WAITING ->
    /// ENQUEUED -> ONBOARD` path the proximity-detection protocol takes,
    /// just collapsed into the same call since the vehicle is already known.
    pub fn load_head(&mut self, world: &mut World, now: u64) -> Option<LoadResult> {
        let &vehicle_id = self.vehicle_queue.front()?;
        if self.passenger_queue.is_empty() {
            return None;
        }

        let mut loaded = Vec::new();
        while let Some(&passenger_id) = self.passenger_queue.front() {
            let has_room = world
                .vehicle(vehicle_id)
                .is_some_and(|v| v.onboard.len() < v.capacity);
            if !has_room {
                break;
            }
            self.passenger_queue.pop_front();

            // Already claimed (or boarded) via the proximity protocol before
            // this terminal got to it; nothing left for the terminal to do.
            let status = world.passenger(passenger_id).map(|p| p.status);
            if status != Some(PassengerStatus::Waiting) {
                continue;
            }

            let loc = world.passenger(passenger_id).map(|p| p.src).unwrap_or(self.location);
            if let Some(mut p) = world.passenger_mut(passenger_id) {
                p.enqueue(vehicle_id, now, loc);
                p.load(vehicle_id, now, loc);
            }
            if let Some(mut v) = world.vehicle_mut(vehicle_id) {
                v.onboard.push(passenger_id);
            }
            loaded.push(passenger_id);
        }

        if loaded.is_empty() {
            return None;
        }
        Some(LoadResult {
            vehicle: vehicle_id,
            passengers: loaded,
            wait: 0.0,
        })
    }

    /// Pops the head vehicle, marks it active, and returns it. Call sites in
    /// this crate only pop a vehicle right after [`Terminal::load_head`]
    /// boarded at least one passenger into it, so the vehicle always leaves
    /// with a non-empty `onboard` — transition it out of `TERMINAL` into
    /// `SERVING` so it is eligible to move again next tick.
    pub fn pop_vehicle(&mut self, world: &mut World) -> Option<Entity> {
        let vehicle_id = self.vehicle_queue.pop_front()?;
        if let Some(mut v) = world.vehicle_mut(vehicle_id) {
            v.active = true;
        }
        if world.vehicle(vehicle_id).is_some_and(|v| v.has_passenger()) {
            Vehicle::set_status(world, vehicle_id, VehicleStatus::Serving);
        }
        Some(vehicle_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::Point;
    use crate::passenger::Passenger;
    use crate::world::Bounds;

    fn bounds() -> Bounds {
        Bounds::new(-1.0, -1.0, 1.0, 1.0, 4, 4)
    }

    fn idle_vehicle(world: &mut World, capacity: usize) -> Entity {
        world.add_vehicle(Vehicle::new(
            capacity,
            5.0,
            None,
            false,
            true,
            Point::new(0.0, 0.0),
            0,
        ))
    }

    #[test]
    fn add_vehicle_rejects_wrong_status() {
        let mut world = World::new(bounds());
        let v = idle_vehicle(&mut world, 3);
        Vehicle::set_status(&mut world, v, VehicleStatus::Serving);
        let mut terminal = Terminal::new(Point::new(0.0, 0.0), 5);
        assert!(!terminal.add_vehicle(&mut world, v));
        assert!(terminal.is_empty_of_vehicles());
    }

    #[test]
    fn head_of_line_loads_up_to_capacity_then_pops() {
        let mut world = World::new(bounds());
        let v1 = idle_vehicle(&mut world, 3);
        let v2 = idle_vehicle(&mut world, 3);
        let mut terminal = Terminal::new(Point::new(0.0, 0.0), 5);
        assert!(terminal.add_vehicle(&mut world, v1));
        assert!(terminal.add_vehicle(&mut world, v2));

        for _ in 0..5 {
            let p = world.add_passenger(Passenger::appear(
                Point::new(0.0, 0.0),
                Point::new(1.0, 1.0),
                0,
            ));
            terminal.add_passenger(p);
        }

        let first = terminal.load_head(&mut world, 0).unwrap();
        assert_eq!(first.vehicle, v1);
        assert_eq!(first.passengers.len(), 3);
        assert_eq!(terminal.passenger_queue_len(), 2);
        assert_eq!(terminal.pop_vehicle(&mut world), Some(v1));

        let second = terminal.load_head(&mut world, 0).unwrap();
        assert_eq!(second.vehicle, v2);
        assert_eq!(second.passengers.len(), 2);
        assert!(terminal.is_empty_of_passengers());
    }
}
