//! Vehicle (tricycle) physical movement, capacity bookkeeping, and status
//! machine (spec.md §4.4).
//!
//! Grounded in the teacher's `agents.rs` (`Driver`/`DriverState`) for the
//! component shape and `systems/movement.rs` for the progress/interpolation
//! math, generalized to the tricycle's path-queue + capacity model and to
//! original_source's `entities.py::Tricycle` for the exact movement and
//! capacity-bookkeeping arithmetic (`moveTrike`, `loadPassenger`,
//! `tryOffload`).
//!
//! Per Design Notes §9 ("pass [the clock] as an argument... represent both
//! sides as identifier references to a registry"), the heavier operations
//! here are associated functions taking `&mut World` and a vehicle `Entity`
//! rather than `&mut self` methods — `Vehicle` and `Passenger` are separate
//! component types living in the same registry, so a method that needs to
//! mutate both cannot be expressed as `&mut self`.

use std::collections::{HashSet, VecDeque};

use bevy_ecs::prelude::{Component, Entity};
use serde::{Deserialize, Serialize};

use crate::clock::MS_PER_FRAME;
use crate::events::{Event, EventKind, EventLog};
use crate::geo::{euclidean, haversine, interpolate, Cycle, Point};
use crate::routing::{RouteCache, RoutingClient};
use crate::scheduler::Scheduler;
use crate::world::World;

pub const DEATH_TICK_UNSET: i64 = -1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VehicleStatus {
    Idle,
    Serving,
    Terminal,
    Roaming,
    ReturningToTerminal,
}

impl VehicleStatus {
    /// spec.md §4.4's transition table.
    fn allows(self, target: VehicleStatus) -> bool {
        use VehicleStatus::*;
        matches!(
            (self, target),
            (Idle, Serving)
                | (Idle, Terminal)
                | (Serving, ReturningToTerminal)
                | (Serving, Roaming)
                | (Terminal, Serving)
                | (Roaming, Serving)
                | (ReturningToTerminal, Terminal)
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathPriority {
    Replace,
    Front,
    Append,
}

/// A shared-ride tricycle (spec.md §3).
#[derive(Debug, Clone, Component, Serialize, Deserialize)]
pub struct Vehicle {
    pub capacity: usize,
    /// Meters per tick (realistic mode) or Euclidean units per tick (legacy).
    pub speed: f64,
    #[serde(skip)]
    pub roam_cycle: Option<Cycle>,
    pub is_roaming: bool,
    /// Mirrors the run's `is_realistic` mode (spec.md §4.7's
    /// `vehicle_config.use_meters`).
    pub use_meters: bool,
    pub active: bool,
    pub status: VehicleStatus,
    /// Points already visited, oldest first. `traversed_path.last()` is the
    /// current position.
    pub traversed_path: Vec<Point>,
    /// Points still to be traversed toward the current target(s).
    pub path_queue: VecDeque<Point>,
    /// Onboard passengers, in pickup order.
    pub onboard: Vec<Entity>,
    /// Passengers claimed (ENQUEUED) by this vehicle but not yet boarded.
    #[serde(skip)]
    pub enqueued: HashSet<Entity>,
    pub total_distance: f64,
    pub total_productive_distance: f64,
    pub total_distance_m: f64,
    pub total_productive_distance_m: f64,
    pub waiting_time: f64,
    pub create_tick: u64,
    /// `-1` until [`Vehicle::finish_trip`].
    pub death_tick: i64,
    pub events: EventLog,
}

impl Vehicle {
    pub fn new(
        capacity: usize,
        speed: f64,
        roam_cycle: Option<Cycle>,
        is_roaming: bool,
        use_meters: bool,
        start: Point,
        create_tick: u64,
    ) -> Self {
        let mut events = EventLog::new();
        events.push(Event::new(EventKind::Appear, create_tick, start));
        Self {
            capacity,
            speed,
            roam_cycle,
            is_roaming,
            use_meters,
            active: true,
            status: VehicleStatus::Idle,
            traversed_path: vec![start],
            path_queue: VecDeque::new(),
            onboard: Vec::new(),
            enqueued: HashSet::new(),
            total_distance: 0.0,
            total_productive_distance: 0.0,
            total_distance_m: 0.0,
            total_productive_distance_m: 0.0,
            waiting_time: 0.0,
            create_tick,
            death_tick: DEATH_TICK_UNSET,
            events,
        }
    }

    pub fn current_point(&self) -> Point {
        *self
            .traversed_path
            .last()
            .expect("traversed_path always has at least the starting point")
    }

    pub fn has_passenger(&self) -> bool {
        !self.onboard.is_empty()
    }

    /// Room left for new claims/boardings before hitting capacity.
    pub fn room(&self) -> usize {
        self.capacity
            .saturating_sub(self.onboard.len() + self.enqueued.len())
    }

    /// Resolves a road path from the current position to `target` and
    /// merges it into the path queue per `priority` (spec.md §4.4).
    /// Returns `false` (no mutation) on `NoRoute`, or a path too short to
    /// matter (fewer than 3 router-returned points).
    pub fn update_path<R: RoutingClient>(
        world: &mut World,
        vehicle_id: Entity,
        route_cache: &mut RouteCache<R>,
        target: Point,
        priority: PathPriority,
    ) -> bool {
        let cur = {
            let Some(v) = world.vehicle(vehicle_id) else {
                return false;
            };
            if v.path_queue.back().copied() == Some(target) {
                return true;
            }
            v.current_point()
        };

        let Ok(path) = route_cache.road_path(cur, target) else {
            return false;
        };
        if path.len() < 3 {
            return false;
        }

        let remaining: VecDeque<Point> = path.into_iter().skip(1).collect();
        let Some(mut v) = world.vehicle_mut(vehicle_id) else {
            return false;
        };
        match priority {
            PathPriority::Replace => v.path_queue = remaining,
            PathPriority::Front => {
                for p in remaining.into_iter().rev() {
                    v.path_queue.push_front(p);
                }
            }
            PathPriority::Append => v.path_queue.extend(remaining),
        }
        true
    }

    /// Claims up to `room` nearby `WAITING` passengers (spec.md §4.4).
    pub fn enqueue_nearby<R: RoutingClient>(
        world: &mut World,
        vehicle_id: Entity,
        route_cache: &mut RouteCache<R>,
        detection_radius_m: f64,
        now: u64,
    ) {
        use crate::passenger::PassengerStatus;

        let (cur, room) = {
            let Some(v) = world.vehicle(vehicle_id) else {
                return;
            };
            (v.current_point(), v.room())
        };
        if room == 0 {
            return;
        }

        let candidates: Vec<Entity> = world
            .nearby_passengers(cur, detection_radius_m)
            .into_iter()
            .filter(|&id| {
                world.passenger(id).is_some_and(|p| {
                    p.status == PassengerStatus::Waiting
                        && (p.claimed_by.is_none() || p.claimed_by == Some(vehicle_id))
                })
            })
            .take(room)
            .collect();

        for pid in candidates {
            let src = {
                let Some(mut p) = world.passenger_mut(pid) else {
                    continue;
                };
                p.enqueue(vehicle_id, now, p.src);
                p.src
            };
            Vehicle::update_path(world, vehicle_id, route_cache, src, PathPriority::Front);
            if let Some(mut v) = world.vehicle_mut(vehicle_id) {
                v.enqueued.insert(pid);
            }
        }
    }

    /// Boards every nearby passenger this vehicle has claimed, refusing (and
    /// resetting) claims it cannot fit (spec.md §4.4).
    pub fn try_load<R: RoutingClient, S: Scheduler>(
        world: &mut World,
        vehicle_id: Entity,
        route_cache: &mut RouteCache<R>,
        pickup_radius_m: f64,
        now: u64,
        scheduler: &S,
    ) {
        use crate::passenger::PassengerStatus;

        let cur = match world.vehicle(vehicle_id) {
            Some(v) => v.current_point(),
            None => return,
        };

        let candidates: Vec<Entity> = world
            .nearby_passengers(cur, pickup_radius_m)
            .into_iter()
            .filter(|&id| {
                world.vehicle(vehicle_id).is_some_and(|v| v.enqueued.contains(&id))
                    && world.passenger(id).is_some_and(|p| {
                        p.status == PassengerStatus::Enqueued && p.claimed_by == Some(vehicle_id)
                    })
            })
            .collect();

        for pid in candidates {
            // Boarding needs a legal path to `Serving` (spec.md §4.4's
            // transition table): refuse the same way `Terminal::add_vehicle`
            // refuses a vehicle in the wrong status, rather than forcing the
            // status unchecked.
            let status_allows_board = world.vehicle(vehicle_id).is_some_and(|v| {
                v.status == VehicleStatus::Serving || v.status.allows(VehicleStatus::Serving)
            });
            let has_room = status_allows_board
                && world
                    .vehicle(vehicle_id)
                    .is_some_and(|v| v.onboard.len() < v.capacity);
            let was_empty = world.vehicle(vehicle_id).is_some_and(|v| v.onboard.is_empty());

            if has_room {
                if let Some(mut p) = world.passenger_mut(pid) {
                    let loc = p.src;
                    p.load(vehicle_id, now, loc);
                }
                if let Some(mut v) = world.vehicle_mut(vehicle_id) {
                    v.onboard.push(pid);
                    v.enqueued.remove(&pid);
                    v.events.push(Event::new(EventKind::Load, now, cur).with_agent(pid));
                    v.events.push(Event::new(EventKind::Wait, now, cur).with_data(500));
                }
                if world.vehicle(vehicle_id).is_some_and(|v| v.status != VehicleStatus::Serving) {
                    Vehicle::set_status(world, vehicle_id, VehicleStatus::Serving);
                }
                if was_empty {
                    // Hand off to the scheduler now that there is at least one
                    // onboard passenger to route toward.
                    Vehicle::schedule_next_passenger(world, vehicle_id, route_cache, scheduler);
                }
            } else {
                if let Some(mut p) = world.passenger_mut(pid) {
                    let loc = p.src;
                    p.reset(now, loc);
                }
                if let Some(mut v) = world.vehicle_mut(vehicle_id) {
                    v.enqueued.remove(&pid);
                }
            }
        }
    }

    /// Drops off every onboard passenger within `dropoff_radius_m` of their
    /// destination (spec.md §4.4).
    pub fn try_offload(world: &mut World, vehicle_id: Entity, dropoff_radius_m: f64, now: u64) {
        let cur = match world.vehicle(vehicle_id) {
            Some(v) => v.current_point(),
            None => return,
        };

        let onboard_snapshot: Vec<Entity> = world
            .vehicle(vehicle_id)
            .map(|v| v.onboard.clone())
            .unwrap_or_default();

        let mut dropped_any = false;
        for pid in onboard_snapshot {
            let Some(dest) = world.passenger(pid).map(|p| p.dest) else {
                continue;
            };
            if haversine(cur, dest) <= dropoff_radius_m {
                if let Some(mut p) = world.passenger_mut(pid) {
                    p.drop_off(vehicle_id, now, cur);
                }
                if let Some(mut v) = world.vehicle_mut(vehicle_id) {
                    v.onboard.retain(|&id| id != pid);
                    v.events.push(Event::new(EventKind::DropOff, now, cur).with_agent(pid));
                }
                dropped_any = true;
            }
        }

        if dropped_any {
            let now_empty = world.vehicle(vehicle_id).is_some_and(|v| v.onboard.is_empty());
            if now_empty {
                let is_roaming = world.vehicle(vehicle_id).is_some_and(|v| v.is_roaming);
                let target = if is_roaming {
                    VehicleStatus::Roaming
                } else {
                    VehicleStatus::ReturningToTerminal
                };
                Vehicle::set_status_unchecked(world, vehicle_id, target);
            }
            if let Some(mut v) = world.vehicle_mut(vehicle_id) {
                v.events.push(Event::new(EventKind::Wait, now, cur).with_data(500));
            }
        }
    }

    /// Advances the vehicle toward the head of its path queue. Returns the
    /// distance actually travelled this tick (0.0 if stuck/terminal/empty
    /// queue — the tick engine treats that as "no progress", spec.md §4.7).
    pub fn move_vehicle(world: &mut World, vehicle_id: Entity, now: u64) -> f64 {
        let Some(v) = world.vehicle(vehicle_id) else {
            return 0.0;
        };
        if v.status == VehicleStatus::Terminal {
            return 0.0;
        }
        let Some(&nxt) = v.path_queue.front() else {
            return 0.0;
        };
        let cur = v.current_point();
        let use_meters = v.use_meters;
        let speed = v.speed;
        let has_passenger = v.has_passenger();

        let required = if use_meters {
            haversine(cur, nxt)
        } else {
            euclidean(cur, nxt)
        };
        let required_m = haversine(cur, nxt);

        let Some(mut v) = world.vehicle_mut(vehicle_id) else {
            return 0.0;
        };
        if required <= 0.0 {
            v.path_queue.pop_front();
            return 0.0;
        }

        let travelable = if use_meters { speed } else { speed * MS_PER_FRAME as f64 };
        let progress = (travelable / required).min(1.0);
        let new_point = interpolate(cur, nxt, progress);
        v.traversed_path.push(new_point);

        let travelled = required * progress;
        let travelled_m = if required_m > 0.0 {
            required_m * progress
        } else {
            0.0
        };
        v.total_distance += travelled;
        v.total_distance_m += travelled_m;
        if has_passenger {
            v.total_productive_distance += travelled;
            v.total_productive_distance_m += travelled_m;
        }

        v.events
            .push(Event::new(EventKind::Move, now, new_point).with_data(1));

        if progress >= 1.0 {
            v.path_queue.pop_front();
        }
        travelled
    }

    /// Picks the next onboard passenger to drop off (§4.6) and routes
    /// toward their destination. `None` means either there were no onboard
    /// passengers (`NoMorePassengers`, never surfaced as an error) or the
    /// router could not resolve a path.
    pub fn schedule_next_passenger<R: RoutingClient, S: Scheduler>(
        world: &mut World,
        vehicle_id: Entity,
        route_cache: &mut RouteCache<R>,
        scheduler: &S,
    ) -> Option<Entity> {
        let (cur, onboard) = {
            let v = world.vehicle(vehicle_id)?;
            if v.onboard.is_empty() {
                return None;
            }
            (v.current_point(), v.onboard.clone())
        };

        let dests: Vec<(Entity, Point)> = onboard
            .iter()
            .filter_map(|&id| world.passenger(id).map(|p| (id, p.dest)))
            .collect();
        let (_, chosen) = scheduler.choose(cur, &dests, route_cache)?;

        if !Vehicle::update_path(world, vehicle_id, route_cache, chosen, PathPriority::Replace) {
            return None;
        }
        Some(chosen)
    }

    /// Only for roaming vehicles: enqueues the next point of the roam cycle.
    pub fn load_next_cycle_point<R: RoutingClient>(
        world: &mut World,
        vehicle_id: Entity,
        route_cache: &mut RouteCache<R>,
    ) -> bool {
        let Some((cur, next)) = world.vehicle(vehicle_id).and_then(|v| {
            let cycle = v.roam_cycle.as_ref()?;
            Some((v.current_point(), cycle.next_point(v.current_point())))
        }) else {
            return false;
        };
        let _ = cur;
        Vehicle::update_path(world, vehicle_id, route_cache, next, PathPriority::Append)
    }

    /// Validated status transition (spec.md §4.4). Illegal transitions are
    /// refused (and logged); the vehicle keeps its previous status.
    pub fn set_status(world: &mut World, vehicle_id: Entity, target: VehicleStatus) -> bool {
        let Some(current) = world.vehicle(vehicle_id).map(|v| v.status) else {
            return false;
        };
        if !current.allows(target) {
            eprintln!(
                "refusing illegal vehicle status transition: {current:?} -> {target:?}"
            );
            return false;
        }
        Vehicle::set_status_unchecked(world, vehicle_id, target);
        true
    }

    /// Applies a transition already known to be legal (internal helper so
    /// call sites that already branch on `is_roaming`/`onboard.is_empty()`
    /// don't re-derive legality).
    fn set_status_unchecked(world: &mut World, vehicle_id: Entity, target: VehicleStatus) {
        if let Some(mut v) = world.vehicle_mut(vehicle_id) {
            v.status = target;
            if target == VehicleStatus::Roaming {
                v.path_queue.clear();
            }
        }
    }

    /// Marks the vehicle permanently inactive. Irreversible.
    pub fn finish_trip(world: &mut World, vehicle_id: Entity, now: u64) {
        let Some(mut v) = world.vehicle_mut(vehicle_id) else {
            return;
        };
        v.active = false;
        v.death_tick = now as i64;
        let loc = v.current_point();
        v.events.push(Event::new(EventKind::Finish, now, loc));
    }
}
