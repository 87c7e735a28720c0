//! Passenger lifecycle: waiting → enqueued → onboard → completed (spec.md §4.3).
//!
//! Grounded in the teacher's `agents.rs` (`Rider`/`RiderState` component
//! pair), generalized from the teacher's ride-hailing states to the tricycle
//! fleet's claim/load/drop protocol, and in original_source's
//! `entities.py::Passenger`/`PassengerStatus` for the exact tick-sentinel
//! convention (`-1` until set).

use bevy_ecs::prelude::{Component, Entity};
use serde::{Deserialize, Serialize};

use crate::events::{Event, EventKind, EventLog};
use crate::geo::Point;

/// Tick sentinel meaning "not yet set" (matches original_source's `-1`
/// convention for `pickupTime`/`deathTime`/enqueue tick).
pub const UNSET_TICK: i64 = -1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PassengerStatus {
    Waiting,
    Enqueued,
    Onboard,
    Completed,
}

/// A passenger in the simulation (spec.md §3).
#[derive(Debug, Clone, Component, Serialize, Deserialize)]
pub struct Passenger {
    pub src: Point,
    pub dest: Point,
    pub status: PassengerStatus,
    pub create_tick: u64,
    /// `-1` until [`PassengerStatus::Onboard`].
    pub pickup_tick: i64,
    /// `-1` until [`PassengerStatus::Completed`].
    pub completion_tick: i64,
    /// Non-`None` iff `status ∈ {Enqueued, Onboard}`.
    #[serde(skip)]
    pub claimed_by: Option<Entity>,
    /// `-1` unless `status == Enqueued`.
    pub enqueue_tick: i64,
    pub events: EventLog,
}

impl Passenger {
    /// Creates a passenger in `WAITING`, appending the `APPEAR` event.
    pub fn appear(src: Point, dest: Point, create_tick: u64) -> Self {
        let mut events = EventLog::new();
        events.push(Event::new(EventKind::Appear, create_tick, src));
        Self {
            src,
            dest,
            status: PassengerStatus::Waiting,
            create_tick,
            pickup_tick: UNSET_TICK,
            completion_tick: UNSET_TICK,
            claimed_by: None,
            enqueue_tick: UNSET_TICK,
            events,
        }
    }

    /// `WAITING -> ENQUEUED`: claimed by exactly one vehicle.
    ///
    /// Caller is responsible for ensuring `self` was actually `WAITING` and
    /// unclaimed (the world-level claim-contention ordering lives in
    /// [`crate::world::World::nearby_passengers`] callers, not here).
    pub fn enqueue(&mut self, vehicle: Entity, now: u64, location: Point) {
        debug_assert_eq!(self.status, PassengerStatus::Waiting);
        self.status = PassengerStatus::Enqueued;
        self.claimed_by = Some(vehicle);
        self.enqueue_tick = now as i64;
        self.events
            .push(Event::new(EventKind::Enqueue, now, location).with_agent(vehicle));
    }

    /// `ENQUEUED -> ONBOARD`. `claimed_by` is retained (not cleared) so
    /// downstream consumers can attribute the trip to the loading vehicle.
    pub fn load(&mut self, vehicle: Entity, now: u64, location: Point) {
        debug_assert_eq!(self.status, PassengerStatus::Enqueued);
        self.status = PassengerStatus::Onboard;
        self.pickup_tick = now as i64;
        self.events
            .push(Event::new(EventKind::Load, now, location).with_agent(vehicle));
    }

    /// `ENQUEUED -> WAITING`: timeout, or the claiming vehicle refused to
    /// load (at capacity). Clears the claim.
    pub fn reset(&mut self, now: u64, location: Point) {
        debug_assert_eq!(self.status, PassengerStatus::Enqueued);
        self.status = PassengerStatus::Waiting;
        self.claimed_by = None;
        self.enqueue_tick = UNSET_TICK;
        self.events.push(Event::new(EventKind::Reset, now, location));
    }

    /// `ONBOARD -> COMPLETED`.
    pub fn drop_off(&mut self, vehicle: Entity, now: u64, location: Point) {
        debug_assert_eq!(self.status, PassengerStatus::Onboard);
        self.status = PassengerStatus::Completed;
        self.completion_tick = now as i64;
        self.events
            .push(Event::new(EventKind::DropOff, now, location).with_agent(vehicle));
    }

    /// spec.md §8 invariant 2: `claimed_by ≠ None ⇔ status ∈ {Enqueued, Onboard}`.
    pub fn claim_invariant_holds(&self) -> bool {
        self.claimed_by.is_some()
            == matches!(
                self.status,
                PassengerStatus::Enqueued | PassengerStatus::Onboard
            )
    }
}
