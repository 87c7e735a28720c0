//! Append-only per-entity event log (spec.md §4.3, §6).
//!
//! Grounded in the teacher's event-kind pattern (`clock.rs::EventKind`,
//! `telemetry.rs`), but these events are simulation *output* records attached
//! to a passenger/vehicle, not entries in a scheduling queue.

use bevy_ecs::prelude::Entity;
use serde::{Deserialize, Serialize};

use crate::geo::Point;

/// Kinds of events appearing in passenger and vehicle logs (spec.md §6).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventKind {
    Appear,
    /// Coalesced move: `data` on the [`Event`] holds the run length.
    Move,
    Load,
    /// `data` on the [`Event`] holds the wait duration in ms.
    Wait,
    Enqueue,
    DropOff,
    Reset,
    Finish,
}

/// One recorded event. `agent` is set for events that refer to another
/// entity (e.g. a passenger's `Enqueue` event names the claiming vehicle).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub kind: EventKind,
    pub time: u64,
    pub location: Point,
    #[serde(skip)]
    pub agent: Option<Entity>,
    /// Numeric payload: move run length, or wait duration in ms.
    pub data: Option<u64>,
}

impl Event {
    pub fn new(kind: EventKind, time: u64, location: Point) -> Self {
        Self {
            kind,
            time,
            location,
            agent: None,
            data: None,
        }
    }

    pub fn with_agent(mut self, agent: Entity) -> Self {
        self.agent = Some(agent);
        self
    }

    pub fn with_data(mut self, data: u64) -> Self {
        self.data = Some(data);
        self
    }
}

/// An append-only, time-ordered event log.
///
/// `push` enforces monotonic, non-decreasing time (spec.md §8 invariant 4),
/// and coalesces a consecutive run of `Move` events into one, per spec.md
/// §4.4's `move` operation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventLog {
    events: Vec<Event>,
}

impl EventLog {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn push(&mut self, event: Event) {
        debug_assert!(
            self.events.last().is_none_or(|e| e.time <= event.time),
            "event log must be monotonically non-decreasing in tick"
        );

        if event.kind == EventKind::Move {
            if let Some(last) = self.events.last_mut() {
                if last.kind == EventKind::Move {
                    *last.data.get_or_insert(0) += event.data.unwrap_or(1);
                    last.time = event.time;
                    last.location = event.location;
                    return;
                }
            }
        }
        self.events.push(event);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Event> {
        self.events.iter()
    }

    pub fn as_slice(&self) -> &[Event] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
