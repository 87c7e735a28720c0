//! Tick phases (spec.md §4.7), one module per phase.
//!
//! Shaped after the teacher's `systems/` directory (one file per
//! discrete-event reaction), but each phase here runs unconditionally every
//! tick in the order [`crate::simulator::Simulator::tick`] calls them, rather
//! than being gated by a `CurrentEvent` match — see `simulator.rs`'s module
//! doc for why.

pub mod enqueue;
pub mod fallback;
pub mod load;
pub mod movement;
pub mod offload;
pub mod terminal_service;
pub mod timeout;
