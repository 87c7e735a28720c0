//! Simulator configuration surface (spec.md §4.7).
//!
//! Follows the `Resource`-struct-with-`Default`-impl shape of the teacher's
//! `scenario.rs` (`RiderQuoteConfig`, `BatchMatchingConfig`, ...), enumerating
//! exactly the keys spec.md §4.7 names. Construction validates
//! `ImproperConfig` eagerly via [`SimulatorConfig::validate`] — never at tick
//! time (spec.md §7).

use bevy_ecs::prelude::Resource;

use crate::error::{SimError, SimResult};

/// Which on-board scheduler a vehicle uses (spec.md §4.6).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerKind {
    Fifo,
    Smart,
}

/// Per-vehicle configuration (spec.md §4.7's `vehicle_config.*` keys).
#[derive(Debug, Clone, Copy)]
pub struct VehicleConfig {
    pub capacity: usize,
    pub speed: f64,
    pub scheduler: SchedulerKind,
    pub use_meters: bool,
}

impl Default for VehicleConfig {
    fn default() -> Self {
        Self {
            capacity: 3,
            speed: 5.556,
            scheduler: SchedulerKind::Fifo,
            use_meters: true,
        }
    }
}

/// Top-level engine configuration (spec.md §4.7). One `SimulatorConfig`
/// governs one run; it is immutable once validated.
#[derive(Debug, Clone, Resource)]
pub struct SimulatorConfig {
    pub total_vehicles: usize,
    pub total_terminals: usize,
    pub total_passengers: usize,
    pub road_passenger_chance: f64,
    pub roaming_vehicle_chance: f64,
    /// Optional per-terminal weights for passenger placement; when set, must
    /// have exactly `total_terminals` entries.
    pub terminal_passenger_distrib: Option<Vec<f64>>,
    /// Optional per-terminal weights for vehicle placement; when set, must
    /// have exactly `total_terminals` entries.
    pub terminal_vehicle_distrib: Option<Vec<f64>>,
    pub passenger_spawn_start_fraction: f64,
    pub vehicle_config: VehicleConfig,
    pub detection_radius_m: f64,
    pub pickup_radius_m: f64,
    pub dropoff_radius_m: f64,
    pub use_fixed_terminals: bool,
    pub use_fixed_hotspots: bool,
    pub is_realistic: bool,
    pub max_time: u64,
    pub seed: u64,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            total_vehicles: 0,
            total_terminals: 0,
            total_passengers: 0,
            road_passenger_chance: 0.0,
            roaming_vehicle_chance: 0.0,
            terminal_passenger_distrib: None,
            terminal_vehicle_distrib: None,
            passenger_spawn_start_fraction: 1.0,
            vehicle_config: VehicleConfig::default(),
            detection_radius_m: 100.0,
            pickup_radius_m: 2.0,
            dropoff_radius_m: 2.0,
            use_fixed_terminals: false,
            use_fixed_hotspots: false,
            is_realistic: true,
            max_time: 0,
            seed: 0,
        }
    }
}

impl SimulatorConfig {
    /// Eager validation at construction time (spec.md §7, §8's boundary case).
    pub fn validate(&self) -> SimResult<()> {
        let in_unit_interval =
            |name: &str, v: f64| -> SimResult<()> {
                if !(0.0..=1.0).contains(&v) {
                    return Err(SimError::ImproperConfig(format!(
                        "{name} must be in [0, 1], got {v}"
                    )));
                }
                Ok(())
            };
        in_unit_interval("road_passenger_chance", self.road_passenger_chance)?;
        in_unit_interval("roaming_vehicle_chance", self.roaming_vehicle_chance)?;
        if !(0.0..=1.0).contains(&self.passenger_spawn_start_fraction)
            || self.passenger_spawn_start_fraction <= 0.0
        {
            return Err(SimError::ImproperConfig(format!(
                "passenger_spawn_start_fraction must be in (0, 1], got {}",
                self.passenger_spawn_start_fraction
            )));
        }
        if self.vehicle_config.capacity == 0 {
            return Err(SimError::ImproperConfig(
                "vehicle_config.capacity must be >= 1".into(),
            ));
        }
        if let Some(d) = &self.terminal_passenger_distrib {
            if d.len() != self.total_terminals {
                return Err(SimError::ImproperConfig(format!(
                    "terminal_passenger_distrib has {} entries, expected {}",
                    d.len(),
                    self.total_terminals
                )));
            }
        }
        if let Some(d) = &self.terminal_vehicle_distrib {
            if d.len() != self.total_terminals {
                return Err(SimError::ImproperConfig(format!(
                    "terminal_vehicle_distrib has {} entries, expected {}",
                    d.len(),
                    self.total_terminals
                )));
            }
        }
        // spec.md §8: a single-terminal scenario with roaming_vehicle_chance
        // == 1.0 demands non-roaming behavior (every non-roaming vehicle
        // needs somewhere to return to) be rejected only when there *is* a
        // non-roaming vehicle with nowhere to go: terminals == 0 but roaming
        // chance < 1.0 means some vehicle will need a terminal it cannot have.
        if self.total_terminals == 0 && self.roaming_vehicle_chance < 1.0 && self.total_vehicles > 0
        {
            return Err(SimError::ImproperConfig(
                "total_terminals == 0 requires roaming_vehicle_chance == 1.0 \
                 (non-roaming vehicles have nowhere to return to)"
                    .into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_validates() {
        assert!(SimulatorConfig::default().validate().is_ok());
    }

    #[test]
    fn zero_terminals_without_full_roaming_is_rejected() {
        let config = SimulatorConfig {
            total_vehicles: 2,
            total_terminals: 0,
            roaming_vehicle_chance: 0.5,
            ..SimulatorConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(SimError::ImproperConfig(
                "total_terminals == 0 requires roaming_vehicle_chance == 1.0 \
                 (non-roaming vehicles have nowhere to return to)"
                    .into()
            ))
        );
    }

    #[test]
    fn zero_terminals_with_full_roaming_is_accepted() {
        let config = SimulatorConfig {
            total_vehicles: 2,
            total_terminals: 0,
            roaming_vehicle_chance: 1.0,
            ..SimulatorConfig::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn mismatched_distrib_length_is_rejected() {
        let config = SimulatorConfig {
            total_terminals: 2,
            terminal_passenger_distrib: Some(vec![1.0]),
            ..SimulatorConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn zero_capacity_is_rejected() {
        let mut config = SimulatorConfig::default();
        config.vehicle_config.capacity = 0;
        assert!(config.validate().is_err());
    }
}
