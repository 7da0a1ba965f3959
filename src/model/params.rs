//! Fleet and timing parameters.

use crate::alns::AlnsConfig;

/// Fleet, timing and capacity constants, plus the ALNS control values.
///
/// All durations are in hours, speeds in distance units per hour.
/// Immutable and shared read-only by every component.
#[derive(Debug, Clone)]
pub struct Parameters {
    /// Number of trucks in the fleet.
    pub num_trucks: usize,
    /// Number of drones in the fleet (informational; drone identity and
    /// availability windows are not modeled by the scheduler).
    pub num_drones: usize,
    /// Truck travel speed over Manhattan distances.
    pub truck_speed: f64,
    /// Drone flight speed over Euclidean distances.
    pub drone_speed: f64,
    /// Per-stop service time.
    pub service_time: f64,
    /// Handoff time added when a truck returns to the depot.
    pub depot_handoff_time: f64,
    /// Drone loading time added per trip leg.
    pub drone_load_time: f64,
    /// Maximum drone flight endurance per trip.
    pub drone_endurance: f64,
    /// Maximum items per drone trip.
    pub drone_capacity: usize,
    /// Maximum load a truck may carry at any point of its route.
    pub truck_capacity: f64,
    /// When true, a delivery group whose drone trip would exceed the
    /// endurance bound makes the whole solution evaluate to infinity;
    /// when false the trip is silently dropped.
    pub strict_drone_endurance: bool,
    /// ALNS control values.
    pub alns: AlnsConfig,
}

impl Default for Parameters {
    fn default() -> Self {
        Self {
            num_trucks: 2,
            num_drones: 2,
            truck_speed: 30.0,
            drone_speed: 60.0,
            service_time: 3.0 / 60.0,
            depot_handoff_time: 5.0 / 60.0,
            drone_load_time: 5.0 / 60.0,
            drone_endurance: 90.0 / 60.0,
            drone_capacity: 2,
            truck_capacity: 50.0,
            strict_drone_endurance: false,
            alns: AlnsConfig::default(),
        }
    }
}

impl Parameters {
    pub fn with_fleet(mut self, trucks: usize, drones: usize) -> Self {
        self.num_trucks = trucks;
        self.num_drones = drones;
        self
    }

    pub fn with_speeds(mut self, truck: f64, drone: f64) -> Self {
        self.truck_speed = truck;
        self.drone_speed = drone;
        self
    }

    pub fn with_strict_drone_endurance(mut self, strict: bool) -> Self {
        self.strict_drone_endurance = strict;
        self
    }

    pub fn with_alns(mut self, alns: AlnsConfig) -> Self {
        self.alns = alns;
        self
    }

    /// Validates the physical constants.
    pub fn validate(&self) -> Result<(), String> {
        if self.num_trucks == 0 {
            return Err("num_trucks must be positive".into());
        }
        if self.truck_speed <= 0.0 || self.drone_speed <= 0.0 {
            return Err("speeds must be positive".into());
        }
        if self.drone_capacity == 0 {
            return Err("drone_capacity must be positive".into());
        }
        if self.truck_capacity <= 0.0 {
            return Err("truck_capacity must be positive".into());
        }
        self.alns.validate()
    }
}
