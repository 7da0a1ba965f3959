//! Route/trip state and the feasibility checker.
//!
//! A [`Solution`] owns one ordered customer sequence per truck (depot
//! implicit at both ends), the scheduled [`DroneTrip`]s and the scalar
//! makespan. Feasibility checks on single routes are memoized per
//! solution, keyed by the literal route sequence, because destroy/repair
//! operators re-probe the same candidate routes many times within one
//! iteration. The memo is never shared: cloning a solution starts with a
//! fresh, empty cache, so stale keys are simply never re-hit.

use crate::model::{CustomerKind, Instance, Parameters};
use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

const LOAD_EPS: f64 = 1e-9;

/// A drone resupply flight from the depot meeting a truck at one of its
/// stops to hand off a batch of delivery orders.
#[derive(Debug, Clone, PartialEq)]
pub struct DroneTrip {
    /// Customer ids resupplied by this trip (≤ drone batch capacity,
    /// all served by the same truck).
    pub items: Vec<usize>,
    /// The truck this trip intercepts.
    pub truck: usize,
    /// The customer node where drone and truck meet.
    pub meet_node: usize,
    /// Departure time from the depot.
    pub depart_time: f64,
    /// Return time back at the depot.
    pub return_time: f64,
    /// Total flight time (out, back, and loading).
    pub flight_time: f64,
}

/// One route assignment for the whole fleet plus the drone schedule.
#[derive(Debug)]
pub struct Solution {
    instance: Arc<Instance>,
    params: Arc<Parameters>,
    /// One customer-id sequence per truck; the depot is implicit at both
    /// ends of every route.
    pub truck_routes: Vec<Vec<usize>>,
    /// Drone trips scheduled by the evaluator.
    pub drone_trips: Vec<DroneTrip>,
    /// Completion time of the whole schedule; infinity until evaluated.
    pub makespan: f64,
    /// Route feasibility memo keyed by the exact route sequence.
    feasibility_cache: RefCell<HashMap<Vec<usize>, bool>>,
}

impl Clone for Solution {
    fn clone(&self) -> Self {
        Self {
            instance: Arc::clone(&self.instance),
            params: Arc::clone(&self.params),
            truck_routes: self.truck_routes.clone(),
            drone_trips: self.drone_trips.clone(),
            makespan: self.makespan,
            // each solution owns its memo; clones start empty
            feasibility_cache: RefCell::new(HashMap::new()),
        }
    }
}

impl Solution {
    /// Creates an empty solution with one empty route per truck.
    pub fn new(instance: Arc<Instance>, params: Arc<Parameters>) -> Self {
        let num_trucks = params.num_trucks;
        Self {
            instance,
            params,
            truck_routes: vec![Vec::new(); num_trucks],
            drone_trips: Vec::new(),
            makespan: f64::INFINITY,
            feasibility_cache: RefCell::new(HashMap::new()),
        }
    }

    pub fn instance(&self) -> &Arc<Instance> {
        &self.instance
    }

    pub fn params(&self) -> &Arc<Parameters> {
        &self.params
    }

    /// Checks a single route for pickup precedence and load feasibility.
    ///
    /// Pure function of the route content given the fixed instance and
    /// parameters; the result is memoized by the literal route sequence.
    ///
    /// Walking from the depot, load grows by the customer weight at a
    /// pickup and shrinks at its paired dropoff. The walk fails if a
    /// dropoff precedes its pickup in the same route, if load ever
    /// exceeds the truck capacity or goes negative, or if the final load
    /// is not exactly zero.
    pub fn check_route(&self, route: &[usize]) -> bool {
        if route.is_empty() {
            return true;
        }
        if let Some(&cached) = self.feasibility_cache.borrow().get(route) {
            return cached;
        }
        let ok = self.walk_route(route);
        self.feasibility_cache.borrow_mut().insert(route.to_vec(), ok);
        ok
    }

    fn walk_route(&self, route: &[usize]) -> bool {
        let inst = &self.instance;
        let mut load = 0.0;
        let mut picked: HashSet<usize> = HashSet::new();

        for &id in route {
            let cust = inst.node(id);
            match cust.kind {
                CustomerKind::Pickup => {
                    picked.insert(cust.pair_id);
                    load += cust.weight;
                }
                CustomerKind::Dropoff => {
                    if !picked.contains(&cust.pair_id) {
                        return false;
                    }
                    load -= cust.weight;
                    if load < -LOAD_EPS {
                        return false;
                    }
                }
                CustomerKind::Delivery => {} // fed by drone resupply, no truck load
                CustomerKind::Depot => return false,
            }
            if load > self.params.truck_capacity + LOAD_EPS {
                return false;
            }
        }

        load.abs() <= LOAD_EPS
    }

    /// Whether every customer is served exactly once and every route is
    /// individually feasible.
    pub fn is_feasible(&self) -> bool {
        let mut served = HashSet::new();
        let mut total = 0usize;
        for route in &self.truck_routes {
            total += route.len();
            served.extend(route.iter().copied());
        }
        if served.len() != total || served.len() != self.instance.num_customers() {
            return false;
        }
        self.truck_routes.iter().all(|route| self.check_route(route))
    }

    /// Total number of customers currently placed on routes.
    pub fn num_served(&self) -> usize {
        self.truck_routes.iter().map(|r| r.len()).sum()
    }
}
