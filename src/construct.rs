//! Initial solution construction.
//!
//! Delivery customers and pickup/dropoff pairs are shuffled and dealt
//! round-robin across trucks, then every route is reordered by nearest
//! neighbor from the depot, skipping a dropoff while its pickup is
//! still unvisited. Customers with earlier ready times get a small
//! distance bonus as a tie-breaker.

use crate::eval::evaluate_solution;
use crate::model::{CustomerKind, Instance, Parameters};
use crate::solution::Solution;
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::HashSet;
use std::sync::Arc;

const READY_TIME_PENALTY: f64 = 0.01;

/// Builds and evaluates a feasible starting assignment.
pub fn initial_solution<R: Rng>(
    instance: &Arc<Instance>,
    params: &Arc<Parameters>,
    rng: &mut R,
) -> Solution {
    let mut sol = Solution::new(Arc::clone(instance), Arc::clone(params));

    let mut deliveries: Vec<usize> = instance
        .customers()
        .filter(|c| c.kind == CustomerKind::Delivery)
        .map(|c| c.id)
        .collect();
    let mut pairs = instance.pd_pairs();

    // customers outside the canonical sets (unmatched pickups/dropoffs)
    // still have to be placed so every customer is served once
    let paired: HashSet<usize> = pairs.iter().flat_map(|&(p, d)| [p, d]).collect();
    deliveries.extend(
        instance
            .customers()
            .filter(|c| {
                matches!(c.kind, CustomerKind::Pickup | CustomerKind::Dropoff)
                    && !paired.contains(&c.id)
            })
            .map(|c| c.id),
    );

    deliveries.shuffle(rng);
    for (i, id) in deliveries.into_iter().enumerate() {
        sol.truck_routes[i % params.num_trucks].push(id);
    }

    pairs.shuffle(rng);
    for (i, (pickup, dropoff)) in pairs.into_iter().enumerate() {
        let route = &mut sol.truck_routes[i % params.num_trucks];
        route.push(pickup);
        route.push(dropoff);
    }

    for route in &mut sol.truck_routes {
        if !route.is_empty() {
            *route = nearest_neighbor_order(route, instance);
        }
    }

    sol.makespan = evaluate_solution(&mut sol);
    sol
}

/// Reorders a route greedily by distance from the current position,
/// keeping every dropoff behind its pickup.
fn nearest_neighbor_order(route: &[usize], instance: &Instance) -> Vec<usize> {
    if route.len() <= 1 {
        return route.to_vec();
    }

    let mut ordered = Vec::with_capacity(route.len());
    let mut unvisited: Vec<usize> = route.to_vec();
    let mut current = 0usize;

    while !unvisited.is_empty() {
        let mut nearest = None;
        let mut min_dist = f64::INFINITY;

        for (idx, &id) in unvisited.iter().enumerate() {
            let cust = instance.node(id);

            if cust.kind == CustomerKind::Dropoff {
                if let Some(pickup) = instance.pickup_of(id) {
                    if unvisited.contains(&pickup) {
                        continue;
                    }
                }
            }

            let mut dist = instance.manhattan(current, id);
            if cust.kind.waits_for_ready_time() {
                dist += cust.ready_time * READY_TIME_PENALTY;
            }
            if dist < min_dist {
                min_dist = dist;
                nearest = Some(idx);
            }
        }

        // every candidate blocked can only mean a malformed pairing;
        // fall back to the first remaining customer
        let idx = nearest.unwrap_or(0);
        let next = unvisited.remove(idx);
        ordered.push(next);
        current = next;
    }

    ordered
}
