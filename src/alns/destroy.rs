//! Destroy operators: random, worst and related removal.

use super::types::{service_units, DestroyOperator, Unit};
use crate::eval::truck_completion_time;
use crate::solution::Solution;
use rand::Rng;
use std::collections::HashSet;

/// Clones the solution with the given customer ids filtered out of
/// every route.
fn remove_ids(solution: &Solution, ids: &HashSet<usize>) -> Solution {
    let mut out = solution.clone();
    for route in &mut out.truck_routes {
        route.retain(|id| !ids.contains(id));
    }
    out.drone_trips.clear();
    out
}

fn finish(solution: &Solution, removed: Vec<usize>) -> (Solution, Vec<usize>) {
    let set: HashSet<usize> = removed.iter().copied().collect();
    (remove_ids(solution, &set), removed)
}

/// Removes units drawn uniformly at random, with a 50/50 split between
/// the single-delivery pool and the pickup/dropoff-pair pool while both
/// are non-empty.
pub struct RandomRemoval;

impl DestroyOperator for RandomRemoval {
    fn name(&self) -> &str {
        "random_removal"
    }

    fn destroy<R: Rng>(
        &self,
        solution: &Solution,
        q: usize,
        rng: &mut R,
    ) -> (Solution, Vec<usize>) {
        if q == 0 {
            return (solution.clone(), Vec::new());
        }

        let mut singles = Vec::new();
        let mut pairs = Vec::new();
        for unit in service_units(solution) {
            match unit {
                Unit::Single(_) => singles.push(unit),
                Unit::Pair { .. } => pairs.push(unit),
            }
        }

        let mut removed = Vec::new();
        while removed.len() < q && (!singles.is_empty() || !pairs.is_empty()) {
            let from_pairs = if singles.is_empty() {
                true
            } else if pairs.is_empty() {
                false
            } else {
                rng.random_bool(0.5)
            };
            let pool = if from_pairs { &mut pairs } else { &mut singles };
            let unit = pool.swap_remove(rng.random_range(0..pool.len()));
            removed.extend(unit.ids());
        }

        finish(solution, removed)
    }
}

/// Removes the units whose absence shortens their route the most.
///
/// The saving of a unit is the route completion time with the unit
/// minus the completion time without it.
pub struct WorstRemoval;

impl DestroyOperator for WorstRemoval {
    fn name(&self) -> &str {
        "worst_removal"
    }

    fn destroy<R: Rng>(
        &self,
        solution: &Solution,
        q: usize,
        _rng: &mut R,
    ) -> (Solution, Vec<usize>) {
        if q == 0 {
            return (solution.clone(), Vec::new());
        }

        let instance = solution.instance().clone();
        let mut scored: Vec<(f64, Unit)> = Vec::new();
        for route in &solution.truck_routes {
            let base = truck_completion_time(solution, route);
            for unit in super::types::route_units(&instance, route) {
                let stripped: Vec<usize> = route
                    .iter()
                    .copied()
                    .filter(|&id| !unit.contains(id))
                    .collect();
                let saving = base - truck_completion_time(solution, &stripped);
                scored.push((saving, unit));
            }
        }

        scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));

        let mut removed = Vec::new();
        let mut taken: HashSet<usize> = HashSet::new();
        for (_, unit) in scored {
            if removed.len() >= q {
                break;
            }
            if unit.ids().iter().any(|id| taken.contains(id)) {
                continue;
            }
            for id in unit.ids() {
                taken.insert(id);
                removed.push(id);
            }
        }

        finish(solution, removed)
    }
}

/// Removes a random seed unit together with the units closest to it in
/// the Manhattan distance matrix.
pub struct RelatedRemoval;

impl DestroyOperator for RelatedRemoval {
    fn name(&self) -> &str {
        "related_removal"
    }

    fn destroy<R: Rng>(
        &self,
        solution: &Solution,
        q: usize,
        rng: &mut R,
    ) -> (Solution, Vec<usize>) {
        if q == 0 {
            return (solution.clone(), Vec::new());
        }

        let mut units = service_units(solution);
        if units.is_empty() {
            return (solution.clone(), Vec::new());
        }

        let seed = units.swap_remove(rng.random_range(0..units.len()));
        let instance = solution.instance();

        let mut ranked: Vec<(f64, Unit)> = units
            .into_iter()
            .map(|u| (instance.manhattan(seed.primary(), u.primary()), u))
            .collect();
        ranked.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));

        let mut removed = seed.ids();
        for (_, unit) in ranked {
            if removed.len() >= q {
                break;
            }
            removed.extend(unit.ids());
        }

        finish(solution, removed)
    }
}

/// Enum dispatch over the destroy portfolio.
pub enum DestroyOp {
    Random(RandomRemoval),
    Worst(WorstRemoval),
    Related(RelatedRemoval),
}

impl DestroyOperator for DestroyOp {
    fn name(&self) -> &str {
        match self {
            DestroyOp::Random(op) => op.name(),
            DestroyOp::Worst(op) => op.name(),
            DestroyOp::Related(op) => op.name(),
        }
    }

    fn destroy<R: Rng>(
        &self,
        solution: &Solution,
        q: usize,
        rng: &mut R,
    ) -> (Solution, Vec<usize>) {
        match self {
            DestroyOp::Random(op) => op.destroy(solution, q, rng),
            DestroyOp::Worst(op) => op.destroy(solution, q, rng),
            DestroyOp::Related(op) => op.destroy(solution, q, rng),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Customer, CustomerKind, Instance, Parameters};
    use proptest::prelude::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::sync::Arc;

    fn mixed_solution() -> Solution {
        let inst = Arc::new(Instance::new(
            Customer::new(0, 10.0, 10.0, CustomerKind::Depot, 0.0, 0),
            vec![
                Customer::new(1, 0.0, 10.0, CustomerKind::Delivery, 0.0, 0),
                Customer::new(2, 20.0, 10.0, CustomerKind::Delivery, 0.0, 0),
                Customer::new(3, 100.0, 100.0, CustomerKind::Delivery, 0.0, 0),
                Customer::new(4, 0.0, 0.0, CustomerKind::Pickup, 0.0, 1),
                Customer::new(5, 5.0, 0.0, CustomerKind::Dropoff, 0.0, 1),
                Customer::new(6, 15.0, 0.0, CustomerKind::Pickup, 0.0, 2),
                Customer::new(7, 20.0, 0.0, CustomerKind::Dropoff, 0.0, 2),
            ],
        ));
        let params = Arc::new(Parameters::default().with_fleet(2, 2));
        let mut sol = Solution::new(inst, params);
        sol.truck_routes = vec![vec![1, 4, 5, 3], vec![2, 6, 7]];
        sol
    }

    fn assert_pairs_intact(removed: &[usize]) {
        let has = |id: usize| removed.contains(&id);
        assert_eq!(has(4), has(5), "pair 4/5 split: {removed:?}");
        assert_eq!(has(6), has(7), "pair 6/7 split: {removed:?}");
    }

    #[test]
    fn test_zero_q_removes_nothing() {
        let sol = mixed_solution();
        let mut rng = StdRng::seed_from_u64(1);
        for op in [
            DestroyOp::Random(RandomRemoval),
            DestroyOp::Worst(WorstRemoval),
            DestroyOp::Related(RelatedRemoval),
        ] {
            let (out, removed) = op.destroy(&sol, 0, &mut rng);
            assert!(removed.is_empty());
            assert_eq!(out.truck_routes, sol.truck_routes);
        }
    }

    #[test]
    fn test_removed_ids_are_gone_from_routes() {
        let sol = mixed_solution();
        let mut rng = StdRng::seed_from_u64(7);
        let (out, removed) = RandomRemoval.destroy(&sol, 3, &mut rng);
        assert!(!removed.is_empty());
        for id in &removed {
            assert!(!out.truck_routes.iter().any(|r| r.contains(id)));
        }
        assert_eq!(out.num_served() + removed.len(), sol.num_served());
    }

    #[test]
    fn test_random_removal_never_splits_pairs() {
        let sol = mixed_solution();
        for seed in 0..20 {
            let mut rng = StdRng::seed_from_u64(seed);
            let (_, removed) = RandomRemoval.destroy(&sol, 4, &mut rng);
            assert_pairs_intact(&removed);
        }
    }

    #[test]
    fn test_worst_removal_prefers_costly_detour() {
        let sol = mixed_solution();
        let mut rng = StdRng::seed_from_u64(1);
        // customer 3 sits far out at (100, 100); dropping it saves the most
        let (_, removed) = WorstRemoval.destroy(&sol, 1, &mut rng);
        assert_eq!(removed, vec![3]);
    }

    #[test]
    fn test_worst_removal_never_splits_pairs() {
        let sol = mixed_solution();
        let mut rng = StdRng::seed_from_u64(1);
        let (_, removed) = WorstRemoval.destroy(&sol, 5, &mut rng);
        assert_pairs_intact(&removed);
    }

    #[test]
    fn test_related_removal_takes_nearest_to_seed() {
        let sol = mixed_solution();
        for seed in 0..20 {
            let mut rng = StdRng::seed_from_u64(seed);
            let (_, removed) = RelatedRemoval.destroy(&sol, 3, &mut rng);
            assert!(removed.len() >= 3.min(sol.num_served()));
            assert_pairs_intact(&removed);
        }
    }

    #[test]
    fn test_q_larger_than_served_empties_solution() {
        let sol = mixed_solution();
        let mut rng = StdRng::seed_from_u64(3);
        let (out, removed) = RandomRemoval.destroy(&sol, 100, &mut rng);
        assert_eq!(removed.len(), 7);
        assert_eq!(out.num_served(), 0);
    }

    proptest! {
        #[test]
        fn prop_no_operator_splits_a_pair(seed in 0u64..500, q in 0usize..10) {
            let sol = mixed_solution();
            let ops = [
                DestroyOp::Random(RandomRemoval),
                DestroyOp::Worst(WorstRemoval),
                DestroyOp::Related(RelatedRemoval),
            ];
            for op in &ops {
                let mut rng = StdRng::seed_from_u64(seed);
                let (out, removed) = op.destroy(&sol, q, &mut rng);
                assert_pairs_intact(&removed);
                prop_assert_eq!(out.num_served() + removed.len(), sol.num_served());
            }
        }
    }
}
