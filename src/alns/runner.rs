//! ALNS execution loop.

use super::config::AlnsConfig;
use super::destroy::{DestroyOp, RandomRemoval, RelatedRemoval, WorstRemoval};
use super::repair::{GreedyInsertion, RegretInsertion, RepairOp};
use super::types::{DestroyOperator, RepairOperator};
use crate::construct;
use crate::model::{Instance, Parameters};
use crate::solution::Solution;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Arc;

/// Non-improving iterations after which the destroy rate is boosted.
const INTENSITY_BOOST_THRESHOLD: usize = 50;
/// Every this many non-improving iterations the destroy rate decays.
const INTENSITY_DECAY_INTERVAL: usize = 20;
/// Weight vectors are rebalanced on this iteration interval.
const WEIGHT_REBALANCE_INTERVAL: usize = 100;
/// A weight vector is rescaled once its sum exceeds this bound.
const WEIGHT_SUM_LIMIT: f64 = 100.0;
/// Non-improving iterations that trigger a restart from the best.
const RESTART_THRESHOLD: usize = 200;
/// Temperature factor applied on restart.
const RESTART_TEMPERATURE_FACTOR: f64 = 0.5;

/// Result of an ALNS optimization run.
#[derive(Debug, Clone)]
pub struct AlnsResult {
    /// The best solution found.
    pub best: Solution,

    /// Makespan of the best solution.
    pub best_makespan: f64,

    /// Iterations actually executed.
    pub iterations: usize,

    /// Number of new global bests found.
    pub improvements: usize,

    /// Number of stagnation restarts.
    pub restarts: usize,

    /// Final temperature.
    pub final_temperature: f64,

    /// Final destroy operator weights (random, worst, related).
    pub destroy_weights: Vec<f64>,

    /// Final repair operator weights (greedy, regret).
    pub repair_weights: Vec<f64>,

    /// Best makespan sampled at regular intervals.
    pub makespan_history: Vec<f64>,
}

/// Selects an index by roulette wheel over the weight vector.
fn weighted_select<R: Rng>(weights: &[f64], rng: &mut R) -> usize {
    let total: f64 = weights.iter().sum();
    if total <= 0.0 || weights.is_empty() {
        return 0;
    }
    let mut roll = rng.random_range(0.0..total);
    for (i, &w) in weights.iter().enumerate() {
        roll -= w;
        if roll <= 0.0 {
            return i;
        }
    }
    weights.len() - 1
}

/// Rescales a weight vector back to sum = len once its sum exceeds the
/// growth bound, preserving relative operator preference.
fn rebalance(weights: &mut [f64]) {
    let sum: f64 = weights.iter().sum();
    if sum > WEIGHT_SUM_LIMIT {
        let scale = weights.len() as f64 / sum;
        for w in weights.iter_mut() {
            *w *= scale;
        }
    }
}

/// Executes the ALNS loop.
pub struct AlnsRunner;

impl AlnsRunner {
    /// Runs the solver: builds an initial solution, then iterates the
    /// destroy → repair → accept/reject loop until the iteration budget
    /// is exhausted or the early-termination target is reached.
    ///
    /// The whole run is deterministic for a fixed `AlnsConfig::seed`.
    pub fn run(instance: &Arc<Instance>, params: &Arc<Parameters>) -> AlnsResult {
        let config = &params.alns;
        params.validate().expect("invalid Parameters");

        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::seed_from_u64(rand::random()),
        };

        let destroy_ops = [
            DestroyOp::Random(RandomRemoval),
            DestroyOp::Worst(WorstRemoval),
            DestroyOp::Related(RelatedRemoval),
        ];
        let repair_ops = [
            RepairOp::Greedy(GreedyInsertion),
            RepairOp::Regret(RegretInsertion),
        ];

        let mut destroy_weights = vec![1.0; destroy_ops.len()];
        let mut repair_weights = vec![1.0; repair_ops.len()];

        let mut current = construct::initial_solution(instance, params, &mut rng);
        let mut best = current.clone();

        let num_customers = instance.num_customers();
        let mut temperature = config.initial_temperature;
        let mut destroy_rate = config.destroy_rate;
        let mut stagnation = 0usize;
        let mut improvements = 0usize;
        let mut restarts = 0usize;
        let mut iterations = 0usize;

        let mut makespan_history = vec![best.makespan];

        for iteration in 0..config.max_iterations {
            iterations = iteration + 1;

            // Adapt destroy intensity to the length of the drought.
            if stagnation > INTENSITY_BOOST_THRESHOLD {
                destroy_rate = (destroy_rate * 1.1).min(config.max_destroy_rate);
            } else if stagnation > 0 && stagnation % INTENSITY_DECAY_INTERVAL == 0 {
                destroy_rate = (destroy_rate * 0.9).max(config.min_destroy_rate);
            }

            let d_idx = weighted_select(&destroy_weights, &mut rng);
            let r_idx = weighted_select(&repair_weights, &mut rng);

            let q = ((num_customers as f64 * destroy_rate).round() as usize).max(1);

            let (destroyed, removed) = destroy_ops[d_idx].destroy(&current, q, &mut rng);
            let candidate = repair_ops[r_idx].repair(&destroyed, &removed, &mut rng);

            let delta = candidate.makespan - current.makespan;
            if delta < 0.0 {
                if candidate.makespan < best.makespan {
                    best = candidate.clone();
                    improvements += 1;
                    stagnation = 0;
                } else {
                    stagnation += 1;
                }
                current = candidate;
                destroy_weights[d_idx] += config.scores[0];
                repair_weights[r_idx] += config.scores[0];
            } else {
                // NaN delta (both infinite) yields a NaN probability,
                // which compares false and rejects
                let accept_probability = if temperature > 0.0 {
                    (-delta / temperature).exp()
                } else {
                    0.0
                };
                if rng.random_range(0.0..1.0) < accept_probability {
                    current = candidate;
                    destroy_weights[d_idx] += config.scores[2];
                    repair_weights[r_idx] += config.scores[2];
                }
                stagnation += 1;
            }

            temperature *= config.cooling_rate;

            if iterations % WEIGHT_REBALANCE_INTERVAL == 0 {
                rebalance(&mut destroy_weights);
                rebalance(&mut repair_weights);
                makespan_history.push(best.makespan);
            }

            if stagnation >= RESTART_THRESHOLD {
                current = best.clone();
                temperature = config.initial_temperature * RESTART_TEMPERATURE_FACTOR;
                destroy_rate = config.destroy_rate;
                stagnation = 0;
                restarts += 1;
            }

            if let Some(target) = config.target_makespan {
                if iterations >= config.min_iterations && best.makespan <= target {
                    break;
                }
            }
        }

        if makespan_history.last() != Some(&best.makespan) {
            makespan_history.push(best.makespan);
        }

        AlnsResult {
            best_makespan: best.makespan,
            best,
            iterations,
            improvements,
            restarts,
            final_temperature: temperature,
            destroy_weights,
            repair_weights,
            makespan_history,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Customer, CustomerKind};

    fn grid_instance(num_deliveries: usize, num_pairs: usize) -> Arc<Instance> {
        let mut customers = Vec::new();
        for i in 0..num_deliveries {
            let x = (i % 5) as f64 * 4.0;
            let y = (i / 5) as f64 * 4.0;
            customers.push(Customer::new(0, x, y, CustomerKind::Delivery, 0.0, 0));
        }
        for p in 0..num_pairs {
            let base = 2.0 * p as f64;
            customers.push(Customer::new(0, base, 15.0, CustomerKind::Pickup, 0.0, p + 1));
            customers.push(Customer::new(
                0,
                base + 3.0,
                18.0,
                CustomerKind::Dropoff,
                0.0,
                p + 1,
            ));
        }
        Arc::new(Instance::new(
            Customer::new(0, 10.0, 10.0, CustomerKind::Depot, 0.0, 0),
            customers,
        ))
    }

    fn short_params(seed: u64, iterations: usize) -> Arc<Parameters> {
        Arc::new(Parameters::default().with_alns(
            AlnsConfig::default()
                .with_max_iterations(iterations)
                .with_seed(seed),
        ))
    }

    #[test]
    fn test_run_produces_feasible_best() {
        let instance = grid_instance(8, 2);
        let params = short_params(42, 300);
        let result = AlnsRunner::run(&instance, &params);
        assert!(result.best.is_feasible());
        assert!(result.best_makespan.is_finite());
        assert_eq!(result.iterations, 300);
        assert_eq!(result.destroy_weights.len(), 3);
        assert_eq!(result.repair_weights.len(), 2);
    }

    #[test]
    fn test_determinism_for_fixed_seed() {
        let instance = grid_instance(8, 2);
        let params = short_params(7, 200);
        let a = AlnsRunner::run(&instance, &params);
        let b = AlnsRunner::run(&instance, &params);
        assert_eq!(a.best_makespan, b.best_makespan);
        assert_eq!(a.best.truck_routes, b.best.truck_routes);
        assert_eq!(a.improvements, b.improvements);
        assert_eq!(a.destroy_weights, b.destroy_weights);
    }

    #[test]
    fn test_best_history_non_increasing() {
        let instance = grid_instance(10, 3);
        let params = short_params(99, 500);
        let result = AlnsRunner::run(&instance, &params);
        for window in result.makespan_history.windows(2) {
            assert!(
                window[1] <= window[0] + 1e-10,
                "best makespan regressed: {} -> {}",
                window[0],
                window[1]
            );
        }
    }

    #[test]
    fn test_best_never_worse_than_initial() {
        let instance = grid_instance(10, 3);
        let params = short_params(5, 400);
        let result = AlnsRunner::run(&instance, &params);
        let initial = result.makespan_history[0];
        assert!(result.best_makespan <= initial + 1e-10);
    }

    #[test]
    fn test_early_termination_on_target() {
        let instance = grid_instance(4, 0);
        let params = Arc::new(Parameters::default().with_alns(
            AlnsConfig::default()
                .with_max_iterations(5000)
                // any feasible schedule beats an infinite target
                .with_target_makespan(f64::MAX, 50)
                .with_seed(1),
        ));
        let result = AlnsRunner::run(&instance, &params);
        assert!(result.iterations >= 50);
        assert!(result.iterations < 5000);
    }

    #[test]
    fn test_weights_stay_bounded() {
        let instance = grid_instance(8, 2);
        let params = short_params(3, 600);
        let result = AlnsRunner::run(&instance, &params);
        // rebalancing keeps sums near the growth bound at most
        let destroy_sum: f64 = result.destroy_weights.iter().sum();
        let repair_sum: f64 = result.repair_weights.iter().sum();
        let per_iter_max = 15.0 * WEIGHT_REBALANCE_INTERVAL as f64;
        assert!(destroy_sum <= WEIGHT_SUM_LIMIT + per_iter_max);
        assert!(repair_sum <= WEIGHT_SUM_LIMIT + per_iter_max);
        assert!(result.destroy_weights.iter().all(|&w| w > 0.0));
    }

    #[test]
    fn test_single_truck_single_customer() {
        let instance = Arc::new(Instance::new(
            Customer::new(0, 0.0, 0.0, CustomerKind::Depot, 0.0, 0),
            vec![Customer::new(1, 3.0, 4.0, CustomerKind::Delivery, 0.0, 0)],
        ));
        let params = Arc::new(
            Parameters::default()
                .with_fleet(1, 1)
                .with_alns(AlnsConfig::default().with_max_iterations(50).with_seed(2)),
        );
        let result = AlnsRunner::run(&instance, &params);
        assert_eq!(result.best.truck_routes[0], vec![1]);
        assert!(result.best_makespan.is_finite());
    }
}
