//! Repair operators: greedy and regret-2 insertion.
//!
//! Insertion positions are sampled rather than exhaustively enumerated:
//! route start, route end, and a handful of evenly spaced interior
//! slots. A candidate position counts only if the resulting route passes
//! the feasibility check; among passing candidates the one with the
//! lowest route completion time wins.

use super::types::{units_from_removed, RepairOperator, Unit};
use crate::eval::{evaluate_solution, truck_completion_time};
use crate::solution::Solution;
use rand::Rng;

/// Sampled position caps for greedy insertion.
const MAX_SINGLE_POSITIONS: usize = 50;
const MAX_PICKUP_POSITIONS: usize = 20;
const MAX_DROPOFF_POSITIONS: usize = 10;

/// Tighter caps used while computing regret values.
const REGRET_SINGLE_POSITIONS: usize = 15;
const REGRET_PICKUP_POSITIONS: usize = 5;
const REGRET_DROPOFF_POSITIONS: usize = 3;

/// Units evaluated per regret step when many remain.
const REGRET_CANDIDATE_CAP: usize = 20;

fn sampled_positions(len: usize, spread: usize, cap: usize) -> Vec<usize> {
    let mut positions = vec![0, len];
    if len >= 2 {
        let step = (len / spread.min(len)).max(1);
        positions.extend((step..len).step_by(step));
    }
    positions.sort_unstable();
    positions.dedup();
    positions.truncate(cap);
    positions
}

fn dropoff_positions(len: usize, p_pos: usize, cap: usize) -> Vec<usize> {
    // `p_pos` itself splices the dropoff right behind the pickup, the
    // tightest placement a capacity-bound route may need
    let mut positions = vec![p_pos, p_pos + 1, len + 1];
    if len - p_pos > 2 {
        positions.push(p_pos + (len - p_pos) / 2);
    }
    positions.sort_unstable();
    positions.dedup();
    positions.truncate(cap);
    positions
}

fn insert_single(route: &[usize], pos: usize, id: usize) -> Vec<usize> {
    let mut out = Vec::with_capacity(route.len() + 1);
    out.extend_from_slice(&route[..pos]);
    out.push(id);
    out.extend_from_slice(&route[pos..]);
    out
}

/// Splices a pickup at `p_pos` and its dropoff after the original
/// element index `dl_pos` (which may point one past the route end).
fn insert_pair(route: &[usize], p_pos: usize, dl_pos: usize, pickup: usize, dropoff: usize) -> Vec<usize> {
    let cut = dl_pos.min(route.len());
    let mut out = Vec::with_capacity(route.len() + 2);
    out.extend_from_slice(&route[..p_pos]);
    out.push(pickup);
    out.extend_from_slice(&route[p_pos..cut]);
    out.push(dropoff);
    out.extend_from_slice(&route[cut..]);
    out
}

/// One feasible placement of a unit: cost, truck and the resulting route.
struct Placement {
    cost: f64,
    truck: usize,
    route: Vec<usize>,
}

/// Collects feasible sampled placements for a unit across all trucks.
fn feasible_placements(
    solution: &Solution,
    unit: &Unit,
    single_cap: usize,
    pickup_cap: usize,
    dropoff_cap: usize,
) -> Vec<Placement> {
    let mut placements = Vec::new();
    for (truck, route) in solution.truck_routes.iter().enumerate() {
        match *unit {
            Unit::Single(id) => {
                for pos in sampled_positions(route.len(), 10, single_cap) {
                    let candidate = insert_single(route, pos, id);
                    if solution.check_route(&candidate) {
                        placements.push(Placement {
                            cost: truck_completion_time(solution, &candidate),
                            truck,
                            route: candidate,
                        });
                    }
                }
            }
            Unit::Pair { pickup, dropoff } => {
                for p_pos in sampled_positions(route.len(), 5, pickup_cap) {
                    for dl_pos in dropoff_positions(route.len(), p_pos, dropoff_cap) {
                        let candidate = insert_pair(route, p_pos, dl_pos, pickup, dropoff);
                        if solution.check_route(&candidate) {
                            placements.push(Placement {
                                cost: truck_completion_time(solution, &candidate),
                                truck,
                                route: candidate,
                            });
                        }
                    }
                }
            }
        }
    }
    placements
}

fn best_placement(placements: Vec<Placement>) -> Option<Placement> {
    placements
        .into_iter()
        .min_by(|a, b| a.cost.partial_cmp(&b.cost).unwrap_or(std::cmp::Ordering::Equal))
}

/// Appends the unit to truck 0 when no feasible placement exists. The
/// infeasibility surfaces as an infinite makespan on the next
/// evaluation instead of a hard error.
fn append_fallback(solution: &mut Solution, unit: &Unit) {
    solution.truck_routes[0].extend(unit.ids());
}

/// Inserts units in removal order, each at its best feasible sampled
/// position.
pub struct GreedyInsertion;

impl RepairOperator for GreedyInsertion {
    fn name(&self) -> &str {
        "greedy_insertion"
    }

    fn repair<R: Rng>(&self, solution: &Solution, removed: &[usize], _rng: &mut R) -> Solution {
        let mut sol = solution.clone();
        let units = units_from_removed(sol.instance(), removed);

        for unit in &units {
            let placements = feasible_placements(
                &sol,
                unit,
                MAX_SINGLE_POSITIONS,
                MAX_PICKUP_POSITIONS,
                MAX_DROPOFF_POSITIONS,
            );
            match best_placement(placements) {
                Some(p) => sol.truck_routes[p.truck] = p.route,
                None => append_fallback(&mut sol, unit),
            }
        }

        sol.makespan = evaluate_solution(&mut sol);
        sol
    }
}

/// Regret-2 insertion: at each step the unit with the largest gap
/// between its best and second-best placement cost is inserted first.
///
/// When many units remain, only the 20 with the earliest minimum ready
/// time are evaluated per step to bound the cost of a step.
pub struct RegretInsertion;

impl RepairOperator for RegretInsertion {
    fn name(&self) -> &str {
        "regret_insertion"
    }

    fn repair<R: Rng>(&self, solution: &Solution, removed: &[usize], _rng: &mut R) -> Solution {
        let mut sol = solution.clone();
        let mut units = units_from_removed(sol.instance(), removed);

        while !units.is_empty() {
            let candidates = regret_candidates(&sol, &units);

            let mut best: Option<(usize, Placement)> = None;
            let mut best_regret = f64::NEG_INFINITY;

            for &unit_idx in &candidates {
                let mut placements = feasible_placements(
                    &sol,
                    &units[unit_idx],
                    REGRET_SINGLE_POSITIONS,
                    REGRET_PICKUP_POSITIONS,
                    REGRET_DROPOFF_POSITIONS,
                );
                placements.sort_by(|a, b| {
                    a.cost.partial_cmp(&b.cost).unwrap_or(std::cmp::Ordering::Equal)
                });

                if placements.len() >= 2 {
                    let regret = placements[1].cost - placements[0].cost;
                    if regret > best_regret {
                        best_regret = regret;
                        best = Some((unit_idx, placements.swap_remove(0)));
                    }
                } else if placements.len() == 1 && best_regret < 0.0 {
                    best_regret = 0.0;
                    best = Some((unit_idx, placements.swap_remove(0)));
                }
            }

            match best {
                Some((unit_idx, placement)) => {
                    sol.truck_routes[placement.truck] = placement.route;
                    units.remove(unit_idx);
                }
                None => {
                    // nothing placeable this step; defer the infeasibility
                    let unit = units.remove(0);
                    append_fallback(&mut sol, &unit);
                }
            }
        }

        sol.makespan = evaluate_solution(&mut sol);
        sol
    }
}

/// Indices of the units evaluated in one regret step: all of them, or
/// the `REGRET_CANDIDATE_CAP` with the earliest minimum ready time.
fn regret_candidates(solution: &Solution, units: &[Unit]) -> Vec<usize> {
    if units.len() <= REGRET_CANDIDATE_CAP {
        return (0..units.len()).collect();
    }
    let instance = solution.instance();
    let min_ready = |unit: &Unit| -> f64 {
        unit.ids()
            .iter()
            .map(|&id| instance.node(id).ready_time)
            .fold(f64::INFINITY, f64::min)
    };
    let mut indices: Vec<usize> = (0..units.len()).collect();
    indices.sort_by(|&a, &b| {
        min_ready(&units[a])
            .partial_cmp(&min_ready(&units[b]))
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    indices.truncate(REGRET_CANDIDATE_CAP);
    indices
}

/// Enum dispatch over the repair portfolio.
pub enum RepairOp {
    Greedy(GreedyInsertion),
    Regret(RegretInsertion),
}

impl RepairOperator for RepairOp {
    fn name(&self) -> &str {
        match self {
            RepairOp::Greedy(op) => op.name(),
            RepairOp::Regret(op) => op.name(),
        }
    }

    fn repair<R: Rng>(&self, solution: &Solution, removed: &[usize], rng: &mut R) -> Solution {
        match self {
            RepairOp::Greedy(op) => op.repair(solution, removed, rng),
            RepairOp::Regret(op) => op.repair(solution, removed, rng),
        }
    }
}
