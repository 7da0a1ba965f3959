//! Operator traits and removal units.

use crate::model::{CustomerKind, Instance};
use crate::solution::Solution;
use rand::Rng;
use std::collections::HashSet;

/// A destroy operator removes served customers from a solution.
///
/// Operators never mutate their input; they return a copy with the
/// selected units removed, plus the removed customer ids.
pub trait DestroyOperator {
    /// Returns a human-readable name for this operator.
    fn name(&self) -> &str;

    /// Removes up to `q` customer ids from the solution.
    ///
    /// `q` counts ids, so a pickup/dropoff pair counts as 2. A matched
    /// pair is always removed together, never split.
    fn destroy<R: Rng>(&self, solution: &Solution, q: usize, rng: &mut R)
        -> (Solution, Vec<usize>);
}

/// A repair operator reinserts removed customers into truck routes.
///
/// Units are re-derived from the removed ids via the instance pairing
/// map. The returned solution has its makespan evaluated.
pub trait RepairOperator {
    /// Returns a human-readable name for this operator.
    fn name(&self) -> &str;

    /// Reinserts the removed ids and evaluates the result.
    fn repair<R: Rng>(&self, solution: &Solution, removed: &[usize], rng: &mut R) -> Solution;
}

/// An indivisible removal/insertion group: one delivery customer, or a
/// matched pickup together with its dropoff.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Unit {
    Single(usize),
    Pair { pickup: usize, dropoff: usize },
}

impl Unit {
    /// Customer ids of this unit, pickup first for pairs.
    pub fn ids(&self) -> Vec<usize> {
        match *self {
            Unit::Single(id) => vec![id],
            Unit::Pair { pickup, dropoff } => vec![pickup, dropoff],
        }
    }

    /// Number of customer ids in the unit (1 or 2).
    pub fn num_ids(&self) -> usize {
        match self {
            Unit::Single(_) => 1,
            Unit::Pair { .. } => 2,
        }
    }

    /// Representative id used for distance ranking.
    pub fn primary(&self) -> usize {
        match *self {
            Unit::Single(id) => id,
            Unit::Pair { pickup, .. } => pickup,
        }
    }

    pub fn contains(&self, id: usize) -> bool {
        match *self {
            Unit::Single(s) => s == id,
            Unit::Pair { pickup, dropoff } => pickup == id || dropoff == id,
        }
    }
}

/// Units served along one route, in route order.
///
/// A matched dropoff is folded into its pickup's pair; customers whose
/// partner is missing from the pairing map degrade to singles.
pub(crate) fn route_units(instance: &Instance, route: &[usize]) -> Vec<Unit> {
    let mut units = Vec::new();
    for &id in route {
        match instance.node(id).kind {
            CustomerKind::Delivery => units.push(Unit::Single(id)),
            CustomerKind::Pickup => match instance.dropoff_of(id) {
                Some(dropoff) => units.push(Unit::Pair { pickup: id, dropoff }),
                None => units.push(Unit::Single(id)),
            },
            CustomerKind::Dropoff => {
                if instance.pickup_of(id).is_none() {
                    units.push(Unit::Single(id));
                }
            }
            CustomerKind::Depot => {}
        }
    }
    units
}

/// All units currently served by the solution.
pub(crate) fn service_units(solution: &Solution) -> Vec<Unit> {
    let instance = solution.instance();
    solution
        .truck_routes
        .iter()
        .flat_map(|route| route_units(instance, route))
        .collect()
}

/// Re-derives units from a removed-id list, pairing pickups with their
/// dropoffs when both were removed. Order of first appearance is kept.
pub(crate) fn units_from_removed(instance: &Instance, removed: &[usize]) -> Vec<Unit> {
    let removed_set: HashSet<usize> = removed.iter().copied().collect();
    let mut consumed: HashSet<usize> = HashSet::new();
    let mut units = Vec::new();

    for &id in removed {
        if consumed.contains(&id) {
            continue;
        }
        match instance.node(id).kind {
            CustomerKind::Delivery => units.push(Unit::Single(id)),
            CustomerKind::Pickup => match instance.dropoff_of(id) {
                Some(dropoff) if removed_set.contains(&dropoff) => {
                    consumed.insert(dropoff);
                    units.push(Unit::Pair { pickup: id, dropoff });
                }
                _ => units.push(Unit::Single(id)),
            },
            CustomerKind::Dropoff => match instance.pickup_of(id) {
                Some(pickup) if removed_set.contains(&pickup) => {
                    consumed.insert(pickup);
                    units.push(Unit::Pair { pickup, dropoff: id });
                }
                Some(_) => {} // pickup kept on its route; pair stays intact there
                None => units.push(Unit::Single(id)),
            },
            CustomerKind::Depot => {}
        }
        consumed.insert(id);
    }
    units
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Customer;

    fn pd_instance() -> Instance {
        Instance::new(
            Customer::new(0, 0.0, 0.0, CustomerKind::Depot, 0.0, 0),
            vec![
                Customer::new(1, 1.0, 0.0, CustomerKind::Delivery, 0.0, 0),
                Customer::new(2, 2.0, 0.0, CustomerKind::Pickup, 0.0, 5),
                Customer::new(3, 3.0, 0.0, CustomerKind::Dropoff, 0.0, 5),
            ],
        )
    }

    #[test]
    fn test_route_units_folds_pairs() {
        let inst = pd_instance();
        let units = route_units(&inst, &[1, 2, 3]);
        assert_eq!(
            units,
            vec![Unit::Single(1), Unit::Pair { pickup: 2, dropoff: 3 }]
        );
    }

    #[test]
    fn test_units_from_removed_repairs_pairing() {
        let inst = pd_instance();
        // dropoff listed before its pickup still forms one pair
        let units = units_from_removed(&inst, &[3, 1, 2]);
        assert_eq!(
            units,
            vec![Unit::Pair { pickup: 2, dropoff: 3 }, Unit::Single(1)]
        );
    }

    #[test]
    fn test_units_from_removed_lone_dropoff_skipped() {
        let inst = pd_instance();
        // pickup 2 still on a route somewhere: the dropoff is not a unit
        let units = units_from_removed(&inst, &[3]);
        assert!(units.is_empty());
    }

    #[test]
    fn test_unit_accessors() {
        let pair = Unit::Pair { pickup: 2, dropoff: 3 };
        assert_eq!(pair.ids(), vec![2, 3]);
        assert_eq!(pair.num_ids(), 2);
        assert_eq!(pair.primary(), 2);
        assert!(pair.contains(3));
        assert!(!pair.contains(1));
    }
}
