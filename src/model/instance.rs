//! Problem instance: nodes, distances and pickup pairing.

use super::customer::{Customer, CustomerKind};
use std::collections::HashMap;
use std::sync::RwLock;

/// Immutable problem data shared by every solver component.
///
/// Truck travel uses a precomputed symmetric Manhattan distance matrix
/// over depot ∪ customers; drone flight uses Euclidean distances that
/// are computed lazily and cached.
#[derive(Debug)]
pub struct Instance {
    /// All nodes indexed by id: `nodes[0]` is the depot.
    nodes: Vec<Customer>,
    /// Manhattan distances, (n+1)×(n+1).
    dist: Vec<Vec<f64>>,
    /// pickup id → dropoff id, only for matched pairs.
    pd_pairs: HashMap<usize, usize>,
    /// dropoff id → pickup id, the inverse of `pd_pairs`.
    dp_pairs: HashMap<usize, usize>,
    /// Euclidean distance cache keyed by ordered node pair.
    euclid_cache: RwLock<HashMap<(usize, usize), f64>>,
}

impl Instance {
    /// Builds an instance from the depot and the customer list.
    ///
    /// Customers are renumbered 1..=n in the order given; their `id`
    /// fields are rewritten so that ids always index the distance matrix.
    /// Pickups whose pairing id has no matching dropoff stay unmatched
    /// and are absent from the pairing map.
    pub fn new(depot: Customer, customers: Vec<Customer>) -> Self {
        let mut nodes = Vec::with_capacity(customers.len() + 1);
        let mut depot = depot;
        depot.id = 0;
        depot.kind = CustomerKind::Depot;
        nodes.push(depot);
        for (i, mut c) in customers.into_iter().enumerate() {
            c.id = i + 1;
            nodes.push(c);
        }

        let dist = Self::manhattan_matrix(&nodes);
        let (pd_pairs, dp_pairs) = Self::build_pd_pairs(&nodes);

        Self {
            nodes,
            dist,
            pd_pairs,
            dp_pairs,
            euclid_cache: RwLock::new(HashMap::new()),
        }
    }

    fn manhattan_matrix(nodes: &[Customer]) -> Vec<Vec<f64>> {
        let n = nodes.len();
        let mut dist = vec![vec![0.0; n]; n];
        for i in 0..n {
            for j in (i + 1)..n {
                let d = (nodes[i].x - nodes[j].x).abs() + (nodes[i].y - nodes[j].y).abs();
                dist[i][j] = d;
                dist[j][i] = d;
            }
        }
        dist
    }

    fn build_pd_pairs(nodes: &[Customer]) -> (HashMap<usize, usize>, HashMap<usize, usize>) {
        let dropoff_by_pair: HashMap<usize, usize> = nodes
            .iter()
            .filter(|c| c.kind == CustomerKind::Dropoff)
            .map(|c| (c.pair_id, c.id))
            .collect();

        let mut pd = HashMap::new();
        let mut dp = HashMap::new();
        for c in nodes.iter().filter(|c| c.kind == CustomerKind::Pickup) {
            if let Some(&dl_id) = dropoff_by_pair.get(&c.pair_id) {
                pd.insert(c.id, dl_id);
                dp.insert(dl_id, c.id);
            }
        }
        (pd, dp)
    }

    /// Number of customers (excluding the depot).
    pub fn num_customers(&self) -> usize {
        self.nodes.len() - 1
    }

    /// Node lookup by id; id 0 is the depot.
    pub fn node(&self, id: usize) -> &Customer {
        &self.nodes[id]
    }

    /// Iterator over customers in id order (depot excluded).
    pub fn customers(&self) -> impl Iterator<Item = &Customer> {
        self.nodes[1..].iter()
    }

    /// Manhattan distance between two node ids (truck travel).
    pub fn manhattan(&self, i: usize, j: usize) -> f64 {
        self.dist[i][j]
    }

    /// Euclidean distance between two node ids (drone flight), cached.
    pub fn euclidean(&self, i: usize, j: usize) -> f64 {
        let key = if i <= j { (i, j) } else { (j, i) };
        if let Some(&d) = self.euclid_cache.read().expect("euclid cache poisoned").get(&key) {
            return d;
        }
        let (a, b) = (&self.nodes[key.0], &self.nodes[key.1]);
        let d = ((a.x - b.x).powi(2) + (a.y - b.y).powi(2)).sqrt();
        self.euclid_cache
            .write()
            .expect("euclid cache poisoned")
            .insert(key, d);
        d
    }

    /// The dropoff paired with `pickup_id`, if matched.
    pub fn dropoff_of(&self, pickup_id: usize) -> Option<usize> {
        self.pd_pairs.get(&pickup_id).copied()
    }

    /// The pickup paired with `dropoff_id`, if matched.
    pub fn pickup_of(&self, dropoff_id: usize) -> Option<usize> {
        self.dp_pairs.get(&dropoff_id).copied()
    }

    /// All matched (pickup, dropoff) pairs in pickup-id order.
    pub fn pd_pairs(&self) -> Vec<(usize, usize)> {
        let mut pairs: Vec<(usize, usize)> = self.pd_pairs.iter().map(|(&p, &d)| (p, d)).collect();
        pairs.sort_unstable();
        pairs
    }
}
