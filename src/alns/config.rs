//! ALNS configuration.

/// Control values for the ALNS loop.
///
/// # Scoring
///
/// The selected destroy/repair operator pair is rewarded additively:
/// `scores[0]` when the candidate improves on the current solution and
/// `scores[2]` when a worse candidate is accepted through the annealing
/// criterion. Weight vectors are rebalanced periodically so rewards
/// shift preference without growing unboundedly.
///
/// # Acceptance criterion
///
/// Worse candidates are accepted with probability `exp(-delta /
/// temperature)`. Temperature decays geometrically by `cooling_rate`
/// each iteration and is only reset (to half its initial value) when a
/// stagnation restart fires.
///
/// # Examples
///
/// ```
/// use truck_drone_alns::alns::AlnsConfig;
///
/// let config = AlnsConfig::default()
///     .with_max_iterations(500)
///     .with_temperature(100.0, 0.9975)
///     .with_seed(42);
/// ```
#[derive(Debug, Clone)]
pub struct AlnsConfig {
    /// Iteration budget.
    pub max_iterations: usize,

    /// Initial destroy rate: the fraction of customers removed per
    /// iteration. Restarts reset the adaptive rate to this value.
    pub destroy_rate: f64,

    /// Lower bound of the adaptive destroy rate.
    pub min_destroy_rate: f64,

    /// Upper bound of the adaptive destroy rate.
    pub max_destroy_rate: f64,

    /// Initial temperature for annealing acceptance.
    pub initial_temperature: f64,

    /// Geometric cooling rate, in (0, 1).
    pub cooling_rate: f64,

    /// Operator rewards: `[improvement, reserved, accepted-worse]`.
    pub scores: [f64; 3],

    /// Makespan at which the search may stop early.
    pub target_makespan: Option<f64>,

    /// Iterations that must pass before early termination is considered.
    pub min_iterations: usize,

    /// Random seed for reproducibility.
    pub seed: Option<u64>,
}

impl Default for AlnsConfig {
    fn default() -> Self {
        Self {
            max_iterations: 2000,
            destroy_rate: 0.25,
            min_destroy_rate: 0.2,
            max_destroy_rate: 0.5,
            initial_temperature: 100.0,
            cooling_rate: 0.9975,
            scores: [15.0, 8.0, 2.0],
            target_makespan: None,
            min_iterations: 200,
            seed: None,
        }
    }
}

impl AlnsConfig {
    pub fn with_max_iterations(mut self, n: usize) -> Self {
        self.max_iterations = n;
        self
    }

    pub fn with_destroy_rate(mut self, rate: f64) -> Self {
        self.destroy_rate = rate.clamp(0.0, 1.0);
        self
    }

    pub fn with_destroy_rate_bounds(mut self, min: f64, max: f64) -> Self {
        self.min_destroy_rate = min.clamp(0.0, 1.0);
        self.max_destroy_rate = max.clamp(self.min_destroy_rate, 1.0);
        self
    }

    pub fn with_temperature(mut self, initial: f64, cooling_rate: f64) -> Self {
        self.initial_temperature = initial;
        self.cooling_rate = cooling_rate;
        self
    }

    pub fn with_scores(mut self, scores: [f64; 3]) -> Self {
        self.scores = scores;
        self
    }

    pub fn with_target_makespan(mut self, target: f64, min_iterations: usize) -> Self {
        self.target_makespan = Some(target);
        self.min_iterations = min_iterations;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.max_iterations == 0 {
            return Err("max_iterations must be positive".into());
        }
        if self.destroy_rate <= 0.0 || self.destroy_rate > 1.0 {
            return Err(format!(
                "destroy_rate must be in (0, 1], got {}",
                self.destroy_rate
            ));
        }
        if self.min_destroy_rate <= 0.0 || self.min_destroy_rate > self.max_destroy_rate {
            return Err("destroy rate bounds must satisfy 0 < min <= max".into());
        }
        if self.max_destroy_rate > 1.0 {
            return Err("max_destroy_rate must be at most 1".into());
        }
        if self.cooling_rate <= 0.0 || self.cooling_rate >= 1.0 {
            return Err(format!(
                "cooling_rate must be in (0, 1), got {}",
                self.cooling_rate
            ));
        }
        if self.initial_temperature <= 0.0 {
            return Err("initial_temperature must be positive".into());
        }
        if self.scores.iter().any(|&s| s < 0.0) {
            return Err("scores must be non-negative".into());
        }
        Ok(())
    }
}
