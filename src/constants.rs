/// Improvement threshold below which a delta is not considered an improving move.
pub const EPSILON: f64 = 1e-6;

/// Upper bound on inner-loop stagnation, independent of instance size.
pub const MAX_STAGNATION_CAP: u64 = 5000;

/// Number of best insertion slots tracked per (route, customer) in the star cache.
pub const STAR_CACHE_SIZE: usize = 3;
