/// Node identifiers and customer ids fit in a 16-bit signed range; 0 is the depot sentinel.
pub type NodeId = i16;

/// Distances, loads and objective deltas are integral; accumulated objectives
/// use a wider type than a single edge delta needs, to leave headroom for
/// whole-route accumulation.
pub type IntType = i64;

/// Used only for acceptance-rule math (Simulated Annealing temperature decay)
/// and for rounding during instance parsing.
pub type FloatType = f64;

pub const DEPOT: NodeId = 0;
