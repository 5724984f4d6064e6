use std::fs;
use std::path::Path;

use anyhow::{bail, Context as _, Result};

use crate::models::matrix::Matrix;
use crate::models::primitives::{IntType, NodeId};
use crate::models::problem::Problem;

/// Parses the whitespace-separated instance format:
/// `C capacity`, then C demand values (customers 1..=C), then C+1
/// coordinate pairs (depot at 0, customers 1..=C). `C` excludes the depot;
/// one is added internally so that node index 0 is always the depot.
pub fn parse_instance_file(path: &Path) -> Result<Problem> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read instance file {}", path.display()))?;
    parse_instance_str(&text).with_context(|| format!("malformed instance file {}", path.display()))
}

fn parse_instance_str(text: &str) -> Result<Problem> {
    let mut tokens = text.split_ascii_whitespace();

    let num_customers_raw: usize = next_token(&mut tokens, "customer count")?;
    let capacity: IntType = next_token(&mut tokens, "capacity")?;
    let num_customers = num_customers_raw + 1;

    let mut demands = vec![0 as IntType; num_customers];
    for i in 1..num_customers {
        demands[i] = next_token(&mut tokens, "demand value")?;
    }

    let mut xs = vec![0.0_f64; num_customers];
    let mut ys = vec![0.0_f64; num_customers];
    for i in 0..num_customers {
        xs[i] = next_token(&mut tokens, "x coordinate")?;
        ys[i] = next_token(&mut tokens, "y coordinate")?;
    }

    if num_customers > NodeId::MAX as usize + 1 {
        bail!("instance has more customers than a 16-bit node id can address");
    }

    let mut distance_matrix = Matrix::<IntType>::new(num_customers, num_customers);
    for i in 0..num_customers {
        for j in 0..num_customers {
            let dx = xs[i] - xs[j];
            let dy = ys[i] - ys[j];
            distance_matrix.set(i, j, round_half_away_from_zero(dx.hypot(dy)));
        }
    }

    Ok(Problem::new(
        num_customers as NodeId,
        capacity,
        demands,
        distance_matrix,
    ))
}

/// Equivalent to C's `lround`: rounds half away from zero rather than the
/// banker's rounding `f64::round_ties_even` would give.
fn round_half_away_from_zero(value: f64) -> IntType {
    value.round() as IntType
}

fn next_token<T: std::str::FromStr>(
    tokens: &mut std::str::SplitAsciiWhitespace,
    what: &str,
) -> Result<T> {
    let raw = tokens
        .next()
        .with_context(|| format!("missing {what}"))?;
    raw.parse::<T>()
        .map_err(|_| anyhow::anyhow!("failed to parse {what} from '{raw}'"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_minimal_instance() {
        let text = "2 10\n3 4\n0 0\n1 0\n0 1\n";
        let problem = parse_instance_str(text).unwrap();
        assert_eq!(problem.num_customers, 3);
        assert_eq!(problem.capacity, 10);
        assert_eq!(problem.demands, vec![0, 3, 4]);
        assert_eq!(problem.distance(0, 1), 1);
        assert_eq!(problem.distance(0, 2), 1);
        assert_eq!(problem.distance(1, 2), 1);
    }

    #[test]
    fn rejects_truncated_instance() {
        let text = "2 10\n3\n";
        assert!(parse_instance_str(text).is_err());
    }

    #[test]
    fn rounds_half_away_from_zero() {
        assert_eq!(round_half_away_from_zero(2.5), 3);
        assert_eq!(round_half_away_from_zero(-2.5), -3);
    }
}
