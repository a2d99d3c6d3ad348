use serde::{Deserialize, Serialize};

/// The reduction computed by workers over a chunk.
///
/// `apply` (per chunk) and `combine` (over per-chunk majorities) must agree:
/// the round result is only meaningful when the fold over chunk results
/// equals the reduction over the whole array.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Reduction {
    #[default]
    Max,
}

impl Reduction {
    /// Reduce one chunk to its answer.
    pub fn apply(&self, values: &[i64]) -> i64 {
        match self {
            Reduction::Max => values.iter().copied().max().unwrap_or(i64::MIN),
        }
    }

    /// Fold per-chunk majority answers into the round result.
    pub fn combine(&self, majorities: &[i64]) -> i64 {
        match self {
            Reduction::Max => majorities.iter().copied().max().unwrap_or(i64::MIN),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_max_apply() {
        assert_eq!(Reduction::Max.apply(&[3, 9, 1]), 9);
    }

    #[test]
    fn test_max_combine_matches_whole_array() {
        let source = [4i64, 17, 2, 8, 5, 42];
        let left = Reduction::Max.apply(&source[..3]);
        let right = Reduction::Max.apply(&source[3..]);
        assert_eq!(
            Reduction::Max.combine(&[left, right]),
            Reduction::Max.apply(&source)
        );
    }

    #[test]
    fn test_combine_example() {
        assert_eq!(Reduction::Max.combine(&[42, 57]), 57);
    }
}
