use crate::CounterPair;
use remex_types::WorkerId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::warn;

/// One round's worth of reputation counters, as published over gossip.
///
/// Ordered by worker id so the canonical encoding is stable; the encoded
/// string doubles as the gossip duplicate-suppression key, so two
/// structurally identical deltas always encode identically.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReputationDelta {
    entries: BTreeMap<WorkerId, CounterPair>,
}

impl ReputationDelta {
    pub fn from_entries(entries: impl IntoIterator<Item = (WorkerId, CounterPair)>) -> Self {
        Self {
            entries: entries.into_iter().collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (WorkerId, CounterPair)> + '_ {
        self.entries.iter().map(|(w, c)| (*w, *c))
    }

    /// Canonical wire form: comma-separated `workerId=correct:trials`.
    pub fn encode(&self) -> String {
        let mut out = String::new();
        for (i, (worker, pair)) in self.entries.iter().enumerate() {
            if i > 0 {
                out.push(',');
            }
            out.push_str(&format!("{}={}:{}", worker.0, pair.correct, pair.trials));
        }
        out
    }

    /// Parse the canonical form, skipping malformed tokens.
    ///
    /// A token missing its `=` or `:` separator, or with a non-numeric
    /// field, is dropped; the rest of the message is still processed.
    pub fn parse(encoded: &str) -> Self {
        let mut entries = BTreeMap::new();
        for token in encoded.split(',').filter(|t| !t.is_empty()) {
            match parse_token(token) {
                Some((worker, pair)) => {
                    entries.insert(worker, pair);
                }
                None => {
                    warn!(token, "Skipping malformed reputation delta token");
                }
            }
        }
        Self { entries }
    }
}

fn parse_token(token: &str) -> Option<(WorkerId, CounterPair)> {
    let (worker, counts) = token.split_once('=')?;
    let (correct, trials) = counts.split_once(':')?;
    Some((
        WorkerId(worker.trim().parse().ok()?),
        CounterPair {
            correct: correct.trim().parse().ok()?,
            trials: trials.trim().parse().ok()?,
        },
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ReputationDelta {
        ReputationDelta::from_entries([
            (WorkerId(0), CounterPair { correct: 2, trials: 3 }),
            (WorkerId(4), CounterPair { correct: 0, trials: 1 }),
        ])
    }

    #[test]
    fn test_encode_is_ordered_and_stable() {
        assert_eq!(sample().encode(), "0=2:3,4=0:1");
    }

    #[test]
    fn test_parse_round_trips_canonical_form() {
        assert_eq!(ReputationDelta::parse("0=2:3,4=0:1"), sample());
    }

    #[test]
    fn test_malformed_tokens_are_skipped() {
        let delta = ReputationDelta::parse("0=2:3,garbage,5=1,4=0:1,=:,7=x:1");
        assert_eq!(delta, sample());
    }

    #[test]
    fn test_empty_string_parses_empty() {
        assert!(ReputationDelta::parse("").is_empty());
    }
}
