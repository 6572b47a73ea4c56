// Markov chain for melodic guidance.
//
// States are scale degrees; each state maps to a weighted list of successor
// degrees counted from a small hand-authored corpus of degree sequences.
// The chain is built once and is read-only afterwards, so one instance can
// be shared across threads behind an `Arc` without locking.

use std::collections::BTreeMap;

use rand::Rng;

/// Hand-authored training phrases, as scale degrees (0 = root)
const TRAINING_CORPUS: &[&[u8]] = &[
    // stepwise ascent and return
    &[0, 1, 2, 3, 4, 3, 2, 1, 0],
    // arpeggio outline
    &[0, 2, 4, 2, 0, 4, 2, 0],
    // descending answer from the fifth
    &[4, 3, 2, 1, 0],
    // neighbor-tone figure around the third
    &[2, 3, 2, 1, 2, 3, 4],
    // leap to the sixth with stepwise recovery
    &[0, 5, 4, 3, 2, 1, 0],
    // upper-register turn
    &[4, 5, 6, 5, 4, 2, 0],
];

/// Weighted successor list: (next degree, count)
pub type Successors = Vec<(u8, u32)>;

/// Degree-to-successor transition table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkovChain {
    transitions: BTreeMap<u8, Successors>,
}

impl MarkovChain {
    /// Train on the built-in corpus
    pub fn trained() -> Self {
        Self::from_sequences(TRAINING_CORPUS)
    }

    /// Count adjacent-degree transitions in the given sequences
    pub fn from_sequences(sequences: &[&[u8]]) -> Self {
        let mut counts: BTreeMap<u8, BTreeMap<u8, u32>> = BTreeMap::new();
        for sequence in sequences {
            for pair in sequence.windows(2) {
                *counts
                    .entry(pair[0])
                    .or_default()
                    .entry(pair[1])
                    .or_insert(0) += 1;
            }
        }

        let transitions = counts
            .into_iter()
            .map(|(state, successors)| (state, successors.into_iter().collect()))
            .collect();

        Self { transitions }
    }

    /// Successors of a state, if the corpus ever left it
    pub fn successors(&self, state: u8) -> Option<&Successors> {
        self.transitions.get(&state)
    }

    /// Number of states with at least one outgoing transition
    pub fn state_count(&self) -> usize {
        self.transitions.len()
    }

    /// Draw the next degree with probability proportional to its count
    ///
    /// Returns `None` for a state with no recorded successors.
    pub fn next<R: Rng + ?Sized>(&self, state: u8, rng: &mut R) -> Option<u8> {
        let successors = self.transitions.get(&state)?;
        let total: u32 = successors.iter().map(|&(_, weight)| weight).sum();
        if total == 0 {
            return None;
        }

        let mut target = rng.gen_range(0..total);
        for &(degree, weight) in successors {
            if target < weight {
                return Some(degree);
            }
            target -= weight;
        }

        successors.last().map(|&(degree, _)| degree)
    }
}
