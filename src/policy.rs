use ndarray::{Array1, Array2, ArrayView1};
use rand::seq::SliceRandom;
use rand::Rng;

use crate::q_table::QTable;
use crate::utils::categorical_sample;

/// Actions whose value equals the row maximum exactly.
///
/// NaN entries never compare equal, so a row made only of NaN yields every
/// action as a candidate.
pub fn greedy_candidates(row: ArrayView1<f64>) -> Vec<usize> {
    let max: f64 = row.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let best: Vec<usize> = row
        .iter()
        .enumerate()
        .filter(|(_, v)| **v == max)
        .map(|(a, _)| a)
        .collect();
    if best.is_empty() {
        (0..row.len()).collect()
    } else {
        best
    }
}

/// Epsilon-greedy distribution for one row of action values.
///
/// The greedy action is drawn uniformly from the tied maxima using `rng`, and
/// gets `1 - epsilon + epsilon / A`; every other action gets `epsilon / A`.
pub fn derive_row<R: Rng + ?Sized>(
    row: ArrayView1<f64>,
    epsilon: f64,
    rng: &mut R,
) -> Array1<f64> {
    let action_count: usize = row.len();
    let floor: f64 = epsilon / action_count as f64;
    let mut probs: Array1<f64> = Array1::from_elem(action_count, floor);
    if let Some(greedy) = greedy_candidates(row).choose(rng) {
        probs[*greedy] = 1.0 - epsilon + floor;
    }
    probs
}

/// Action probabilities per state, derived from a [`QTable`].
///
/// Rows start uniform and are only recomputed one at a time, right after the
/// matching Q row changes.
#[derive(Debug, Clone)]
pub struct PolicyTable {
    probs: Array2<f64>,
    epsilon: f64,
}

impl PolicyTable {
    pub fn new(num_states: usize, num_actions: usize, epsilon: f64) -> Self {
        Self {
            probs: Array2::from_elem((num_states, num_actions), 1.0 / num_actions as f64),
            epsilon,
        }
    }

    pub fn row(&self, state: usize) -> ArrayView1<'_, f64> {
        self.probs.row(state)
    }

    pub fn probs(&self) -> &Array2<f64> {
        &self.probs
    }

    pub fn derive<R: Rng + ?Sized>(&mut self, state: usize, q_table: &QTable, rng: &mut R) {
        let row: Array1<f64> = derive_row(q_table.row(state), self.epsilon, rng);
        self.probs.row_mut(state).assign(&row);
    }

    pub fn sample<R: Rng + ?Sized>(&self, state: usize, rng: &mut R) -> usize {
        let random: f64 = rng.gen();
        categorical_sample(self.probs.row(state), random)
    }
}
