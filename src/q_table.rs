use ndarray::{Array2, ArrayView1};

/// Action value estimates for every (state, action) pair, zero initialized.
///
/// The table lives for the whole run; nothing resets it between episodes.
#[derive(Debug, Clone)]
pub struct QTable {
    values: Array2<f64>,
    learning_rate: f64,
    discount_factor: f64,
}

impl QTable {
    pub fn new(
        num_states: usize,
        num_actions: usize,
        learning_rate: f64,
        discount_factor: f64,
    ) -> Self {
        Self {
            values: Array2::zeros((num_states, num_actions)),
            learning_rate,
            discount_factor,
        }
    }

    pub fn num_states(&self) -> usize {
        self.values.nrows()
    }

    pub fn num_actions(&self) -> usize {
        self.values.ncols()
    }

    pub fn get(&self, state: usize, action: usize) -> f64 {
        self.values[[state, action]]
    }

    pub fn row(&self, state: usize) -> ArrayView1<'_, f64> {
        self.values.row(state)
    }

    pub fn values(&self) -> &Array2<f64> {
        &self.values
    }

    /// `reward + gamma * Q(next_state, next_action)`, where `next_action` is
    /// the action the behaviour policy actually picked.
    pub fn td_target(&self, reward: f64, next_state: usize, next_action: usize) -> f64 {
        reward + self.discount_factor * self.values[[next_state, next_action]]
    }

    /// Moves `Q(state, action)` a fraction `alpha` of the way to `target` and
    /// returns the temporal difference that drove the step.
    ///
    /// Non-finite targets are written through unchanged.
    pub fn update(&mut self, state: usize, action: usize, target: f64) -> f64 {
        let value = &mut self.values[[state, action]];
        let temporal_difference = target - *value;
        *value += self.learning_rate * temporal_difference;
        temporal_difference
    }

    /// Highest valued action per state, lowest index on ties.
    pub fn greedy_actions(&self) -> Vec<usize> {
        self.values
            .rows()
            .into_iter()
            .map(|row| {
                let mut best = 0;
                for (a, v) in row.iter().enumerate() {
                    if *v > row[best] {
                        best = a;
                    }
                }
                best
            })
            .collect()
    }

    pub fn to_rows(&self) -> Vec<Vec<f64>> {
        self.values.rows().into_iter().map(|r| r.to_vec()).collect()
    }
}
