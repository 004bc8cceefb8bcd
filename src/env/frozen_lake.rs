use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::env::{EnvError, Environment, StepInfo};
use crate::utils::{categorical_sample, inc, to_s};

/// (probability, next state, reward, terminated)
type Transition = (f64, usize, f64, bool);

#[derive(Debug, Clone)]
pub struct FrozenLakeEnv {
    ready: bool,
    closed: bool,
    initial_state_distrib: Vec<f64>,
    probs: Vec<[[Transition; 3]; 4]>,
    player_pos: usize,
    max_steps: u64,
    curr_step: u64,
    ncol: usize,
    map: String,
    rng: StdRng,
}

impl FrozenLakeEnv {
    // default 4x4 map
    pub const MAP_4X4: [&'static str; 4] = ["SFFF", "FHFH", "FFFH", "HFFG"];

    pub const MAP_8X8: [&'static str; 8] = [
        "SFFFFFFF", "FFFFFFFF", "FFFHFFFF", "FFFFFHFF", "FFFHFFFF", "FHHFFFHF", "FHFFHFHF",
        "FFFHFFFG",
    ];

    fn letter(map: &[&str], row: usize, col: usize) -> u8 {
        map[row].as_bytes()[col]
    }

    fn transition(
        map: &[&str],
        nrow: usize,
        ncol: usize,
        row: usize,
        col: usize,
        action: usize,
    ) -> (usize, f64, bool) {
        let (newrow, newcol) = inc(nrow, ncol, row, col, action);
        let newstate: usize = to_s(ncol, newrow, newcol);
        let newletter: u8 = Self::letter(map, newrow, newcol);
        let terminated: bool = newletter == b'G' || newletter == b'H';
        let reward: f64 = if newletter == b'G' { 1.0 } else { 0.0 };
        (newstate, reward, terminated)
    }

    /// Builds the lake from rows of `S`tart, `F`rozen, `H`ole and `G`oal
    /// cells. A slippery lake moves in the intended direction or either
    /// perpendicular one with equal probability.
    pub fn new(map: &[&str], is_slippery: bool, max_steps: u64) -> Self {
        let nrow: usize = map.len();
        let ncol: usize = map[0].len();
        let flat_map: String = map.join("");

        let starts: Vec<usize> = flat_map
            .char_indices()
            .filter(|(_, c)| *c == 'S')
            .map(|(i, _)| i)
            .collect();
        let mut initial_state_distrib: Vec<f64> = vec![0.0; flat_map.len()];
        for i in &starts {
            initial_state_distrib[*i] = 1.0 / starts.len() as f64;
        }

        let mut probs: Vec<[[Transition; 3]; 4]> = vec![[[(0.0, 0, 0.0, false); 3]; 4]; nrow * ncol];
        for row in 0..nrow {
            for col in 0..ncol {
                let s: usize = to_s(ncol, row, col);
                let letter: u8 = Self::letter(map, row, col);
                for a in 0..4 {
                    let li = &mut probs[s][a];
                    if letter == b'G' || letter == b'H' {
                        li[0] = (1.0, s, 0.0, true);
                    } else if is_slippery {
                        for (i, b) in [(a + 3) % 4, a, (a + 1) % 4].iter().enumerate() {
                            let (ns, r, t) = Self::transition(map, nrow, ncol, row, col, *b);
                            li[i] = (1.0 / 3.0, ns, r, t);
                        }
                    } else {
                        let (ns, r, t) = Self::transition(map, nrow, ncol, row, col, a);
                        li[0] = (1.0, ns, r, t);
                    }
                }
            }
        }

        Self {
            ready: false,
            closed: false,
            initial_state_distrib,
            probs,
            player_pos: starts.first().copied().unwrap_or(0),
            max_steps,
            curr_step: 0,
            ncol,
            map: flat_map,
            rng: StdRng::seed_from_u64(0),
        }
    }
}

impl Environment for FrozenLakeEnv {
    fn reset(&mut self) -> Result<usize, EnvError> {
        if self.closed {
            return Err(EnvError::Closed);
        }
        let random: f64 = self.rng.gen();
        self.player_pos = categorical_sample(&self.initial_state_distrib, random);
        self.ready = true;
        self.curr_step = 0;
        Ok(self.player_pos)
    }

    fn step(&mut self, action: usize) -> Result<(usize, f64, bool, StepInfo), EnvError> {
        if !self.ready {
            return Err(EnvError::NotReady);
        }
        if action >= 4 {
            return Err(EnvError::InvalidAction {
                action,
                num_actions: 4,
            });
        }
        self.curr_step += 1;
        let transitions: [Transition; 3] = self.probs[self.player_pos][action];
        let random: f64 = self.rng.gen();
        let i: usize = categorical_sample(transitions.iter().map(|t| &t.0), random);
        let (_p, s, r, terminated) = transitions[i];
        self.player_pos = s;
        let truncated: bool = !terminated && self.curr_step >= self.max_steps;
        if terminated || truncated {
            self.ready = false;
        }
        Ok((s, r, terminated || truncated, StepInfo { truncated }))
    }

    fn seed(&mut self, seed: u64) {
        self.rng = StdRng::seed_from_u64(seed);
    }

    fn close(&mut self) -> Result<(), EnvError> {
        self.ready = false;
        self.closed = true;
        Ok(())
    }

    fn num_states(&self) -> usize {
        self.probs.len()
    }

    fn num_actions(&self) -> usize {
        4
    }

    fn render(&self) -> String {
        let mut out: String = String::with_capacity(self.map.len() * 2);
        for (i, c) in self.map.chars().enumerate() {
            if i > 0 && i % self.ncol == 0 {
                out.push('\n');
            }
            out.push(if i == self.player_pos { '@' } else { c });
        }
        out
    }
}
