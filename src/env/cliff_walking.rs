use crate::env::{EnvError, Environment, StepInfo};
use crate::utils::{inc, to_s};

#[derive(Debug, Clone)]
pub struct CliffWalkingEnv {
    ready: bool,
    closed: bool,
    obs: [[(usize, f64, bool); 4]; 48],
    player_pos: usize,
    max_steps: u64,
    curr_step: u64,
}

impl CliffWalkingEnv {
    const START_POSITION: usize = 36;
    const CLIFF_POSITIONS: [usize; 10] = [37, 38, 39, 40, 41, 42, 43, 44, 45, 46];
    const GOAL_POSITION: usize = 47;
    const MAP: &'static str = "____________\n____________\n____________\n@!!!!!!!!!!G";

    fn transition(row: usize, col: usize, action: usize) -> (usize, f64, bool) {
        let (newrow, newcol) = inc(4, 12, row, col, action);
        let newstate: usize = to_s(12, newrow, newcol);
        let win: bool = newstate == Self::GOAL_POSITION;
        let lose: bool = Self::CLIFF_POSITIONS.contains(&newstate);
        let reward: f64 = if lose { -100.0 } else { -1.0 };
        (newstate, reward, lose || win)
    }

    pub fn new(max_steps: u64) -> Self {
        let mut obs: [[(usize, f64, bool); 4]; 48] = [[(0, 0.0, false); 4]; 48];
        for row in 0..4 {
            for col in 0..12 {
                for a in 0..4 {
                    obs[to_s(12, row, col)][a] = Self::transition(row, col, a);
                }
            }
        }
        Self {
            ready: false,
            closed: false,
            obs,
            player_pos: Self::START_POSITION,
            max_steps,
            curr_step: 0,
        }
    }
}

impl Environment for CliffWalkingEnv {
    fn reset(&mut self) -> Result<usize, EnvError> {
        if self.closed {
            return Err(EnvError::Closed);
        }
        self.player_pos = Self::START_POSITION;
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
        let (pos, reward, terminated) = self.obs[self.player_pos][action];
        self.player_pos = pos;
        let truncated: bool = !terminated && self.curr_step >= self.max_steps;
        if terminated || truncated {
            self.ready = false;
        }
        Ok((pos, reward, terminated || truncated, StepInfo { truncated }))
    }

    // fully deterministic
    fn seed(&mut self, _seed: u64) {}

    fn close(&mut self) -> Result<(), EnvError> {
        self.ready = false;
        self.closed = true;
        Ok(())
    }

    fn num_states(&self) -> usize {
        48
    }

    fn num_actions(&self) -> usize {
        4
    }

    fn render(&self) -> String {
        let mut new_map: String = Self::MAP.to_string();
        new_map.replace_range(39..40, "_");
        let mut pos: usize = self.player_pos;
        for (i, _) in new_map.match_indices('\n') {
            if pos >= i {
                pos += 1;
            }
        }
        new_map.replace_range(pos..pos + 1, "@");
        new_map
    }
}
