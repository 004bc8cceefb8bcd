#![allow(dead_code)]

use std::cell::Cell;
use std::rc::Rc;

use tabular_sarsa::env::{EnvError, Environment, StepInfo};

/// Calls observed by a fixture, shared with the test after the fixture is
/// moved into the runner.
#[derive(Debug, Default)]
pub struct Calls {
    pub resets: Cell<u64>,
    pub steps: Cell<u64>,
    pub seeds: Cell<u64>,
    pub closes: Cell<u64>,
}

impl Calls {
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    pub fn any(&self) -> bool {
        self.resets.get() + self.steps.get() + self.seeds.get() + self.closes.get() > 0
    }
}

fn bump(c: &Cell<u64>) {
    c.set(c.get() + 1);
}

/// Two states, two actions. From state 0, action 0 pays 1 and ends in state
/// 1; action 1 pays 0 and stays in state 0. Every episode is one transition.
pub struct TwoStateEnv {
    pub calls: Rc<Calls>,
    state: usize,
}

impl TwoStateEnv {
    pub fn new(calls: Rc<Calls>) -> Self {
        Self { calls, state: 0 }
    }
}

impl Environment for TwoStateEnv {
    fn reset(&mut self) -> Result<usize, EnvError> {
        bump(&self.calls.resets);
        self.state = 0;
        Ok(0)
    }

    fn step(&mut self, action: usize) -> Result<(usize, f64, bool, StepInfo), EnvError> {
        bump(&self.calls.steps);
        if action == 0 {
            self.state = 1;
            Ok((1, 1.0, true, StepInfo::default()))
        } else {
            Ok((0, 0.0, true, StepInfo::default()))
        }
    }

    fn seed(&mut self, _seed: u64) {
        bump(&self.calls.seeds);
    }

    fn close(&mut self) -> Result<(), EnvError> {
        bump(&self.calls.closes);
        Ok(())
    }

    fn num_states(&self) -> usize {
        2
    }

    fn num_actions(&self) -> usize {
        2
    }

    fn render(&self) -> String {
        format!("{}", self.state)
    }
}

/// Two decisions per episode. In state 0, action 0 pays 1 and action 1 pays
/// 0, both moving to state 1. In state 1, action 1 pays 10 and action 0 pays
/// 0, and the episode ends.
pub struct TwoDecisionEnv {
    state: usize,
}

impl TwoDecisionEnv {
    pub fn new() -> Self {
        Self { state: 0 }
    }
}

impl Environment for TwoDecisionEnv {
    fn reset(&mut self) -> Result<usize, EnvError> {
        self.state = 0;
        Ok(0)
    }

    fn step(&mut self, action: usize) -> Result<(usize, f64, bool, StepInfo), EnvError> {
        if self.state == 0 {
            self.state = 1;
            let reward = if action == 0 { 1.0 } else { 0.0 };
            Ok((1, reward, false, StepInfo::default()))
        } else {
            let reward = if action == 1 { 10.0 } else { 0.0 };
            Ok((1, reward, true, StepInfo::default()))
        }
    }

    fn seed(&mut self, _seed: u64) {}

    fn close(&mut self) -> Result<(), EnvError> {
        Ok(())
    }

    fn num_states(&self) -> usize {
        2
    }

    fn num_actions(&self) -> usize {
        2
    }

    fn render(&self) -> String {
        format!("{}", self.state)
    }
}

/// Corridor of `len` cells. Action 1 moves right, action 0 moves left, the
/// rightmost cell ends the episode with reward 1, every other move costs
/// 0.1. Episodes are capped at `max_steps`.
pub struct CorridorEnv {
    len: usize,
    pos: usize,
    max_steps: u64,
    steps: u64,
}

impl CorridorEnv {
    pub fn new(len: usize, max_steps: u64) -> Self {
        Self {
            len,
            pos: 0,
            max_steps,
            steps: 0,
        }
    }
}

impl Environment for CorridorEnv {
    fn reset(&mut self) -> Result<usize, EnvError> {
        self.pos = 0;
        self.steps = 0;
        Ok(0)
    }

    fn step(&mut self, action: usize) -> Result<(usize, f64, bool, StepInfo), EnvError> {
        self.steps += 1;
        self.pos = if action == 1 {
            (self.pos + 1).min(self.len - 1)
        } else {
            self.pos.saturating_sub(1)
        };
        let terminated = self.pos == self.len - 1;
        let truncated = !terminated && self.steps >= self.max_steps;
        let reward = if terminated { 1.0 } else { -0.1 };
        Ok((self.pos, reward, terminated || truncated, StepInfo { truncated }))
    }

    fn seed(&mut self, _seed: u64) {}

    fn close(&mut self) -> Result<(), EnvError> {
        Ok(())
    }

    fn num_states(&self) -> usize {
        self.len
    }

    fn num_actions(&self) -> usize {
        2
    }

    fn render(&self) -> String {
        format!("{}/{}", self.pos, self.len)
    }
}

/// Fails on the `fail_at`-th step call (1-based), counted across episodes.
pub struct FailingEnv {
    pub calls: Rc<Calls>,
    fail_at: u64,
}

impl FailingEnv {
    pub fn new(calls: Rc<Calls>, fail_at: u64) -> Self {
        Self { calls, fail_at }
    }
}

impl Environment for FailingEnv {
    fn reset(&mut self) -> Result<usize, EnvError> {
        bump(&self.calls.resets);
        Ok(0)
    }

    fn step(&mut self, _action: usize) -> Result<(usize, f64, bool, StepInfo), EnvError> {
        bump(&self.calls.steps);
        if self.calls.steps.get() >= self.fail_at {
            return Err(EnvError::NotReady);
        }
        Ok((0, 1.0, true, StepInfo::default()))
    }

    fn seed(&mut self, _seed: u64) {
        bump(&self.calls.seeds);
    }

    fn close(&mut self) -> Result<(), EnvError> {
        bump(&self.calls.closes);
        Ok(())
    }

    fn num_states(&self) -> usize {
        1
    }

    fn num_actions(&self) -> usize {
        3
    }

    fn render(&self) -> String {
        String::new()
    }
}

/// Reports `num_states` states but answers steps with `bad_state`.
pub struct OutOfRangeEnv {
    pub num_states: usize,
    pub num_actions: usize,
    pub bad_state: usize,
}

impl Environment for OutOfRangeEnv {
    fn reset(&mut self) -> Result<usize, EnvError> {
        Ok(0)
    }

    fn step(&mut self, _action: usize) -> Result<(usize, f64, bool, StepInfo), EnvError> {
        Ok((self.bad_state, 0.0, true, StepInfo::default()))
    }

    fn seed(&mut self, _seed: u64) {}

    fn close(&mut self) -> Result<(), EnvError> {
        Ok(())
    }

    fn num_states(&self) -> usize {
        self.num_states
    }

    fn num_actions(&self) -> usize {
        self.num_actions
    }

    fn render(&self) -> String {
        String::new()
    }
}

/// Every reset fails with `NotReady`; seeds and resets are counted.
pub struct ResetFailingEnv {
    pub calls: Rc<Calls>,
    pub num_actions: usize,
}

impl ResetFailingEnv {
    pub fn new(calls: Rc<Calls>, num_actions: usize) -> Self {
        Self { calls, num_actions }
    }
}

impl Environment for ResetFailingEnv {
    fn reset(&mut self) -> Result<usize, EnvError> {
        bump(&self.calls.resets);
        Err(EnvError::NotReady)
    }

    fn step(&mut self, _action: usize) -> Result<(usize, f64, bool, StepInfo), EnvError> {
        bump(&self.calls.steps);
        Ok((0, 0.0, true, StepInfo::default()))
    }

    fn seed(&mut self, _seed: u64) {
        bump(&self.calls.seeds);
    }

    fn close(&mut self) -> Result<(), EnvError> {
        bump(&self.calls.closes);
        Ok(())
    }

    fn num_states(&self) -> usize {
        1
    }

    fn num_actions(&self) -> usize {
        self.num_actions
    }

    fn render(&self) -> String {
        String::new()
    }
}
