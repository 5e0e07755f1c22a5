//! Rotation planners.
//!
//! Every planner treats [`Simulation`] as a forward model: it snapshots the
//! live state when a search begins, explores hypothetical rotations inside
//! restored copies, and leaves the live state exactly as it found it after
//! each [`Planner::search_step`]. Only [`Planner::decide`] changes the live
//! state, by restoring the root and applying the chosen rotation.

mod exit_distance;
mod greedy;
mod mcts;
mod random_rollout;

pub use exit_distance::ExitDistances;
pub use greedy::GreedyPlanner;
pub use mcts::{MctsNode, MctsPlanner};
pub use random_rollout::RandomRolloutPlanner;

pub use crate::simulation::RotationAction;

use std::fmt;
use std::str::FromStr;

use crate::config::PlannerConfig;
use crate::error::SimResult;
use crate::simulation::{Simulation, StateSnapshot};

/// A resumable search over rotation sequences
pub trait Planner {
    fn name(&self) -> &'static str;

    /// Start a new search rooted at the simulation's current state.
    ///
    /// Change tracking is suspended until [`Planner::decide`].
    fn begin_search(&mut self, sim: &mut Simulation) -> SimResult<()>;

    /// One bounded unit of search work. The live state is restored before
    /// returning.
    fn search_step(&mut self, sim: &mut Simulation) -> SimResult<()>;

    /// Best first action found so far
    fn peek_decision(&self) -> Option<RotationAction>;

    /// Restore the root state, apply the best first action and end the
    /// search. Every cell is re-notified afterwards.
    ///
    /// # Panics
    ///
    /// Panics if the search has not produced any candidate, i.e. no
    /// [`Planner::search_step`] ran since [`Planner::begin_search`].
    fn decide(&mut self, sim: &mut Simulation) -> SimResult<RotationAction>;

    /// Human-readable dump of the search state, where the planner has one
    fn report(&self) -> Option<String> {
        None
    }
}

/// Outcome of a simulated action sequence
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RolloutResult {
    /// Number of actions applied, counted from the search root
    pub steps: usize,
    pub drained: f32,
}

impl RolloutResult {
    /// Fewer steps first, then more drained
    pub fn is_better_than(&self, other: &RolloutResult) -> bool {
        self.steps < other.steps || (self.steps == other.steps && self.drained > other.drained)
    }
}

/// Planner selection for configuration and the CLI
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlannerKind {
    Random,
    Mcts,
    Greedy,
}

impl PlannerKind {
    pub fn build(self, config: PlannerConfig) -> SimResult<Box<dyn Planner>> {
        config.validate()?;
        Ok(match self {
            PlannerKind::Random => Box::new(RandomRolloutPlanner::new(config)),
            PlannerKind::Mcts => Box::new(MctsPlanner::new(config)),
            PlannerKind::Greedy => Box::new(GreedyPlanner::new(config)),
        })
    }
}

impl FromStr for PlannerKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "random" | "rollout" => Ok(PlannerKind::Random),
            "mcts" => Ok(PlannerKind::Mcts),
            "gbfs" | "greedy" => Ok(PlannerKind::Greedy),
            other => Err(format!(
                "unknown planner '{other}' (expected random, mcts or gbfs)"
            )),
        }
    }
}

impl fmt::Display for PlannerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PlannerKind::Random => "random",
            PlannerKind::Mcts => "mcts",
            PlannerKind::Greedy => "gbfs",
        })
    }
}

/// The live state a search started from
pub(crate) struct SearchRoot {
    snapshot: StateSnapshot,
    tracking: bool,
}

impl SearchRoot {
    pub(crate) fn begin(sim: &mut Simulation) -> Self {
        let tracking = sim.is_tracking_changes();
        sim.set_change_tracking(false);
        Self {
            snapshot: sim.capture(),
            tracking,
        }
    }

    pub(crate) fn snapshot(&self) -> &StateSnapshot {
        &self.snapshot
    }

    pub(crate) fn reset(&self, sim: &mut Simulation) -> SimResult<()> {
        sim.restore(&self.snapshot)
    }

    /// Put the live state at the root, rotated by `action`
    pub(crate) fn commit(self, sim: &mut Simulation, action: RotationAction) -> SimResult<()> {
        sim.restore(&self.snapshot)?;
        sim.rotate(action)?;
        sim.set_change_tracking(self.tracking);
        sim.notify_all();
        Ok(())
    }
}

/// Rotate, simulate one window and return the drained fraction
pub(crate) fn advance(sim: &mut Simulation, action: RotationAction, ticks: usize) -> SimResult<f32> {
    sim.rotate(action)?;
    sim.run(ticks);
    Ok(sim.drained_fraction())
}

#[cfg(test)]
mod tests;
