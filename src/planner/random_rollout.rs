use rand::rngs::StdRng;
use rand::SeedableRng;

use super::{advance, Planner, RolloutResult, RotationAction, SearchRoot};
use crate::config::PlannerConfig;
use crate::error::{SimError, SimResult};
use crate::simulation::Simulation;

/// Uniformly random action sequences from the root.
///
/// Keeps the shortest sequence that reaches the goal. Once one is known,
/// later rollouts are cut at its length, since a longer sequence can no
/// longer win.
pub struct RandomRolloutPlanner {
    config: PlannerConfig,
    rng: StdRng,
    window: usize,
    root: Option<SearchRoot>,
    best: Option<(RotationAction, RolloutResult)>,
    /// Most drained rollout while nothing reached the goal
    fallback: Option<(RotationAction, f32)>,
    rollouts: usize,
}

impl RandomRolloutPlanner {
    pub fn new(config: PlannerConfig) -> Self {
        Self {
            rng: StdRng::seed_from_u64(config.seed),
            config,
            window: 1,
            root: None,
            best: None,
            fallback: None,
            rollouts: 0,
        }
    }

    /// Best goal-reaching rollout so far
    pub fn best(&self) -> Option<RolloutResult> {
        self.best.map(|(_, result)| result)
    }

    pub fn rollouts(&self) -> usize {
        self.rollouts
    }
}

impl Planner for RandomRolloutPlanner {
    fn name(&self) -> &'static str {
        "random"
    }

    fn begin_search(&mut self, sim: &mut Simulation) -> SimResult<()> {
        self.config.validate()?;
        self.window = sim.ticks_for(self.config.window_seconds);
        self.root = Some(SearchRoot::begin(sim));
        self.best = None;
        self.fallback = None;
        self.rollouts = 0;
        log::info!(
            "Random rollout search started at {:.1}% drained",
            sim.drained_fraction() * 100.0
        );
        Ok(())
    }

    fn search_step(&mut self, sim: &mut Simulation) -> SimResult<()> {
        let root = self.root.as_ref().ok_or(SimError::SearchNotStarted)?;
        let planar = sim.grid().size().is_planar();
        let limit = self
            .best
            .map_or(self.config.max_depth, |(_, best)| best.steps);

        root.reset(sim)?;
        let mut first = None;
        let mut drained = sim.drained_fraction();
        let mut reached = None;
        for step in 1..=limit {
            let action = RotationAction::random(&mut self.rng, planar);
            first.get_or_insert(action);
            drained = advance(sim, action, self.window)?;
            if drained >= self.config.goal_fraction {
                reached = Some(RolloutResult { steps: step, drained });
                break;
            }
        }
        root.reset(sim)?;
        self.rollouts += 1;

        let Some(first) = first else {
            return Ok(());
        };
        match reached {
            Some(result) if self.best.map_or(true, |(_, best)| result.is_better_than(&best)) => {
                log::debug!(
                    "Rollout {} reached {:.1}% in {} actions starting with {}",
                    self.rollouts,
                    result.drained * 100.0,
                    result.steps,
                    first
                );
                self.best = Some((first, result));
            }
            Some(_) => {}
            None => {
                if self.fallback.map_or(true, |(_, d)| drained > d) {
                    self.fallback = Some((first, drained));
                }
            }
        }
        Ok(())
    }

    fn peek_decision(&self) -> Option<RotationAction> {
        self.best
            .map(|(action, _)| action)
            .or(self.fallback.map(|(action, _)| action))
    }

    fn decide(&mut self, sim: &mut Simulation) -> SimResult<RotationAction> {
        if self.root.is_none() {
            return Err(SimError::SearchNotStarted);
        }
        let action = self
            .peek_decision()
            .unwrap_or_else(|| panic!("decide() called before any rollout completed"));
        if let Some(root) = self.root.take() {
            root.commit(sim, action)?;
        }
        log::info!(
            "Random rollout chose {} after {} rollouts",
            action,
            self.rollouts
        );
        Ok(action)
    }
}
