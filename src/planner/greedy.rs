use std::cmp::Reverse;
use std::collections::BinaryHeap;

use super::exit_distance::ExitDistances;
use super::{advance, Planner, RolloutResult, RotationAction, SearchRoot};
use crate::config::PlannerConfig;
use crate::error::{SimError, SimResult};
use crate::simulation::{Simulation, StateSnapshot};

struct GreedyNode {
    snapshot: StateSnapshot,
    /// First action on the path from the root; `None` for the root
    first_action: Option<RotationAction>,
    depth: usize,
    drained: f32,
    heuristic: u64,
}

/// Greedy best-first search over a fixed set of rotations.
///
/// Each step expands the open node whose fluid sits closest to the exits,
/// trying every candidate rotation from it. Ties go to the node created
/// first.
pub struct GreedyPlanner {
    config: PlannerConfig,
    window: usize,
    distances: Option<ExitDistances>,
    root: Option<SearchRoot>,
    candidates: Vec<RotationAction>,
    nodes: Vec<GreedyNode>,
    frontier: BinaryHeap<(Reverse<u64>, Reverse<usize>)>,
    best_open: Option<usize>,
    best_terminal: Option<usize>,
    /// Heuristic of each candidate at the last expansion
    last_scores: Vec<u64>,
    expansions: usize,
}

impl GreedyPlanner {
    pub fn new(config: PlannerConfig) -> Self {
        Self {
            config,
            window: 1,
            distances: None,
            root: None,
            candidates: Vec::new(),
            nodes: Vec::new(),
            frontier: BinaryHeap::new(),
            best_open: None,
            best_terminal: None,
            last_scores: Vec::new(),
            expansions: 0,
        }
    }

    /// Rotations tried from every expanded node, in enumeration order.
    ///
    /// Planar grids roll through a full turn starting at zero. Other grids
    /// pitch through a full turn, then roll through the non-zero steps.
    pub fn candidate_actions(step_degrees: f32, planar: bool) -> Vec<RotationAction> {
        let count = ((360.0 / step_degrees).round() as usize).max(1);
        let angle = |k: usize| k as f32 * step_degrees;
        if planar {
            (0..count).map(|k| RotationAction::roll(angle(k))).collect()
        } else {
            (0..count)
                .map(|k| RotationAction::pitch(angle(k)))
                .chain((1..count).map(|k| RotationAction::roll(angle(k))))
                .collect()
        }
    }

    pub fn candidates(&self) -> &[RotationAction] {
        &self.candidates
    }

    /// Heuristic reached by each candidate at the most recent expansion
    pub fn candidate_scores(&self) -> &[u64] {
        &self.last_scores
    }

    pub fn distances(&self) -> Option<&ExitDistances> {
        self.distances.as_ref()
    }

    pub fn expansions(&self) -> usize {
        self.expansions
    }

    fn is_terminal(&self, depth: usize, drained: f32) -> bool {
        depth >= self.config.max_depth || drained >= self.config.goal_fraction
    }

    fn record_terminal(&mut self, index: usize) {
        let node = &self.nodes[index];
        let result = RolloutResult {
            steps: node.depth,
            drained: node.drained,
        };
        let better = self.best_terminal.map_or(true, |best| {
            let best = &self.nodes[best];
            let best = RolloutResult {
                steps: best.depth,
                drained: best.drained,
            };
            result.is_better_than(&best)
        });
        if better {
            log::debug!(
                "GBFS terminal at depth {} with {:.1}% drained",
                result.steps,
                result.drained * 100.0
            );
            self.best_terminal = Some(index);
        }
    }

    fn record_open(&mut self, index: usize) {
        let heuristic = self.nodes[index].heuristic;
        if self
            .best_open
            .map_or(true, |best| heuristic < self.nodes[best].heuristic)
        {
            self.best_open = Some(index);
        }
        self.frontier.push((Reverse(heuristic), Reverse(index)));
    }
}

impl Planner for GreedyPlanner {
    fn name(&self) -> &'static str {
        "gbfs"
    }

    fn begin_search(&mut self, sim: &mut Simulation) -> SimResult<()> {
        self.config.validate()?;
        let size = sim.grid().size();
        if !self.distances.as_ref().is_some_and(|d| d.matches(sim.grid())) {
            self.distances = Some(ExitDistances::compute(sim.grid()));
        }
        let heuristic = self
            .distances
            .as_ref()
            .map_or(0, |d| d.heuristic(sim.grid()));

        self.window = sim.ticks_for(self.config.window_seconds);
        self.candidates = Self::candidate_actions(self.config.angle_step_degrees, size.is_planar());
        let root = SearchRoot::begin(sim);
        self.nodes.clear();
        self.frontier.clear();
        self.best_open = None;
        self.best_terminal = None;
        self.last_scores.clear();
        self.expansions = 0;

        self.nodes.push(GreedyNode {
            snapshot: root.snapshot().clone(),
            first_action: None,
            depth: 0,
            drained: sim.drained_fraction(),
            heuristic,
        });
        self.frontier.push((Reverse(heuristic), Reverse(0)));
        self.root = Some(root);
        log::info!(
            "GBFS search started with {} candidates, heuristic {}",
            self.candidates.len(),
            heuristic
        );
        Ok(())
    }

    fn search_step(&mut self, sim: &mut Simulation) -> SimResult<()> {
        if self.root.is_none() {
            return Err(SimError::SearchNotStarted);
        }
        let Some((_, Reverse(parent))) = self.frontier.pop() else {
            log::debug!("GBFS frontier exhausted");
            return Ok(());
        };

        let mut scores = Vec::with_capacity(self.candidates.len());
        for k in 0..self.candidates.len() {
            let action = self.candidates[k];
            sim.restore(&self.nodes[parent].snapshot)?;
            let drained = advance(sim, action, self.window)?;
            let heuristic = self
                .distances
                .as_ref()
                .map_or(0, |d| d.heuristic(sim.grid()));
            scores.push(heuristic);

            let depth = self.nodes[parent].depth + 1;
            let index = self.nodes.len();
            self.nodes.push(GreedyNode {
                snapshot: sim.capture(),
                first_action: self.nodes[parent].first_action.or(Some(action)),
                depth,
                drained,
                heuristic,
            });
            if self.is_terminal(depth, drained) {
                self.record_terminal(index);
            } else {
                self.record_open(index);
            }
        }
        self.last_scores = scores;
        self.expansions += 1;

        if let Some(root) = &self.root {
            root.reset(sim)?;
        }
        Ok(())
    }

    fn peek_decision(&self) -> Option<RotationAction> {
        self.best_terminal
            .or(self.best_open)
            .and_then(|index| self.nodes[index].first_action)
    }

    /// # Panics
    ///
    /// Panics if no node has been expanded yet.
    fn decide(&mut self, sim: &mut Simulation) -> SimResult<RotationAction> {
        let Some(root) = self.root.take() else {
            return Err(SimError::SearchNotStarted);
        };
        let Some(action) = self.peek_decision() else {
            panic!("GBFS decide() before any node was expanded");
        };
        log::info!(
            "GBFS chose {} after {} expansions",
            action,
            self.expansions
        );
        root.commit(sim, action)?;
        self.frontier.clear();
        Ok(action)
    }
}
