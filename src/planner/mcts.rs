use std::fmt::Write as _;

use rand::rngs::StdRng;
use rand::SeedableRng;

use super::{advance, Planner, RolloutResult, RotationAction, SearchRoot};
use crate::config::PlannerConfig;
use crate::error::{SimError, SimResult};
use crate::simulation::{Simulation, StateSnapshot};

/// One orientation state in the search tree
#[derive(Debug, Clone)]
pub struct MctsNode {
    snapshot: StateSnapshot,
    action: RotationAction,
    depth: usize,
    parent: Option<usize>,
    children: Vec<usize>,
    visits: u32,
    /// Drained fraction when the node was created
    drained: f32,
    drained_sum: f32,
    eval: f32,
    best_rollout: Option<RolloutResult>,
}

impl MctsNode {
    fn new(
        snapshot: StateSnapshot,
        action: RotationAction,
        depth: usize,
        parent: Option<usize>,
        drained: f32,
    ) -> Self {
        Self {
            snapshot,
            action,
            depth,
            parent,
            children: Vec::new(),
            visits: 0,
            drained,
            drained_sum: 0.0,
            eval: 0.0,
            best_rollout: None,
        }
    }

    /// Rotation that led here from the parent
    pub fn action(&self) -> RotationAction {
        self.action
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn parent(&self) -> Option<usize> {
        self.parent
    }

    pub fn children(&self) -> &[usize] {
        &self.children
    }

    pub fn visits(&self) -> u32 {
        self.visits
    }

    pub fn drained(&self) -> f32 {
        self.drained
    }

    pub fn eval(&self) -> f32 {
        self.eval
    }

    pub fn best_rollout(&self) -> Option<RolloutResult> {
        self.best_rollout
    }

    fn mean_drained(&self) -> f32 {
        if self.visits == 0 {
            0.0
        } else {
            self.drained_sum / self.visits as f32
        }
    }
}

/// Monte-Carlo tree search over rotation sequences.
///
/// Nodes live in an arena and refer to each other by index. A node keeps
/// expanding while a hypothetical new child, valued at the node's own
/// evaluation, would score at least as well as its best existing child.
pub struct MctsPlanner {
    config: PlannerConfig,
    rng: StdRng,
    window: usize,
    root: Option<SearchRoot>,
    nodes: Vec<MctsNode>,
    iterations: usize,
}

impl MctsPlanner {
    pub fn new(config: PlannerConfig) -> Self {
        Self {
            rng: StdRng::seed_from_u64(config.seed),
            config,
            window: 1,
            root: None,
            nodes: Vec::new(),
            iterations: 0,
        }
    }

    /// Tree arena; index 0 is the root
    pub fn nodes(&self) -> &[MctsNode] {
        &self.nodes
    }

    pub fn iterations(&self) -> usize {
        self.iterations
    }

    fn is_terminal(&self, node: &MctsNode) -> bool {
        node.depth >= self.config.max_depth || node.drained >= self.config.goal_fraction
    }

    /// UCT score scaled into [0, 1] by its largest possible value
    fn uct(&self, eval: f32, visits: u32, parent_visits: u32) -> f32 {
        if visits == 0 {
            return 1.0;
        }
        let log_parent = (parent_visits.max(1) as f32).ln();
        let explore = self.config.exploration * (log_parent / visits as f32).sqrt();
        let ceiling = 1.0 + self.config.exploration * log_parent.sqrt();
        (eval + explore) / ceiling
    }

    fn best_child(&self, index: usize) -> Option<(usize, f32)> {
        let node = &self.nodes[index];
        node.children
            .iter()
            .map(|&c| {
                let child = &self.nodes[c];
                (c, self.uct(child.eval, child.visits, node.visits))
            })
            .fold(None, |best: Option<(usize, f32)>, (c, score)| match best {
                Some((_, s)) if s >= score => best,
                _ => Some((c, score)),
            })
    }

    /// Walk down the tree until a node should grow or cannot.
    ///
    /// The root always grows, even when the search starts at the goal, so
    /// `decide` has a child to pick after one step.
    fn select(&self) -> (usize, bool) {
        let mut current = 0;
        loop {
            let node = &self.nodes[current];
            if current != 0 && self.is_terminal(node) {
                return (current, false);
            }
            let Some((child, score)) = self.best_child(current) else {
                return (current, true);
            };
            if node.children.len() < self.config.max_children {
                let virtual_score =
                    self.uct(node.eval, node.children.len() as u32 + 1, node.visits);
                if virtual_score >= score {
                    return (current, true);
                }
            }
            current = child;
        }
    }

    fn expand(&mut self, sim: &mut Simulation, parent: usize) -> SimResult<usize> {
        let planar = sim.grid().size().is_planar();
        sim.restore(&self.nodes[parent].snapshot)?;
        let action = RotationAction::random(&mut self.rng, planar);
        let drained = advance(sim, action, self.window)?;

        let depth = self.nodes[parent].depth + 1;
        let index = self.nodes.len();
        self.nodes.push(MctsNode::new(
            sim.capture(),
            action,
            depth,
            Some(parent),
            drained,
        ));
        self.nodes[parent].children.push(index);
        Ok(index)
    }

    /// Random actions from the simulation's current state, which must be
    /// the state of `start`
    fn rollout(&mut self, sim: &mut Simulation, start: usize) -> SimResult<RolloutResult> {
        let planar = sim.grid().size().is_planar();
        let mut steps = self.nodes[start].depth;
        let mut drained = self.nodes[start].drained;
        while steps < self.config.max_depth && drained < self.config.goal_fraction {
            let action = RotationAction::random(&mut self.rng, planar);
            drained = advance(sim, action, self.window)?;
            steps += 1;
        }
        Ok(RolloutResult { steps, drained })
    }

    fn backpropagate(&mut self, leaf: usize, result: RolloutResult) {
        let [w_depth, w_drained, w_best, w_children] = self.config.weights.normalized();
        let max_depth = self.config.max_depth as f32;
        let goal = self.config.goal_fraction;

        let mut current = Some(leaf);
        while let Some(index) = current {
            let node = &mut self.nodes[index];
            node.visits += 1;
            node.drained_sum += result.drained;
            if node
                .best_rollout
                .map_or(true, |best| result.is_better_than(&best))
            {
                node.best_rollout = Some(result);
            }

            let best = node.best_rollout.unwrap_or(result);
            let depth_score = if best.drained >= goal {
                1.0 - (best.steps as f32 - 1.0).max(0.0) / max_depth
            } else {
                0.0
            };
            let mean_drained = node.mean_drained();
            let children = &self.nodes[index].children;
            let child_mean = if children.is_empty() {
                mean_drained
            } else {
                children.iter().map(|&c| self.nodes[c].eval).sum::<f32>() / children.len() as f32
            };

            let node = &mut self.nodes[index];
            node.eval = w_depth * depth_score
                + w_drained * mean_drained
                + w_best * best.drained
                + w_children * child_mean;
            current = node.parent;
        }
    }

    /// Root child with the best rollout, earliest child on ties
    fn best_root_child(&self) -> Option<&MctsNode> {
        let root = self.nodes.first()?;
        let mut best: Option<&MctsNode> = None;
        for &c in &root.children {
            let child = &self.nodes[c];
            let Some(result) = child.best_rollout else {
                continue;
            };
            let better = match best.and_then(|b| b.best_rollout) {
                Some(current) => result.is_better_than(&current),
                None => true,
            };
            if better {
                best = Some(child);
            }
        }
        best.or_else(|| root.children.first().map(|&c| &self.nodes[c]))
    }

    /// Hyperparameter line followed by the whole tree, one nested record
    /// per node
    pub fn tree_report(&self) -> String {
        let mut out = self.config.to_string();
        out.push('\n');
        if !self.nodes.is_empty() {
            self.write_node(&mut out, 0);
        }
        out
    }

    fn write_node(&self, out: &mut String, index: usize) {
        let node = &self.nodes[index];
        let (rollout_depth, rollout_drained) = node
            .best_rollout
            .map_or((0, 0.0), |r| (r.steps, r.drained));
        let _ = write!(
            out,
            "volume={},rotation={},depth={},visits={},eval={},bestRolloutDepth={},bestRolloutExtractedPercentage={},children=[",
            node.snapshot.total_volume(),
            node.action,
            node.depth,
            node.visits,
            node.eval,
            rollout_depth,
            rollout_drained * 100.0,
        );
        for &c in &node.children {
            self.write_node(out, c);
            out.push(',');
        }
        out.push(']');
    }
}

impl Planner for MctsPlanner {
    fn name(&self) -> &'static str {
        "mcts"
    }

    fn begin_search(&mut self, sim: &mut Simulation) -> SimResult<()> {
        self.config.validate()?;
        self.window = sim.ticks_for(self.config.window_seconds);
        let root = SearchRoot::begin(sim);
        self.nodes.clear();
        self.nodes.push(MctsNode::new(
            root.snapshot().clone(),
            RotationAction::IDENTITY,
            0,
            None,
            sim.drained_fraction(),
        ));
        self.root = Some(root);
        self.iterations = 0;
        log::info!(
            "MCTS search started at {:.1}% drained",
            sim.drained_fraction() * 100.0
        );
        Ok(())
    }

    fn search_step(&mut self, sim: &mut Simulation) -> SimResult<()> {
        if self.root.is_none() {
            return Err(SimError::SearchNotStarted);
        }

        let (selected, grow) = self.select();
        let leaf = if grow {
            self.expand(sim, selected)?
        } else {
            sim.restore(&self.nodes[selected].snapshot)?;
            selected
        };
        let result = self.rollout(sim, leaf)?;
        self.backpropagate(leaf, result);
        self.iterations += 1;

        if let Some(root) = &self.root {
            root.reset(sim)?;
        }
        Ok(())
    }

    fn peek_decision(&self) -> Option<RotationAction> {
        self.best_root_child().map(|node| node.action)
    }

    /// # Panics
    ///
    /// Panics if the root has no children.
    fn decide(&mut self, sim: &mut Simulation) -> SimResult<RotationAction> {
        let Some(root) = self.root.take() else {
            return Err(SimError::SearchNotStarted);
        };
        let Some(best) = self.best_root_child() else {
            panic!("MCTS decide() on a root with no children");
        };
        let action = best.action;
        log::info!(
            "MCTS chose {} after {} iterations (best rollout {:?})",
            action,
            self.iterations,
            best.best_rollout
        );
        root.commit(sim, action)?;
        Ok(action)
    }

    fn report(&self) -> Option<String> {
        Some(self.tree_report())
    }
}
