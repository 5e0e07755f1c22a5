//! Tuning for the automaton and the planners.
//!
//! Every table uses `#[serde(default)]`, so a TOML file only needs the keys
//! it changes:
//!
//! ```toml
//! [simulation]
//! terminal_velocity = 4
//!
//! [planner]
//! max_depth = 6
//! ```

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::constants;
use crate::error::{SimError, SimResult};

/// Parameters of the fluid automaton
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Simulated ticks per second
    pub fps: f32,
    pub gravity_magnitude: f32,
    /// Maximum cells a fluid cell falls in one tick
    pub terminal_velocity: u32,
    pub default_capacity: f32,
    /// Capacity added per stacked fluid cell
    pub compression: f32,
    /// Ceiling for overflow transfers
    pub max_volume: f32,
    /// Average volume a water body needs before it spills sideways
    pub min_flow: f32,
    /// Seed for the per-tick visiting order
    pub seed: u64,
    /// Worker threads for the parallel passes (0 lets rayon decide)
    pub worker_threads: usize,
    /// Record voxel change events from the first tick
    pub track_changes: bool,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            fps: constants::motion::FPS,
            gravity_magnitude: constants::motion::GRAVITY_MAGNITUDE,
            terminal_velocity: constants::motion::TERMINAL_VELOCITY,
            default_capacity: constants::fluid::DEFAULT_CAPACITY,
            compression: constants::fluid::COMPRESSION,
            max_volume: constants::fluid::MAX_VOLUME,
            min_flow: constants::fluid::MIN_FLOW,
            seed: 0,
            worker_threads: num_cpus::get(),
            track_changes: false,
        }
    }
}

impl SimulationConfig {
    /// Momentum gained per tick
    pub fn momentum_gain(&self) -> f32 {
        self.gravity_magnitude / self.fps
    }

    /// Number of ticks covering `seconds` of simulated time, at least one
    pub fn ticks_for(&self, seconds: f32) -> usize {
        ((seconds * self.fps).round() as usize).max(1)
    }

    pub fn validate(&self) -> SimResult<()> {
        if !(self.fps.is_finite() && self.fps > 0.0) {
            return Err(invalid(format!("fps must be positive, got {}", self.fps)));
        }
        if !(self.gravity_magnitude.is_finite() && self.gravity_magnitude >= 0.0) {
            return Err(invalid(format!(
                "gravity_magnitude must be non-negative, got {}",
                self.gravity_magnitude
            )));
        }
        if self.terminal_velocity == 0 {
            return Err(invalid("terminal_velocity must be at least 1".to_string()));
        }
        if !(self.default_capacity >= 1.0) {
            return Err(invalid(format!(
                "default_capacity must be at least 1.0, got {}",
                self.default_capacity
            )));
        }
        if !(self.compression >= 0.0) {
            return Err(invalid(format!(
                "compression must be non-negative, got {}",
                self.compression
            )));
        }
        if !(self.max_volume >= self.default_capacity) {
            return Err(invalid(format!(
                "max_volume {} is below default_capacity {}",
                self.max_volume, self.default_capacity
            )));
        }
        if !(self.min_flow >= 0.0) {
            return Err(invalid(format!(
                "min_flow must be non-negative, got {}",
                self.min_flow
            )));
        }
        Ok(())
    }
}

/// Blend weights for MCTS node evaluation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MctsWeights {
    /// Reward for reaching the goal in few actions
    pub depth: f32,
    /// Mean drained fraction of rollouts through the node
    pub drained: f32,
    /// Score of the best rollout seen below the node
    pub best_rollout: f32,
    /// Mean evaluation of the node's children
    pub children: f32,
}

impl Default for MctsWeights {
    fn default() -> Self {
        Self {
            depth: 0.25,
            drained: 0.35,
            best_rollout: 0.25,
            children: 0.15,
        }
    }
}

impl MctsWeights {
    /// Weights scaled to sum to one
    pub fn normalized(&self) -> [f32; 4] {
        let sum = self.depth + self.drained + self.best_rollout + self.children;
        if sum <= 0.0 {
            return [0.25; 4];
        }
        [
            self.depth / sum,
            self.drained / sum,
            self.best_rollout / sum,
            self.children / sum,
        ]
    }
}

/// Parameters shared by the rotation planners
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    /// Longest action sequence considered
    pub max_depth: usize,
    /// Drained fraction that counts as solved
    pub goal_fraction: f32,
    /// Simulated seconds after each rotation
    pub window_seconds: f32,
    /// Spacing of the greedy search's rotation candidates
    pub angle_step_degrees: f32,
    /// UCT exploration constant
    pub exploration: f32,
    /// Children per MCTS node before it stops expanding
    pub max_children: usize,
    pub seed: u64,
    pub weights: MctsWeights,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            max_depth: constants::planner::MAX_DEPTH,
            goal_fraction: constants::planner::GOAL_FRACTION,
            window_seconds: constants::planner::WINDOW_SECONDS,
            angle_step_degrees: constants::planner::ANGLE_STEP_DEGREES,
            exploration: constants::planner::EXPLORATION,
            max_children: constants::planner::MAX_CHILDREN,
            seed: 0,
            weights: MctsWeights::default(),
        }
    }
}

impl PlannerConfig {
    pub fn validate(&self) -> SimResult<()> {
        if self.max_depth == 0 {
            return Err(invalid("max_depth must be at least 1".to_string()));
        }
        if !(self.goal_fraction > 0.0 && self.goal_fraction <= 1.0) {
            return Err(invalid(format!(
                "goal_fraction must be in (0, 1], got {}",
                self.goal_fraction
            )));
        }
        if !(self.window_seconds.is_finite() && self.window_seconds > 0.0) {
            return Err(invalid(format!(
                "window_seconds must be positive, got {}",
                self.window_seconds
            )));
        }
        if !(self.angle_step_degrees > 0.0 && self.angle_step_degrees <= 180.0) {
            return Err(invalid(format!(
                "angle_step_degrees must be in (0, 180], got {}",
                self.angle_step_degrees
            )));
        }
        if !(self.exploration >= 0.0) {
            return Err(invalid(format!(
                "exploration must be non-negative, got {}",
                self.exploration
            )));
        }
        if self.max_children == 0 {
            return Err(invalid("max_children must be at least 1".to_string()));
        }
        let w = &self.weights;
        let weights = [w.depth, w.drained, w.best_rollout, w.children];
        if weights.iter().any(|w| !(*w >= 0.0)) || weights.iter().sum::<f32>() <= 0.0 {
            return Err(invalid(
                "MCTS weights must be non-negative and not all zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// Hyperparameter header line, `key=value` pairs separated by commas
impl fmt::Display for PlannerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "max_depth={},goal_fraction={},window_seconds={},angle_step_degrees={},exploration={},max_children={},seed={},depth_weight={},drained_weight={},best_rollout_weight={},children_weight={}",
            self.max_depth,
            self.goal_fraction,
            self.window_seconds,
            self.angle_step_degrees,
            self.exploration,
            self.max_children,
            self.seed,
            self.weights.depth,
            self.weights.drained,
            self.weights.best_rollout,
            self.weights.children,
        )
    }
}

/// Complete configuration file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DrainConfig {
    pub simulation: SimulationConfig,
    pub planner: PlannerConfig,
}

impl DrainConfig {
    /// Parse and validate a TOML document
    pub fn from_toml_str(source: &str) -> SimResult<Self> {
        let config: DrainConfig = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and validate a TOML file
    pub fn load(path: impl AsRef<Path>) -> SimResult<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&source)?;
        log::debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    pub fn validate(&self) -> SimResult<()> {
        self.simulation.validate()?;
        self.planner.validate()
    }
}

fn invalid(message: String) -> SimError {
    SimError::InvalidConfig(message)
}
