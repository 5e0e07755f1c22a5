//! Gravity-relative fluid drainage.
//!
//! A voxel grid holds solid walls and fluid. Gravity can point in any
//! direction relative to the grid; the [`frame::GravityFrame`] discretises
//! that direction so the cellular automaton in [`fluid`] and [`simulation`]
//! can walk "down" and "sideways" cell by cell. The [`planner`] module
//! searches over rotations of the structure to drain the fluid quickly.

pub mod config;
pub mod constants;
pub mod error;
pub mod fluid;
pub mod frame;
pub mod grid;
pub mod planner;
pub mod simulation;

pub use config::{DrainConfig, MctsWeights, PlannerConfig, SimulationConfig};
pub use error::{SimError, SimResult};
pub use fluid::FluidEngine;
pub use frame::{DownPoint, GravityFrame, LayerPoint, VerticalPath};
pub use grid::{BrushKind, Cell, ChangeLog, FluidCell, Grid, GridSize, VoxelChange};
pub use planner::{
    ExitDistances, GreedyPlanner, MctsNode, MctsPlanner, Planner, PlannerKind,
    RandomRolloutPlanner, RolloutResult,
};
pub use simulation::{RotationAction, Simulation, StateSnapshot, TickReport};
