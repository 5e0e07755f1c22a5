// Default tuning values.
//
// The automaton reads its parameters from `SimulationConfig`; these only
// seed the `Default` impls and freshly parsed maps.

/// Cell and flow constants
pub mod fluid {
    /// Fill level of an uncompressed fluid cell
    pub const DEFAULT_CAPACITY: f32 = 1.0;
    /// Extra capacity per fluid cell stacked above
    pub const COMPRESSION: f32 = 0.15;
    /// Hard ceiling for any cell during overflow
    pub const MAX_VOLUME: f32 = 3.0;
    /// Minimum average volume before a water body spills sideways
    pub const MIN_FLOW: f32 = 0.1;
    /// Volume reported for solid cells in change events
    pub const SOLID_SENTINEL: f32 = -1.0;
    /// Volumes below this are float residue and merge into a neighbour
    pub const MIN_VOLUME: f32 = 1e-5;
    /// Bound on diagonal redistribution rounds for one cell
    pub const MAX_DIAGONAL_ROUNDS: usize = 32;
}

/// Time and force constants
pub mod motion {
    pub const FPS: f32 = 30.0;
    pub const GRAVITY_MAGNITUDE: f32 = 10.0;
    /// Cells per tick
    pub const TERMINAL_VELOCITY: u32 = 3;
}

/// Gravity frame construction
pub mod frame {
    /// Nudge applied to tied direction components
    pub const TIE_EPSILON: f32 = 1e-4;
}

/// Planner defaults
pub mod planner {
    pub const MAX_DEPTH: usize = 10;
    pub const GOAL_FRACTION: f32 = 0.95;
    pub const WINDOW_SECONDS: f32 = 5.0;
    pub const ANGLE_STEP_DEGREES: f32 = 15.0;
    pub const EXPLORATION: f32 = std::f32::consts::SQRT_2;
    pub const MAX_CHILDREN: usize = 8;
}
