//! Tick orchestration
//!
//! One [`Simulation::step`] runs five passes in a fixed order:
//! 1. clear the per-tick `simulated` flags
//! 2. recompute stack compression along every down-line (parallel)
//! 3. run the cell rules layer by layer, lowest layer first, visiting each
//!    layer in a freshly shuffled order
//! 4. balance resting water bodies within each layer (parallel)
//! 5. push overflowing volume up its down-line (parallel)
//!
//! Parallel passes compute updates against an unchanged grid and apply
//! them afterwards, so their result does not depend on thread count. The
//! cell pass stays sequential: a falling cell can cross into another
//! down-line and, on a tilted frame, more than one layer per step.

mod balance;
mod passes;
mod rotation;
mod snapshot;

pub use rotation::RotationAction;
pub use snapshot::StateSnapshot;

use bit_vec::BitVec;
use glam::{IVec3, Quat, Vec3};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::config::SimulationConfig;
use crate::error::{SimError, SimResult};
use crate::fluid::{FlowContext, FluidEngine};
use crate::frame::GravityFrame;
use crate::grid::{BrushKind, Cell, ChangeLog, Grid, VoxelChange};

/// Summary of one tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickReport {
    pub tick: u64,
    /// Volume that left the grid during the tick
    pub drained: f32,
    pub total_volume: f32,
}

/// A fluid automaton over one structure
pub struct Simulation {
    config: SimulationConfig,
    engine: FluidEngine,
    grid: Grid,
    frame: GravityFrame,
    /// Maps grid space to world space; world gravity is -Y
    orientation: Quat,
    simulated: BitVec,
    total_volume: f32,
    initial_volume: f32,
    rng: StdRng,
    /// Flattened (i, j) layer slots, reshuffled every tick
    visit_order: Vec<u32>,
    changes: ChangeLog,
    pool: rayon::ThreadPool,
    ticks: u64,
}

impl Simulation {
    /// Simulation with gravity along the grid's -Y axis.
    ///
    /// Change events are recorded only when `config.track_changes` is set
    /// or after [`Simulation::set_change_tracking`]; an untracked log stays
    /// empty so headless runs never accumulate events.
    pub fn new(grid: Grid, config: SimulationConfig) -> SimResult<Self> {
        config.validate()?;
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(config.worker_threads)
            .thread_name(|i| format!("drain-worker-{i}"))
            .build()?;

        let orientation = Quat::IDENTITY;
        let frame = GravityFrame::build(Self::local_gravity(orientation), grid.size())?;
        let total_volume = grid.total_volume();
        let cell_count = grid.size().cell_count();

        let mut simulation = Self {
            engine: FluidEngine::new(&config),
            rng: StdRng::seed_from_u64(config.seed),
            changes: ChangeLog::new(config.track_changes),
            config,
            grid,
            frame,
            orientation,
            simulated: BitVec::from_elem(cell_count, false),
            total_volume,
            initial_volume: total_volume,
            visit_order: Vec::new(),
            pool,
            ticks: 0,
        };
        simulation.reset_visit_order();

        log::info!(
            "Simulation on {} grid with {:.2} units of fluid",
            simulation.grid.size(),
            total_volume
        );
        Ok(simulation)
    }

    /// Simulation with gravity along `direction` in grid space
    pub fn with_gravity(grid: Grid, config: SimulationConfig, direction: Vec3) -> SimResult<Self> {
        let mut simulation = Self::new(grid, config)?;
        simulation.update_gravity(direction)?;
        Ok(simulation)
    }

    pub(crate) fn local_gravity(orientation: Quat) -> Vec3 {
        orientation.inverse() * Vec3::NEG_Y
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn frame(&self) -> &GravityFrame {
        &self.frame
    }

    pub fn orientation(&self) -> Quat {
        self.orientation
    }

    /// Unit gravity direction in grid space
    pub fn gravity_direction(&self) -> Vec3 {
        Self::local_gravity(self.orientation)
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn total_volume(&self) -> f32 {
        self.total_volume
    }

    /// Volume present when the environment was last generated
    pub fn initial_volume(&self) -> f32 {
        self.initial_volume
    }

    /// Share of the initial volume that has left the grid
    pub fn drained_fraction(&self) -> f32 {
        if self.initial_volume <= 0.0 {
            return 0.0;
        }
        (1.0 - self.total_volume / self.initial_volume).clamp(0.0, 1.0)
    }

    /// Point gravity along `direction` (grid space) and rebuild the frame
    pub fn update_gravity(&mut self, direction: Vec3) -> SimResult<()> {
        let direction = direction
            .try_normalize()
            .ok_or(SimError::DegenerateDirection {
                direction,
                size: self.grid.size(),
            })?;
        self.set_orientation(Quat::from_rotation_arc(direction, Vec3::NEG_Y))
    }

    /// Rotate the structure in world space and rebuild the frame
    pub fn rotate(&mut self, action: RotationAction) -> SimResult<()> {
        self.set_orientation((action.quat() * self.orientation).normalize())
    }

    /// Commits only if a frame can be built for the new orientation
    fn set_orientation(&mut self, orientation: Quat) -> SimResult<()> {
        let frame = GravityFrame::build(Self::local_gravity(orientation), self.grid.size())?;
        self.orientation = orientation;
        self.install_frame(frame);
        Ok(())
    }

    fn install_frame(&mut self, frame: GravityFrame) {
        self.frame = frame;
        self.reset_visit_order();
    }

    fn reset_visit_order(&mut self) {
        let (n_i, n_j) = self.frame.horizontal_extent();
        self.visit_order = (0..(n_i * n_j) as u32).collect();
    }

    /// Reseed the visiting-order generator
    pub fn reseed(&mut self, seed: u64) {
        self.rng = StdRng::seed_from_u64(seed);
    }

    /// Advance one tick
    pub fn step(&mut self) -> TickReport {
        self.simulated.clear();

        let capacities = self
            .pool
            .install(|| passes::compression(&self.grid, &self.frame, &self.config));
        let cells = self.grid.cells_mut();
        for (index, capacity) in capacities {
            if let Some(fluid) = cells[index].as_fluid_mut() {
                fluid.capacity = capacity;
            }
        }

        let drained = self.simulate_cells();

        let balanced = self
            .pool
            .install(|| balance::balance_layers(&self.grid, &self.frame, &self.config));
        self.apply(balanced);

        let overflowed = self
            .pool
            .install(|| passes::overflow(&self.grid, &self.frame, &self.config));
        self.apply(overflowed);

        self.total_volume = (self.total_volume - drained).max(0.0);
        self.ticks += 1;
        log::trace!(
            "Tick {}: drained {:.4}, {:.4} remaining",
            self.ticks,
            drained,
            self.total_volume
        );

        TickReport {
            tick: self.ticks,
            drained,
            total_volume: self.total_volume,
        }
    }

    /// Advance `ticks` ticks and return the volume drained
    pub fn run(&mut self, ticks: usize) -> f32 {
        (0..ticks).map(|_| self.step().drained).sum()
    }

    /// Ticks covering `seconds` of simulated time
    pub fn ticks_for(&self, seconds: f32) -> usize {
        self.config.ticks_for(seconds)
    }

    fn simulate_cells(&mut self) -> f32 {
        self.visit_order.shuffle(&mut self.rng);
        let (_, n_j) = self.frame.horizontal_extent();

        let mut ctx = FlowContext {
            grid: &mut self.grid,
            frame: &self.frame,
            simulated: &mut self.simulated,
            changes: &mut self.changes,
        };
        let mut drained = 0.0;
        for layer in 0..self.frame.layer_count() {
            for &slot in &self.visit_order {
                let slot = slot as usize;
                if let Some(p) = self.frame.layer_position(layer, slot / n_j, slot % n_j) {
                    drained += self.engine.simulate(&mut ctx, p);
                }
            }
        }
        drained
    }

    fn apply(&mut self, updates: Vec<(usize, Cell)>) {
        let size = self.grid.size();
        for (index, cell) in updates {
            let previous = std::mem::replace(&mut self.grid.cells_mut()[index], cell);
            if previous.volume_or_sentinel() != cell.volume_or_sentinel() {
                self.changes.record(size.position(index), &cell);
            }
        }
    }

    /// Paint a brush stroke and treat the result as the new environment.
    ///
    /// Both the total and the initial volume are re-based on the painted
    /// grid. Returns the number of changed cells.
    pub fn paint(&mut self, center: IVec3, radius: f32, kind: BrushKind) -> usize {
        let changed = self
            .grid
            .paint(center, radius, kind, self.config.default_capacity);
        for &p in &changed {
            let cell = self.grid.at(p);
            self.changes.record(p, &cell);
        }
        self.total_volume = self.grid.total_volume();
        self.initial_volume = self.total_volume;
        changed.len()
    }

    pub fn set_change_tracking(&mut self, enabled: bool) {
        self.changes.set_enabled(enabled);
    }

    pub fn is_tracking_changes(&self) -> bool {
        self.changes.is_enabled()
    }

    /// Drain pending change events
    pub fn take_changes(&mut self) -> Vec<VoxelChange> {
        self.changes.take()
    }

    /// Queue an event for every cell, for consumers that must redraw all
    pub fn notify_all(&mut self) {
        if !self.changes.is_enabled() {
            return;
        }
        let size = self.grid.size();
        for (index, cell) in self.grid.cells().iter().enumerate() {
            self.changes.record(size.position(index), cell);
        }
    }
}

#[cfg(test)]
mod tests;
