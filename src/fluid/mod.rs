//! Per-cell fluid transitions
//!
//! All movement is expressed through [`GravityFrame`] queries, so the same
//! rules hold for any gravity direction.

use bit_vec::BitVec;
use glam::IVec3;

use crate::config::SimulationConfig;
use crate::constants;
use crate::frame::GravityFrame;
use crate::grid::{Cell, ChangeLog, FluidCell, Grid};

/// Diagonal targets as (di, dj) one step below the cell
const DIAGONALS: [(i32, i32); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];

/// Cells that may take a residue as (vertical, di, dj), nearest to the
/// floor first
const RESIDUE_TARGETS: [(i32, i32, i32); 10] = [
    (-1, 0, 0),
    (-1, 1, 0),
    (-1, -1, 0),
    (-1, 0, 1),
    (-1, 0, -1),
    (0, 1, 0),
    (0, -1, 0),
    (0, 0, 1),
    (0, 0, -1),
    (1, 0, 0),
];

/// Mutable world state a cell transition touches
pub struct FlowContext<'a> {
    pub grid: &'a mut Grid,
    pub frame: &'a GravityFrame,
    /// Cells already moved this tick
    pub simulated: &'a mut BitVec,
    pub changes: &'a mut ChangeLog,
}

/// Transition rules for one fluid cell
#[derive(Debug, Clone)]
pub struct FluidEngine {
    momentum_gain: f32,
    terminal_velocity: f32,
    default_capacity: f32,
}

impl FluidEngine {
    pub fn new(config: &SimulationConfig) -> Self {
        Self {
            momentum_gain: config.momentum_gain(),
            terminal_velocity: config.terminal_velocity as f32,
            default_capacity: config.default_capacity,
        }
    }

    /// Run the fall and spread rules for the fluid cell at `p`.
    ///
    /// Each cell moves at most once per tick; cells already flagged in
    /// `simulated`, and non-fluid cells, are left alone. Returns the volume
    /// that left the grid.
    pub fn simulate(&self, ctx: &mut FlowContext<'_>, p: IVec3) -> f32 {
        let index = ctx.grid.size().index(p);
        if ctx.simulated.get(index).unwrap_or(true) {
            return 0.0;
        }
        let Cell::Fluid(mut cell) = ctx.grid.cells()[index] else {
            return 0.0;
        };
        ctx.simulated.set(index, true);
        let before = cell.volume;

        self.apply_forces(&mut cell);
        let mut drained = 0.0;
        if !self.absorb_residue(ctx, p, &mut cell) {
            drained = self.flow_down(ctx, p, &mut cell);
            if cell.volume > 0.0 {
                self.flow_diagonally(ctx, p, &mut cell);
            }
            self.absorb_residue(ctx, p, &mut cell);
        }

        let after = if cell.volume > 0.0 {
            Cell::Fluid(cell)
        } else {
            Cell::Empty
        };
        ctx.grid.cells_mut()[index] = after;
        if after.volume() != before {
            ctx.changes.record(p, &after);
        }
        drained
    }

    fn apply_forces(&self, cell: &mut FluidCell) {
        cell.momentum = (cell.momentum + self.momentum_gain).clamp(1.0, self.terminal_velocity);
    }

    /// Merge a volume below [`constants::fluid::MIN_VOLUME`] into the first
    /// adjacent fluid cell. A residue with no fluid around it is kept so it
    /// can still fall.
    fn absorb_residue(&self, ctx: &mut FlowContext<'_>, p: IVec3, cell: &mut FluidCell) -> bool {
        if cell.volume <= 0.0 || cell.volume >= constants::fluid::MIN_VOLUME {
            return false;
        }
        let target = RESIDUE_TARGETS
            .iter()
            .map(|&(vertical, di, dj)| ctx.frame.neighbor(p, vertical, di, dj))
            .find(|&q| q != p && ctx.grid.at(q).is_fluid());
        let Some(q) = target else {
            return false;
        };

        let mut merged = ctx.grid.at(q);
        if let Some(fluid) = merged.as_fluid_mut() {
            fluid.volume += cell.volume;
        }
        cell.volume = 0.0;
        ctx.grid.put(q, merged);
        ctx.changes.record(q, &merged);
        true
    }

    /// Fall along the down-line, farthest reachable cell first
    fn flow_down(&self, ctx: &mut FlowContext<'_>, p: IVec3, cell: &mut FluidCell) -> f32 {
        let frame = ctx.frame;
        let steps = cell.momentum as usize;
        let mut path = frame.vertical_path(p, steps);

        let mut reach = Vec::with_capacity(steps);
        let mut blocked = false;
        let mut landed_on_fluid = false;
        for q in path.by_ref() {
            match ctx.grid.at(q) {
                Cell::Empty => landed_on_fluid = false,
                Cell::Fluid(_) => landed_on_fluid = true,
                Cell::Solid => {
                    blocked = true;
                    break;
                }
            }
            reach.push(q);
        }

        if !blocked && path.exits_grid() {
            let drained = cell.volume;
            cell.volume = 0.0;
            return drained;
        }

        // ground contact
        if blocked || landed_on_fluid || reach.len() < steps {
            cell.momentum = 0.0;
        }

        for &q in reach.iter().rev() {
            let remaining = cell.volume;
            self.flow_into(ctx, q, cell, remaining);
            if cell.volume <= 0.0 {
                break;
            }
        }
        0.0
    }

    /// Split the remaining volume over the open down-diagonal neighbours
    /// until it is gone or every target is full
    fn flow_diagonally(&self, ctx: &mut FlowContext<'_>, p: IVec3, cell: &mut FluidCell) {
        let frame = ctx.frame;
        let mut targets: Vec<IVec3> = DIAGONALS
            .iter()
            .map(|&(di, dj)| frame.neighbor(p, -1, di, dj))
            .filter(|&q| q != p && !ctx.grid.at(q).is_solid())
            .collect();

        let mut rounds = 0;
        while !targets.is_empty() && cell.volume > 0.0 {
            if rounds == constants::fluid::MAX_DIAGONAL_ROUNDS {
                log::warn!(
                    "Diagonal flow from {p} stopped after {rounds} rounds with {} left",
                    cell.volume
                );
                break;
            }
            rounds += 1;

            let split = cell.volume / targets.len() as f32;
            targets.retain(|&q| {
                self.flow_into(ctx, q, cell, split);
                match ctx.grid.at(q) {
                    Cell::Fluid(target) => target.volume < target.capacity,
                    _ => false,
                }
            });
        }
    }

    /// Move up to `max_flow` from `cell` into `q`.
    ///
    /// Empty targets take at most one default capacity and inherit the
    /// mover's momentum. Fluid targets fill to their capacity.
    fn flow_into(&self, ctx: &mut FlowContext<'_>, q: IVec3, cell: &mut FluidCell, max_flow: f32) {
        let target = match ctx.grid.at(q) {
            Cell::Empty => {
                let transfer = max_flow.min(self.default_capacity);
                if transfer <= 0.0 {
                    return;
                }
                cell.volume -= transfer;
                let index = ctx.grid.size().index(q);
                ctx.simulated.set(index, true);
                Cell::Fluid(FluidCell {
                    volume: transfer,
                    capacity: self.default_capacity,
                    momentum: cell.momentum,
                })
            }
            Cell::Fluid(mut fluid) => {
                let transfer = fluid.spare().min(max_flow);
                if transfer <= 0.0 {
                    return;
                }
                fluid.volume += transfer;
                cell.volume -= transfer;
                Cell::Fluid(fluid)
            }
            Cell::Solid => return,
        };
        ctx.grid.put(q, target);
        ctx.changes.record(q, &target);
    }
}
