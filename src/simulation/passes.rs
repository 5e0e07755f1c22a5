//! Line-parallel passes.
//!
//! Each down-line is processed independently and produces a list of cell
//! updates; the caller applies them once every line is done.

use rayon::prelude::*;

use crate::config::SimulationConfig;
use crate::constants;
use crate::frame::GravityFrame;
use crate::grid::{Cell, FluidCell, Grid};

/// New capacity for every fluid cell whose stack height changed.
///
/// Walking a line top to bottom, the first fluid cell of a run gets the
/// default capacity and each further one gets `compression` more, up to
/// `max_volume`. Any non-fluid cell ends the run.
pub(super) fn compression(
    grid: &Grid,
    frame: &GravityFrame,
    config: &SimulationConfig,
) -> Vec<(usize, f32)> {
    let size = grid.size();
    (0..frame.lines().len())
        .into_par_iter()
        .flat_map_iter(|line| {
            let mut capacity = config.default_capacity;
            let mut updates = Vec::new();
            for p in frame.line_points(line) {
                let index = size.index(p);
                match grid.cells()[index] {
                    Cell::Fluid(fluid) => {
                        if fluid.capacity != capacity {
                            updates.push((index, capacity));
                        }
                        capacity = (capacity + config.compression).min(config.max_volume);
                    }
                    _ => capacity = config.default_capacity,
                }
            }
            updates
        })
        .collect()
}

/// Push volume above capacity one cell up its line.
///
/// Empty cells above take at most one default capacity; fluid cells above
/// may fill past their capacity up to `max_volume`.
pub(super) fn overflow(
    grid: &Grid,
    frame: &GravityFrame,
    config: &SimulationConfig,
) -> Vec<(usize, Cell)> {
    let size = grid.size();
    (0..frame.lines().len())
        .into_par_iter()
        .flat_map_iter(|line| {
            let indices: Vec<usize> = frame.line_points(line).map(|p| size.index(p)).collect();
            let mut cells: Vec<Cell> = indices.iter().map(|&i| grid.cells()[i]).collect();
            let mut dirty = vec![false; cells.len()];

            for k in 1..cells.len() {
                let Cell::Fluid(mut below) = cells[k] else {
                    continue;
                };
                let excess = below.volume - below.capacity;
                if excess <= constants::fluid::MIN_VOLUME {
                    continue;
                }

                let above = match cells[k - 1] {
                    Cell::Empty => {
                        let transfer = excess.min(config.default_capacity);
                        below.volume -= transfer;
                        FluidCell {
                            volume: transfer,
                            capacity: config.default_capacity,
                            momentum: below.momentum,
                        }
                    }
                    Cell::Fluid(mut above) => {
                        let transfer = excess.min(config.max_volume - above.volume);
                        if transfer <= 0.0 {
                            continue;
                        }
                        above.volume += transfer;
                        below.volume -= transfer;
                        above
                    }
                    Cell::Solid => continue,
                };

                cells[k - 1] = Cell::Fluid(above);
                cells[k] = Cell::Fluid(below);
                dirty[k - 1] = true;
                dirty[k] = true;
            }

            indices
                .into_iter()
                .zip(cells)
                .zip(dirty)
                .filter_map(|((index, cell), dirty)| dirty.then_some((index, cell)))
                .collect::<Vec<_>>()
        })
        .collect()
}
