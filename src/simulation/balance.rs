//! Lateral balancing of resting water bodies.
//!
//! A water body is a connected set of momentum-zero fluid cells within one
//! layer. Its volume is spread evenly over its cells, and over the empty
//! cells bordering it (the silhouette) when that still leaves more than
//! `min_flow` per cell. Bodies never leave their layer, so layers are
//! balanced in parallel.

use std::collections::VecDeque;

use bit_vec::BitVec;
use glam::IVec3;
use rayon::prelude::*;

use crate::config::SimulationConfig;
use crate::frame::GravityFrame;
use crate::grid::{Cell, FluidCell, Grid};

const HORIZONTAL: [(i32, i32); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];

pub(super) fn balance_layers(
    grid: &Grid,
    frame: &GravityFrame,
    config: &SimulationConfig,
) -> Vec<(usize, Cell)> {
    (0..frame.layer_count())
        .into_par_iter()
        .flat_map_iter(|layer| balance_layer(grid, frame, config, layer))
        .collect()
}

fn is_resting(cell: Cell) -> bool {
    matches!(cell, Cell::Fluid(fluid) if fluid.momentum == 0.0)
}

fn balance_layer(
    grid: &Grid,
    frame: &GravityFrame,
    config: &SimulationConfig,
    layer: usize,
) -> Vec<(usize, Cell)> {
    let (n_i, n_j) = frame.horizontal_extent();
    let slot = |p: IVec3| {
        frame
            .layer_point(p)
            .map(|lp| lp.i as usize * n_j + lp.j as usize)
    };

    let mut visited = BitVec::from_elem(n_i * n_j, false);
    let mut queue = VecDeque::new();
    let mut body = Vec::new();
    let mut silhouette = Vec::new();
    let mut updates = Vec::new();

    for n in 0..n_i * n_j {
        if visited[n] {
            continue;
        }
        let Some(start) = frame.layer_position(layer, n / n_j, n % n_j) else {
            continue;
        };
        if !is_resting(grid.at(start)) {
            continue;
        }

        body.clear();
        silhouette.clear();
        visited.set(n, true);
        queue.push_back(start);

        while let Some(p) = queue.pop_front() {
            match grid.at(p) {
                Cell::Empty => silhouette.push(p),
                cell if is_resting(cell) => {
                    body.push(p);
                    for (di, dj) in HORIZONTAL {
                        let q = frame.neighbor(p, 0, di, dj);
                        if q == p {
                            continue;
                        }
                        if let Some(s) = slot(q) {
                            if !visited[s] {
                                visited.set(s, true);
                                queue.push_back(q);
                            }
                        }
                    }
                }
                _ => {}
            }
        }

        spread(grid, config, &body, &silhouette, &mut updates);
    }
    updates
}

fn spread(
    grid: &Grid,
    config: &SimulationConfig,
    body: &[IVec3],
    silhouette: &[IVec3],
    updates: &mut Vec<(usize, Cell)>,
) {
    let size = grid.size();
    let total: f32 = body.iter().map(|&p| grid.at(p).volume()).sum();
    let spill = !silhouette.is_empty()
        && total / (body.len() + silhouette.len()) as f32 > config.min_flow;
    let cells = if spill {
        body.len() + silhouette.len()
    } else {
        body.len()
    };
    let share = total / cells as f32;

    for &p in body {
        if let Cell::Fluid(mut fluid) = grid.at(p) {
            if fluid.volume != share {
                fluid.volume = share;
                updates.push((size.index(p), Cell::Fluid(fluid)));
            }
        }
    }
    if spill {
        for &p in silhouette {
            updates.push((
                size.index(p),
                Cell::Fluid(FluidCell::new(share, config.default_capacity)),
            ));
        }
    }
}
