use std::collections::VecDeque;

use bit_vec::BitVec;
use glam::IVec3;

use crate::grid::{Cell, Grid, GridSize};

const NEIGHBORS: [IVec3; 6] = [
    IVec3::X,
    IVec3::NEG_X,
    IVec3::Y,
    IVec3::NEG_Y,
    IVec3::Z,
    IVec3::NEG_Z,
];

/// Steps from each open cell to the nearest open boundary cell
///
/// Solid cells and open cells walled off from every exit have no distance.
#[derive(Debug, Clone)]
pub struct ExitDistances {
    size: GridSize,
    /// Solid layout the distances were computed for
    solid: BitVec,
    distances: Vec<Option<u32>>,
    max: u32,
}

impl ExitDistances {
    /// Multi-source breadth-first search from every open boundary cell.
    ///
    /// A planar grid has no exits through its z faces.
    pub fn compute(grid: &Grid) -> Self {
        let size = grid.size();
        let mut distances = vec![None; size.cell_count()];
        let mut queue = VecDeque::new();

        for (p, cell) in grid.iter() {
            if !cell.is_solid() && is_boundary(size, p) {
                distances[size.index(p)] = Some(0);
                queue.push_back(p);
            }
        }

        let mut max = 0;
        while let Some(p) = queue.pop_front() {
            let Some(d) = distances[size.index(p)] else {
                continue;
            };
            max = max.max(d);
            for offset in NEIGHBORS {
                let Some(n) = size.try_index(p + offset) else {
                    continue;
                };
                if distances[n].is_none() && !grid.cells()[n].is_solid() {
                    distances[n] = Some(d + 1);
                    queue.push_back(p + offset);
                }
            }
        }

        log::debug!("Exit distances for {size} grid, farthest open cell {max} steps");
        Self {
            size,
            solid: solid_mask(grid),
            distances,
            max,
        }
    }

    pub fn size(&self) -> GridSize {
        self.size
    }

    /// Whether `grid` has the same walls as the grid these distances came
    /// from
    pub fn matches(&self, grid: &Grid) -> bool {
        self.size == grid.size() && self.solid == solid_mask(grid)
    }

    pub fn get(&self, p: IVec3) -> Option<u32> {
        self.size.try_index(p).and_then(|i| self.distances[i])
    }

    /// Largest finite distance
    pub fn max(&self) -> u32 {
        self.max
    }

    /// Sum of exit distances over all fluid cells.
    ///
    /// Fluid with no path out counts one step beyond the farthest exit.
    pub fn heuristic(&self, grid: &Grid) -> u64 {
        grid.cells()
            .iter()
            .zip(&self.distances)
            .filter(|(cell, _)| matches!(cell, Cell::Fluid(_)))
            .map(|(_, d)| u64::from(d.unwrap_or(self.max + 1)))
            .sum()
    }
}

fn solid_mask(grid: &Grid) -> BitVec {
    let mut mask = BitVec::from_elem(grid.cells().len(), false);
    for (index, cell) in grid.cells().iter().enumerate() {
        mask.set(index, cell.is_solid());
    }
    mask
}

fn is_boundary(size: GridSize, p: IVec3) -> bool {
    let on_edge = |v: i32, extent: i32| v == 0 || v == extent - 1;
    on_edge(p.x, size.x) || on_edge(p.y, size.y) || (!size.is_planar() && on_edge(p.z, size.z))
}
