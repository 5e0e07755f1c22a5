//! Dense voxel grid
//!
//! Cells are stored x-fastest in a flat vector. A grid with a z extent of
//! one is planar and every gravity query on it stays in the XY plane.

mod ascii;
mod brush;
mod cell;
mod changes;
pub mod levels;

pub use brush::BrushKind;
pub use cell::{Cell, FluidCell};
pub use changes::{ChangeLog, VoxelChange};

use std::fmt;

use glam::IVec3;
use serde::{Deserialize, Serialize};

use crate::error::{SimError, SimResult};

/// Extent of a grid along each axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridSize {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl GridSize {
    pub fn new(x: i32, y: i32, z: i32) -> SimResult<Self> {
        if x < 1 || y < 1 || z < 1 {
            return Err(SimError::InvalidGridSize { x, y, z });
        }
        Ok(Self { x, y, z })
    }

    /// A single-layer grid in the XY plane
    pub fn planar(x: i32, y: i32) -> SimResult<Self> {
        Self::new(x, y, 1)
    }

    pub fn cube(n: i32) -> SimResult<Self> {
        Self::new(n, n, n)
    }

    pub fn is_planar(&self) -> bool {
        self.z == 1
    }

    pub fn dimensions(&self) -> usize {
        if self.is_planar() {
            2
        } else {
            3
        }
    }

    pub fn cell_count(&self) -> usize {
        self.x as usize * self.y as usize * self.z as usize
    }

    pub fn as_ivec3(&self) -> IVec3 {
        IVec3::new(self.x, self.y, self.z)
    }

    /// Extent along axis 0, 1 or 2
    pub fn extent(&self, axis: usize) -> i32 {
        self.as_ivec3()[axis]
    }

    pub fn contains(&self, p: IVec3) -> bool {
        p.x >= 0 && p.x < self.x && p.y >= 0 && p.y < self.y && p.z >= 0 && p.z < self.z
    }

    /// Flat index of an in-bounds position
    pub fn index(&self, p: IVec3) -> usize {
        debug_assert!(self.contains(p), "{p} outside {self}");
        (p.x + self.x * (p.y + self.y * p.z)) as usize
    }

    pub fn try_index(&self, p: IVec3) -> Option<usize> {
        self.contains(p).then(|| self.index(p))
    }

    pub fn position(&self, index: usize) -> IVec3 {
        let index = index as i32;
        IVec3::new(
            index % self.x,
            (index / self.x) % self.y,
            index / (self.x * self.y),
        )
    }

    /// All positions in index order
    pub fn positions(&self) -> impl Iterator<Item = IVec3> + '_ {
        (0..self.cell_count()).map(move |i| self.position(i))
    }
}

impl fmt::Display for GridSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}x{}", self.x, self.y, self.z)
    }
}

/// Cell storage for one structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Grid {
    size: GridSize,
    cells: Vec<Cell>,
}

impl Grid {
    /// An all-empty grid
    pub fn new(size: GridSize) -> Self {
        Self {
            size,
            cells: vec![Cell::Empty; size.cell_count()],
        }
    }

    pub fn size(&self) -> GridSize {
        self.size
    }

    pub fn get(&self, p: IVec3) -> Option<&Cell> {
        self.size.try_index(p).map(|i| &self.cells[i])
    }

    pub fn set(&mut self, p: IVec3, cell: Cell) -> SimResult<()> {
        let index = self.size.try_index(p).ok_or(SimError::OutOfBounds {
            position: p,
            size: self.size,
        })?;
        self.cells[index] = cell;
        Ok(())
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub(crate) fn cells_mut(&mut self) -> &mut [Cell] {
        &mut self.cells
    }

    /// Cell at an in-bounds position
    pub(crate) fn at(&self, p: IVec3) -> Cell {
        self.cells[self.size.index(p)]
    }

    pub(crate) fn put(&mut self, p: IVec3, cell: Cell) {
        let index = self.size.index(p);
        self.cells[index] = cell;
    }

    /// Positions paired with cells, in index order
    pub fn iter(&self) -> impl Iterator<Item = (IVec3, &Cell)> + '_ {
        self.cells
            .iter()
            .enumerate()
            .map(move |(i, cell)| (self.size.position(i), cell))
    }

    /// Sum of fluid volume, accumulated in double precision
    pub fn total_volume(&self) -> f32 {
        self.cells.iter().map(|c| c.volume() as f64).sum::<f64>() as f32
    }

    pub fn fluid_cell_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_fluid()).count()
    }
}
