use serde::{Deserialize, Serialize};

use crate::constants;

/// State of one voxel
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum Cell {
    #[default]
    Empty,
    /// Impassable and never simulated
    Solid,
    Fluid(FluidCell),
}

/// Fluid held by a cell
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FluidCell {
    pub volume: f32,
    /// Volume the cell holds before it overflows upward
    pub capacity: f32,
    /// Cells per tick the fluid is trying to fall
    pub momentum: f32,
}

impl FluidCell {
    pub fn new(volume: f32, capacity: f32) -> Self {
        Self {
            volume,
            capacity,
            momentum: 0.0,
        }
    }

    /// Room left before reaching capacity
    pub fn spare(&self) -> f32 {
        self.capacity - self.volume
    }
}

impl Cell {
    /// Fluid cell, or `Empty` when `volume` is not positive
    pub fn fluid(volume: f32, capacity: f32) -> Self {
        if volume > 0.0 {
            Cell::Fluid(FluidCell::new(volume, capacity))
        } else {
            Cell::Empty
        }
    }

    /// One unit of uncompressed fluid
    pub fn full() -> Self {
        Cell::fluid(1.0, constants::fluid::DEFAULT_CAPACITY)
    }

    /// Fluid volume, zero for empty and solid cells
    pub fn volume(&self) -> f32 {
        match self {
            Cell::Fluid(fluid) => fluid.volume,
            _ => 0.0,
        }
    }

    /// Value published in change events: the volume, or the solid sentinel
    pub fn volume_or_sentinel(&self) -> f32 {
        match self {
            Cell::Solid => constants::fluid::SOLID_SENTINEL,
            other => other.volume(),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Cell::Empty)
    }

    pub fn is_solid(&self) -> bool {
        matches!(self, Cell::Solid)
    }

    pub fn is_fluid(&self) -> bool {
        matches!(self, Cell::Fluid(_))
    }

    pub fn as_fluid(&self) -> Option<&FluidCell> {
        match self {
            Cell::Fluid(fluid) => Some(fluid),
            _ => None,
        }
    }

    pub fn as_fluid_mut(&mut self) -> Option<&mut FluidCell> {
        match self {
            Cell::Fluid(fluid) => Some(fluid),
            _ => None,
        }
    }

    /// Map character used by the ASCII format
    pub fn symbol(&self) -> char {
        match self {
            Cell::Empty => '.',
            Cell::Solid => 'o',
            Cell::Fluid(_) => 'w',
        }
    }
}
