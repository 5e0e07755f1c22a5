//! Text maps.
//!
//! `o` is solid, `w` is one unit of fluid, `.` or `-` is empty. Whitespace
//! inside a row is ignored and the first row of a layer is its top (highest
//! y). Blank lines separate z layers, so a map with several blocks is a 3D
//! grid.

use std::str::FromStr;

use glam::IVec3;

use super::{Cell, Grid, GridSize};
use crate::error::{SimError, SimResult};

impl Grid {
    pub fn from_ascii(text: &str) -> SimResult<Self> {
        // (line number, parsed row) per layer
        let mut layers: Vec<Vec<(usize, Vec<Cell>)>> = Vec::new();
        let mut current: Vec<(usize, Vec<Cell>)> = Vec::new();

        for (n, raw) in text.lines().enumerate() {
            let line = n + 1;
            let mut row = Vec::new();
            for c in raw.chars().filter(|c| !c.is_whitespace()) {
                row.push(match c {
                    'o' => Cell::Solid,
                    'w' => Cell::full(),
                    '.' | '-' => Cell::Empty,
                    other => {
                        return Err(SimError::MapParse {
                            line,
                            reason: format!("unknown cell symbol '{other}'"),
                        })
                    }
                });
            }

            if row.is_empty() {
                if !current.is_empty() {
                    layers.push(std::mem::take(&mut current));
                }
            } else {
                current.push((line, row));
            }
        }
        if !current.is_empty() {
            layers.push(current);
        }

        let first = layers.first().ok_or_else(|| SimError::MapParse {
            line: 1,
            reason: "map has no rows".to_string(),
        })?;
        let height = first.len();
        let width = first[0].1.len();

        for layer in &layers {
            if layer.len() != height {
                return Err(SimError::MapParse {
                    line: layer[0].0,
                    reason: format!("layer has {} rows, expected {height}", layer.len()),
                });
            }
            if let Some((line, row)) = layer.iter().find(|(_, row)| row.len() != width) {
                return Err(SimError::MapParse {
                    line: *line,
                    reason: format!("row has {} cells, expected {width}", row.len()),
                });
            }
        }

        let size = GridSize::new(width as i32, height as i32, layers.len() as i32)?;
        let mut grid = Grid::new(size);
        for (z, layer) in layers.iter().enumerate() {
            for (r, (_, row)) in layer.iter().enumerate() {
                let y = height - 1 - r;
                for (x, cell) in row.iter().enumerate() {
                    grid.put(IVec3::new(x as i32, y as i32, z as i32), *cell);
                }
            }
        }
        Ok(grid)
    }

    /// Inverse of [`Grid::from_ascii`]; fluid of any volume prints as `w`
    pub fn to_ascii(&self) -> String {
        let size = self.size;
        let mut out = String::with_capacity(size.cell_count() + (size.y * size.z * 2) as usize);
        for z in 0..size.z {
            if z > 0 {
                out.push('\n');
            }
            for y in (0..size.y).rev() {
                for x in 0..size.x {
                    out.push(self.at(IVec3::new(x, y, z)).symbol());
                }
                out.push('\n');
            }
        }
        out
    }
}

impl FromStr for Grid {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Grid::from_ascii(s)
    }
}
