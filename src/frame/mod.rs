//! Gravity-relative traversal of a grid.
//!
//! A [`GravityFrame`] discretises one gravity direction over one grid size.
//! Every cell sits on exactly one *down-line* (a Bresenham walk along
//! gravity) and on exactly one *layer* (a stepped surface perpendicular to
//! gravity, addressed by two horizontal indices `i` and `j`).
//!
//! Construction picks the axis most aligned with gravity as the driving
//! axis `d` and calls the remaining axes `a` and `b`. Down-lines start on
//! the top face of `d` and take one step along `d` per cell. Layers are
//! sheared copies of the `(a, b)` plane: cell `(a, b, d)` belongs to layer
//! value `d - h(a, b)`, where `h` is the Bresenham height profile of the two
//! horizontal directions. The decomposition is total, and construction
//! verifies it cell by cell anyway.

mod bresenham;
mod path;

pub use path::VerticalPath;

use glam::{IVec3, Vec3};

use crate::constants;
use crate::error::{SimError, SimResult};
use crate::grid::GridSize;

/// Where a cell sits on its down-line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DownPoint {
    pub line: u32,
    /// Steps below the line's top-face origin
    pub step: u32,
}

/// Where a cell sits in the layer stack
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayerPoint {
    /// Zero is the lowest layer
    pub layer: u32,
    pub i: u32,
    pub j: u32,
}

/// A down-line clipped to the grid
#[derive(Debug, Clone, Copy)]
pub struct DownLine {
    /// Point at step zero, on the top face plane (possibly outside the grid)
    pub origin: IVec3,
    pub first: u32,
    pub last: u32,
}

impl DownLine {
    /// Cells of the line inside the grid; never zero
    pub fn cell_count(&self) -> usize {
        (self.last - self.first + 1) as usize
    }
}

/// Axis roles for one frame
#[derive(Debug, Clone, Copy)]
struct Axes {
    down: usize,
    a: usize,
    b: usize,
}

impl Axes {
    fn compose(&self, a: i32, b: i32, d: i32) -> IVec3 {
        let mut p = IVec3::ZERO;
        p[self.a] = a;
        p[self.b] = b;
        p[self.down] = d;
        p
    }
}

const UNSET: u32 = u32::MAX;

/// Discretised down and horizontal axes for one gravity direction
#[derive(Debug, Clone)]
pub struct GravityFrame {
    size: GridSize,
    direction: Vec3,
    axes: Axes,
    down_sign: i32,
    /// Offsets from a line origin, one per step
    down: Vec<IVec3>,
    /// Offsets along the first horizontal axis, indexed by `i`
    span_i: Vec<IVec3>,
    /// Offsets along the second horizontal axis, indexed by `j`
    span_j: Vec<IVec3>,
    lines: Vec<DownLine>,
    /// Layer value of layer zero
    layer_base: i32,
    layer_count: usize,
    down_points: Vec<DownPoint>,
    layer_points: Vec<LayerPoint>,
}

impl GravityFrame {
    /// Build the frame for `direction` (pointing down, in grid space).
    ///
    /// Planar grids ignore the z component. Fails with
    /// [`SimError::DegenerateDirection`] when nothing usable is left and
    /// with [`SimError::IncompleteCover`] if any cell is missed or visited
    /// twice.
    pub fn build(direction: Vec3, size: GridSize) -> SimResult<Self> {
        let settled = settle_direction(direction, size)?;
        let axes = choose_axes(settled, size);
        let down_sign = if settled[axes.down] > 0.0 { 1 } else { -1 };
        let extent = size.as_ivec3();
        let n_down = extent[axes.down];
        let n_a = extent[axes.a] as usize;
        let n_b = extent[axes.b] as usize;

        let down = bresenham::trace(settled, axes.down, n_down as usize);
        let i_dir = oriented(settled.cross(unit(axes.b)), axes.a);
        let j_dir = oriented(settled.cross(unit(axes.a)), axes.b);
        let span_i = bresenham::trace(i_dir, axes.a, n_a);
        let span_j = bresenham::trace(j_dir, axes.b, n_b);

        let mut frame = Self {
            size,
            direction: settled,
            axes,
            down_sign,
            down,
            span_i,
            span_j,
            lines: Vec::new(),
            layer_base: 0,
            layer_count: 0,
            down_points: vec![DownPoint { line: UNSET, step: 0 }; size.cell_count()],
            layer_points: vec![
                LayerPoint {
                    layer: UNSET,
                    i: 0,
                    j: 0
                };
                size.cell_count()
            ],
        };

        let down_visits = frame.index_lines();
        verify_cover(&down_visits)?;
        let layer_visits = frame.index_layers();
        verify_cover(&layer_visits)?;

        log::debug!(
            "Gravity frame for {} on {}: {} lines, {} layers",
            settled,
            size,
            frame.lines.len(),
            frame.layer_count
        );
        Ok(frame)
    }

    /// Enumerate down-lines from every top-face origin that reaches the grid
    fn index_lines(&mut self) -> Vec<u8> {
        let Axes { down, a, b } = self.axes;
        let extent = self.size.as_ivec3();
        let top = if self.down_sign > 0 { 0 } else { extent[down] - 1 };

        let (min_a, max_a) = offset_range(&self.down, a);
        let (min_b, max_b) = offset_range(&self.down, b);

        let mut visits = vec![0u8; self.size.cell_count()];
        for u in -max_a..extent[a] - min_a {
            for v in -max_b..extent[b] - min_b {
                let origin = self.axes.compose(u, v, top);
                let inside: Vec<usize> = (0..self.down.len())
                    .filter(|&k| self.size.contains(origin + self.down[k]))
                    .collect();
                let (Some(&first), Some(&last)) = (inside.first(), inside.last()) else {
                    continue;
                };

                let line = self.lines.len() as u32;
                self.lines.push(DownLine {
                    origin,
                    first: first as u32,
                    last: last as u32,
                });
                for k in inside {
                    let index = self.size.index(origin + self.down[k]);
                    self.down_points[index] = DownPoint {
                        line,
                        step: k as u32,
                    };
                    visits[index] = visits[index].saturating_add(1);
                }
            }
        }
        visits
    }

    /// Assign every cell to its layer, lowest layer first
    fn index_layers(&mut self) -> Vec<u8> {
        let mut low = i32::MAX;
        let mut high = i32::MIN;
        for p in self.size.positions() {
            let value = self.layer_value(p);
            low = low.min(value);
            high = high.max(value);
        }
        self.layer_base = if self.down_sign > 0 { high } else { low };
        self.layer_count = (high - low + 1) as usize;

        let mut visits = vec![0u8; self.size.cell_count()];
        for layer in 0..self.layer_count {
            for i in 0..self.span_i.len() {
                for j in 0..self.span_j.len() {
                    if let Some(p) = self.layer_position(layer, i, j) {
                        let index = self.size.index(p);
                        self.layer_points[index] = LayerPoint {
                            layer: layer as u32,
                            i: i as u32,
                            j: j as u32,
                        };
                        visits[index] = visits[index].saturating_add(1);
                    }
                }
            }
        }
        visits
    }

    fn height(&self, i: usize, j: usize) -> i32 {
        self.span_i[i][self.axes.down] + self.span_j[j][self.axes.down]
    }

    fn layer_value(&self, p: IVec3) -> i32 {
        let i = p[self.axes.a] as usize;
        let j = p[self.axes.b] as usize;
        p[self.axes.down] - self.height(i, j)
    }

    /// Unit down direction the frame was built for, after tie breaking
    pub fn direction(&self) -> Vec3 {
        self.direction
    }

    pub fn size(&self) -> GridSize {
        self.size
    }

    /// Grid axis most aligned with gravity
    pub fn down_axis(&self) -> usize {
        self.axes.down
    }

    pub fn lines(&self) -> &[DownLine] {
        &self.lines
    }

    pub fn layer_count(&self) -> usize {
        self.layer_count
    }

    /// Number of `i` and `j` indices in every layer
    pub fn horizontal_extent(&self) -> (usize, usize) {
        (self.span_i.len(), self.span_j.len())
    }

    pub fn down_point(&self, p: IVec3) -> Option<DownPoint> {
        self.size.try_index(p).map(|i| self.down_points[i])
    }

    pub fn layer_point(&self, p: IVec3) -> Option<LayerPoint> {
        self.size.try_index(p).map(|i| self.layer_points[i])
    }

    /// Points of a down-line, top first
    pub fn line_points(&self, line: usize) -> impl Iterator<Item = IVec3> + '_ {
        let DownLine {
            origin,
            first,
            last,
        } = self.lines[line];
        (first..=last).map(move |k| origin + self.down[k as usize])
    }

    /// Cell at `(i, j)` of a layer, if that part of the layer is inside the grid
    pub fn layer_position(&self, layer: usize, i: usize, j: usize) -> Option<IVec3> {
        if layer >= self.layer_count || i >= self.span_i.len() || j >= self.span_j.len() {
            return None;
        }
        let value = if self.down_sign > 0 {
            self.layer_base - layer as i32
        } else {
            self.layer_base + layer as i32
        };
        let d = value + self.height(i, j);
        let p = self.axes.compose(i as i32, j as i32, d);
        self.size.contains(p).then_some(p)
    }

    /// Cells of one layer in `(i, j)` order
    pub fn layer_positions(&self, layer: usize) -> impl Iterator<Item = IVec3> + '_ {
        let (n_i, n_j) = self.horizontal_extent();
        (0..n_i * n_j).filter_map(move |n| self.layer_position(layer, n / n_j, n % n_j))
    }

    /// Offset `p` along the frame's axes.
    ///
    /// `vertical` counts upward, `di` and `dj` move along the layer. The
    /// point comes back unchanged when any index would leave its line or
    /// layer, or the result would leave the grid.
    pub fn neighbor(&self, p: IVec3, vertical: i32, di: i32, dj: i32) -> IVec3 {
        let (Some(down), Some(layer)) = (self.down_point(p), self.layer_point(p)) else {
            return p;
        };
        let k = down.step as i32 - vertical;
        let i = layer.i as i32 + di;
        let j = layer.j as i32 + dj;
        if k < 0
            || k >= self.down.len() as i32
            || i < 0
            || i >= self.span_i.len() as i32
            || j < 0
            || j >= self.span_j.len() as i32
        {
            return p;
        }

        let target = p + (self.down[k as usize] - self.down[down.step as usize])
            + (self.span_i[i as usize] - self.span_i[layer.i as usize])
            + (self.span_j[j as usize] - self.span_j[layer.j as usize]);
        if self.size.contains(target) {
            target
        } else {
            p
        }
    }

    /// Up to `steps` cells below `start` along its down-line
    pub fn vertical_path(&self, start: IVec3, steps: usize) -> VerticalPath<'_> {
        match self.down_point(start) {
            Some(point) => VerticalPath::new(self, start, point.step as usize, steps),
            None => VerticalPath::new(self, start, 0, 0),
        }
    }

    pub(crate) fn down_offset(&self, step: usize) -> Option<IVec3> {
        self.down.get(step).copied()
    }
}

/// Normalise, drop z on planar grids, and separate tied magnitudes so
/// the driving axis is never ambiguous
fn settle_direction(direction: Vec3, size: GridSize) -> SimResult<Vec3> {
    let degenerate = || SimError::DegenerateDirection { direction, size };

    let mut dir = direction;
    if size.is_planar() {
        dir.z = 0.0;
    }
    let mut dir = dir.try_normalize().ok_or_else(degenerate)?;

    let axes: &[usize] = if size.is_planar() { &[0, 1] } else { &[0, 1, 2] };
    let eps = constants::frame::TIE_EPSILON;
    for (n, &first) in axes.iter().enumerate() {
        for &second in &axes[n + 1..] {
            let tied = (dir[first].abs() - dir[second].abs()).abs() < eps;
            if tied && dir[second].abs() >= eps {
                dir[second] += eps * dir[second].signum();
            }
        }
    }
    dir.try_normalize().ok_or_else(degenerate)
}

fn choose_axes(direction: Vec3, size: GridSize) -> Axes {
    if size.is_planar() {
        let down = if direction.x.abs() > direction.y.abs() { 0 } else { 1 };
        return Axes {
            down,
            a: 1 - down,
            b: 2,
        };
    }
    let magnitude = direction.abs();
    let down = if magnitude.x >= magnitude.y && magnitude.x >= magnitude.z {
        0
    } else if magnitude.y >= magnitude.z {
        1
    } else {
        2
    };
    let (a, b) = match down {
        0 => (1, 2),
        1 => (0, 2),
        _ => (0, 1),
    };
    Axes { down, a, b }
}

fn unit(axis: usize) -> Vec3 {
    let mut v = Vec3::ZERO;
    v[axis] = 1.0;
    v
}

/// Flip `v` so its component along `axis` is positive
fn oriented(v: Vec3, axis: usize) -> Vec3 {
    if v[axis] < 0.0 {
        -v
    } else {
        v
    }
}

fn offset_range(offsets: &[IVec3], axis: usize) -> (i32, i32) {
    offsets.iter().fold((0, 0), |(lo, hi), o| (lo.min(o[axis]), hi.max(o[axis])))
}

fn verify_cover(visits: &[u8]) -> SimResult<()> {
    let covered = visits.iter().filter(|&&v| v > 0).count();
    let duplicates = visits.iter().filter(|&&v| v > 1).count();
    if covered != visits.len() || duplicates > 0 {
        return Err(SimError::IncompleteCover {
            covered,
            expected: visits.len(),
            duplicates,
        });
    }
    Ok(())
}
