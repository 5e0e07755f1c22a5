use glam::IVec3;

use super::GravityFrame;

/// Lazy walk down a down-line, excluding the start cell.
///
/// The walk stops after the requested number of cells or when the line
/// leaves the grid, whichever comes first. Once exhausted,
/// [`VerticalPath::exits_grid`] tells the two apart.
#[derive(Debug)]
pub struct VerticalPath<'a> {
    frame: &'a GravityFrame,
    start: IVec3,
    base: usize,
    taken: usize,
    limit: usize,
    exited: bool,
}

impl<'a> VerticalPath<'a> {
    pub(super) fn new(frame: &'a GravityFrame, start: IVec3, base: usize, limit: usize) -> Self {
        Self {
            frame,
            start,
            base,
            taken: 0,
            limit,
            exited: false,
        }
    }

    /// True once the walk ran off the grid before reaching its length
    pub fn exits_grid(&self) -> bool {
        self.exited
    }
}

impl Iterator for VerticalPath<'_> {
    type Item = IVec3;

    fn next(&mut self) -> Option<IVec3> {
        if self.taken >= self.limit || self.exited {
            return None;
        }
        let step = self.base + self.taken + 1;
        let (Some(target), Some(base)) = (
            self.frame.down_offset(step),
            self.frame.down_offset(self.base),
        ) else {
            self.exited = true;
            return None;
        };
        let p = self.start + target - base;
        if !self.frame.size().contains(p) {
            self.exited = true;
            return None;
        }
        self.taken += 1;
        Some(p)
    }
}

impl std::iter::FusedIterator for VerticalPath<'_> {}
