use glam::IVec3;

use super::Cell;

/// A voxel whose published value changed
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VoxelChange {
    pub position: IVec3,
    /// New volume, or the solid sentinel
    pub value: f32,
}

/// Change events waiting for a renderer
///
/// Recording is a no-op while the log is disabled, so planner rollouts can
/// run without flooding it.
#[derive(Debug, Default)]
pub struct ChangeLog {
    enabled: bool,
    entries: Vec<VoxelChange>,
}

impl ChangeLog {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            entries: Vec::new(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Disabling also drops pending entries
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        if !enabled {
            self.entries.clear();
        }
    }

    pub fn record(&mut self, position: IVec3, cell: &Cell) {
        if self.enabled {
            self.entries.push(VoxelChange {
                position,
                value: cell.volume_or_sentinel(),
            });
        }
    }

    pub fn take(&mut self) -> Vec<VoxelChange> {
        std::mem::take(&mut self.entries)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
