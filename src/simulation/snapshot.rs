use glam::Quat;
use serde::{Deserialize, Serialize};

use super::Simulation;
use crate::error::{SimError, SimResult};
use crate::frame::GravityFrame;
use crate::grid::Grid;

/// Independent copy of the simulation's mutable state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateSnapshot {
    grid: Grid,
    total_volume: f32,
    orientation: Quat,
}

impl StateSnapshot {
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn total_volume(&self) -> f32 {
        self.total_volume
    }

    pub fn orientation(&self) -> Quat {
        self.orientation
    }
}

impl Simulation {
    pub fn capture(&self) -> StateSnapshot {
        StateSnapshot {
            grid: self.grid.clone(),
            total_volume: self.total_volume,
            orientation: self.orientation,
        }
    }

    /// Replace grid, volume and orientation with the snapshot's.
    ///
    /// The gravity frame is always rebuilt from the restored orientation.
    /// On error the simulation is left untouched.
    pub fn restore(&mut self, snapshot: &StateSnapshot) -> SimResult<()> {
        let size = self.grid.size();
        if snapshot.grid.size() != size {
            return Err(SimError::SnapshotMismatch {
                snapshot: snapshot.grid.size(),
                grid: size,
            });
        }
        let frame = GravityFrame::build(Self::local_gravity(snapshot.orientation), size)?;

        self.grid.clone_from(&snapshot.grid);
        self.total_volume = snapshot.total_volume;
        self.orientation = snapshot.orientation;
        self.install_frame(frame);
        Ok(())
    }
}
