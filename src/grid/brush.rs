use glam::IVec3;
use serde::{Deserialize, Serialize};

use super::{Cell, Grid};

/// What a brush stroke writes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BrushKind {
    Empty,
    Solid,
    /// One unit of fluid at the given capacity
    Fluid,
}

impl Grid {
    /// Overwrite every cell within `radius` of `center`.
    ///
    /// Returns the positions whose content changed.
    pub fn paint(
        &mut self,
        center: IVec3,
        radius: f32,
        kind: BrushKind,
        capacity: f32,
    ) -> Vec<IVec3> {
        let reach = radius.max(0.0).floor() as i32;
        let size = self.size;
        let lo = (center - IVec3::splat(reach)).max(IVec3::ZERO);
        let hi = (center + IVec3::splat(reach)).min(size.as_ivec3() - IVec3::ONE);

        let mut changed = Vec::new();
        for z in lo.z..=hi.z {
            for y in lo.y..=hi.y {
                for x in lo.x..=hi.x {
                    let p = IVec3::new(x, y, z);
                    if (p - center).as_vec3().length() > radius {
                        continue;
                    }
                    let cell = match kind {
                        BrushKind::Empty => Cell::Empty,
                        BrushKind::Solid => Cell::Solid,
                        BrushKind::Fluid => Cell::fluid(1.0, capacity),
                    };
                    if self.at(p) != cell {
                        self.put(p, cell);
                        changed.push(p);
                    }
                }
            }
        }
        changed
    }
}
