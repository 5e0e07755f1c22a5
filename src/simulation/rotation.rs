use std::fmt;

use glam::{EulerRot, Quat};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// A world-space rotation of the structure, in degrees
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RotationAction {
    /// About the world X axis
    pub pitch: f32,
    /// About the world Y axis
    pub yaw: f32,
    /// About the world Z axis
    pub roll: f32,
}

impl RotationAction {
    pub const IDENTITY: Self = Self {
        pitch: 0.0,
        yaw: 0.0,
        roll: 0.0,
    };

    pub fn new(pitch: f32, yaw: f32, roll: f32) -> Self {
        Self { pitch, yaw, roll }
    }

    pub fn pitch(degrees: f32) -> Self {
        Self::new(degrees, 0.0, 0.0)
    }

    pub fn roll(degrees: f32) -> Self {
        Self::new(0.0, 0.0, degrees)
    }

    /// Rotation applied as yaw, then pitch, then roll
    pub fn quat(&self) -> Quat {
        Quat::from_euler(
            EulerRot::YXZ,
            self.yaw.to_radians(),
            self.pitch.to_radians(),
            self.roll.to_radians(),
        )
    }

    /// Uniformly random rotation.
    ///
    /// Planar structures only roll, so gravity stays in their plane.
    /// Otherwise pitch is an inclination drawn so the tilted axis is uniform
    /// on the sphere, and yaw is uniform around it.
    pub fn random<R: Rng>(rng: &mut R, planar: bool) -> Self {
        if planar {
            return Self::roll(rng.gen_range(0.0..360.0));
        }
        let u: f32 = rng.gen();
        let v: f32 = rng.gen();
        let inclination = (2.0 * u - 1.0).clamp(-1.0, 1.0).acos().to_degrees();
        let azimuth = 360.0 * v;
        Self::new(inclination, azimuth, 0.0)
    }
}

impl fmt::Display for RotationAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{},{})", self.pitch, self.yaw, self.roll)
    }
}
