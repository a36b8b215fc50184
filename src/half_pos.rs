//! The half-precision position mirror (spec §3, §4.3 build step 2).
//!
//! Point-index candidate search reads half-precision positions exclusively — the
//! full-precision buffer is only a build-time input and is not retained across calls.

use glam::Vec3;
use half::f16;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct HalfVec3 {
    pub x: f16,
    pub y: f16,
    pub z: f16,
}

impl HalfVec3 {
    #[inline]
    pub fn from_vec3(v: Vec3) -> Self {
        Self {
            x: f16::from_f32(v.x),
            y: f16::from_f32(v.y),
            z: f16::from_f32(v.z),
        }
    }

    #[inline]
    pub fn to_vec3(self) -> Vec3 {
        Vec3::new(self.x.to_f32(), self.y.to_f32(), self.z.to_f32())
    }
}
