// src/physics/ground.rs
//! Static ground surfaces the collision scene is built on.

use bevy::prelude::*;
use std::sync::Arc;

/// Distance used for central-difference gradients.
const GRADIENT_STEP: f32 = 0.05;

/// Ground height sampler (required).
pub trait HeightSampler: Send + Sync + 'static {
    /// Returns ground height (Y) at world XZ.
    fn sample_height(&self, x: f32, z: f32) -> f32;
}

/// Ground normal/slope sampling. The default derives both from heights.
pub trait SlopeSampler: HeightSampler {
    /// Returns the unit surface normal at world XZ.
    fn sample_normal(&self, x: f32, z: f32) -> Vec3 {
        let d = GRADIENT_STEP;
        let dhdx = (self.sample_height(x + d, z) - self.sample_height(x - d, z)) / (2.0 * d);
        let dhdz = (self.sample_height(x, z + d) - self.sample_height(x, z - d)) / (2.0 * d);
        Vec3::new(-dhdx, 1.0, -dhdz).normalize()
    }

    /// Returns slope in degrees at world XZ.
    fn slope_deg(&self, x: f32, z: f32) -> f32 {
        slope_angle_deg(self.sample_normal(x, z))
    }
}

/// Angle between world-up and `normal`, in degrees.
pub fn slope_angle_deg(normal: Vec3) -> f32 {
    Vec3::Y.angle_between(normal).to_degrees()
}

/// The ground the current level stands on.
#[derive(Resource, Clone, Deref)]
pub struct Ground(pub Arc<dyn SlopeSampler>);

impl Ground {
    pub fn new(surface: impl SlopeSampler) -> Self {
        Self(Arc::new(surface))
    }
}

impl Default for Ground {
    fn default() -> Self {
        Self::new(FlatGround::default())
    }
}

#[derive(Resource, Default, Clone, Copy, Debug)]
pub struct FlatGround {
    pub y: f32,
}

impl HeightSampler for FlatGround {
    fn sample_height(&self, _x: f32, _z: f32) -> f32 {
        self.y
    }
}

impl SlopeSampler for FlatGround {
    fn sample_normal(&self, _x: f32, _z: f32) -> Vec3 {
        Vec3::Y
    }
}

/// Which way a ramp rises.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RampAxis {
    PosX,
    PosZ,
}

/// A planar incline over an XZ rectangle, rising from `min` along `axis`.
#[derive(Clone, Copy, Debug)]
pub struct Ramp {
    pub min_xz: Vec2,
    pub max_xz: Vec2,
    pub axis: RampAxis,
    pub angle_deg: f32,
}

impl Ramp {
    pub fn contains_xz(&self, x: f32, z: f32) -> bool {
        x >= self.min_xz.x && x <= self.max_xz.x && z >= self.min_xz.y && z <= self.max_xz.y
    }

    /// Height above the ramp's foot at world XZ (inside the footprint).
    pub fn rise_at(&self, x: f32, z: f32) -> f32 {
        let run = match self.axis {
            RampAxis::PosX => x - self.min_xz.x,
            RampAxis::PosZ => z - self.min_xz.y,
        };
        run * self.angle_deg.to_radians().tan()
    }

    pub fn top_height(&self) -> f32 {
        let (x, z) = (self.max_xz.x, self.max_xz.y);
        self.rise_at(x, z)
    }

    pub fn center_xz(&self) -> Vec2 {
        (self.min_xz + self.max_xz) * 0.5
    }
}

/// Flat floor plus any number of ramps; the highest surface wins.
#[derive(Clone, Debug, Default)]
pub struct RampGround {
    pub floor_y: f32,
    pub ramps: Vec<Ramp>,
}

impl HeightSampler for RampGround {
    fn sample_height(&self, x: f32, z: f32) -> f32 {
        self.ramps
            .iter()
            .filter(|r| r.contains_xz(x, z))
            .map(|r| self.floor_y + r.rise_at(x, z))
            .fold(self.floor_y, f32::max)
    }
}

impl SlopeSampler for RampGround {}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp_30() -> RampGround {
        RampGround {
            floor_y: 0.0,
            ramps: vec![Ramp {
                min_xz: Vec2::new(0.0, -5.0),
                max_xz: Vec2::new(10.0, 5.0),
                axis: RampAxis::PosX,
                angle_deg: 30.0,
            }],
        }
    }

    #[test]
    fn flat_ground_is_level() {
        let g = FlatGround { y: 2.0 };
        assert_eq!(g.sample_height(100.0, -3.0), 2.0);
        assert_eq!(g.slope_deg(1.0, 1.0), 0.0);
    }

    #[test]
    fn ramp_height_and_slope() {
        let g = ramp_30();
        let expected = 4.0 * 30f32.to_radians().tan();
        assert!((g.sample_height(4.0, 0.0) - expected).abs() < 1e-4);
        assert!((g.slope_deg(5.0, 0.0) - 30.0).abs() < 0.1);

        // normal leans away from the rise
        let n = g.sample_normal(5.0, 0.0);
        assert!(n.x < 0.0 && n.y > 0.0);
    }

    #[test]
    fn outside_ramps_is_floor() {
        let g = ramp_30();
        assert_eq!(g.sample_height(-3.0, 0.0), 0.0);
        assert_eq!(g.sample_height(4.0, 8.0), 0.0);
        assert!(g.slope_deg(-3.0, 0.0).abs() < 1e-3);
    }
}
