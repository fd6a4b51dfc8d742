// src/utils/geometry.rs
use serde::{Deserialize, Serialize};
use std::ops::{Add, Mul};

/// A point or extent in world space. `y` is up.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vector3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vector3 {
    pub const ZERO: Vector3 = Vector3 { x: 0.0, y: 0.0, z: 0.0 };
    pub const ONE: Vector3 = Vector3 { x: 1.0, y: 1.0, z: 1.0 };
    /// One unit towards `-x` and `-z`; every outer wall segment is shifted by it.
    pub const LEFT_BACK: Vector3 = Vector3 { x: -1.0, y: 0.0, z: -1.0 };

    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub const fn splat(v: f32) -> Self {
        Self { x: v, y: v, z: v }
    }
}

impl Add for Vector3 {
    type Output = Vector3;

    fn add(self, rhs: Vector3) -> Vector3 {
        Vector3::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Mul<f32> for Vector3 {
    type Output = Vector3;

    fn mul(self, rhs: f32) -> Vector3 {
        Vector3::new(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}

/// Euler rotation in degrees. Only yaw (about `y`) and roll (about `z`) are ever
/// produced by the layout planner, but hosts receive the full triple.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rotation {
    pub pitch: f32,
    pub yaw: f32,
    pub roll: f32,
}

impl Rotation {
    pub const IDENTITY: Rotation = Rotation { pitch: 0.0, yaw: 0.0, roll: 0.0 };

    pub const fn from_yaw(yaw: f32) -> Self {
        Self { pitch: 0.0, yaw, roll: 0.0 }
    }

    pub const fn from_roll(roll: f32) -> Self {
        Self { pitch: 0.0, yaw: 0.0, roll }
    }
}
