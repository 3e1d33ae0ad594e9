use std::{
    fmt,
    ops::{Add, Mul, Neg},
};

use serde::{Deserialize, Serialize};

use crate::error::{ReelError, ReelResult};

/// Integer position or vector on the puzzle grid.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Coords3D {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl Coords3D {
    pub const ORIGIN: Self = Self::new(0, 0, 0);

    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Inclusive bounding-box test.
    pub fn is_within(self, start: Self, end: Self) -> bool {
        (start.x..=end.x).contains(&self.x)
            && (start.y..=end.y).contains(&self.y)
            && (start.z..=end.z).contains(&self.z)
    }

    /// Unit vector along the single non-zero axis of `self`.
    ///
    /// The zero vector maps to itself. A vector with more than one non-zero
    /// component has no axis direction and is an error.
    pub fn direction(self) -> ReelResult<Self> {
        let non_zero = [self.x, self.y, self.z]
            .iter()
            .filter(|c| **c != 0)
            .count();
        if non_zero > 1 {
            return Err(ReelError::geometry(format!(
                "vector {self} is not aligned with an axis"
            )));
        }
        Ok(Self::new(self.x.signum(), self.y.signum(), self.z.signum()))
    }

    /// Quarter turn around the x axis.
    pub fn rot90_x(&mut self) {
        *self = Self::new(self.x, -self.z, self.y);
    }

    /// Quarter turn around the y axis.
    pub fn rot90_y(&mut self) {
        *self = Self::new(self.z, self.y, -self.x);
    }

    /// Quarter turn around the z axis.
    pub fn rot90_z(&mut self) {
        *self = Self::new(-self.y, self.x, self.z);
    }

    pub fn translate(&mut self, vect: Self) {
        *self = *self + vect;
    }

    /// Vector that moves `self` back onto the cube `[0, bb_len]` on every axis.
    pub fn bb_vect(self, bb_len: i32) -> Self {
        let axis = |c: i32| {
            if c < 0 {
                -c
            } else if c >= bb_len {
                bb_len - c
            } else {
                0
            }
        };
        Self::new(axis(self.x), axis(self.y), axis(self.z))
    }
}

impl Add for Coords3D {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self::new(self.x + other.x, self.y + other.y, self.z + other.z)
    }
}

impl Mul<i32> for Coords3D {
    type Output = Self;

    fn mul(self, k: i32) -> Self {
        Self::new(self.x * k, self.y * k, self.z * k)
    }
}

impl Neg for Coords3D {
    type Output = Self;

    fn neg(self) -> Self {
        Self::new(-self.x, -self.y, -self.z)
    }
}

impl fmt::Display for Coords3D {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}
