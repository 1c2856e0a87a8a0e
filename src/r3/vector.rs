// Copyright 2017 Google Inc. All rights reserved.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, Mul, Neg, Sub};

use crate::s1::angle::Angle;

/// Vector represents a point in ℝ³.
#[derive(Clone, Copy, PartialEq, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Vector {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

/// Axis enumerates the 3 axes of ℝ³.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl fmt::Display for Vector {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "({:.24}, {:.24}, {:.24})", self.x, self.y, self.z)
    }
}

impl Vector {
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Vector { x, y, z }
    }

    pub fn abs(&self) -> Vector {
        Vector::new(self.x.abs(), self.y.abs(), self.z.abs())
    }

    pub fn norm2(&self) -> f64 {
        self.dot(self)
    }

    pub fn norm(&self) -> f64 {
        self.norm2().sqrt()
    }

    /// Returns a unit vector in the same direction as v. The zero vector is
    /// returned unchanged.
    pub fn normalize(&self) -> Vector {
        let n2 = self.norm2();
        if n2 == 0. {
            return Vector::default();
        }
        *self * (1. / n2.sqrt())
    }

    /// Reports whether the vector is of approximately unit length.
    pub fn is_unit(&self) -> bool {
        const UNIT_LENGTH_EPSILON: f64 = 1e-14;
        (self.norm2() - 1.).abs() <= UNIT_LENGTH_EPSILON
    }

    pub fn dot(&self, other: &Vector) -> f64 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    pub fn cross(&self, other: &Vector) -> Vector {
        Vector::new(
            self.y * other.z - self.z * other.y,
            self.z * other.x - self.x * other.z,
            self.x * other.y - self.y * other.x,
        )
    }

    pub fn distance(&self, other: &Vector) -> f64 {
        (*self - *other).norm()
    }

    /// Returns the angle between v and other.
    pub fn angle(&self, other: &Vector) -> Angle {
        Angle(self.cross(other).norm().atan2(self.dot(other)))
    }

    /// Returns a unit vector that is orthogonal to v.
    /// ortho(-v) = -ortho(v) for all v.
    pub fn ortho(&self) -> Vector {
        // Grow a component other than the largest in v, to guarantee that they
        // aren't parallel (which would make the cross product zero).
        let mut other = Vector::new(0.012, 0.0053, 0.00457);
        match self.largest_component() {
            Axis::X => other.z = 1.,
            Axis::Y => other.x = 1.,
            Axis::Z => other.y = 1.,
        }
        self.cross(&other).normalize()
    }

    /// Returns the axis that represents the largest component in this vector.
    pub fn largest_component(&self) -> Axis {
        let t = self.abs();
        if t.x > t.y {
            if t.x > t.z {
                Axis::X
            } else {
                Axis::Z
            }
        } else if t.y > t.z {
            Axis::Y
        } else {
            Axis::Z
        }
    }

    /// Returns the axis that represents the smallest component in this vector.
    pub fn smallest_component(&self) -> Axis {
        let t = self.abs();
        if t.x < t.y {
            if t.x < t.z {
                Axis::X
            } else {
                Axis::Z
            }
        } else if t.y < t.z {
            Axis::Y
        } else {
            Axis::Z
        }
    }

    /// Lexicographic comparison of the components. NaN components compare
    /// equal to everything, which keeps the ordering total on valid input.
    pub fn cmp(&self, other: &Vector) -> Ordering {
        let by = |a: f64, b: f64| a.partial_cmp(&b).unwrap_or(Ordering::Equal);
        by(self.x, other.x)
            .then_with(|| by(self.y, other.y))
            .then_with(|| by(self.z, other.z))
    }
}

impl Add for Vector {
    type Output = Vector;
    fn add(self, other: Vector) -> Vector {
        Vector::new(self.x + other.x, self.y + other.y, self.z + other.z)
    }
}

impl Sub for Vector {
    type Output = Vector;
    fn sub(self, other: Vector) -> Vector {
        Vector::new(self.x - other.x, self.y - other.y, self.z - other.z)
    }
}

impl Mul<f64> for Vector {
    type Output = Vector;
    fn mul(self, m: f64) -> Vector {
        Vector::new(self.x * m, self.y * m, self.z * m)
    }
}

impl Neg for Vector {
    type Output = Vector;
    fn neg(self) -> Vector {
        Vector::new(-self.x, -self.y, -self.z)
    }
}
