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

use std::f64::consts::PI;
use std::ops::{Add, Sub};

use crate::consts::DBL_EPSILON;
use crate::s1::angle::Angle;

/// ChordAngle represents the angle subtended by a chord (i.e., the straight
/// line segment connecting two points on the sphere). Its representation
/// makes it very efficient for computing and comparing distances, but unlike
/// Angle it is only capable of representing angles between 0 and π radians.
/// The value is the squared chord length, capped at 4.
#[derive(Clone, Copy, PartialEq, PartialOrd, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ChordAngle(pub f64);

/// Represents a chord angle smaller than the zero angle.
pub const NEGATIVE: ChordAngle = ChordAngle(-1.);
/// A chord angle of 90 degrees.
pub const RIGHT: ChordAngle = ChordAngle(2.);
/// A chord angle of 180 degrees, the maximum finite chord angle.
pub const STRAIGHT: ChordAngle = ChordAngle(4.);

/// The square of the maximum chord length.
const MAX_LENGTH2: f64 = 4.;

impl ChordAngle {
    /// Returns a chord angle from the squared chord length, clamped to the
    /// valid range.
    pub fn from_squared_length(length2: f64) -> ChordAngle {
        if length2 > MAX_LENGTH2 {
            STRAIGHT
        } else {
            ChordAngle(length2)
        }
    }

    pub fn infinity() -> ChordAngle {
        ChordAngle(f64::INFINITY)
    }

    pub fn is_infinity(&self) -> bool {
        self.0.is_infinite()
    }

    /// Reports whether this is the negative or infinite chord angle.
    pub fn is_special(&self) -> bool {
        self.0 < 0. || self.is_infinity()
    }

    pub fn is_valid(&self) -> bool {
        (self.0 >= 0. && self.0 <= MAX_LENGTH2) || self.is_special()
    }

    pub fn angle(&self) -> Angle {
        if self.0 < 0. {
            return Angle(-1.);
        }
        if self.is_infinity() {
            return Angle::inf();
        }
        Angle(2. * (0.5 * self.0.sqrt()).asin())
    }

    /// Returns the smallest representable chord angle larger than this one.
    pub fn successor(&self) -> ChordAngle {
        if self.0 >= MAX_LENGTH2 {
            return ChordAngle::infinity();
        }
        if self.0 < 0. {
            return ChordAngle(0.);
        }
        ChordAngle(libm::nextafter(self.0, 10.))
    }

    /// Returns the largest representable chord angle less than this one.
    pub fn predecessor(&self) -> ChordAngle {
        if self.0 <= 0. {
            return NEGATIVE;
        }
        if self.0 > MAX_LENGTH2 {
            return STRAIGHT;
        }
        ChordAngle(libm::nextafter(self.0, -10.))
    }

    /// Returns the maximum error for a chord angle constructed as the
    /// squared distance between two unit-length points.
    pub fn max_point_error(&self) -> f64 {
        4.5 * DBL_EPSILON * self.0 + 16. * DBL_EPSILON * DBL_EPSILON
    }

    /// Returns the maximum error for a chord angle constructed from an Angle.
    pub fn max_angle_error(&self) -> f64 {
        DBL_EPSILON * self.0
    }

    /// Returns a new chord angle that has been adjusted by the given error
    /// bound. Special values are returned unchanged.
    pub fn expanded(&self, e: f64) -> ChordAngle {
        if self.is_special() {
            return *self;
        }
        ChordAngle(0f64.max(MAX_LENGTH2.min(self.0 + e)))
    }

    pub fn sin2(&self) -> f64 {
        // sin²(θ) = l²(1 - l²/4) where l is the chord length.
        self.0 * (1. - 0.25 * self.0)
    }

    pub fn sin(&self) -> f64 {
        self.sin2().sqrt()
    }

    pub fn cos(&self) -> f64 {
        1. - 0.5 * self.0
    }
}

impl From<Angle> for ChordAngle {
    fn from(a: Angle) -> ChordAngle {
        if a.0 < 0. {
            return NEGATIVE;
        }
        if a.is_inf() {
            return ChordAngle::infinity();
        }
        let l = 2. * (0.5 * a.0.min(PI)).sin();
        ChordAngle(l * l)
    }
}

impl From<ChordAngle> for Angle {
    fn from(c: ChordAngle) -> Angle {
        c.angle()
    }
}

impl Add for ChordAngle {
    type Output = ChordAngle;
    /// Adds the two angles, treating them as arc lengths. The result is
    /// capped at 180 degrees.
    fn add(self, other: ChordAngle) -> ChordAngle {
        if other.0 == 0. {
            return self;
        }
        if self.0 + other.0 >= MAX_LENGTH2 {
            return STRAIGHT;
        }
        // The sum of sin and cos terms is computed with the half-angle
        // identities, which keeps precision for small chords.
        let x = self.0 * (1. - 0.25 * other.0);
        let y = other.0 * (1. - 0.25 * self.0);
        ChordAngle(MAX_LENGTH2.min(x + y + 2. * (x * y).sqrt()))
    }
}

impl Sub for ChordAngle {
    type Output = ChordAngle;
    fn sub(self, other: ChordAngle) -> ChordAngle {
        if other.0 == 0. {
            return self;
        }
        if self.0 <= other.0 {
            return ChordAngle(0.);
        }
        let x = self.0 * (1. - 0.25 * other.0);
        let y = other.0 * (1. - 0.25 * self.0);
        ChordAngle(0f64.max(x + y - 2. * (x * y).sqrt()))
    }
}
