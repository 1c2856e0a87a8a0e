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
use std::fmt;
use std::ops::{Add, Div, Mul, Neg, Sub};

use crate::consts::remainder;

/// Angle represents a 1D angle, stored in radians.
#[derive(Clone, Copy, PartialEq, PartialOrd, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Angle(pub f64);

/// An angle expressed in degrees, convertible into an Angle.
#[derive(Clone, Copy, PartialEq, PartialOrd, Debug)]
pub struct Deg(pub f64);

/// An angle expressed in radians, convertible into an Angle.
#[derive(Clone, Copy, PartialEq, PartialOrd, Debug)]
pub struct Rad(pub f64);

impl From<Deg> for Angle {
    fn from(d: Deg) -> Angle {
        Angle(d.0 * (PI / 180.))
    }
}

impl From<Rad> for Angle {
    fn from(r: Rad) -> Angle {
        Angle(r.0)
    }
}

impl From<Angle> for Deg {
    fn from(a: Angle) -> Deg {
        Deg(a.deg())
    }
}

impl Angle {
    pub fn rad(&self) -> f64 {
        self.0
    }

    pub fn deg(&self) -> f64 {
        self.0 * (180. / PI)
    }

    pub fn inf() -> Angle {
        Angle(f64::INFINITY)
    }

    pub fn is_inf(&self) -> bool {
        self.0.is_infinite()
    }

    pub fn abs(&self) -> Angle {
        Angle(self.0.abs())
    }

    pub fn min(self, other: Angle) -> Angle {
        Angle(self.0.min(other.0))
    }

    pub fn max(self, other: Angle) -> Angle {
        Angle(self.0.max(other.0))
    }

    /// Returns an equivalent angle in (-π, π].
    pub fn normalized(&self) -> Angle {
        let rad = remainder(self.0, 2. * PI);
        if rad <= -PI {
            Angle(PI)
        } else {
            Angle(rad)
        }
    }
}

impl fmt::Display for Angle {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:.7}", self.deg())
    }
}

impl Add for Angle {
    type Output = Angle;
    fn add(self, other: Angle) -> Angle {
        Angle(self.0 + other.0)
    }
}

impl Sub for Angle {
    type Output = Angle;
    fn sub(self, other: Angle) -> Angle {
        Angle(self.0 - other.0)
    }
}

impl Mul<f64> for Angle {
    type Output = Angle;
    fn mul(self, m: f64) -> Angle {
        Angle(self.0 * m)
    }
}

impl Mul<Angle> for f64 {
    type Output = Angle;
    fn mul(self, a: Angle) -> Angle {
        Angle(self * a.0)
    }
}

impl Div<f64> for Angle {
    type Output = Angle;
    fn div(self, d: f64) -> Angle {
        Angle(self.0 / d)
    }
}

impl Neg for Angle {
    type Output = Angle;
    fn neg(self) -> Angle {
        Angle(-self.0)
    }
}
