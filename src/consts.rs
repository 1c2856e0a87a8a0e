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

/// Tolerance used by approximate comparisons throughout the crate.
pub const EPSILON: f64 = 1e-15;

/// Machine epsilon of a 64-bit float (2^-52).
pub const DBL_EPSILON: f64 = f64::EPSILON;

pub use std::f64::consts::{FRAC_PI_2, PI};

/// IEEE 754 remainder: x - n*y where n is x/y rounded to the nearest integer
/// (ties to even). The result lies in [-|y|/2, |y|/2].
#[inline]
pub fn remainder(x: f64, y: f64) -> f64 {
    libm::remainder(x, y)
}

#[macro_export]
macro_rules! f64_eq {
    ($x:expr, $y:expr) => {
        (($x) - ($y)).abs() <= $crate::consts::EPSILON
    };
}

#[macro_export]
macro_rules! f64_near {
    ($x:expr, $y:expr, $eps:expr) => {
        (($x) - ($y)).abs() <= $eps
    };
}
