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

use std::str::FromStr;

use bigdecimal::BigDecimal;

use crate::r3::vector::Vector;

/// Number of fractional digits needed to print any finite f64 exactly in
/// scientific notation.
const EXACT_DIGITS: usize = 767;

/// Converts a finite f64 into a BigDecimal without rounding.
pub fn exact_decimal(x: f64) -> BigDecimal {
    if x == 0. || !x.is_finite() {
        return BigDecimal::from(0);
    }
    let text = format!("{:.*e}", EXACT_DIGITS, x);
    BigDecimal::from_str(&text).unwrap_or_else(|_| BigDecimal::from(0))
}

/// Returns -1, 0 or +1 according to the sign of d.
pub fn sign_of(d: &BigDecimal) -> i32 {
    let zero = BigDecimal::from(0);
    if *d > zero {
        1
    } else if *d < zero {
        -1
    } else {
        0
    }
}

/// PreciseVector represents a point in ℝ³ using exact decimal arithmetic.
/// Products and differences of f64 inputs are computed without rounding,
/// which makes determinant signs exact.
#[derive(Clone, Debug, PartialEq)]
pub struct PreciseVector {
    pub x: BigDecimal,
    pub y: BigDecimal,
    pub z: BigDecimal,
}

impl From<&Vector> for PreciseVector {
    fn from(v: &Vector) -> Self {
        PreciseVector {
            x: exact_decimal(v.x),
            y: exact_decimal(v.y),
            z: exact_decimal(v.z),
        }
    }
}

impl PreciseVector {
    pub fn dot(&self, other: &PreciseVector) -> BigDecimal {
        &self.x * &other.x + &self.y * &other.y + &self.z * &other.z
    }

    pub fn cross(&self, other: &PreciseVector) -> PreciseVector {
        PreciseVector {
            x: &self.y * &other.z - &self.z * &other.y,
            y: &self.z * &other.x - &self.x * &other.z,
            z: &self.x * &other.y - &self.y * &other.x,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_decimal_is_lossless() {
        let third = 1.0 / 3.0;
        let d = exact_decimal(third);
        // The exact value of the nearest double to 1/3 has 54 significant digits.
        assert_ne!(d, BigDecimal::from_str("0.3333333333333333").unwrap());
        assert_eq!(sign_of(&(&d - &exact_decimal(third))), 0);
        assert_eq!(sign_of(&exact_decimal(-1e-300)), -1);
        assert_eq!(sign_of(&exact_decimal(0.)), 0);
    }

    #[test]
    fn test_cross_detects_tiny_determinants() {
        // These vectors are nearly parallel; floating point loses the sign of
        // the z component of their cross product.
        let a = Vector::new(1., 1e-20, 0.);
        let b = Vector::new(1., 2e-20, 0.);
        let c = PreciseVector::from(&a).cross(&PreciseVector::from(&b));
        assert_eq!(sign_of(&c.z), 1);
        assert_eq!(sign_of(&c.x), 0);
        assert_eq!(sign_of(&c.y), 0);
    }
}
