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

use crate::consts::{remainder, EPSILON};
use crate::s1::angle::Angle;

/// Interval represents a closed interval on a unit circle (also known as a
/// 1-dimensional sphere). It is capable of representing the empty interval
/// (containing no points), the full interval (containing all points), and
/// zero-length intervals (containing a single point).
///
/// Points are represented by the angle they make with the positive x-axis in
/// the range [-π, π]. An interval is represented by its lower and upper
/// bounds (both inclusive, since the interval is closed). The lower bound may
/// be greater than the upper bound, in which case the interval is "inverted"
/// (i.e. it passes through the point (-1, 0)).
///
/// The point (-1, 0) has two valid representations, π and -π. The normalized
/// representation of this point is π, so that endpoints of normal intervals
/// are in the range (-π, π]. We normalize the latter to the former in
/// Interval::new(). There are two special intervals that take advantage of
/// that:
///   - the full interval, [-π, π]
///   - the empty interval, [π, -π].
#[derive(Clone, Copy, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Interval {
    pub lo: f64,
    pub hi: f64,
}

pub const EMPTY: Interval = Interval { lo: PI, hi: -PI };
pub const FULL: Interval = Interval { lo: -PI, hi: PI };

impl Default for Interval {
    fn default() -> Self {
        EMPTY
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "[{:.7}, {:.7}]", self.lo, self.hi)
    }
}

/// Computes the distance from a to b in [0, 2π], walking counterclockwise.
/// This is equivalent to remainder(b - a - π, 2π) + π, except that it is
/// more numerically stable (it does not lose precision for very small
/// positive distances).
fn positive_distance(a: f64, b: f64) -> f64 {
    let d = b - a;
    if d >= 0. {
        d
    } else {
        // We want to ensure that if b == π and a == (-π + eps),
        // the return result is approximately 2π and not zero.
        (b + PI) - (a - PI)
    }
}

impl Interval {
    /// Constructs a new interval from endpoints. Both arguments must be in
    /// the range [-π,π]. This function allows inverted intervals to be
    /// created.
    pub fn new(lo: f64, hi: f64) -> Self {
        let mut i = Interval { lo, hi };
        if lo == -PI && hi != PI {
            i.lo = PI;
        }
        if hi == -PI && lo != PI {
            i.hi = PI;
        }
        i
    }

    pub fn empty() -> Self {
        EMPTY
    }

    pub fn full() -> Self {
        FULL
    }

    /// Returns the minimal interval containing the two given points.
    /// Both arguments must be in [-π,π].
    pub fn from_point_pair(mut a: f64, mut b: f64) -> Self {
        if a == -PI {
            a = PI;
        }
        if b == -PI {
            b = PI;
        }
        if positive_distance(a, b) <= PI {
            Interval { lo: a, hi: b }
        } else {
            Interval { lo: b, hi: a }
        }
    }

    pub fn is_valid(&self) -> bool {
        self.lo.abs() <= PI
            && self.hi.abs() <= PI
            && !(self.lo == -PI && self.hi != PI)
            && !(self.hi == -PI && self.lo != PI)
    }

    pub fn is_full(&self) -> bool {
        self.lo == -PI && self.hi == PI
    }

    pub fn is_empty(&self) -> bool {
        self.lo == PI && self.hi == -PI
    }

    /// Reports whether the interval is inverted; that is, whether lo > hi.
    pub fn is_inverted(&self) -> bool {
        self.lo > self.hi
    }

    /// Returns the interval with endpoints swapped.
    pub fn invert(&self) -> Interval {
        Interval {
            lo: self.hi,
            hi: self.lo,
        }
    }

    pub fn center(&self) -> f64 {
        let c = 0.5 * (self.lo + self.hi);
        if !self.is_inverted() {
            return c;
        }
        if c <= 0. {
            c + PI
        } else {
            c - PI
        }
    }

    /// Returns the length of the interval. The length of an empty interval is
    /// negative.
    pub fn len(&self) -> f64 {
        let mut l = self.hi - self.lo;
        if l >= 0. {
            return l;
        }
        l += 2. * PI;
        if l > 0. {
            l
        } else {
            // Empty interval.
            -1.
        }
    }

    /// Assumes p ∈ (-π,π].
    fn fast_contains(&self, p: f64) -> bool {
        if self.is_inverted() {
            (p >= self.lo || p <= self.hi) && !self.is_empty()
        } else {
            p >= self.lo && p <= self.hi
        }
    }

    /// Returns true iff the interval contains p. Assumes p ∈ [-π,π].
    pub fn contains(&self, mut p: f64) -> bool {
        if p == -PI {
            p = PI;
        }
        self.fast_contains(p)
    }

    pub fn contains_interval(&self, oi: &Interval) -> bool {
        if self.is_inverted() {
            if oi.is_inverted() {
                return oi.lo >= self.lo && oi.hi <= self.hi;
            }
            return (oi.lo >= self.lo || oi.hi <= self.hi) && !self.is_empty();
        }
        if oi.is_inverted() {
            return self.is_full() || oi.is_empty();
        }
        oi.lo >= self.lo && oi.hi <= self.hi
    }

    /// Returns true iff the interior of the interval contains p.
    /// Assumes p ∈ [-π,π].
    pub fn interior_contains(&self, mut p: f64) -> bool {
        if p == -PI {
            p = PI;
        }
        if self.is_inverted() {
            p > self.lo || p < self.hi
        } else {
            (p > self.lo && p < self.hi) || self.is_full()
        }
    }

    pub fn interior_contains_interval(&self, oi: &Interval) -> bool {
        if self.is_inverted() {
            if oi.is_inverted() {
                return (oi.lo > self.lo && oi.hi < self.hi) || oi.is_empty();
            }
            return oi.lo > self.lo || oi.hi < self.hi;
        }
        if oi.is_inverted() {
            return self.is_full() || oi.is_empty();
        }
        (oi.lo > self.lo && oi.hi < self.hi) || self.is_full()
    }

    pub fn intersects(&self, oi: &Interval) -> bool {
        if self.is_empty() || oi.is_empty() {
            return false;
        }
        if self.is_inverted() {
            return oi.is_inverted() || oi.lo <= self.hi || oi.hi >= self.lo;
        }
        if oi.is_inverted() {
            return oi.lo <= self.hi || oi.hi >= self.lo;
        }
        oi.lo <= self.hi && oi.hi >= self.lo
    }

    /// Returns true iff the interior of the interval contains any points in
    /// common with oi, including the latter's boundary.
    pub fn interior_intersects(&self, oi: &Interval) -> bool {
        if self.is_empty() || oi.is_empty() || self.lo == self.hi {
            return false;
        }
        if self.is_inverted() {
            return oi.is_inverted() || oi.lo < self.hi || oi.hi > self.lo;
        }
        if oi.is_inverted() {
            return oi.lo < self.hi || oi.hi > self.lo;
        }
        (oi.lo < self.hi && oi.hi > self.lo) || self.is_full()
    }

    /// Returns the smallest interval that contains both the interval and oi.
    pub fn union(&self, oi: &Interval) -> Interval {
        if oi.is_empty() {
            return *self;
        }
        if self.fast_contains(oi.lo) {
            if self.fast_contains(oi.hi) {
                // Either oi ⊂ self, or self ∪ oi is the full interval.
                if self.contains_interval(oi) {
                    return *self;
                }
                return FULL;
            }
            return Interval {
                lo: self.lo,
                hi: oi.hi,
            };
        }
        if self.fast_contains(oi.hi) {
            return Interval {
                lo: oi.lo,
                hi: self.hi,
            };
        }

        // Neither endpoint of oi is in self. Either self ⊂ oi, or they are
        // disjoint.
        if self.is_empty() || oi.fast_contains(self.lo) {
            return *oi;
        }

        // This is the only hard case where we need to find the closest pair of
        // endpoints.
        if positive_distance(oi.hi, self.lo) < positive_distance(self.hi, oi.lo) {
            Interval {
                lo: oi.lo,
                hi: self.hi,
            }
        } else {
            Interval {
                lo: self.lo,
                hi: oi.hi,
            }
        }
    }

    /// Returns the smallest interval that contains the intersection of the
    /// interval and oi.
    pub fn intersection(&self, oi: &Interval) -> Interval {
        if oi.is_empty() {
            return EMPTY;
        }
        if self.fast_contains(oi.lo) {
            if self.fast_contains(oi.hi) {
                // Either oi ⊂ self, or self and oi intersect twice. Neither are
                // empty. In the first case we want to return self (which is
                // shorter than oi). In the second case one of them is inverted,
                // and the smallest interval that covers the two disjoint pieces
                // is the shorter of the two.
                if oi.len() < self.len() {
                    return *oi;
                }
                return *self;
            }
            return Interval {
                lo: oi.lo,
                hi: self.hi,
            };
        }
        if self.fast_contains(oi.hi) {
            return Interval {
                lo: self.lo,
                hi: oi.hi,
            };
        }

        // Neither endpoint of oi is in self. Either self ⊂ oi, or they are
        // disjoint.
        if oi.fast_contains(self.lo) {
            return *self;
        }
        EMPTY
    }

    /// Returns the interval expanded by the minimum amount necessary such
    /// that it contains the given point p (an angle in the range [-π, π]).
    pub fn add_point(&self, mut p: f64) -> Interval {
        if p.abs() > PI {
            return *self;
        }
        if p == -PI {
            p = PI;
        }
        if self.fast_contains(p) {
            return *self;
        }
        if self.is_empty() {
            return Interval { lo: p, hi: p };
        }
        if positive_distance(p, self.lo) < positive_distance(self.hi, p) {
            Interval { lo: p, hi: self.hi }
        } else {
            Interval { lo: self.lo, hi: p }
        }
    }

    /// Returns the closest point in the interval to the given point p.
    /// The interval must be non-empty.
    pub fn clamp_point(&self, mut p: f64) -> f64 {
        if p == -PI {
            p = PI;
        }
        if self.fast_contains(p) {
            return p;
        }
        // Compute distance from p to each end point.
        let dlo = positive_distance(p, self.lo);
        let dhi = positive_distance(self.hi, p);
        if dlo < dhi {
            self.lo
        } else {
            self.hi
        }
    }

    /// Returns an interval that has been expanded on each side by margin.
    /// If margin is negative, then the function shrinks the interval on each
    /// side by margin instead. The resulting interval may be empty or full.
    /// Any expansion (positive or negative) of a full interval remains full,
    /// and any expansion of an empty interval remains empty.
    pub fn expanded(&self, margin: f64) -> Interval {
        if margin >= 0. {
            if self.is_empty() {
                return *self;
            }
            // Check whether this interval will be full after expansion,
            // allowing for a rounding error when computing each endpoint.
            if self.len() + 2. * margin + 2. * EPSILON >= 2. * PI {
                return FULL;
            }
        } else {
            if self.is_full() {
                return *self;
            }
            // Check whether this interval will be empty after expansion,
            // allowing for a rounding error when computing each endpoint.
            if self.len() + 2. * margin - 2. * EPSILON <= 0. {
                return EMPTY;
            }
        }

        let mut result = Interval::new(
            remainder(self.lo - margin, 2. * PI),
            remainder(self.hi + margin, 2. * PI),
        );
        if result.lo <= -PI {
            result.lo = PI;
        }
        result
    }

    /// Returns the complement of the interior of the interval. An interval
    /// and its complement have the same boundary but do not share any
    /// interior values. The complement operator is not a bijection, since the
    /// complement of a singleton interval (containing a single value) is the
    /// same as the complement of an empty interval.
    pub fn complement(&self) -> Interval {
        if self.lo == self.hi {
            // Singleton.
            return FULL;
        }
        // Handles empty and full.
        Interval {
            lo: self.hi,
            hi: self.lo,
        }
    }

    /// Returns the midpoint of the complement of the interval. For full and
    /// empty intervals, the result is arbitrary. For a singleton interval
    /// (containing a single point), the result is its antipodal point on S1.
    pub fn complement_center(&self) -> f64 {
        if self.lo != self.hi {
            return self.complement().center();
        }
        // Singleton. The interval just contains a single point.
        if self.hi <= 0. {
            self.hi + PI
        } else {
            self.hi - PI
        }
    }

    /// Returns the Hausdorff distance to the given interval y. For two
    /// intervals i and y, this distance is defined by
    ///     h(i, y) = max_{p in i} min_{q in y} d(p, q),
    /// where d(.,.) is measured along S1.
    pub fn directed_hausdorff_distance(&self, y: &Interval) -> Angle {
        if y.contains_interval(self) {
            // This includes the case self is empty.
            return Angle(0.);
        }
        if y.is_empty() {
            // Maximum possible distance on s1.
            return Angle(PI);
        }
        let y_complement_center = y.complement_center();
        if self.contains(y_complement_center) {
            return Angle(positive_distance(y.hi, y_complement_center));
        }

        // The Hausdorff distance is realized by either two self.hi endpoints
        // or two self.lo endpoints, whichever is farther apart.
        let hi_hi = if Interval::new(y.hi, y_complement_center).contains(self.hi) {
            positive_distance(y.hi, self.hi)
        } else {
            0.
        };
        let lo_lo = if Interval::new(y_complement_center, y.lo).contains(self.lo) {
            positive_distance(self.lo, y.lo)
        } else {
            0.
        };
        Angle(hi_hi.max(lo_lo))
    }

    /// Reports whether this interval can be transformed into the given
    /// interval by moving each endpoint a small distance. The empty interval
    /// is considered to be positioned arbitrarily on the circle, so it is
    /// equal to any interval of length at most 2 * EPSILON.
    pub fn approx_eq(&self, other: &Interval) -> bool {
        self.approx_eq_by(other, EPSILON)
    }

    pub fn approx_eq_by(&self, other: &Interval, max_error: f64) -> bool {
        // Full and empty intervals require special cases because the
        // endpoints are considered to be positioned arbitrarily.
        if self.is_empty() {
            return other.len() <= 2. * max_error;
        }
        if other.is_empty() {
            return self.len() <= 2. * max_error;
        }
        if self.is_full() {
            return other.len() >= 2. * (PI - max_error);
        }
        if other.is_full() {
            return self.len() >= 2. * (PI - max_error);
        }

        // The purpose of the last test below is to verify that moving the
        // endpoints does not invert the interval, e.g. [-1e20, 1e20] vs.
        // [1e20, -1e20].
        remainder(other.lo - self.lo, 2. * PI).abs() <= max_error
            && remainder(other.hi - self.hi, 2. * PI).abs() <= max_error
            && (self.len() - other.len()).abs() <= 2. * max_error
    }
}
