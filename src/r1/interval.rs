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

use std::fmt;

use crate::consts::EPSILON;

/// Interval represents a closed interval on ℝ.
/// Zero-length intervals (where lo == hi) represent single points.
/// If lo > hi then the interval is empty.
#[derive(Clone, Copy, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Interval {
    pub lo: f64,
    pub hi: f64,
}

/// The canonical empty interval.
pub const EMPTY: Interval = Interval { lo: 1., hi: 0. };

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

impl Interval {
    pub fn new(lo: f64, hi: f64) -> Self {
        Interval { lo, hi }
    }

    pub fn empty() -> Self {
        EMPTY
    }

    /// Returns an interval representing a single point.
    pub fn from_point(p: f64) -> Self {
        Interval { lo: p, hi: p }
    }

    /// Returns the minimal interval containing both points.
    pub fn from_point_pair(a: f64, b: f64) -> Self {
        if a <= b {
            Interval { lo: a, hi: b }
        } else {
            Interval { lo: b, hi: a }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.lo > self.hi
    }

    pub fn center(&self) -> f64 {
        0.5 * (self.lo + self.hi)
    }

    /// Returns the length of the interval. Empty intervals have a negative length.
    pub fn len(&self) -> f64 {
        self.hi - self.lo
    }

    pub fn contains(&self, p: f64) -> bool {
        self.lo <= p && p <= self.hi
    }

    pub fn contains_interval(&self, oi: &Interval) -> bool {
        if oi.is_empty() {
            return true;
        }
        self.lo <= oi.lo && oi.hi <= self.hi
    }

    pub fn interior_contains(&self, p: f64) -> bool {
        self.lo < p && p < self.hi
    }

    pub fn interior_contains_interval(&self, oi: &Interval) -> bool {
        if oi.is_empty() {
            return true;
        }
        self.lo < oi.lo && oi.hi < self.hi
    }

    pub fn intersects(&self, oi: &Interval) -> bool {
        if self.lo <= oi.lo {
            oi.lo <= self.hi && oi.lo <= oi.hi
        } else {
            self.lo <= oi.hi && self.lo <= self.hi
        }
    }

    /// Reports whether the interior of this interval intersects any point of
    /// the other (including its boundary).
    pub fn interior_intersects(&self, oi: &Interval) -> bool {
        oi.lo < self.hi && self.lo < oi.hi && self.lo < self.hi && oi.lo <= oi.hi
    }

    pub fn intersection(&self, oi: &Interval) -> Interval {
        Interval {
            lo: self.lo.max(oi.lo),
            hi: self.hi.min(oi.hi),
        }
    }

    /// Returns the smallest interval that contains both intervals.
    pub fn union(&self, oi: &Interval) -> Interval {
        if self.is_empty() {
            return *oi;
        }
        if oi.is_empty() {
            return *self;
        }
        Interval {
            lo: self.lo.min(oi.lo),
            hi: self.hi.max(oi.hi),
        }
    }

    pub fn add_point(&self, p: f64) -> Interval {
        if self.is_empty() {
            Interval { lo: p, hi: p }
        } else if p < self.lo {
            Interval { lo: p, hi: self.hi }
        } else if p > self.hi {
            Interval { lo: self.lo, hi: p }
        } else {
            *self
        }
    }

    /// Returns the closest point in the interval to p.
    /// The interval must be non-empty.
    pub fn clamp_point(&self, p: f64) -> f64 {
        self.lo.max(self.hi.min(p))
    }

    /// Returns an interval that has been expanded on each side by margin.
    /// A negative margin shrinks the interval and may produce an empty one.
    pub fn expanded(&self, margin: f64) -> Interval {
        if self.is_empty() {
            return *self;
        }
        Interval {
            lo: self.lo - margin,
            hi: self.hi + margin,
        }
    }

    /// Returns the Hausdorff distance to the given interval. For two
    /// intervals x and y this is max over p in x of min over q in y of d(p, q).
    pub fn directed_hausdorff_distance(&self, other: &Interval) -> f64 {
        if self.is_empty() {
            return 0.;
        }
        if other.is_empty() {
            return f64::INFINITY;
        }
        0f64.max((self.hi - other.hi).max(other.lo - self.lo))
    }

    /// Reports whether the interval can be transformed into the other by
    /// moving each endpoint by at most EPSILON.
    pub fn approx_eq(&self, other: &Interval) -> bool {
        self.approx_eq_by(other, EPSILON)
    }

    pub fn approx_eq_by(&self, other: &Interval, max_error: f64) -> bool {
        if self.is_empty() {
            return other.len() <= 2. * max_error;
        }
        if other.is_empty() {
            return self.len() <= 2. * max_error;
        }
        (other.lo - self.lo).abs() <= max_error && (other.hi - self.hi).abs() <= max_error
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const UNIT: Interval = Interval { lo: 0., hi: 1. };
    const NEG_UNIT: Interval = Interval { lo: -1., hi: 0. };
    const HALF: Interval = Interval { lo: 0.5, hi: 0.5 };

    #[test]
    fn test_is_empty() {
        assert!(!UNIT.is_empty());
        assert!(!HALF.is_empty());
        assert!(EMPTY.is_empty());
        assert!(Interval::default().is_empty());
    }

    #[test]
    fn test_center_and_len() {
        assert_eq!(UNIT.center(), 0.5);
        assert_eq!(HALF.len(), 0.);
        assert!(EMPTY.len() < 0.);
    }

    #[test]
    fn test_contains() {
        assert!(UNIT.contains(0.5));
        assert!(UNIT.contains(0.));
        assert!(UNIT.contains(1.));
        assert!(!UNIT.interior_contains(0.));
        assert!(UNIT.interior_contains(0.5));
        assert!(UNIT.contains_interval(&HALF));
        assert!(UNIT.contains_interval(&EMPTY));
        assert!(!UNIT.contains_interval(&NEG_UNIT));
        assert!(!HALF.interior_contains_interval(&UNIT));
        assert!(UNIT.interior_contains_interval(&HALF));
    }

    #[test]
    fn test_intersects() {
        assert!(UNIT.intersects(&NEG_UNIT));
        assert!(!UNIT.interior_intersects(&NEG_UNIT));
        assert!(UNIT.interior_intersects(&HALF));
        assert!(!UNIT.intersects(&EMPTY));
        assert!(!EMPTY.intersects(&UNIT));
        assert_eq!(UNIT.intersection(&NEG_UNIT), Interval::new(0., 0.));
        assert!(UNIT.intersection(&Interval::new(2., 3.)).is_empty());
    }

    #[test]
    fn test_union_and_add_point() {
        assert_eq!(UNIT.union(&NEG_UNIT), Interval::new(-1., 1.));
        assert_eq!(EMPTY.union(&HALF), HALF);
        assert_eq!(HALF.union(&EMPTY), HALF);

        let mut r = EMPTY;
        r = r.add_point(5.);
        assert_eq!(r, Interval::from_point(5.));
        r = r.add_point(-1.);
        assert_eq!(r, Interval::new(-1., 5.));
        r = r.add_point(0.);
        assert_eq!(r, Interval::new(-1., 5.));
    }

    #[test]
    fn test_expanded() {
        assert!(EMPTY.expanded(0.45).is_empty());
        assert_eq!(UNIT.expanded(0.5), Interval::new(-0.5, 1.5));
        assert!(UNIT.expanded(-0.51).is_empty());
        assert_eq!(UNIT.expanded(-0.5), Interval::new(0.5, 0.5));
    }

    #[test]
    fn test_clamp_point() {
        let i = Interval::new(0.1, 0.4);
        assert_eq!(i.clamp_point(0.3), 0.3);
        assert_eq!(i.clamp_point(-7.0), 0.1);
        assert_eq!(i.clamp_point(0.6), 0.4);
    }

    #[test]
    fn test_directed_hausdorff_distance() {
        assert_eq!(EMPTY.directed_hausdorff_distance(&UNIT), 0.);
        assert_eq!(UNIT.directed_hausdorff_distance(&EMPTY), f64::INFINITY);
        assert_eq!(UNIT.directed_hausdorff_distance(&HALF), 0.5);
        assert_eq!(HALF.directed_hausdorff_distance(&UNIT), 0.);
        assert_eq!(
            Interval::new(1., 3.).directed_hausdorff_distance(&Interval::new(0., 1.)),
            2.
        );
    }

    #[test]
    fn test_approx_eq() {
        let lo = 4. * EPSILON;
        let hi = 6. * EPSILON;
        assert!(EMPTY.approx_eq(&EMPTY));
        assert!(Interval::new(0., 0.).approx_eq(&EMPTY));
        assert!(!Interval::new(1., 1. + 2. * lo).approx_eq(&EMPTY));
        assert!(Interval::new(1., 1.).approx_eq_by(&Interval::new(1. + lo, 1. + lo), hi));
        assert!(!Interval::new(1., 1.).approx_eq(&Interval::new(1. + hi, 1. + hi)));
    }
}
