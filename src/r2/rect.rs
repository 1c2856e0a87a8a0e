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

use crate::r1::interval::{Interval, EMPTY};
use crate::r2::point::Point;

/// Rect represents a closed axis-aligned rectangle in the (x,y) plane.
#[derive(Clone, Copy, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Rect {
    pub x: Interval,
    pub y: Interval,
}

impl Rect {
    pub fn from_intervals(x: Interval, y: Interval) -> Self {
        Rect { x, y }
    }

    pub fn empty() -> Self {
        Rect { x: EMPTY, y: EMPTY }
    }

    /// Constructs the minimal bounding rectangle containing the given points.
    pub fn from_points(points: &[Point]) -> Self {
        points.iter().fold(Rect::empty(), |r, p| r.add_point(p))
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    pub fn lo(&self) -> Point {
        Point::new(self.x.lo, self.y.lo)
    }

    pub fn hi(&self) -> Point {
        Point::new(self.x.hi, self.y.hi)
    }

    pub fn center(&self) -> Point {
        Point::new(self.x.center(), self.y.center())
    }

    /// Returns the vertex at index k in CCW order starting from the lower
    /// left corner.
    pub fn vertex(&self, k: usize) -> Point {
        let j = (k >> 1) & 1;
        let i = j ^ (k & 1);
        let x = if i == 0 { self.x.lo } else { self.x.hi };
        let y = if j == 0 { self.y.lo } else { self.y.hi };
        Point::new(x, y)
    }

    /// Returns the vertex in direction i along the x-axis (0=left, 1=right)
    /// and direction j along the y-axis (0=down, 1=up).
    pub fn vertex_ij(&self, i: usize, j: usize) -> Point {
        let x = if i == 0 { self.x.lo } else { self.x.hi };
        let y = if j == 0 { self.y.lo } else { self.y.hi };
        Point::new(x, y)
    }

    pub fn contains_point(&self, p: &Point) -> bool {
        self.x.contains(p.x) && self.y.contains(p.y)
    }

    pub fn intersects(&self, other: &Rect) -> bool {
        self.x.intersects(&other.x) && self.y.intersects(&other.y)
    }

    pub fn add_point(&self, p: &Point) -> Rect {
        Rect {
            x: self.x.add_point(p.x),
            y: self.y.add_point(p.y),
        }
    }

    /// Returns a rectangle expanded on each side by the given margin.
    pub fn expanded_by_margin(&self, margin: f64) -> Rect {
        let x = self.x.expanded(margin);
        let y = self.y.expanded(margin);
        if x.is_empty() || y.is_empty() {
            return Rect::empty();
        }
        Rect { x, y }
    }
}
