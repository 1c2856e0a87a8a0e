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

use std::f64::consts::{FRAC_PI_2, PI};
use std::fmt;

use crate::consts::remainder;
use crate::r1::interval::Interval as R1Interval;
use crate::s1::angle::Angle;
use crate::s1::chordangle::{self, ChordAngle};
use crate::s1::interval::Interval as S1Interval;
use crate::s2::latlng::{latitude, longitude};
use crate::s2::point::{chord_angle_between_points, Point};
use crate::s2::rect::Rect;
use crate::s2::region::Region;

/// Cap represents a disc-shaped region defined by a center and radius.
/// Technically this shape is called a "spherical cap" (rather than disc)
/// because it is not planar; the cap represents a portion of the sphere that
/// has been cut off by a plane. The boundary of the cap is the circle defined
/// by the intersection of the sphere and the plane. For containment purposes,
/// the cap is a closed set, i.e. it contains its boundary.
///
/// The radius is stored as a ChordAngle; the empty cap has a negative
/// radius and the full cap has a radius of 180 degrees.
#[derive(Clone, Copy, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Cap {
    pub center: Point,
    pub radius: ChordAngle,
}

impl fmt::Display for Cap {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "[Center={:?}, Radius={}]", self.center.0, self.radius.angle().deg())
    }
}

impl Cap {
    /// Returns a cap containing no points.
    pub fn empty() -> Cap {
        Cap {
            center: Point::from_coords(1., 0., 0.),
            radius: chordangle::NEGATIVE,
        }
    }

    /// Returns a cap containing all points.
    pub fn full() -> Cap {
        Cap {
            center: Point::from_coords(1., 0., 0.),
            radius: chordangle::STRAIGHT,
        }
    }

    /// Constructs a cap containing a single point.
    pub fn from_point(p: &Point) -> Cap {
        Cap::from_center_chord_angle(p, ChordAngle(0.))
    }

    /// Constructs a cap with the given center and angle. A negative angle
    /// yields an empty cap; angles of 180 degrees or more yield a full cap.
    pub fn from_center_angle(center: &Point, angle: Angle) -> Cap {
        Cap::from_center_chord_angle(center, ChordAngle::from(angle.min(Angle(PI))))
    }

    pub fn from_center_chord_angle(center: &Point, radius: ChordAngle) -> Cap {
        Cap {
            center: *center,
            radius,
        }
    }

    /// Constructs a cap with the given center and height. A negative height
    /// yields an empty cap; a height of 2 or more yields a full cap.
    pub fn from_center_height(center: &Point, height: f64) -> Cap {
        Cap::from_center_chord_angle(center, ChordAngle::from_squared_length(2. * height))
    }

    pub fn is_valid(&self) -> bool {
        self.center.is_unit() && self.radius.0 <= chordangle::STRAIGHT.0
    }

    pub fn is_empty(&self) -> bool {
        self.radius.0 < 0.
    }

    pub fn is_full(&self) -> bool {
        self.radius == chordangle::STRAIGHT
    }

    /// Returns the height of the cap, the distance from the center point to
    /// the cutoff plane.
    pub fn height(&self) -> f64 {
        0.5 * self.radius.0
    }

    /// Returns the cap radius as an angle.
    pub fn radius_angle(&self) -> Angle {
        self.radius.angle()
    }

    pub fn area(&self) -> f64 {
        2. * PI * 0f64.max(self.height())
    }

    /// Reports whether the point is within the cap.
    pub fn contains_point(&self, p: &Point) -> bool {
        chord_angle_between_points(&self.center, p) <= self.radius
    }

    /// Reports whether the point is within the interior of the cap.
    pub fn interior_contains_point(&self, p: &Point) -> bool {
        self.is_full() || chord_angle_between_points(&self.center, p) < self.radius
    }

    /// Reports whether this cap contains the other.
    pub fn contains(&self, other: &Cap) -> bool {
        if self.is_full() || other.is_empty() {
            return true;
        }
        self.radius.0 >= (chord_angle_between_points(&self.center, &other.center) + other.radius).0
    }

    /// Increases the cap radius if necessary to include the given point. If
    /// this cap is empty, the center is set to the point with a zero radius.
    pub fn add_point(&mut self, p: &Point) {
        if self.is_empty() {
            self.center = *p;
            self.radius = ChordAngle(0.);
            return;
        }
        // After add_point the cap must contain p, which holds because
        // contains_point performs exactly the same distance calculation.
        let r = chord_angle_between_points(&self.center, p);
        if r > self.radius {
            self.radius = r;
        }
    }

    /// Returns a new cap expanded by the given angle. If the cap is empty
    /// it stays empty.
    pub fn expanded(&self, distance: Angle) -> Cap {
        if self.is_empty() {
            return Cap::empty();
        }
        Cap::from_center_chord_angle(&self.center, self.radius + ChordAngle::from(distance))
    }
}

impl Region for Cap {
    fn cap_bound(&self) -> Cap {
        *self
    }

    /// Returns a bounding latitude-longitude rectangle.
    fn rect_bound(&self) -> Rect {
        if self.is_empty() {
            return Rect::empty();
        }

        let cap_angle = self.radius_angle().0;
        let center_lat = latitude(&self.center).0;
        let mut all_longitudes = false;
        let mut lat = R1Interval::new(center_lat - cap_angle, center_lat + cap_angle);
        let mut lng = S1Interval::full();

        // Check whether cap includes the south pole.
        if lat.lo <= -FRAC_PI_2 {
            lat.lo = -FRAC_PI_2;
            all_longitudes = true;
        }
        // Check whether cap includes the north pole.
        if lat.hi >= FRAC_PI_2 {
            lat.hi = FRAC_PI_2;
            all_longitudes = true;
        }

        if !all_longitudes {
            // Compute the range of longitudes covered by the cap. We use the
            // law of sines for spherical triangles. Consider the triangle ABC
            // where A is the north pole, B is the center of the cap, and C is
            // the point of tangency between the cap boundary and a line of
            // longitude. Then C is a right angle, and letting a,b,c denote the
            // sides opposite A,B,C, we have sin(a)/sin(A) = sin(c)/sin(C), or
            // sin(A) = sin(a)/sin(c). Here "a" is the cap angle, and "c" is the
            // colatitude (90 degrees minus the latitude). This formula also
            // works for negative latitudes.
            let sin_a = self.radius.sin();
            let sin_c = center_lat.cos();
            if sin_a <= sin_c {
                let angle_a = (sin_a / sin_c).asin();
                let center_lng = longitude(&self.center).0;
                lng.lo = remainder(center_lng - angle_a, 2. * PI);
                lng.hi = remainder(center_lng + angle_a, 2. * PI);
            }
        }
        Rect::new(lat, lng)
    }

    fn contains_point(&self, p: &Point) -> bool {
        Cap::contains_point(self, p)
    }
}
