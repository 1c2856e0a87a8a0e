// Copyright 2018 Google Inc. All rights reserved.
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

// This file defines a collection of methods for computing the distance from
// a point to an edge and for projecting points onto edges.

use crate::consts::DBL_EPSILON;
use crate::s1::angle::Angle;
use crate::s1::chordangle::{ChordAngle, RIGHT};
use crate::s2::point::{point_cross, Point};
use crate::s2::predicates::sign;

/// Returns the distance of point X from line segment AB.
/// The points are expected to be normalized. The result is very accurate for
/// small distances but may have some numerical error if the distance is large
/// (approximately pi/2 or greater). The case A == B is handled correctly.
pub fn distance_from_segment(x: &Point, a: &Point, b: &Point) -> Angle {
    let (min_dist, _) = update_min_distance(x, a, b, ChordAngle::default(), true);
    min_dist.angle()
}

/// Reports whether the distance from X to the edge AB is less than limit.
/// (For less than or equal to, specify limit.successor()). This method is
/// faster than distance_from_segment(). If you want to compare against a
/// fixed Angle, convert it to a ChordAngle once and save the value, since
/// this conversion is relatively expensive.
pub fn is_distance_less(x: &Point, a: &Point, b: &Point, limit: ChordAngle) -> bool {
    let (_, less) = update_min_distance(x, a, b, limit, false);
    less
}

/// Checks if the distance from X to the edge AB is less than min_dist, and
/// if so, returns the updated value and true. The case A == B is handled
/// correctly.
///
/// Use this method when you want to compute many distances and keep track
/// of the minimum. It is significantly faster than distance_from_segment
/// because (1) using ChordAngle is much faster than Angle, and (2) it can
/// save a lot of work by not actually computing the distance when it is
/// obviously larger than the current minimum.
pub fn update_min_distance(
    x: &Point,
    a: &Point,
    b: &Point,
    min_dist: ChordAngle,
    always_update: bool,
) -> (ChordAngle, bool) {
    if let Some(d) = interior_dist(x, a, b, min_dist, always_update) {
        // Minimum distance is attained along the edge interior.
        return (d, true);
    }

    // Otherwise the minimum distance is to one of the endpoints.
    let xa2 = (x.0 - a.0).norm2();
    let xb2 = (x.0 - b.0).norm2();
    let dist = ChordAngle(xa2.min(xb2));
    if !always_update && dist >= min_dist {
        (min_dist, false)
    } else {
        (dist, true)
    }
}

/// Returns the point along the edge AB that is closest to the point X.
///
/// This requires that all points are unit length.
pub fn project(x: &Point, a: &Point, b: &Point) -> Point {
    let a_x_b = point_cross(a, b);
    // Find the closest point to X along the great circle through AB.
    let p = *x - a_x_b * (x.dot(&a_x_b) / a_x_b.0.norm2());

    // If this point is on the edge AB, then it's the closest point.
    if sign(&a_x_b, a, &p) && sign(&p, b, &a_x_b) {
        return p.normalize();
    }

    // Otherwise, the closest point is either A or B.
    if (x.0 - a.0).norm2() <= (x.0 - b.0).norm2() {
        *a
    } else {
        *b
    }
}

/// Returns the maximum error in the result of update_min_distance (and the
/// associated functions such as is_distance_less), assuming that all input
/// points are normalized to within the bounds guaranteed by
/// Vector::normalize. The error can be added or subtracted from a
/// ChordAngle using its expanded method.
pub fn min_update_distance_max_error(dist: ChordAngle) -> f64 {
    // There are two cases for the maximum error in update_min_distance,
    // depending on whether the closest point is interior to the edge.
    min_update_interior_distance_max_error(dist).max(dist.max_point_error())
}

/// Returns the maximum error in the interior case of update_min_distance.
///
/// Accuracy goes down as the distance approaches 0 degrees or 180 degrees
/// (for different reasons). Near 0 degrees the error is about 1.2e-15
/// radians. For exactly antipodal points the maximum error is much higher,
/// but it drops rapidly as the points move away from antipodality.
pub fn min_update_interior_distance_max_error(dist: ChordAngle) -> f64 {
    // If a point is more than 90 degrees from an edge, then the minimum
    // distance is always to one of the endpoints, not to the edge interior.
    if dist >= RIGHT {
        return 0.;
    }

    // This bound includes all source of error, assuming that the input points
    // are normalized. a and b are components of chord length that are
    // perpendicular and parallel to a plane containing the edge respectively.
    let b = 1f64.min(0.5 * dist.0);
    let a = (b * (2. - b)).sqrt();
    ((2.5 + 2. * 3f64.sqrt() + 8.5 * a) * a
        + (2. + 2. * 3f64.sqrt() / 3. + 6.5 * (1. - b)) * b
        + (23. + 16. / 3f64.sqrt()) * DBL_EPSILON)
        * DBL_EPSILON
}

/// Returns the shortest distance from point x to edge ab, assuming that the
/// closest point to X is interior to AB. If the closest point is not
/// interior to AB, returns None. If always_update is false, the distance is
/// only returned if it is less than the given min_dist.
fn interior_dist(
    x: &Point,
    a: &Point,
    b: &Point,
    min_dist: ChordAngle,
    always_update: bool,
) -> Option<ChordAngle> {
    // Chord distance of x to both end points a and b.
    let xa2 = (x.0 - a.0).norm2();
    let xb2 = (x.0 - b.0).norm2();

    // The closest point on AB could either be one of the two vertices (the
    // vertex case) or in the interior (the interior case). Let C = A x B.
    // If X is in the spherical wedge extending from A to B around the axis
    // through C, then we are in the interior case. Otherwise we are in the
    // vertex case.
    //
    // Check whether we might be in the interior case. For this to be true,
    // XAB and XBA must both be acute angles. Checking this condition exactly
    // is expensive, so instead we consider the planar triangle ABX (which
    // passes through the sphere's interior). The planar angles XAB and XBA
    // are always less than the corresponding spherical angles, so if we are
    // in the interior case then both of these angles must be acute.
    //
    // We check this by computing the squared edge lengths of the planar
    // triangle ABX, and testing whether angles XAB and XBA are both acute
    // using the law of cosines:
    //
    //            | XA^2 - XB^2 | < AB^2      (*)
    //
    // This test must be done conservatively (taking numerical errors into
    // account) since otherwise we might miss a situation where the true
    // minimum distance is achieved by a point on the edge interior.
    let ab2 = (a.0 - b.0).norm2();
    let max_error = 4.75 * DBL_EPSILON * (xa2 + xb2 + ab2) + 8. * DBL_EPSILON * DBL_EPSILON;
    if (xa2 - xb2).abs() >= ab2 + max_error {
        return None;
    }

    // The minimum distance might be to a point on the edge interior. Let R
    // be closest point to X that lies on the great circle through AB. Rather
    // than computing the geodesic distance along the surface of the sphere,
    // instead we compute the "chord length" through the sphere's interior.
    //
    // The squared chord length XR^2 can be expressed as XQ^2 + QR^2, where Q
    // is the point X projected onto the plane through the great circle AB.
    // The distance XQ^2 can be written as (X.C)^2 / |C|^2 where C = A x B.
    // We ignore the QR^2 term and instead use XQ^2 as a lower bound, since
    // it is faster and the corresponding distance on the Earth's surface is
    // accurate to within 1% for distances up to about 1800km.
    let c = point_cross(a, b);
    let c2 = c.0.norm2();
    let x_dot_c = x.dot(&c);
    let x_dot_c2 = x_dot_c * x_dot_c;
    if !always_update && x_dot_c2 > c2 * min_dist.0 {
        // The closest point on the great circle AB is too far away. We need
        // to test this using ">" rather than ">=" because the actual minimum
        // bound on the distance is (x_dot_c2 / c2), which can be rounded
        // differently than the (more efficient) multiplicative test above.
        return None;
    }

    // Otherwise we do the exact, more expensive test for the interior case.
    // This test is very likely to succeed because of the conservative planar
    // test we did initially.
    let cx = c.0.cross(&x.0);
    if (a.0 - x.0).dot(&cx) >= 0. || (b.0 - x.0).dot(&cx) <= 0. {
        return None;
    }

    // Compute the squared chord length XR^2 = XQ^2 + QR^2 (see above).
    // This calculation has good accuracy for all chord lengths since it is
    // based on both the dot product and cross product (rather than deriving
    // one from the other). However, note that the chord length
    // representation itself loses accuracy as the angle approaches π.
    let qr = 1. - (cx.norm2() / c2).sqrt();
    let dist = ChordAngle((x_dot_c2 / c2) + (qr * qr));

    if !always_update && dist >= min_dist {
        return None;
    }
    Some(dist)
}
