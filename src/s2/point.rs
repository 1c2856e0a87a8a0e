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
use std::f64::consts::PI;
use std::fmt;
use std::ops::{Add, Mul, Neg, Sub};

use cgmath::{Matrix3, Vector3};

use crate::consts::EPSILON;
use crate::r3::vector::Vector;
use crate::s1::angle::Angle;
use crate::s1::chordangle::ChordAngle;
use crate::s2::predicates::{robust_sign, Direction};

/// Point represents a point on the unit sphere as a normalized 3D vector.
/// Fields should be treated as read-only. Use one of the factory methods
/// for creation.
#[derive(Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Point(pub Vector);

/// A unique "origin" on the sphere for operations that need a fixed
/// reference point. In particular, this is the "point at infinity" used for
/// point-in-polygon testing (by counting the number of edge crossings).
///
/// It should *not* be a point that is commonly used in edge tests in order
/// to avoid triggering code to handle degenerate cases (this rules out the
/// north and south poles). It should also not be on the boundary of any
/// low-level cell for the same reason.
pub const ORIGIN: Point = Point(Vector::new(
    -0.0099994664350250197,
    0.0025924542609324121,
    0.99994664350250195,
));

impl fmt::Debug for Point {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Point{}", self.0)
    }
}

impl Point {
    /// Creates a new normalized point from coordinates.
    ///
    /// This always returns a valid point. If the given coordinates can not be
    /// normalized the origin point will be returned.
    pub fn from_coords(x: f64, y: f64, z: f64) -> Self {
        if x == 0. && y == 0. && z == 0. {
            return ORIGIN;
        }
        Point(Vector::new(x, y, z).normalize())
    }

    pub fn origin() -> Self {
        ORIGIN
    }

    pub fn dot(&self, other: &Point) -> f64 {
        self.0.dot(&other.0)
    }

    pub fn cross(&self, other: &Point) -> Point {
        Point(self.0.cross(&other.0))
    }

    pub fn norm(&self) -> f64 {
        self.0.norm()
    }

    pub fn normalize(&self) -> Point {
        Point(self.0.normalize())
    }

    pub fn is_unit(&self) -> bool {
        self.0.is_unit()
    }

    /// Returns the angle between the two points.
    pub fn distance(&self, other: &Point) -> Angle {
        self.0.angle(&other.0)
    }

    /// Reports whether the two points are similar enough to be equal.
    pub fn approx_eq(&self, other: &Point) -> bool {
        self.approx_eq_by(other, Angle(EPSILON))
    }

    /// Reports whether the angle between the two points is at most max_error.
    pub fn approx_eq_by(&self, other: &Point, max_error: Angle) -> bool {
        self.0.angle(&other.0) <= max_error
    }

    /// Returns a unit-length point orthogonal to this one.
    pub fn ortho(&self) -> Point {
        Point(self.0.ortho())
    }

    /// Lexicographic order of the coordinates.
    pub fn cmp(&self, other: &Point) -> Ordering {
        self.0.cmp(&other.0)
    }

    /// Returns the chord angle between the two points, which must be unit
    /// length.
    pub fn chord_angle(&self, other: &Point) -> ChordAngle {
        chord_angle_between_points(self, other)
    }
}

/// Returns the chord angle between the two unit-length points.
pub fn chord_angle_between_points(x: &Point, y: &Point) -> ChordAngle {
    ChordAngle::from_squared_length((x.0 - y.0).norm2())
}

impl Add for Point {
    type Output = Point;
    fn add(self, other: Point) -> Point {
        Point(self.0 + other.0)
    }
}

impl Sub for Point {
    type Output = Point;
    fn sub(self, other: Point) -> Point {
        Point(self.0 - other.0)
    }
}

impl Mul<f64> for Point {
    type Output = Point;
    fn mul(self, m: f64) -> Point {
        Point(self.0 * m)
    }
}

impl Neg for Point {
    type Output = Point;
    fn neg(self) -> Point {
        Point(-self.0)
    }
}

impl From<Vector> for Point {
    fn from(v: Vector) -> Point {
        Point(v)
    }
}

/// Returns a Point that is orthogonal to both p and op. This is similar to
/// p.cross(op) (the true cross product) except that it does a better job of
/// ensuring orthogonality when the Point is nearly parallel to op, it returns
/// a non-zero result even when p == op or p == -op and the result is a Point.
///
/// It satisfies the following properties (f == point_cross):
///
///   (1) f(p, op) != 0 for all p, op
///   (2) f(op,p) == -f(p,op) unless p == op or p == -op
///   (3) f(-p,op) == -f(p,op) unless p == op or p == -op
///   (4) f(p,-op) == -f(p,op) unless p == op or p == -op
pub fn point_cross(p: &Point, op: &Point) -> Point {
    let x = (p.0 + op.0).cross(&(op.0 - p.0));

    // Compare exactly to the 0 vector.
    if x == Vector::default() {
        // The only result that makes sense mathematically is to return zero,
        // but we find it more convenient to return an arbitrary orthogonal
        // vector.
        return Point(p.0.ortho());
    }
    Point(x)
}

/// Returns true if the edges OA, OB, and OC are encountered in that order
/// while sweeping CCW around the point O.
///
/// You can think of this as testing whether A <= B <= C with respect to the
/// CCW ordering around O that starts at A, or equivalently, whether B is
/// contained in the range of angles (inclusive) that starts at A and extends
/// CCW to C. Properties:
///
///  (1) If ordered_ccw(a,b,c,o) && ordered_ccw(b,a,c,o), then a == b
///  (2) If ordered_ccw(a,b,c,o) && ordered_ccw(a,c,b,o), then b == c
///  (3) If ordered_ccw(a,b,c,o) && ordered_ccw(c,b,a,o), then a == b == c
///  (4) If a == b or b == c, then ordered_ccw(a,b,c,o) is true
///  (5) Otherwise if a == c, then ordered_ccw(a,b,c,o) is false
pub fn ordered_ccw(a: &Point, b: &Point, c: &Point, o: &Point) -> bool {
    let mut sum = 0;
    if robust_sign(b, o, a) != Direction::Clockwise {
        sum += 1;
    }
    if robust_sign(c, o, b) != Direction::Clockwise {
        sum += 1;
    }
    if robust_sign(a, o, c) == Direction::CounterClockwise {
        sum += 1;
    }
    sum >= 2
}

/// Returns the area on the unit sphere for the triangle defined by the
/// given points.
///
/// This method is based on l'Huilier's theorem,
///
///   tan(E/4) = sqrt(tan(s/2) tan((s-a)/2) tan((s-b)/2) tan((s-c)/2))
///
/// where E is the spherical excess of the triangle (i.e. its area),
///       a, b, c are the side lengths, and
///       s is the semiperimeter (a + b + c) / 2.
///
/// The only significant source of error using l'Huilier's method is the
/// cancellation error of the terms (s-a), (s-b), (s-c). This leads to a
/// *relative* error of about 1e-16 * s / min(s-a, s-b, s-c). This compares
/// to a relative error of about 1e-15 / E using Girard's formula, where E is
/// the true area of the triangle. Girard's formula can be even worse than
/// this for very small triangles, e.g. a triangle with a true area of 1e-30
/// might evaluate to 1e-5.
///
/// So, we prefer l'Huilier's formula unless dmin < s * (0.1 * E), where
/// dmin = min(s-a, s-b, s-c). This basically includes all triangles
/// except for extremely long and skinny ones.
///
/// Since we don't know E, we would like a conservative upper bound on
/// the triangle area in terms of s and dmin. It's possible to show that
/// E <= k1 * s * sqrt(s * dmin), where k1 = 2*sqrt(3)/Pi (about 1).
/// Using this, it's easy to show that we should always use l'Huilier's
/// method if dmin >= k2 * s^5, where k2 is about 1e-2. Furthermore,
/// if dmin < k2 * s^5, the triangle area is at most k3 * s^4, where
/// k3 is about 0.1. Since the best case error using Girard's formula
/// is about 1e-15, this means that we shouldn't even consider it unless
/// s >= 3e-4 or so.
pub fn area(a: &Point, b: &Point, c: &Point) -> f64 {
    let sa = b.0.angle(&c.0).0;
    let sb = c.0.angle(&a.0).0;
    let sc = a.0.angle(&b.0).0;
    let s = 0.5 * (sa + sb + sc);
    if s >= 3e-4 {
        // Consider whether Girard's formula might be more accurate.
        let dmin = s - sa.max(sb.max(sc));
        if dmin < 1e-2 * s * s * s * s * s {
            // This triangle is skinny enough to use Girard's formula.
            let area = girard_area(a, b, c);
            if dmin < s * 0.1 * area {
                return area;
            }
        }
    }

    // Use l'Huilier's formula.
    4. * (0f64
        .max(
            (0.5 * s).tan()
                * (0.5 * (s - sa)).tan()
                * (0.5 * (s - sb)).tan()
                * (0.5 * (s - sc)).tan(),
        )
        .sqrt())
    .atan()
}

/// Returns the area of the triangle computed using Girard's formula. All
/// points should be unit length, and no two points should be antipodal.
///
/// This method is about twice as fast as area() but has poor relative
/// accuracy for small triangles. The maximum error is about 5e-15 (about
/// 0.25 square meters on the Earth's surface) and the average error is about
/// 1e-15. These bounds apply to triangles of any size, even as the maximum
/// edge length of the triangle approaches 180 degrees. But note that for
/// such triangles, tiny perturbations of the input points can change the
/// true mathematical area dramatically.
pub fn girard_area(a: &Point, b: &Point, c: &Point) -> f64 {
    // This is equivalent to the usual Girard's formula but is slightly more
    // accurate, faster to compute, and handles a == b == c without a special
    // case. point_cross is necessary to get good accuracy when two of the
    // input points are very close together.
    let ab = point_cross(a, b);
    let bc = point_cross(b, c);
    let ac = point_cross(a, c);

    let area = (ab.0.angle(&ac.0) - ab.0.angle(&bc.0) + bc.0.angle(&ac.0)).0;
    if area < 0. {
        0.
    } else {
        area
    }
}

/// Returns a positive value for counterclockwise triangles and a negative
/// value otherwise (similar to area).
pub fn signed_area(a: &Point, b: &Point, c: &Point) -> f64 {
    match robust_sign(a, b, c) {
        Direction::CounterClockwise => area(a, b, c),
        Direction::Clockwise => -area(a, b, c),
        Direction::Indeterminate => 0.,
    }
}

/// Returns the exterior angle at vertex B in the triangle ABC. The return
/// value is positive if ABC is counterclockwise and negative otherwise. If
/// you imagine an ant walking from A to B to C, this is the angle that the
/// ant turns at vertex B (positive = left = CCW, negative = right = CW).
/// This quantity is also known as the "geodesic curvature" at B.
///
/// Ensures that turn_angle(a,b,c) == -turn_angle(c,b,a) for all distinct
/// a,b,c. The result is undefined if (a == b || b == c), but is either
/// -Pi or Pi if (a == c). All points should be normalized.
pub fn turn_angle(a: &Point, b: &Point, c: &Point) -> Angle {
    // We use point_cross to get good accuracy when two points are very
    // close together, and robust_sign to ensure that the sign is correct for
    // turns that are close to 180 degrees.
    let angle = point_cross(a, b).0.angle(&point_cross(b, c).0);

    // Don't return robust_sign * angle because it is legal to have
    // a == c.
    if robust_sign(a, b, c) == Direction::CounterClockwise {
        angle
    } else {
        -angle
    }
}

/// Returns the true centroid of the spherical triangle ABC multiplied by
/// the signed area of spherical triangle ABC. The result is not normalized.
/// The reasons for multiplying by the signed area are (1) this is the
/// quantity that needs to be summed to compute the centroid of a union or
/// difference of triangles, and (2) it's actually easier to calculate this
/// way. All points must have unit length.
///
/// The true centroid (mass centroid) is defined as the surface integral
/// over the spherical triangle of (x,y,z) divided by the triangle area.
/// This is the point that the triangle would rotate around if it was
/// spinning in empty space.
///
/// The best centroid for most purposes is the true centroid. Unlike the
/// planar and surface centroids, the true centroid behaves linearly as
/// regions are added or subtracted. That is, if you split a triangle into
/// pieces and compute the average of their centroids (weighted by triangle
/// area), the result equals the centroid of the original triangle. This is
/// not true of the other centroids.
pub fn true_centroid(a: &Point, b: &Point, c: &Point) -> Point {
    let ra = ratio_to_sin(b.0.angle(&c.0).0);
    let rb = ratio_to_sin(c.0.angle(&a.0).0);
    let rc = ratio_to_sin(a.0.angle(&b.0).0);

    // Now compute a point M such that:
    //
    //  [Ax Ay Az] [Mx]                       [ra]
    //  [Bx By Bz] [My]  = 0.5 * det(A,B,C) * [rb]
    //  [Cx Cy Cz] [Mz]                       [rc]
    //
    // To improve the numerical stability we subtract the first row (A) from
    // the other two rows; this reduces the cancellation error when A, B, and
    // C are very close together. Then we solve it using Cramer's rule.
    //
    // This code still isn't as numerically stable as it could be.
    // The biggest potential improvement is to compute B-A and C-A more
    // accurately so that (B-A)x(C-A) is always inside triangle ABC.
    let x = Vector::new(a.0.x, b.0.x - a.0.x, c.0.x - a.0.x);
    let y = Vector::new(a.0.y, b.0.y - a.0.y, c.0.y - a.0.y);
    let z = Vector::new(a.0.z, b.0.z - a.0.z, c.0.z - a.0.z);
    let r = Vector::new(ra, rb - ra, rc - ra);

    Point(Vector::new(
        0.5 * y.cross(&z).dot(&r),
        0.5 * z.cross(&x).dot(&r),
        0.5 * x.cross(&y).dot(&r),
    ))
}

/// Returns angle / sin(angle), which tends to 1 for small angles.
fn ratio_to_sin(angle: f64) -> f64 {
    if angle == 0. {
        1.
    } else {
        angle / angle.sin()
    }
}

/// Returns a right-handed coordinate frame whose third column is p.
pub fn get_frame(p: &Point) -> Matrix3<f64> {
    let z = p.0;
    let y = z.ortho();
    let x = y.cross(&z);
    Matrix3::from_cols(to_cg(&x), to_cg(&y), to_cg(&z))
}

/// Converts q from the given frame coordinates to the standard basis.
pub fn from_frame(frame: &Matrix3<f64>, q: &Point) -> Point {
    let v = *frame * to_cg(&q.0);
    Point(Vector::new(v.x, v.y, v.z))
}

fn to_cg(v: &Vector) -> Vector3<f64> {
    Vector3::new(v.x, v.y, v.z)
}

/// Returns num_vertices points evenly spaced on a circle of the given radius
/// around the z-axis of frame, starting in the direction of its x-axis.
pub fn regular_points_for_frame(frame: &Matrix3<f64>, radius: Angle, num_vertices: usize) -> Vec<Point> {
    // We construct the loop in the given frame coordinates, with the center
    // at (0, 0, 1). For a loop of radius r, the loop vertices have the form
    // (x, y, z) where x^2 + y^2 = sin(r) and z = cos(r). The distance on the
    // sphere (arc length) from each vertex to the center is acos(cos(r)) = r.
    let z = radius.0.cos();
    let r = radius.0.sin();
    let step = 2. * PI / num_vertices as f64;
    (0..num_vertices)
        .map(|i| {
            let angle = i as f64 * step;
            let p = Point(Vector::new(r * angle.cos(), r * angle.sin(), z));
            from_frame(frame, &p).normalize()
        })
        .collect()
}

/// Returns num_vertices points evenly spaced on a circle of the given radius
/// around center.
pub fn regular_points(center: &Point, radius: Angle, num_vertices: usize) -> Vec<Point> {
    regular_points_for_frame(&get_frame(center), radius, num_vertices)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::s2::random;
    use approx::{assert_abs_diff_eq, assert_relative_eq};
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn test_origin_point() {
        assert!((ORIGIN.norm() - 1.).abs() <= 1e-15);
        // The origin is deliberately off the poles and cell boundaries.
        assert!(ORIGIN.0.z < 1.);
    }

    #[test]
    fn test_point_cross() {
        for _ in 0..100 {
            let p = random::point();
            let q = random::point();
            let r = point_cross(&p, &q);
            assert!(r.dot(&p).abs() <= 1e-14);
            assert!(r.dot(&q).abs() <= 1e-14);
            assert_ne!(point_cross(&p, &p).0, Vector::default());
            assert_abs_diff_eq!(point_cross(&q, &p).0.x, -r.0.x, epsilon = 1e-15);
        }
    }

    #[test]
    fn test_ordered_ccw() {
        let o = Point::from_coords(0., 0., 1.);
        let a = Point::from_coords(1., 0., 0.);
        let b = Point::from_coords(0., 1., 0.);
        let c = Point::from_coords(-1., 0., 0.);
        assert!(ordered_ccw(&a, &b, &c, &o));
        assert!(!ordered_ccw(&c, &b, &a, &o));
        assert!(ordered_ccw(&a, &a, &c, &o));
        assert!(ordered_ccw(&a, &c, &c, &o));
        assert!(!ordered_ccw(&a, &b, &a, &o));
    }

    #[test]
    fn test_area_of_octant() {
        let a = Point::from_coords(1., 0., 0.);
        let b = Point::from_coords(0., 1., 0.);
        let c = Point::from_coords(0., 0., 1.);
        assert_relative_eq!(area(&a, &b, &c), FRAC_PI_2, max_relative = 1e-15);
        assert_relative_eq!(girard_area(&a, &b, &c), FRAC_PI_2, max_relative = 1e-15);
        assert_relative_eq!(signed_area(&a, &b, &c), FRAC_PI_2, max_relative = 1e-15);
        assert_relative_eq!(signed_area(&c, &b, &a), -FRAC_PI_2, max_relative = 1e-15);
        assert_eq!(area(&a, &a, &c), 0.);
    }

    #[test]
    fn test_area_of_tiny_triangle() {
        let a = Point::from_coords(-1.705424004316021258e-01, -8.242696197922716461e-01, 5.399026611737816062e-01);
        let b = Point::from_coords(-1.706078905422188652e-01, -8.246067119418963860e-01, 5.393669607095969987e-01);
        let c = Point::from_coords(-1.705800600596222553e-01, -8.244634596523321120e-01, 5.395947061619806469e-01);
        assert!(area(&a, &b, &c) > 0.);
        assert!(area(&a, &b, &c) < 1e-9);
    }

    #[test]
    fn test_turn_angle() {
        let a = Point::from_coords(1., 0., 0.);
        let b = Point::from_coords(0., 1., 0.);
        let c = Point::from_coords(0., 0., 1.);
        assert_relative_eq!(turn_angle(&a, &b, &c).0, FRAC_PI_2, max_relative = 1e-15);
        assert_relative_eq!(turn_angle(&c, &b, &a).0, -FRAC_PI_2, max_relative = 1e-15);
        assert_relative_eq!(turn_angle(&a, &b, &a).0.abs(), PI, max_relative = 1e-15);
    }

    #[test]
    fn test_true_centroid_of_octant() {
        let a = Point::from_coords(1., 0., 0.);
        let b = Point::from_coords(0., 1., 0.);
        let c = Point::from_coords(0., 0., 1.);
        let m = true_centroid(&a, &b, &c);
        // The first moment of the octant is pi/4 along each axis.
        for v in &[m.0.x, m.0.y, m.0.z] {
            assert_relative_eq!(*v, PI / 4., max_relative = 1e-14);
        }
        let r = true_centroid(&c, &b, &a);
        assert_relative_eq!(r.0.x, -PI / 4., max_relative = 1e-14);
    }

    #[test]
    fn test_regular_points() {
        let center = Point::from_coords(1., 1., 1.);
        let radius = Angle(0.2);
        let pts = regular_points(&center, radius, 7);
        assert_eq!(pts.len(), 7);
        for p in &pts {
            assert!(p.is_unit());
            assert_relative_eq!(p.distance(&center).0, 0.2, max_relative = 1e-12);
        }
        // Vertices go counterclockwise around the center.
        for i in 0..7 {
            assert_eq!(
                robust_sign(&center, &pts[i], &pts[(i + 1) % 7]),
                Direction::CounterClockwise
            );
        }
    }
}
