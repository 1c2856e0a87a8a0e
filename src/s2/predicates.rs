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

// Robust geometric predicates.
//
// The predicates here are exact: they return the mathematically correct
// answer for the given floating point inputs, falling back on exact decimal
// arithmetic when the fast floating point computation is inconclusive, and
// on symbolic perturbation when the points are exactly collinear. This makes
// them consistent with each other, which the loop and crossing algorithms
// depend on.

use std::ops::Neg;

use crate::consts::DBL_EPSILON;
use crate::r3::precisevector::{sign_of, PreciseVector};
use crate::s2::point::Point;

/// Maximum error in computing (AxB).C where all vectors are unit length.
/// Using standard inequalities, it can be shown that
///
///  fl(AxB) = AxB + D where |D| <= (|AxB| + (2/sqrt(3))*|A|*|B|) * e
///
/// where "fl()" denotes a calculation done in floating-point arithmetic,
/// |x| denotes either absolute value or the L2-norm as appropriate, and
/// e is a reasonably small value near the noise level of floating point
/// number accuracy. Similarly,
///
///  fl(B.C) = B.C + d where |d| <= (|B.C| + 2*|B|*|C|) * e .
///
/// Applying these bounds to the unit-length vectors A,B,C and neglecting
/// relative error (which does not affect the sign of the result), we get
///
///  fl((AxB).C) = (AxB).C + d where |d| <= (3 + 2/sqrt(3)) * e
pub const MAX_DETERMINANT_ERROR: f64 = 1.8274 * DBL_EPSILON;

/// Factor to scale the magnitudes by when checking for the sign of a set of
/// points with certainty. Using a similar technique to the one used for
/// MAX_DETERMINANT_ERROR, the error is at most:
///
///   |d| <= (3 + 6/sqrt(3)) * |A-C| * |B-C| * e
///
/// If the determinant magnitude is larger than this value then we know its
/// sign with certainty.
const DET_ERROR_MULTIPLIER: f64 = 3.2321 * DBL_EPSILON;

/// Direction is an indication of the ordering of a set of points.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    Clockwise = -1,
    Indeterminate = 0,
    CounterClockwise = 1,
}

impl Neg for Direction {
    type Output = Direction;
    fn neg(self) -> Direction {
        match self {
            Direction::Clockwise => Direction::CounterClockwise,
            Direction::Indeterminate => Direction::Indeterminate,
            Direction::CounterClockwise => Direction::Clockwise,
        }
    }
}

impl From<i32> for Direction {
    fn from(v: i32) -> Direction {
        match v.signum() {
            -1 => Direction::Clockwise,
            0 => Direction::Indeterminate,
            _ => Direction::CounterClockwise,
        }
    }
}

/// Reports whether the points A, B, C are strictly counterclockwise, and
/// returns false if the points are clockwise or collinear (i.e. if they are
/// all contained on some great circle).
///
/// Due to numerical errors, situations may arise that are mathematically
/// impossible, e.g. ABC may be considered strictly CCW while BCA is not.
/// However, the implementation guarantees the following:
///
/// If sign(a,b,c), then !sign(c,b,a) for all a,b,c.
pub fn sign(a: &Point, b: &Point, c: &Point) -> bool {
    // We compute the signed volume of the parallelepiped ABC. The usual
    // formula for this is (A ⨯ B) · C, but we compute it here using (C ⨯ A) · B
    // in order to ensure that ABC and CBA are not both CCW. This follows
    // from the following identities (which are true numerically, not just
    // mathematically):
    //
    //     (1) x ⨯ y == -(y ⨯ x)
    //     (2) -x · y == -(x · y)
    c.0.cross(&a.0).dot(&b.0) > 0.
}

/// Returns a Direction representing the ordering of the points.
/// CounterClockwise is returned if the points are in counter-clockwise order,
/// Clockwise for clockwise, and Indeterminate if any two points are the same
/// (collinear), or the sign could not completely be determined.
///
/// This function has additional logic to make sure that the above properties
/// hold even when the three points are coplanar, and to deal with the
/// limitations of floating-point arithmetic.
///
/// robust_sign satisfies the following conditions:
///
///  (1) robust_sign(a,b,c) == Indeterminate if and only if a == b, b == c, or c == a
///  (2) robust_sign(b,c,a) == robust_sign(a,b,c) for all a,b,c
///  (3) robust_sign(c,b,a) == -robust_sign(a,b,c) for all a,b,c
///
/// In other words:
///
///  (1) The result is Indeterminate if and only if two points are the same.
///  (2) Rotating the order of the arguments does not affect the result.
///  (3) Exchanging any two arguments inverts the result.
///
/// On the other hand, note that it is not true in general that
/// robust_sign(-a,b,c) == -robust_sign(a,b,c), or any similar identities
/// involving antipodal points.
pub fn robust_sign(a: &Point, b: &Point, c: &Point) -> Direction {
    let sign = triage_sign(a, b, c);
    if sign == Direction::Indeterminate {
        expensive_sign(a, b, c)
    } else {
        sign
    }
}

/// Returns the direction sign of the points. It returns Indeterminate if
/// two points are identical or the result is uncertain. Uncertain cases can
/// be resolved, if desired, by calling expensive_sign.
///
/// The purpose of this method is to allow additional cheap tests to be done
/// without calling expensive_sign.
pub fn triage_sign(a: &Point, b: &Point, c: &Point) -> Direction {
    let det = a.0.cross(&b.0).dot(&c.0);
    if det > MAX_DETERMINANT_ERROR {
        return Direction::CounterClockwise;
    }
    if det < -MAX_DETERMINANT_ERROR {
        return Direction::Clockwise;
    }
    Direction::Indeterminate
}

/// Reports the direction sign of the points. It returns Indeterminate if
/// two of the input points are the same. It uses multiple-precision
/// arithmetic to ensure that its results are always self-consistent.
pub fn expensive_sign(a: &Point, b: &Point, c: &Point) -> Direction {
    // Return Indeterminate if and only if two points are the same.
    // This ensures robust_sign(a,b,c) == Indeterminate if and only if a == b,
    // b == c, or c == a.
    // This is important because the Indeterminate result is used to check
    // for degenerate edges.
    if a == b || b == c || c == a {
        return Direction::Indeterminate;
    }

    // Next we try recomputing the determinant still using floating-point
    // arithmetic but in a more precise way. This is more expensive than the
    // simple calculation done by triage_sign, but it is still *much* cheaper
    // than using arbitrary-precision arithmetic. This optimization is able to
    // compute the correct determinant sign in virtually all cases except when
    // the three points are truly collinear (e.g., three points on the equator).
    let det_sign = stable_sign(a, b, c);
    if det_sign != Direction::Indeterminate {
        return det_sign;
    }

    // Otherwise fall back to exact arithmetic and symbolic permutations.
    exact_sign(a, b, c, true)
}

/// Reports the direction sign of the points in a numerically stable way.
/// Unlike triage_sign, this method can usually compute the correct
/// determinant sign even when all three points are as collinear as possible.
/// For example if three points are spaced 1km apart along a random line on
/// the Earth's surface using the nearest representable points, there is only
/// a 0.4% chance that this method will not be able to find the determinant
/// sign. The probability of failure decreases as the points get closer
/// together; if the collinear points are 1 meter apart, the failure rate
/// drops to 0.0004%.
///
/// This method could be extended to also handle nearly-antipodal points, but
/// antipodal points are rare in practice so it seems better to simply fall
/// back to exact arithmetic in that case.
fn stable_sign(a: &Point, b: &Point, c: &Point) -> Direction {
    let ab = b.0 - a.0;
    let ab2 = ab.norm2();
    let bc = c.0 - b.0;
    let bc2 = bc.norm2();
    let ca = a.0 - c.0;
    let ca2 = ca.norm2();

    // Now compute the determinant ((A-C)x(B-C)).C, where the vertices have been
    // cyclically permuted if necessary so that AB is the longest edge. (This
    // minimizes the magnitude of cross product.) At the same time we also
    // compute the maximum error in the determinant.

    // The two shortest edges, pointing away from their common point.
    let (e1, e2, op) = if ab2 >= bc2 && ab2 >= ca2 {
        // AB is the longest edge.
        (ca, bc, &c.0)
    } else if bc2 >= ca2 {
        // BC is the longest edge.
        (ab, ca, &a.0)
    } else {
        // CA is the longest edge.
        (bc, ab, &b.0)
    };

    let det = -e1.cross(&e2).dot(op);
    let max_err = DET_ERROR_MULTIPLIER * (e1.norm2() * e2.norm2()).sqrt();

    // If the determinant isn't zero, within max_err, we know definitively the
    // point ordering.
    if det > max_err {
        return Direction::CounterClockwise;
    }
    if det < -max_err {
        return Direction::Clockwise;
    }
    Direction::Indeterminate
}

/// Computes the sign of the determinant of the three points using exact
/// arithmetic. If the determinant is zero and perturb is true, symbolic
/// perturbations are used to break the tie. The points must be distinct.
pub(crate) fn exact_sign(a: &Point, b: &Point, c: &Point, perturb: bool) -> Direction {
    // Sort the three points in lexicographic order, keeping track of the sign
    // of the permutation. (Each exchange inverts the sign of the determinant.)
    let mut perm_sign = 1;
    let (mut pa, mut pb, mut pc) = (&a.0, &b.0, &c.0);
    if pa.cmp(pb).is_gt() {
        std::mem::swap(&mut pa, &mut pb);
        perm_sign = -perm_sign;
    }
    if pb.cmp(pc).is_gt() {
        std::mem::swap(&mut pb, &mut pc);
        perm_sign = -perm_sign;
    }
    if pa.cmp(pb).is_gt() {
        std::mem::swap(&mut pa, &mut pb);
        perm_sign = -perm_sign;
    }

    // Construct multiple-precision versions of the sorted points and compute
    // their exact 3x3 determinant.
    let xa = PreciseVector::from(pa);
    let xb = PreciseVector::from(pb);
    let xc = PreciseVector::from(pc);
    let xb_cross_xc = xb.cross(&xc);
    let mut det_sign = sign_of(&xa.dot(&xb_cross_xc));

    // If the exact determinant is zero, we need to use symbolic perturbations
    // to ensure that the result is consistent.
    if det_sign == 0 && perturb {
        det_sign = symbolically_perturbed_sign(&xa, &xb, &xc, &xb_cross_xc);
    }
    Direction::from(perm_sign * det_sign)
}

/// Reports the sign of the determinant of three points A, B, C under a model
/// where every possible Point is slightly perturbed by a unique infinitesmal
/// amount such that no three perturbed points are collinear and no four
/// points are coplanar. The perturbations are so small that they do not
/// change the sign of any determinant that was non-zero before the
/// perturbations, and therefore can be safely ignored unless the determinant
/// of three points is exactly zero (using multiple-precision arithmetic).
/// This returns CounterClockwise or Clockwise according to the sign of the
/// determinant after the symbolic perturbations are taken into account.
///
/// Since the symbolic perturbation of a given point is fixed (i.e., the
/// perturbation is the same for all calls to this method and does not depend
/// on the other two arguments), the results of this method are always
/// self-consistent. It will never return results that would correspond to an
/// impossible configuration of non-degenerate points.
///
/// This requires that the 3x3 determinant of A, B, C must be exactly zero.
/// And the points must be distinct, with A < B < C in lexicographic order.
fn symbolically_perturbed_sign(
    a: &PreciseVector,
    b: &PreciseVector,
    c: &PreciseVector,
    b_cross_c: &PreciseVector,
) -> i32 {
    // This method requires that the points are sorted in lexicographically
    // increasing order. This is because every possible Point has its own
    // symbolic perturbation such that if A < B then the symbolic perturbation
    // for A is much larger than the perturbation for B.
    //
    // Alternatively, we could sort the points in this method and keep track
    // of the sign of the permutation, but it is more efficient to do this
    // before converting the inputs to the multi-precision representation, and
    // this also lets us re-use the result of the cross product B x C.
    //
    // Every input coordinate x[i] is assigned a symbolic perturbation dx[i].
    // We then compute the sign of the determinant of the perturbed points,
    // i.e.
    //               | a.x+da.x  a.y+da.y  a.z+da.z |
    //               | b.x+db.x  b.y+db.y  b.z+db.z |
    //               | c.x+dc.x  c.y+dc.y  c.z+dc.z |
    //
    // The perturbations are chosen such that
    //
    //   da.z > da.y > da.x > db.z > db.y > db.x > dc.z > dc.y > dc.x
    //
    // where each perturbation is so much smaller than the previous one that we
    // don't even need to consider it unless the coefficients of all previous
    // perturbations are zero. In fact, it is so small that we don't need to
    // consider it unless the coefficient of all products of the previous
    // perturbations are zero. For example, we don't need to consider the
    // coefficient of db.y unless the coefficient of db.z *da.x is zero.
    //
    // The follow code simply enumerates the coefficients of the perturbations
    // (and products of perturbations) that appear in the determinant above, in
    // order of decreasing perturbation magnitude. The first non-zero
    // coefficient determines the sign of the result. The easiest way to
    // enumerate the coefficients in the correct order is to pretend that each
    // perturbation is some tiny value "eps" raised to a power of two:
    //
    // eps**    1      2      4      8     16     32     64    128    256
    //        da.z   da.y   da.x   db.z   db.y   db.x   dc.z   dc.y   dc.x
    //
    // Essentially we can then just count in binary and test the corresponding
    // subset of perturbations at each step. So for example, we must test the
    // coefficient of db.z*da.x before db.y because eps**12 > eps**16.
    let detsign = sign_of(&b_cross_c.z); // da.z
    if detsign != 0 {
        return detsign;
    }
    let detsign = sign_of(&b_cross_c.y); // da.y
    if detsign != 0 {
        return detsign;
    }
    let detsign = sign_of(&b_cross_c.x); // da.x
    if detsign != 0 {
        return detsign;
    }

    let detsign = sign_of(&(&c.x * &a.y - &c.y * &a.x)); // db.z
    if detsign != 0 {
        return detsign;
    }
    let detsign = sign_of(&c.x); // db.z * da.y
    if detsign != 0 {
        return detsign;
    }
    let detsign = -sign_of(&c.y); // db.z * da.x
    if detsign != 0 {
        return detsign;
    }

    let detsign = sign_of(&(&c.z * &a.x - &c.x * &a.z)); // db.y
    if detsign != 0 {
        return detsign;
    }
    let detsign = sign_of(&c.z); // db.y * da.x
    if detsign != 0 {
        return detsign;
    }

    // The following test is listed in the paper, but it is redundant because
    // the previous tests guarantee that C == (0, 0, 0).
    // (c.y*a.z - c.z*a.y).sign() // db.x

    let detsign = sign_of(&(&a.x * &b.y - &a.y * &b.x)); // dc.z
    if detsign != 0 {
        return detsign;
    }
    let detsign = -sign_of(&b.x); // dc.z * da.y
    if detsign != 0 {
        return detsign;
    }
    let detsign = sign_of(&b.y); // dc.z * da.x
    if detsign != 0 {
        return detsign;
    }
    let detsign = sign_of(&a.x); // dc.z * db.y
    if detsign != 0 {
        return detsign;
    }
    // dc.z * db.y * da.x
    1
}

/// Returns a unit-length vector that is orthogonal to the given point. The
/// result is deterministic and is used as the reference direction for
/// vertex crossings at that point.
pub fn reference_dir(a: &Point) -> Point {
    Point(a.0.ortho())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::r3::vector::Vector;
    use crate::s2::random;

    #[test]
    fn test_sign() {
        let a = Point::from_coords(1., 0., 0.);
        let b = Point::from_coords(0., 1., 0.);
        let c = Point::from_coords(0., 0., 1.);
        assert!(sign(&a, &b, &c));
        assert!(!sign(&c, &b, &a));
        assert!(!sign(&a, &a, &c));
    }

    #[test]
    fn test_robust_sign_collinear_points() {
        // Points on the equator are exactly collinear; the perturbation
        // scheme still assigns them a consistent orientation.
        let x = Point(Vector::new(1., 0., 0.));
        let y = Point(Vector::new(0., 1., 0.));
        let z = Point(Vector::new(-1., 0., 0.));
        let d = robust_sign(&x, &y, &z);
        assert_ne!(d, Direction::Indeterminate);
        assert_eq!(robust_sign(&y, &z, &x), d);
        assert_eq!(robust_sign(&z, &y, &x), -d);
        assert_eq!(robust_sign(&x, &x, &z), Direction::Indeterminate);
    }

    #[test]
    fn test_robust_sign_nearly_collinear() {
        // Three points spaced by the smallest representable amount.
        let a = Point(Vector::new(1., 0., 0.));
        let b = Point(Vector::new(1., f64::EPSILON, 0.));
        let c = Point(Vector::new(1., 2. * f64::EPSILON, 0.));
        let d = robust_sign(&a, &b, &c);
        assert_ne!(d, Direction::Indeterminate);
        assert_eq!(robust_sign(&c, &b, &a), -d);
        assert_eq!(robust_sign(&b, &c, &a), d);
    }

    #[test]
    fn test_robust_sign_consistency() {
        for _ in 0..500 {
            let a = random::point();
            let b = random::point();
            let c = random::point();
            let d = robust_sign(&a, &b, &c);
            assert_eq!(robust_sign(&b, &c, &a), d);
            assert_eq!(robust_sign(&c, &a, &b), d);
            assert_eq!(robust_sign(&c, &b, &a), -d);
            if sign(&a, &b, &c) {
                assert_eq!(d, Direction::CounterClockwise);
            }
        }
    }

    #[test]
    fn test_exact_sign_matches_triage() {
        let a = Point::from_coords(1., 0.1, 0.);
        let b = Point::from_coords(0.1, 1., 0.2);
        let c = Point::from_coords(0.1, 0.3, 1.);
        assert_eq!(exact_sign(&a, &b, &c, false), triage_sign(&a, &b, &c));
        assert_eq!(exact_sign(&a, &b, &c, true), stable_sign(&a, &b, &c));
    }

    #[test]
    fn test_direction_negation() {
        assert_eq!(-Direction::Clockwise, Direction::CounterClockwise);
        assert_eq!(-Direction::Indeterminate, Direction::Indeterminate);
        assert_eq!(Direction::from(-7), Direction::Clockwise);
    }
}
