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

//! Robust edge crossing tests. These are the oracle used by loop
//! validation and by the boundary relation queries between loops.

use std::fmt;

use crate::s2::edge_crosser::EdgeCrosser;
use crate::s2::point::{ordered_ccw, Point};
use crate::s2::predicates::reference_dir;

/// Crossing indicates how edges cross.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Crossing {
    /// The edges cross at a point interior to both.
    Cross,
    /// Two vertices from different edges are the same.
    Maybe,
    DoNotCross,
}

impl fmt::Display for Crossing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Crossing::Cross => write!(f, "Cross"),
            Crossing::Maybe => write!(f, "MaybeCross"),
            Crossing::DoNotCross => write!(f, "DoNotCross"),
        }
    }
}

/// Reports whether the edge AB intersects the edge CD. If AB crosses CD at a
/// point interior to both edges, Cross is returned. If any two vertices from
/// different edges are the same it returns Maybe. Otherwise it returns
/// DoNotCross. If either edge is degenerate (A == B or C == D), the result is
/// Maybe if two vertices from different edges are the same and DoNotCross
/// otherwise.
///
/// Properties:
///
///   (1) crossing_sign(b,a,c,d) == crossing_sign(a,b,c,d)
///   (2) crossing_sign(c,d,a,b) == crossing_sign(a,b,c,d)
///   (3) crossing_sign(a,b,c,d) == Maybe if a==c, a==d, b==c, b==d
///   (4) crossing_sign(a,b,c,d) == DoNotCross or Maybe if a==b or c==d
///
/// The predicate uses a consistent symbolic perturbation so that no three
/// points are ever treated as collinear.
pub fn crossing_sign(a: &Point, b: &Point, c: &Point, d: &Point) -> Crossing {
    let mut crosser = EdgeCrosser::new_chain(a, b, c);
    crosser.chain_crossing_sign(d)
}

/// Reports whether two edges "cross" in such a way that point-in-polygon
/// containment tests can be implemented by counting the number of edge
/// crossings.
///
/// Given two edges AB and CD where at least two vertices are identical
/// (crossing_sign(a,b,c,d) == Maybe), a crossing occurs if AB is encountered
/// after CD during a CCW sweep around the shared vertex starting from a
/// fixed reference point.
///
/// Properties:
///
///   (1) vertex_crossing(a,a,c,d) == vertex_crossing(a,b,c,c) == false
///   (2) vertex_crossing(a,b,a,b) == vertex_crossing(a,b,b,a) == true
///   (3) vertex_crossing(a,b,c,d) == vertex_crossing(a,b,d,c)
///       == vertex_crossing(b,a,c,d) == vertex_crossing(b,a,d,c)
///   (4) If exactly one of a,b equals one of c,d, then exactly one of
///       vertex_crossing(a,b,c,d) and vertex_crossing(c,d,a,b) is true
///
/// It is an error to call this with 4 distinct vertices.
pub fn vertex_crossing(a: &Point, b: &Point, c: &Point, d: &Point) -> bool {
    // Checked first in case 3 or more input points are identical.
    if a == b || c == d {
        return false;
    }

    if a == c {
        return b == d || ordered_ccw(&reference_dir(a), d, b, a);
    }
    if b == d {
        return ordered_ccw(&reference_dir(b), c, a, b);
    }
    if a == d {
        return b == c || ordered_ccw(&reference_dir(a), c, b, a);
    }
    if b == c {
        return ordered_ccw(&reference_dir(b), d, a, b);
    }
    false
}

/// Calls crossing_sign when all four vertices are distinct and
/// vertex_crossing when two or more are the same. Counting these crossings
/// along a path gives point-in-polygon containment.
pub fn edge_or_vertex_crossing(a: &Point, b: &Point, c: &Point, d: &Point) -> bool {
    match crossing_sign(a, b, c, d) {
        Crossing::DoNotCross => false,
        Crossing::Cross => true,
        Crossing::Maybe => vertex_crossing(a, b, c, d),
    }
}

/// Reports whether the angle ABC contains its vertex B. Containment is
/// defined so that if several angles share B and their union is the whole
/// sphere, exactly one of them contains B. A degenerate angle (A == C) never
/// contains its vertex.
///
/// The angle is closed at A and open at C: B is inside when A is the
/// reference direction of B but not when C is.
pub fn angle_contains_vertex(a: &Point, b: &Point, c: &Point) -> bool {
    !ordered_ccw(&reference_dir(b), c, a, b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::s2::latlng::LatLng;

    #[test]
    fn test_angle_contains_vertex() {
        let a = Point::from_coords(1., 0., 0.);
        let b = Point::from_coords(0., 1., 0.);
        let ref_b = reference_dir(&b);

        // Degenerate angle ABA.
        assert!(!angle_contains_vertex(&a, &b, &a));

        // An angle where A == reference_dir(B).
        assert!(angle_contains_vertex(&ref_b, &b, &a));

        // An angle where C == reference_dir(B).
        assert!(!angle_contains_vertex(&a, &b, &ref_b));

        // Exactly one of the angles around a vertex contains it.
        let around = crate::s2::point::regular_points(&b, crate::s1::Angle(0.1), 10);
        let count = (0..around.len())
            .filter(|&i| angle_contains_vertex(&around[(i + 1) % around.len()], &b, &around[i]))
            .count();
        assert_eq!(count, 1);
    }

    fn ll(lat: f64, lng: f64) -> Point {
        Point::from(LatLng::from_degrees(lat, lng))
    }

    fn check(a: &Point, b: &Point, c: &Point, d: &Point, want: Crossing) {
        // Both edge orders and both edge directions agree.
        assert_eq!(crossing_sign(a, b, c, d), want);
        assert_eq!(crossing_sign(b, a, c, d), want);
        assert_eq!(crossing_sign(a, b, d, c), want);
        assert_eq!(crossing_sign(c, d, a, b), want);
    }

    #[test]
    fn test_crossing_sign() {
        // Two regular edges that cross.
        check(&ll(0., -10.), &ll(0., 10.), &ll(-10., 0.), &ll(10., 0.), Crossing::Cross);

        // Two edges on the same great circle that don't overlap.
        check(&ll(0., 0.), &ll(0., 10.), &ll(0., 20.), &ll(0., 30.), Crossing::DoNotCross);

        // Edges whose great circles cross outside both edges.
        check(&ll(0., 0.), &ll(0., 10.), &ll(-10., 20.), &ll(10., 20.), Crossing::DoNotCross);

        // A shared vertex.
        check(&ll(0., 0.), &ll(0., 10.), &ll(0., 10.), &ll(10., 10.), Crossing::Maybe);

        // The same edge.
        check(&ll(0., 0.), &ll(0., 10.), &ll(0., 0.), &ll(0., 10.), Crossing::Maybe);

        // A degenerate edge that touches nothing.
        let p = ll(5., 5.);
        assert_eq!(crossing_sign(&ll(0., 0.), &ll(0., 10.), &p, &p), Crossing::DoNotCross);

        // Nearly antipodal edges do not cross.
        check(
            &Point::from_coords(1., 0., 0.),
            &Point::from_coords(0., 1., 0.),
            &Point::from_coords(-1., 0., 1e-300),
            &Point::from_coords(0., -1., 1e-300),
            Crossing::DoNotCross,
        );
    }

    #[test]
    fn test_vertex_crossing_properties() {
        let a = ll(0., 0.);
        let b = ll(0., 10.);
        let c = ll(10., 5.);
        let d = ll(-10., 5.);

        assert!(!vertex_crossing(&a, &a, &c, &d));
        assert!(!vertex_crossing(&a, &b, &c, &c));
        assert!(vertex_crossing(&a, &b, &a, &b));
        assert!(vertex_crossing(&a, &b, &b, &a));

        // Exactly one of the two orders crosses when one vertex is shared.
        for p in [&c, &d] {
            let x = vertex_crossing(&a, &b, &a, p);
            let y = vertex_crossing(&a, p, &a, &b);
            assert_ne!(x, y);
            assert_eq!(vertex_crossing(&a, &b, p, &a), vertex_crossing(&b, &a, &a, p));
        }
    }

    #[test]
    fn test_edge_or_vertex_crossing() {
        let a = ll(0., 0.);
        let b = ll(0., 10.);
        assert!(edge_or_vertex_crossing(&ll(0., -10.), &ll(0., 10.), &ll(-10., 0.), &ll(10., 0.)));
        assert!(!edge_or_vertex_crossing(&a, &b, &ll(10., 20.), &ll(20., 20.)));
        assert!(edge_or_vertex_crossing(&a, &b, &a, &b));
    }
}
