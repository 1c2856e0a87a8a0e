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

use crate::consts::DBL_EPSILON;
use crate::s2::edge_crossings::{vertex_crossing, Crossing};
use crate::s2::point::{point_cross, Point};
use crate::s2::predicates::{expensive_sign, robust_sign, triage_sign, Direction};

/// EdgeCrosser tests edges for intersection with a fixed edge AB. It is
/// especially efficient for an edge chain connecting vertices v0, v1, v2,
/// ... since each call only classifies the newest vertex.
///
/// ```ignore
/// let mut crosser = EdgeCrosser::new(&a, &b);
/// let count = edges
///     .iter()
///     .filter(|(c, d)| crosser.crossing_sign(c, d) != Crossing::DoNotCross)
///     .count();
/// ```
#[derive(Clone, Debug)]
pub struct EdgeCrosser {
    a: Point,
    b: Point,

    // Outward-facing tangents at A and B. If the plane perpendicular to
    // one of them separates AB from CD there is no crossing, which avoids
    // most calls to expensive_sign for collinear chains.
    a_tangent: Point,
    b_tangent: Point,

    // Updated for each vertex in the chain: the previous vertex and the
    // orientation of triangle ACB.
    c: Point,
    acb: Direction,
}

impl EdgeCrosser {
    /// Returns an EdgeCrosser with the fixed edge AB.
    pub fn new(a: &Point, b: &Point) -> EdgeCrosser {
        let norm = point_cross(a, b);
        EdgeCrosser {
            a: *a,
            b: *b,
            a_tangent: Point(a.0.cross(&norm.0)),
            b_tangent: Point(norm.0.cross(&b.0)),
            c: Point::default(),
            acb: Direction::Indeterminate,
        }
    }

    /// Returns an EdgeCrosser with the fixed edge AB and C as the first
    /// vertex of the chain.
    pub fn new_chain(a: &Point, b: &Point, c: &Point) -> EdgeCrosser {
        let mut e = EdgeCrosser::new(a, b);
        e.restart_at(c);
        e
    }

    pub fn a(&self) -> &Point {
        &self.a
    }

    pub fn b(&self) -> &Point {
        &self.b
    }

    /// Reports whether the edge AB intersects the edge CD, with the same
    /// semantics as edge_crossings::crossing_sign.
    pub fn crossing_sign(&mut self, c: &Point, d: &Point) -> Crossing {
        if *c != self.c {
            self.restart_at(c);
        }
        self.chain_crossing_sign(d)
    }

    /// Reports whether crossing_sign(c, d) is Cross, or AB and CD share a
    /// vertex and vertex_crossing(a, b, c, d) is true.
    pub fn edge_or_vertex_crossing(&mut self, c: &Point, d: &Point) -> bool {
        if *c != self.c {
            self.restart_at(c);
        }
        self.edge_or_vertex_chain_crossing(d)
    }

    /// Sets the current vertex of the chain to c.
    pub fn restart_at(&mut self, c: &Point) {
        self.c = *c;
        self.acb = -triage_sign(&self.a, &self.b, c);
    }

    /// Like crossing_sign, with the last vertex passed to one of the
    /// crossing methods (or restart_at) as C.
    pub fn chain_crossing_sign(&mut self, d: &Point) -> Crossing {
        // A crossing requires triangles ACB, CBD, BDA and DAC to all have
        // the same orientation. Checking BDA against the cached ACB tests
        // whether C and D are on opposite sides of the great circle AB.
        // triage_sign is invariant under rotation, so ABD has the orientation
        // of BDA.
        let bda = triage_sign(&self.a, &self.b, d);
        if self.acb == -bda && bda != Direction::Indeterminate {
            // Same side: the common case.
            self.c = *d;
            self.acb = -bda;
            return Crossing::DoNotCross;
        }
        let (crossing, bda) = self.crossing_sign_slow(d, bda);
        self.c = *d;
        self.acb = -bda;
        crossing
    }

    /// Like edge_or_vertex_crossing, with the last vertex passed to one of
    /// the crossing methods (or restart_at) as C.
    pub fn edge_or_vertex_chain_crossing(&mut self, d: &Point) -> bool {
        // chain_crossing_sign overwrites c.
        let c = self.c;
        match self.chain_crossing_sign(d) {
            Crossing::DoNotCross => false,
            Crossing::Cross => true,
            Crossing::Maybe => vertex_crossing(&self.a, &self.b, &c, d),
        }
    }

    // The slow path of chain_crossing_sign. Returns the result and the
    // orientation of BDA resolved as far as was needed.
    fn crossing_sign_slow(&mut self, d: &Point, mut bda: Direction) -> (Crossing, Direction) {
        // A common case is four points on a line where AB does not overlap
        // CD, e.g. a finely sampled curve. The tangent planes at A and B
        // usually separate them. Each dot product has error at most
        // DBL_EPSILON and the tangents (0.5 + 1/sqrt(3)) * DBL_EPSILON.
        let max_error = (1.5 + 1. / 3f64.sqrt()) * DBL_EPSILON;
        let c = self.c;
        if (c.dot(&self.a_tangent) > max_error && d.dot(&self.a_tangent) > max_error)
            || (c.dot(&self.b_tangent) > max_error && d.dot(&self.b_tangent) > max_error)
        {
            return (Crossing::DoNotCross, bda);
        }

        // Shared vertices and degenerate edges are settled without exact
        // arithmetic.
        if self.a == c || self.a == *d || self.b == c || self.b == *d {
            return (Crossing::Maybe, bda);
        }
        if self.a == self.b || c == *d {
            return (Crossing::DoNotCross, bda);
        }

        if self.acb == Direction::Indeterminate {
            self.acb = -expensive_sign(&self.a, &self.b, &c);
        }
        if bda == Direction::Indeterminate {
            bda = expensive_sign(&self.a, &self.b, d);
        }
        if bda != self.acb {
            return (Crossing::DoNotCross, bda);
        }

        let cbd = -robust_sign(&c, d, &self.b);
        if cbd != self.acb {
            return (Crossing::DoNotCross, bda);
        }
        let dac = robust_sign(&c, d, &self.a);
        if dac != self.acb {
            return (Crossing::DoNotCross, bda);
        }
        (Crossing::Cross, bda)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::s2::edge_crossings::{crossing_sign, edge_or_vertex_crossing};
    use crate::s2::latlng::LatLng;
    use crate::s2::random;

    fn ll(lat: f64, lng: f64) -> Point {
        Point::from(LatLng::from_degrees(lat, lng))
    }

    #[test]
    fn test_chain_matches_single_edge_tests() {
        for _ in 0..200 {
            let a = random::point();
            let b = random::point();
            let chain: Vec<Point> = (0..8).map(|_| random::point()).collect();
            let mut crosser = EdgeCrosser::new_chain(&a, &b, &chain[0]);
            for w in chain.windows(2) {
                let want = crossing_sign(&a, &b, &w[0], &w[1]);
                assert_eq!(crosser.chain_crossing_sign(&w[1]), want);
            }
            let mut crosser = EdgeCrosser::new(&a, &b);
            for w in chain.windows(2) {
                assert_eq!(
                    crosser.edge_or_vertex_crossing(&w[0], &w[1]),
                    edge_or_vertex_crossing(&a, &b, &w[0], &w[1])
                );
            }
        }
    }

    #[test]
    fn test_collinear_chain() {
        // A finely sampled equator never crosses an equatorial edge it does
        // not overlap.
        let a = ll(0., 0.);
        let b = ll(0., 1.);
        let mut crosser = EdgeCrosser::new_chain(&a, &b, &ll(0., 2.));
        for i in 3..40 {
            assert_eq!(crosser.chain_crossing_sign(&ll(0., i as f64)), Crossing::DoNotCross);
        }
    }

    #[test]
    fn test_restart_and_shared_vertex() {
        let a = ll(0., 0.);
        let b = ll(0., 10.);
        let mut crosser = EdgeCrosser::new(&a, &b);
        assert_eq!(crosser.crossing_sign(&ll(-5., 5.), &ll(5., 5.)), Crossing::Cross);
        assert_eq!(crosser.chain_crossing_sign(&ll(5., 10.)), Crossing::DoNotCross);
        crosser.restart_at(&b);
        assert_eq!(crosser.chain_crossing_sign(&ll(10., 10.)), Crossing::Maybe);
        assert_eq!(crosser.a(), &a);
        assert_eq!(crosser.b(), &b);
    }
}
