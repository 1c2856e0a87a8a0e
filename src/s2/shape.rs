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

use crate::s2::edge_crosser::EdgeCrosser;
use crate::s2::point::Point;

/// Edge represents a geodesic edge consisting of two vertices. Zero-length
/// edges are allowed, and can be used to represent points.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Edge {
    pub v0: Point,
    pub v1: Point,
}

impl Edge {
    pub fn new(v0: Point, v1: Point) -> Edge {
        Edge { v0, v1 }
    }

    /// Returns the edge with its vertices swapped.
    pub fn reversed(&self) -> Edge {
        Edge {
            v0: self.v1,
            v1: self.v0,
        }
    }
}

/// Chain represents a range of edge ids corresponding to a chain of
/// connected edges, specified as a (start, length) pair.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Chain {
    pub start: usize,
    pub length: usize,
}

/// ChainPosition represents the position of an edge within a given edge
/// chain, specified as a (chain_id, offset) pair.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChainPosition {
    pub chain_id: usize,
    pub offset: usize,
}

/// ReferencePoint is a point together with whether it is contained by the
/// shape. Point containment for a whole shape is derived from it by counting
/// edge crossings.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ReferencePoint {
    pub point: Point,
    pub contained: bool,
}

impl ReferencePoint {
    pub fn new(point: Point, contained: bool) -> ReferencePoint {
        ReferencePoint { point, contained }
    }
}

/// Shape is the edge-level view of a geometry that the shape index works
/// with. Each edge has a dense id in [0, num_edges), and the edges are
/// grouped into chains of connected edges.
///
/// Shapes of dimension 2 have an interior, which is on the left of every
/// edge; reference_point describes where it is.
pub trait Shape {
    /// Returns the number of edges in this shape.
    fn num_edges(&self) -> usize;

    /// Returns the edge for the given edge id.
    fn edge(&self, e: usize) -> Edge;

    /// Returns an arbitrary point and whether it is contained by the shape.
    /// Only meaningful for shapes of dimension 2.
    fn reference_point(&self) -> ReferencePoint;

    fn num_chains(&self) -> usize;

    fn chain(&self, chain_id: usize) -> Chain;

    /// Returns the edge at the given offset within the given chain.
    fn chain_edge(&self, chain_id: usize, offset: usize) -> Edge;

    fn chain_position(&self, e: usize) -> ChainPosition;

    /// Returns 0 for points, 1 for polylines and 2 for polygons.
    fn dimension(&self) -> u8;

    /// Reports whether the shape contains no points. A polygon is empty
    /// when it has no edges and its reference point is not contained.
    fn is_empty(&self) -> bool {
        self.num_edges() == 0 && (self.dimension() < 2 || self.num_chains() == 0)
    }

    /// Reports whether the shape contains all points on the sphere.
    fn is_full(&self) -> bool {
        self.num_edges() == 0 && self.dimension() == 2 && self.num_chains() > 0
    }
}

/// Reports whether the given shape contains the point by walking from its
/// reference point and counting edge crossings. Every edge is visited.
pub fn contains_brute_force(shape: &dyn Shape, p: &Point) -> bool {
    if shape.dimension() < 2 {
        return false;
    }
    let reference = shape.reference_point();
    if reference.point == *p {
        return reference.contained;
    }
    let mut crosser = EdgeCrosser::new(&reference.point, p);
    let mut inside = reference.contained;
    for e in 0..shape.num_edges() {
        let edge = shape.edge(e);
        inside ^= crosser.edge_or_vertex_crossing(&edge.v0, &edge.v1);
    }
    inside
}
