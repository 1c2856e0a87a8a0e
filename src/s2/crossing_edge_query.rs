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

use crate::r2::point::Point as R2Point;
use crate::s2::cellid::CellID;
use crate::s2::edge_clipping::{clip_to_faces, edge_intersects_rect};
use crate::s2::edge_crosser::EdgeCrosser;
use crate::s2::edge_crossings::Crossing;
use crate::s2::point::Point;
use crate::s2::shape::Shape;
use crate::s2::shape_index::{CellRelation, ShapeIndex, CELL_PADDING};

/// Shapes with at most this many edges are tested exhaustively rather than
/// through the index.
const MAX_BRUTE_FORCE_EDGES: usize = 27;

/// CrossingType specifies the types of edge crossings to be reported.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum CrossingType {
    /// Only edges whose interiors cross.
    Interior,

    /// All pairs of crossing edges, including those that only share a
    /// vertex.
    All,
}

/// CrossingEdgeQuery finds the edges of an indexed shape that are crossed
/// by a given edge. The shape must be the one the index was built with
/// under the given shape id.
pub struct CrossingEdgeQuery<'a> {
    index: &'a ShapeIndex,
    shape_id: usize,
    shape: &'a dyn Shape,
}

impl<'a> CrossingEdgeQuery<'a> {
    pub fn new(index: &'a ShapeIndex, shape_id: usize, shape: &'a dyn Shape) -> CrossingEdgeQuery<'a> {
        CrossingEdgeQuery {
            index,
            shape_id,
            shape,
        }
    }

    /// Returns the ids of the edges that intersect the edge AB, in
    /// increasing order.
    pub fn crossings(&self, a: &Point, b: &Point, crossing_type: CrossingType) -> Vec<usize> {
        let mut crosser = EdgeCrosser::new(a, b);
        self.candidates(a, b)
            .into_iter()
            .filter(|&e| {
                let edge = self.shape.edge(e);
                match crosser.crossing_sign(&edge.v0, &edge.v1) {
                    Crossing::Cross => true,
                    Crossing::Maybe => crossing_type == CrossingType::All,
                    Crossing::DoNotCross => false,
                }
            })
            .collect()
    }

    /// Returns a superset of the edges that intersect the edge AB, in
    /// increasing order.
    pub fn candidates(&self, a: &Point, b: &Point) -> Vec<usize> {
        let num_edges = self.shape.num_edges();
        if num_edges <= MAX_BRUTE_FORCE_EDGES {
            return (0..num_edges).collect();
        }

        let mut edges = Vec::new();
        for (f, a_uv, b_uv) in clip_to_faces(a, b, CELL_PADDING) {
            self.visit_cells(CellID::from_face(f as u64), &a_uv, &b_uv, &mut edges);
        }
        edges.sort_unstable();
        edges.dedup();
        edges
    }

    // Walks down from the given cell to the index cells that the (u,v)
    // segment passes through, collecting their edges.
    fn visit_cells(&self, id: CellID, a: &R2Point, b: &R2Point, edges: &mut Vec<usize>) {
        let bound = id.bound_uv().expanded_by_margin(CELL_PADDING);
        if !edge_intersects_rect(a, b, &bound) {
            return;
        }
        match self.index.locate_cell_id(id) {
            CellRelation::Disjoint => {}
            CellRelation::Indexed => {
                if let Some(clipped) = self
                    .index
                    .containing_cell(id)
                    .and_then(|(_, cell)| cell.find_by_shape_id(self.shape_id))
                {
                    edges.extend_from_slice(clipped.edges());
                }
            }
            CellRelation::Subdivided => {
                for child in id.children() {
                    self.visit_cells(child, a, b, edges);
                }
            }
        }
    }
}
