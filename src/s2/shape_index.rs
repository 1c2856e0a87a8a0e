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

//! A spatial index of shape edges. The sphere is covered by a set of
//! disjoint cells; each cell records which edges of which shapes pass
//! through it (padded slightly) and whether each shape contains the cell
//! center. Point containment then only needs the edges of a single cell.
//!
//! The index does not own its shapes. Queries that need edge geometry take
//! the shape alongside the index, and the caller must pass the same shapes
//! the index was built from.

use std::collections::BTreeMap;

use tracing::debug;

use crate::r2::point::Point as R2Point;
use crate::s2::cellid::CellID;
use crate::s2::edge_clipping::{
    clip_to_faces, edge_intersects_rect, EDGE_CLIP_ERROR_UV_COORD, FACE_CLIP_ERROR_UV_COORD,
};
use crate::s2::edge_crosser::EdgeCrosser;
use crate::s2::edge_crossings::Crossing;
use crate::s2::error::LoopValidationError;
use crate::s2::metric::AVG_EDGE_METRIC;
use crate::s2::point::Point;
use crate::s2::shape::{contains_brute_force, Edge, Shape};
use crate::s2::stuv::MAX_LEVEL;

/// Total error when clipping an edge: clipping to a cube face plus clipping
/// to a cell boundary, doubled so that query edges need no extra padding.
pub const CELL_PADDING: f64 = 2.0 * (FACE_CLIP_ERROR_UV_COORD + EDGE_CLIP_ERROR_UV_COORD);

/// The cell size relative to an edge's length at which the edge is first
/// considered long. Long edges do not count toward subdividing a cell.
pub const CELL_SIZE_TO_LONG_EDGE_RATIO: f64 = 1.0;

/// A cell is subdivided when more than this many short edges pass through
/// it.
pub const MAX_EDGES_PER_CELL: usize = 10;

/// CellRelation describes the relationship between a target cell and the
/// cells of the index. If the target is an index cell or is contained by
/// one it is Indexed. If the target contains index cells it is Subdivided.
/// Otherwise it is Disjoint.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum CellRelation {
    Indexed,
    Subdivided,
    Disjoint,
}

/// ClippedShape is the part of a shape that intersects an index cell: the
/// ids of the edges passing through the cell and whether the shape contains
/// the cell center. The edges themselves are not clipped.
#[derive(Debug, Clone)]
pub struct ClippedShape {
    pub(crate) shape_id: usize,
    contains_center: bool,
    // Sorted in increasing order.
    pub(crate) edges: Vec<usize>,
}

impl ClippedShape {
    pub fn new(shape_id: usize, contains_center: bool, edges: Vec<usize>) -> ClippedShape {
        ClippedShape {
            shape_id,
            contains_center,
            edges,
        }
    }

    pub fn shape_id(&self) -> usize {
        self.shape_id
    }

    pub fn num_edges(&self) -> usize {
        self.edges.len()
    }

    pub fn edges(&self) -> &[usize] {
        &self.edges
    }

    pub fn contains_center(&self) -> bool {
        self.contains_center
    }

    /// Reports whether this clipped shape contains the given edge id.
    pub fn contains_edge(&self, id: usize) -> bool {
        self.edges.binary_search(&id).is_ok()
    }
}

/// ShapeIndexCell stores the index contents for a particular CellID.
#[derive(Debug, Clone, Default)]
pub struct ShapeIndexCell {
    pub(crate) shapes: Vec<ClippedShape>,
}

impl ShapeIndexCell {
    /// Returns the total number of edges in all clipped shapes.
    pub fn num_edges(&self) -> usize {
        self.shapes.iter().map(|s| s.num_edges()).sum()
    }

    pub fn shapes(&self) -> &[ClippedShape] {
        &self.shapes
    }

    /// Returns the clipped shape for the given shape id, if the shape
    /// intersects this cell.
    pub fn find_by_shape_id(&self, shape_id: usize) -> Option<&ClippedShape> {
        self.shapes.iter().find(|s| s.shape_id == shape_id)
    }
}

// An edge clipped to one face, ready to be distributed among cells.
#[derive(Clone, Copy)]
struct FaceEdge {
    shape_id: usize,
    edge_id: usize,
    // The level at which this edge becomes long; it counts toward
    // subdivision only in cells of a lower level.
    max_level: u64,
    a: R2Point,
    b: R2Point,
    edge: Edge,
}

/// ShapeIndex maps disjoint cells to the shape edges that pass through
/// them.
#[derive(Debug, Clone, Default)]
pub struct ShapeIndex {
    cells: BTreeMap<CellID, ShapeIndexCell>,
    num_shapes: usize,
}

impl ShapeIndex {
    /// Builds an index for the given shapes. Shape ids are positions in the
    /// slice.
    pub fn build(shapes: &[&dyn Shape]) -> ShapeIndex {
        let mut index = ShapeIndex {
            cells: BTreeMap::new(),
            num_shapes: shapes.len(),
        };

        let mut face_edges: [Vec<FaceEdge>; 6] = Default::default();
        let mut num_edges = 0;
        for (shape_id, shape) in shapes.iter().enumerate() {
            for edge_id in 0..shape.num_edges() {
                let edge = shape.edge(edge_id);
                let max_level = max_level_for_edge(&edge);
                for (f, a, b) in clip_to_faces(&edge.v0, &edge.v1, CELL_PADDING) {
                    face_edges[f as usize].push(FaceEdge {
                        shape_id,
                        edge_id,
                        max_level,
                        a,
                        b,
                        edge,
                    });
                }
                num_edges += 1;
            }
        }

        for (f, edges) in face_edges.iter().enumerate() {
            let id = CellID::from_face(f as u64);
            let center = id.center_point();
            let inside: Vec<bool> = shapes.iter().map(|s| contains_brute_force(*s, &center)).collect();
            let edges: Vec<&FaceEdge> = edges.iter().collect();
            index.update_cell(id, &edges, &inside);
        }

        debug!(
            shapes = shapes.len(),
            edges = num_edges,
            cells = index.cells.len(),
            "built shape index"
        );
        index
    }

    // Either subdivides the cell or stores it. edges are the face edges
    // that pass through the padded cell, inside[s] whether shape s contains
    // the cell center.
    fn update_cell(&mut self, id: CellID, edges: &[&FaceEdge], inside: &[bool]) {
        let level = id.level();
        let short_edges = edges.iter().filter(|e| e.max_level > level).count();
        if short_edges > MAX_EDGES_PER_CELL && level < MAX_LEVEL {
            let center = id.center_point();
            for child in id.children() {
                let bound = child.bound_uv().expanded_by_margin(CELL_PADDING);
                let child_edges: Vec<&FaceEdge> = edges
                    .iter()
                    .copied()
                    .filter(|e| edge_intersects_rect(&e.a, &e.b, &bound))
                    .collect();

                // The segment between the two centers stays inside this
                // cell, so only its edges can cross it.
                let child_center = child.center_point();
                let mut child_inside = inside.to_vec();
                let mut crosser = EdgeCrosser::new(&center, &child_center);
                for e in edges {
                    if crosser.edge_or_vertex_crossing(&e.edge.v0, &e.edge.v1) {
                        child_inside[e.shape_id] ^= true;
                    }
                }
                self.update_cell(child, &child_edges, &child_inside);
            }
            return;
        }

        if edges.is_empty() && !inside.iter().any(|&c| c) {
            return;
        }
        let mut cell = ShapeIndexCell::default();
        for (shape_id, &contains_center) in inside.iter().enumerate() {
            let mut ids: Vec<usize> = edges
                .iter()
                .filter(|e| e.shape_id == shape_id)
                .map(|e| e.edge_id)
                .collect();
            if ids.is_empty() && !contains_center {
                continue;
            }
            ids.sort_unstable();
            ids.dedup();
            cell.shapes.push(ClippedShape::new(shape_id, contains_center, ids));
        }
        self.cells.insert(id, cell);
    }

    pub fn num_shapes(&self) -> usize {
        self.num_shapes
    }

    pub fn num_cells(&self) -> usize {
        self.cells.len()
    }

    /// Returns the index cells in increasing CellID order.
    pub fn iter(&self) -> impl Iterator<Item = (&CellID, &ShapeIndexCell)> {
        self.cells.iter()
    }

    /// Returns the index cell equal to or containing the target, if any.
    pub fn containing_cell(&self, target: CellID) -> Option<(CellID, &ShapeIndexCell)> {
        // Index cells are disjoint, so the containing cell is either the
        // first cell at or after the target's range or the one before it.
        if let Some((id, cell)) = self.cells.range(target.range_min()..).next() {
            if id.contains(&target) {
                return Some((*id, cell));
            }
        }
        self.cells
            .range(..target.range_min())
            .next_back()
            .filter(|(id, _)| id.contains(&target))
            .map(|(id, cell)| (*id, cell))
    }

    /// Returns the index cell containing the given point, if any.
    pub fn locate_point(&self, p: &Point) -> Option<(CellID, &ShapeIndexCell)> {
        self.containing_cell(CellID::from_point(p))
    }

    /// Classifies the target cell against the index cells.
    pub fn locate_cell_id(&self, target: CellID) -> CellRelation {
        if let Some((id, _)) = self.cells.range(target.range_min()..).next() {
            if id.contains(&target) {
                return CellRelation::Indexed;
            }
            if *id <= target.range_max() {
                return CellRelation::Subdivided;
            }
        }
        match self.cells.range(..target.range_min()).next_back() {
            Some((id, _)) if id.range_max() >= target => CellRelation::Indexed,
            _ => CellRelation::Disjoint,
        }
    }

    /// Reports whether the shape with the given id contains the point,
    /// using only the edges of the cell that contains it. Points on the
    /// boundary are resolved the same way as contains_brute_force.
    pub fn shape_contains(&self, shape_id: usize, shape: &dyn Shape, p: &Point) -> bool {
        let Some((id, cell)) = self.locate_point(p) else {
            return false;
        };
        let Some(clipped) = cell.find_by_shape_id(shape_id) else {
            return false;
        };
        let mut inside = clipped.contains_center;
        if clipped.num_edges() > 0 {
            let center = id.center_point();
            let mut crosser = EdgeCrosser::new(&center, p);
            for &e in &clipped.edges {
                let edge = shape.edge(e);
                inside ^= crosser.edge_or_vertex_crossing(&edge.v0, &edge.v1);
            }
        }
        inside
    }

    /// Looks for a pair of non-adjacent edges of a closed chain that cross
    /// or share a vertex, testing only pairs that meet in some index cell.
    pub fn find_self_intersection(&self, shape_id: usize, shape: &dyn Shape) -> Option<LoopValidationError> {
        let n = shape.num_edges();
        self.cells
            .values()
            .filter_map(|cell| cell.find_by_shape_id(shape_id))
            .find_map(|clipped| find_crossing_pair(shape, n, &clipped.edges))
    }
}

/// Tests every pair of the given edges (sorted ids of a closed chain with n
/// edges) and reports the first non-adjacent pair that crosses or touches.
pub(crate) fn find_crossing_pair(shape: &dyn Shape, n: usize, edges: &[usize]) -> Option<LoopValidationError> {
    for (i, &ai) in edges.iter().enumerate() {
        let a = shape.edge(ai);
        let mut crosser = EdgeCrosser::new(&a.v0, &a.v1);
        for &bi in &edges[i + 1..] {
            // Adjacent edges always share a vertex.
            if bi == ai + 1 || (ai == 0 && bi + 1 == n) {
                continue;
            }
            let b = shape.edge(bi);
            match crosser.crossing_sign(&b.v0, &b.v1) {
                Crossing::Cross => {
                    return Some(LoopValidationError::SelfIntersection { first: ai, second: bi })
                }
                Crossing::Maybe => return Some(LoopValidationError::SharedVertex { first: ai, second: bi }),
                Crossing::DoNotCross => {}
            }
        }
    }
    None
}

// Returns the first level at which the edge counts as long.
fn max_level_for_edge(edge: &Edge) -> u64 {
    // Norm is close enough to the angle here.
    let cell_size = (edge.v0.0 - edge.v1.0).norm() * CELL_SIZE_TO_LONG_EDGE_RATIO;
    AVG_EDGE_METRIC.min_level(cell_size)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::s1::{Angle, Deg};
    use crate::s2::latlng::LatLng;
    use crate::s2::point::regular_points;
    use crate::s2::random;
    use crate::s2::shape::testing::VertexChain;
    use crate::s2::shape::ReferencePoint;

    fn ll(lat: f64, lng: f64) -> Point {
        Point::from(LatLng::from_degrees(lat, lng))
    }

    fn regular_chain(center: &Point, radius_deg: f64, n: usize) -> VertexChain {
        VertexChain {
            vertices: regular_points(center, Angle::from(Deg(radius_deg)), n),
            reference: ReferencePoint::new(Point(-center.0), false),
        }
    }

    #[test]
    fn test_small_chain_is_not_subdivided() {
        let chain = regular_chain(&ll(10., 20.), 5., 4);
        let index = ShapeIndex::build(&[&chain]);
        assert_eq!(index.num_shapes(), 1);
        // Every index cell is a face cell.
        assert!(index.iter().all(|(id, _)| id.is_face()));
        let (id, cell) = index.locate_point(&ll(10., 20.)).unwrap();
        assert!(id.is_face());
        assert_eq!(cell.num_edges(), 4);
        assert!(cell.find_by_shape_id(0).unwrap().contains_edge(2));
    }

    #[test]
    fn test_contains_matches_brute_force() {
        let center = ll(-35., 140.);
        let chain = regular_chain(&center, 8., 500);
        let index = ShapeIndex::build(&[&chain]);
        assert!(index.num_cells() > 6);
        for _ in 0..500 {
            let p = random::point_near(&center, 0.2);
            assert_eq!(index.shape_contains(0, &chain, &p), contains_brute_force(&chain, &p));
        }
        // Vertices resolve the same way under both methods.
        for v in chain.vertices.iter().step_by(7) {
            assert_eq!(index.shape_contains(0, &chain, v), contains_brute_force(&chain, v));
        }
        assert!(index.shape_contains(0, &chain, &center));
        assert!(!index.shape_contains(0, &chain, &Point(-center.0)));
        assert!(!index.shape_contains(1, &chain, &center));
    }

    #[test]
    fn test_cell_centers_agree_with_brute_force() {
        let center = ll(60., -100.);
        let chain = regular_chain(&center, 3., 300);
        let index = ShapeIndex::build(&[&chain]);
        for (id, cell) in index.iter() {
            let want = contains_brute_force(&chain, &id.center_point());
            let got = cell.find_by_shape_id(0).map_or(false, |c| c.contains_center());
            assert_eq!(got, want, "cell {}", id);
        }
    }

    #[test]
    fn test_locate_cell_id() {
        let center = ll(0.5, 0.5);
        let chain = regular_chain(&center, 1., 200);
        let index = ShapeIndex::build(&[&chain]);
        let (id, _) = index.locate_point(&chain.vertices[0]).unwrap();
        assert!(id.level() > 0);
        assert_eq!(index.locate_cell_id(id), CellRelation::Indexed);
        assert_eq!(index.locate_cell_id(id.children()[3]), CellRelation::Indexed);
        assert_eq!(index.locate_cell_id(id.parent(0)), CellRelation::Subdivided);
        assert_eq!(index.locate_cell_id(CellID::from_point(&ll(0., 179.))), CellRelation::Disjoint);
    }

    #[test]
    fn test_find_self_intersection() {
        let center = ll(20., 20.);
        let mut chain = regular_chain(&center, 10., 100);
        let index = ShapeIndex::build(&[&chain]);
        assert_eq!(index.find_self_intersection(0, &chain), None);

        // Swapping two vertices makes edges 9 and 11 cross.
        chain.vertices.swap(10, 11);
        let index = ShapeIndex::build(&[&chain]);
        assert_eq!(
            index.find_self_intersection(0, &chain),
            Some(LoopValidationError::SelfIntersection { first: 9, second: 11 })
        );

        // Repeating a vertex further along the chain.
        let mut chain = regular_chain(&center, 10., 100);
        chain.vertices[50] = chain.vertices[20];
        let index = ShapeIndex::build(&[&chain]);
        assert!(matches!(
            index.find_self_intersection(0, &chain),
            Some(LoopValidationError::SharedVertex { .. }) | Some(LoopValidationError::SelfIntersection { .. })
        ));
    }
}
