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
use std::collections::HashSet;
use std::f64::consts::PI;
use std::fmt;
use std::ops::{Add, Neg};
use std::sync::atomic::{self, AtomicU32};
use std::sync::OnceLock;

use cgmath::Matrix3;
use tracing::debug;

use crate::consts::DBL_EPSILON;
use crate::r1::interval::Interval as R1Interval;
use crate::r3::vector::Vector;
use crate::s1::angle::Angle;
use crate::s1::chordangle::ChordAngle;
use crate::s1::interval::Interval as S1Interval;
use crate::s2::cap::Cap;
use crate::s2::cellid::CellID;
use crate::s2::config::{IndexPolicy, LoopOptions, Validation};
use crate::s2::crossing_edge_query::CrossingEdgeQuery;
use crate::s2::edge_crosser::EdgeCrosser;
use crate::s2::edge_crossings::{angle_contains_vertex, Crossing};
use crate::s2::edge_distance::{self, distance_from_segment, update_min_distance};
use crate::s2::encoding::{f64_at, put_f64, put_i32, put_u32, put_u8, Decoder};
use crate::s2::error::{LoopValidationError, S2Error, S2Result};
use crate::s2::point::{
    ordered_ccw, point_cross, regular_points, regular_points_for_frame, signed_area, true_centroid,
    turn_angle, Point, ORIGIN,
};
use crate::s2::rect::Rect;
use crate::s2::rect_bounder::{expand_for_subregions, RectBounder};
use crate::s2::region::Region;
use crate::s2::shape::{Chain, ChainPosition, Edge, ReferencePoint, Shape};
use crate::s2::shape_index::{find_crossing_pair, ShapeIndex};

// These two points are used for the special Empty and Full loops.
const EMPTY_LOOP_POINT: Point = Point(Vector::new(0., 0., 1.));
const FULL_LOOP_POINT: Point = Point(Vector::new(0., 0., -1.));

const NORTH_POLE: Point = EMPTY_LOOP_POINT;
const SOUTH_POLE: Point = FULL_LOOP_POINT;

/// Loops with fewer vertices than this search for a vertex exhaustively.
const MAX_EXHAUSTIVE_FIND_VERTEX: usize = 10;

const ENCODING_VERSION: u8 = 1;
const ENCODED_VERTEX_LEN: usize = 3 * 8;
const MAX_ENCODED_VERTICES: usize = 50_000_000;

/// Loop represents a simple spherical polygon. It consists of a sequence
/// of vertices where the first vertex is implicitly connected to the
/// last. All loops are defined to have a CCW orientation, i.e. the interior of
/// the loop is on the left side of the edges. This implies that a clockwise
/// loop enclosing a small area is interpreted to be a CCW loop enclosing a
/// very large area.
///
/// Loops are not allowed to have any duplicate vertices (whether adjacent or
/// not). Non-adjacent edges are not allowed to intersect, and furthermore edges
/// of length 180 degrees are not allowed (i.e., adjacent vertices cannot be
/// antipodal). Loops must have at least 3 vertices (except for the "empty" and
/// "full" loops discussed below).
///
/// There are two special loops: the "empty" loop contains no points and the
/// "full" loop contains all points. These loops do not have any edges, but to
/// preserve the invariant that every loop can be represented as a vertex
/// chain, they are defined as having exactly one vertex each (see empty and
/// full).
///
/// A loop may build a private edge index to speed up its queries. The index
/// is built at most once and never changes afterwards, so a loop can be
/// queried from several threads at the same time; anything that changes the
/// loop takes `&mut self` and discards the index.
pub struct Loop {
    /// The vertices of the loop. These should be ordered counterclockwise
    /// around the loop interior.
    vertices: Vec<Point>,

    /// Whether the loop contains ORIGIN, the start of every brute force
    /// crossing walk.
    origin_inside: bool,

    /// Nesting depth of this loop inside a polygon. Odd depths are holes.
    depth: i32,

    /// A conservative bound on all points contained by this loop.
    /// If l.contains_point(p), then l.bound.contains_point(p).
    bound: Rect,

    /// Since bound is not exact, it is possible that a loop A contains
    /// another loop B whose bounds are slightly larger. subregion_bound
    /// has been expanded sufficiently to account for this error, i.e.
    /// if A.contains(B), then A.subregion_bound.contains(B.bound).
    subregion_bound: Rect,

    options: LoopOptions,

    index: OnceLock<ShapeIndex>,

    /// Point containment queries answered without the index so far.
    unindexed_calls: AtomicU32,
}

impl Clone for Loop {
    fn clone(&self) -> Self {
        Loop {
            vertices: self.vertices.clone(),
            origin_inside: self.origin_inside,
            depth: self.depth,
            bound: self.bound,
            subregion_bound: self.subregion_bound,
            options: self.options,
            index: self.index.clone(),
            unindexed_calls: AtomicU32::new(self.unindexed_calls.load(atomic::Ordering::Relaxed)),
        }
    }
}

impl fmt::Debug for Loop {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Loop")
            .field("vertices", &self.vertices)
            .field("origin_inside", &self.origin_inside)
            .field("depth", &self.depth)
            .field("bound", &self.bound)
            .finish_non_exhaustive()
    }
}

/// BoundaryCondition is the result of comparing the boundary of one loop
/// with another loop.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum BoundaryCondition {
    /// This loop contains the boundary of the other loop.
    ContainsOther,
    /// The two boundaries cross.
    CrossesOther,
    /// This loop excludes the boundary of the other loop.
    ExcludesOther,
}

impl Neg for BoundaryCondition {
    type Output = Self;
    fn neg(self) -> Self {
        match self {
            BoundaryCondition::ContainsOther => BoundaryCondition::ExcludesOther,
            BoundaryCondition::CrossesOther => BoundaryCondition::CrossesOther,
            BoundaryCondition::ExcludesOther => BoundaryCondition::ContainsOther,
        }
    }
}

impl Loop {
    /// Constructs a loop from the given vertices with the default options.
    /// The vertices are validated and the first problem found is returned as
    /// an error.
    pub fn new(vertices: Vec<Point>) -> S2Result<Loop> {
        Loop::with_options(vertices, &LoopOptions::default())
    }

    /// Constructs a loop from the given vertices. Validation follows
    /// options.validation; the other options only affect performance.
    pub fn with_options(vertices: Vec<Point>, options: &LoopOptions) -> S2Result<Loop> {
        options.validate()?;
        if vertices.is_empty() && options.validation == Validation::Enabled {
            return Err(LoopValidationError::NotEnoughVertices { count: 0 }.into());
        }
        let l = Loop::assemble(vertices, *options);
        l.check()?;
        l.init_index();
        Ok(l)
    }

    /// Constructs a loop from the given vertices without validating them.
    /// An empty vertex list gives the empty loop.
    pub fn from_points(vertices: Vec<Point>) -> Loop {
        let options = LoopOptions::default().with_validation(Validation::Disabled);
        let l = Loop::assemble(vertices, options);
        l.init_index();
        l
    }

    /// Returns a special "empty" loop.
    pub fn empty() -> Loop {
        Loop::from_points(vec![EMPTY_LOOP_POINT])
    }

    /// Returns a special "full" loop.
    pub fn full() -> Loop {
        Loop::from_points(vec![FULL_LOOP_POINT])
    }

    /// Constructs a loop corresponding to the given cell.
    ///
    /// Note that the loop and cell *do not* contain exactly the same set of
    /// points, because Loop and Cell have slightly different definitions of
    /// point containment. For example, a Cell vertex is contained by all
    /// four neighboring Cells, but it is contained by exactly one of four
    /// Loops constructed from those cells.
    pub fn from_cell_id(id: CellID) -> Loop {
        Loop::from_points(id.vertices().to_vec())
    }

    /// Constructs a loop with the given number of vertices, all located on a
    /// circle of the specified radius around the given center.
    pub fn regular_loop(center: &Point, radius: Angle, num_vertices: usize) -> Loop {
        Loop::from_points(regular_points(center, radius, num_vertices))
    }

    /// Like regular_loop, but the circle is centered on the z-axis of the
    /// given frame.
    pub fn regular_loop_for_frame(frame: &Matrix3<f64>, radius: Angle, num_vertices: usize) -> Loop {
        Loop::from_points(regular_points_for_frame(frame, radius, num_vertices))
    }

    /// Replaces the vertices of this loop, keeping its options and depth.
    /// On error the loop is left unchanged.
    pub fn init(&mut self, vertices: Vec<Point>) -> S2Result<()> {
        let mut l = Loop::with_options(vertices, &self.options)?;
        l.depth = self.depth;
        *self = l;
        Ok(())
    }

    fn assemble(vertices: Vec<Point>, options: LoopOptions) -> Loop {
        let vertices = if vertices.is_empty() {
            vec![EMPTY_LOOP_POINT]
        } else {
            vertices
        };
        let mut l = Loop {
            vertices,
            origin_inside: false,
            depth: 0,
            bound: Rect::empty(),
            subregion_bound: Rect::empty(),
            options,
            index: OnceLock::new(),
            unindexed_calls: AtomicU32::new(0),
        };
        l.init_origin_and_bound();
        l
    }

    fn check(&self) -> S2Result<()> {
        if self.options.validation == Validation::Disabled {
            return Ok(());
        }
        match self.find_validation_error() {
            Some(err) => {
                debug!(num_vertices = self.vertices.len(), error = %err, "rejecting invalid loop");
                Err(err.into())
            }
            None => Ok(()),
        }
    }

    fn init_index(&self) {
        if self.options.index_policy == IndexPolicy::Eager {
            self.built_index();
        }
    }

    fn init_origin_and_bound(&mut self) {
        if self.has_non_unit_vertex() {
            // Nothing is inside such a loop; validation rejects it.
            self.origin_inside = false;
            self.init_bound();
            return;
        }
        if self.vertices.len() < 3 {
            // Only the empty and full loops have meaning here, and their
            // origin depends on which hemisphere the vertex is in.
            self.origin_inside = self.is_empty_or_full() && self.vertices[0].0.z < 0.;
        } else {
            // Guess that the origin is outside, and check the guess against
            // the containment of vertex 1, which the local edge order
            // decides. The loop is not necessarily valid, so the
            // preconditions of angle_contains_vertex are checked first.
            let v1_inside = self.vertex(0) != self.vertex(1)
                && self.vertex(2) != self.vertex(1)
                && angle_contains_vertex(&self.vertex(0), &self.vertex(1), &self.vertex(2));

            self.origin_inside = false;
            if v1_inside != self.brute_force_contains_point(&self.vertex(1)) {
                self.origin_inside = true;
            }
        }
        self.init_bound();
    }

    fn has_non_unit_vertex(&self) -> bool {
        self.vertices.iter().any(|v| !v.is_unit())
    }

    /// Sets up the approximate bounding Rects for this loop.
    fn init_bound(&mut self) {
        if self.is_empty_or_full() {
            self.bound = if self.is_empty() {
                Rect::empty()
            } else {
                Rect::full()
            };
            self.subregion_bound = self.bound;
            return;
        }
        if self.has_non_unit_vertex() {
            self.bound = Rect::full();
            self.subregion_bound = self.bound;
            return;
        }

        // The bounding rectangle of a loop is not necessarily the same as the
        // bounding rectangle of its vertices. First, the maximal latitude may be
        // attained along the interior of an edge. Second, the loop may wrap
        // entirely around the sphere (e.g. a loop that defines two revolutions of a
        // candy-cane stripe). Third, the loop may include one or both poles.
        // Note that a small clockwise loop near the equator contains both poles.
        let mut bounder = RectBounder::new();
        for i in 0..=self.vertices.len() {
            // add vertex 0 twice
            bounder.add_point(&self.vertex(i));
        }
        let mut b = bounder.bound();

        if self.brute_force_contains_point(&NORTH_POLE) {
            b = Rect::new(R1Interval::new(b.lat.lo, PI / 2.), S1Interval::full());
        }
        // If a loop contains the south pole, then either it wraps entirely
        // around the sphere (full longitude range), or it also contains the
        // north pole in which case b.lng.is_full() due to the test above.
        if b.lng.is_full() && self.brute_force_contains_point(&SOUTH_POLE) {
            b.lat.lo = -PI / 2.;
        }
        self.bound = b;
        self.subregion_bound = expand_for_subregions(&self.bound);
    }

    /// Returns the edge index, building it on first use, or None when this
    /// loop answers every query by brute force.
    fn built_index(&self) -> Option<&ShapeIndex> {
        if self.options.index_policy == IndexPolicy::Never
            || self.vertices.len() <= self.options.max_brute_force_vertices
        {
            return None;
        }
        Some(self.index.get_or_init(|| {
            let index = ShapeIndex::build(&[self as &dyn Shape]);
            debug!(
                num_vertices = self.vertices.len(),
                num_cells = index.num_cells(),
                "built loop index"
            );
            index
        }))
    }

    // Point queries only build the index once enough of them have been
    // answered by brute force.
    fn point_query_index(&self) -> Option<&ShapeIndex> {
        if let Some(index) = self.index.get() {
            return Some(index);
        }
        match self.options.index_policy {
            IndexPolicy::Never => None,
            IndexPolicy::Eager => self.built_index(),
            IndexPolicy::Lazy { max_unindexed_calls } => {
                if self.vertices.len() <= self.options.max_brute_force_vertices {
                    return None;
                }
                let calls = self.unindexed_calls.fetch_add(1, atomic::Ordering::Relaxed) + 1;
                if calls >= max_unindexed_calls {
                    self.built_index()
                } else {
                    None
                }
            }
        }
    }

    /// Returns true if this loop passes every validity check, see
    /// find_validation_error.
    pub fn is_valid(&self) -> bool {
        self.find_validation_error().is_none()
    }

    /// Returns the first validity problem of this loop, if any. The checks
    /// run in this order: unit length vertices, vertex count, degenerate and
    /// antipodal edges, and finally edges that cross or touch.
    pub fn find_validation_error(&self) -> Option<LoopValidationError> {
        if let Some(index) = self.vertices.iter().position(|v| !v.is_unit()) {
            return Some(LoopValidationError::NotUnitLength { index });
        }

        let n = self.vertices.len();
        if n < 3 {
            if self.is_empty_or_full() {
                return None;
            }
            return Some(LoopValidationError::NotEnoughVertices { count: n });
        }

        for i in 0..n {
            if self.vertex(i) == self.vertex(i + 1) {
                return Some(LoopValidationError::DuplicateVertex { index: i });
            }
            if self.vertex(i) == -self.vertex(i + 1) {
                return Some(LoopValidationError::AntipodalVertices {
                    first: i,
                    second: (i + 1) % n,
                });
            }
        }

        match self.built_index() {
            Some(index) => index.find_self_intersection(0, self),
            None => {
                let edges: Vec<usize> = (0..n).collect();
                find_crossing_pair(self, n, &edges)
            }
        }
    }

    /// Reports whether this loop is considered empty.
    pub fn is_empty(&self) -> bool {
        self.is_empty_or_full() && !self.contains_origin()
    }

    /// Reports whether this loop is considered full.
    pub fn is_full(&self) -> bool {
        self.is_empty_or_full() && self.contains_origin()
    }

    /// Reports whether this loop is either the "empty" or "full" special loops.
    pub fn is_empty_or_full(&self) -> bool {
        self.vertices.len() == 1
    }

    pub fn num_vertices(&self) -> usize {
        self.vertices.len()
    }

    /// Returns the vertex at the given index. For convenience, the vertex indices
    /// wrap automatically for methods that do index math such as edge,
    /// i.e., vertex(num_edges() + n) is the same as vertex(n).
    pub fn vertex(&self, i: usize) -> Point {
        self.vertices[i % self.vertices.len()]
    }

    pub fn vertices(&self) -> &[Point] {
        &self.vertices
    }

    /// Returns the vertex in reverse order if the loop represents a polygon
    /// hole. For example, arguments 0, 1, 2 are mapped to vertices n-1, n-2,
    /// n-3, where n == num_vertices(). This ensures that the interior of the
    /// polygon is always to the left of the vertex chain.
    ///
    /// This requires: 0 <= i < 2 * num_vertices()
    pub fn oriented_vertex(&self, i: usize) -> Point {
        let n = self.vertices.len();
        let mut j = i % n;
        if self.is_hole() {
            j = n - 1 - j;
        }
        self.vertex(j)
    }

    pub fn options(&self) -> &LoopOptions {
        &self.options
    }

    pub fn depth(&self) -> i32 {
        self.depth
    }

    /// Sets the nesting depth of this loop within a polygon.
    pub fn set_depth(&mut self, depth: i32) {
        self.depth = depth;
    }

    /// Returns whether this loop represents a hole in its containing polygon.
    pub fn is_hole(&self) -> bool {
        (self.depth & 1) != 0
    }

    /// Returns -1 if this Loop represents a hole in its containing polygon, and +1 otherwise.
    pub fn sign(&self) -> i32 {
        if self.is_hole() {
            -1
        } else {
            1
        }
    }

    /// Returns whether the loop contains ORIGIN.
    pub fn contains_origin(&self) -> bool {
        self.origin_inside
    }

    /// Returns a tight bounding rectangle. If the loop contains the point,
    /// the bound also contains it.
    pub fn rect_bound(&self) -> Rect {
        self.bound
    }

    /// Returns a bounding cap that may have more padding than the corresponding
    /// rect_bound. The bound is conservative such that if the loop contains a
    /// point P, the bound also contains it.
    pub fn cap_bound(&self) -> Cap {
        self.bound.cap_bound()
    }

    /// Returns the bound expanded so that it contains the bound of every
    /// loop this loop contains.
    pub fn subregion_bound(&self) -> Rect {
        self.subregion_bound
    }

    /// Returns true if the loop contains the point.
    pub fn contains_point(&self, p: &Point) -> bool {
        if !self.bound.contains_point(p) {
            return false;
        }
        match self.point_query_index() {
            Some(index) => index.shape_contains(0, self, p),
            None => self.brute_force_contains_point(p),
        }
    }

    // Counts the crossings of the edge from ORIGIN to p with every edge.
    fn brute_force_contains_point(&self, p: &Point) -> bool {
        let mut inside = self.origin_inside;
        let mut crosser = EdgeCrosser::new_chain(&ORIGIN, p, &self.vertex(0));
        for i in 1..=self.vertices.len() {
            // add vertex 0 twice
            inside ^= crosser.edge_or_vertex_chain_crossing(&self.vertex(i));
        }
        inside
    }

    // Returns the edges of this loop that may touch the edge AB.
    fn candidate_edges(&self, a: &Point, b: &Point) -> Vec<usize> {
        match self.built_index() {
            Some(index) => CrossingEdgeQuery::new(index, 0, self).candidates(a, b),
            None => (0..self.num_edges()).collect(),
        }
    }

    /// Reports whether the region contained by this loop is a superset of the
    /// region contained by the given other loop.
    pub fn contains(&self, b: &Loop) -> bool {
        // For a loop A to contain the loop B, all of the following must
        // be true:
        //
        //  (1) There are no edge crossings between A and B except at vertices.
        //
        //  (2) At every vertex that is shared between A and B, the local edge
        //      ordering implies that A contains B.
        //
        //  (3) If there are no shared vertices, then A must contain a vertex of B
        //      and B must not contain a vertex of A. (An arbitrary vertex may be
        //      chosen in each case.)
        //
        // The second part of (3) is necessary to detect the case of two loops whose
        // union is the entire sphere, i.e. two loops that contains each other's
        // boundaries but not each other's interiors.
        if !self.subregion_bound.contains(&b.bound) {
            return false;
        }

        // Special cases to handle either loop being empty or full.
        if self.is_empty_or_full() || b.is_empty_or_full() {
            return self.is_full() || b.is_empty();
        }

        // Check whether there are any edge crossings, and also check the loop
        // relationship at any shared vertices.
        let mut relation = ContainsRelation::default();
        if has_crossing_relation(self, b, &mut relation) {
            return false;
        }

        // There are no crossings, and if there are any shared vertices then A
        // contains B locally at each shared vertex.
        if relation.found_shared_vertex {
            return true;
        }

        // Since there are no edge intersections or shared vertices, we just need to
        // test condition (3) above. We can skip this test if we discovered that A
        // contains at least one point of B while checking for edge crossings.
        if !self.contains_point(&b.vertex(0)) {
            return false;
        }

        // We still need to check whether (A union B) is the entire sphere.
        // Normally this check is very cheap due to the bounding box precondition.
        if (b.subregion_bound.contains(&self.bound) || b.bound.union(&self.bound).is_full())
            && b.contains_point(&self.vertex(0))
        {
            return false;
        }
        true
    }

    /// Reports whether the region contained by this loop intersects the region
    /// contained by the other loop.
    pub fn intersects(&self, b: &Loop) -> bool {
        // Given two loops, A and B, A.intersects(B) if and only if !A.complement().contains(B).
        //
        // This code is similar to contains, but is optimized for the case
        // where both loops enclose less than half of the sphere.
        if !self.bound.intersects(&b.bound) {
            return false;
        }

        // Check whether there are any edge crossings, and also check the loop
        // relationship at any shared vertices.
        let mut relation = IntersectsRelation::default();
        if has_crossing_relation(self, b, &mut relation) {
            return true;
        }
        if relation.found_shared_vertex {
            return false;
        }

        // Since there are no edge intersections or shared vertices, the loops
        // intersect only if A contains B, B contains A, or the two loops contain
        // each other's boundaries. These checks are usually cheap because of the
        // bounding box preconditions. Note that neither loop is empty (because of
        // the bounding box check above), so it is safe to access vertex(0).

        // Check whether A contains B, or A and B contain each other's boundaries.
        // (Note that A contains all the vertices of B in either case.)
        if (self.subregion_bound.contains(&b.bound) || self.bound.union(&b.bound).is_full())
            && self.contains_point(&b.vertex(0))
        {
            return true;
        }

        // Check whether B contains A.
        b.subregion_bound.contains(&self.bound) && b.contains_point(&self.vertex(0))
    }

    /// Reports whether this loop contains the given loop, given that the two
    /// boundaries do not cross or share edges (they may share vertices).
    /// This is cheaper than contains because it does not look for edge
    /// crossings.
    pub fn contains_nested(&self, b: &Loop) -> bool {
        if !self.subregion_bound.contains(&b.bound) {
            return false;
        }

        // Special cases to handle either loop being empty or full. Also bail
        // out when B has fewer than two vertices so that vertex(1) is
        // meaningful below.
        if self.is_empty_or_full() || b.num_vertices() < 2 {
            return self.is_full() || b.is_empty();
        }

        // We are given that A and B do not share any edges, and that either one
        // loop contains the other or they do not intersect.
        match self.find_vertex(&b.vertex(1)) {
            // Since b.vertex(1) is not shared, we can check whether A contains it.
            None => self.contains_point(&b.vertex(1)),
            // Check whether the edge order around b.vertex(1) is compatible
            // with A containing B.
            Some(m) => wedge_contains(
                &self.vertex(m - 1),
                &self.vertex(m),
                &self.vertex(m + 1),
                &b.vertex(0),
                &b.vertex(2),
            ),
        }
    }

    /// Reports whether this loop contains the boundary of the other loop,
    /// given that the two boundaries do not cross (see compare_boundary). If
    /// reverse_other is true, the boundary of the other loop is reversed
    /// first, which only affects the result when there are shared edges.
    ///
    /// Neither loop may be empty, and if the other loop is full then
    /// reverse_other must be false.
    pub fn contains_non_crossing_boundary(&self, b: &Loop, reverse_other: bool) -> bool {
        debug_assert!(!self.is_empty() && !b.is_empty());
        debug_assert!(!b.is_full() || !reverse_other);

        // The bounds must intersect for containment.
        if !self.bound.intersects(&b.bound) {
            return false;
        }

        // Full loops are handled as though the loop surrounded the entire sphere.
        if self.is_full() {
            return true;
        }
        if b.is_full() {
            return false;
        }

        match self.find_vertex(&b.vertex(0)) {
            // Since vertex b0 is not shared, we can check whether A contains it.
            None => self.contains_point(&b.vertex(0)),
            // Otherwise check whether the edge (b0, b1) is contained by A.
            Some(m) => wedge_contains_semiwedge(
                &self.vertex(m - 1),
                &self.vertex(m),
                &self.vertex(m + 1),
                &b.vertex(1),
                reverse_other,
            ),
        }
    }

    /// Compares the boundary of this loop with the other loop, which must
    /// not be empty and must not be a full hole. Shared edges count as
    /// contained when their direction in the other loop, reversed if that
    /// loop is a hole, matches their direction in this loop.
    pub fn compare_boundary(&self, b: &Loop) -> BoundaryCondition {
        debug_assert!(!self.is_empty() && !b.is_empty());
        debug_assert!(!b.is_full() || !b.is_hole());

        // The bounds must intersect for containment or crossing.
        if !self.bound.intersects(&b.bound) {
            return BoundaryCondition::ExcludesOther;
        }

        // Full loops are handled as though the loop surrounded the entire sphere.
        if self.is_full() {
            return BoundaryCondition::ContainsOther;
        }
        if b.is_full() {
            return BoundaryCondition::ExcludesOther;
        }

        // Check whether there are any edge crossings, and also check the loop
        // relationship at any shared vertices.
        let mut relation = CompareBoundaryRelation::new(b.is_hole());
        if has_crossing_relation(self, b, &mut relation) {
            return BoundaryCondition::CrossesOther;
        }
        if relation.found_shared_vertex {
            return if relation.contains_edge {
                BoundaryCondition::ContainsOther
            } else {
                BoundaryCondition::ExcludesOther
            };
        }

        // There are no edge intersections or shared vertices, so we can check
        // whether A contains an arbitrary vertex of B.
        if self.contains_point(&b.vertex(0)) {
            BoundaryCondition::ContainsOther
        } else {
            BoundaryCondition::ExcludesOther
        }
    }

    /// Reports whether two loops have the same vertices in the same linear
    /// order (i.e., cyclic rotations are not allowed).
    pub fn equal(&self, other: &Loop) -> bool {
        self.vertices == other.vertices
    }

    /// Reports whether the two loops have the same boundary. This is true if
    /// and only if the loops have the same vertices in the same cyclic order
    /// (i.e., the vertices may be cyclically rotated). The empty and full
    /// loops are considered to have different boundaries.
    pub fn boundary_equal(&self, o: &Loop) -> bool {
        if self.vertices.len() != o.vertices.len() {
            return false;
        }

        // Special case to handle empty or full loops. Since they have the same
        // number of vertices, if one loop is empty/full then so is the other.
        if self.is_empty_or_full() {
            return self.is_empty() == o.is_empty();
        }

        let n = self.vertices.len();
        // There is at most one starting offset since loop vertices are unique.
        (0..n)
            .find(|&offset| self.vertex(offset) == o.vertex(0))
            .map_or(false, |offset| (0..n).all(|i| self.vertex(i + offset) == o.vertex(i)))
    }

    /// Reports whether the two loops have the same boundary except for
    /// vertex perturbations. The vertices must be in the same cyclic order,
    /// and corresponding vertex pairs must be separated by no more than
    /// max_error.
    pub fn boundary_approx_equal(&self, o: &Loop, max_error: Angle) -> bool {
        if self.vertices.len() != o.vertices.len() {
            return false;
        }

        if self.is_empty_or_full() {
            return self.is_empty() == o.is_empty();
        }

        let n = self.vertices.len();
        // Vertices only match approximately, so several starting offsets may
        // have to be tried.
        (0..n).any(|offset| {
            self.vertex(offset).approx_eq_by(&o.vertex(0), max_error)
                && (0..n).all(|i| self.vertex(i + offset).approx_eq_by(&o.vertex(i), max_error))
        })
    }

    /// Reports whether the two loop boundaries are within max_error of each
    /// other along their entire lengths. The loops may have different numbers
    /// of vertices. More precisely, this is true if the two loops have
    /// parameterizations a:[0,1] -> S^2, b:[0,1] -> S^2 such that
    /// distance(a(t), b(t)) <= max_error for all t. You can think of this as
    /// testing whether it is possible to drive two cars all the way around the
    /// two loops such that no car ever goes backward and the cars are always
    /// within max_error of each other.
    pub fn boundary_near(&self, o: &Loop, max_error: Angle) -> bool {
        if self.is_empty_or_full() || o.is_empty_or_full() {
            return (self.is_empty() && o.is_empty()) || (self.is_full() && o.is_full());
        }

        (0..self.vertices.len()).any(|a_offset| match_boundaries(self, o, a_offset, max_error))
    }

    /// Returns the index of a vertex of this loop equal to p, in the range
    /// [1, num_vertices], or None if there is no such vertex. The range
    /// starts at 1 so that vertex(m - 1) is always valid.
    pub fn find_vertex(&self, p: &Point) -> Option<usize> {
        let n = self.vertices.len();
        let index = if n < MAX_EXHAUSTIVE_FIND_VERTEX {
            None
        } else {
            self.built_index()
        };
        let Some(index) = index else {
            return (1..=n).find(|&i| self.vertex(i) == *p);
        };

        let (_, cell) = index.locate_point(p)?;
        let clipped = cell.find_by_shape_id(0)?;
        for &ai in clipped.edges().iter().rev() {
            if self.vertex(ai) == *p {
                return Some(if ai == 0 { n } else { ai });
            }
            if self.vertex(ai + 1) == *p {
                return Some(ai + 1);
            }
        }
        None
    }

    /// Returns a first index and a direction (either +1 or -1) such that the
    /// vertex sequence (first, first+dir, ..., first+(n-1)*dir) does not
    /// change when the loop vertex order is rotated or inverted. This allows
    /// the loop vertices to be traversed in a canonical order.
    fn canonical_first_vertex(&self) -> (usize, isize) {
        let n = self.vertices.len();
        let mut first = 0;
        for i in 1..n {
            if self.vertex(i).cmp(&self.vertex(first)) == Ordering::Less {
                first = i;
            }
        }
        if self.vertex(first + 1).cmp(&self.vertex(first + n - 1)) == Ordering::Less {
            (first, 1)
        } else {
            (first + n, -1)
        }
    }

    /// Returns the sum of the turning angles at each vertex. The return value is
    /// positive if the loop is counter-clockwise, negative if the loop is
    /// clockwise, and zero if the loop is a great circle. Degenerate and
    /// nearly-degenerate loops are handled consistently with sign. So for
    /// example, if a loop has zero area (i.e., it is a very small CCW loop)
    /// then the turning angle will always be negative.
    ///
    /// The value is identical when the vertex order is rotated, and exactly
    /// negated when the order is reversed.
    ///
    /// This quantity is also called the "geodesic curvature" of the loop.
    pub fn turning_angle(&self) -> f64 {
        // For empty and full loops, we return the limit value as the loop area
        // approaches 0 or 4*Pi respectively.
        if self.is_empty_or_full() {
            return if self.contains_origin() { -2. * PI } else { 2. * PI };
        }

        // Don't crash even if the loop is not well-defined.
        let n = self.vertices.len();
        if n < 3 {
            return 0.;
        }

        let v = |i: isize| self.vertex(i.rem_euclid(n as isize) as usize);
        let (first, dir) = self.canonical_first_vertex();
        let mut i = first as isize;
        let mut sum = turn_angle(&v(i - dir), &v(i), &v(i + dir)).rad();

        // Kahan summation.
        let mut compensation = 0.;
        for _ in 1..n {
            i += dir;
            let angle = turn_angle(&v(i - dir), &v(i), &v(i + dir)).rad();
            let old_sum = sum;
            let corrected = angle + compensation;
            sum += corrected;
            compensation = (old_sum - sum) + corrected;
        }

        const MAX_CURVATURE: f64 = 2. * PI - 4. * DBL_EPSILON;
        (dir as f64 * (sum + compensation)).clamp(-MAX_CURVATURE, MAX_CURVATURE)
    }

    /// Returns the maximum error in turning_angle. The value is not constant;
    /// it depends on the loop.
    pub fn turning_angle_max_error(&self) -> f64 {
        // The maximum error can be bounded as follows:
        //   3.00 * DBL_EPSILON    for point_cross(b, a)
        //   3.00 * DBL_EPSILON    for point_cross(c, b)
        //   3.25 * DBL_EPSILON    for angle()
        //   2.00 * DBL_EPSILON    for each addition in the Kahan summation
        //   ------------------
        //  11.25 * DBL_EPSILON
        const MAX_ERROR_PER_VERTEX: f64 = 11.25 * DBL_EPSILON;
        MAX_ERROR_PER_VERTEX * self.vertices.len() as f64
    }

    /// Reports whether the loop area is at most 2*pi. Degenerate loops are
    /// handled consistently with turning_angle: a loop that can be expressed
    /// as a union of degenerate or nearly-degenerate CCW triangles is always
    /// considered normalized.
    pub fn is_normalized(&self) -> bool {
        // Optimization: if the longitude span is less than 180 degrees, then the
        // loop covers less than half the sphere and is therefore normalized.
        if self.bound.lng.len() < PI {
            return true;
        }

        // We allow some error so that hemispheres are always considered normalized.
        self.turning_angle() >= -self.turning_angle_max_error()
    }

    /// Inverts the loop if necessary so that the area enclosed by the loop
    /// is at most 2*pi.
    pub fn normalize(&mut self) {
        if !self.is_normalized() {
            self.invert();
        }
    }

    /// Reverses the order of the loop vertices, effectively complementing the
    /// region represented by the loop. For example, the loop ABCD (with edges
    /// AB, BC, CD, DA) becomes the loop DCBA (with edges DC, CB, BA, AD).
    pub fn invert(&mut self) {
        self.index = OnceLock::new();
        self.unindexed_calls = AtomicU32::new(0);
        if self.is_empty_or_full() {
            self.vertices[0] = if self.is_full() {
                EMPTY_LOOP_POINT
            } else {
                FULL_LOOP_POINT
            };
        } else {
            self.vertices.reverse();
        }

        // origin_inside must be set correctly before rebuilding the index.
        self.origin_inside = !self.origin_inside;
        if self.bound.lat.lo > -PI / 2. && self.bound.lat.hi < PI / 2. {
            // The complement of this loop contains both poles.
            self.bound = Rect::full();
            self.subregion_bound = self.bound;
        } else {
            self.init_bound();
        }
        self.init_index();
    }

    /// Returns the area of the loop interior, i.e. the region on the left side of
    /// the loop. The return value is between 0 and 4*pi. This value is not affected
    /// by whether this loop is a "hole" or a "shell".
    pub fn area(&self) -> f64 {
        // It is surprisingly difficult to compute the area of a loop robustly. The
        // main issues are (1) whether degenerate loops are considered to be CCW or
        // not (i.e., whether their area is close to 0 or 4*pi), and (2) computing
        // the areas of small loops with good relative accuracy.
        if self.is_empty_or_full() {
            return if self.contains_origin() { 4. * PI } else { 0. };
        }

        let mut area = self.surface_integral(signed_area);

        // The signed area should be between approximately -4*pi and 4*pi.
        if area < 0. {
            // We have computed the negative of the area of the loop exterior.
            area += 4. * PI;
        }
        area = area.clamp(0., 4. * PI);

        // If the area is close enough to zero or 4*pi so that the loop
        // orientation is ambiguous, the turning angle decides.
        let max_error = self.turning_angle_max_error();
        if area < max_error && !self.is_normalized() {
            return 4. * PI;
        } else if area > 4. * PI - max_error && self.is_normalized() {
            return 0.;
        }
        area
    }

    /// Returns the true centroid of the loop multiplied by the area of the loop.
    /// The result is not unit length. The centroid may not be contained by the loop.
    ///
    /// We prescale by the loop area for two reasons: (1) it is cheaper to compute
    /// this way, and (2) it makes it easier to compute the centroid of more
    /// complicated shapes (by splitting them into disjoint regions and adding
    /// their centroids).
    pub fn centroid(&self) -> Point {
        Point(self.surface_integral(|a, b, c| true_centroid(a, b, c).0))
    }

    /// Computes the oriented surface integral of some quantity f(x) over the
    /// loop interior, given a function f_tri(A,B,C) that returns the
    /// corresponding integral over the spherical triangle ABC. Here "oriented
    /// surface integral" means:
    ///
    /// (1) f_tri(A,B,C) must be the integral of f if ABC is counterclockwise,
    ///     and the integral of -f if ABC is clockwise.
    ///
    /// (2) The result is either the integral of f over the loop interior, or
    ///     the integral of (-f) over the loop exterior.
    ///
    /// The sum starts from T::default(), which must be the additive zero.
    pub fn surface_integral<T, F>(&self, f_tri: F) -> T
    where
        T: Add<Output = T> + Default,
        F: Fn(&Point, &Point, &Point) -> T,
    {
        // Edges longer than this are not numerically stable.
        const MAX_LENGTH: f64 = PI - 1e-5;

        let n = self.vertices.len();
        let mut sum = T::default();
        let mut origin = self.vertex(0);
        for i in 1..n.saturating_sub(1) {
            // Let V_i be vertex(i), let O be the current origin, and let length(A,B)
            // be the length of edge (A,B). At the start of each loop iteration, the
            // "leading edge" of the triangle fan is (O,V_i), and we want to extend
            // the triangle fan so that the leading edge is (O,V_i+1).
            if self.vertex(i + 1).0.angle(&origin.0).rad() > MAX_LENGTH {
                // We are about to create an unstable edge, so choose a new origin O'
                // for the triangle fan.
                let old_origin = origin;
                if origin == self.vertex(0) {
                    // The following point is well-separated from V_i and V_0 (and
                    // therefore V_i+1 as well).
                    origin = point_cross(&self.vertex(0), &self.vertex(i)).normalize();
                } else if self.vertex(i).0.angle(&self.vertex(0).0).rad() < MAX_LENGTH {
                    // All edges of the triangle (O, V_0, V_i) are stable, so we can
                    // revert to using V_0 as the origin.
                    origin = self.vertex(0);
                } else {
                    // (O, V_i+1) and (V_0, V_i) are antipodal pairs, and O and V_0 are
                    // perpendicular. Therefore V_0.cross(O) is approximately
                    // perpendicular to all of {O, V_0, V_i, V_i+1}, and we can choose
                    // this point O' as the new origin.
                    origin = self.vertex(0).cross(&old_origin);

                    // Advance the edge (V_0,O) to (V_0,O').
                    sum = sum + f_tri(&self.vertex(0), &old_origin, &origin);
                }
                // Advance the edge (O,V_i) to (O',V_i).
                sum = sum + f_tri(&old_origin, &self.vertex(i), &origin);
            }
            // Advance the edge (O,V_i) to (O,V_i+1).
            sum = sum + f_tri(&origin, &self.vertex(i), &self.vertex(i + 1));
        }

        // If the origin is not V_0, we need to sum one more triangle.
        if origin != self.vertex(0) {
            // Advance the edge (O,V_n-1) to (O,V_0).
            sum = sum + f_tri(&origin, &self.vertex(n - 1), &self.vertex(0));
        }
        sum
    }

    /// Returns the distance from the point to the loop interior: zero if the
    /// loop contains it, infinite if the loop is empty. The point should be
    /// unit length.
    pub fn distance(&self, x: &Point) -> Angle {
        if self.contains_point(x) {
            return Angle(0.);
        }
        self.distance_to_boundary(x)
    }

    /// Returns the distance from the point to the loop boundary, which is
    /// infinite for the empty and full loops since they have no boundary.
    pub fn distance_to_boundary(&self, x: &Point) -> Angle {
        match self.closest_edge(x) {
            Some((_, dist)) => dist.angle(),
            None => Angle::inf(),
        }
    }

    /// Returns the point itself if the loop contains it, and otherwise the
    /// closest point on the loop boundary. The empty loop returns the input.
    pub fn project(&self, x: &Point) -> Point {
        if self.contains_point(x) {
            return *x;
        }
        self.project_to_boundary(x)
    }

    /// Returns the closest point on the loop boundary. The empty and full
    /// loops return the input since they have no boundary.
    pub fn project_to_boundary(&self, x: &Point) -> Point {
        match self.closest_edge(x) {
            Some((e, _)) => {
                let edge = self.edge(e);
                edge_distance::project(x, &edge.v0, &edge.v1)
            }
            None => *x,
        }
    }

    fn closest_edge(&self, x: &Point) -> Option<(usize, ChordAngle)> {
        let mut min_dist = ChordAngle::infinity();
        let mut closest = None;
        for e in 0..self.num_edges() {
            let edge = self.edge(e);
            let (dist, updated) = update_min_distance(x, &edge.v0, &edge.v1, min_dist, false);
            if updated {
                min_dist = dist;
                closest = Some(e);
            }
        }
        closest.map(|e| (e, min_dist))
    }

    /// Appends the lossless encoding of the loop to buf: a version byte, the
    /// vertex count, the vertices, the origin flag, the depth and the bound,
    /// all little-endian.
    pub fn encode(&self, buf: &mut Vec<u8>) {
        buf.reserve(1 + 4 + self.vertices.len() * ENCODED_VERTEX_LEN + 1 + 4 + crate::s2::rect::ENCODED_LEN);
        put_u8(buf, ENCODING_VERSION);
        put_u32(buf, self.vertices.len() as u32);
        for v in &self.vertices {
            put_f64(buf, v.0.x);
            put_f64(buf, v.0.y);
            put_f64(buf, v.0.z);
        }
        put_u8(buf, self.origin_inside as u8);
        put_i32(buf, self.depth);
        self.bound.encode(buf);
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        self.encode(&mut buf);
        buf
    }

    /// Decodes a loop written by encode and validates it with the default
    /// options.
    pub fn decode(data: &[u8]) -> S2Result<Loop> {
        EncodedLoop::new(data)?.to_loop()
    }
}

/// EncodedLoop is a read-only view of an encoded loop that reads vertices
/// straight from the encoded bytes.
#[derive(Clone, Copy, Debug)]
pub struct EncodedLoop<'a> {
    vertex_data: &'a [u8],
    num_vertices: usize,
    origin_inside: bool,
    depth: i32,
    bound: Rect,
}

impl<'a> EncodedLoop<'a> {
    /// Parses the header, vertex block and bound of an encoded loop. The
    /// vertices themselves are not checked until the view becomes a Loop.
    pub fn new(data: &'a [u8]) -> S2Result<EncodedLoop<'a>> {
        let mut d = Decoder::new(data);
        let version = d.get_u8("loop version")?;
        if version != ENCODING_VERSION {
            debug!(version, "loop decode: unknown version");
            return Err(S2Error::Decode(format!("unknown loop encoding version {}", version)));
        }

        let num_vertices = d.get_u32("loop vertex count")? as usize;
        if num_vertices == 0 || num_vertices > MAX_ENCODED_VERTICES {
            debug!(num_vertices, "loop decode: bad vertex count");
            return Err(S2Error::Decode(format!(
                "loop vertex count {} out of range",
                num_vertices
            )));
        }
        let vertex_data = d.slice(num_vertices * ENCODED_VERTEX_LEN, "loop vertices")?;

        let origin_inside = match d.get_u8("loop origin flag")? {
            0 => false,
            1 => true,
            flag => {
                debug!(flag, "loop decode: bad origin flag");
                return Err(S2Error::Decode(format!("bad loop origin flag {}", flag)));
            }
        };
        let depth = d.get_i32("loop depth")?;
        let bound = Rect::decode_from(&mut d)?;

        Ok(EncodedLoop {
            vertex_data,
            num_vertices,
            origin_inside,
            depth,
            bound,
        })
    }

    pub fn num_vertices(&self) -> usize {
        self.num_vertices
    }

    /// Returns the vertex at the given index, wrapping like Loop::vertex.
    pub fn vertex(&self, i: usize) -> Point {
        let at = (i % self.num_vertices) * ENCODED_VERTEX_LEN;
        Point(Vector::new(
            f64_at(self.vertex_data, at),
            f64_at(self.vertex_data, at + 8),
            f64_at(self.vertex_data, at + 16),
        ))
    }

    pub fn depth(&self) -> i32 {
        self.depth
    }

    pub fn origin_inside(&self) -> bool {
        self.origin_inside
    }

    pub fn bound(&self) -> Rect {
        self.bound
    }

    /// Copies the view into an owned loop, validated with the default
    /// options.
    pub fn to_loop(&self) -> S2Result<Loop> {
        self.to_loop_with_options(&LoopOptions::default())
    }

    /// Copies the view into an owned loop. The origin flag and bound are
    /// taken from the encoding rather than recomputed.
    pub fn to_loop_with_options(&self, options: &LoopOptions) -> S2Result<Loop> {
        options.validate()?;
        let subregion_bound = if self.num_vertices == 1 {
            self.bound
        } else {
            expand_for_subregions(&self.bound)
        };
        let l = Loop {
            vertices: (0..self.num_vertices).map(|i| self.vertex(i)).collect(),
            origin_inside: self.origin_inside,
            depth: self.depth,
            bound: self.bound,
            subregion_bound,
            options: *options,
            index: OnceLock::new(),
            unindexed_calls: AtomicU32::new(0),
        };
        l.check()?;
        l.init_index();
        Ok(l)
    }
}

impl Shape for Loop {
    fn num_edges(&self) -> usize {
        if self.is_empty_or_full() {
            0
        } else {
            self.vertices.len()
        }
    }

    fn edge(&self, e: usize) -> Edge {
        Edge::new(self.vertex(e), self.vertex(e + 1))
    }

    fn reference_point(&self) -> ReferencePoint {
        ReferencePoint::new(ORIGIN, self.origin_inside)
    }

    fn num_chains(&self) -> usize {
        if self.is_empty() {
            0
        } else {
            1
        }
    }

    fn chain(&self, _chain_id: usize) -> Chain {
        Chain {
            start: 0,
            length: self.num_edges(),
        }
    }

    fn chain_edge(&self, _chain_id: usize, offset: usize) -> Edge {
        self.edge(offset)
    }

    fn chain_position(&self, e: usize) -> ChainPosition {
        ChainPosition {
            chain_id: 0,
            offset: e,
        }
    }

    fn dimension(&self) -> u8 {
        2
    }
}

impl Region for Loop {
    fn cap_bound(&self) -> Cap {
        Loop::cap_bound(self)
    }

    fn rect_bound(&self) -> Rect {
        self.bound
    }

    fn contains_point(&self, p: &Point) -> bool {
        Loop::contains_point(self, p)
    }
}

/// Reports whether the wedge (a0, ab1, a2) contains the wedge
/// (b0, ab1, b2). Both wedges are closed.
fn wedge_contains(a0: &Point, ab1: &Point, a2: &Point, b0: &Point, b2: &Point) -> bool {
    // For A to contain B (where each loop interior is defined to be its left
    // side), the CCW edge order around ab1 must be a2 b2 b0 a0. We split
    // this test into two parts that test three vertices each.
    ordered_ccw(a2, b2, b0, ab1) && ordered_ccw(b0, a0, a2, ab1)
}

/// Reports whether the wedges (a0, ab1, a2) and (b0, ab1, b2) intersect.
fn wedge_intersects(a0: &Point, ab1: &Point, a2: &Point, b0: &Point, b2: &Point) -> bool {
    // For A not to intersect B (where each loop interior is defined to be
    // its left side), the CCW edge order around ab1 must be a0 b2 b0 a2.
    !(ordered_ccw(a0, b2, b0, ab1) && ordered_ccw(b0, a2, a0, ab1))
}

/// Reports whether the wedge (a0, ab1, a2) contains the "semiwedge" defined
/// as any non-empty open set of rays immediately CCW from the edge (ab1, b2).
/// If reverse is true, then substitute clockwise for CCW; this simulates what
/// would happen if the direction of the other loop was reversed.
fn wedge_contains_semiwedge(a0: &Point, ab1: &Point, a2: &Point, b2: &Point, reverse: bool) -> bool {
    if b2 == a0 || b2 == a2 {
        // We have a shared or reversed edge.
        return (b2 == a0) == reverse;
    }
    ordered_ccw(a0, a2, b2, ab1)
}

/// LoopRelation decides a relation between two loops at the vertices they
/// share.
trait LoopRelation {
    /// Called for every vertex ab1 shared by both loops, with the wedges
    /// (a0, ab1, a2) and (b0, ab1, b2) formed there. Returns true if the
    /// wedges settle the relation the same way an edge crossing would.
    fn wedges_cross(&mut self, a0: &Point, ab1: &Point, a2: &Point, b0: &Point, b2: &Point) -> bool;
}

#[derive(Default)]
struct ContainsRelation {
    found_shared_vertex: bool,
}

impl LoopRelation for ContainsRelation {
    fn wedges_cross(&mut self, a0: &Point, ab1: &Point, a2: &Point, b0: &Point, b2: &Point) -> bool {
        self.found_shared_vertex = true;
        !wedge_contains(a0, ab1, a2, b0, b2)
    }
}

#[derive(Default)]
struct IntersectsRelation {
    found_shared_vertex: bool,
}

impl LoopRelation for IntersectsRelation {
    fn wedges_cross(&mut self, a0: &Point, ab1: &Point, a2: &Point, b0: &Point, b2: &Point) -> bool {
        self.found_shared_vertex = true;
        wedge_intersects(a0, ab1, a2, b0, b2)
    }
}

/// Tracks whether the shared edges of B are contained or excluded by A.
/// A relation holds once both kinds are seen.
struct CompareBoundaryRelation {
    reverse_b: bool,
    found_shared_vertex: bool,
    contains_edge: bool,
    excludes_edge: bool,
}

impl CompareBoundaryRelation {
    fn new(reverse_b: bool) -> Self {
        CompareBoundaryRelation {
            reverse_b,
            found_shared_vertex: false,
            contains_edge: false,
            excludes_edge: false,
        }
    }
}

impl LoopRelation for CompareBoundaryRelation {
    fn wedges_cross(&mut self, a0: &Point, ab1: &Point, a2: &Point, _b0: &Point, b2: &Point) -> bool {
        // Only the boundary of B matters, so it is enough to check whether A
        // contains the semiwedge (ab1, b2).
        self.found_shared_vertex = true;
        if wedge_contains_semiwedge(a0, ab1, a2, b2, self.reverse_b) {
            self.contains_edge = true;
        } else {
            self.excludes_edge = true;
        }
        self.contains_edge && self.excludes_edge
    }
}

/// Reports whether an edge of A crosses an edge of B, or whether the wedges
/// at some shared vertex satisfy the relation. Every shared vertex is seen
/// exactly once, as the common end of an edge pair (a_j, a_j+1) and
/// (b_k, b_k+1).
fn has_crossing_relation(a: &Loop, b: &Loop, relation: &mut dyn LoopRelation) -> bool {
    for j in 0..a.num_edges() {
        let a0 = a.vertex(j);
        let a1 = a.vertex(j + 1);
        let mut crosser = EdgeCrosser::new(&a0, &a1);
        for k in b.candidate_edges(&a0, &a1) {
            let b0 = b.vertex(k);
            let b1 = b.vertex(k + 1);
            match crosser.crossing_sign(&b0, &b1) {
                Crossing::Cross => return true,
                Crossing::Maybe if a1 == b1 => {
                    if relation.wedges_cross(&a0, &a1, &a.vertex(j + 2), &b0, &b.vertex(k + 2)) {
                        return true;
                    }
                }
                _ => {}
            }
        }
    }
    false
}

/// Walks both boundaries from vertex a_offset of A and vertex 0 of B, one
/// vertex at a time, searching for a way around in which every vertex stays
/// within max_error of the other boundary. The starting pair is checked
/// last, when the walk closes.
fn match_boundaries(a: &Loop, b: &Loop, a_offset: usize, max_error: Angle) -> bool {
    // A state (i, j) means the first i edges after a_offset of A have been
    // matched against the first j edges of B.
    let (a_n, b_n) = (a.num_vertices(), b.num_vertices());
    let mut pending = vec![(0usize, 0usize)];
    let mut done = HashSet::new();
    while let Some((i, j)) = pending.pop() {
        if !done.insert((i, j)) {
            continue;
        }
        if i == a_n && j == b_n {
            return true;
        }

        let io = i + a_offset;
        if i < a_n
            && !done.contains(&(i + 1, j))
            && distance_from_segment(&a.vertex(io + 1), &b.vertex(j), &b.vertex(j + 1)) <= max_error
        {
            pending.push((i + 1, j));
        }
        if j < b_n
            && !done.contains(&(i, j + 1))
            && distance_from_segment(&b.vertex(j + 1), &a.vertex(io), &a.vertex(io + 1)) <= max_error
        {
            pending.push((i, j + 1));
        }
        if i < a_n
            && j < b_n
            && !done.contains(&(i + 1, j + 1))
            && a.vertex(io + 1).distance(&b.vertex(j + 1)) <= max_error
        {
            pending.push((i + 1, j + 1));
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::s1::Deg;
    use crate::s2::latlng::LatLng;
    use crate::s2::metric::AVG_AREA_METRIC;
    use crate::s2::point::get_frame;
    use crate::s2::random;
    use crate::s2::shape::contains_brute_force;
    use approx::{assert_abs_diff_eq, assert_relative_eq};

    fn ll(lat: f64, lng: f64) -> Point {
        Point::from(LatLng::from_degrees(lat, lng))
    }

    // Builds an unvalidated loop from (lat, lng) pairs in degrees.
    fn lat_lng_loop(points: &[(f64, f64)]) -> Loop {
        Loop::from_points(points.iter().map(|&(lat, lng)| ll(lat, lng)).collect())
    }

    fn deg(d: f64) -> Angle {
        Angle::from(Deg(d))
    }

    // The northern hemisphere, defined using two pairs of antipodal points.
    fn north_hemi() -> Loop {
        lat_lng_loop(&[(0., -180.), (0., -90.), (0., 0.), (0., 90.)])
    }

    // The northern hemisphere, defined using three points 120 degrees apart.
    fn north_hemi3() -> Loop {
        lat_lng_loop(&[(0., -180.), (0., -60.), (0., 60.)])
    }

    fn south_hemi() -> Loop {
        lat_lng_loop(&[(0., 90.), (0., 0.), (0., -90.), (0., -180.)])
    }

    fn west_hemi() -> Loop {
        lat_lng_loop(&[(0., -180.), (-90., 0.), (0., 0.), (90., 0.)])
    }

    fn east_hemi() -> Loop {
        lat_lng_loop(&[(90., 0.), (0., 0.), (-90., 0.), (0., -180.)])
    }

    // A spiral stripe that slightly over-wraps the equator.
    fn candy_cane() -> Loop {
        lat_lng_loop(&[(-20., 150.), (-20., -70.), (0., 70.), (10., -150.), (10., 70.), (-10., -70.)])
    }

    // A small clockwise loop in the northern & eastern hemisperes.
    fn small_necw() -> Loop {
        lat_lng_loop(&[(35., 20.), (45., 20.), (40., 25.)])
    }

    // Loop around the north pole at 80 degrees.
    fn arctic80() -> Loop {
        lat_lng_loop(&[(80., -150.), (80., -30.), (80., 90.)])
    }

    // Loop around the south pole at 80 degrees.
    fn antarctic80() -> Loop {
        lat_lng_loop(&[(-80., 120.), (-80., 0.), (-80., -120.)])
    }

    fn square(half_side: f64) -> Loop {
        let h = half_side;
        lat_lng_loop(&[(-h, -h), (-h, h), (h, h), (h, -h)])
    }

    fn all_loops() -> Vec<Loop> {
        vec![
            north_hemi(),
            north_hemi3(),
            south_hemi(),
            west_hemi(),
            east_hemi(),
            candy_cane(),
            small_necw(),
            arctic80(),
            antarctic80(),
            square(10.),
        ]
    }

    #[test]
    fn test_triangle_example() {
        let l = Loop::new(vec![ll(-20., 150.), ll(-20., 151.), ll(-19., 150.)]).unwrap();
        assert!(l.is_valid());
        assert!(l.turning_angle() > 0.);
        assert!(l.is_normalized());
        for v in l.vertices() {
            assert!(l.rect_bound().contains_point(v));
        }
        assert!(l.area() > 0. && l.area() < 1e-3);
    }

    #[test]
    fn test_empty_and_full_loops() {
        let empty = Loop::empty();
        let full = Loop::full();
        assert!(empty.is_empty() && !empty.is_full() && empty.is_empty_or_full());
        assert!(full.is_full() && !full.is_empty() && full.is_empty_or_full());
        assert!(empty.is_valid() && full.is_valid());
        assert!(empty.rect_bound().is_empty());
        assert!(full.rect_bound().is_full());
        assert_eq!(empty.area(), 0.);
        assert_eq!(full.area(), 4. * PI);
        assert_eq!(empty.turning_angle(), 2. * PI);
        assert_eq!(full.turning_angle(), -2. * PI);

        for _ in 0..100 {
            let p = random::point();
            assert!(!empty.contains_point(&p));
            assert!(full.contains_point(&p));
            assert!(empty.distance(&p).is_inf());
            assert_eq!(full.distance(&p), Angle(0.));
            assert!(empty.distance_to_boundary(&p).is_inf());
            assert!(full.distance_to_boundary(&p).is_inf());
            assert_eq!(empty.project(&p), p);
            assert_eq!(full.project_to_boundary(&p), p);
        }

        assert_eq!(empty.num_edges(), 0);
        assert_eq!(empty.num_chains(), 0);
        assert_eq!(full.num_edges(), 0);
        assert_eq!(full.num_chains(), 1);
        assert_eq!(full.dimension(), 2);

        // An empty vertex list only gives the empty loop when unvalidated.
        assert!(Loop::from_points(Vec::new()).is_empty());
        assert!(Loop::new(Vec::new()).is_err());
    }

    #[test]
    fn test_rect_bound() {
        let b = north_hemi().rect_bound();
        assert!(b.lng.is_full());
        assert_abs_diff_eq!(b.lat.hi, PI / 2.);
        assert_abs_diff_eq!(b.lat.lo, 0., epsilon = 1e-14);

        let b = south_hemi().rect_bound();
        assert!(b.lng.is_full());
        assert_abs_diff_eq!(b.lat.lo, -PI / 2.);
        assert_abs_diff_eq!(b.lat.hi, 0., epsilon = 1e-14);

        let b = candy_cane().rect_bound();
        assert!(b.lng.is_full());
        assert!(b.lat.lo < deg(-20.).rad() + 1e-12);

        assert!(small_necw().rect_bound().is_full());

        let b = arctic80().rect_bound();
        assert!(b.lng.is_full());
        assert_abs_diff_eq!(b.lat.lo, deg(80.).rad(), epsilon = 1e-14);
        assert_abs_diff_eq!(b.lat.hi, PI / 2.);

        let b = antarctic80().rect_bound();
        assert!(b.lng.is_full());
        assert_abs_diff_eq!(b.lat.lo, -PI / 2.);
        assert_abs_diff_eq!(b.lat.hi, deg(-80.).rad(), epsilon = 1e-14);

        // The subregion bound always contains the bound.
        for l in all_loops() {
            assert!(l.subregion_bound().contains(&l.rect_bound()));
            assert!(l.cap_bound().contains_point(&l.vertex(0)));
        }
    }

    #[test]
    fn test_contains_point() {
        assert!(north_hemi().contains_point(&ll(45., 45.)));
        assert!(!north_hemi().contains_point(&ll(-45., 45.)));
        assert!(north_hemi().contains_point(&NORTH_POLE));
        assert!(south_hemi().contains_point(&SOUTH_POLE));
        assert!(west_hemi().contains_point(&ll(0., -90.)));
        assert!(east_hemi().contains_point(&ll(0., 90.)));
        assert!(arctic80().contains_point(&ll(85., 10.)));
        assert!(!arctic80().contains_point(&ll(75., 10.)));
        assert!(!small_necw().contains_point(&ll(40., 22.)));
        assert!(small_necw().contains_point(&ll(-40., 22.)));
        assert!(square(10.).contains_point(&ll(0., 0.)));
        assert!(!square(10.).contains_point(&ll(15., 0.)));

        // Containment agrees with the generic shape walk.
        for l in all_loops() {
            for _ in 0..50 {
                let p = random::point();
                assert_eq!(l.contains_point(&p), contains_brute_force(&l, &p));
            }
        }
    }

    #[test]
    fn test_vertex_is_contained_by_exactly_one_loop() {
        // Four loops around a shared vertex partition its neighborhood, so
        // exactly one of them contains the vertex.
        let count = [
            lat_lng_loop(&[(0., 0.), (0., 10.), (10., 0.)]),
            lat_lng_loop(&[(0., 0.), (10., 0.), (0., -10.)]),
            lat_lng_loop(&[(0., 0.), (0., -10.), (-10., 0.)]),
            lat_lng_loop(&[(0., 0.), (-10., 0.), (0., 10.)]),
        ]
        .iter()
        .filter(|l| l.contains_point(&ll(0., 0.)))
        .count();
        assert_eq!(count, 1);

        let c = CellID::from_point(&ll(10., 20.)).parent(10);
        let l = Loop::from_cell_id(c);
        assert!(l.is_valid());
        assert!(l.contains_point(&c.center_point()));
    }

    #[test]
    fn test_complement_parity() {
        for l in all_loops() {
            let mut inverted = l.clone();
            inverted.invert();
            for _ in 0..100 {
                let p = random::point();
                assert_ne!(l.contains_point(&p), inverted.contains_point(&p));
            }
        }
    }

    #[test]
    fn test_invert_twice_is_identity() {
        for l in all_loops().into_iter().chain([Loop::empty(), Loop::full()]) {
            let mut twice = l.clone();
            twice.invert();
            assert_eq!(twice.is_empty(), l.is_full());
            twice.invert();
            assert!(twice.equal(&l));
            assert!(twice.boundary_equal(&l));
            assert_eq!(twice.contains_origin(), l.contains_origin());
            assert_eq!(twice.rect_bound(), l.rect_bound());
        }
    }

    #[test]
    fn test_turning_angle() {
        assert_abs_diff_eq!(north_hemi3().turning_angle(), 0., epsilon = 1e-14);
        assert_abs_diff_eq!(north_hemi().turning_angle(), 0., epsilon = 1e-14);
        assert_abs_diff_eq!(west_hemi().turning_angle(), 0., epsilon = 1e-14);
        assert!(arctic80().turning_angle() > 0.);
        assert!(small_necw().turning_angle() < 0.);

        // Rotating the vertices gives an identical value and reversing them
        // gives the exact negation.
        for l in all_loops() {
            let want = l.turning_angle();
            let n = l.num_vertices();
            for shift in 1..n {
                let mut vertices = l.vertices().to_vec();
                vertices.rotate_left(shift);
                assert_eq!(Loop::from_points(vertices).turning_angle(), want);
            }
            let mut reversed = l.vertices().to_vec();
            reversed.reverse();
            assert_eq!(Loop::from_points(reversed).turning_angle(), -want);
        }
    }

    #[test]
    fn test_normalize() {
        let mut l = lat_lng_loop(&[(-20., 151.), (-20., 150.), (-19., 150.)]);
        assert!(l.turning_angle() < 0.);
        assert!(!l.is_normalized());
        assert!(l.area() > 2. * PI);
        l.normalize();
        assert!(l.is_normalized());
        assert!(l.turning_angle() > 0.);
        assert!(l.area() <= 2. * PI);

        // Hemispheres count as normalized in either orientation.
        assert!(north_hemi().is_normalized());
        assert!(south_hemi().is_normalized());
    }

    #[test]
    fn test_area_and_centroid() {
        assert_abs_diff_eq!(north_hemi().area(), 2. * PI, epsilon = 1e-12);
        assert_abs_diff_eq!(east_hemi().area(), 2. * PI, epsilon = 1e-12);
        assert_abs_diff_eq!(Loop::from_cell_id(CellID::from_face(3)).area(), AVG_AREA_METRIC.value(0), epsilon = 1e-13);

        let center = ll(40., -100.);
        let radius = deg(1.);
        let l = Loop::regular_loop(&center, radius, 1000);
        let cap_area = 2. * PI * (1. - radius.rad().cos());
        assert_relative_eq!(l.area(), cap_area, max_relative = 1e-4);
        assert!(l.centroid().normalize().distance(&center).rad() < 1e-10);
        assert_relative_eq!(l.centroid().norm(), l.area(), max_relative = 1e-3);

        // The complement covers the rest of the sphere.
        let mut inverted = l.clone();
        inverted.invert();
        assert_relative_eq!(l.area() + inverted.area(), 4. * PI, max_relative = 1e-12);
    }

    #[test]
    fn test_surface_integral_counts_triangles() {
        // Integrating a constant one over each fan triangle counts them.
        let l = square(10.);
        let count: u32 = l.surface_integral(|_, _, _| 1u32);
        assert_eq!(count, 2);
    }

    #[test]
    fn test_regular_loop_for_frame() {
        let center = ll(10., 10.);
        let a = Loop::regular_loop(&center, deg(5.), 12);
        let b = Loop::regular_loop_for_frame(&get_frame(&center), deg(5.), 12);
        assert!(a.equal(&b));
        assert!(a.is_valid());
        assert!(a.contains_point(&center));
    }

    #[test]
    fn test_validation_errors() {
        let a = ll(0., 0.);
        let b = ll(0., 10.);
        let c = ll(10., 5.);

        let not_unit = Point(Vector::new(1., 1., 0.));
        assert_eq!(
            Loop::from_points(vec![a, not_unit, c]).find_validation_error(),
            Some(LoopValidationError::NotUnitLength { index: 1 })
        );
        assert_eq!(
            Loop::from_points(vec![a, b]).find_validation_error(),
            Some(LoopValidationError::NotEnoughVertices { count: 2 })
        );
        assert_eq!(
            Loop::from_points(vec![a, b, b, c]).find_validation_error(),
            Some(LoopValidationError::DuplicateVertex { index: 1 })
        );
        assert_eq!(
            Loop::from_points(vec![a, -a, c]).find_validation_error(),
            Some(LoopValidationError::AntipodalVertices { first: 0, second: 1 })
        );

        // A bowtie whose edges 0 and 2 cross.
        let bowtie = vec![ll(0., 0.), ll(10., 10.), ll(0., 10.), ll(10., 0.)];
        assert_eq!(
            Loop::from_points(bowtie.clone()).find_validation_error(),
            Some(LoopValidationError::SelfIntersection { first: 0, second: 2 })
        );
        match Loop::new(bowtie.clone()) {
            Err(S2Error::InvalidLoop(LoopValidationError::SelfIntersection { .. })) => {}
            other => panic!("unexpected result {:?}", other),
        }

        // A vertex visited twice makes two non-adjacent edges touch.
        let d = ll(-10., 5.);
        assert_eq!(
            Loop::from_points(vec![a, b, c, b, d]).find_validation_error(),
            Some(LoopValidationError::SharedVertex { first: 0, second: 2 })
        );

        // Validation can be switched off per loop.
        let options = LoopOptions::default().with_validation(Validation::Disabled);
        let l = Loop::with_options(bowtie, &options).unwrap();
        assert!(!l.is_valid());

        let bad_options = LoopOptions::default().with_index_policy(IndexPolicy::Lazy {
            max_unindexed_calls: 0,
        });
        assert!(matches!(
            Loop::with_options(vec![a, b, c], &bad_options),
            Err(S2Error::InvalidArgument(_))
        ));

        for l in all_loops() {
            assert!(l.is_valid(), "{:?}", l);
        }
    }

    #[test]
    fn test_non_unit_vertex_is_rejected() {
        let vertices = vec![
            Point(Vector::new(1., 0., 0.)),
            Point(Vector::new(0., 2., 0.)),
            Point(Vector::new(0., 0., 1.)),
        ];
        match Loop::new(vertices.clone()) {
            Err(S2Error::InvalidLoop(LoopValidationError::NotUnitLength { index: 1 })) => {}
            other => panic!("unexpected result {:?}", other),
        }

        let mut l = arctic80();
        let before = l.clone();
        assert!(l.init(vertices.clone()).is_err());
        assert!(l.equal(&before));

        let unchecked = Loop::from_points(vertices);
        assert!(unchecked.rect_bound().is_full());
        assert!(!unchecked.contains_origin());
    }

    #[test]
    fn test_validation_of_large_loops() {
        let center = ll(30., 60.);
        let vertices = regular_points(&center, deg(10.), 100);
        let l = Loop::new(vertices.clone()).unwrap();
        assert!(l.is_valid());

        let mut crossed = vertices;
        crossed.swap(10, 11);
        let want = Some(LoopValidationError::SelfIntersection { first: 9, second: 11 });
        assert_eq!(Loop::from_points(crossed.clone()).find_validation_error(), want);

        // Without an index the same pair is found by brute force.
        let options = LoopOptions::default()
            .with_validation(Validation::Disabled)
            .with_index_policy(IndexPolicy::Never);
        let l = Loop::with_options(crossed, &options).unwrap();
        assert_eq!(l.find_validation_error(), want);
    }

    #[test]
    fn test_init_keeps_loop_on_error() {
        let mut l = Loop::new(square(10.).vertices().to_vec()).unwrap();
        l.set_depth(3);
        assert!(l.init(vec![ll(0., 0.), ll(0., 1.)]).is_err());
        assert!(l.equal(&square(10.)));

        l.init(vec![ll(0., 0.), ll(0., 1.), ll(1., 0.)]).unwrap();
        assert_eq!(l.num_vertices(), 3);
        assert_eq!(l.depth(), 3);
        assert!(l.is_hole());
        assert_eq!(l.sign(), -1);
    }

    #[test]
    fn test_oriented_vertex() {
        let mut l = square(10.);
        assert_eq!(l.oriented_vertex(0), l.vertex(0));
        assert_eq!(l.oriented_vertex(5), l.vertex(1));
        l.set_depth(1);
        assert_eq!(l.oriented_vertex(0), l.vertex(3));
        assert_eq!(l.oriented_vertex(1), l.vertex(2));
        assert_eq!(l.oriented_vertex(4), l.vertex(3));
    }

    #[test]
    fn test_relations_of_hemispheres() {
        let north = north_hemi();
        let south = south_hemi();

        assert!(north.contains(&north));
        assert!(north.contains(&arctic80()));
        assert!(!north.contains(&antarctic80()));
        assert!(!north.intersects(&antarctic80()));
        assert!(south.contains(&antarctic80()));
        assert!(!arctic80().contains(&north));
        assert!(arctic80().intersects(&north));

        // The hemispheres share their boundary in opposite directions.
        assert!(!north.contains(&south));
        assert!(!north.intersects(&south));
        assert_eq!(north.compare_boundary(&south), BoundaryCondition::ExcludesOther);
        assert_eq!(north.compare_boundary(&north), BoundaryCondition::ContainsOther);
        assert_eq!(north.compare_boundary(&arctic80()), BoundaryCondition::ContainsOther);
        assert_eq!(arctic80().compare_boundary(&north), BoundaryCondition::ExcludesOther);

        // A hole reverses the meaning of shared edges.
        let mut hole = south_hemi();
        hole.set_depth(1);
        assert_eq!(north.compare_boundary(&hole), BoundaryCondition::ContainsOther);

        // East and north cross each other.
        assert_eq!(north.compare_boundary(&east_hemi()), BoundaryCondition::CrossesOther);
        assert!(north.intersects(&east_hemi()));
        assert!(!north.contains(&east_hemi()));

        let full = Loop::full();
        let empty = Loop::empty();
        assert!(full.contains(&north));
        assert!(north.contains(&empty));
        assert!(!north.contains(&full));
        assert!(full.intersects(&north));
        assert!(!empty.intersects(&north));
        assert_eq!(full.compare_boundary(&north), BoundaryCondition::ContainsOther);
        assert_eq!(north.compare_boundary(&full), BoundaryCondition::ExcludesOther);
        assert_eq!(-BoundaryCondition::ContainsOther, BoundaryCondition::ExcludesOther);
    }

    #[test]
    fn test_relations_of_indexed_loops() {
        let center = ll(20., 20.);
        let big = Loop::regular_loop(&center, deg(10.), 100);
        let small = Loop::regular_loop(&center, deg(5.), 100);
        let shifted = Loop::regular_loop(&ll(20., 33.), deg(5.), 100);
        let far = Loop::regular_loop(&ll(-40., -120.), deg(5.), 100);

        assert!(big.contains(&small));
        assert!(!small.contains(&big));
        assert!(big.intersects(&small) && small.intersects(&big));
        assert!(big.contains_nested(&small));
        assert!(!small.contains_nested(&big));
        assert!(big.contains_non_crossing_boundary(&small, false));
        assert!(!small.contains_non_crossing_boundary(&big, false));
        assert_eq!(big.compare_boundary(&small), BoundaryCondition::ContainsOther);
        assert_eq!(small.compare_boundary(&big), BoundaryCondition::ExcludesOther);

        assert!(big.intersects(&shifted));
        assert!(!big.contains(&shifted));
        assert!(!shifted.contains(&big));
        assert_eq!(big.compare_boundary(&shifted), BoundaryCondition::CrossesOther);

        assert!(!big.intersects(&far));
        assert!(!big.contains(&far));
        assert_eq!(big.compare_boundary(&far), BoundaryCondition::ExcludesOther);

        // Relations with the complement.
        let mut outside = small.clone();
        outside.invert();
        assert!(!outside.intersects(&small));
        assert!(outside.contains(&far));
        assert!(big.intersects(&outside));

        // Both loops were indexed to answer these.
        assert!(big.index.get().is_some());
    }

    #[test]
    fn test_relations_with_shared_vertices() {
        // Two loops sharing the edge between (0,0) and (0,10), on opposite
        // sides of it.
        let below = lat_lng_loop(&[(0., 0.), (-10., 5.), (0., 10.)]);
        let above = lat_lng_loop(&[(0., 10.), (10., 5.), (0., 0.)]);
        assert!(!below.intersects(&above));
        assert!(!below.contains(&above));

        // A triangle inside another one, touching it at a vertex.
        let outer = lat_lng_loop(&[(0., 0.), (0., 20.), (20., 0.)]);
        let inner = lat_lng_loop(&[(0., 0.), (5., 10.), (10., 5.)]);
        assert!(outer.contains(&inner));
        assert!(outer.intersects(&inner));
        assert!(!inner.contains(&outer));
        assert!(outer.contains_nested(&inner));
        assert_eq!(outer.find_vertex(&ll(0., 0.)), Some(3));
        assert_eq!(outer.find_vertex(&ll(5., 5.)), None);
    }

    #[test]
    fn test_find_vertex_with_index() {
        let l = Loop::regular_loop(&ll(-10., 100.), deg(3.), 64);
        for i in 0..64 {
            let m = l.find_vertex(&l.vertex(i)).unwrap();
            assert!((1..=64).contains(&m));
            assert_eq!(l.vertex(m), l.vertex(i));
        }
        assert_eq!(l.find_vertex(&ll(-10., 100.)), None);
    }

    #[test]
    fn test_boundary_equality() {
        let l = square(10.);
        let mut rotated = l.vertices().to_vec();
        rotated.rotate_left(2);
        let rotated = Loop::from_points(rotated);
        assert!(l.boundary_equal(&rotated));
        assert!(!l.equal(&rotated));
        assert!(l.boundary_equal(&l));
        assert!(!Loop::empty().boundary_equal(&Loop::full()));
        assert!(Loop::empty().boundary_equal(&Loop::empty()));

        // Approximately equal after a tiny perturbation.
        let perturbed = Loop::from_points(
            rotated
                .vertices()
                .iter()
                .map(|v| Point(v.0 + Vector::new(1e-15, -1e-15, 1e-15)).normalize())
                .collect(),
        );
        assert!(l.boundary_approx_equal(&perturbed, Angle(1e-13)));
        assert!(!l.boundary_approx_equal(&square(11.), Angle(1e-13)));
        assert!(!l.boundary_approx_equal(&north_hemi3(), Angle(1e-13)));
    }

    #[test]
    fn test_boundary_near() {
        // Splitting every edge at its midpoint keeps the boundary in place.
        let l = square(10.);
        let mut split = Vec::new();
        for i in 0..l.num_vertices() {
            split.push(l.vertex(i));
            split.push(Point(l.vertex(i).0 + l.vertex(i + 1).0).normalize());
        }
        split.rotate_left(3);
        let split = Loop::from_points(split);
        assert!(l.boundary_near(&split, Angle(1e-13)));
        assert!(split.boundary_near(&l, Angle(1e-13)));
        assert!(!l.boundary_approx_equal(&split, Angle(1e-13)));

        assert!(!l.boundary_near(&square(10.5), Angle(1e-3)));
        assert!(l.boundary_near(&square(10.5), deg(1.)));
        assert!(Loop::full().boundary_near(&Loop::full(), Angle(0.)));
        assert!(!Loop::full().boundary_near(&Loop::empty(), Angle(1.)));
    }

    #[test]
    fn test_distance_and_project() {
        let l = square(10.);

        let inside = ll(0., 0.);
        assert_eq!(l.distance(&inside), Angle(0.));
        assert_eq!(l.project(&inside), inside);
        assert_abs_diff_eq!(l.distance_to_boundary(&inside).rad(), deg(10.).rad(), epsilon = 1e-13);

        let outside = ll(0., 20.);
        assert_abs_diff_eq!(l.distance(&outside).rad(), deg(10.).rad(), epsilon = 1e-13);
        assert!(l.project(&outside).approx_eq_by(&ll(0., 10.), Angle(1e-13)));
        assert!(l.project_to_boundary(&outside).approx_eq_by(&ll(0., 10.), Angle(1e-13)));

        // Projections land on the boundary.
        for _ in 0..50 {
            let p = random::point();
            let q = l.project_to_boundary(&p);
            assert!(l.distance_to_boundary(&q).rad() < 1e-13);
            assert!(l.distance(&p).rad() <= p.distance(&q).rad() + 1e-13);
        }
    }

    #[test]
    fn test_encode_decode() {
        for mut l in all_loops().into_iter().chain([Loop::empty(), Loop::full()]) {
            l.set_depth(2);
            let data = l.to_bytes();
            let decoded = Loop::decode(&data).unwrap();
            assert!(decoded.equal(&l));
            assert_eq!(decoded.depth(), 2);
            assert_eq!(decoded.contains_origin(), l.contains_origin());
            assert_eq!(decoded.rect_bound(), l.rect_bound());
            assert_eq!(decoded.subregion_bound(), l.subregion_bound());

            let view = EncodedLoop::new(&data).unwrap();
            assert_eq!(view.num_vertices(), l.num_vertices());
            assert_eq!(view.vertex(l.num_vertices()), l.vertex(0));
            assert_eq!(view.origin_inside(), l.contains_origin());
            assert_eq!(view.bound(), l.rect_bound());
            assert_eq!(view.depth(), 2);
        }
    }

    #[test]
    fn test_decode_rejects_malformed_input() {
        let data = square(10.).to_bytes();
        for len in 0..data.len() {
            assert!(matches!(Loop::decode(&data[..len]), Err(S2Error::Decode(_))), "len {}", len);
        }

        let mut bad_version = data.clone();
        bad_version[0] = 2;
        assert!(matches!(Loop::decode(&bad_version), Err(S2Error::Decode(_))));

        let mut bad_flag = data.clone();
        bad_flag[1 + 4 + 4 * ENCODED_VERTEX_LEN] = 7;
        assert!(matches!(Loop::decode(&bad_flag), Err(S2Error::Decode(_))));

        let mut no_vertices = data.clone();
        no_vertices[1..5].copy_from_slice(&0u32.to_le_bytes());
        assert!(matches!(Loop::decode(&no_vertices), Err(S2Error::Decode(_))));

        // Well formed bytes holding an invalid loop fail validation.
        let bowtie = Loop::from_points(vec![ll(0., 0.), ll(10., 10.), ll(0., 10.), ll(10., 0.)]);
        assert!(matches!(Loop::decode(&bowtie.to_bytes()), Err(S2Error::InvalidLoop(_))));
        let options = LoopOptions::default().with_validation(Validation::Disabled);
        let bytes = bowtie.to_bytes();
        let view = EncodedLoop::new(&bytes).unwrap();
        assert!(view.to_loop_with_options(&options).is_ok());
    }

    #[test]
    fn test_index_policies() {
        let center = ll(-30., 45.);
        let vertices = regular_points(&center, deg(2.), 200);

        let lazy = Loop::new(vertices.clone()).unwrap();
        // Validation of a large loop builds the index.
        assert!(lazy.index.get().is_some());

        let options = LoopOptions::default().with_validation(Validation::Disabled);
        let lazy = Loop::with_options(vertices.clone(), &options).unwrap();
        assert!(lazy.index.get().is_none());
        // All of these fall inside the loop, so none is rejected by the bound
        // before reaching the index.
        let points: Vec<Point> = (0..40).map(|_| random::point_near(&center, 0.015)).collect();
        for (i, p) in points.iter().enumerate() {
            assert_eq!(lazy.contains_point(p), lazy.brute_force_contains_point(p));
            assert_eq!(lazy.index.get().is_some(), i + 1 >= 20);
        }

        let eager = Loop::with_options(vertices.clone(), &options.with_index_policy(IndexPolicy::Eager)).unwrap();
        assert!(eager.index.get().is_some());

        let never = Loop::with_options(vertices, &options.with_index_policy(IndexPolicy::Never)).unwrap();
        for p in &points {
            assert_eq!(never.contains_point(p), eager.contains_point(p));
        }
        assert!(never.index.get().is_none());

        // Small loops never build an index.
        let small = Loop::with_options(
            regular_points(&center, deg(2.), 10),
            &options.with_index_policy(IndexPolicy::Eager),
        )
        .unwrap();
        assert!(small.index.get().is_none());
    }

    #[test]
    fn test_concurrent_queries() {
        let center = ll(50., 10.);
        let l = Loop::regular_loop(&center, deg(4.), 500);
        let points: Vec<Point> = (0..200).map(|_| random::point_near(&center, 0.1)).collect();
        let want: Vec<bool> = points.iter().map(|p| l.brute_force_contains_point(p)).collect();
        std::thread::scope(|s| {
            for _ in 0..4 {
                s.spawn(|| {
                    let got: Vec<bool> = points.iter().map(|p| l.contains_point(p)).collect();
                    assert_eq!(got, want);
                });
            }
        });
    }
}
