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

//! Clipping of geodesic edges to cube faces, and rectangle tests in
//! (u,v) space. The shape index uses these to decide which cells an edge
//! may pass through.

use std::f64::consts::SQRT_2;

use crate::consts::DBL_EPSILON;
use crate::r2::point::Point as R2Point;
use crate::r2::rect::Rect as R2Rect;
use crate::r3::vector::Vector;
use crate::s2::point::{point_cross, Point};
use crate::s2::stuv::{face, face_xyz_to_uvw, valid_face_xyz_to_uv};

/// Maximum error in the u or v coordinate of a point produced by
/// clip_to_padded_face, in (u,v) units.
pub const FACE_CLIP_ERROR_UV_COORD: f64 = 9.0 * (1.0 / SQRT_2) * DBL_EPSILON;

/// Maximum error in the u or v coordinate of a clipped edge endpoint
/// after clipping it to a (u,v) rectangle.
pub const EDGE_CLIP_ERROR_UV_COORD: f64 = 2.25 * DBL_EPSILON;

/// A point in the (u,v,w) frame of a face, where w is the face normal.
#[derive(Clone, Copy, Debug)]
struct PointUVW(Vector);

impl PointUVW {
    // The line through the origin with normal N intersects the
    // [-1,1]x[-1,1] square of the face if the dot products of N with the
    // four corners (±1,±1,1) do not all have the same sign. That holds
    // exactly when |Nu| + |Nv| >= |Nw|, evaluated here without rounding.
    fn intersects_face(&self) -> bool {
        let u = self.0.x.abs();
        let v = self.0.y.abs();
        let w = self.0.z.abs();
        v >= w - u && u >= w - v
    }

    // Reports whether the line with normal N passes through opposite
    // edges of the face (u=±1 or v=±1).
    fn intersects_opposite_edges(&self) -> bool {
        let u = self.0.x.abs();
        let v = self.0.y.abs();
        let w = self.0.z.abs();
        if (u - v).abs() != w {
            return (u - v).abs() >= w;
        }
        if u >= v {
            u - w >= v
        } else {
            v - w >= u
        }
    }

    // Returns the axis, 0 for u and 1 for v, whose ±1 edge the directed
    // line with normal N exits the face through.
    fn exit_axis(&self) -> usize {
        if self.intersects_opposite_edges() {
            return if self.0.x.abs() >= self.0.y.abs() { 1 } else { 0 };
        }
        // Two adjacent edges: exit through v=±1 when an even number of the
        // components are negative. sign bits avoid underflow.
        let parity = (self.0.x.is_sign_negative() as u8)
            ^ (self.0.y.is_sign_negative() as u8)
            ^ (self.0.z.is_sign_negative() as u8);
        if parity == 0 {
            1
        } else {
            0
        }
    }

    // Returns the (u,v) coordinates of the exit point on the given axis.
    fn exit_point(&self, axis: usize) -> R2Point {
        let n = &self.0;
        if axis == 0 {
            let u = if n.y > 0. { 1. } else { -1. };
            R2Point::new(u, (-u * n.x - n.z) / n.y)
        } else {
            let v = if n.x < 0. { 1. } else { -1. };
            R2Point::new((-v * n.y - n.z) / n.x, v)
        }
    }
}

/// Returns the (u,v) coordinates of the portion of edge AB that intersects
/// the given face, or None if it does not intersect. The face is expanded
/// by padding in (u,v) space: the clipped square is [-1-padding,
/// 1+padding]^2.
///
/// Clipping of edges that are almost tangent to a face boundary is
/// consistent across adjacent faces, so every point of AB lands on at least
/// one padded face.
pub fn clip_to_padded_face(a: &Point, b: &Point, f: u8, padding: f64) -> Option<(R2Point, R2Point)> {
    if face(&a.0) == f && face(&b.0) == f {
        let (au, av) = valid_face_xyz_to_uv(f, &a.0);
        let (bu, bv) = valid_face_xyz_to_uv(f, &b.0);
        return Some((R2Point::new(au, av), R2Point::new(bu, bv)));
    }

    // The cross product is taken in xyz space, where point_cross is
    // consistent, and then rotated into the face frame.
    let mut norm = face_xyz_to_uvw(f, &point_cross(a, b).0);
    let a_uvw = PointUVW(face_xyz_to_uvw(f, &a.0));
    let b_uvw = PointUVW(face_xyz_to_uvw(f, &b.0));

    // Padding scales the u and v components of the normal, which amounts
    // to testing against the scaled corners (±R,±R,1) with R=1+padding.
    let scale_uv = 1. + padding;
    let scaled_n = PointUVW(Vector::new(scale_uv * norm.x, scale_uv * norm.y, norm.z));
    if !scaled_n.intersects_face() {
        return None;
    }

    // Tiny normals lose precision when normalized.
    if norm.x.abs().max(norm.y.abs()).max(norm.z.abs()) < libm::ldexp(1., -511) {
        norm = norm * libm::ldexp(1., 563);
    }
    let norm = PointUVW(norm.normalize());

    let a_tan = PointUVW(norm.0.cross(&a_uvw.0));
    let b_tan = PointUVW(b_uvw.0.cross(&norm.0));

    // When the scores for the two endpoints sum to 3 or more the segment
    // misses the face.
    let (a_uv, a_score) = clip_destination(&b_uvw, &a_uvw, &PointUVW(-scaled_n.0), &b_tan, &a_tan, scale_uv);
    let (b_uv, b_score) = clip_destination(&a_uvw, &b_uvw, &scaled_n, &a_tan, &b_tan, scale_uv);
    if a_score + b_score < 3 {
        Some((a_uv, b_uv))
    } else {
        None
    }
}

// Returns the clipped (u,v) endpoint B' of the directed edge AB on the
// face, along with a score: 0 when B' is interior to AB, 1 when it falls
// beyond B, 2 when it falls beyond A, and 3 when B is the clip point but
// cannot be projected onto the face.
fn clip_destination(
    a: &PointUVW,
    b: &PointUVW,
    scaled_n: &PointUVW,
    a_tan: &PointUVW,
    b_tan: &PointUVW,
    scale_uv: f64,
) -> (R2Point, u8) {
    // B is used directly when it lies safely inside the face.
    let max_safe_uv_coord = 1. - FACE_CLIP_ERROR_UV_COORD;
    if b.0.z > 0. {
        let uv = R2Point::new(b.0.x / b.0.z, b.0.y / b.0.z);
        if uv.x.abs().max(uv.y.abs()) <= max_safe_uv_coord {
            return (uv, 0);
        }
    }

    let mut uv = scaled_n.exit_point(scaled_n.exit_axis()) * scale_uv;
    let p = Vector::new(uv.x, uv.y, 1.);

    // B' is on the wrong side of an endpoint when the inward tangent at
    // that endpoint points away from it.
    let mut score = 0;
    if (p - a.0).dot(&a_tan.0) < 0. {
        score = 2;
    } else if (p - b.0).dot(&b_tan.0) < 0. {
        score = 1;
    }
    if score > 0 {
        if b.0.z <= 0. {
            score = 3;
        } else {
            uv = R2Point::new(b.0.x / b.0.z, b.0.y / b.0.z);
        }
    }
    (uv, score)
}

/// Reports whether the straight (u,v) segment AB intersects the rectangle,
/// boundary included.
pub fn edge_intersects_rect(a: &R2Point, b: &R2Point, r: &R2Rect) -> bool {
    if !r.intersects(&R2Rect::from_points(&[*a, *b])) {
        return false;
    }
    // AB meets the rectangle unless all four corners are strictly on one
    // side of the line. Only the corners with extreme projections onto the
    // normal need testing.
    let n = (*b - *a).ortho();
    let i = if n.x >= 0. { 1 } else { 0 };
    let j = if n.y >= 0. { 1 } else { 0 };
    let max = n.dot(&(r.vertex_ij(i, j) - *a));
    let min = n.dot(&(r.vertex_ij(1 - i, 1 - j) - *a));
    max >= 0. && min <= 0.
}

/// Returns the faces, in increasing order, that the edge AB touches once
/// each face is padded by the given amount, along with the clipped (u,v)
/// endpoints on each.
pub fn clip_to_faces(a: &Point, b: &Point, padding: f64) -> Vec<(u8, R2Point, R2Point)> {
    // Edges well inside a single face need no clipping.
    let fa = face(&a.0);
    if fa == face(&b.0) {
        let (au, av) = valid_face_xyz_to_uv(fa, &a.0);
        let (bu, bv) = valid_face_xyz_to_uv(fa, &b.0);
        let max_uv = 1. - padding;
        if au.abs() <= max_uv && av.abs() <= max_uv && bu.abs() <= max_uv && bv.abs() <= max_uv {
            return vec![(fa, R2Point::new(au, av), R2Point::new(bu, bv))];
        }
    }
    (0..6u8)
        .filter_map(|f| clip_to_padded_face(a, b, f, padding).map(|(ua, ub)| (f, ua, ub)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::r1::interval::Interval as R1Interval;
    use crate::s2::latlng::LatLng;
    use crate::s2::random;
    use crate::s2::stuv::face_uv_to_xyz;

    fn ll(lat: f64, lng: f64) -> Point {
        Point::from(LatLng::from_degrees(lat, lng))
    }

    #[test]
    fn test_edge_within_one_face() {
        let a = Point(face_uv_to_xyz(0, -0.5, 0.25).normalize());
        let b = Point(face_uv_to_xyz(0, 0.5, -0.25).normalize());
        let (ua, ub) = clip_to_padded_face(&a, &b, 0, 0.).unwrap();
        assert!((ua.x + 0.5).abs() < 1e-15 && (ua.y - 0.25).abs() < 1e-15);
        assert!((ub.x - 0.5).abs() < 1e-15 && (ub.y + 0.25).abs() < 1e-15);

        let faces = clip_to_faces(&a, &b, 1e-12);
        assert_eq!(faces.len(), 1);
        assert_eq!(faces[0].0, 0);
        assert!(clip_to_padded_face(&a, &b, 3, 0.).is_none());
    }

    #[test]
    fn test_edge_spanning_faces() {
        // An equatorial edge from lng 30 to lng 60 passes from face 0 into
        // face 1, exiting face 0 on its u=1 side.
        let a = ll(0., 30.);
        let b = ll(0., 60.);
        let faces: Vec<u8> = clip_to_faces(&a, &b, 0.).iter().map(|f| f.0).collect();
        assert_eq!(faces, vec![0, 1]);

        let (ua, ub) = clip_to_padded_face(&a, &b, 0, 0.).unwrap();
        assert!((ub.x - 1.).abs() < 1e-14);
        assert!(ua.x < 1. && ua.y.abs() < 1e-14);
        assert!(clip_to_padded_face(&a, &b, 4, 0.).is_none());
    }

    #[test]
    fn test_every_point_lands_on_a_padded_face() {
        for _ in 0..200 {
            let a = random::point();
            let b = random::point();
            let faces = clip_to_faces(&a, &b, 1e-10);
            assert!(!faces.is_empty());
            // Both endpoints are on faces the edge was clipped to.
            assert!(faces.iter().any(|f| f.0 == face(&a.0)));
            assert!(faces.iter().any(|f| f.0 == face(&b.0)));
            for (_, ua, ub) in faces {
                for p in [ua, ub] {
                    assert!(p.x.abs() <= 1. + 1e-10 + 1e-14);
                    assert!(p.y.abs() <= 1. + 1e-10 + 1e-14);
                }
            }
        }
    }

    #[test]
    fn test_edge_intersects_rect() {
        let r = R2Rect::from_intervals(R1Interval::new(0., 1.), R1Interval::new(0., 1.));
        let p = |x, y| R2Point::new(x, y);
        assert!(edge_intersects_rect(&p(-1., 0.5), &p(2., 0.5), &r));
        assert!(edge_intersects_rect(&p(0.5, 0.5), &p(0.6, 0.6), &r));
        // Touching a corner counts.
        assert!(edge_intersects_rect(&p(0., 2.), &p(2., 0.), &r));
        assert!(!edge_intersects_rect(&p(1., 2.), &p(2., 1.5), &r));
        // The bounding boxes overlap but the segment passes outside.
        assert!(!edge_intersects_rect(&p(0.5, 2.), &p(2., 0.5), &r));
        assert!(!edge_intersects_rect(&p(2., 2.), &p(3., 3.), &r));
    }
}
