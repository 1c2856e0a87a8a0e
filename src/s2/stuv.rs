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

// Coordinate systems used by cell ids.
//
// (x, y, z) is a direction in ℝ³. (face, u, v) is the gnomonic projection of
// that direction onto one of the six cube faces, with u and v in [-1, 1].
// (s, t) in [0, 1] is a non-linear (quadratic) transform of (u, v) that
// makes cell areas more uniform, and (i, j) are the integer leaf-cell
// coordinates obtained by scaling (s, t) by MAX_SIZE. (si, ti) are the same
// coordinates at twice the resolution so that cell centers are integers.

use crate::r3::vector::Vector;
use crate::s2::point::Point;

/// Maximum subdivision level of a cell.
pub const MAX_LEVEL: u64 = 30;
/// Number of faces of the cube.
pub const NUM_FACES: u8 = 6;
/// Number of bits used to encode the face.
pub const FACE_BITS: u64 = 3;
/// Number of bits used to encode the position along the Hilbert curve.
pub const POS_BITS: u64 = 2 * MAX_LEVEL + 1;
/// Number of leaf cells along one edge of a face.
pub const MAX_SIZE: u64 = 1 << MAX_LEVEL;
/// Maximum value of an si- or ti-coordinate.
pub const MAX_SITI: u64 = 1 << (MAX_LEVEL + 1);

/// Converts an s- or t-value to the corresponding u- or v-value.
/// This is a non-linear transformation from [0,1] to [-1,1] that attempts
/// to make the cell sizes more uniform.
pub fn st_to_uv(s: f64) -> f64 {
    if s >= 0.5 {
        (1. / 3.) * (4. * s * s - 1.)
    } else {
        (1. / 3.) * (1. - 4. * (1. - s) * (1. - s))
    }
}

/// The inverse of st_to_uv. Note that it is not always true that
/// uv_to_st(st_to_uv(x)) == x due to numerical errors.
pub fn uv_to_st(u: f64) -> f64 {
    if u >= 0. {
        0.5 * (1. + 3. * u).sqrt()
    } else {
        1. - 0.5 * (1. - 3. * u).sqrt()
    }
}

/// Converts an si- or ti-value to the corresponding s- or t-value.
pub fn siti_to_st(si: u64) -> f64 {
    if si > MAX_SITI {
        return 1.;
    }
    si as f64 / MAX_SITI as f64
}

/// Converts an s- or t-value to the leaf cell coordinate containing it,
/// clamped to the valid range.
pub fn st_to_ij(s: f64) -> u64 {
    let v = (MAX_SIZE as f64 * s).floor();
    v.max(0.).min((MAX_SIZE - 1) as f64) as u64
}

/// Returns the s- or t-value of the lower edge of the leaf cell at the
/// given coordinate, which may also be MAX_SIZE for the upper face edge.
pub fn ij_to_st_min(i: u64) -> f64 {
    i as f64 / MAX_SIZE as f64
}

/// Returns the face containing the given direction vector.
/// (For points on the boundary between faces, the result is arbitrary but
/// deterministic.)
pub fn face(r: &Vector) -> u8 {
    use crate::r3::vector::Axis;
    let (f, c) = match r.largest_component() {
        Axis::X => (0, r.x),
        Axis::Y => (1, r.y),
        Axis::Z => (2, r.z),
    };
    if c < 0. {
        f + 3
    } else {
        f
    }
}

/// Given a valid face for the given point r (meaning that the dot product
/// of r with the face normal is positive), returns the corresponding u and
/// v values, which may lie outside the range [-1,1].
pub fn valid_face_xyz_to_uv(face: u8, r: &Vector) -> (f64, f64) {
    match face {
        0 => (r.y / r.x, r.z / r.x),
        1 => (-r.x / r.y, r.z / r.y),
        2 => (-r.x / r.z, -r.y / r.z),
        3 => (r.z / r.x, r.y / r.x),
        4 => (r.z / r.y, -r.x / r.y),
        _ => (-r.y / r.z, -r.x / r.z),
    }
}

/// Converts a direction vector (not necessarily unit length) to
/// (face, u, v) coordinates.
pub fn xyz_to_face_uv(r: &Vector) -> (u8, f64, f64) {
    let f = face(r);
    let (u, v) = valid_face_xyz_to_uv(f, r);
    (f, u, v)
}

/// Turns face and UV coordinates into an unnormalized 3 vector.
pub fn face_uv_to_xyz(face: u8, u: f64, v: f64) -> Vector {
    match face {
        0 => Vector::new(1., u, v),
        1 => Vector::new(-u, 1., v),
        2 => Vector::new(-u, -v, 1.),
        3 => Vector::new(-1., -v, -u),
        4 => Vector::new(v, -1., -u),
        _ => Vector::new(v, u, -1.),
    }
}

/// Transforms the given point P to the (u,v,w) coordinate frame of the given
/// face where the w-axis represents the face normal.
pub fn face_xyz_to_uvw(face: u8, p: &Vector) -> Vector {
    // The result coordinates are simply the dot products of P with the
    // (u,v,w) axes for the given face.
    match face {
        0 => Vector::new(p.y, p.z, p.x),
        1 => Vector::new(-p.x, p.z, p.y),
        2 => Vector::new(-p.x, -p.y, p.z),
        3 => Vector::new(-p.z, -p.y, -p.x),
        4 => Vector::new(-p.z, p.x, -p.y),
        _ => Vector::new(p.y, p.x, -p.z),
    }
}

/// Transforms the (si, ti) coordinates to a (not necessarily unit length)
/// point on the given face.
pub fn face_siti_to_xyz(face: u8, si: u64, ti: u64) -> Point {
    Point(face_uv_to_xyz(
        face,
        st_to_uv(siti_to_st(si)),
        st_to_uv(siti_to_st(ti)),
    ))
}

/// Returns the unit-length normal of the given face.
pub fn unit_norm(face: u8) -> Vector {
    face_uv_to_xyz(face, 0., 0.)
}
