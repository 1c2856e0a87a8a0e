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

use std::fmt;

use crate::r1::interval::Interval as R1Interval;
use crate::r2::rect::Rect as R2Rect;
use crate::s2::point::Point;
use crate::s2::stuv::*;

/// CellID uniquely identifies a cell in the S2 cell decomposition.
/// The most significant 3 bits encode the face number (0-5). The
/// remaining 61 bits encode the position of the center of this cell
/// along the Hilbert curve on that face. The zero value and the value
/// (1<<64)-1 are invalid cell IDs. The first compares less than any
/// valid cell ID, the second as greater than any valid cell ID.
///
/// Sequentially increasing cell IDs follow a continuous space-filling curve
/// over the entire sphere. They have the following properties:
///
///  - The ID of a cell at level k consists of a 3-bit face number followed
///    by k bit pairs that recursively select one of the four children of
///    each cell. The next bit is always 1, and all other bits are 0.
///    Therefore, the level of a cell is determined by the position of its
///    lowest-numbered bit that is turned on (for a cell at level k, this
///    position is 2 * (MAX_LEVEL - k)).
///
///  - The ID of a parent cell is at the midpoint of the range of IDs spanned
///    by its children (or by its descendants at any level).
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CellID(pub u64);

const LOOKUP_BITS: u64 = 4;
const LOOKUP_SIZE: usize = 1 << (2 * LOOKUP_BITS + 2);
pub(crate) const SWAP_MASK: u64 = 0x01;
pub(crate) const INVERT_MASK: u64 = 0x02;

/// For each orientation, maps a child position in Hilbert order to its
/// (i,j) quadrant encoded as 2*i + j.
pub(crate) const POS_TO_IJ: [[u64; 4]; 4] = [
    [0, 1, 3, 2], // canonical order:    (0,0), (0,1), (1,1), (1,0)
    [0, 2, 3, 1], // axes swapped:       (0,0), (1,0), (1,1), (0,1)
    [3, 2, 0, 1], // bits inverted:      (1,1), (1,0), (0,0), (0,1)
    [3, 1, 0, 2], // swapped & inverted: (1,1), (0,1), (0,0), (1,0)
];

/// Orientation modifier applied to a child at the given Hilbert position.
pub(crate) const POS_TO_ORIENTATION: [u64; 4] = [SWAP_MASK, 0, 0, INVERT_MASK | SWAP_MASK];

struct Lookup {
    pos: [u64; LOOKUP_SIZE],
    ij: [u64; LOOKUP_SIZE],
}

lazy_static! {
    static ref LOOKUP: Lookup = {
        let mut lookup = Lookup {
            pos: [0; LOOKUP_SIZE],
            ij: [0; LOOKUP_SIZE],
        };
        for &orientation in &[0, SWAP_MASK, INVERT_MASK, SWAP_MASK | INVERT_MASK] {
            init_lookup_cell(&mut lookup, 0, 0, 0, orientation, 0, orientation);
        }
        lookup
    };
}

/// Fills both lookup tables for the subtree of Hilbert positions rooted at
/// the given (i, j, pos) prefix.
fn init_lookup_cell(
    lookup: &mut Lookup,
    level: u64,
    i: u64,
    j: u64,
    orig_orientation: u64,
    pos: u64,
    orientation: u64,
) {
    if level == LOOKUP_BITS {
        let ij = (i << LOOKUP_BITS) + j;
        lookup.pos[((ij << 2) + orig_orientation) as usize] = (pos << 2) + orientation;
        lookup.ij[((pos << 2) + orig_orientation) as usize] = (ij << 2) + orientation;
        return;
    }

    let level = level + 1;
    let i = i << 1;
    let j = j << 1;
    let pos = pos << 2;
    let r = POS_TO_IJ[orientation as usize];
    for (k, &quadrant) in r.iter().enumerate() {
        init_lookup_cell(
            lookup,
            level,
            i + (quadrant >> 1),
            j + (quadrant & 1),
            orig_orientation,
            pos + k as u64,
            orientation ^ POS_TO_ORIENTATION[k],
        );
    }
}

/// Returns the lowest-numbered bit that is on for cells at the given level.
pub fn lsb_for_level(level: u64) -> u64 {
    1 << (2 * (MAX_LEVEL - level))
}

/// Returns the edge length of cells at the given level in (i,j)-space.
pub fn size_ij(level: u64) -> u64 {
    1 << (MAX_LEVEL - level)
}

impl CellID {
    /// Returns the "none" id, which compares less than every valid cell id
    /// and is never a leaf.
    pub const fn none() -> CellID {
        CellID(0)
    }

    /// Returns an invalid cell id guaranteed to be larger than any valid
    /// cell id. It is useful for creating indexes.
    pub const fn sentinel() -> CellID {
        CellID(!0)
    }

    /// Returns the cell corresponding to a given S2 cube face.
    pub fn from_face(face: u64) -> CellID {
        CellID((face << POS_BITS) + lsb_for_level(0))
    }

    /// Returns a cell given its face in the range [0,5], the 61-bit
    /// Hilbert curve position pos within that face, and the level in the
    /// range [0,MAX_LEVEL]. The position in the cell ID will be truncated
    /// to correspond to the Hilbert curve position at the center of the
    /// returned cell.
    pub fn from_face_pos_level(face: u64, pos: u64, level: u64) -> CellID {
        CellID((face << POS_BITS) + (pos | 1)).parent(level)
    }

    /// Returns the leaf cell containing the given (face, i, j) coordinates.
    pub fn from_face_ij(face: u64, i: u64, j: u64) -> CellID {
        // Note that this value gets shifted one bit to the left at the end
        // of the function.
        let mut n = face << (POS_BITS - 1);

        // Alternating faces have opposite Hilbert curve orientations; this
        // is necessary in order for all faces to have a right-handed
        // coordinate system.
        let mut bits = face & SWAP_MASK;

        // Each iteration maps 4 bits of "i" and "j" into 8 bits of the
        // Hilbert curve position. The lookup table transforms a 10-bit key
        // of the form "iiiijjjjoo" to a 10-bit value of the form
        // "ppppppppoo", where the letters [ijpo] denote bits of "i", "j",
        // Hilbert curve position, and Hilbert curve orientation respectively.
        let mask = (1 << LOOKUP_BITS) - 1;
        for k in (0..8u64).rev() {
            bits += ((i >> (k * LOOKUP_BITS)) & mask) << (LOOKUP_BITS + 2);
            bits += ((j >> (k * LOOKUP_BITS)) & mask) << 2;
            bits = LOOKUP.pos[bits as usize];
            n |= (bits >> 2) << (k * 2 * LOOKUP_BITS);
            bits &= SWAP_MASK | INVERT_MASK;
        }
        CellID(n * 2 + 1)
    }

    /// Returns the leaf cell containing the given point.
    pub fn from_point(p: &Point) -> CellID {
        let (f, u, v) = xyz_to_face_uv(&p.0);
        let i = st_to_ij(uv_to_st(u));
        let j = st_to_ij(uv_to_st(v));
        CellID::from_face_ij(f as u64, i, j)
    }

    /// Returns the cell at the given level containing the given point.
    pub fn from_point_level(p: &Point, level: u64) -> CellID {
        CellID::from_point(p).parent(level)
    }

    /// Returns the cell id for the given hex token. Invalid tokens map to
    /// the none id.
    pub fn from_token(token: &str) -> CellID {
        if token.is_empty() || token.len() > 16 {
            return CellID::none();
        }
        match u64::from_str_radix(token, 16) {
            Ok(v) => CellID(v << (4 * (16 - token.len()))),
            Err(_) => CellID::none(),
        }
    }

    /// Returns a hex-encoded string of the id with trailing zeros stripped.
    /// The none id is encoded as "X".
    pub fn to_token(&self) -> String {
        if self.0 == 0 {
            return "X".to_string();
        }
        let s = format!("{:016x}", self.0);
        s.trim_end_matches('0').to_string()
    }

    /// Reports whether ci represents a valid cell.
    pub fn is_valid(&self) -> bool {
        self.face() < NUM_FACES as u64 && (self.lsb() & 0x1555555555555555 != 0)
    }

    /// Returns the cube face for this cell ID, in the range [0,5].
    pub fn face(&self) -> u64 {
        self.0 >> POS_BITS
    }

    /// Returns the position along the Hilbert curve of this cell ID, in the
    /// range [0,2^POS_BITS-1].
    pub fn pos(&self) -> u64 {
        self.0 & (!0u64 >> FACE_BITS)
    }

    /// Returns the subdivision level of this cell ID, in the range
    /// [0, MAX_LEVEL].
    pub fn level(&self) -> u64 {
        debug_assert!(self.is_valid());
        MAX_LEVEL - (self.0.trailing_zeros() as u64 >> 1)
    }

    /// Returns the lowest-numbered bit that is on for this cell id.
    pub fn lsb(&self) -> u64 {
        self.0 & self.0.wrapping_neg()
    }

    pub fn is_leaf(&self) -> bool {
        self.0 & 1 != 0
    }

    pub fn is_face(&self) -> bool {
        self.0 & (lsb_for_level(0) - 1) == 0
    }

    /// Returns the child position (0..3) of this cell's ancestor at the
    /// given level, relative to its parent. The argument must be in [1, level].
    pub fn child_position(&self, level: u64) -> u64 {
        (self.0 >> (2 * (MAX_LEVEL - level) + 1)) & 3
    }

    /// Returns the cell at the given level, which must be no greater than
    /// the current level.
    pub fn parent(&self, level: u64) -> CellID {
        let lsb = lsb_for_level(level);
        CellID((self.0 & lsb.wrapping_neg()) | lsb)
    }

    /// Returns the cell at the level above the current one. The id must not
    /// be a face cell.
    pub fn immediate_parent(&self) -> CellID {
        let nlsb = self.lsb() << 2;
        CellID((self.0 & nlsb.wrapping_neg()) | nlsb)
    }

    /// Returns the four immediate children of this cell in Hilbert order.
    /// The id must not be a leaf cell.
    pub fn children(&self) -> [CellID; 4] {
        let mut lsb = self.lsb();
        let c0 = self.0 - lsb + (lsb >> 2);
        lsb >>= 1;
        [
            CellID(c0),
            CellID(c0 + lsb),
            CellID(c0 + 2 * lsb),
            CellID(c0 + 3 * lsb),
        ]
    }

    /// Returns the first child in a traversal of the children of this cell,
    /// in Hilbert curve order.
    pub fn child_begin(&self) -> CellID {
        let ol = self.lsb();
        CellID(self.0 - ol + (ol >> 2))
    }

    /// Returns the first cell in a traversal of children at the given level,
    /// in Hilbert curve order.
    pub fn child_begin_at_level(&self, level: u64) -> CellID {
        CellID(self.0 - self.lsb() + lsb_for_level(level))
    }

    /// Returns the first cell after a traversal of the children of this cell.
    pub fn child_end(&self) -> CellID {
        let ol = self.lsb();
        CellID(self.0.wrapping_add(ol).wrapping_add(ol >> 2))
    }

    /// Returns the first cell after the last child in a traversal of
    /// children at the given level.
    pub fn child_end_at_level(&self, level: u64) -> CellID {
        CellID(
            self.0
                .wrapping_add(self.lsb())
                .wrapping_add(lsb_for_level(level)),
        )
    }

    /// Returns the first cell in an ordered traversal along the Hilbert
    /// curve at the given level.
    pub fn begin(level: u64) -> CellID {
        CellID::from_face(0).child_begin_at_level(level)
    }

    /// Returns the cell just past the last cell of a traversal at the given
    /// level.
    pub fn end(level: u64) -> CellID {
        CellID::from_face(5).child_end_at_level(level)
    }

    /// Returns the minimum CellID that is contained within this cell.
    pub fn range_min(&self) -> CellID {
        debug_assert!(self.is_valid());
        CellID(self.0 - (self.lsb() - 1))
    }

    /// Returns the maximum CellID that is contained within this cell.
    pub fn range_max(&self) -> CellID {
        CellID(self.0 + (self.lsb() - 1))
    }

    /// Returns true iff the CellID contains oci.
    pub fn contains(&self, oci: &CellID) -> bool {
        self.range_min() <= *oci && *oci <= self.range_max()
    }

    /// Returns true iff the CellID intersects oci.
    pub fn intersects(&self, oci: &CellID) -> bool {
        oci.range_min() <= self.range_max() && oci.range_max() >= self.range_min()
    }

    /// Returns the next cell along the Hilbert curve at the same level.
    /// This is expected to be used with child_begin and child_end.
    pub fn next(&self) -> CellID {
        CellID(self.0.wrapping_add(self.lsb() << 1))
    }

    /// Returns the previous cell along the Hilbert curve at the same level.
    pub fn prev(&self) -> CellID {
        CellID(self.0.wrapping_sub(self.lsb() << 1))
    }

    /// Returns the (face, i, j) coordinates of the leaf cell at the center
    /// of this cell (rounded down), together with the Hilbert curve
    /// orientation of this cell.
    pub fn face_ij_orientation(&self) -> (u64, u64, u64, u64) {
        let f = self.face();
        let mut orientation = f & SWAP_MASK;
        let mut i = 0;
        let mut j = 0;
        let mut nbits = MAX_LEVEL - 7 * LOOKUP_BITS; // first iteration

        // Each iteration maps 8 bits of the Hilbert curve position into 4
        // bits of "i" and "j". The lookup table transforms a key of the form
        // "ppppppppoo" to a value of the form "iiiijjjjoo", where the letters
        // [ijpo] represent bits of "i", "j", the Hilbert curve position, and
        // the Hilbert curve orientation respectively.
        //
        // On the first iteration we need to be careful to clear out the bits
        // representing the cube face.
        for k in (0..8u64).rev() {
            orientation += ((self.0 >> (k * 2 * LOOKUP_BITS + 1)) & ((1 << (2 * nbits)) - 1)) << 2;
            orientation = LOOKUP.ij[orientation as usize];
            i += (orientation >> (LOOKUP_BITS + 2)) << (k * LOOKUP_BITS);
            j += ((orientation >> 2) & ((1 << LOOKUP_BITS) - 1)) << (k * LOOKUP_BITS);
            orientation &= SWAP_MASK | INVERT_MASK;
            nbits = LOOKUP_BITS; // following iterations
        }

        // The position of a non-leaf cell at level "n" consists of a prefix
        // of 2*n bits that identifies the cell, followed by a suffix of
        // 2*(MAX_LEVEL-n)+1 bits of the form 10*. If n==MAX_LEVEL, the suffix
        // is just "1" and has no effect. Otherwise, it consists of "10",
        // followed by (MAX_LEVEL-n-1) repetitions of "00", followed by "0".
        // The "10" has no effect, while each occurrence of "00" has the
        // effect of reversing the SWAP_MASK bit.
        if self.lsb() & 0x1111111111111110 != 0 {
            orientation ^= SWAP_MASK;
        }

        (f, i, j, orientation)
    }

    /// Returns the (face, si, ti) coordinates of the center of the cell.
    fn center_face_siti(&self) -> (u64, u64, u64) {
        let (face, i, j, _) = self.face_ij_orientation();
        let delta = if self.is_leaf() {
            1
        } else if (i ^ (self.0 >> 2)) & 1 != 0 {
            2
        } else {
            0
        };
        (face, 2 * i + delta, 2 * j + delta)
    }

    /// Returns the center of the cell as a unit-length point.
    pub fn center_point(&self) -> Point {
        let (face, si, ti) = self.center_face_siti();
        Point(face_siti_to_xyz(face as u8, si, ti).0.normalize())
    }

    /// Returns the bound of this cell in (u,v)-space on its face.
    pub fn bound_uv(&self) -> R2Rect {
        let (_, i, j, _) = self.face_ij_orientation();
        let size = size_ij(self.level());
        let i_lo = i & size.wrapping_neg();
        let j_lo = j & size.wrapping_neg();
        R2Rect::from_intervals(
            R1Interval::new(st_to_uv(ij_to_st_min(i_lo)), st_to_uv(ij_to_st_min(i_lo + size))),
            R1Interval::new(st_to_uv(ij_to_st_min(j_lo)), st_to_uv(ij_to_st_min(j_lo + size))),
        )
    }

    /// Returns the four corners of the cell as unit-length points in CCW
    /// order, starting from the lower left in (u,v)-space.
    pub fn vertices(&self) -> [Point; 4] {
        let face = self.face() as u8;
        let uv = self.bound_uv();
        let corner = |k: usize| {
            let p = uv.vertex(k);
            Point(face_uv_to_xyz(face, p.x, p.y).normalize())
        };
        [corner(0), corner(1), corner(2), corner(3)]
    }
}

impl From<&Point> for CellID {
    fn from(p: &Point) -> Self {
        CellID::from_point(p)
    }
}

impl fmt::Debug for CellID {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "CellID({})", self)
    }
}

impl fmt::Display for CellID {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if !self.is_valid() {
            return write!(f, "Invalid: {:x}", self.0);
        }
        write!(f, "{}/", self.face())?;
        for level in 1..=self.level() {
            write!(f, "{}", self.child_position(level))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::s2::random;

    #[test]
    fn test_default_and_sentinels() {
        assert_eq!(CellID::default(), CellID::none());
        assert!(!CellID::none().is_valid());
        assert!(!CellID::none().is_leaf());
        assert!(!CellID::sentinel().is_valid());
        for face in 0..6 {
            let id = CellID::from_face(face);
            assert!(CellID::none() < id.range_min());
            assert!(id.range_max() < CellID::sentinel());
        }
    }

    #[test]
    fn test_face_definitions() {
        assert_eq!(CellID::from_face(0).face(), 0);
        assert_eq!(CellID::from_face(5).face(), 5);
        for face in 0..6 {
            let id = CellID::from_face(face);
            assert!(id.is_face());
            assert!(id.is_valid());
            assert_eq!(id.level(), 0);
            assert_eq!(id.parent(0), id);
            assert!(!id.is_leaf());
        }
        assert!(CellID::from_face(0) < CellID::from_face(1));
    }

    #[test]
    fn test_parent_child_relationships() {
        let ci = CellID::from_face_pos_level(3, 0x12345678, MAX_LEVEL - 4);
        assert!(ci.is_valid());
        assert_eq!(ci.face(), 3);
        assert_eq!(ci.pos(), 0x12345700);
        assert_eq!(ci.level(), 26);
        assert!(!ci.is_leaf());

        assert_eq!(ci.child_begin_at_level(ci.level() + 2).pos(), 0x12345610);
        assert_eq!(ci.child_begin().pos(), 0x12345640);
        assert_eq!(ci.children()[0].pos(), 0x12345640);
        assert_eq!(ci.immediate_parent().pos(), 0x12345400);
        assert_eq!(ci.parent(ci.level() - 2).pos(), 0x12345000);

        // Check ordering of children relative to parents.
        assert!(ci.child_begin() < ci);
        assert!(ci.child_end() > ci);
        assert_eq!(ci.child_begin().next().next().next().next(), ci.child_end());
        assert_eq!(ci.child_begin_at_level(MAX_LEVEL), ci.range_min());
        assert_eq!(ci.child_end_at_level(MAX_LEVEL), ci.range_max().next());

        for child in ci.children().iter() {
            assert_eq!(child.immediate_parent(), ci);
            assert_eq!(child.level(), ci.level() + 1);
            assert!(ci.contains(child));
            assert!(ci.intersects(child));
        }
    }

    #[test]
    fn test_wrapping_traversal() {
        let id = CellID::begin(0);
        assert_eq!(id, CellID::from_face(0));
        assert_eq!(CellID::end(0), CellID::from_face(5).next());
        let mut count = 0;
        let mut c = CellID::begin(2);
        while c != CellID::end(2) {
            assert_eq!(c.level(), 2);
            count += 1;
            c = c.next();
        }
        assert_eq!(count, 6 * 16);
        assert_eq!(CellID::begin(2).next().prev(), CellID::begin(2));
    }

    #[test]
    fn test_range_and_containment() {
        let leaf = CellID::from_face_ij(2, 1234, 5678);
        assert!(leaf.is_leaf());
        assert_eq!(leaf.range_min(), leaf);
        assert_eq!(leaf.range_max(), leaf);
        for level in 0..=MAX_LEVEL {
            let p = leaf.parent(level);
            assert_eq!(p.level(), level);
            assert!(p.contains(&leaf));
            assert!(p.range_min() <= leaf && leaf <= p.range_max());
            assert!(p.range_min().is_leaf() && p.range_max().is_leaf());
            assert!(!leaf.contains(&p) || level == MAX_LEVEL);
        }
        let a = CellID::from_face(1).children()[0];
        let b = CellID::from_face(1).children()[1];
        assert!(!a.contains(&b));
        assert!(!a.intersects(&b));
        assert!(a.range_max() < b.range_min());
    }

    #[test]
    fn test_face_ij_round_trip() {
        for _ in 0..1000 {
            let id = random::cell_id_for_level(MAX_LEVEL);
            let (f, i, j, _) = id.face_ij_orientation();
            assert_eq!(CellID::from_face_ij(f, i, j), id);
        }
    }

    #[test]
    fn test_from_point_of_center() {
        for _ in 0..1000 {
            let id = random::cell_id_for_level(MAX_LEVEL);
            assert!(id.is_leaf());
            assert_eq!(CellID::from_point(&id.center_point()), id);
            let level = random::uniform_int(0, MAX_LEVEL as i64) as u64;
            let parent = id.parent(level);
            assert_eq!(CellID::from_point_level(&parent.center_point(), level), parent);
        }
    }

    #[test]
    fn test_hilbert_continuity() {
        // Sequentially increasing cell ids form a continuous path over the
        // sphere: consecutive cells at a level are always neighbors.
        const LEVEL: u64 = 6;
        // Maximum angular width of a level 6 cell.
        let max_dist = 1.704897179199218452 / (1u64 << LEVEL) as f64;
        let mut id = CellID::begin(LEVEL);
        let end = CellID::end(LEVEL);
        while id.next() != end {
            let next = id.next();
            assert!(id.center_point().0.angle(&next.center_point().0).0 <= max_dist);
            id = next;
        }
    }

    #[test]
    fn test_bound_uv_and_vertices() {
        let face = CellID::from_face(0);
        let uv = face.bound_uv();
        assert_eq!((uv.x.lo, uv.x.hi, uv.y.lo, uv.y.hi), (-1., 1., -1., 1.));
        for child in face.children().iter() {
            let cuv = child.bound_uv();
            assert_eq!(cuv.x.len(), 1.);
            let c = child.center_point();
            let (f, u, v) = xyz_to_face_uv(&c.0);
            assert_eq!(f, 0);
            assert!(cuv.x.contains(u) && cuv.y.contains(v));
            let verts = child.vertices();
            for k in 0..4 {
                // Each corner lies on the cell boundary, and the loop is CCW
                // around the center.
                let a = verts[k].0;
                let b = verts[(k + 1) % 4].0;
                assert!(a.cross(&b).dot(&c.0) > 0.);
            }
        }
    }

    #[test]
    fn test_tokens_and_display() {
        let id = CellID::from_face_pos_level(3, 0x12345678, 10);
        assert_eq!(CellID::from_token(&id.to_token()), id);
        assert_eq!(CellID::none().to_token(), "X");
        assert_eq!(CellID::from_token("X"), CellID::none());
        assert_eq!(CellID::from_token("876b e99"), CellID::none());
        assert_eq!(CellID::from_face(3).to_token(), "7");
        assert_eq!(format!("{}", CellID::from_face(3)), "3/");
        assert_eq!(format!("{}", CellID::from_face(4).children()[2]), "4/2");
        assert_eq!(format!("{}", CellID::none()), "Invalid: 0");
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic]
    fn test_level_of_invalid_id_panics() {
        CellID::none().level();
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic]
    fn test_range_min_of_sentinel_panics() {
        CellID::sentinel().range_min();
    }
}
