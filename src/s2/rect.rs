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

use std::f64::consts::{FRAC_PI_2, PI};
use std::fmt;

use tracing::debug;

use crate::consts::remainder;
use crate::r1::interval::Interval as R1Interval;
use crate::r3::vector::Vector;
use crate::s1::angle::Angle;
use crate::s1::interval::Interval as S1Interval;
use crate::s2::cap::Cap;
use crate::s2::edge_distance::distance_from_segment;
use crate::s2::encoding::{put_f64, put_u8, Decoder};
use crate::s2::error::{S2Error, S2Result};
use crate::s2::latlng::{latitude, LatLng};
use crate::s2::point::{point_cross, Point};
use crate::s2::region::Region;

const ENCODING_VERSION: u8 = 1;

/// Size in bytes of an encoded Rect.
pub const ENCODED_LEN: usize = 1 + 4 * 8;

/// Rect represents a closed latitude-longitude rectangle.
///
/// The latitude interval is bounded to [-π/2,π/2] and the longitude interval
/// may wrap through ±π. A rect is empty iff both intervals are empty; every
/// constructor keeps the two in agreement.
#[derive(Clone, Copy, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Rect {
    pub lat: R1Interval,
    pub lng: S1Interval,
}

impl Default for Rect {
    fn default() -> Self {
        Rect::empty()
    }
}

impl fmt::Display for Rect {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "[Lo{}, Hi{}]", self.lo(), self.hi())
    }
}

/// The latitude interval of the whole sphere.
pub fn full_lat() -> R1Interval {
    R1Interval::new(-FRAC_PI_2, FRAC_PI_2)
}

/// The longitude interval of the whole sphere.
pub fn full_lng() -> S1Interval {
    S1Interval::full()
}

impl Rect {
    pub fn new(lat: R1Interval, lng: S1Interval) -> Self {
        Rect { lat, lng }
    }

    pub fn empty() -> Self {
        Rect {
            lat: R1Interval::empty(),
            lng: S1Interval::empty(),
        }
    }

    pub fn full() -> Self {
        Rect {
            lat: full_lat(),
            lng: full_lng(),
        }
    }

    /// Constructs the degenerate rect containing a single point.
    pub fn from_latlng(p: &LatLng) -> Self {
        debug_assert!(p.is_valid(), "invalid LatLng {}", p);
        Rect {
            lat: R1Interval::from_point(p.lat.rad()),
            lng: S1Interval::new(p.lng.rad(), p.lng.rad()),
        }
    }

    /// Constructs a rect with the given center and size. Both dimensions of
    /// size must be non-negative. The latitude is clamped to [-π/2,π/2] and a
    /// longitude size of 2π or more yields the full longitude range.
    pub fn from_center_size(center: &LatLng, size: &LatLng) -> Self {
        Rect::from_latlng(center).expanded(&(*size * 0.5))
    }

    /// Returns the minimal bounding rect containing the two given points.
    /// On a tie in longitude the shorter way round is used.
    pub fn from_point_pair(a: &LatLng, b: &LatLng) -> Self {
        debug_assert!(a.is_valid() && b.is_valid());
        Rect {
            lat: R1Interval::from_point_pair(a.lat.rad(), b.lat.rad()),
            lng: S1Interval::from_point_pair(a.lng.rad(), b.lng.rad()),
        }
    }

    /// Reports whether the rect is valid: the latitude bounds lie in
    /// [-π/2,π/2], the longitude interval is valid and both intervals are
    /// empty or both are not.
    pub fn is_valid(&self) -> bool {
        self.lat.lo.abs() <= FRAC_PI_2
            && self.lat.hi.abs() <= FRAC_PI_2
            && self.lng.is_valid()
            && self.lat.is_empty() == self.lng.is_empty()
    }

    pub fn is_empty(&self) -> bool {
        self.lat.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.lat == full_lat() && self.lng.is_full()
    }

    /// Reports whether the rect is a single point.
    pub fn is_point(&self) -> bool {
        self.lat.lo == self.lat.hi && self.lng.lo == self.lng.hi
    }

    /// Reports whether the longitude interval crosses the 180 degree
    /// meridian.
    pub fn is_inverted(&self) -> bool {
        self.lng.is_inverted()
    }

    pub fn lo(&self) -> LatLng {
        LatLng::new(Angle(self.lat.lo), Angle(self.lng.lo))
    }

    pub fn hi(&self) -> LatLng {
        LatLng::new(Angle(self.lat.hi), Angle(self.lng.hi))
    }

    /// Returns the k-th vertex in CCW order (lower left, lower right, upper
    /// right, upper left), for k in 0..4.
    pub fn vertex(&self, k: usize) -> LatLng {
        let lat = if k >> 1 == 0 { self.lat.lo } else { self.lat.hi };
        let lng = if (k >> 1) ^ (k & 1) == 0 {
            self.lng.lo
        } else {
            self.lng.hi
        };
        LatLng::new(Angle(lat), Angle(lng))
    }

    pub fn center(&self) -> LatLng {
        LatLng::new(Angle(self.lat.center()), Angle(self.lng.center()))
    }

    /// Returns the width and height of the rect in latitude-longitude space.
    /// Empty rects have a negative width and height.
    pub fn size(&self) -> LatLng {
        LatLng::new(Angle(self.lat.len()), Angle(self.lng.len()))
    }

    /// Returns the surface area of the rect on the unit sphere.
    pub fn area(&self) -> f64 {
        if self.is_empty() {
            return 0.;
        }
        self.lng.len() * (self.lat.hi.sin() - self.lat.lo.sin())
    }

    /// Returns the true centroid of the rect multiplied by its surface area.
    /// The result is not unit length; the zero vector is returned for an
    /// empty rect.
    pub fn centroid(&self) -> Point {
        if self.is_empty() {
            return Point(Vector::default());
        }
        // Slices of constant thickness have equal area, so z is the midpoint
        // of the z-range. The radial distance integrates the arc centroid
        // r * sin(alpha) / alpha over that range.
        let (z1, z2) = (self.lat.lo.sin(), self.lat.hi.sin());
        let (r1, r2) = (self.lat.lo.cos(), self.lat.hi.cos());
        let alpha = 0.5 * self.lng.len();
        let r = alpha.sin() * (r2 * z2 - r1 * z1 + self.lat.len());
        let lng = self.lng.center();
        let z = alpha * (z2 + z1) * (z2 - z1);
        Point(Vector::new(r * lng.cos(), r * lng.sin(), z))
    }

    /// Returns the rect expanded so that it contains all points within the
    /// given margin of it. The latitude result is clamped to the sphere.
    /// Negative margins shrink the rect; the result is empty if either
    /// interval becomes empty.
    pub fn expanded(&self, margin: &LatLng) -> Rect {
        let lat = self.lat.expanded(margin.lat.rad());
        let lng = self.lng.expanded(margin.lng.rad());
        if lat.is_empty() || lng.is_empty() {
            return Rect::empty();
        }
        Rect {
            lat: lat.intersection(&full_lat()),
            lng,
        }
    }

    /// If the rect touches either pole, returns it with the full longitude
    /// range, since every longitude is the same point at a pole.
    pub fn polar_closure(&self) -> Rect {
        if self.lat.lo == -FRAC_PI_2 || self.lat.hi == FRAC_PI_2 {
            return Rect {
                lat: self.lat,
                lng: S1Interval::full(),
            };
        }
        *self
    }

    /// Returns the smallest rect containing the union of both rects.
    pub fn union(&self, other: &Rect) -> Rect {
        Rect {
            lat: self.lat.union(&other.lat),
            lng: self.lng.union(&other.lng),
        }
    }

    /// Returns the smallest rect containing the intersection of both rects.
    /// The intersection of two rects may be two disjoint pieces in
    /// longitude; the bound of those is returned.
    pub fn intersection(&self, other: &Rect) -> Rect {
        let lat = self.lat.intersection(&other.lat);
        let lng = self.lng.intersection(&other.lng);
        if lat.is_empty() || lng.is_empty() {
            return Rect::empty();
        }
        Rect { lat, lng }
    }

    /// Returns the rect grown to include the given point.
    pub fn add_point(&self, ll: &LatLng) -> Rect {
        debug_assert!(ll.is_valid(), "invalid LatLng {}", ll);
        Rect {
            lat: self.lat.add_point(ll.lat.rad()),
            lng: self.lng.add_point(ll.lng.rad()),
        }
    }

    pub fn contains_latlng(&self, ll: &LatLng) -> bool {
        debug_assert!(ll.is_valid(), "invalid LatLng {}", ll);
        self.lat.contains(ll.lat.rad()) && self.lng.contains(ll.lng.rad())
    }

    pub fn interior_contains_latlng(&self, ll: &LatLng) -> bool {
        debug_assert!(ll.is_valid(), "invalid LatLng {}", ll);
        self.lat.interior_contains(ll.lat.rad()) && self.lng.interior_contains(ll.lng.rad())
    }

    pub fn interior_contains_point(&self, p: &Point) -> bool {
        self.interior_contains_latlng(&LatLng::from(p))
    }

    pub fn contains(&self, other: &Rect) -> bool {
        self.lat.contains_interval(&other.lat) && self.lng.contains_interval(&other.lng)
    }

    pub fn interior_contains(&self, other: &Rect) -> bool {
        self.lat.interior_contains_interval(&other.lat)
            && self.lng.interior_contains_interval(&other.lng)
    }

    pub fn intersects(&self, other: &Rect) -> bool {
        self.lat.intersects(&other.lat) && self.lng.intersects(&other.lng)
    }

    pub fn interior_intersects(&self, other: &Rect) -> bool {
        self.lat.interior_intersects(&other.lat) && self.lng.interior_intersects(&other.lng)
    }

    /// Returns a rect that contains every point within the given distance
    /// of this one. A negative distance instead returns the rect of points
    /// at least -distance from the boundary, which may be empty.
    ///
    /// Expanding by a positive distance unions the bounds of caps around
    /// each vertex with the rect itself, which is conservative but correct
    /// even for very large rects.
    pub fn expanded_by_distance(&self, distance: Angle) -> Rect {
        if distance.0 >= 0. {
            let mut r = *self;
            for k in 0..4 {
                let cap = Cap::from_center_angle(&Point::from(self.vertex(k)), distance);
                r = r.union(&cap.rect_bound());
            }
            return r;
        }

        // Shrink the latitude interval unless it reaches a pole while the
        // longitude is full, since then there is no boundary at that pole.
        let lo = if self.lat.lo <= -FRAC_PI_2 && self.lng.is_full() {
            -FRAC_PI_2
        } else {
            self.lat.lo - distance.0
        };
        let hi = if self.lat.hi >= FRAC_PI_2 && self.lng.is_full() {
            FRAC_PI_2
        } else {
            self.lat.hi + distance.0
        };
        let lat = R1Interval::new(lo, hi);
        if lat.is_empty() {
            return Rect::empty();
        }

        // At the largest absolute latitude the cap covers the widest range of
        // longitudes. By the spherical law of sines that half-width is
        // asin(sin(d) / cos(lat)), or everything once sin(d) >= cos(lat).
        let max_abs_lat = (-lat.lo).max(lat.hi);
        let sin_a = (-distance.0).sin();
        let sin_c = max_abs_lat.cos();
        let max_lng_margin = if sin_a < sin_c {
            (sin_a / sin_c).asin()
        } else {
            FRAC_PI_2
        };

        let lng = self.lng.expanded(-max_lng_margin);
        if lng.is_empty() {
            return Rect::empty();
        }
        Rect { lat, lng }
    }

    /// Reports whether the two rects are equal up to a small tolerance in
    /// each coordinate.
    pub fn approx_eq(&self, other: &Rect) -> bool {
        self.lat.approx_eq(&other.lat) && self.lng.approx_eq(&other.lng)
    }

    /// As approx_eq, with separate latitude and longitude tolerances.
    pub fn approx_eq_by(&self, other: &Rect, max_error: &LatLng) -> bool {
        self.lat.approx_eq_by(&other.lat, max_error.lat.rad())
            && self.lng.approx_eq_by(&other.lng, max_error.lng.rad())
    }

    /// Returns the minimum distance (measured along the surface of the
    /// sphere) to the given rect. Both rects must be non-empty.
    pub fn distance(&self, other: &Rect) -> Angle {
        debug_assert!(!self.is_empty() && !other.is_empty());
        let (a, b) = (self, other);

        if a.lng.intersects(&b.lng) {
            if a.lat.intersects(&b.lat) {
                return Angle(0.);
            }
            // The closest points are on one meridian, joining the top of the
            // lower rect to the bottom of the higher one.
            let (lo, hi) = if a.lat.lo > b.lat.hi {
                (b.lat.hi, a.lat.lo)
            } else {
                (a.lat.hi, b.lat.lo)
            };
            return Angle(hi - lo);
        }

        // The closest points lie on the pair of meridian edges nearest in
        // longitude.
        let lo_hi = S1Interval::from_point_pair(a.lng.lo, b.lng.hi);
        let hi_lo = S1Interval::from_point_pair(a.lng.hi, b.lng.lo);
        let (a_lng, b_lng) = if lo_hi.len() < hi_lo.len() {
            (a.lng.lo, b.lng.hi)
        } else {
            (a.lng.hi, b.lng.lo)
        };

        // One of the segment endpoints always realizes the minimum.
        let a_lo = Point::from(LatLng::new(Angle(a.lat.lo), Angle(a_lng)));
        let a_hi = Point::from(LatLng::new(Angle(a.lat.hi), Angle(a_lng)));
        let b_lo = Point::from(LatLng::new(Angle(b.lat.lo), Angle(b_lng)));
        let b_hi = Point::from(LatLng::new(Angle(b.lat.hi), Angle(b_lng)));
        distance_from_segment(&a_lo, &b_lo, &b_hi)
            .min(distance_from_segment(&a_hi, &b_lo, &b_hi))
            .min(distance_from_segment(&b_lo, &a_lo, &a_hi))
            .min(distance_from_segment(&b_hi, &a_lo, &a_hi))
    }

    /// Returns the minimum distance from the rect to the given point, zero
    /// if the rect contains it. The rect must be non-empty.
    pub fn distance_to_latlng(&self, p: &LatLng) -> Angle {
        debug_assert!(!self.is_empty());
        debug_assert!(p.is_valid(), "invalid LatLng {}", p);
        let (lat, lng) = (p.lat.rad(), p.lng.rad());

        if self.lng.contains(lng) {
            return Angle(0f64.max((lat - self.lat.hi).max(self.lat.lo - lat)));
        }

        let interval = S1Interval::new(self.lng.hi, self.lng.complement_center());
        let a_lng = if interval.contains(lng) {
            self.lng.hi
        } else {
            self.lng.lo
        };
        let lo = Point::from(LatLng::new(Angle(self.lat.lo), Angle(a_lng)));
        let hi = Point::from(LatLng::new(Angle(self.lat.hi), Angle(a_lng)));
        distance_from_segment(&Point::from(p), &lo, &hi)
    }

    /// Returns the undirected Hausdorff distance to the given rect.
    pub fn hausdorff_distance(&self, other: &Rect) -> Angle {
        self.directed_hausdorff_distance(other)
            .max(other.directed_hausdorff_distance(self))
    }

    /// Returns the directed Hausdorff distance to the given rect:
    ///
    /// ```text
    /// h(A, B) = max_{p in A} min_{q in B} d(p, q)
    /// ```
    pub fn directed_hausdorff_distance(&self, other: &Rect) -> Angle {
        if self.is_empty() {
            return Angle(0.);
        }
        if other.is_empty() {
            return Angle(PI);
        }
        let lng_distance = self.lng.directed_hausdorff_distance(&other.lng);
        debug_assert!(lng_distance.0 >= 0.);
        directed_hausdorff_lat(lng_distance.0, &self.lat, &other.lat)
    }

    /// Appends the lossless encoding of the rect to buf.
    pub fn encode(&self, buf: &mut Vec<u8>) {
        buf.reserve(ENCODED_LEN);
        put_u8(buf, ENCODING_VERSION);
        put_f64(buf, self.lat.lo);
        put_f64(buf, self.lat.hi);
        put_f64(buf, self.lng.lo);
        put_f64(buf, self.lng.hi);
    }

    /// Returns the encoded rect as a new buffer.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(ENCODED_LEN);
        self.encode(&mut buf);
        buf
    }

    /// Decodes a rect written by encode.
    pub fn decode(data: &[u8]) -> S2Result<Rect> {
        let mut d = Decoder::new(data);
        Rect::decode_from(&mut d)
    }

    pub(crate) fn decode_from(d: &mut Decoder) -> S2Result<Rect> {
        if d.remaining() < ENCODED_LEN {
            debug!(available = d.remaining(), "rect decode: truncated input");
            return Err(S2Error::Decode(format!(
                "rect needs {} bytes, {} available",
                ENCODED_LEN,
                d.remaining()
            )));
        }
        let version = d.get_u8("rect version")?;
        if version != ENCODING_VERSION {
            debug!(version, "rect decode: unknown version");
            return Err(S2Error::Decode(format!(
                "unknown rect encoding version {}",
                version
            )));
        }
        let lat_lo = d.get_f64("rect lat lo")?;
        let lat_hi = d.get_f64("rect lat hi")?;
        let lng_lo = d.get_f64("rect lng lo")?;
        let lng_hi = d.get_f64("rect lng hi")?;
        let r = Rect {
            lat: R1Interval::new(lat_lo, lat_hi),
            lng: S1Interval::new(lng_lo, lng_hi),
        };
        if !r.is_valid() {
            debug!(rect = %r, "rect decode: invalid rect");
            return Err(S2Error::Decode(format!("invalid rect {}", r)));
        }
        Ok(r)
    }
}

/// Returns the directed Hausdorff distance from a meridian edge spanning
/// latitudes a to a meridian edge spanning latitudes b, the two separated
/// by lng_diff in longitude.
///
/// Place a at longitude 0 and b at longitude lng_diff. On the hemisphere
/// containing a and bounded by b's meridian, the Voronoi diagram of b has
/// three edges meeting at b_lo x b_hi. When lng_diff <= π/2 the meridian of
/// a crosses all three regions and the maximum is attained at an endpoint of
/// a or where a crosses the equator (if b also does). Otherwise it crosses
/// two regions and the maximum is attained at an endpoint of a, where a
/// crosses the bisector of b, or at an interior farthest point on either
/// side of that crossing.
fn directed_hausdorff_lat(lng_diff: f64, a: &R1Interval, b: &R1Interval) -> Angle {
    debug_assert!((0. ..=PI).contains(&lng_diff));

    if lng_diff == 0. {
        return Angle(a.directed_hausdorff_distance(b));
    }

    let b_lng = Angle(lng_diff);
    let b_lo = Point::from(LatLng::new(Angle(b.lo), b_lng));
    let b_hi = Point::from(LatLng::new(Angle(b.hi), b_lng));

    // Endpoints of a.
    let a_lo = Point::from(LatLng::new(Angle(a.lo), Angle(0.)));
    let a_hi = Point::from(LatLng::new(Angle(a.hi), Angle(0.)));
    let mut max_distance = distance_from_segment(&a_lo, &b_lo, &b_hi)
        .max(distance_from_segment(&a_hi, &b_lo, &b_hi));

    if lng_diff <= FRAC_PI_2 {
        // Equator crossing.
        if a.contains(0.) && b.contains(0.) {
            max_distance = max_distance.max(Angle(lng_diff));
        }
        return max_distance;
    }

    // Bisector crossing.
    let p = bisector_intersection(b, lng_diff);
    let p_lat = latitude(&p).0;
    if a.contains(p_lat) {
        max_distance = max_distance.max(p.distance(&b_lo));
    }

    // Interior maxima below and above the bisector.
    if p_lat > a.lo {
        let below = R1Interval::new(a.lo, p_lat.min(a.hi));
        if let Some(d) = interior_max_distance(&below, &b_lo) {
            max_distance = max_distance.max(d);
        }
    }
    if p_lat < a.hi {
        let above = R1Interval::new(p_lat.max(a.lo), a.hi);
        if let Some(d) = interior_max_distance(&above, &b_hi) {
            max_distance = max_distance.max(d);
        }
    }
    max_distance
}

/// Returns the intersection of longitude 0 with the bisector of a meridian
/// edge at longitude lng spanning latitudes lat.
fn bisector_intersection(lat: &R1Interval, lng: f64) -> Point {
    let lng = lng.abs();
    let lat_center = lat.center();
    // A vector orthogonal to the bisector of the edge.
    let ortho_bisector = if lat_center >= 0. {
        LatLng::new(Angle(lat_center - FRAC_PI_2), Angle(lng))
    } else {
        LatLng::new(Angle(-lat_center - FRAC_PI_2), Angle(lng - PI))
    };
    // A vector orthogonal to longitude 0.
    let ortho_lng = Point(Vector::new(0., -1., 0.));
    point_cross(&ortho_lng, &Point::from(ortho_bisector))
}

/// Returns the maximum distance from b to the segment of longitude 0
/// spanning latitudes a_lat, if that maximum is attained strictly inside
/// the segment.
fn interior_max_distance(a_lat: &R1Interval, b: &Point) -> Option<Angle> {
    // Longitude 0 lies in the y=0 plane; if b.x >= 0 the maximum is at an
    // endpoint.
    if a_lat.is_empty() || b.0.x >= 0. {
        return None;
    }
    // The farthest point from b on the meridian plane is the antipode of
    // b's normalized projection onto it.
    let farthest = Point(Vector::new(-b.0.x, 0., -b.0.z).normalize());
    if a_lat.interior_contains(latitude(&farthest).0) {
        Some(b.distance(&farthest))
    } else {
        None
    }
}

impl Region for Rect {
    /// Returns the smaller of a cap centered on the nearer pole and a cap
    /// centered on the rect itself.
    fn cap_bound(&self) -> Cap {
        if self.is_empty() {
            return Cap::empty();
        }

        let (pole_z, pole_angle) = if self.lat.lo + self.lat.hi < 0. {
            (-1., FRAC_PI_2 + self.lat.hi)
        } else {
            (1., FRAC_PI_2 - self.lat.lo)
        };
        let pole_cap = Cap::from_center_angle(&Point(Vector::new(0., 0., pole_z)), Angle(pole_angle));

        // For rects spanning at most 180 degrees of longitude the widest
        // point of a centered cap is at a vertex. Larger rects always use the
        // pole cap.
        let lng_span = self.lng.hi - self.lng.lo;
        if remainder(lng_span, 2. * PI) >= 0. && lng_span < 2. * PI {
            let mut mid_cap = Cap::from_point(&Point::from(self.center()));
            for k in 0..4 {
                mid_cap.add_point(&Point::from(self.vertex(k)));
            }
            if mid_cap.height() < pole_cap.height() {
                return mid_cap;
            }
        }
        pole_cap
    }

    fn rect_bound(&self) -> Rect {
        *self
    }

    fn contains_point(&self, p: &Point) -> bool {
        self.contains_latlng(&LatLng::from(p))
    }
}
