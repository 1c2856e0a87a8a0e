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

use crate::consts::DBL_EPSILON;
use crate::r1::interval::Interval as R1Interval;
use crate::r3::vector::Vector;
use crate::s1::angle::Angle;
use crate::s1::interval::Interval as S1Interval;
use crate::s2::latlng::LatLng;
use crate::s2::point::Point;
use crate::s2::rect::Rect;

const Z_AXIS: Vector = Vector::new(0., 0., 1.);

#[derive(Clone, Copy, Debug)]
struct Vertex {
    point: Point,
    ll: LatLng,
}

/// RectBounder computes a bounding rectangle that contains all edges of a
/// vertex chain (v0, v1, v2, ...). All vertices must be unit length. The
/// bound of an edge can be larger than the bound of its endpoints, for
/// example when the edge passes through a pole.
///
/// The bound is conservative with respect to the error of converting points
/// to LatLngs: if L is a closed chain whose interior contains neither pole
/// and L contains P, then the bound of L contains LatLng::from(P).
#[derive(Clone, Debug)]
pub struct RectBounder {
    // Previous vertex in the chain.
    a: Option<Vertex>,
    bound: Rect,
}

impl Default for RectBounder {
    fn default() -> Self {
        Self::new()
    }
}

impl RectBounder {
    pub fn new() -> Self {
        RectBounder {
            a: None,
            bound: Rect::empty(),
        }
    }

    /// Adds the given point to the chain. The point must be unit length.
    pub fn add_point(&mut self, b: &Point) {
        debug_assert!(b.is_unit());
        let b_ll = LatLng::from(b);

        if let Some(a) = self.a {
            self.add_edge(&a, b, &b_ll);
        } else {
            self.bound = self.bound.add_point(&b_ll);
        }

        self.a = Some(Vertex {
            point: *b,
            ll: b_ll,
        });
    }

    fn add_edge(&mut self, a: &Vertex, b: &Point, b_ll: &LatLng) {
        // N = 2 * (A x B), computed so that it is exactly zero when A and B
        // are equal or antipodal.
        let n = (a.point.0 - b.0).cross(&(a.point.0 + b.0));

        // The error in N grows as its norm shrinks. Below this norm the
        // directional error exceeds 3.84 * DBL_EPSILON and we fall back.
        let n_norm = n.norm();
        if n_norm < 1.91346e-15 {
            if a.point.dot(b) < 0. {
                // Nearly antipodal: the edge could go anywhere.
                self.bound = Rect::full();
            } else {
                // Nearly identical: the endpoint bound suffices after the
                // expansion done in bound().
                self.bound = self.bound.union(&Rect::from_point_pair(&a.ll, b_ll));
            }
            return;
        }

        let mut lng_ab = S1Interval::from_point_pair(a.ll.lng.rad(), b_ll.lng.rad());
        if lng_ab.len() >= PI - 2. * DBL_EPSILON {
            // Nearly opposite meridians: AB could pass either side of a pole.
            lng_ab = S1Interval::full();
        }

        let mut lat_ab = R1Interval::from_point_pair(a.ll.lat.rad(), b_ll.lat.rad());

        // The great circle through AB attains its extreme latitudes where it
        // crosses the plane through N and the z-axis. M is normal to that
        // plane; AB crosses it iff A and B project to opposite signs on M.
        let m = n.cross(&Z_AXIS);
        let m_a = m.dot(&a.point.0);
        let m_b = m.dot(&b.0);

        // Bound on the error of m_a and m_b.
        let m_error = 6.06638e-16 * n_norm + 6.83174e-31;
        if m_a * m_b < 0. || m_a.abs() <= m_error || m_b.abs() <= m_error {
            // The extreme latitude may lie in the edge interior. It is 90
            // degrees minus the latitude of N, padded by 3 * DBL_EPSILON; bound()
            // adds the remaining 2 * DBL_EPSILON.
            let max_lat = ((n.x * n.x + n.y * n.y).sqrt().atan2(n.z.abs()) + 3. * DBL_EPSILON)
                .min(FRAC_PI_2);

            // For nearby endpoints, bound the excursion by the latitude change
            // budget of an arc of length |AB|.
            let lat_budget_z = 0.5 * (a.point.0 - b.0).norm() * max_lat.sin();
            let lat_budget = 2. * ((1. + 4. * DBL_EPSILON) * lat_budget_z).min(1.).asin();
            let max_delta = 0.5 * (lat_budget - lat_ab.len()) + DBL_EPSILON;

            if m_a <= m_error && m_b >= -m_error {
                lat_ab.hi = max_lat.min(lat_ab.hi + max_delta);
            }
            if m_b <= m_error && m_a >= -m_error {
                lat_ab.lo = (-max_lat).max(lat_ab.lo - max_delta);
            }
        }
        self.bound = self.bound.union(&Rect::new(lat_ab, lng_ab));
    }

    /// Returns the bounding rectangle of the edge chain so far.
    ///
    /// Latitudes computed from points have up to 0.955 * DBL_EPSILON of
    /// error in either direction, so the latitude range is padded by
    /// 2 * DBL_EPSILON. Longitudes are correctly rounded by atan2 and need no
    /// padding.
    pub fn bound(&self) -> Rect {
        let expansion = LatLng::new(Angle(2. * DBL_EPSILON), Angle(0.));
        self.bound.expanded(&expansion).polar_closure()
    }
}

/// Expands a bound returned by RectBounder::bound so that it contains the
/// bound of any subregion computed the same way. If L is a loop containing
/// neither pole and L contains S, then expand_for_subregions(bound(L))
/// contains bound(S), which rounding alone does not guarantee.
pub fn expand_for_subregions(bound: &Rect) -> Rect {
    if bound.is_empty() {
        return *bound;
    }

    // If the bound contains points within 4.309 * DBL_EPSILON of being
    // antipodal, a subregion edge between them could have a full bound.
    // Test the distance between the bound and its reflection through the
    // origin.

    // Lower bound on the longitude gap between the bound and its reflection.
    let lng_gap = 0f64.max(PI - bound.lng.len() - 2.5 * DBL_EPSILON);

    // Distance to the equator; non-positive if the bound straddles it.
    let min_abs_lat = bound.lat.lo.max(-bound.lat.hi);

    let lat_gap_south = FRAC_PI_2 + bound.lat.lo;
    let lat_gap_north = FRAC_PI_2 - bound.lat.hi;

    if min_abs_lat >= 0. {
        // One hemisphere: the nearest pair is the latitude edge nearest the
        // equator and its reflection. Using (x + y) / sqrt(2) as a lower
        // bound on the Euclidean distance gives the threshold.
        if 2. * min_abs_lat + lng_gap < 1.354e-15 {
            return Rect::full();
        }
    } else if lng_gap >= FRAC_PI_2 {
        // Straddles the equator and spans at most π/2 in longitude: the
        // nearest pair is a corner and its diagonal reflection.
        if lat_gap_south + lat_gap_north < 1.687e-15 {
            return Rect::full();
        }
    } else {
        // Straddles the equator and spans more than π/2: bound the
        // corner-to-opposite-edge distance with the spherical law of sines.
        if lat_gap_south.max(lat_gap_north) * lng_gap < 1.765e-15 {
            return Rect::full();
        }
    }

    // The latitude error of add_point is at most 4.8 * DBL_EPSILON per
    // bound, and the two may err in opposite directions. A subregion edge
    // spanning π - 2 * DBL_EPSILON in longitude gets a full longitude bound.
    let lat_expansion = 9. * DBL_EPSILON;
    let lng_expansion = if lng_gap <= 0. { PI } else { 0. };
    bound
        .expanded(&LatLng::new(Angle(lat_expansion), Angle(lng_expansion)))
        .polar_closure()
}
