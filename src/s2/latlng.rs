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
use std::ops::{Add, Mul, Sub};

use crate::consts::{remainder, EPSILON};
use crate::r3::vector::Vector;
use crate::s1::angle::{Angle, Deg};
use crate::s2::point::Point;

/// LatLng represents a point on the unit sphere as a pair of angles.
#[derive(Clone, Copy, PartialEq, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LatLng {
    pub lat: Angle,
    pub lng: Angle,
}

impl fmt::Display for LatLng {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "[{:.7}, {:.7}]", self.lat.deg(), self.lng.deg())
    }
}

impl LatLng {
    pub fn new(lat: Angle, lng: Angle) -> Self {
        LatLng { lat, lng }
    }

    pub fn from_degrees(lat: f64, lng: f64) -> Self {
        LatLng {
            lat: Deg(lat).into(),
            lng: Deg(lng).into(),
        }
    }

    /// Returns true iff the LatLng is normalized, with lat ∈ [-π/2,π/2]
    /// and lng ∈ [-π,π].
    pub fn is_valid(&self) -> bool {
        self.lat.0.abs() <= FRAC_PI_2 && self.lng.0.abs() <= PI
    }

    /// Returns the normalized version of the LatLng, with lat clamped to
    /// [-π/2,π/2] and lng wrapped in [-π,π].
    pub fn normalized(&self) -> LatLng {
        let lat = self.lat.0.max(-FRAC_PI_2).min(FRAC_PI_2);
        let lng = remainder(self.lng.0, 2. * PI);
        LatLng {
            lat: Angle(lat),
            lng: Angle(lng),
        }
    }

    /// Returns the angle between two LatLngs, computed with the haversine
    /// formula.
    pub fn distance(&self, other: &LatLng) -> Angle {
        let (lat1, lat2) = (self.lat.0, other.lat.0);
        let (lng1, lng2) = (self.lng.0, other.lng.0);
        let dlat = (0.5 * (lat2 - lat1)).sin();
        let dlng = (0.5 * (lng2 - lng1)).sin();
        let x = dlat * dlat + dlng * dlng * lat1.cos() * lat2.cos();
        Angle(2. * x.sqrt().atan2(0f64.max(1. - x).sqrt()))
    }

    /// Reports whether the latitude and longitude of the two LatLngs are
    /// the same up to a small tolerance.
    pub fn approx_eq(&self, other: &LatLng) -> bool {
        (self.lat.0 - other.lat.0).abs() < EPSILON && (self.lng.0 - other.lng.0).abs() < EPSILON
    }
}

/// Returns the latitude of the given point.
pub fn latitude(p: &Point) -> Angle {
    let v = &p.0;
    Angle(v.z.atan2((v.x * v.x + v.y * v.y).sqrt()))
}

/// Returns the longitude of the given point.
pub fn longitude(p: &Point) -> Angle {
    Angle(p.0.y.atan2(p.0.x))
}

impl From<&Point> for LatLng {
    fn from(p: &Point) -> Self {
        LatLng {
            lat: latitude(p),
            lng: longitude(p),
        }
    }
}

impl From<Point> for LatLng {
    fn from(p: Point) -> Self {
        LatLng::from(&p)
    }
}

impl From<&LatLng> for Point {
    fn from(ll: &LatLng) -> Self {
        let phi = ll.lat.0;
        let theta = ll.lng.0;
        let cosphi = phi.cos();
        Point(Vector::new(theta.cos() * cosphi, theta.sin() * cosphi, phi.sin()))
    }
}

impl From<LatLng> for Point {
    fn from(ll: LatLng) -> Self {
        Point::from(&ll)
    }
}

impl Add for LatLng {
    type Output = LatLng;
    fn add(self, other: LatLng) -> LatLng {
        LatLng::new(self.lat + other.lat, self.lng + other.lng)
    }
}

impl Sub for LatLng {
    type Output = LatLng;
    fn sub(self, other: LatLng) -> LatLng {
        LatLng::new(self.lat - other.lat, self.lng - other.lng)
    }
}

impl Mul<f64> for LatLng {
    type Output = LatLng;
    fn mul(self, m: f64) -> LatLng {
        LatLng::new(self.lat * m, self.lng * m)
    }
}
