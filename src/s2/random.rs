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

//! Random geometry for tests. Each test thread gets its own generator with a
//! fixed seed so failures are reproducible.

use std::cell::RefCell;
use std::f64::consts::PI;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::r3::vector::Vector;
use crate::s1::interval::Interval as S1Interval;
use crate::r1::interval::Interval as R1Interval;
use crate::s2::cellid::CellID;
use crate::s2::point::Point;
use crate::s2::rect::Rect;
use crate::s2::stuv::{NUM_FACES, POS_BITS};

thread_local! {
    static RNG: RefCell<StdRng> = RefCell::new(StdRng::seed_from_u64(0x5eed_2017));
}

/// Runs f with this thread's generator.
pub fn rng<R>(f: impl FnOnce(&mut StdRng) -> R) -> R {
    RNG.with(|r| f(&mut r.borrow_mut()))
}

/// Returns a uniformly distributed value in [lo, hi).
pub fn uniform_float(lo: f64, hi: f64) -> f64 {
    rng(|r| r.gen_range(lo..hi))
}

/// Returns a uniformly distributed integer in [lo, hi).
pub fn uniform_int(lo: i64, hi: i64) -> i64 {
    rng(|r| r.gen_range(lo..hi))
}

/// Returns true with probability 1/n.
pub fn one_in(n: u32) -> bool {
    rng(|r| r.gen_range(0..n) == 0)
}

/// Returns a random unit-length point.
pub fn point() -> Point {
    Point::from_coords(
        uniform_float(-1., 1.),
        uniform_float(-1., 1.),
        uniform_float(-1., 1.),
    )
}

/// Returns a random cell id at the given level. The distribution is uniform
/// over the space of cell ids, but only approximately uniform over the
/// surface of the sphere.
pub fn cell_id_for_level(level: u64) -> CellID {
    let face = uniform_int(0, NUM_FACES as i64) as u64;
    let pos = rng(|r| r.gen::<u64>()) & ((1u64 << POS_BITS) - 1);
    CellID::from_face_pos_level(face, pos, level)
}

/// Returns a random cell id at a random level.
pub fn cell_id() -> CellID {
    cell_id_for_level(uniform_int(0, 31) as u64)
}

/// Returns a random non-empty rect whose longitude interval may wrap
/// through ±180.
pub fn rect() -> Rect {
    let lat = R1Interval::from_point_pair(
        uniform_float(-PI / 2., PI / 2.),
        uniform_float(-PI / 2., PI / 2.),
    );
    let lng = S1Interval::from_point_pair(uniform_float(-PI, PI), uniform_float(-PI, PI));
    Rect::new(lat, lng)
}

/// Returns a point nearly at distance r from the given center, used to
/// build small perturbed inputs.
pub fn point_near(center: &Point, r: f64) -> Point {
    let v = Vector::new(
        uniform_float(-r, r),
        uniform_float(-r, r),
        uniform_float(-r, r),
    );
    Point((center.0 + v).normalize())
}
