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

//! Cell size metrics. A metric relates a level in the cell hierarchy to a
//! length (dim 1) or an area (dim 2) for cells at that level, in units of
//! radians or steradians.

use crate::s2::stuv::MAX_LEVEL;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Metric {
    /// Dimension of the metric: 1 for lengths, 2 for areas.
    pub dim: u8,
    /// The scaling factor for the metric.
    pub deriv: f64,
}

/// Average edge length of cells, in radians, for the quadratic projection.
pub const AVG_EDGE_METRIC: Metric = Metric::new(1, 1.459213746386106062);

/// Average diagonal length of cells.
pub const AVG_DIAG_METRIC: Metric = Metric::new(1, 2.060422738998471683);

/// Average area of cells, in steradians.
pub const AVG_AREA_METRIC: Metric = Metric::new(2, 4. * std::f64::consts::PI / 6.);

impl Metric {
    pub const fn new(dim: u8, deriv: f64) -> Metric {
        Metric { dim, deriv }
    }

    /// Returns the value of the metric at the given level.
    pub fn value(&self, level: u64) -> f64 {
        libm::ldexp(self.deriv, -(self.dim as i32) * level as i32)
    }

    /// Returns the minimum level such that the metric is at most the given
    /// value, or MAX_LEVEL if there is no such level.
    pub fn min_level(&self, val: f64) -> u64 {
        if val <= 0. || !val.is_finite() {
            return if val.is_infinite() { 0 } else { MAX_LEVEL };
        }
        let level = -(libm::ilogb(val / self.deriv) >> (self.dim - 1));
        level.clamp(0, MAX_LEVEL as i32) as u64
    }

    /// Returns the maximum level such that the metric is at least the given
    /// value, or 0 if there is no such level.
    pub fn max_level(&self, val: f64) -> u64 {
        if val <= 0. {
            return MAX_LEVEL;
        }
        if !val.is_finite() {
            return 0;
        }
        let level = libm::ilogb(self.deriv / val) >> (self.dim - 1);
        level.clamp(0, MAX_LEVEL as i32) as u64
    }
}
