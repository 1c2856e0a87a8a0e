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

//! Spherical geometry on the unit sphere: hierarchical cell ids, a point
//! index ordered by cell id, latitude/longitude rectangles and simple loops.

#[macro_use]
extern crate lazy_static;

#[macro_use]
pub mod consts;

pub mod r1;
pub mod r2;
pub mod r3;
pub mod s1;

pub mod s2;
pub use crate::s2::*;
