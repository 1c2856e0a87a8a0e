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


mod stuv;

pub mod cellid;

pub mod cap;
pub mod latlng;
pub mod point;
pub mod rect;
pub mod rect_bounder;

pub mod region;

pub mod metric;
pub mod predicates;

pub mod config;
pub mod error;
pub mod point_index;
pub mod shape;

pub mod r#loop;

pub mod crossing_edge_query;
mod edge_clipping;
pub mod edge_crosser;
pub mod edge_crossings;
pub mod edge_distance;
pub(crate) mod encoding;
#[cfg(test)]
mod random;
pub mod shape_index;
