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

use crate::s2::error::{S2Error, S2Result};

/// Whether a loop checks its vertices when it is initialized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Validation {
    /// Construction fails with the first validation error found.
    #[default]
    Enabled,
    /// The caller vouches for the vertices.
    Disabled,
}

/// When a loop builds its private edge index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum IndexPolicy {
    /// Build the index once this many point containment queries have been
    /// answered by brute force.
    Lazy { max_unindexed_calls: u32 },
    /// Build the index as soon as the loop is initialized.
    Eager,
    /// Never build an index for point containment.
    Never,
}

impl Default for IndexPolicy {
    fn default() -> Self {
        IndexPolicy::Lazy {
            max_unindexed_calls: 20,
        }
    }
}

/// Tuning knobs of a Loop. None of them change query results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LoopOptions {
    pub validation: Validation,
    pub index_policy: IndexPolicy,
    /// Loops with at most this many vertices answer point containment by
    /// brute force.
    pub max_brute_force_vertices: usize,
}

impl Default for LoopOptions {
    fn default() -> Self {
        LoopOptions {
            validation: Validation::Enabled,
            index_policy: IndexPolicy::default(),
            max_brute_force_vertices: 32,
        }
    }
}

impl LoopOptions {
    pub fn with_validation(mut self, validation: Validation) -> Self {
        self.validation = validation;
        self
    }

    pub fn with_index_policy(mut self, index_policy: IndexPolicy) -> Self {
        self.index_policy = index_policy;
        self
    }

    pub fn with_max_brute_force_vertices(mut self, n: usize) -> Self {
        self.max_brute_force_vertices = n;
        self
    }

    /// Rejects settings that cannot be honored.
    pub fn validate(&self) -> S2Result<()> {
        if let IndexPolicy::Lazy {
            max_unindexed_calls: 0,
        } = self.index_policy
        {
            return Err(S2Error::InvalidArgument(
                "lazy index policy needs a positive call threshold; use Eager instead".into(),
            ));
        }
        if self.max_brute_force_vertices < 3 {
            return Err(S2Error::InvalidArgument(format!(
                "max_brute_force_vertices must be at least 3 (got {})",
                self.max_brute_force_vertices
            )));
        }
        Ok(())
    }
}
