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

use thiserror::Error;

/// Describes the first invariant a loop violates, with the offending
/// vertex or edge indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum LoopValidationError {
    /// Vertex is not unit length.
    #[error("vertex {index} is not unit length")]
    NotUnitLength { index: usize },

    /// Loop has fewer than 3 vertices and is not the empty or full loop.
    #[error("non-empty, non-full loops must have at least 3 vertices (got {count})")]
    NotEnoughVertices { count: usize },

    /// Edge (index, index+1) is degenerate.
    #[error("edge {index} is degenerate (duplicate vertex)")]
    DuplicateVertex { index: usize },

    /// Two adjacent vertices are antipodal.
    #[error("vertices {first} and {second} are antipodal")]
    AntipodalVertices { first: usize, second: usize },

    /// Two non-adjacent edges share a vertex.
    #[error("edges {first} and {second} share a vertex")]
    SharedVertex { first: usize, second: usize },

    /// Two edges cross.
    #[error("edges {first} and {second} cross")]
    SelfIntersection { first: usize, second: usize },
}

/// S2Error represents errors that can occur in S2 operations
#[derive(Debug, Clone, PartialEq, Error)]
pub enum S2Error {
    /// Invalid loop (e.g., self-intersection)
    #[error("invalid loop: {0}")]
    InvalidLoop(#[from] LoopValidationError),

    /// Invalid argument provided to a function
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Malformed or truncated encoded data
    #[error("decode error: {0}")]
    Decode(String),
}

/// Result type for S2 operations
pub type S2Result<T> = Result<T, S2Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = S2Error::from(LoopValidationError::SelfIntersection { first: 2, second: 7 });
        assert_eq!(format!("{err}"), "invalid loop: edges 2 and 7 cross");

        let err = S2Error::Decode("truncated input".into());
        assert!(format!("{err}").contains("truncated"));

        let err = LoopValidationError::NotEnoughVertices { count: 2 };
        assert!(format!("{err}").contains("got 2"));
    }
}
