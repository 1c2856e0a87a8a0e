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

//! Little-endian helpers shared by the rect and loop binary encodings.

use crate::s2::error::{S2Error, S2Result};

pub(crate) fn put_u8(buf: &mut Vec<u8>, v: u8) {
    buf.push(v);
}

pub(crate) fn put_u32(buf: &mut Vec<u8>, v: u32) {
    buf.extend_from_slice(&v.to_le_bytes());
}

pub(crate) fn put_i32(buf: &mut Vec<u8>, v: i32) {
    buf.extend_from_slice(&v.to_le_bytes());
}

pub(crate) fn put_f64(buf: &mut Vec<u8>, v: f64) {
    buf.extend_from_slice(&v.to_le_bytes());
}

/// A read cursor over an encoded byte slice. Every getter fails with
/// `S2Error::Decode` instead of reading past the end.
#[derive(Debug, Clone)]
pub(crate) struct Decoder<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Decoder<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Decoder { data, pos: 0 }
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    fn take<const N: usize>(&mut self, what: &str) -> S2Result<[u8; N]> {
        if self.remaining() < N {
            return Err(S2Error::Decode(format!(
                "truncated input reading {} at offset {}",
                what, self.pos
            )));
        }
        let mut out = [0u8; N];
        out.copy_from_slice(&self.data[self.pos..self.pos + N]);
        self.pos += N;
        Ok(out)
    }

    /// Returns the next `len` bytes without copying them.
    pub fn slice(&mut self, len: usize, what: &str) -> S2Result<&'a [u8]> {
        if self.remaining() < len {
            return Err(S2Error::Decode(format!(
                "truncated input reading {} at offset {}",
                what, self.pos
            )));
        }
        let out = &self.data[self.pos..self.pos + len];
        self.pos += len;
        Ok(out)
    }

    pub fn get_u8(&mut self, what: &str) -> S2Result<u8> {
        Ok(self.take::<1>(what)?[0])
    }

    pub fn get_u32(&mut self, what: &str) -> S2Result<u32> {
        Ok(u32::from_le_bytes(self.take(what)?))
    }

    pub fn get_i32(&mut self, what: &str) -> S2Result<i32> {
        Ok(i32::from_le_bytes(self.take(what)?))
    }

    pub fn get_f64(&mut self, what: &str) -> S2Result<f64> {
        Ok(f64::from_le_bytes(self.take(what)?))
    }
}

/// Reads a little-endian f64 at byte offset `at`. The caller guarantees
/// the slice is long enough.
pub(crate) fn f64_at(data: &[u8], at: usize) -> f64 {
    let mut b = [0u8; 8];
    b.copy_from_slice(&data[at..at + 8]);
    f64::from_le_bytes(b)
}
