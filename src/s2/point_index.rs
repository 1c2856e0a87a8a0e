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

use std::collections::BTreeMap;
use std::ops::Bound::{Excluded, Included, Unbounded};

use crate::s2::cellid::CellID;
use crate::s2::point::Point;

// Entries are keyed by leaf cell and then by insertion sequence, so equal
// cells keep their insertion order.
type Key = (CellID, u64);

/// PointIndex maintains a set of points with associated data, ordered by
/// the leaf cell containing each point. It is a multiset: the same
/// (point, data) pair may be added several times.
///
/// ```ignore
/// let mut index = PointIndex::new();
/// index.add(p, "a");
/// let mut it = index.iter();
/// it.seek(CellID::from_face(2));
/// while !it.done() {
///     println!("{:?} {}", it.point(), it.data());
///     it.next();
/// }
/// ```
#[derive(Clone, Debug)]
pub struct PointIndex<T> {
    entries: BTreeMap<Key, (Point, T)>,
    next_seq: u64,
}

impl<T> Default for PointIndex<T> {
    fn default() -> Self {
        PointIndex {
            entries: BTreeMap::new(),
            next_seq: 0,
        }
    }
}

impl<T> PointIndex<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds the given point and data to the index.
    pub fn add(&mut self, point: Point, data: T) {
        let key = (CellID::from_point(&point), self.next_seq);
        self.next_seq += 1;
        self.entries.insert(key, (point, data));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Returns an iterator positioned at the first entry.
    pub fn iter(&self) -> PointIndexIterator<'_, T> {
        let mut it = PointIndexIterator {
            entries: &self.entries,
            pos: None,
        };
        it.begin();
        it
    }
}

impl<T: PartialEq> PointIndex<T> {
    /// Removes one entry equal to the given point and data, the earliest
    /// added if there are several. Returns false if there is none.
    pub fn remove(&mut self, point: &Point, data: &T) -> bool {
        let id = CellID::from_point(point);
        let key = self
            .entries
            .range((id, 0)..=(id, u64::MAX))
            .find(|(_, (p, d))| p == point && d == data)
            .map(|(k, _)| *k);
        match key {
            Some(k) => self.entries.remove(&k).is_some(),
            None => false,
        }
    }
}

/// PointIndexIterator is a cursor over the entries of a PointIndex, in
/// increasing cell order. Positions run from the first entry to one past
/// the last (the done state).
#[derive(Debug)]
pub struct PointIndexIterator<'a, T> {
    entries: &'a BTreeMap<Key, (Point, T)>,
    // None once the cursor is done.
    pos: Option<Key>,
}

impl<'a, T> Clone for PointIndexIterator<'a, T> {
    fn clone(&self) -> Self {
        PointIndexIterator {
            entries: self.entries,
            pos: self.pos,
        }
    }
}

impl<'a, T> PointIndexIterator<'a, T> {
    /// Positions the iterator at the first entry, or done if there are none.
    pub fn begin(&mut self) {
        self.pos = self.entries.keys().next().copied();
    }

    /// Positions the iterator past the last entry.
    pub fn finish(&mut self) {
        self.pos = None;
    }

    /// Advances to the next entry. Calling next when done has no effect.
    pub fn next(&mut self) {
        if let Some(key) = self.pos {
            self.pos = self
                .entries
                .range((Excluded(key), Unbounded))
                .next()
                .map(|(k, _)| *k);
        }
    }

    /// Moves to the previous entry and returns true, or returns false and
    /// leaves the iterator unchanged if there is none. From the done state
    /// this moves to the last entry.
    pub fn prev(&mut self) -> bool {
        let prev = match self.pos {
            Some(key) => self.entries.range(..key).next_back(),
            None => self.entries.iter().next_back(),
        };
        match prev {
            Some((k, _)) => {
                self.pos = Some(*k);
                true
            }
            None => false,
        }
    }

    /// Positions the iterator at the first entry whose cell id is at least
    /// target, or done if there is none.
    pub fn seek(&mut self, target: CellID) {
        self.pos = self
            .entries
            .range((Included((target, 0)), Unbounded))
            .next()
            .map(|(k, _)| *k);
    }

    pub fn done(&self) -> bool {
        self.pos.is_none()
    }

    /// Returns the (point, data) pair of the current entry, or None when
    /// done.
    pub fn current(&self) -> Option<&'a (Point, T)> {
        self.pos.and_then(|k| self.entries.get(&k))
    }

    /// Returns the leaf cell id of the current entry, or CellID::sentinel()
    /// when done.
    pub fn id(&self) -> CellID {
        self.pos.map_or(CellID::sentinel(), |(id, _)| id)
    }

    /// Returns the point of the current entry.
    ///
    /// # Panics
    ///
    /// Panics if the iterator is done; the same holds for data and
    /// point_data.
    pub fn point(&self) -> &'a Point {
        &self.point_data().0
    }

    /// Returns the data of the current entry.
    pub fn data(&self) -> &'a T {
        &self.point_data().1
    }

    /// Returns the (point, data) pair of the current entry.
    pub fn point_data(&self) -> &'a (Point, T) {
        match self.current() {
            Some(entry) => entry,
            None => panic!("PointIndexIterator accessed while done"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::s2::random;

    fn check_iterator_methods<T>(index: &PointIndex<T>) {
        let mut it = index.iter();
        assert!(!it.prev());
        it.finish();
        assert!(it.done());

        let mut prev_id = CellID::none();
        it.begin();
        while !it.done() {
            let id = it.id();
            assert_eq!(id, CellID::from_point(it.point()));
            assert!(prev_id <= id);

            // Seeking anywhere in the gap since the previous cell lands here,
            // on the first entry of this cell.
            let mut it2 = index.iter();
            if prev_id != id {
                let gap_start = if prev_id == CellID::none() {
                    CellID::begin(30)
                } else {
                    prev_id.next()
                };
                for target in [gap_start, id] {
                    it2.seek(target);
                    assert_eq!(it2.id(), id);
                }
            }

            if prev_id != CellID::none() {
                let mut it2 = it.clone();
                assert!(it2.prev());
                assert_eq!(it2.id(), prev_id);
                it2.next();
                assert_eq!(it2.id(), id);
                it2.seek(prev_id);
                assert_eq!(it2.id(), prev_id);
            }
            prev_id = id;
            it.next();
        }
    }

    #[test]
    fn test_no_points() {
        let index: PointIndex<i32> = PointIndex::new();
        assert!(index.is_empty());
        check_iterator_methods(&index);
        let mut it = index.iter();
        assert!(it.done());
        it.seek(CellID::from_face(0));
        assert!(it.done());
        assert_eq!(it.id(), CellID::sentinel());
    }

    #[test]
    fn test_random_points() {
        let mut index = PointIndex::new();
        let mut contents = Vec::new();
        for _ in 0..1000 {
            let p = random::point();
            let d = random::uniform_int(0, 100);
            index.add(p, d);
            contents.push((p, d));
        }
        assert_eq!(index.len(), 1000);
        check_iterator_methods(&index);

        // Every added pair is visited exactly once.
        let mut it = index.iter();
        let mut seen = 0;
        while !it.done() {
            let pos = contents.iter().position(|e| e == it.point_data()).unwrap();
            contents.swap_remove(pos);
            seen += 1;
            it.next();
        }
        assert_eq!(seen, 1000);
        assert!(contents.is_empty());
    }

    #[test]
    fn test_duplicates_and_remove() {
        let p = random::point();
        let q = random::point();
        let mut index = PointIndex::new();
        index.add(p, 1);
        index.add(p, 1);
        index.add(p, 2);
        index.add(q, 1);
        assert_eq!(index.len(), 4);

        // Ties keep insertion order.
        let mut it = index.iter();
        it.seek(CellID::from_point(&p));
        assert_eq!(*it.data(), 1);
        it.next();
        assert_eq!(*it.data(), 1);
        it.next();
        assert_eq!(*it.data(), 2);

        assert!(index.remove(&p, &1));
        assert_eq!(index.len(), 3);
        assert!(index.remove(&p, &1));
        assert!(!index.remove(&p, &1));
        assert!(!index.remove(&q, &7));
        assert_eq!(index.len(), 2);

        index.clear();
        assert!(index.is_empty());
        assert!(index.iter().done());
    }

    #[test]
    fn test_next_at_finish_is_idempotent() {
        let mut index = PointIndex::new();
        for i in 0..5 {
            index.add(random::point(), i);
        }
        let mut it = index.iter();
        for _ in 0..5 {
            it.next();
        }
        assert!(it.done());
        it.next();
        it.next();
        assert!(it.done());
        assert!(it.prev());
        let last = it.id();
        let mut it2 = index.iter();
        it2.finish();
        assert!(it2.prev());
        assert_eq!(it2.id(), last);
    }

    #[test]
    fn test_current() {
        let p = random::point();
        let mut index = PointIndex::new();
        assert!(index.iter().current().is_none());

        index.add(p, 'a');
        let mut it = index.iter();
        assert_eq!(it.current(), Some(&(p, 'a')));
        it.next();
        assert!(it.done());
        assert!(it.current().is_none());
    }

    #[test]
    fn test_interleaved_add_and_remove() {
        let mut index = PointIndex::new();
        let mut contents: Vec<(Point, i64)> = Vec::new();
        for _ in 0..2000 {
            if !contents.is_empty() && random::one_in(3) {
                let i = random::uniform_int(0, contents.len() as i64) as usize;
                let (p, d) = contents.swap_remove(i);
                assert!(index.remove(&p, &d));
            } else {
                let p = random::point();
                let d = random::uniform_int(0, 10);
                index.add(p, d);
                contents.push((p, d));
            }
            assert_eq!(index.len(), contents.len());
        }
        check_iterator_methods(&index);

        let mut ids: Vec<CellID> = contents.iter().map(|(p, _)| CellID::from_point(p)).collect();
        ids.sort();
        for _ in 0..200 {
            let target = random::cell_id();
            let want = ids
                .iter()
                .find(|&&id| id >= target)
                .copied()
                .unwrap_or_else(CellID::sentinel);
            let mut it = index.iter();
            it.seek(target);
            assert_eq!(it.id(), want);
        }
    }
}
