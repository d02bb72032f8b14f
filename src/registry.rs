//
// Copyright 2022-Present (c) Raja Lehtihet & Wael El Oraiby
//
// Redistribution and use in source and binary forms, with or without
// modification, are permitted provided that the following conditions are met:
//
// 1. Redistributions of source code must retain the above copyright notice,
// this list of conditions and the following disclaimer.
//
// 2. Redistributions in binary form must reproduce the above copyright notice,
// this list of conditions and the following disclaimer in the documentation
// and/or other materials provided with the distribution.
//
// 3. Neither the name of the copyright holder nor the names of its contributors
// may be used to endorse or promote products derived from this software without
// specific prior written permission.
//
// THIS SOFTWARE IS PROVIDED BY THE COPYRIGHT HOLDERS AND CONTRIBUTORS "AS IS"
// AND ANY EXPRESS OR IMPLIED WARRANTIES, INCLUDING, BUT NOT LIMITED TO, THE
// IMPLIED WARRANTIES OF MERCHANTABILITY AND FITNESS FOR A PARTICULAR PURPOSE
// ARE DISCLAIMED. IN NO EVENT SHALL THE COPYRIGHT HOLDER OR CONTRIBUTORS BE
// LIABLE FOR ANY DIRECT, INDIRECT, INCIDENTAL, SPECIAL, EXEMPLARY, OR
// CONSEQUENTIAL DAMAGES (INCLUDING, BUT NOT LIMITED TO, PROCUREMENT OF
// SUBSTITUTE GOODS OR SERVICES; LOSS OF USE, DATA, OR PROFITS; OR BUSINESS
// INTERRUPTION) HOWEVER CAUSED AND ON ANY THEORY OF LIABILITY, WHETHER IN
// CONTRACT, STRICT LIABILITY, OR TORT (INCLUDING NEGLIGENCE OR OTHERWISE)
// ARISING IN ANY WAY OUT OF THE USE OF THIS SOFTWARE, EVEN IF ADVISED OF THE
// POSSIBILITY OF SUCH DAMAGE.
//
// -----------------------------------------------------------------------------
// Ported to rust from https://github.com/rxi/microui/ and the original license
//
// Copyright (c) 2020 rxi
//
// Permission is hereby granted, free of charge, to any person obtaining a copy
// of this software and associated documentation files (the "Software"), to
// deal in the Software without restriction, including without limitation the
// rights to use, copy, modify, merge, publish, distribute, sublicense, and/or
// sell copies of the Software, and to permit persons to whom the Software is
// furnished to do so, subject to the following conditions:
//
// The above copyright notice and this permission notice shall be included in
// all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
// IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
// FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
// AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
// LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING
// FROM, OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS
// IN THE SOFTWARE.
//
//! Frame-stamped object pool used for container records.

use std::collections::HashMap;
use std::fmt::Display;
use std::hash::Hash;

use tracing::{debug, trace};

#[derive(Clone)]
struct PoolItem<PO> {
    object: PO,
    frame: usize,
}

#[derive(Clone)]
pub(crate) struct Pool<ID, PO> {
    items: HashMap<ID, PoolItem<PO>>,
    gc_ids: Vec<ID>,
}

impl<ID, PO> Default for Pool<ID, PO> {
    fn default() -> Self { Self { items: HashMap::default(), gc_ids: Vec::new() } }
}

impl<ID: Eq + Hash + Copy + Display, PO> Pool<ID, PO> {
    /// Stores `object` unless `id` already exists. Returns `true` when a new record was created.
    pub(crate) fn insert(&mut self, id: ID, object: PO, frame: usize) -> bool {
        match self.items.get_mut(&id) {
            Some(v) => {
                v.frame = frame;
                false
            }
            None => {
                debug!(%id, frame, "pool object created");
                self.items.insert(id, PoolItem { object, frame });
                true
            }
        }
    }

    pub(crate) fn contains(&self, id: ID) -> bool { self.items.contains_key(&id) }

    pub(crate) fn get(&self, id: ID) -> Option<&PO> { self.items.get(&id).map(|pi| &pi.object) }

    pub(crate) fn get_mut(&mut self, id: ID) -> Option<&mut PO> { self.items.get_mut(&id).map(|po| &mut po.object) }

    pub(crate) fn touch(&mut self, id: ID, frame: usize) {
        if let Some(item) = self.items.get_mut(&id) {
            item.frame = frame;
        }
    }

    pub(crate) fn last_frame(&self, id: ID) -> Option<usize> { self.items.get(&id).map(|pi| pi.frame) }

    pub(crate) fn len(&self) -> usize { self.items.len() }

    pub(crate) fn values(&self) -> impl Iterator<Item = &PO> { self.items.values().map(|pi| &pi.object) }

    pub(crate) fn values_mut(&mut self) -> impl Iterator<Item = &mut PO> { self.items.values_mut().map(|pi| &mut pi.object) }

    /// Drops objects untouched for more than `max_age` frames unless `keep` vetoes it. Returns how many went.
    pub(crate) fn gc(&mut self, current_frame: usize, max_age: usize, keep: impl Fn(&ID, &PO) -> bool) -> usize {
        self.gc_ids.clear();
        for (id, item) in &self.items {
            if current_frame.saturating_sub(item.frame) > max_age && !keep(id, &item.object) {
                self.gc_ids.push(*id);
            }
        }

        for gid in &self.gc_ids {
            trace!(id = %gid, "pool object collected");
            self.items.remove(gid);
        }
        self.gc_ids.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_twice_keeps_first_object() {
        let mut pool: Pool<u32, &str> = Pool::default();
        assert!(pool.insert(1, "first", 0));
        assert!(!pool.insert(1, "second", 4));
        assert_eq!(pool.get(1), Some(&"first"));
        assert_eq!(pool.last_frame(1), Some(4));
    }

    #[test]
    fn gc_respects_age_and_veto() {
        let mut pool: Pool<u32, u32> = Pool::default();
        pool.insert(1, 10, 0);
        pool.insert(2, 20, 0);
        pool.insert(3, 30, 9);
        let removed = pool.gc(10, 5, |id, _| *id == 2);
        assert_eq!(removed, 1);
        assert!(!pool.contains(1));
        assert!(pool.contains(2));
        assert!(pool.contains(3));
    }
}
