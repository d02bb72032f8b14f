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
//! Hierarchical widget identity.
//!
//! An [`IdStack`] holds the chain of seeds pushed by windows, child regions, tree nodes and explicit
//! `push_id` calls. A widget's identity is the hash of its own segment seeded by the current top of the
//! stack, so identical labels under different parents never collide while the same path always yields the
//! same value from one frame to the next.

use crate::{Id, Imbalance, ScopeKind, UiError};

const FNV_OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

/// Seed used for identities hashed outside of any scope (top-level window names).
pub const ROOT_SEED: Id = Id(0x9e37_79b9_7f4a_7c15);

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
/// One element of an identity path.
pub enum IdSegment<'a> {
    /// A label. `"##"` hides the rest from display, `"###"` makes only the tail significant.
    Str(&'a str),
    /// An integer, typically a loop index.
    Int(i64),
    /// An identity produced elsewhere.
    Id(Id),
}

impl<'a> From<&'a str> for IdSegment<'a> {
    fn from(s: &'a str) -> Self { IdSegment::Str(s) }
}

impl<'a> From<&'a String> for IdSegment<'a> {
    fn from(s: &'a String) -> Self { IdSegment::Str(s.as_str()) }
}

impl From<i32> for IdSegment<'_> {
    fn from(v: i32) -> Self { IdSegment::Int(v as i64) }
}

impl From<i64> for IdSegment<'_> {
    fn from(v: i64) -> Self { IdSegment::Int(v) }
}

impl From<usize> for IdSegment<'_> {
    fn from(v: usize) -> Self { IdSegment::Int(v as i64) }
}

impl From<Id> for IdSegment<'_> {
    fn from(id: Id) -> Self { IdSegment::Id(id) }
}

fn fnv(mut hash: u64, bytes: &[u8]) -> u64 {
    for b in bytes {
        hash ^= *b as u64;
        hash = hash.wrapping_mul(FNV_PRIME);
    }
    hash
}

// fmix64: spreads FNV's weak high bits so nearby paths land far apart
fn finalize(mut h: u64) -> u64 {
    h ^= h >> 33;
    h = h.wrapping_mul(0xff51_afd7_ed55_8ccd);
    h ^= h >> 33;
    h = h.wrapping_mul(0xc4ce_b9fe_1a85_ec53);
    h ^= h >> 33;
    h
}

/// Returns the part of a label that takes part in hashing.
pub fn hashed_label(label: &str) -> &str {
    match label.find("###") {
        Some(pos) => &label[pos..],
        None => label,
    }
}

/// Returns the part of a label that is displayed.
pub fn display_label(label: &str) -> &str {
    match label.find("##") {
        Some(pos) => &label[..pos],
        None => label,
    }
}

/// Combines `seed` with one path segment.
pub fn hash_segment(seed: Id, segment: IdSegment<'_>) -> Id {
    let mut h = fnv(FNV_OFFSET_BASIS, &seed.0.to_le_bytes());
    match segment {
        IdSegment::Str(label) => {
            let bytes = hashed_label(label).as_bytes();
            h = fnv(h, &[1]);
            h = fnv(h, bytes);
            h = fnv(h, &(bytes.len() as u64).to_le_bytes());
        }
        IdSegment::Int(v) => {
            h = fnv(h, &[2]);
            h = fnv(h, &v.to_le_bytes());
        }
        IdSegment::Id(id) => {
            h = fnv(h, &[3]);
            h = fnv(h, &id.0.to_le_bytes());
        }
    }
    match finalize(h) {
        0 => Id(1),
        v => Id(v),
    }
}

#[derive(Clone, Debug, Default)]
/// Stack of identity seeds.
pub struct IdStack {
    seeds: Vec<Id>,
}

impl IdStack {
    /// Creates an empty stack whose current seed is [`ROOT_SEED`].
    pub fn new() -> Self { Self::default() }

    /// Number of pushed seeds.
    pub fn depth(&self) -> usize { self.seeds.len() }

    /// Seed new identities are derived from.
    pub fn current(&self) -> Id { self.seeds.last().copied().unwrap_or(ROOT_SEED) }

    /// Derives the identity `segment` would have at the current scope, without pushing it.
    pub fn get_id<'a>(&self, segment: impl Into<IdSegment<'a>>) -> Id { hash_segment(self.current(), segment.into()) }

    /// Derives an identity from `segment` and makes it the current seed.
    pub fn push<'a>(&mut self, segment: impl Into<IdSegment<'a>>) -> Id {
        let id = self.get_id(segment);
        self.seeds.push(id);
        id
    }

    /// Pushes an already derived identity as the current seed.
    pub fn push_seed(&mut self, id: Id) { self.seeds.push(id) }

    /// Removes the current seed.
    pub fn pop(&mut self) -> Result<Id, UiError> {
        self.seeds.pop().ok_or(UiError::ImbalancedScope { stack: ScopeKind::Id, imbalance: Imbalance::PopOnEmpty })
    }

    pub(crate) fn truncate(&mut self, depth: usize) -> usize {
        let removed = self.seeds.len().saturating_sub(depth);
        self.seeds.truncate(depth);
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{Rng, SeedableRng, rngs::StdRng};
    use std::collections::{HashMap, HashSet};

    #[test]
    fn same_path_same_id() {
        let mut a = IdStack::new();
        let mut b = IdStack::new();
        a.push("Window");
        b.push("Window");
        assert_eq!(a.get_id("OK"), b.get_id("OK"));
    }

    #[test]
    fn parent_disambiguates() {
        let mut s = IdStack::new();
        s.push("A");
        let in_a = s.get_id("OK");
        s.pop().unwrap();
        s.push("B");
        assert_ne!(in_a, s.get_id("OK"));
    }

    #[test]
    fn order_matters() {
        let mut ab = IdStack::new();
        ab.push("a");
        ab.push("b");
        let mut ba = IdStack::new();
        ba.push("b");
        ba.push("a");
        assert_ne!(ab.current(), ba.current());
    }

    #[test]
    fn segment_types_do_not_alias() {
        let s = IdStack::new();
        assert_ne!(s.get_id("1"), s.get_id(1i32));
    }

    #[test]
    fn hidden_suffix_is_hashed() {
        let s = IdStack::new();
        assert_ne!(s.get_id("Delete##1"), s.get_id("Delete##2"));
        assert_eq!(display_label("Delete##1"), "Delete");
    }

    #[test]
    fn triple_hash_keeps_identity_across_labels() {
        let s = IdStack::new();
        assert_eq!(s.get_id("Frames: 10###fps"), s.get_id("Frames: 99###fps"));
        assert_eq!(display_label("Frames: 10###fps"), "Frames: 10");
    }

    #[test]
    fn pop_restores_seed() {
        let mut s = IdStack::new();
        let root = s.current();
        s.push("x");
        s.push(7usize);
        s.pop().unwrap();
        s.pop().unwrap();
        assert_eq!(s.current(), root);
        assert_eq!(s.depth(), 0);
    }

    #[test]
    fn pop_on_empty_reports() {
        let mut s = IdStack::new();
        assert_eq!(
            s.pop(),
            Err(UiError::ImbalancedScope { stack: ScopeKind::Id, imbalance: Imbalance::PopOnEmpty })
        );
    }

    #[test]
    fn never_produces_none() {
        let s = IdStack::new();
        for i in 0..10_000i64 {
            assert!(!s.get_id(i).is_none());
        }
    }

    #[test]
    fn random_paths_do_not_collide() {
        let mut rng = StdRng::seed_from_u64(0x1d5);
        let mut seen: HashMap<Id, Vec<String>> = HashMap::new();
        let mut paths: HashSet<Vec<String>> = HashSet::new();
        for _ in 0..50_000 {
            let depth = rng.random_range(1..5);
            let path: Vec<String> = (0..depth)
                .map(|_| {
                    let len = rng.random_range(1..8);
                    (0..len).map(|_| rng.random_range(b'a'..=b'f') as char).collect()
                })
                .collect();
            if !paths.insert(path.clone()) {
                continue;
            }
            let mut stack = IdStack::new();
            for seg in &path[..path.len() - 1] {
                stack.push(seg.as_str());
            }
            let id = stack.get_id(path[path.len() - 1].as_str());
            if let Some(other) = seen.insert(id, path.clone()) {
                panic!("{other:?} and {path:?} both hash to {id}");
            }
        }
    }
}
