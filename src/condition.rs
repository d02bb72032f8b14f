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
//! Conditional application of "next" parameters.
//!
//! Setters such as [`crate::Context::set_next_window_pos`] take a [`Cond`] that decides, at the moment the
//! target is begun, whether the value is applied. The decision only depends on three facts about the target,
//! gathered in [`CondInputs`].

use std::collections::HashMap;

use crate::{Id, Vec2i};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Default, Hash)]
/// When a deferred setter takes effect.
pub enum Cond {
    /// Every time.
    #[default]
    Always,
    /// Only the first time the target is ever seen by this context.
    Once,
    /// Only when no persisted state exists for the target.
    FirstUseEver,
    /// Whenever the target becomes visible after not being submitted the previous frame.
    Appearing,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
/// Facts about the target a [`Cond`] is evaluated against.
pub struct CondInputs {
    /// The target has never been seen by this context before.
    pub first_seen: bool,
    /// Whether the persistence store holds a record; `None` when no store is attached.
    pub has_persisted: Option<bool>,
    /// The target was not submitted in the previous frame.
    pub appearing: bool,
}

impl Cond {
    /// Decides whether a setter with this condition applies.
    ///
    /// Without a persistence store every target counts as unpersisted, so `FirstUseEver` applies each time.
    pub fn should_apply(self, inputs: CondInputs) -> bool {
        match self {
            Cond::Always => true,
            Cond::Once => inputs.first_seen,
            Cond::FirstUseEver => !inputs.has_persisted.unwrap_or(false),
            Cond::Appearing => inputs.appearing,
        }
    }
}

#[derive(Copy, Clone)]
pub(crate) struct Conditional<T> {
    pub value: T,
    pub cond: Cond,
}

impl<T: Copy> Conditional<T> {
    pub(crate) fn resolve(&self, inputs: CondInputs) -> Option<T> { self.cond.should_apply(inputs).then_some(self.value) }
}

#[derive(Clone, Default)]
pub(crate) struct NextWindowData {
    pub pos: Option<Conditional<(Vec2i, (f32, f32))>>,
    pub size: Option<Conditional<(i32, i32)>>,
    pub collapsed: Option<Conditional<bool>>,
    pub focus: bool,
    pub scroll: Option<Vec2i>,
    pub content_size: Option<(i32, i32)>,
    pub bg_alpha: Option<f32>,
}

impl NextWindowData {
    pub(crate) fn is_empty(&self) -> bool {
        self.pos.is_none()
            && self.size.is_none()
            && self.collapsed.is_none()
            && !self.focus
            && self.scroll.is_none()
            && self.content_size.is_none()
            && self.bg_alpha.is_none()
    }

    pub(crate) fn clear(&mut self) { *self = Self::default() }
}

#[derive(Clone, Copy, Default)]
pub(crate) struct NextItemData {
    pub open: Option<Conditional<bool>>,
    pub width: Option<i32>,
    pub allow_overlap: bool,
}

impl NextItemData {
    pub(crate) fn is_empty(&self) -> bool { self.open.is_none() && self.width.is_none() && !self.allow_overlap }

    pub(crate) fn clear(&mut self) { *self = Self::default() }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
/// Persisted placement of a window.
pub struct LayoutRecord {
    /// Left edge.
    pub x: i32,
    /// Top edge.
    pub y: i32,
    /// Outer width.
    pub width: i32,
    /// Outer height.
    pub height: i32,
    /// Collapsed to its title bar.
    pub collapsed: bool,
    /// Open flag of a closable window.
    pub open: bool,
}

/// Storage for window placement across sessions. Attach one with [`crate::Context::set_layout_store`].
pub trait LayoutStore {
    /// Returns the record saved for `id`.
    fn load(&self, id: Id) -> Option<LayoutRecord>;
    /// Saves the current placement of `id`.
    fn store(&mut self, id: Id, record: LayoutRecord);
}

#[derive(Clone, Debug, Default)]
/// In-memory [`LayoutStore`].
pub struct MemoryLayoutStore {
    records: HashMap<Id, LayoutRecord>,
}

impl MemoryLayoutStore {
    /// Creates an empty store.
    pub fn new() -> Self { Self::default() }

    /// Number of stored records.
    pub fn len(&self) -> usize { self.records.len() }

    /// Returns `true` when nothing has been stored.
    pub fn is_empty(&self) -> bool { self.records.is_empty() }

    /// Iterates over all stored records.
    pub fn iter(&self) -> impl Iterator<Item = (&Id, &LayoutRecord)> { self.records.iter() }
}

impl LayoutStore for MemoryLayoutStore {
    fn load(&self, id: Id) -> Option<LayoutRecord> { self.records.get(&id).copied() }

    fn store(&mut self, id: Id, record: LayoutRecord) { self.records.insert(id, record); }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inputs(first_seen: bool, has_persisted: Option<bool>, appearing: bool) -> CondInputs { CondInputs { first_seen, has_persisted, appearing } }

    #[test]
    fn always_applies() {
        assert!(Cond::Always.should_apply(inputs(false, Some(true), false)));
    }

    #[test]
    fn once_only_on_first_sight() {
        assert!(Cond::Once.should_apply(inputs(true, None, true)));
        assert!(!Cond::Once.should_apply(inputs(false, None, true)));
    }

    #[test]
    fn first_use_ever_follows_the_store() {
        assert!(Cond::FirstUseEver.should_apply(inputs(false, Some(false), false)));
        assert!(!Cond::FirstUseEver.should_apply(inputs(true, Some(true), true)));
        assert!(Cond::FirstUseEver.should_apply(inputs(false, None, false)));
    }

    #[test]
    fn appearing_tracks_visibility() {
        assert!(Cond::Appearing.should_apply(inputs(false, Some(true), true)));
        assert!(!Cond::Appearing.should_apply(inputs(true, Some(false), false)));
    }

    #[test]
    fn memory_store_round_trips_a_record() {
        let mut store = MemoryLayoutStore::new();
        let id = Id::from_label("Inspector");
        assert!(store.load(id).is_none());
        let record = LayoutRecord { x: 10, y: 20, width: 300, height: 200, collapsed: true, open: true };
        store.store(id, record);
        assert_eq!(store.load(id), Some(record));
        assert_eq!(store.len(), 1);
    }
}
