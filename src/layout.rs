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
//! Cursor-based placement of items inside a container.
//!
//! Items flow top to bottom. `same_line` pulls the next item back up next to the previous one, groups
//! collapse a run of items into a single bounding box, and the menu bar temporarily switches the flow to
//! horizontal.

use std::cmp::max;

use crate::*;

#[derive(Clone, Copy)]
struct GroupFrame {
    start: Vec2i,
    indent: i32,
    max: Option<Vec2i>,
    line_height: i32,
}

#[derive(Clone, Default)]
pub(crate) struct Layout {
    body: Recti,
    origin: Vec2i,
    cursor: Vec2i,
    prev_line: Vec2i,
    prev_line_height: i32,
    line_height: i32,
    indent: i32,
    max: Option<Vec2i>,
    last_rect: Recti,
    horizontal: bool,
    groups: Vec<GroupFrame>,
    saved: Option<Box<Layout>>,
}

impl Layout {
    pub(crate) fn reset(&mut self, body: Recti, scroll: Vec2i) {
        let origin = vec2(body.x - scroll.x, body.y - scroll.y);
        *self = Layout { body, origin, cursor: origin, prev_line: origin, ..Layout::default() };
    }

    pub(crate) fn body(&self) -> Recti { self.body }

    pub(crate) fn cursor(&self) -> Vec2i { self.cursor }

    pub(crate) fn origin(&self) -> Vec2i { self.origin }

    pub(crate) fn set_cursor(&mut self, pos: Vec2i) {
        self.cursor = pos;
        self.line_height = 0;
    }

    pub(crate) fn last_rect(&self) -> Recti { self.last_rect }

    pub(crate) fn avail(&self) -> Vec2i {
        vec2(
            max(0, self.body.x + self.body.width - self.cursor.x),
            max(0, self.body.y + self.body.height - self.cursor.y),
        )
    }

    fn line_start_x(&self) -> i32 { self.origin.x + self.indent }

    fn extend_max(&mut self, p: Vec2i) {
        self.max = Some(match self.max {
            Some(m) => vec2(max(m.x, p.x), max(m.y, p.y)),
            None => p,
        });
    }

    /// Claims a `w` x `h` rectangle at the cursor and advances past it.
    pub(crate) fn add_item(&mut self, w: i32, h: i32, spacing: i32) -> Recti {
        let pos = self.cursor;
        let r = rect(pos.x, pos.y, max(0, w), max(0, h));
        self.last_rect = r;
        self.line_height = max(self.line_height, r.height);
        self.prev_line = vec2(r.x + r.width, pos.y);
        self.prev_line_height = self.line_height;
        self.extend_max(vec2(r.x + r.width, r.y + r.height));
        if self.horizontal {
            self.cursor = vec2(r.x + r.width + spacing, pos.y);
        } else {
            self.cursor = vec2(self.line_start_x(), pos.y + self.line_height + spacing);
            self.line_height = 0;
        }
        r
    }

    /// Places the next item to the right of the previous one. `offset` is measured from the line start.
    pub(crate) fn same_line(&mut self, offset: Option<i32>, spacing: i32) {
        let x = match offset {
            Some(offset) => self.line_start_x() + offset,
            None => self.prev_line.x + spacing,
        };
        self.cursor = vec2(x, self.prev_line.y);
        self.line_height = self.prev_line_height;
    }

    pub(crate) fn new_line(&mut self, height: i32, spacing: i32) {
        if self.line_height > 0 || self.horizontal {
            self.cursor = vec2(self.line_start_x(), self.cursor.y + self.line_height + spacing);
            self.line_height = 0;
        } else {
            self.add_item(0, height, spacing);
        }
    }

    pub(crate) fn indent(&mut self, delta: i32) {
        self.indent += delta;
        if self.line_height == 0 {
            self.cursor.x = self.line_start_x();
        }
    }

    pub(crate) fn begin_group(&mut self) {
        self.groups.push(GroupFrame { start: self.cursor, indent: self.indent, max: self.max, line_height: self.line_height });
        self.indent = self.cursor.x - self.origin.x;
        self.max = None;
        self.line_height = 0;
    }

    /// Closes the innermost group and lays its bounding box out as a single item.
    pub(crate) fn end_group(&mut self, spacing: i32) -> Option<Recti> {
        let group = self.groups.pop()?;
        let inner = self.max.unwrap_or(group.start);
        let size = vec2(max(0, inner.x - group.start.x), max(0, inner.y - group.start.y));
        self.indent = group.indent;
        self.max = group.max;
        self.cursor = group.start;
        self.line_height = group.line_height;
        Some(self.add_item(size.x, size.y, spacing))
    }

    pub(crate) fn group_depth(&self) -> usize { self.groups.len() }

    pub(crate) fn clear_groups(&mut self) -> usize {
        let n = self.groups.len();
        for _ in 0..n {
            self.end_group(0);
        }
        n
    }

    /// Extent of everything laid out so far, measured from the scrolled origin.
    pub(crate) fn content_size(&self) -> Vec2i {
        match self.max {
            Some(m) => vec2(max(0, m.x - self.origin.x), max(0, m.y - self.origin.y)),
            None => vec2(0, 0),
        }
    }

    pub(crate) fn in_menu_bar(&self) -> bool { self.saved.is_some() }

    pub(crate) fn is_horizontal(&self) -> bool { self.horizontal }

    /// Switches to a horizontal flow over `bar`, remembering the current state.
    pub(crate) fn begin_menu_bar(&mut self, bar: Recti, padding: i32) {
        let saved = std::mem::take(self);
        let origin = vec2(bar.x + padding, bar.y);
        *self = Layout { body: bar, origin, cursor: origin, prev_line: origin, horizontal: true, saved: Some(Box::new(saved)), ..Layout::default() };
    }

    pub(crate) fn end_menu_bar(&mut self) -> bool {
        match self.saved.take() {
            Some(saved) => {
                *self = *saved;
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout() -> Layout {
        let mut l = Layout::default();
        l.reset(rect(10, 20, 200, 100), vec2(0, 0));
        l
    }

    #[test]
    fn items_stack_vertically() {
        let mut l = layout();
        let a = l.add_item(50, 20, 4);
        let b = l.add_item(30, 10, 4);
        assert_eq!((a.x, a.y), (10, 20));
        assert_eq!((b.x, b.y), (10, 44));
        let size = l.content_size();
        assert_eq!((size.x, size.y), (50, 34));
    }

    #[test]
    fn same_line_places_to_the_right() {
        let mut l = layout();
        l.add_item(50, 20, 4);
        l.same_line(None, 4);
        let b = l.add_item(30, 30, 4);
        assert_eq!((b.x, b.y), (64, 20));
        let c = l.add_item(10, 10, 4);
        assert_eq!((c.x, c.y), (10, 54));
    }

    #[test]
    fn scroll_shifts_origin() {
        let mut l = Layout::default();
        l.reset(rect(0, 0, 100, 100), vec2(0, 30));
        let r = l.add_item(10, 10, 0);
        assert_eq!(r.y, -30);
        assert_eq!(l.content_size().y, 10);
    }

    #[test]
    fn indent_moves_line_start() {
        let mut l = layout();
        l.indent(12);
        let r = l.add_item(10, 10, 4);
        assert_eq!(r.x, 22);
        l.indent(-12);
        assert_eq!(l.add_item(10, 10, 4).x, 10);
    }

    #[test]
    fn group_acts_as_one_item() {
        let mut l = layout();
        l.begin_group();
        l.add_item(40, 10, 4);
        l.add_item(60, 10, 4);
        let g = l.end_group(4).unwrap();
        assert_eq!((g.x, g.y, g.width, g.height), (10, 20, 60, 24));
        l.same_line(None, 4);
        assert_eq!(l.add_item(5, 5, 4).x, 74);
        assert!(l.end_group(4).is_none());
    }

    #[test]
    fn menu_bar_flow_is_restored() {
        let mut l = layout();
        l.add_item(10, 10, 4);
        let before = l.cursor();
        l.begin_menu_bar(rect(10, 0, 200, 20), 8);
        let a = l.add_item(30, 20, 4);
        let b = l.add_item(30, 20, 4);
        assert_eq!((a.x, b.x), (18, 52));
        assert!(l.end_menu_bar());
        assert_eq!((l.cursor().x, l.cursor().y), (before.x, before.y));
        assert!(!l.end_menu_bar());
    }
}
