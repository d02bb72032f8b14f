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
//! Text editing engine backing the `input_text` family of widgets.
//!
//! While a text field is active the engine edits its own copy of the text. The caller's buffer is written
//! according to the field's [`ReturnPolicy`] and once more when the field deactivates. The buffer is never
//! allowed to exceed the capacity its owner acknowledged: growth goes through
//! [`TextBuffer::request_capacity`], asked at most once per edit, and input that still does not fit is dropped.

use std::collections::VecDeque;

use tracing::debug;

use crate::{Font, Id, Input, KeyCode, UiError};

/// Storage edited by a text field.
pub trait TextBuffer {
    /// Current contents.
    fn text(&self) -> &str;
    /// Largest length in bytes the owner accepts.
    fn capacity(&self) -> usize;
    /// Replaces the contents; `text` never exceeds the acknowledged capacity.
    fn set_text(&mut self, text: &str);
    /// Asks the owner to accept `requested` bytes and returns the capacity it grants.
    fn request_capacity(&mut self, requested: usize) -> usize;
}

impl TextBuffer for String {
    fn text(&self) -> &str { self.as_str() }

    fn capacity(&self) -> usize { usize::MAX }

    fn set_text(&mut self, text: &str) {
        self.clear();
        self.push_str(text);
    }

    fn request_capacity(&mut self, requested: usize) -> usize { requested }
}

/// A `String` with a caller-enforced capacity and a resize callback.
///
/// The callback receives the capacity the edit needs and returns the capacity the owner grants, which may be
/// smaller than requested.
pub struct ResizableBuffer<'a, F: FnMut(usize) -> usize> {
    text: &'a mut String,
    capacity: usize,
    on_resize: F,
}

impl<'a, F: FnMut(usize) -> usize> ResizableBuffer<'a, F> {
    /// Wraps `text` with an initial `capacity`.
    pub fn new(text: &'a mut String, capacity: usize, on_resize: F) -> Self { Self { text, capacity, on_resize } }
}

impl<F: FnMut(usize) -> usize> TextBuffer for ResizableBuffer<'_, F> {
    fn text(&self) -> &str { self.text.as_str() }

    fn capacity(&self) -> usize { self.capacity }

    fn set_text(&mut self, text: &str) {
        self.text.clear();
        self.text.push_str(text);
    }

    fn request_capacity(&mut self, requested: usize) -> usize {
        self.capacity = (self.on_resize)(requested);
        self.capacity
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
/// Restricts which characters a field accepts.
pub enum CharFilter {
    /// Any printable character.
    #[default]
    None,
    /// `0123456789.+-*/`
    Decimal,
    /// `0123456789abcdefABCDEF`
    Hexadecimal,
    /// Decimal plus the exponent markers `e` and `E`.
    Scientific,
}

impl CharFilter {
    /// Returns `true` when `c` passes the filter.
    pub fn accepts(self, c: char) -> bool {
        match self {
            CharFilter::None => true,
            CharFilter::Decimal => c.is_ascii_digit() || "+-*/.".contains(c),
            CharFilter::Hexadecimal => c.is_ascii_hexdigit(),
            CharFilter::Scientific => c.is_ascii_digit() || "+-*/.eE".contains(c),
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
/// When the caller's buffer is written and the widget reports a change.
pub enum ReturnPolicy {
    /// Write and return `true` on every frame that changed the text.
    #[default]
    OnChange,
    /// Write only when the field deactivates; return `true` only when Enter confirmed it.
    OnConfirm,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
/// Behavior switches of a text field.
pub struct InputTextOptions {
    /// Character filter applied before insertion.
    pub filter: CharFilter,
    /// Upper-case letters as they are typed.
    pub uppercase: bool,
    /// Reject spaces and tabs.
    pub no_blank: bool,
    /// Allow selection and navigation only.
    pub read_only: bool,
    /// Display every character as `*`.
    pub password: bool,
    /// Select the whole text when the field activates.
    pub auto_select_all: bool,
    /// Keep an undo history for the session.
    pub undo: bool,
    /// Write-back policy.
    pub return_policy: ReturnPolicy,
    /// Enter inserts a newline, Ctrl+Enter confirms.
    pub multiline: bool,
}

impl Default for InputTextOptions {
    fn default() -> Self {
        Self {
            filter: CharFilter::None,
            uppercase: false,
            no_blank: false,
            read_only: false,
            password: false,
            auto_select_all: false,
            undo: true,
            return_policy: ReturnPolicy::OnChange,
            multiline: false,
        }
    }
}

impl InputTextOptions {
    /// Sets the character filter.
    pub fn with_filter(mut self, filter: CharFilter) -> Self {
        self.filter = filter;
        self
    }

    /// Upper-cases typed letters.
    pub fn uppercase(mut self) -> Self {
        self.uppercase = true;
        self
    }

    /// Rejects blanks.
    pub fn no_blank(mut self) -> Self {
        self.no_blank = true;
        self
    }

    /// Makes the field read-only.
    pub fn read_only(mut self) -> Self {
        self.read_only = true;
        self
    }

    /// Masks the displayed text.
    pub fn password(mut self) -> Self {
        self.password = true;
        self
    }

    /// Selects everything on activation.
    pub fn auto_select_all(mut self) -> Self {
        self.auto_select_all = true;
        self
    }

    /// Disables the undo history.
    pub fn no_undo(mut self) -> Self {
        self.undo = false;
        self
    }

    /// Only reports a change when Enter confirms the edit.
    pub fn on_confirm(mut self) -> Self {
        self.return_policy = ReturnPolicy::OnConfirm;
        self
    }

    /// Accepts newlines.
    pub fn multiline(mut self) -> Self {
        self.multiline = true;
        self
    }

    /// Rejects combinations that cannot be honoured together.
    pub fn validate(&self) -> Result<(), UiError> {
        if self.password && self.multiline {
            return Err(UiError::InvalidOption { reason: "password fields cannot be multiline".into() });
        }
        Ok(())
    }

    fn filter_char(&self, c: char) -> Option<char> {
        if c == '\n' {
            return self.multiline.then_some(c);
        }
        if c.is_control() || (self.no_blank && (c == ' ' || c == '\t')) || !self.filter.accepts(c) {
            return None;
        }
        if self.uppercase {
            let mut upper = c.to_uppercase();
            return match (upper.next(), upper.next()) {
                (Some(u), None) => Some(u),
                _ => Some(c),
            };
        }
        Some(c)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
/// Direction of a recorded edit.
pub enum EditKind {
    /// Text was inserted.
    Insert,
    /// Text was removed.
    Delete,
}

#[derive(Clone, Debug, PartialEq, Eq)]
/// One reversible edit.
pub struct EditOp {
    /// Insert or delete.
    pub kind: EditKind,
    /// Byte offset of the edit.
    pub at: usize,
    /// Inserted or removed text.
    pub text: String,
    /// Cursor before the edit.
    pub cursor_before: usize,
    /// Cursor after the edit.
    pub cursor_after: usize,
}

impl EditOp {
    fn inverse(&self) -> EditOp {
        EditOp {
            kind: match self.kind {
                EditKind::Insert => EditKind::Delete,
                EditKind::Delete => EditKind::Insert,
            },
            at: self.at,
            text: self.text.clone(),
            cursor_before: self.cursor_after,
            cursor_after: self.cursor_before,
        }
    }

    fn apply(&self, text: &mut String) {
        match self.kind {
            EditKind::Insert => text.insert_str(self.at, &self.text),
            EditKind::Delete => text.replace_range(self.at..self.at + self.text.len(), ""),
        }
    }
}

#[derive(Clone, Debug, Default)]
/// Bounded undo/redo history. A depth of zero makes it a sink that records nothing.
pub struct UndoStack {
    undo: VecDeque<EditOp>,
    redo: Vec<EditOp>,
    depth: usize,
}

impl UndoStack {
    /// Creates a history keeping at most `depth` steps.
    pub fn new(depth: usize) -> Self { Self { undo: VecDeque::new(), redo: Vec::new(), depth } }

    /// Returns `true` unless the history was created with a depth of zero.
    pub fn is_enabled(&self) -> bool { self.depth > 0 }

    /// Number of steps that can be undone.
    pub fn undo_len(&self) -> usize { self.undo.len() }

    /// Number of steps that can be redone.
    pub fn redo_len(&self) -> usize { self.redo.len() }

    /// Records a fresh edit, which invalidates the redo branch.
    pub fn record(&mut self, op: EditOp) {
        if !self.is_enabled() {
            return;
        }
        self.redo.clear();
        self.undo.push_back(op);
        while self.undo.len() > self.depth {
            self.undo.pop_front();
        }
    }

    fn pop_undo(&mut self) -> Option<EditOp> {
        let op = self.undo.pop_back()?;
        self.redo.push(op.clone());
        Some(op)
    }

    fn pop_redo(&mut self) -> Option<EditOp> {
        let op = self.redo.pop()?;
        self.undo.push_back(op.clone());
        Some(op)
    }

    fn clear(&mut self) {
        self.undo.clear();
        self.redo.clear();
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
/// What one round of input did to a [`TextEditState`].
pub struct EditOutcome {
    /// The text changed.
    pub changed: bool,
    /// Only the cursor or selection moved.
    pub moved: bool,
    /// Enter (Ctrl+Enter when multiline) confirmed the edit.
    pub confirmed: bool,
    /// Escape asked to revert.
    pub cancelled: bool,
    /// Input was dropped for lack of capacity: `(needed, granted)`.
    pub overflow: Option<(usize, usize)>,
}

impl EditOutcome {
    fn merge(&mut self, other: EditOutcome) {
        self.changed |= other.changed;
        self.moved |= other.moved;
        self.confirmed |= other.confirmed;
        self.cancelled |= other.cancelled;
        self.overflow = self.overflow.or(other.overflow);
    }
}

pub(crate) fn prev_boundary(text: &str, cursor: usize) -> usize {
    if cursor == 0 {
        return 0;
    }
    let mut new_cursor = cursor.min(text.len()) - 1;
    while new_cursor > 0 && !text.is_char_boundary(new_cursor) {
        new_cursor -= 1;
    }
    new_cursor
}

pub(crate) fn next_boundary(text: &str, cursor: usize) -> usize {
    if cursor >= text.len() {
        return text.len();
    }
    let mut new_cursor = cursor + 1;
    while new_cursor < text.len() && !text.is_char_boundary(new_cursor) {
        new_cursor += 1;
    }
    new_cursor
}

pub(crate) fn line_start(text: &str, cursor: usize) -> usize { text[..cursor].rfind('\n').map_or(0, |p| p + 1) }

pub(crate) fn line_end(text: &str, cursor: usize) -> usize { text[cursor..].find('\n').map_or(text.len(), |p| cursor + p) }

fn advance_chars(text: &str, start: usize, end: usize, n: usize) -> usize {
    text[start..end].char_indices().nth(n).map_or(end, |(i, _)| start + i)
}

fn word_left(text: &str, cursor: usize) -> usize {
    let head = &text[..cursor];
    let trimmed = head.trim_end_matches(|c: char| !c.is_alphanumeric());
    trimmed.rfind(|c: char| !c.is_alphanumeric()).map_or(0, |p| p + trimmed[p..].chars().next().map_or(1, char::len_utf8))
}

fn word_right(text: &str, cursor: usize) -> usize {
    let tail = &text[cursor..];
    let skip_word = tail.find(|c: char| !c.is_alphanumeric()).unwrap_or(tail.len());
    let rest = &tail[skip_word..];
    let skip_gap = rest.find(|c: char| c.is_alphanumeric()).unwrap_or(rest.len());
    cursor + skip_word + skip_gap
}

/// Byte offset in `line` closest to `target_x` pixels from its start.
pub(crate) fn cursor_from_x(line: &str, target_x: i32, font: &dyn Font) -> usize {
    if target_x <= 0 {
        return 0;
    }
    let mut last_width = 0;
    for (idx, ch) in line.char_indices() {
        let next = idx + ch.len_utf8();
        let width = last_width + font.char_width(ch);
        if target_x < width {
            if target_x < (last_width + width) / 2 {
                return idx;
            }
            return next;
        }
        last_width = width;
    }
    line.len()
}

#[derive(Clone, Debug)]
/// Editing session of the active text field.
pub struct TextEditState {
    id: Id,
    text: String,
    initial: String,
    cursor: usize,
    anchor: Option<usize>,
    capacity: usize,
    overwrite: bool,
    options: InputTextOptions,
    undo: UndoStack,
    dirty: bool,
    pub(crate) selecting: bool,
}

impl TextEditState {
    /// Opens a session on `buf`, snapshotting its text for Escape.
    pub fn new(id: Id, buf: &dyn TextBuffer, options: InputTextOptions, undo_depth: usize) -> Self {
        let text = buf.text().to_string();
        let capacity = buf.capacity().max(text.len());
        let cursor = text.len();
        let mut state = Self {
            id,
            initial: text.clone(),
            text,
            cursor,
            anchor: None,
            capacity,
            overwrite: false,
            options,
            undo: UndoStack::new(if options.undo { undo_depth } else { 0 }),
            dirty: false,
            selecting: false,
        };
        if options.auto_select_all {
            state.select_all();
        }
        state
    }

    /// Widget this session belongs to.
    pub fn id(&self) -> Id { self.id }

    /// Working copy of the text.
    pub fn text(&self) -> &str { &self.text }

    /// Cursor position as a byte offset.
    pub fn cursor(&self) -> usize { self.cursor }

    /// Selected byte range, if any.
    pub fn selection(&self) -> Option<(usize, usize)> {
        match self.anchor {
            Some(a) if a != self.cursor => Some((a.min(self.cursor), a.max(self.cursor))),
            _ => None,
        }
    }

    /// Capacity acknowledged by the buffer owner.
    pub fn capacity(&self) -> usize { self.capacity }

    /// Returns `true` in overwrite mode.
    pub fn is_overwrite(&self) -> bool { self.overwrite }

    /// Options the session was opened with.
    pub fn options(&self) -> &InputTextOptions { &self.options }

    /// Undo history of the session.
    pub fn history(&self) -> &UndoStack { &self.undo }

    /// Returns `true` when the text changed since the last write-back.
    pub fn is_dirty(&self) -> bool { self.dirty }

    pub(crate) fn mark_flushed(&mut self) { self.dirty = false }

    /// Moves the cursor, clamped to the text and snapped back to a character boundary.
    pub fn set_cursor(&mut self, pos: usize, extend_selection: bool) {
        let mut pos = pos.min(self.text.len());
        while pos > 0 && !self.text.is_char_boundary(pos) {
            pos -= 1;
        }
        if extend_selection {
            self.anchor.get_or_insert(self.cursor);
        } else {
            self.anchor = None;
        }
        self.cursor = pos;
    }

    /// Selects the whole text.
    pub fn select_all(&mut self) {
        self.anchor = Some(0);
        self.cursor = self.text.len();
    }

    fn replacement_range(&self) -> (usize, usize) {
        if let Some(range) = self.selection() {
            return range;
        }
        if self.overwrite && self.cursor < self.text.len() && !self.text[self.cursor..].starts_with('\n') {
            return (self.cursor, next_boundary(&self.text, self.cursor));
        }
        (self.cursor, self.cursor)
    }

    fn delete_range(&mut self, start: usize, end: usize) {
        let op = EditOp {
            kind: EditKind::Delete,
            at: start,
            text: self.text[start..end].to_string(),
            cursor_before: self.cursor,
            cursor_after: start,
        };
        op.apply(&mut self.text);
        self.cursor = start;
        self.anchor = None;
        self.dirty = true;
        self.undo.record(op);
    }

    fn insert_char(&mut self, c: char) {
        let at = self.cursor;
        let op = EditOp { kind: EditKind::Insert, at, text: c.to_string(), cursor_before: at, cursor_after: at + c.len_utf8() };
        op.apply(&mut self.text);
        self.cursor = op.cursor_after;
        self.dirty = true;
        self.undo.record(op);
    }

    /// Inserts typed text at the cursor, replacing the selection.
    ///
    /// Characters are filtered first. When the result would not fit, the owner is asked once for enough room
    /// for the rest of the input; whatever still does not fit is dropped and reported in the outcome.
    pub fn insert_text(&mut self, input: &str, buf: &mut dyn TextBuffer) -> EditOutcome {
        let mut out = EditOutcome::default();
        if self.options.read_only {
            return out;
        }
        let mut resize_asked = false;
        for (idx, raw) in input.char_indices() {
            let Some(c) = self.options.filter_char(raw) else { continue };
            let (start, end) = self.replacement_range();
            let needed = self.text.len() - (end - start) + c.len_utf8();
            if needed > self.capacity {
                if !resize_asked {
                    resize_asked = true;
                    let remaining = input.len() - idx - raw.len_utf8();
                    let granted = buf.request_capacity(needed + remaining);
                    debug!(id = %self.id, requested = needed + remaining, granted, "text buffer resize");
                    self.capacity = granted.max(self.text.len());
                }
                if needed > self.capacity {
                    out.overflow = Some((needed, self.capacity));
                    break;
                }
            }
            if end > start {
                self.delete_range(start, end);
            }
            self.insert_char(c);
            out.changed = true;
        }
        out
    }

    /// Deletes the selection or the character before the cursor.
    pub fn backspace(&mut self) -> bool {
        if let Some((start, end)) = self.selection() {
            self.delete_range(start, end);
            return true;
        }
        if self.cursor == 0 {
            return false;
        }
        self.delete_range(prev_boundary(&self.text, self.cursor), self.cursor);
        true
    }

    /// Deletes the selection or the character after the cursor.
    pub fn delete_forward(&mut self) -> bool {
        if let Some((start, end)) = self.selection() {
            self.delete_range(start, end);
            return true;
        }
        if self.cursor >= self.text.len() {
            return false;
        }
        self.delete_range(self.cursor, next_boundary(&self.text, self.cursor));
        true
    }

    /// Reverts the latest edit. Returns `false` when there is nothing to undo.
    pub fn undo(&mut self) -> bool {
        let Some(op) = self.undo.pop_undo() else { return false };
        op.inverse().apply(&mut self.text);
        self.cursor = op.cursor_before;
        self.anchor = None;
        self.dirty = true;
        true
    }

    /// Re-applies the latest undone edit.
    pub fn redo(&mut self) -> bool {
        let Some(op) = self.undo.pop_redo() else { return false };
        op.apply(&mut self.text);
        self.cursor = op.cursor_after;
        self.anchor = None;
        self.dirty = true;
        true
    }

    /// Restores the text the session started from.
    pub fn revert(&mut self) {
        if self.text != self.initial {
            self.text = self.initial.clone();
            self.dirty = true;
        }
        self.cursor = self.text.len();
        self.anchor = None;
        self.undo.clear();
    }

    fn move_vertical(&mut self, down: bool, extend: bool) {
        let ls = line_start(&self.text, self.cursor);
        let column = self.text[ls..self.cursor].chars().count();
        let target = if down {
            let le = line_end(&self.text, self.cursor);
            if le == self.text.len() {
                self.text.len()
            } else {
                let next = le + 1;
                advance_chars(&self.text, next, line_end(&self.text, next), column)
            }
        } else if ls == 0 {
            0
        } else {
            let prev = line_start(&self.text, ls - 1);
            advance_chars(&self.text, prev, ls - 1, column)
        };
        self.set_cursor(target, extend);
    }

    /// Applies one frame of keyboard and text input.
    pub fn apply_input(&mut self, input: &Input, buf: &mut dyn TextBuffer) -> EditOutcome {
        let mods = input.key_mods();
        let editable = !self.options.read_only;
        let mut out = EditOutcome::default();

        if mods.is_ctrl() {
            if input.is_key_pressed(KeyCode::A) {
                self.select_all();
                out.moved = true;
            }
            if editable && input.is_key_pressed(KeyCode::Z) {
                out.changed |= self.undo();
            }
            if editable && input.is_key_pressed(KeyCode::Y) {
                out.changed |= self.redo();
            }
        } else if !input.text_input().is_empty() {
            out.merge(self.insert_text(input.text_input(), buf));
        }

        if input.is_key_pressed(KeyCode::INSERT) {
            self.overwrite = !self.overwrite;
        }
        if editable && input.is_key_pressed(KeyCode::BACKSPACE) {
            out.changed |= self.backspace();
        }
        if editable && input.is_key_pressed(KeyCode::DELETE) {
            out.changed |= self.delete_forward();
        }

        let extend = mods.is_shift();
        let before = (self.cursor, self.anchor);
        if input.is_key_pressed(KeyCode::LEFT) {
            let target = if mods.is_ctrl() { word_left(&self.text, self.cursor) } else { prev_boundary(&self.text, self.cursor) };
            self.set_cursor(target, extend);
        }
        if input.is_key_pressed(KeyCode::RIGHT) {
            let target = if mods.is_ctrl() { word_right(&self.text, self.cursor) } else { next_boundary(&self.text, self.cursor) };
            self.set_cursor(target, extend);
        }
        if input.is_key_pressed(KeyCode::HOME) {
            let target = if mods.is_ctrl() { 0 } else { line_start(&self.text, self.cursor) };
            self.set_cursor(target, extend);
        }
        if input.is_key_pressed(KeyCode::END) {
            let target = if mods.is_ctrl() { self.text.len() } else { line_end(&self.text, self.cursor) };
            self.set_cursor(target, extend);
        }
        if self.options.multiline && input.is_key_pressed(KeyCode::UP) {
            self.move_vertical(false, extend);
        }
        if self.options.multiline && input.is_key_pressed(KeyCode::DOWN) {
            self.move_vertical(true, extend);
        }
        out.moved |= before != (self.cursor, self.anchor);

        if input.is_key_pressed(KeyCode::RETURN) {
            if self.options.multiline && !mods.is_ctrl() {
                out.merge(self.insert_text("\n", buf));
            } else {
                out.confirmed = true;
            }
        }
        if input.is_key_pressed(KeyCode::ESCAPE) {
            out.cancelled = true;
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::KeyMode;
    use rand::{Rng, SeedableRng, rngs::StdRng};

    fn session(text: &str, options: InputTextOptions) -> (TextEditState, String) {
        let buf = text.to_string();
        (TextEditState::new(Id::new(7), &buf, options, 64), buf)
    }

    #[test]
    fn typing_appends_at_cursor() {
        let (mut st, mut buf) = session("ab", InputTextOptions::default());
        let out = st.insert_text("cd", &mut buf);
        assert!(out.changed);
        assert_eq!(st.text(), "abcd");
        assert_eq!(st.cursor(), 4);
    }

    #[test]
    fn filters_run_before_insertion() {
        let (mut st, mut buf) = session("", InputTextOptions::default().with_filter(CharFilter::Decimal));
        st.insert_text("1a2.b-", &mut buf);
        assert_eq!(st.text(), "12.-");

        let (mut st, mut buf) = session("", InputTextOptions::default().with_filter(CharFilter::Hexadecimal).uppercase());
        st.insert_text("fez9", &mut buf);
        assert_eq!(st.text(), "FE9");

        let (mut st, mut buf) = session("", InputTextOptions::default().no_blank());
        st.insert_text("a b\tc", &mut buf);
        assert_eq!(st.text(), "abc");

        let (mut st, mut buf) = session("", InputTextOptions::default().with_filter(CharFilter::Scientific));
        st.insert_text("1e-3x", &mut buf);
        assert_eq!(st.text(), "1e-3");
    }

    #[test]
    fn newline_only_in_multiline() {
        let (mut st, mut buf) = session("", InputTextOptions::default());
        st.insert_text("a\nb", &mut buf);
        assert_eq!(st.text(), "ab");
        let (mut st, mut buf) = session("", InputTextOptions::default().multiline());
        st.insert_text("a\nb", &mut buf);
        assert_eq!(st.text(), "a\nb");
    }

    #[test]
    fn undo_restores_text_and_cursor() {
        let mut rng = StdRng::seed_from_u64(9);
        for _ in 0..50 {
            let start: String = (0..rng.random_range(0..10)).map(|_| rng.random_range('a'..='z')).collect();
            let (mut st, mut buf) = session(&start, InputTextOptions::default());
            let cursor = rng.random_range(0..=start.len());
            st.set_cursor(cursor, false);
            let typed: String = (0..rng.random_range(1..20)).map(|_| rng.random_range('a'..='z')).collect();
            st.insert_text(&typed, &mut buf);
            for _ in 0..typed.chars().count() {
                assert!(st.undo());
            }
            assert_eq!(st.text(), start);
            assert_eq!(st.cursor(), cursor);
            assert!(!st.undo());
        }
    }

    #[test]
    fn redo_is_cleared_by_new_edits() {
        let (mut st, mut buf) = session("", InputTextOptions::default());
        st.insert_text("ab", &mut buf);
        st.undo();
        assert_eq!(st.history().redo_len(), 1);
        assert!(st.redo());
        assert_eq!(st.text(), "ab");
        st.undo();
        st.insert_text("x", &mut buf);
        assert_eq!(st.history().redo_len(), 0);
        assert!(!st.redo());
        assert_eq!(st.text(), "ax");
    }

    #[test]
    fn disabled_history_records_nothing() {
        let (mut st, mut buf) = session("", InputTextOptions::default().no_undo());
        st.insert_text("abc", &mut buf);
        assert!(!st.history().is_enabled());
        assert!(!st.undo());
        assert_eq!(st.text(), "abc");
    }

    #[test]
    fn history_is_bounded() {
        let buf = String::new();
        let mut st = TextEditState::new(Id::new(1), &buf, InputTextOptions::default(), 3);
        let mut buf = buf;
        st.insert_text("abcdef", &mut buf);
        assert_eq!(st.history().undo_len(), 3);
        while st.undo() {}
        assert_eq!(st.text(), "abc");
    }

    #[test]
    fn capacity_refusal_truncates_after_one_request() {
        let mut text = String::new();
        let mut requests = Vec::new();
        let mut buf = ResizableBuffer::new(&mut text, 2, |requested| {
            requests.push(requested);
            2
        });
        let mut st = TextEditState::new(Id::new(3), &buf, InputTextOptions::default(), 8);
        let out = st.insert_text("abc", &mut buf);
        assert_eq!(st.text(), "ab");
        assert_eq!(out.overflow, Some((3, 2)));
        drop(buf);
        assert_eq!(requests, vec![3]);
    }

    #[test]
    fn capacity_grant_lets_input_through() {
        let mut text = String::from("x");
        let mut calls = 0;
        let mut buf = ResizableBuffer::new(&mut text, 1, |requested| {
            calls += 1;
            requested
        });
        let mut st = TextEditState::new(Id::new(3), &buf, InputTextOptions::default(), 8);
        let out = st.insert_text("hello", &mut buf);
        assert_eq!(out.overflow, None);
        assert_eq!(st.text(), "xhello");
        assert_eq!(st.capacity(), 6);
        drop(buf);
        assert_eq!(calls, 1);
    }

    #[test]
    fn typing_replaces_selection() {
        let (mut st, mut buf) = session("hello", InputTextOptions::default());
        st.set_cursor(1, false);
        st.set_cursor(4, true);
        assert_eq!(st.selection(), Some((1, 4)));
        st.insert_text("i", &mut buf);
        assert_eq!(st.text(), "hio");
        st.undo();
        st.undo();
        assert_eq!(st.text(), "hello");
    }

    #[test]
    fn overwrite_mode_replaces_next_char() {
        let (mut st, mut buf) = session("abc", InputTextOptions::default());
        let mut input = Input::default();
        input.keydown_code(KeyCode::INSERT);
        input.keydown_code(KeyCode::HOME);
        st.apply_input(&input, &mut buf);
        assert!(st.is_overwrite());
        st.insert_text("XY", &mut buf);
        assert_eq!(st.text(), "XYc");
    }

    #[test]
    fn backspace_respects_char_boundaries() {
        let (mut st, _) = session("aé", InputTextOptions::default());
        assert!(st.backspace());
        assert_eq!(st.text(), "a");
        st.set_cursor(0, false);
        assert!(!st.backspace());
        assert!(st.delete_forward());
        assert_eq!(st.text(), "");
    }

    #[test]
    fn enter_confirms_single_line_and_inserts_in_multiline() {
        let mut input = Input::default();
        input.keydown_code(KeyCode::RETURN);

        let (mut st, mut buf) = session("a", InputTextOptions::default());
        let out = st.apply_input(&input, &mut buf);
        assert!(out.confirmed);
        assert_eq!(st.text(), "a");

        let (mut st, mut buf) = session("a", InputTextOptions::default().multiline());
        let out = st.apply_input(&input, &mut buf);
        assert!(!out.confirmed);
        assert_eq!(st.text(), "a\n");

        input.keydown(KeyMode::CTRL);
        let out = st.apply_input(&input, &mut buf);
        assert!(out.confirmed);
    }

    #[test]
    fn ctrl_shortcuts() {
        let (mut st, mut buf) = session("word", InputTextOptions::default());
        st.insert_text("s", &mut buf);
        let mut input = Input::default();
        input.keydown(KeyMode::CTRL);
        input.keydown_code(KeyCode::Z);
        let out = st.apply_input(&input, &mut buf);
        assert!(out.changed);
        assert_eq!(st.text(), "word");

        let mut input = Input::default();
        input.keydown(KeyMode::CTRL);
        input.keydown_code(KeyCode::A);
        st.apply_input(&input, &mut buf);
        assert_eq!(st.selection(), Some((0, 4)));
    }

    #[test]
    fn vertical_moves_keep_the_column() {
        let (mut st, _) = session("abcd\nxy\nlmnop", InputTextOptions::default().multiline());
        st.set_cursor(3, false);
        st.move_vertical(true, false);
        assert_eq!(st.cursor(), 7);
        st.move_vertical(true, false);
        assert_eq!(st.cursor(), 10);
        st.move_vertical(false, false);
        st.move_vertical(false, false);
        assert_eq!(st.cursor(), 2);
    }

    #[test]
    fn word_motion() {
        assert_eq!(word_right("foo bar", 0), 4);
        assert_eq!(word_left("foo bar", 7), 4);
        assert_eq!(word_left("foo bar", 4), 0);
    }

    #[test]
    fn revert_restores_snapshot() {
        let (mut st, mut buf) = session("keep", InputTextOptions::default());
        st.insert_text("!!", &mut buf);
        st.revert();
        assert_eq!(st.text(), "keep");
        assert!(!st.undo());
    }

    #[test]
    fn click_position_maps_to_nearest_boundary() {
        let font = crate::MonoFont::default();
        assert_eq!(cursor_from_x("abcd", 0, &font), 0);
        assert_eq!(cursor_from_x("abcd", 8, &font), 1);
        assert_eq!(cursor_from_x("abcd", 11, &font), 2);
        assert_eq!(cursor_from_x("abcd", 100, &font), 4);
    }

    #[test]
    fn password_and_multiline_conflict() {
        assert!(InputTextOptions::default().password().multiline().validate().is_err());
        assert!(InputTextOptions::default().password().validate().is_ok());
    }
}
