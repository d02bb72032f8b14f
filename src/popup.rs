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
use std::cmp::max;

use tracing::debug;

use crate::condition::Conditional;
use crate::routing::ItemFlags;
use crate::*;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
/// How a popup may be dismissed and which button opens context popups.
pub struct PopupOptions {
    /// A click outside the popup closes it.
    pub close_on_outside_click: bool,
    /// Escape closes it when it is the top popup.
    pub close_on_escape: bool,
    /// Button whose release opens `begin_popup_context_*` popups.
    pub button: MouseButton,
}

impl PopupOptions {
    /// Dismissable popup opened with the right button.
    pub fn popup() -> Self { Self { close_on_outside_click: true, close_on_escape: true, button: MouseButton::RIGHT } }

    /// Modal popup: only closed by the application.
    pub fn modal() -> Self { Self { close_on_outside_click: false, close_on_escape: false, button: MouseButton::RIGHT } }

    /// Sets [`PopupOptions::close_on_outside_click`].
    pub fn with_close_on_outside_click(mut self, enabled: bool) -> Self {
        self.close_on_outside_click = enabled;
        self
    }

    /// Sets [`PopupOptions::close_on_escape`].
    pub fn with_close_on_escape(mut self, enabled: bool) -> Self {
        self.close_on_escape = enabled;
        self
    }

    /// Sets [`PopupOptions::button`].
    pub fn with_button(mut self, button: MouseButton) -> Self {
        self.button = button;
        self
    }
}

impl Default for PopupOptions {
    fn default() -> Self { Self::popup() }
}

#[derive(Copy, Clone)]
pub(crate) struct PopupEntry {
    pub id: Id,
    /// Container that opened the popup, `Id::NONE` when opened outside any container.
    pub opener: Id,
    pub open_frame: usize,
    pub open_pos: Vec2i,
    pub options: PopupOptions,
    /// Kind the popup was last begun as.
    pub kind: Option<ContainerKind>,
    pub last_begun: usize,
}

/// Open popups, outermost first.
#[derive(Default)]
pub(crate) struct PopupStack {
    entries: Vec<PopupEntry>,
    closed_this_frame: Vec<Id>,
}

impl PopupStack {
    pub(crate) fn begin_frame(&mut self) { self.closed_this_frame.clear() }

    pub(crate) fn len(&self) -> usize { self.entries.len() }

    pub(crate) fn get(&self, index: usize) -> Option<&PopupEntry> { self.entries.get(index) }

    pub(crate) fn entry(&self, id: Id) -> Option<&PopupEntry> { self.entries.iter().find(|e| e.id == id) }

    pub(crate) fn entry_mut(&mut self, id: Id) -> Option<&mut PopupEntry> { self.entries.iter_mut().find(|e| e.id == id) }

    pub(crate) fn index_of(&self, id: Id) -> Option<usize> { self.entries.iter().position(|e| e.id == id) }

    pub(crate) fn contains(&self, id: Id) -> bool { self.index_of(id).is_some() }

    pub(crate) fn top_modal_index(&self) -> Option<usize> { self.entries.iter().rposition(|e| e.kind == Some(ContainerKind::Modal)) }

    pub(crate) fn push(&mut self, entry: PopupEntry) { self.entries.push(entry) }

    /// Closes every popup from `len` upwards.
    pub(crate) fn truncate(&mut self, len: usize) {
        if len >= self.entries.len() {
            return;
        }
        for e in self.entries.drain(len..) {
            debug!(id = %e.id, "popup closed");
            self.closed_this_frame.push(e.id);
        }
    }

    /// Closes popups from `from` upwards that allow outside-click dismissal, stopping above the last one that does not.
    pub(crate) fn close_above_on_click(&mut self, from: usize) {
        let mut keep = from;
        for (i, e) in self.entries.iter().enumerate().skip(from) {
            if !e.options.close_on_outside_click {
                keep = i + 1;
            }
        }
        self.truncate(keep);
    }

    pub(crate) fn was_closed_this_frame(&self, id: Id) -> bool { self.closed_this_frame.contains(&id) }
}

impl Context {
    // number of popups currently begun, i.e. the stack level a popup opened now lands on
    fn popup_depth(&self) -> usize { self.stack.iter().filter(|f| f.kind.is_popup()).count() }

    /// Opens the popup `str_id` of the current scope with default options.
    pub fn open_popup(&mut self, str_id: &str) { self.open_popup_with(str_id, PopupOptions::default()) }

    /// Opens the popup `str_id` of the current scope.
    pub fn open_popup_with(&mut self, str_id: &str, options: PopupOptions) {
        let id = self.ids.get_id(str_id);
        self.open_popup_id(id, options);
    }

    /// Opens a popup by identity. Popups above the current level are closed; an already open popup stays as is.
    ///
    /// A modal is only closed by the application: opening from beneath one is refused and recorded as
    /// [`UiError::InvalidContainerReference`].
    pub fn open_popup_id(&mut self, id: Id, options: PopupOptions) {
        let depth = self.popup_depth();
        if self.popups.get(depth).is_some_and(|e| e.id == id) {
            self.popups.truncate(depth + 1);
            return;
        }
        if let Some(modal) = self.popups.top_modal_index().filter(|m| *m >= depth) {
            debug!(%id, modal = %self.popups.get(modal).map_or(Id::NONE, |e| e.id), "popup open refused beneath a modal");
            self.report(UiError::InvalidContainerReference { id, operation: "open_popup" });
            return;
        }
        self.popups.truncate(depth);
        let opener = self.current_container_id().unwrap_or(Id::NONE);
        debug!(%id, level = depth, "popup opened");
        self.popups.push(PopupEntry {
            id,
            opener,
            open_frame: self.frame,
            open_pos: self.input.mouse_pos(),
            options,
            kind: None,
            last_begun: 0,
        });
    }

    /// Returns `true` when the popup `str_id` of the current scope is open.
    pub fn is_popup_open(&self, str_id: &str) -> bool { self.popups.contains(self.ids.get_id(str_id)) }

    /// Closes the innermost popup being submitted, along with everything above it.
    pub fn close_current_popup(&mut self) {
        if let Some(index) = self.current_popup_index() {
            self.popups.truncate(index);
        }
    }

    /// Closes the popup `str_id` of the current scope, along with everything above it.
    pub fn close_popup(&mut self, str_id: &str) -> Result<(), UiError> {
        let id = self.ids.get_id(str_id);
        match self.popups.index_of(id) {
            Some(index) => {
                self.popups.truncate(index);
                Ok(())
            }
            None => {
                let err = UiError::InvalidContainerReference { id, operation: "close_popup" };
                self.report(err.clone());
                Err(err)
            }
        }
    }

    fn current_popup_index(&self) -> Option<usize> {
        let frame = self.stack.iter().rev().find(|f| f.kind.is_popup())?;
        self.popups.index_of(frame.id)
    }

    pub(crate) fn begin_popup_ex(&mut self, id: Id, name: &str, kind: ContainerKind, flags: WindowOption, open: Option<&mut bool>) -> bool {
        let Some(entry) = self.popups.entry(id).copied() else {
            self.next_window.clear();
            return false;
        };
        let frame = self.frame;
        if let Some(e) = self.popups.entry_mut(id) {
            e.last_begun = frame;
            e.kind = Some(kind);
        }
        let flags = match kind {
            ContainerKind::Modal => {
                if self.next_window.pos.is_none() {
                    let center = vec2(self.config.display_width / 2, self.config.display_height / 2);
                    self.next_window.pos = Some(Conditional { value: (center, (0.5, 0.5)), cond: Cond::Appearing });
                }
                let auto = if self.next_window.size.is_none() { WindowOption::AUTO_SIZE } else { WindowOption::NONE };
                flags | WindowOption::NO_COLLAPSE | auto
            }
            _ => {
                if self.next_window.pos.is_none() {
                    self.next_window.pos = Some(Conditional { value: (entry.open_pos, (0.0, 0.0)), cond: Cond::Appearing });
                }
                flags | WindowOption::NO_TITLE | WindowOption::NO_RESIZE | WindowOption::AUTO_SIZE
            }
        };
        self.begin_container(id, name, kind, flags, None, open)
    }

    /// Begins the popup `str_id` when it is open. Call [`Context::end_popup`] only when this returns `true`.
    pub fn begin_popup(&mut self, str_id: &str) -> bool {
        let id = self.ids.get_id(str_id);
        self.begin_popup_or_skip(id, str_id, ContainerKind::Popup, WindowOption::NONE)
    }

    fn begin_popup_or_skip(&mut self, id: Id, name: &str, kind: ContainerKind, flags: WindowOption) -> bool {
        if !self.popups.contains(id) {
            self.next_window.clear();
            return false;
        }
        if self.begin_popup_ex(id, name, kind, flags, None) {
            true
        } else {
            self.end_container_unchecked();
            false
        }
    }

    /// Begins the modal `name` when it is open. It blocks everything beneath it until closed.
    /// With `open`, a close button is shown and clearing the flag closes the modal.
    pub fn begin_popup_modal(&mut self, name: &str, open: Option<&mut bool>, flags: WindowOption) -> bool {
        let id = self.ids.get_id(name);
        let Some(index) = self.popups.index_of(id) else {
            self.next_window.clear();
            return false;
        };
        if let Some(entry) = self.popups.entry_mut(id) {
            entry.options.close_on_outside_click = false;
        }
        match open {
            Some(open) if !*open => {
                self.popups.truncate(index);
                self.next_window.clear();
                false
            }
            Some(open) => {
                let visible = self.begin_popup_ex(id, name, ContainerKind::Modal, flags, Some(&mut *open));
                if !*open {
                    self.popups.truncate(index);
                }
                if !visible {
                    self.end_container_unchecked();
                }
                visible
            }
            None => {
                let visible = self.begin_popup_ex(id, name, ContainerKind::Modal, flags, None);
                if !visible {
                    self.end_container_unchecked();
                }
                visible
            }
        }
    }

    /// Ends a popup or modal begun successfully.
    pub fn end_popup(&mut self) -> Result<(), UiError> { self.end_container(&[ContainerKind::Popup, ContainerKind::Modal]) }

    /// Runs `f` inside the popup `str_id` when it is open.
    pub fn popup<R>(&mut self, str_id: &str, f: impl FnOnce(&mut Self) -> R) -> Option<R> {
        if !self.begin_popup(str_id) {
            return None;
        }
        let r = f(self);
        let _ = self.end_popup();
        Some(r)
    }

    /// Runs `f` inside the modal `name` when it is open.
    pub fn modal<R>(&mut self, name: &str, open: Option<&mut bool>, flags: WindowOption, f: impl FnOnce(&mut Self) -> R) -> Option<R> {
        if !self.begin_popup_modal(name, open, flags) {
            return None;
        }
        let r = f(self);
        let _ = self.end_popup();
        Some(r)
    }

    fn released_over(&self, button: MouseButton) -> bool { !self.routing.hover_blocked && self.input.mouse_released().intersects(button) }

    /// Opens a popup when the last item is clicked with the button `options` names. `str_id` defaults to the
    /// last item's identity; the popup is begun separately with [`Context::begin_popup`] or, for the default
    /// identity, [`Context::begin_popup_context_item`].
    pub fn open_popup_on_item_click(&mut self, str_id: Option<&str>, options: PopupOptions) {
        self.open_on_item_release(str_id, options);
    }

    /// Opens and begins a popup when the last item is right-clicked (or whichever button `options` names).
    /// `str_id` defaults to the last item's identity.
    pub fn begin_popup_context_item(&mut self, str_id: Option<&str>, options: PopupOptions) -> bool {
        let Some(id) = self.open_on_item_release(str_id, options) else { return false };
        self.begin_popup_or_skip(id, str_id.unwrap_or("##ContextItem"), ContainerKind::Popup, WindowOption::NONE)
    }

    /// Resolves the popup identity for the last item and opens it on a release over that item.
    fn open_on_item_release(&mut self, str_id: Option<&str>, options: PopupOptions) -> Option<Id> {
        let last = self.routing.last_item;
        let id = match str_id {
            Some(s) => self.ids.get_id(s),
            None => last.id,
        };
        if id.is_none() {
            return None;
        }
        let over_item = last.window.is_some() && last.window == self.routing.hovered_window && rect_contains(last.rect, self.input.mouse_pos());
        if over_item && self.released_over(options.button) {
            self.open_popup_id(id, options);
        }
        Some(id)
    }

    /// Opens and begins a popup when the current window is clicked away from any item.
    pub fn begin_popup_context_window(&mut self, str_id: Option<&str>, options: PopupOptions) -> bool {
        let name = str_id.unwrap_or("window_context");
        let id = self.ids.get_id(name);
        let current = self.current_container_id();
        if current.is_some() && self.routing.hovered_window == current && !self.is_any_item_hovered() && self.released_over(options.button) {
            self.open_popup_id(id, options);
        }
        self.begin_popup_or_skip(id, name, ContainerKind::Popup, WindowOption::NONE)
    }

    /// Opens and begins a popup when the empty background is clicked.
    pub fn begin_popup_context_void(&mut self, str_id: Option<&str>, options: PopupOptions) -> bool {
        let name = str_id.unwrap_or("void_context");
        let id = self.ids.get_id(name);
        if self.routing.hovered_window.is_none() && self.released_over(options.button) {
            self.open_popup_id(id, options);
        }
        self.begin_popup_or_skip(id, name, ContainerKind::Popup, WindowOption::NONE)
    }

    pub(crate) fn update_popup_escape(&mut self) {
        if !self.input.is_key_pressed(KeyCode::ESCAPE) || self.text_edit.is_some() {
            return;
        }
        let len = self.popups.len();
        if len > 0 && self.popups.get(len - 1).is_some_and(|e| e.options.close_on_escape) {
            self.popups.truncate(len - 1);
        }
    }

    pub(crate) fn close_stale_popups(&mut self) {
        let frame = self.frame;
        let stale = (0..self.popups.len()).find(|i| self.popups.get(*i).is_some_and(|e| e.last_begun != frame && e.open_frame != frame));
        if let Some(index) = stale {
            debug!(index, "closing popups not submitted this frame");
            self.popups.truncate(index);
        }
    }

    /// Starts laying items out in the current window's menu bar.
    pub fn begin_menu_bar(&mut self) -> bool {
        let padding = self.style().item_spacing;
        let Some(c) = self.current_container_mut() else { return false };
        if !c.flags.contains(WindowOption::MENU_BAR) || c.collapsed || c.layout.in_menu_bar() {
            return false;
        }
        let bar = c.menu_bar;
        let clip = intersect_rect(bar, c.hit_rect);
        c.layout.begin_menu_bar(bar, padding);
        c.draw.push_clip_rect_unbounded(clip);
        self.ids.push("##menubar");
        true
    }

    /// Returns to the window body after [`Context::begin_menu_bar`].
    pub fn end_menu_bar(&mut self) -> Result<(), UiError> {
        let in_bar = self.current_container_mut().is_some_and(|c| c.layout.in_menu_bar());
        if !in_bar {
            let err = UiError::ImbalancedScope { stack: ScopeKind::MenuBar, imbalance: Imbalance::PopOnEmpty };
            self.report(err.clone());
            return Err(err);
        }
        if let Some(c) = self.current_container_mut() {
            c.layout.end_menu_bar();
            c.draw.pop_clip_rect();
        }
        self.pop_id()
    }

    fn menu_row(&mut self, label: &str, extra: i32) -> Option<(Recti, bool)> {
        let style = *self.style();
        let text_w = self.font.text_width(display_label(label));
        let h = self.font.line_height() + style.frame_padding * 2;
        let in_bar = self.current_container_mut()?.layout.is_horizontal();
        let w = if in_bar { text_w + style.frame_padding * 2 } else { max(self.content_region_avail().x, text_w + style.frame_padding * 2 + extra) };
        let r = self.layout_item(w, h, "menu")?;
        Some((r, in_bar))
    }

    /// Begins a menu. In a menu bar it toggles on click and follows the pointer while a sibling is open;
    /// inside another menu it opens on hover. Call [`Context::end_menu`] only when this returns `true`.
    pub fn begin_menu(&mut self, label: &str, enabled: bool) -> bool {
        let id = self.ids.get_id(label);
        let Some((r, in_bar)) = self.menu_row(label, 20) else { return false };
        let flags = if enabled { ItemFlags::NONE } else { ItemFlags::NO_INTERACT };
        self.item_add(id, r, flags, label);
        let st = self.button_behavior(id, r, ButtonFlags::PRESS_ON_CLICK, ItemKind::Menu);

        let depth = self.popup_depth();
        let open_here = self.popups.get(depth).map(|e| e.id);
        let is_open = open_here == Some(id);
        let sibling_open = open_here.is_some() && !is_open && self.popups.get(depth).is_some_and(|e| Some(e.opener) == self.current_container_id());
        if in_bar {
            if st.pressed {
                if is_open {
                    self.popups.truncate(depth);
                } else if !self.popups.was_closed_this_frame(id) {
                    self.open_popup_id(id, PopupOptions::popup());
                }
            } else if st.hovered && sibling_open {
                self.open_popup_id(id, PopupOptions::popup());
            }
        } else if (st.hovered || st.pressed) && !is_open {
            self.open_popup_id(id, PopupOptions::popup());
        }
        let is_open = self.popups.get(depth).is_some_and(|e| e.id == id);

        let text = self.style_color(if enabled { ColorId::Text } else { ColorId::TextDisabled });
        let header = self.style_color(if is_open { ColorId::HeaderActive } else { ColorId::HeaderHovered });
        let pad = self.style().frame_padding;
        let font = self.font.as_ref();
        if let Some(c) = self.current_container_id().and_then(|id| self.containers.get_mut(id)) {
            if st.hovered || is_open {
                c.draw.draw_rect(r, header);
            }
            c.draw.draw_text(font, display_label(label), vec2(r.x + pad, r.y + pad), text);
            if !in_bar {
                c.draw.draw_icon(Icon::Submenu, rect(r.x + r.width - r.height, r.y, r.height, r.height), text);
            }
        }

        if !is_open {
            return false;
        }
        let pos = if in_bar { vec2(r.x, r.y + r.height) } else { vec2(r.x + r.width, r.y) };
        self.next_window.pos = Some(Conditional { value: (pos, (0.0, 0.0)), cond: Cond::Always });
        if self.begin_popup_ex(id, label, ContainerKind::Menu, WindowOption::NONE, None) {
            true
        } else {
            self.end_container_unchecked();
            false
        }
    }

    /// Ends a menu begun successfully.
    pub fn end_menu(&mut self) -> Result<(), UiError> { self.end_container(&[ContainerKind::Menu]) }

    /// Runs `f` inside the menu `label` when it is open.
    pub fn menu<R>(&mut self, label: &str, enabled: bool, f: impl FnOnce(&mut Self) -> R) -> Option<R> {
        if !self.begin_menu(label, enabled) {
            return None;
        }
        let r = f(self);
        let _ = self.end_menu();
        Some(r)
    }

    /// Menu entry. Returns `true` when clicked; clicking closes the menu chain it belongs to.
    pub fn menu_item(&mut self, label: &str, shortcut: Option<&str>, selected: bool, enabled: bool) -> bool {
        let id = self.ids.get_id(label);
        let shortcut_w = shortcut.map_or(0, |s| self.font.text_width(s) + self.style().item_spacing * 2);
        let Some((r, _)) = self.menu_row(label, shortcut_w + 20) else { return false };
        let flags = if enabled { ItemFlags::NONE } else { ItemFlags::NO_INTERACT };
        self.item_add(id, r, flags, label);
        let st = self.button_behavior(id, r, ButtonFlags::NONE, ItemKind::Button);

        let depth = self.popup_depth();
        if st.hovered && self.popups.len() > depth {
            // pointer left an open submenu for a plain entry
            self.popups.truncate(depth);
        }
        if st.pressed {
            self.close_menu_chain();
        }

        let text = self.style_color(if enabled { ColorId::Text } else { ColorId::TextDisabled });
        let header = self.style_color(ColorId::HeaderHovered);
        let check = self.style_color(ColorId::CheckMark);
        let pad = self.style().frame_padding;
        let font = self.font.as_ref();
        if let Some(c) = self.current_container_id().and_then(|id| self.containers.get_mut(id)) {
            if st.hovered {
                c.draw.draw_rect(r, header);
            }
            c.draw.draw_text(font, display_label(label), vec2(r.x + pad, r.y + pad), text);
            if let Some(s) = shortcut {
                let x = r.x + r.width - pad - font.text_width(s) - if selected { r.height } else { 0 };
                c.draw.draw_text(font, s, vec2(x, r.y + pad), text);
            }
            if selected {
                c.draw.draw_icon(Icon::Check, rect(r.x + r.width - r.height, r.y, r.height, r.height), check);
            }
        }
        st.pressed
    }

    // closes the innermost popup and every menu directly below it
    pub(crate) fn close_menu_chain(&mut self) {
        let Some(mut start) = self.current_popup_index() else { return };
        while start > 0
            && self.popups.get(start).is_some_and(|e| e.kind == Some(ContainerKind::Menu))
            && self.popups.get(start - 1).is_some_and(|e| e.kind == Some(ContainerKind::Menu))
        {
            start -= 1;
        }
        self.popups.truncate(start);
    }

    /// Begins a combo box showing `preview`. Call [`Context::end_combo`] only when this returns `true`.
    pub fn begin_combo(&mut self, label: &str, preview: &str) -> bool {
        let id = self.ids.get_id(label);
        let popup_id = hash_segment(id, IdSegment::Str("##ComboPopup"));
        let style = *self.style();
        let w = self.take_item_width();
        let h = self.font.line_height() + style.frame_padding * 2;
        let shown = display_label(label);
        let label_w = if shown.is_empty() { 0 } else { style.item_inner_spacing + self.font.text_width(shown) };
        let Some(r) = self.layout_item(w + label_w, h, "begin_combo") else { return false };
        let frame = rect(r.x, r.y, w, h);
        self.item_add(id, frame, ItemFlags::NONE, label);
        let st = self.button_behavior(id, frame, ButtonFlags::PRESS_ON_CLICK, ItemKind::Menu);

        let open = self.popups.contains(popup_id);
        if st.pressed {
            if open {
                if let Some(index) = self.popups.index_of(popup_id) {
                    self.popups.truncate(index);
                }
            } else if !self.popups.was_closed_this_frame(popup_id) {
                self.open_popup_id(popup_id, PopupOptions::popup());
            }
        }
        let open = self.popups.contains(popup_id);

        let fill = self.style_color(match (open || st.held, st.hovered) {
            (true, _) => ColorId::FrameBgActive,
            (false, true) => ColorId::FrameBgHovered,
            _ => ColorId::FrameBg,
        });
        let border = self.style_color(ColorId::Border);
        let text = self.style_color(ColorId::Text);
        let font = self.font.as_ref();
        if let Some(c) = self.current_container_id().and_then(|id| self.containers.get_mut(id)) {
            c.draw.draw_frame(frame, fill, Some(border));
            c.draw.draw_text(font, preview, vec2(frame.x + style.frame_padding, frame.y + style.frame_padding), text);
            c.draw.draw_icon(Icon::Expanded, rect(frame.x + frame.width - h, frame.y, h, h), text);
            c.draw.draw_text(font, shown, vec2(frame.x + w + style.item_inner_spacing, frame.y + style.frame_padding), text);
        }
        if !open {
            return false;
        }
        self.next_window.pos = Some(Conditional { value: (vec2(frame.x, frame.y + frame.height), (0.0, 0.0)), cond: Cond::Always });
        self.begin_popup_or_skip(popup_id, "##ComboPopup", ContainerKind::Popup, WindowOption::NONE)
    }

    /// Ends a combo box begun successfully.
    pub fn end_combo(&mut self) -> Result<(), UiError> { self.end_container(&[ContainerKind::Popup]) }

    /// Combo box over `items`. Returns `true` when the selection changed.
    pub fn combo(&mut self, label: &str, current: &mut usize, items: &[&str]) -> bool {
        let preview = items.get(*current).copied().unwrap_or("");
        if !self.begin_combo(label, preview) {
            return false;
        }
        let combo_item = self.routing.last_item;
        let mut changed = false;
        for (i, item) in items.iter().enumerate() {
            self.push_id(i);
            if self.selectable(item, i == *current) {
                *current = i;
                changed = true;
            }
            let _ = self.pop_id();
        }
        let _ = self.end_combo();
        self.routing.last_item = combo_item;
        if changed {
            self.routing.last_item.status |= ItemStatus::EDITED;
        }
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(ctx: &mut Context, x: i32, y: i32) {
        ctx.input_mut().mousemove(x, y);
        ctx.input_mut().mousedown(x, y, MouseButton::LEFT);
    }

    fn release(ctx: &mut Context, x: i32, y: i32) { ctx.input_mut().mouseup(x, y, MouseButton::LEFT); }

    #[test]
    fn popup_stays_open_while_submitted() {
        let mut ctx = Context::new();
        ctx.new_frame();
        ctx.begin("Host", WindowOption::NONE);
        ctx.open_popup("menu");
        assert!(ctx.begin_popup("menu"));
        ctx.text("item");
        ctx.end_popup().unwrap();
        ctx.end().unwrap();
        ctx.end_frame();

        ctx.new_frame();
        ctx.begin("Host", WindowOption::NONE);
        assert!(ctx.is_popup_open("menu"));
        assert!(ctx.begin_popup("menu"));
        ctx.end_popup().unwrap();
        ctx.end().unwrap();
        ctx.end_frame();

        // not submitted for a frame: closed at its end
        ctx.new_frame();
        ctx.begin("Host", WindowOption::NONE);
        ctx.end().unwrap();
        ctx.end_frame();
        ctx.new_frame();
        ctx.begin("Host", WindowOption::NONE);
        assert!(!ctx.is_popup_open("menu"));
        ctx.end().unwrap();
        ctx.end_frame();
    }

    #[test]
    fn escape_closes_top_popup() {
        let mut ctx = Context::new();
        let frame = |ctx: &mut Context, open: bool| {
            ctx.new_frame();
            ctx.begin("Host", WindowOption::NONE);
            if open {
                ctx.open_popup("p");
            }
            if ctx.begin_popup("p") {
                ctx.end_popup().unwrap();
            }
            let is_open = ctx.is_popup_open("p");
            ctx.end().unwrap();
            ctx.end_frame();
            is_open
        };
        assert!(frame(&mut ctx, true));
        ctx.input_mut().keydown_code(KeyCode::ESCAPE);
        assert!(!frame(&mut ctx, false));
    }

    #[test]
    fn click_outside_closes_popup() {
        let mut ctx = Context::new();
        let popup_only = |ctx: &mut Context, open: bool| {
            ctx.new_frame();
            ctx.set_next_window_pos(vec2(0, 0), Cond::Always, (0.0, 0.0));
            ctx.begin("Host", WindowOption::NONE);
            if open {
                ctx.open_popup("p");
            }
            if ctx.begin_popup("p") {
                ctx.end_popup().unwrap();
            }
            let is_open = ctx.is_popup_open("p");
            ctx.end().unwrap();
            ctx.end_frame();
            is_open
        };
        assert!(popup_only(&mut ctx, true));
        assert!(popup_only(&mut ctx, false));
        press(&mut ctx, 1000, 700);
        assert!(!popup_only(&mut ctx, false));
    }

    #[test]
    fn click_outside_keeps_modal() {
        let mut ctx = Context::new();
        let modal = |ctx: &mut Context, open: bool| {
            ctx.new_frame();
            ctx.begin("Host", WindowOption::NONE);
            if open {
                ctx.open_popup_with("m", PopupOptions::modal());
            }
            if ctx.begin_popup_modal("m", None, WindowOption::NONE) {
                ctx.end_popup().unwrap();
            }
            let is_open = ctx.is_popup_open("m");
            ctx.end().unwrap();
            ctx.end_frame();
            is_open
        };
        assert!(modal(&mut ctx, true));
        press(&mut ctx, 1000, 700);
        assert!(modal(&mut ctx, false));
        release(&mut ctx, 1000, 700);
        assert!(modal(&mut ctx, false));
    }

    #[test]
    fn modal_blocks_hover_everywhere_beneath() {
        let mut ctx = Context::new();
        let build = |ctx: &mut Context, open: bool| {
            ctx.new_frame();
            ctx.set_next_window_pos(vec2(0, 0), Cond::Always, (0.0, 0.0));
            ctx.set_next_window_size((400, 300), Cond::Always);
            ctx.begin("Host", WindowOption::NONE);
            ctx.button("Under");
            let hovered = ctx.is_item_hovered();
            let r = ctx.item_rect();
            if open {
                ctx.open_popup_with("Dialog", PopupOptions::modal());
            }
            if ctx.begin_popup_modal("Dialog", None, WindowOption::NONE) {
                ctx.text("blocking");
                ctx.end_popup().unwrap();
            }
            ctx.end().unwrap();
            ctx.end_frame();
            (hovered, r)
        };
        let (_, button) = build(&mut ctx, false);
        ctx.input_mut().mousemove(button.x + 2, button.y + 2);
        assert!(build(&mut ctx, false).0);

        build(&mut ctx, true);
        for dx in (0..button.width).step_by(7) {
            for dy in (0..button.height).step_by(5) {
                ctx.input_mut().mousemove(button.x + dx, button.y + dy);
                assert!(!build(&mut ctx, false).0);
            }
        }
    }

    #[test]
    fn combo_click_toggles_without_reopening() {
        let mut ctx = Context::new();
        let mut current = 0usize;
        let mut build = |ctx: &mut Context| {
            ctx.new_frame();
            ctx.set_next_window_pos(vec2(0, 0), Cond::Always, (0.0, 0.0));
            ctx.begin("Host", WindowOption::NONE);
            ctx.combo("Pick", &mut current, &["one", "two", "three"]);
            let open = ctx.popups.len() > 0;
            let r = ctx.item_rect();
            ctx.end().unwrap();
            ctx.end_frame();
            (open, r)
        };
        let (open, r) = build(&mut ctx);
        assert!(!open);
        press(&mut ctx, r.x + 3, r.y + 3);
        assert!(build(&mut ctx).0);
        release(&mut ctx, r.x + 3, r.y + 3);
        assert!(build(&mut ctx).0);
        press(&mut ctx, r.x + 3, r.y + 3);
        assert!(!build(&mut ctx).0);
    }

    #[test]
    fn close_unknown_popup_is_reported() {
        let mut ctx = Context::new();
        ctx.new_frame();
        ctx.begin("Host", WindowOption::NONE);
        assert!(matches!(ctx.close_popup("ghost"), Err(UiError::InvalidContainerReference { operation: "close_popup", .. })));
        ctx.end().unwrap();
        ctx.end_frame();
    }

    #[test]
    fn popup_opened_beneath_modal_is_refused() {
        let mut ctx = Context::new();
        let build = |ctx: &mut Context, open_modal: bool, open_other: bool, open_inner: bool| {
            ctx.new_frame();
            ctx.begin("Host", WindowOption::NONE);
            if open_modal {
                ctx.open_popup_with("m", PopupOptions::modal());
            }
            if open_other {
                ctx.open_popup("other");
            }
            let mut inner = false;
            if ctx.begin_popup_modal("m", None, WindowOption::NONE) {
                if open_inner {
                    ctx.open_popup("inner");
                }
                if ctx.begin_popup("inner") {
                    inner = true;
                    ctx.end_popup().unwrap();
                }
                ctx.end_popup().unwrap();
            }
            if ctx.begin_popup("other") {
                ctx.end_popup().unwrap();
            }
            let state = (ctx.is_popup_open("m"), ctx.is_popup_open("other"), inner);
            ctx.end().unwrap();
            ctx.end_frame();
            state
        };
        assert_eq!(build(&mut ctx, true, false, false), (true, false, false));
        assert_eq!(build(&mut ctx, false, true, false), (true, false, false));
        assert!(ctx
            .diagnostics()
            .iter()
            .any(|d| matches!(d.error, UiError::InvalidContainerReference { operation: "open_popup", .. })));
        // popups opened from inside the modal stack above it
        assert_eq!(build(&mut ctx, false, false, true), (true, false, true));
        assert!(ctx.diagnostics().is_empty());
    }

    #[test]
    fn modal_stays_above_later_focused_window() {
        let mut ctx = Context::new();
        let build = |ctx: &mut Context, open: bool, focus_other: bool| {
            ctx.new_frame();
            ctx.begin("Host", WindowOption::NONE);
            if open {
                ctx.open_popup_with("m", PopupOptions::modal());
            }
            let modal = ctx.get_id("m");
            if ctx.begin_popup_modal("m", None, WindowOption::NONE) {
                ctx.end_popup().unwrap();
            }
            ctx.end().unwrap();
            if focus_other {
                ctx.set_next_window_focus();
            }
            ctx.begin("Other", WindowOption::NONE);
            ctx.end().unwrap();
            ctx.end_frame();
            modal
        };
        build(&mut ctx, true, false);
        let modal = build(&mut ctx, false, true);
        assert_eq!(ctx.focused_window(), Some(Id::from_label("Other")));
        let order = ctx.display_order();
        let pos = |id: Id| order.iter().position(|o| *o == id).unwrap();
        assert!(pos(modal) > pos(Id::from_label("Other")));
        assert!(pos(modal) > pos(Id::from_label("Host")));
    }

    #[test]
    fn click_in_child_popup_keeps_parent_open() {
        let mut ctx = Context::new();
        let build = |ctx: &mut Context, open_outer: bool, open_inner: bool| {
            ctx.new_frame();
            ctx.begin("Host", WindowOption::NONE);
            if open_outer {
                ctx.open_popup("outer");
            }
            let mut inner_rect = None;
            if ctx.begin_popup("outer") {
                ctx.text("outer");
                if open_inner {
                    ctx.open_popup("inner");
                }
                if ctx.begin_popup("inner") {
                    ctx.text("inner");
                    let (pos, size) = (ctx.get_window_pos(), ctx.get_window_size());
                    inner_rect = Some(rect(pos.x, pos.y, size.x, size.y));
                    ctx.end_popup().unwrap();
                }
                ctx.end_popup().unwrap();
            }
            ctx.end().unwrap();
            ctx.end_frame();
            (ctx.popups.len(), inner_rect)
        };
        ctx.input_mut().mousemove(40, 40);
        build(&mut ctx, true, false);
        ctx.input_mut().mousemove(300, 200);
        build(&mut ctx, false, true);
        let (open, inner) = build(&mut ctx, false, false);
        assert_eq!(open, 2);
        let inner = inner.unwrap();

        press(&mut ctx, inner.x + inner.width / 2, inner.y + inner.height / 2);
        assert_eq!(build(&mut ctx, false, false).0, 2);
        release(&mut ctx, inner.x + inner.width / 2, inner.y + inner.height / 2);
        build(&mut ctx, false, false);

        press(&mut ctx, 1000, 700);
        assert_eq!(build(&mut ctx, false, false).0, 0);
    }

    #[test]
    fn item_click_opens_popup_begun_by_name() {
        let mut ctx = Context::new();
        let build = |ctx: &mut Context| {
            ctx.new_frame();
            ctx.set_next_window_pos(vec2(0, 0), Cond::Always, (0.0, 0.0));
            ctx.begin("Host", WindowOption::NONE);
            ctx.button("Item");
            let r = ctx.item_rect();
            ctx.open_popup_on_item_click(Some("actions"), PopupOptions::popup());
            let open = ctx.begin_popup("actions");
            if open {
                ctx.end_popup().unwrap();
            }
            ctx.end().unwrap();
            ctx.end_frame();
            (r, open)
        };
        let (r, open) = build(&mut ctx);
        assert!(!open);
        let (x, y) = (r.x + r.width / 2, r.y + r.height / 2);

        ctx.input_mut().mouseup(r.x + r.width + 200, y, MouseButton::RIGHT);
        assert!(!build(&mut ctx).1);

        ctx.input_mut().mousedown(x, y, MouseButton::RIGHT);
        assert!(!build(&mut ctx).1);
        ctx.input_mut().mouseup(x, y, MouseButton::RIGHT);
        assert!(build(&mut ctx).1);
        assert!(build(&mut ctx).1);
        assert!(ctx.diagnostics().is_empty());
    }
}
