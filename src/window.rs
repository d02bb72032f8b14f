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

use tracing::{debug, trace};

use crate::condition::Conditional;
use crate::context::StackFrame;
use crate::routing::ItemFlags;
use crate::*;

const DEFAULT_WINDOW_POS: i32 = 60;
const TOOLTIP_OFFSET: (i32, i32) = (16, 10);

impl Context {
    /// Begins a top-level window. Returns `false` when it is collapsed or closed and its content can be skipped.
    /// [`Context::end`] must be called either way.
    pub fn begin(&mut self, name: &str, flags: WindowOption) -> bool {
        self.begin_container(Id::from_label(name), name, ContainerKind::Window, flags, None, None)
    }

    /// Like [`Context::begin`] with a close button bound to `open`. A closed window is kept hidden.
    pub fn begin_closable(&mut self, name: &str, open: &mut bool, flags: WindowOption) -> bool {
        self.begin_container(Id::from_label(name), name, ContainerKind::Window, flags, None, Some(open))
    }

    /// Ends the window or child region begun last.
    pub fn end(&mut self) -> Result<(), UiError> { self.end_container(&[ContainerKind::Window, ContainerKind::Child]) }

    /// Begins a scrollable region laid out as one item of the current container.
    /// A zero dimension takes the remaining space on that axis, a negative one leaves that much free.
    pub fn begin_child(&mut self, str_id: &str, size: (i32, i32), flags: WindowOption) -> bool {
        let id = self.ids.get_id(str_id);
        let avail = self.content_region_avail();
        let w = match size.0 {
            w if w > 0 => w,
            w => max(1, avail.x + w),
        };
        let h = match size.1 {
            h if h > 0 => h,
            h => max(1, avail.y + h),
        };
        let Some(r) = self.layout_item(w, h, "begin_child") else { return false };
        self.item_add(Id::NONE, r, ItemFlags::NO_INTERACT, str_id);
        self.begin_container(id, str_id, ContainerKind::Child, flags | WindowOption::NO_TITLE | WindowOption::NO_RESIZE, Some(r), None)
    }

    /// Ends a region begun with [`Context::begin_child`].
    pub fn end_child(&mut self) -> Result<(), UiError> { self.end_container(&[ContainerKind::Child]) }

    /// Begins a tooltip next to the pointer. Returns `false` when the content should be skipped.
    pub fn begin_tooltip(&mut self) -> bool {
        let name = format!("##Tooltip_{:02}", self.tooltip_count);
        self.tooltip_count += 1;
        let mouse = self.input.mouse_pos();
        let pos = vec2(mouse.x + TOOLTIP_OFFSET.0, mouse.y + TOOLTIP_OFFSET.1);
        self.next_window.pos = Some(Conditional { value: (pos, (0.0, 0.0)), cond: Cond::Always });
        let flags = WindowOption::NO_TITLE | WindowOption::AUTO_SIZE | WindowOption::NO_INPUTS | WindowOption::NO_NAV | WindowOption::NO_SCROLLBAR;
        self.begin_container(Id::from_label(&name), &name, ContainerKind::Tooltip, flags, None, None)
    }

    /// Ends a tooltip.
    pub fn end_tooltip(&mut self) -> Result<(), UiError> { self.end_container(&[ContainerKind::Tooltip]) }

    /// Shows a one-line tooltip.
    pub fn set_tooltip(&mut self, text: &str) {
        if self.begin_tooltip() {
            self.text(text);
        }
        let _ = self.end_tooltip();
    }

    /// Runs `f` inside a window when it is not collapsed. Ends the window on every path.
    pub fn window<R>(&mut self, name: &str, flags: WindowOption, f: impl FnOnce(&mut Self) -> R) -> Option<R> {
        let r = if self.begin(name, flags) { Some(f(self)) } else { None };
        let _ = self.end();
        r
    }

    /// Runs `f` inside a child region.
    pub fn child<R>(&mut self, str_id: &str, size: (i32, i32), flags: WindowOption, f: impl FnOnce(&mut Self) -> R) -> Option<R> {
        let r = if self.begin_child(str_id, size, flags) { Some(f(self)) } else { None };
        let _ = self.end_child();
        r
    }

    /// Runs `f` inside a tooltip.
    pub fn tooltip<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> Option<R> {
        let r = if self.begin_tooltip() { Some(f(self)) } else { None };
        let _ = self.end_tooltip();
        r
    }

    pub(crate) fn begin_container(
        &mut self,
        id: Id,
        name: &str,
        kind: ContainerKind,
        flags: WindowOption,
        fixed: Option<Recti>,
        mut open: Option<&mut bool>,
    ) -> bool {
        let frame = self.frame;
        let parent = match kind {
            ContainerKind::Child => self.current_container_id(),
            k if k.is_popup() => self.popups.entry(id).map(|e| e.opener).filter(|o| !o.is_none()),
            _ => None,
        };
        let parent_clip = match (kind, parent) {
            (ContainerKind::Child, Some(p)) => self.containers.get(p).map_or(UNCLIPPED_RECT, |c| c.draw.current_clip_rect()),
            _ => UNCLIPPED_RECT,
        };
        let first_seen = self.seen_ids.insert(id);
        let stored = if kind == ContainerKind::Window { self.layout_store.as_ref().map(|s| s.load(id)) } else { None };

        let created = !self.containers.contains(id);
        if created {
            let mut c = Container::new(id, name, kind, flags);
            let (w, h) = self.config.default_window_size;
            c.rect = rect(DEFAULT_WINDOW_POS, DEFAULT_WINDOW_POS, w, h);
            if let Some(Some(rec)) = stored {
                c.rect = rect(rec.x, rec.y, rec.width, rec.height);
                c.collapsed = rec.collapsed;
                if let Some(o) = open.as_deref_mut() {
                    *o = rec.open;
                }
            }
            c.layout_dirty = true;
            self.containers.insert(id, c, frame);
        } else {
            self.containers.touch(id, frame);
        }

        let next = std::mem::take(&mut self.next_window);
        let style = *self.style();
        let (display_w, display_h) = (self.config.display_width, self.config.display_height);
        let line_height = self.font.line_height();
        let Some(c) = self.containers.get_mut(id) else { return false };

        if c.active && c.begun_frame == frame {
            // appending to a container already begun this frame
            trace!(%id, "appending to container");
            let id_depth = self.ids.depth() + 1;
            self.ids.push_seed(id);
            self.stack.push(StackFrame { id, kind: c.kind, id_depth });
            c.draw.push_clip_rect(c.clip);
            return !c.collapsed && !c.hidden;
        }

        let hidden = open.as_deref().is_some_and(|o| !*o);
        // a closed window stays active, so reopening it counts as appearing
        let appearing = created || !c.was_active || (c.hidden && !hidden);
        c.appearing = appearing;
        c.active = true;
        c.begun_frame = frame;
        c.kind = kind;
        c.flags = flags;
        if c.name != name {
            c.name = name.to_string();
        }
        c.parent = parent;
        c.children.clear();
        c.items.clear();
        c.draw.reset(id);
        if hidden != c.hidden {
            c.layout_dirty = true;
        }
        c.hidden = hidden;

        let inputs = CondInputs { first_seen, has_persisted: stored.map(|r| r.is_some()), appearing };
        if let Some((w, h)) = next.size.and_then(|s| s.resolve(inputs)) {
            if w > 0 {
                c.rect.width = w;
            }
            if h > 0 {
                c.rect.height = h;
            }
            c.layout_dirty = true;
        }
        if let Some((pos, (px, py))) = next.pos.and_then(|p| p.resolve(inputs)) {
            c.rect.x = pos.x - (c.rect.width as f32 * px) as i32;
            c.rect.y = pos.y - (c.rect.height as f32 * py) as i32;
            c.layout_dirty = true;
        }
        if let Some(collapsed) = next.collapsed.and_then(|v| v.resolve(inputs)) {
            c.collapsed = collapsed;
            c.layout_dirty = true;
        }
        if let Some(scroll) = next.scroll {
            c.scroll = scroll;
        }
        c.explicit_content = next.content_size;
        c.bg_alpha = next.bg_alpha;

        let has_title = flags.has_title() && matches!(kind, ContainerKind::Window | ContainerKind::Modal);
        let title_h = if has_title { style.title_height } else { 0 };
        let menu_h = if flags.contains(WindowOption::MENU_BAR) { line_height + style.frame_padding * 2 } else { 0 };
        let pad = if kind == ContainerKind::Child && !flags.contains(WindowOption::BORDER) { 0 } else { style.window_padding };
        if !has_title {
            c.collapsed = false;
        }
        if let Some(fixed) = fixed {
            c.rect = fixed;
        }
        if flags.is_auto_sized() {
            let cs = c.explicit_content.map_or(c.content_size, |(w, h)| vec2(w, h));
            c.rect.width = max(1, cs.x + pad * 2);
            c.rect.height = max(1, cs.y + pad * 2 + title_h + menu_h);
        }
        if kind.is_popup() || kind == ContainerKind::Tooltip {
            c.rect.x = c.rect.x.min(display_w - c.rect.width).max(0);
            c.rect.y = c.rect.y.min(display_h - c.rect.height).max(0);
        }

        let id_depth = self.ids.depth() + 1;
        self.ids.push_seed(id);
        c.id_depth = id_depth;
        self.stack.push(StackFrame { id, kind, id_depth });
        if kind.is_root() {
            self.frame_roots.push(id);
        }
        if let Some(p) = parent.filter(|_| kind == ContainerKind::Child).and_then(|p| self.containers.get_mut(p)) {
            p.children.push(id);
        }

        if kind == ContainerKind::Window && appearing && !flags.contains(WindowOption::NO_FOCUS_ON_APPEARING) {
            self.focus_window(Some(id));
        } else if kind.is_popup() && appearing {
            self.focused = Some(id);
        }
        if next.focus {
            self.focus_window(Some(id));
        }

        let Some(c) = self.containers.get_mut(id) else { return false };
        if c.hidden {
            c.hit_rect = Recti::default();
            return false;
        }
        if kind == ContainerKind::Modal {
            let dim = self.scopes.style().colors[ColorId::ModalDim as usize];
            c.draw.draw_rect(rect(0, 0, display_w, display_h), dim);
        }
        c.draw.push_clip_rect(intersect_rect(c.rect, parent_clip));

        if has_title {
            self.title_bar_behavior(id, title_h, &flags, open.as_deref_mut());
        }
        self.resize_behavior(id, &style, &flags);
        self.layout_container(id, &style, title_h, menu_h, pad, parent_clip, open.is_some());

        // a child scrolled out of its parent has nothing to draw
        self.containers.get(id).is_some_and(|c| !c.collapsed && (c.kind != ContainerKind::Child || !is_empty_rect(c.clip)))
    }

    fn title_bar_behavior(&mut self, id: Id, title_h: i32, flags: &WindowOption, open: Option<&mut bool>) {
        let Some(r) = self.containers.get(id).map(|c| c.rect) else { return };
        let tr = rect(r.x, r.y, r.width, title_h);

        if flags.is_movable() {
            let move_id = self.ids.get_id("#MOVE");
            self.item_add(move_id, tr, ItemFlags::NO_NAV | ItemFlags::NO_TAB_STOP, "#MOVE");
            let st = self.button_behavior(move_id, tr, ButtonFlags::NO_NAV, ItemKind::WindowChrome);
            let delta = self.input.mouse_delta();
            if st.held && (delta.x != 0 || delta.y != 0) {
                if let Some(c) = self.containers.get_mut(id) {
                    c.rect.x += delta.x;
                    c.rect.y += delta.y;
                    c.layout_dirty = true;
                }
            }
        }
        if !flags.contains(WindowOption::NO_COLLAPSE) {
            let collapse_id = self.ids.get_id("#COLLAPSE");
            let br = rect(r.x, r.y, title_h, title_h);
            self.item_add(collapse_id, br, ItemFlags::NO_NAV | ItemFlags::NO_TAB_STOP, "#COLLAPSE");
            if self.button_behavior(collapse_id, br, ButtonFlags::NO_NAV, ItemKind::WindowChrome).pressed {
                if let Some(c) = self.containers.get_mut(id) {
                    c.collapsed = !c.collapsed;
                    c.layout_dirty = true;
                    debug!(%id, collapsed = c.collapsed, "window collapse toggled");
                }
            }
        }
        if let Some(open) = open {
            let close_id = self.ids.get_id("#CLOSE");
            let br = rect(r.x + r.width - title_h, r.y, title_h, title_h);
            self.item_add(close_id, br, ItemFlags::NO_NAV | ItemFlags::NO_TAB_STOP, "#CLOSE");
            if self.button_behavior(close_id, br, ButtonFlags::NO_NAV, ItemKind::WindowChrome).pressed {
                *open = false;
            }
        }
    }

    fn resize_behavior(&mut self, id: Id, style: &Style, flags: &WindowOption) {
        let Some(c) = self.containers.get(id) else { return };
        if c.kind != ContainerKind::Window || c.collapsed || !flags.is_resizable() {
            return;
        }
        let r = c.rect;
        let sz = style.scrollbar_size;
        let grip = rect(r.x + r.width - sz, r.y + r.height - sz, sz, sz);
        let resize_id = self.ids.get_id("#RESIZE");
        self.item_add(resize_id, grip, ItemFlags::NO_NAV | ItemFlags::NO_TAB_STOP, "#RESIZE");
        let st = self.button_behavior(resize_id, grip, ButtonFlags::NO_NAV, ItemKind::WindowChrome);
        let delta = self.input.mouse_delta();
        if st.held && (delta.x != 0 || delta.y != 0) {
            if let Some(c) = self.containers.get_mut(id) {
                c.rect.width = max(style.window_min_size, c.rect.width + delta.x);
                c.rect.height = max(style.window_min_size, c.rect.height + delta.y);
                c.layout_dirty = true;
            }
        }
    }

    // computes body, scrollbar and layout, then paints the chrome
    #[allow(clippy::too_many_arguments)]
    fn layout_container(&mut self, id: Id, style: &Style, title_h: i32, menu_h: i32, pad: i32, parent_clip: Recti, closable: bool) {
        let Some(c) = self.containers.get(id) else { return };
        let (kind, flags, r, collapsed) = (c.kind, c.flags, c.rect, c.collapsed);
        let outer = if collapsed { rect(r.x, r.y, r.width, title_h) } else { r };
        let content_h = c.explicit_content.map_or(c.content_size.y, |(_, h)| h);

        let mut body = if collapsed { rect(r.x, r.y + title_h, r.width, 0) } else { rect(r.x, r.y + title_h, r.width, r.height - title_h) };
        let menu_bar = rect(body.x, body.y, body.width, if collapsed { 0 } else { menu_h });
        body.y += menu_bar.height;
        body.height = max(0, body.height - menu_bar.height);

        let view_h = body.height - pad * 2;
        let mut scrollbar = None;
        if !collapsed && !flags.contains(WindowOption::NO_SCROLLBAR) && content_h > view_h {
            let sbw = style.scrollbar_size;
            let track = rect(body.x + body.width - sbw, body.y, sbw, body.height);
            body.width = max(0, body.width - sbw);
            let max_scroll = content_h - view_h;
            let thumb_h = max(style.grab_min_size, track.height * view_h / max(1, content_h)).min(track.height);
            let sb_id = self.ids.get_id("#SCROLLY");
            self.item_add(sb_id, track, ItemFlags::NO_NAV | ItemFlags::NO_TAB_STOP, "#SCROLLY");
            let st = self.button_behavior(sb_id, track, ButtonFlags::NO_NAV, ItemKind::WindowChrome);
            let dy = self.input.mouse_delta().y;
            let Some(c) = self.containers.get_mut(id) else { return };
            if st.held && dy != 0 {
                c.scroll.y += dy * max_scroll / max(1, track.height - thumb_h);
            }
            c.scroll.y = c.scroll.y.clamp(0, max_scroll);
            let thumb_y = track.y + (track.height - thumb_h) * c.scroll.y / max(1, max_scroll);
            scrollbar = Some((track, rect(track.x, thumb_y, track.width, thumb_h), st.hovered || st.held));
        } else if let Some(c) = self.containers.get_mut(id) {
            c.scroll.y = 0;
        }

        let focused = self.focused == Some(self.root_of(id));
        let bg_id = match kind {
            ContainerKind::Window => ColorId::WindowBg,
            ContainerKind::Child => ColorId::ChildBg,
            _ => ColorId::PopupBg,
        };
        let mut bg = self.style_color(bg_id);
        let title_bg = self.style_color(if focused { ColorId::TitleBgActive } else { ColorId::TitleBg });
        let title_text = self.style_color(ColorId::TitleText);
        let border = self.style_color(ColorId::Border);
        let menu_bg = self.style_color(ColorId::MenuBarBg);
        let track_bg = self.style_color(ColorId::ScrollbarBg);
        let grab = self.style_color(ColorId::ScrollbarGrab);
        let grab_hot = self.style_color(ColorId::ScrollbarGrab.hovered());
        let text_color = self.style_color(ColorId::Text);
        let label = display_label(&self.containers.get(id).map(|c| c.name.clone()).unwrap_or_default()).to_string();

        let Some(c) = self.containers.get_mut(id) else { return };
        if let Some(alpha) = c.bg_alpha {
            bg.a = (alpha.clamp(0.0, 1.0) * 255.0) as u8;
        }
        if !flags.contains(WindowOption::NO_BACKGROUND) {
            c.draw.draw_rect(outer, bg);
        }
        let wants_border = style.border_size > 0 && (kind != ContainerKind::Child || flags.contains(WindowOption::BORDER));
        if wants_border {
            c.draw.draw_box(outer, border);
        }
        if title_h > 0 {
            let tr = rect(r.x, r.y, r.width, title_h);
            c.draw.draw_rect(tr, title_bg);
            let text_y = tr.y + (title_h - self.font.line_height()) / 2;
            let mut text_x = tr.x + style.frame_padding;
            if !flags.contains(WindowOption::NO_COLLAPSE) {
                let icon = if collapsed { Icon::Collapsed } else { Icon::Expanded };
                c.draw.draw_icon(icon, rect(tr.x, tr.y, title_h, title_h), title_text);
                text_x = tr.x + title_h;
            }
            c.draw.draw_text(self.font.as_ref(), &label, vec2(text_x, text_y), title_text);
            if closable {
                c.draw.draw_icon(Icon::Close, rect(tr.x + tr.width - title_h, tr.y, title_h, title_h), title_text);
            }
        }
        if menu_bar.height > 0 {
            c.draw.draw_rect(menu_bar, menu_bg);
        }
        if let Some((track, thumb, hot)) = scrollbar {
            c.draw.draw_rect(track, track_bg);
            c.draw.draw_rect(thumb, if hot { grab_hot } else { grab });
        }
        if kind == ContainerKind::Window && !collapsed && flags.is_resizable() {
            let sz = style.scrollbar_size;
            c.draw.draw_icon(Icon::ResizeGrip, rect(r.x + r.width - sz, r.y + r.height - sz, sz, sz), text_color);
        }

        c.body = body;
        c.menu_bar = menu_bar;
        c.hit_rect = intersect_rect(outer, parent_clip);
        c.clip = intersect_rect(body, parent_clip);
        let inner = rect(body.x + pad, body.y + pad, max(0, body.width - pad * 2), max(0, body.height - pad * 2));
        c.layout.reset(inner, c.scroll);
        c.draw.truncate_clip(0);
        c.draw.push_clip_rect(c.clip);
    }

    pub(crate) fn end_container(&mut self, expected: &[ContainerKind]) -> Result<(), UiError> {
        let Some(top) = self.stack.last().copied() else {
            let err = UiError::ImbalancedScope { stack: ScopeKind::Container, imbalance: Imbalance::PopOnEmpty };
            self.report(err.clone());
            return Err(err);
        };
        if !expected.contains(&top.kind) {
            let err = UiError::ImbalancedScope {
                stack: ScopeKind::Container,
                imbalance: Imbalance::Mismatched { expected: expected[0], found: top.kind },
            };
            self.report(err.clone());
            return Err(err);
        }
        self.end_container_unchecked();
        Ok(())
    }

    pub(crate) fn end_container_unchecked(&mut self) {
        let Some(top) = self.stack.pop() else { return };
        let mut residuals = Vec::new();
        if let Some(c) = self.containers.get_mut(top.id) {
            if c.layout.in_menu_bar() {
                c.layout.end_menu_bar();
                residuals.push((ScopeKind::MenuBar, 1));
            }
            let groups = c.layout.clear_groups();
            if groups > 0 {
                residuals.push((ScopeKind::Group, groups));
            }
            c.content_size = c.layout.content_size();
            let max_scroll = c.max_scroll();
            c.scroll = vec2(c.scroll.x.clamp(0, max_scroll.x), c.scroll.y.clamp(0, max_scroll.y));
            c.draw.truncate_clip(0);
        }
        let extra = self.ids.truncate(top.id_depth);
        if extra > 0 {
            residuals.push((ScopeKind::Id, extra));
        }
        self.ids.truncate(top.id_depth.saturating_sub(1));
        for (stack, n) in residuals {
            self.report(UiError::ImbalancedScope { stack, imbalance: Imbalance::Residual(n) });
        }
    }

    /// Gives keyboard focus to the window containing `id` and raises it. `None` clears focus.
    pub(crate) fn focus_window(&mut self, id: Option<Id>) {
        let root = id.map(|id| self.root_of(id));
        if self.focused != root {
            trace!(window = ?root, "focus changed");
            self.focused = root;
        }
        let Some(root) = root else { return };
        if let Some(c) = self.containers.get_mut(root) {
            if c.kind == ContainerKind::Window && !c.flags.contains(WindowOption::NO_BRING_TO_FRONT) {
                self.last_zindex += 1;
                c.zindex = self.last_zindex;
            }
        }
    }

    pub(crate) fn update_mouse_focus(&mut self) {
        if self.input.mouse_pressed().is_none() || self.routing.hover_blocked {
            return;
        }
        let hovered = self.routing.hovered_window.map(|w| self.root_of(w));
        let keep_from = hovered.and_then(|h| self.popups.index_of(h)).map_or(0, |i| i + 1);
        self.popups.close_above_on_click(keep_from);
        self.focus_window(hovered);
    }

    pub(crate) fn update_wheel_scroll(&mut self) {
        let delta = self.input.scroll_delta();
        if delta.x == 0 && delta.y == 0 {
            return;
        }
        let step = self.config.scroll_step;
        let mut target = self.routing.hovered_window;
        while let Some(id) = target {
            let Some(c) = self.containers.get_mut(id) else { break };
            let max_scroll = c.max_scroll();
            if !c.flags.contains(WindowOption::NO_SCROLLBAR) && (max_scroll.y > 0 || max_scroll.x > 0) {
                c.scroll.x = (c.scroll.x + delta.x * step).clamp(0, max_scroll.x);
                c.scroll.y = (c.scroll.y + delta.y * step).clamp(0, max_scroll.y);
                trace!(%id, scroll_y = c.scroll.y, "wheel scroll");
                break;
            }
            target = if c.kind == ContainerKind::Child { c.parent } else { None };
        }
    }

    /// Claims a `w` x `h` rectangle from the current container's layout.
    pub(crate) fn layout_item(&mut self, w: i32, h: i32, operation: &'static str) -> Option<Recti> {
        let spacing = self.style().item_spacing;
        match self.current_container_mut() {
            Some(c) => Some(c.layout.add_item(w, h, spacing)),
            None => {
                self.report(UiError::InvalidContainerReference { id: Id::NONE, operation });
                None
            }
        }
    }

    fn current_or_report(&mut self, operation: &'static str) -> Option<Id> {
        let id = self.current_container_id();
        if id.is_none() {
            self.report(UiError::InvalidContainerReference { id: Id::NONE, operation });
        }
        id
    }

    fn named_or_report(&mut self, name: &str, operation: &'static str) -> Result<Id, UiError> {
        let id = Id::from_label(name);
        if self.containers.contains(id) {
            Ok(id)
        } else {
            let err = UiError::InvalidContainerReference { id, operation };
            self.report(err.clone());
            Err(err)
        }
    }

    /// Positions the next window. `pivot` picks the point of the window placed at `pos`: `(0.5, 0.5)` centers it.
    pub fn set_next_window_pos(&mut self, pos: Vec2i, cond: Cond, pivot: (f32, f32)) {
        self.next_window.pos = Some(Conditional { value: (pos, pivot), cond });
    }

    /// Sizes the next window. A zero dimension keeps the current size on that axis.
    pub fn set_next_window_size(&mut self, size: (i32, i32), cond: Cond) { self.next_window.size = Some(Conditional { value: size, cond }); }

    /// Collapses or expands the next window.
    pub fn set_next_window_collapsed(&mut self, collapsed: bool, cond: Cond) {
        self.next_window.collapsed = Some(Conditional { value: collapsed, cond });
    }

    /// Focuses and raises the next window.
    pub fn set_next_window_focus(&mut self) { self.next_window.focus = true; }

    /// Sets the scroll offset of the next window.
    pub fn set_next_window_scroll(&mut self, scroll: Vec2i) { self.next_window.scroll = Some(scroll); }

    /// Overrides the content size used for scrolling of the next window.
    pub fn set_next_window_content_size(&mut self, size: (i32, i32)) { self.next_window.content_size = Some(size); }

    /// Overrides the background opacity of the next window.
    pub fn set_next_window_bg_alpha(&mut self, alpha: f32) { self.next_window.bg_alpha = Some(alpha); }

    /// Moves the current window.
    pub fn set_window_pos(&mut self, pos: Vec2i) {
        if let Some(id) = self.current_or_report("set_window_pos") {
            self.set_window_pos_by_id(id, pos);
        }
    }

    /// Moves the window called `name`.
    pub fn set_window_pos_by_name(&mut self, name: &str, pos: Vec2i) -> Result<(), UiError> {
        let id = self.named_or_report(name, "set_window_pos")?;
        self.set_window_pos_by_id(id, pos);
        Ok(())
    }

    fn set_window_pos_by_id(&mut self, id: Id, pos: Vec2i) {
        if let Some(c) = self.containers.get_mut(id) {
            c.rect.x = pos.x;
            c.rect.y = pos.y;
            c.layout_dirty = true;
        }
    }

    /// Resizes the current window. Takes effect next frame.
    pub fn set_window_size(&mut self, size: (i32, i32)) {
        if let Some(id) = self.current_or_report("set_window_size") {
            self.set_window_size_by_id(id, size);
        }
    }

    /// Resizes the window called `name`.
    pub fn set_window_size_by_name(&mut self, name: &str, size: (i32, i32)) -> Result<(), UiError> {
        let id = self.named_or_report(name, "set_window_size")?;
        self.set_window_size_by_id(id, size);
        Ok(())
    }

    fn set_window_size_by_id(&mut self, id: Id, (w, h): (i32, i32)) {
        if let Some(c) = self.containers.get_mut(id) {
            c.rect.width = w;
            c.rect.height = h;
            c.layout_dirty = true;
        }
    }

    /// Collapses or expands the current window.
    pub fn set_window_collapsed(&mut self, collapsed: bool) {
        if let Some(id) = self.current_or_report("set_window_collapsed") {
            if let Some(c) = self.containers.get_mut(id) {
                c.collapsed = collapsed;
                c.layout_dirty = true;
            }
        }
    }

    /// Collapses or expands the window called `name`.
    pub fn set_window_collapsed_by_name(&mut self, name: &str, collapsed: bool) -> Result<(), UiError> {
        let id = self.named_or_report(name, "set_window_collapsed")?;
        if let Some(c) = self.containers.get_mut(id) {
            c.collapsed = collapsed;
            c.layout_dirty = true;
        }
        Ok(())
    }

    /// Focuses and raises the current window.
    pub fn set_window_focus(&mut self) {
        if let Some(id) = self.current_or_report("set_window_focus") {
            self.focus_window(Some(id));
        }
    }

    /// Focuses and raises the window called `name`.
    pub fn set_window_focus_by_name(&mut self, name: &str) -> Result<(), UiError> {
        let id = self.named_or_report(name, "set_window_focus")?;
        self.focus_window(Some(id));
        Ok(())
    }

    fn current_container(&self) -> Option<&Container> { self.current_container_id().and_then(|id| self.containers.get(id)) }

    /// Top-left corner of the current window.
    pub fn get_window_pos(&self) -> Vec2i { self.current_container().map_or(vec2(0, 0), |c| vec2(c.rect.x, c.rect.y)) }

    /// Outer size of the current window.
    pub fn get_window_size(&self) -> Vec2i { self.current_container().map_or(vec2(0, 0), |c| vec2(c.rect.width, c.rect.height)) }

    /// Outer width of the current window.
    pub fn get_window_width(&self) -> i32 { self.get_window_size().x }

    /// Outer height of the current window.
    pub fn get_window_height(&self) -> i32 { self.get_window_size().y }

    /// Returns `true` when the current window is collapsed.
    pub fn is_window_collapsed(&self) -> bool { self.current_container().is_some_and(|c| c.collapsed) }

    /// Returns `true` on the frame the current window became visible.
    pub fn is_window_appearing(&self) -> bool { self.current_container().is_some_and(|c| c.appearing) }

    /// Returns `true` when the window containing the current container has focus.
    pub fn is_window_focused(&self) -> bool { self.current_container_id().is_some_and(|id| self.focused == Some(self.root_of(id))) }

    /// Returns `true` when the current container is the one under the pointer.
    pub fn is_window_hovered(&self) -> bool { self.current_container_id().is_some_and(|id| self.routing.hovered_window == Some(id)) }

    /// Space left in the current container from the layout cursor.
    pub fn content_region_avail(&self) -> Vec2i { self.current_container().map_or(vec2(0, 0), |c| c.layout.avail()) }

    /// Layout cursor in content coordinates.
    pub fn get_cursor_pos(&self) -> Vec2i {
        self.current_container().map_or(vec2(0, 0), |c| {
            let (cur, origin) = (c.layout.cursor(), c.layout.origin());
            vec2(cur.x - origin.x, cur.y - origin.y)
        })
    }

    /// Moves the layout cursor, in content coordinates.
    pub fn set_cursor_pos(&mut self, pos: Vec2i) {
        if let Some(c) = self.current_container_mut() {
            let origin = c.layout.origin();
            c.layout.set_cursor(vec2(origin.x + pos.x, origin.y + pos.y));
        }
    }

    /// Layout cursor in screen coordinates.
    pub fn get_cursor_screen_pos(&self) -> Vec2i { self.current_container().map_or(vec2(0, 0), |c| c.layout.cursor()) }

    /// Horizontal scroll offset of the current container.
    pub fn scroll_x(&self) -> i32 { self.current_container().map_or(0, |c| c.scroll.x) }

    /// Vertical scroll offset of the current container.
    pub fn scroll_y(&self) -> i32 { self.current_container().map_or(0, |c| c.scroll.y) }

    /// Largest horizontal scroll offset of the current container.
    pub fn scroll_max_x(&self) -> i32 { self.current_container().map_or(0, |c| c.max_scroll().x) }

    /// Largest vertical scroll offset of the current container.
    pub fn scroll_max_y(&self) -> i32 { self.current_container().map_or(0, |c| c.max_scroll().y) }

    /// Sets the horizontal scroll offset. Clamped when the container ends.
    pub fn set_scroll_x(&mut self, x: i32) {
        if let Some(c) = self.current_container_mut() {
            c.scroll.x = max(0, x);
        }
    }

    /// Sets the vertical scroll offset. Clamped when the container ends.
    pub fn set_scroll_y(&mut self, y: i32) {
        if let Some(c) = self.current_container_mut() {
            c.scroll.y = max(0, y);
        }
    }

    /// Scrolls so the layout cursor ends up at `ratio` of the visible height (0 top, 1 bottom).
    pub fn set_scroll_here_y(&mut self, ratio: f32) {
        if let Some(c) = self.current_container_mut() {
            let view = c.layout.body();
            let cursor_y = c.layout.cursor().y - c.layout.origin().y;
            c.scroll.y = max(0, cursor_y - (view.height as f32 * ratio.clamp(0.0, 1.0)) as i32);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nested_child_restores_stacks() {
        let mut ctx = Context::new();
        ctx.new_frame();
        assert!(ctx.begin("A", WindowOption::NONE));
        let base = ctx.id_stack_depth();
        assert!(ctx.begin_child("B", (100, 80), WindowOption::NONE));
        assert_eq!(ctx.container_stack_depth(), 2);
        ctx.end_child().unwrap();
        assert_eq!(ctx.id_stack_depth(), base);
        ctx.end().unwrap();
        assert_eq!(ctx.container_stack_depth(), 0);
        assert_eq!(ctx.id_stack_depth(), 0);
        ctx.end_frame();
        assert!(ctx.diagnostics().is_empty());
    }

    #[test]
    fn once_applies_only_on_first_sight() {
        let mut ctx = Context::new();
        for frame in 1..=5 {
            ctx.new_frame();
            let target = if frame == 1 { vec2(10, 10) } else { vec2(200, 200) };
            ctx.set_next_window_pos(target, Cond::Once, (0.0, 0.0));
            ctx.begin("W", WindowOption::NONE);
            assert_eq!(ctx.get_window_pos(), vec2(10, 10));
            ctx.end().unwrap();
            ctx.end_frame();
        }
    }

    #[test]
    fn always_applies_every_frame() {
        let mut ctx = Context::new();
        for x in [10, 20, 30] {
            ctx.new_frame();
            ctx.set_next_window_pos(vec2(x, 5), Cond::Always, (0.0, 0.0));
            ctx.begin("W", WindowOption::NONE);
            assert_eq!(ctx.get_window_pos(), vec2(x, 5));
            ctx.end().unwrap();
            ctx.end_frame();
        }
    }

    #[test]
    fn first_use_ever_defers_to_store() {
        let mut store = MemoryLayoutStore::new();
        store.store(Id::from_label("Saved"), LayoutRecord { x: 5, y: 6, width: 300, height: 200, collapsed: false, open: true });
        let mut ctx = Context::new();
        ctx.set_layout_store(Box::new(store));
        ctx.new_frame();
        ctx.set_next_window_size((640, 480), Cond::FirstUseEver);
        ctx.begin("Saved", WindowOption::NONE);
        assert_eq!(ctx.get_window_size(), vec2(300, 200));
        ctx.end().unwrap();
        ctx.set_next_window_size((640, 480), Cond::FirstUseEver);
        ctx.begin("Fresh", WindowOption::NONE);
        assert_eq!(ctx.get_window_size(), vec2(640, 480));
        ctx.end().unwrap();
        ctx.end_frame();

        let store = ctx.take_layout_store().unwrap();
        let fresh = store.load(Id::from_label("Fresh")).unwrap();
        assert_eq!((fresh.width, fresh.height), (640, 480));
    }

    #[test]
    fn closed_flag_round_trips_through_store() {
        let mut store = MemoryLayoutStore::new();
        store.store(Id::from_label("Tool"), LayoutRecord { x: 0, y: 0, width: 200, height: 100, collapsed: false, open: false });
        let mut ctx = Context::new();
        ctx.set_layout_store(Box::new(store));
        let mut open = true;
        ctx.new_frame();
        assert!(!ctx.begin_closable("Tool", &mut open, WindowOption::NONE));
        ctx.end().unwrap();
        ctx.end_frame();
        assert!(!open);

        open = true;
        ctx.new_frame();
        assert!(ctx.begin_closable("Tool", &mut open, WindowOption::NONE));
        ctx.end().unwrap();
        ctx.end_frame();
        let store = ctx.take_layout_store().unwrap();
        assert!(store.load(Id::from_label("Tool")).unwrap().open);
    }

    #[test]
    fn appearing_reapplies_after_a_gap() {
        let mut ctx = Context::new();
        let run = |ctx: &mut Context, show: bool, x: i32| {
            ctx.new_frame();
            if show {
                ctx.set_next_window_pos(vec2(x, 0), Cond::Appearing, (0.0, 0.0));
                ctx.begin("Pop", WindowOption::NONE);
                let pos = ctx.get_window_pos();
                ctx.end().unwrap();
                ctx.end_frame();
                Some(pos.x)
            } else {
                ctx.end_frame();
                None
            }
        };
        assert_eq!(run(&mut ctx, true, 10), Some(10));
        assert_eq!(run(&mut ctx, true, 20), Some(10));
        run(&mut ctx, false, 0);
        assert_eq!(run(&mut ctx, true, 30), Some(30));
    }

    #[test]
    fn reopened_window_counts_as_appearing() {
        let mut ctx = Context::new();
        let run = |ctx: &mut Context, mut open: bool, x: i32| {
            ctx.new_frame();
            ctx.set_next_window_pos(vec2(x, 0), Cond::Appearing, (0.0, 0.0));
            ctx.begin_closable("Tool", &mut open, WindowOption::NONE);
            let state = (ctx.get_window_pos().x, ctx.is_window_appearing());
            ctx.end().unwrap();
            ctx.end_frame();
            state
        };
        assert_eq!(run(&mut ctx, true, 10), (10, true));
        assert_eq!(run(&mut ctx, true, 15), (10, false));
        assert_eq!(run(&mut ctx, false, 20), (10, false));
        assert_eq!(run(&mut ctx, true, 30), (30, true));
    }

    #[test]
    fn child_outside_parent_clip_is_skipped() {
        let mut ctx = Context::new();
        ctx.new_frame();
        ctx.set_next_window_size((200, 150), Cond::Always);
        ctx.begin("Host", WindowOption::NONE);
        assert!(ctx.begin_child("Near", (50, 40), WindowOption::NONE));
        ctx.end_child().unwrap();
        ctx.set_cursor_pos(vec2(0, 1000));
        assert!(!ctx.begin_child("Far", (50, 40), WindowOption::NONE));
        ctx.end_child().unwrap();
        ctx.end().unwrap();
        ctx.end_frame();
        assert!(ctx.diagnostics().is_empty());
    }

    #[test]
    fn mismatched_end_does_not_pop() {
        let mut ctx = Context::new();
        ctx.new_frame();
        ctx.begin("A", WindowOption::NONE);
        ctx.begin_child("B", (50, 50), WindowOption::NONE);
        let err = ctx.end_tooltip().unwrap_err();
        assert_eq!(
            err,
            UiError::ImbalancedScope {
                stack: ScopeKind::Container,
                imbalance: Imbalance::Mismatched { expected: ContainerKind::Tooltip, found: ContainerKind::Child },
            }
        );
        assert_eq!(ctx.container_stack_depth(), 2);
        ctx.end_child().unwrap();
        ctx.end().unwrap();
        ctx.end_frame();
    }

    #[test]
    fn unterminated_window_is_unwound() {
        let mut ctx = Context::new();
        ctx.new_frame();
        ctx.begin("A", WindowOption::NONE);
        ctx.push_id("row");
        ctx.end_frame();
        assert_eq!(ctx.container_stack_depth(), 0);
        assert_eq!(ctx.id_stack_depth(), 0);
        let kinds: Vec<ScopeKind> = ctx
            .diagnostics()
            .iter()
            .filter_map(|d| match &d.error {
                UiError::ImbalancedScope { stack, .. } => Some(*stack),
                _ => None,
            })
            .collect();
        assert!(kinds.contains(&ScopeKind::Container));
        assert!(kinds.contains(&ScopeKind::Id));
    }

    fn two_windows(ctx: &mut Context) {
        ctx.new_frame();
        ctx.set_next_window_pos(vec2(0, 0), Cond::Always, (0.0, 0.0));
        ctx.set_next_window_size((200, 200), Cond::Always);
        ctx.begin("Back", WindowOption::NONE);
        ctx.end().unwrap();
        ctx.set_next_window_pos(vec2(100, 100), Cond::Always, (0.0, 0.0));
        ctx.set_next_window_size((200, 200), Cond::Always);
        ctx.begin("Front", WindowOption::NONE);
        ctx.end().unwrap();
        ctx.end_frame();
    }

    #[test]
    fn click_focuses_and_raises() {
        let mut ctx = Context::new();
        two_windows(&mut ctx);
        let back = Id::from_label("Back");
        let front = Id::from_label("Front");
        assert_eq!(ctx.display_order().last(), Some(&front));

        // the overlap belongs to the front window
        ctx.input_mut().mousemove(150, 150);
        ctx.input_mut().mousedown(150, 150, MouseButton::LEFT);
        two_windows(&mut ctx);
        assert_eq!(ctx.focused_window(), Some(front));
        ctx.input_mut().mouseup(150, 150, MouseButton::LEFT);
        two_windows(&mut ctx);

        ctx.input_mut().mousemove(20, 50);
        ctx.input_mut().mousedown(20, 50, MouseButton::LEFT);
        two_windows(&mut ctx);
        assert_eq!(ctx.focused_window(), Some(back));
        assert_eq!(ctx.display_order().last(), Some(&back));
    }

    #[test]
    fn wheel_scrolls_hovered_window() {
        let mut ctx = Context::with_config(ContextConfig::default().with_scroll_step(10));
        let build = |ctx: &mut Context| {
            ctx.new_frame();
            ctx.set_next_window_pos(vec2(0, 0), Cond::Always, (0.0, 0.0));
            ctx.set_next_window_size((200, 150), Cond::Always);
            ctx.begin("Long", WindowOption::NONE);
            for i in 0..40 {
                ctx.push_id(i);
                ctx.text("line");
                ctx.pop_id().unwrap();
            }
            let y = ctx.scroll_y();
            ctx.end().unwrap();
            ctx.end_frame();
            y
        };
        build(&mut ctx);
        build(&mut ctx);
        ctx.input_mut().mousemove(50, 80);
        ctx.input_mut().scroll(0, 3);
        assert_eq!(build(&mut ctx), 30);
    }

    #[test]
    fn unknown_window_name_is_reported() {
        let mut ctx = Context::new();
        ctx.new_frame();
        let err = ctx.set_window_pos_by_name("Nope", vec2(1, 1)).unwrap_err();
        assert!(matches!(err, UiError::InvalidContainerReference { operation: "set_window_pos", .. }));
        ctx.set_window_size((10, 10));
        assert_eq!(ctx.diagnostics().len(), 2);
        ctx.end_frame();
    }

    #[test]
    fn tooltip_is_topmost_and_ignores_the_pointer() {
        let mut ctx = Context::new();
        let build = |ctx: &mut Context, tip: bool| {
            ctx.new_frame();
            ctx.set_next_window_pos(vec2(0, 0), Cond::Always, (0.0, 0.0));
            ctx.set_next_window_size((400, 300), Cond::Always);
            ctx.begin("Host", WindowOption::NONE);
            ctx.button_sized("Big", (360, 200));
            let hovered = ctx.is_item_hovered();
            if tip {
                ctx.set_tooltip("details");
            }
            ctx.end().unwrap();
            ctx.end_frame();
            hovered
        };
        let tip = Id::from_label("##Tooltip_00");
        ctx.input_mut().mousemove(60, 80);
        build(&mut ctx, true);
        assert_eq!(ctx.display_order().last(), Some(&tip));

        let r = ctx.container(tip).map(|c| c.rect).unwrap();
        ctx.input_mut().mousemove(r.x + r.width / 2, r.y + r.height / 2);
        assert!(build(&mut ctx, true));
        assert_eq!(ctx.hovered_window(), Some(Id::from_label("Host")));
        assert_eq!(ctx.display_order().last(), Some(&tip));

        assert!(build(&mut ctx, false));
        assert!(!ctx.display_order().contains(&tip));
        assert!(ctx.diagnostics().is_empty());
    }
}
