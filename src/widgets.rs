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

use crate::condition::Conditional;
use crate::routing::{ButtonState, ItemFlags};
use crate::text_edit::{cursor_from_x, line_end};
use crate::*;

#[derive(Copy, Clone)]
pub(crate) struct TreeNodeState {
    pub open: bool,
    pub last_frame: usize,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
/// How [`Context::color_edit`] presents its value.
pub enum ColorDisplayMode {
    /// Red, green and blue components.
    #[default]
    Rgb,
    /// Hue, saturation and value components.
    Hsv,
    /// One hexadecimal field.
    Hex,
}

impl ColorDisplayMode {
    /// Builds the mode from independent switches. More than one set is an [`UiError::InvalidOption`].
    pub fn from_flags(rgb: bool, hsv: bool, hex: bool) -> Result<Self, UiError> {
        match (rgb, hsv, hex) {
            (_, false, false) => Ok(Self::Rgb),
            (false, true, false) => Ok(Self::Hsv),
            (false, false, true) => Ok(Self::Hex),
            _ => Err(UiError::InvalidOption { reason: "color edit accepts one display mode".to_string() }),
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
/// Options of [`Context::color_edit`].
pub struct ColorEditOptions {
    /// Display mode.
    pub mode: ColorDisplayMode,
    /// Edit the alpha component too.
    pub alpha: bool,
}

impl Default for ColorEditOptions {
    fn default() -> Self { Self { mode: ColorDisplayMode::Rgb, alpha: true } }
}

fn rgb_to_hsv(r: f32, g: f32, b: f32) -> [f32; 3] {
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let d = max - min;
    let h = if d <= f32::EPSILON {
        0.0
    } else if max == r {
        ((g - b) / d).rem_euclid(6.0) / 6.0
    } else if max == g {
        ((b - r) / d + 2.0) / 6.0
    } else {
        ((r - g) / d + 4.0) / 6.0
    };
    let s = if max <= f32::EPSILON { 0.0 } else { d / max };
    [h, s, max]
}

fn hsv_to_rgb(h: f32, s: f32, v: f32) -> [f32; 3] {
    let h6 = h.rem_euclid(1.0) * 6.0;
    let c = v * s;
    let x = c * (1.0 - (h6 % 2.0 - 1.0).abs());
    let m = v - c;
    let (r, g, b) = match h6 as i32 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };
    [r + m, g + m, b + m]
}

fn to_byte(v: f32) -> u8 { (v.clamp(0.0, 1.0) * 255.0).round() as u8 }

/// Splits `line` into pieces no wider than `width`, breaking after a space where one fits.
fn wrap_line<'a>(line: &'a str, width: i32, font: &dyn Font) -> Vec<&'a str> {
    let mut pieces = Vec::new();
    let mut rest = line;
    while font.text_width(rest) > width {
        let (mut fit, mut brk, mut w) = (0, None, 0);
        for (i, c) in rest.char_indices() {
            if c == ' ' {
                brk = Some(i + 1);
            }
            w += font.char_width(c);
            if w > width {
                break;
            }
            fit = i + c.len_utf8();
        }
        // a glyph wider than the wrap width still takes a line of its own
        let end = brk.unwrap_or(if fit > 0 { fit } else { rest.chars().next().map_or(rest.len(), char::len_utf8) });
        pieces.push(rest[..end].trim_end());
        rest = &rest[end..];
    }
    pieces.push(rest);
    pieces
}

fn char_to_byte(text: &str, n: usize) -> usize { text.char_indices().nth(n).map_or(text.len(), |(i, _)| i) }

fn segment_width(seg: &str, font: &dyn Font, password: bool) -> i32 {
    if password { font.char_width('*') * seg.chars().count() as i32 } else { font.text_width(seg) }
}

// text position under the pointer, `origin` being the top-left of the first line
fn cursor_at(text: &str, origin: Vec2i, mouse: Vec2i, font: &dyn Font, password: bool) -> usize {
    let lh = max(1, font.line_height());
    let row = max(0, (mouse.y - origin.y) / lh);
    let mut start = 0;
    for _ in 0..row {
        match text[start..].find('\n') {
            Some(p) => start += p + 1,
            None => break,
        }
    }
    let line = &text[start..line_end(text, start)];
    let x = mouse.x - origin.x;
    if password {
        let cw = max(1, font.char_width('*'));
        let n = ((x + cw / 2) / cw).clamp(0, line.chars().count() as i32) as usize;
        start + char_to_byte(line, n)
    } else {
        start + cursor_from_x(line, x, font)
    }
}

impl Context {
    pub(crate) fn paint(&mut self, f: impl FnOnce(&mut DrawList, &dyn Font)) {
        let Some(id) = self.current_container_id() else { return };
        if let Some(c) = self.containers.get_mut(id) {
            f(&mut c.draw, self.font.as_ref());
        }
    }

    /// Width for the next item, consuming a pending [`Context::set_next_item_width`].
    pub(crate) fn take_item_width(&mut self) -> i32 {
        let w = self.calc_item_width();
        self.next_item.width = None;
        w
    }

    fn frame_color(&self, base: ColorId, st: &ButtonState) -> Color {
        self.style_color(match (st.held, st.hovered) {
            (true, _) => base.active(),
            (false, true) => base.hovered(),
            _ => base,
        })
    }

    fn label_width(&self, label: &str) -> i32 {
        let shown = display_label(label);
        if shown.is_empty() { 0 } else { self.style().item_inner_spacing + self.font.text_width(shown) }
    }

    fn draw_side_label(&mut self, label: &str, x: i32, y: i32) {
        let shown = display_label(label);
        if shown.is_empty() {
            return;
        }
        let color = self.style_color(ColorId::Text);
        let x = x + self.style().item_inner_spacing;
        self.paint(|d, f| d.draw_text(f, shown, vec2(x, y), color));
    }

    /// Text in the default color. Newlines start new lines.
    pub fn text(&mut self, text: &str) {
        let color = self.style_color(ColorId::Text);
        self.text_colored(color, text);
    }

    /// Text in `color`, wrapped at the pushed text wrap position.
    pub fn text_colored(&mut self, color: Color, text: &str) {
        let lh = self.font.line_height();
        let wrap = self.text_wrap_width();
        for line in text.split('\n') {
            let pieces = match wrap {
                Some(width) => wrap_line(line, width, self.font.as_ref()),
                None => vec![line],
            };
            for piece in pieces {
                let w = self.font.text_width(piece);
                let Some(r) = self.layout_item(w, lh, "text") else { return };
                self.item_add(Id::NONE, r, ItemFlags::NO_INTERACT, piece);
                self.paint(|d, f| d.draw_text(f, piece, vec2(r.x, r.y), color));
            }
        }
    }

    /// Text wrapped at the right edge of the content region, unless a wrap position is already pushed.
    pub fn text_wrapped(&mut self, text: &str) {
        let pushed = self.scopes.wrap_pos().is_none();
        if pushed {
            self.scopes.push_wrap_pos(0);
        }
        self.text(text);
        if pushed {
            let _ = self.scopes.pop_wrap_pos();
        }
    }

    /// Text in the disabled color.
    pub fn text_disabled(&mut self, text: &str) {
        let color = self.style_color(ColorId::TextDisabled);
        self.text_colored(color, text);
    }

    /// `value` followed by `label`, laid out like a framed widget.
    pub fn label_text(&mut self, label: &str, value: &str) {
        let w = self.take_item_width();
        let h = self.font.line_height() + self.style().frame_padding * 2;
        let lw = self.label_width(label);
        let Some(r) = self.layout_item(w + lw, h, "label_text") else { return };
        self.item_add(Id::NONE, r, ItemFlags::NO_INTERACT, label);
        let color = self.style_color(ColorId::Text);
        let pad = self.style().frame_padding;
        self.paint(|d, f| d.draw_text(f, value, vec2(r.x, r.y + pad), color));
        self.draw_side_label(label, r.x + w, r.y + pad);
    }

    /// Horizontal line across the available width.
    pub fn separator(&mut self) {
        let w = self.content_region_avail().x;
        let Some(r) = self.layout_item(w, 1, "separator") else { return };
        self.item_add(Id::NONE, r, ItemFlags::NO_INTERACT, "separator");
        let color = self.style_color(ColorId::Border);
        self.paint(|d, _| d.draw_rect(r, color));
    }

    /// Places the next item on the same line. `offset` is measured from the start of the line.
    pub fn same_line(&mut self, offset: Option<i32>) {
        let spacing = self.style().item_spacing;
        if let Some(c) = self.current_container_mut() {
            c.layout.same_line(offset, spacing);
        }
    }

    /// Ends the current line, or adds an empty one.
    pub fn new_line(&mut self) {
        let (spacing, lh) = (self.style().item_spacing, self.font.line_height());
        if let Some(c) = self.current_container_mut() {
            c.layout.new_line(lh, spacing);
        }
    }

    /// Extra vertical gap.
    pub fn spacing(&mut self) {
        let gap = self.style().item_spacing;
        self.layout_item(0, gap, "spacing");
    }

    /// Reserves space without drawing anything.
    pub fn dummy(&mut self, size: (i32, i32)) {
        if let Some(r) = self.layout_item(size.0, size.1, "dummy") {
            self.item_add(Id::NONE, r, ItemFlags::NO_INTERACT, "dummy");
        }
    }

    /// Moves the line start right by `width`, or by the style's indent.
    pub fn indent(&mut self, width: Option<i32>) {
        let w = width.unwrap_or(self.style().indent);
        if let Some(c) = self.current_container_mut() {
            c.layout.indent(w);
        }
    }

    /// Reverses [`Context::indent`].
    pub fn unindent(&mut self, width: Option<i32>) {
        let w = width.unwrap_or(self.style().indent);
        if let Some(c) = self.current_container_mut() {
            c.layout.indent(-w);
        }
    }

    /// Starts a group laid out as a single item.
    pub fn begin_group(&mut self) {
        if let Some(c) = self.current_container_mut() {
            c.layout.begin_group();
        }
    }

    /// Ends a group. Its bounding box becomes the last item.
    pub fn end_group(&mut self) -> Result<(), UiError> {
        let spacing = self.style().item_spacing;
        match self.current_container_mut().and_then(|c| c.layout.end_group(spacing)) {
            Some(r) => {
                self.item_add(Id::NONE, r, ItemFlags::NO_INTERACT, "group");
                Ok(())
            }
            None => {
                let err = UiError::ImbalancedScope { stack: ScopeKind::Group, imbalance: Imbalance::PopOnEmpty };
                self.report(err.clone());
                Err(err)
            }
        }
    }

    fn button_ex(&mut self, label: &str, size: (i32, i32), flags: ButtonFlags, padding: (i32, i32)) -> bool {
        let id = self.ids.get_id(label);
        let shown = display_label(label);
        let w = if size.0 > 0 { size.0 } else { self.font.text_width(shown) + padding.0 * 2 };
        let h = if size.1 > 0 { size.1 } else { self.font.line_height() + padding.1 * 2 };
        let Some(r) = self.layout_item(w, h, "button") else { return false };
        let mut item_flags = ItemFlags::NONE;
        if flags.contains(ButtonFlags::ALLOW_OVERLAP) {
            item_flags |= ItemFlags::ALLOW_OVERLAP;
        }
        if flags.contains(ButtonFlags::NO_NAV) {
            item_flags |= ItemFlags::NO_NAV;
        }
        if !self.item_add(id, r, item_flags, label) {
            return false;
        }
        let st = self.button_behavior(id, r, flags, ItemKind::Button);
        let fill = self.frame_color(ColorId::Button, &st);
        let border = self.style_color(ColorId::Border);
        let text = self.style_color(ColorId::Text);
        self.paint(|d, f| {
            d.draw_frame(r, fill, Some(border));
            let tx = r.x + (r.width - f.text_width(shown)) / 2;
            let ty = r.y + (r.height - f.line_height()) / 2;
            d.draw_text(f, shown, vec2(tx, ty), text);
        });
        st.pressed
    }

    /// Push button. Returns `true` on the frame it is clicked.
    pub fn button(&mut self, label: &str) -> bool {
        let pad = self.style().frame_padding;
        self.button_ex(label, (0, 0), ButtonFlags::NONE, (pad, pad))
    }

    /// Button of a given size; zero dimensions fit the label.
    pub fn button_sized(&mut self, label: &str, size: (i32, i32)) -> bool {
        let pad = self.style().frame_padding;
        self.button_ex(label, size, ButtonFlags::NONE, (pad, pad))
    }

    /// Button without vertical padding, to sit inside text lines.
    pub fn small_button(&mut self, label: &str) -> bool {
        let pad = self.style().frame_padding;
        self.button_ex(label, (0, 0), ButtonFlags::NONE, (pad, 0))
    }

    /// Interactive area with no visuals.
    pub fn invisible_button(&mut self, str_id: &str, size: (i32, i32), flags: ButtonFlags) -> bool {
        let id = self.ids.get_id(str_id);
        let Some(r) = self.layout_item(max(1, size.0), max(1, size.1), "invisible_button") else { return false };
        let item_flags = if flags.contains(ButtonFlags::ALLOW_OVERLAP) { ItemFlags::ALLOW_OVERLAP } else { ItemFlags::NONE };
        if !self.item_add(id, r, item_flags, str_id) {
            return false;
        }
        self.button_behavior(id, r, flags, ItemKind::Button).pressed
    }

    fn toggle_box(&mut self, label: &str, checked: bool, round: bool) -> (Id, Recti, ButtonState) {
        let id = self.ids.get_id(label);
        let pad = self.style().frame_padding;
        let sz = self.font.line_height() + pad * 2;
        let lw = self.label_width(label);
        let Some(r) = self.layout_item(sz + lw, sz, "checkbox") else { return (id, Recti::default(), ButtonState::default()) };
        if !self.item_add(id, r, ItemFlags::NONE, label) {
            return (id, r, ButtonState::default());
        }
        let st = self.button_behavior(id, r, ButtonFlags::NONE, ItemKind::Toggle);
        let boxr = rect(r.x, r.y, sz, sz);
        let fill = self.frame_color(ColorId::FrameBg, &st);
        let border = self.style_color(ColorId::Border);
        let mark = self.style_color(ColorId::CheckMark);
        self.paint(|d, _| {
            d.draw_frame(boxr, fill, Some(border));
            if checked {
                if round {
                    d.draw_rect(expand_rect(boxr, -(sz / 4)), mark);
                } else {
                    d.draw_icon(Icon::Check, boxr, mark);
                }
            }
        });
        self.draw_side_label(label, r.x + sz, r.y + pad);
        (id, r, st)
    }

    /// Check box bound to `value`. Returns `true` when toggled.
    pub fn checkbox(&mut self, label: &str, value: &mut bool) -> bool {
        let (id, _, st) = self.toggle_box(label, *value, false);
        if st.pressed {
            *value = !*value;
            self.mark_edited(id);
        }
        st.pressed
    }

    /// Radio button drawn as selected when `active`. Returns `true` when clicked.
    pub fn radio_button(&mut self, label: &str, active: bool) -> bool {
        let (id, _, st) = self.toggle_box(label, active, true);
        if st.pressed && !active {
            self.mark_edited(id);
        }
        st.pressed
    }

    /// Full-width row that can be selected. Clicking inside a popup or menu closes it.
    pub fn selectable(&mut self, label: &str, selected: bool) -> bool {
        let id = self.ids.get_id(label);
        let shown = display_label(label);
        let w = max(self.content_region_avail().x, self.font.text_width(shown));
        let h = self.font.line_height();
        let Some(r) = self.layout_item(w, h, "selectable") else { return false };
        if !self.item_add(id, r, ItemFlags::NONE, label) {
            return false;
        }
        let st = self.button_behavior(id, r, ButtonFlags::NONE, ItemKind::Header);
        if st.pressed {
            match self.stack.last().map(|f| f.kind) {
                Some(ContainerKind::Menu) => self.close_menu_chain(),
                Some(ContainerKind::Popup) => self.close_current_popup(),
                _ => (),
            }
        }
        let bg = (selected || st.hovered || st.held).then(|| self.frame_color(ColorId::Header, &st));
        let text = self.style_color(ColorId::Text);
        self.paint(|d, f| {
            if let Some(bg) = bg {
                d.draw_rect(r, bg);
            }
            d.draw_text(f, shown, vec2(r.x, r.y), text);
        });
        st.pressed
    }

    /// Opens or closes the next tree node or collapsing header, subject to `cond`.
    pub fn set_next_item_open(&mut self, open: bool, cond: Cond) { self.next_item.open = Some(Conditional { value: open, cond }); }

    /// Width of the next item: positive in pixels, negative relative to the right edge.
    pub fn set_next_item_width(&mut self, width: i32) { self.next_item.width = Some(width); }

    fn resolve_open(&mut self, id: Id) -> bool {
        let frame = self.frame;
        let state = self.tree_states.get(&id).copied();
        let mut open = state.is_some_and(|s| s.open);
        if let Some(req) = self.next_item.open.take() {
            let inputs = CondInputs {
                first_seen: !self.seen_ids.contains(&id),
                has_persisted: Some(state.is_some()),
                appearing: state.is_none_or(|s| s.last_frame + 1 < frame),
            };
            if let Some(v) = req.resolve(inputs) {
                open = v;
            }
        }
        self.seen_ids.insert(id);
        open
    }

    fn header_behavior(&mut self, label: &str, framed: bool) -> (Id, bool) {
        let id = self.ids.get_id(label);
        let mut open = self.resolve_open(id);
        let shown = display_label(label);
        let pad = self.style().frame_padding;
        let lh = self.font.line_height();
        let h = lh + pad * 2;
        let w = max(self.content_region_avail().x, h + self.font.text_width(shown));
        let Some(r) = self.layout_item(w, h, "tree_node") else { return (id, open) };
        let visible = self.item_add(id, r, ItemFlags::NONE, label);
        if visible {
            let st = self.button_behavior(id, r, ButtonFlags::NONE, ItemKind::Header);
            if st.pressed {
                open = !open;
                self.routing.last_item.status |= ItemStatus::TOGGLED_OPEN;
            }
            let bg = (framed || st.hovered || st.held).then(|| self.frame_color(ColorId::Header, &st));
            let text = self.style_color(ColorId::Text);
            let icon = if open { Icon::Expanded } else { Icon::Collapsed };
            self.paint(|d, f| {
                if let Some(bg) = bg {
                    d.draw_rect(r, bg);
                }
                d.draw_icon(icon, rect(r.x, r.y, h, h), text);
                d.draw_text(f, shown, vec2(r.x + h, r.y + pad), text);
            });
        }
        self.tree_states.insert(id, TreeNodeState { open, last_frame: self.frame });
        (id, open)
    }

    /// Tree node. When open, its children are indented and scoped under it until [`Context::tree_pop`].
    pub fn tree_node(&mut self, label: &str) -> bool {
        let (id, open) = self.header_behavior(label, false);
        if open {
            self.ids.push_seed(id);
            self.indent(None);
        }
        open
    }

    /// Indents and pushes an identity scope, like an open tree node.
    pub fn tree_push(&mut self, str_id: &str) {
        self.ids.push(str_id);
        self.indent(None);
    }

    /// Closes a level opened by [`Context::tree_node`] or [`Context::tree_push`].
    pub fn tree_pop(&mut self) -> Result<(), UiError> {
        self.unindent(None);
        self.pop_id()
    }

    /// Framed header that does not indent or push an identity scope.
    pub fn collapsing_header(&mut self, label: &str) -> bool { self.header_behavior(label, true).1 }

    fn value_frame(&mut self, label: &str, operation: &'static str) -> Option<(Id, Recti, i32)> {
        let id = self.ids.get_id(label);
        let w = self.take_item_width();
        let pad = self.style().frame_padding;
        let h = self.font.line_height() + pad * 2;
        let lw = self.label_width(label);
        let r = self.layout_item(w + lw, h, operation)?;
        let frame = rect(r.x, r.y, w, h);
        self.item_add(id, frame, ItemFlags::NONE, label).then_some((id, frame, w))
    }

    fn draw_value_frame(&mut self, label: &str, frame: Recti, st: &ButtonState, grab: Option<Recti>, value: &str) {
        let fill = self.frame_color(ColorId::FrameBg, st);
        let border = self.style_color(ColorId::Border);
        let grab_color = self.style_color(ColorId::SliderGrab);
        let text = self.style_color(ColorId::Text);
        self.paint(|d, f| {
            d.draw_frame(frame, fill, Some(border));
            if let Some(g) = grab {
                d.draw_rect(g, grab_color);
            }
            let tx = frame.x + (frame.width - f.text_width(value)) / 2;
            let ty = frame.y + (frame.height - f.line_height()) / 2;
            d.draw_text(f, value, vec2(tx, ty), text);
        });
        let pad = self.style().frame_padding;
        self.draw_side_label(label, frame.x + frame.width, frame.y + pad);
    }

    /// Horizontal slider over `[min, max]`. Returns `true` when the value changed.
    pub fn slider_f32(&mut self, label: &str, value: &mut f32, min: f32, max: f32) -> bool {
        let Some((id, frame, _)) = self.value_frame(label, "slider") else { return false };
        let st = self.button_behavior(id, frame, ButtonFlags::PRESS_ON_CLICK, ItemKind::Slider);
        let grab_w = self.style().grab_min_size;
        let track = (frame.width - grab_w).max(1) as f32;
        let mut changed = false;
        let mouse_held = st.held && self.routing.active.is_some_and(|a| a.source == ActivationSource::Mouse);
        if mouse_held && max > min {
            let t = ((self.input.mouse_pos().x - frame.x - grab_w / 2) as f32 / track).clamp(0.0, 1.0);
            let v = min + t * (max - min);
            if v != *value {
                *value = v;
                changed = true;
            }
        }
        if changed {
            self.mark_edited(id);
        }
        let t = if max > min { ((*value - min) / (max - min)).clamp(0.0, 1.0) } else { 0.0 };
        let grab = rect(frame.x + (t * track) as i32, frame.y, grab_w, frame.height);
        self.draw_value_frame(label, frame, &st, Some(grab), &format!("{value:.3}"));
        changed
    }

    /// Integer slider over `[min, max]`.
    pub fn slider_i32(&mut self, label: &str, value: &mut i32, min: i32, max: i32) -> bool {
        let mut v = *value as f32;
        if !self.slider_f32(label, &mut v, min as f32, max as f32) {
            return false;
        }
        let rounded = (v.round() as i32).clamp(min, max);
        let changed = rounded != *value;
        *value = rounded;
        changed
    }

    /// Value changed by dragging horizontally, `speed` per pixel. `min >= max` leaves it unbounded.
    pub fn drag_f32(&mut self, label: &str, value: &mut f32, speed: f32, min: f32, max: f32) -> bool {
        let Some((id, frame, _)) = self.value_frame(label, "drag") else { return false };
        let st = self.button_behavior(id, frame, ButtonFlags::PRESS_ON_CLICK, ItemKind::Drag);
        let dx = self.input.mouse_delta().x;
        let mut changed = false;
        if st.held && dx != 0 {
            let mut v = *value + dx as f32 * speed;
            if min < max {
                v = v.clamp(min, max);
            }
            if v != *value {
                *value = v;
                changed = true;
                self.mark_edited(id);
            }
        }
        self.draw_value_frame(label, frame, &st, None, &format!("{value:.3}"));
        changed
    }

    /// Bar filled to `fraction`. A zero width takes the available width.
    pub fn progress_bar(&mut self, fraction: f32, size: (i32, i32), overlay: Option<&str>) {
        let pad = self.style().frame_padding;
        let w = if size.0 > 0 { size.0 } else { self.content_region_avail().x };
        let h = if size.1 > 0 { size.1 } else { self.font.line_height() + pad * 2 };
        let Some(r) = self.layout_item(w, h, "progress_bar") else { return };
        self.item_add(Id::NONE, r, ItemFlags::NO_INTERACT, "progress_bar");
        let fill = (r.width as f32 * fraction.clamp(0.0, 1.0)) as i32;
        let bg = self.style_color(ColorId::FrameBg);
        let bar = self.style_color(ColorId::SliderGrab);
        let text = self.style_color(ColorId::Text);
        let label = overlay.map_or_else(|| format!("{:.0}%", fraction.clamp(0.0, 1.0) * 100.0), str::to_string);
        self.paint(|d, f| {
            d.draw_rect(r, bg);
            d.draw_rect(rect(r.x, r.y, fill, r.height), bar);
            let tx = r.x + (r.width - f.text_width(&label)) / 2;
            d.draw_text(f, &label, vec2(tx, r.y + (r.height - f.line_height()) / 2), text);
        });
    }

    /// Textured quad.
    pub fn image(&mut self, texture: TextureId, size: (i32, i32), tint: Color) {
        let Some(r) = self.layout_item(size.0, size.1, "image") else { return };
        if self.item_add(Id::NONE, r, ItemFlags::NO_INTERACT, "image") {
            self.paint(|d, _| d.draw_image(texture, r, tint));
        }
    }

    /// Single-line text field editing `buf`.
    ///
    /// With [`ReturnPolicy::OnChange`] the buffer is written and `true` returned on every frame the text changes.
    /// With [`ReturnPolicy::OnConfirm`] the buffer is written when the field loses the active slot and `true` is
    /// returned only when Enter did it.
    pub fn input_text(&mut self, label: &str, buf: &mut dyn TextBuffer, options: InputTextOptions) -> bool {
        self.input_text_ex(label, buf, options, None)
    }

    /// Multi-line text field. Enter inserts a newline and Ctrl+Enter confirms.
    pub fn input_text_multiline(&mut self, label: &str, buf: &mut dyn TextBuffer, size: (i32, i32), options: InputTextOptions) -> bool {
        self.input_text_ex(label, buf, options.multiline(), Some(size))
    }

    /// Text field over a `String` with a fixed `capacity` in bytes; `on_resize` is asked when an edit needs more
    /// and returns the capacity it grants.
    pub fn input_text_with_buffer(
        &mut self,
        label: &str,
        text: &mut String,
        capacity: usize,
        on_resize: impl FnMut(usize) -> usize,
        options: InputTextOptions,
    ) -> bool {
        let mut buf = ResizableBuffer::new(text, capacity, on_resize);
        self.input_text_ex(label, &mut buf, options, None)
    }

    fn take_detached_edit(&mut self, id: Id) -> Option<TextEditState> {
        if self.routing.active_id() != Some(id) && self.text_edit.as_ref().is_some_and(|te| te.id() == id) {
            return self.text_edit.take();
        }
        self.pending_edits.remove(&id)
    }

    fn flush_edit(state: &mut TextEditState, buf: &mut dyn TextBuffer) -> bool {
        if !state.is_dirty() {
            return false;
        }
        state.mark_flushed();
        if state.text() == buf.text() {
            return false;
        }
        buf.set_text(state.text());
        true
    }

    fn input_text_ex(&mut self, label: &str, buf: &mut dyn TextBuffer, options: InputTextOptions, size: Option<(i32, i32)>) -> bool {
        if let Err(e) = options.validate() {
            self.report(e);
            return false;
        }
        let id = self.ids.get_id(label);
        let pad = self.style().frame_padding;
        let lh = self.font.line_height();
        let w = match size {
            Some((w, _)) if w > 0 => {
                self.next_item.width = None;
                w
            }
            _ => self.take_item_width(),
        };
        let h = match (options.multiline, size) {
            (true, Some((_, h))) if h > 0 => h,
            (true, _) => lh * 4 + pad * 2,
            (false, _) => lh + pad * 2,
        };
        let lw = self.label_width(label);
        let Some(r) = self.layout_item(w + lw, h, "input_text") else { return false };
        let frame = rect(r.x, r.y, w, h);
        self.item_add(id, frame, ItemFlags::NONE, label);
        let hovered = self.item_hoverable(id, frame, false);

        // a session that lost the active slot since the last submission is written back once
        if let Some(mut detached) = self.take_detached_edit(id) {
            Self::flush_edit(&mut detached, buf);
        }

        let origin = vec2(frame.x + pad, frame.y + pad);
        let mouse = self.input.mouse_pos();
        let pressed = hovered && self.input.mouse_pressed().is_left();
        let nav_activate = self.routing.nav.activate == Some(id);
        let mut nav_opened = false;
        if (pressed || nav_activate) && self.routing.active_id() != Some(id) {
            let source = if pressed { ActivationSource::Mouse } else { ActivationSource::Nav };
            if self.set_active(id, ItemKind::TextInput, source) {
                if let Some(old) = self.text_edit.take().filter(|old| old.id() != id) {
                    self.pending_edits.insert(old.id(), old);
                }
                self.text_edit = Some(TextEditState::new(id, &*buf, options, self.config.undo_depth));
                nav_opened = !pressed;
            }
        }

        let mut result = false;
        let active = self.routing.active_id() == Some(id) && self.text_edit.as_ref().is_some_and(|te| te.id() == id);
        if active {
            let outcome = {
                let font = self.font.as_ref();
                let input = &self.input;
                let Some(state) = self.text_edit.as_mut() else { return false };
                if pressed {
                    let pos = cursor_at(state.text(), origin, mouse, font, options.password);
                    state.set_cursor(pos, input.key_mods().is_shift());
                    state.selecting = true;
                } else if state.selecting && input.mouse_down().is_left() {
                    let pos = cursor_at(state.text(), origin, mouse, font, options.password);
                    state.set_cursor(pos, true);
                }
                if !input.mouse_down().is_left() {
                    state.selecting = false;
                }
                if nav_opened { EditOutcome::default() } else { state.apply_input(input, buf) }
            };
            if let Some((requested, granted)) = outcome.overflow {
                self.report(UiError::BufferOverflow { id, requested, granted });
            }
            if outcome.changed {
                self.mark_edited(id);
            }
            let on_change = options.return_policy == ReturnPolicy::OnChange;
            if let Some(state) = self.text_edit.as_mut() {
                if outcome.cancelled {
                    state.revert();
                    let written = Self::flush_edit(state, buf);
                    result = on_change && written;
                } else if outcome.confirmed {
                    Self::flush_edit(state, buf);
                    result = true;
                } else if outcome.changed && on_change {
                    result = Self::flush_edit(state, buf);
                }
            }
            if outcome.cancelled || outcome.confirmed {
                self.clear_active();
                self.text_edit = None;
            }
        }

        self.draw_input_text(label, buf, frame, origin, hovered, options);
        result
    }

    fn draw_input_text(&mut self, label: &str, buf: &dyn TextBuffer, frame: Recti, origin: Vec2i, hovered: bool, options: InputTextOptions) {
        let id = self.routing.last_item.id;
        let state = self.text_edit.as_ref().filter(|te| te.id() == id && self.routing.active_id() == Some(id));
        let text = state.map_or(buf.text(), |s| s.text()).to_string();
        let cursor = state.map(|s| s.cursor());
        let selection = state.and_then(|s| s.selection());
        let fill = self.style_color(match (state.is_some(), hovered) {
            (true, _) => ColorId::FrameBgActive,
            (false, true) => ColorId::FrameBgHovered,
            _ => ColorId::FrameBg,
        });
        let border = self.style_color(ColorId::Border);
        let text_color = self.style_color(ColorId::Text);
        let sel_color = self.style_color(ColorId::TextSelectedBg);
        let password = options.password;
        self.paint(|d, f| {
            d.draw_frame(frame, fill, Some(border));
            d.push_clip_rect(frame);
            let lh = f.line_height();
            let mut start = 0;
            for (row, line) in text.split('\n').enumerate() {
                let y = origin.y + row as i32 * lh;
                let end = start + line.len();
                if let Some((s, e)) = selection {
                    let (a, b) = (s.max(start), e.min(end));
                    if a < b || (s <= end && e > end) {
                        let x0 = segment_width(&text[start..a.min(end)], f, password);
                        let x1 = segment_width(&text[start..b.max(a).min(end)], f, password);
                        d.draw_rect(rect(origin.x + x0, y, max(1, x1 - x0), lh), sel_color);
                    }
                }
                let shown = if password { "*".repeat(line.chars().count()) } else { line.to_string() };
                d.draw_text(f, &shown, vec2(origin.x, y), text_color);
                if let Some(c) = cursor.filter(|c| *c >= start && *c <= end) {
                    let x = segment_width(&text[start..c], f, password);
                    d.draw_rect(rect(origin.x + x, y, 1, lh), text_color);
                }
                start = end + 1;
            }
            d.pop_clip_rect();
        });
        let pad = self.style().frame_padding;
        self.draw_side_label(label, frame.x + frame.width, frame.y + pad);
    }

    /// Color editor over normalized RGBA components. Returns `true` when the color changed.
    pub fn color_edit(&mut self, label: &str, rgba: &mut [f32; 4], options: ColorEditOptions) -> bool {
        let spacing = self.style().item_inner_spacing;
        let total = self.take_item_width();
        let h = self.font.line_height() + self.style().frame_padding * 2;
        let mut changed = false;
        self.push_id(label);
        match options.mode {
            ColorDisplayMode::Rgb | ColorDisplayMode::Hsv => {
                let n = if options.alpha { 4 } else { 3 };
                let comp_w = max(1, (total - h - spacing * n) / n);
                let mut values = match options.mode {
                    ColorDisplayMode::Hsv => {
                        let hsv = rgb_to_hsv(rgba[0], rgba[1], rgba[2]);
                        [hsv[0], hsv[1], hsv[2], rgba[3]]
                    }
                    _ => *rgba,
                };
                let names = match options.mode {
                    ColorDisplayMode::Hsv => ["##H", "##S", "##V", "##A"],
                    _ => ["##R", "##G", "##B", "##A"],
                };
                for (i, name) in names.iter().enumerate().take(n as usize) {
                    if i > 0 {
                        self.same_line(None);
                    }
                    self.set_next_item_width(comp_w);
                    changed |= self.drag_f32(name, &mut values[i], 1.0 / 255.0, 0.0, 1.0);
                }
                if changed {
                    *rgba = match options.mode {
                        ColorDisplayMode::Hsv => {
                            let rgb = hsv_to_rgb(values[0], values[1], values[2]);
                            [rgb[0], rgb[1], rgb[2], values[3]]
                        }
                        _ => values,
                    };
                }
            }
            ColorDisplayMode::Hex => {
                let mut hex = format!("{:02X}{:02X}{:02X}", to_byte(rgba[0]), to_byte(rgba[1]), to_byte(rgba[2]));
                if options.alpha {
                    hex.push_str(&format!("{:02X}", to_byte(rgba[3])));
                }
                self.set_next_item_width(max(1, total - h - spacing));
                let field = InputTextOptions::default().with_filter(CharFilter::Hexadecimal).uppercase().on_confirm();
                if self.input_text("##hex", &mut hex, field) {
                    let bytes: Vec<u8> = (0..hex.len() / 2).filter_map(|i| u8::from_str_radix(hex.get(i * 2..i * 2 + 2)?, 16).ok()).collect();
                    if bytes.len() >= 3 {
                        for (c, b) in rgba.iter_mut().zip(bytes.iter()) {
                            *c = *b as f32 / 255.0;
                        }
                        changed = true;
                    }
                }
            }
        }
        self.same_line(None);
        let swatch = color(to_byte(rgba[0]), to_byte(rgba[1]), to_byte(rgba[2]), to_byte(rgba[3]));
        let border = self.style_color(ColorId::Border);
        if let Some(r) = self.layout_item(h, h, "color_edit") {
            self.item_add(Id::NONE, r, ItemFlags::NO_INTERACT, label);
            self.paint(|d, _| d.draw_frame(r, swatch, Some(border)));
            let pad = self.style().frame_padding;
            self.draw_side_label(label, r.x + r.width, r.y + pad);
        }
        let _ = self.pop_id();
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn host(ctx: &mut Context) {
        ctx.new_frame();
        ctx.set_next_window_pos(vec2(0, 0), Cond::Always, (0.0, 0.0));
        ctx.set_next_window_size((400, 300), Cond::Always);
        ctx.begin("Host", WindowOption::NONE);
    }

    fn finish(ctx: &mut Context) {
        ctx.end().unwrap();
        ctx.end_frame();
    }

    // right end of the item, past any text already in a field
    fn grip(r: Recti) -> (i32, i32) { (r.x + r.width - 3, r.y + r.height / 2) }

    fn click(ctx: &mut Context, r: Recti) {
        let (x, y) = grip(r);
        ctx.input_mut().mousemove(x, y);
        ctx.input_mut().mousedown(x, y, MouseButton::LEFT);
    }

    fn unclick(ctx: &mut Context, r: Recti) {
        let (x, y) = grip(r);
        ctx.input_mut().mouseup(x, y, MouseButton::LEFT);
    }

    #[test]
    fn button_fires_on_release_inside() {
        let mut ctx = Context::new();
        host(&mut ctx);
        assert!(!ctx.button("Go"));
        let r = ctx.item_rect();
        finish(&mut ctx);

        click(&mut ctx, r);
        host(&mut ctx);
        assert!(!ctx.button("Go"));
        assert!(ctx.is_item_active());
        assert!(ctx.is_item_activated());
        finish(&mut ctx);

        unclick(&mut ctx, r);
        host(&mut ctx);
        assert!(ctx.button("Go"));
        assert!(ctx.is_item_deactivated());
        finish(&mut ctx);
        assert!(ctx.active_item().is_none());
    }

    #[test]
    fn checkbox_toggles_value() {
        let mut ctx = Context::new();
        let mut value = false;
        host(&mut ctx);
        ctx.checkbox("Flag", &mut value);
        let r = ctx.item_rect();
        finish(&mut ctx);
        click(&mut ctx, r);
        host(&mut ctx);
        ctx.checkbox("Flag", &mut value);
        finish(&mut ctx);
        unclick(&mut ctx, r);
        host(&mut ctx);
        assert!(ctx.checkbox("Flag", &mut value));
        assert!(ctx.is_item_edited());
        finish(&mut ctx);
        assert!(value);
    }

    #[test]
    fn duplicate_identity_leaves_second_inert() {
        let mut ctx = Context::with_config(ContextConfig::default().with_duplicate_id_checks(true));
        host(&mut ctx);
        ctx.button("Same");
        let id = ctx.item_id();
        ctx.button("Same");
        finish(&mut ctx);
        let dups: Vec<_> = ctx.diagnostics().iter().filter(|d| matches!(d.error, UiError::DuplicateIdentity { .. })).collect();
        assert_eq!(dups.len(), 1);
        let recorded = ctx.find_container("Host").unwrap().items.iter().filter(|i| i.id == id).count();
        assert_eq!(recorded, 1);
    }

    #[test]
    fn later_item_wins_overlap_unless_earlier_allows_it() {
        let mut ctx = Context::new();
        let build = |ctx: &mut Context, allow: bool| {
            host(ctx);
            ctx.set_cursor_pos(vec2(0, 0));
            if allow {
                ctx.set_next_item_allow_overlap();
            }
            ctx.button_sized("Under", (100, 30));
            let under = ctx.is_item_hovered();
            ctx.set_cursor_pos(vec2(20, 5));
            ctx.button_sized("Over", (40, 20));
            let over = ctx.is_item_hovered();
            let r = ctx.item_rect();
            finish(ctx);
            (under, over, r)
        };
        let (_, _, over_rect) = build(&mut ctx, false);
        ctx.input_mut().mousemove(over_rect.x + 5, over_rect.y + 5);
        build(&mut ctx, false);
        let (under, over, _) = build(&mut ctx, false);
        assert!(!under);
        assert!(over);
        let (under, over, _) = build(&mut ctx, true);
        assert!(under);
        assert!(over);
    }

    #[test]
    fn hover_query_is_idempotent() {
        let mut ctx = Context::new();
        host(&mut ctx);
        ctx.button("B");
        let r = ctx.item_rect();
        finish(&mut ctx);
        ctx.input_mut().mousemove(r.x + 1, r.y + 1);
        host(&mut ctx);
        ctx.button("B");
        let first = ctx.is_item_hovered();
        let id = ctx.item_id();
        assert_eq!(ctx.item_hoverable(id, r, false), first);
        assert_eq!(ctx.item_hoverable(id, r, false), first);
        assert!(first);
        finish(&mut ctx);
    }

    #[test]
    fn overflow_truncates_and_asks_once() {
        let mut ctx = Context::new();
        let mut text = String::new();
        let mut requests = Vec::new();
        let run = |ctx: &mut Context, text: &mut String, requests: &mut Vec<usize>| {
            host(ctx);
            let changed = ctx.input_text_with_buffer(
                "Name",
                text,
                2,
                |n| {
                    requests.push(n);
                    2
                },
                InputTextOptions::default(),
            );
            let r = ctx.item_rect();
            finish(ctx);
            (changed, r)
        };
        let (_, r) = run(&mut ctx, &mut text, &mut requests);
        click(&mut ctx, r);
        run(&mut ctx, &mut text, &mut requests);
        assert_eq!(ctx.active_item().map(|a| a.kind), Some(ItemKind::TextInput));
        unclick(&mut ctx, r);
        ctx.input_mut().text("abc");
        let (changed, _) = run(&mut ctx, &mut text, &mut requests);
        assert!(changed);
        assert_eq!(text, "ab");
        assert_eq!(requests, vec![3]);
        assert!(ctx
            .diagnostics()
            .iter()
            .any(|d| matches!(d.error, UiError::BufferOverflow { requested: 3, granted: 2, .. })));
    }

    fn typed_frame(ctx: &mut Context, buf: &mut String, options: InputTextOptions) -> (bool, Recti) {
        host(ctx);
        let changed = ctx.input_text("Field", buf, options);
        let r = ctx.item_rect();
        ctx.button("Elsewhere");
        finish(ctx);
        (changed, r)
    }

    #[test]
    fn confirm_policy_writes_on_enter_only() {
        let mut ctx = Context::new();
        let mut buf = String::from("x");
        let opts = InputTextOptions::default().on_confirm();
        let (_, r) = typed_frame(&mut ctx, &mut buf, opts);
        click(&mut ctx, r);
        typed_frame(&mut ctx, &mut buf, opts);
        unclick(&mut ctx, r);
        ctx.input_mut().text("yz");
        let (changed, _) = typed_frame(&mut ctx, &mut buf, opts);
        assert!(!changed);
        assert_eq!(buf, "x");
        ctx.input_mut().keydown_code(KeyCode::RETURN);
        let (changed, _) = typed_frame(&mut ctx, &mut buf, opts);
        assert!(changed);
        assert_eq!(buf, "xyz");
        assert!(ctx.text_edit_state().is_none());
    }

    #[test]
    fn escape_reverts_live_edits() {
        let mut ctx = Context::new();
        let mut buf = String::from("keep");
        let opts = InputTextOptions::default();
        let (_, r) = typed_frame(&mut ctx, &mut buf, opts);
        click(&mut ctx, r);
        typed_frame(&mut ctx, &mut buf, opts);
        unclick(&mut ctx, r);
        ctx.input_mut().text("!!");
        let (changed, _) = typed_frame(&mut ctx, &mut buf, opts);
        assert!(changed);
        assert_eq!(buf, "keep!!");
        ctx.input_mut().keydown_code(KeyCode::ESCAPE);
        let (changed, _) = typed_frame(&mut ctx, &mut buf, opts);
        assert!(changed);
        assert_eq!(buf, "keep");
    }

    #[test]
    fn click_elsewhere_flushes_confirm_policy_once() {
        let mut ctx = Context::new();
        let mut buf = String::new();
        let opts = InputTextOptions::default().on_confirm();
        let (_, r) = typed_frame(&mut ctx, &mut buf, opts);
        click(&mut ctx, r);
        typed_frame(&mut ctx, &mut buf, opts);
        unclick(&mut ctx, r);
        ctx.input_mut().text("hi");
        typed_frame(&mut ctx, &mut buf, opts);
        assert_eq!(buf, "");

        let away = rect(300, 250, 4, 4);
        click(&mut ctx, away);
        let (changed, _) = typed_frame(&mut ctx, &mut buf, opts);
        assert!(!changed);
        assert_eq!(buf, "hi");
        assert!(ctx.active_item().is_none());
        assert!(ctx.text_edit_state().is_none());
    }

    #[test]
    fn password_and_multiline_conflict() {
        let mut ctx = Context::new();
        let mut buf = String::new();
        host(&mut ctx);
        let opts = InputTextOptions::default().password().multiline();
        assert!(!ctx.input_text("Secret", &mut buf, opts));
        finish(&mut ctx);
        assert!(ctx.diagnostics().iter().any(|d| matches!(d.error, UiError::InvalidOption { .. })));
    }

    #[test]
    fn tree_node_open_conditions() {
        let mut ctx = Context::new();
        let frame = |ctx: &mut Context, cond: Option<(bool, Cond)>| {
            host(ctx);
            if let Some((open, cond)) = cond {
                ctx.set_next_item_open(open, cond);
            }
            let open = ctx.tree_node("Node");
            if open {
                ctx.text("child");
                ctx.tree_pop().unwrap();
            }
            finish(ctx);
            open
        };
        assert!(frame(&mut ctx, Some((true, Cond::Once))));
        assert!(frame(&mut ctx, None));
        assert!(frame(&mut ctx, Some((false, Cond::Once))));
        assert!(frame(&mut ctx, Some((false, Cond::FirstUseEver))));
        assert!(!frame(&mut ctx, Some((false, Cond::Always))));
        assert!(ctx.diagnostics().is_empty());
    }

    #[test]
    fn tab_cycles_and_enter_activates() {
        let mut ctx = Context::new();
        let build = |ctx: &mut Context| {
            host(ctx);
            let a = ctx.button("A");
            let a_id = ctx.item_id();
            let b = ctx.button("B");
            let b_id = ctx.item_id();
            finish(ctx);
            (a, b, a_id, b_id)
        };
        let (_, _, a_id, b_id) = build(&mut ctx);
        ctx.input_mut().keydown_code(KeyCode::TAB);
        build(&mut ctx);
        assert_eq!(ctx.nav_item(), Some(a_id));
        ctx.input_mut().keyup_code(KeyCode::TAB);
        ctx.input_mut().keydown_code(KeyCode::TAB);
        build(&mut ctx);
        assert_eq!(ctx.nav_item(), Some(b_id));
        ctx.input_mut().keyup_code(KeyCode::TAB);
        ctx.input_mut().keydown(KeyMode::SHIFT);
        ctx.input_mut().keydown_code(KeyCode::TAB);
        build(&mut ctx);
        assert_eq!(ctx.nav_item(), Some(a_id));
        ctx.input_mut().keyup(KeyMode::SHIFT);
        ctx.input_mut().keyup_code(KeyCode::TAB);
        ctx.input_mut().keydown_code(KeyCode::RETURN);
        let (a, b, _, _) = build(&mut ctx);
        assert!(a);
        assert!(!b);
        assert!(ctx.active_item().is_none());
    }

    #[test]
    fn tab_stop_scope_skips_items() {
        let mut ctx = Context::new();
        let build = |ctx: &mut Context| {
            host(ctx);
            ctx.push_tab_stop(false);
            ctx.button("Skipped");
            ctx.pop_tab_stop().unwrap();
            ctx.button("Reached");
            let id = ctx.item_id();
            finish(ctx);
            id
        };
        let reached = build(&mut ctx);
        ctx.input_mut().keydown_code(KeyCode::TAB);
        build(&mut ctx);
        assert_eq!(ctx.nav_item(), Some(reached));
    }

    #[test]
    fn color_mode_flags_are_exclusive() {
        assert_eq!(ColorDisplayMode::from_flags(false, false, false), Ok(ColorDisplayMode::Rgb));
        assert_eq!(ColorDisplayMode::from_flags(false, true, false), Ok(ColorDisplayMode::Hsv));
        assert!(matches!(ColorDisplayMode::from_flags(true, false, true), Err(UiError::InvalidOption { .. })));
    }

    #[test]
    fn hsv_conversion_is_consistent() {
        for rgb in [[1.0, 0.0, 0.0], [0.2, 0.6, 0.4], [0.5, 0.5, 0.5], [0.1, 0.2, 0.9]] {
            let hsv = rgb_to_hsv(rgb[0], rgb[1], rgb[2]);
            let back = hsv_to_rgb(hsv[0], hsv[1], hsv[2]);
            for i in 0..3 {
                assert!((back[i] - rgb[i]).abs() < 1e-4, "{rgb:?} -> {back:?}");
            }
        }
    }

    #[test]
    fn unbalanced_group_is_reported() {
        let mut ctx = Context::new();
        host(&mut ctx);
        assert!(ctx.end_group().is_err());
        ctx.begin_group();
        ctx.text("a");
        finish(&mut ctx);
        assert!(ctx
            .diagnostics()
            .iter()
            .any(|d| d.error == UiError::ImbalancedScope { stack: ScopeKind::Group, imbalance: Imbalance::Residual(1) }));
    }

    #[test]
    fn drag_outside_keeps_button_active() {
        let mut ctx = Context::new();
        host(&mut ctx);
        ctx.button("Go");
        let r = ctx.item_rect();
        finish(&mut ctx);

        click(&mut ctx, r);
        host(&mut ctx);
        assert!(!ctx.button("Go"));
        finish(&mut ctx);

        ctx.input_mut().mousemove(300, 200);
        host(&mut ctx);
        assert!(!ctx.button("Go"));
        assert!(ctx.is_item_active());
        assert!(!ctx.is_item_hovered());
        finish(&mut ctx);
        assert_eq!(ctx.active_item().map(|a| a.phase), Some(InteractionPhase::Dragging));

        ctx.input_mut().mouseup(300, 200, MouseButton::LEFT);
        host(&mut ctx);
        assert!(!ctx.button("Go"));
        finish(&mut ctx);
        assert!(ctx.active_item().is_none());
    }

    #[test]
    fn repeating_button_fires_while_held() {
        let mut ctx = Context::with_config(ContextConfig::default().with_button_repeat(3, 2));
        host(&mut ctx);
        ctx.button("Step");
        let r = ctx.item_rect();
        finish(&mut ctx);

        let frame = |ctx: &mut Context| {
            host(ctx);
            ctx.push_button_repeat(true);
            let fired = ctx.button("Step");
            ctx.pop_button_repeat().unwrap();
            finish(ctx);
            fired
        };
        click(&mut ctx, r);
        let fired: Vec<bool> = (0..8).map(|_| frame(&mut ctx)).collect();
        assert_eq!(fired, vec![true, false, false, true, false, true, false, true]);

        unclick(&mut ctx, r);
        assert!(!frame(&mut ctx));
        assert!(ctx.diagnostics().is_empty());
    }

    #[test]
    fn wrap_breaks_after_spaces_and_splits_long_words() {
        let font = MonoFont::default();
        let g = font.char_width('a');
        assert_eq!(wrap_line("aaaa bbbb cccc dddd", 9 * g, &font), vec!["aaaa bbbb", "cccc dddd"]);
        assert_eq!(wrap_line("abcdefgh", 3 * g, &font), vec!["abc", "def", "gh"]);
        assert_eq!(wrap_line("short", 40 * g, &font), vec!["short"]);
    }

    #[test]
    fn pushed_wrap_pos_wraps_text() {
        let mut ctx = Context::new();
        let g = MonoFont::default().char_width('a');
        host(&mut ctx);
        let y0 = ctx.get_cursor_pos().y;
        ctx.text("x");
        let line = ctx.get_cursor_pos().y - y0;

        let y1 = ctx.get_cursor_pos().y;
        ctx.push_text_wrap_pos(ctx.get_cursor_pos().x + 9 * g);
        ctx.text("aaaa bbbb cccc dddd");
        assert_eq!(ctx.get_cursor_pos().y - y1, 2 * line);

        ctx.push_text_wrap_pos(-1);
        let y2 = ctx.get_cursor_pos().y;
        ctx.text("aaaa bbbb cccc dddd");
        assert_eq!(ctx.get_cursor_pos().y - y2, line);
        ctx.pop_text_wrap_pos().unwrap();
        ctx.pop_text_wrap_pos().unwrap();

        let y3 = ctx.get_cursor_pos().y;
        ctx.text_wrapped(&"word ".repeat(40));
        assert!(ctx.get_cursor_pos().y - y3 > line);
        finish(&mut ctx);
        assert!(ctx.diagnostics().is_empty());
    }
}
