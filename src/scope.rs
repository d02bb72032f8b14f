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
//! Scoped style overrides.
//!
//! Every push records the value it replaced so a pop restores exactly what was visible before, whatever the
//! nesting. Pops on an empty stack are refused; anything still pushed when the frame ends is reported and
//! drained back to the base style.

use crate::style::pop_on_empty;
use crate::*;

#[derive(Copy, Clone, Debug)]
struct VarFrame {
    var: StyleVar,
    value: StyleValue,
    previous: StyleValue,
}

#[derive(Copy, Clone, Debug)]
struct ColorFrame {
    id: ColorId,
    value: Color,
    previous: Color,
}

#[derive(Clone, Debug, Default)]
pub(crate) struct ScopeStacks {
    base: Style,
    current: Style,
    vars: Vec<VarFrame>,
    colors: Vec<ColorFrame>,
    item_widths: Vec<i32>,
    tab_stops: Vec<bool>,
    button_repeats: Vec<bool>,
    wrap_positions: Vec<i32>,
}

impl ScopeStacks {
    pub(crate) fn new(style: Style) -> Self { Self { base: style, current: style, ..Self::default() } }

    pub(crate) fn style(&self) -> &Style { &self.current }

    pub(crate) fn base(&self) -> &Style { &self.base }

    /// Replaces the base style and replays the overrides that are currently pushed on top of it.
    pub(crate) fn set_base(&mut self, style: Style) {
        self.base = style;
        self.current = style;
        for frame in self.vars.iter_mut() {
            frame.previous = self.current.get(frame.var);
            // kinds were validated when the frame was pushed
            let _ = self.current.set(frame.var, frame.value);
        }
        for frame in self.colors.iter_mut() {
            frame.previous = self.current.color(frame.id);
            self.current.set_color(frame.id, frame.value);
        }
    }

    pub(crate) fn push_var(&mut self, var: StyleVar, value: StyleValue) -> Result<(), UiError> {
        let previous = self.current.get(var);
        self.current.set(var, value)?;
        self.vars.push(VarFrame { var, value, previous });
        Ok(())
    }

    pub(crate) fn pop_var(&mut self) -> Result<(), UiError> {
        let frame = self.vars.pop().ok_or_else(|| pop_on_empty(ScopeKind::StyleVar))?;
        self.current.set(frame.var, frame.previous)
    }

    pub(crate) fn push_color(&mut self, id: ColorId, value: Color) {
        let previous = self.current.color(id);
        self.current.set_color(id, value);
        self.colors.push(ColorFrame { id, value, previous });
    }

    pub(crate) fn pop_color(&mut self) -> Result<(), UiError> {
        let frame = self.colors.pop().ok_or_else(|| pop_on_empty(ScopeKind::Color))?;
        self.current.set_color(frame.id, frame.previous);
        Ok(())
    }

    pub(crate) fn push_item_width(&mut self, width: i32) { self.item_widths.push(width) }

    pub(crate) fn pop_item_width(&mut self) -> Result<(), UiError> {
        self.item_widths.pop().map(|_| ()).ok_or_else(|| pop_on_empty(ScopeKind::ItemWidth))
    }

    pub(crate) fn item_width(&self) -> Option<i32> { self.item_widths.last().copied() }

    pub(crate) fn push_tab_stop(&mut self, enabled: bool) { self.tab_stops.push(enabled) }

    pub(crate) fn pop_tab_stop(&mut self) -> Result<(), UiError> {
        self.tab_stops.pop().map(|_| ()).ok_or_else(|| pop_on_empty(ScopeKind::TabStop))
    }

    pub(crate) fn tab_stop(&self) -> bool { self.tab_stops.last().copied().unwrap_or(true) }

    pub(crate) fn push_button_repeat(&mut self, repeat: bool) { self.button_repeats.push(repeat) }

    pub(crate) fn pop_button_repeat(&mut self) -> Result<(), UiError> {
        self.button_repeats.pop().map(|_| ()).ok_or_else(|| pop_on_empty(ScopeKind::ButtonRepeat))
    }

    pub(crate) fn button_repeat(&self) -> bool { self.button_repeats.last().copied().unwrap_or(false) }

    pub(crate) fn push_wrap_pos(&mut self, wrap_x: i32) { self.wrap_positions.push(wrap_x) }

    pub(crate) fn pop_wrap_pos(&mut self) -> Result<(), UiError> {
        self.wrap_positions.pop().map(|_| ()).ok_or_else(|| pop_on_empty(ScopeKind::TextWrapPos))
    }

    pub(crate) fn wrap_pos(&self) -> Option<i32> { self.wrap_positions.last().copied() }

    /// Number of entries on the stack named by `kind`.
    pub(crate) fn depth(&self, kind: ScopeKind) -> usize {
        match kind {
            ScopeKind::StyleVar => self.vars.len(),
            ScopeKind::Color => self.colors.len(),
            ScopeKind::ItemWidth => self.item_widths.len(),
            ScopeKind::TabStop => self.tab_stops.len(),
            ScopeKind::ButtonRepeat => self.button_repeats.len(),
            ScopeKind::TextWrapPos => self.wrap_positions.len(),
            _ => 0,
        }
    }

    /// Pops the stack named by `kind` down to `depth` entries, restoring the style values they replaced.
    pub(crate) fn truncate(&mut self, kind: ScopeKind, depth: usize) {
        match kind {
            ScopeKind::StyleVar => {
                while self.vars.len() > depth {
                    // kinds were validated when the frame was pushed
                    let _ = self.pop_var();
                }
            }
            ScopeKind::Color => {
                while self.colors.len() > depth {
                    let _ = self.pop_color();
                }
            }
            ScopeKind::ItemWidth => self.item_widths.truncate(depth),
            ScopeKind::TabStop => self.tab_stops.truncate(depth),
            ScopeKind::ButtonRepeat => self.button_repeats.truncate(depth),
            ScopeKind::TextWrapPos => self.wrap_positions.truncate(depth),
            _ => {}
        }
    }

    /// Empties every stack, restores the base style and returns the stacks that still held entries.
    pub(crate) fn drain(&mut self) -> Vec<(ScopeKind, usize)> {
        let residual: Vec<(ScopeKind, usize)> = [
            (ScopeKind::StyleVar, self.vars.len()),
            (ScopeKind::Color, self.colors.len()),
            (ScopeKind::ItemWidth, self.item_widths.len()),
            (ScopeKind::TabStop, self.tab_stops.len()),
            (ScopeKind::ButtonRepeat, self.button_repeats.len()),
            (ScopeKind::TextWrapPos, self.wrap_positions.len()),
        ]
        .into_iter()
        .filter(|(_, n)| *n > 0)
        .collect();
        self.vars.clear();
        self.colors.clear();
        self.item_widths.clear();
        self.tab_stops.clear();
        self.button_repeats.clear();
        self.wrap_positions.clear();
        self.current = self.base;
        residual
    }
}

impl Context {
    /// Returns the style as currently modified by pushed overrides.
    pub fn style(&self) -> &Style { self.scopes.style() }

    /// Replaces the base style. Overrides pushed in the current frame stay in effect on top of it.
    pub fn set_style(&mut self, style: Style) { self.scopes.set_base(style) }

    /// Returns the style without any pushed overrides.
    pub fn base_style(&self) -> &Style { self.scopes.base() }

    /// Overrides a style variable until the matching [`Context::pop_style_var`].
    pub fn push_style_var(&mut self, var: StyleVar, value: StyleValue) -> Result<(), UiError> {
        self.scopes.push_var(var, value).inspect_err(|e| self.report(e.clone()))
    }

    /// Restores the style variable replaced by the latest push.
    pub fn pop_style_var(&mut self) -> Result<(), UiError> { self.scopes.pop_var().inspect_err(|e| self.report(e.clone())) }

    /// Pops `count` style variables, stopping at the first failure.
    pub fn pop_style_vars(&mut self, count: usize) -> Result<(), UiError> {
        for _ in 0..count {
            self.pop_style_var()?;
        }
        Ok(())
    }

    /// Runs `f` with `var` overridden, then restores it along with anything `f` left pushed.
    pub fn with_style_var<R>(&mut self, var: StyleVar, value: StyleValue, f: impl FnOnce(&mut Self) -> R) -> Result<R, UiError> {
        let depth = self.scopes.depth(ScopeKind::StyleVar);
        self.push_style_var(var, value)?;
        let res = f(self);
        self.unwind_scope(ScopeKind::StyleVar, depth)?;
        Ok(res)
    }

    /// Closes a closure scope opened at `depth`. Entries the closure left behind are discarded and reported;
    /// a closure that popped the scope's own entry is reported as a pop on empty.
    fn unwind_scope(&mut self, stack: ScopeKind, depth: usize) -> Result<(), UiError> {
        let len = self.scopes.depth(stack);
        self.scopes.truncate(stack, depth);
        if len > depth + 1 {
            self.report(UiError::ImbalancedScope { stack, imbalance: Imbalance::Residual(len - depth - 1) });
            Ok(())
        } else if len <= depth {
            let err = pop_on_empty(stack);
            self.report(err.clone());
            Err(err)
        } else {
            Ok(())
        }
    }

    /// Overrides a palette entry until the matching [`Context::pop_style_color`].
    pub fn push_style_color(&mut self, id: ColorId, value: Color) { self.scopes.push_color(id, value) }

    /// Restores the palette entry replaced by the latest push.
    pub fn pop_style_color(&mut self) -> Result<(), UiError> { self.scopes.pop_color().inspect_err(|e| self.report(e.clone())) }

    /// Pops `count` palette overrides, stopping at the first failure.
    pub fn pop_style_colors(&mut self, count: usize) -> Result<(), UiError> {
        for _ in 0..count {
            self.pop_style_color()?;
        }
        Ok(())
    }

    /// Runs `f` with a palette entry overridden, then restores it along with anything `f` left pushed.
    pub fn with_style_color<R>(&mut self, id: ColorId, value: Color, f: impl FnOnce(&mut Self) -> R) -> Result<R, UiError> {
        let depth = self.scopes.depth(ScopeKind::Color);
        self.push_style_color(id, value);
        let res = f(self);
        self.unwind_scope(ScopeKind::Color, depth)?;
        Ok(res)
    }

    /// Sets the width of subsequent items. Positive values are pixels, negative values are relative to the
    /// right edge of the available region, zero selects the default.
    pub fn push_item_width(&mut self, width: i32) { self.scopes.push_item_width(width) }

    /// Restores the item width replaced by the latest push.
    pub fn pop_item_width(&mut self) -> Result<(), UiError> { self.scopes.pop_item_width().inspect_err(|e| self.report(e.clone())) }

    /// Runs `f` with the item width overridden.
    pub fn with_item_width<R>(&mut self, width: i32, f: impl FnOnce(&mut Self) -> R) -> Result<R, UiError> {
        let depth = self.scopes.depth(ScopeKind::ItemWidth);
        self.push_item_width(width);
        let res = f(self);
        self.unwind_scope(ScopeKind::ItemWidth, depth)?;
        Ok(res)
    }

    /// Includes or excludes subsequent items from Tab navigation.
    pub fn push_tab_stop(&mut self, enabled: bool) { self.scopes.push_tab_stop(enabled) }

    /// Restores the tab-stop setting replaced by the latest push.
    pub fn pop_tab_stop(&mut self) -> Result<(), UiError> { self.scopes.pop_tab_stop().inspect_err(|e| self.report(e.clone())) }

    /// Makes subsequent buttons report a press on push and again periodically while held.
    pub fn push_button_repeat(&mut self, repeat: bool) { self.scopes.push_button_repeat(repeat) }

    /// Restores the button repeat setting replaced by the latest push.
    pub fn pop_button_repeat(&mut self) -> Result<(), UiError> {
        self.scopes.pop_button_repeat().inspect_err(|e| self.report(e.clone()))
    }

    /// Wraps subsequent text at `wrap_x` in content coordinates. Zero wraps at the right edge of the content
    /// region, a negative value disables wrapping.
    pub fn push_text_wrap_pos(&mut self, wrap_x: i32) { self.scopes.push_wrap_pos(wrap_x) }

    /// Restores the wrap position replaced by the latest push.
    pub fn pop_text_wrap_pos(&mut self) -> Result<(), UiError> { self.scopes.pop_wrap_pos().inspect_err(|e| self.report(e.clone())) }

    /// Width text may take before it wraps, measured from the layout cursor.
    pub(crate) fn text_wrap_width(&self) -> Option<i32> {
        match self.scopes.wrap_pos()? {
            x if x < 0 => None,
            0 => Some(self.content_region_avail().x.max(1)),
            x => Some((x - self.get_cursor_pos().x).max(1)),
        }
    }

    /// Width the next item will take, resolving next-item data, the item width stack and the style default.
    pub fn calc_item_width(&self) -> i32 {
        let avail = self.content_region_avail().x;
        let width = self.next_item.width.or(self.scopes.item_width()).unwrap_or(self.style().default_item_width);
        let width = match width {
            w if w > 0 => w,
            w if w < 0 => avail + w,
            _ => (avail as f32 * 0.65) as i32,
        };
        width.max(1)
    }

    pub(crate) fn style_color(&self, id: ColorId) -> Color {
        let style = self.style();
        style.color(id).scale_alpha(style.alpha)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{Rng, SeedableRng, rngs::StdRng};

    #[test]
    fn push_pop_restores_previous_value() {
        let mut s = ScopeStacks::new(Style::default());
        s.push_var(StyleVar::FramePadding, StyleValue::Int(10)).unwrap();
        s.push_var(StyleVar::FramePadding, StyleValue::Int(20)).unwrap();
        assert_eq!(s.style().frame_padding, 20);
        s.pop_var().unwrap();
        assert_eq!(s.style().frame_padding, 10);
        s.pop_var().unwrap();
        assert_eq!(s.style().frame_padding, Style::default().frame_padding);
    }

    #[test]
    fn mismatched_kind_is_not_pushed() {
        let mut s = ScopeStacks::new(Style::default());
        assert!(s.push_var(StyleVar::Alpha, StyleValue::Int(3)).is_err());
        assert!(s.pop_var().is_err());
    }

    #[test]
    fn pop_on_empty_is_refused() {
        let mut s = ScopeStacks::new(Style::default());
        assert_eq!(s.pop_color(), Err(pop_on_empty(ScopeKind::Color)));
        assert_eq!(s.pop_item_width(), Err(pop_on_empty(ScopeKind::ItemWidth)));
        assert_eq!(s.pop_tab_stop(), Err(pop_on_empty(ScopeKind::TabStop)));
    }

    #[test]
    fn drain_reports_and_resets() {
        let mut s = ScopeStacks::new(Style::default());
        s.push_color(ColorId::Text, color(1, 2, 3, 4));
        s.push_color(ColorId::Border, color(1, 2, 3, 4));
        s.push_tab_stop(false);
        let residual = s.drain();
        assert_eq!(residual, vec![(ScopeKind::Color, 2), (ScopeKind::TabStop, 1)]);
        assert_eq!(*s.style(), Style::default());
        assert!(s.tab_stop());
    }

    #[test]
    fn base_replacement_keeps_overrides() {
        let mut s = ScopeStacks::new(Style::default());
        s.push_var(StyleVar::ItemSpacing, StyleValue::Int(30)).unwrap();
        let mut base = Style::default();
        base.item_spacing = 1;
        base.indent = 50;
        s.set_base(base);
        assert_eq!(s.style().item_spacing, 30);
        assert_eq!(s.style().indent, 50);
        s.pop_var().unwrap();
        assert_eq!(s.style().item_spacing, 1);
    }

    #[test]
    fn random_balanced_sequences_leave_nothing_behind() {
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..200 {
            let mut s = ScopeStacks::new(Style::default());
            let mut open: Vec<u8> = Vec::new();
            for _ in 0..64 {
                if open.is_empty() || rng.random_bool(0.55) {
                    let which = rng.random_range(0..3u8);
                    match which {
                        0 => s.push_var(StyleVar::ItemSpacing, StyleValue::Int(rng.random_range(0..20))).unwrap(),
                        1 => s.push_color(ColorId::Button, color(rng.random(), 0, 0, 255)),
                        _ => s.push_item_width(rng.random_range(-50..200)),
                    }
                    open.push(which);
                } else if let Some(which) = open.pop() {
                    match which {
                        0 => s.pop_var().unwrap(),
                        1 => s.pop_color().unwrap(),
                        _ => s.pop_item_width().unwrap(),
                    }
                }
            }
            while let Some(which) = open.pop() {
                match which {
                    0 => s.pop_var().unwrap(),
                    1 => s.pop_color().unwrap(),
                    _ => s.pop_item_width().unwrap(),
                }
            }
            assert!(s.drain().is_empty());
            assert_eq!(*s.style(), Style::default());
        }
    }

    #[test]
    fn repeat_and_wrap_stacks_drain() {
        let mut s = ScopeStacks::new(Style::default());
        assert!(!s.button_repeat());
        assert_eq!(s.wrap_pos(), None);
        s.push_button_repeat(true);
        s.push_wrap_pos(120);
        s.push_wrap_pos(-1);
        assert!(s.button_repeat());
        assert_eq!(s.wrap_pos(), Some(-1));
        s.pop_wrap_pos().unwrap();
        assert_eq!(s.wrap_pos(), Some(120));
        assert_eq!(s.drain(), vec![(ScopeKind::ButtonRepeat, 1), (ScopeKind::TextWrapPos, 1)]);
        assert!(!s.button_repeat());
        assert_eq!(s.pop_button_repeat(), Err(pop_on_empty(ScopeKind::ButtonRepeat)));
        assert_eq!(s.pop_wrap_pos(), Err(pop_on_empty(ScopeKind::TextWrapPos)));
    }

    #[test]
    fn closure_scopes_unwind_what_the_closure_left() {
        let mut ctx = Context::new();
        ctx.new_frame();
        let spacing = ctx.style().item_spacing;
        let inner = ctx
            .with_style_var(StyleVar::ItemSpacing, StyleValue::Int(spacing + 5), |ctx| {
                ctx.push_style_var(StyleVar::ItemSpacing, StyleValue::Int(spacing + 9)).unwrap();
                ctx.push_style_var(StyleVar::IndentSpacing, StyleValue::Int(1)).unwrap();
                ctx.style().item_spacing
            })
            .unwrap();
        assert_eq!(inner, spacing + 9);
        assert_eq!(*ctx.style(), *ctx.base_style());
        assert!(ctx
            .diagnostics()
            .iter()
            .any(|d| d.error == UiError::ImbalancedScope { stack: ScopeKind::StyleVar, imbalance: Imbalance::Residual(2) }));

        let border = ctx.style().color(ColorId::Border);
        ctx.with_style_color(ColorId::Border, color(9, 9, 9, 9), |ctx| ctx.push_style_color(ColorId::Border, color(1, 1, 1, 1)))
            .unwrap();
        assert_eq!(ctx.style().color(ColorId::Border), border);

        ctx.push_item_width(40);
        ctx.with_item_width(80, |ctx| ctx.push_item_width(120)).unwrap();
        assert_eq!(ctx.scopes.item_width(), Some(40));
        ctx.pop_item_width().unwrap();

        let kinds: Vec<ScopeKind> = ctx
            .diagnostics()
            .iter()
            .filter_map(|d| match d.error {
                UiError::ImbalancedScope { stack, imbalance: Imbalance::Residual(1) } => Some(stack),
                _ => None,
            })
            .collect();
        assert_eq!(kinds, vec![ScopeKind::Color, ScopeKind::ItemWidth]);
        ctx.end_frame();
    }

    #[test]
    fn closure_that_pops_its_own_entry_is_reported() {
        let mut ctx = Context::new();
        ctx.new_frame();
        ctx.push_item_width(40);
        let res = ctx.with_item_width(80, |ctx| ctx.pop_item_width().unwrap());
        assert_eq!(res, Err(pop_on_empty(ScopeKind::ItemWidth)));
        assert_eq!(ctx.scopes.item_width(), Some(40));
        ctx.pop_item_width().unwrap();
        ctx.end_frame();
    }
}
