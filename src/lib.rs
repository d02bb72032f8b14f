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
#![deny(missing_docs)]
//! `imui-core` is the interaction core of an immediate-mode GUI toolkit.
//!
//! Application code redeclares its whole interface every frame through a [`Context`]. The context derives a
//! stable [`Id`] for every widget from its ID-stack path, keeps the style/color scope stacks balanced, tracks
//! the nested stack of windows, child regions, popups, menus and tooltips, routes pointer and keyboard input
//! to exactly one hovered and at most one active widget, and owns the transient editing state of the active
//! text field. Rendering is left to an external [`Renderer`] that consumes the [`DrawData`] display list.

use std::cmp::{max, min};
use std::fmt;

mod condition;
mod config;
mod container;
mod context;
mod draw;
mod error;
mod id_stack;
mod input;
mod layout;
mod popup;
mod registry;
mod routing;
mod scope;
mod style;
mod text_edit;
mod widgets;
mod window;

pub use condition::*;
pub use config::ContextConfig;
pub use container::*;
pub use context::Context;
pub use draw::*;
pub use error::*;
pub use id_stack::*;
pub use input::*;
pub use popup::PopupOptions;
pub use routing::{ActivationSource, ActiveItem, ButtonFlags, InteractionPhase, ItemKind, ItemStatus};
pub use rs_math3d::{Dimensioni, Recti, Vec2i};
pub use style::*;
pub use text_edit::*;
pub use widgets::*;

#[derive(Default, Copy, Clone, Eq, PartialEq, Hash, Debug, PartialOrd, Ord)]
/// Numeric identifier of a widget or container, derived from its ID-stack path.
pub struct Id(u64);

/// Alias used where the identifier names an interactive widget.
pub type WidgetId = Id;

impl Id {
    /// The reserved "no identity" value; never produced by hashing.
    pub const NONE: Id = Id(0);

    /// Wraps a caller-supplied raw value.
    pub fn new(value: u64) -> Self { Self(value) }

    /// Hashes a label from the root seed, the way top-level window names are hashed.
    pub fn from_label(label: &str) -> Self { hash_segment(ROOT_SEED, IdSegment::Str(label)) }

    /// Returns the raw numeric value wrapped by this ID.
    pub fn raw(self) -> u64 { self.0 }

    /// Returns `true` for [`Id::NONE`].
    pub fn is_none(self) -> bool { self.0 == 0 }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "#{:016x}", self.0) }
}

#[derive(Default, Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[repr(C)]
/// Simple RGBA color stored with 8-bit components.
pub struct Color {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
    /// Alpha channel.
    pub a: u8,
}

impl Color {
    /// Returns the color with its alpha multiplied by `alpha` (clamped to `0.0..=1.0`).
    pub fn scale_alpha(self, alpha: f32) -> Self {
        let alpha = alpha.clamp(0.0, 1.0);
        Self { a: (self.a as f32 * alpha).round() as u8, ..self }
    }
}

/// Font metrics consulted for text layout. Glyph rasterization belongs to the renderer.
pub trait Font {
    /// Returns the font's display name.
    fn name(&self) -> &str;
    /// Returns the height of one line of text in pixels.
    fn line_height(&self) -> i32;
    /// Returns the horizontal advance of `c` in pixels.
    fn char_width(&self, c: char) -> i32;
    /// Returns the width of `text` laid out on a single line.
    fn text_width(&self, text: &str) -> i32 { text.chars().map(|c| self.char_width(c)).sum() }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
/// Fixed-advance font metrics; the default until a real font is installed.
pub struct MonoFont {
    /// Advance of every glyph.
    pub glyph_width: i32,
    /// Height of a text line.
    pub line_height: i32,
}

impl Default for MonoFont {
    fn default() -> Self { Self { glyph_width: 7, line_height: 13 } }
}

impl Font for MonoFont {
    fn name(&self) -> &str { "mono" }
    fn line_height(&self) -> i32 { self.line_height }
    fn char_width(&self, _c: char) -> i32 { self.glyph_width }
}

pub(crate) const UNCLIPPED_RECT: Recti = Recti { x: 0, y: 0, width: i32::MAX, height: i32::MAX };

/// Convenience constructor for [`Vec2i`].
pub fn vec2(x: i32, y: i32) -> Vec2i { Vec2i { x, y } }

/// Convenience constructor for [`Recti`].
pub fn rect(x: i32, y: i32, w: i32, h: i32) -> Recti { Recti { x, y, width: w, height: h } }

/// Convenience constructor for [`Color`].
pub fn color(r: u8, g: u8, b: u8, a: u8) -> Color { Color { r, g, b, a } }

/// Expands (or shrinks) a rectangle uniformly on all sides.
pub fn expand_rect(r: Recti, n: i32) -> Recti { rect(r.x - n, r.y - n, r.width + n * 2, r.height + n * 2) }

/// Half-open containment test: the right and bottom edges belong to the neighbour.
pub fn rect_contains(r: Recti, p: Vec2i) -> bool {
    p.x >= r.x && p.y >= r.y && (p.x as i64) < r.x as i64 + r.width as i64 && (p.y as i64) < r.y as i64 + r.height as i64
}

/// Intersection of two rectangles; an empty rectangle when they do not overlap.
pub fn intersect_rect(a: Recti, b: Recti) -> Recti {
    let x1 = max(a.x, b.x);
    let y1 = max(a.y, b.y);
    let x2 = min(a.x.saturating_add(a.width), b.x.saturating_add(b.width));
    let y2 = min(a.y.saturating_add(a.height), b.y.saturating_add(b.height));
    rect(x1, y1, max(0, x2 - x1), max(0, y2 - y1))
}

pub(crate) fn is_empty_rect(r: Recti) -> bool { r.width <= 0 || r.height <= 0 }

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intersect_disjoint_is_empty() {
        let r = intersect_rect(rect(0, 0, 10, 10), rect(20, 20, 5, 5));
        assert!(is_empty_rect(r));
    }

    #[test]
    fn intersect_with_unclipped_is_identity() {
        let r = intersect_rect(rect(3, 4, 10, 12), UNCLIPPED_RECT);
        assert_eq!((r.x, r.y, r.width, r.height), (3, 4, 10, 12));
    }

    #[test]
    fn contains_is_half_open() {
        let r = rect(0, 0, 10, 10);
        assert!(rect_contains(r, vec2(0, 0)));
        assert!(rect_contains(r, vec2(9, 9)));
        assert!(!rect_contains(r, vec2(10, 5)));
    }

    #[test]
    fn alpha_scaling_clamps() {
        let c = color(10, 20, 30, 200).scale_alpha(0.5);
        assert_eq!(c.a, 100);
        assert_eq!(color(1, 1, 1, 255).scale_alpha(4.0).a, 255);
    }
}
