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
use crate::{Color, Imbalance, ScopeKind, UiError, color};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[repr(u32)]
/// Identifiers for each of the built-in style colors.
pub enum ColorId {
    /// Default text color.
    Text = 0,
    /// Text of disabled widgets.
    TextDisabled,
    /// Outline/border color.
    Border,
    /// Top-level window background.
    WindowBg,
    /// Child region background.
    ChildBg,
    /// Popup, menu and tooltip background.
    PopupBg,
    /// Title bar of an unfocused window.
    TitleBg,
    /// Title bar of the focused window.
    TitleBgActive,
    /// Title text.
    TitleText,
    /// Menu bar strip.
    MenuBarBg,
    /// Frame of input widgets.
    FrameBg,
    /// Frame while hovered.
    FrameBgHovered,
    /// Frame while active.
    FrameBgActive,
    /// Button body.
    Button,
    /// Button while hovered.
    ButtonHovered,
    /// Button while held.
    ButtonActive,
    /// Header of selectables, tree nodes and menus.
    Header,
    /// Header while hovered.
    HeaderHovered,
    /// Header while held or open.
    HeaderActive,
    /// Check mark and radio dot.
    CheckMark,
    /// Slider grab.
    SliderGrab,
    /// Scrollbar track.
    ScrollbarBg,
    /// Scrollbar thumb.
    ScrollbarGrab,
    /// Selected text background.
    TextSelectedBg,
    /// Keyboard navigation highlight.
    NavHighlight,
    /// Full-screen dimming behind a modal.
    ModalDim,
}

impl ColorId {
    /// Number of color entries in [`Style::colors`].
    pub const COUNT: usize = 26;

    /// Promotes the color to its hover variant when it has one.
    pub fn hovered(self) -> Self {
        match self {
            Self::FrameBg => Self::FrameBgHovered,
            Self::Button => Self::ButtonHovered,
            Self::Header => Self::HeaderHovered,
            _ => self,
        }
    }

    /// Promotes the color to its active variant when it has one.
    pub fn active(self) -> Self {
        match self {
            Self::FrameBg | Self::FrameBgHovered => Self::FrameBgActive,
            Self::Button | Self::ButtonHovered => Self::ButtonActive,
            Self::Header | Self::HeaderHovered => Self::HeaderActive,
            _ => self,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
/// Style variables that can be overridden through the scope stack.
pub enum StyleVar {
    /// Global opacity multiplier, `Float`.
    Alpha,
    /// Padding inside windows, `Int`.
    WindowPadding,
    /// Padding inside framed widgets, `Int`.
    FramePadding,
    /// Gap between consecutive items, `Int`.
    ItemSpacing,
    /// Gap between the parts of a composite widget, `Int`.
    ItemInnerSpacing,
    /// Horizontal indent of tree levels, `Int`.
    IndentSpacing,
    /// Height of window title bars, `Int`.
    TitleHeight,
    /// Width of scrollbars, `Int`.
    ScrollbarSize,
    /// Minimum size of slider and scrollbar grabs, `Int`.
    GrabMinSize,
    /// Width of window borders, `Int`.
    BorderSize,
    /// Smallest size a window can be resized to, `Int`.
    WindowMinSize,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
/// Kind of value a [`StyleVar`] accepts.
pub enum StyleValueKind {
    /// Integer pixel value.
    Int,
    /// Floating point value.
    Float,
}

#[derive(Copy, Clone, Debug, PartialEq)]
/// Value pushed for a [`StyleVar`].
pub enum StyleValue {
    /// Integer pixel value.
    Int(i32),
    /// Floating point value.
    Float(f32),
}

impl StyleValue {
    /// Kind of the stored value.
    pub fn kind(self) -> StyleValueKind {
        match self {
            StyleValue::Int(_) => StyleValueKind::Int,
            StyleValue::Float(_) => StyleValueKind::Float,
        }
    }
}

impl StyleVar {
    /// Kind of value this variable accepts.
    pub fn kind(self) -> StyleValueKind {
        match self {
            StyleVar::Alpha => StyleValueKind::Float,
            _ => StyleValueKind::Int,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
/// Collection of visual constants that drive widget appearance.
pub struct Style {
    /// Opacity multiplier applied to every emitted color.
    pub alpha: f32,
    /// Padding inside windows.
    pub window_padding: i32,
    /// Padding inside framed widgets.
    pub frame_padding: i32,
    /// Spacing between items.
    pub item_spacing: i32,
    /// Spacing between the parts of a composite widget.
    pub item_inner_spacing: i32,
    /// Indentation applied to nested content.
    pub indent: i32,
    /// Height of window title bars.
    pub title_height: i32,
    /// Width of scrollbars.
    pub scrollbar_size: i32,
    /// Minimum size of slider and scrollbar grabs.
    pub grab_min_size: i32,
    /// Window border width; zero disables borders.
    pub border_size: i32,
    /// Smallest window size reachable by resizing.
    pub window_min_size: i32,
    /// Width of items when neither the item width stack nor the next item data set one.
    /// Zero selects 65% of the available width.
    pub default_item_width: i32,
    /// Palette indexed by [`ColorId`].
    pub colors: [Color; ColorId::COUNT],
}

impl Default for Style {
    fn default() -> Self {
        Self {
            alpha: 1.0,
            window_padding: 8,
            frame_padding: 4,
            item_spacing: 4,
            item_inner_spacing: 4,
            indent: 21,
            title_height: 24,
            scrollbar_size: 12,
            grab_min_size: 8,
            border_size: 1,
            window_min_size: 32,
            default_item_width: 0,
            colors: [
                color(230, 230, 230, 255),
                color(128, 128, 128, 255),
                color(25, 25, 25, 255),
                color(50, 50, 50, 255),
                color(0, 0, 0, 0),
                color(40, 40, 40, 250),
                color(25, 25, 25, 255),
                color(40, 60, 90, 255),
                color(240, 240, 240, 255),
                color(36, 36, 36, 255),
                color(30, 30, 30, 255),
                color(35, 35, 35, 255),
                color(40, 40, 40, 255),
                color(75, 75, 75, 255),
                color(95, 95, 95, 255),
                color(115, 115, 115, 255),
                color(60, 60, 60, 255),
                color(80, 80, 80, 255),
                color(100, 100, 100, 255),
                color(200, 200, 200, 255),
                color(150, 150, 150, 255),
                color(43, 43, 43, 255),
                color(30, 30, 30, 255),
                color(60, 90, 140, 160),
                color(110, 150, 220, 255),
                color(0, 0, 0, 120),
            ],
        }
    }
}

impl Style {
    /// Looks up a palette entry.
    pub fn color(&self, id: ColorId) -> Color { self.colors[id as usize] }

    /// Replaces a palette entry.
    pub fn set_color(&mut self, id: ColorId, color: Color) { self.colors[id as usize] = color; }

    /// Reads a style variable.
    pub fn get(&self, var: StyleVar) -> StyleValue {
        match var {
            StyleVar::Alpha => StyleValue::Float(self.alpha),
            StyleVar::WindowPadding => StyleValue::Int(self.window_padding),
            StyleVar::FramePadding => StyleValue::Int(self.frame_padding),
            StyleVar::ItemSpacing => StyleValue::Int(self.item_spacing),
            StyleVar::ItemInnerSpacing => StyleValue::Int(self.item_inner_spacing),
            StyleVar::IndentSpacing => StyleValue::Int(self.indent),
            StyleVar::TitleHeight => StyleValue::Int(self.title_height),
            StyleVar::ScrollbarSize => StyleValue::Int(self.scrollbar_size),
            StyleVar::GrabMinSize => StyleValue::Int(self.grab_min_size),
            StyleVar::BorderSize => StyleValue::Int(self.border_size),
            StyleVar::WindowMinSize => StyleValue::Int(self.window_min_size),
        }
    }

    /// Writes a style variable, rejecting values of the wrong kind.
    pub fn set(&mut self, var: StyleVar, value: StyleValue) -> Result<(), UiError> {
        let slot = match (var, value) {
            (StyleVar::Alpha, StyleValue::Float(v)) => {
                self.alpha = v.clamp(0.0, 1.0);
                return Ok(());
            }
            (StyleVar::WindowPadding, StyleValue::Int(_)) => &mut self.window_padding,
            (StyleVar::FramePadding, StyleValue::Int(_)) => &mut self.frame_padding,
            (StyleVar::ItemSpacing, StyleValue::Int(_)) => &mut self.item_spacing,
            (StyleVar::ItemInnerSpacing, StyleValue::Int(_)) => &mut self.item_inner_spacing,
            (StyleVar::IndentSpacing, StyleValue::Int(_)) => &mut self.indent,
            (StyleVar::TitleHeight, StyleValue::Int(_)) => &mut self.title_height,
            (StyleVar::ScrollbarSize, StyleValue::Int(_)) => &mut self.scrollbar_size,
            (StyleVar::GrabMinSize, StyleValue::Int(_)) => &mut self.grab_min_size,
            (StyleVar::BorderSize, StyleValue::Int(_)) => &mut self.border_size,
            (StyleVar::WindowMinSize, StyleValue::Int(_)) => &mut self.window_min_size,
            _ => return Err(UiError::StyleValueMismatch { var }),
        };
        if let StyleValue::Int(v) = value {
            *slot = v;
        }
        Ok(())
    }
}

pub(crate) fn pop_on_empty(stack: ScopeKind) -> UiError { UiError::ImbalancedScope { stack, imbalance: Imbalance::PopOnEmpty } }

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn palette_is_fully_populated() {
        let style = Style::default();
        assert_eq!(style.colors.len(), ColorId::ModalDim as usize + 1);
    }

    #[test]
    fn set_rejects_wrong_kind() {
        let mut style = Style::default();
        assert_eq!(
            style.set(StyleVar::Alpha, StyleValue::Int(1)),
            Err(UiError::StyleValueMismatch { var: StyleVar::Alpha })
        );
        assert_eq!(
            style.set(StyleVar::FramePadding, StyleValue::Float(1.0)),
            Err(UiError::StyleValueMismatch { var: StyleVar::FramePadding })
        );
        style.set(StyleVar::FramePadding, StyleValue::Int(9)).unwrap();
        assert_eq!(style.get(StyleVar::FramePadding), StyleValue::Int(9));
    }

    #[test]
    fn promotion() {
        assert_eq!(ColorId::Button.hovered(), ColorId::ButtonHovered);
        assert_eq!(ColorId::ButtonHovered.active(), ColorId::ButtonActive);
        assert_eq!(ColorId::Text.active(), ColorId::Text);
    }
}
