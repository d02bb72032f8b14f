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
//! Per-container display lists and the handoff to the renderer.

use crate::*;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
/// Handle referencing a renderer-owned texture.
pub struct TextureId(u32);

impl TextureId {
    /// Wraps a renderer handle.
    pub fn new(raw: u32) -> Self { Self(raw) }
    /// Returns the raw numeric identifier stored inside the handle.
    pub fn raw(self) -> u32 { self.0 }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
/// Glyphs the renderer is expected to provide.
pub enum Icon {
    /// Window close cross.
    Close,
    /// Check mark.
    Check,
    /// Arrow of a collapsed node or header.
    Collapsed,
    /// Arrow of an expanded node or header.
    Expanded,
    /// Arrow hinting at a submenu or combo list.
    Submenu,
    /// Window resize grip.
    ResizeGrip,
}

#[derive(Clone)]
/// One drawing instruction.
pub enum Command {
    /// Sets the scissor rectangle for the following commands.
    Clip {
        /// Scissor rectangle in screen space.
        rect: Recti,
    },
    /// Fills a rectangle, already clipped against the scissor.
    Rect {
        /// Filled area.
        rect: Recti,
        /// Fill color.
        color: Color,
    },
    /// Draws a single line of text with its top-left corner at `pos`.
    Text {
        /// Top-left corner.
        pos: Vec2i,
        /// Text color.
        color: Color,
        /// UTF-8 string.
        text: String,
    },
    /// Draws an [`Icon`] centered in `rect`.
    Icon {
        /// Which glyph.
        icon: Icon,
        /// Target area.
        rect: Recti,
        /// Tint.
        color: Color,
    },
    /// Draws a texture stretched over `rect`.
    Image {
        /// Renderer texture.
        texture: TextureId,
        /// Target area.
        rect: Recti,
        /// Tint.
        color: Color,
    },
}

#[derive(PartialEq, Copy, Clone, Debug)]
pub(crate) enum Clip {
    None,
    Part,
    All,
}

#[derive(Clone, Default)]
/// Commands recorded for a single container during the current frame.
pub struct DrawList {
    owner: Id,
    commands: Vec<Command>,
    clip_stack: Vec<Recti>,
}

impl DrawList {
    /// Container that produced this list.
    pub fn owner(&self) -> Id { self.owner }

    /// Recorded commands in submission order.
    pub fn commands(&self) -> &[Command] { &self.commands }

    /// Returns `true` when nothing was recorded.
    pub fn is_empty(&self) -> bool { self.commands.is_empty() }

    pub(crate) fn reset(&mut self, owner: Id) {
        self.owner = owner;
        self.commands.clear();
        self.clip_stack.clear();
    }

    pub(crate) fn current_clip_rect(&self) -> Recti { self.clip_stack.last().copied().unwrap_or(UNCLIPPED_RECT) }

    pub(crate) fn push_clip_rect(&mut self, rect: Recti) {
        let last = self.current_clip_rect();
        self.clip_stack.push(intersect_rect(rect, last));
    }

    // for strips outside the body clip, such as the menu bar
    pub(crate) fn push_clip_rect_unbounded(&mut self, rect: Recti) { self.clip_stack.push(rect); }

    pub(crate) fn pop_clip_rect(&mut self) { self.clip_stack.pop(); }

    pub(crate) fn clip_depth(&self) -> usize { self.clip_stack.len() }

    pub(crate) fn truncate_clip(&mut self, depth: usize) { self.clip_stack.truncate(depth) }

    fn push_command(&mut self, cmd: Command) { self.commands.push(cmd); }

    fn set_clip(&mut self, rect: Recti) { self.push_command(Command::Clip { rect }); }

    pub(crate) fn check_clip(&self, r: Recti) -> Clip {
        let cr = self.current_clip_rect();
        if is_empty_rect(intersect_rect(r, cr)) {
            return Clip::All;
        }
        if r.x >= cr.x && r.x + r.width <= cr.x.saturating_add(cr.width) && r.y >= cr.y && r.y + r.height <= cr.y.saturating_add(cr.height) {
            return Clip::None;
        }
        Clip::Part
    }

    // wraps `cmd` in a scissor change when it pokes out of the current clip
    fn push_clipped(&mut self, bounds: Recti, cmd: Command) {
        let clipped = self.check_clip(bounds);
        match clipped {
            Clip::All => return,
            Clip::Part => {
                let clip = self.current_clip_rect();
                self.set_clip(clip)
            }
            Clip::None => (),
        }
        self.push_command(cmd);
        if clipped != Clip::None {
            self.set_clip(UNCLIPPED_RECT);
        }
    }

    pub(crate) fn draw_rect(&mut self, rect: Recti, color: Color) {
        let rect = intersect_rect(rect, self.current_clip_rect());
        if !is_empty_rect(rect) && color.a != 0 {
            self.push_command(Command::Rect { rect, color });
        }
    }

    pub(crate) fn draw_box(&mut self, r: Recti, color: Color) {
        self.draw_rect(rect(r.x + 1, r.y, r.width - 2, 1), color);
        self.draw_rect(rect(r.x + 1, r.y + r.height - 1, r.width - 2, 1), color);
        self.draw_rect(rect(r.x, r.y, 1, r.height), color);
        self.draw_rect(rect(r.x + r.width - 1, r.y, 1, r.height), color);
    }

    /// Fills `rect` and outlines it with `border` when the border is visible.
    pub(crate) fn draw_frame(&mut self, rect: Recti, fill: Color, border: Option<Color>) {
        self.draw_rect(rect, fill);
        if let Some(border) = border.filter(|c| c.a != 0) {
            self.draw_box(rect, border);
        }
    }

    pub(crate) fn draw_text(&mut self, font: &dyn Font, text: &str, pos: Vec2i, color: Color) {
        if text.is_empty() || color.a == 0 {
            return;
        }
        let bounds = rect(pos.x, pos.y, font.text_width(text), font.line_height());
        self.push_clipped(bounds, Command::Text { pos, color, text: String::from(text) });
    }

    pub(crate) fn draw_icon(&mut self, icon: Icon, rect: Recti, color: Color) { self.push_clipped(rect, Command::Icon { icon, rect, color }); }

    pub(crate) fn draw_image(&mut self, texture: TextureId, rect: Recti, color: Color) {
        self.push_clipped(rect, Command::Image { texture, rect, color });
    }
}

/// Display lists of one frame in back-to-front order.
pub struct DrawData<'a> {
    /// Display width the frame was laid out for.
    pub display_width: i32,
    /// Display height the frame was laid out for.
    pub display_height: i32,
    /// Lists to paint, first one at the back.
    pub lists: Vec<&'a DrawList>,
}

impl DrawData<'_> {
    /// Total number of commands over all lists.
    pub fn command_count(&self) -> usize { self.lists.iter().map(|l| l.commands().len()).sum() }

    /// Feeds every list to `renderer` in paint order.
    pub fn render(&self, renderer: &mut dyn Renderer) {
        renderer.begin(self.display_width, self.display_height);
        for list in &self.lists {
            renderer.draw_list(list);
        }
        renderer.end();
    }
}

/// Backend that rasterizes [`DrawData`].
pub trait Renderer {
    /// Called once before the first list of a frame.
    fn begin(&mut self, width: i32, height: i32);
    /// Paints one container's list.
    fn draw_list(&mut self, list: &DrawList);
    /// Called once after the last list.
    fn end(&mut self);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rects_are_clipped_geometrically() {
        let mut list = DrawList::default();
        list.push_clip_rect(rect(0, 0, 10, 10));
        list.draw_rect(rect(5, 5, 10, 10), color(1, 1, 1, 255));
        list.draw_rect(rect(20, 20, 4, 4), color(1, 1, 1, 255));
        assert_eq!(list.commands().len(), 1);
        match &list.commands()[0] {
            Command::Rect { rect, .. } => assert_eq!((rect.x, rect.y, rect.width, rect.height), (5, 5, 5, 5)),
            _ => panic!("expected a rect"),
        }
    }

    #[test]
    fn partially_clipped_text_is_wrapped_in_scissor() {
        let font = MonoFont::default();
        let mut list = DrawList::default();
        list.push_clip_rect(rect(0, 0, 20, 20));
        list.draw_text(&font, "hello world", vec2(2, 2), color(255, 255, 255, 255));
        let kinds: Vec<&str> = list
            .commands()
            .iter()
            .map(|c| match c {
                Command::Clip { .. } => "clip",
                Command::Text { .. } => "text",
                _ => "other",
            })
            .collect();
        assert_eq!(kinds, ["clip", "text", "clip"]);
    }

    #[test]
    fn nested_clips_intersect() {
        let mut list = DrawList::default();
        list.push_clip_rect(rect(0, 0, 100, 100));
        list.push_clip_rect(rect(50, 50, 100, 100));
        let c = list.current_clip_rect();
        assert_eq!((c.x, c.y, c.width, c.height), (50, 50, 50, 50));
        list.pop_clip_rect();
        assert_eq!(list.current_clip_rect().width, 100);
    }

    struct Counter(usize, bool);

    impl Renderer for Counter {
        fn begin(&mut self, _width: i32, _height: i32) { self.1 = true; }
        fn draw_list(&mut self, list: &DrawList) { self.0 += list.commands().len(); }
        fn end(&mut self) {}
    }

    #[test]
    fn render_visits_every_list() {
        let mut a = DrawList::default();
        a.draw_rect(rect(0, 0, 4, 4), color(1, 1, 1, 255));
        let mut b = DrawList::default();
        b.draw_rect(rect(0, 0, 4, 4), color(1, 1, 1, 255));
        b.draw_rect(rect(8, 0, 4, 4), color(1, 1, 1, 255));
        let data = DrawData { display_width: 10, display_height: 10, lists: vec![&a, &b] };
        let mut r = Counter(0, false);
        data.render(&mut r);
        assert!(r.1);
        assert_eq!(r.0, data.command_count());
    }
}
