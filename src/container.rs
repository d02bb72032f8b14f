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
use bitflags::bitflags;

use crate::layout::Layout;
use crate::routing::ItemRecord;
use crate::*;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
/// What a container was begun as.
pub enum ContainerKind {
    /// Top-level window.
    Window,
    /// Scrollable region embedded in another container.
    Child,
    /// Popup opened by `open_popup`.
    Popup,
    /// Popup that blocks interaction with everything beneath it.
    Modal,
    /// Popup opened by a menu.
    Menu,
    /// Non-interactive overlay following the pointer.
    Tooltip,
}

impl ContainerKind {
    /// Returns `true` for kinds living on the popup stack.
    pub fn is_popup(self) -> bool { matches!(self, Self::Popup | Self::Modal | Self::Menu) }

    /// Returns `true` for kinds drawn as independent layers.
    pub fn is_root(self) -> bool { self != Self::Child }

    // paint tier: windows, then popups, then tooltips
    pub(crate) fn tier(self) -> u8 {
        match self {
            Self::Window | Self::Child => 0,
            Self::Popup | Self::Modal | Self::Menu => 1,
            Self::Tooltip => 2,
        }
    }
}

bitflags! {
    #[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
    /// Behavior switches of a container.
    pub struct WindowOption : u32 {
        /// Keep keyboard navigation out of this window.
        const NO_NAV = 4096;
        /// Do not raise the window when it is clicked.
        const NO_BRING_TO_FRONT = 2048;
        /// Do not take focus the first time the window appears.
        const NO_FOCUS_ON_APPEARING = 1024;
        /// Reserve a menu bar strip below the title.
        const MENU_BAR = 512;
        /// Draw a border around a child region.
        const BORDER = 256;
        /// Skip the background fill.
        const NO_BACKGROUND = 128;
        /// The window ignores the pointer; clicks fall through.
        const NO_INPUTS = 64;
        /// Size the window to its content every frame.
        const AUTO_SIZE = 32;
        /// No collapse button.
        const NO_COLLAPSE = 16;
        /// No vertical scrollbar.
        const NO_SCROLLBAR = 8;
        /// The title bar cannot be dragged.
        const NO_MOVE = 4;
        /// No resize grip.
        const NO_RESIZE = 2;
        /// No title bar.
        const NO_TITLE = 1;
        /// No flags.
        const NONE = 0;
    }
}

impl WindowOption {
    /// Returns `true` when a title bar is drawn.
    pub fn has_title(&self) -> bool { !self.contains(Self::NO_TITLE) }
    /// Returns `true` when the window can be resized.
    pub fn is_resizable(&self) -> bool { !self.intersects(Self::NO_RESIZE | Self::AUTO_SIZE) }
    /// Returns `true` when the window can be moved.
    pub fn is_movable(&self) -> bool { !self.contains(Self::NO_MOVE) }
    /// Returns `true` when the window sizes itself.
    pub fn is_auto_sized(&self) -> bool { self.contains(Self::AUTO_SIZE) }
}

/// Persistent record of a window, child region, popup, menu or tooltip.
pub struct Container {
    pub(crate) id: Id,
    pub(crate) name: String,
    pub(crate) kind: ContainerKind,
    pub(crate) flags: WindowOption,
    pub(crate) parent: Option<Id>,
    pub(crate) children: Vec<Id>,
    pub(crate) rect: Recti,
    pub(crate) body: Recti,
    pub(crate) clip: Recti,
    pub(crate) hit_rect: Recti,
    pub(crate) menu_bar: Recti,
    pub(crate) scroll: Vec2i,
    pub(crate) content_size: Vec2i,
    pub(crate) explicit_content: Option<(i32, i32)>,
    pub(crate) collapsed: bool,
    pub(crate) hidden: bool,
    pub(crate) zindex: i32,
    pub(crate) bg_alpha: Option<f32>,
    pub(crate) active: bool,
    pub(crate) was_active: bool,
    pub(crate) appearing: bool,
    pub(crate) begun_frame: usize,
    pub(crate) id_depth: usize,
    pub(crate) layout_dirty: bool,
    pub(crate) layout: Layout,
    pub(crate) draw: DrawList,
    pub(crate) items: Vec<ItemRecord>,
}

impl Container {
    pub(crate) fn new(id: Id, name: &str, kind: ContainerKind, flags: WindowOption) -> Self {
        Self {
            id,
            name: name.to_string(),
            kind,
            flags,
            parent: None,
            children: Vec::new(),
            rect: Recti::default(),
            body: Recti::default(),
            clip: Recti::default(),
            hit_rect: Recti::default(),
            menu_bar: Recti::default(),
            scroll: Vec2i::default(),
            content_size: Vec2i::default(),
            explicit_content: None,
            collapsed: false,
            hidden: false,
            zindex: 0,
            bg_alpha: None,
            active: false,
            was_active: false,
            appearing: true,
            begun_frame: 0,
            id_depth: 0,
            layout_dirty: false,
            layout: Layout::default(),
            draw: DrawList::default(),
            items: Vec::new(),
        }
    }

    /// Identity of the container.
    pub fn id(&self) -> Id { self.id }

    /// Name it was begun with, including any `##` suffix.
    pub fn name(&self) -> &str { &self.name }

    /// Kind it was last begun as.
    pub fn kind(&self) -> ContainerKind { self.kind }

    /// Flags it was last begun with.
    pub fn flags(&self) -> WindowOption { self.flags }

    /// Enclosing container for child regions, the opener for popups.
    pub fn parent(&self) -> Option<Id> { self.parent }

    /// Child regions begun inside this container during the frame, in begin order.
    pub fn children(&self) -> &[Id] { &self.children }

    /// Outer rectangle including title bar.
    pub fn rect(&self) -> Recti { self.rect }

    /// Inner region items are laid out in.
    pub fn body(&self) -> Recti { self.body }

    /// Scroll offset.
    pub fn scroll(&self) -> Vec2i { self.scroll }

    /// Largest scroll offset along both axes.
    pub fn max_scroll(&self) -> Vec2i {
        let cs = self.explicit_content.map_or(self.content_size, |(w, h)| vec2(w, h));
        let view = self.layout.body();
        vec2((cs.x - view.width).max(0), (cs.y - view.height).max(0))
    }

    /// Size of the content laid out during the last completed frame.
    pub fn content_size(&self) -> Vec2i { self.content_size }

    /// Returns `true` when collapsed to its title bar.
    pub fn is_collapsed(&self) -> bool { self.collapsed }

    /// Stacking order among top-level windows; larger is in front.
    pub fn zindex(&self) -> i32 { self.zindex }

    /// Returns `true` when submitted during the current (or last completed) frame.
    pub fn is_active(&self) -> bool { self.active }

    /// Returns `true` on the frame the container became visible again.
    pub fn is_appearing(&self) -> bool { self.appearing }

    /// Commands recorded for this container.
    pub fn draw_list(&self) -> &DrawList { &self.draw }
}
