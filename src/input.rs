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

use crate::{Vec2i, vec2};

bitflags! {
    #[derive(Copy, Clone, Debug, PartialEq, Eq)]
    /// Mouse button state as reported by the input system.
    pub struct MouseButton : u32 {
        /// Middle mouse button.
        const MIDDLE = 4;
        /// Right mouse button.
        const RIGHT = 2;
        /// Left mouse button.
        const LEFT = 1;
        /// No buttons pressed.
        const NONE = 0;
    }
}

impl MouseButton {
    /// Returns `true` if the middle mouse button is pressed.
    pub fn is_middle(&self) -> bool { self.intersects(Self::MIDDLE) }
    /// Returns `true` if the right mouse button is pressed.
    pub fn is_right(&self) -> bool { self.intersects(Self::RIGHT) }
    /// Returns `true` if the left mouse button is pressed.
    pub fn is_left(&self) -> bool { self.intersects(Self::LEFT) }
    /// Returns `true` if no mouse buttons are pressed.
    pub fn is_none(&self) -> bool { self.bits() == 0 }
}

bitflags! {
    #[derive(Copy, Clone, Debug, PartialEq, Eq)]
    /// Modifier key state tracked by the input system.
    pub struct KeyMode : u32 {
        /// Alt key held.
        const ALT = 4;
        /// Control key held.
        const CTRL = 2;
        /// Shift key held.
        const SHIFT = 1;
        /// No modifiers active.
        const NONE = 0;
    }
}

impl KeyMode {
    /// Returns `true` if no modifiers are active.
    pub fn is_none(&self) -> bool { self.bits() == 0 }
    /// Returns `true` if Alt is held.
    pub fn is_alt(&self) -> bool { self.intersects(Self::ALT) }
    /// Returns `true` if Control is held.
    pub fn is_ctrl(&self) -> bool { self.intersects(Self::CTRL) }
    /// Returns `true` if Shift is held.
    pub fn is_shift(&self) -> bool { self.intersects(Self::SHIFT) }
}

bitflags! {
    #[derive(Copy, Clone, Debug, PartialEq, Eq)]
    /// Logical keys consumed by navigation, popups and text editing.
    pub struct KeyCode : u32 {
        /// Y, used with Control for redo.
        const Y = 1 << 16;
        /// Z, used with Control for undo.
        const Z = 1 << 15;
        /// A, used with Control for select-all.
        const A = 1 << 14;
        /// Insert key, toggles overwrite mode.
        const INSERT = 1 << 13;
        /// Space bar.
        const SPACE = 1 << 12;
        /// Tab key.
        const TAB = 1 << 11;
        /// Escape key.
        const ESCAPE = 1 << 10;
        /// Return/Enter key.
        const RETURN = 1 << 9;
        /// Backspace key.
        const BACKSPACE = 1 << 8;
        /// Home key.
        const HOME = 1 << 7;
        /// Delete key.
        const DELETE = 32;
        /// End key.
        const END = 16;
        /// Right arrow key.
        const RIGHT = 8;
        /// Left arrow key.
        const LEFT = 4;
        /// Down arrow key.
        const DOWN = 2;
        /// Up arrow key.
        const UP = 1;
        /// No keys pressed.
        const NONE = 0;
    }
}

impl KeyCode {
    /// Returns `true` if no key is pressed.
    pub fn is_none(&self) -> bool { self.bits() == 0 }
    /// Returns `true` if any arrow key is pressed.
    pub fn is_arrow(&self) -> bool { self.intersects(Self::UP | Self::DOWN | Self::LEFT | Self::RIGHT) }
}

#[derive(Clone, Debug)]
/// Aggregates raw input collected during the current frame.
pub struct Input {
    mouse_pos: Vec2i,
    last_mouse_pos: Vec2i,
    mouse_delta: Vec2i,
    scroll_delta: Vec2i,
    mouse_down: MouseButton,
    mouse_pressed: MouseButton,
    mouse_released: MouseButton,
    key_down: KeyMode,
    key_code_down: KeyCode,
    key_code_pressed: KeyCode,
    input_text: String,
}

impl Default for Input {
    fn default() -> Self {
        Self {
            mouse_pos: Vec2i::default(),
            last_mouse_pos: Vec2i::default(),
            mouse_delta: Vec2i::default(),
            scroll_delta: Vec2i::default(),
            mouse_down: MouseButton::NONE,
            mouse_pressed: MouseButton::NONE,
            mouse_released: MouseButton::NONE,
            key_down: KeyMode::NONE,
            key_code_down: KeyCode::NONE,
            key_code_pressed: KeyCode::NONE,
            input_text: String::default(),
        }
    }
}

impl Input {
    /// Current pointer position.
    pub fn mouse_pos(&self) -> Vec2i { self.mouse_pos }

    /// Pointer movement since the previous frame.
    pub fn mouse_delta(&self) -> Vec2i { self.mouse_delta }

    /// Scroll wheel movement accumulated this frame.
    pub fn scroll_delta(&self) -> Vec2i { self.scroll_delta }

    /// Returns the currently held mouse buttons.
    pub fn mouse_down(&self) -> MouseButton { self.mouse_down }

    /// Returns the mouse buttons pressed this frame.
    pub fn mouse_pressed(&self) -> MouseButton { self.mouse_pressed }

    /// Returns the mouse buttons released this frame.
    pub fn mouse_released(&self) -> MouseButton { self.mouse_released }

    /// Returns the state of all modifier keys.
    pub fn key_mods(&self) -> KeyMode { self.key_down }

    /// Returns the keys currently held.
    pub fn key_codes(&self) -> KeyCode { self.key_code_down }

    /// Returns `true` when `code` was pressed (or auto-repeated) this frame.
    pub fn is_key_pressed(&self, code: KeyCode) -> bool { self.key_code_pressed.intersects(code) }

    /// Returns the accumulated UTF-8 text entered this frame.
    pub fn text_input(&self) -> &str { &self.input_text }

    /// Updates the current mouse pointer position.
    pub fn mousemove(&mut self, x: i32, y: i32) { self.mouse_pos = vec2(x, y); }

    /// Records that the specified mouse button was pressed.
    pub fn mousedown(&mut self, x: i32, y: i32, btn: MouseButton) {
        self.mousemove(x, y);
        self.mouse_down |= btn;
        self.mouse_pressed |= btn;
    }

    /// Records that the specified mouse button was released.
    pub fn mouseup(&mut self, x: i32, y: i32, btn: MouseButton) {
        self.mousemove(x, y);
        self.mouse_down &= !btn;
        self.mouse_released |= btn;
    }

    /// Accumulates scroll wheel movement.
    pub fn scroll(&mut self, x: i32, y: i32) {
        self.scroll_delta.x += x;
        self.scroll_delta.y += y;
    }

    /// Records that a modifier key was pressed.
    pub fn keydown(&mut self, key: KeyMode) { self.key_down |= key; }

    /// Records that a modifier key was released.
    pub fn keyup(&mut self, key: KeyMode) { self.key_down &= !key; }

    /// Records that a key was pressed. Platforms report auto-repeat by calling this again.
    pub fn keydown_code(&mut self, code: KeyCode) {
        self.key_code_pressed |= code;
        self.key_code_down |= code;
    }

    /// Records that a key was released.
    pub fn keyup_code(&mut self, code: KeyCode) { self.key_code_down &= !code; }

    /// Appends UTF-8 text to the input buffer.
    pub fn text(&mut self, text: &str) { self.input_text.push_str(text); }

    pub(crate) fn prelude(&mut self) {
        self.mouse_delta.x = self.mouse_pos.x - self.last_mouse_pos.x;
        self.mouse_delta.y = self.mouse_pos.y - self.last_mouse_pos.y;
    }

    pub(crate) fn epilogue(&mut self) {
        self.key_code_pressed = KeyCode::NONE;
        self.input_text.clear();
        self.mouse_pressed = MouseButton::NONE;
        self.mouse_released = MouseButton::NONE;
        self.scroll_delta = vec2(0, 0);
        self.last_mouse_pos = self.mouse_pos;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn click_within_one_frame_keeps_both_edges() {
        let mut input = Input::default();
        input.mousedown(5, 5, MouseButton::LEFT);
        input.mouseup(5, 5, MouseButton::LEFT);
        assert!(input.mouse_pressed().is_left());
        assert!(input.mouse_released().is_left());
        assert!(input.mouse_down().is_none());
        input.epilogue();
        assert!(input.mouse_pressed().is_none());
        assert!(input.mouse_released().is_none());
    }

    #[test]
    fn delta_is_relative_to_previous_frame() {
        let mut input = Input::default();
        input.mousemove(10, 10);
        input.prelude();
        input.epilogue();
        input.mousemove(14, 7);
        input.prelude();
        assert_eq!((input.mouse_delta().x, input.mouse_delta().y), (4, -3));
    }

    #[test]
    fn pressed_keys_clear_but_held_keys_stay() {
        let mut input = Input::default();
        input.keydown_code(KeyCode::TAB);
        assert!(input.is_key_pressed(KeyCode::TAB));
        input.epilogue();
        assert!(!input.is_key_pressed(KeyCode::TAB));
        assert!(input.key_codes().intersects(KeyCode::TAB));
    }
}
