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
/// Tunables of a [`crate::Context`], fixed at construction.
#[derive(Clone, Debug, PartialEq)]
pub struct ContextConfig {
    /// Frames a container may go unsubmitted before its record is collected.
    pub gc_frames: usize,
    /// Undo steps kept per text edit session; zero disables undo.
    pub undo_depth: usize,
    /// Report two interactive widgets sharing an identity within one frame.
    pub check_duplicate_ids: bool,
    /// Enable Tab/arrow keyboard navigation.
    pub nav_enabled: bool,
    /// Pointer travel in pixels before a press becomes a drag.
    pub drag_threshold: i32,
    /// Frames a repeating button is held before it fires again.
    pub repeat_delay: usize,
    /// Frames between repeated presses after the delay.
    pub repeat_rate: usize,
    /// Multiplier applied to raw wheel deltas.
    pub scroll_step: i32,
    /// Display width, used to center modals and clamp popups.
    pub display_width: i32,
    /// Display height.
    pub display_height: i32,
    /// Size given to windows that have neither a stored layout nor a size request.
    pub default_window_size: (i32, i32),
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            gc_frames: 60,
            undo_depth: 64,
            check_duplicate_ids: cfg!(debug_assertions),
            nav_enabled: true,
            drag_threshold: 3,
            repeat_delay: 20,
            repeat_rate: 4,
            scroll_step: 1,
            display_width: 1280,
            display_height: 720,
            default_window_size: (320, 240),
        }
    }
}

impl ContextConfig {
    /// Sets [`ContextConfig::gc_frames`].
    pub fn with_gc_frames(mut self, frames: usize) -> Self {
        self.gc_frames = frames;
        self
    }

    /// Sets [`ContextConfig::undo_depth`].
    pub fn with_undo_depth(mut self, depth: usize) -> Self {
        self.undo_depth = depth;
        self
    }

    /// Sets [`ContextConfig::check_duplicate_ids`].
    pub fn with_duplicate_id_checks(mut self, enabled: bool) -> Self {
        self.check_duplicate_ids = enabled;
        self
    }

    /// Sets [`ContextConfig::nav_enabled`].
    pub fn with_navigation(mut self, enabled: bool) -> Self {
        self.nav_enabled = enabled;
        self
    }

    /// Sets [`ContextConfig::drag_threshold`].
    pub fn with_drag_threshold(mut self, pixels: i32) -> Self {
        self.drag_threshold = pixels;
        self
    }

    /// Sets the press repeat timing of repeating buttons, in frames.
    pub fn with_button_repeat(mut self, delay: usize, rate: usize) -> Self {
        self.repeat_delay = delay;
        self.repeat_rate = rate;
        self
    }

    /// Sets [`ContextConfig::scroll_step`].
    pub fn with_scroll_step(mut self, step: i32) -> Self {
        self.scroll_step = step;
        self
    }

    /// Sets the display size.
    pub fn with_display_size(mut self, width: i32, height: i32) -> Self {
        self.display_width = width;
        self.display_height = height;
        self
    }
}
