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
use std::collections::{HashMap, HashSet};

use tracing::{debug, trace};

use crate::config::ContextConfig;
use crate::error::Diagnostics;
use crate::popup::PopupStack;
use crate::registry::Pool;
use crate::routing::Routing;
use crate::scope::ScopeStacks;
use crate::widgets::TreeNodeState;
use crate::*;

#[derive(Copy, Clone)]
pub(crate) struct StackFrame {
    pub id: Id,
    pub kind: ContainerKind,
    /// Depth of the ID stack right after the container pushed its seed.
    pub id_depth: usize,
}

/// Owner of all interaction state. One per UI.
///
/// A frame is bracketed by [`Context::new_frame`] and [`Context::end_frame`] (or [`Context::frame`]), and
/// [`Context::render`] hands the recorded commands to a [`Renderer`]. Input for the next frame is fed
/// through [`Context::input_mut`] between frames.
pub struct Context {
    pub(crate) config: ContextConfig,
    pub(crate) font: Box<dyn Font>,
    pub(crate) input: Input,
    pub(crate) frame: usize,
    pub(crate) in_frame: bool,

    pub(crate) ids: IdStack,
    pub(crate) scopes: ScopeStacks,
    pub(crate) containers: Pool<Id, Container>,
    pub(crate) stack: Vec<StackFrame>,
    pub(crate) frame_roots: Vec<Id>,
    pub(crate) display_order: Vec<Id>,
    pub(crate) last_zindex: i32,
    pub(crate) focused: Option<Id>,
    pub(crate) popups: PopupStack,
    pub(crate) tooltip_count: usize,

    pub(crate) routing: Routing,
    pub(crate) text_edit: Option<TextEditState>,
    /// Sessions that lost the active slot and wait for their widget to write them back.
    pub(crate) pending_edits: HashMap<Id, TextEditState>,
    pub(crate) next_window: NextWindowData,
    pub(crate) next_item: NextItemData,
    pub(crate) layout_store: Option<Box<dyn LayoutStore>>,
    pub(crate) seen_ids: HashSet<Id>,
    pub(crate) tree_states: HashMap<Id, TreeNodeState>,
    pub(crate) diagnostics: Diagnostics,
}

impl Default for Context {
    fn default() -> Self { Self::new() }
}

impl Context {
    /// Creates a context with default configuration and the built-in monospace metrics.
    pub fn new() -> Self { Self::with_config(ContextConfig::default()) }

    /// Creates a context with `config`.
    pub fn with_config(config: ContextConfig) -> Self {
        Self {
            config,
            font: Box::new(MonoFont::default()),
            input: Input::default(),
            frame: 0,
            in_frame: false,
            ids: IdStack::new(),
            scopes: ScopeStacks::new(Style::default()),
            containers: Pool::default(),
            stack: Vec::new(),
            frame_roots: Vec::new(),
            display_order: Vec::new(),
            last_zindex: 0,
            focused: None,
            popups: PopupStack::default(),
            tooltip_count: 0,
            routing: Routing::default(),
            text_edit: None,
            pending_edits: HashMap::new(),
            next_window: NextWindowData::default(),
            next_item: NextItemData::default(),
            layout_store: None,
            seen_ids: HashSet::new(),
            tree_states: HashMap::new(),
            diagnostics: Diagnostics::default(),
        }
    }

    /// Active configuration.
    pub fn config(&self) -> &ContextConfig { &self.config }

    /// Input state of the current frame.
    pub fn input(&self) -> &Input { &self.input }

    /// Input state to feed events into before the next [`Context::new_frame`].
    pub fn input_mut(&mut self) -> &mut Input { &mut self.input }

    /// Number of frames started so far.
    pub fn frame_count(&self) -> usize { self.frame }

    /// Returns `true` between [`Context::new_frame`] and [`Context::end_frame`].
    pub fn is_in_frame(&self) -> bool { self.in_frame }

    /// Updates the display size used to center modals and clamp popups.
    pub fn set_display_size(&mut self, width: i32, height: i32) {
        self.config.display_width = width;
        self.config.display_height = height;
    }

    /// Current display size.
    pub fn display_size(&self) -> Dimensioni { Dimensioni::new(self.config.display_width, self.config.display_height) }

    /// Replaces the font metrics used for layout.
    pub fn set_font(&mut self, font: Box<dyn Font>) { self.font = font }

    /// Font metrics used for layout.
    pub fn font(&self) -> &dyn Font { self.font.as_ref() }

    /// Attaches a store for window placement. Windows created afterwards restore from it.
    pub fn set_layout_store(&mut self, store: Box<dyn LayoutStore>) { self.layout_store = Some(store) }

    /// Detaches and returns the layout store.
    pub fn take_layout_store(&mut self) -> Option<Box<dyn LayoutStore>> { self.layout_store.take() }

    /// Usage errors recorded during the current frame.
    pub fn diagnostics(&self) -> &[Diagnostic] { self.diagnostics.entries() }

    /// Drains the recorded usage errors.
    pub fn take_diagnostics(&mut self) -> Vec<Diagnostic> { self.diagnostics.take() }

    pub(crate) fn report(&mut self, error: UiError) { self.diagnostics.record(self.frame, error) }

    /// Starts a frame. Calling it again without [`Context::end_frame`] reports the unterminated frame and closes it.
    pub fn new_frame(&mut self) {
        self.diagnostics.clear();
        if self.in_frame {
            self.report(UiError::ImbalancedScope { stack: ScopeKind::Frame, imbalance: Imbalance::Residual(1) });
            self.end_frame();
        }
        self.frame += 1;
        self.in_frame = true;
        self.input.prelude();
        trace!(frame = self.frame, "frame started");

        for c in self.containers.values_mut() {
            c.was_active = c.active;
            c.active = false;
        }
        self.routing.begin_frame();
        self.popups.begin_frame();
        self.tooltip_count = 0;
        self.frame_roots.clear();

        self.update_hovered_window();
        self.update_covered_items();
        self.update_mouse_focus();
        self.release_text_input_on_click();
        self.update_popup_escape();
        self.update_wheel_scroll();
        self.update_nav();
    }

    /// Ends the frame: unwinds whatever was left pushed, closes stale popups, orders the windows for
    /// painting and collects containers that have not been submitted for a while.
    pub fn end_frame(&mut self) {
        if !self.in_frame {
            self.report(UiError::ImbalancedScope { stack: ScopeKind::Frame, imbalance: Imbalance::PopOnEmpty });
            return;
        }

        if !self.stack.is_empty() {
            self.report(UiError::ImbalancedScope { stack: ScopeKind::Container, imbalance: Imbalance::Residual(self.stack.len()) });
            while !self.stack.is_empty() {
                self.end_container_unchecked();
            }
        }
        let residual = self.ids.truncate(0);
        if residual > 0 {
            self.report(UiError::ImbalancedScope { stack: ScopeKind::Id, imbalance: Imbalance::Residual(residual) });
        }
        for (stack, n) in self.scopes.drain() {
            self.report(UiError::ImbalancedScope { stack, imbalance: Imbalance::Residual(n) });
        }
        if !self.next_window.is_empty() || !self.next_item.is_empty() {
            debug!("next-item data discarded at end of frame");
        }
        self.next_window.clear();
        self.next_item.clear();

        self.end_frame_routing();
        let seen = &self.routing.seen;
        self.pending_edits.retain(|id, _| seen.contains(id));
        let active = self.routing.active_id();
        if let Some(te) = self.text_edit.take_if(|te| active != Some(te.id())) {
            if self.routing.seen.contains(&te.id()) {
                self.pending_edits.insert(te.id(), te);
            } else {
                debug!(id = %te.id(), "text edit dropped with its widget");
            }
        }
        self.close_stale_popups();
        self.build_display_order();
        self.store_layouts();

        let frame = self.frame;
        let max_age = self.config.gc_frames;
        let popups = &self.popups;
        let collected = self.containers.gc(frame, max_age, |id, _| popups.contains(*id));
        if collected > 0 {
            debug!(collected, "containers collected");
        }
        self.tree_states.retain(|_, state| frame.saturating_sub(state.last_frame) <= max_age);

        self.input.epilogue();
        self.in_frame = false;
    }

    /// Runs `f` between [`Context::new_frame`] and [`Context::end_frame`].
    pub fn frame<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> R {
        self.new_frame();
        let r = f(self);
        self.end_frame();
        r
    }

    /// Draw lists of the last frame, back to front. Ends the frame first when one is open.
    pub fn render(&mut self) -> DrawData<'_> {
        if self.in_frame {
            self.end_frame();
        }
        let lists = self
            .display_order
            .iter()
            .filter_map(|id| self.containers.get(*id))
            .filter(|c| c.active && !c.hidden && !c.draw.is_empty())
            .map(|c| &c.draw)
            .collect();
        DrawData { display_width: self.config.display_width, display_height: self.config.display_height, lists }
    }

    fn build_display_order(&mut self) {
        let mut roots: Vec<(u8, i64, Id)> = Vec::new();
        for (begin_order, id) in self.frame_roots.iter().enumerate() {
            let Some(c) = self.containers.get(*id) else { continue };
            if c.hidden {
                continue;
            }
            let key = match c.kind {
                ContainerKind::Window | ContainerKind::Child => c.zindex as i64,
                ContainerKind::Popup | ContainerKind::Modal | ContainerKind::Menu => self.popups.index_of(*id).map_or(begin_order as i64, |i| i as i64),
                ContainerKind::Tooltip => begin_order as i64,
            };
            roots.push((c.kind.tier(), key, *id));
        }
        roots.sort_by_key(|(tier, key, _)| (*tier, *key));

        self.display_order.clear();
        for (_, _, root) in roots {
            let mut pending = vec![root];
            while let Some(id) = pending.pop() {
                self.display_order.push(id);
                if let Some(c) = self.containers.get(id) {
                    pending.extend(c.children.iter().rev().copied());
                }
            }
        }
    }

    fn store_layouts(&mut self) {
        let Some(store) = self.layout_store.as_mut() else { return };
        for id in &self.frame_roots {
            let Some(c) = self.containers.get_mut(*id) else { continue };
            if c.kind == ContainerKind::Window && c.layout_dirty {
                store.store(*id, LayoutRecord { x: c.rect.x, y: c.rect.y, width: c.rect.width, height: c.rect.height, collapsed: c.collapsed, open: !c.hidden });
                c.layout_dirty = false;
            }
        }
    }

    pub(crate) fn current_container_id(&self) -> Option<Id> { self.stack.last().map(|f| f.id) }

    pub(crate) fn current_container_mut(&mut self) -> Option<&mut Container> {
        let id = self.current_container_id()?;
        self.containers.get_mut(id)
    }

    /// Identity seed of the innermost scope.
    pub fn current_id(&self) -> Id { self.ids.current() }

    /// Identity `segment` would get in the current scope.
    pub fn get_id<'a>(&self, segment: impl Into<IdSegment<'a>>) -> Id { self.ids.get_id(segment) }

    /// Pushes an identity scope.
    pub fn push_id<'a>(&mut self, segment: impl Into<IdSegment<'a>>) -> Id { self.ids.push(segment) }

    /// Pops the innermost identity scope. Refuses to pop the seed of the current container.
    pub fn pop_id(&mut self) -> Result<(), UiError> {
        let floor = self.stack.last().map_or(0, |f| f.id_depth);
        if self.ids.depth() <= floor {
            let err = UiError::ImbalancedScope { stack: ScopeKind::Id, imbalance: Imbalance::PopOnEmpty };
            self.report(err.clone());
            return Err(err);
        }
        self.ids.pop().map(|_| ())
    }

    /// Runs `f` inside an identity scope.
    pub fn with_id<'a, R>(&mut self, segment: impl Into<IdSegment<'a>>, f: impl FnOnce(&mut Self) -> R) -> R {
        let depth = self.ids.depth();
        self.ids.push(segment);
        let r = f(self);
        if self.ids.depth() != depth + 1 {
            self.report(UiError::ImbalancedScope { stack: ScopeKind::Id, imbalance: Imbalance::Residual(self.ids.depth().saturating_sub(depth + 1)) });
        }
        self.ids.truncate(depth);
        r
    }

    /// Depth of the identity stack.
    pub fn id_stack_depth(&self) -> usize { self.ids.depth() }

    /// Number of containers currently begun.
    pub fn container_stack_depth(&self) -> usize { self.stack.len() }

    /// Looks up a container by identity.
    pub fn container(&self, id: Id) -> Option<&Container> { self.containers.get(id) }

    /// Looks up a top-level container by the name it was begun with.
    pub fn find_container(&self, name: &str) -> Option<&Container> { self.containers.get(Id::from_label(name)) }

    /// Identities of the containers painted last frame, back to front.
    pub fn display_order(&self) -> &[Id] { &self.display_order }

    /// Edit state of the text field being edited.
    pub fn text_edit_state(&self) -> Option<&TextEditState> { self.text_edit.as_ref() }

    /// The window holding keyboard focus.
    pub fn focused_window(&self) -> Option<Id> { self.focused }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_brackets_toggle_state() {
        let mut ctx = Context::new();
        assert!(!ctx.is_in_frame());
        ctx.new_frame();
        assert!(ctx.is_in_frame());
        ctx.end_frame();
        assert!(!ctx.is_in_frame());
        assert_eq!(ctx.frame_count(), 1);
        assert!(ctx.diagnostics().is_empty());
    }

    #[test]
    fn double_new_frame_reports_and_recovers() {
        let mut ctx = Context::new();
        ctx.new_frame();
        ctx.new_frame();
        assert_eq!(ctx.frame_count(), 2);
        assert!(ctx
            .diagnostics()
            .iter()
            .any(|d| d.error == UiError::ImbalancedScope { stack: ScopeKind::Frame, imbalance: Imbalance::Residual(1) }));
        ctx.end_frame();
        assert!(!ctx.is_in_frame());
    }

    #[test]
    fn end_without_begin_reports() {
        let mut ctx = Context::new();
        ctx.end_frame();
        assert_eq!(
            ctx.diagnostics()[0].error,
            UiError::ImbalancedScope { stack: ScopeKind::Frame, imbalance: Imbalance::PopOnEmpty }
        );
    }

    #[test]
    fn leftover_ids_are_unwound_and_reported() {
        let mut ctx = Context::new();
        ctx.new_frame();
        ctx.push_id("a");
        ctx.push_id(3);
        ctx.end_frame();
        assert_eq!(ctx.id_stack_depth(), 0);
        assert!(ctx
            .diagnostics()
            .iter()
            .any(|d| d.error == UiError::ImbalancedScope { stack: ScopeKind::Id, imbalance: Imbalance::Residual(2) }));
    }

    #[test]
    fn pop_id_on_empty_is_refused() {
        let mut ctx = Context::new();
        ctx.new_frame();
        assert!(ctx.pop_id().is_err());
        assert_eq!(ctx.diagnostics().len(), 1);
        ctx.end_frame();
    }

    #[test]
    fn with_id_scopes_identity() {
        let mut ctx = Context::new();
        ctx.new_frame();
        let outside = ctx.get_id("x");
        let inside = ctx.with_id("row", |ctx| ctx.get_id("x"));
        assert_ne!(outside, inside);
        assert_eq!(ctx.id_stack_depth(), 0);
        ctx.end_frame();
    }
}
