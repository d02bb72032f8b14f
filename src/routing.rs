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
//! Input routing: which widget is hovered, which one owns the pointer, which one has keyboard focus.
//!
//! Hover is resolved in two passes. At the start of a frame the topmost window under the pointer is picked
//! from the previous frame's paint order, and among that window's items from the previous frame the last one
//! submitted under the pointer is marked as the only uncovered one. During the frame an item is hovered when
//! the pointer is inside its clipped rectangle, its window is the hovered one, no modal blocks it, nothing
//! else is active and it is not covered (unless it allows overlap). All inputs to that decision are fixed for
//! the frame, so asking twice gives the same answer.

use std::collections::HashSet;

use bitflags::bitflags;
use tracing::{debug, trace};

use crate::*;

bitflags! {
    #[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
    /// Per-item submission switches.
    pub(crate) struct ItemFlags : u32 {
        const NO_NAV = 8;
        const NO_TAB_STOP = 4;
        const ALLOW_OVERLAP = 2;
        const NO_INTERACT = 1;
        const NONE = 0;
    }
}

bitflags! {
    #[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
    /// Behavior switches of button-like widgets.
    pub struct ButtonFlags : u32 {
        /// Report a press when pushed and again periodically while held.
        const REPEAT = 16;
        /// Keep out of keyboard navigation.
        const NO_NAV = 8;
        /// Stay hoverable when a later item overlaps this one.
        const ALLOW_OVERLAP = 4;
        /// Report a press on mouse down instead of on release.
        const PRESS_ON_CLICK = 2;
        /// Also react to the right mouse button.
        const MOUSE_RIGHT = 1;
        /// Defaults.
        const NONE = 0;
    }
}

bitflags! {
    #[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
    /// What happened to the last submitted item this frame.
    pub struct ItemStatus : u32 {
        /// Tree node or header was toggled.
        const TOGGLED_OPEN = 4;
        /// The item changed the value it edits.
        const EDITED = 2;
        /// The pointer is over the item.
        const HOVERED = 1;
        /// Nothing happened.
        const NONE = 0;
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
/// Category of the item holding the active slot.
pub enum ItemKind {
    /// Push button, including invisible ones.
    Button,
    /// Check box or radio button.
    Toggle,
    /// Slider.
    Slider,
    /// Drag value.
    Drag,
    /// Text field.
    TextInput,
    /// Tree node, collapsing header or selectable.
    Header,
    /// Menu title or combo box.
    Menu,
    /// Window title bar, resize grip or scrollbar.
    WindowChrome,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
/// Phase of the active item.
pub enum InteractionPhase {
    /// The button went down over the item.
    Pressed,
    /// The pointer moved past the drag threshold while held.
    Dragging,
    /// A text field owns keyboard input.
    Editing,
    /// The interaction ended this frame.
    Released,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
/// What made an item active.
pub enum ActivationSource {
    /// A mouse press.
    Mouse,
    /// Enter or Space on the navigation target.
    Nav,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
/// The single item receiving pointer or keyboard interaction.
pub struct ActiveItem {
    /// Item identity.
    pub id: Id,
    /// Category.
    pub kind: ItemKind,
    /// Current phase.
    pub phase: InteractionPhase,
    /// Container the item lives in.
    pub window: Id,
    /// Activation source.
    pub source: ActivationSource,
    /// Pointer position when the press happened.
    pub press_pos: (i32, i32),
    /// Frame the press happened on.
    pub press_frame: usize,
}

#[derive(Copy, Clone)]
pub(crate) struct ItemRecord {
    pub id: Id,
    pub rect: Recti,
    pub flags: ItemFlags,
    pub tab_stop: bool,
}

#[derive(Copy, Clone, Default)]
pub(crate) struct LastItem {
    pub id: Id,
    pub rect: Recti,
    pub flags: ItemFlags,
    pub status: ItemStatus,
    pub visible: bool,
    pub interactive: bool,
    pub window: Option<Id>,
}

#[derive(Copy, Clone, Default)]
pub(crate) struct NavState {
    pub id: Option<Id>,
    pub window: Option<Id>,
    pub activate: Option<Id>,
    pub visible: bool,
}

#[derive(Copy, Clone, Default)]
pub(crate) struct ButtonState {
    pub hovered: bool,
    pub held: bool,
    pub pressed: bool,
}

#[derive(Default)]
pub(crate) struct Routing {
    pub hovered_window: Option<Id>,
    pub hover_blocked: bool,
    pub hovered_id: Option<Id>,
    pub covered: HashSet<Id>,
    pub active: Option<ActiveItem>,
    pub active_alive: bool,
    pub active_edited: bool,
    pub activated: Option<Id>,
    pub deactivated: Option<(Id, bool)>,
    pub seen: HashSet<Id>,
    pub last_item: LastItem,
    pub nav: NavState,
}

impl Routing {
    pub(crate) fn begin_frame(&mut self) {
        self.hovered_id = None;
        self.seen.clear();
        self.last_item = LastItem::default();
        self.active_alive = false;
        self.activated = None;
        self.deactivated = None;
    }

    pub(crate) fn active_id(&self) -> Option<Id> { self.active.map(|a| a.id) }
}

#[derive(Copy, Clone, PartialEq, Eq)]
enum NavDir {
    Up,
    Down,
    Left,
    Right,
}

fn center(r: Recti) -> (i64, i64) { (r.x as i64 + r.width as i64 / 2, r.y as i64 + r.height as i64 / 2) }

fn nav_score(from: Recti, to: Recti, dir: NavDir) -> Option<i64> {
    let (fx, fy) = center(from);
    let (tx, ty) = center(to);
    let (primary, secondary) = match dir {
        NavDir::Up => (fy - ty, tx - fx),
        NavDir::Down => (ty - fy, tx - fx),
        NavDir::Left => (fx - tx, ty - fy),
        NavDir::Right => (tx - fx, ty - fy),
    };
    (primary > 0).then_some(primary + secondary.abs() * 2)
}

impl Context {
    /// Walks from a child region up to the window, popup or tooltip it is embedded in.
    pub(crate) fn root_of(&self, mut id: Id) -> Id {
        while let Some(c) = self.containers.get(id) {
            match (c.kind, c.parent) {
                (ContainerKind::Child, Some(parent)) => id = parent,
                _ => break,
            }
        }
        id
    }

    /// Returns `true` when a modal above `container` swallows its input.
    pub(crate) fn is_blocked_by_modal(&self, container: Id) -> bool {
        let Some(modal) = self.popups.top_modal_index() else { return false };
        match self.popups.index_of(self.root_of(container)) {
            Some(index) => index < modal,
            None => true,
        }
    }

    pub(crate) fn update_hovered_window(&mut self) {
        let mouse = self.input.mouse_pos();
        let found = self.display_order.iter().rev().copied().find(|id| {
            self.containers.get(*id).is_some_and(|c| {
                c.was_active
                    && !c.hidden
                    && c.kind != ContainerKind::Tooltip
                    && !c.flags.contains(WindowOption::NO_INPUTS)
                    && rect_contains(c.hit_rect, mouse)
            })
        });
        let blocked = match found {
            Some(id) => self.is_blocked_by_modal(id),
            None => self.popups.top_modal_index().is_some(),
        };
        self.routing.hover_blocked = blocked;
        self.routing.hovered_window = if blocked { None } else { found };
    }

    pub(crate) fn update_covered_items(&mut self) {
        self.routing.covered.clear();
        let Some(win) = self.routing.hovered_window else { return };
        let Some(c) = self.containers.get(win) else { return };
        let mouse = self.input.mouse_pos();
        let under: Vec<Id> = c.items.iter().filter(|i| rect_contains(i.rect, mouse)).map(|i| i.id).collect();
        if let Some((_, below)) = under.split_last() {
            self.routing.covered.extend(below.iter().copied());
        }
    }

    /// Registers an item for this frame. Returns `true` when any part of it is visible.
    pub(crate) fn item_add(&mut self, id: Id, r: Recti, flags: ItemFlags, label: &str) -> bool {
        let Some(window) = self.current_container_id() else { return false };
        let mut interactive = !flags.contains(ItemFlags::NO_INTERACT) && !id.is_none();
        if interactive && !self.routing.seen.insert(id) && self.config.check_duplicate_ids {
            self.report(UiError::DuplicateIdentity { id, label: label.to_string() });
            interactive = false;
        }
        let tab_stop = self.scopes.tab_stop() && !flags.contains(ItemFlags::NO_TAB_STOP);
        let allow_overlap = std::mem::take(&mut self.next_item.allow_overlap);
        let flags = if allow_overlap { flags | ItemFlags::ALLOW_OVERLAP } else { flags };
        let nav_visible = self.routing.nav.visible && self.routing.nav.id == Some(id);
        let highlight = self.style_color(ColorId::NavHighlight);
        let Some(c) = self.containers.get_mut(window) else { return false };
        let clip = c.draw.current_clip_rect();
        let visible_rect = intersect_rect(r, clip);
        let visible = !is_empty_rect(visible_rect);
        if interactive && visible {
            c.items.push(ItemRecord { id, rect: visible_rect, flags, tab_stop });
        }
        if nav_visible && visible {
            c.draw.draw_box(expand_rect(r, 2), highlight);
        }
        self.routing.last_item = LastItem { id, rect: r, flags, status: ItemStatus::NONE, visible, interactive, window: Some(window) };
        if interactive && self.routing.active_id() == Some(id) {
            self.routing.active_alive = true;
        }
        visible
    }

    /// Hover test for the item just registered with [`Context::item_add`].
    pub(crate) fn item_hoverable(&mut self, id: Id, r: Recti, allow_overlap: bool) -> bool {
        let last = self.routing.last_item;
        if last.id != id || !last.interactive {
            return false;
        }
        let Some(window) = self.current_container_id() else { return false };
        if self.routing.hovered_window != Some(window) || self.is_blocked_by_modal(window) {
            return false;
        }
        if self.routing.active.is_some_and(|a| a.id != id) {
            return false;
        }
        let mouse = self.input.mouse_pos();
        let clip = self.containers.get(window).map_or(UNCLIPPED_RECT, |c| c.draw.current_clip_rect());
        if !rect_contains(r, mouse) || !rect_contains(clip, mouse) {
            return false;
        }
        if self.routing.covered.contains(&id) && !allow_overlap && !last.flags.contains(ItemFlags::ALLOW_OVERLAP) {
            return false;
        }
        self.routing.hovered_id = Some(id);
        self.routing.last_item.status |= ItemStatus::HOVERED;
        true
    }

    /// Gives `id` the active slot. Refused while a modal blocks its window.
    pub(crate) fn set_active(&mut self, id: Id, kind: ItemKind, source: ActivationSource) -> bool {
        let Some(window) = self.current_container_id() else { return false };
        if self.is_blocked_by_modal(window) {
            return false;
        }
        if let Some(prev) = self.routing.active.filter(|a| a.id != id) {
            trace!(previous = %prev.id, next = %id, "active item replaced");
            self.clear_active();
        }
        let mouse = self.input.mouse_pos();
        let phase = if kind == ItemKind::TextInput { InteractionPhase::Editing } else { InteractionPhase::Pressed };
        self.routing.active = Some(ActiveItem { id, kind, phase, window, source, press_pos: (mouse.x, mouse.y), press_frame: self.frame });
        self.routing.active_alive = true;
        self.routing.active_edited = false;
        self.routing.activated = Some(id);
        self.routing.nav.id = Some(id);
        self.routing.nav.window = Some(self.root_of(window));
        true
    }

    pub(crate) fn clear_active(&mut self) {
        if let Some(active) = self.routing.active.take() {
            self.routing.deactivated = Some((active.id, self.routing.active_edited));
            self.routing.active_edited = false;
        }
    }

    pub(crate) fn mark_edited(&mut self, id: Id) {
        if self.routing.last_item.id == id {
            self.routing.last_item.status |= ItemStatus::EDITED;
        }
        if self.routing.active_id() == Some(id) {
            self.routing.active_edited = true;
        }
    }

    /// Shared press/hold/release logic of clickable items.
    pub(crate) fn button_behavior(&mut self, id: Id, r: Recti, flags: ButtonFlags, kind: ItemKind) -> ButtonState {
        let hovered = self.item_hoverable(id, r, flags.contains(ButtonFlags::ALLOW_OVERLAP));
        let buttons = if flags.contains(ButtonFlags::MOUSE_RIGHT) { MouseButton::LEFT | MouseButton::RIGHT } else { MouseButton::LEFT };
        let repeat = flags.contains(ButtonFlags::REPEAT) || self.scopes.button_repeat();
        let mut pressed = false;
        let mut pressed_now = false;

        if hovered && self.input.mouse_pressed().intersects(buttons) && self.set_active(id, kind, ActivationSource::Mouse) {
            pressed_now = true;
            if repeat || flags.contains(ButtonFlags::PRESS_ON_CLICK) {
                pressed = true;
            }
        }

        let mut held = false;
        if let Some(active) = self.routing.active.filter(|a| a.id == id) {
            match active.source {
                ActivationSource::Mouse if self.input.mouse_down().intersects(buttons) => {
                    held = true;
                    let mouse = self.input.mouse_pos();
                    let (px, py) = active.press_pos;
                    let threshold = self.config.drag_threshold;
                    if active.phase == InteractionPhase::Pressed && ((mouse.x - px).abs() > threshold || (mouse.y - py).abs() > threshold) {
                        if let Some(a) = self.routing.active.as_mut() {
                            a.phase = InteractionPhase::Dragging;
                        }
                    }
                    if repeat && hovered && !pressed_now && self.repeat_due(active.press_frame) {
                        pressed = true;
                    }
                }
                ActivationSource::Mouse => {
                    if hovered && !repeat && !flags.contains(ButtonFlags::PRESS_ON_CLICK) {
                        pressed = true;
                    }
                    if let Some(a) = self.routing.active.as_mut() {
                        a.phase = InteractionPhase::Released;
                    }
                    self.clear_active();
                }
                ActivationSource::Nav => held = true,
            }
        }

        if !pressed_now
            && !flags.contains(ButtonFlags::NO_NAV)
            && self.routing.nav.activate == Some(id)
            && self.set_active(id, kind, ActivationSource::Nav)
        {
            pressed = true;
            held = true;
        }

        ButtonState { hovered, held, pressed }
    }

    /// Whether a held repeating button fires this frame, counting frames since the press.
    fn repeat_due(&self, press_frame: usize) -> bool {
        let held = self.frame.saturating_sub(press_frame);
        let (delay, rate) = (self.config.repeat_delay.max(1), self.config.repeat_rate.max(1));
        held >= delay && (held - delay) % rate == 0
    }

    /// A press anywhere but on the text field being edited takes the active slot away from it.
    pub(crate) fn release_text_input_on_click(&mut self) {
        let Some(active) = self.routing.active.filter(|a| a.kind == ItemKind::TextInput) else { return };
        if self.input.mouse_pressed().is_none() {
            return;
        }
        let mouse = self.input.mouse_pos();
        let on_field = self.routing.hovered_window == Some(active.window)
            && self
                .containers
                .get(active.window)
                .is_some_and(|c| c.items.iter().any(|i| i.id == active.id && rect_contains(i.rect, mouse)));
        if !on_field {
            trace!(id = %active.id, "text input released by click");
            self.clear_active();
        }
    }

    pub(crate) fn update_nav(&mut self) {
        self.routing.nav.activate = None;
        if !self.config.nav_enabled {
            return;
        }
        if !self.input.mouse_pressed().is_none() {
            self.routing.nav.visible = false;
        }
        if self.text_edit.is_some() {
            return;
        }
        let Some(win) = self.focused else { return };
        if self.routing.nav.window != Some(win) {
            self.routing.nav.id = None;
            self.routing.nav.window = Some(win);
        }
        let Some(c) = self.containers.get(win) else { return };
        if c.flags.contains(WindowOption::NO_NAV) {
            return;
        }
        // items from the focused window and the child regions drawn into it
        let mut items: Vec<ItemRecord> = Vec::new();
        let mut pending = vec![win];
        while let Some(next) = pending.pop() {
            if let Some(c) = self.containers.get(next) {
                items.extend(c.items.iter().filter(|i| !i.flags.contains(ItemFlags::NO_NAV)).copied());
                pending.extend(c.children.iter().rev().copied());
            }
        }
        if items.is_empty() {
            return;
        }

        let current = self.routing.nav.id.and_then(|id| items.iter().position(|i| i.id == id));
        let mut target = None;
        if self.input.is_key_pressed(KeyCode::TAB) {
            let stops: Vec<&ItemRecord> = items.iter().filter(|i| i.tab_stop).collect();
            if !stops.is_empty() {
                let len = stops.len();
                let cur = self.routing.nav.id.and_then(|id| stops.iter().position(|i| i.id == id));
                let next = match (cur, self.input.key_mods().is_shift()) {
                    (None, false) => 0,
                    (None, true) => len - 1,
                    (Some(i), false) => (i + 1) % len,
                    (Some(i), true) => (i + len - 1) % len,
                };
                target = Some(stops[next].id);
            }
        } else {
            let dir = [
                (KeyCode::UP, NavDir::Up),
                (KeyCode::DOWN, NavDir::Down),
                (KeyCode::LEFT, NavDir::Left),
                (KeyCode::RIGHT, NavDir::Right),
            ]
            .into_iter()
            .find(|(code, _)| self.input.is_key_pressed(*code))
            .map(|(_, dir)| dir);
            if let Some(dir) = dir {
                target = match current {
                    None => Some(items[0].id),
                    Some(i) => items
                        .iter()
                        .filter_map(|cand| nav_score(items[i].rect, cand.rect, dir).map(|s| (s, cand.id)))
                        .min_by_key(|(s, _)| *s)
                        .map(|(_, id)| id),
                };
            }
        }
        if let Some(target) = target {
            trace!(%target, "navigation moved");
            self.routing.nav.id = Some(target);
            self.routing.nav.visible = true;
        }

        let activate = self.input.is_key_pressed(KeyCode::RETURN | KeyCode::SPACE);
        if activate && self.input.mouse_pressed().is_none() {
            if let Some(id) = self.routing.nav.id {
                self.routing.nav.activate = Some(id);
                self.routing.nav.visible = true;
            }
        }
    }

    pub(crate) fn end_frame_routing(&mut self) {
        let Some(active) = self.routing.active else { return };
        if !self.routing.active_alive {
            debug!(id = %active.id, "active item was not submitted this frame");
            self.clear_active();
        } else if active.source == ActivationSource::Nav && active.kind != ItemKind::TextInput {
            self.clear_active();
        }
    }

    /// Returns `true` when the pointer is over the last item.
    pub fn is_item_hovered(&self) -> bool { self.routing.last_item.status.contains(ItemStatus::HOVERED) }

    /// Returns `true` when the last item holds the active slot.
    pub fn is_item_active(&self) -> bool {
        let id = self.routing.last_item.id;
        !id.is_none() && self.routing.active_id() == Some(id)
    }

    /// Returns `true` when the last item is the keyboard navigation target.
    pub fn is_item_focused(&self) -> bool {
        let id = self.routing.last_item.id;
        !id.is_none() && self.routing.nav.id == Some(id)
    }

    /// Returns `true` when the last item is hovered and `button` went down this frame.
    pub fn is_item_clicked(&self, button: MouseButton) -> bool { self.is_item_hovered() && self.input.mouse_pressed().intersects(button) }

    /// Returns `true` when part of the last item is inside its clip rectangle.
    pub fn is_item_visible(&self) -> bool { self.routing.last_item.visible }

    /// Returns `true` when the last item changed its value this frame.
    pub fn is_item_edited(&self) -> bool { self.routing.last_item.status.contains(ItemStatus::EDITED) }

    /// Returns `true` on the frame the last item became active.
    pub fn is_item_activated(&self) -> bool {
        let id = self.routing.last_item.id;
        !id.is_none() && self.routing.activated == Some(id)
    }

    /// Returns `true` on the frame the last item stopped being active.
    pub fn is_item_deactivated(&self) -> bool {
        let id = self.routing.last_item.id;
        !id.is_none() && self.routing.deactivated.is_some_and(|(d, _)| d == id)
    }

    /// Like [`Context::is_item_deactivated`], but only when the item edited its value while active.
    pub fn is_item_deactivated_after_edit(&self) -> bool {
        let id = self.routing.last_item.id;
        !id.is_none() && self.routing.deactivated == Some((id, true))
    }

    /// Returns `true` when the last tree node or header changed its open state this frame.
    pub fn is_item_toggled_open(&self) -> bool { self.routing.last_item.status.contains(ItemStatus::TOGGLED_OPEN) }

    /// Returns `true` when any item is hovered.
    pub fn is_any_item_hovered(&self) -> bool { self.routing.hovered_id.is_some() }

    /// Returns `true` when any item is active.
    pub fn is_any_item_active(&self) -> bool { self.routing.active.is_some() }

    /// Returns `true` when any item has keyboard focus.
    pub fn is_any_item_focused(&self) -> bool { self.routing.nav.id.is_some() }

    /// Identity of the last item.
    pub fn item_id(&self) -> Id { self.routing.last_item.id }

    /// Rectangle of the last item.
    pub fn item_rect(&self) -> Recti { self.routing.last_item.rect }

    /// Top-left corner of the last item.
    pub fn item_rect_min(&self) -> Vec2i {
        let r = self.routing.last_item.rect;
        vec2(r.x, r.y)
    }

    /// Bottom-right corner of the last item.
    pub fn item_rect_max(&self) -> Vec2i {
        let r = self.routing.last_item.rect;
        vec2(r.x + r.width, r.y + r.height)
    }

    /// Size of the last item.
    pub fn item_rect_size(&self) -> Vec2i {
        let r = self.routing.last_item.rect;
        vec2(r.width, r.height)
    }

    /// Lets the next item stay hoverable when later items overlap it.
    pub fn set_next_item_allow_overlap(&mut self) { self.next_item.allow_overlap = true; }

    /// Makes the last item the keyboard navigation target.
    pub fn set_keyboard_focus_here(&mut self) {
        let last = self.routing.last_item;
        if last.interactive {
            self.routing.nav.id = Some(last.id);
            self.routing.nav.window = last.window.map(|w| self.root_of(w));
            self.routing.nav.visible = true;
        }
    }

    /// Makes the last item the navigation target when the window has none yet.
    pub fn set_item_default_focus(&mut self) {
        if self.routing.nav.id.is_none() {
            let last = self.routing.last_item;
            if last.interactive {
                self.routing.nav.id = Some(last.id);
                self.routing.nav.window = last.window.map(|w| self.root_of(w));
            }
        }
    }

    /// The item holding the active slot.
    pub fn active_item(&self) -> Option<&ActiveItem> { self.routing.active.as_ref() }

    /// The item hovered so far this frame.
    pub fn hovered_item(&self) -> Option<Id> { self.routing.hovered_id }

    /// The current keyboard navigation target.
    pub fn nav_item(&self) -> Option<Id> { self.routing.nav.id }

    /// Window under the pointer, resolved at the start of the frame.
    pub fn hovered_window(&self) -> Option<Id> { self.routing.hovered_window }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nav_prefers_the_aligned_candidate() {
        let from = rect(0, 0, 10, 10);
        let below = rect(0, 20, 10, 10);
        let diagonal = rect(30, 15, 10, 10);
        let down_below = nav_score(from, below, NavDir::Down).unwrap();
        let down_diag = nav_score(from, diagonal, NavDir::Down).unwrap();
        assert!(down_below < down_diag);
        assert!(nav_score(from, below, NavDir::Up).is_none());
    }
}
