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
//! Diagnostics raised by misuse of the frame API.
//!
//! None of these abort a frame: the context records them, logs them through `tracing`, repairs the offending
//! stack and carries on. Operations that pop or close also hand the error back to the caller.

use std::fmt;

use thiserror::Error;

use crate::{ContainerKind, Id, StyleVar};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
/// Names the scoped stack an imbalance was detected on.
pub enum ScopeKind {
    /// The widget identity stack.
    Id,
    /// The style variable stack.
    StyleVar,
    /// The color override stack.
    Color,
    /// The item width stack.
    ItemWidth,
    /// The tab-stop stack.
    TabStop,
    /// The button repeat stack.
    ButtonRepeat,
    /// The text wrap position stack.
    TextWrapPos,
    /// The nested container stack.
    Container,
    /// Layout groups within a container.
    Group,
    /// A container's menu bar scope.
    MenuBar,
    /// The frame itself (`new_frame` without `end_frame`).
    Frame,
}

impl fmt::Display for ScopeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ScopeKind::Id => "id",
            ScopeKind::StyleVar => "style var",
            ScopeKind::Color => "color",
            ScopeKind::ItemWidth => "item width",
            ScopeKind::TabStop => "tab stop",
            ScopeKind::ButtonRepeat => "button repeat",
            ScopeKind::TextWrapPos => "text wrap pos",
            ScopeKind::Container => "container",
            ScopeKind::Group => "group",
            ScopeKind::MenuBar => "menu bar",
            ScopeKind::Frame => "frame",
        };
        f.write_str(name)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
/// How a scope stack went out of balance.
pub enum Imbalance {
    /// A pop was requested on an empty stack (or below the enclosing container's base).
    PopOnEmpty,
    /// Entries were still pushed when their scope closed; they have been discarded.
    Residual(usize),
    /// A container was closed with the end call of a different kind.
    Mismatched {
        /// Kind the end call expected.
        expected: ContainerKind,
        /// Kind actually on top of the stack.
        found: ContainerKind,
    },
}

impl fmt::Display for Imbalance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Imbalance::PopOnEmpty => f.write_str("pop on empty stack"),
            Imbalance::Residual(n) => write!(f, "{n} entries left pushed"),
            Imbalance::Mismatched { expected, found } => write!(f, "expected to end a {expected:?}, found {found:?}"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
/// Recoverable usage errors reported by [`crate::Context`].
pub enum UiError {
    /// A push/pop or begin/end pair did not balance.
    #[error("imbalanced {stack} stack: {imbalance}")]
    ImbalancedScope {
        /// Stack the imbalance was found on.
        stack: ScopeKind,
        /// Nature of the imbalance.
        imbalance: Imbalance,
    },
    /// Two interactive widgets resolved to the same identity in one frame; the first one wins.
    #[error("duplicate widget identity {id} for `{label}`")]
    DuplicateIdentity {
        /// Colliding identity.
        id: Id,
        /// Label of the later submission.
        label: String,
    },
    /// A text edit needed more room than the buffer owner granted; the input was truncated.
    #[error("text buffer of {id} overflowed: needed {requested} bytes, granted {granted}")]
    BufferOverflow {
        /// Text widget identity.
        id: Id,
        /// Bytes the edit needed.
        requested: usize,
        /// Capacity the owner acknowledged.
        granted: usize,
    },
    /// An operation named a container that is unknown or not in the required state.
    #[error("`{operation}` refers to container {id}, which is not available")]
    InvalidContainerReference {
        /// Identity that was looked up.
        id: Id,
        /// Operation that performed the lookup.
        operation: &'static str,
    },
    /// A style variable was pushed with a value of the wrong kind.
    #[error("style variable {var:?} does not take this kind of value")]
    StyleValueMismatch {
        /// Offending variable.
        var: StyleVar,
    },
    /// Mutually exclusive options were combined.
    #[error("invalid option combination: {reason}")]
    InvalidOption {
        /// Human readable explanation.
        reason: String,
    },
}

#[derive(Clone, Debug, PartialEq, Eq)]
/// A recorded [`UiError`] together with the frame it happened in.
pub struct Diagnostic {
    /// Frame counter value when the error was raised.
    pub frame: usize,
    /// The error itself.
    pub error: UiError,
}

#[derive(Clone, Debug, Default)]
pub(crate) struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    pub(crate) fn record(&mut self, frame: usize, error: UiError) {
        tracing::warn!(frame, %error, "ui diagnostic");
        self.entries.push(Diagnostic { frame, error });
    }

    pub(crate) fn entries(&self) -> &[Diagnostic] { &self.entries }

    pub(crate) fn clear(&mut self) { self.entries.clear(); }

    pub(crate) fn take(&mut self) -> Vec<Diagnostic> { std::mem::take(&mut self.entries) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_stack() {
        let err = UiError::ImbalancedScope { stack: ScopeKind::StyleVar, imbalance: Imbalance::Residual(2) };
        assert_eq!(err.to_string(), "imbalanced style var stack: 2 entries left pushed");
    }

    #[test]
    fn diagnostics_drain() {
        let mut d = Diagnostics::default();
        d.record(3, UiError::InvalidOption { reason: "x".into() });
        assert_eq!(d.entries().len(), 1);
        let taken = d.take();
        assert_eq!(taken[0].frame, 3);
        assert!(d.entries().is_empty());
    }
}
