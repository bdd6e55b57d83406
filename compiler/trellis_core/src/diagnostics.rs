//! Diagnostic call chain for trait derivation and evaluation.
//!
//! # Clone-per-child model
//!
//! A `ProgramStack` is never shared. Every recursive entry (`push`,
//! `enter_derivation`) returns a new stack derived from the caller's, and
//! callees receive `&ProgramStack` and clone before changing anything. A
//! callee that disables recording on its own copy therefore cannot affect
//! what the caller sees afterward.
//!
//! Besides the recorded frames, the stack tracks which (value, trait) pairs
//! are currently being derived so a derivation that re-enters itself is
//! reported instead of recursing forever. That bookkeeping happens whether
//! or not recording is enabled.
//!
//! Frames and active derivations are persistent lists behind `Rc`, so a
//! copy costs the same at any depth and labels are never duplicated.

use std::rc::Rc;

use crate::errors::{cyclic_derivation, recursion_limit_exceeded, BacktraceFrame, EvalBacktrace};
use crate::location::SourceLocation;
use crate::trait_id::RawTraitId;
use crate::EvalError;

/// A recorded entry of the call chain.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StackFrame {
    pub label: String,
    pub location: Option<SourceLocation>,
}

/// A derivation currently in progress: the value's identity and the key.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct ActiveDerivation {
    value: usize,
    trait_id: RawTraitId,
}

#[derive(Debug)]
struct FrameNode {
    frame: StackFrame,
    prev: Option<Rc<FrameNode>>,
}

#[derive(Debug)]
struct ActiveNode {
    entry: ActiveDerivation,
    prev: Option<Rc<ActiveNode>>,
}

// Unlink iteratively so dropping a long chain does not recurse.
impl Drop for FrameNode {
    fn drop(&mut self) {
        let mut prev = self.prev.take();
        while let Some(node) = prev {
            prev = match Rc::try_unwrap(node) {
                Ok(mut node) => node.prev.take(),
                Err(_) => None,
            };
        }
    }
}

impl Drop for ActiveNode {
    fn drop(&mut self) {
        let mut prev = self.prev.take();
        while let Some(node) = prev {
            prev = match Rc::try_unwrap(node) {
                Ok(mut node) => node.prev.take(),
                Err(_) => None,
            };
        }
    }
}

/// Copy-semantics record of the active derivation/evaluation chain.
#[derive(Clone, Debug)]
pub struct ProgramStack {
    frames: Option<Rc<FrameNode>>,
    depth: usize,
    active: Option<Rc<ActiveNode>>,
    queued_location: Option<SourceLocation>,
    recording: bool,
    nesting: usize,
    max_depth: Option<usize>,
}

impl ProgramStack {
    /// Empty stack with recording enabled and no depth limit.
    pub fn new() -> Self {
        Self::with_max_depth(None)
    }

    /// Empty stack that fails with `RecursionLimit` once nesting reaches
    /// `max_depth`. `None` means unlimited.
    pub fn with_max_depth(max_depth: Option<usize>) -> Self {
        ProgramStack {
            frames: None,
            depth: 0,
            active: None,
            queued_location: None,
            recording: true,
            nesting: 0,
            max_depth,
        }
    }

    /// Stop recording frames on this copy and on every stack derived from it.
    pub fn disable_recording(&mut self) {
        self.recording = false;
    }

    #[inline]
    pub fn is_recording(&self) -> bool {
        self.recording
    }

    /// Attach `location` to the next recorded frame that has none of its own.
    pub fn queue_location(&mut self, location: &SourceLocation) {
        self.queued_location = Some(location.clone());
    }

    /// Number of recorded frames.
    #[inline]
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Number of nested entries, recorded or not.
    #[inline]
    pub fn nesting(&self) -> usize {
        self.nesting
    }

    #[inline]
    pub fn max_depth(&self) -> Option<usize> {
        self.max_depth
    }

    /// Recorded frames, oldest first.
    pub fn frames(&self) -> Vec<StackFrame> {
        let mut frames: Vec<_> = self.recent_frames().cloned().collect();
        frames.reverse();
        frames
    }

    fn recent_frames(&self) -> impl Iterator<Item = &StackFrame> {
        std::iter::successors(self.frames.as_deref(), |node| node.prev.as_deref())
            .map(|node| &node.frame)
    }

    fn is_active(&self, entry: ActiveDerivation) -> bool {
        std::iter::successors(self.active.as_deref(), |node| node.prev.as_deref())
            .any(|node| node.entry == entry)
    }

    /// Enter a nested call, recording `label` if recording is enabled.
    pub fn push(&self, label: impl FnOnce() -> String) -> Result<ProgramStack, EvalError> {
        self.push_frame(label, None)
    }

    /// Like [`push`](Self::push), with the frame's source location.
    pub fn push_located(
        &self,
        label: impl FnOnce() -> String,
        location: Option<&SourceLocation>,
    ) -> Result<ProgramStack, EvalError> {
        self.push_frame(label, location.cloned())
    }

    fn push_frame(
        &self,
        label: impl FnOnce() -> String,
        location: Option<SourceLocation>,
    ) -> Result<ProgramStack, EvalError> {
        if let Some(max) = self.max_depth {
            if self.nesting >= max {
                return Err(recursion_limit_exceeded(max).with_backtrace(self.backtrace()));
            }
        }

        let mut stack = self.clone();
        stack.nesting = self.nesting.saturating_add(1);
        if !self.recording {
            return Ok(stack);
        }

        let label = label();
        tracing::trace!(depth = self.depth, %label, "enter");
        let queued = stack.queued_location.take();
        stack.frames = Some(Rc::new(FrameNode {
            frame: StackFrame {
                label,
                location: location.or(queued),
            },
            prev: stack.frames.take(),
        }));
        stack.depth = self.depth + 1;
        Ok(stack)
    }

    /// Mark `trait_id` as being derived for the value identified by `value`.
    ///
    /// Fails with `CyclicDerivation` if that pair is already in progress
    /// further up the chain.
    pub(crate) fn enter_derivation(
        &self,
        value: usize,
        trait_id: RawTraitId,
    ) -> Result<ProgramStack, EvalError> {
        let entry = ActiveDerivation { value, trait_id };
        if self.is_active(entry) {
            return Err(cyclic_derivation(trait_id.label()).with_backtrace(self.backtrace()));
        }

        let mut stack = self.push(|| format!("deriving {}", trait_id.label()))?;
        stack.active = Some(Rc::new(ActiveNode {
            entry,
            prev: stack.active.take(),
        }));
        Ok(stack)
    }

    /// Snapshot the recorded frames, most recent first.
    pub fn backtrace(&self) -> EvalBacktrace {
        EvalBacktrace::new(
            self.recent_frames()
                .map(|frame| BacktraceFrame {
                    label: frame.label.clone(),
                    location: frame.location.clone(),
                })
                .collect(),
        )
    }
}

impl Default for ProgramStack {
    fn default() -> Self {
        Self::new()
    }
}
