use alloc::vec::Vec;

use crate::{Frame, trace::iter::FrameIter};

/// An ordered stack of [`Frame`]s with a lock flag.
///
/// This is the plain value behind a thread's [`Trace`](crate::Trace) handle.
/// Frames are appended at the tail and can only be removed from the tail, and
/// only while the stack is unlocked. Once [`lock`](Self::lock) has been called
/// the content is frozen against pops until [`flush`](Self::flush) empties the
/// stack and clears the lock.
///
/// | state    | push      | pop         | lock     | flush        |
/// |----------|-----------|-------------|----------|--------------|
/// | unlocked | depth + 1 | depth - 1   | locked   | unlocked, 0  |
/// | locked   | depth + 1 | no change   | locked   | unlocked, 0  |
#[derive(Clone, Debug, Default)]
pub struct TraceStack {
    frames: Vec<Frame>,
    locked: bool,
}

impl TraceStack {
    /// Creates an empty, unlocked stack.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            frames: Vec::new(),
            locked: false,
        }
    }

    /// Appends `frame` at the tail. Pushing is allowed in both states.
    pub fn push(&mut self, frame: Frame) {
        self.frames.push(frame);
    }

    /// Removes the tail frame unless the stack is locked.
    ///
    /// Returns the removed frame, or `None` when the stack is locked or empty.
    pub fn pop(&mut self) -> Option<Frame> {
        if self.locked {
            None
        } else {
            self.frames.pop()
        }
    }

    /// Freezes the current content. Idempotent.
    pub fn lock(&mut self) {
        self.locked = true;
    }

    /// Empties the stack and clears the lock, regardless of prior state.
    pub fn flush(&mut self) {
        self.frames.clear();
        self.locked = false;
    }

    /// Returns whether pops are currently suppressed.
    #[must_use]
    pub fn is_locked(&self) -> bool {
        self.locked
    }

    /// Returns the number of frames held.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// Returns whether no frames are held.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Iterates over the frames from oldest to newest.
    pub fn iter(&self) -> FrameIter<'_> {
        FrameIter::new(&self.frames)
    }
}

impl<'a> IntoIterator for &'a TraceStack {
    type Item = &'a Frame;
    type IntoIter = FrameIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec::Vec;

    use super::*;

    fn texts(stack: &TraceStack) -> Vec<&str> {
        stack.iter().map(Frame::as_str).collect()
    }

    #[test]
    fn test_push_pop_unlocked() {
        let mut stack = TraceStack::new();
        stack.push(Frame::new("first"));
        stack.push(Frame::new("second"));
        assert_eq!(texts(&stack), ["first", "second"]);

        assert_eq!(stack.pop(), Some(Frame::new("second")));
        assert_eq!(texts(&stack), ["first"]);
        assert_eq!(stack.pop(), Some(Frame::new("first")));
        assert!(stack.is_empty());
        assert_eq!(stack.pop(), None);
    }

    #[test]
    fn test_lock_suppresses_pop_but_not_push() {
        let mut stack = TraceStack::new();
        stack.push(Frame::new("first"));
        stack.lock();
        stack.lock();
        assert!(stack.is_locked());
        assert_eq!(stack.pop(), None);

        stack.push(Frame::new("second"));
        assert_eq!(texts(&stack), ["first", "second"]);
    }

    #[test]
    fn test_flush_from_any_state() {
        let mut stack = TraceStack::new();
        stack.flush();
        assert!(stack.is_empty() && !stack.is_locked());

        stack.push(Frame::new("first"));
        stack.push(Frame::new("second"));
        stack.lock();
        stack.flush();
        assert!(stack.is_empty() && !stack.is_locked());
        assert_eq!(stack.depth(), 0);
    }
}
