//! Per-thread call-stack recording.
//!
//! Every thread owns exactly one [`TraceStack`], created lazily the first time
//! the thread asks for its [`Trace`] handle and dropped together with the
//! thread. Instrumented code enters a frame on scope entry and receives a
//! [`FrameGuard`] which removes the frame again on every exit path, including
//! unwinding:
//!
//! ```
//! use tracefault::{Frame, Trace};
//!
//! let trace = Trace::current();
//! trace.flush();
//! {
//!     let _outer = trace.enter(Frame::new("outer"));
//!     let _inner = trace.enter(Frame::new("inner"));
//!     assert_eq!(trace.depth(), 2);
//! }
//! assert_eq!(trace.depth(), 0);
//! ```
//!
//! Once the stack is [locked](Trace::lock), guards stop popping, which is
//! how the frames leading to a fault survive the unwind up to
//! [`base_catch`](crate::base_catch):
//!
//! ```
//! use tracefault::{Frame, Trace};
//!
//! let trace = Trace::current();
//! trace.flush();
//! {
//!     let _first = trace.enter(Frame::new("first"));
//!     let _second = trace.enter(Frame::new("second"));
//!     trace.lock();
//! }
//! let frames = trace.frames();
//! let texts: Vec<&str> = frames.iter().map(Frame::as_str).collect();
//! assert_eq!(texts, ["first", "second"]);
//! ```
//!
//! The handle is reference counted and `!Send`, so it can be stored by
//! instrumented code but never leaves the thread that owns the stack.

pub(crate) mod iter;
mod stack;

use alloc::{rc::Rc, vec::Vec};
use core::{
    cell::{Ref, RefCell},
    fmt,
};

pub use self::{iter::FrameIter, stack::TraceStack};
use crate::Frame;

std::thread_local! {
    static CURRENT: Rc<RefCell<TraceStack>> = Rc::new(RefCell::new(TraceStack::new()));
}

/// Handle to the calling thread's [`TraceStack`].
///
/// All handles obtained on one thread refer to the same stack.
///
/// # Panics
///
/// The mutating methods panic if called while a [`Frames`] view of the same
/// stack is alive. Fault handlers are expected to read the stack, not modify
/// it.
#[derive(Clone)]
pub struct Trace {
    stack: Rc<RefCell<TraceStack>>,
}

impl Trace {
    /// Returns the handle for the calling thread, creating its stack on first
    /// use.
    ///
    /// # Panics
    ///
    /// Panics if called while the thread's local storage is being torn down.
    #[must_use]
    pub fn current() -> Self {
        CURRENT.with(|stack| Self {
            stack: Rc::clone(stack),
        })
    }

    /// Returns the handle for the calling thread, or `None` once the thread's
    /// local storage is being torn down.
    #[must_use]
    pub fn try_current() -> Option<Self> {
        CURRENT
            .try_with(|stack| Self {
                stack: Rc::clone(stack),
            })
            .ok()
    }

    /// Appends `frame` without tying it to a scope.
    pub fn push(&self, frame: Frame) {
        self.stack.borrow_mut().push(frame);
    }

    /// Appends `frame` and returns a guard which pops it again when dropped,
    /// unless the stack has been locked in the meantime.
    pub fn enter(&self, frame: Frame) -> FrameGuard {
        self.push(frame);
        FrameGuard {
            trace: self.clone(),
        }
    }

    /// Freezes the stack so that scope exits no longer pop frames.
    pub fn lock(&self) {
        self.stack.borrow_mut().lock();
    }

    /// Empties the stack and clears the lock.
    pub fn flush(&self) {
        self.stack.borrow_mut().flush();
    }

    /// Returns whether the stack is locked.
    #[must_use]
    pub fn is_locked(&self) -> bool {
        self.stack.borrow().is_locked()
    }

    /// Returns the number of recorded frames.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.stack.borrow().depth()
    }

    /// Returns a read-only view of the recorded frames.
    ///
    /// The view borrows the live stack rather than copying it and stays valid
    /// for as long as it is held.
    pub fn frames(&self) -> Frames<'_> {
        Frames {
            stack: self.stack.borrow(),
        }
    }
}

/// Locks the calling thread's stack. Does nothing during thread teardown or
/// while a [`Frames`] view is alive.
pub(crate) fn lock_current() {
    let _ = CURRENT.try_with(|stack| {
        if let Ok(mut stack) = stack.try_borrow_mut() {
            stack.lock();
        }
    });
}

/// Flushes the calling thread's stack under the same conditions as
/// [`lock_current`].
pub(crate) fn flush_current() {
    let _ = CURRENT.try_with(|stack| {
        if let Ok(mut stack) = stack.try_borrow_mut() {
            stack.flush();
        }
    });
}

pub(crate) fn current_depth() -> usize {
    CURRENT
        .try_with(|stack| stack.try_borrow().map_or(0, |stack| stack.depth()))
        .unwrap_or(0)
}

impl fmt::Debug for Trace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.stack.try_borrow() {
            Ok(stack) => fmt::Debug::fmt(&*stack, f),
            Err(_) => f.write_str("Trace { <borrowed> }"),
        }
    }
}

/// Scope guard returned by [`Trace::enter`].
///
/// Dropping the guard pops the newest frame while the stack is unlocked and
/// does nothing while it is locked.
#[must_use = "the frame is popped as soon as the guard is dropped"]
pub struct FrameGuard {
    trace: Trace,
}

impl Drop for FrameGuard {
    fn drop(&mut self) {
        // This runs during unwinding, where a second panic would abort.
        if let Ok(mut stack) = self.trace.stack.try_borrow_mut() {
            stack.pop();
        }
    }
}

impl fmt::Debug for FrameGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FrameGuard").finish_non_exhaustive()
    }
}

/// Borrowed view of a thread's recorded frames, returned by [`Trace::frames`].
pub struct Frames<'a> {
    stack: Ref<'a, TraceStack>,
}

impl Frames<'_> {
    /// Iterates over the frames from oldest to newest.
    pub fn iter(&self) -> FrameIter<'_> {
        self.stack.iter()
    }

    /// Returns the number of frames.
    #[must_use]
    pub fn len(&self) -> usize {
        self.stack.depth()
    }

    /// Returns whether there are no frames.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }

    /// Returns whether the underlying stack is locked.
    #[must_use]
    pub fn is_locked(&self) -> bool {
        self.stack.is_locked()
    }

    /// Copies the frames out, oldest first.
    #[must_use]
    pub fn to_vec(&self) -> Vec<Frame> {
        self.iter().cloned().collect()
    }
}

impl<'b> IntoIterator for &'b Frames<'_> {
    type Item = &'b Frame;
    type IntoIter = FrameIter<'b>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl fmt::Debug for Frames<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}
