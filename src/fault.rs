//! Structured faults.
//!
//! A [`FaultRecord`] says who raised a fault, what kind of fault it was and on
//! which source line. Constructing one locks the calling thread's
//! [`Trace`](crate::Trace), so the frames between the raising site and the
//! catching [`base_catch`](crate::base_catch) stay recorded while the fault
//! unwinds through them.
//!
//! Fault kinds are zero-sized types implementing [`FaultKind`], normally
//! declared with [`fault_kind!`](crate::fault_kind!):
//!
//! ```
//! use tracefault::{FaultRecord, fault_kind};
//!
//! fault_kind! {
//!     /// The requested key was not present.
//!     pub struct MissingKey in "Store";
//! }
//!
//! let record = FaultRecord::of::<MissingKey>(12);
//! assert_eq!(record.who(), "Store");
//! assert_eq!(record.what(), "MissingKey");
//! assert!(record.is::<MissingKey>());
//! ```

use alloc::borrow::Cow;
use core::{any::TypeId, fmt};

use crate::trace;

/// The contract a fault kind fulfils.
///
/// `WHO` names the scope the kind belongs to, `WHAT` names the kind itself.
pub trait FaultKind: 'static {
    /// Scope the fault kind was declared in.
    const WHO: &'static str;
    /// Name of the fault kind.
    const WHAT: &'static str;
}

/// An immutable `(who, what, line)` description of a deliberately raised
/// fault.
///
/// Creating a record through [`new`](Self::new) or [`of`](Self::of) locks the
/// calling thread's trace stack, in both build profiles. Cloning a record
/// does not. Construction never panics: during thread teardown, or while a
/// [`Frames`](crate::Frames) view of the stack is held, the lock is skipped.
#[derive(Clone, PartialEq, Eq)]
pub struct FaultRecord {
    who: Cow<'static, str>,
    what: Cow<'static, str>,
    line: u32,
    kind: Option<TypeId>,
}

impl FaultRecord {
    /// Creates a record from its three fields and locks the thread's trace.
    #[must_use]
    pub fn new(
        who: impl Into<Cow<'static, str>>,
        what: impl Into<Cow<'static, str>>,
        line: u32,
    ) -> Self {
        Self::with_kind(who.into(), what.into(), line, None)
    }

    /// Creates a record for the fault kind `X` and locks the thread's trace.
    #[must_use]
    pub fn of<X: FaultKind>(line: u32) -> Self {
        Self::with_kind(
            Cow::Borrowed(X::WHO),
            Cow::Borrowed(X::WHAT),
            line,
            Some(TypeId::of::<X>()),
        )
    }

    fn with_kind(
        who: Cow<'static, str>,
        what: Cow<'static, str>,
        line: u32,
        kind: Option<TypeId>,
    ) -> Self {
        trace::lock_current();
        Self {
            who,
            what,
            line,
            kind,
        }
    }

    /// Scope the fault was raised from.
    #[must_use]
    pub fn who(&self) -> &str {
        &self.who
    }

    /// Name of the fault kind.
    #[must_use]
    pub fn what(&self) -> &str {
        &self.what
    }

    /// Source line the fault was raised on.
    #[must_use]
    pub fn line(&self) -> u32 {
        self.line
    }

    /// Returns whether the record was created for the fault kind `X`.
    ///
    /// Records built with [`new`](Self::new) carry no kind and always return
    /// `false`.
    #[must_use]
    pub fn is<X: FaultKind>(&self) -> bool {
        self.kind == Some(TypeId::of::<X>())
    }

    /// Raises this record as a fault.
    ///
    /// The fault unwinds to the nearest [`base_catch`](crate::base_catch)
    /// without invoking the panic hook.
    pub fn raise(self) -> ! {
        std::panic::resume_unwind(alloc::boxed::Box::new(self))
    }

    /// Raises a fault of kind `X` at `line` if `cond` is false.
    ///
    /// When `cond` is true this returns without touching the trace stack.
    #[inline]
    pub fn assert<X: FaultKind>(cond: bool, line: u32) {
        if !cond {
            Self::of::<X>(line).raise();
        }
    }
}

impl fmt::Display for FaultRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} (line {})", self.who, self.what, self.line)
    }
}

impl fmt::Debug for FaultRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FaultRecord")
            .field("who", &self.who)
            .field("what", &self.what)
            .field("line", &self.line)
            .finish()
    }
}

impl core::error::Error for FaultRecord {}

#[cfg(test)]
mod tests {
    use alloc::string::ToString;
    use core::panic::AssertUnwindSafe;
    use std::panic::catch_unwind;

    use super::*;
    use crate::{Frame, Trace};

    struct Fake;

    impl FaultKind for Fake {
        const WHO: &'static str = "tests::fault";
        const WHAT: &'static str = "Fake";
    }

    struct Other;

    impl FaultKind for Other {
        const WHO: &'static str = "tests::fault";
        const WHAT: &'static str = "Other";
    }

    #[test]
    fn test_accessors() {
        let record = FaultRecord::new("test_who", "test_what", 33);
        assert_eq!(record.who(), "test_who");
        assert_eq!(record.what(), "test_what");
        assert_eq!(record.line(), 33);
        assert!(!record.is::<Fake>());
        assert_eq!(record.to_string(), "test_who: test_what (line 33)");
        Trace::current().flush();
    }

    #[test]
    fn test_kind_identity() {
        let record = FaultRecord::of::<Fake>(7);
        assert!(record.is::<Fake>());
        assert!(!record.is::<Other>());
        Trace::current().flush();
    }

    #[test]
    fn test_construction_locks_empty_stack() {
        let trace = Trace::current();
        trace.flush();
        let _record = FaultRecord::new("who", "what", 1);
        assert!(trace.is_locked());
        assert_eq!(trace.depth(), 0);
        trace.flush();
    }

    #[test]
    fn test_raise_keeps_frames() {
        let trace = Trace::current();
        trace.flush();
        let payload = catch_unwind(AssertUnwindSafe(|| {
            let _guard = trace.enter(Frame::new("TestFunction"));
            FaultRecord::new("test_who", "test_what", 33).raise();
        }))
        .unwrap_err();

        let record = payload.downcast::<FaultRecord>().unwrap();
        assert_eq!(record.line(), 33);
        let frames = trace.frames().to_vec();
        assert_eq!(frames, [Frame::new("TestFunction")]);
        trace.flush();
    }

    #[test]
    fn test_assert_raises_only_on_false() {
        let payload = catch_unwind(|| FaultRecord::assert::<Fake>(false, 66)).unwrap_err();
        let record = payload.downcast::<FaultRecord>().unwrap();
        assert!(record.is::<Fake>());
        assert_eq!(record.line(), 66);
        Trace::current().flush();

        assert!(catch_unwind(|| FaultRecord::assert::<Fake>(true, 66)).is_ok());
        assert!(!Trace::current().is_locked());
    }
}
