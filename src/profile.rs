//! Compile-time selection between the enabled and disabled diagnostics
//! profiles.
//!
//! The instrumentation macros never talk to the trace stack directly. They
//! go through [`ActiveProfile`], which is [`Enabled`] when the `diagnostics`
//! feature is on and [`Disabled`] otherwise. [`Disabled`] is zero-sized,
//! never records a frame and never runs a deferred condition, so
//! instrumentation compiles away.
//!
//! Locking on [`FaultRecord`] construction and flushing in [`base_catch`]
//! are not part of the profile: they act on the thread's trace in both
//! builds, so frames pushed through [`Trace`] directly never leak from one
//! unit of work into the next.
//!
//! [`base_catch`]: crate::base_catch

use core::panic::AssertUnwindSafe;
use std::panic::catch_unwind;

use crate::{FaultKind, FaultRecord, Frame, FrameGuard, Trace};

/// Operations the instrumentation layer needs from a diagnostics profile.
pub trait Profile {
    /// Guard held for the lifetime of an instrumented scope.
    type FrameGuard;

    /// Whether this profile records frames and raises faults.
    const ENABLED: bool;

    /// Enters a frame for the current scope. `frame` is only called when the
    /// profile records frames.
    fn enter<F>(frame: F) -> Self::FrameGuard
    where
        F: FnOnce() -> Frame;

    /// Raises a fault of kind `X` at `line` if `cond` returns false. `cond` is
    /// only called when the profile raises faults.
    fn assert<X, C>(cond: C, line: u32)
    where
        X: FaultKind,
        C: FnOnce() -> bool;

    /// Runs `statement`, turning any fault it raises into a fault of kind `X`
    /// at `line` when the profile raises faults.
    fn convert<X, R, S>(line: u32, statement: S) -> R
    where
        X: FaultKind,
        S: FnOnce() -> R;
}

/// The full profile: frames are recorded and faults are raised.
#[derive(Copy, Clone, Debug)]
pub struct Enabled;

impl Profile for Enabled {
    type FrameGuard = Option<FrameGuard>;

    const ENABLED: bool = true;

    /// Records nothing once the thread's local storage is being torn down.
    #[inline]
    fn enter<F>(frame: F) -> Option<FrameGuard>
    where
        F: FnOnce() -> Frame,
    {
        Trace::try_current().map(|trace| trace.enter(frame()))
    }

    #[inline]
    fn assert<X, C>(cond: C, line: u32)
    where
        X: FaultKind,
        C: FnOnce() -> bool,
    {
        FaultRecord::assert::<X>(cond(), line);
    }

    fn convert<X, R, S>(line: u32, statement: S) -> R
    where
        X: FaultKind,
        S: FnOnce() -> R,
    {
        match catch_unwind(AssertUnwindSafe(statement)) {
            Ok(value) => value,
            Err(payload) => {
                tracing::trace!(
                    who = X::WHO,
                    what = X::WHAT,
                    line,
                    "converting fault raised by guarded statement"
                );
                drop(payload);
                FaultRecord::of::<X>(line).raise()
            }
        }
    }
}

/// The no-op profile: nothing is recorded, nothing is raised.
#[derive(Copy, Clone, Debug)]
pub struct Disabled;

impl Profile for Disabled {
    type FrameGuard = ();

    const ENABLED: bool = false;

    #[inline(always)]
    fn enter<F>(_frame: F)
    where
        F: FnOnce() -> Frame,
    {
    }

    #[inline(always)]
    fn assert<X, C>(_cond: C, _line: u32)
    where
        X: FaultKind,
        C: FnOnce() -> bool,
    {
    }

    #[inline(always)]
    fn convert<X, R, S>(_line: u32, statement: S) -> R
    where
        X: FaultKind,
        S: FnOnce() -> R,
    {
        statement()
    }
}

/// The profile selected by the `diagnostics` feature.
#[cfg(feature = "diagnostics")]
pub type ActiveProfile = Enabled;

/// The profile selected by the `diagnostics` feature.
#[cfg(not(feature = "diagnostics"))]
pub type ActiveProfile = Disabled;

#[cfg(test)]
mod tests {
    use core::cell::Cell;
    use std::panic::catch_unwind;

    use super::*;

    struct Converted;

    impl FaultKind for Converted {
        const WHO: &'static str = "tests::profile";
        const WHAT: &'static str = "Converted";
    }

    #[test]
    fn test_disabled_is_inert() {
        static_assertions::assert_eq_size!(<Disabled as Profile>::FrameGuard, ());

        let trace = Trace::current();
        trace.flush();
        let calls = Cell::new(0);
        let _guard = Disabled::enter(|| {
            calls.set(calls.get() + 1);
            Frame::new("never")
        });
        Disabled::assert::<Converted, _>(
            || {
                calls.set(calls.get() + 1);
                false
            },
            1,
        );
        assert_eq!(calls.get(), 0);
        assert_eq!(trace.depth(), 0);
        assert!(!trace.is_locked());
    }

    #[test]
    fn test_disabled_convert_runs_statement() {
        assert_eq!(Disabled::convert::<Converted, _, _>(1, || 5), 5);
    }

    #[test]
    fn test_enabled_enter_respects_lock() {
        let trace = Trace::current();
        trace.flush();
        {
            let _guard = Enabled::enter(|| Frame::new("scope"));
            assert_eq!(trace.depth(), 1);
            trace.lock();
        }
        assert_eq!(trace.depth(), 1);
        trace.flush();
        assert_eq!(trace.depth(), 0);
        assert!(!trace.is_locked());
    }

    #[test]
    fn test_enabled_convert_reraises_as_kind() {
        let payload = catch_unwind(|| {
            Enabled::convert::<Converted, (), _>(42, || std::panic::resume_unwind(Box::new(7u8)))
        })
        .unwrap_err();
        let record = payload.downcast::<FaultRecord>().unwrap();
        assert!(record.is::<Converted>());
        assert_eq!(record.line(), 42);
        Trace::current().flush();
    }
}
