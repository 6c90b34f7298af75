#![deny(
    missing_docs,
    clippy::alloc_instead_of_core,
    clippy::std_instead_of_alloc,
    clippy::std_instead_of_core,
    rustdoc::invalid_rust_codeblocks,
    rustdoc::broken_intra_doc_links,
    missing_copy_implementations,
    unused_doc_comments
)]
// Make docs.rs generate better docs
#![cfg_attr(docsrs, feature(doc_cfg))]

//! Per-thread call-stack recording with structured faults and a single
//! classification boundary.
//!
//! ## Overview
//!
//! This crate lets instrumented code capture a lightweight snapshot of "where
//! we were" when something went wrong, keep that snapshot intact while the
//! fault unwinds, and hand the fault to exactly one handler, classified as one
//! of a small set of variants. All instrumentation can be compiled out.
//!
//! ## Quick Example
//!
//! ```
//! use tracefault::prelude::*;
//!
//! fault_kind! {
//!     /// A division by zero was requested.
//!     pub struct DivideByZero in "Calculator";
//! }
//!
//! fn divide(a: i64, b: i64) -> i64 {
//!     trace_frame!("divide(a, b)", a, b);
//!     fault_assert!(b != 0, DivideByZero);
//!     a / b
//! }
//!
//! fn evaluate() {
//!     trace_fn!();
//!     divide(10, 0);
//! }
//!
//! base_catch(evaluate, |fault| match fault {
//!     FaultVariant::Structured(record) => {
//!         eprintln!("{record}");
//!         for frame in Trace::current().frames().iter() {
//!             eprintln!("  at {frame}");
//!         }
//!     }
//!     FaultVariant::Foreign(foreign) => eprintln!("panic: {foreign}"),
//!     FaultVariant::Unknown => eprintln!("unknown fault"),
//! });
//! ```
//!
//! ## Core Concepts
//!
//! - A **[`Trace`]** is the handle to the calling thread's [`TraceStack`], an
//!   ordered stack of [`Frame`]s plus a lock flag. [`trace_frame!`] pushes a
//!   frame on scope entry and pops it on scope exit.
//! - A **[`FaultRecord`]** is an immutable `(who, what, line)` triple.
//!   Constructing one locks the thread's trace, so scope exits stop popping
//!   and the frames that led to the fault survive the unwind.
//! - **[`base_catch`]** is the root boundary. It flushes the trace, runs the
//!   protected work and classifies whatever unwinds out of it as a
//!   [`FaultVariant`]: `Structured`, `Foreign` or `Unknown`.
//!
//! ## Build Profiles
//!
//! The `diagnostics` feature (on by default) selects [`profile::Enabled`];
//! without it [`profile::Disabled`] is used and every macro compiles to
//! nothing, except that [`fault_check!`] still evaluates its condition,
//! [`fault_compare!`] still performs its call and [`fault_convert!`] still
//! runs its expression. [`base_catch`] flushes and classifies faults in both
//! profiles, and constructing a [`FaultRecord`] locks the trace in both.
//!
//! ## Threads
//!
//! Each thread owns its own trace. Faults do not cross threads, so every
//! thread that runs instrumented code needs its own [`base_catch`].
//!
//! ## Limitations
//!
//! Faults are unwinds. With `panic = "abort"` nothing reaches
//! [`base_catch`].

extern crate alloc;

#[macro_use]
mod macros;

pub mod hooks;
pub mod prelude;
pub mod profile;

mod dispatch;
mod fault;
mod frame;
mod trace;

pub use self::{
    dispatch::{FaultHandler, FaultVariant, ForeignFault, base_catch},
    fault::{FaultKind, FaultRecord},
    frame::{Frame, FrameBuilder},
    trace::{FrameGuard, FrameIter, Frames, Trace, TraceStack},
};

// Not public API. Referenced by macro-generated code.
#[doc(hidden)]
pub mod __private {
    #[doc(hidden)]
    #[must_use]
    pub fn function_name(raw: &'static str) -> &'static str {
        let mut name = raw.strip_suffix("::__here").unwrap_or(raw);
        while let Some(outer) = name.strip_suffix("::{{closure}}") {
            name = outer;
        }
        name
    }
}

#[cfg(test)]
mod tests {
    use super::__private::function_name;

    #[test]
    fn test_function_name_strips_helper_and_closures() {
        assert_eq!(function_name("app::run::__here"), "app::run");
        assert_eq!(
            function_name("app::run::{{closure}}::{{closure}}::__here"),
            "app::run"
        );
        assert_eq!(function_name("plain"), "plain");
    }

    #[test]
    fn test_function_name_macro_names_enclosing_fn() {
        fn probe() -> &'static str {
            crate::__function_name!()
        }
        assert!(probe().ends_with("tests::test_function_name_macro_names_enclosing_fn::probe"));
    }
}
