//! Commonly used items for instrumenting code.
//!
//! ```
//! use tracefault::prelude::*;
//! ```

pub use crate::{
    FaultHandler, FaultKind, FaultRecord, FaultVariant, Frame, Trace, base_catch, fault_assert,
    fault_check, fault_compare, fault_convert, fault_kind, trace_fn, trace_frame,
};
