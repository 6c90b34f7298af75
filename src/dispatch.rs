//! The root classification boundary.
//!
//! [`base_catch`] is the one place faults are caught. It flushes the calling
//! thread's trace, runs a unit of work, and if anything unwinds out of the
//! work, classifies it as exactly one [`FaultVariant`] and hands it to a
//! [`FaultHandler`]. While the handler runs, the frames recorded up to the
//! fault are still available through [`Trace::current`](crate::Trace).
//!
//! ```
//! use tracefault::{Trace, base_catch, fault_kind, trace_frame};
//!
//! fault_kind! {
//!     pub struct Overheated in "Reactor";
//! }
//!
//! fn step(temperature: u32) {
//!     trace_frame!("step(temperature)", temperature);
//!     tracefault::fault_assert!(temperature < 100, Overheated);
//! }
//!
//! base_catch(
//!     || step(120),
//!     |fault| {
//!         let record = fault.as_structured().expect("a structured fault");
//!         assert_eq!(record.what(), "Overheated");
//!         # #[cfg(feature = "diagnostics")]
//!         assert_eq!(Trace::current().depth(), 1);
//!     },
//! );
//! ```

use alloc::{
    borrow::Cow,
    boxed::Box,
    string::{String, ToString},
};
use core::{any::Any, fmt, panic::AssertUnwindSafe};
use std::panic::catch_unwind;

use crate::{FaultRecord, hooks::foreign, trace};

/// The classification of a fault caught by [`base_catch`].
///
/// Exactly one variant is produced per caught fault.
#[derive(Debug)]
pub enum FaultVariant {
    /// A fault raised as a [`FaultRecord`].
    Structured(FaultRecord),
    /// A fault raised through the standard panic machinery, or with a payload
    /// type registered through [`hooks`](crate::hooks).
    Foreign(ForeignFault),
    /// Anything else, such as a bare value passed to
    /// [`panic_any`](std::panic::panic_any).
    Unknown,
}

impl FaultVariant {
    /// Classifies an unwind payload.
    #[must_use]
    pub fn classify(payload: Box<dyn Any + Send>) -> Self {
        match payload.downcast::<FaultRecord>() {
            Ok(record) => Self::Structured(*record),
            Err(payload) => match foreign::describe(&*payload) {
                Some(description) => Self::Foreign(ForeignFault {
                    description,
                    payload,
                }),
                None => Self::Unknown,
            },
        }
    }

    /// Returns the record of a structured fault.
    #[must_use]
    pub fn as_structured(&self) -> Option<&FaultRecord> {
        match self {
            Self::Structured(record) => Some(record),
            _ => None,
        }
    }

    /// Returns the descriptor of a foreign fault.
    #[must_use]
    pub fn as_foreign(&self) -> Option<&ForeignFault> {
        match self {
            Self::Foreign(fault) => Some(fault),
            _ => None,
        }
    }

    /// Returns whether this is [`FaultVariant::Structured`].
    #[must_use]
    pub fn is_structured(&self) -> bool {
        matches!(self, Self::Structured(_))
    }

    /// Returns whether this is [`FaultVariant::Foreign`].
    #[must_use]
    pub fn is_foreign(&self) -> bool {
        matches!(self, Self::Foreign(_))
    }

    /// Returns whether this is [`FaultVariant::Unknown`].
    #[must_use]
    pub fn is_unknown(&self) -> bool {
        matches!(self, Self::Unknown)
    }

    fn label(&self) -> &'static str {
        match self {
            Self::Structured(_) => "structured",
            Self::Foreign(_) => "foreign",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for FaultVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Structured(record) => fmt::Display::fmt(record, f),
            Self::Foreign(fault) => fmt::Display::fmt(fault, f),
            Self::Unknown => f.write_str("unknown fault"),
        }
    }
}

/// Opaque descriptor of a fault that was not raised as a [`FaultRecord`].
///
/// It carries a human-readable description and the original payload, but no
/// who/what/line information.
pub struct ForeignFault {
    description: Cow<'static, str>,
    payload: Box<dyn Any + Send>,
}

impl ForeignFault {
    /// Description of the fault, such as the panic message.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// The original unwind payload.
    #[must_use]
    pub fn payload(&self) -> &(dyn Any + Send) {
        &*self.payload
    }

    /// Attempts to view the payload as a `T`.
    #[must_use]
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.payload.downcast_ref()
    }

    /// Consumes the descriptor and returns the payload, for instance to resume
    /// unwinding with it.
    #[must_use]
    pub fn into_payload(self) -> Box<dyn Any + Send> {
        self.payload
    }
}

impl fmt::Display for ForeignFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.description)
    }
}

impl fmt::Debug for ForeignFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ForeignFault")
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}

/// Receives the classification of a caught fault.
///
/// Implemented for every `FnOnce(FaultVariant)`. Named handler types pass
/// themselves to [`base_catch`] through [`into_handler`](Self::into_handler).
pub trait FaultHandler {
    /// Handles one classified fault.
    fn handle(self, fault: FaultVariant);

    /// Wraps the handler in a closure accepted by [`base_catch`].
    fn into_handler(self) -> impl FnOnce(FaultVariant)
    where
        Self: Sized,
    {
        move |fault| self.handle(fault)
    }
}

impl<F> FaultHandler for F
where
    F: FnOnce(FaultVariant),
{
    fn handle(self, fault: FaultVariant) {
        self(fault)
    }
}

/// Runs `work` under the root classification boundary.
///
/// 1. The calling thread's trace is flushed, so a frozen snapshot from an
///    earlier fault never leaks into this call.
/// 2. `work` runs once.
/// 3. If it returns normally, `handler` is not called.
/// 4. If anything unwinds out of it, the payload is classified and `handler`
///    is called exactly once with the result.
///
/// The flush happens in both build profiles.
///
/// `base_catch` never re-raises. Each thread should route its instrumented
/// work through one `base_catch` at a time; nesting them on one thread flushes
/// the outer call's frames.
///
/// `handler` is any `FnOnce(FaultVariant)`; a [`FaultHandler`] type is passed
/// as `handler.into_handler()`.
pub fn base_catch<W, H>(work: W, handler: H)
where
    W: FnOnce(),
    H: FnOnce(FaultVariant),
{
    trace::flush_current();
    tracing::trace!("trace flushed, entering protected work");

    let Err(payload) = catch_unwind(AssertUnwindSafe(work)) else {
        return;
    };

    let fault = FaultVariant::classify(payload);
    let depth = trace::current_depth();
    match &fault {
        FaultVariant::Structured(record) => tracing::debug!(
            variant = fault.label(),
            depth,
            who = record.who(),
            what = record.what(),
            line = record.line(),
            "fault caught at base_catch"
        ),
        FaultVariant::Foreign(foreign) => tracing::debug!(
            variant = fault.label(),
            depth,
            description = foreign.description(),
            "fault caught at base_catch"
        ),
        FaultVariant::Unknown => {
            tracing::debug!(variant = fault.label(), depth, "fault caught at base_catch")
        }
    }
    handler(fault);
}

pub(crate) fn describe_builtin(payload: &(dyn Any + Send)) -> Option<Cow<'static, str>> {
    if let Some(message) = payload.downcast_ref::<&'static str>() {
        Some(Cow::Borrowed(*message))
    } else if let Some(message) = payload.downcast_ref::<String>() {
        Some(Cow::Owned(message.clone()))
    } else {
        payload
            .downcast_ref::<Box<dyn core::error::Error + Send + Sync>>()
            .map(|error| Cow::Owned(error.to_string()))
    }
}
