#![deny(
    missing_docs,
    unsafe_code,
    rustdoc::invalid_rust_codeblocks,
    rustdoc::broken_intra_doc_links,
    missing_copy_implementations,
    unused_doc_comments
)]

//! Tracing output for faults caught by tracefault.
//!
//! This crate provides [`TracingReporter`], a ready-made
//! [`FaultHandler`] that emits one `tracing` error event per caught fault. The event carries the fault classification and the
//! frames that were frozen on the thread's trace when the fault was raised.
//!
//! # Quick Start
//!
//! ```
//! use tracefault::{FaultHandler, base_catch, fault_assert, fault_kind, trace_frame};
//! use tracefault_tracing::TracingReporter;
//!
//! fault_kind! {
//!     pub struct EmptyQueue in "Scheduler";
//! }
//!
//! fn next_job(queue: &[u32]) -> u32 {
//!     trace_frame!("next_job(queue)", queue.len());
//!     fault_assert!(!queue.is_empty(), EmptyQueue);
//!     queue[0]
//! }
//!
//! base_catch(
//!     || {
//!         next_job(&[]);
//!     },
//!     TracingReporter::new_from_env().into_handler(),
//! );
//! ```
//!
//! Output with a formatting subscriber installed:
//! ```text
//! ERROR tracefault_tracing: structured fault: Scheduler: EmptyQueue (line 9)
//!   at next_job(queue) [0]
//! ```
//!
//! The report text is also available without logging through
//! [`render_report`].
//!
//! # Environment Variables
//!
//! - `TRACEFAULT_TRACING` - Comma-separated options, read once per process:
//!   - `newest-first` - List frames from the innermost scope outwards
//!   - `no-frames` - Omit the frame listing

use std::{fmt::Write as _, sync::OnceLock};

use tracefault::{FaultHandler, FaultVariant, Frame, Trace};

/// Options controlling how a fault report is rendered.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct ReporterOptions {
    /// List frames from the most recent one to the oldest one.
    pub newest_first: bool,
    /// Leave the frame listing out of the report.
    pub hide_frames: bool,
}

impl ReporterOptions {
    /// Returns the options configured by the `TRACEFAULT_TRACING` environment
    /// variable.
    ///
    /// The variable is read the first time this is called; later changes to
    /// the environment have no effect.
    #[must_use]
    pub fn from_env() -> Self {
        static TRACEFAULT_FLAGS: OnceLock<ReporterOptions> = OnceLock::new();

        *TRACEFAULT_FLAGS.get_or_init(|| match std::env::var_os("TRACEFAULT_TRACING") {
            Some(var) => Self::parse(&var.to_string_lossy()),
            None => Self::default(),
        })
    }

    fn parse(value: &str) -> Self {
        let mut options = Self::default();
        for v in value.split(',').map(str::trim) {
            if v.eq_ignore_ascii_case("newest-first") {
                options.newest_first = true;
            } else if v.eq_ignore_ascii_case("no-frames") {
                options.hide_frames = true;
            }
        }
        options
    }
}

/// Renders a human-readable report for `fault`.
///
/// The first line names the classification and the fault itself. Each frame
/// follows on its own line, oldest first unless
/// [`newest_first`](ReporterOptions::newest_first) is set.
///
/// ```
/// use tracefault::{FaultRecord, FaultVariant, Frame};
/// use tracefault_tracing::{ReporterOptions, render_report};
///
/// let record = FaultRecord::new("Parser", "UnexpectedEof", 40);
/// # tracefault::Trace::current().flush();
/// let frames = [Frame::new("parse"), Frame::new("parse_block [3]")];
/// let report = render_report(
///     &FaultVariant::Structured(record),
///     &frames,
///     &ReporterOptions::default(),
/// );
/// assert_eq!(
///     report,
///     "structured fault: Parser: UnexpectedEof (line 40)\n  at parse\n  at parse_block [3]"
/// );
/// ```
#[must_use]
pub fn render_report<'a, I>(fault: &FaultVariant, frames: I, options: &ReporterOptions) -> String
where
    I: IntoIterator<Item = &'a Frame>,
{
    let mut report = match fault {
        FaultVariant::Structured(record) => format!("structured fault: {record}"),
        FaultVariant::Foreign(foreign) => format!("foreign fault: {foreign}"),
        FaultVariant::Unknown => String::from("unknown fault"),
    };
    if options.hide_frames {
        return report;
    }

    let mut frames: Vec<&Frame> = frames.into_iter().collect();
    if options.newest_first {
        frames.reverse();
    }
    for frame in frames {
        // Writing to a String cannot fail.
        let _ = write!(report, "\n  at {frame}");
    }
    report
}

/// A [`FaultHandler`] that logs each fault as a `tracing` error event.
///
/// Pass it to [`base_catch`](tracefault::base_catch) as
/// `TracingReporter::new().into_handler()`.
///
/// The frames are read from [`Trace::current`] while the handler runs, so the
/// event shows the snapshot frozen when the fault was raised.
#[derive(Copy, Clone, Debug, Default)]
pub struct TracingReporter {
    options: ReporterOptions,
}

impl TracingReporter {
    /// Creates a reporter with default options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a reporter configured by the `TRACEFAULT_TRACING` environment
    /// variable.
    #[must_use]
    pub fn new_from_env() -> Self {
        Self::with_options(ReporterOptions::from_env())
    }

    /// Creates a reporter with the given options.
    #[must_use]
    pub fn with_options(options: ReporterOptions) -> Self {
        Self { options }
    }

    /// The options this reporter renders with.
    #[must_use]
    pub fn options(&self) -> &ReporterOptions {
        &self.options
    }
}

impl FaultHandler for TracingReporter {
    fn handle(self, fault: FaultVariant) {
        let trace = Trace::current();
        let frames = trace.frames();
        let report = render_report(&fault, &frames, &self.options);
        let depth = frames.len();
        drop(frames);

        match &fault {
            FaultVariant::Structured(record) => tracing::error!(
                who = record.who(),
                what = record.what(),
                line = record.line(),
                depth,
                "{report}"
            ),
            FaultVariant::Foreign(_) => tracing::error!(depth, "{report}"),
            FaultVariant::Unknown => tracing::error!(depth, "{report}"),
        }
    }
}
