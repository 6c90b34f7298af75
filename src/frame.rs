//! Frame descriptors and the builder that formats them.
//!
//! A [`Frame`] is the text recorded for one instrumented call site: the
//! signature, optionally followed by the serialized argument values. Each
//! argument is written with its [`Display`](fmt::Display) implementation and
//! wrapped in brackets, and the bracketed values are joined by commas:
//!
//! ```
//! use tracefault::FrameBuilder;
//!
//! let frame = FrameBuilder::new("Store::insert(key, value)")
//!     .arg(&"users")
//!     .arg(&42)
//!     .finish();
//! assert_eq!(frame.as_str(), "Store::insert(key, value) [users],[42]");
//! ```

use alloc::{borrow::Cow, string::String};
use core::fmt::{self, Write as _};

/// One formatted call-site descriptor held in a [`TraceStack`].
///
/// Frames have no identity beyond their text and their position in the
/// stack.
///
/// [`TraceStack`]: crate::TraceStack
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Frame(String);

impl Frame {
    /// Creates a frame from already formatted text.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    /// Returns the text of the frame.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the frame and returns its text.
    #[must_use]
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.0, f)
    }
}

impl PartialEq<str> for Frame {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for Frame {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

impl From<&str> for Frame {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}

impl From<String> for Frame {
    fn from(text: String) -> Self {
        Self(text)
    }
}

impl<'a> From<Cow<'a, str>> for Frame {
    fn from(text: Cow<'a, str>) -> Self {
        Self(text.into_owned())
    }
}

/// Folds a heterogeneous list of call-site arguments into a [`Frame`].
///
/// Every call to [`arg`](Self::arg) appends one `[value]` entry, so the
/// builder works for any arity and any mix of argument types. This is what
/// [`trace_frame!`](crate::trace_frame!) expands to.
#[must_use]
pub struct FrameBuilder {
    text: String,
    args: usize,
}

impl FrameBuilder {
    /// Starts a frame with the given signature and no arguments.
    pub fn new(signature: &str) -> Self {
        Self {
            text: String::from(signature),
            args: 0,
        }
    }

    /// Appends one argument value.
    pub fn arg<T>(mut self, value: &T) -> Self
    where
        T: fmt::Display + ?Sized,
    {
        let separator = if self.args == 0 { " " } else { "," };
        // Writing into a String cannot fail unless `T::fmt` itself errors,
        // in which case the partial text is kept.
        let _ = write!(self.text, "{separator}[{value}]");
        self.args += 1;
        self
    }

    /// Appends every value yielded by `values`, in order.
    pub fn args<I>(self, values: I) -> Self
    where
        I: IntoIterator,
        I::Item: fmt::Display,
    {
        values.into_iter().fold(self, |builder, value| builder.arg(&value))
    }

    /// Finishes the frame.
    pub fn finish(self) -> Frame {
        Frame(self.text)
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec;

    use super::*;

    #[test]
    fn test_signature_only() {
        assert_eq!(FrameBuilder::new("main()").finish(), "main()");
    }

    #[test]
    fn test_mixed_arguments() {
        let frame = FrameBuilder::new("f(a, b, c)")
            .arg(&1)
            .arg("two")
            .arg(&3.5)
            .finish();
        assert_eq!(frame, "f(a, b, c) [1],[two],[3.5]");
    }

    #[test]
    fn test_args_fold() {
        let frame = FrameBuilder::new("sum").args(vec![1, 2, 3]).finish();
        assert_eq!(frame.as_str(), "sum [1],[2],[3]");

        let empty: [u8; 0] = [];
        assert_eq!(FrameBuilder::new("sum").args(empty).finish(), "sum");
    }

    #[test]
    fn test_frame_display_matches_text() {
        let frame = Frame::new("Store::get(key)");
        assert_eq!(alloc::format!("{frame}"), "Store::get(key)");
        assert_eq!(alloc::format!("{frame:?}"), "\"Store::get(key)\"");
    }
}
