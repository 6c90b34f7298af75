/// Records a frame for the rest of the enclosing block.
///
/// The first argument is the signature text. Any further arguments are
/// written with their [`Display`](core::fmt::Display) implementation, each
/// wrapped in brackets and joined by commas. The frame is popped when the
/// block exits, by return or by unwinding, unless a fault locked the trace
/// first.
///
/// Without the `diagnostics` feature this expands to nothing observable: the
/// frame is never formatted and the arguments are never evaluated.
///
/// # Examples
///
/// ```
/// use tracefault::{Frame, Trace, trace_frame};
///
/// fn resize(width: u32, height: u32) -> Vec<String> {
///     trace_frame!("resize(width, height)", width, height);
///     let trace = Trace::current();
///     let recorded = trace.frames().iter().map(Frame::to_string).collect();
///     recorded
/// }
///
/// Trace::current().flush();
/// # #[cfg(feature = "diagnostics")]
/// assert_eq!(resize(640, 480), ["resize(width, height) [640],[480]"]);
/// ```
#[macro_export]
macro_rules! trace_frame {
    ($signature:expr $(, $arg:expr)* $(,)?) => {
        let _tracefault_frame =
            <$crate::profile::ActiveProfile as $crate::profile::Profile>::enter(|| {
                $crate::FrameBuilder::new($signature)$(.arg(&$arg))*.finish()
            });
    };
}

/// Like [`trace_frame!`], using the path of the enclosing function as the
/// signature.
///
/// # Examples
///
/// ```
/// use tracefault::{Trace, trace_fn};
///
/// fn load(id: u64) -> usize {
///     trace_fn!(id);
///     Trace::current().depth()
/// }
///
/// Trace::current().flush();
/// # #[cfg(feature = "diagnostics")]
/// assert_eq!(load(7), 1);
/// ```
#[macro_export]
macro_rules! trace_fn {
    ($($arg:expr),* $(,)?) => {
        $crate::trace_frame!($crate::__function_name!() $(, $arg)*)
    };
}

/// Declares fault kinds.
///
/// Each declaration creates a zero-sized type implementing
/// [`FaultKind`](crate::FaultKind). `WHAT` is the type name. `WHO` is the
/// string given after `in`, or the declaring module's path when omitted.
///
/// # Examples
///
/// ```
/// use tracefault::{FaultKind, fault_kind};
///
/// fault_kind! {
///     /// The buffer was too small.
///     pub struct Overflow in "RingBuffer";
///     struct Underflow;
/// }
///
/// assert_eq!(Overflow::WHO, "RingBuffer");
/// assert_eq!(Overflow::WHAT, "Overflow");
/// assert_eq!(Underflow::WHO, module_path!());
/// ```
#[macro_export]
macro_rules! fault_kind {
    ($($(#[$meta:meta])* $vis:vis struct $name:ident $(in $who:expr)?;)*) => {
        $(
            $(#[$meta])*
            #[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
            $vis struct $name;

            impl $crate::FaultKind for $name {
                const WHO: &'static str = $crate::__fault_scope!($($who)?);
                const WHAT: &'static str = ::core::stringify!($name);
            }
        )*
    };
}

/// Raises a fault of the given kind if the condition is false.
///
/// Without the `diagnostics` feature the condition is **not evaluated**, so it
/// must not carry side effects the program relies on. Use [`fault_check!`]
/// for those.
///
/// # Examples
///
/// ```
/// use tracefault::{base_catch, fault_assert, fault_kind};
///
/// fault_kind! {
///     struct EmptyName;
/// }
///
/// fn greet(name: &str) {
///     fault_assert!(!name.is_empty(), EmptyName);
/// }
///
/// base_catch(
///     || greet(""),
///     |fault| assert_eq!(fault.as_structured().unwrap().what(), "EmptyName"),
/// );
/// ```
#[macro_export]
macro_rules! fault_assert {
    ($cond:expr, $kind:ty $(,)?) => {
        <$crate::profile::ActiveProfile as $crate::profile::Profile>::assert::<$kind, _>(
            || $cond,
            ::core::line!(),
        )
    };
}

/// Like [`fault_assert!`], but the condition is always evaluated.
///
/// Without the `diagnostics` feature the result is discarded and nothing is
/// raised.
///
/// # Examples
///
/// ```
/// use tracefault::{fault_check, fault_kind};
///
/// fault_kind! {
///     struct QueueFull;
/// }
///
/// let mut queue = Vec::with_capacity(4);
/// let mut push = |value: u8| {
///     queue.push(value);
///     queue.len() <= 4
/// };
/// fault_check!(push(1), QueueFull);
/// assert_eq!(queue, [1]);
/// ```
#[macro_export]
macro_rules! fault_check {
    ($cond:expr, $kind:ty $(,)?) => {{
        let passed: bool = $cond;
        <$crate::profile::ActiveProfile as $crate::profile::Profile>::assert::<$kind, _>(
            move || passed,
            ::core::line!(),
        )
    }};
}

/// Calls a function and compares an expected value against its result.
///
/// `fault_compare!(value, op, call, Kind)` raises `Kind` unless
/// `value op call` holds; `op` defaults to `==`. The call always runs; without
/// the `diagnostics` feature only the comparison is skipped.
///
/// # Examples
///
/// ```
/// use tracefault::{fault_compare, fault_kind};
///
/// fault_kind! {
///     struct ShortWrite;
///     struct TooLarge;
/// }
///
/// fn write(buffer: &[u8]) -> usize {
///     buffer.len()
/// }
///
/// fault_compare!(3, write(b"abc"), ShortWrite);
/// fault_compare!(16, >=, write(b"abc"), TooLarge);
/// ```
#[macro_export]
macro_rules! fault_compare {
    ($value:expr, $op:tt, $call:expr, $kind:ty $(,)?) => {{
        let actual = $call;
        <$crate::profile::ActiveProfile as $crate::profile::Profile>::assert::<$kind, _>(
            || $value $op actual,
            ::core::line!(),
        )
    }};
    ($value:expr, $call:expr, $kind:ty $(,)?) => {
        $crate::fault_compare!($value, ==, $call, $kind)
    };
}

/// Evaluates an expression, converting any fault it raises into a fault of
/// the given kind.
///
/// The expression is evaluated inside a closure, so `return` and `?` apply to
/// that closure rather than to the enclosing function. Without the
/// `diagnostics` feature the expression runs unguarded.
///
/// # Examples
///
/// ```
/// use tracefault::{base_catch, fault_convert, fault_kind};
///
/// fault_kind! {
///     struct BadIndex in "Table";
/// }
///
/// let rows = vec![1, 2, 3];
/// base_catch(
///     || {
///         let row = fault_convert!(rows[7], BadIndex);
///         println!("{row}");
///     },
///     |fault| {
///         # #[cfg(feature = "diagnostics")]
///         assert_eq!(fault.as_structured().unwrap().who(), "Table");
///     },
/// );
/// ```
#[macro_export]
macro_rules! fault_convert {
    ($statement:expr, $kind:ty $(,)?) => {
        <$crate::profile::ActiveProfile as $crate::profile::Profile>::convert::<$kind, _, _>(
            ::core::line!(),
            || $statement,
        )
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __fault_scope {
    () => {
        ::core::module_path!()
    };
    ($who:expr) => {
        $who
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __function_name {
    () => {{
        fn __here() {}
        $crate::__private::function_name(::core::any::type_name_of_val(&__here))
    }};
}
