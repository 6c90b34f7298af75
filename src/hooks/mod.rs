//! Hooks for customizing how caught faults are classified.
//!
//! # Quick Start
//!
//! ```rust,standalone_crate
//! use tracefault::hooks::Hooks;
//!
//! #[derive(Debug)]
//! struct Timeout(u64);
//!
//! // Treat `panic_any(Timeout(..))` as a foreign fault with a description.
//! Hooks::new()
//!     .foreign(|timeout: &Timeout| format!("timed out after {} ms", timeout.0))
//!     .install()
//!     .expect("failed to install hooks");
//! ```
//!
//! # Hook Types
//!
//! - **[`foreign`]**: Describe additional panic payload types so that
//!   [`base_catch`](crate::base_catch) classifies them as
//!   [`FaultVariant::Foreign`](crate::FaultVariant::Foreign) instead of
//!   [`FaultVariant::Unknown`](crate::FaultVariant::Unknown).
//!
//! Hooks can also be registered one at a time with
//! [`foreign::register_foreign_hook`], which never fails.

pub mod foreign;
mod hook_lock;

use core::{
    any::TypeId,
    fmt,
    panic::Location,
    sync::atomic::{AtomicBool, Ordering},
};

use self::foreign::{ForeignHook, HookMap};

static INSTALLED: AtomicBool = AtomicBool::new(false);

/// Builder for configuring and installing hooks globally.
///
/// # Examples
///
/// ```rust,standalone_crate
/// use tracefault::hooks::Hooks;
///
/// struct Errno(i32);
/// struct Signal(i32);
///
/// Hooks::new()
///     .foreign(|errno: &Errno| format!("errno {}", errno.0))
///     .foreign(|signal: &Signal| format!("signal {}", signal.0))
///     .replace();
/// ```
pub struct Hooks {
    foreign: HookMap,
    created_at: &'static Location<'static>,
}

impl Default for Hooks {
    #[track_caller]
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Hooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hooks")
            .field("foreign", &self.foreign.len())
            .field("created_at", &self.created_at)
            .finish()
    }
}

/// Error returned when attempting to install hooks when they're already
/// installed.
///
/// Contains the hooks that were attempted to be installed, allowing you to
/// recover them if needed.
pub struct HooksAlreadyInstalledError(pub Hooks);

impl fmt::Debug for HooksAlreadyInstalledError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HooksAlreadyInstalledError").finish()
    }
}

impl fmt::Display for HooksAlreadyInstalledError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "hooks are already installed globally")
    }
}

impl core::error::Error for HooksAlreadyInstalledError {}

impl Hooks {
    /// Creates an empty `Hooks` builder.
    #[track_caller]
    #[must_use]
    pub fn new() -> Self {
        Self {
            foreign: HookMap::default(),
            created_at: Location::caller(),
        }
    }

    /// Adds a describer for panic payloads of type `T`.
    ///
    /// Adding a second describer for the same `T` replaces the first.
    #[track_caller]
    #[must_use]
    pub fn foreign<T, H>(mut self, hook: H) -> Self
    where
        T: 'static,
        H: ForeignHook<T>,
    {
        let hook = foreign::untyped_hook::<T, H>(hook, Location::caller());
        self.foreign.insert(TypeId::of::<T>(), hook);
        self
    }

    /// Installs the hooks globally.
    ///
    /// Only one `Hooks` set may be installed this way; later attempts return
    /// [`HooksAlreadyInstalledError`] carrying the rejected hooks. Hooks
    /// registered individually through [`foreign::register_foreign_hook`] are
    /// kept alongside the installed set.
    ///
    /// See also [`replace`](Self::replace).
    pub fn install(self) -> Result<(), HooksAlreadyInstalledError> {
        if INSTALLED.swap(true, Ordering::AcqRel) {
            return Err(HooksAlreadyInstalledError(self));
        }
        tracing::debug!(
            foreign = self.foreign.len(),
            created_at = %self.created_at,
            "installing tracefault hooks"
        );
        foreign::install_all(self.foreign, false);
        Ok(())
    }

    /// Replaces every registered hook, including individually registered
    /// ones, with `self`. Never fails, and does not count as an installation
    /// for [`install`](Self::install).
    pub fn replace(self) {
        tracing::debug!(
            foreign = self.foreign.len(),
            created_at = %self.created_at,
            "replacing tracefault hooks"
        );
        foreign::install_all(self.foreign, true);
    }
}
