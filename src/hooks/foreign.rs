//! Hooks that let additional panic payload types classify as
//! [`FaultVariant::Foreign`](crate::FaultVariant::Foreign).
//!
//! Out of the box, [`base_catch`](crate::base_catch) recognises the payloads
//! produced by the standard panic machinery: `&'static str`, `String` and
//! `Box<dyn Error + Send + Sync>`. Code that unwinds with its own payload type
//! through [`panic_any`](std::panic::panic_any) can register a hook which
//! describes that type; without one, such payloads classify as
//! [`FaultVariant::Unknown`](crate::FaultVariant::Unknown).
//!
//! ```standalone_crate
//! use std::panic::panic_any;
//!
//! use tracefault::{base_catch, hooks::foreign::register_foreign_hook};
//!
//! struct DeviceLost {
//!     slot: u8,
//! }
//!
//! register_foreign_hook(|lost: &DeviceLost| format!("device in slot {} lost", lost.slot));
//!
//! base_catch(
//!     || panic_any(DeviceLost { slot: 2 }),
//!     |fault| {
//!         assert_eq!(fault.to_string(), "device in slot 2 lost");
//!     },
//! );
//! ```

use alloc::{borrow::Cow, format, string::String};
use core::{
    any::{Any, TypeId},
    fmt,
    marker::PhantomData,
    panic::{AssertUnwindSafe, Location},
};
use std::panic::catch_unwind;

use hashbrown::HashMap;
use triomphe::Arc;
use unsize::CoerceUnsize;

use crate::{dispatch::describe_builtin, hooks::hook_lock::HookLock};

pub(crate) type HookMap = HashMap<TypeId, Arc<dyn UntypedForeignHook>, rustc_hash::FxBuildHasher>;

static HOOKS: HookLock<HookMap> = HookLock::new();

fn get_hook(type_id: TypeId) -> Option<Arc<dyn UntypedForeignHook>> {
    HOOKS.read().get()?.get(&type_id).cloned()
}

/// Describes panic payloads of type `T`.
///
/// Implemented for every `Fn(&T) -> String` that is `Send + Sync`.
pub trait ForeignHook<T>: 'static + Send + Sync {
    /// Returns a human-readable description of `payload`.
    fn describe(&self, payload: &T) -> String;
}

impl<T, F> ForeignHook<T> for F
where
    F: 'static + Send + Sync + Fn(&T) -> String,
{
    fn describe(&self, payload: &T) -> String {
        self(payload)
    }
}

pub(crate) trait UntypedForeignHook: 'static + Send + Sync + fmt::Display {
    fn describe(&self, payload: &(dyn Any + Send)) -> Option<String>;
}

struct Hook<T, H> {
    hook: H,
    added_at: &'static Location<'static>,
    _hooked_type: PhantomData<fn(&T)>,
}

impl<T, H> fmt::Display for Hook<T, H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Foreign payload hook {} for payload type {} registered at {}:{}",
            core::any::type_name::<H>(),
            core::any::type_name::<T>(),
            self.added_at.file(),
            self.added_at.line()
        )
    }
}

impl<T, H> UntypedForeignHook for Hook<T, H>
where
    T: 'static,
    H: ForeignHook<T>,
{
    fn describe(&self, payload: &(dyn Any + Send)) -> Option<String> {
        let payload = payload.downcast_ref::<T>()?;
        Some(self.hook.describe(payload))
    }
}

pub(crate) fn untyped_hook<T, H>(
    hook: H,
    added_at: &'static Location<'static>,
) -> Arc<dyn UntypedForeignHook>
where
    T: 'static,
    H: ForeignHook<T>,
{
    let hook: Arc<Hook<T, H>> = Arc::new(Hook {
        hook,
        added_at,
        _hooked_type: PhantomData,
    });
    hook.unsize(unsize::Coercion!(to dyn UntypedForeignHook))
}

/// Registers `hook` as the describer for payloads of type `T`.
///
/// A later registration for the same type replaces the earlier one. Hooks for
/// the built-in payload types are never consulted.
#[track_caller]
pub fn register_foreign_hook<T, H>(hook: H)
where
    T: 'static,
    H: ForeignHook<T>,
{
    let hook = untyped_hook::<T, H>(hook, Location::caller());
    HOOKS
        .write()
        .get()
        .get_or_insert_default()
        .insert(TypeId::of::<T>(), hook);
}

pub(crate) fn install_all(hooks: HookMap, replace_existing: bool) {
    let mut guard = HOOKS.write();
    let installed = guard.get();
    if replace_existing {
        *installed = Some(hooks);
    } else {
        installed.get_or_insert_default().extend(hooks);
    }
}

/// Describes `payload` if it is a built-in or hooked foreign payload.
pub(crate) fn describe(payload: &(dyn Any + Send)) -> Option<Cow<'static, str>> {
    if let Some(description) = describe_builtin(payload) {
        return Some(description);
    }

    let hook = get_hook((*payload).type_id())?;
    match catch_unwind(AssertUnwindSafe(|| hook.describe(payload))) {
        Ok(description) => description.map(Cow::Owned),
        Err(_) => {
            tracing::warn!(hook = %hook, "foreign payload hook panicked");
            Some(Cow::Owned(format!("{hook} failed to describe its payload")))
        }
    }
}

/// Calls `f` once for every registered foreign payload hook.
pub fn debug_foreign_hooks(mut f: impl FnMut(&dyn fmt::Display)) {
    if let Some(hooks) = HOOKS.read().get() {
        for hook in hooks.values() {
            f(&**hook);
        }
    }
}

#[cfg(test)]
mod tests {
    use alloc::{string::ToString, vec::Vec};

    use super::*;

    struct Registered(u16);
    struct Unregistered;
    struct Replaced;
    struct Exploding;

    #[test]
    fn test_registered_payload_is_described() {
        register_foreign_hook(|payload: &Registered| format!("code {}", payload.0));
        let payload: alloc::boxed::Box<dyn Any + Send> = alloc::boxed::Box::new(Registered(503));
        assert_eq!(describe(&*payload).as_deref(), Some("code 503"));

        let payload: alloc::boxed::Box<dyn Any + Send> = alloc::boxed::Box::new(Unregistered);
        assert_eq!(describe(&*payload), None);
    }

    #[test]
    fn test_reregistration_replaces() {
        register_foreign_hook(|_: &Replaced| "first".to_string());
        register_foreign_hook(|_: &Replaced| "second".to_string());
        let payload: alloc::boxed::Box<dyn Any + Send> = alloc::boxed::Box::new(Replaced);
        assert_eq!(describe(&*payload).as_deref(), Some("second"));
    }

    #[test]
    fn test_panicking_hook_still_describes() {
        register_foreign_hook(|_: &Exploding| -> String { panic!("describer failure") });
        let payload: alloc::boxed::Box<dyn Any + Send> = alloc::boxed::Box::new(Exploding);
        let description = describe(&*payload).unwrap();
        assert!(description.contains("Exploding"), "{description}");
    }

    #[test]
    fn test_debug_listing_names_type() {
        register_foreign_hook(|payload: &Registered| format!("code {}", payload.0));
        let mut listed = Vec::new();
        debug_foreign_hooks(|hook| listed.push(hook.to_string()));
        assert!(listed.iter().any(|line| line.contains("Registered")));
    }
}
