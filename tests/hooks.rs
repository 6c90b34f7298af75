//! Global hook installation. Kept in its own test binary because
//! [`Hooks::install`] succeeds at most once per process.

use std::panic::panic_any;

use tracefault::{
    FaultVariant, base_catch,
    hooks::{Hooks, foreign::debug_foreign_hooks},
};

#[derive(Debug, thiserror::Error)]
#[error("quota of {limit} requests exceeded")]
struct QuotaExceeded {
    limit: u32,
}

#[derive(Debug)]
struct Unhooked;

fn classify(work: impl FnOnce()) -> FaultVariant {
    let mut seen = None;
    base_catch(work, |fault| seen = Some(fault));
    seen.unwrap()
}

#[test]
fn test_install_once() {
    Hooks::new()
        .foreign(|quota: &QuotaExceeded| quota.to_string())
        .foreign(|_: &String| String::from("never used"))
        .install()
        .unwrap();

    let fault = classify(|| panic_any(QuotaExceeded { limit: 100 }));
    let foreign = fault.as_foreign().unwrap();
    assert_eq!(foreign.description(), "quota of 100 requests exceeded");
    assert_eq!(foreign.downcast_ref::<QuotaExceeded>().unwrap().limit, 100);

    // Built-in payload types keep their own description.
    let fault = classify(|| panic!("plain message"));
    assert_eq!(fault.as_foreign().unwrap().description(), "plain message");

    assert!(classify(|| panic_any(Unhooked)).is_unknown());

    let mut listed = Vec::new();
    debug_foreign_hooks(|hook| listed.push(hook.to_string()));
    assert!(listed.iter().any(|line| line.contains("QuotaExceeded")));

    let error = Hooks::new().install().unwrap_err();
    assert_eq!(error.to_string(), "hooks are already installed globally");
}
