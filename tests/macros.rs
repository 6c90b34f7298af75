//! The instrumentation macros under the active diagnostics profile.

use std::{
    cell::Cell,
    panic::{AssertUnwindSafe, catch_unwind},
};

use tracefault::{
    FaultRecord, Trace, base_catch, fault_assert, fault_check, fault_compare,
    fault_convert, fault_kind, trace_fn, trace_frame,
    profile::{ActiveProfile, Profile},
};

fault_kind! {
    /// Raised by the tests in this file.
    struct Broken in "MacroTests";
    struct Mismatch;
    struct Converted in "MacroTests";
}

fn raised_by(work: impl FnOnce()) -> Option<FaultRecord> {
    let record = catch_unwind(AssertUnwindSafe(work))
        .err()
        .map(|payload| *payload.downcast::<FaultRecord>().unwrap());
    Trace::current().flush();
    record
}

#[test]
fn test_fault_kind_identity() {
    let record = FaultRecord::of::<Broken>(3);
    Trace::current().flush();
    assert_eq!(record.who(), "MacroTests");
    assert_eq!(record.what(), "Broken");

    let record = FaultRecord::of::<Mismatch>(4);
    Trace::current().flush();
    assert_eq!(record.who(), module_path!());
    assert_eq!(record.what(), "Mismatch");
}

#[test]
fn test_assert_condition_is_deferred() {
    let evaluated = Cell::new(0);
    let record = raised_by(|| {
        fault_assert!(
            {
                evaluated.set(evaluated.get() + 1);
                false
            },
            Broken
        );
    });

    if ActiveProfile::ENABLED {
        assert_eq!(evaluated.get(), 1);
        assert!(record.unwrap().is::<Broken>());
    } else {
        assert_eq!(evaluated.get(), 0);
        assert!(record.is_none());
    }
}

#[test]
fn test_check_always_evaluates_once() {
    let evaluated = Cell::new(0);
    let record = raised_by(|| {
        fault_check!(
            {
                evaluated.set(evaluated.get() + 1);
                false
            },
            Broken
        );
    });

    assert_eq!(evaluated.get(), 1);
    assert_eq!(record.is_some(), ActiveProfile::ENABLED);
}

#[test]
fn test_compare_always_calls_once() {
    let calls = Cell::new(0);
    let measure = || {
        calls.set(calls.get() + 1);
        5
    };

    let record = raised_by(|| fault_compare!(5, measure(), Mismatch));
    assert!(record.is_none());
    assert_eq!(calls.get(), 1);

    let record = raised_by(|| fault_compare!(4, >=, measure(), Mismatch));
    assert_eq!(calls.get(), 2);
    if ActiveProfile::ENABLED {
        let record = record.unwrap();
        assert!(record.is::<Mismatch>());
    } else {
        assert!(record.is_none());
    }
}

#[test]
fn test_convert_turns_foreign_into_structured() {
    let table = vec![10, 20];
    let mut seen = None;
    base_catch(
        || {
            let value = fault_convert!(table[table.len()], Converted);
            println!("{value}");
        },
        |fault| seen = Some(fault),
    );
    Trace::current().flush();

    let seen = seen.unwrap();
    if ActiveProfile::ENABLED {
        let record = seen.as_structured().unwrap();
        assert!(record.is::<Converted>());
        assert_eq!(record.who(), "MacroTests");
    } else {
        assert!(seen.is_foreign());
    }
}

#[test]
fn test_convert_passes_value_through() {
    assert_eq!(fault_convert!(2 + 2, Converted), 4);
}

#[test]
fn test_frames_follow_scopes() {
    fn leaf(depth: u8) -> Vec<String> {
        trace_frame!("leaf(depth)", depth, "tag");
        Trace::current()
            .frames()
            .iter()
            .map(ToString::to_string)
            .collect()
    }

    fn root() -> Vec<String> {
        trace_fn!();
        leaf(2)
    }

    Trace::current().flush();
    let recorded = root();
    if ActiveProfile::ENABLED {
        assert_eq!(recorded.len(), 2);
        assert!(recorded[0].ends_with("test_frames_follow_scopes::root"));
        assert_eq!(recorded[1], "leaf(depth) [2],[tag]");
    } else {
        assert!(recorded.is_empty());
    }
    assert_eq!(Trace::current().depth(), 0);
}
