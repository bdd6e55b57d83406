use std::cell::Cell;
use std::rc::Rc;

use super::*;
use crate::{Conformance, EvalErrorKind};
use pretty_assertions::assert_eq;

fn counting_trait(id: TraitId<u32>, calls: &Rc<Cell<u32>>) -> Trait<u32> {
    let calls = Rc::clone(calls);
    Trait::new(id, move |_, _, _| {
        calls.set(calls.get() + 1);
        Ok(7)
    })
}

#[test]
fn empty_value_has_no_traits() {
    let value = Value::empty();
    assert!(value.is_empty());
    assert!(value.realized_traits().is_empty());
    assert_eq!(value.location(), None);
}

#[test]
fn add_does_not_modify_the_receiver() {
    let id = TraitId::<u32>::declare("Count");
    let base = Value::located(Some(SourceLocation::inline(1, 1)));
    let extended = base.add(Trait::constant(id, 3));

    assert!(base.is_empty());
    assert_eq!(extended.realized_traits(), vec![id.raw()]);
    assert_eq!(extended.location(), Some(&SourceLocation::inline(1, 1)));
}

#[test]
fn realized_traits_are_in_insertion_order() {
    let first = TraitId::<u32>::declare("First");
    let second = TraitId::<bool>::declare("Second");
    let value = Value::of(Trait::constant(first, 1)).add(Trait::constant(second, true));

    assert_eq!(value.realized_traits(), vec![first.raw(), second.raw()]);
}

#[test]
fn newest_instance_shadows_older_one() {
    let id = TraitId::<u32>::declare("Count");
    let value = Value::of(Trait::constant(id, 1)).add(Trait::constant(id, 2));
    let mut env = Environment::new();

    let found = value.trait_of(id, &mut env, &ProgramStack::new()).unwrap();
    assert_eq!(found, 2);
}

#[test]
fn realized_instance_runs_once_across_requests_and_clones() {
    let id = TraitId::<u32>::declare("Count");
    let calls = Rc::new(Cell::new(0));
    let value = Value::of(counting_trait(id, &calls));
    let alias = value.clone();
    let mut env = Environment::new();
    let stack = ProgramStack::new();

    assert_eq!(value.trait_of(id, &mut env, &stack).unwrap(), 7);
    assert_eq!(value.trait_of(id, &mut env, &stack).unwrap(), 7);
    assert_eq!(alias.trait_of(id, &mut env, &stack).unwrap(), 7);
    assert_eq!(calls.get(), 1);
    assert!(alias.is_memoized(id.raw()));
}

#[test]
fn derived_trait_is_memoized_on_the_value() {
    let source = TraitId::<u32>::declare("Source");
    let derived = TraitId::<String>::declare("Derived");
    let calls = Rc::new(Cell::new(0));
    let mut env = Environment::new();
    {
        let calls = Rc::clone(&calls);
        env.add_conformance(Conformance::new(derived, source.validation(), move |n, _, _| {
            calls.set(calls.get() + 1);
            Ok(format!("#{n}"))
        }));
    }
    let value = Value::of(Trait::constant(source, 4));
    let stack = ProgramStack::new();

    assert_eq!(value.trait_of(derived, &mut env, &stack).unwrap(), "#4");
    assert_eq!(value.trait_of(derived, &mut env, &stack).unwrap(), "#4");
    assert_eq!(calls.get(), 1);
}

#[test]
fn add_starts_a_fresh_memo_table() {
    let id = TraitId::<u32>::declare("Count");
    let other = TraitId::<bool>::declare("Flag");
    let calls = Rc::new(Cell::new(0));
    let value = Value::of(counting_trait(id, &calls));
    let mut env = Environment::new();
    let stack = ProgramStack::new();

    value.trait_of(id, &mut env, &stack).unwrap();
    let extended = value.add(Trait::constant(other, true));

    assert!(!extended.is_memoized(id.raw()));
    assert_eq!(extended.trait_of(id, &mut env, &stack).unwrap(), 7);
    assert_eq!(calls.get(), 2);
}

#[test]
fn unknown_trait_is_absent() {
    let id = TraitId::<u32>::declare("Unregistered");
    let mut env = Environment::new();

    let found = Value::empty()
        .trait_if_present(id, &mut env, &ProgramStack::new())
        .unwrap();
    assert_eq!(found, None);
    assert!(!Value::empty().is_memoized(id.raw()));
}

#[test]
fn trait_of_reports_missing_conformance() {
    let id = TraitId::<u32>::declare("Evaluate");
    let mut env = Environment::new();
    let stack = ProgramStack::new().push(|| "outer".to_string()).unwrap();

    let err = Value::empty().trait_of(id, &mut env, &stack).unwrap_err();
    assert_eq!(err.kind, EvalErrorKind::MissingConformance { label: "Evaluate" });
    assert_eq!(err.trace.frames()[0].label, "outer");
}

#[test]
fn self_referential_derivation_is_reported_as_cycle() {
    let id = TraitId::<u32>::declare("Loop");
    let mut env = Environment::new();
    env.add_conformance(Conformance::new(id, id.validation(), |n, _, _| Ok(n)));

    let err = Value::empty()
        .trait_of(id, &mut env, &ProgramStack::new())
        .unwrap_err();
    assert_eq!(err.kind, EvalErrorKind::CyclicDerivation { label: "Loop" });
}

#[test]
fn same_trait_on_different_values_is_not_a_cycle() {
    let inner = TraitId::<u32>::declare("Inner");
    let outer = TraitId::<u32>::declare("Outer");
    let nested = Value::of(Trait::constant(inner, 5));
    let value = Value::of(Trait::new(outer, move |_, env, stack| {
        nested.trait_of(inner, env, stack)
    }));
    let mut env = Environment::new();

    assert_eq!(value.trait_of(outer, &mut env, &ProgramStack::new()).unwrap(), 5);
}

#[test]
fn derivation_errors_propagate_from_trait_if_present() {
    let id = TraitId::<u32>::declare("Broken");
    let value = Value::of(Trait::new(id, |_, _, _| Err(EvalError::new("boom"))));
    let mut env = Environment::new();

    let err = value
        .trait_if_present(id, &mut env, &ProgramStack::new())
        .unwrap_err();
    assert_eq!(err.message(), "boom");
    assert!(!value.is_memoized(id.raw()));
}

#[test]
fn with_location_keeps_instances() {
    let id = TraitId::<u32>::declare("Count");
    let value = Value::of(Trait::constant(id, 1));
    let moved = value.with_location(Some(SourceLocation::inline(3, 9)));

    assert_eq!(moved.realized_traits(), vec![id.raw()]);
    assert_eq!(moved.location(), Some(&SourceLocation::inline(3, 9)));
    assert!(!moved.ptr_eq(&value));
}

#[test]
fn debug_lists_trait_labels() {
    let id = TraitId::<u32>::declare("Count");
    let rendered = format!("{:?}", Value::of(Trait::constant(id, 1)));
    assert!(rendered.contains("Count"), "got {rendered}");
}
