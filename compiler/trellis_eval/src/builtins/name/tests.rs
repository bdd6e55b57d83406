use pretty_assertions::assert_eq;
use trellis_core::EvalErrorKind;

use super::*;
use crate::builtins::test_support::{builtin_env, name, number};
use crate::evaluate::Evaluate;
use crate::macro_expand::MacroExpand;

#[test]
fn undefined_name_reports_the_variable() {
    let mut env = builtin_env();
    let stack = ProgramStack::new();
    let err = name("missing").evaluate(&mut env, &stack).unwrap_err();

    assert_eq!(
        err.kind,
        EvalErrorKind::UndefinedVariable {
            name: "missing".to_string()
        }
    );
    assert_eq!(err.trace.frames()[0].label, "resolving variable 'missing'");
}

#[test]
fn assign_then_resolve() {
    let mut env = builtin_env();
    let stack = ProgramStack::new();
    let assign = name("x").trait_of(keys::assign(), &mut env, &stack).unwrap();
    assign.call(number(2.0), &mut env, &stack).unwrap();

    let resolved = Name::new("x").resolve(&mut env, &stack).unwrap();
    assert_eq!(resolved.format(&mut env, &stack), "2");
    assert!(env.state::<Bindings>().unwrap().get("x").is_some());
}

#[test]
fn redefinition_replaces_the_binding() {
    let mut bindings = Bindings::default();
    bindings.define("x", number(1.0));
    bindings.define("x", number(2.0));
    assert_eq!(bindings.len(), 1);
    assert!(!bindings.is_empty());
}

#[test]
fn matching_name_is_replaced() {
    let mut env = builtin_env();
    let stack = ProgramStack::new();
    let replacement = number(8.0);

    let expanded = name("n")
        .macro_expand(&name("n"), &replacement, &mut env, &stack)
        .unwrap();
    assert!(expanded.ptr_eq(&replacement));
}

#[test]
fn other_names_are_kept_with_their_location() {
    let mut env = builtin_env();
    let stack = ProgramStack::new();
    let location = Some(SourceLocation::inline(2, 4));
    let original = Name::new("m").into_value(location.clone());

    let expanded = original
        .macro_expand(&name("n"), &number(8.0), &mut env, &stack)
        .unwrap();
    let kept = expanded.trait_of(keys::name(), &mut env, &stack).unwrap();

    assert_eq!(kept, Name::new("m"));
    assert_eq!(expanded.location().cloned(), location);
}

#[test]
fn non_name_parameter_matches_nothing() {
    let mut env = builtin_env();
    let stack = ProgramStack::new();

    let expanded = name("n")
        .macro_expand(&number(1.0), &number(8.0), &mut env, &stack)
        .unwrap();
    assert_eq!(expanded.format(&mut env, &stack), "n");
}

#[test]
fn name_text_carries_location() {
    let mut env = builtin_env();
    let location = Some(SourceLocation::inline(5, 6));
    let text = Name::new("x")
        .into_value(location.clone())
        .trait_of(keys::text(), &mut env, &ProgramStack::new())
        .unwrap();

    assert_eq!(text, Text::new("x").at(location));
}
