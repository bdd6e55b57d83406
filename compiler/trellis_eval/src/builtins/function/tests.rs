use pretty_assertions::assert_eq;

use super::*;
use crate::builtins::test_support::{builtin_env, list, name, number};
use crate::evaluate::Evaluate;
use crate::Output;

#[test]
fn call_passes_the_argument_unevaluated() {
    let mut env = builtin_env();
    let stack = ProgramStack::new();
    let identity = Function::new(|argument, _, _| Ok(argument)).into_value(None);
    let argument = name("not-bound");

    let result = identity.call(argument.clone(), &mut env, &stack).unwrap();
    assert!(result.ptr_eq(&argument));
}

#[test]
fn calling_a_value_without_function_fails_with_trace() {
    let mut env = builtin_env();
    let stack = ProgramStack::new();
    let err = number(3.0)
        .call(number(4.0), &mut env, &stack)
        .unwrap_err();

    assert_eq!(err.message(), "cannot call 3 because it is not a function");
    assert_eq!(err.trace.frames()[0].label, "calling 3");
}

#[test]
fn show_writes_the_rendered_value() {
    let mut env = builtin_env();
    let stack = ProgramStack::new();
    env.state_mut::<crate::Bindings>().define("x", number(12.0));

    let result = list(vec![name("show"), name("x")])
        .evaluate(&mut env, &stack)
        .unwrap();

    assert!(result.is_empty());
    assert_eq!(env.state::<Output>().unwrap().captured(), "12\n");
}

#[test]
fn show_falls_back_to_placeholder() {
    let mut env = builtin_env();
    let stack = ProgramStack::new();
    let opaque = Value::of(Trait::constant(
        trellis_core::TraitId::<u8>::declare("Opaque"),
        1,
    ));

    show().call(opaque, &mut env, &stack).unwrap();
    assert_eq!(env.state::<Output>().unwrap().captured(), "<value>\n");
}

#[test]
fn functions_render_as_placeholder_text() {
    let mut env = builtin_env();
    assert_eq!(
        show().format(&mut env, &ProgramStack::new()),
        "<function>"
    );
}
