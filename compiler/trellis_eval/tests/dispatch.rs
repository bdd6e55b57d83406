//! Trait resolution through the public interpreter API: absence, memoization,
//! validation-gated rules and the scoping of `format`.

#![allow(clippy::unwrap_used, clippy::expect_used, reason = "Tests can panic")]

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use pretty_assertions::assert_eq;
use trellis_core::{Conformance, ProgramStack, Text, Trait, TraitId, Value, PLACEHOLDER};
use trellis_eval::{keys, Block, Evaluate, Function, Interpreter, List, Name, Number};

fn name(name: &str) -> Value {
    Name::new(name).into_value(None)
}

fn number(n: f64) -> Value {
    Number(n).into_value(None)
}

#[test]
fn unregistered_trait_is_absent_and_formats_as_placeholder() {
    let mut interpreter = Interpreter::new();
    let unknown = TraitId::<String>::declare("Unknown");
    let value = Value::of(Trait::constant(TraitId::<u8>::declare("Opaque"), 0));

    let found = value
        .trait_if_present(unknown, interpreter.env_mut(), &ProgramStack::new())
        .unwrap();
    assert_eq!(found, None);
    assert_eq!(interpreter.render(&value), PLACEHOLDER);
    assert_eq!(interpreter.render(&Value::empty()), "<value>");
}

#[test]
fn derivation_runs_once_per_value() {
    let mut interpreter = Interpreter::new();
    let summary = TraitId::<String>::declare("Summary");
    let calls = Rc::new(Cell::new(0));
    {
        let calls = Rc::clone(&calls);
        interpreter.env_mut().add_conformance(Conformance::new(
            summary,
            keys::number().validation(),
            move |Number(n), _, _| {
                calls.set(calls.get() + 1);
                Ok(format!("number {n}"))
            },
        ));
    }
    let value = number(3.0);
    let stack = ProgramStack::new();

    let first = value.trait_of(summary, interpreter.env_mut(), &stack).unwrap();
    let second = value.trait_of(summary, interpreter.env_mut(), &stack).unwrap();

    assert_eq!(first, "number 3");
    assert_eq!(second, first);
    assert_eq!(calls.get(), 1);
}

#[test]
fn block_gated_rule_does_not_fire_for_other_values() {
    let mut interpreter = Interpreter::new();
    let statement_count = TraitId::<usize>::declare("StatementCount");
    interpreter.env_mut().add_conformance(Conformance::new(
        statement_count,
        keys::block().validation(),
        |block: Block, _, _| Ok(block.statements.len()),
    ));
    let stack = ProgramStack::new();

    let not_a_block = List::new(vec![number(1.0)]).into_value(None);
    let found = not_a_block
        .trait_if_present(statement_count, interpreter.env_mut(), &stack)
        .unwrap();
    assert_eq!(found, None);

    let block = Block::new(vec![vec![number(1.0)], vec![number(2.0)]]).into_value(None);
    let found = block
        .trait_if_present(statement_count, interpreter.env_mut(), &stack)
        .unwrap();
    assert_eq!(found, Some(2));
}

#[test]
fn earlier_rule_wins_for_overlapping_validations() {
    let mut interpreter = Interpreter::new();
    // Built-in Number ::= Text was registered first.
    interpreter.env_mut().add_conformance(Conformance::new(
        keys::text(),
        keys::number().validation(),
        |_, _, _| Ok(Text::new("shadowed")),
    ));

    assert_eq!(interpreter.render(&number(6.0)), "6");
}

#[test]
fn new_kinds_gain_behavior_without_touching_values() {
    let mut interpreter = Interpreter::new();
    let color = TraitId::<&'static str>::declare("Color");
    let red = Value::of(Trait::constant(color, "red"));
    assert_eq!(interpreter.render(&red), PLACEHOLDER);

    interpreter.env_mut().add_conformance(Conformance::new(
        keys::text(),
        color.validation(),
        |shade, _, _| Ok(Text::new(format!("color {shade}"))),
    ));
    let blue = Value::of(Trait::constant(color, "blue"));
    assert_eq!(interpreter.render(&blue), "color blue");
}

#[test]
fn format_inside_evaluation_leaves_the_stack_as_it_was() {
    let observed = Rc::new(RefCell::new(Vec::new()));
    let probe = {
        let observed = Rc::clone(&observed);
        Function::new(move |argument, env, stack| {
            let before = (stack.depth(), stack.is_recording());
            let rendered = argument.format(env, stack);
            let after = (stack.depth(), stack.is_recording());
            observed.borrow_mut().push((before, rendered, after));
            Ok(Value::empty())
        })
        .into_value(None)
    };
    let mut interpreter = Interpreter::builder().bind("probe", probe).build();

    let program = Block::new(vec![vec![
        name("probe"),
        List::new(vec![name("a"), name("b")]).into_value(None),
    ]])
    .into_value(None);
    interpreter.run(&program).unwrap();

    let observed = observed.borrow();
    let (before, rendered, after) = &observed[0];
    assert_eq!(rendered, "(a b)");
    assert_eq!(before, after);
    assert!(before.0 > 0);
    assert!(before.1);
}

#[test]
fn evaluate_is_derived_not_stored() {
    let mut interpreter = Interpreter::new();
    let block = Block::default().into_value(None);
    let evaluate = keys::evaluate().raw();

    assert!(!block.realized_traits().contains(&evaluate));
    assert!(block
        .evaluate(interpreter.env_mut(), &ProgramStack::new())
        .unwrap()
        .is_empty());
    assert!(block.is_memoized(evaluate));
}
