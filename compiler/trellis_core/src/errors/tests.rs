use super::*;
use pretty_assertions::assert_eq;

#[test]
fn missing_conformance_names_the_trait() {
    let err = missing_conformance("Evaluate");
    assert_eq!(
        err.kind,
        EvalErrorKind::MissingConformance { label: "Evaluate" }
    );
    assert_eq!(err.message(), "value does not conform to Evaluate");
}

#[test]
fn undefined_variable_has_correct_kind() {
    let err = undefined_variable("x");
    assert_eq!(
        err.kind,
        EvalErrorKind::UndefinedVariable {
            name: "x".to_string()
        }
    );
    assert_eq!(err.to_string(), "undefined variable: x");
}

#[test]
fn recursion_limit_reports_depth() {
    assert_eq!(
        recursion_limit_exceeded(64).message(),
        "maximum derivation depth exceeded (limit: 64)"
    );
}

#[test]
fn custom_error_keeps_message() {
    let err = EvalError::new("arity mismatch");
    assert_eq!(
        err.kind,
        EvalErrorKind::Custom {
            message: "arity mismatch".to_string()
        }
    );
}

#[test]
fn display_appends_backtrace_frames() {
    let backtrace = EvalBacktrace::new(vec![
        BacktraceFrame {
            label: "evaluating statement".to_string(),
            location: Some(SourceLocation::inline(2, 1)),
        },
        BacktraceFrame {
            label: "evaluating block".to_string(),
            location: None,
        },
    ]);
    let err = cyclic_derivation("Block").with_backtrace(backtrace);
    assert_eq!(
        err.to_string(),
        "cyclic derivation of Block\n    evaluating statement (2:1)\n    evaluating block"
    );
}

#[test]
fn empty_backtrace_displays_nothing() {
    assert!(EvalBacktrace::default().to_string().is_empty());
    assert_eq!(
        trait_type_mismatch("Text").to_string(),
        "trait Text holds a value of an unexpected type"
    );
}
