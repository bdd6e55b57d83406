//! The interpretation driver.
//!
//! An [`Interpreter`] owns the environment for one interpretation pass:
//! it registers every built-in conformance on construction, seeds the
//! built-in bindings, and hands out a fresh diagnostic stack per entry
//! point.

use trellis_core::{Environment, EvalResult, ProgramStack, Value};

use crate::builtins::{self, name::Bindings};
use crate::evaluate::Evaluate;
use crate::macro_expand::MacroExpand;
use crate::output::Output;

/// Default nesting limit for one entry point.
///
/// Each evaluation level typically takes several nested entries (evaluate,
/// derive, call), so this bounds program depth well below the count.
pub const DEFAULT_MAX_DEPTH: usize = 8192;

/// Settings fixed for the life of an interpreter.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EvalConfig {
    /// Nesting limit; `None` disables the check.
    pub max_depth: Option<usize>,
    /// Record frames for backtraces. Turning this off keeps cycle and depth
    /// checks but leaves errors without a trace.
    pub record_diagnostics: bool,
}

impl Default for EvalConfig {
    fn default() -> Self {
        EvalConfig {
            max_depth: Some(DEFAULT_MAX_DEPTH),
            record_diagnostics: true,
        }
    }
}

/// Builder for [`Interpreter`].
#[derive(Default)]
pub struct InterpreterBuilder {
    config: EvalConfig,
    output: Option<Output>,
    bindings: Vec<(String, Value)>,
}

impl InterpreterBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn max_depth(mut self, max_depth: Option<usize>) -> Self {
        self.config.max_depth = max_depth;
        self
    }

    #[must_use]
    pub fn record_diagnostics(mut self, record: bool) -> Self {
        self.config.record_diagnostics = record;
        self
    }

    /// Where `show` writes. Default is stdout.
    #[must_use]
    pub fn output(mut self, output: Output) -> Self {
        self.output = Some(output);
        self
    }

    /// Define a binding before the program runs. Shadows a built-in of the
    /// same name.
    #[must_use]
    pub fn bind(mut self, name: impl Into<String>, value: Value) -> Self {
        self.bindings.push((name.into(), value));
        self
    }

    pub fn build(self) -> Interpreter {
        let mut env = Environment::new();
        builtins::register_conformances(&mut env);
        builtins::define_bindings(&mut env);

        if let Some(output) = self.output {
            *env.state_mut::<Output>() = output;
        }

        let bindings = env.state_mut::<Bindings>();
        for (name, value) in self.bindings {
            bindings.define(name, value);
        }

        Interpreter {
            env,
            config: self.config,
        }
    }
}

/// One interpretation pass over a shared environment.
pub struct Interpreter {
    env: Environment,
    config: EvalConfig,
}

impl Interpreter {
    /// An interpreter with default settings.
    pub fn new() -> Self {
        InterpreterBuilder::new().build()
    }

    pub fn builder() -> InterpreterBuilder {
        InterpreterBuilder::new()
    }

    /// Evaluate `program`. Bindings it makes persist for later calls.
    #[tracing::instrument(level = "debug", skip_all)]
    pub fn run(&mut self, program: &Value) -> EvalResult {
        let stack = self.stack();
        let result = program.evaluate(&mut self.env, &stack);
        if let Err(err) = &result {
            tracing::debug!(error = %err.message(), "evaluation failed");
        }
        result
    }

    /// Substitute `replacement` for `parameter` throughout `value`.
    #[tracing::instrument(level = "debug", skip_all)]
    pub fn expand(&mut self, value: &Value, parameter: &Value, replacement: &Value) -> EvalResult {
        let stack = self.stack();
        value.macro_expand(parameter, replacement, &mut self.env, &stack)
    }

    /// Render `value` for display, falling back to the placeholder.
    pub fn render(&mut self, value: &Value) -> String {
        let stack = self.stack();
        value.format(&mut self.env, &stack)
    }

    /// The current binding of `name`.
    pub fn lookup(&self, name: &str) -> Option<Value> {
        self.env
            .state::<Bindings>()
            .and_then(|bindings| bindings.get(name))
            .cloned()
    }

    /// Everything `show` has written, if the handler captures.
    pub fn output(&self) -> String {
        self.env
            .state::<Output>()
            .map(Output::captured)
            .unwrap_or_default()
    }

    pub fn config(&self) -> &EvalConfig {
        &self.config
    }

    pub fn env(&self) -> &Environment {
        &self.env
    }

    /// The environment, for registering further conformances.
    pub fn env_mut(&mut self) -> &mut Environment {
        &mut self.env
    }

    fn stack(&self) -> ProgramStack {
        let mut stack = ProgramStack::with_max_depth(self.config.max_depth);
        if !self.config.record_diagnostics {
            stack.disable_recording();
        }
        stack
    }
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}
