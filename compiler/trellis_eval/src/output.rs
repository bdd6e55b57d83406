//! Where `show` writes.
//!
//! The destination lives in the environment's [`Output`] state slot, so
//! builtins reach it through the `&mut Environment` they already receive.
//! Cloning an `Output` shares its destination: a caller can keep a clone of
//! a capturing output and read it after the interpreter has run.

use std::sync::Arc;

use parking_lot::Mutex;

enum Sink {
    Stdout,
    Capture(Mutex<String>),
    Discard,
}

/// Environment state slot for program output. Defaults to stdout.
#[derive(Clone)]
pub struct Output {
    sink: Arc<Sink>,
}

impl Output {
    pub fn stdout() -> Self {
        Self::with_sink(Sink::Stdout)
    }

    /// Collect lines in memory; read them back with [`captured`](Self::captured).
    pub fn capture() -> Self {
        Self::with_sink(Sink::Capture(Mutex::new(String::new())))
    }

    pub fn discard() -> Self {
        Self::with_sink(Sink::Discard)
    }

    fn with_sink(sink: Sink) -> Self {
        Output {
            sink: Arc::new(sink),
        }
    }

    /// Write one line.
    pub fn println(&self, line: &str) {
        match &*self.sink {
            Sink::Stdout => println!("{line}"),
            Sink::Capture(buffer) => {
                let mut buffer = buffer.lock();
                buffer.push_str(line);
                buffer.push('\n');
            }
            Sink::Discard => {}
        }
    }

    /// Everything written so far; empty unless capturing.
    pub fn captured(&self) -> String {
        match &*self.sink {
            Sink::Capture(buffer) => buffer.lock().clone(),
            Sink::Stdout | Sink::Discard => String::new(),
        }
    }
}

impl Default for Output {
    fn default() -> Self {
        Self::stdout()
    }
}
