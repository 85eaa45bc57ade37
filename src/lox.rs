//! Pipeline driver: lex → parse → resolve → interpret.
//!
//! Each stage only runs while the session is still *runnable* (no static
//! diagnostic so far). Diagnostics go to a pluggable [`Reporter`].

use std::cell::RefCell;
use std::io::Write;
use std::rc::Rc;

use log::{debug, info};

use crate::error::LoxError;
use crate::interpreter::Interpreter;
use crate::parser::Parser;
use crate::resolver::Resolver;
use crate::scanner::scan;

/// Diagnostic sink shared by every stage.
pub trait Reporter {
    fn report(&mut self, error: &LoxError);
}

/// Writes each diagnostic to stderr on its own line.
#[derive(Debug, Default)]
pub struct StderrReporter;

impl Reporter for StderrReporter {
    fn report(&mut self, error: &LoxError) {
        eprintln!("{}", error);
    }
}

/// Keeps rendered diagnostics in memory; clones share one list.
#[derive(Debug, Clone, Default)]
pub struct CollectingReporter {
    messages: Rc<RefCell<Vec<String>>>,
}

impl CollectingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> Vec<String> {
        self.messages.borrow().clone()
    }
}

impl Reporter for CollectingReporter {
    fn report(&mut self, error: &LoxError) {
        self.messages.borrow_mut().push(error.to_string());
    }
}

/// How far a call to [`Lox::run`] got.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Completed,
    StaticError,
    RuntimeError,
}

impl Outcome {
    /// Conventional process exit code (sysexits `EX_DATAERR` / `EX_SOFTWARE`).
    pub fn exit_code(self) -> i32 {
        match self {
            Outcome::Completed => 0,
            Outcome::StaticError => 65,
            Outcome::RuntimeError => 70,
        }
    }
}

/// One interpreter session. Globals persist across [`Lox::run`] calls,
/// which is what a REPL needs.
pub struct Lox {
    interpreter: Interpreter,
    reporter: Box<dyn Reporter>,
    had_error: bool,
    had_runtime_error: bool,
}

impl Default for Lox {
    fn default() -> Self {
        Self::new()
    }
}

impl Lox {
    /// Session printing to stdout and reporting to stderr.
    pub fn new() -> Self {
        Self::with_parts(Interpreter::new(), Box::new(StderrReporter))
    }

    /// Session with custom program output and diagnostic sinks.
    pub fn with_io(out: Box<dyn Write>, reporter: Box<dyn Reporter>) -> Self {
        Self::with_parts(Interpreter::with_output(out), reporter)
    }

    pub fn with_parts(interpreter: Interpreter, reporter: Box<dyn Reporter>) -> Self {
        Self {
            interpreter,
            reporter,
            had_error: false,
            had_runtime_error: false,
        }
    }

    /// Access to the interpreter, e.g. to register extra natives.
    pub fn interpreter_mut(&mut self) -> &mut Interpreter {
        &mut self.interpreter
    }

    /// No lex, parse or resolve diagnostic has been reported.
    pub fn is_runnable(&self) -> bool {
        !self.had_error
    }

    pub fn had_runtime_error(&self) -> bool {
        self.had_runtime_error
    }

    /// Forget earlier errors, keeping globals (between REPL lines).
    pub fn reset(&mut self) {
        self.had_error = false;
        self.had_runtime_error = false;
    }

    fn report_static(&mut self, errors: &[LoxError]) {
        for error in errors {
            debug!("Static diagnostic: {}", error);
            self.reporter.report(error);
        }

        if !errors.is_empty() {
            self.had_error = true;
        }
    }

    /// Run one chunk of source text through the whole pipeline.
    pub fn run(&mut self, source: &str) -> Outcome {
        info!("Running {} bytes of source", source.len());

        let (tokens, lex_errors) = scan(source);
        self.report_static(&lex_errors);

        // Parse even after lex errors so one pass surfaces both kinds.
        let statements = match Parser::new(&tokens).parse() {
            Ok(statements) => statements,
            Err(errors) => {
                self.report_static(&errors);
                return Outcome::StaticError;
            }
        };

        if !self.is_runnable() {
            return Outcome::StaticError;
        }

        match Resolver::new().resolve(&statements) {
            Ok(resolutions) => self.interpreter.resolve(resolutions),
            Err(errors) => {
                self.report_static(&errors);
                return Outcome::StaticError;
            }
        }

        match self.interpreter.interpret(&statements) {
            Ok(()) => Outcome::Completed,
            Err(error) => {
                debug!("Runtime error: {}", error);
                self.reporter.report(&error);
                self.had_runtime_error = true;
                Outcome::RuntimeError
            }
        }
    }
}
