#![allow(dead_code)]

use std::cell::RefCell;
use std::io::{self, Write};
use std::rc::Rc;

use rox::ast::Stmt;
use rox::error::LoxError;
use rox::lox::{CollectingReporter, Lox, Outcome};
use rox::parser::Parser;
use rox::scanner::scan;

/// In‑memory program output that tests can read back after the
/// interpreter has taken ownership of a clone.
#[derive(Clone, Default)]
pub struct SharedBuffer(Rc<RefCell<Vec<u8>>>);

impl SharedBuffer {
    pub fn contents(&self) -> String {
        String::from_utf8(self.0.borrow().clone()).expect("program output is UTF-8")
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// A `Lox` session wired to in‑memory sinks.
pub struct Session {
    pub lox: Lox,
    out: SharedBuffer,
    diagnostics: CollectingReporter,
}

impl Session {
    pub fn new() -> Self {
        let out = SharedBuffer::default();
        let diagnostics = CollectingReporter::new();
        let lox = Lox::with_io(Box::new(out.clone()), Box::new(diagnostics.clone()));

        Self {
            lox,
            out,
            diagnostics,
        }
    }

    pub fn run(&mut self, source: &str) -> Outcome {
        self.lox.run(source)
    }

    pub fn output(&self) -> String {
        self.out.contents()
    }

    pub fn diagnostics(&self) -> Vec<String> {
        self.diagnostics.messages()
    }
}

/// Run `source` in a fresh session: (outcome, stdout, diagnostics).
pub fn run(source: &str) -> (Outcome, String, Vec<String>) {
    let mut session = Session::new();
    let outcome = session.run(source);
    (outcome, session.output(), session.diagnostics())
}

/// Scan and parse, panicking on lexical errors.
pub fn parse(source: &str) -> Result<Vec<Stmt>, Vec<LoxError>> {
    let (tokens, lex_errors) = scan(source);
    assert!(lex_errors.is_empty(), "unexpected lex errors: {:?}", lex_errors);
    Parser::new(&tokens).parse()
}

pub fn messages(errors: &[LoxError]) -> Vec<String> {
    errors.iter().map(|e| e.to_string()).collect()
}
