#![allow(clippy::needless_return)]

//! Lox is a dynamically typed, lexically scoped scripting language, implemented
//! here as a tree-walk interpreter with a hand-written recursive descent parser.
//!
//! ## Scanning
//! The first step is scanning: converting a string of source characters into a
//! list of tokens. The scanner is implemented in the [`scanner`](scanner)
//! module as a state machine over the characters in the source. For example,
//! the string `1 + 2` scans to:
//! ```text
//! [Number(1), Plus, Number(2)]
//! ```
//! The scanner reports lexical errors, such as an unterminated string or an
//! unrecognized character, as a [`ScanError`](error::ScanError). Scanning
//! continues past an error so multiple problems can be reported in one pass.
//!
//! ## Parsing
//! The second step is parsing: converting the token list into an abstract
//! syntax tree. The parser is implemented in the [`parser`](parser) module as
//! a recursive descent parser over the grammar in the language reference.
//! [`Expressions`](expr::Expr) produce a value, an [`Object`](object::Object);
//! [`statements`](stmt::Stmt) perform an action and produce nothing. The
//! parser reports syntax errors as a [`ParseError`](error::ParseError) and
//! resynchronizes at the next statement boundary so it can keep parsing.
//!
//! ## Resolving
//! The third step is resolving: a static pass over the AST that binds each
//! variable reference to the scope distance it will be found at when the
//! interpreter runs. The resolver is implemented in the
//! [`resolver`](resolver) module and reports static-semantic errors, such as
//! reading a variable from within its own initializer, as a
//! [`ResolveError`](error::ResolveError).
//!
//! ## Interpreting
//! The final step is interpreting: walking the AST and evaluating it. The
//! interpreter is implemented in the [`interpreter`](interpreter) module.
//! Environments are chained, reference-counted scopes (see
//! [`environment`](environment)); each block, call, and the global scope get
//! their own. Errors only the interpreter can catch, such as adding a string
//! to a number, are reported as a [`RuntimeError`](error::RuntimeError).

use std::io::Write;
use std::path::PathBuf;
use std::{fs, process};

use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

pub mod ast;
pub mod class;
pub mod environment;
pub mod error;
pub mod expr;
pub mod function;
pub mod interpreter;
pub mod literal;
pub mod object;
pub mod parser;
pub mod resolver;
pub mod scanner;
pub mod stmt;
pub mod token;

use parser::Parser;
use resolver::Resolver;
use scanner::Scanner;

/// Drives the scan/parse/resolve/interpret pipeline, either once over a
/// whole file or line-by-line over a REPL. Holds the interpreter across
/// REPL lines so top-level `var`/`fun`/`class` declarations persist.
pub struct Lox {
    interpreter: interpreter::Interpreter,
}

impl Lox {
    pub fn new() -> Self {
        Lox { interpreter: interpreter::Interpreter::new() }
    }

    /// Builds a driver whose `print` output goes to `output` instead of the
    /// real stdout. Lets callers (notably integration tests) drive the
    /// library directly and inspect what a Lox program printed, without
    /// spawning the `rocks` binary as a subprocess.
    pub fn with_writer(output: Box<dyn Write>) -> Self {
        Lox { interpreter: interpreter::Interpreter::with_writer(output) }
    }

    pub fn run_file(&mut self, path: &str) {
        let contents = fs::read_to_string(path).unwrap_or_else(|err| {
            eprintln!("Could not read '{path}': {err}");
            process::exit(66);
        });

        error::reset_error();
        self.run(&contents);

        if error::did_error() {
            process::exit(65);
        }
        if error::did_runtime_error() {
            process::exit(70);
        }
    }

    pub fn run_prompt(&mut self) {
        let mut editor = DefaultEditor::new().expect("readline editor to initialize");
        let history_path = history_path();
        if let Some(path) = &history_path {
            let _ = editor.load_history(path);
        }

        loop {
            match editor.readline("> ") {
                Ok(line) => {
                    let _ = editor.add_history_entry(line.as_str());
                    self.run(&line);
                    error::reset_had_error();
                }
                Err(ReadlineError::Interrupted) => continue,
                Err(ReadlineError::Eof) => break,
                Err(err) => {
                    eprintln!("Error reading input: {err}");
                    break;
                }
            }
        }

        if let Some(path) = &history_path {
            let _ = editor.save_history(path);
        }
    }

    /// Runs one unit of source through the scan/parse/resolve/interpret
    /// pipeline, stopping early at whichever stage first reports an error.
    /// This is the entry point integration tests drive directly, in place
    /// of spawning the `rocks` binary, to assert on a program's behavior.
    pub fn run(&mut self, source: &str) {
        let mut scanner = Scanner::new(source);
        let tokens = scanner.scan_tokens();

        if error::did_error() {
            return;
        }

        let mut parser = Parser::new(tokens);
        let statements = parser.parse();

        if error::did_error() {
            return;
        }

        let mut resolver = Resolver::new(&mut self.interpreter);
        resolver.resolve(&statements);

        if error::did_error() {
            return;
        }

        self.interpreter.interpret(&statements);
    }
}

impl Default for Lox {
    fn default() -> Self {
        Self::new()
    }
}

fn history_path() -> Option<PathBuf> {
    home::home_dir().map(|home| home.join(".lox_history"))
}
