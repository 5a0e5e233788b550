//! Driver tying the phases together: lexing, parsing and evaluation of one source file, plus the
//! project scaffolder behind `langmaker new`.

pub mod scaffold;

use langmaker_eval::{Interpreter, RuntimeError};
use langmaker_parser::ast::Program;
use langmaker_parser::lexer::{tokenize, Lexeme};
use langmaker_parser::{LexError, ParseError};
use langmaker_spec::{Source, SpecError, Specification};
use std::fmt;
use std::fs;
use std::io::{self, Write};
use std::path::Path;

/// Any error that stops a program from running.
#[derive(Debug, thiserror::Error, miette::Diagnostic)]
pub enum Error {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Spec(#[from] SpecError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Lex(#[from] LexError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Runtime(#[from] RuntimeError),

    #[error("only {extension} files can be run")]
    #[diagnostic(code(langmaker::wrong_extension))]
    WrongExtension { path: String, extension: String },

    #[error("failed to read {path}: {source}")]
    #[diagnostic(code(langmaker::io))]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },
}

pub type Result<T> = std::result::Result<T, Error>;

/// Output of the front end: the token stream and the tree parsed from it.
#[derive(Debug)]
pub struct Compiled {
    pub tokens: Vec<Lexeme>,
    pub program: Program,
}

/// Normalizes, lexes and parses `source`.
pub fn compile(source: &str, spec: &Specification) -> Result<Compiled> {
    let source = Source::new(source, spec);
    let tokens = tokenize(&source, spec)?;
    let program = langmaker_parser::parse(&tokens, spec)?;
    tracing::debug!(
        tokens = tokens.len(),
        statements = program.stmts.len(),
        "compiled source"
    );
    Ok(Compiled { tokens, program })
}

/// Runs `source` to completion, writing `PRINT` output to `out`.
pub fn run<W: Write>(source: &str, spec: &Specification, out: W) -> Result<()> {
    let Compiled { program, .. } = compile(source, spec)?;
    Interpreter::new(spec, out).run(&program)?;
    Ok(())
}

/// Reads a source file, refusing files without the configured extension.
pub fn read_source(path: &Path, spec: &Specification) -> Result<String> {
    if !spec.accepts_file(path) {
        return Err(Error::WrongExtension {
            path: path.display().to_string(),
            extension: spec.file_extension.clone(),
        });
    }
    fs::read_to_string(path).map_err(|source| Error::Io {
        path: path.display().to_string(),
        source,
    })
}

/// Like [`run`] but reads the program from `path`.
pub fn run_file<W: Write>(path: &Path, spec: &Specification, out: W) -> Result<()> {
    let source = read_source(path, spec)?;
    tracing::debug!(path = %path.display(), "running file");
    run(&source, spec, out)
}

/// Renders an error the way the command line reports it: `ERROR: ` followed by the upper-cased
/// message.
pub fn error_message(err: &impl fmt::Display) -> String {
    format!("ERROR: {}", err.to_string().to_uppercase())
}
