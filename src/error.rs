//! Host-facing error type.

use ember_core::{FatalCause, FatalError, opcode::OpcodeError};
use miette::Diagnostic;
use thiserror::Error;

/// Anything that can go wrong when a host drives the engine.
#[derive(Debug, Error, Diagnostic)]
pub enum Error {
    #[error("{0}")]
    #[diagnostic(code(ember::fatal), help("the engine stopped; its state was discarded"))]
    Fatal(#[from] FatalError),

    #[error("{0}")]
    #[diagnostic(code(ember::opcode))]
    Opcode(#[from] OpcodeError),
}

impl Error {
    /// Cause reported to the fatal-error sink.
    ///
    /// Malformed instructions are rejected before anything runs, which is
    /// an assertion failure from the engine's point of view.
    pub fn cause(&self) -> FatalCause {
        match self {
            Error::Fatal(error) => error.cause(),
            Error::Opcode(_) => FatalCause::AssertionFailure,
        }
    }

    pub fn exit_code(&self) -> i32 {
        self.cause().exit_code()
    }
}
