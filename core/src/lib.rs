#![cfg_attr(all(not(feature = "std"), not(test)), no_std)]

//! Execution core of the Ember embedded scripting engine.
//!
//! The crate is `no_std` + `alloc`. Enable the `std` feature for
//! `std::error::Error` impls and the process-exiting [`port::ProcessPort`].

extern crate alloc;

// Re-export for convenience so other modules don't need alloc:: prefix
#[allow(unused_imports)]
pub(crate) use alloc::{format, string::String, string::ToString, vec, vec::Vec};

pub mod api;
pub mod errors;
pub mod interpreter;
pub mod mem;
pub mod opcode;
pub mod port;
pub mod serializer;
pub mod value;

pub use api::{Engine, EngineOptions};
pub use errors::{FatalCause, FatalError};
pub use interpreter::{Completion, Interpreter};
pub use value::Value;
