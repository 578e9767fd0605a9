//! Bytecode interpreter.
//!
//! [`Interpreter::load`] checks a program against its literal pool and
//! allocates the variable file from the heap; [`Interpreter::run`] executes
//! it until an `ExitVal`.
//!
//! # Slots
//!
//! Registers and declared variables share one flat index space of
//! `registers + variables` slots, declared by the leading `RegVarDecl`.
//! `VarDecl` may mark any slot in that range as a tracked variable. Every
//! slot starts out undefined.

mod runtime;
mod variables;
mod verify;


pub use runtime::{Completion, Interpreter};
pub use variables::SLOT_SIZE;
