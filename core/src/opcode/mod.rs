//! Instruction encoding.
//!
//! A program is a slice of fixed-width [`Instruction`]s produced by a trusted
//! front end with the constructors in [`build`]. Instructions carry no
//! pointers: literals are referenced by index into the literal pool and
//! storage by slot index into the variable file.

pub mod build;
mod disassembly;
mod instruction;

pub use disassembly::Disassembly;
pub use instruction::{
    ArgType, Instruction, JumpOffset, LiteralIndex, Opcode, OpcodeError, Operand, Simple, Slot,
};
