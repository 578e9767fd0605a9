//! Ember - a compact bytecode interpreter for memory-constrained devices
//!
//! # Overview
//!
//! Ember runs pre-built opcode arrays against a literal pool of constant
//! strings and numbers. All runtime slot storage is drawn from one bounded
//! heap region, so a program either fits the memory budget it was given or
//! stops with an out-of-memory fault.
//!
//! # Quick Start
//!
//! ```
//! use bumpalo::Bump;
//! use ember::{EngineOptions, Operand, build::*};
//!
//! let arena = Bump::new();
//! let program = arena.alloc([
//!     reg_var_decl(2, 0),
//!     assignment(0, Operand::number(1)),
//!     is_false_jmp(0, 2).unwrap(),
//!     assignment(1, Operand::string(0)),
//!     exitval(1),
//! ]);
//!
//! let completion = ember::execute(&arena, EngineOptions::default(), &["done"], &[2.0], program)
//!     .unwrap();
//! assert!(completion.success);
//! assert_eq!(completion.value.as_str(), Some("done"));
//! ```
//!
//! # Engine
//!
//! [`ember::execute`](execute) is a one-shot helper. Hosts that run many
//! programs create an [`Engine`] once and reuse its heap:
//!
//! ```
//! use bumpalo::Bump;
//! use ember::{Engine, EngineOptions, Operand, build::*};
//!
//! let arena = Bump::new();
//! let mut engine = Engine::new(&arena, EngineOptions { heap_capacity: 4096 }).unwrap();
//! let pool = engine.serializer().finish();
//!
//! let program = [reg_var_decl(1, 0), assignment(0, Operand::boolean(true)), exitval(0)];
//! for _ in 0..3 {
//!     assert!(engine.execute(&program, &pool).unwrap().success);
//! }
//! ```

mod error;

use bumpalo::Bump;

pub use ember_core::{
    Completion, Engine, EngineOptions, FatalCause, FatalError, Interpreter, Value,
    api::DEFAULT_HEAP_CAPACITY,
    mem::HeapStats,
    opcode::{Disassembly, Instruction, Operand, Simple, build},
    port::{PanicPort, Port, ProcessPort},
    serializer::{LiteralPool, PoolLayout, Serializer},
};
pub use error::Error;

/// Serialize `strings` and `numbers` into a literal pool and run `program`
/// on a fresh engine.
///
/// String literals take indices `0..strings.len()`; number literals follow
/// directly, starting at `strings.len()`.
pub fn execute<'a>(
    arena: &'a Bump,
    options: EngineOptions,
    strings: &[&str],
    numbers: &[f64],
    program: &'a [Instruction],
) -> Result<Completion<'a>, Error> {
    let mut engine = Engine::new(arena, options)?;
    let pool = arena.alloc(literal_pool(&engine, strings, numbers)?);
    Ok(engine.execute(program, pool)?)
}

/// Build a pool whose number indices start right after the strings.
pub fn literal_pool<'a>(
    engine: &Engine<'a>,
    strings: &[&str],
    numbers: &[f64],
) -> Result<LiteralPool<'a>, Error> {
    let index_base = u16::try_from(strings.len()).map_err(|_| FatalError::MalformedPool {
        reason: "too many string literals",
    })?;
    let mut serializer = engine.serializer();
    let boundary = serializer.dump_strings(strings)?;
    serializer.dump_nums(numbers, boundary, index_base)?;
    Ok(serializer.finish())
}
