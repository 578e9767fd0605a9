//! The Ember execution engine.

use bumpalo::Bump;

use super::EngineOptions;
use crate::{
    errors::FatalError,
    interpreter::{Completion, Interpreter},
    mem::{Heap, HeapStats},
    opcode::Instruction,
    port::Port,
    serializer::{LiteralPool, Serializer},
};

/// An isolated engine instance.
///
/// The engine is the explicit context every entry point goes through: it
/// owns the heap region and the options, so several engines can coexist in
/// one process without sharing state. Programs run one at a time.
///
/// # Lifetimes
///
/// - `'arena`: Lifetime of the host arena the heap region and literal pools
///   are carved from.
///
/// # Example
///
/// ```
/// use bumpalo::Bump;
/// use ember_core::api::{Engine, EngineOptions};
/// use ember_core::opcode::{build::*, Operand};
///
/// let arena = Bump::new();
/// let mut engine = Engine::new(&arena, EngineOptions::default()).unwrap();
///
/// let mut serializer = engine.serializer();
/// let offset = serializer.dump_strings(&["ok"]).unwrap();
/// serializer.dump_nums(&[], offset, 1).unwrap();
/// let pool = serializer.finish();
///
/// let program = [reg_var_decl(1, 0), assignment(0, Operand::string(0)), exitval(0)];
/// let completion = engine.execute(&program, &pool).unwrap();
/// assert!(completion.success);
/// ```
pub struct Engine<'arena> {
    arena: &'arena Bump,
    heap: Heap<'arena>,
    options: EngineOptions,
}

impl<'arena> Engine<'arena> {
    /// Create an engine, establishing its heap region in `arena`.
    pub fn new(arena: &'arena Bump, options: EngineOptions) -> Result<Self, FatalError> {
        let heap = Heap::init(arena, options.heap_capacity)?;
        Ok(Self {
            arena,
            heap,
            options,
        })
    }

    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    /// A serializer writing into the engine's arena.
    pub fn serializer(&self) -> Serializer<'arena> {
        Serializer::new_in(self.arena)
    }

    /// Load `program` without running it.
    ///
    /// The returned interpreter borrows the heap; drop it before loading the
    /// next program.
    pub fn load<'e, 'p>(
        &'e mut self,
        program: &'p [Instruction],
        pool: &'p LiteralPool<'p>,
    ) -> Result<Interpreter<'e, 'arena, 'p>, FatalError> {
        Interpreter::load(&mut self.heap, program, pool)
    }

    /// Reset the heap, then load and run `program` to completion.
    pub fn execute<'p>(
        &mut self,
        program: &'p [Instruction],
        pool: &'p LiteralPool<'p>,
    ) -> Result<Completion<'p>, FatalError> {
        self.reset();
        let mut interpreter = self.load(program, pool)?;
        interpreter.run()
    }

    /// Like [`execute`](Engine::execute), but hands any fault to `port`,
    /// which does not return.
    pub fn execute_or_abort<'p>(
        &mut self,
        port: &impl Port,
        program: &'p [Instruction],
        pool: &'p LiteralPool<'p>,
    ) -> Completion<'p> {
        match self.execute(program, pool) {
            Ok(completion) => completion,
            Err(error) => port.fatal(&error),
        }
    }

    /// Reclaim the whole heap region.
    pub fn reset(&mut self) {
        self.heap.reset();
    }

    pub fn heap_stats(&self) -> HeapStats {
        self.heap.stats()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        errors::FatalCause,
        opcode::{Operand, build::*},
        port::PanicPort,
        value::Value,
    };

    fn literal_pool<'a>(engine: &Engine<'a>) -> LiteralPool<'a> {
        let mut serializer = engine.serializer();
        let offset = serializer.dump_strings(&["a", "b"]).unwrap();
        serializer.dump_nums(&[2.0], offset, 2).unwrap();
        serializer.finish()
    }

    #[test]
    fn test_execute_is_repeatable() {
        let arena = Bump::new();
        let mut engine = Engine::new(&arena, EngineOptions::default()).unwrap();
        let pool = literal_pool(&engine);
        let program = [
            reg_var_decl(1, 1),
            assignment(1, Operand::number(2)),
            exitval(1),
        ];

        let first = engine.execute(&program, &pool).unwrap();
        let second = engine.execute(&program, &pool).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.value, Value::Number(2.0));
        assert_eq!(engine.heap_stats().resets, 2);
    }

    #[test]
    fn test_engine_region_limit() {
        let arena = Bump::new();
        arena.set_allocation_limit(Some(1024));
        let err = Engine::new(&arena, EngineOptions::default()).err().unwrap();
        assert_eq!(err.cause(), FatalCause::SyscallFailure);
    }

    #[test]
    #[should_panic(expected = "internal assertion failure")]
    fn test_execute_or_abort_escalates() {
        let arena = Bump::new();
        let mut engine = Engine::new(&arena, EngineOptions::default()).unwrap();
        let pool = literal_pool(&engine);
        let program = [reg_var_decl(1, 0), assignment(0, Operand::number(9)), exitval(0)];

        engine.execute_or_abort(&PanicPort, &program, &pool);
    }

    #[test]
    fn test_execute_or_abort_returns_completion() {
        let arena = Bump::new();
        let mut engine = Engine::new(&arena, EngineOptions::default()).unwrap();
        let pool = literal_pool(&engine);
        let program = [reg_var_decl(1, 0), assignment(0, Operand::string(0)), exitval(0)];

        let completion = engine.execute_or_abort(&PanicPort, &program, &pool);
        assert_eq!(completion.value, Value::String("a"));
    }
}
