use super::{
    variables::{Stored, VariableFile},
    verify,
};
use crate::{
    errors::FatalError,
    mem::Heap,
    opcode::{Instruction, JumpOffset, Operand, Simple, Slot},
    serializer::LiteralPool,
    value::Value,
};

/// How a program terminated.
///
/// `success` is the truthiness of `value`: a program reports failure by
/// exiting with a falsy value, which is a normal outcome, not a fault.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Completion<'p> {
    pub success: bool,
    pub value: Value<'p>,
}

/// One execution of a program.
///
/// The variable file lives in `heap` for as long as the interpreter does and
/// is released when it is dropped.
pub struct Interpreter<'h, 'a, 'p> {
    heap: &'h mut Heap<'a>,
    program: &'p [Instruction],
    pool: &'p LiteralPool<'p>,
    vars: VariableFile,
    pc: usize,
}

impl<'h, 'a, 'p> Interpreter<'h, 'a, 'p> {
    /// Check `program` against `pool` and allocate its variable file.
    pub fn load(
        heap: &'h mut Heap<'a>,
        program: &'p [Instruction],
        pool: &'p LiteralPool<'p>,
    ) -> Result<Self, FatalError> {
        let capacity = verify::declared_capacity(program)?;
        verify::verify(program, pool, capacity)?;
        let vars = VariableFile::allocate(heap, capacity)?;

        tracing::debug!(
            instructions = program.len(),
            slots = capacity,
            literals = pool.len(),
            "program loaded"
        );

        Ok(Interpreter {
            heap,
            program,
            pool,
            vars,
            pc: 0,
        })
    }

    /// Execute until an `ExitVal`.
    ///
    /// There is no step limit: a program that never exits never returns.
    pub fn run(&mut self) -> Result<Completion<'p>, FatalError> {
        loop {
            if let Some(completion) = self.step()? {
                tracing::debug!(
                    pc = self.pc,
                    success = completion.success,
                    value = ?completion.value,
                    "program exited"
                );
                return Ok(completion);
            }
        }
    }

    /// Execute the instruction at the program counter.
    ///
    /// Returns the completion once an `ExitVal` executes; the program
    /// counter then stays on it.
    pub fn step(&mut self) -> Result<Option<Completion<'p>>, FatalError> {
        let instr = *self
            .program
            .get(self.pc)
            .ok_or(FatalError::FellOffEnd {
                len: self.program.len(),
            })?;
        tracing::trace!(pc = self.pc, ?instr, "step");

        use Instruction::*;
        match instr {
            Nop | RegVarDecl { .. } => self.pc += 1,
            VarDecl(slot) => {
                self.vars
                    .declare(self.heap, slot)
                    .ok_or_else(|| self.slot_fault(slot))?;
                self.pc += 1;
            }
            Assign { target, value } => {
                let stored = self.operand(value)?;
                self.vars
                    .write(self.heap, target, stored)
                    .ok_or_else(|| self.slot_fault(target))?;
                self.pc += 1;
            }
            JumpIfTrue { slot, offset } => {
                if self.value(slot)?.is_truthy() {
                    self.jump(offset)?;
                } else {
                    self.pc += 1;
                }
            }
            JumpIfFalse { slot, offset } => {
                if self.value(slot)?.is_truthy() {
                    self.pc += 1;
                } else {
                    self.jump(offset)?;
                }
            }
            Jump(offset) => self.jump(offset)?,
            ExitVal(slot) => {
                let value = self.value(slot)?;
                return Ok(Some(Completion {
                    success: value.is_truthy(),
                    value,
                }));
            }
        }
        Ok(None)
    }

    pub fn pc(&self) -> usize {
        self.pc
    }

    /// Number of slots in the variable file.
    pub fn capacity(&self) -> usize {
        self.vars.capacity()
    }

    /// Current value of `slot`.
    pub fn value(&self, slot: Slot) -> Result<Value<'p>, FatalError> {
        let stored = self
            .vars
            .read(&*self.heap, slot)
            .ok_or_else(|| self.slot_fault(slot))?;
        Ok(match stored {
            Stored::Undefined => Value::Undefined,
            Stored::Boolean(b) => Value::Boolean(b),
            Stored::Number(n) => Value::Number(n),
            Stored::String(index) => {
                Value::String(self.pool.string(index).map_err(|e| e.at(self.pc))?)
            }
        })
    }

    /// Whether `slot` was marked by a `VarDecl`.
    pub fn is_declared(&self, slot: Slot) -> Result<bool, FatalError> {
        self.vars
            .is_declared(&*self.heap, slot)
            .ok_or_else(|| self.slot_fault(slot))
    }

    fn operand(&self, operand: Operand) -> Result<Stored, FatalError> {
        Ok(match operand {
            Operand::Simple(Simple::Undefined) => Stored::Undefined,
            Operand::Simple(Simple::False) => Stored::Boolean(false),
            Operand::Simple(Simple::True) => Stored::Boolean(true),
            Operand::SmallInt(value) => Stored::Number(value.into()),
            Operand::Number(index) => {
                Stored::Number(self.pool.number(index).map_err(|e| e.at(self.pc))?)
            }
            Operand::String(index) => {
                // Resolve now so a bad index faults at the assignment.
                self.pool.string(index).map_err(|e| e.at(self.pc))?;
                Stored::String(index)
            }
            Operand::Variable(source) => self
                .vars
                .read(&*self.heap, source)
                .ok_or_else(|| self.slot_fault(source))?,
        })
    }

    fn jump(&mut self, offset: JumpOffset) -> Result<(), FatalError> {
        let target = self.pc as isize + offset as isize;
        if !(0..self.program.len() as isize).contains(&target) {
            return Err(FatalError::JumpOutOfRange {
                pc: self.pc,
                offset,
                len: self.program.len(),
            });
        }
        self.pc = target as usize;
        Ok(())
    }

    fn slot_fault(&self, slot: Slot) -> FatalError {
        FatalError::SlotOutOfRange {
            pc: self.pc,
            slot,
            capacity: self.vars.capacity(),
        }
    }
}

impl Drop for Interpreter<'_, '_, '_> {
    fn drop(&mut self) {
        self.vars.release(self.heap);
    }
}
