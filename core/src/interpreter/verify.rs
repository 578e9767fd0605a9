//! Load-time program checks.
//!
//! Programs come from a trusted producer, but as untyped data: every slot,
//! literal and jump target is checked once here so that a malformed stream
//! is rejected before anything executes.

use crate::{
    errors::{FatalError, LiteralKind},
    opcode::{Instruction, JumpOffset, Operand, Slot},
    serializer::LiteralPool,
};

/// Slot capacity declared by the leading instruction.
pub(crate) fn declared_capacity(program: &[Instruction]) -> Result<usize, FatalError> {
    match program.first() {
        None => Err(FatalError::EmptyProgram),
        Some(Instruction::RegVarDecl {
            registers,
            variables,
        }) => Ok(*registers as usize + *variables as usize),
        Some(other) => Err(FatalError::MissingDeclaration {
            found: other.opcode(),
        }),
    }
}

pub(crate) fn verify(
    program: &[Instruction],
    pool: &LiteralPool<'_>,
    capacity: usize,
) -> Result<(), FatalError> {
    let check_slot = |pc: usize, slot: Slot| {
        if (slot as usize) < capacity {
            Ok(())
        } else {
            Err(FatalError::SlotOutOfRange { pc, slot, capacity })
        }
    };
    let check_jump = |pc: usize, offset: JumpOffset| {
        let target = pc as isize + offset as isize;
        if (0..program.len() as isize).contains(&target) {
            Ok(())
        } else {
            Err(FatalError::JumpOutOfRange {
                pc,
                offset,
                len: program.len(),
            })
        }
    };

    for (pc, instr) in program.iter().enumerate() {
        match *instr {
            Instruction::Nop => {}
            Instruction::RegVarDecl { .. } => {
                if pc != 0 {
                    return Err(FatalError::RedeclaredCapacity { pc });
                }
            }
            Instruction::VarDecl(slot) | Instruction::ExitVal(slot) => check_slot(pc, slot)?,
            Instruction::Assign { target, value } => {
                check_slot(pc, target)?;
                match value {
                    Operand::Simple(_) | Operand::SmallInt(_) => {}
                    Operand::Variable(source) => check_slot(pc, source)?,
                    Operand::String(index) if !pool.contains_string(index) => {
                        return Err(FatalError::BadLiteral {
                            pc,
                            kind: LiteralKind::String,
                            index,
                        });
                    }
                    Operand::Number(index) if !pool.contains_number(index) => {
                        return Err(FatalError::BadLiteral {
                            pc,
                            kind: LiteralKind::Number,
                            index,
                        });
                    }
                    Operand::String(_) | Operand::Number(_) => {}
                }
            }
            Instruction::JumpIfTrue { slot, offset } | Instruction::JumpIfFalse { slot, offset } => {
                check_slot(pc, slot)?;
                check_jump(pc, offset)?;
            }
            Instruction::Jump(offset) => check_jump(pc, offset)?,
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::opcode::{Opcode, build::*};

    #[test]
    fn test_declared_capacity() {
        assert_eq!(declared_capacity(&[]), Err(FatalError::EmptyProgram));
        assert_eq!(declared_capacity(&[reg_var_decl(255, 255)]), Ok(510));
        assert_eq!(
            declared_capacity(&[exitval(0)]),
            Err(FatalError::MissingDeclaration {
                found: Opcode::ExitVal
            })
        );
    }

    #[test]
    fn test_rejects_second_declaration() {
        let program = [reg_var_decl(1, 0), reg_var_decl(1, 0), exitval(0)];
        assert_eq!(
            verify(&program, &LiteralPool::empty(), 1),
            Err(FatalError::RedeclaredCapacity { pc: 1 })
        );
    }

    #[test]
    fn test_jump_bounds() {
        let pool = LiteralPool::empty();

        // Landing on the last instruction and jumping to self are fine.
        let program = [reg_var_decl(1, 0), jmp(1).unwrap(), jmp(0).unwrap()];
        assert_eq!(verify(&program, &pool, 1), Ok(()));

        let program = [reg_var_decl(1, 0), jmp_up(2).unwrap(), exitval(0)];
        assert_eq!(
            verify(&program, &pool, 1),
            Err(FatalError::JumpOutOfRange {
                pc: 1,
                offset: -2,
                len: 3
            })
        );

        let program = [reg_var_decl(1, 0), is_false_jmp(0, 2).unwrap(), exitval(0)];
        assert!(matches!(
            verify(&program, &pool, 1),
            Err(FatalError::JumpOutOfRange { pc: 1, .. })
        ));
    }

    #[test]
    fn test_variable_source_is_checked() {
        let program = [
            reg_var_decl(2, 0),
            assignment(0, Operand::variable(2)),
            exitval(0),
        ];
        assert_eq!(
            verify(&program, &LiteralPool::empty(), 2),
            Err(FatalError::SlotOutOfRange {
                pc: 1,
                slot: 2,
                capacity: 2
            })
        );
    }
}
