//! Instruction constructors.
//!
//! One function per instruction kind. Constructors check the shape of their
//! operands (a jump distance must fit the offset width); they do not know the
//! program they will end up in, so slot and literal bounds are checked when
//! the program is loaded.
//!
//! ```
//! use ember_core::opcode::{build::*, Operand};
//!
//! let program = [
//!     reg_var_decl(1, 1),
//!     var_decl(1),
//!     assignment(1, Operand::small_int(7)),
//!     exitval(1),
//! ];
//! assert_eq!(program.len(), 4);
//! ```

use super::{Instruction, JumpOffset, OpcodeError, Operand, Slot};

pub const fn nop() -> Instruction {
    Instruction::Nop
}

/// Declare a variable file of `registers + variables` slots.
pub const fn reg_var_decl(registers: u16, variables: u16) -> Instruction {
    Instruction::RegVarDecl {
        registers,
        variables,
    }
}

pub const fn var_decl(slot: Slot) -> Instruction {
    Instruction::VarDecl(slot)
}

pub const fn assignment(target: Slot, value: Operand) -> Instruction {
    Instruction::Assign { target, value }
}

/// Jump by `offset` instructions when `slot` is truthy.
pub fn is_true_jmp(slot: Slot, offset: isize) -> Result<Instruction, OpcodeError> {
    Ok(Instruction::JumpIfTrue {
        slot,
        offset: jump_offset(offset)?,
    })
}

/// Jump by `offset` instructions when `slot` is falsy.
pub fn is_false_jmp(slot: Slot, offset: isize) -> Result<Instruction, OpcodeError> {
    Ok(Instruction::JumpIfFalse {
        slot,
        offset: jump_offset(offset)?,
    })
}

pub fn jmp(offset: isize) -> Result<Instruction, OpcodeError> {
    Ok(Instruction::Jump(jump_offset(offset)?))
}

/// Jump forward by `count` instructions.
pub fn jmp_down(count: usize) -> Result<Instruction, OpcodeError> {
    let offset = isize::try_from(count).map_err(|_| OpcodeError::JumpTooFar(isize::MAX))?;
    jmp(offset)
}

/// Jump backward by `count` instructions.
pub fn jmp_up(count: usize) -> Result<Instruction, OpcodeError> {
    let offset = isize::try_from(count).map_err(|_| OpcodeError::JumpTooFar(isize::MIN))?;
    jmp(-offset)
}

pub const fn exitval(slot: Slot) -> Instruction {
    Instruction::ExitVal(slot)
}

fn jump_offset(offset: isize) -> Result<JumpOffset, OpcodeError> {
    JumpOffset::try_from(offset).map_err(|_| OpcodeError::JumpTooFar(offset))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_jump_offsets() {
        assert_eq!(jmp_down(5), Ok(Instruction::Jump(5)));
        assert_eq!(jmp_up(3), Ok(Instruction::Jump(-3)));
        assert_eq!(jmp(0), Ok(Instruction::Jump(0)));
        assert_eq!(
            is_true_jmp(1, 2),
            Ok(Instruction::JumpIfTrue { slot: 1, offset: 2 })
        );
        assert_eq!(
            is_false_jmp(1, -32768),
            Ok(Instruction::JumpIfFalse {
                slot: 1,
                offset: -32768
            })
        );
    }

    #[test]
    fn test_jump_too_far() {
        assert_eq!(jmp(40_000), Err(OpcodeError::JumpTooFar(40_000)));
        assert_eq!(jmp_down(32_768), Err(OpcodeError::JumpTooFar(32_768)));
        assert_eq!(jmp_up(32_769), Err(OpcodeError::JumpTooFar(-32_769)));
        assert_eq!(is_true_jmp(0, -40_000), Err(OpcodeError::JumpTooFar(-40_000)));
    }

    #[test]
    fn test_plain_constructors() {
        assert_eq!(
            reg_var_decl(255, 255),
            Instruction::RegVarDecl {
                registers: 255,
                variables: 255
            }
        );
        assert_eq!(var_decl(3), Instruction::VarDecl(3));
        assert_eq!(
            assignment(0, Operand::string(1)),
            Instruction::Assign {
                target: 0,
                value: Operand::String(1)
            }
        );
        assert_eq!(exitval(1), Instruction::ExitVal(1));
        assert_eq!(nop(), Instruction::Nop);
    }
}
