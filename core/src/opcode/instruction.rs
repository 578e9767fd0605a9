//! Ember Instructions - Fixed 64-bit Format
//!
//! **ALL instructions are exactly 8 bytes**:
//! ```text
//! ┌──────────┬──────────┬──────────────────────────────┐
//! │   Tag    │ (unused) │ Operands (up to 6 bytes)     │
//! │ (8 bits) │ (8 bits) │ slot / offset / operand      │
//! └──────────┴──────────┴──────────────────────────────┘
//! ```
//!
//! `#[repr(C, u8)]` gives the enum a one-byte discriminant followed by a
//! `u16`-aligned payload, so the layout is stable and two-byte aligned.
//!
//! # Operands
//!
//! An assignment source is an [`Operand`], a closed sum type: an immediate
//! (simple value or small integer), a literal index into the string or
//! number region of the pool, or another slot of the variable file.
//!
//! # Jumps
//!
//! Jump offsets are signed and relative to the jump's own index:
//! `JumpIfTrue { offset: 2, .. }` at pc 5 continues at pc 7.

use core::fmt;

/// Index into the variable file.
pub type Slot = u16;

/// Index of a string or number literal in the pool.
pub type LiteralIndex = u16;

/// Signed jump distance in instructions.
pub type JumpOffset = i16;

/// Immediate values that need no pool entry.
#[repr(u8)]
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub enum Simple {
    Undefined = 0,
    False = 1,
    True = 2,
}

impl fmt::Debug for Simple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Simple::Undefined => write!(f, "undefined"),
            Simple::False => write!(f, "false"),
            Simple::True => write!(f, "true"),
        }
    }
}

/// Argument tag, used when an operand is built from a raw `(tag, value)` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArgType {
    Simple,
    SmallInt,
    Number,
    String,
    Variable,
}

/// Source of an assignment (exactly 4 bytes).
#[repr(C, u8)]
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operand {
    Simple(Simple) = 0,
    /// Immediate integer, no pool lookup.
    SmallInt(u8) = 1,
    /// Number literal index (counted from the pool's number index base).
    Number(LiteralIndex) = 2,
    /// String literal index.
    String(LiteralIndex) = 3,
    /// Copy of another slot.
    Variable(Slot) = 4,
}
static_assertions::assert_eq_size!(Operand, [u8; 4]);

impl Operand {
    pub const fn undefined() -> Self {
        Operand::Simple(Simple::Undefined)
    }

    pub const fn boolean(value: bool) -> Self {
        Operand::Simple(if value { Simple::True } else { Simple::False })
    }

    pub const fn small_int(value: u8) -> Self {
        Operand::SmallInt(value)
    }

    pub const fn number(index: LiteralIndex) -> Self {
        Operand::Number(index)
    }

    pub const fn string(index: LiteralIndex) -> Self {
        Operand::String(index)
    }

    pub const fn variable(slot: Slot) -> Self {
        Operand::Variable(slot)
    }

    /// Build an operand from an untyped tag/value pair, checking that the
    /// value fits the tag.
    pub fn tagged(tag: ArgType, value: u16) -> Result<Self, OpcodeError> {
        Ok(match tag {
            ArgType::Simple => match value {
                0 => Operand::Simple(Simple::Undefined),
                1 => Operand::Simple(Simple::False),
                2 => Operand::Simple(Simple::True),
                _ => return Err(OpcodeError::InvalidSimple(value)),
            },
            ArgType::SmallInt => {
                let value = u8::try_from(value).map_err(|_| OpcodeError::SmallIntOutOfRange(value))?;
                Operand::SmallInt(value)
            }
            ArgType::Number => Operand::Number(value),
            ArgType::String => Operand::String(value),
            ArgType::Variable => Operand::Variable(value),
        })
    }

    pub const fn arg_type(&self) -> ArgType {
        match self {
            Operand::Simple(_) => ArgType::Simple,
            Operand::SmallInt(_) => ArgType::SmallInt,
            Operand::Number(_) => ArgType::Number,
            Operand::String(_) => ArgType::String,
            Operand::Variable(_) => ArgType::Variable,
        }
    }
}

impl fmt::Debug for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Simple(simple) => write!(f, "{:?}", simple),
            Operand::SmallInt(value) => write!(f, "#{}", value),
            Operand::Number(index) => write!(f, "num[{}]", index),
            Operand::String(index) => write!(f, "str[{}]", index),
            Operand::Variable(slot) => write!(f, "%{}", slot),
        }
    }
}

/// A single instruction (exactly 8 bytes).
#[repr(C, u8)]
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub enum Instruction {
    /// No operation.
    Nop = 0x00,

    /// Declare the variable file: `registers + variables` slots.
    /// Must be the first instruction and must not appear again.
    RegVarDecl { registers: u16, variables: u16 } = 0x01,

    /// Mark a slot as a declared variable and reset it to undefined.
    VarDecl(Slot) = 0x02,

    /// `target = value`
    Assign { target: Slot, value: Operand } = 0x03,

    // ========================================================================
    // Control Flow (0x10 - 0x1F)
    // ========================================================================
    /// Jump by `offset` if `slot` is truthy.
    JumpIfTrue { slot: Slot, offset: JumpOffset } = 0x10,

    /// Jump by `offset` if `slot` is falsy.
    JumpIfFalse { slot: Slot, offset: JumpOffset } = 0x11,

    /// Unconditional jump by `offset`.
    Jump(JumpOffset) = 0x12,

    /// Terminate, yielding the value of `slot`.
    /// Its truthiness is the program's success flag.
    ExitVal(Slot) = 0x20,
}
static_assertions::assert_eq_size!(Instruction, [u8; 8]);

/// Instruction kind without operands.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Opcode {
    Nop = 0x00,
    RegVarDecl = 0x01,
    VarDecl = 0x02,
    Assign = 0x03,
    JumpIfTrue = 0x10,
    JumpIfFalse = 0x11,
    Jump = 0x12,
    ExitVal = 0x20,
}

impl Instruction {
    /// Size of an instruction in bytes
    pub const SIZE: usize = 8;

    pub const fn opcode(&self) -> Opcode {
        match self {
            Self::Nop => Opcode::Nop,
            Self::RegVarDecl { .. } => Opcode::RegVarDecl,
            Self::VarDecl(_) => Opcode::VarDecl,
            Self::Assign { .. } => Opcode::Assign,
            Self::JumpIfTrue { .. } => Opcode::JumpIfTrue,
            Self::JumpIfFalse { .. } => Opcode::JumpIfFalse,
            Self::Jump(_) => Opcode::Jump,
            Self::ExitVal(_) => Opcode::ExitVal,
        }
    }

    /// Relative offset of a jump instruction.
    pub const fn jump_offset(&self) -> Option<JumpOffset> {
        match self {
            Self::JumpIfTrue { offset, .. } | Self::JumpIfFalse { offset, .. } | Self::Jump(offset) => {
                Some(*offset)
            }
            _ => None,
        }
    }

    /// Check if this is a control flow instruction
    pub const fn is_control_flow(&self) -> bool {
        matches!(
            self,
            Self::JumpIfTrue { .. } | Self::JumpIfFalse { .. } | Self::Jump(_) | Self::ExitVal(_)
        )
    }
}

impl fmt::Debug for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Nop => write!(f, "Nop"),
            Self::RegVarDecl {
                registers,
                variables,
            } => write!(f, "RegVarDecl({}, {})", registers, variables),
            Self::VarDecl(slot) => write!(f, "VarDecl(%{})", slot),
            Self::Assign { target, value } => write!(f, "Assign(%{}, {:?})", target, value),
            Self::JumpIfTrue { slot, offset } => write!(f, "{:12} %{}, {:+}", "JumpIfTrue", slot, offset),
            Self::JumpIfFalse { slot, offset } => {
                write!(f, "{:12} %{}, {:+}", "JumpIfFalse", slot, offset)
            }
            Self::Jump(offset) => write!(f, "Jump({:+})", offset),
            Self::ExitVal(slot) => write!(f, "ExitVal(%{})", slot),
        }
    }
}

// ============================================================================
// Errors
// ============================================================================

/// Shape error caught while constructing an instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpcodeError {
    /// Jump distance does not fit the signed 16-bit offset.
    JumpTooFar(isize),
    /// Small integer immediates are a single byte.
    SmallIntOutOfRange(u16),
    /// Not one of the simple-value codes.
    InvalidSimple(u16),
}

impl fmt::Display for OpcodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OpcodeError::JumpTooFar(offset) => write!(
                f,
                "Jump offset {} does not fit in {}..={}",
                offset,
                JumpOffset::MIN,
                JumpOffset::MAX
            ),
            OpcodeError::SmallIntOutOfRange(value) => {
                write!(f, "Small integer {} does not fit in a byte", value)
            }
            OpcodeError::InvalidSimple(value) => write!(f, "Invalid simple value code {}", value),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for OpcodeError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_instruction_size() {
        assert_eq!(core::mem::size_of::<Instruction>(), 8);
        assert_eq!(Instruction::SIZE, 8);
        assert_eq!(core::mem::size_of::<Operand>(), 4);
    }

    #[test]
    fn test_instruction_alignment() {
        assert_eq!(core::mem::align_of::<Instruction>(), 2);
    }

    #[test]
    fn test_tagged_operands() {
        assert_eq!(Operand::tagged(ArgType::String, 1), Ok(Operand::String(1)));
        assert_eq!(Operand::tagged(ArgType::SmallInt, 253), Ok(Operand::SmallInt(253)));
        assert_eq!(
            Operand::tagged(ArgType::SmallInt, 256),
            Err(OpcodeError::SmallIntOutOfRange(256))
        );
        assert_eq!(Operand::tagged(ArgType::Simple, 2), Ok(Operand::boolean(true)));
        assert_eq!(Operand::tagged(ArgType::Simple, 3), Err(OpcodeError::InvalidSimple(3)));
        assert_eq!(Operand::variable(4).arg_type(), ArgType::Variable);
    }

    #[test]
    fn test_control_flow() {
        assert!(Instruction::Jump(3).is_control_flow());
        assert!(Instruction::ExitVal(0).is_control_flow());
        assert!(!Instruction::VarDecl(0).is_control_flow());
        assert_eq!(Instruction::JumpIfFalse { slot: 1, offset: -2 }.jump_offset(), Some(-2));
        assert_eq!(Instruction::ExitVal(0).jump_offset(), None);
    }

    #[test]
    fn test_debug_formatting() {
        let assign = Instruction::Assign {
            target: 1,
            value: Operand::variable(0),
        };
        assert_eq!(format!("{:?}", assign), "Assign(%1, %0)");
        assert_eq!(format!("{:?}", Instruction::Jump(5)), "Jump(+5)");
        assert_eq!(
            format!("{:?}", Instruction::RegVarDecl { registers: 255, variables: 255 }),
            "RegVarDecl(255, 255)"
        );
        assert_eq!(format!("{:?}", Operand::number(2)), "num[2]");
        assert_eq!(format!("{:?}", Operand::undefined()), "undefined");
    }
}
