//! Fatal engine conditions.
//!
//! Everything the core cannot continue from is a [`FatalError`]. Errors flow
//! back to the [`Engine`](crate::api::Engine) through `Result`, where the host
//! either inspects them or escalates them to a [`Port`](crate::port::Port).
//!
//! A program that exits with a falsy value is *not* an error: that is a
//! normal [`Completion`](crate::interpreter::Completion) with `success: false`.

use core::fmt;

use crate::opcode::{Opcode, Slot};

/// Cause category reported to the fatal-error sink.
///
/// The numeric codes are the process exit statuses used by the host port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum FatalCause {
    OutOfMemory = 10,
    SyscallFailure = 11,
    /// Part of the shared taxonomy; nothing in this core raises it.
    RefCountLimit = 12,
    AssertionFailure = 120,
}

impl FatalCause {
    pub const fn exit_code(self) -> i32 {
        self as i32
    }
}

impl fmt::Display for FatalCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FatalCause::OutOfMemory => write!(f, "out of memory"),
            FatalCause::SyscallFailure => write!(f, "allocation failure"),
            FatalCause::RefCountLimit => write!(f, "reference count limit"),
            FatalCause::AssertionFailure => write!(f, "internal assertion failure"),
        }
    }
}

/// Which literal region a reference points into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LiteralKind {
    String,
    Number,
}

impl fmt::Display for LiteralKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LiteralKind::String => write!(f, "string"),
            LiteralKind::Number => write!(f, "number"),
        }
    }
}

/// An unrecoverable engine condition.
#[derive(Debug, Clone, PartialEq)]
pub enum FatalError {
    // ------------------------------------------------------------------------
    // Allocator
    // ------------------------------------------------------------------------
    /// The heap region could not be carved out of the host arena.
    RegionUnavailable { capacity: usize },

    /// The region has no room left for a block of this size class.
    OutOfMemory { requested: usize, available: usize },

    /// The request is larger than the largest size class.
    BlockTooLarge { requested: usize, max: usize },

    /// The host arena refused to grow the literal pool buffer.
    ArenaExhausted { requested: usize },

    // ------------------------------------------------------------------------
    // Literal pool
    // ------------------------------------------------------------------------
    /// Literal data is out of order, truncated, or otherwise unusable.
    MalformedPool { reason: &'static str },

    /// `dump_nums` was not called at the current end of the pool.
    PoolOffsetMismatch { expected: usize, found: usize },

    /// A literal index does not resolve inside the pool.
    LiteralOutOfBounds { kind: LiteralKind, index: u16 },

    // ------------------------------------------------------------------------
    // Program structure
    // ------------------------------------------------------------------------
    EmptyProgram,

    /// The first instruction does not declare the slot capacity.
    MissingDeclaration { found: Opcode },

    /// A capacity declaration appears after the first instruction.
    RedeclaredCapacity { pc: usize },

    /// A slot index is not below the declared capacity.
    SlotOutOfRange { pc: usize, slot: Slot, capacity: usize },

    /// A literal reference inside an instruction does not resolve.
    BadLiteral { pc: usize, kind: LiteralKind, index: u16 },

    /// A jump lands outside the program.
    JumpOutOfRange { pc: usize, offset: i16, len: usize },

    /// Execution ran past the last instruction without exiting.
    FellOffEnd { len: usize },
}

impl FatalError {
    /// The category handed to the fatal-error sink.
    pub fn cause(&self) -> FatalCause {
        match self {
            FatalError::RegionUnavailable { .. } => FatalCause::SyscallFailure,
            FatalError::OutOfMemory { .. }
            | FatalError::BlockTooLarge { .. }
            | FatalError::ArenaExhausted { .. } => FatalCause::OutOfMemory,
            _ => FatalCause::AssertionFailure,
        }
    }

    /// Attach the program counter to a literal lookup failure.
    pub(crate) fn at(self, pc: usize) -> Self {
        match self {
            FatalError::LiteralOutOfBounds { kind, index } => {
                FatalError::BadLiteral { pc, kind, index }
            }
            other => other,
        }
    }
}

impl fmt::Display for FatalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FatalError::RegionUnavailable { capacity } => {
                write!(f, "Cannot establish a heap region of {} bytes", capacity)
            }
            FatalError::OutOfMemory {
                requested,
                available,
            } => write!(
                f,
                "Out of memory: requested {} bytes, {} bytes left in region",
                requested, available
            ),
            FatalError::BlockTooLarge { requested, max } => write!(
                f,
                "Block of {} bytes exceeds the largest size class ({} bytes)",
                requested, max
            ),
            FatalError::ArenaExhausted { requested } => write!(
                f,
                "Arena cannot supply {} more bytes for the literal pool",
                requested
            ),
            FatalError::MalformedPool { reason } => write!(f, "Malformed literal pool: {}", reason),
            FatalError::PoolOffsetMismatch { expected, found } => write!(
                f,
                "Number region must start at offset {}, got {}",
                expected, found
            ),
            FatalError::LiteralOutOfBounds { kind, index } => {
                write!(f, "No {} literal at index {}", kind, index)
            }
            FatalError::EmptyProgram => write!(f, "Program is empty"),
            FatalError::MissingDeclaration { found } => write!(
                f,
                "Program must start with a register/variable declaration, found {:?}",
                found
            ),
            FatalError::RedeclaredCapacity { pc } => {
                write!(f, "Capacity redeclared at instruction {}", pc)
            }
            FatalError::SlotOutOfRange {
                pc,
                slot,
                capacity,
            } => write!(
                f,
                "Slot {} at instruction {} is outside the variable file (capacity {})",
                slot, pc, capacity
            ),
            FatalError::BadLiteral { pc, kind, index } => write!(
                f,
                "Instruction {} references missing {} literal {}",
                pc, kind, index
            ),
            FatalError::JumpOutOfRange { pc, offset, len } => write!(
                f,
                "Jump at instruction {} by {:+} leaves the program (length {})",
                pc, offset, len
            ),
            FatalError::FellOffEnd { len } => write!(
                f,
                "Execution ran past the last instruction ({}) without exiting",
                len
            ),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for FatalError {}
