use core::fmt;

use bumpalo::{Bump, collections::Vec as BumpVec};

use super::{NUMBER_SIZE, STRING_PREFIX_SIZE};
use crate::{
    errors::{FatalError, LiteralKind},
    opcode::LiteralIndex,
    value::Number,
};

/// Metadata needed to address a pool buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PoolLayout {
    /// Number of string literals, indexed from 0.
    pub string_count: u16,
    /// Byte offset where the number region starts.
    pub boundary: usize,
    /// Number of number literals.
    pub number_count: usize,
    /// Literal index of the first number.
    pub number_index_base: LiteralIndex,
}

/// A frozen literal pool.
///
/// String lookups go through an offset table built once in the arena, so
/// both kinds of lookup are O(1).
#[derive(Clone, Copy)]
pub struct LiteralPool<'a> {
    bytes: &'a [u8],
    string_offsets: &'a [u32],
    layout: PoolLayout,
}

impl<'a> LiteralPool<'a> {
    /// A pool with no literals.
    pub fn empty() -> Self {
        LiteralPool {
            bytes: &[],
            string_offsets: &[],
            layout: PoolLayout::default(),
        }
    }

    /// Wrap a buffer written by [`Serializer`](super::Serializer).
    pub(super) fn from_parts(arena: &'a Bump, bytes: &'a [u8], layout: PoolLayout) -> Self {
        let mut offsets = BumpVec::with_capacity_in(layout.string_count as usize, arena);
        let mut cursor = 0;
        for _ in 0..layout.string_count {
            offsets.push(cursor as u32);
            cursor += STRING_PREFIX_SIZE + read_prefix(bytes, cursor);
        }
        debug_assert_eq!(cursor, layout.boundary);

        LiteralPool {
            bytes,
            string_offsets: offsets.into_bump_slice(),
            layout,
        }
    }

    /// Adopt a buffer prepared ahead of time, checking it against `layout`.
    pub fn from_bytes(
        arena: &'a Bump,
        bytes: &'a [u8],
        layout: PoolLayout,
    ) -> Result<Self, FatalError> {
        let malformed = |reason| FatalError::MalformedPool { reason };

        if layout.boundary > bytes.len() {
            return Err(malformed("boundary is past the end of the buffer"));
        }
        // Checked before the region size so a bogus count cannot overflow it.
        if layout.number_count > u16::MAX as usize + 1 - layout.number_index_base as usize {
            return Err(malformed("number literal indices overflow"));
        }
        if layout.number_count > 0 && layout.number_index_base < layout.string_count {
            return Err(malformed("number literal indices overlap the string literals"));
        }
        if bytes.len() - layout.boundary != layout.number_count * NUMBER_SIZE {
            return Err(malformed("number region size does not match the number count"));
        }

        let mut cursor = 0;
        for _ in 0..layout.string_count {
            if cursor + STRING_PREFIX_SIZE > layout.boundary {
                return Err(malformed("string region is truncated"));
            }
            let end = cursor + STRING_PREFIX_SIZE + read_prefix(bytes, cursor);
            if end > layout.boundary {
                return Err(malformed("string region is truncated"));
            }
            if core::str::from_utf8(&bytes[cursor + STRING_PREFIX_SIZE..end]).is_err() {
                return Err(malformed("string literal is not UTF-8"));
            }
            cursor = end;
        }
        if cursor != layout.boundary {
            return Err(malformed("string region does not end at the boundary"));
        }

        Ok(Self::from_parts(arena, bytes, layout))
    }

    /// String literal `index`.
    pub fn string(&self, index: LiteralIndex) -> Result<&'a str, FatalError> {
        let start = *self
            .string_offsets
            .get(index as usize)
            .ok_or(FatalError::LiteralOutOfBounds {
                kind: LiteralKind::String,
                index,
            })? as usize;
        let len = read_prefix(self.bytes, start);
        let body = &self.bytes[start + STRING_PREFIX_SIZE..start + STRING_PREFIX_SIZE + len];
        core::str::from_utf8(body).map_err(|_| FatalError::MalformedPool {
            reason: "string literal is not UTF-8",
        })
    }

    /// Number literal `index`, counted from the number index base.
    pub fn number(&self, index: LiteralIndex) -> Result<Number, FatalError> {
        let out_of_bounds = FatalError::LiteralOutOfBounds {
            kind: LiteralKind::Number,
            index,
        };
        let position = (index as usize)
            .checked_sub(self.layout.number_index_base as usize)
            .filter(|&i| i < self.layout.number_count)
            .ok_or(out_of_bounds)?;

        let start = self.layout.boundary + position * NUMBER_SIZE;
        let mut raw = [0u8; NUMBER_SIZE];
        raw.copy_from_slice(&self.bytes[start..start + NUMBER_SIZE]);
        Ok(Number::from_le_bytes(raw))
    }

    pub fn contains_string(&self, index: LiteralIndex) -> bool {
        (index as usize) < self.string_offsets.len()
    }

    pub fn contains_number(&self, index: LiteralIndex) -> bool {
        let base = self.layout.number_index_base as usize;
        (base..base + self.layout.number_count).contains(&(index as usize))
    }

    pub fn layout(&self) -> PoolLayout {
        self.layout
    }

    /// Offset where the number region starts.
    pub fn boundary(&self) -> usize {
        self.layout.boundary
    }

    pub fn as_bytes(&self) -> &'a [u8] {
        self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl fmt::Debug for LiteralPool<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "LiteralPool {{")?;
        writeln!(f, "  bytes: {}, boundary: {}", self.bytes.len(), self.layout.boundary)?;
        for index in 0..self.layout.string_count {
            match self.string(index) {
                Ok(s) => writeln!(f, "  str[{}] = {:?}", index, s)?,
                Err(_) => writeln!(f, "  str[{}] = <invalid>", index)?,
            }
        }
        let base = self.layout.number_index_base as usize;
        for index in base..base + self.layout.number_count {
            if let Ok(n) = self.number(index as LiteralIndex) {
                writeln!(f, "  num[{}] = {}", index, n)?;
            }
        }
        write!(f, "}}")
    }
}

fn read_prefix(bytes: &[u8], offset: usize) -> usize {
    u16::from_le_bytes([bytes[offset], bytes[offset + 1]]) as usize
}
