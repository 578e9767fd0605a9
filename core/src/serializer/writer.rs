use bumpalo::{Bump, collections::Vec as BumpVec};

use super::{LiteralPool, NUMBER_SIZE, PoolLayout, STRING_PREFIX_SIZE};
use crate::{errors::FatalError, opcode::LiteralIndex, value::Number};

/// Writes string and number literals into one contiguous buffer.
///
/// The two dumps compose: strings first, then numbers at the offset the
/// string dump returned.
///
/// ```
/// use bumpalo::Bump;
/// use ember_core::serializer::Serializer;
///
/// let arena = Bump::new();
/// let mut serializer = Serializer::new_in(&arena);
/// let offset = serializer.dump_strings(&["a", "b"]).unwrap();
/// serializer.dump_nums(&[2.0], offset, 2).unwrap();
///
/// let pool = serializer.finish();
/// assert_eq!(pool.string(1).unwrap(), "b");
/// assert_eq!(pool.number(2).unwrap(), 2.0);
/// ```
pub struct Serializer<'a> {
    arena: &'a Bump,
    buffer: BumpVec<'a, u8>,
    string_count: Option<u16>,
    numbers: Option<(usize, LiteralIndex)>,
}

impl<'a> Serializer<'a> {
    pub fn new_in(arena: &'a Bump) -> Self {
        Serializer {
            arena,
            buffer: BumpVec::new_in(arena),
            string_count: None,
            numbers: None,
        }
    }

    /// Current write position.
    pub fn offset(&self) -> usize {
        self.buffer.len()
    }

    /// Append `strings`, each length-prefixed, and return the offset just
    /// past the last byte written (the string/number boundary).
    ///
    /// The strings receive literal indices `0..strings.len()` in order.
    pub fn dump_strings(&mut self, strings: &[&str]) -> Result<usize, FatalError> {
        if self.numbers.is_some() {
            return Err(FatalError::MalformedPool {
                reason: "strings must be dumped before numbers",
            });
        }
        if self.string_count.is_some() {
            return Err(FatalError::MalformedPool {
                reason: "string region already written",
            });
        }
        let count = u16::try_from(strings.len()).map_err(|_| FatalError::MalformedPool {
            reason: "too many string literals",
        })?;

        // Validate and reserve up front so a failed dump leaves no bytes behind.
        let mut total = 0;
        for s in strings {
            if s.len() > u16::MAX as usize {
                return Err(FatalError::MalformedPool {
                    reason: "string literal longer than 65535 bytes",
                });
            }
            total += STRING_PREFIX_SIZE + s.len();
        }
        self.reserve(total)?;

        for s in strings {
            self.buffer.extend_from_slice(&(s.len() as u16).to_le_bytes());
            self.buffer.extend_from_slice(s.as_bytes());
        }

        self.string_count = Some(count);
        tracing::debug!(count, boundary = self.buffer.len(), "dumped string literals");
        Ok(self.buffer.len())
    }

    /// Append `nums` as fixed-width numbers starting at `start_offset`.
    ///
    /// `start_offset` must be the value returned by [`dump_strings`] (or 0
    /// when there are no strings). `index_base` is the literal index of the
    /// first number and may not be below the number of strings dumped.
    /// Returns the new end of the pool.
    ///
    /// [`dump_strings`]: Serializer::dump_strings
    pub fn dump_nums(
        &mut self,
        nums: &[Number],
        start_offset: usize,
        index_base: LiteralIndex,
    ) -> Result<usize, FatalError> {
        if self.numbers.is_some() {
            return Err(FatalError::MalformedPool {
                reason: "number region already written",
            });
        }
        if start_offset != self.buffer.len() {
            return Err(FatalError::PoolOffsetMismatch {
                expected: self.buffer.len(),
                found: start_offset,
            });
        }
        if index_base < self.string_count.unwrap_or(0) {
            return Err(FatalError::MalformedPool {
                reason: "number literal indices overlap the string literals",
            });
        }
        if index_base as usize + nums.len() > u16::MAX as usize + 1 {
            return Err(FatalError::MalformedPool {
                reason: "number literal indices overflow",
            });
        }

        self.reserve(nums.len() * NUMBER_SIZE)?;
        for n in nums {
            self.buffer.extend_from_slice(&n.to_le_bytes());
        }

        self.numbers = Some((nums.len(), index_base));
        tracing::debug!(
            count = nums.len(),
            index_base,
            end = self.buffer.len(),
            "dumped number literals"
        );
        Ok(self.buffer.len())
    }

    /// Freeze the buffer into a pool.
    pub fn finish(self) -> LiteralPool<'a> {
        let string_count = self.string_count.unwrap_or(0);
        let (number_count, number_index_base) = self.numbers.unwrap_or((0, string_count));
        let boundary = self.buffer.len() - number_count * NUMBER_SIZE;
        let layout = PoolLayout {
            string_count,
            boundary,
            number_count,
            number_index_base,
        };
        let arena = self.arena;
        LiteralPool::from_parts(arena, self.buffer.into_bump_slice(), layout)
    }

    fn reserve(&mut self, additional: usize) -> Result<(), FatalError> {
        self.buffer
            .try_reserve(additional)
            .map_err(|_| FatalError::ArenaExhausted {
                requested: additional,
            })
    }
}
