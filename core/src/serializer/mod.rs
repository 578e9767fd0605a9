//! Literal pool serialization.
//!
//! # Layout
//!
//! ```text
//! ┌──────────────────────────────────┬──────────────────────────────┐
//! │ string region  [0, boundary)     │ number region [boundary, end) │
//! │ (u16 LE length, UTF-8 bytes)*    │ (f64 LE)*                     │
//! └──────────────────────────────────┴──────────────────────────────┘
//! ```
//!
//! Strings are numbered `0..string_count` in the order they were dumped.
//! Numbers are numbered from the `index_base` passed to
//! [`Serializer::dump_nums`], so number literal `i` lives at byte offset
//! `boundary + (i - index_base) * NUMBER_SIZE`.

mod pool;
mod writer;


pub use pool::{LiteralPool, PoolLayout};
pub use writer::Serializer;

/// Bytes in a string length prefix.
pub const STRING_PREFIX_SIZE: usize = 2;

/// Bytes in an encoded number.
pub const NUMBER_SIZE: usize = 8;
