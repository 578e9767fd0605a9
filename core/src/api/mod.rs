//! Public API for the Ember engine.
//!
//! ```
//! use bumpalo::Bump;
//! use ember_core::api::{Engine, EngineOptions};
//! use ember_core::opcode::{build::*, Operand};
//!
//! let arena = Bump::new();
//! let mut engine = Engine::new(&arena, EngineOptions::default()).unwrap();
//! let pool = engine.serializer().finish();
//!
//! let program = [reg_var_decl(1, 0), assignment(0, Operand::small_int(0)), exitval(0)];
//! let completion = engine.execute(&program, &pool).unwrap();
//! assert!(!completion.success);
//! ```

pub mod engine;
pub mod options;

pub use engine::Engine;
pub use options::{DEFAULT_HEAP_CAPACITY, EngineOptions};
