#![allow(dead_code)]

use bumpalo::Bump;
use ember::{Completion, EngineOptions, Error, Instruction, Value};

/// Literals shared by the scenario programs: strings `a`, `b` at indices 0
/// and 1, numbers from index 2 on.
pub const STRINGS: &[&str] = &["a", "b"];

pub fn run<'a>(
    arena: &'a Bump,
    numbers: &[f64],
    program: &[Instruction],
) -> Result<Completion<'a>, Error> {
    let program = arena.alloc_slice_copy(program);
    ember::execute(arena, EngineOptions::default(), STRINGS, numbers, program)
}

/// Defines a test that runs a program against [`STRINGS`] and `numbers`,
/// checking the completion.
#[macro_export]
macro_rules! program_case {
    (
        $name:ident,
        numbers: $numbers:expr,
        program: [$($instr:expr),* $(,)?],
        success: $success:expr,
        value: $value:expr $(,)?
    ) => {
        #[test]
        fn $name() {
            let arena = ::bumpalo::Bump::new();
            let program = [$($instr),*];
            let completion = $crate::cases::run(&arena, &$numbers, &program).unwrap();
            ::pretty_assertions::assert_eq!(
                (completion.success, completion.value),
                ($success, $value)
            );
        }
    };
}

pub fn string(value: &str) -> Value<'_> {
    Value::String(value)
}
