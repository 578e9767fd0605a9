//! Built-in demo programs.

use ember::{Instruction, Operand, build::*};
use ember_core::opcode::OpcodeError;

pub struct Demo {
    pub name: &'static str,
    pub about: &'static str,
    pub strings: &'static [&'static str],
    pub numbers: &'static [f64],
    pub program: fn() -> Result<Vec<Instruction>, OpcodeError>,
}

pub const DEMOS: &[Demo] = &[
    Demo {
        name: "assignment",
        about: "string, copy, small-int and number assignments with conditional jumps",
        strings: &["a", "b"],
        numbers: &[2.0],
        program: assignment_walkthrough,
    },
    Demo {
        name: "assignment-zero",
        about: "the assignment walkthrough with a zero number literal (exits falsy)",
        strings: &["a", "b"],
        numbers: &[0.0],
        program: assignment_walkthrough,
    },
    Demo {
        name: "countdown",
        about: "a backward jump that loops until a slot turns falsy",
        strings: &["done"],
        numbers: &[0.0],
        program: countdown,
    },
    Demo {
        name: "bad-literal",
        about: "references a number literal past the end of the pool (fatal)",
        strings: &[],
        numbers: &[1.0],
        program: bad_literal,
    },
    Demo {
        name: "no-slots",
        about: "exits on slot 0 without declaring any slots (fatal)",
        strings: &[],
        numbers: &[],
        program: no_slots,
    },
];

pub fn find(name: &str) -> Option<&'static Demo> {
    DEMOS.iter().find(|demo| demo.name == name)
}

fn assignment_walkthrough() -> Result<Vec<Instruction>, OpcodeError> {
    Ok(vec![
        reg_var_decl(255, 255),
        var_decl(0),
        var_decl(1),
        assignment(0, Operand::string(1)),
        assignment(1, Operand::variable(0)),
        is_true_jmp(1, 2)?,
        jmp_down(5)?,
        assignment(0, Operand::small_int(253)),
        assignment(1, Operand::number(2)),
        is_false_jmp(1, 2)?,
        exitval(0),
        exitval(1),
    ])
}

fn countdown() -> Result<Vec<Instruction>, OpcodeError> {
    Ok(vec![
        reg_var_decl(1, 1),
        assignment(0, Operand::small_int(3)),
        is_false_jmp(0, 3)?,
        assignment(0, Operand::number(1)),
        jmp_up(2)?,
        assignment(1, Operand::string(0)),
        exitval(1),
    ])
}

fn bad_literal() -> Result<Vec<Instruction>, OpcodeError> {
    Ok(vec![
        reg_var_decl(1, 0),
        assignment(0, Operand::number(4)),
        exitval(0),
    ])
}

fn no_slots() -> Result<Vec<Instruction>, OpcodeError> {
    Ok(vec![reg_var_decl(0, 0), exitval(0)])
}
