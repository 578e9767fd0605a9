use core::fmt;

use hashbrown::{HashMap, HashSet};

use super::{Instruction, Operand};
use crate::{Vec, serializer::LiteralPool};

/// Human-readable listing of a program, with jump targets labelled.
///
/// ```text
///      0       RegVarDecl(255, 255)
///      5       JumpIfTrue   %1, +2 (to L0)
///      7   L0: Assign(%0, #253)
/// ```
pub struct Disassembly<'p> {
    program: &'p [Instruction],
    pool: Option<&'p LiteralPool<'p>>,
}

impl<'p> Disassembly<'p> {
    pub fn new(program: &'p [Instruction]) -> Self {
        Disassembly {
            program,
            pool: None,
        }
    }

    /// Annotate literal operands with their values.
    pub fn with_pool(mut self, pool: &'p LiteralPool<'p>) -> Self {
        self.pool = Some(pool);
        self
    }

    fn target(addr: usize, offset: i16) -> isize {
        addr as isize + offset as isize
    }
}

impl fmt::Display for Disassembly<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // First pass: collect all jump targets to determine which addresses need labels
        let jump_targets: HashSet<isize> = self
            .program
            .iter()
            .enumerate()
            .filter_map(|(addr, instr)| instr.jump_offset().map(|off| Self::target(addr, off)))
            .collect();

        // Assign label numbers to targets (sorted for deterministic output)
        let mut sorted_targets: Vec<_> = jump_targets.into_iter().collect();
        sorted_targets.sort();
        let label_map: HashMap<isize, usize> = sorted_targets
            .into_iter()
            .enumerate()
            .map(|(i, addr)| (addr, i))
            .collect();

        // Second pass: print instructions with labels
        for (addr, instr) in self.program.iter().enumerate() {
            match label_map.get(&(addr as isize)) {
                Some(label) => write!(f, "{:6} {:>4} ", addr, alloc::format!("L{}:", label))?,
                None => write!(f, "{:6}      ", addr)?,
            }
            write!(f, "{:?}", instr)?;

            if let Some(offset) = instr.jump_offset() {
                let target = Self::target(addr, offset);
                match label_map.get(&target) {
                    Some(label) if (0..self.program.len() as isize).contains(&target) => {
                        write!(f, " (to L{})", label)?
                    }
                    _ => write!(f, " (to @{}, outside program)", target)?,
                }
            }

            if let (Some(pool), Instruction::Assign { value, .. }) = (self.pool, instr) {
                match value {
                    Operand::String(index) => match pool.string(*index) {
                        Ok(s) => write!(f, "  ; {:?}", s)?,
                        Err(_) => write!(f, "  ; <missing>")?,
                    },
                    Operand::Number(index) => match pool.number(*index) {
                        Ok(n) => write!(f, "  ; {}", n)?,
                        Err(_) => write!(f, "  ; <missing>")?,
                    },
                    _ => {}
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
