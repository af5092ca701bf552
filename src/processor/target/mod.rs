//! Emission interface between the code generator and an instruction set.
//!
//! The generator decides *what* happens and in which order (labels,
//! sections, save/restore around operands); a `TargetIsa` decides how each
//! step is spelled. Backends are interchangeable behind this trait.

pub mod riscv;

pub use riscv::RiscV;

use super::ast::BinaryOp;
use super::planner::LiteralEntry;

/// Ordered instruction lines of one artifact.
#[derive(Debug, Default)]
pub struct Assembly {
    lines: Vec<String>,
}

impl Assembly {
    pub fn push(&mut self, line: impl Into<String>) {
        self.lines.push(line.into());
    }

    pub fn blank(&mut self) {
        self.lines.push(String::new());
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn into_lines(self) -> Vec<String> {
        self.lines
    }
}

pub trait TargetIsa {
    fn name(&self) -> &'static str;

    /// Location every expression leaves its result in.
    fn scratch(&self) -> &'static str;

    /// Entry label and machine setup.
    fn program_start(&self, asm: &mut Assembly);
    fn program_end(&self, asm: &mut Assembly);

    fn label(&self, asm: &mut Assembly, label: &str);

    fn load_int(&self, asm: &mut Assembly, value: i32);
    fn load_var(&self, asm: &mut Assembly, slot: &str);
    fn store_var(&self, asm: &mut Assembly, slot: &str, src: &str);
    /// Stores the address of a pool entry into a variable slot.
    fn store_address(&self, asm: &mut Assembly, slot: &str, label: &str);

    /// Preserves the scratch value across evaluation of a right operand.
    fn save_scratch(&self, asm: &mut Assembly);
    /// Brings the saved left operand back next to the fresh right operand.
    fn restore_left(&self, asm: &mut Assembly);
    /// `scratch = left <op> scratch`
    fn combine(&self, asm: &mut Assembly, op: BinaryOp);
    fn not(&self, asm: &mut Assembly);

    fn branch_if_false(&self, asm: &mut Assembly, src: &str, label: &str);
    fn jump(&self, asm: &mut Assembly, label: &str);

    fn write_byte(&self, asm: &mut Assembly, byte: u8);
    /// Writes the pool entry a string variable points to, up to its
    /// terminator. `loop_label` and `end_label` are fresh.
    fn write_string_var(&self, asm: &mut Assembly, slot: &str, loop_label: &str, end_label: &str);
    fn call_print_int(&self, asm: &mut Assembly, src: &str);

    /// Shared decimal printing subroutine, emitted once per artifact.
    fn print_int_routine(&self, asm: &mut Assembly);
    /// Reached when a quotient is not a whole number: reports and halts.
    fn division_trap_routine(&self, asm: &mut Assembly);

    /// Label followed by the entry's bytes and a terminator.
    fn literal(&self, asm: &mut Assembly, entry: &LiteralEntry);
    /// One zero-initialised word per variable.
    fn variable_slot(&self, asm: &mut Assembly, slot: &str);
    /// Printing buffer and an expression stack of `stack_words` words.
    fn runtime_data(&self, asm: &mut Assembly, stack_words: usize);
}
