//! Word-addressed RISC-V style register machine.
//!
//!   x5   expression result          x6   restored left operand
//!   x7   address temporary          x2   expression stack pointer
//!   x10  print_int argument         x1   return address
//!
//! `lw rd, base, off` loads, `sw base, off, src` stores, `ewrite rs`
//! outputs one byte, `data V * N` reserves N words holding V.

use super::{Assembly, TargetIsa};
use crate::processor::ast::BinaryOp;
use crate::processor::planner::LiteralEntry;

const RESULT: &str = "x5";
const LEFT: &str = "x6";
const SP: &str = "x2";

/// Decimal digits of the widest 32-bit value, with room to spare.
const PRINT_BUFFER_WORDS: usize = 12;

const DIV_TRAP: &str = "div_trap";
const DIV_TRAP_MESSAGE: &str = "error: division result is not an integer\n";

#[derive(Debug, Default, Clone, Copy)]
pub struct RiscV;

impl TargetIsa for RiscV {
    fn name(&self) -> &'static str {
        "riscv"
    }

    fn scratch(&self) -> &'static str {
        RESULT
    }

    fn program_start(&self, asm: &mut Assembly) {
        asm.push("main:");
        asm.push(format!("li {SP}, stack_top"));
    }

    fn program_end(&self, asm: &mut Assembly) {
        asm.push("ebreak");
    }

    fn label(&self, asm: &mut Assembly, label: &str) {
        asm.push(format!("{label}:"));
    }

    fn load_int(&self, asm: &mut Assembly, value: i32) {
        asm.push(format!("li {RESULT}, {value}"));
    }

    fn load_var(&self, asm: &mut Assembly, slot: &str) {
        asm.push(format!("li x7, {slot}"));
        asm.push(format!("lw {RESULT}, x7, 0"));
    }

    fn store_var(&self, asm: &mut Assembly, slot: &str, src: &str) {
        asm.push(format!("li x7, {slot}"));
        asm.push(format!("sw x7, 0, {src}"));
    }

    fn store_address(&self, asm: &mut Assembly, slot: &str, label: &str) {
        asm.push(format!("li x7, {label}"));
        asm.push(format!("li x6, {slot}"));
        asm.push("sw x6, 0, x7");
    }

    fn save_scratch(&self, asm: &mut Assembly) {
        asm.push(format!("addi {SP}, {SP}, -1"));
        asm.push(format!("sw {SP}, 0, {RESULT}"));
    }

    fn restore_left(&self, asm: &mut Assembly) {
        asm.push(format!("lw {LEFT}, {SP}, 0"));
        asm.push(format!("addi {SP}, {SP}, 1"));
    }

    fn combine(&self, asm: &mut Assembly, op: BinaryOp) {
        let (l, r) = (LEFT, RESULT);
        let line = match op {
            BinaryOp::Add => format!("add {r}, {l}, {r}"),
            BinaryOp::Sub => format!("sub {r}, {l}, {r}"),
            BinaryOp::Mul => format!("mul {r}, {l}, {r}"),
            BinaryOp::Div => {
                // zero divisors and remainders have no integer quotient
                asm.push(format!("beq {r}, x0, {DIV_TRAP}"));
                asm.push(format!("rem x7, {l}, {r}"));
                asm.push(format!("bne x7, x0, {DIV_TRAP}"));
                format!("div {r}, {l}, {r}")
            }
            BinaryOp::Eq => format!("seq {r}, {l}, {r}"),
            BinaryOp::Ne => format!("sne {r}, {l}, {r}"),
            BinaryOp::Lt => format!("slt {r}, {l}, {r}"),
            BinaryOp::Gt => format!("slt {r}, {r}, {l}"),
            BinaryOp::Ge => format!("sge {r}, {l}, {r}"),
            BinaryOp::Le => format!("sge {r}, {r}, {l}"),
            BinaryOp::And | BinaryOp::Or => {
                // normalise both sides to 0/1 first
                asm.push(format!("sne {l}, {l}, x0"));
                asm.push(format!("sne {r}, {r}, x0"));
                let mnemonic = if op == BinaryOp::And { "and" } else { "or" };
                format!("{mnemonic} {r}, {l}, {r}")
            }
        };
        asm.push(line);
    }

    fn not(&self, asm: &mut Assembly) {
        asm.push(format!("seq {RESULT}, {RESULT}, x0"));
    }

    fn branch_if_false(&self, asm: &mut Assembly, src: &str, label: &str) {
        asm.push(format!("beq {src}, x0, {label}"));
    }

    fn jump(&self, asm: &mut Assembly, label: &str) {
        asm.push(format!("jal x0, {label}"));
    }

    fn write_byte(&self, asm: &mut Assembly, byte: u8) {
        asm.push(format!("li x10, {byte}"));
        asm.push("ewrite x10");
    }

    fn write_string_var(&self, asm: &mut Assembly, slot: &str, loop_label: &str, end_label: &str) {
        asm.push(format!("li x6, {slot}"));
        asm.push("lw x10, x6, 0");
        asm.push(format!("bne x10, x0, {loop_label}"));
        // slot still zero: nothing assigned yet, reads as 0
        asm.push("li x11, 48");
        asm.push("ewrite x11");
        asm.push(format!("jal x0, {end_label}"));
        asm.push(format!("{loop_label}:"));
        asm.push("lw x11, x10, 0");
        asm.push(format!("beq x11, x0, {end_label}"));
        asm.push("ewrite x11");
        asm.push("addi x10, x10, 1");
        asm.push(format!("jal x0, {loop_label}"));
        asm.push(format!("{end_label}:"));
    }

    fn call_print_int(&self, asm: &mut Assembly, src: &str) {
        asm.push(format!("addi x10, {src}, 0"));
        asm.push("jal x1, print_int");
    }

    fn print_int_routine(&self, asm: &mut Assembly) {
        let lines = [
            "print_int:",
            "beq x10, x0, print_int_zero",
            // digits come from the non-positive magnitude, which also
            // holds the most negative value
            "sub x5, x0, x10",
            "blt x10, x0, print_int_neg",
            "print_int_digits:",
            "li x6, 0",
            "li x7, 10",
            // collect digits least significant first
            "print_div_loop:",
            "div x8, x5, x7",
            "rem x9, x5, x7",
            "sub x9, x0, x9",
            "addi x5, x8, 0",
            "li x11, buf",
            "add x11, x11, x6",
            "sw x11, 0, x9",
            "addi x6, x6, 1",
            "bne x5, x0, print_div_loop",
            // replay them most significant first
            "print_print_loop:",
            "addi x6, x6, -1",
            "li x11, 48",
            "li x13, buf",
            "add x13, x13, x6",
            "lw x9, x13, 0",
            "add x11, x11, x9",
            "ewrite x11",
            "bne x6, x0, print_print_loop",
            "jalr x0, x1, 0",
            "print_int_zero:",
            "li x11, 48",
            "ewrite x11",
            "jalr x0, x1, 0",
            "print_int_neg:",
            "li x11, 45",
            "ewrite x11",
            "addi x5, x10, 0",
            "jal x0, print_int_digits",
        ];
        for line in lines {
            asm.push(line);
        }
    }

    fn division_trap_routine(&self, asm: &mut Assembly) {
        asm.push(format!("{DIV_TRAP}:"));
        for byte in DIV_TRAP_MESSAGE.bytes() {
            self.write_byte(asm, byte);
        }
        asm.push("ebreak");
    }

    fn literal(&self, asm: &mut Assembly, entry: &LiteralEntry) {
        asm.push(format!("{}:", entry.label));
        for byte in &entry.bytes {
            asm.push(format!("data {byte} * 1"));
        }
        asm.push("data 0 * 1");
    }

    fn variable_slot(&self, asm: &mut Assembly, slot: &str) {
        asm.push(format!("{slot}:"));
        asm.push("data 0 * 1");
    }

    fn runtime_data(&self, asm: &mut Assembly, stack_words: usize) {
        asm.push("buf:");
        asm.push(format!("data 0 * {PRINT_BUFFER_WORDS}"));
        asm.push("stack:");
        asm.push(format!("data 0 * {stack_words}"));
        asm.push("stack_top:");
        asm.push("data 0 * 1");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn emitted(f: impl FnOnce(&mut Assembly)) -> Vec<String> {
        let mut asm = Assembly::default();
        f(&mut asm);
        asm.into_lines()
    }

    #[test]
    fn test_comparison_operand_order() {
        let test_cases = vec![
            (BinaryOp::Lt, "slt x5, x6, x5"),
            (BinaryOp::Gt, "slt x5, x5, x6"),
            (BinaryOp::Ge, "sge x5, x6, x5"),
            (BinaryOp::Le, "sge x5, x5, x6"),
            (BinaryOp::Sub, "sub x5, x6, x5"),
        ];

        for (op, expected) in test_cases {
            assert_eq!(emitted(|asm| RiscV.combine(asm, op)), vec![expected.to_string()]);
        }
    }

    #[test]
    fn test_logical_ops_normalise_operands() {
        assert_eq!(
            emitted(|asm| RiscV.combine(asm, BinaryOp::Or)),
            vec!["sne x6, x6, x0", "sne x5, x5, x0", "or x5, x6, x5"]
        );
    }

    #[test]
    fn test_division_checks_for_whole_quotient() {
        assert_eq!(
            emitted(|asm| RiscV.combine(asm, BinaryOp::Div)),
            vec![
                "beq x5, x0, div_trap",
                "rem x7, x6, x5",
                "bne x7, x0, div_trap",
                "div x5, x6, x5",
            ]
        );

        let trap = emitted(|asm| RiscV.division_trap_routine(asm));
        assert_eq!(trap[0], "div_trap:");
        assert_eq!(trap.last().unwrap(), "ebreak");
    }

    #[test]
    fn test_unassigned_string_var_prints_zero() {
        let lines = emitted(|asm| RiscV.write_string_var(asm, "var_s", "L0", "L1"));
        assert_eq!(
            &lines[..6],
            &[
                "li x6, var_s",
                "lw x10, x6, 0",
                "bne x10, x0, L0",
                "li x11, 48",
                "ewrite x11",
                "jal x0, L1",
            ]
        );
    }

    #[test]
    fn test_literal_has_terminator() {
        let entry = LiteralEntry {
            label: "str3".into(),
            bytes: b"ok".to_vec(),
        };
        assert_eq!(
            emitted(|asm| RiscV.literal(asm, &entry)),
            vec!["str3:", "data 111 * 1", "data 107 * 1", "data 0 * 1"]
        );
    }

    #[test]
    fn test_save_restore_is_balanced() {
        let lines = emitted(|asm| {
            RiscV.save_scratch(asm);
            RiscV.restore_left(asm);
        });
        assert_eq!(
            lines,
            vec!["addi x2, x2, -1", "sw x2, 0, x5", "lw x6, x2, 0", "addi x2, x2, 1"]
        );
    }
}
