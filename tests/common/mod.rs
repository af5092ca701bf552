//! Tiny interpreter for the emitted assembly, enough to check that the
//! generated code prints what the evaluator prints.
//!
//! Code and data share one word-addressed memory: every instruction takes
//! one word, `data V * N` takes N. A label names the address of the line
//! that follows it.

use std::collections::HashMap;

use microjathon::parser::load_from_source;
use microjathon::processor;
use microjathon::processor::target::RiscV;

const STEP_LIMIT: usize = 5_000_000;

#[derive(Debug, Clone)]
struct Instr {
    mnemonic: String,
    operands: Vec<String>,
}

#[derive(Debug)]
pub struct Machine {
    code: HashMap<usize, Instr>,
    labels: HashMap<String, i64>,
    mem: Vec<i32>,
    regs: [i32; 32],
    out: Vec<u8>,
}

impl Machine {
    pub fn load(lines: &[String]) -> Self {
        let mut code = HashMap::new();
        let mut labels = HashMap::new();
        let mut mem = Vec::new();
        let mut pending: Vec<String> = Vec::new();

        for line in lines {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            if let Some(label) = line.strip_suffix(':') {
                pending.push(label.to_string());
                continue;
            }

            let addr = mem.len();
            for label in pending.drain(..) {
                let previous = labels.insert(label.clone(), addr as i64);
                assert!(previous.is_none(), "label {label} defined twice");
            }

            let (mnemonic, rest) = line.split_once(' ').unwrap_or((line, ""));
            if mnemonic == "data" {
                let (value, count) = rest.split_once('*').expect("data V * N");
                let value: i32 = value.trim().parse().expect("data value");
                let count: usize = count.trim().parse().expect("data count");
                mem.extend(std::iter::repeat_n(value, count));
            } else {
                let operands = rest
                    .split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect();
                code.insert(
                    addr,
                    Instr {
                        mnemonic: mnemonic.to_string(),
                        operands,
                    },
                );
                mem.push(0);
            }
        }
        assert!(pending.is_empty(), "labels at end of input: {pending:?}");

        Machine {
            code,
            labels,
            mem,
            regs: [0; 32],
            out: Vec::new(),
        }
    }

    fn label(&self, name: &str) -> Option<i64> {
        self.labels.get(name).copied()
    }

    fn reg(operand: &str) -> usize {
        let n: usize = operand
            .strip_prefix('x')
            .and_then(|n| n.parse().ok())
            .unwrap_or_else(|| panic!("not a register: {operand}"));
        assert!(n < 32, "no register {operand}");
        n
    }

    fn read(&self, operand: &str) -> i32 {
        self.regs[Self::reg(operand)]
    }

    fn write(&mut self, operand: &str, value: i32) {
        let r = Self::reg(operand);
        if r != 0 {
            self.regs[r] = value;
        }
    }

    fn immediate(&self, operand: &str) -> i64 {
        operand.parse().unwrap_or_else(|_| {
            self.label(operand)
                .unwrap_or_else(|| panic!("unknown label {operand}"))
        })
    }

    fn address(&self, base: &str, offset: &str) -> usize {
        let addr = self.read(base) as i64 + self.immediate(offset);
        assert!(
            addr >= 0 && (addr as usize) < self.mem.len(),
            "address {addr} out of range"
        );
        addr as usize
    }

    /// Runs from `main` until `ebreak`; returns everything written.
    pub fn run(mut self) -> Vec<u8> {
        let mut pc = self.label("main").expect("no main label") as usize;

        for _ in 0..STEP_LIMIT {
            let instr = self
                .code
                .get(&pc)
                .unwrap_or_else(|| panic!("no instruction at {pc}"))
                .clone();
            let ops: Vec<&str> = instr.operands.iter().map(String::as_str).collect();
            let mut next = pc + 1;

            match (instr.mnemonic.as_str(), ops.as_slice()) {
                ("ebreak", []) => return self.out,
                ("li", [rd, imm]) => {
                    let value = self.immediate(imm) as i32;
                    self.write(rd, value);
                }
                ("lw", [rd, base, off]) => {
                    let value = self.mem[self.address(base, off)];
                    self.write(rd, value);
                }
                ("sw", [base, off, src]) => {
                    let (addr, value) = (self.address(base, off), self.read(src));
                    self.mem[addr] = value;
                }
                ("addi", [rd, rs, imm]) => {
                    let value = self.read(rs).wrapping_add(self.immediate(imm) as i32);
                    self.write(rd, value);
                }
                ("ewrite", [rs]) => {
                    let byte = self.read(rs) as u8;
                    self.out.push(byte);
                }
                ("beq" | "bne" | "blt", [a, b, target]) => {
                    let (a, b) = (self.read(a), self.read(b));
                    let taken = match instr.mnemonic.as_str() {
                        "beq" => a == b,
                        "bne" => a != b,
                        _ => a < b,
                    };
                    if taken {
                        next = self.immediate(target) as usize;
                    }
                }
                ("jal", [rd, target]) => {
                    self.write(rd, next as i32);
                    next = self.immediate(target) as usize;
                }
                ("jalr", [rd, rs, off]) => {
                    let target = self.read(rs) as i64 + self.immediate(off);
                    self.write(rd, next as i32);
                    next = target as usize;
                }
                (op, [rd, a, b]) => {
                    let (a, b) = (self.read(a), self.read(b));
                    let value = match op {
                        "add" => a.wrapping_add(b),
                        "sub" => a.wrapping_sub(b),
                        "mul" => a.wrapping_mul(b),
                        "div" => a.wrapping_div(b),
                        "rem" => a.wrapping_rem(b),
                        "seq" => (a == b) as i32,
                        "sne" => (a != b) as i32,
                        "slt" => (a < b) as i32,
                        "sge" => (a >= b) as i32,
                        "and" => a & b,
                        "or" => a | b,
                        other => panic!("unknown instruction {other}"),
                    };
                    self.write(rd, value);
                }
                (op, ops) => panic!("malformed instruction {op} {ops:?}"),
            }
            pc = next;
        }
        panic!("step limit of {STEP_LIMIT} reached");
    }
}

/// Runs already generated `lines`, returning what they print.
pub fn run_assembly(lines: &[String]) -> String {
    String::from_utf8(Machine::load(lines).run()).expect("output is not UTF-8")
}

/// Parses `src`, then returns (evaluator output, simulated compiled output).
// not every test binary compares both ways
#[allow(dead_code)]
pub fn both_ways(src: &str) -> (String, String) {
    let program = load_from_source(src).unwrap();

    let mut evaluated = Vec::new();
    processor::execute(&program, &mut evaluated).unwrap();

    let compiled = processor::compile(&program, &RiscV).unwrap();
    (
        String::from_utf8(evaluated).unwrap(),
        run_assembly(&compiled.assembly),
    )
}
