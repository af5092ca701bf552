//! Lowers the parse tree to assembly text for a `TargetIsa`.
//!
//! Artifact layout, in order:
//!
//!   entry label + translated statements + halt
//!   shared integer printing routine and division trap
//!   literal pool (label, bytes, terminator)
//!   variable storage (one zeroed word each)
//!   printing buffer and expression stack
//!
//! Floats and `round()` are evaluator-only; so is every string use other
//! than assigning a literal to a variable or printing one.

use tracing::{debug, trace};

use super::ast::{Block, Expr, Program, Stmt};
use super::error::{Error, Result};
use super::planner::{LabelAllocator, LiteralPool, Plan, StoragePlan};
use super::target::{Assembly, TargetIsa};

/// Prefix of every control-flow label.
pub const CONTROL_LABEL: &str = "L";

struct CodeGenerator<'a, I: TargetIsa> {
    isa: &'a I,
    storage: StoragePlan,
    pool: LiteralPool,
    labels: LabelAllocator,
    asm: Assembly,
    depth: usize,
    max_depth: usize,
}

/// Generates the full artifact for `program` using a finished `plan`.
pub fn generate<I: TargetIsa>(program: &Program, plan: Plan, isa: &I) -> Result<Vec<String>> {
    let Plan {
        storage,
        pool,
        labels,
    } = plan;
    let mut generator = CodeGenerator {
        isa,
        storage,
        pool,
        labels,
        asm: Assembly::default(),
        depth: 0,
        max_depth: 0,
    };

    generator.isa.program_start(&mut generator.asm);
    for stmt in &program.statements {
        generator.stmt(stmt)?;
    }
    generator.isa.program_end(&mut generator.asm);
    generator.asm.blank();

    generator.isa.print_int_routine(&mut generator.asm);
    generator.asm.blank();
    generator.isa.division_trap_routine(&mut generator.asm);
    generator.asm.blank();

    for entry in generator.pool.entries() {
        generator.isa.literal(&mut generator.asm, entry);
        generator.asm.blank();
    }

    for name in generator.storage.variables() {
        generator.isa.variable_slot(&mut generator.asm, &StoragePlan::slot_label(name));
    }
    if !generator.storage.is_empty() {
        generator.asm.blank();
    }

    generator
        .isa
        .runtime_data(&mut generator.asm, generator.max_depth.max(1));

    debug!(
        "{}: {} lines, {} labels, stack depth {}",
        isa.name(),
        generator.asm.lines().len(),
        generator.labels.allocated(),
        generator.max_depth
    );
    Ok(generator.asm.into_lines())
}

impl<I: TargetIsa> CodeGenerator<'_, I> {
    fn slot(&self, name: &str) -> Result<String> {
        if self.storage.contains(name) {
            Ok(StoragePlan::slot_label(name))
        } else {
            Err(Error::MissingSlot(name.to_string()))
        }
    }

    fn fresh_label(&mut self) -> String {
        self.labels.fresh(CONTROL_LABEL)
    }

    fn block(&mut self, block: &Block) -> Result<()> {
        for stmt in &block.statements {
            self.stmt(stmt)?;
        }
        Ok(())
    }

    fn stmt(&mut self, stmt: &Stmt) -> Result<()> {
        match stmt {
            Stmt::Assign { name, value } => self.assign(name, value)?,
            Stmt::Print { value } => self.print(value)?,
            Stmt::If {
                condition,
                then_block,
                else_block,
            } => {
                let else_label = self.fresh_label();
                let end_label = self.fresh_label();
                trace!("if: else {else_label}, end {end_label}");

                let cond = self.expr(condition)?;
                self.isa.branch_if_false(&mut self.asm, cond, &else_label);
                self.block(then_block)?;
                self.isa.jump(&mut self.asm, &end_label);
                self.isa.label(&mut self.asm, &else_label);
                if let Some(else_block) = else_block {
                    self.block(else_block)?;
                }
                self.isa.label(&mut self.asm, &end_label);
            }
            Stmt::While { condition, body } => {
                let top_label = self.fresh_label();
                let end_label = self.fresh_label();
                trace!("while: top {top_label}, end {end_label}");

                self.isa.label(&mut self.asm, &top_label);
                let cond = self.expr(condition)?;
                self.isa.branch_if_false(&mut self.asm, cond, &end_label);
                self.block(body)?;
                self.isa.jump(&mut self.asm, &top_label);
                self.isa.label(&mut self.asm, &end_label);
            }
            Stmt::Block(block) => self.block(block)?,
        }
        Ok(())
    }

    fn assign(&mut self, name: &str, value: &Expr) -> Result<()> {
        let slot = self.slot(name)?;
        if let Expr::Str(text) = value.ungrouped() {
            let label = self.pool.label_for(name, text)?;
            self.isa.store_address(&mut self.asm, &slot, label);
            return Ok(());
        }

        if self.storage.is_string(name) {
            return Err(Error::UnsupportedFeature(format!(
                "non-literal value assigned to string variable `{name}`"
            )));
        }
        let src = self.expr(value)?;
        self.isa.store_var(&mut self.asm, &slot, src);
        Ok(())
    }

    fn print(&mut self, value: &Expr) -> Result<()> {
        match value.ungrouped() {
            Expr::Str(text) => {
                for byte in text.bytes() {
                    self.isa.write_byte(&mut self.asm, byte);
                }
            }
            Expr::Var(name) if self.storage.is_string(name) => {
                let slot = self.slot(name)?;
                let loop_label = self.fresh_label();
                let end_label = self.fresh_label();
                self.isa
                    .write_string_var(&mut self.asm, &slot, &loop_label, &end_label);
            }
            _ => {
                let src = self.expr(value)?;
                self.isa.call_print_int(&mut self.asm, src);
            }
        }
        self.isa.write_byte(&mut self.asm, b'\n');
        Ok(())
    }

    /// Emits `expr` and returns the location holding its value.
    fn expr(&mut self, expr: &Expr) -> Result<&'static str> {
        match expr {
            Expr::Int(n) => self.isa.load_int(&mut self.asm, *n),
            Expr::Float(x) => {
                return Err(Error::UnsupportedFeature(format!(
                    "floating-point literal {x:?}"
                )));
            }
            Expr::Str(text) => {
                return Err(Error::UnsupportedFeature(format!(
                    "string literal {text:?} inside an expression"
                )));
            }
            Expr::Var(name) => {
                if self.storage.is_string(name) {
                    return Err(Error::UnsupportedFeature(format!(
                        "string variable `{name}` inside an expression"
                    )));
                }
                let slot = self.slot(name)?;
                self.isa.load_var(&mut self.asm, &slot);
            }
            Expr::Group(inner) => return self.expr(inner),
            Expr::Binary { op, left, right } => {
                self.expr(left)?;
                self.isa.save_scratch(&mut self.asm);
                self.depth += 1;
                self.max_depth = self.max_depth.max(self.depth);

                self.expr(right)?;
                self.isa.restore_left(&mut self.asm);
                self.depth -= 1;
                self.isa.combine(&mut self.asm, *op);
            }
            Expr::Not(inner) => {
                self.expr(inner)?;
                self.isa.not(&mut self.asm);
            }
            Expr::Round(_) => {
                return Err(Error::UnsupportedFeature("round()".into()));
            }
        }
        Ok(self.isa.scratch())
    }
}
