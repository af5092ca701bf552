//! Component 2 – the functional core.
//!
//! Two ways of running the same tree: the evaluator executes it directly,
//! the planner and code generator lower it to assembly text.
pub mod ast;
pub mod codegen;
pub mod error;
pub mod evaluator;
pub mod planner;
pub mod target;
pub mod value;

use std::io::Write;

use tracing::info;

use crate::model::ProcessedProgram;
use ast::Program;
use error::Result;
use target::TargetIsa;

/// Runs `program`, writing everything it prints to `out`.
pub fn execute<W: Write>(program: &Program, out: W) -> Result<()> {
    evaluator::Evaluator::new(out).run(program)
}

/// Plans storage, then generates code for `isa`.
pub fn compile<I: TargetIsa>(program: &Program, isa: &I) -> Result<ProcessedProgram> {
    let plan = planner::plan(program);
    let assembly = codegen::generate(program, plan, isa)?;
    info!("generated {} lines of {} assembly", assembly.len(), isa.name());

    Ok(ProcessedProgram {
        target: isa.name(),
        assembly,
    })
}
