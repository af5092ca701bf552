//! Tree-walking evaluator.
//!
//! Holds one flat variable store for the whole run; blocks do not open a
//! new scope and unknown names read as `0`.

use std::collections::HashMap;
use std::io::Write;

use tracing::{debug, trace};

use super::ast::{Block, Expr, Program, Stmt};
use super::error::Result;
use super::value::{self, Value};

pub struct Evaluator<W: Write> {
    vars: HashMap<String, Value>,
    out: W,
}

impl<W: Write> Evaluator<W> {
    pub fn new(out: W) -> Self {
        Self {
            vars: HashMap::new(),
            out,
        }
    }

    /// Runs every statement in order; the first failure aborts the run.
    pub fn run(&mut self, program: &Program) -> Result<()> {
        debug!("evaluating {} top-level statements", program.statements.len());
        for stmt in &program.statements {
            self.exec(stmt)?;
        }
        self.out.flush()?;
        debug!("evaluation finished with {} variables", self.vars.len());
        Ok(())
    }

    pub fn variable(&self, name: &str) -> Option<&Value> {
        self.vars.get(name)
    }

    pub fn into_output(self) -> W {
        self.out
    }

    fn exec_block(&mut self, block: &Block) -> Result<()> {
        for stmt in &block.statements {
            self.exec(stmt)?;
        }
        Ok(())
    }

    fn exec(&mut self, stmt: &Stmt) -> Result<()> {
        match stmt {
            Stmt::Assign { name, value } => {
                let v = self.eval(value)?;
                trace!("{name} = {v:?}");
                self.vars.insert(name.clone(), v);
            }
            Stmt::Print { value } => {
                let v = self.eval(value)?;
                writeln!(self.out, "{v}")?;
            }
            Stmt::If {
                condition,
                then_block,
                else_block,
            } => {
                if self.eval(condition)?.is_truthy()? {
                    self.exec_block(then_block)?;
                } else if let Some(else_block) = else_block {
                    self.exec_block(else_block)?;
                }
            }
            Stmt::While { condition, body } => {
                while self.eval(condition)?.is_truthy()? {
                    self.exec_block(body)?;
                }
            }
            Stmt::Block(block) => self.exec_block(block)?,
        }
        Ok(())
    }

    fn eval(&self, expr: &Expr) -> Result<Value> {
        match expr {
            Expr::Int(n) => Ok(Value::Integer(*n)),
            Expr::Float(x) => Ok(Value::Float(*x)),
            Expr::Str(s) => Ok(Value::Str(s.clone())),
            Expr::Var(name) => Ok(self.vars.get(name).cloned().unwrap_or(Value::Integer(0))),
            Expr::Group(inner) => self.eval(inner),
            Expr::Binary { op, left, right } => {
                // both sides are always evaluated; there is no short-circuit
                let l = self.eval(left)?;
                let r = self.eval(right)?;
                value::binary(*op, &l, &r)
            }
            Expr::Not(inner) => self.eval(inner)?.not(),
            Expr::Round(inner) => self.eval(inner)?.round(),
        }
    }
}

/// Runs `program` and returns everything it printed.
pub fn evaluate(program: &Program) -> Result<String> {
    let mut evaluator = Evaluator::new(Vec::new());
    evaluator.run(program)?;
    Ok(String::from_utf8_lossy(&evaluator.into_output()).into_owned())
}
