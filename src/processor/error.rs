//! Failures of the evaluator and the code generator.
//!
//! Every variant is fatal for the pass that raised it.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// Operator applied to a combination of value kinds it does not accept.
    #[error("type mismatch: `{op}` is not defined for {operands}")]
    TypeMismatch { op: String, operands: String },

    #[error("unsupported operator `{0}`")]
    UnsupportedOperator(String),

    /// Accepted by the evaluator but not expressible in generated code.
    #[error("unsupported in code generation: {0}")]
    UnsupportedFeature(String),

    /// Planner/generator invariant violation, never a user input error.
    #[error("internal error: no literal pool entry for string variable `{0}`")]
    MissingLiteralEntry(String),

    /// Planner/generator invariant violation, never a user input error.
    #[error("internal error: no storage slot planned for variable `{0}`")]
    MissingSlot(String),

    #[error("cannot coerce {value} to {target}")]
    InvalidCoercion { value: String, target: &'static str },

    #[error("writing program output failed")]
    Output(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
