use std::path::PathBuf;

use clap::ValueEnum;

use crate::processor::ast::Program;

/// Parse tree as it comes out of the loader, plus where it came from.
#[derive(Debug, Clone)]
pub struct LoadedProgram {
    pub name: String,
    pub program: Program,
}

/// Fully processed output handed to `writer`.
#[derive(Debug, Clone)]
pub struct ProcessedProgram {
    /// Name of the instruction set the lines are written for.
    pub target: &'static str,
    pub assembly: Vec<String>,
}

/// How the parse tree dump is rendered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum TreeFormat {
    /// One-line S-expression, `ast.txt`.
    #[default]
    Sexpr,
    /// Pretty-printed JSON, `ast.json`.
    Json,
}

/// Paths of the artifacts one run wrote.
#[derive(Debug, Default)]
pub struct Artifacts {
    pub tree: Option<PathBuf>,
    pub assembly: Option<PathBuf>,
}
