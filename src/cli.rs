use clap::{ArgAction, Parser};
use std::path::PathBuf;

use crate::model::TreeFormat;

#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Program source, or a `.json` parse tree. Runs a built-in sample when
    /// omitted.
    pub input: Option<PathBuf>,

    /// Output directory for `ast.txt`/`ast.json` and `program.s`
    #[arg(short, long, default_value = ".")]
    pub output: PathBuf,

    /// Rendering of the parse tree dump
    #[arg(long, value_enum, default_value_t = TreeFormat::Sexpr)]
    pub tree_format: TreeFormat,

    /// Do not run the program (no tree dump either)
    #[arg(long)]
    pub no_run: bool,

    /// Do not generate assembly
    #[arg(long)]
    pub no_compile: bool,

    /// More log output on stderr (-v, -vv, -vvv); RUST_LOG wins when set
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}
