pub mod cli;
pub mod logging;
pub mod model;
pub mod parser;
pub mod processor;
pub mod writer;

use std::io::Write;
use std::path::Path;

use anyhow::Context;
use clap::Parser;
use tracing::info;

use crate::model::Artifacts;
use crate::processor::target::RiscV;

pub fn run() -> anyhow::Result<()> {
    let args = cli::Cli::parse();
    logging::init(args.verbose);

    let stdout = std::io::stdout();
    run_with(&args, &mut stdout.lock())?;
    Ok(())
}

/// The whole pipeline; program output goes to `out`.
pub fn run_with<W: Write>(args: &cli::Cli, out: &mut W) -> anyhow::Result<Artifacts> {
    // 1. ── Load ───────────────────────────────────────────────────────
    let loaded = parser::load(args.input.as_deref()).with_context(|| "Loading program")?;

    let mut artifacts = Artifacts::default();

    // 2. ── Evaluate ───────────────────────────────────────────────────
    if !args.no_run {
        info!("running {}", loaded.name);
        processor::execute(&loaded.program, &mut *out)
            .with_context(|| format!("Running {}", loaded.name))?;

        create_output_dir(&args.output)?;
        let path = writer::tree::emit(&loaded.program, args.tree_format, &args.output)
            .with_context(|| "Writing parse tree dump")?;
        info!("parse tree written to {}", path.display());
        artifacts.tree = Some(path);
    }

    // 3. ── Compile ────────────────────────────────────────────────────
    if !args.no_compile {
        let processed = processor::compile(&loaded.program, &RiscV)
            .with_context(|| format!("Generating assembly for {}", loaded.name))?;

        create_output_dir(&args.output)?;
        let path = writer::asm::emit(&processed, &args.output)
            .with_context(|| "Writing assembly")?;
        info!("{} assembly written to {}", processed.target, path.display());
        artifacts.assembly = Some(path);
    }

    Ok(artifacts)
}

/// Only called once a pass has something to write.
fn create_output_dir(dir: &Path) -> anyhow::Result<()> {
    std::fs::create_dir_all(dir).with_context(|| format!("Creating {}", dir.display()))
}
