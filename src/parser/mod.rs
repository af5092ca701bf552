//! Component 1 – getting a parse tree.
//!
//! Either parse program text ourselves, or take a tree some other front
//! end already produced and serialized as JSON.

pub mod error;
pub mod lexer;
pub mod script_parser;

pub use error::ParseError;

use std::path::Path;

use anyhow::{Context, Result, anyhow};
use tracing::info;

use crate::model::LoadedProgram;
use crate::processor::ast::Program;

/// Used when no input file is given.
pub const DEFAULT_PROGRAM: &str = r#"print("if without else");
a = 5;
b = 10;
if (a < b) {
    print(1);
}

print("if with else");
c = 15;
if (c < 10) {
    print(0);
} else {
    print(2);
}

print("while loop");
i = 0;
while (i < 3) {
    print(i);
    i = i + 1;
}
"#;

/// Load the program named on the command line, or the built-in sample.
///
/// Files ending in `.json` hold a serialized parse tree; anything else is
/// program text.
pub fn load(input: Option<&Path>) -> Result<LoadedProgram> {
    let Some(path) = input else {
        info!("no input given, using the built-in sample program");
        return Ok(LoadedProgram {
            name: "<default>".into(),
            program: load_from_source(DEFAULT_PROGRAM)?,
        });
    };

    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Reading {}", path.display()))?;
    info!("{} loaded, size: {} bytes", path.display(), text.len());

    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    let program = if is_json {
        load_from_json(&text)?
    } else {
        load_from_source(&text)?
    };

    Ok(LoadedProgram {
        name: path.display().to_string(),
        program,
    })
}

pub fn load_from_source(src: &str) -> Result<Program> {
    let program = script_parser::parse_program(src).map_err(|e| anyhow!("Parse error: {e}"))?;
    info!("parsed {} top-level statements", program.statements.len());
    Ok(program)
}

pub fn load_from_json(json: &str) -> Result<Program> {
    let program: Program =
        serde_json::from_str(json).map_err(|e| anyhow!("Failed to read parse tree JSON: {e}"))?;
    info!(
        "parse tree JSON loaded, {} top-level statements",
        program.statements.len()
    );
    Ok(program)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_program_parses() {
        let loaded = load(None).unwrap();
        assert_eq!(loaded.name, "<default>");
        assert_eq!(loaded.program.statements.len(), 10);
    }

    #[test]
    fn test_source_errors_carry_line() {
        let err = load_from_source("a = 1;\nb = ;").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Parse error: line 2: expected an expression, found `;`"
        );
    }

    #[test]
    fn test_json_errors() {
        let err = load_from_json(r#"{"statements": [{"jump": {}}]}"#).unwrap_err();
        assert!(err.to_string().starts_with("Failed to read parse tree JSON"), "{err}");
    }
}
