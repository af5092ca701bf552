//! Write generated assembly, one instruction or directive per line.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::model::ProcessedProgram;

pub const FILE_NAME: &str = "program.s";

pub fn emit(processed: &ProcessedProgram, out_dir: &Path) -> io::Result<PathBuf> {
    let path = out_dir.join(FILE_NAME);
    let mut out = BufWriter::new(File::create(&path)?);
    write_lines(&processed.assembly, &mut out)?;
    out.flush()?;
    Ok(path)
}

pub fn write_lines<W: Write>(lines: &[String], out: &mut W) -> io::Result<()> {
    for line in lines {
        writeln!(out, "{line}")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_line_is_terminated() {
        let lines = vec!["main:".to_string(), String::new(), "ebreak".to_string()];
        let mut out = Vec::new();
        write_lines(&lines, &mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "main:\n\nebreak\n");
    }
}
