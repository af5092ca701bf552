//! Dump the parse tree, as an S-expression or as JSON.

use std::fmt;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::model::TreeFormat;
use crate::processor::ast::{Block, Expr, Program, Stmt};

pub fn emit(program: &Program, format: TreeFormat, out_dir: &Path) -> io::Result<PathBuf> {
    match format {
        TreeFormat::Sexpr => {
            let path = out_dir.join("ast.txt");
            fs::write(&path, render(program) + "\n")?;
            Ok(path)
        }
        TreeFormat::Json => {
            let path = out_dir.join("ast.json");
            let mut out = BufWriter::new(File::create(&path)?);
            serde_json::to_writer_pretty(&mut out, program)?;
            writeln!(out)?;
            out.flush()?;
            Ok(path)
        }
    }
}

/// `(program (assign a (int 5)) (print (var a)) …)`
pub fn render(program: &Program) -> String {
    Sexpr(program).to_string()
}

struct Sexpr<'a>(&'a Program);

impl fmt::Display for Sexpr<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("(program")?;
        for stmt in &self.0.statements {
            f.write_str(" ")?;
            stmt_sexpr(stmt, f)?;
        }
        f.write_str(")")
    }
}

fn block_sexpr(block: &Block, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str("(block")?;
    for stmt in &block.statements {
        f.write_str(" ")?;
        stmt_sexpr(stmt, f)?;
    }
    f.write_str(")")
}

fn stmt_sexpr(stmt: &Stmt, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match stmt {
        Stmt::Assign { name, value } => {
            write!(f, "(assign {name} ")?;
            expr_sexpr(value, f)?;
        }
        Stmt::Print { value } => {
            f.write_str("(print ")?;
            expr_sexpr(value, f)?;
        }
        Stmt::If {
            condition,
            then_block,
            else_block,
        } => {
            f.write_str("(if ")?;
            expr_sexpr(condition, f)?;
            f.write_str(" ")?;
            block_sexpr(then_block, f)?;
            if let Some(else_block) = else_block {
                f.write_str(" ")?;
                block_sexpr(else_block, f)?;
            }
        }
        Stmt::While { condition, body } => {
            f.write_str("(while ")?;
            expr_sexpr(condition, f)?;
            f.write_str(" ")?;
            block_sexpr(body, f)?;
        }
        Stmt::Block(block) => return block_sexpr(block, f),
    }
    f.write_str(")")
}

fn expr_sexpr(expr: &Expr, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match expr {
        Expr::Int(n) => write!(f, "(int {n})"),
        Expr::Float(x) => write!(f, "(float {x:?})"),
        Expr::Str(s) => write!(f, "(str {s:?})"),
        Expr::Var(name) => write!(f, "(var {name})"),
        Expr::Group(inner) => unary_sexpr("group", inner, f),
        Expr::Binary { op, left, right } => {
            write!(f, "({op} ")?;
            expr_sexpr(left, f)?;
            f.write_str(" ")?;
            expr_sexpr(right, f)?;
            f.write_str(")")
        }
        Expr::Not(inner) => unary_sexpr("!", inner, f),
        Expr::Round(inner) => unary_sexpr("round", inner, f),
    }
}

fn unary_sexpr(head: &str, inner: &Expr, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "({head} ")?;
    expr_sexpr(inner, f)?;
    f.write_str(")")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::script_parser::parse_program;

    #[test]
    fn test_render() {
        let test_cases = vec![
            ("a = 5;", "(program (assign a (int 5)))"),
            (
                "print((1 + x) * 2.5);",
                "(program (print (* (group (+ (int 1) (var x))) (float 2.5))))",
            ),
            (
                "if (!a) { s = \"q\\\"; } else { }",
                "(program (if (! (var a)) (block (assign s (str \"q\\\\\"))) (block)))",
            ),
            (
                "while (round(x) >= 1) { { } }",
                "(program (while (>= (round (var x)) (int 1)) (block (block))))",
            ),
        ];

        for (src, expected) in test_cases {
            let program = parse_program(src).unwrap();
            assert_eq!(render(&program), expected, "{src}");
        }
    }
}
