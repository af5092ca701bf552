//! Parse tree handed over by the front end.
//!
//! Statement kind is decided once, by whoever builds the tree; every pass
//! downstream dispatches on these variants and never looks at token text.

use serde::{Deserialize, Serialize};

use super::error::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Eq,
    Ne,
    Lt,
    Gt,
    Le,
    Ge,
    And,
    Or,
}

impl BinaryOp {
    /// Every operator in source-symbol form; index order is irrelevant.
    pub const ALL: &'static [BinaryOp] = &[
        BinaryOp::Add,
        BinaryOp::Sub,
        BinaryOp::Mul,
        BinaryOp::Div,
        BinaryOp::Eq,
        BinaryOp::Ne,
        BinaryOp::Lt,
        BinaryOp::Gt,
        BinaryOp::Le,
        BinaryOp::Ge,
        BinaryOp::And,
        BinaryOp::Or,
    ];

    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Eq => "==",
            BinaryOp::Ne => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::Gt => ">",
            BinaryOp::Le => "<=",
            BinaryOp::Ge => ">=",
            BinaryOp::And => "&&",
            BinaryOp::Or => "||",
        }
    }

    pub fn from_symbol(symbol: &str) -> Result<Self, Error> {
        Self::ALL
            .iter()
            .copied()
            .find(|op| op.symbol() == symbol)
            .ok_or_else(|| Error::UnsupportedOperator(symbol.to_string()))
    }

    pub fn is_comparison(self) -> bool {
        matches!(
            self,
            BinaryOp::Eq | BinaryOp::Ne | BinaryOp::Lt | BinaryOp::Gt | BinaryOp::Le | BinaryOp::Ge
        )
    }
}

impl TryFrom<String> for BinaryOp {
    type Error = Error;

    fn try_from(symbol: String) -> Result<Self, Self::Error> {
        BinaryOp::from_symbol(&symbol)
    }
}

impl From<BinaryOp> for String {
    fn from(op: BinaryOp) -> Self {
        op.symbol().to_string()
    }
}

impl std::fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.symbol())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Expr {
    Int(i32),
    Float(f64),
    Str(String),
    Var(String),
    /// `( expr )` – kept so the tree dump mirrors the source.
    Group(Box<Expr>),
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Not(Box<Expr>),
    Round(Box<Expr>),
}

impl Expr {
    pub fn binary(op: BinaryOp, left: Expr, right: Expr) -> Self {
        Expr::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    /// Strips any number of enclosing parentheses.
    pub fn ungrouped(&self) -> &Expr {
        let mut expr = self;
        while let Expr::Group(inner) = expr {
            expr = inner;
        }
        expr
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Block {
    pub statements: Vec<Stmt>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stmt {
    /// `name = expr;`
    Assign { name: String, value: Expr },

    /// `print(expr);`
    Print { value: Expr },

    /// `if (cond) { … } [else { … }]`
    If {
        condition: Expr,
        then_block: Block,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        else_block: Option<Block>,
    },

    /// `while (cond) { … }`
    While { condition: Expr, body: Block },

    /// Bare `{ … }`; shares the enclosing scope.
    Block(Block),
}

/// One complete program.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Program {
    pub statements: Vec<Stmt>,
}
