//! Storage and literal planning, run once before code generation.
//!
//! Every variable gets a slot, every string literal that is assigned or
//! printed gets a pool entry. The plan is complete before the first instruction is emitted, so
//! a `print` that runs ahead of its assignment in program order (inside a
//! loop) still finds its slot and type.

use std::collections::{HashMap, HashSet};

use tracing::debug;

use super::ast::{Block, Expr, Program, Stmt};
use super::error::{Error, Result};

/// Globally unique labels; the counter never resets within one compilation.
#[derive(Debug, Default)]
pub struct LabelAllocator {
    next: u32,
}

impl LabelAllocator {
    pub fn fresh(&mut self, prefix: &str) -> String {
        let label = format!("{prefix}{}", self.next);
        self.next += 1;
        label
    }

    pub fn allocated(&self) -> u32 {
        self.next
    }
}

#[derive(Debug, Default)]
pub struct StoragePlan {
    slots: HashMap<String, usize>,
    slot_count: usize,
    string_vars: HashSet<String>,
}

impl StoragePlan {
    fn insert_var(&mut self, name: &str) -> usize {
        if let Some(slot) = self.slots.get(name) {
            return *slot;
        }
        let slot = self.slot_count;
        self.slots.insert(name.to_string(), slot);
        self.slot_count += 1;
        slot
    }

    fn mark_string(&mut self, name: &str) {
        self.string_vars.insert(name.to_string());
    }

    pub fn contains(&self, name: &str) -> bool {
        self.slots.contains_key(name)
    }

    /// Label of the word reserved for `name`; the prefix keeps user names
    /// clear of generated labels.
    pub fn slot_label(name: &str) -> String {
        format!("var_{name}")
    }

    /// Whether the slot holds a reference into the literal pool.
    pub fn is_string(&self, name: &str) -> bool {
        self.string_vars.contains(name)
    }

    pub fn len(&self) -> usize {
        self.slot_count
    }

    pub fn is_empty(&self) -> bool {
        self.slot_count == 0
    }

    /// Variable names in slot order.
    pub fn variables(&self) -> Vec<&str> {
        let mut vars: Vec<(&str, usize)> =
            self.slots.iter().map(|(name, slot)| (name.as_str(), *slot)).collect();
        vars.sort_by_key(|(_, slot)| *slot);
        vars.into_iter().map(|(name, _)| name).collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LiteralEntry {
    pub label: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum Site {
    Assign(String),
    Print,
}

/// String literals of the program, in first-seen order.
#[derive(Debug, Default)]
pub struct LiteralPool {
    entries: Vec<LiteralEntry>,
    by_site: HashMap<(Site, String), usize>,
}

impl LiteralPool {
    fn insert(&mut self, site: Site, text: &str, labels: &mut LabelAllocator) -> usize {
        let key = (site, text.to_string());
        if let Some(index) = self.by_site.get(&key) {
            return *index;
        }
        let index = self.entries.len();
        self.entries.push(LiteralEntry {
            label: labels.fresh("str"),
            bytes: text.as_bytes().to_vec(),
        });
        self.by_site.insert(key, index);
        index
    }

    /// Label of the entry holding `text` for the assignment to `var`.
    pub fn label_for(&self, var: &str, text: &str) -> Result<&str> {
        self.by_site
            .get(&(Site::Assign(var.to_string()), text.to_string()))
            .map(|index| self.entries[*index].label.as_str())
            .ok_or_else(|| Error::MissingLiteralEntry(var.to_string()))
    }

    pub fn entries(&self) -> &[LiteralEntry] {
        &self.entries
    }
}

/// Output of the planning pass, consumed by the code generator.
#[derive(Debug, Default)]
pub struct Plan {
    pub storage: StoragePlan,
    pub pool: LiteralPool,
    pub labels: LabelAllocator,
}

pub fn plan(program: &Program) -> Plan {
    let mut planner = Plan::default();
    for stmt in &program.statements {
        planner.visit_stmt(stmt);
    }
    debug!(
        "planned {} slots ({} string), {} literals",
        planner.storage.len(),
        planner.storage.string_vars.len(),
        planner.pool.entries.len()
    );
    planner
}

impl Plan {
    fn visit_block(&mut self, block: &Block) {
        for stmt in &block.statements {
            self.visit_stmt(stmt);
        }
    }

    fn visit_stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Assign { name, value } => {
                self.storage.insert_var(name);
                if let Expr::Str(text) = value.ungrouped() {
                    self.storage.mark_string(name);
                    self.pool
                        .insert(Site::Assign(name.clone()), text, &mut self.labels);
                }
                self.visit_expr(value);
            }
            Stmt::Print { value } => {
                if let Expr::Str(text) = value.ungrouped() {
                    self.pool.insert(Site::Print, text, &mut self.labels);
                }
                self.visit_expr(value);
            }
            Stmt::If {
                condition,
                then_block,
                else_block,
            } => {
                self.visit_expr(condition);
                self.visit_block(then_block);
                if let Some(else_block) = else_block {
                    self.visit_block(else_block);
                }
            }
            Stmt::While { condition, body } => {
                self.visit_expr(condition);
                self.visit_block(body);
            }
            Stmt::Block(block) => self.visit_block(block),
        }
    }

    // names that are only ever read still get a zeroed slot
    fn visit_expr(&mut self, expr: &Expr) {
        match expr {
            Expr::Var(name) => {
                self.storage.insert_var(name);
            }
            Expr::Int(_) | Expr::Float(_) | Expr::Str(_) => {}
            Expr::Group(inner) | Expr::Not(inner) | Expr::Round(inner) => self.visit_expr(inner),
            Expr::Binary { left, right, .. } => {
                self.visit_expr(left);
                self.visit_expr(right);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processor::ast::BinaryOp;

    fn assign(name: &str, value: Expr) -> Stmt {
        Stmt::Assign {
            name: name.into(),
            value,
        }
    }

    #[test]
    fn test_collects_slots_and_literals() {
        let program = Program {
            statements: vec![
                assign("a", Expr::Int(1)),
                assign("s", Expr::Str("hi".into())),
                Stmt::While {
                    condition: Expr::Var("a".into()),
                    body: Block {
                        statements: vec![
                            Stmt::Print {
                                value: Expr::Var("t".into()),
                            },
                            assign("t", Expr::Group(Box::new(Expr::Str("yo".into())))),
                            assign(
                                "a",
                                Expr::binary(BinaryOp::Sub, Expr::Var("a".into()), Expr::Int(1)),
                            ),
                        ],
                    },
                },
            ],
        };

        let plan = plan(&program);
        assert_eq!(plan.storage.variables(), vec!["a", "s", "t"]);
        assert!(plan.storage.is_string("s"));
        assert!(plan.storage.is_string("t"));
        assert!(!plan.storage.is_string("a"));
        assert!(plan.storage.contains("t"));
        assert!(!plan.storage.contains("missing"));
        assert_eq!(StoragePlan::slot_label("t"), "var_t");

        assert_eq!(
            plan.pool.entries(),
            &[
                LiteralEntry {
                    label: "str0".into(),
                    bytes: b"hi".to_vec(),
                },
                LiteralEntry {
                    label: "str1".into(),
                    bytes: b"yo".to_vec(),
                },
            ]
        );
        assert_eq!(plan.pool.label_for("t", "yo").unwrap(), "str1");
        assert_eq!(plan.labels.allocated(), 2);
    }

    #[test]
    fn test_read_only_names_get_slots() {
        let program = Program {
            statements: vec![Stmt::Print {
                value: Expr::Not(Box::new(Expr::Var("ghost".into()))),
            }],
        };
        let plan = plan(&program);
        assert_eq!(plan.storage.variables(), vec!["ghost"]);
    }

    #[test]
    fn test_repeated_literal_shares_entry() {
        let program = Program {
            statements: vec![
                assign("s", Expr::Str("x".into())),
                assign("s", Expr::Str("x".into())),
                assign("s", Expr::Str("y".into())),
            ],
        };
        let plan = plan(&program);
        assert_eq!(plan.pool.entries().len(), 2);
        assert_eq!(plan.storage.len(), 1);
    }

    #[test]
    fn test_printed_literals_are_pooled_once() {
        let print = |text: &str| Stmt::Print {
            value: Expr::Str(text.into()),
        };
        let program = Program {
            statements: vec![
                print("a"),
                print("b"),
                print("a"),
                assign("s", Expr::Str("a".into())),
            ],
        };
        let plan = plan(&program);

        let labels: Vec<&str> = plan.pool.entries().iter().map(|e| e.label.as_str()).collect();
        assert_eq!(labels, vec!["str0", "str1", "str2"]);
        // the assignment keeps its own entry
        assert_eq!(plan.pool.label_for("s", "a").unwrap(), "str2");
        assert!(plan.storage.is_string("s"));
    }

    #[test]
    fn test_missing_literal_entry() {
        let plan = plan(&Program::default());
        assert!(matches!(
            plan.pool.label_for("s", "x"),
            Err(Error::MissingLiteralEntry(name)) if name == "s"
        ));
    }
}
