//! Component 3 – persisting artifacts.
//!
//! Callers only reach these after the producing pass succeeded, so a file
//! on disk is always a complete one.
pub mod asm;
pub mod tree;
