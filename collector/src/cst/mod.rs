//! CST (Concrete Syntax Tree) module for PHP source.
//!
//! This module provides Tree-sitter based CST parsing for:
//! - Locating `foreach` loops and the variables they reference
//! - Precise byte ranges for replacing a loop in place
//! - Re-parsing synthesized snippets into detached statement nodes
//!
//! # Design Principles
//!
//! - **Source order**: every query returns nodes in pre-order, which is source order
//! - **Byte-range anchored**: edits are expressed as byte offsets into the original source

mod parser;

pub use parser::{CstError, CstNode, CstParser, CstTree, Point};
