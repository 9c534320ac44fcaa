//! Core library for the Collector refactoring tool.
//!
//! Collector finds PHP `foreach` loops that can be expressed as
//! `collect(...)->each(function (...) use (...) {...});` and rewrites them.

#![allow(clippy::similar_names, clippy::items_after_statements)]
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used))]

/// Module containing the core analyzer logic.
/// This includes the `Collector` struct and the analysis result types.
pub mod analyzer;

/// Module containing the tree-sitter backed PHP concrete syntax tree.
pub mod cst;

/// Module containing the byte-range rewriter used to apply fixes.
pub mod fix;

/// Module containing the quick-fix infrastructure and the foreach-to-collection fix.
pub mod quickfix;

/// Module containing the inspection that reports refactorable loops.
pub mod inspection;

/// Module for loading configuration.
pub mod config;

/// Module containing utility functions.
pub mod utils;

/// Module defining the entry point logic shared by the binary and tests.
pub mod entry_point;

/// Module containing shared constants and regex patterns.
pub mod constants;

/// Module for rich CLI output formatting with colored text and progress bars.
pub mod output;

/// Module defining the command-line interface arguments and structs.
pub mod cli;

/// Module for handling CLI commands and their execution logic.
pub mod commands;
