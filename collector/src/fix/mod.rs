//! Shared fix module for rewriting source files.
//!
//! The core component is `ByteRangeRewriter`, which applies edits using byte
//! offsets so that everything outside a replaced loop is left untouched. It is
//! the tree-mutation backend for [`crate::quickfix::FixContext`].

mod rewriter;

pub use rewriter::{ByteRangeRewriter, Edit, RewriteError};
