//! Byte-range safe code rewriter.
//!
//! Applies replacement edits using byte ranges, so everything outside the
//! replaced ranges is kept byte for byte.
//!
//! # Usage
//!
//! ```
//! use collector::fix::{ByteRangeRewriter, Edit};
//!
//! let source = "<?php foreach ($a as $b) echo $b;";
//! let mut rewriter = ByteRangeRewriter::new(source);
//! rewriter.add_edit(Edit::new(6, source.len(), "echo 1;"));
//! let fixed = rewriter.apply().expect("should apply");
//! assert_eq!(fixed, "<?php echo 1;");
//! ```

use thiserror::Error;

use crate::cst::CstParser;

/// A single edit operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edit {
    /// Start byte offset (inclusive)
    pub start_byte: usize,
    /// End byte offset (exclusive)
    pub end_byte: usize,
    /// Replacement content
    pub replacement: String,
    /// Optional description shown in previews
    pub description: Option<String>,
}

impl Edit {
    /// Create a new edit
    #[must_use]
    pub fn new(start_byte: usize, end_byte: usize, replacement: impl Into<String>) -> Self {
        Self {
            start_byte,
            end_byte,
            replacement: replacement.into(),
            description: None,
        }
    }

    /// Create an edit with description
    #[must_use]
    pub fn with_description(
        start_byte: usize,
        end_byte: usize,
        replacement: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            description: Some(description.into()),
            ..Self::new(start_byte, end_byte, replacement)
        }
    }

    /// Check if this edit overlaps with another
    #[must_use]
    pub const fn overlaps(&self, other: &Self) -> bool {
        self.start_byte < other.end_byte && other.start_byte < self.end_byte
    }
}

/// Error during rewriting
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RewriteError {
    /// Two or more edits have overlapping ranges
    #[error("Overlapping edits at indices {edit_a} and {edit_b}")]
    OverlappingEdits {
        /// Index of first overlapping edit
        edit_a: usize,
        /// Index of second overlapping edit
        edit_b: usize,
    },
    /// Edit range is out of bounds
    #[error("Edit {edit_index} out of bounds: end_byte {end_byte} > source length {source_len}")]
    OutOfBounds {
        /// Index of the bad edit
        edit_index: usize,
        /// End byte of the edit
        end_byte: usize,
        /// Length of the source
        source_len: usize,
    },
    /// Edit boundary falls inside a multi-byte character
    #[error("Edit {edit_index} does not start and end on character boundaries")]
    InvalidUtf8 {
        /// Index of the bad edit
        edit_index: usize,
    },
    /// Rewritten source no longer parses cleanly
    #[error("Rewritten source contains syntax errors")]
    Unparsable,
}

/// Safe code rewriter using byte ranges
///
/// This rewriter applies edits in reverse order to preserve byte positions,
/// and validates that edits don't overlap.
#[derive(Debug, Clone)]
pub struct ByteRangeRewriter {
    source: String,
    edits: Vec<Edit>,
}

impl ByteRangeRewriter {
    /// Create a new rewriter for the given source
    #[must_use]
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            edits: Vec::new(),
        }
    }

    /// Pending edits, in insertion order
    #[must_use]
    pub fn edits(&self) -> &[Edit] {
        &self.edits
    }

    /// Add an edit to the pending list
    pub fn add_edit(&mut self, edit: Edit) {
        self.edits.push(edit);
    }

    /// Get the number of pending edits
    #[must_use]
    pub fn edit_count(&self) -> usize {
        self.edits.len()
    }

    /// Validate edits without applying them
    ///
    /// # Errors
    /// Returns error if edits overlap, are out of bounds, or split a character
    pub fn validate(&self) -> Result<(), RewriteError> {
        for (i, edit) in self.edits.iter().enumerate() {
            if edit.end_byte > self.source.len() || edit.start_byte > edit.end_byte {
                return Err(RewriteError::OutOfBounds {
                    edit_index: i,
                    end_byte: edit.end_byte,
                    source_len: self.source.len(),
                });
            }
            if !self.source.is_char_boundary(edit.start_byte)
                || !self.source.is_char_boundary(edit.end_byte)
            {
                return Err(RewriteError::InvalidUtf8 { edit_index: i });
            }
        }

        for i in 0..self.edits.len() {
            for j in (i + 1)..self.edits.len() {
                if self.edits[i].overlaps(&self.edits[j]) {
                    return Err(RewriteError::OverlappingEdits {
                        edit_a: i,
                        edit_b: j,
                    });
                }
            }
        }

        Ok(())
    }

    /// Apply all edits and return the modified source
    ///
    /// Edits are applied from the end of the source towards the start so
    /// earlier offsets stay valid.
    ///
    /// # Errors
    /// Returns error if edits overlap or are out of bounds
    pub fn apply(self) -> Result<String, RewriteError> {
        self.validate()?;

        let mut result = self.source;
        let mut sorted_edits = self.edits;
        sorted_edits.sort_by(|a, b| b.start_byte.cmp(&a.start_byte));

        for edit in sorted_edits {
            result.replace_range(edit.start_byte..edit.end_byte, &edit.replacement);
        }

        Ok(result)
    }

    /// Apply edits and verify the result still parses as PHP
    ///
    /// A source that already had syntax errors is not held to a stricter
    /// standard after rewriting.
    ///
    /// # Errors
    /// Returns error if edits are invalid or the result gained syntax errors
    pub fn apply_verified(self) -> Result<String, RewriteError> {
        let mut parser = CstParser::new().map_err(|_| RewriteError::Unparsable)?;
        let was_clean = parser
            .parse(&self.source)
            .is_ok_and(|tree| !tree.has_error);

        let result = self.apply()?;

        if was_clean {
            let tree = parser
                .parse(&result)
                .map_err(|_| RewriteError::Unparsable)?;
            if tree.has_error {
                return Err(RewriteError::Unparsable);
            }
        }

        Ok(result)
    }
}
