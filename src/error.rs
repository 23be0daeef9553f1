//! Error types for the B-tree.

use thiserror::Error;

/// Result type alias for tree operations
pub type Result<T> = std::result::Result<T, BTreeError>;

/// Errors that can occur while building, querying, or scripting a tree
#[derive(Error, Debug)]
pub enum BTreeError {
    /// Requested per-node key capacity is outside the supported range
    #[error("Key capacity {requested} out of range (must be between {min} and {max})")]
    CapacityOutOfRange {
        requested: usize,
        min: usize,
        max: usize,
    },

    /// Operation requires at least one key in the tree
    #[error("Tree is empty")]
    EmptyTree,

    /// Structural invariant violated (reported by validation)
    #[error("Invariant violated: {0}")]
    Corruption(String),

    /// I/O error while reading a command script
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Command script line could not be parsed
    #[error("Script line {line}: {message}")]
    Parse { line: usize, message: String },
}

impl BTreeError {
    /// Create a corruption error with a message
    pub fn corruption(msg: impl Into<String>) -> Self {
        Self::Corruption(msg.into())
    }

    /// Create a parse error for a 1-based script line
    pub fn parse(line: usize, msg: impl Into<String>) -> Self {
        Self::Parse {
            line,
            message: msg.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = BTreeError::CapacityOutOfRange {
            requested: 1,
            min: 2,
            max: 1000,
        };
        assert_eq!(
            err.to_string(),
            "Key capacity 1 out of range (must be between 2 and 1000)"
        );

        assert_eq!(BTreeError::EmptyTree.to_string(), "Tree is empty");
        assert_eq!(
            BTreeError::parse(3, "unknown action 'x'").to_string(),
            "Script line 3: unknown action 'x'"
        );
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: BTreeError = io_err.into();
        assert!(matches!(err, BTreeError::Io(_)));
    }
}
