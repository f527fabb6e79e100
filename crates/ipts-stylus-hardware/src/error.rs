//! Error types for buffer parsing.

use thiserror::Error;

/// Errors that can occur while walking an IPTS data buffer.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    /// The buffer ends before the structure it declares.
    #[error("insufficient data: need {needed} bytes, got {got}")]
    InsufficientData {
        /// Bytes required by the declared structure.
        needed: usize,
        /// Bytes actually remaining.
        got: usize,
    },

    /// A frame declares a size smaller than its own header.
    #[error("invalid frame size: {size} bytes")]
    InvalidFrameSize {
        /// The declared size.
        size: u32,
    },

    /// A DFT window declares more rows than the protocol allows.
    #[error("invalid row count: {count} (max {max})")]
    InvalidRowCount {
        /// The declared number of rows.
        count: u8,
        /// The protocol maximum.
        max: usize,
    },

    /// A stylus report declares no elements.
    #[error("empty stylus report")]
    EmptyStylusReport,
}
