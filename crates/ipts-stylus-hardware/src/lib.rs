//! # IPTS Stylus Hardware Interface
//!
//! Byte-level parsing of IPTS touch data buffers.
//!
//! The device delivers opaque HID report buffers containing nested frames
//! and report lists. This crate walks that structure and surfaces the typed
//! events the rest of the stack operates on: pre-decoded stylus samples from
//! older devices, DFT windows from pen-DFT devices, and device metadata.
//!
//! # Design Principles
//!
//! 1. **No device dependency at compile time**: parsing operates on byte
//!    slices, not on file descriptors or FFI.
//! 2. **No invented data**: a buffer either parses or yields a specific
//!    [`ParseError`]; truncated input never panics and never produces
//!    partial events.
//! 3. **Deterministic**: same bytes in, same events out.
//!
//! # Example
//!
//! ```rust
//! use ipts_stylus_hardware::{Parser, ParseError};
//!
//! let mut parser = Parser::new();
//! let buffer: &[u8] = &[/* one HID report buffer */];
//!
//! match parser.parse(buffer) {
//!     Ok(events) => {
//!         for event in &events {
//!             println!("{event:?}");
//!         }
//!     }
//!     Err(ParseError::InsufficientData { needed, got }) => {
//!         eprintln!("truncated buffer: need {needed}, got {got}");
//!     }
//!     Err(e) => eprintln!("parse error: {e}"),
//! }
//! ```

#![forbid(unsafe_code)]

mod error;
mod parser;
pub mod protocol;
mod reader;

pub use error::ParseError;
pub use parser::{read_metadata, Parser};
pub use reader::Reader;
