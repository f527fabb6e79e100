//! # IPTS Stylus Signal Processing
//!
//! Decoding of DFT pen measurements into a continuous stylus state.
//!
//! DFT based pens report windows of antenna measurements instead of readily
//! usable coordinates. This crate performs the physical inversion: it turns
//! the I/Q samples and magnitude summaries of a [`DftWindow`] into position,
//! tilt, pressure and button state, tracking the cross-frame phase reference
//! and capture-group bookkeeping that the pen protocol requires.
//!
//! The entry point is [`DftStylus`]:
//!
//! ```rust
//! use ipts_stylus_core::{Config, DftType, DftWindow};
//! use ipts_stylus_signal::DftStylus;
//!
//! let config = Config {
//!     width: 259.2,
//!     height: 173.4,
//!     ..Config::default()
//! };
//!
//! let mut decoder = DftStylus::new(config, None);
//! decoder.input(&DftWindow::new(DftType::Position));
//!
//! // A window without usable signal lifts the pen.
//! assert!(!decoder.stylus().proximity);
//! ```
//!
//! [`DftWindow`]: ipts_stylus_core::DftWindow

#![forbid(unsafe_code)]

pub mod dft;
pub mod interpolate;

pub use dft::DftStylus;
pub use interpolate::{interpolate_frequency, interpolate_position};
