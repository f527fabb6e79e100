//! # IPTS Stylus Core
//!
//! Core types for processing Intel Precise Touch & Stylus (IPTS) pen data in
//! userspace.
//!
//! Devices with a DFT based pen interface do not run position tracking in
//! firmware. Instead they emit windows of per-antenna Discrete Fourier
//! Transform measurements and leave the inversion — I/Q samples to sub-pixel
//! coordinates — to the host. This crate provides the building blocks shared
//! by the rest of the stack:
//!
//! - **DFT Types**: [`DftRow`], [`DftWindow`], [`DftType`] describing one
//!   frame of antenna measurements.
//! - **Stylus State**: [`StylusData`], the continuously updated output of the
//!   decoder.
//! - **Device Types**: [`Metadata`], [`DeviceInfo`] as reported by the
//!   touchscreen.
//! - **Configuration**: [`Config`] with the tunable decoder thresholds.
//! - **Events**: [`Event`] and [`EventSink`] for wiring parsers and decoders
//!   to consumers.

#![forbid(unsafe_code)]

pub mod config;
pub mod error;
pub mod events;
pub mod types;

pub use config::{Config, MppVersion};
pub use error::{CoreError, CoreResult};
pub use events::{Event, EventSink};
pub use types::{
    DeviceInfo, DftRow, DftType, DftWindow, Metadata, MetadataSize, MetadataTransform, StylusData,
};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Number of I/Q components in one DFT row. Fixed by the wire protocol.
pub const NUM_COMPONENTS: usize = 9;

/// Maximum number of rows per axis in one DFT window.
pub const MAX_ROWS: usize = 16;

/// Number of rows a pressure window carries on current firmware.
pub const PRESSURE_ROWS: usize = 16;

/// Prelude module for convenient imports.
///
/// ```rust
/// use ipts_stylus_core::prelude::*;
/// ```
pub mod prelude {
    pub use crate::config::{Config, MppVersion};
    pub use crate::error::{CoreError, CoreResult};
    pub use crate::events::{Event, EventSink};
    pub use crate::types::{DeviceInfo, DftRow, DftType, DftWindow, Metadata, StylusData};
    pub use crate::{MAX_ROWS, NUM_COMPONENTS, PRESSURE_ROWS};
}
