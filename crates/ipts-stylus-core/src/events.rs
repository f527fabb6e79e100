//! Event plumbing between producers and consumers.
//!
//! The parser emits tagged [`Event`] values; applications implement
//! [`EventSink`] to observe the decoded stream. All methods default to
//! no-ops so a sink only implements what it cares about.

use crate::types::{DftWindow, Metadata, StylusData};

/// A typed event extracted from one device buffer.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// A fully decoded stylus sample from a pre-DFT device.
    Stylus(StylusData),

    /// One DFT window from a DFT based pen.
    Dft(DftWindow),

    /// A device metadata report.
    Metadata(Metadata),
}

/// Receiver for the decoded event stream.
pub trait EventSink {
    /// Called when the data flow starts.
    fn on_start(&mut self) {}

    /// Called when the data flow stops.
    fn on_stop(&mut self) {}

    /// Called with the current stylus state after every stylus update.
    fn on_stylus(&mut self, _stylus: &StylusData) {}

    /// Called with every DFT window, after the decoder has consumed it.
    fn on_dft(&mut self, _window: &DftWindow) {}

    /// Called with the current pressure after a pressure window.
    fn on_pressure(&mut self, _pressure: f64) {}
}
