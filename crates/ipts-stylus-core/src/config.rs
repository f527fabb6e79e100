//! Decoder configuration.
//!
//! All thresholds that gate the DFT decoding are collected here. The values
//! are tuned per device through preset files; the defaults match the common
//! Surface generations.

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::types::Metadata;

/// Microsoft Pen Protocol generation of the connected pen.
///
/// A v1 pen encodes button and eraser by inverting the transmitter phase
/// relative to the position signal. A v2 pen signals the button through a
/// dedicated `0x0a` DFT window instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MppVersion {
    #[default]
    V1,
    V2,
}

/// Tunable parameters of the stylus pipeline.
///
/// The decoder takes an immutable snapshot of this at construction; runtime
/// reconfiguration means building a new decoder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Whether the X axis of the screen is inverted.
    pub invert_x: bool,

    /// Whether the Y axis of the screen is inverted.
    pub invert_y: bool,

    /// Physical width of the screen in millimeters.
    pub width: f64,

    /// Physical height of the screen in millimeters.
    pub height: f64,

    /// Pen protocol generation, selects the button detection strategy.
    pub mpp_version: MppVersion,

    /// Whether to ignore all stylus inputs.
    pub stylus_disable: bool,

    /// Minimum phase-aligned amplitude for position interpolation.
    pub dft_position_min_amp: u32,

    /// Minimum row magnitude for a position window to be admitted.
    pub dft_position_min_mag: u32,

    /// Exponent applied to the aligned amplitudes before fitting the
    /// spatial parabola. Values above one sharpen the peak.
    pub dft_position_exp: f64,

    /// Decode `Position2` windows like `Position` windows.
    pub dft_position2: bool,

    /// Minimum row magnitude for a button window to be evaluated.
    pub dft_button_min_mag: u32,

    /// Minimum summed magnitude for the pressure frequency sweep.
    pub dft_freq_min_mag: u32,

    /// Minimum secondary-transmitter magnitude for tilt extraction.
    pub dft_tilt_min_mag: u32,

    /// Distance between the primary and secondary transmitter in
    /// millimeters.
    pub dft_tilt_distance: f64,

    /// Distance between transmitter and pen tip in millimeters; used to
    /// correct the reported position under tilt.
    pub dft_tip_distance: f64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            invert_x: false,
            invert_y: false,
            width: 0.0,
            height: 0.0,
            mpp_version: MppVersion::V1,
            stylus_disable: false,
            dft_position_min_amp: 50,
            dft_position_min_mag: 2000,
            dft_position_exp: 2.0,
            dft_position2: false,
            dft_button_min_mag: 1000,
            dft_freq_min_mag: 10_000,
            dft_tilt_min_mag: 10_000,
            dft_tilt_distance: 0.6,
            dft_tip_distance: 0.0,
        }
    }
}

impl Config {
    /// Fills the screen geometry from a device metadata report.
    ///
    /// The metadata carries the panel size in micrometers and encodes axis
    /// inversion as negative diagonal entries of the transform.
    pub fn apply_metadata(&mut self, metadata: &Metadata) {
        self.width = f64::from(metadata.size.width) / 1e3;
        self.height = f64::from(metadata.size.height) / 1e3;
        self.invert_x = metadata.transform.xx < 0.0;
        self.invert_y = metadata.transform.yy < 0.0;
    }

    /// Checks that the configuration is usable for decoding.
    ///
    /// # Errors
    ///
    /// Returns an error if the screen size is missing or a numeric
    /// parameter is out of its valid domain.
    pub fn validate(&self) -> CoreResult<()> {
        if self.width <= 0.0 || self.height <= 0.0 {
            return Err(CoreError::invalid_config(
                "screen size is zero; set it in the config or provide metadata",
            ));
        }

        if self.dft_tilt_distance <= 0.0 {
            return Err(CoreError::invalid_config("dft_tilt_distance must be positive"));
        }

        if !self.dft_position_exp.is_finite() {
            return Err(CoreError::invalid_config("dft_position_exp must be finite"));
        }

        Ok(())
    }
}
