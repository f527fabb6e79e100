//! Data types describing IPTS pen traffic.
//!
//! These types are the decoded form of what the parser extracts from raw HID
//! report buffers. Field layout and value ranges follow the wire protocol;
//! integer widths are exactly the widths the firmware uses.

use serde::{Deserialize, Serialize};

use crate::NUM_COMPONENTS;

/// One antenna-axis measurement at a single frequency bin.
///
/// A row carries the nine I/Q samples around the antenna closest to the pen,
/// plus a firmware-computed squared-amplitude summary used as a
/// signal-strength gate. Components outside the screen are reported as
/// `(0, 0)` pairs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DftRow {
    /// Modulation frequency of this bin, as reported by the firmware.
    pub frequency: u32,

    /// Squared-amplitude summary computed by the firmware.
    pub magnitude: u32,

    /// Antenna index of the first sample.
    pub first: u8,

    /// Antenna index of the last sample.
    pub last: u8,

    /// Antenna index of the center sample.
    pub mid: u8,

    /// Index of the zero-response channel.
    pub zero: u8,

    /// In-phase samples.
    pub real: [i16; NUM_COMPONENTS],

    /// Quadrature samples.
    pub imag: [i16; NUM_COMPONENTS],
}

/// The kind of data a DFT window carries.
///
/// Codes not listed here do occur in the wild; they are preserved as
/// [`DftType::Unknown`] and ignored by the decoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DftType {
    /// Primary and secondary transmitter position data.
    Position,
    /// Position data in the second encoding used by some pens.
    Position2,
    /// MPP v2 button data.
    Dft0x0a,
    /// Phase-encoded button / eraser data.
    Button,
    /// Purpose unknown.
    Dft0x0b,
    /// Contact pressure, encoded as a frequency sweep.
    Pressure,
    /// Any other code.
    Unknown(u8),
}

impl From<u8> for DftType {
    fn from(code: u8) -> Self {
        match code {
            6 => Self::Position,
            7 => Self::Position2,
            8 => Self::Dft0x0a,
            9 => Self::Button,
            10 => Self::Dft0x0b,
            11 => Self::Pressure,
            other => Self::Unknown(other),
        }
    }
}

impl From<DftType> for u8 {
    fn from(kind: DftType) -> Self {
        match kind {
            DftType::Position => 6,
            DftType::Position2 => 7,
            DftType::Dft0x0a => 8,
            DftType::Button => 9,
            DftType::Dft0x0b => 10,
            DftType::Pressure => 11,
            DftType::Unknown(other) => other,
        }
    }
}

/// One frame of DFT measurements: a matching pair of X and Y axis rows.
///
/// Two windows with the same [`group`](Self::group) were captured coherently
/// by the firmware, so their phases are comparable. Windows from different
/// groups have uncorrelated phase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DftWindow {
    /// What this window describes.
    pub kind: DftType,

    /// Capture-batch token assigned by the firmware, if the device reports
    /// one.
    pub group: Option<u32>,

    /// Device timestamp, counting at roughly 8 MHz.
    pub timestamp: u32,

    /// Number of antennas on the X axis. Zero on some devices; fall back to
    /// [`Metadata::size`] in that case.
    pub width: u8,

    /// Number of antennas on the Y axis. Zero on some devices.
    pub height: u8,

    /// X axis rows. Index 0 is the primary transmitter, index 1 the
    /// secondary one (used for tilt).
    pub x: Vec<DftRow>,

    /// Y axis rows, same layout as [`x`](Self::x).
    pub y: Vec<DftRow>,
}

impl DftWindow {
    /// Creates an empty window of the given kind.
    #[must_use]
    pub fn new(kind: DftType) -> Self {
        Self {
            kind,
            group: None,
            timestamp: 0,
            width: 0,
            height: 0,
            x: Vec::new(),
            y: Vec::new(),
        }
    }

    /// Number of populated rows common to both axes.
    #[must_use]
    pub fn rows(&self) -> usize {
        self.x.len().min(self.y.len())
    }
}

/// The current state of a stylus.
///
/// One instance lives for the lifetime of its decoder and is updated in
/// place by every admitted frame. When `proximity` is false the positional
/// fields hold the last known values and must be treated as stale.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct StylusData {
    /// Whether the pen is close enough to the screen to be tracked.
    pub proximity: bool,

    /// Whether the pen is touching the screen.
    pub contact: bool,

    /// Whether the barrel button is pressed.
    pub button: bool,

    /// Whether the eraser end is active.
    pub rubber: bool,

    /// Device timestamp of the last sample, for pre-DFT stylus reports.
    pub timestamp: u16,

    /// X position as a fraction of the active area, in `[0, 1]`.
    pub x: f64,

    /// Y position as a fraction of the active area, in `[0, 1]`.
    pub y: f64,

    /// Contact pressure in `[0, 1]`.
    pub pressure: f64,

    /// Tilt angle from the screen normal, in `[0, π/2]` radians.
    pub altitude: f64,

    /// Tilt direction in the screen plane, in `[0, 2π)` radians.
    pub azimuth: f64,

    /// Hardware serial of the pen, for pre-DFT stylus reports.
    pub serial: u32,
}

/// Sensor grid and panel dimensions from the device metadata report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MetadataSize {
    /// Number of antenna rows (Y axis).
    pub rows: u32,
    /// Number of antenna columns (X axis).
    pub columns: u32,
    /// Physical panel width in micrometers.
    pub width: u32,
    /// Physical panel height in micrometers.
    pub height: u32,
}

/// Coordinate transform from the device metadata report.
///
/// Negative diagonal entries indicate an inverted axis.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct MetadataTransform {
    pub xx: f32,
    pub yx: f32,
    pub tx: f32,
    pub xy: f32,
    pub yy: f32,
    pub ty: f32,
}

/// Device metadata, queried through a HID feature report on devices that
/// support it.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Metadata {
    /// Sensor and panel dimensions.
    pub size: MetadataSize,

    /// Axis transform.
    pub transform: MetadataTransform,

    /// Undocumented byte between size and transform.
    pub unknown_byte: u8,

    /// Undocumented trailing floats.
    pub unknown: [f32; 16],
}

/// Identity and buffer geometry of the device producing the data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DeviceInfo {
    /// USB vendor ID.
    pub vendor: u16,

    /// USB product ID.
    pub product: u16,

    /// Size of one data buffer as read from the device.
    pub buffer_size: u64,
}
