//! Wire-protocol constants of the IPTS touch interface.
//!
//! Byte layouts are described next to the parser functions that read them;
//! this module only collects the identifiers and fixed sizes.

/// HID frame containing raw data from devices without native HID support.
pub const HID_FRAME_TYPE_RAW: u8 = 0xEE;
/// HID frame containing further HID frames.
pub const HID_FRAME_TYPE_HID: u8 = 0x00;
/// HID frame containing a capacitive heatmap.
pub const HID_FRAME_TYPE_HEATMAP: u8 = 0x01;
/// HID frame containing device metadata.
pub const HID_FRAME_TYPE_METADATA: u8 = 0x02;
/// HID frame containing a report list.
pub const HID_FRAME_TYPE_REPORTS: u8 = 0xFF;

/// Raw frame family carrying stylus reports.
pub const RAW_FRAME_TYPE_STYLUS: u16 = 0x06;
/// Raw frame family carrying heatmap reports.
pub const RAW_FRAME_TYPE_HEATMAP: u16 = 0x08;

/// First generation pre-decoded stylus report.
pub const REPORT_TYPE_STYLUS_V1: u8 = 0x10;
/// Second generation pre-decoded stylus report, with tilt.
pub const REPORT_TYPE_STYLUS_V2: u8 = 0x60;
/// Heatmap dimensions report, also scales DFT windows.
pub const REPORT_TYPE_DIMENSIONS: u8 = 0x03;
/// Pen DFT window report.
pub const REPORT_TYPE_PEN_DFT_WINDOW: u8 = 0x5C;
/// Pen metadata report carrying the capture-group counter.
pub const REPORT_TYPE_PEN_METADATA: u8 = 0x5F;

/// Size of the report id / timestamp header in front of every buffer.
pub const BUFFER_HEADER_SIZE: usize = 3;
/// Size of a HID frame header (the declared frame size includes it).
pub const HID_FRAME_HEADER_SIZE: usize = 7;
/// Size of a raw data header.
pub const RAW_HEADER_SIZE: usize = 12;
/// Size of one raw frame header (payload size excludes it).
pub const RAW_FRAME_HEADER_SIZE: usize = 16;
/// Size of one report header (payload size excludes it).
pub const REPORT_HEADER_SIZE: usize = 4;

/// Size of one stylus report element, first generation.
pub const STYLUS_ELEMENT_V1_SIZE: usize = 12;
/// Size of one stylus report element, second generation.
pub const STYLUS_ELEMENT_V2_SIZE: usize = 16;

/// Maximum X coordinate reported by pre-decoded stylus data.
pub const STYLUS_MAX_X: f64 = 9600.0;
/// Maximum Y coordinate reported by pre-decoded stylus data.
pub const STYLUS_MAX_Y: f64 = 7200.0;
/// Pressure levels of a first generation stylus.
pub const STYLUS_MAX_PRESSURE_V1: f64 = 1024.0;
/// Pressure levels of a second generation stylus.
pub const STYLUS_MAX_PRESSURE_V2: f64 = 4096.0;

/// Stylus mode bit: pen in proximity.
pub const STYLUS_MODE_PROXIMITY: u16 = 1 << 0;
/// Stylus mode bit: pen touching the screen.
pub const STYLUS_MODE_CONTACT: u16 = 1 << 1;
/// Stylus mode bit: barrel button pressed.
pub const STYLUS_MODE_BUTTON: u16 = 1 << 2;
/// Stylus mode bit: eraser active.
pub const STYLUS_MODE_RUBBER: u16 = 1 << 3;
