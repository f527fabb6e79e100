//! Walking the frame structure of IPTS data buffers.

use ipts_stylus_core::{
    DftRow, DftWindow, Event, Metadata, MetadataSize, MetadataTransform, StylusData, MAX_ROWS,
};

use crate::error::ParseError;
use crate::protocol::*;
use crate::reader::Reader;

/// Parser for IPTS touch data buffers.
///
/// One buffer contains a root HID frame wrapping either raw data (older,
/// GuC based devices) or a chain of further HID frames (HID-native devices).
/// Both eventually carry report lists; the reports describe stylus samples,
/// DFT windows and assorted sensor bookkeeping.
///
/// The parser is stateful across buffers: heatmap dimensions and the pen
/// capture-group counter arrive in their own reports and apply to the DFT
/// windows that follow them.
#[derive(Debug, Default)]
pub struct Parser {
    /// Antenna counts from the most recent dimensions report.
    dimensions: Option<(u8, u8)>,

    /// Capture group from the most recent pen metadata report.
    group: Option<u32>,
}

impl Parser {
    /// Creates a parser with no cached device state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses one touch data buffer.
    ///
    /// The buffer must start with the three byte report header (report id
    /// and timestamp) that the device prepends to all touch data.
    ///
    /// # Errors
    ///
    /// Returns a [`ParseError`] when the buffer is truncated or a frame
    /// declares an impossible size. No events are returned in that case;
    /// callers should drop the buffer and continue with the next one.
    pub fn parse(&mut self, data: &[u8]) -> Result<Vec<Event>, ParseError> {
        let mut reader = Reader::new(data);
        reader.skip(BUFFER_HEADER_SIZE)?;

        let mut events = Vec::new();
        self.parse_root_frame(&mut reader, &mut events)?;

        Ok(events)
    }

    /// Reads one HID frame header and returns its payload.
    ///
    /// The declared size includes the header itself.
    fn hid_frame<'a>(reader: &mut Reader<'a>) -> Result<(u8, Reader<'a>), ParseError> {
        let size = reader.read_u32()?;
        reader.skip(1)?;
        let kind = reader.read_u8()?;
        reader.skip(1)?;

        let payload = (size as usize)
            .checked_sub(HID_FRAME_HEADER_SIZE)
            .ok_or(ParseError::InvalidFrameSize { size })?;

        Ok((kind, reader.sub(payload)?))
    }

    /// Parses the root HID frame of a buffer.
    ///
    /// On newer devices it contains a chain of HID frames; older devices
    /// emulate the container with a single frame of raw IPTS data.
    fn parse_root_frame(
        &mut self,
        reader: &mut Reader,
        events: &mut Vec<Event>,
    ) -> Result<(), ParseError> {
        let (kind, mut sub) = Self::hid_frame(reader)?;

        match kind {
            HID_FRAME_TYPE_RAW => self.parse_raw(&mut sub, events),
            HID_FRAME_TYPE_HID => self.parse_hid(&mut sub, events),
            _ => Ok(()),
        }
    }

    /// Parses raw IPTS data from devices without native HID support.
    ///
    /// A raw header is followed by a list of frames, each identifying one
    /// family of data and consisting of a report list.
    fn parse_raw(&mut self, reader: &mut Reader, events: &mut Vec<Event>) -> Result<(), ParseError> {
        reader.skip(4)?; // counter
        let frames = reader.read_u32()?;
        reader.skip(4)?;

        for _ in 0..frames {
            reader.skip(2)?; // index
            let kind = reader.read_u16()?;
            let size = reader.read_u32()?;
            reader.skip(RAW_FRAME_HEADER_SIZE - 8)?;

            let mut sub = reader.sub(size as usize)?;

            match kind {
                RAW_FRAME_TYPE_STYLUS | RAW_FRAME_TYPE_HEATMAP => {
                    self.parse_reports(&mut sub, events)?;
                }
                _ => {}
            }
        }

        Ok(())
    }

    /// Parses a chain of HID frames from HID-native devices.
    fn parse_hid(&mut self, reader: &mut Reader, events: &mut Vec<Event>) -> Result<(), ParseError> {
        while reader.remaining() > 0 {
            let (kind, mut sub) = Self::hid_frame(reader)?;

            match kind {
                HID_FRAME_TYPE_REPORTS => {
                    // Some devices emit a four byte packet about once per
                    // second whose report type is off by one and cannot be
                    // parsed. Drop it.
                    if reader.remaining() == 4 {
                        return Ok(());
                    }

                    self.parse_reports(&mut sub, events)?;
                }
                HID_FRAME_TYPE_METADATA => Self::parse_metadata(&mut sub, events)?,
                HID_FRAME_TYPE_HEATMAP => {
                    // capacitive touch is handled elsewhere
                }
                _ => {}
            }
        }

        Ok(())
    }

    /// Parses a report list.
    ///
    /// The frame gives no report count, only their combined size; unknown
    /// reports are skipped over by their declared size.
    fn parse_reports(
        &mut self,
        reader: &mut Reader,
        events: &mut Vec<Event>,
    ) -> Result<(), ParseError> {
        while reader.remaining() > 0 {
            let kind = reader.read_u8()?;
            reader.skip(1)?; // flags
            let size = reader.read_u16()?;

            let mut sub = reader.sub(size as usize)?;

            match kind {
                REPORT_TYPE_STYLUS_V1 => Self::parse_stylus_v1(&mut sub, events)?,
                REPORT_TYPE_STYLUS_V2 => Self::parse_stylus_v2(&mut sub, events)?,
                REPORT_TYPE_DIMENSIONS => self.parse_dimensions(&mut sub)?,
                REPORT_TYPE_PEN_METADATA => self.parse_pen_metadata(&mut sub)?,
                REPORT_TYPE_PEN_DFT_WINDOW => self.parse_dft_window(&mut sub, events)?,
                _ => {}
            }
        }

        Ok(())
    }

    /// Parses the shared header of both stylus report generations and skips
    /// to its last element.
    ///
    /// A stylus report carries multiple samples from a five millisecond
    /// window; only the last one is decoded, to avoid jitter in the output.
    fn stylus_elements(reader: &mut Reader, element_size: usize) -> Result<u32, ParseError> {
        let elements = reader.read_u8()?;
        reader.skip(3)?;
        let serial = reader.read_u32()?;

        if elements == 0 {
            return Err(ParseError::EmptyStylusReport);
        }

        reader.skip(usize::from(elements - 1) * element_size)?;

        Ok(serial)
    }

    /// Parses a first generation stylus report.
    ///
    /// These devices report no tilt and 1024 levels of pressure.
    fn parse_stylus_v1(reader: &mut Reader, events: &mut Vec<Event>) -> Result<(), ParseError> {
        let serial = Self::stylus_elements(reader, STYLUS_ELEMENT_V1_SIZE)?;

        reader.skip(4)?;
        let mode = u16::from(reader.read_u8()?);
        let x = reader.read_u16()?;
        let y = reader.read_u16()?;
        let pressure = reader.read_u16()?;
        reader.skip(1)?;

        let mut stylus = StylusData {
            serial,
            proximity: mode & STYLUS_MODE_PROXIMITY != 0,
            button: mode & STYLUS_MODE_BUTTON != 0,
            rubber: mode & STYLUS_MODE_RUBBER != 0,
            x: f64::from(x) / STYLUS_MAX_X,
            y: f64::from(y) / STYLUS_MAX_Y,
            pressure: f64::from(pressure) / STYLUS_MAX_PRESSURE_V1,
            ..StylusData::default()
        };
        stylus.contact = stylus.pressure > 0.0;

        events.push(Event::Stylus(stylus));
        Ok(())
    }

    /// Parses a second generation stylus report.
    ///
    /// These devices report tilt in centidegrees and 4096 levels of
    /// pressure.
    fn parse_stylus_v2(reader: &mut Reader, events: &mut Vec<Event>) -> Result<(), ParseError> {
        let serial = Self::stylus_elements(reader, STYLUS_ELEMENT_V2_SIZE)?;

        let timestamp = reader.read_u16()?;
        let mode = reader.read_u16()?;
        let x = reader.read_u16()?;
        let y = reader.read_u16()?;
        let pressure = reader.read_u16()?;
        let altitude = reader.read_u16()?;
        let azimuth = reader.read_u16()?;
        reader.skip(2)?;

        let mut stylus = StylusData {
            serial,
            timestamp,
            proximity: mode & STYLUS_MODE_PROXIMITY != 0,
            contact: false,
            button: mode & STYLUS_MODE_BUTTON != 0,
            rubber: mode & STYLUS_MODE_RUBBER != 0,
            x: f64::from(x) / STYLUS_MAX_X,
            y: f64::from(y) / STYLUS_MAX_Y,
            pressure: f64::from(pressure) / STYLUS_MAX_PRESSURE_V2,
            altitude: f64::from(altitude) / 18000.0 * std::f64::consts::PI,
            azimuth: f64::from(azimuth) / 18000.0 * std::f64::consts::PI,
        };
        stylus.contact = stylus.pressure > 0.0;

        events.push(Event::Stylus(stylus));
        Ok(())
    }

    /// Parses a dimensions report.
    ///
    /// The antenna counts scale the DFT windows that follow, so they are
    /// cached until replaced.
    fn parse_dimensions(&mut self, reader: &mut Reader) -> Result<(), ParseError> {
        let height = reader.read_u8()?;
        let width = reader.read_u8()?;
        reader.skip(6)?;

        self.dimensions = Some((width, height));
        Ok(())
    }

    /// Parses a pen metadata report.
    ///
    /// The report carries the capture-group counter that makes phases of
    /// different DFT windows comparable.
    fn parse_pen_metadata(&mut self, reader: &mut Reader) -> Result<(), ParseError> {
        let group = reader.read_u32()?;
        reader.skip(4)?; // sequence number and flags

        self.group = Some(group);
        Ok(())
    }

    /// Parses one row of a DFT window.
    fn parse_dft_row(reader: &mut Reader) -> Result<DftRow, ParseError> {
        let mut row = DftRow {
            frequency: reader.read_u32()?,
            magnitude: reader.read_u32()?,
            ..DftRow::default()
        };

        for value in &mut row.real {
            *value = reader.read_i16()?;
        }

        for value in &mut row.imag {
            *value = reader.read_i16()?;
        }

        row.first = reader.read_u8()?;
        row.last = reader.read_u8()?;
        row.mid = reader.read_u8()?;
        row.zero = reader.read_u8()?;

        Ok(row)
    }

    /// Parses a DFT window report.
    ///
    /// DFT based pens return antenna measurements instead of processed
    /// coordinates; decoding them is the signal layer's job. The window gets
    /// the cached dimensions and capture group attached.
    fn parse_dft_window(&mut self, reader: &mut Reader, events: &mut Vec<Event>) -> Result<(), ParseError> {
        let timestamp = reader.read_u32()?;
        let rows = reader.read_u8()?;
        reader.skip(1)?; // sequence number
        reader.skip(3)?;
        let kind = reader.read_u8()?;
        reader.skip(2)?;

        if usize::from(rows) > MAX_ROWS {
            return Err(ParseError::InvalidRowCount {
                count: rows,
                max: MAX_ROWS,
            });
        }

        let mut window = DftWindow::new(kind.into());
        window.timestamp = timestamp;
        window.group = self.group;

        if let Some((width, height)) = self.dimensions {
            window.width = width;
            window.height = height;
        }

        for _ in 0..rows {
            window.x.push(Self::parse_dft_row(reader)?);
        }

        for _ in 0..rows {
            window.y.push(Self::parse_dft_row(reader)?);
        }

        events.push(Event::Dft(window));
        Ok(())
    }

    /// Parses a metadata frame.
    ///
    /// Only available on HID-native devices, through a feature report.
    fn parse_metadata(reader: &mut Reader, events: &mut Vec<Event>) -> Result<(), ParseError> {
        events.push(Event::Metadata(read_metadata(reader)?));
        Ok(())
    }
}

/// Reads a device metadata blob.
///
/// The same layout appears inside metadata frames and at the front of
/// recorded dump files.
pub fn read_metadata(reader: &mut Reader) -> Result<Metadata, ParseError> {
    let size = MetadataSize {
        rows: reader.read_u32()?,
        columns: reader.read_u32()?,
        width: reader.read_u32()?,
        height: reader.read_u32()?,
    };

    let unknown_byte = reader.read_u8()?;

    let transform = MetadataTransform {
        xx: reader.read_f32()?,
        yx: reader.read_f32()?,
        tx: reader.read_f32()?,
        xy: reader.read_f32()?,
        yy: reader.read_f32()?,
        ty: reader.read_f32()?,
    };

    let mut unknown = [0f32; 16];
    for value in &mut unknown {
        *value = reader.read_f32()?;
    }

    Ok(Metadata {
        size,
        transform,
        unknown_byte,
        unknown,
    })
}
