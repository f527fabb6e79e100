//! Printing decoded DFT traffic for protocol debugging.
//!
//! The print sink formats every admitted DFT window with its raw I/Q
//! samples. This is the tool of choice when bringing up a new pen: the raw
//! rows show immediately whether the firmware sees the pen at all, and the
//! stylus status line shows what the decoder makes of it.

use ipts_stylus_core::{DftRow, DftType, DftWindow, EventSink, StylusData};

use crate::PrintArgs;

/// Which window types to print.
#[derive(Debug, Clone, Copy, Default)]
pub struct PrintFilter {
    pub stylus_status: bool,
    pub position: bool,
    pub button: bool,
    pub pressure: bool,
    pub unknown: bool,
}

impl From<&PrintArgs> for PrintFilter {
    fn from(args: &PrintArgs) -> Self {
        Self {
            stylus_status: args.stylus_status,
            position: args.position,
            button: args.button,
            pressure: args.pressure,
            unknown: args.unknown,
        }
    }
}

/// Event sink printing DFT windows to stdout.
#[derive(Debug, Default)]
pub struct PrintSink {
    filter: PrintFilter,

    /// The last known state of the stylus.
    recent: StylusData,
}

impl PrintSink {
    /// Creates a sink printing the window types selected in `filter`.
    #[must_use]
    pub fn new(filter: PrintFilter) -> Self {
        Self {
            filter,
            recent: StylusData::default(),
        }
    }

    fn wanted(&self, kind: DftType) -> bool {
        match kind {
            DftType::Position | DftType::Position2 => self.filter.position,
            DftType::Button => self.filter.button,
            DftType::Pressure => self.filter.pressure,
            _ => self.filter.unknown,
        }
    }
}

impl EventSink for PrintSink {
    fn on_stylus(&mut self, stylus: &StylusData) {
        self.recent = *stylus;
    }

    fn on_dft(&mut self, window: &DftWindow) {
        if !self.wanted(window.kind) {
            return;
        }

        println!("{}", describe_type(window.kind));

        if self.filter.stylus_status {
            let s = &self.recent;
            println!(
                "Stylus proximity: {}, contact: {}, button: {}, rubber: {}",
                flag(s.proximity),
                flag(s.contact),
                flag(s.button),
                flag(s.rubber),
            );
        }

        print!("{}", stringify_window(window));
        println!();
    }
}

fn flag(value: bool) -> &'static str {
    if value {
        "Y"
    } else {
        "N"
    }
}

fn describe_type(kind: DftType) -> String {
    match kind {
        DftType::Position => "DFT_POSITION".into(),
        DftType::Position2 => "DFT_POSITION2".into(),
        DftType::Button => "DFT_BUTTON".into(),
        DftType::Pressure => "DFT_PRESSURE".into(),
        DftType::Dft0x0a => "DFT_0x0A".into(),
        DftType::Dft0x0b => "DFT_0x0B".into(),
        DftType::Unknown(code) => format!("DFT_{code}"),
    }
}

fn stringify_row(row: &DftRow) -> String {
    use std::fmt::Write;

    let mut out = String::new();
    write!(out, "freq: {:9} ", row.frequency).unwrap();
    write!(out, "mag: {:9} ", row.magnitude).unwrap();
    write!(out, "first: {:3} ", row.first).unwrap();
    write!(out, "last: {} ", row.last).unwrap();
    write!(out, "mid: {} ", row.mid).unwrap();
    write!(out, "zero: {} ", row.zero).unwrap();

    out.push_str("IQ: [");
    for (re, im) in row.real.iter().zip(row.imag.iter()) {
        write!(out, "({re:6},{im:6}),").unwrap();
    }
    out.push(']');

    out
}

fn stringify_window(window: &DftWindow) -> String {
    use std::fmt::Write;

    let mut out = String::new();
    for i in 0..window.rows() {
        writeln!(out, "x[{i:2}]: {}", stringify_row(&window.x[i])).unwrap();
        writeln!(out, "y[{i:2}]: {}", stringify_row(&window.y[i])).unwrap();
    }

    out
}
