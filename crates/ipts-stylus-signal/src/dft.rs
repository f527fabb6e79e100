//! The DFT stylus decoder.
//!
//! [`DftStylus`] consumes typed DFT windows in firmware-emission order and
//! maintains the resulting stylus state. It never reports errors: a frame
//! that cannot be decoded either lifts the pen (position frames) or is
//! skipped, preserving the last known good state. DFT streams are noisy and
//! any individual frame may be junk.

use ipts_stylus_core::{
    Config, DftType, DftWindow, Metadata, MppVersion, StylusData, NUM_COMPONENTS, PRESSURE_ROWS,
};

use crate::interpolate::{interpolate_frequency, interpolate_position};

/// Stateful decoder turning DFT windows into stylus state.
///
/// The decoder owns one [`StylusData`] for its whole lifetime and mutates it
/// in place. It is single-threaded and synchronous: every [`input`] call runs
/// to completion, performs only arithmetic, and touches no I/O.
///
/// [`input`]: Self::input
#[derive(Debug)]
pub struct DftStylus {
    config: Config,
    metadata: Option<Metadata>,

    /// The current state of the DFT stylus.
    stylus: StylusData,

    /// Phase reference captured from the last position frame. Button frames
    /// are compared against it.
    phase_real: i32,
    phase_imag: i32,

    /// Capture group of the last position frame.
    group: Option<u32>,

    /// Capture group of the last processed 0x0a frame. Only the first 0x0a
    /// window per group is authoritative.
    dft_0x0a_group: Option<u32>,
}

impl DftStylus {
    /// Creates a decoder from immutable config and metadata snapshots.
    ///
    /// The initial state is lifted: all booleans false, all coordinates
    /// zero.
    #[must_use]
    pub fn new(config: Config, metadata: Option<Metadata>) -> Self {
        Self {
            config,
            metadata,
            stylus: StylusData::default(),
            phase_real: 0,
            phase_imag: 0,
            group: None,
            dft_0x0a_group: None,
        }
    }

    /// Loads a DFT window and updates the stylus state from it.
    ///
    /// Windows of unknown type are ignored.
    pub fn input(&mut self, dft: &DftWindow) {
        match dft.kind {
            DftType::Position => self.handle_position(dft),
            DftType::Position2 => {
                if self.config.dft_position2 {
                    self.handle_position(dft);
                }
            }
            DftType::Button => self.handle_button(dft),
            DftType::Pressure => self.handle_pressure(dft),
            DftType::Dft0x0a => self.handle_dft_0x0a(dft),
            _ => {}
        }
    }

    /// The current state of the DFT stylus.
    #[must_use]
    pub fn stylus(&self) -> &StylusData {
        &self.stylus
    }

    /// Calculates the stylus position from a position window.
    fn handle_position(&mut self, dft: &DftWindow) {
        if dft.rows() <= 1 {
            self.lift();
            return;
        }

        if dft.x[0].magnitude <= self.config.dft_position_min_mag
            || dft.y[0].magnitude <= self.config.dft_position_min_mag
        {
            self.lift();
            return;
        }

        let mut width = f64::from(dft.width);
        let mut height = f64::from(dft.height);

        if dft.width == 0 || dft.height == 0 {
            if let Some(metadata) = &self.metadata {
                width = f64::from(metadata.size.columns);
                height = f64::from(metadata.size.rows);
            }
        }

        self.group = dft.group;

        let mid = NUM_COMPONENTS / 2;
        self.phase_real = i32::from(dft.x[0].real[mid]) + i32::from(dft.y[0].real[mid]);
        self.phase_imag = i32::from(dft.x[0].imag[mid]) + i32::from(dft.y[0].imag[mid]);

        let mut x = interpolate_position(&dft.x[0], &self.config) / (width - 1.0);
        let mut y = interpolate_position(&dft.y[0], &self.config) / (height - 1.0);

        if x.is_nan() || y.is_nan() {
            self.lift();
            return;
        }

        self.stylus.proximity = true;

        if self.config.invert_x {
            x = 1.0 - x;
        }

        if self.config.invert_y {
            y = 1.0 - y;
        }

        if dft.x[1].magnitude > self.config.dft_tilt_min_mag
            && dft.y[1].magnitude > self.config.dft_tilt_min_mag
        {
            // tilt angle from the relative position of the secondary
            // transmitter
            let mut xt = interpolate_position(&dft.x[1], &self.config) / (width - 1.0);
            let mut yt = interpolate_position(&dft.y[1], &self.config) / (height - 1.0);

            if !xt.is_nan() && !yt.is_nan() {
                if self.config.invert_x {
                    xt = 1.0 - xt;
                }

                if self.config.invert_y {
                    yt = 1.0 - yt;
                }

                xt -= x;
                yt -= y;

                xt *= self.config.width / self.config.dft_tilt_distance;
                yt *= self.config.height / self.config.dft_tilt_distance;

                let tau = 2.0 * std::f64::consts::PI;

                self.stylus.azimuth = ((-yt).atan2(xt) + tau) % tau;
                self.stylus.altitude = xt.hypot(yt).min(1.0).asin();
            }
        }

        self.stylus.x = x.clamp(0.0, 1.0);
        self.stylus.y = y.clamp(0.0, 1.0);
    }

    /// Calculates the button and eraser state from a button window.
    ///
    /// The button frame's phase is only meaningful relative to the position
    /// frame from the same capture group; frames from other groups are
    /// dropped.
    fn handle_button(&mut self, dft: &DftWindow) {
        if dft.x.is_empty() || dft.y.is_empty() {
            return;
        }

        let Some(group) = self.group else {
            return;
        };

        if dft.group != Some(group) {
            return;
        }

        let mut button = false;
        let mut rubber = false;

        if dft.x[0].magnitude > self.config.dft_button_min_mag
            && dft.y[0].magnitude > self.config.dft_button_min_mag
        {
            let mid = NUM_COMPONENTS / 2;
            let real = i32::from(dft.x[0].real[mid]) + i32::from(dft.y[0].real[mid]);
            let imag = i32::from(dft.x[0].imag[mid]) + i32::from(dft.y[0].imag[mid]);

            // same phase as the position signal = eraser, opposite = button;
            // the inner product exceeds 32 bits at full scale
            let val = i64::from(self.phase_real) * i64::from(real)
                + i64::from(self.phase_imag) * i64::from(imag);

            button = val < 0;
            rubber = val > 0;
        }

        // an MPP v2 pen signals the button through 0x0a frames instead
        if self.config.mpp_version == MppVersion::V1 {
            self.stylus.button = button;
        }

        self.stylus.rubber = rubber;
    }

    /// Calculates the contact pressure from a pressure window.
    fn handle_pressure(&mut self, dft: &DftWindow) {
        if dft.rows() < PRESSURE_ROWS {
            return;
        }

        let p = 1.0 - interpolate_frequency(dft, PRESSURE_ROWS, &self.config);

        if p > 0.0 {
            self.stylus.contact = true;
            self.stylus.pressure = p.clamp(0.0, 1.0);
        } else {
            self.stylus.contact = false;
            self.stylus.pressure = 0.0;
        }
    }

    /// Calculates the button state of an MPP v2 pen from a 0x0a window.
    ///
    /// The pen keys the button between two frequency bins; row 5 dominant
    /// means pressed.
    fn handle_dft_0x0a(&mut self, dft: &DftWindow) {
        if self.config.mpp_version != MppVersion::V2 {
            return;
        }

        let Some(group) = dft.group else {
            return;
        };

        if self.dft_0x0a_group == Some(group) {
            return;
        }

        if dft.rows() < 6 {
            return;
        }

        self.dft_0x0a_group = Some(group);

        let mag4 = u64::from(dft.x[4].magnitude) + u64::from(dft.y[4].magnitude);
        let mag5 = u64::from(dft.x[5].magnitude) + u64::from(dft.y[5].magnitude);
        let threshold = 2 * u64::from(self.config.dft_button_min_mag);

        if mag4 < threshold && mag5 < threshold {
            self.stylus.button = false;
        } else {
            self.stylus.button = mag4 < mag5;
        }
    }

    /// Marks the stylus as lifted.
    ///
    /// Position, pressure and tilt keep their last values; their staleness
    /// is signalled by `proximity` being false.
    fn lift(&mut self) {
        self.stylus.proximity = false;
        self.stylus.contact = false;
        self.stylus.button = false;
        self.stylus.rubber = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ipts_stylus_core::DftRow;

    const REAL: [i16; NUM_COMPONENTS] = [-8, -6, 3, 202, 260, -3, -15, -13, -10];
    const IMAG: [i16; NUM_COMPONENTS] = [-3, -3, 2, 103, 133, 1, -7, -6, -7];

    fn config() -> Config {
        Config {
            width: 260.0,
            height: 174.0,
            dft_position_min_amp: 50,
            dft_position_min_mag: 1000,
            dft_position_exp: 2.0,
            ..Config::default()
        }
    }

    fn signal_row(first: u8) -> DftRow {
        DftRow {
            magnitude: 85_289,
            first,
            real: REAL,
            imag: IMAG,
            ..DftRow::default()
        }
    }

    /// A valid position window with the measured peak from real hardware:
    /// strong transmitter on both axes, no secondary (tilt) signal.
    fn position_window(group: u32) -> DftWindow {
        let mut window = DftWindow::new(DftType::Position);
        window.group = Some(group);
        window.width = 64;
        window.height = 44;
        window.x = vec![signal_row(28), DftRow::default()];
        window.y = vec![signal_row(20), DftRow::default()];
        window
    }

    fn button_window(group: u32) -> DftWindow {
        let mut row = DftRow {
            magnitude: 5000,
            ..DftRow::default()
        };
        row.real[4] = -260;
        row.imag[4] = -133;

        let mut window = DftWindow::new(DftType::Button);
        window.group = Some(group);
        window.x = vec![row];
        window.y = vec![row];
        window
    }

    /// The expected fractional offset for the shared signal row, computed
    /// independently from the parabolic vertex formula.
    fn expected_offset() -> f64 {
        let amp = f64::hypot(260.0, 133.0);
        let sin = 260.0 / amp;
        let cos = 133.0 / amp;

        let p0 = (sin * 202.0 + cos * 103.0).abs().powi(2);
        let p1 = amp * amp;
        let p2 = (sin * -3.0 + cos * 1.0).abs().powi(2);

        (p0 - p2) / (2.0 * (p0 - 2.0 * p1 + p2))
    }

    #[test]
    fn test_position_updates_state() {
        let mut decoder = DftStylus::new(config(), None);
        decoder.input(&position_window(7));

        let d = expected_offset();
        let stylus = decoder.stylus();

        assert!(stylus.proximity);
        assert!((stylus.x - (28.0 + 4.0 + d) / 63.0).abs() < 1e-9);
        assert!((stylus.y - (20.0 + 4.0 + d) / 43.0).abs() < 1e-9);

        // no tilt signal: angles keep their previous values
        assert_eq!(stylus.azimuth, 0.0);
        assert_eq!(stylus.altitude, 0.0);
    }

    #[test]
    fn test_starved_position_lifts() {
        let mut decoder = DftStylus::new(config(), None);
        decoder.input(&position_window(7));

        let mut starved = position_window(7);
        starved.x[0].magnitude = 0;
        starved.y[0].magnitude = 0;
        decoder.input(&starved);

        let stylus = decoder.stylus();
        assert!(!stylus.proximity);
        assert!(!stylus.contact);
        assert!(!stylus.button);
        assert!(!stylus.rubber);
    }

    #[test]
    fn test_single_row_lifts() {
        let mut decoder = DftStylus::new(config(), None);
        decoder.input(&position_window(7));
        assert!(decoder.stylus().proximity);

        let mut short = position_window(7);
        short.x.truncate(1);
        short.y.truncate(1);
        decoder.input(&short);

        assert!(!decoder.stylus().proximity);
    }

    #[test]
    fn test_lift_is_idempotent() {
        let mut decoder = DftStylus::new(config(), None);
        decoder.input(&position_window(7));

        let mut starved = position_window(7);
        starved.x[0].magnitude = 0;

        decoder.input(&starved);
        let first = *decoder.stylus();

        decoder.input(&starved);
        assert_eq!(first, *decoder.stylus());
    }

    #[test]
    fn test_button_same_group_phase_inverted() {
        let mut decoder = DftStylus::new(config(), None);
        decoder.input(&position_window(7));
        decoder.input(&button_window(7));

        // opposite phase relative to the position reference
        assert!(decoder.stylus().button);
        assert!(!decoder.stylus().rubber);
    }

    #[test]
    fn test_button_same_phase_is_eraser() {
        let mut decoder = DftStylus::new(config(), None);
        decoder.input(&position_window(7));

        let mut window = button_window(7);
        for row in window.x.iter_mut().chain(window.y.iter_mut()) {
            row.real[4] = 260;
            row.imag[4] = 133;
        }
        decoder.input(&window);

        assert!(!decoder.stylus().button);
        assert!(decoder.stylus().rubber);
    }

    #[test]
    fn test_button_group_mismatch_ignored() {
        let mut decoder = DftStylus::new(config(), None);
        decoder.input(&position_window(7));
        decoder.input(&button_window(7));
        assert!(decoder.stylus().button);

        // a frame from a different capture batch has uncorrelated phase
        let mut other = button_window(8);
        for row in other.x.iter_mut().chain(other.y.iter_mut()) {
            row.real[4] = 260;
            row.imag[4] = 133;
        }
        decoder.input(&other);

        assert!(decoder.stylus().button);
        assert!(!decoder.stylus().rubber);
    }

    #[test]
    fn test_button_without_position_ignored() {
        let mut decoder = DftStylus::new(config(), None);
        decoder.input(&button_window(7));

        assert!(!decoder.stylus().button);
        assert!(!decoder.stylus().rubber);
    }

    #[test]
    fn test_v2_ignores_phase_button() {
        let mut cfg = config();
        cfg.mpp_version = MppVersion::V2;

        let mut decoder = DftStylus::new(cfg, None);
        decoder.input(&position_window(7));
        decoder.input(&button_window(7));

        // the eraser is still phase-detected, the button is not
        assert!(!decoder.stylus().button);
        assert!(!decoder.stylus().rubber);
    }

    fn pressure_window(peak_row: usize) -> DftWindow {
        let mut window = DftWindow::new(DftType::Pressure);

        for i in 0..PRESSURE_ROWS {
            let (magnitude, level) = if i == peak_row {
                (50_000, 20)
            } else if i + 1 == peak_row || i == peak_row + 1 {
                (25_000, 10)
            } else {
                (0, 0)
            };

            let row = DftRow {
                magnitude,
                real: [level; NUM_COMPONENTS],
                ..DftRow::default()
            };
            window.x.push(row);
            window.y.push(row);
        }

        window
    }

    #[test]
    fn test_pressure_from_frequency_sweep() {
        let mut decoder = DftStylus::new(config(), None);
        decoder.input(&pressure_window(10));

        let stylus = decoder.stylus();
        assert!(stylus.contact);
        assert!((stylus.pressure - (1.0 - 10.0 / 15.0)).abs() < 1e-9);
    }

    #[test]
    fn test_pressure_sweep_at_rest_releases_contact() {
        let mut decoder = DftStylus::new(config(), None);
        decoder.input(&pressure_window(10));
        assert!(decoder.stylus().contact);

        // peak on the last row with a steep flank: the estimator clamps to
        // the end of the sweep, which maps to p = 0
        let mut resting = DftWindow::new(DftType::Pressure);
        for i in 0..PRESSURE_ROWS {
            let (magnitude, level) = match i {
                13 => (1000, 1),
                14 => (25_000, 10),
                15 => (50_000, 20),
                _ => (0, 0),
            };
            let row = DftRow {
                magnitude,
                real: [level; NUM_COMPONENTS],
                ..DftRow::default()
            };
            resting.x.push(row);
            resting.y.push(row);
        }
        decoder.input(&resting);

        assert!(!decoder.stylus().contact);
        assert_eq!(decoder.stylus().pressure, 0.0);
    }

    #[test]
    fn test_short_pressure_window_is_skipped() {
        let mut decoder = DftStylus::new(config(), None);
        decoder.input(&pressure_window(10));
        let before = *decoder.stylus();

        let mut short = pressure_window(5);
        short.x.truncate(PRESSURE_ROWS - 1);
        short.y.truncate(PRESSURE_ROWS - 1);
        decoder.input(&short);

        assert_eq!(before, *decoder.stylus());
    }

    fn dft_0x0a_window(group: u32, mag4: u32, mag5: u32) -> DftWindow {
        let mut window = DftWindow::new(DftType::Dft0x0a);
        window.group = Some(group);

        for i in 0..6 {
            let magnitude = match i {
                4 => mag4 / 2,
                5 => mag5 / 2,
                _ => 0,
            };
            let row = DftRow {
                magnitude,
                ..DftRow::default()
            };
            window.x.push(row);
            window.y.push(row);
        }

        window
    }

    #[test]
    fn test_v2_button_frequency_keyed() {
        let mut cfg = config();
        cfg.mpp_version = MppVersion::V2;
        cfg.dft_button_min_mag = 500;

        let mut decoder = DftStylus::new(cfg, None);

        // row 5 dominant: pressed
        decoder.input(&dft_0x0a_window(3, 10_000, 20_000));
        assert!(decoder.stylus().button);

        // second frame of the same group is not authoritative
        decoder.input(&dft_0x0a_window(3, 20_000, 0));
        assert!(decoder.stylus().button);

        // new group without signal: released
        decoder.input(&dft_0x0a_window(4, 0, 0));
        assert!(!decoder.stylus().button);
    }

    #[test]
    fn test_v1_ignores_0x0a() {
        let mut decoder = DftStylus::new(config(), None);
        decoder.input(&dft_0x0a_window(3, 10_000, 20_000));

        assert!(!decoder.stylus().button);
    }

    #[test]
    fn test_0x0a_without_group_ignored() {
        let mut cfg = config();
        cfg.mpp_version = MppVersion::V2;
        cfg.dft_button_min_mag = 500;

        let mut decoder = DftStylus::new(cfg, None);
        let mut window = dft_0x0a_window(3, 10_000, 20_000);
        window.group = None;
        decoder.input(&window);

        assert!(!decoder.stylus().button);
    }

    #[test]
    fn test_inversion_symmetry() {
        let mut plain = DftStylus::new(config(), None);
        plain.input(&position_window(7));

        let mut cfg = config();
        cfg.invert_x = true;
        cfg.invert_y = true;

        let mut inverted = DftStylus::new(cfg, None);
        inverted.input(&position_window(7));

        assert!((inverted.stylus().x - (1.0 - plain.stylus().x)).abs() < 1e-12);
        assert!((inverted.stylus().y - (1.0 - plain.stylus().y)).abs() < 1e-12);
    }

    #[test]
    fn test_tilt_from_secondary_transmitter() {
        let mut cfg = config();
        cfg.width = 10.0;
        cfg.height = 10.0;

        let mut window = position_window(7);
        // secondary transmitter one antenna to the right of the primary on
        // X, aligned on Y
        window.x[1] = signal_row(29);
        window.y[1] = signal_row(20);

        let mut decoder = DftStylus::new(cfg, None);
        decoder.input(&window);

        let stylus = decoder.stylus();
        let expected_alt = ((1.0 / 63.0) * 10.0 / 0.6_f64).min(1.0).asin();

        assert!(stylus.proximity);
        assert!(stylus.azimuth.abs() < 1e-9);
        assert!((stylus.altitude - expected_alt).abs() < 1e-9);
    }

    #[test]
    fn test_tilt_gated_by_magnitude() {
        let mut window = position_window(7);
        window.x[1] = signal_row(29);
        window.y[1] = signal_row(20);
        window.x[1].magnitude = 0;

        let mut decoder = DftStylus::new(config(), None);
        decoder.input(&window);

        assert_eq!(decoder.stylus().altitude, 0.0);
        assert_eq!(decoder.stylus().azimuth, 0.0);
    }

    #[test]
    fn test_position2_gated_by_config() {
        let mut window = position_window(7);
        window.kind = DftType::Position2;

        let mut ignoring = DftStylus::new(config(), None);
        ignoring.input(&window);
        assert!(!ignoring.stylus().proximity);

        let mut cfg = config();
        cfg.dft_position2 = true;

        let mut mirroring = DftStylus::new(cfg, None);
        mirroring.input(&window);
        assert!(mirroring.stylus().proximity);
    }

    #[test]
    fn test_unknown_type_is_ignored() {
        let mut decoder = DftStylus::new(config(), None);
        decoder.input(&position_window(7));
        let before = *decoder.stylus();

        let mut unknown = position_window(7);
        unknown.kind = DftType::Unknown(42);
        unknown.x[0].magnitude = 0;
        decoder.input(&unknown);

        assert_eq!(before, *decoder.stylus());
    }

    #[test]
    fn test_metadata_supplies_missing_dimensions() {
        use ipts_stylus_core::{MetadataSize, MetadataTransform};

        let metadata = Metadata {
            size: MetadataSize {
                rows: 44,
                columns: 64,
                width: 260_000,
                height: 174_000,
            },
            transform: MetadataTransform::default(),
            ..Metadata::default()
        };

        let mut window = position_window(7);
        window.width = 0;
        window.height = 0;

        let mut with_meta = DftStylus::new(config(), Some(metadata));
        with_meta.input(&window);

        let mut with_dims = DftStylus::new(config(), None);
        with_dims.input(&position_window(7));

        assert!(with_meta.stylus().proximity);
        assert!((with_meta.stylus().x - with_dims.stylus().x).abs() < 1e-12);
        assert!((with_meta.stylus().y - with_dims.stylus().y).abs() < 1e-12);
    }

    #[test]
    fn test_state_invariants_over_full_cycle() {
        let mut decoder = DftStylus::new(config(), None);

        decoder.input(&position_window(7));
        decoder.input(&pressure_window(10));

        let stylus = decoder.stylus();
        assert!((0.0..=1.0).contains(&stylus.x));
        assert!((0.0..=1.0).contains(&stylus.y));
        assert!((0.0..=1.0).contains(&stylus.pressure));

        // contact implies proximity once a full cycle has been observed
        assert!(!stylus.contact || stylus.proximity);
    }
}
