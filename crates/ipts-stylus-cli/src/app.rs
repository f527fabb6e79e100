//! The processing pipeline.
//!
//! [`Application`] is the heart of the stack: it parses incoming buffers,
//! feeds DFT windows through the decoder, corrects the reported position for
//! the transmitter-to-tip distance, and hands the results to an event sink.
//! It makes no assumption about where the buffers come from; runners push
//! data into it from a device or from a recorded dump.

use anyhow::Context;
use tracing::warn;

use ipts_stylus_core::{Config, DftType, Event, EventSink, Metadata, StylusData};
use ipts_stylus_hardware::Parser;
use ipts_stylus_signal::DftStylus;

/// Parses buffers and maintains the decoded stylus state.
pub struct Application<S: EventSink> {
    config: Config,
    parser: Parser,
    dft: DftStylus,
    sink: S,
}

impl<S: EventSink> Application<S> {
    /// Creates a pipeline for one device.
    ///
    /// # Errors
    ///
    /// Fails when the configuration is unusable, e.g. when neither the
    /// config files nor the device metadata provide the screen size.
    pub fn new(
        config: Config,
        metadata: Option<Metadata>,
        sink: S,
    ) -> anyhow::Result<Self> {
        config.validate().context("cannot start processing")?;

        Ok(Self {
            dft: DftStylus::new(config.clone(), metadata),
            config,
            parser: Parser::new(),
            sink,
        })
    }

    /// Signals the sink that the data flow has started.
    pub fn start(&mut self) {
        self.sink.on_start();
    }

    /// Signals the sink that the data flow has stopped.
    pub fn stop(&mut self) {
        self.sink.on_stop();
    }

    /// Access to the sink, e.g. to collect results after a replay.
    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Parses and processes one touch data buffer.
    ///
    /// Buffers that fail to parse are logged and dropped; DFT streams are
    /// noisy and the next buffer usually parses fine.
    pub fn process(&mut self, data: &[u8]) {
        let events = match self.parser.parse(data) {
            Ok(events) => events,
            Err(e) => {
                warn!("dropping buffer: {e}");
                return;
            }
        };

        for event in events {
            match event {
                Event::Stylus(stylus) => self.emit_stylus(stylus),
                Event::Dft(window) => {
                    self.dft.input(&window);
                    self.emit_stylus(*self.dft.stylus());

                    if window.kind == DftType::Pressure {
                        self.sink.on_pressure(self.dft.stylus().pressure);
                    }

                    self.sink.on_dft(&window);
                }
                Event::Metadata(_) => {
                    // metadata is queried before construction; a report at
                    // runtime carries nothing new
                }
            }
        }
    }

    /// Corrects the position for the tip offset and forwards the state.
    fn emit_stylus(&mut self, mut stylus: StylusData) {
        if self.config.stylus_disable {
            return;
        }

        let (ox, oy) = self.tip_offset(stylus.altitude, stylus.azimuth);
        stylus.x += ox;
        stylus.y += oy;

        self.sink.on_stylus(&stylus);
    }

    /// Calculates the tilt-induced offset of the reported position.
    ///
    /// Some styli have the transmitter a few millimeters above the tip, so
    /// the reported position diverges from the tip the further the pen is
    /// tilted. With the transmitter-to-tip distance known the divergence
    /// can be compensated.
    fn tip_offset(&self, altitude: f64, azimuth: f64) -> (f64, f64) {
        if altitude <= 0.0 || self.config.dft_tip_distance == 0.0 {
            return (0.0, 0.0);
        }

        let offset = altitude.sin() * self.config.dft_tip_distance;

        let ox = offset * -azimuth.cos();
        let oy = offset * azimuth.sin();

        (ox / self.config.width, oy / self.config.height)
    }
}
