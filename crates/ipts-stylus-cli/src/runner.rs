//! Drives the processing pipeline from a data source.
//!
//! Two sources exist: the live character device, and recorded dump files as
//! written by the debugging tools. Both feed whole buffers into an
//! [`Application`] and leave all interpretation to it.

use std::fs;
use std::path::Path;

use anyhow::{bail, Context};
use tracing::{info, warn};

use ipts_stylus_core::{DeviceInfo, EventSink, Metadata};
use ipts_stylus_hardware::{read_metadata, Reader};

use crate::app::Application;
use crate::config::ConfigLoader;
use crate::device::Device;

/// Runs an application against the live device.
pub struct DeviceRunner<S: EventSink> {
    device: Device,
    info: DeviceInfo,
    application: Application<S>,
}

impl<S: EventSink> DeviceRunner<S> {
    /// Opens the device and builds the pipeline for it.
    pub fn new<P: AsRef<Path>>(path: P, sink: S) -> anyhow::Result<Self> {
        let device = Device::open(path).context("failed to open IPTS device")?;
        let info = device.info().context("failed to query device info")?;

        info!("connected to device {:04X}:{:04X}", info.vendor, info.product);

        // The UAPI device has no metadata interface; the screen geometry
        // must come from a preset or config file.
        let loader = ConfigLoader::new(&info, None)?;
        let application = Application::new(loader.config(), None, sink)?;

        Ok(Self {
            device,
            info,
            application,
        })
    }

    /// Reads buffers until the device fails.
    ///
    /// Parse failures of individual buffers are logged and skipped; only
    /// device-level errors end the loop.
    pub fn run(&mut self) -> anyhow::Result<()> {
        self.device.start().context("failed to start the device")?;
        self.application.start();

        let mut buffer = vec![0; self.info.buffer_size as usize];

        loop {
            let size = match self.device.read_buffer(&mut buffer) {
                Ok(size) => size,
                Err(e) => {
                    self.application.stop();
                    self.device.stop().ok();
                    return Err(e).context("failed to read from the device");
                }
            };

            self.application.process(&buffer[..size]);
        }
    }
}

/// Replays a recorded dump file through an application.
///
/// The dump format is: device info (vendor, product, buffer size), a
/// metadata presence flag with an optional metadata blob, then a sequence of
/// records each holding the payload size and one full device buffer.
pub struct FileRunner<S: EventSink> {
    data: Vec<u8>,
    payload_start: usize,
    info: DeviceInfo,
    application: Application<S>,
}

impl<S: EventSink> FileRunner<S> {
    /// Loads a dump file and builds the pipeline for the device it was
    /// recorded from.
    pub fn new<P: AsRef<Path>>(path: P, sink: S) -> anyhow::Result<Self> {
        let data = fs::read(path.as_ref())
            .with_context(|| format!("failed to read {}", path.as_ref().display()))?;

        let mut reader = Reader::new(&data);

        let (info, metadata) = Self::read_header(&mut reader).context("malformed dump header")?;
        let payload_start = data.len() - reader.remaining();

        info!("loaded dump of device {:04X}:{:04X}", info.vendor, info.product);

        let loader = ConfigLoader::new(&info, metadata.as_ref())?;
        let application = Application::new(loader.config(), metadata, sink)?;

        Ok(Self {
            data,
            payload_start,
            info,
            application,
        })
    }

    fn read_header(reader: &mut Reader) -> anyhow::Result<(DeviceInfo, Option<Metadata>)> {
        let info = DeviceInfo {
            vendor: reader.read_u16()?,
            product: reader.read_u16()?,
            buffer_size: reader.read_u64()?,
        };

        if info.buffer_size == 0 {
            bail!("dump declares a zero buffer size");
        }

        let metadata = if reader.read_u8()? != 0 {
            Some(read_metadata(reader)?)
        } else {
            None
        };

        Ok((info, metadata))
    }

    /// Access to the application, e.g. to inspect the sink afterwards.
    pub fn application(&self) -> &Application<S> {
        &self.application
    }

    /// Feeds all recorded buffers through the pipeline.
    pub fn run(&mut self) -> anyhow::Result<()> {
        let mut reader = Reader::new(&self.data[self.payload_start..]);
        let buffer_size = self.info.buffer_size as usize;

        self.application.start();

        while reader.remaining() >= 8 + buffer_size {
            let size = reader.read_u64()? as usize;

            // the writer always stores the whole buffer, padded past the
            // payload it actually received
            let mut buffer = reader.sub(buffer_size)?;
            let payload = buffer.take(size.min(buffer_size))?;

            self.application.process(payload);
        }

        if reader.remaining() > 0 {
            warn!("leftover data at end of input");
        }

        self.application.stop();

        Ok(())
    }
}
