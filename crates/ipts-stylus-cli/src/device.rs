//! Access to the IPTS character device.
//!
//! The kernel driver exposes touch data through a character device with a
//! small ioctl interface: query device info, start and stop the data flow.
//! Buffers are then read with plain blocking reads.

use std::fs::File;
use std::io::Read;
use std::os::unix::io::AsRawFd;
use std::path::Path;

use thiserror::Error;

use ipts_stylus_core::DeviceInfo;

/// Errors from device access.
#[derive(Debug, Error)]
pub enum DeviceError {
    /// Opening or reading the device failed.
    #[error("device i/o failed: {0}")]
    Io(#[from] std::io::Error),

    /// An ioctl was rejected by the kernel.
    #[error("device ioctl failed: {0}")]
    Ioctl(#[from] nix::Error),
}

/// Device info as returned by the kernel interface.
#[repr(C)]
#[derive(Debug, Default, Clone, Copy)]
pub struct RawDeviceInfo {
    pub vendor_id: u16,
    pub product_id: u16,
    pub hw_rev: u32,
    pub fw_rev: u32,
    pub frame_size: u32,
    pub feedback_size: u32,
    pub sensor_mode: u32,
    pub max_touch_points: u8,
    pub spi_frequency: u8,
    pub spi_io_mode: u8,
    pub reserved0: u8,
    pub sensor_minor_eds_rev: u8,
    pub sensor_major_eds_rev: u8,
    pub sensor_eds_intf_rev: u8,
    pub me_eds_intf_rev: u8,
    pub kernel_compat_ver: u8,
    pub reserved1: u8,
    pub reserved2: [u32; 2],
}

mod ioctl {
    use super::RawDeviceInfo;
    use nix::{ioctl_none, ioctl_read};

    ioctl_read!(ipts_get_device_info, 0x86, 0x01, RawDeviceInfo);
    ioctl_none!(ipts_start, 0x86, 0x02);
    ioctl_none!(ipts_stop, 0x86, 0x03);
}

/// An open IPTS character device.
#[derive(Debug)]
pub struct Device {
    file: File,
}

impl Device {
    /// Opens an IPTS device node.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, DeviceError> {
        let file = File::open(path)?;
        Ok(Self { file })
    }

    /// Queries identity and buffer geometry from the kernel.
    pub fn info(&self) -> Result<DeviceInfo, DeviceError> {
        let mut raw = RawDeviceInfo::default();

        unsafe {
            ioctl::ipts_get_device_info(self.file.as_raw_fd(), &mut raw as *mut _)?;
        }

        Ok(DeviceInfo {
            vendor: raw.vendor_id,
            product: raw.product_id,
            buffer_size: u64::from(raw.frame_size),
        })
    }

    /// Tells the device to start producing data.
    pub fn start(&self) -> Result<(), DeviceError> {
        unsafe { ioctl::ipts_start(self.file.as_raw_fd())? };
        Ok(())
    }

    /// Tells the device to stop producing data.
    pub fn stop(&self) -> Result<(), DeviceError> {
        unsafe { ioctl::ipts_stop(self.file.as_raw_fd())? };
        Ok(())
    }

    /// Reads one data buffer, blocking until the device has one.
    ///
    /// Returns the number of bytes read.
    pub fn read_buffer(&mut self, buffer: &mut [u8]) -> Result<usize, DeviceError> {
        Ok(self.file.read(buffer)?)
    }
}
