//! ADXL345 accelerometer over the Linux i2c-dev interface.
//!
//! The device is bound with the `I2C_SLAVE` ioctl and then driven with plain
//! `read`/`write` calls on the character device: writing a single byte sets
//! the register pointer, the following read streams consecutive registers.
use std::fs::{File, OpenOptions};
use std::io::{self, Read, Write};
use std::os::unix::io::AsRawFd;
use std::path::Path;
use std::time::Duration;
use anyhow::{anyhow, Context, Result};
use log::{info, warn};
use crate::drivers::sensor::{decode_sample, AccelerationSample, Sensor};
use crate::drivers::MonitorError;
const REG_DEVID: u8 = 0x00;
const REG_POWER_CTL: u8 = 0x2D;
const REG_DATAX0: u8 = 0x32;
const POWER_CTL_MEASURE: u8 = 0x08;
const EXPECTED_DEVID: u8 = 0xE5;
// linux/i2c-dev.h
const I2C_TIMEOUT: u64 = 0x0702;
const I2C_SLAVE: u64 = 0x0703;
/// Exclusively owned handle to one ADXL345 on one bus.
pub struct Adxl345 {
    bus: File,
    address: u16,
    read_timeout: Duration,
}
impl Adxl345 {
    /// Opens the bus, binds the slave address and puts the part into measurement mode.
    pub fn open(bus_path: impl AsRef<Path>, address: u16, read_timeout: Duration) -> Result<Self> {
        let bus_path = bus_path.as_ref();
        let bus = OpenOptions::new()
            .read(true)
            .write(true)
            .open(bus_path)
            .with_context(|| format!("failed to open I2C bus {}", bus_path.display()))?;
        let fd = bus.as_raw_fd();
        check_ioctl(
            unsafe { libc::ioctl(fd, I2C_SLAVE as _, address as libc::c_ulong) },
            "I2C_SLAVE",
        )?;
        // The adapter timeout is expressed in units of 10 ms.
        let ticks = ((read_timeout.as_millis() + 9) / 10).max(1) as libc::c_ulong;
        check_ioctl(
            unsafe { libc::ioctl(fd, I2C_TIMEOUT as _, ticks) },
            "I2C_TIMEOUT",
        )?;
        let mut device = Self {
            bus,
            address,
            read_timeout,
        };
        let devid = device
            .read_register(REG_DEVID)
            .context("failed to read ADXL345 device id")?;
        if devid != EXPECTED_DEVID {
            warn!(
                "unexpected device id 0x{devid:02X} at 0x{:02X} (expected 0x{EXPECTED_DEVID:02X})",
                device.address
            );
        }
        device
            .write_register(REG_POWER_CTL, POWER_CTL_MEASURE)
            .context("failed to enable ADXL345 measurement mode")?;
        info!(
            "ADXL345 ready on {} at 0x{:02X}",
            bus_path.display(),
            device.address
        );
        Ok(device)
    }
    fn write_register(&mut self, register: u8, value: u8) -> io::Result<()> {
        self.bus.write_all(&[register, value])
    }
    fn read_register(&mut self, register: u8) -> io::Result<u8> {
        let mut buf = [0u8; 1];
        self.bus.write_all(&[register])?;
        self.bus.read_exact(&mut buf)?;
        Ok(buf[0])
    }
    fn map_io(&self, err: io::Error) -> MonitorError {
        match MonitorError::from(err) {
            MonitorError::DeviceTimeout { .. } => MonitorError::DeviceTimeout {
                limit_ms: self.read_timeout.as_millis() as u64,
            },
            other => other,
        }
    }
}
impl Sensor for Adxl345 {
    fn read_axes(&mut self) -> Result<AccelerationSample, MonitorError> {
        let mut raw = [0u8; 6];
        self.bus
            .write_all(&[REG_DATAX0])
            .map_err(|e| self.map_io(e))?;
        self.bus.read_exact(&mut raw).map_err(|e| self.map_io(e))?;
        Ok(decode_sample(&raw))
    }
}
impl Drop for Adxl345 {
    fn drop(&mut self) {
        // Back to standby so the part stops converting once nobody owns it.
        let _ = self.write_register(REG_POWER_CTL, 0x00);
    }
}
fn check_ioctl(code: libc::c_int, ctx: &str) -> Result<()> {
    if code < 0 {
        Err(anyhow!("{ctx} ioctl failed: {}", io::Error::last_os_error()))
    } else {
        Ok(())
    }
}
