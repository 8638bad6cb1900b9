//! Linux spidev bus and sysfs GPIO pin.
//!
//! These back [`crate::nrf24::Nrf24`] on single-board computers: the radio's
//! CSN line is driven by the spidev chip select, CE by a plain GPIO.

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use log::debug;

use crate::nrf24::{Nrf24, OutputPin, SpiBus};
use crate::radio::RadioError;

/// Where the radio is wired.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpiConfig {
    /// spidev node, e.g. `/dev/spidev0.0`.
    pub device: PathBuf,
    /// GPIO number of the CE line.
    pub ce_gpio: u32,
    pub speed_hz: u32,
}

impl Default for SpiConfig {
    fn default() -> Self {
        Self {
            device: PathBuf::from("/dev/spidev0.0"),
            ce_gpio: 22,
            speed_hz: 10_000_000,
        }
    }
}

/// Open and probe a radio on spidev.
pub fn open(config: &SpiConfig) -> Result<Nrf24<Spidev, SysfsGpio>, RadioError> {
    let spi = Spidev::open(&config.device, config.speed_hz)?;
    let ce = SysfsGpio::export(config.ce_gpio)?;
    debug!(
        "opened {} at {} Hz, CE on gpio{}",
        config.device.display(),
        config.speed_hz,
        config.ce_gpio
    );
    Nrf24::new(spi, ce)
}

// ---------------------------------------------------------------------------
// spidev
// ---------------------------------------------------------------------------

/// Mirrors `struct spi_ioc_transfer` from `linux/spi/spidev.h`.
#[cfg(target_os = "linux")]
#[repr(C)]
#[derive(Default)]
struct SpiIocTransfer {
    tx_buf: u64,
    rx_buf: u64,
    len: u32,
    speed_hz: u32,
    delay_usecs: u16,
    bits_per_word: u8,
    cs_change: u8,
    tx_nbits: u8,
    rx_nbits: u8,
    word_delay_usecs: u8,
    pad: u8,
}

#[cfg(target_os = "linux")]
const fn spi_iow(nr: u32, size: u32) -> u32 {
    // _IOW('k', nr, size)
    (1 << 30) | (size << 16) | ((b'k' as u32) << 8) | nr
}

#[cfg(target_os = "linux")]
const SPI_IOC_MESSAGE_1: u32 = spi_iow(0, std::mem::size_of::<SpiIocTransfer>() as u32);
#[cfg(target_os = "linux")]
const SPI_IOC_WR_MODE: u32 = spi_iow(1, 1);
#[cfg(target_os = "linux")]
const SPI_IOC_WR_BITS_PER_WORD: u32 = spi_iow(3, 1);
#[cfg(target_os = "linux")]
const SPI_IOC_WR_MAX_SPEED_HZ: u32 = spi_iow(4, 4);

pub struct Spidev {
    #[cfg_attr(not(target_os = "linux"), allow(dead_code))]
    file: File,
    #[cfg_attr(not(target_os = "linux"), allow(dead_code))]
    speed_hz: u32,
}

impl Spidev {
    #[cfg(target_os = "linux")]
    pub fn open(path: &Path, speed_hz: u32) -> io::Result<Self> {
        use std::os::unix::io::AsRawFd;

        let file = OpenOptions::new().read(true).write(true).open(path)?;
        let fd = file.as_raw_fd();

        let mode: u8 = 0;
        let bits: u8 = 8;
        // SAFETY: fd is an open spidev descriptor and each pointer refers to
        // a live local of the size the request encodes.
        unsafe {
            if libc::ioctl(fd, SPI_IOC_WR_MODE as _, &mode as *const u8) < 0
                || libc::ioctl(fd, SPI_IOC_WR_BITS_PER_WORD as _, &bits as *const u8) < 0
                || libc::ioctl(fd, SPI_IOC_WR_MAX_SPEED_HZ as _, &speed_hz as *const u32) < 0
            {
                return Err(io::Error::last_os_error());
            }
        }
        Ok(Self { file, speed_hz })
    }

    #[cfg(not(target_os = "linux"))]
    pub fn open(path: &Path, _speed_hz: u32) -> io::Result<Self> {
        Err(io::Error::new(
            io::ErrorKind::Unsupported,
            format!("{}: spidev is only available on Linux", path.display()),
        ))
    }
}

impl SpiBus for Spidev {
    #[cfg(target_os = "linux")]
    fn transfer(&mut self, buf: &mut [u8]) -> io::Result<()> {
        use std::os::unix::io::AsRawFd;

        let tx = buf.to_vec();
        let xfer = SpiIocTransfer {
            tx_buf: tx.as_ptr() as u64,
            rx_buf: buf.as_mut_ptr() as u64,
            len: buf.len() as u32,
            speed_hz: self.speed_hz,
            bits_per_word: 8,
            ..SpiIocTransfer::default()
        };
        // SAFETY: tx and buf both outlive the call and are `len` bytes long;
        // the kernel reads tx and writes buf.
        let ret = unsafe {
            libc::ioctl(
                self.file.as_raw_fd(),
                SPI_IOC_MESSAGE_1 as _,
                &xfer as *const SpiIocTransfer,
            )
        };
        if ret < 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(())
    }

    #[cfg(not(target_os = "linux"))]
    fn transfer(&mut self, _buf: &mut [u8]) -> io::Result<()> {
        Err(io::ErrorKind::Unsupported.into())
    }
}

// ---------------------------------------------------------------------------
// sysfs GPIO
// ---------------------------------------------------------------------------

const GPIO_ROOT: &str = "/sys/class/gpio";

/// Output pin driven through `/sys/class/gpio`. Unexported on drop.
pub struct SysfsGpio {
    pin: u32,
    value: File,
}

impl SysfsGpio {
    pub fn export(pin: u32) -> io::Result<Self> {
        let dir = Path::new(GPIO_ROOT).join(format!("gpio{pin}"));
        if !dir.exists() {
            std::fs::write(Path::new(GPIO_ROOT).join("export"), pin.to_string())?;
        }

        // udev may still be fixing permissions on the freshly exported node.
        let direction = dir.join("direction");
        let mut attempt = 0;
        loop {
            match std::fs::write(&direction, "out") {
                Ok(()) => break,
                Err(e) if e.kind() == io::ErrorKind::PermissionDenied && attempt < 10 => {
                    attempt += 1;
                    std::thread::sleep(Duration::from_millis(50));
                }
                Err(e) => return Err(e),
            }
        }

        let value = OpenOptions::new().write(true).open(dir.join("value"))?;
        Ok(Self { pin, value })
    }
}

impl OutputPin for SysfsGpio {
    fn set(&mut self, high: bool) -> io::Result<()> {
        self.value.write_all(if high { b"1" } else { b"0" })?;
        self.value.flush()
    }
}

impl Drop for SysfsGpio {
    fn drop(&mut self) {
        let _ = std::fs::write(Path::new(GPIO_ROOT).join("unexport"), self.pin.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_wiring() {
        let config = SpiConfig::default();
        assert_eq!(config.device, PathBuf::from("/dev/spidev0.0"));
        assert_eq!(config.ce_gpio, 22);
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn ioctl_numbers_match_kernel_headers() {
        assert_eq!(std::mem::size_of::<SpiIocTransfer>(), 32);
        assert_eq!(SPI_IOC_MESSAGE_1, 0x4020_6b00);
        assert_eq!(SPI_IOC_WR_MODE, 0x4001_6b01);
        assert_eq!(SPI_IOC_WR_MAX_SPEED_HZ, 0x4004_6b04);
    }

    #[test]
    fn missing_device_fails_to_open() {
        let config = SpiConfig {
            device: PathBuf::from("/nonexistent/spidev9.9"),
            ..SpiConfig::default()
        };
        assert!(matches!(open(&config), Err(RadioError::Io(_))));
    }

    #[test]
    #[ignore] // Needs an nRF24L01 on /dev/spidev0.0 with CE on GPIO 22.
    fn probe_real_radio() {
        let mut radio = open(&SpiConfig::default()).expect("radio present");
        let details = crate::radio::Radio::details(&mut radio).unwrap();
        assert!(details.contains("RF_CH"));
    }
}
