//! nRF24L01(+) driver.
//!
//! The driver speaks the chip's SPI command set through the [`SpiBus`] and
//! [`OutputPin`] seams, so it runs on Linux spidev (see [`crate::spi`]) as well
//! as on the in-memory register file used by the tests.
//!
//! Only the registers an energy scanner needs are touched.

use std::io;
use std::time::Duration;

use log::debug;

use crate::radio::{DataRate, Radio, RadioConfig, RadioError};

// Registers.
pub const CONFIG: u8 = 0x00;
pub const EN_AA: u8 = 0x01;
pub const EN_RXADDR: u8 = 0x02;
pub const SETUP_AW: u8 = 0x03;
pub const SETUP_RETR: u8 = 0x04;
pub const RF_CH: u8 = 0x05;
pub const RF_SETUP: u8 = 0x06;
pub const STATUS: u8 = 0x07;
pub const RPD: u8 = 0x09;
pub const RX_ADDR_P0: u8 = 0x0A;
pub const RX_ADDR_P1: u8 = 0x0B;
pub const RX_PW_P0: u8 = 0x11;
pub const DYNPD: u8 = 0x1C;
pub const FEATURE: u8 = 0x1D;

// Commands.
pub const R_REGISTER: u8 = 0x00;
pub const W_REGISTER: u8 = 0x20;
pub const FLUSH_TX: u8 = 0xE1;
pub const FLUSH_RX: u8 = 0xE2;
pub const NOP: u8 = 0xFF;

// CONFIG bits.
const PRIM_RX: u8 = 1 << 0;
const PWR_UP: u8 = 1 << 1;
const CRCO: u8 = 1 << 2;
const EN_CRC: u8 = 1 << 3;

// RF_SETUP bits.
const RF_DR_HIGH: u8 = 1 << 3;
const RF_DR_LOW: u8 = 1 << 5;
const RF_PWR_MAX: u8 = 0b110;
const LNA_HCURR: u8 = 1;

/// STATUS interrupt flags, written back as ones to clear.
const STATUS_IRQ_MASK: u8 = 0x70;

const MAX_CHANNEL: u8 = 125;
const PAYLOAD_SIZE: u8 = 32;
const POWER_UP_DELAY: Duration = Duration::from_millis(5);

/// Full-duplex SPI transfer, in place: `buf` is sent and overwritten with
/// the bytes clocked back.
pub trait SpiBus {
    fn transfer(&mut self, buf: &mut [u8]) -> io::Result<()>;
}

/// A digital output line (the chip-enable pin).
pub trait OutputPin {
    fn set(&mut self, high: bool) -> io::Result<()>;
}

/// RF_SETUP data-rate bits.
pub fn data_rate_bits(rate: DataRate) -> u8 {
    match rate {
        DataRate::Mbps1 => 0,
        DataRate::Mbps2 => RF_DR_HIGH,
        DataRate::Kbps250 => RF_DR_LOW,
    }
}

pub struct Nrf24<S: SpiBus, P: OutputPin> {
    spi: S,
    ce: P,
    /// Cached CONFIG register; the chip is the only other writer.
    config_reg: u8,
    data_rate: DataRate,
}

impl<S: SpiBus, P: OutputPin> Nrf24<S, P> {
    /// Bring the chip to a known state and power it up.
    ///
    /// Fails with [`RadioError::NotResponding`] if the CONFIG register does
    /// not read back what was written (floating or miswired bus).
    pub fn new(spi: S, ce: P) -> Result<Self, RadioError> {
        let mut radio = Self {
            spi,
            ce,
            config_reg: 0,
            data_rate: DataRate::default(),
        };
        radio.init()?;
        Ok(radio)
    }

    fn init(&mut self) -> Result<(), RadioError> {
        self.ce.set(false)?;
        std::thread::sleep(POWER_UP_DELAY);

        // 1500 µs retransmit delay, 15 retries.
        self.write_register(SETUP_RETR, 0x5F)?;
        self.write_register(RF_SETUP, RF_PWR_MAX | LNA_HCURR)?;
        self.write_register(DYNPD, 0)?;
        self.write_register(FEATURE, 0)?;
        self.write_register(EN_AA, 0x3F)?;
        self.write_register(EN_RXADDR, 0x03)?;
        for pipe in 0..6 {
            self.write_register(RX_PW_P0 + pipe, PAYLOAD_SIZE)?;
        }
        self.write_register(SETUP_AW, 0x03)?;
        self.write_register(RF_CH, 76)?;
        self.write_register(STATUS, STATUS_IRQ_MASK)?;
        self.command(FLUSH_RX)?;
        self.command(FLUSH_TX)?;

        self.config_reg = EN_CRC | CRCO;
        self.write_register(CONFIG, self.config_reg)?;
        self.power_up()?;

        let readback = self.read_register(CONFIG)?;
        if readback != EN_CRC | CRCO | PWR_UP {
            debug!("CONFIG probe read back {readback:#04x}");
            return Err(RadioError::NotResponding);
        }
        Ok(())
    }

    pub fn read_register(&mut self, reg: u8) -> io::Result<u8> {
        let mut buf = [R_REGISTER | (reg & 0x1F), NOP];
        self.spi.transfer(&mut buf)?;
        Ok(buf[1])
    }

    pub fn read_register_bytes(&mut self, reg: u8, len: usize) -> io::Result<Vec<u8>> {
        let mut buf = vec![NOP; len + 1];
        buf[0] = R_REGISTER | (reg & 0x1F);
        self.spi.transfer(&mut buf)?;
        Ok(buf.split_off(1))
    }

    pub fn write_register(&mut self, reg: u8, value: u8) -> io::Result<()> {
        let mut buf = [W_REGISTER | (reg & 0x1F), value];
        self.spi.transfer(&mut buf)
    }

    pub fn write_register_bytes(&mut self, reg: u8, bytes: &[u8]) -> io::Result<()> {
        let mut buf = Vec::with_capacity(bytes.len() + 1);
        buf.push(W_REGISTER | (reg & 0x1F));
        buf.extend_from_slice(bytes);
        self.spi.transfer(&mut buf)
    }

    /// Single-byte command; returns STATUS.
    fn command(&mut self, cmd: u8) -> io::Result<u8> {
        let mut buf = [cmd];
        self.spi.transfer(&mut buf)?;
        Ok(buf[0])
    }

    fn power_up(&mut self) -> io::Result<()> {
        if self.config_reg & PWR_UP == 0 {
            self.config_reg |= PWR_UP;
            self.write_register(CONFIG, self.config_reg)?;
            std::thread::sleep(POWER_UP_DELAY);
        }
        Ok(())
    }

    pub fn into_parts(self) -> (S, P) {
        (self.spi, self.ce)
    }
}

impl<S: SpiBus, P: OutputPin> Radio for Nrf24<S, P> {
    fn name(&self) -> &'static str {
        "nrf24"
    }

    fn configure(&mut self, config: &RadioConfig) -> Result<(), RadioError> {
        config.validate()?;

        let setup = self.read_register(RF_SETUP)? & !(RF_DR_LOW | RF_DR_HIGH);
        self.write_register(RF_SETUP, setup | data_rate_bits(config.data_rate))?;
        self.data_rate = config.data_rate;

        self.write_register(EN_AA, if config.auto_ack { 0x3F } else { 0 })?;

        if config.crc {
            self.config_reg |= EN_CRC | CRCO;
        } else {
            self.config_reg &= !(EN_CRC | CRCO);
        }
        self.write_register(CONFIG, self.config_reg)?;

        self.write_register(SETUP_AW, config.address_width - 2)?;

        let mut enabled = self.read_register(EN_RXADDR)?;
        for (pipe, addr) in config.reading_pipes.iter().enumerate() {
            let reg = if pipe == 0 { RX_ADDR_P0 } else { RX_ADDR_P1 };
            self.write_register_bytes(reg, addr)?;
            self.write_register(RX_PW_P0 + pipe as u8, PAYLOAD_SIZE)?;
            enabled |= 1 << pipe;
        }
        self.write_register(EN_RXADDR, enabled)?;
        debug!(
            "configured: {} aw={} ack={} crc={} pipes={}",
            config.data_rate,
            config.address_width,
            config.auto_ack,
            config.crc,
            config.reading_pipes.len()
        );

        // Pass through RX once to land in standby with an empty FIFO.
        self.start_listening()?;
        self.stop_listening()?;
        self.flush_rx()
    }

    fn select_channel(&mut self, channel: u8) -> Result<(), RadioError> {
        self.write_register(RF_CH, channel.min(MAX_CHANNEL))?;
        Ok(())
    }

    fn start_listening(&mut self) -> Result<(), RadioError> {
        self.power_up()?;
        self.config_reg |= PRIM_RX;
        self.write_register(CONFIG, self.config_reg)?;
        self.write_register(STATUS, STATUS_IRQ_MASK)?;
        self.ce.set(true)?;
        Ok(())
    }

    fn stop_listening(&mut self) -> Result<(), RadioError> {
        self.ce.set(false)?;
        self.config_reg &= !PRIM_RX;
        self.write_register(CONFIG, self.config_reg)?;
        Ok(())
    }

    fn test_signal_present(&mut self) -> Result<bool, RadioError> {
        Ok(self.read_register(RPD)? & 1 == 1)
    }

    fn flush_rx(&mut self) -> Result<(), RadioError> {
        self.command(FLUSH_RX)?;
        Ok(())
    }

    fn power_down(&mut self) -> Result<(), RadioError> {
        self.ce.set(false)?;
        self.config_reg &= !PWR_UP;
        self.write_register(CONFIG, self.config_reg)?;
        Ok(())
    }

    fn details(&mut self) -> Result<String, RadioError> {
        let status = self.command(NOP)?;
        let config = self.read_register(CONFIG)?;
        let en_aa = self.read_register(EN_AA)?;
        let en_rxaddr = self.read_register(EN_RXADDR)?;
        let aw = self.read_register(SETUP_AW)?;
        let width = aw as usize + 2;
        let rf_ch = self.read_register(RF_CH)?;
        let setup = self.read_register(RF_SETUP)?;
        let p0 = hex(&self.read_register_bytes(RX_ADDR_P0, width)?);
        let p1 = hex(&self.read_register_bytes(RX_ADDR_P1, width)?);

        Ok(format!(
            "STATUS     = {status:#04x}\n\
             CONFIG     = {config:#04x}\n\
             EN_AA      = {en_aa:#04x}\n\
             EN_RXADDR  = {en_rxaddr:#04x}\n\
             SETUP_AW   = {aw:#04x} ({width} bytes)\n\
             RF_CH      = {rf_ch:#04x}\n\
             RF_SETUP   = {setup:#04x} ({})\n\
             RX_ADDR_P0 = {p0}\n\
             RX_ADDR_P1 = {p1}",
            self.data_rate
        ))
    }
}

fn hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}
