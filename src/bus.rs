//! Wire protocols the BMI323 can be reached over.
//!
//! The sensor speaks I2C and SPI. Both return dummy bytes in front of the
//! register payload on reads (two on I2C, one on SPI); the [`Interface`]
//! implementations strip them so the driver only ever sees register data.
//!
//! ```no_run
//! # async fn example<I, S, D>(i2c: I, spi: S, delay: D)
//! # where
//! #   I: embedded_hal_async::i2c::I2c,
//! #   S: embedded_hal_async::spi::SpiDevice,
//! #   D: embedded_hal_async::delay::DelayNs + Clone,
//! # {
//! use bmi323_altcfg::Bmi323;
//!
//! let over_i2c = Bmi323::new_i2c(i2c, delay.clone());
//! let over_spi = Bmi323::new_spi(spi, delay);
//! # }
//! ```

use embedded_hal_async::{
  i2c::{I2c, SevenBitAddress},
  spi::{Operation, SpiDevice},
};

/// Largest payload a single register transfer may carry.
pub(crate) const MAX_TRANSFER: usize = 30;

const SPI_READ: u8 = 0x80;
const I2C_DUMMY_BYTES: usize = 2;
const SPI_DUMMY_BYTES: usize = 1;

/// Which wire protocol a device handle is bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum InterfaceKind {
  I2c,
  Spi,
}

/// I2C slave address, selected by the SDO pin level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Address {
  /// SDO tied low (0x68).
  #[default]
  Primary,
  /// SDO tied high (0x69).
  Secondary,
}

impl From<Address> for u8 {
  fn from(a: Address) -> Self {
    match a {
      Address::Primary => 0x68,
      Address::Secondary => 0x69,
    }
  }
}

/// Raw register transport used by [`Bmi323`](crate::Bmi323).
#[allow(async_fn_in_trait)]
pub trait Interface {
  type Error;

  /// Protocol this transport speaks.
  fn kind(&self) -> InterfaceKind;

  /// Burst-read `buf.len()` bytes starting at `reg`, dummy bytes removed.
  async fn read_regs(&mut self, reg: u8, buf: &mut [u8]) -> Result<(), Self::Error>;

  /// Burst-write `data` starting at `reg`.
  async fn write_regs(&mut self, reg: u8, data: &[u8]) -> Result<(), Self::Error>;
}

/// I2C transport.
pub struct I2cInterface<I> {
  i2c: I,
  address: u8,
}

impl<I> I2cInterface<I> {
  /// Wrap an I2C bus for the sensor at `address`.
  ///
  /// # Arguments
  ///
  /// - `i2c`: I2C bus implementation
  /// - `address`: Slave address selected by the SDO pin
  pub fn new(i2c: I, address: Address) -> Self {
    Self { i2c, address: address.into() }
  }

  /// Give back the underlying bus.
  pub fn release(self) -> I {
    self.i2c
  }
}

impl<I: I2c<SevenBitAddress>> Interface for I2cInterface<I> {
  type Error = I::Error;

  fn kind(&self) -> InterfaceKind {
    InterfaceKind::I2c
  }

  async fn read_regs(&mut self, reg: u8, buf: &mut [u8]) -> Result<(), Self::Error> {
    debug_assert!(buf.len() <= MAX_TRANSFER, "read_regs buffer too large");

    let mut tmp = [0u8; MAX_TRANSFER + I2C_DUMMY_BYTES];
    let len = buf.len() + I2C_DUMMY_BYTES;
    self.i2c.write_read(self.address, &[reg], &mut tmp[..len]).await?;
    buf.copy_from_slice(&tmp[I2C_DUMMY_BYTES..len]);
    Ok(())
  }

  async fn write_regs(&mut self, reg: u8, data: &[u8]) -> Result<(), Self::Error> {
    debug_assert!(data.len() <= MAX_TRANSFER, "write_regs buffer too large");

    let mut buf = [0u8; MAX_TRANSFER + 1];
    let len = 1 + data.len();
    buf[0] = reg;
    buf[1..len].copy_from_slice(data);
    self.i2c.write(self.address, &buf[..len]).await
  }
}

/// SPI transport. Chip-select handling belongs to the `SpiDevice`.
pub struct SpiInterface<S> {
  spi: S,
}

impl<S> SpiInterface<S> {
  /// Wrap an SPI device. Chip select is driven by `spi`.
  pub fn new(spi: S) -> Self {
    Self { spi }
  }

  pub fn release(self) -> S {
    self.spi
  }
}

impl<S: SpiDevice> Interface for SpiInterface<S> {
  type Error = S::Error;

  fn kind(&self) -> InterfaceKind {
    InterfaceKind::Spi
  }

  async fn read_regs(&mut self, reg: u8, buf: &mut [u8]) -> Result<(), Self::Error> {
    debug_assert!(buf.len() <= MAX_TRANSFER, "read_regs buffer too large");

    let mut tmp = [0u8; MAX_TRANSFER + SPI_DUMMY_BYTES];
    let len = buf.len() + SPI_DUMMY_BYTES;
    self
      .spi
      .transaction(&mut [Operation::Write(&[reg | SPI_READ]), Operation::Read(&mut tmp[..len])])
      .await?;
    buf.copy_from_slice(&tmp[SPI_DUMMY_BYTES..len]);
    Ok(())
  }

  async fn write_regs(&mut self, reg: u8, data: &[u8]) -> Result<(), Self::Error> {
    self
      .spi
      .transaction(&mut [Operation::Write(&[reg & !SPI_READ]), Operation::Write(data)])
      .await
  }
}
