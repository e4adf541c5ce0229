#![cfg_attr(not(test), no_std)]
#![doc = include_str!("../README.md")]
//!
//! ## Module Organization
//!
//! Driver layer:
//!
//! - [`bus`]: I2C and SPI transports
//! - [`accel`], [`gyro`]: user and alternate sensor configuration, sample reads
//! - [`alt`]: alternate configuration control and status
//! - [`feature`]: feature engine, any-/no-motion and the alternate auto-switch
//! - [`interrupt`]: interrupt pin configuration, mapping and status
//!
//! Control core:
//!
//! - [`profile`]: the seven-entry sensor profile batch
//! - [`config`]: applies the two-profile configuration
//! - [`router`]: interrupt pin wiring and event mapping
//! - [`bridge`]: interrupt-to-loop event flags
//! - [`acquisition`]: the polling dispatch loop
//! - [`startup`]: platform seam, startup sequence and teardown
//!
//! ## Basic Usage
//!
//! ```no_run
//! # async fn example<S, D, P, R>(spi: S, delay: D, mut platform: P, mut reporter: R)
//! # where
//! #   S: embedded_hal_async::spi::SpiDevice,
//! #   D: embedded_hal_async::delay::DelayNs,
//! #   P: bmi323_altcfg::startup::Platform,
//! #   R: bmi323_altcfg::acquisition::Reporter,
//! # {
//! use bmi323_altcfg::{bridge::EventBridge, startup::{run, AppConfig}, Bmi323};
//!
//! static BRIDGE: EventBridge = EventBridge::new();
//!
//! let mut imu = Bmi323::new_spi(spi, delay);
//! let code = match run(&mut imu, &mut platform, &mut reporter, &BRIDGE, &AppConfig::default()).await {
//!   Ok(summary) => summary.exit_code(),
//!   Err(fault) => fault.exit_code(),
//! };
//! # let _ = code;
//! # }
//! ```

use embedded_hal_async::{
  delay::DelayNs,
  i2c::{I2c, SevenBitAddress},
  spi::SpiDevice,
};

pub mod accel;
pub mod acquisition;
pub mod alt;
pub mod bridge;
pub mod bus;
pub mod config;
mod defs;
pub mod feature;
pub mod gyro;
pub mod interrupt;
pub mod profile;
pub mod router;
pub(crate) mod rw;
pub mod sensor;
pub mod startup;
#[cfg(test)]
mod testing;
mod types;

use bus::{Address, I2cInterface, Interface, InterfaceKind, SpiInterface};
use defs::*;
pub use sensor::SensorDriver;
pub use types::*;

/// Driver error type.
///
/// Wraps the underlying bus error and adds BMI323-specific conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error<E> {
  /// Bus communication error
  Bus(E),
  /// Chip ID mismatch (expected 0x43)
  InvalidChipId(u8),
  /// Invalid mode, sensor or configuration requested
  InvalidMode,
  /// Initialization failed (e.g., feature engine activation timeout)
  Init,
  /// Data error (e.g., malformed register contents, feature data timeout)
  Data,
}

impl<E> Error<E> {
  /// Device-style result code, as printed next to a failing step.
  pub fn code(&self) -> i8 {
    match self {
      Error::Bus(_) => -2,
      Error::InvalidChipId(_) => -3,
      Error::InvalidMode => -8,
      Error::Data => -9,
      Error::Init => -14,
    }
  }
}

/// BMI323 device handle.
///
/// Owns the transport and delay provider and remembers the interface it
/// was bound to and the chip identifier read by the last [`init`](Self::init).
pub struct Bmi323<B, D> {
  bus: B,
  delay: D,
  chip_id: Option<u8>,
}

impl<I, D> Bmi323<I2cInterface<I>, D>
where
  I: I2c<SevenBitAddress>,
  D: DelayNs,
{
  /// Bind to a sensor on the primary I2C address.
  pub fn new_i2c(i2c: I, delay: D) -> Self {
    Self::new(I2cInterface::new(i2c, Address::Primary), delay)
  }

  /// Bind to a sensor on an explicit I2C address.
  ///
  /// # Arguments
  ///
  /// - `i2c`: I2C bus implementation
  /// - `address`: [`Address::Secondary`] when SDO is tied high
  /// - `delay`: Delay provider for timing operations
  pub fn new_i2c_with_address(i2c: I, address: Address, delay: D) -> Self {
    Self::new(I2cInterface::new(i2c, address), delay)
  }
}

impl<S, D> Bmi323<SpiInterface<S>, D>
where
  S: SpiDevice,
  D: DelayNs,
{
  /// Bind to a sensor over SPI.
  pub fn new_spi(spi: S, delay: D) -> Self {
    Self::new(SpiInterface::new(spi), delay)
  }
}

impl<B, D, E> Bmi323<B, D>
where
  B: Interface<Error = E>,
  D: DelayNs,
{
  /// Create a driver over an already constructed transport.
  ///
  /// # Arguments
  ///
  /// - `bus`: [`Interface`] implementation ([`I2cInterface`] or [`SpiInterface`])
  /// - `delay`: Delay provider for timing operations
  pub fn new(bus: B, delay: D) -> Self {
    Self { bus, delay, chip_id: None }
  }

  /// Protocol the handle talks over.
  pub fn interface(&self) -> InterfaceKind {
    self.bus.kind()
  }

  /// Chip identifier read by the last successful [`init`](Self::init).
  pub fn chip_id(&self) -> Option<u8> {
    self.chip_id
  }

  /// Tear the handle down and give back the transport and delay.
  pub fn release(self) -> (B, D) {
    (self.bus, self.delay)
  }

  /// Bring the sensor up: latch SPI mode if needed, soft reset, verify the
  /// chip identity and activate the feature engine.
  ///
  /// Returns the chip identifier. Fails with [`Error::InvalidChipId`] when a
  /// device answers but is not a BMI323.
  pub async fn init(&mut self) -> Result<u8, Error<E>> {
    if self.bus.kind() == InterfaceKind::Spi {
      // First SPI access only switches the interface; its data is garbage.
      self.read_u16(Reg::ChipId).await?;
    }

    self.soft_reset().await?;

    let id = self.get_id().await?;
    if id != BMI323_CHIP_ID {
      return Err(Error::InvalidChipId(id));
    }

    self.enable_feature_engine().await?;
    self.chip_id = Some(id);
    Ok(id)
  }

  /// Read the chip ID register.
  ///
  /// Returns the chip ID (should be `0x43` for BMI323).
  pub async fn get_id(&mut self) -> Result<u8, Error<E>> {
    let r: ChipId = self.read(Reg::ChipId).await?;
    Ok(r.id)
  }

  /// Perform a soft reset of the sensor.
  ///
  /// This resets all registers to their default values and restarts the sensor.
  /// A delay is automatically applied after the reset command.
  pub async fn soft_reset(&mut self) -> Result<(), Error<E>> {
    self.write_u16(Reg::Cmd, Command::SoftReset.into()).await?;
    self.delay.delay_us(SOFT_RESET_DELAY_US).await;
    if self.bus.kind() == InterfaceKind::Spi {
      // Reset drops the device back into I2C mode.
      self.read_u16(Reg::ChipId).await?;
    }
    Ok(())
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[packbits::pack(bytes = 1)]
struct ChipId {
  pub id: u8,
}
