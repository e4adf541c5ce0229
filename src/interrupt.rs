//! Interrupt pin configuration, event mapping and status.
//!
//! The BMI323 has two interrupt pins (INT1 and INT2). Each pin has its own
//! electrical settings in `IO_INT_CTRL`; every interrupt source is routed to
//! a pin through `INT_MAP1..2`, and each pin has a clear-on-read status word.
//!
//! # Examples
//!
//! ```no_run
//! # async fn example<B: bmi323_altcfg::bus::Interface, D: embedded_hal_async::delay::DelayNs>(mut imu: bmi323_altcfg::Bmi323<B, D>) -> Result<(), bmi323_altcfg::Error<B::Error>> {
//! use bmi323_altcfg::interrupt::*;
//!
//! let mut pins = imu.get_int_pin_config().await?;
//! pins.int1.enable = true;
//! pins.int1.level = ActiveLevel::ActiveHigh;
//! imu.set_int_pin_config(IntPin::Int1, pins.int1).await?;
//!
//! let map = IntMap { any_motion: IntPin::Int2, accel_data_ready: IntPin::Int1, ..Default::default() };
//! imu.set_int_map(map).await?;
//!
//! let status = imu.get_int2_status().await?;
//! # let _ = status;
//! # Ok(())
//! # }
//! ```

use embedded_hal_async::delay::DelayNs;

use super::{Bmi323, Error, bus::Interface, defs::*};

impl<B, D, E> Bmi323<B, D>
where
  B: Interface<Error = E>,
  D: DelayNs,
{
  pub async fn set_int_map(&mut self, map: IntMap) -> Result<(), Error<E>> {
    self.write(Reg::IntMap1, map).await
  }

  pub async fn get_int_map(&mut self) -> Result<IntMap, Error<E>> {
    self.read(Reg::IntMap1).await
  }

  /// Read the electrical configuration of both pins.
  pub async fn get_int_pin_config(&mut self) -> Result<IntPinConfig, Error<E>> {
    let reg: IoIntCtrl = self.read(Reg::IoIntCtrl).await?;
    let int1 = IntConfig { output: reg.int1_output, level: reg.int1_level, enable: reg.int1_enable };
    let int2 = IntConfig { output: reg.int2_output, level: reg.int2_level, enable: reg.int2_enable };
    Ok(IntPinConfig { int1, int2 })
  }

  /// Write the configuration of a single pin, leaving the other pin's bits untouched.
  pub async fn set_int_pin_config(&mut self, pin: IntPin, cfg: IntConfig) -> Result<(), Error<E>> {
    let mut r: IoIntCtrl = self.read(Reg::IoIntCtrl).await?;
    match pin {
      IntPin::Int1 => {
        r.int1_level = cfg.level;
        r.int1_output = cfg.output;
        r.int1_enable = cfg.enable;
      }
      IntPin::Int2 => {
        r.int2_level = cfg.level;
        r.int2_output = cfg.output;
        r.int2_enable = cfg.enable;
      }
      IntPin::None => return Err(Error::InvalidMode),
    }
    self.write(Reg::IoIntCtrl, r).await
  }

  /// Read `INT_STATUS_INT1` (clear-on-read).
  pub async fn get_int1_status(&mut self) -> Result<IntStatus, Error<E>> {
    self.read(Reg::IntStatusInt1).await
  }

  /// Read `INT_STATUS_INT2` (clear-on-read).
  pub async fn get_int2_status(&mut self) -> Result<IntStatus, Error<E>> {
    self.read(Reg::IntStatusInt2).await
  }
}

/// Source-to-pin routing, `INT_MAP1..2`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[packbits::pack(bytes = 4)]
pub struct IntMap {
  #[bits(2)]
  pub no_motion: IntPin,
  #[bits(2)]
  pub any_motion: IntPin,
  #[bits(2)]
  pub flat: IntPin,
  #[bits(2)]
  pub orientation: IntPin,
  #[bits(2)]
  pub step_detector: IntPin,
  #[bits(2)]
  pub step_counter: IntPin,
  #[bits(2)]
  pub sig_motion: IntPin,
  #[bits(2)]
  pub tilt: IntPin,
  #[bits(2)]
  pub tap: IntPin,
  #[skip(2)]
  #[bits(2)]
  pub err_status: IntPin,
  #[bits(2)]
  pub temp_data_ready: IntPin,
  #[bits(2)]
  pub gyro_data_ready: IntPin,
  #[bits(2)]
  pub accel_data_ready: IntPin,
  #[bits(2)]
  pub fifo_watermark: IntPin,
  #[bits(2)]
  pub fifo_full: IntPin,
}

/// Electrical configuration of both interrupt pins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct IntPinConfig {
  pub int1: IntConfig,
  pub int2: IntConfig,
}

impl IntPinConfig {
  pub fn pin_mut(&mut self, pin: IntPin) -> Option<&mut IntConfig> {
    match pin {
      IntPin::Int1 => Some(&mut self.int1),
      IntPin::Int2 => Some(&mut self.int2),
      IntPin::None => None,
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct IntConfig {
  pub output: OutputMode,
  pub level: ActiveLevel,
  pub enable: bool,
}

impl Default for IntConfig {
  fn default() -> Self {
    Self { output: OutputMode::OpenDrain, level: ActiveLevel::ActiveHigh, enable: false }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum IntPin {
  #[default]
  None = 0x0,
  Int1 = 0x1,
  Int2 = 0x2,
  // Ibi = 0b11,
}

impl From<IntPin> for u8 {
  fn from(value: IntPin) -> Self {
    value as u8
  }
}

impl TryFrom<u8> for IntPin {
  type Error = ();
  fn try_from(v: u8) -> Result<Self, Self::Error> {
    match v {
      0x0 => Ok(IntPin::None),
      0x1 => Ok(IntPin::Int1),
      0x2 => Ok(IntPin::Int2),
      0x3 => Ok(IntPin::None), // treat IBI as None here
      _ => Err(()),
    }
  }
}

/// Configures the pin output mode (push-pull or open-drain).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum OutputMode {
  PushPull = 0,
  OpenDrain = 1,
}

impl From<OutputMode> for u8 {
  fn from(value: OutputMode) -> Self {
    value as u8
  }
}

impl TryFrom<u8> for OutputMode {
  type Error = ();
  fn try_from(v: u8) -> Result<Self, Self::Error> {
    match v & 0x01 {
      0 => Ok(OutputMode::PushPull),
      1 => Ok(OutputMode::OpenDrain),
      _ => Err(()),
    }
  }
}

/// Represents the active level for interrupt pins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ActiveLevel {
  ActiveLow = 0,
  ActiveHigh = 1,
}

impl From<ActiveLevel> for u8 {
  fn from(value: ActiveLevel) -> Self {
    value as u8
  }
}

impl TryFrom<u8> for ActiveLevel {
  type Error = ();
  fn try_from(v: u8) -> Result<Self, Self::Error> {
    match v & 0x01 {
      0 => Ok(ActiveLevel::ActiveLow),
      1 => Ok(ActiveLevel::ActiveHigh),
      _ => Err(()),
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[packbits::pack(bytes = 2)]
struct IoIntCtrl {
  // INT1
  #[bits(1)]
  pub int1_level: ActiveLevel,
  #[bits(1)]
  pub int1_output: OutputMode,
  #[bits(1)]
  pub int1_enable: bool,
  #[skip(5)]
  // INT2
  #[bits(1)]
  pub int2_level: ActiveLevel,
  #[bits(1)]
  pub int2_output: OutputMode,
  #[bits(1)]
  pub int2_enable: bool,
}

/// Decoded interrupt status word. Sources are independent; several may be
/// set by one read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[packbits::pack(bytes = 2)]
pub struct IntStatus {
  #[bits(1)]
  pub no_motion: bool,
  #[bits(1)]
  pub any_motion: bool,
  #[bits(1)]
  pub flat: bool,
  #[bits(1)]
  pub orientation: bool,
  #[bits(1)]
  pub step_detector: bool,
  #[bits(1)]
  pub step_counter: bool,
  #[bits(1)]
  pub sig_motion: bool,
  #[bits(1)]
  pub tilt: bool,
  #[bits(1)]
  pub tap: bool,
  #[skip(1)]
  #[bits(1)]
  pub err_status: bool,
  #[bits(1)]
  pub temp_data_ready: bool,
  #[bits(1)]
  pub gyro_data_ready: bool,
  #[bits(1)]
  pub accel_data_ready: bool,
  #[bits(1)]
  pub fifo_watermark: bool,
  #[bits(1)]
  pub fifo_full: bool,
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::testing::*;
  use futures::executor::block_on;

  #[test]
  fn pin_config_write_leaves_other_pin_alone() {
    let mut imu = Bmi323::new(MockBus::bmi323(), NoDelay);
    let cfg = IntConfig { output: OutputMode::PushPull, level: ActiveLevel::ActiveHigh, enable: true };

    block_on(imu.set_int_pin_config(IntPin::Int2, cfg)).unwrap();

    let pins = block_on(imu.get_int_pin_config()).unwrap();
    assert_eq!(pins.int2, cfg);
    assert!(!pins.int1.enable);

    let (bus, _) = imu.release();
    assert_eq!(bus.word(Reg::IoIntCtrl as u8), 0x0500);
  }

  #[test]
  fn pin_config_rejects_unrouted_pin() {
    let mut imu = Bmi323::new(MockBus::bmi323(), NoDelay);

    let res = block_on(imu.set_int_pin_config(IntPin::None, IntConfig::default()));

    assert_eq!(res, Err(Error::InvalidMode));
  }

  #[test]
  fn int_map_spans_both_map_registers() {
    let mut imu = Bmi323::new(MockBus::bmi323(), NoDelay);
    let map = IntMap { any_motion: IntPin::Int2, accel_data_ready: IntPin::Int1, ..Default::default() };

    block_on(imu.set_int_map(map)).unwrap();

    assert_eq!(block_on(imu.get_int_map()).unwrap(), map);
    let (bus, _) = imu.release();
    assert_eq!(bus.word(Reg::IntMap1 as u8), 0x0008);
    assert_eq!(bus.word(Reg::IntMap1 as u8 + 1), 0x0400);
  }

  #[test]
  fn status_bits_decode_independently() {
    let mut bus = MockBus::bmi323();
    bus.set_word(Reg::IntStatusInt2 as u8, 0b11);
    bus.set_word(Reg::IntStatusInt1 as u8, 1 << 13);
    let mut imu = Bmi323::new(bus, NoDelay);

    let feat = block_on(imu.get_int2_status()).unwrap();
    let drdy = block_on(imu.get_int1_status()).unwrap();

    assert!(feat.any_motion && feat.no_motion);
    assert!(drdy.accel_data_ready && !drdy.gyro_data_ready);
  }
}
