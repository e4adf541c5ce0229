//! Accelerometer configuration and data reading.
//!
//! The accelerometer has two configuration registers: the user profile
//! (`ACC_CONF`) and the alternate profile (`ALT_ACC_CONF`) the device swaps
//! to on its own once alternate configuration is enabled (see [`crate::alt`]).
//!
//! # Examples
//!
//! ```no_run
//! # async fn example<B: bmi323_altcfg::bus::Interface, D: embedded_hal_async::delay::DelayNs>(mut imu: bmi323_altcfg::Bmi323<B, D>) {
//! use bmi323_altcfg::accel::{AccelConfig, AccelPowerMode};
//! use bmi323_altcfg::OutputDataRate;
//!
//! let config = AccelConfig { odr: OutputDataRate::Hz100, mode: AccelPowerMode::Normal, ..Default::default() };
//! let _ = imu.set_accel_conf(config).await;
//! # }
//! ```

use embedded_hal_async::delay::DelayNs;

use super::{Bmi323, Error, Sample, bus::Interface, defs::*};

// ACC_DATA_X..Z, GYR_DATA_X..Z, TEMP_DATA, SENSOR_TIME_0..1
const ACCEL_BURST_LEN: usize = 18;

impl<B, D, E> Bmi323<B, D>
where
  B: Interface<Error = E>,
  D: DelayNs,
{
  pub async fn get_accel_conf(&mut self) -> Result<AccelConfig, Error<E>> {
    self.read(Reg::AccConf).await
  }

  pub async fn set_accel_conf(&mut self, cfg: AccelConfig) -> Result<(), Error<E>> {
    self.write(Reg::AccConf, cfg).await
  }

  /// Read the alternate accelerometer profile.
  pub async fn get_alt_accel_conf(&mut self) -> Result<AltAccelConfig, Error<E>> {
    self.read(Reg::AltAccConf).await
  }

  /// Program the alternate accelerometer profile (does not activate by itself).
  pub async fn set_alt_accel_conf(&mut self, cfg: AltAccelConfig) -> Result<(), Error<E>> {
    self.write(Reg::AltAccConf, cfg).await
  }

  /// Read one raw accelerometer sample together with the sensor time.
  pub async fn get_accel_sample(&mut self) -> Result<Sample, Error<E>> {
    let mut b = [0u8; ACCEL_BURST_LEN];
    self.read_bytes(Reg::AccDataX, &mut b).await?;
    Ok(Sample::from_burst(&b))
  }
}

/// Accelerometer configuration register.
///
/// Configure the accelerometer's output data rate, measurement range,
/// bandwidth, averaging, and power mode.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[packbits::pack(bytes = 2)]
pub struct AccelConfig {
  /// Output Data Rate in Hz (≈0.78 Hz to 6.4 kHz).
  #[bits(4)]
  pub odr: crate::OutputDataRate,
  /// Full-scale measurement range (±2g, ±4g, ±8g, or ±16g).
  #[bits(3)]
  pub range: AccelRange,
  /// Digital low-pass filter cutoff (ODR/2 or ODR/4).
  #[bits(1)]
  pub bw: crate::Bandwidth,
  /// Number of samples averaged by on-chip filter.
  #[bits(3)]
  pub avg: crate::AverageNum,
  #[skip(1)]
  /// Power mode (normal, low power, etc.).
  #[bits(3)]
  pub mode: AccelPowerMode,
}

impl Default for AccelConfig {
  fn default() -> Self {
    AccelConfig {
      odr: crate::OutputDataRate::Hz100,
      range: AccelRange::G8,
      bw: crate::Bandwidth::OdrHalf,
      avg: crate::AverageNum::No,
      mode: AccelPowerMode::Disable,
    }
  }
}

/// Alternate accelerometer configuration (`ALT_ACC_CONF`).
///
/// Range and bandwidth are shared with the user profile; only rate,
/// averaging and power mode switch.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[packbits::pack(bytes = 2)]
pub struct AltAccelConfig {
  #[bits(4)]
  pub odr: crate::OutputDataRate,
  #[skip(4)]
  #[bits(3)]
  pub avg: crate::AverageNum,
  #[skip(1)]
  #[bits(3)]
  pub mode: AccelPowerMode,
}

impl Default for AltAccelConfig {
  fn default() -> Self {
    AltAccelConfig { odr: crate::OutputDataRate::Hz100, avg: crate::AverageNum::No, mode: AccelPowerMode::Disable }
  }
}

/// Accelerometer measurement range.
///
/// Determines the full-scale range of acceleration measurements.
/// Higher ranges allow measuring stronger accelerations but with
/// lower resolution.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AccelRange {
  /// ±2g range
  G2 = 0x00,
  /// ±4g range
  G4 = 0x01,
  /// ±8g range
  G8 = 0x02,
  /// ±16g range
  G16 = 0x03,
}

impl From<AccelRange> for u8 {
  fn from(value: AccelRange) -> Self {
    value as u8
  }
}

impl TryFrom<u8> for AccelRange {
  type Error = ();

  fn try_from(value: u8) -> Result<Self, Self::Error> {
    match value {
      0x00 => Ok(AccelRange::G2),
      0x01 => Ok(AccelRange::G4),
      0x02 => Ok(AccelRange::G8),
      0x03 => Ok(AccelRange::G16),
      _ => Err(()),
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AccelPowerMode {
  Disable = 0x0,
  /// Duty-cycled, averaging applies
  LowPower = 0x3,
  Normal = 0x4,
  HighPerf = 0x7,
}

impl From<AccelPowerMode> for u8 {
  fn from(value: AccelPowerMode) -> Self {
    value as u8
  }
}

impl TryFrom<u8> for AccelPowerMode {
  type Error = ();

  fn try_from(value: u8) -> Result<Self, Self::Error> {
    match value {
      0x0 => Ok(AccelPowerMode::Disable),
      0x3 => Ok(AccelPowerMode::LowPower),
      0x4 => Ok(AccelPowerMode::Normal),
      0x7 => Ok(AccelPowerMode::HighPerf),
      _ => Err(()),
    }
  }
}
