//! Gyroscope configuration and data reading.
//!
//! Mirrors [`crate::accel`]: a user profile in `GYR_CONF`, an alternate
//! profile in `ALT_GYR_CONF`, and raw sample reads.

use embedded_hal_async::delay::DelayNs;

use super::{Bmi323, Error, Sample, bus::Interface, defs::*};

// GYR_DATA_X..Z, TEMP_DATA, SENSOR_TIME_0..1
const GYRO_BURST_LEN: usize = 12;

impl<B, D, E> Bmi323<B, D>
where
  B: Interface<Error = E>,
  D: DelayNs,
{
  /// Read the current gyroscope configuration.
  pub async fn get_gyro_conf(&mut self) -> Result<GyroConfig, Error<E>> {
    self.read(Reg::GyrConf).await
  }

  /// Set the gyroscope configuration.
  pub async fn set_gyro_conf(&mut self, cfg: GyroConfig) -> Result<(), Error<E>> {
    self.write(Reg::GyrConf, cfg).await
  }

  pub async fn get_alt_gyro_conf(&mut self) -> Result<AltGyroConfig, Error<E>> {
    self.read(Reg::AltGyrConf).await
  }

  /// Program the alternate gyroscope profile (does not activate by itself).
  pub async fn set_alt_gyro_conf(&mut self, cfg: AltGyroConfig) -> Result<(), Error<E>> {
    self.write(Reg::AltGyrConf, cfg).await
  }

  /// Read one raw gyroscope sample together with the sensor time.
  pub async fn get_gyro_sample(&mut self) -> Result<Sample, Error<E>> {
    let mut b = [0u8; GYRO_BURST_LEN];
    self.read_bytes(Reg::GyrDataX, &mut b).await?;
    Ok(Sample::from_burst(&b))
  }
}

/// Gyroscope configuration register.
///
/// Configure the gyroscope's output data rate, measurement range,
/// bandwidth, averaging, and power mode.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[packbits::pack(bytes = 2)]
pub struct GyroConfig {
  /// Output Data Rate in Hz (≈0.78 Hz to 6.4 kHz).
  #[bits(4)]
  pub odr: crate::OutputDataRate,
  /// Full-scale measurement range (±125°/s to ±2000°/s).
  #[bits(3)]
  pub range: GyroRange,
  /// Digital low-pass filter cutoff (ODR/2 or ODR/4).
  #[bits(1)]
  pub bw: crate::Bandwidth,
  /// Number of samples averaged by on-chip filter.
  #[bits(3)]
  pub avg: crate::AverageNum,
  #[skip(1)]
  /// Power mode (normal, low power, etc.).
  #[bits(3)]
  pub mode: GyroPowerMode,
}

impl Default for GyroConfig {
  fn default() -> Self {
    GyroConfig {
      odr: crate::OutputDataRate::Hz100,
      range: GyroRange::DPS2000,
      bw: crate::Bandwidth::OdrHalf,
      avg: crate::AverageNum::No,
      mode: GyroPowerMode::Disable,
    }
  }
}

/// Alternate gyroscope configuration (`ALT_GYR_CONF`).
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[packbits::pack(bytes = 2)]
pub struct AltGyroConfig {
  #[bits(4)]
  pub odr: crate::OutputDataRate,
  #[skip(4)]
  #[bits(3)]
  pub avg: crate::AverageNum,
  #[skip(1)]
  #[bits(3)]
  pub mode: GyroPowerMode,
}

impl Default for AltGyroConfig {
  fn default() -> Self {
    AltGyroConfig { odr: crate::OutputDataRate::Hz100, avg: crate::AverageNum::No, mode: GyroPowerMode::Disable }
  }
}

/// Gyroscope measurement ranges
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum GyroRange {
  /// ±125 degrees per second
  DPS125 = 0,
  /// ±250 degrees per second
  DPS250 = 1,
  /// ±500 degrees per second
  DPS500 = 2,
  /// ±1000 degrees per second
  DPS1000 = 3,
  /// ±2000 degrees per second
  DPS2000 = 4,
}

impl From<GyroRange> for u8 {
  fn from(value: GyroRange) -> Self {
    value as u8
  }
}

impl TryFrom<u8> for GyroRange {
  type Error = ();

  fn try_from(value: u8) -> Result<Self, Self::Error> {
    match value {
      0 => Ok(GyroRange::DPS125),
      1 => Ok(GyroRange::DPS250),
      2 => Ok(GyroRange::DPS500),
      3 => Ok(GyroRange::DPS1000),
      4 => Ok(GyroRange::DPS2000),
      _ => Err(()),
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum GyroPowerMode {
  /// Gyroscope disabled
  Disable = 0x00,
  /// Suspend mode
  Suspend = 0x01,
  /// Low power mode
  LowPower = 0x03,
  /// Normal power mode
  Normal = 0x04,
  /// High performance mode
  HighPerf = 0x07,
}

impl From<GyroPowerMode> for u8 {
  fn from(value: GyroPowerMode) -> Self {
    value as u8
  }
}

impl TryFrom<u8> for GyroPowerMode {
  type Error = ();

  fn try_from(value: u8) -> Result<Self, Self::Error> {
    match value {
      0x00 => Ok(GyroPowerMode::Disable),
      0x01 => Ok(GyroPowerMode::Suspend),
      0x03 => Ok(GyroPowerMode::LowPower),
      0x04 => Ok(GyroPowerMode::Normal),
      0x07 => Ok(GyroPowerMode::HighPerf),
      _ => Err(()),
    }
  }
}
