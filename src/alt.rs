//! Alternate configuration control.
//!
//! Once enabled, the device swaps accel and/or gyro between the user
//! profile and the alternate profile by itself, driven by the feature
//! engine sources selected in [`AltSwitch`](crate::feature::alt_auto::AltSwitch).

use embedded_hal_async::delay::DelayNs;

use super::{Bmi323, Error, bus::Interface, defs::*};

impl<B, D, E> Bmi323<B, D>
where
  B: Interface<Error = E>,
  D: DelayNs,
{
  /// Configure alternate config switching behavior (accel/gyro, reset-on-user-write).
  pub async fn set_alt_enable(&mut self, en: AltEnable) -> Result<(), Error<E>> {
    self.write(Reg::AltConf, en).await
  }

  pub async fn get_alt_enable(&mut self) -> Result<AltEnable, Error<E>> {
    self.read(Reg::AltConf).await
  }

  /// Which sensors currently run on their alternate profile.
  pub async fn get_alt_status(&mut self) -> Result<AltStatus, Error<E>> {
    self.read(Reg::AltStatus).await
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[packbits::pack(bytes = 2)]
pub struct AltEnable {
  #[bits(1)]
  pub accel: bool,
  #[skip(3)]
  #[bits(1)]
  pub gyro: bool,
  /// If enabled, writes to ACC_CONF/GYR_CONF reset active alt to user config.
  ///
  /// Left off, a triggered switch sticks until the feature engine flips it back.
  #[skip(3)]
  #[bits(1)]
  pub reset_on_user_conf_write: bool,
}

impl AltEnable {
  pub const fn new(accel: bool, gyro: bool, reset_on_user_conf_write: bool) -> Self {
    Self { accel, gyro, reset_on_user_conf_write }
  }
}

/// Active profile per sensor; `true` means the alternate profile is in use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[packbits::pack(bytes = 2)]
pub struct AltStatus {
  #[bits(1)]
  pub accel: bool,
  #[skip(3)]
  #[bits(1)]
  pub gyro: bool,
}

impl AltStatus {
  /// Both sensors on their user profile.
  pub const INACTIVE: Self = Self { accel: false, gyro: false };
}
