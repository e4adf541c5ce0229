//! The driver surface the control core runs against.
//!
//! [`SensorDriver`] is implemented by [`Bmi323`] for real hardware; the
//! configuration manager, router and acquisition loop only ever see the
//! trait, so they can run against any transport or a scripted stand-in.

use embedded_hal_async::delay::DelayNs;

use crate::{
  alt::{AltEnable, AltStatus},
  bus::{Interface, InterfaceKind},
  feature::{alt_auto::AltAutoConfig, Features},
  interrupt::{IntConfig, IntMap, IntPin, IntPinConfig, IntStatus},
  profile::{Profile, ProfileSet},
  Bmi323, Error, Sample, Sensor,
};

#[allow(async_fn_in_trait)]
pub trait SensorDriver {
  type BusError;

  fn interface(&self) -> InterfaceKind;

  /// Reset, identify and bring up the feature engine. Returns the chip id.
  async fn init(&mut self) -> Result<u8, Error<Self::BusError>>;

  /// Read all seven profile entries in one call.
  async fn get_sensor_config(&mut self) -> Result<ProfileSet, Error<Self::BusError>>;

  /// Write all seven profile entries in one call.
  async fn set_sensor_config(&mut self, profiles: &ProfileSet) -> Result<(), Error<Self::BusError>>;

  async fn enable_alternate_config(&mut self, en: AltEnable) -> Result<(), Error<Self::BusError>>;

  /// Replace the feature enable set.
  async fn select_sensor(&mut self, features: Features) -> Result<(), Error<Self::BusError>>;

  async fn get_int_pin_config(&mut self) -> Result<IntPinConfig, Error<Self::BusError>>;

  /// Write the electrical configuration of a single pin.
  async fn set_int_pin_config(&mut self, pin: IntPin, cfg: IntConfig) -> Result<(), Error<Self::BusError>>;

  async fn map_interrupt(&mut self, map: IntMap) -> Result<(), Error<Self::BusError>>;

  async fn get_int1_status(&mut self) -> Result<IntStatus, Error<Self::BusError>>;

  async fn get_int2_status(&mut self) -> Result<IntStatus, Error<Self::BusError>>;

  /// One raw sample with its sensor time.
  async fn get_sensor_data(&mut self, sensor: Sensor) -> Result<Sample, Error<Self::BusError>>;

  async fn read_alternate_status(&mut self) -> Result<AltStatus, Error<Self::BusError>>;
}

impl<B, D, E> SensorDriver for Bmi323<B, D>
where
  B: Interface<Error = E>,
  D: DelayNs,
{
  type BusError = E;

  fn interface(&self) -> InterfaceKind {
    Bmi323::interface(self)
  }

  async fn init(&mut self) -> Result<u8, Error<E>> {
    Bmi323::init(self).await
  }

  async fn get_sensor_config(&mut self) -> Result<ProfileSet, Error<E>> {
    Ok(ProfileSet {
      accel: self.get_accel_conf().await?,
      gyro: self.get_gyro_conf().await?,
      any_motion: self.get_any_motion_conf().await?,
      no_motion: self.get_no_motion_conf().await?,
      alt_switch: self.get_alt_auto_config().await?.motion_switch(),
      alt_accel: self.get_alt_accel_conf().await?,
      alt_gyro: self.get_alt_gyro_conf().await?,
    })
  }

  async fn set_sensor_config(&mut self, profiles: &ProfileSet) -> Result<(), Error<E>> {
    for profile in profiles.iter() {
      match profile {
        Profile::Accel(c) => self.set_accel_conf(c).await?,
        Profile::Gyro(c) => self.set_gyro_conf(c).await?,
        Profile::AnyMotion(c) => self.set_any_motion_conf(c).await?,
        Profile::NoMotion(c) => self.set_no_motion_conf(c).await?,
        // No motion pairing disarms the switch.
        Profile::AltAutoConfig(s) => self.set_alt_auto_config(s.map(AltAutoConfig::from).unwrap_or_default()).await?,
        Profile::AltAccel(c) => self.set_alt_accel_conf(c).await?,
        Profile::AltGyro(c) => self.set_alt_gyro_conf(c).await?,
      }
    }
    Ok(())
  }

  async fn enable_alternate_config(&mut self, en: AltEnable) -> Result<(), Error<E>> {
    self.set_alt_enable(en).await
  }

  async fn select_sensor(&mut self, features: Features) -> Result<(), Error<E>> {
    self.set_enabled_features(features).await
  }

  async fn get_int_pin_config(&mut self) -> Result<IntPinConfig, Error<E>> {
    Bmi323::get_int_pin_config(self).await
  }

  async fn set_int_pin_config(&mut self, pin: IntPin, cfg: IntConfig) -> Result<(), Error<E>> {
    Bmi323::set_int_pin_config(self, pin, cfg).await
  }

  async fn map_interrupt(&mut self, map: IntMap) -> Result<(), Error<E>> {
    self.set_int_map(map).await
  }

  async fn get_int1_status(&mut self) -> Result<IntStatus, Error<E>> {
    Bmi323::get_int1_status(self).await
  }

  async fn get_int2_status(&mut self) -> Result<IntStatus, Error<E>> {
    Bmi323::get_int2_status(self).await
  }

  async fn get_sensor_data(&mut self, sensor: Sensor) -> Result<Sample, Error<E>> {
    match sensor {
      Sensor::Accel => self.get_accel_sample().await,
      Sensor::Gyro => self.get_gyro_sample().await,
    }
  }

  async fn read_alternate_status(&mut self) -> Result<AltStatus, Error<E>> {
    self.get_alt_status().await
  }
}
