//! Two-profile motion configuration.
//!
//! The user profile runs accel and gyro at 100 Hz; the alternate profile runs
//! both at 400 Hz with 4-sample averaging. No-motion switches the device onto
//! the alternate profile and any-motion switches it back. Everything is
//! applied as one read-modify-write of the profile batch, after which the
//! automatic switch is armed.

use crate::{
  accel::{AccelPowerMode, AltAccelConfig},
  alt::AltEnable,
  feature::{
    alt_auto::{AltSwitch, MotionDetector},
    Features,
  },
  gyro::{AltGyroConfig, GyroPowerMode},
  profile::ProfileSet,
  AverageNum, Error, OutputDataRate, SensorDriver,
};

/// Driver call site, used to attribute failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Step {
  Init,
  GetSensorConfig,
  SetSensorConfig,
  EnableAltConfig,
  SelectSensor,
  GetIntPinConfig,
  SetInt1PinConfig,
  SetInt2PinConfig,
  MapInterrupt,
  ReadInt1Status,
  ReadInt2Status,
  ReadAccel,
  ReadGyro,
  ReadAltStatus,
}

impl Step {
  pub fn name(&self) -> &'static str {
    match self {
      Step::Init => "Sensor init",
      Step::GetSensorConfig => "Get sensor config",
      Step::SetSensorConfig => "Set sensor config",
      Step::EnableAltConfig => "Enable alternate config control",
      Step::SelectSensor => "Select sensor",
      Step::GetIntPinConfig => "Get int pin config",
      Step::SetInt1PinConfig => "Set INT1 pin config",
      Step::SetInt2PinConfig => "Set INT2 pin config",
      Step::MapInterrupt => "Map interrupt",
      Step::ReadInt1Status => "Read INT1 status",
      Step::ReadInt2Status => "Read INT2 status",
      Step::ReadAccel => "Get accel data",
      Step::ReadGyro => "Get gyro data",
      Step::ReadAltStatus => "Read alternate status",
    }
  }
}

/// A startup driver call failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ConfigError<E> {
  pub step: Step,
  pub error: Error<E>,
}

/// Attribute a driver result to `step`, logging the failure.
pub(crate) fn checked<T, E>(step: Step, res: Result<T, Error<E>>) -> Result<T, ConfigError<E>> {
  res.map_err(|error| {
    #[cfg(feature = "defmt")]
    defmt::error!("{} failed: {}", step.name(), error.code());
    ConfigError { step, error }
  })
}

/// Detector parameters in raw feature-engine units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MotionThresholds {
  pub slope: u16,
  pub hysteresis: u16,
  pub duration: u16,
}

/// Compiled-in profile values.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ProfileSettings {
  pub accel_mode: AccelPowerMode,
  pub accel_odr: OutputDataRate,
  pub gyro_mode: GyroPowerMode,
  pub gyro_odr: OutputDataRate,
  pub any_motion: MotionThresholds,
  pub no_motion: MotionThresholds,
  pub alt_switch: AltSwitch,
  pub alt_accel: AltAccelConfig,
  pub alt_gyro: AltGyroConfig,
  /// Armed only once the batch write went through.
  pub alt_enable: AltEnable,
}

impl Default for ProfileSettings {
  fn default() -> Self {
    Self {
      accel_mode: AccelPowerMode::Normal,
      accel_odr: OutputDataRate::Hz100,
      gyro_mode: GyroPowerMode::Normal,
      gyro_odr: OutputDataRate::Hz100,
      any_motion: MotionThresholds { slope: 9, hysteresis: 9, duration: 9 },
      no_motion: MotionThresholds { slope: 8, hysteresis: 9, duration: 9 },
      alt_switch: AltSwitch::new(MotionDetector::NoMotion),
      alt_accel: AltAccelConfig { odr: OutputDataRate::Hz400, avg: AverageNum::Avg4, mode: AccelPowerMode::Normal },
      alt_gyro: AltGyroConfig { odr: OutputDataRate::Hz400, avg: AverageNum::Avg4, mode: GyroPowerMode::Normal },
      alt_enable: AltEnable::new(true, true, false),
    }
  }
}

impl ProfileSettings {
  /// Overlay these settings on a batch read back from the device.
  ///
  /// Fields not named here (ranges, bandwidths, wait times) keep the values
  /// the device reported.
  pub fn apply(&self, set: &mut ProfileSet) {
    set.accel.mode = self.accel_mode;
    set.accel.odr = self.accel_odr;
    set.gyro.mode = self.gyro_mode;
    set.gyro.odr = self.gyro_odr;

    let MotionThresholds { slope, hysteresis, duration } = self.any_motion;
    set.any_motion = set.any_motion.with_thresholds(slope, hysteresis, duration);
    let MotionThresholds { slope, hysteresis, duration } = self.no_motion;
    set.no_motion = set.no_motion.with_thresholds(slope, hysteresis, duration);

    set.alt_switch = Some(self.alt_switch);
    set.alt_accel = self.alt_accel;
    set.alt_gyro = self.alt_gyro;
  }
}

/// Program both profiles and arm the automatic switch.
///
/// Reads the whole profile batch, overlays `settings`, writes the batch back
/// and only then enables alternate configuration. Stops at the first failing
/// step.
pub async fn apply_feature_config<S: SensorDriver>(
  sensor: &mut S,
  settings: &ProfileSettings,
) -> Result<ProfileSet, ConfigError<S::BusError>> {
  let mut set = checked(Step::GetSensorConfig, sensor.get_sensor_config().await)?;

  settings.apply(&mut set);

  checked(Step::SetSensorConfig, sensor.set_sensor_config(&set).await)?;
  checked(Step::EnableAltConfig, sensor.enable_alternate_config(settings.alt_enable).await)?;

  #[cfg(feature = "defmt")]
  defmt::info!("profiles applied, alternate switch on {}", settings.alt_switch.alternate);

  Ok(set)
}

/// The detectors the switch listens to: any-motion and no-motion on X.
pub fn motion_features() -> Features {
  let mut f = Features::none();
  f.any_motion_x = true;
  f.no_motion_x = true;
  f
}

/// Replace the feature enable set.
pub async fn select_features<S: SensorDriver>(
  sensor: &mut S,
  features: Features,
) -> Result<(), ConfigError<S::BusError>> {
  checked(Step::SelectSensor, sensor.select_sensor(features).await)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::testing::*;
  use futures::executor::block_on;

  #[test]
  fn applies_read_modify_write_then_arms_switch() {
    let mut sensor = FakeSensor::new();

    let set = block_on(apply_feature_config(&mut sensor, &ProfileSettings::default())).unwrap();

    assert_eq!(sensor.steps(), [Step::GetSensorConfig, Step::SetSensorConfig, Step::EnableAltConfig]);
    assert_eq!(sensor.calls[2], Call::EnableAltConfig(AltEnable::new(true, true, false)));
    assert_eq!(sensor.profiles, set);
    assert_eq!(set.alt_accel.odr, OutputDataRate::Hz400);
    assert_eq!(set.any_motion.slope_threshold, 9);
    assert_eq!(set.no_motion.slope_threshold, 8);
  }

  #[test]
  fn alternate_side_is_no_motion_and_user_side_any_motion() {
    let mut sensor = FakeSensor::new();

    let set = block_on(apply_feature_config(&mut sensor, &ProfileSettings::default())).unwrap();

    let switch = set.alt_switch.unwrap();
    assert_eq!(switch.alternate, MotionDetector::NoMotion);
    assert_eq!(switch.user(), MotionDetector::AnyMotion);
  }

  #[test]
  fn failed_read_skips_write_and_enable() {
    let mut sensor = FakeSensor::new().failing_at(Step::GetSensorConfig);

    let err = block_on(apply_feature_config(&mut sensor, &ProfileSettings::default())).unwrap_err();

    assert_eq!(err, ConfigError { step: Step::GetSensorConfig, error: Error::Bus(()) });
    assert_eq!(sensor.steps(), [Step::GetSensorConfig]);
  }

  #[test]
  fn failed_write_never_arms_switch() {
    let mut sensor = FakeSensor::new().failing_at(Step::SetSensorConfig);

    let err = block_on(apply_feature_config(&mut sensor, &ProfileSettings::default())).unwrap_err();

    assert_eq!(err.step, Step::SetSensorConfig);
    assert!(!sensor.steps().contains(&Step::EnableAltConfig));
  }

  #[test]
  fn overlay_keeps_fields_it_does_not_own() {
    let mut set = ProfileSet::default();
    set.accel.range = crate::accel::AccelRange::G16;
    set.any_motion.wait_time = 6;

    ProfileSettings::default().apply(&mut set);

    assert_eq!(set.accel.range, crate::accel::AccelRange::G16);
    assert_eq!(set.any_motion.wait_time, 6);
    assert_eq!(set.accel.mode, AccelPowerMode::Normal);
  }

  #[test]
  fn only_x_axis_motion_detectors_selected() {
    let mut sensor = FakeSensor::new();

    block_on(select_features(&mut sensor, motion_features())).unwrap();

    let Call::SelectSensor(f) = sensor.calls[0] else { panic!("unexpected call {:?}", sensor.calls[0]) };
    assert!(f.any_motion_x && f.no_motion_x);
    assert!(!f.any_motion_y && !f.no_motion_z && !f.tap_single);
  }
}
