//! Alternate auto-config switch sources.
//!
//! The feature engine flips accel/gyro onto the alternate profile when the
//! `alt_switch` source fires and back onto the user profile when the
//! `user_switch` source fires. Pairing any-motion with no-motion gives a
//! profile that follows whether the board is moving.

use embedded_hal_async::delay::DelayNs;

use crate::{Bmi323, Error, bus::Interface};

impl<B, D, E> Bmi323<B, D>
where
  B: Interface<Error = E>,
  D: DelayNs,
{
  pub async fn set_alt_auto_config(&mut self, cfg: AltAutoConfig) -> Result<(), Error<E>> {
    self.write_feature(super::FeatureAddr::AltAutoConfig, cfg).await
  }

  pub async fn get_alt_auto_config(&mut self) -> Result<AltAutoConfig, Error<E>> {
    self.read_feature(super::FeatureAddr::AltAutoConfig).await
  }
}

/// Raw `alt_auto_config` feature word.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[packbits::pack(bytes = 2)]
pub struct AltAutoConfig {
  /// Feature whose event switches to the alternate profile.
  #[bits(4)]
  pub alt_switch: SwitchSource,
  /// Feature whose event switches back to the user profile.
  #[bits(4)]
  pub user_switch: SwitchSource,
}

impl AltAutoConfig {
  /// The any/no-motion pairing, if that is what the sources form.
  pub fn motion_switch(&self) -> Option<AltSwitch> {
    match (self.alt_switch, self.user_switch) {
      (SwitchSource::NoMotion, SwitchSource::AnyMotion) => Some(AltSwitch::new(MotionDetector::NoMotion)),
      (SwitchSource::AnyMotion, SwitchSource::NoMotion) => Some(AltSwitch::new(MotionDetector::AnyMotion)),
      _ => None,
    }
  }
}

impl From<AltSwitch> for AltAutoConfig {
  fn from(s: AltSwitch) -> Self {
    Self { alt_switch: s.alternate.into(), user_switch: s.user().into() }
  }
}

/// Feature-engine event that can drive a profile switch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SwitchSource {
  #[default]
  None = 0,
  NoMotion = 1,
  AnyMotion = 2,
  Flat = 3,
  Orientation = 4,
  StepDetector = 5,
  StepCounter = 6,
  SigMotion = 7,
  Tilt = 8,
  Tap = 9,
}

impl From<SwitchSource> for u8 {
  fn from(value: SwitchSource) -> Self {
    value as u8
  }
}

impl TryFrom<u8> for SwitchSource {
  type Error = ();
  fn try_from(v: u8) -> Result<Self, Self::Error> {
    Ok(match v {
      0 => SwitchSource::None,
      1 => SwitchSource::NoMotion,
      2 => SwitchSource::AnyMotion,
      3 => SwitchSource::Flat,
      4 => SwitchSource::Orientation,
      5 => SwitchSource::StepDetector,
      6 => SwitchSource::StepCounter,
      7 => SwitchSource::SigMotion,
      8 => SwitchSource::Tilt,
      9 => SwitchSource::Tap,
      _ => return Err(()),
    })
  }
}

/// One of the two motion detectors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MotionDetector {
  AnyMotion,
  NoMotion,
}

impl MotionDetector {
  pub const fn other(self) -> Self {
    match self {
      MotionDetector::AnyMotion => MotionDetector::NoMotion,
      MotionDetector::NoMotion => MotionDetector::AnyMotion,
    }
  }
}

impl From<MotionDetector> for SwitchSource {
  fn from(d: MotionDetector) -> Self {
    match d {
      MotionDetector::AnyMotion => SwitchSource::AnyMotion,
      MotionDetector::NoMotion => SwitchSource::NoMotion,
    }
  }
}

/// Assignment of the motion detectors to the two sides of the switch.
///
/// Only the alternate side is stored; the user side is always the other
/// detector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AltSwitch {
  pub alternate: MotionDetector,
}

impl AltSwitch {
  pub const fn new(alternate: MotionDetector) -> Self {
    Self { alternate }
  }

  /// Detector that switches back to the user profile.
  pub const fn user(&self) -> MotionDetector {
    self.alternate.other()
  }
}
