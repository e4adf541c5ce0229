//! The seven-entry sensor profile batch.
//!
//! Accel, gyro, both motion detectors, the alternate switch and both
//! alternate profiles are always read and written together. [`ProfileSet`]
//! holds exactly one typed payload per [`FeatureKind`]; [`Profile`] is the
//! same data as a single tagged entry, for code that walks the batch.

use crate::{
  accel::{AccelConfig, AltAccelConfig},
  feature::{alt_auto::AltSwitch, any_no_motion::AnyNoMotionConfig},
  gyro::{AltGyroConfig, GyroConfig},
};

/// Kind of a profile entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FeatureKind {
  Accel,
  Gyro,
  AnyMotion,
  NoMotion,
  AltAutoConfig,
  AltAccel,
  AltGyro,
}

impl FeatureKind {
  /// Every kind, in batch order.
  pub const ALL: [FeatureKind; 7] = [
    FeatureKind::Accel,
    FeatureKind::Gyro,
    FeatureKind::AnyMotion,
    FeatureKind::NoMotion,
    FeatureKind::AltAutoConfig,
    FeatureKind::AltAccel,
    FeatureKind::AltGyro,
  ];
}

/// One profile entry, tagged by kind.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Profile {
  Accel(AccelConfig),
  Gyro(GyroConfig),
  AnyMotion(AnyNoMotionConfig),
  NoMotion(AnyNoMotionConfig),
  /// `None` when the switch is not driven by the any/no-motion pair.
  AltAutoConfig(Option<AltSwitch>),
  AltAccel(AltAccelConfig),
  AltGyro(AltGyroConfig),
}

impl Profile {
  pub fn kind(&self) -> FeatureKind {
    match self {
      Profile::Accel(_) => FeatureKind::Accel,
      Profile::Gyro(_) => FeatureKind::Gyro,
      Profile::AnyMotion(_) => FeatureKind::AnyMotion,
      Profile::NoMotion(_) => FeatureKind::NoMotion,
      Profile::AltAutoConfig(_) => FeatureKind::AltAutoConfig,
      Profile::AltAccel(_) => FeatureKind::AltAccel,
      Profile::AltGyro(_) => FeatureKind::AltGyro,
    }
  }
}

/// Complete profile batch: one entry per [`FeatureKind`].
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ProfileSet {
  pub accel: AccelConfig,
  pub gyro: GyroConfig,
  pub any_motion: AnyNoMotionConfig,
  pub no_motion: AnyNoMotionConfig,
  pub alt_switch: Option<AltSwitch>,
  pub alt_accel: AltAccelConfig,
  pub alt_gyro: AltGyroConfig,
}

impl ProfileSet {
  pub fn get(&self, kind: FeatureKind) -> Profile {
    match kind {
      FeatureKind::Accel => Profile::Accel(self.accel),
      FeatureKind::Gyro => Profile::Gyro(self.gyro),
      FeatureKind::AnyMotion => Profile::AnyMotion(self.any_motion),
      FeatureKind::NoMotion => Profile::NoMotion(self.no_motion),
      FeatureKind::AltAutoConfig => Profile::AltAutoConfig(self.alt_switch),
      FeatureKind::AltAccel => Profile::AltAccel(self.alt_accel),
      FeatureKind::AltGyro => Profile::AltGyro(self.alt_gyro),
    }
  }

  /// Replace the entry of `profile`'s kind.
  pub fn set(&mut self, profile: Profile) {
    match profile {
      Profile::Accel(c) => self.accel = c,
      Profile::Gyro(c) => self.gyro = c,
      Profile::AnyMotion(c) => self.any_motion = c,
      Profile::NoMotion(c) => self.no_motion = c,
      Profile::AltAutoConfig(s) => self.alt_switch = s,
      Profile::AltAccel(c) => self.alt_accel = c,
      Profile::AltGyro(c) => self.alt_gyro = c,
    }
  }

  /// All entries in batch order.
  pub fn iter(&self) -> impl Iterator<Item = Profile> + '_ {
    self.kinds().map(move |k| self.get(k))
  }

  pub fn kinds(&self) -> impl Iterator<Item = FeatureKind> {
    FeatureKind::ALL.into_iter()
  }
}
