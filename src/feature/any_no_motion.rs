//! Any-motion and no-motion detectors.
//!
//! Both share one config layout; they differ only in which side of the slope
//! threshold asserts the event.

use embedded_hal_async::delay::DelayNs;

use crate::{Bmi323, Error, bus::Interface};

impl<B, D, E> Bmi323<B, D>
where
  B: Interface<Error = E>,
  D: DelayNs,
{
  pub async fn set_any_motion_conf(&mut self, cfg: AnyNoMotionConfig) -> Result<(), Error<E>> {
    self.write_feature(super::FeatureAddr::AnyMotion, cfg).await
  }

  pub async fn get_any_motion_conf(&mut self) -> Result<AnyNoMotionConfig, Error<E>> {
    self.read_feature(super::FeatureAddr::AnyMotion).await
  }

  pub async fn set_no_motion_conf(&mut self, cfg: AnyNoMotionConfig) -> Result<(), Error<E>> {
    self.write_feature(super::FeatureAddr::NoMotion, cfg).await
  }

  pub async fn get_no_motion_conf(&mut self) -> Result<AnyNoMotionConfig, Error<E>> {
    self.read_feature(super::FeatureAddr::NoMotion).await
  }
}

/// Any-/no-motion detector parameters, in raw feature-engine units.
///
/// Any-motion asserts once the accel slope stays above `slope_threshold` for
/// `duration` 20 ms ticks; no-motion asserts once it stays below for the same
/// span. `hysteresis` widens the band the slope must leave before the state
/// flips back, and `wait_time` delays the clear.
///
/// Thresholds and hysteresis are in 1/512 g; timing fields in 20 ms ticks.
/// Effective sensitivity follows the accel ODR and averaging of whichever
/// profile is active when the detector runs.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[packbits::pack(bytes = 6)]
pub struct AnyNoMotionConfig {
  /// Slope threshold, 12 bits. 512 = 1 g.
  #[bits(12)]
  pub slope_threshold: u16,
  /// Allow hardware to update its internal acceleration reference (baseline).
  #[bits(1)]
  pub acc_ref_update: bool,
  /// Hysteresis, 10 bits. 512 = 1 g.
  #[skip(3)]
  #[bits(10)]
  pub hysteresis: u16,
  /// Time the condition must hold, 13 bits of 20 ms.
  #[skip(6)]
  #[bits(13)]
  pub duration: u16,
  /// Delay before the event clears, 3 bits of 20 ms.
  #[bits(3)]
  pub wait_time: u8,
}

impl AnyNoMotionConfig {
  pub const fn new(slope_threshold: u16, hysteresis: u16, duration: u16, wait_time: u8) -> Self {
    Self { slope_threshold, acc_ref_update: false, hysteresis, duration, wait_time }
  }

  /// Overwrite the three detection parameters, keeping wait time and
  /// reference update as read from the device.
  pub fn with_thresholds(mut self, slope_threshold: u16, hysteresis: u16, duration: u16) -> Self {
    self.slope_threshold = slope_threshold;
    self.hysteresis = hysteresis;
    self.duration = duration;
    self
  }
}

impl Default for AnyNoMotionConfig {
  /// Power-on values of the feature engine.
  fn default() -> Self {
    Self { slope_threshold: 10, acc_ref_update: true, hysteresis: 2, duration: 5, wait_time: 3 }
  }
}
