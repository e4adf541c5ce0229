//! Interrupt routing.
//!
//! Data-ready events go out on INT1 and motion events on INT2, so the host
//! can tell the two classes apart by which line fired. Both pins are driven
//! active high.

use crate::{
  config::{checked, ConfigError, Step},
  interrupt::{ActiveLevel, IntMap, IntPin},
  SensorDriver,
};

/// Pin assignment of the four events the loop consumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct EventMapping {
  pub accel_data_ready: IntPin,
  pub gyro_data_ready: IntPin,
  pub any_motion: IntPin,
  pub no_motion: IntPin,
}

impl Default for EventMapping {
  fn default() -> Self {
    Self {
      accel_data_ready: IntPin::Int1,
      gyro_data_ready: IntPin::Int1,
      any_motion: IntPin::Int2,
      no_motion: IntPin::Int2,
    }
  }
}

impl From<&EventMapping> for IntMap {
  fn from(m: &EventMapping) -> Self {
    IntMap {
      accel_data_ready: m.accel_data_ready,
      gyro_data_ready: m.gyro_data_ready,
      any_motion: m.any_motion,
      no_motion: m.no_motion,
      ..Default::default()
    }
  }
}

/// Enable both interrupt outputs, active high.
///
/// Reads the current pin configuration once, then writes INT1 and INT2 as
/// two separate calls. Output mode stays as read.
pub async fn configure_interrupt_pins<S: SensorDriver>(sensor: &mut S) -> Result<(), ConfigError<S::BusError>> {
  let pins = checked(Step::GetIntPinConfig, sensor.get_int_pin_config().await)?;

  for (pin, mut cfg, step) in [
    (IntPin::Int1, pins.int1, Step::SetInt1PinConfig),
    (IntPin::Int2, pins.int2, Step::SetInt2PinConfig),
  ] {
    cfg.enable = true;
    cfg.level = ActiveLevel::ActiveHigh;
    checked(step, sensor.set_int_pin_config(pin, cfg).await)?;
  }

  Ok(())
}

/// Route the four events, leaving every other source unmapped.
pub async fn map_events<S: SensorDriver>(sensor: &mut S, mapping: &EventMapping) -> Result<(), ConfigError<S::BusError>> {
  checked(Step::MapInterrupt, sensor.map_interrupt(mapping.into()).await)
}
