//! Board seam, startup sequence and teardown.
//!
//! [`run`] takes the device from power-up to the end of the acquisition
//! loop: settle, init, program both profiles, enable the motion detectors,
//! wire the interrupt pins, hook the two flags to the board's interrupt
//! lines and poll until the motion-event limit is hit.

use embedded_hal_async::delay::DelayNs;

use crate::{
  acquisition::{AcquisitionLoop, Report, Reporter, RunSummary, MOTION_EVENT_LIMIT},
  bridge::{Channel, EventBridge, Signaler},
  config::{self, ConfigError, ProfileSettings},
  feature::Features,
  defs::SETTLE_DELAY_MS,
  router::{self, EventMapping},
  Error, SensorDriver,
};

/// Shuttle-board pin an interrupt line is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ShuttlePin(pub u8);

impl ShuttlePin {
  /// Wired to the sensor's INT1.
  pub const P20: ShuttlePin = ShuttlePin(20);
  /// Wired to the sensor's INT2.
  pub const P21: ShuttlePin = ShuttlePin(21);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Edge {
  Rising,
  Falling,
  Both,
}

/// Host link closed at the end of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CommInterface {
  Usb,
  Ble,
  Serial,
}

/// Board services the run needs besides the sensor itself.
pub trait Platform: DelayNs {
  /// Call `signaler.signal()` from the interrupt handler of `pin` on `edge`.
  fn attach_interrupt(&mut self, pin: ShuttlePin, signaler: Signaler, edge: Edge);

  fn close_communication(&mut self, intf: CommInterface);
}

/// Which board pin each event flag listens on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PinWiring {
  pub data_ready: ShuttlePin,
  pub feature: ShuttlePin,
  pub edge: Edge,
}

impl Default for PinWiring {
  fn default() -> Self {
    Self { data_ready: ShuttlePin::P20, feature: ShuttlePin::P21, edge: Edge::Falling }
  }
}

/// Everything a run is parameterised by.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AppConfig {
  pub profiles: ProfileSettings,
  pub features: Features,
  pub mapping: EventMapping,
  pub wiring: PinWiring,
  /// Any-motion events before the loop stops.
  pub motion_limit: u8,
  pub comm: CommInterface,
}

impl Default for AppConfig {
  fn default() -> Self {
    Self {
      profiles: ProfileSettings::default(),
      features: config::motion_features(),
      mapping: EventMapping::default(),
      wiring: PinWiring::default(),
      motion_limit: MOTION_EVENT_LIMIT,
      comm: CommInterface::Usb,
    }
  }
}

/// Why a run never reached the loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Fault<E> {
  /// The sensor could not be brought up.
  Init(Error<E>),
  Config(ConfigError<E>),
}

impl<E> Fault<E> {
  pub fn exit_code(&self) -> i32 {
    match self {
      Fault::Init(_) => 1,
      Fault::Config(_) => 2,
    }
  }
}

impl<E> From<ConfigError<E>> for Fault<E> {
  fn from(e: ConfigError<E>) -> Self {
    Fault::Config(e)
  }
}

/// Wait out the power-on settling time, then initialize the sensor.
/// Returns the chip id.
pub async fn initialize<S, P>(sensor: &mut S, platform: &mut P) -> Result<u8, Error<S::BusError>>
where
  S: SensorDriver,
  P: Platform,
{
  platform.delay_ms(SETTLE_DELAY_MS).await;

  match sensor.init().await {
    Ok(id) => {
      #[cfg(feature = "defmt")]
      defmt::info!("BMI323 initialized over {}, chip id {=u8:#x}", sensor.interface(), id);
      Ok(id)
    }
    Err(e) => {
      #[cfg(feature = "defmt")]
      defmt::error!("{} failed: {}", crate::config::Step::Init.name(), e.code());
      Err(e)
    }
  }
}

/// Run the whole session.
///
/// An init failure returns straight away. Once init succeeded the host link
/// is open and gets closed on every way out, including a configuration
/// failure.
pub async fn run<S, P, R>(
  sensor: &mut S,
  platform: &mut P,
  reporter: &mut R,
  bridge: &'static EventBridge,
  cfg: &AppConfig,
) -> Result<RunSummary, Fault<S::BusError>>
where
  S: SensorDriver,
  P: Platform,
  R: Reporter,
{
  initialize(sensor, platform).await.map_err(Fault::Init)?;

  let res = match configure(sensor, cfg).await {
    Ok(()) => {
      platform.attach_interrupt(cfg.wiring.data_ready, bridge.signaler(Channel::DataReady), cfg.wiring.edge);
      platform.attach_interrupt(cfg.wiring.feature, bridge.signaler(Channel::Feature), cfg.wiring.edge);
      reporter.report(Report::Banner);

      Ok(AcquisitionLoop::new(bridge, cfg.motion_limit).run(sensor, reporter).await)
    }
    Err(e) => Err(Fault::Config(e)),
  };

  platform.close_communication(cfg.comm);
  res
}

async fn configure<S: SensorDriver>(sensor: &mut S, cfg: &AppConfig) -> Result<(), ConfigError<S::BusError>> {
  config::apply_feature_config(sensor, &cfg.profiles).await?;
  config::select_features(sensor, cfg.features).await?;
  router::configure_interrupt_pins(sensor).await?;
  router::map_events(sensor, &cfg.mapping).await?;
  Ok(())
}
