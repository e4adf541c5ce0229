//! The polling dispatch loop.
//!
//! Each pass services the data-ready flag, then the feature flag, and stops
//! once enough any-motion events were seen. Status bits are independent: one
//! status read can dispatch both a sample read for accel and one for gyro,
//! or both motion events.
//!
//! Only any-motion counts towards the limit. No-motion is reported the same
//! way but never ends the run.

use heapless::Vec;

use crate::{
  alt::AltStatus,
  bridge::{Channel, EventBridge},
  config::Step,
  interrupt::IntStatus,
  Error, Sample, Sensor, SensorDriver,
};

/// Default number of any-motion events before the loop stops.
pub const MOTION_EVENT_LIMIT: u8 = 5;

/// Action decoded from an interrupt status word.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Dispatch {
  ReadAccel,
  ReadGyro,
  AnyMotion,
  NoMotion,
}

/// Data-ready work in an INT1 status word, accel first.
pub fn decode_data_ready(status: &IntStatus) -> Vec<Dispatch, 2> {
  let mut out = Vec::new();
  if status.accel_data_ready {
    let _ = out.push(Dispatch::ReadAccel);
  }
  if status.gyro_data_ready {
    let _ = out.push(Dispatch::ReadGyro);
  }
  out
}

/// Motion events in an INT2 status word, any-motion first.
pub fn decode_feature(status: &IntStatus) -> Vec<Dispatch, 2> {
  let mut out = Vec::new();
  if status.any_motion {
    let _ = out.push(Dispatch::AnyMotion);
  }
  if status.no_motion {
    let _ = out.push(Dispatch::NoMotion);
  }
  out
}

/// Something the loop wants shown to the operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Report {
  /// Startup finished; move the board for any-motion, keep it still for
  /// no-motion.
  Banner,
  Accel(Sample),
  Gyro(Sample),
  AnyMotion,
  NoMotion,
  AltStatus(AltStatus),
  ReadFailed(Step),
}

/// Sink for loop output. Formatting is up to the implementor.
pub trait Reporter {
  fn report(&mut self, report: Report);
}

impl Reporter for () {
  fn report(&mut self, _report: Report) {}
}

/// Forwards every report to `defmt`.
#[cfg(feature = "defmt")]
pub struct DefmtReporter;

#[cfg(feature = "defmt")]
impl Reporter for DefmtReporter {
  fn report(&mut self, report: Report) {
    defmt::info!("{}", report);
  }
}

/// A status or data read failed inside the loop. The event is dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ReadError<E> {
  pub step: Step,
  pub error: Error<E>,
}

/// Totals of a finished run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RunSummary {
  pub motion_events: u8,
  pub samples: u32,
  pub read_failures: u32,
}

impl RunSummary {
  pub const EXIT_SUCCESS: i32 = 0;

  pub fn exit_code(&self) -> i32 {
    Self::EXIT_SUCCESS
  }
}

pub struct AcquisitionLoop<'a> {
  bridge: &'a EventBridge,
  limit: u8,
  alt_status: AltStatus,
  summary: RunSummary,
}

impl<'a> AcquisitionLoop<'a> {
  pub fn new(bridge: &'a EventBridge, limit: u8) -> Self {
    Self { bridge, limit, alt_status: AltStatus::INACTIVE, summary: RunSummary::default() }
  }

  /// Any-motion events seen so far.
  pub fn motion_events(&self) -> u8 {
    self.summary.motion_events
  }

  pub fn is_done(&self) -> bool {
    // The counter moves by at most one per pass and is checked after every
    // pass, so this stops exactly at the limit.
    self.summary.motion_events >= self.limit
  }

  /// Last alternate status read by a motion event.
  pub fn alt_status(&self) -> AltStatus {
    self.alt_status
  }

  /// Run passes back to back until the limit is reached.
  pub async fn run<S: SensorDriver, R: Reporter>(mut self, sensor: &mut S, reporter: &mut R) -> RunSummary {
    loop {
      self.poll(sensor, reporter).await;
      if self.is_done() {
        break;
      }
    }

    #[cfg(feature = "defmt")]
    defmt::info!("acquisition done: {}", self.summary);

    self.summary
  }

  /// One pass over both flags. Returns whether the limit is reached.
  pub async fn poll<S: SensorDriver, R: Reporter>(&mut self, sensor: &mut S, reporter: &mut R) -> bool {
    if self.bridge.take(Channel::DataReady) {
      match sensor.get_int1_status().await {
        Ok(status) => {
          for d in decode_data_ready(&status) {
            self.dispatch(d, sensor, reporter).await;
          }
        }
        Err(error) => self.failed(ReadError { step: Step::ReadInt1Status, error }, reporter),
      }
    }

    if self.bridge.take(Channel::Feature) {
      self.alt_status = AltStatus::INACTIVE;
      match sensor.get_int2_status().await {
        Ok(status) => {
          for d in decode_feature(&status) {
            self.dispatch(d, sensor, reporter).await;
          }
        }
        Err(error) => self.failed(ReadError { step: Step::ReadInt2Status, error }, reporter),
      }
    }

    self.is_done()
  }

  async fn dispatch<S: SensorDriver, R: Reporter>(&mut self, d: Dispatch, sensor: &mut S, reporter: &mut R) {
    match d {
      Dispatch::ReadAccel => self.sample(Sensor::Accel, sensor, reporter).await,
      Dispatch::ReadGyro => self.sample(Sensor::Gyro, sensor, reporter).await,
      Dispatch::AnyMotion => {
        reporter.report(Report::AnyMotion);
        self.refresh_alt_status(sensor, reporter).await;
        self.summary.motion_events = self.summary.motion_events.saturating_add(1);
      }
      Dispatch::NoMotion => {
        reporter.report(Report::NoMotion);
        self.refresh_alt_status(sensor, reporter).await;
      }
    }
  }

  async fn sample<S: SensorDriver, R: Reporter>(&mut self, which: Sensor, sensor: &mut S, reporter: &mut R) {
    match sensor.get_sensor_data(which).await {
      Ok(s) => {
        self.summary.samples += 1;
        reporter.report(match which {
          Sensor::Accel => Report::Accel(s),
          Sensor::Gyro => Report::Gyro(s),
        });
      }
      Err(error) => {
        let step = match which {
          Sensor::Accel => Step::ReadAccel,
          Sensor::Gyro => Step::ReadGyro,
        };
        self.failed(ReadError { step, error }, reporter);
      }
    }
  }

  // A failed read still reports the cached status, which is the inactive
  // default unless an earlier event in this pass refreshed it.
  async fn refresh_alt_status<S: SensorDriver, R: Reporter>(&mut self, sensor: &mut S, reporter: &mut R) {
    match sensor.read_alternate_status().await {
      Ok(st) => self.alt_status = st,
      Err(error) => self.failed(ReadError { step: Step::ReadAltStatus, error }, reporter),
    }
    reporter.report(Report::AltStatus(self.alt_status));
  }

  fn failed<E, R: Reporter>(&mut self, err: ReadError<E>, reporter: &mut R) {
    #[cfg(feature = "defmt")]
    defmt::warn!("{} failed: {}", err.step.name(), err.error.code());
    self.summary.read_failures += 1;
    reporter.report(Report::ReadFailed(err.step));
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::testing::*;
  use futures::executor::block_on;

  fn any_motion() -> IntStatus {
    status(|s| s.any_motion = true)
  }

  fn no_motion() -> IntStatus {
    status(|s| s.no_motion = true)
  }

  #[test]
  fn status_bits_decode_independently() {
    let both = status(|s| {
      s.accel_data_ready = true;
      s.gyro_data_ready = true;
      s.any_motion = true;
      s.no_motion = true;
    });

    assert_eq!(decode_data_ready(&both), [Dispatch::ReadAccel, Dispatch::ReadGyro]);
    assert_eq!(decode_feature(&both), [Dispatch::AnyMotion, Dispatch::NoMotion]);
    assert!(decode_feature(&status(|s| s.accel_data_ready = true)).is_empty());
  }

  #[test]
  fn idle_pass_touches_nothing() {
    let bridge = EventBridge::new();
    let mut sensor = FakeSensor::new();
    let mut lp = AcquisitionLoop::new(&bridge, MOTION_EVENT_LIMIT);

    assert!(!block_on(lp.poll(&mut sensor, &mut ())));
    assert!(sensor.calls.is_empty());
  }

  #[test]
  fn accel_only_data_ready_reads_accel_only() {
    let bridge = EventBridge::new();
    let mut sensor = FakeSensor::new();
    sensor.int1.push_back(status(|s| s.accel_data_ready = true));
    let mut reporter = RecordingReporter::default();
    let mut lp = AcquisitionLoop::new(&bridge, MOTION_EVENT_LIMIT);

    bridge.flag(Channel::DataReady).signal();
    block_on(lp.poll(&mut sensor, &mut reporter));

    assert_eq!(sensor.calls, [Call::Int1Status, Call::SensorData(Sensor::Accel)]);
    assert_eq!(reporter.count(|r| matches!(r, Report::Accel(_))), 1);
    assert_eq!(reporter.count(|r| matches!(r, Report::Gyro(_))), 0);
    assert!(!bridge.flag(Channel::DataReady).is_pending());
  }

  #[test]
  fn stops_after_fifth_any_motion() {
    let bridge = EventBridge::new();
    let mut sensor = FakeSensor::new();
    let mut reporter = RecordingReporter::default();
    let mut lp = AcquisitionLoop::new(&bridge, MOTION_EVENT_LIMIT);

    for n in 1..=5u8 {
      sensor.int2.push_back(any_motion());
      bridge.flag(Channel::Feature).signal();
      let done = block_on(lp.poll(&mut sensor, &mut reporter));

      assert_eq!(lp.motion_events(), n);
      assert_eq!(done, n == 5);
    }
    assert_eq!(reporter.count(|r| *r == Report::AnyMotion), 5);
    assert_eq!(reporter.count(|r| matches!(r, Report::AltStatus(_))), 5);
  }

  #[test]
  fn no_motion_never_counts() {
    let bridge = EventBridge::new();
    let mut sensor = FakeSensor::new();
    sensor.alt_status = AltStatus { accel: true, gyro: true };
    let mut reporter = RecordingReporter::default();
    let mut lp = AcquisitionLoop::new(&bridge, MOTION_EVENT_LIMIT);

    for _ in 0..10 {
      sensor.int2.push_back(no_motion());
      bridge.flag(Channel::Feature).signal();
      assert!(!block_on(lp.poll(&mut sensor, &mut reporter)));
    }

    assert_eq!(lp.motion_events(), 0);
    assert_eq!(reporter.count(|r| *r == Report::NoMotion), 10);
    assert_eq!(lp.alt_status(), AltStatus { accel: true, gyro: true });
  }

  #[test]
  fn both_motion_bits_in_one_read_dispatch_both() {
    let bridge = EventBridge::new();
    let mut sensor = FakeSensor::new();
    sensor.int2.push_back(status(|s| {
      s.any_motion = true;
      s.no_motion = true;
    }));
    let mut reporter = RecordingReporter::default();
    let mut lp = AcquisitionLoop::new(&bridge, MOTION_EVENT_LIMIT);

    bridge.flag(Channel::Feature).signal();
    block_on(lp.poll(&mut sensor, &mut reporter));

    assert_eq!(lp.motion_events(), 1);
    assert_eq!(
      reporter.reports,
      [
        Report::AnyMotion,
        Report::AltStatus(AltStatus::INACTIVE),
        Report::NoMotion,
        Report::AltStatus(AltStatus::INACTIVE),
      ]
    );
  }

  #[test]
  fn coalesced_edges_are_one_status_read() {
    let bridge = EventBridge::new();
    let mut sensor = FakeSensor::new();
    sensor.int2.push_back(any_motion());
    let mut lp = AcquisitionLoop::new(&bridge, MOTION_EVENT_LIMIT);

    bridge.flag(Channel::Feature).signal();
    bridge.flag(Channel::Feature).signal();
    block_on(lp.poll(&mut sensor, &mut ()));

    assert_eq!(sensor.calls.iter().filter(|c| **c == Call::Int2Status).count(), 1);
    assert_eq!(lp.motion_events(), 1);
  }

  #[test]
  fn failed_status_read_drops_the_event_and_carries_on() {
    let bridge = EventBridge::new();
    let mut sensor = FakeSensor::new().failing_at(Step::ReadInt2Status);
    sensor.int2.push_back(any_motion());
    let mut reporter = RecordingReporter::default();
    let mut lp = AcquisitionLoop::new(&bridge, MOTION_EVENT_LIMIT);

    bridge.flag(Channel::Feature).signal();
    assert!(!block_on(lp.poll(&mut sensor, &mut reporter)));

    assert_eq!(lp.motion_events(), 0);
    assert_eq!(reporter.reports, [Report::ReadFailed(Step::ReadInt2Status)]);
    assert!(!bridge.flag(Channel::Feature).is_pending());

    sensor.failing.clear();
    bridge.flag(Channel::Feature).signal();
    block_on(lp.poll(&mut sensor, &mut reporter));
    assert_eq!(lp.motion_events(), 1);
  }

  #[test]
  fn failed_alt_status_read_reports_inactive_and_still_counts() {
    let bridge = EventBridge::new();
    let mut sensor = FakeSensor::new().failing_at(Step::ReadAltStatus);
    sensor.alt_status = AltStatus { accel: true, gyro: false };
    sensor.int2.push_back(any_motion());
    let mut reporter = RecordingReporter::default();
    let mut lp = AcquisitionLoop::new(&bridge, MOTION_EVENT_LIMIT);

    bridge.flag(Channel::Feature).signal();
    block_on(lp.poll(&mut sensor, &mut reporter));

    assert_eq!(lp.motion_events(), 1);
    assert_eq!(
      reporter.reports,
      [Report::AnyMotion, Report::ReadFailed(Step::ReadAltStatus), Report::AltStatus(AltStatus::INACTIVE)]
    );
  }

  #[test]
  fn run_returns_summary_once_limit_is_hit() {
    static BRIDGE: EventBridge = EventBridge::new();
    let mut sensor = FakeSensor::new();
    sensor.feature_line = Some(BRIDGE.signaler(Channel::Feature));
    for i in 0..7 {
      sensor.int2.push_back(if i % 3 == 1 { no_motion() } else { any_motion() });
    }
    let mut reporter = RecordingReporter::default();

    BRIDGE.flag(Channel::Feature).signal();
    let summary = block_on(AcquisitionLoop::new(&BRIDGE, MOTION_EVENT_LIMIT).run(&mut sensor, &mut reporter));

    assert_eq!(summary.motion_events, 5);
    assert_eq!(summary.exit_code(), 0);
    assert_eq!(reporter.count(|r| *r == Report::NoMotion), 2);
  }
}
