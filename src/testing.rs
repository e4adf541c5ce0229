//! Test doubles shared by the unit tests.

use core::convert::Infallible;
use std::{collections::VecDeque, vec::Vec};

use embedded_hal_async::delay::DelayNs;

use crate::{
  acquisition::{Report, Reporter},
  alt::{AltEnable, AltStatus},
  bridge::Signaler,
  bus::{Interface, InterfaceKind},
  config::Step,
  defs::Reg,
  feature::Features,
  interrupt::{IntConfig, IntMap, IntPin, IntPinConfig, IntStatus},
  profile::ProfileSet,
  startup::{CommInterface, Edge, Platform, ShuttlePin},
  Error, Sample, Sensor, SensorDriver,
};

/// Delay provider that returns immediately.
pub(crate) struct NoDelay;

impl DelayNs for NoDelay {
  async fn delay_ns(&mut self, _ns: u32) {}
}

/// Word-addressed register file standing in for a BMI323 on the bus.
///
/// Feature memory is reached through `FEATURE_DATA_ADDR`/`FEATURE_DATA_TX`
/// like on the device; both interrupt status words clear on read.
pub(crate) struct MockBus {
  regs: [u16; 128],
  feature: [u16; 64],
  feature_addr: usize,
  kind: InterfaceKind,
  reads: Vec<u8>,
  writes: Vec<u8>,
}

impl MockBus {
  /// A freshly reset BMI323 with an active feature engine.
  pub(crate) fn bmi323() -> Self {
    let mut bus = Self {
      regs: [0; 128],
      feature: [0; 64],
      feature_addr: 0,
      kind: InterfaceKind::I2c,
      reads: Vec::new(),
      writes: Vec::new(),
    };
    bus.set_word(Reg::ChipId as u8, 0x0043);
    bus.set_word(Reg::FeatureIo1 as u8, 0x0001);
    bus.set_word(Reg::FeatureDataStatus as u8, 0x0002);
    bus.set_word(Reg::AccConf as u8, 0x0028);
    bus.set_word(Reg::GyrConf as u8, 0x0048);
    bus.set_word(Reg::AltAccConf as u8, 0x0008);
    bus.set_word(Reg::AltGyrConf as u8, 0x0008);
    bus
  }

  pub(crate) fn over_spi(mut self) -> Self {
    self.kind = InterfaceKind::Spi;
    self
  }

  pub(crate) fn set_word(&mut self, reg: u8, value: u16) {
    self.regs[reg as usize] = value;
  }

  pub(crate) fn word(&self, reg: u8) -> u16 {
    self.regs[reg as usize]
  }

  /// Start register of every read, in order.
  pub(crate) fn reads(&self) -> &[u8] {
    &self.reads
  }

  /// Start register of every write, in order.
  pub(crate) fn writes(&self) -> &[u8] {
    &self.writes
  }
}

impl Interface for MockBus {
  type Error = Infallible;

  fn kind(&self) -> InterfaceKind {
    self.kind
  }

  async fn read_regs(&mut self, reg: u8, buf: &mut [u8]) -> Result<(), Infallible> {
    self.reads.push(reg);
    for (i, b) in buf.iter_mut().enumerate() {
      let word = if reg == Reg::FeatureDataTx as u8 {
        self.feature[self.feature_addr + i / 2]
      } else {
        self.regs[reg as usize + i / 2]
      };
      *b = word.to_le_bytes()[i % 2];
    }
    if reg == Reg::IntStatusInt1 as u8 || reg == Reg::IntStatusInt2 as u8 {
      self.regs[reg as usize] = 0;
    }
    Ok(())
  }

  async fn write_regs(&mut self, reg: u8, data: &[u8]) -> Result<(), Infallible> {
    self.writes.push(reg);
    let words = data.chunks(2).map(|c| u16::from_le_bytes([c[0], c.get(1).copied().unwrap_or(0)]));
    match reg {
      r if r == Reg::Cmd as u8 => {}
      r if r == Reg::FeatureDataAddr as u8 => self.feature_addr = data[0] as usize,
      r if r == Reg::FeatureDataTx as u8 => {
        for (i, w) in words.enumerate() {
          self.feature[self.feature_addr + i] = w;
        }
      }
      _ => {
        for (i, w) in words.enumerate() {
          self.regs[reg as usize + i] = w;
        }
      }
    }
    Ok(())
  }
}

/// Driver call seen by [`FakeSensor`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Call {
  Init,
  GetSensorConfig,
  SetSensorConfig(ProfileSet),
  EnableAltConfig(AltEnable),
  SelectSensor(Features),
  GetIntPinConfig,
  SetIntPinConfig(IntPin, IntConfig),
  MapInterrupt(IntMap),
  Int1Status,
  Int2Status,
  SensorData(Sensor),
  AltStatus,
}

impl Call {
  fn step(&self) -> Step {
    match self {
      Call::Init => Step::Init,
      Call::GetSensorConfig => Step::GetSensorConfig,
      Call::SetSensorConfig(_) => Step::SetSensorConfig,
      Call::EnableAltConfig(_) => Step::EnableAltConfig,
      Call::SelectSensor(_) => Step::SelectSensor,
      Call::GetIntPinConfig => Step::GetIntPinConfig,
      Call::SetIntPinConfig(IntPin::Int2, _) => Step::SetInt2PinConfig,
      Call::SetIntPinConfig(..) => Step::SetInt1PinConfig,
      Call::MapInterrupt(_) => Step::MapInterrupt,
      Call::Int1Status => Step::ReadInt1Status,
      Call::Int2Status => Step::ReadInt2Status,
      Call::SensorData(Sensor::Accel) => Step::ReadAccel,
      Call::SensorData(Sensor::Gyro) => Step::ReadGyro,
      Call::AltStatus => Step::ReadAltStatus,
    }
  }
}

/// Scripted [`SensorDriver`] that records every call.
///
/// Status reads pop from per-pin scripts and return an empty status once a
/// script runs dry. A step listed in `failing` answers with
/// [`Error::Bus`] every time it is reached.
pub(crate) struct FakeSensor {
  pub calls: Vec<Call>,
  pub profiles: ProfileSet,
  pub pins: IntPinConfig,
  pub int1: VecDeque<IntStatus>,
  pub int2: VecDeque<IntStatus>,
  pub alt_status: AltStatus,
  pub failing: Vec<Step>,
  /// Re-raised after each INT2 status read while `int2` still holds entries.
  pub feature_line: Option<Signaler>,
  pub chip_id: u8,
}

impl FakeSensor {
  pub(crate) fn new() -> Self {
    Self {
      calls: Vec::new(),
      profiles: ProfileSet::default(),
      pins: IntPinConfig::default(),
      int1: VecDeque::new(),
      int2: VecDeque::new(),
      alt_status: AltStatus::INACTIVE,
      failing: Vec::new(),
      feature_line: None,
      chip_id: 0x43,
    }
  }

  pub(crate) fn failing_at(mut self, step: Step) -> Self {
    self.failing.push(step);
    self
  }

  /// Calls recorded so far, without payloads.
  pub(crate) fn steps(&self) -> Vec<Step> {
    self.calls.iter().map(Call::step).collect()
  }

  fn record(&mut self, call: Call) -> Result<(), Error<()>> {
    self.calls.push(call);
    if self.failing.contains(&call.step()) {
      return Err(Error::Bus(()));
    }
    Ok(())
  }
}

impl SensorDriver for FakeSensor {
  type BusError = ();

  fn interface(&self) -> InterfaceKind {
    InterfaceKind::Spi
  }

  async fn init(&mut self) -> Result<u8, Error<()>> {
    self.record(Call::Init)?;
    match self.chip_id {
      0x43 => Ok(self.chip_id),
      id => Err(Error::InvalidChipId(id)),
    }
  }

  async fn get_sensor_config(&mut self) -> Result<ProfileSet, Error<()>> {
    self.record(Call::GetSensorConfig)?;
    Ok(self.profiles)
  }

  async fn set_sensor_config(&mut self, profiles: &ProfileSet) -> Result<(), Error<()>> {
    self.record(Call::SetSensorConfig(*profiles))?;
    self.profiles = *profiles;
    Ok(())
  }

  async fn enable_alternate_config(&mut self, en: AltEnable) -> Result<(), Error<()>> {
    self.record(Call::EnableAltConfig(en))
  }

  async fn select_sensor(&mut self, features: Features) -> Result<(), Error<()>> {
    self.record(Call::SelectSensor(features))
  }

  async fn get_int_pin_config(&mut self) -> Result<IntPinConfig, Error<()>> {
    self.record(Call::GetIntPinConfig)?;
    Ok(self.pins)
  }

  async fn set_int_pin_config(&mut self, pin: IntPin, cfg: IntConfig) -> Result<(), Error<()>> {
    self.record(Call::SetIntPinConfig(pin, cfg))?;
    if let Some(slot) = self.pins.pin_mut(pin) {
      *slot = cfg;
    }
    Ok(())
  }

  async fn map_interrupt(&mut self, map: IntMap) -> Result<(), Error<()>> {
    self.record(Call::MapInterrupt(map))
  }

  async fn get_int1_status(&mut self) -> Result<IntStatus, Error<()>> {
    self.record(Call::Int1Status)?;
    Ok(self.int1.pop_front().unwrap_or_default())
  }

  async fn get_int2_status(&mut self) -> Result<IntStatus, Error<()>> {
    self.record(Call::Int2Status)?;
    let status = self.int2.pop_front().unwrap_or_default();
    if let (Some(line), false) = (self.feature_line, self.int2.is_empty()) {
      line.signal();
    }
    Ok(status)
  }

  async fn get_sensor_data(&mut self, sensor: Sensor) -> Result<Sample, Error<()>> {
    self.record(Call::SensorData(sensor))?;
    let v = match sensor {
      Sensor::Accel => 1,
      Sensor::Gyro => 2,
    };
    Ok(Sample { axes: micromath::vector::Vector3d { x: v, y: v, z: v }, sensor_time: self.calls.len() as u32 })
  }

  async fn read_alternate_status(&mut self) -> Result<AltStatus, Error<()>> {
    self.record(Call::AltStatus)?;
    Ok(self.alt_status)
  }
}

/// [`Platform`] that records attachments and teardown.
#[derive(Default)]
pub(crate) struct FakePlatform {
  pub delays_ns: u64,
  pub attached: Vec<(ShuttlePin, Edge)>,
  pub signalers: Vec<Signaler>,
  pub closed: Vec<CommInterface>,
}

impl DelayNs for FakePlatform {
  async fn delay_ns(&mut self, ns: u32) {
    self.delays_ns += u64::from(ns);
  }
}

impl Platform for FakePlatform {
  fn attach_interrupt(&mut self, pin: ShuttlePin, signaler: Signaler, edge: Edge) {
    self.attached.push((pin, edge));
    self.signalers.push(signaler);
  }

  fn close_communication(&mut self, intf: CommInterface) {
    self.closed.push(intf);
  }
}

/// [`Reporter`] that keeps everything it is handed.
#[derive(Default)]
pub(crate) struct RecordingReporter {
  pub reports: Vec<Report>,
}

impl RecordingReporter {
  pub(crate) fn count(&self, pred: impl Fn(&Report) -> bool) -> usize {
    self.reports.iter().filter(|r| pred(r)).count()
  }
}

impl Reporter for RecordingReporter {
  fn report(&mut self, report: Report) {
    self.reports.push(report);
  }
}

/// Status word with only the named sources set.
pub(crate) fn status(f: impl FnOnce(&mut IntStatus)) -> IntStatus {
  let mut s = IntStatus::default();
  f(&mut s);
  s
}
