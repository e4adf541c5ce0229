#![allow(dead_code)]

#[repr(u8)]
pub(crate) enum Reg {
  ChipId = 0x00,
  AccDataX = 0x03,
  GyrDataX = 0x06,
  SensorTime0 = 0x0A,
  IntStatusInt1 = 0x0D,
  IntStatusInt2 = 0x0E,
  FeatureIo0 = 0x10,
  FeatureIo1 = 0x11,
  FeatureIo2 = 0x12,
  FeatureIoStatus = 0x14,
  AccConf = 0x20,
  GyrConf = 0x21,
  AltAccConf = 0x28,
  AltGyrConf = 0x29,
  AltConf = 0x2A,
  AltStatus = 0x2B,
  IoIntCtrl = 0x38,
  IntMap1 = 0x3A,
  FeatureCtrl = 0x40,
  FeatureDataAddr = 0x41,
  FeatureDataTx = 0x42,
  FeatureDataStatus = 0x43,
  Cmd = 0x7E,
}

impl From<Reg> for u8 {
  #[inline]
  fn from(r: Reg) -> Self {
    r as u8
  }
}

#[repr(u16)]
pub(crate) enum Command {
  SoftReset = 0xDEAF,
}

impl From<Command> for u16 {
  #[inline]
  fn from(c: Command) -> Self {
    c as u16
  }
}

// Constants used across the crate
pub(crate) const BMI323_CHIP_ID: u8 = 0x43;
pub(crate) const SOFT_RESET_DELAY_US: u32 = 1500;
// Power-on settling time before the first bus access
pub(crate) const SETTLE_DELAY_MS: u32 = 200;
// Settling time after a register write in normal mode
pub(crate) const WRITE_DELAY_US: u32 = 20;
