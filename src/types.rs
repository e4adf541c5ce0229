use micromath::vector::Vector3d;

/// Output data rates for accel/gyro. Higher ODR reduces latency but increases
/// power and bandwidth requirements.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum OutputDataRate {
  Hz0_78 = 0x01,
  Hz1_56 = 0x02,
  Hz3_12 = 0x03,
  Hz6_25 = 0x04,
  Hz12_5 = 0x05,
  Hz25 = 0x06,
  Hz50 = 0x07,
  Hz100 = 0x08,
  Hz200 = 0x09,
  Hz400 = 0x0A,
  Hz800 = 0x0B,
  Hz1600 = 0x0C,
  Hz3200 = 0x0D,
  Hz6400 = 0x0E,
}

impl From<OutputDataRate> for u8 {
  fn from(odr: OutputDataRate) -> Self {
    odr as u8
  }
}

impl TryFrom<u8> for OutputDataRate {
  type Error = ();

  fn try_from(value: u8) -> Result<Self, Self::Error> {
    match value {
      0x01 => Ok(OutputDataRate::Hz0_78),
      0x02 => Ok(OutputDataRate::Hz1_56),
      0x03 => Ok(OutputDataRate::Hz3_12),
      0x04 => Ok(OutputDataRate::Hz6_25),
      0x05 => Ok(OutputDataRate::Hz12_5),
      0x06 => Ok(OutputDataRate::Hz25),
      0x07 => Ok(OutputDataRate::Hz50),
      0x08 => Ok(OutputDataRate::Hz100),
      0x09 => Ok(OutputDataRate::Hz200),
      0x0A => Ok(OutputDataRate::Hz400),
      0x0B => Ok(OutputDataRate::Hz800),
      0x0C => Ok(OutputDataRate::Hz1600),
      0x0D => Ok(OutputDataRate::Hz3200),
      0x0E => Ok(OutputDataRate::Hz6400),
      _ => Err(()),
    }
  }
}

/// Digital low‑pass bandwidth selection. The cutoff is relative to ODR.
/// - `OdrHalf`: fc ≈ ODR/2 (wider bandwidth)
/// - `OdrQuarter`: fc ≈ ODR/4 (narrower bandwidth)
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Bandwidth {
  OdrHalf = 0x00,
  OdrQuarter = 0x01,
}

impl From<Bandwidth> for u8 {
  fn from(value: Bandwidth) -> Self {
    value as u8
  }
}

impl TryFrom<u8> for Bandwidth {
  type Error = ();

  fn try_from(value: u8) -> Result<Self, Self::Error> {
    match value {
      0x00 => Ok(Bandwidth::OdrHalf),
      0x01 => Ok(Bandwidth::OdrQuarter),
      _ => Err(()),
    }
  }
}

/// Number of samples to average. Reduces noise at the cost of latency and
/// responsiveness. Applies to both data and some feature engines.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AverageNum {
  /// No averaging
  No = 0x00,
  /// Average 2 samples
  Avg2 = 0x01,
  /// Average 4 samples
  Avg4 = 0x02,
  /// Average 8 samples
  Avg8 = 0x03,
  /// Average 16 samples
  Avg16 = 0x04,
  /// Average 32 samples
  Avg32 = 0x05,
  /// Average 64 samples
  Avg64 = 0x06,
}

impl From<AverageNum> for u8 {
  fn from(value: AverageNum) -> Self {
    value as u8
  }
}

impl TryFrom<u8> for AverageNum {
  type Error = ();

  fn try_from(value: u8) -> Result<Self, Self::Error> {
    match value {
      0x00 => Ok(AverageNum::No),
      0x01 => Ok(AverageNum::Avg2),
      0x02 => Ok(AverageNum::Avg4),
      0x03 => Ok(AverageNum::Avg8),
      0x04 => Ok(AverageNum::Avg16),
      0x05 => Ok(AverageNum::Avg32),
      0x06 => Ok(AverageNum::Avg64),
      _ => Err(()),
    }
  }
}

/// Data source for [`get_sensor_data`](crate::SensorDriver::get_sensor_data).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Sensor {
  Accel,
  Gyro,
}

/// One raw 3-axis reading and the sensor time latched with it.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Sample {
  pub axes: Vector3d<i16>,
  /// Sensor time in 39.0625 µs ticks.
  pub sensor_time: u32,
}

// `Vector3d` only derives `PartialEq`; integer equality is total.
impl Eq for Sample {}

impl Sample {
  /// Decode a burst starting at an `*_DATA_X` register and ending with the
  /// two `SENSOR_TIME` words.
  pub(crate) fn from_burst(frame: &[u8]) -> Self {
    let word = |i: usize| i16::from_le_bytes([frame[2 * i], frame[2 * i + 1]]);
    let t = frame.len() - 4;
    Self {
      axes: Vector3d { x: word(0), y: word(1), z: word(2) },
      sensor_time: u32::from_le_bytes([frame[t], frame[t + 1], frame[t + 2], frame[t + 3]]),
    }
  }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Sample {
  fn format(&self, f: defmt::Formatter) {
    defmt::write!(f, "x={} y={} z={} t={}", self.axes.x, self.axes.y, self.axes.z, self.sensor_time)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn burst_decodes_axes_and_trailing_time() {
    // x=1, y=-2, z=0x1234, temp word, then time 0x00C0FFEE
    let frame = [0x01, 0x00, 0xFE, 0xFF, 0x34, 0x12, 0x00, 0x80, 0xEE, 0xFF, 0xC0, 0x00];
    let s = Sample::from_burst(&frame);

    assert_eq!(s.axes, Vector3d { x: 1, y: -2, z: 0x1234 });
    assert_eq!(s.sensor_time, 0x00C0_FFEE);
  }
}
