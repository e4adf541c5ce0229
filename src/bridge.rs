//! Interrupt-to-loop event flags.
//!
//! Interrupt handlers only ever latch a flag; all bus traffic happens in the
//! acquisition loop when it takes the flag. Two edges arriving before the
//! loop gets round to a flag collapse into a single pending event, which is
//! fine because the loop re-reads the device status word and every status
//! bit set since the last read is still there.
//!
//! ```
//! use bmi323_altcfg::bridge::{Channel, EventBridge};
//!
//! static BRIDGE: EventBridge = EventBridge::new();
//!
//! let isr = BRIDGE.signaler(Channel::Feature);
//! isr.signal();
//! isr.signal();
//!
//! assert!(BRIDGE.take(Channel::Feature));
//! assert!(!BRIDGE.take(Channel::Feature));
//! ```

use portable_atomic::{AtomicBool, Ordering};

/// Single-slot latch set from interrupt context and cleared by the loop.
pub struct EventFlag {
  pending: AtomicBool,
}

impl EventFlag {
  pub const fn new() -> Self {
    Self { pending: AtomicBool::new(false) }
  }

  /// Mark an event as pending. Never blocks.
  #[inline]
  pub fn signal(&self) {
    self.pending.store(true, Ordering::Release);
  }

  /// Clear the flag, returning whether an event was pending.
  #[inline]
  pub fn take(&self) -> bool {
    self.pending.swap(false, Ordering::AcqRel)
  }

  #[inline]
  pub fn is_pending(&self) -> bool {
    self.pending.load(Ordering::Acquire)
  }
}

impl Default for EventFlag {
  fn default() -> Self {
    Self::new()
  }
}

/// The two interrupt lines the loop listens to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Channel {
  /// Accel/gyro data-ready, on INT1.
  DataReady,
  /// Any-/no-motion, on INT2.
  Feature,
}

pub struct EventBridge {
  data_ready: EventFlag,
  feature: EventFlag,
}

impl EventBridge {
  pub const fn new() -> Self {
    Self { data_ready: EventFlag::new(), feature: EventFlag::new() }
  }

  pub fn flag(&self, channel: Channel) -> &EventFlag {
    match channel {
      Channel::DataReady => &self.data_ready,
      Channel::Feature => &self.feature,
    }
  }

  /// Handle for an interrupt callback on `channel`.
  pub fn signaler(&'static self, channel: Channel) -> Signaler {
    Signaler(self.flag(channel))
  }

  #[inline]
  pub fn take(&self, channel: Channel) -> bool {
    self.flag(channel).take()
  }
}

impl Default for EventBridge {
  fn default() -> Self {
    Self::new()
  }
}

/// What an interrupt callback gets to hold: it can raise one flag and
/// nothing else.
#[derive(Clone, Copy)]
pub struct Signaler(&'static EventFlag);

impl Signaler {
  #[inline]
  pub fn signal(&self) {
    self.0.signal()
  }
}

impl From<&'static EventFlag> for Signaler {
  fn from(flag: &'static EventFlag) -> Self {
    Signaler(flag)
  }
}

impl core::fmt::Debug for Signaler {
  fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
    f.debug_tuple("Signaler").field(&self.0.is_pending()).finish()
  }
}
