use embedded_hal_async::delay::DelayNs;

use crate::{Bmi323, Error, bus::Interface, defs::*};

impl<B, D, E> Bmi323<B, D>
where
  B: Interface<Error = E>,
  D: DelayNs,
{
  pub(crate) async fn read<const N: usize, T: TryFrom<[u8; N]>>(&mut self, reg: Reg) -> Result<T, Error<E>> {
    let mut b = [0u8; N];
    self.read_bytes(reg, &mut b).await?;
    TryFrom::try_from(b).map_err(|_| Error::Data)
  }

  pub(crate) async fn read_u16(&mut self, reg: Reg) -> Result<u16, Error<E>> {
    let mut b = [0u8; 2];
    self.read_bytes(reg, &mut b).await?;
    Ok(u16::from_le_bytes(b))
  }

  pub(crate) async fn read_bytes(&mut self, reg: Reg, buf: &mut [u8]) -> Result<(), Error<E>> {
    self.bus.read_regs(reg.into(), buf).await.map_err(Error::Bus)
  }

  pub(crate) async fn write<const N: usize, T: TryInto<[u8; N]>>(&mut self, reg: Reg, v: T) -> Result<(), Error<E>> {
    let b = v.try_into().map_err(|_| Error::Data)?;
    self.write_bytes(reg, &b).await
  }

  pub(crate) async fn write_u16(&mut self, reg: Reg, value: u16) -> Result<(), Error<E>> {
    // Device registers use little-endian ordering (LSB first).
    self.write_bytes(reg, &value.to_le_bytes()).await
  }

  pub(crate) async fn write_bytes(&mut self, reg: Reg, data: &[u8]) -> Result<(), Error<E>> {
    self.bus.write_regs(reg.into(), data).await.map_err(Error::Bus)?;
    self.delay.delay_us(WRITE_DELAY_US).await;
    Ok(())
  }
}
