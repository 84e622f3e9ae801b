//! AS5048A angle register over SPI
//!
//! Each read takes two 16-bit frames: the command, then the answer. The
//! bus must be in mode 1.

use embedded_hal::spi::SpiDevice;
use spinring_core::angle::{register_to_angle, register_with_offset};
use spinring_core::traits::AngleSource;

/// Address of the angle register
pub const ANGLE_REGISTER: u16 = 0x3FFF;

const READ: u16 = 1 << 14;
const ADDRESS_MASK: u16 = 0x3FFF;
const PARITY_BIT: u16 = 15;

/// AS5048A magnetic encoder on an SPI device
pub struct As5048a<SPI> {
    spi: SPI,
    offset: u16,
}

impl<SPI: SpiDevice> As5048a<SPI> {
    pub fn new(spi: SPI) -> Self {
        Self { spi, offset: 0 }
    }

    pub fn release(self) -> SPI {
        self.spi
    }

    /// Read command for `register`, with even parity in bit 15
    pub const fn read_command(register: u16) -> u16 {
        let cmd = READ | (register & ADDRESS_MASK);
        cmd | ((cmd.count_ones() as u16 & 1) << PARITY_BIT)
    }

    /// Read a 14-bit register
    pub fn read_register(&mut self, register: u16) -> Result<u16, SPI::Error> {
        let cmd = Self::read_command(register).to_be_bytes();
        self.spi.write(&cmd)?;

        let mut answer = [0u8; 2];
        self.spi.transfer(&mut answer, &[0, 0])?;
        Ok(u16::from_be_bytes(answer) & ADDRESS_MASK)
    }
}

impl<SPI: SpiDevice> AngleSource for As5048a<SPI> {
    type Error = SPI::Error;

    fn angle(&mut self) -> Result<f32, Self::Error> {
        let raw = self.read_register(ANGLE_REGISTER)?;
        Ok(register_to_angle(raw, self.offset))
    }

    fn raw(&mut self) -> Result<u32, Self::Error> {
        let raw = self.read_register(ANGLE_REGISTER)?;
        Ok(register_with_offset(raw, self.offset))
    }

    fn set_offset(&mut self, offset: u16) {
        self.offset = offset;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::convert::Infallible;
    use embedded_hal::spi::{ErrorType, Operation};

    /// Device answering every transaction with a fixed word
    struct Device {
        answer: u16,
        written: Vec<Vec<u8>>,
    }

    impl ErrorType for Device {
        type Error = Infallible;
    }

    impl SpiDevice for Device {
        fn transaction(&mut self, operations: &mut [Operation<'_, u8>]) -> Result<(), Infallible> {
            for op in operations {
                match op {
                    Operation::Write(data) => self.written.push(data.to_vec()),
                    Operation::Transfer(read, write) => {
                        self.written.push(write.to_vec());
                        read.copy_from_slice(&self.answer.to_be_bytes());
                    }
                    Operation::Read(read) => read.copy_from_slice(&self.answer.to_be_bytes()),
                    Operation::TransferInPlace(_) | Operation::DelayNs(_) => {}
                }
            }
            Ok(())
        }
    }

    #[test]
    fn test_read_command_parity() {
        // 0x4000 | 0x3FFF has 15 ones, so parity is set
        assert_eq!(As5048a::<Device>::read_command(ANGLE_REGISTER), 0xFFFF);
        // 0x4001 has two ones
        assert_eq!(As5048a::<Device>::read_command(0x0001), 0x4001);
        assert_eq!(As5048a::<Device>::read_command(0x0003), 0xC003);
    }

    #[test]
    fn test_read_angle() {
        let mut sensor = As5048a::new(Device {
            answer: 0xC000 | 0x2000,
            written: Vec::new(),
        });
        assert_eq!(sensor.read_register(ANGLE_REGISTER), Ok(0x2000));
        assert_eq!(sensor.spi.written[0], [0xFF, 0xFF]);

        assert_eq!(sensor.angle(), Ok(core::f32::consts::PI));
        sensor.set_offset(0x1FFF);
        assert_eq!(sensor.raw(), Ok(0));
    }
}
