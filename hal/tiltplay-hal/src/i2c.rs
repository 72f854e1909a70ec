//! I2C bus abstractions
//!
//! Provides the addressed register access both the inertial sensor and the
//! OLED controller are driven through. Chip-specific code only has to hand
//! over something that implements [`embedded_hal::i2c::I2c`]; [`HalBus`]
//! adapts it.

use embedded_hal::i2c::{Error as _, ErrorKind, I2c};

/// I2C bus master
///
/// Provides basic I2C read/write operations for communicating with
/// peripheral devices.
pub trait I2cBus {
    /// Error type for I2C operations
    type Error;

    /// Write data to a device at the given address
    ///
    /// # Arguments
    /// * `address` - 7-bit I2C address
    /// * `data` - Bytes to write
    fn write(&mut self, address: u8, data: &[u8]) -> Result<(), Self::Error>;

    /// Read data from a device at the given address
    ///
    /// # Arguments
    /// * `address` - 7-bit I2C address
    /// * `buf` - Buffer to read into
    fn read(&mut self, address: u8, buf: &mut [u8]) -> Result<(), Self::Error>;

    /// Write then read in a single transaction (repeated start)
    ///
    /// This is commonly used to write a register address then read data.
    ///
    /// # Arguments
    /// * `address` - 7-bit I2C address
    /// * `write_data` - Bytes to write (typically register address)
    /// * `read_buf` - Buffer to read into
    fn write_read(
        &mut self,
        address: u8,
        write_data: &[u8],
        read_buf: &mut [u8],
    ) -> Result<(), Self::Error>;

    /// Write a single register
    fn write_register(&mut self, address: u8, register: u8, value: u8) -> Result<(), Self::Error> {
        self.write(address, &[register, value])
    }

    /// Burst-read consecutive registers starting at `register`
    fn read_registers(
        &mut self,
        address: u8,
        register: u8,
        buf: &mut [u8],
    ) -> Result<(), Self::Error> {
        self.write_read(address, &[register], buf)
    }
}

/// I2C configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct I2cConfig {
    /// Clock frequency in Hz
    pub frequency: u32,
}

impl Default for I2cConfig {
    fn default() -> Self {
        Self::FAST
    }
}

impl I2cConfig {
    /// Standard mode (100 kHz)
    pub const STANDARD: Self = Self { frequency: 100_000 };

    /// Fast mode (400 kHz), what both the sensor and the OLED run at
    pub const FAST: Self = Self { frequency: 400_000 };
}

/// Error from an adapted bus
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum I2cBusError {
    /// Bus error (misplaced START/STOP)
    Bus,
    /// Arbitration lost
    ArbitrationLost,
    /// Address or data byte not acknowledged
    Nack,
    /// Overrun
    Overrun,
    /// Other error
    Other,
}

impl From<ErrorKind> for I2cBusError {
    fn from(kind: ErrorKind) -> Self {
        match kind {
            ErrorKind::Bus => I2cBusError::Bus,
            ErrorKind::ArbitrationLoss => I2cBusError::ArbitrationLost,
            ErrorKind::NoAcknowledge(_) => I2cBusError::Nack,
            ErrorKind::Overrun => I2cBusError::Overrun,
            _ => I2cBusError::Other,
        }
    }
}

/// Adapter from a blocking `embedded-hal` I2C peripheral to [`I2cBus`]
///
/// Errors are reduced to [`I2cBusError`] so drivers never have to name the
/// chip HAL's error type.
pub struct HalBus<I> {
    inner: I,
}

impl<I: I2c> HalBus<I> {
    /// Wrap a blocking I2C peripheral
    pub fn new(inner: I) -> Self {
        Self { inner }
    }

    /// Give the peripheral back
    pub fn release(self) -> I {
        self.inner
    }
}

impl<I: I2c> I2cBus for HalBus<I> {
    type Error = I2cBusError;

    fn write(&mut self, address: u8, data: &[u8]) -> Result<(), Self::Error> {
        self.inner
            .write(address, data)
            .map_err(|e| I2cBusError::from(e.kind()))
    }

    fn read(&mut self, address: u8, buf: &mut [u8]) -> Result<(), Self::Error> {
        self.inner
            .read(address, buf)
            .map_err(|e| I2cBusError::from(e.kind()))
    }

    fn write_read(
        &mut self,
        address: u8,
        write_data: &[u8],
        read_buf: &mut [u8],
    ) -> Result<(), Self::Error> {
        self.inner
            .write_read(address, write_data, read_buf)
            .map_err(|e| I2cBusError::from(e.kind()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_hal::i2c::{ErrorType, NoAcknowledgeSource, Operation};

    #[derive(Debug)]
    struct FakeError(ErrorKind);

    impl embedded_hal::i2c::Error for FakeError {
        fn kind(&self) -> ErrorKind {
            self.0
        }
    }

    /// Records the last write and answers reads with an incrementing pattern
    struct FakeI2c {
        last_address: u8,
        last_write: [u8; 4],
        last_write_len: usize,
        fail: Option<ErrorKind>,
    }

    impl FakeI2c {
        fn new() -> Self {
            Self {
                last_address: 0,
                last_write: [0; 4],
                last_write_len: 0,
                fail: None,
            }
        }
    }

    impl ErrorType for FakeI2c {
        type Error = FakeError;
    }

    impl I2c for FakeI2c {
        fn transaction(
            &mut self,
            address: u8,
            operations: &mut [Operation<'_>],
        ) -> Result<(), Self::Error> {
            if let Some(kind) = self.fail {
                return Err(FakeError(kind));
            }
            self.last_address = address;
            for op in operations {
                match op {
                    Operation::Write(data) => {
                        let len = data.len().min(4);
                        self.last_write[..len].copy_from_slice(&data[..len]);
                        self.last_write_len = len;
                    }
                    Operation::Read(buf) => {
                        for (i, b) in buf.iter_mut().enumerate() {
                            *b = i as u8 + 1;
                        }
                    }
                }
            }
            Ok(())
        }
    }

    #[test]
    fn test_write_register_frames_two_bytes() {
        let mut bus = HalBus::new(FakeI2c::new());
        bus.write_register(0x68, 0x6B, 0x00).unwrap();

        let inner = bus.release();
        assert_eq!(inner.last_address, 0x68);
        assert_eq!(inner.last_write_len, 2);
        assert_eq!(&inner.last_write[..2], &[0x6B, 0x00]);
    }

    #[test]
    fn test_read_registers_uses_write_read() {
        let mut bus = HalBus::new(FakeI2c::new());
        let mut buf = [0u8; 6];
        bus.read_registers(0x68, 0x3B, &mut buf).unwrap();

        assert_eq!(buf, [1, 2, 3, 4, 5, 6]);
        let inner = bus.release();
        assert_eq!(&inner.last_write[..1], &[0x3B]);
    }

    #[test]
    fn test_error_kind_mapping() {
        let mut fake = FakeI2c::new();
        fake.fail = Some(ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address));
        let mut bus = HalBus::new(fake);

        assert_eq!(bus.write(0x3C, &[0x80, 0xAE]), Err(I2cBusError::Nack));
        assert_eq!(I2cBusError::from(ErrorKind::Bus), I2cBusError::Bus);
        assert_eq!(I2cBusError::from(ErrorKind::Other), I2cBusError::Other);
    }
}
