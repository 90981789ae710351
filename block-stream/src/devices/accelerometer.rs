//! Three-axis accelerometer source read over I2C.
//!
//! Generic over any [`embedded_hal::i2c::I2c`] implementation. The sensor
//! runs its 32-level FIFO in stream mode; each block is filled with
//! consecutive 6-byte frames (X, Y, Z as little-endian `i16`), one FIFO
//! sample per frame. Bytes past the last whole frame are zeroed.
//!
//! A transfer only proceeds once the FIFO holds a whole block's worth of
//! samples. An early call reads nothing and reports `Completion::Failed`,
//! so the stream retries the same block on the next call with no sample
//! lost. Blocks larger than the FIFO can never fill.
//!
//! # Example
//!
//! ```ignore
//! let mut accel = Accelerometer::new(i2c);
//! accel.enable(DataRate::Hz100)?;
//! // From a timer at least as fast as one block per (frames / 100 Hz):
//! producer.pump(&mut accel);
//! ```

use embedded_hal::i2c::I2c;
use thiserror::Error;

use super::accel_registers as reg;
use crate::device::{BlockDevice, Completion};
use crate::session::Direction;

/// Output data rate (CTRL_REG1 ODR field).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataRate {
    Hz1 = 1,
    Hz10 = 2,
    Hz25 = 3,
    Hz50 = 4,
    Hz100 = 5,
    Hz200 = 6,
    Hz400 = 7,
}

/// Errors from accelerometer configuration.
#[derive(Debug, Error)]
pub enum AccelError<E: core::fmt::Debug> {
    /// The I2C transaction failed.
    #[error("I2C bus error: {0:?}")]
    Bus(E),
    /// `WHO_AM_I` returned something other than the expected ID.
    #[error("unexpected device id {0:#04x}")]
    WrongDevice(u8),
}

/// LIS3DH-compatible accelerometer driver.
pub struct Accelerometer<I2C> {
    i2c: I2C,
    address: u8,
    /// Failed block reads since creation.
    read_errors: u32,
}

impl<I2C: I2c> Accelerometer<I2C> {
    /// Default I2C address (SA0 low).
    pub const DEFAULT_ADDRESS: u8 = reg::I2C_ADDR_SA0_LOW;

    /// Alternate I2C address (SA0 high).
    pub const ALT_ADDRESS: u8 = reg::I2C_ADDR_SA0_HIGH;

    /// Create a driver at the default I2C address.
    pub fn new(i2c: I2C) -> Self {
        Self::new_with_address(i2c, Self::DEFAULT_ADDRESS)
    }

    pub fn new_with_address(i2c: I2C, address: u8) -> Self {
        Self {
            i2c,
            address,
            read_errors: 0,
        }
    }

    /// Write an 8-bit register.
    pub fn write_register(&mut self, register: u8, value: u8) -> Result<(), I2C::Error> {
        self.i2c.write(self.address, &[register, value])
    }

    /// Read an 8-bit register.
    pub fn read_register(&mut self, register: u8) -> Result<u8, I2C::Error> {
        let mut buf = [0u8; 1];
        self.i2c.write_read(self.address, &[register], &mut buf)?;
        Ok(buf[0])
    }

    /// Check the device ID and start sampling all three axes at `rate`.
    pub fn enable(&mut self, rate: DataRate) -> Result<(), AccelError<I2C::Error>> {
        let id = self.read_register(reg::WHO_AM_I).map_err(AccelError::Bus)?;
        if id != reg::DEVICE_ID {
            return Err(AccelError::WrongDevice(id));
        }
        self.write_register(reg::CTRL_REG4, reg::CTRL_REG4_BDU | reg::CTRL_REG4_HR)
            .map_err(AccelError::Bus)?;
        self.write_register(reg::CTRL_REG5, reg::CTRL_REG5_FIFO_EN)
            .map_err(AccelError::Bus)?;
        self.write_register(reg::FIFO_CTRL_REG, reg::FIFO_MODE_STREAM)
            .map_err(AccelError::Bus)?;
        self.write_register(reg::CTRL_REG1, ((rate as u8) << 4) | reg::CTRL_REG1_XYZ_EN)
            .map_err(AccelError::Bus)?;
        log::debug!("accelerometer 0x{:02x} enabled at {:?}", self.address, rate);
        Ok(())
    }

    /// Put the sensor into power-down mode.
    pub fn disable(&mut self) -> Result<(), I2C::Error> {
        self.write_register(reg::CTRL_REG1, 0)
    }

    /// `true` if a new X/Y/Z sample is available.
    pub fn data_ready(&mut self) -> Result<bool, I2C::Error> {
        Ok(self.read_register(reg::STATUS_REG)? & reg::STATUS_ZYXDA != 0)
    }

    /// Unread samples waiting in the FIFO.
    pub fn fifo_level(&mut self) -> Result<usize, I2C::Error> {
        let src = self.read_register(reg::FIFO_SRC_REG)?;
        if src & reg::FIFO_SRC_OVRN != 0 {
            return Ok(reg::FIFO_DEPTH);
        }
        Ok((src & reg::FIFO_SRC_FSS_MASK) as usize)
    }

    /// Burst-read one X/Y/Z frame, popping it from the FIFO.
    pub fn read_frame(&mut self, frame: &mut [u8]) -> Result<(), I2C::Error> {
        debug_assert_eq!(frame.len(), reg::FRAME_BYTES);
        self.i2c
            .write_read(self.address, &[reg::OUT_X_L | reg::AUTO_INCREMENT], frame)
    }

    /// Number of failed block reads so far.
    pub fn read_errors(&self) -> u32 {
        self.read_errors
    }

    /// Whole frames that fit in a block of `block_size` bytes.
    pub const fn frames_per_block(block_size: usize) -> usize {
        block_size / reg::FRAME_BYTES
    }

    /// Largest block size whose frames the FIFO can hold at once.
    pub const MAX_BLOCK_SIZE: usize = reg::FIFO_DEPTH * reg::FRAME_BYTES;

    fn bus_failed(&mut self, error: I2C::Error) -> Completion {
        self.read_errors = self.read_errors.saturating_add(1);
        log::warn!("accelerometer read failed: {:?}", error);
        Completion::Failed
    }

    /// Destroy the driver and return the I2C bus.
    pub fn release(self) -> I2C {
        self.i2c
    }
}

impl<I2C: I2c> BlockDevice for Accelerometer<I2C> {
    fn direction(&self) -> Direction {
        Direction::Input
    }

    fn transfer(&mut self, block: &mut [u8]) -> Completion {
        let needed = Self::frames_per_block(block.len());
        if needed > reg::FIFO_DEPTH {
            log::warn!(
                "block of {} frames exceeds the {}-sample FIFO",
                needed,
                reg::FIFO_DEPTH
            );
            return Completion::Failed;
        }
        let available = match self.fifo_level() {
            Ok(level) => level,
            Err(e) => return self.bus_failed(e),
        };
        if available < needed {
            log::trace!("accelerometer FIFO holds {} of {} frames", available, needed);
            return Completion::Failed;
        }

        let mut frames = block.chunks_exact_mut(reg::FRAME_BYTES);
        for frame in &mut frames {
            if let Err(e) = self.read_frame(frame) {
                return self.bus_failed(e);
            }
        }
        frames.into_remainder().fill(0);
        Completion::Done
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_hal::i2c::{self, ErrorType, Operation};

    // ── Mock I2C with register file ───────────────────────────────────

    #[derive(Debug)]
    struct MockError;

    impl i2c::Error for MockError {
        fn kind(&self) -> i2c::ErrorKind {
            i2c::ErrorKind::Other
        }
    }

    /// Mock I2C with an 8-bit register file and a sample FIFO behind the
    /// output registers.
    struct MockI2c {
        regs: [u8; 64],
        /// Samples in arrival order; reading `OUT_X_L` pops the oldest.
        fifo: [[u8; 6]; 32],
        fifo_len: usize,
        /// Write log in chronological order.
        log: [(u8, u8); 16],
        log_count: usize,
        /// Fail every transaction once this many reads have succeeded.
        fail_after_reads: Option<usize>,
        reads: usize,
    }

    impl MockI2c {
        fn new() -> Self {
            let mut regs = [0u8; 64];
            regs[reg::WHO_AM_I as usize] = reg::DEVICE_ID;
            Self {
                regs,
                fifo: [[0; 6]; 32],
                fifo_len: 0,
                log: [(0, 0); 16],
                log_count: 0,
                fail_after_reads: None,
                reads: 0,
            }
        }

        /// The sensor latches a new sample.
        fn push(&mut self, sample: [u8; 6]) {
            self.fifo[self.fifo_len] = sample;
            self.fifo_len += 1;
        }

        fn register(&self, addr: usize) -> u8 {
            match addr as u8 {
                reg::STATUS_REG if self.fifo_len > 0 => self.regs[addr] | reg::STATUS_ZYXDA,
                reg::FIFO_SRC_REG if self.fifo_len == reg::FIFO_DEPTH => reg::FIFO_SRC_OVRN,
                reg::FIFO_SRC_REG => self.fifo_len as u8,
                _ => self.regs[addr],
            }
        }
    }

    impl ErrorType for MockI2c {
        type Error = MockError;
    }

    impl I2c for MockI2c {
        fn read(&mut self, _addr: u8, _buf: &mut [u8]) -> Result<(), Self::Error> {
            Ok(())
        }

        fn write(&mut self, _addr: u8, bytes: &[u8]) -> Result<(), Self::Error> {
            if bytes.len() == 2 {
                self.regs[bytes[0] as usize] = bytes[1];
                self.log[self.log_count] = (bytes[0], bytes[1]);
                self.log_count += 1;
            }
            Ok(())
        }

        fn write_read(
            &mut self,
            _addr: u8,
            wr: &[u8],
            rd: &mut [u8],
        ) -> Result<(), Self::Error> {
            if self.fail_after_reads.is_some_and(|n| self.reads >= n) {
                return Err(MockError);
            }
            self.reads += 1;
            let start = (wr[0] & !reg::AUTO_INCREMENT) as usize;
            let increment = wr[0] & reg::AUTO_INCREMENT != 0;

            if start == reg::OUT_X_L as usize && self.fifo_len > 0 {
                // Pop the oldest sample into the output registers.
                let sample = self.fifo[0];
                self.fifo.copy_within(1..self.fifo_len, 0);
                self.fifo_len -= 1;
                self.regs[start..start + reg::FRAME_BYTES].copy_from_slice(&sample);
            }
            for (i, byte) in rd.iter_mut().enumerate() {
                *byte = self.register(if increment { start + i } else { start });
            }
            Ok(())
        }

        fn transaction(
            &mut self,
            _addr: u8,
            _ops: &mut [Operation<'_>],
        ) -> Result<(), Self::Error> {
            Ok(())
        }
    }

    #[test]
    fn enable_configures_sensor() {
        let mut accel = Accelerometer::new(MockI2c::new());
        accel.enable(DataRate::Hz100).unwrap();
        let i2c = accel.release();

        assert_eq!(i2c.log_count, 4);
        assert_eq!(i2c.log[0], (reg::CTRL_REG4, 0x88));
        assert_eq!(i2c.log[1], (reg::CTRL_REG5, 0x40));
        assert_eq!(i2c.log[2], (reg::FIFO_CTRL_REG, 0x80));
        assert_eq!(i2c.log[3], (reg::CTRL_REG1, 0x57));
    }

    #[test]
    fn enable_rejects_wrong_device() {
        let mut bus = MockI2c::new();
        bus.regs[reg::WHO_AM_I as usize] = 0x44;
        let mut accel = Accelerometer::new(bus);
        assert!(matches!(
            accel.enable(DataRate::Hz10),
            Err(AccelError::WrongDevice(0x44))
        ));
        assert_eq!(accel.release().log_count, 0);
    }

    #[test]
    fn disable_powers_down() {
        let mut accel = Accelerometer::new(MockI2c::new());
        accel.enable(DataRate::Hz50).unwrap();
        accel.disable().unwrap();
        assert_eq!(accel.release().regs[reg::CTRL_REG1 as usize], 0);
    }

    #[test]
    fn data_ready_follows_new_samples() {
        let mut accel = Accelerometer::new(MockI2c::new());
        assert!(!accel.data_ready().unwrap());
        accel.i2c.push([1, 0, 2, 0, 3, 0]);
        assert!(accel.data_ready().unwrap());
    }

    #[test]
    fn fifo_level_reports_full_fifo() {
        let mut accel = Accelerometer::new(MockI2c::new());
        for i in 0..reg::FIFO_DEPTH {
            accel.i2c.push([i as u8; 6]);
        }
        assert_eq!(accel.fifo_level().unwrap(), reg::FIFO_DEPTH);
    }

    #[test]
    fn transfer_fills_frames_with_distinct_samples() {
        let mut bus = MockI2c::new();
        bus.push([1, 0, 2, 0, 3, 0]);
        bus.push([4, 0, 5, 0, 6, 0]);
        let mut accel = Accelerometer::new(bus);

        assert_eq!(Accelerometer::<MockI2c>::frames_per_block(14), 2);
        let mut block = [0xFFu8; 14];
        assert_eq!(accel.transfer(&mut block), Completion::Done);

        assert_eq!(&block[0..6], &[1, 0, 2, 0, 3, 0]);
        assert_eq!(&block[6..12], &[4, 0, 5, 0, 6, 0]);
        assert_eq!(&block[12..], &[0, 0]);
        assert_eq!(accel.fifo_level().unwrap(), 0);
    }

    #[test]
    fn early_transfer_leaves_samples_queued() {
        let mut bus = MockI2c::new();
        bus.push([1, 0, 2, 0, 3, 0]);
        let mut accel = Accelerometer::new(bus);

        // Only one of two frames has been sampled: nothing is consumed.
        let mut block = [0u8; 12];
        assert_eq!(accel.transfer(&mut block), Completion::Failed);
        assert_eq!(accel.fifo_level().unwrap(), 1);
        assert_eq!(accel.read_errors(), 0);

        accel.i2c.push([4, 0, 5, 0, 6, 0]);
        assert_eq!(accel.transfer(&mut block), Completion::Done);
        assert_eq!(&block[..6], &[1, 0, 2, 0, 3, 0]);
        assert_eq!(&block[6..], &[4, 0, 5, 0, 6, 0]);
    }

    #[test]
    fn block_larger_than_fifo_never_fills() {
        let mut bus = MockI2c::new();
        for i in 0..reg::FIFO_DEPTH {
            bus.push([i as u8; 6]);
        }
        let mut accel = Accelerometer::new(bus);

        let mut block = [0u8; Accelerometer::<MockI2c>::MAX_BLOCK_SIZE + 6];
        assert_eq!(accel.transfer(&mut block), Completion::Failed);
        assert_eq!(accel.fifo_level().unwrap(), reg::FIFO_DEPTH);
    }

    #[test]
    fn bus_error_fails_block() {
        let mut bus = MockI2c::new();
        bus.push([1; 6]);
        bus.push([2; 6]);
        // The FIFO level read succeeds, the second frame read fails.
        bus.fail_after_reads = Some(2);
        let mut accel = Accelerometer::new(bus);

        let mut block = [0u8; 12];
        assert_eq!(accel.transfer(&mut block), Completion::Failed);
        assert_eq!(accel.read_errors(), 1);
    }

    #[test]
    fn alternate_address() {
        let accel =
            Accelerometer::new_with_address(MockI2c::new(), Accelerometer::<MockI2c>::ALT_ADDRESS);
        assert_eq!(accel.address, 0x19);
    }
}
