//! Simulated speaker that measures what it plays.
//!
//! Drains blocks of signed 16-bit little-endian samples and tracks the
//! minimum and maximum values seen since the last `read()`.

use crate::device::{BlockDevice, Completion};
use crate::session::Direction;

/// Simulated output device with a peak meter.
///
/// # Example
/// ```ignore
/// let mut speaker = PeakMeterSink::new();
/// producer.pump(&mut speaker);
/// if speaker.available() {
///     let level = speaker.read(); // 0.0–1.0
/// }
/// ```
pub struct PeakMeterSink {
    min_val: i16,
    max_val: i16,
    new_output: bool,
    blocks: u32,
}

impl PeakMeterSink {
    pub const fn new() -> Self {
        PeakMeterSink {
            min_val: i16::MAX,
            max_val: i16::MIN,
            new_output: false,
            blocks: 0,
        }
    }

    /// Returns `true` if samples have been played since the last `read()`.
    pub fn available(&self) -> bool {
        self.new_output
    }

    /// Number of blocks drained so far.
    pub fn blocks_played(&self) -> u32 {
        self.blocks
    }

    /// Read the peak level (0.0–1.0) and reset the meter.
    pub fn read(&mut self) -> f32 {
        let min = self.min_val;
        let max = self.max_val;
        self.min_val = i16::MAX;
        self.max_val = i16::MIN;
        self.new_output = false;

        // widen first: |i16::MIN| does not fit in i16
        let abs_min = (min as i32).abs();
        let abs_max = (max as i32).abs();
        abs_min.max(abs_max) as f32 / 32767.0
    }
}

impl Default for PeakMeterSink {
    fn default() -> Self {
        Self::new()
    }
}

impl BlockDevice for PeakMeterSink {
    fn direction(&self) -> Direction {
        Direction::Output
    }

    fn transfer(&mut self, block: &mut [u8]) -> Completion {
        let mut min = self.min_val;
        let mut max = self.max_val;

        for frame in block.chunks_exact(2) {
            let d = i16::from_le_bytes([frame[0], frame[1]]);
            min = min.min(d);
            max = max.max(d);
        }

        self.min_val = min;
        self.max_val = max;
        self.new_output = true;
        self.blocks += 1;
        Completion::Done
    }
}
