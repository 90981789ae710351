//! Simulated microphone producing a sine tone.
//!
//! Fills each block with signed 16-bit little-endian samples using a 32-bit
//! phase accumulator, the same way a hardware oscillator would step through
//! one period per `2^32` phase units.

use core::f32::consts::TAU;

use crate::device::{BlockDevice, Completion};
use crate::session::Direction;

/// Simulated input device generating a sine wave.
///
/// # Example
/// ```ignore
/// let mut mic = SineSource::new(48_000.0);
/// mic.frequency(440.0);
/// mic.amplitude(0.5);
/// producer.pump(&mut mic);
/// ```
pub struct SineSource {
    sample_rate: f32,
    /// Phase accumulator (wraps naturally at 32 bits = one period).
    phase_accumulator: u32,
    /// Phase increment per sample: `freq / sample_rate * 2^32`.
    phase_increment: u32,
    amplitude: f32,
    /// Blocks left before the source reports its last block.
    remaining: Option<u32>,
}

impl SineSource {
    /// Create a silent source running at `sample_rate` Hz.
    pub const fn new(sample_rate: f32) -> Self {
        SineSource {
            sample_rate,
            phase_accumulator: 0,
            phase_increment: 0,
            amplitude: 0.0,
            remaining: None,
        }
    }

    /// Set the tone frequency in Hz.
    pub fn frequency(&mut self, hz: f32) {
        let inc = hz * (4_294_967_296.0 / self.sample_rate);
        self.phase_increment = inc as u32;
    }

    /// Set the output amplitude (0.0 = silent, 1.0 = full scale).
    pub fn amplitude(&mut self, level: f32) {
        self.amplitude = level.clamp(0.0, 1.0);
    }

    /// End the stream after `blocks` more blocks.
    ///
    /// The block that reports `Completion::Last` still carries data, so the
    /// minimum is one: `0` is treated as `1`.
    pub fn limit_blocks(&mut self, blocks: u32) {
        self.remaining = Some(blocks.max(1));
    }

    fn next_sample(&mut self) -> i16 {
        let angle = self.phase_accumulator as f32 * (TAU / 4_294_967_296.0);
        self.phase_accumulator = self.phase_accumulator.wrapping_add(self.phase_increment);
        (libm::sinf(angle) * self.amplitude * 32767.0) as i16
    }
}

impl BlockDevice for SineSource {
    fn direction(&self) -> Direction {
        Direction::Input
    }

    fn transfer(&mut self, block: &mut [u8]) -> Completion {
        let mut frames = block.chunks_exact_mut(2);
        for frame in &mut frames {
            frame.copy_from_slice(&self.next_sample().to_le_bytes());
        }
        frames.into_remainder().fill(0);

        match self.remaining.as_mut() {
            Some(left) => {
                *left = left.saturating_sub(1);
                if *left == 0 {
                    Completion::Last
                } else {
                    Completion::Done
                }
            }
            None => Completion::Done,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(block: &[u8], i: usize) -> i16 {
        i16::from_le_bytes([block[2 * i], block[2 * i + 1]])
    }

    #[test]
    fn silent_by_default() {
        let mut src = SineSource::new(48_000.0);
        src.frequency(1000.0);
        let mut block = [0xAAu8; 16];
        assert_eq!(src.transfer(&mut block), Completion::Done);
        assert!(block.iter().all(|&b| b == 0));
    }

    #[test]
    fn quarter_rate_tone_hits_peaks() {
        let mut src = SineSource::new(48_000.0);
        src.frequency(12_000.0);
        src.amplitude(1.0);

        let mut block = [0u8; 8];
        src.transfer(&mut block);

        let expected = [0i16, 32767, 0, -32767];
        for (i, &want) in expected.iter().enumerate() {
            let got = sample(&block, i);
            assert!((got as i32 - want as i32).abs() <= 1, "sample {i}: {got} vs {want}");
        }
    }

    #[test]
    fn phase_continues_across_blocks() {
        let mut src = SineSource::new(48_000.0);
        src.frequency(12_000.0);
        src.amplitude(1.0);

        let mut first = [0u8; 4];
        let mut second = [0u8; 4];
        src.transfer(&mut first);
        src.transfer(&mut second);
        assert!(sample(&second, 1) < -32000);
    }

    #[test]
    fn odd_tail_byte_is_zeroed() {
        let mut src = SineSource::new(48_000.0);
        src.frequency(12_000.0);
        src.amplitude(1.0);
        let mut block = [0xFFu8; 5];
        src.transfer(&mut block);
        assert_eq!(block[4], 0);
    }

    #[test]
    fn amplitude_is_clamped() {
        let mut src = SineSource::new(48_000.0);
        src.frequency(12_000.0);
        src.amplitude(4.0);
        let mut block = [0u8; 4];
        src.transfer(&mut block);
        assert!(sample(&block, 1) <= 32767);
        assert!(sample(&block, 1) > 32000);
    }

    #[test]
    fn limited_source_reports_last_block() {
        let mut src = SineSource::new(8_000.0);
        src.limit_blocks(2);
        let mut block = [0u8; 4];
        assert_eq!(src.transfer(&mut block), Completion::Done);
        assert_eq!(src.transfer(&mut block), Completion::Last);
    }

    #[test]
    fn zero_limit_ends_on_first_block() {
        let mut src = SineSource::new(8_000.0);
        src.limit_blocks(0);
        assert_eq!(src.remaining, Some(1));
        let mut block = [0u8; 4];
        assert_eq!(src.transfer(&mut block), Completion::Last);
        assert_eq!(src.transfer(&mut block), Completion::Last);
    }
}
