//! LIS3DH-compatible accelerometer register map.
//!
//! Registers are 8-bit. Multi-byte reads auto-increment the register
//! address when bit 7 of the sub-address is set.

// Interrupt registers are listed for completeness but not yet used.
#![allow(dead_code)]

// ── I2C addresses ──────────────────────────────────────────────────────────

/// Default I2C address (SA0 pin low).
pub const I2C_ADDR_SA0_LOW: u8 = 0x18;

/// Alternate I2C address (SA0 pin high).
pub const I2C_ADDR_SA0_HIGH: u8 = 0x19;

// ── Identification ─────────────────────────────────────────────────────────

/// Device identification register (read-only).
pub const WHO_AM_I: u8 = 0x0F;

/// Expected `WHO_AM_I` value.
pub const DEVICE_ID: u8 = 0x33;

// ── Control ────────────────────────────────────────────────────────────────

/// Control register 1.
/// - Bits 7:4 — ODR (output data rate, 0 = power down)
/// - Bit  3   — LPen (low-power mode)
/// - Bit  2   — Zen
/// - Bit  1   — Yen
/// - Bit  0   — Xen
pub const CTRL_REG1: u8 = 0x20;

/// All three axes enabled.
pub const CTRL_REG1_XYZ_EN: u8 = 0x07;

/// Control register 4.
/// - Bit  7   — BDU (block data update: outputs latched until both bytes read)
/// - Bits 5:4 — FS (full scale: 0=±2g, 1=±4g, 2=±8g, 3=±16g)
/// - Bit  3   — HR (high-resolution output)
pub const CTRL_REG4: u8 = 0x23;

pub const CTRL_REG4_BDU: u8 = 1 << 7;
pub const CTRL_REG4_HR: u8 = 1 << 3;

/// Control register 5.
/// - Bit 6 — FIFO_EN (route samples through the 32-level FIFO)
pub const CTRL_REG5: u8 = 0x24;

pub const CTRL_REG5_FIFO_EN: u8 = 1 << 6;

/// FIFO control.
/// - Bits 7:6 — FM (0 = bypass, 1 = FIFO, 2 = stream, 3 = stream-to-FIFO)
pub const FIFO_CTRL_REG: u8 = 0x2E;

/// Stream mode: the FIFO keeps the newest 32 samples.
pub const FIFO_MODE_STREAM: u8 = 0b10 << 6;

/// FIFO source register (read-only).
/// - Bit  6   — OVRN_FIFO (all 32 slots are full)
/// - Bit  5   — EMPTY
/// - Bits 4:0 — FSS (unread samples)
pub const FIFO_SRC_REG: u8 = 0x2F;

pub const FIFO_SRC_OVRN: u8 = 1 << 6;
pub const FIFO_SRC_FSS_MASK: u8 = 0x1F;

/// FIFO capacity in samples.
pub const FIFO_DEPTH: usize = 32;

/// Interrupt 1 configuration.
pub const INT1_CFG: u8 = 0x30;

// ── Status and output ──────────────────────────────────────────────────────

/// Status register.
/// - Bit 3 — ZYXDA (new X, Y and Z data available)
pub const STATUS_REG: u8 = 0x27;

pub const STATUS_ZYXDA: u8 = 1 << 3;

/// First output register; X, Y, Z follow as little-endian 16-bit pairs.
/// With the FIFO enabled, a 6-byte burst read here pops one sample.
pub const OUT_X_L: u8 = 0x28;

/// Sub-address flag enabling register auto-increment.
pub const AUTO_INCREMENT: u8 = 0x80;

/// Bytes in one X/Y/Z sample frame.
pub const FRAME_BYTES: usize = 6;
