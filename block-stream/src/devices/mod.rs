//! Reference [`BlockDevice`](crate::device::BlockDevice) implementations.
//!
//! | Device | Direction | Feature |
//! |--------|-----------|---------|
//! | [`SineSource`] | Input | `sim` |
//! | [`PeakMeterSink`] | Output | always |
//! | [`Accelerometer`] | Input | `accel` |

mod peak_sink;
pub use peak_sink::PeakMeterSink;

#[cfg(feature = "sim")]
mod sine_source;
#[cfg(feature = "sim")]
pub use sine_source::SineSource;

#[cfg(feature = "accel")]
mod accel_registers;
#[cfg(feature = "accel")]
mod accelerometer;
#[cfg(feature = "accel")]
pub use accelerometer::{AccelError, Accelerometer, DataRate};
