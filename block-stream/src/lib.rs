//! # block-stream
//!
//! A `no_std`, zero-allocation engine for moving fixed-size data blocks
//! between a hardware-like device and an application. The application lends
//! the engine one memory region; the engine splits it into equal blocks and
//! cycles them through a lock-free ring shared by two actors:
//!
//! - the **device side**, running in interrupt, DMA completion or timer
//!   context, which fills (input) or drains (output) blocks;
//! - the **application side**, which retrieves and releases blocks from its
//!   normal execution context and never waits for the device.
//!
//! ## Architecture
//!
//! | Layer | Module | Purpose |
//! |-------|--------|---------|
//! | Memory | [`block`] | Block geometry, atomic ownership ring, held-block view |
//! | Session | [`session`] | Lifecycle states, streaming mode, direction |
//! | Events | [`event`] | Event bitmask and callback delivery |
//! | Engine | [`stream`] | [`BlockStream`] core with its control and producer handles |
//! | Trait | [`driver`] / [`device`] | `StreamDriver` and `BlockDevice` traits |
//! | Devices | [`devices`] | Reference sources and sinks (feature-gated) |
//!
//! ## Quick start
//!
//! ```ignore
//! use block_stream::devices::SineSource;
//! use block_stream::{BlockStream, Direction, Event, Mode};
//!
//! static MIC: BlockStream<'static, 4> = BlockStream::new(Direction::Input);
//!
//! fn on_event(event: Event) {
//!     if event.contains(Event::OVERFLOW) {
//!         // application fell behind
//!     }
//! }
//!
//! let (mut control, mut producer) = MIC.split().unwrap();
//! control.initialize(Some(&on_event))?;
//! control.register_buffer(buffer, 256)?;
//! control.start(Mode::Continuous)?;
//!
//! // In your timer / DMA ISR:
//! producer.pump(&mut sine_source);
//!
//! // In the application loop:
//! if let Some(block) = control.get_block() {
//!     process(&block);
//! }
//! control.release_block()?;
//! ```
//!
//! ## Features
//!
//! | Feature | Default | Enables |
//! |---------|---------|---------|
//! | `sim` | yes | Simulated sine-wave microphone (requires `libm`) |
//! | `accel` | yes | I2C accelerometer source (requires `embedded-hal`) |
//!
//! ## Status codes
//!
//! Every fallible operation returns [`StreamError`]; [`error::status_code`]
//! maps a result onto the integer codes in [`error`] for C-style callers.

#![no_std]

pub mod constants;
pub mod error;
pub mod event;
pub mod session;
pub mod block;
pub mod stream;
pub mod driver;
pub mod device;
pub mod devices;

pub use block::{Block, BlockRegion, BufferInfo};
pub use device::{BlockDevice, Completion};
pub use driver::StreamDriver;
pub use error::StreamError;
pub use event::{Event, EventCallback};
pub use session::{Direction, Mode, SessionState};
pub use stream::{BlockStream, StatusSnapshot, StreamControl, StreamProducer};
